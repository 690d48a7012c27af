use rocket::{
    Request,
    http::Status,
    response::{self, Responder, status},
    serde::json::Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatanodeError {
    #[error("{0}")]
    InvalidBlockId(String),
    #[error("block {0} not found")]
    NotFound(String),
    #[error("block exceeds the maximum size of {0} bytes")]
    TooLarge(u64),
    #[error("{0}")]
    Storage(String),
}

impl DatanodeError {
    pub fn kind(&self) -> &'static str {
        match self {
            DatanodeError::InvalidBlockId(_) => "InvalidBlockId",
            DatanodeError::NotFound(_) => "NotFound",
            DatanodeError::TooLarge(_) => "TooLarge",
            DatanodeError::Storage(_) => "Storage",
        }
    }
    pub fn status(&self) -> Status {
        match self {
            DatanodeError::InvalidBlockId(_) => Status::BadRequest,
            DatanodeError::NotFound(_) => Status::NotFound,
            DatanodeError::TooLarge(_) => Status::PayloadTooLarge,
            DatanodeError::Storage(_) => Status::InternalServerError,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

impl<'r> Responder<'r, 'static> for DatanodeError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let body = ErrorBody {
            error: self.kind(),
            detail: self.to_string(),
        };
        status::Custom(self.status(), Json(body)).respond_to(req)
    }
}
