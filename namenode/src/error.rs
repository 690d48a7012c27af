use rocket::{
    Request,
    http::Status,
    response::{self, Responder, status},
    serde::json::Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum NamenodeError {
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} is not empty")]
    NotEmpty(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("no active datanodes available")]
    NoActiveNodes,
    #[error("blocks placed on inactive or unknown datanodes : {}", .0.join(", "))]
    InvalidPlacement(Vec<String>),
    #[error("{0}")]
    Unreachable(String),
    #[error("{0}")]
    WeakCredentials(String),
    #[error("{0}")]
    InvalidRequest(String),
}

impl NamenodeError {
    pub fn kind(&self) -> &'static str {
        match self {
            NamenodeError::AlreadyExists(_) => "AlreadyExists",
            NamenodeError::NotFound(_) => "NotFound",
            NamenodeError::NotEmpty(_) => "NotEmpty",
            NamenodeError::Unauthorized(_) => "Unauthorized",
            NamenodeError::NoActiveNodes => "NoActiveNodes",
            NamenodeError::InvalidPlacement(_) => "InvalidPlacement",
            NamenodeError::Unreachable(_) => "Unreachable",
            NamenodeError::WeakCredentials(_) => "WeakCredentials",
            NamenodeError::InvalidRequest(_) => "InvalidRequest",
        }
    }
    pub fn status(&self) -> Status {
        match self {
            NamenodeError::AlreadyExists(_) | NamenodeError::NotEmpty(_) => Status::Conflict,
            NamenodeError::NotFound(_) => Status::NotFound,
            NamenodeError::Unauthorized(_) => Status::Unauthorized,
            NamenodeError::NoActiveNodes => Status::ServiceUnavailable,
            NamenodeError::InvalidPlacement(_) => Status::UnprocessableEntity,
            NamenodeError::Unreachable(_) => Status::BadGateway,
            NamenodeError::WeakCredentials(_) | NamenodeError::InvalidRequest(_) => {
                Status::BadRequest
            }
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl From<&NamenodeError> for ErrorBody {
    fn from(value: &NamenodeError) -> Self {
        Self {
            error: value.kind().to_string(),
            detail: value.to_string(),
        }
    }
}

impl<'r> Responder<'r, 'static> for NamenodeError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        status::Custom(self.status(), Json(ErrorBody::from(&self))).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_placement_lists_offending_blocks() {
        let e = NamenodeError::InvalidPlacement(vec!["b1".to_string(), "b3".to_string()]);
        assert_eq!(e.kind(), "InvalidPlacement");
        assert_eq!(e.status(), Status::UnprocessableEntity);
        assert!(e.to_string().ends_with("b1, b3"));
    }
}
