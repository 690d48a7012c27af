use std::sync::Arc;

use rocket::{
    Request,
    http::Status,
    request::{self, FromRequest},
};

use crate::{error::NamenodeError, namenode_state::NamenodeState};

/// Detail of the last rejected token, read back by the 401 catcher
pub struct AuthRejection(pub String);

/// Caller resolved from its session token
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub username: String,
    pub token: String,
}

fn presented_token<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    if let Some(value) = req.headers().get_one("Authorization") {
        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if !token.is_empty() {
            return Some(token);
        }
    }
    req.headers()
        .get_one("token")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn reject(req: &Request<'_>, error: NamenodeError) -> request::Outcome<AuthenticatedUser, NamenodeError> {
    req.local_cache(|| AuthRejection(error.to_string()));
    request::Outcome::Error((Status::Unauthorized, error))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = NamenodeError;
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(token) = presented_token(req) else {
            return reject(
                req,
                NamenodeError::Unauthorized("missing session token".to_string()),
            );
        };
        let Some(state) = req.rocket().state::<Arc<NamenodeState>>() else {
            return request::Outcome::Error((
                Status::InternalServerError,
                NamenodeError::Unauthorized("session store unavailable".to_string()),
            ));
        };
        match state.authenticated_user(token).await {
            Ok(username) => request::Outcome::Success(AuthenticatedUser {
                username,
                token: token.to_owned(),
            }),
            Err(e) => reject(req, e),
        }
    }
}
