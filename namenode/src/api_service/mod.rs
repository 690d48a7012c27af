use std::sync::Arc;

use rocket::{Build, Config, Request, Rocket, catch, catchers, fairing::AdHoc, serde::json::Json};
use rocket_cors::CorsOptions;
use utilities::{logger::info, result::Result};

pub mod controller;
pub mod middleware;
pub mod routes;

use crate::{
    api_service::{
        middleware::auth::AuthRejection,
        routes::{auth, datanode, monitoring, namespace},
    },
    datanode::selection_policy::selection_policy::DatanodeSelectionPolicy,
    error::{ErrorBody, NamenodeError},
    integrity_verifier::IntegrityVerifier,
    ledger::recorder::Recorder,
    namenode_state::NamenodeState,
};

pub type SharedRecorder = Arc<dyn Recorder + Send + Sync>;
pub type SharedSelectionPolicy = Arc<dyn DatanodeSelectionPolicy + Send + Sync>;

pub struct ApiParts {
    pub state: Arc<NamenodeState>,
    pub verifier: IntegrityVerifier,
    pub ledger: SharedRecorder,
    pub selection_policy: SharedSelectionPolicy,
}

#[catch(401)]
fn unauthorized(req: &Request<'_>) -> Json<ErrorBody> {
    let rejection = req.local_cache(|| AuthRejection("authentication required".to_string()));
    Json(ErrorBody::from(&NamenodeError::Unauthorized(rejection.0.clone())))
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody::from(&NamenodeError::NotFound(format!(
        "route {} {}",
        req.method(),
        req.uri()
    ))))
}

#[catch(400)]
fn bad_request() -> Json<ErrorBody> {
    Json(ErrorBody::from(&NamenodeError::InvalidRequest(
        "malformed request".to_string(),
    )))
}

#[catch(422)]
fn unprocessable() -> Json<ErrorBody> {
    Json(ErrorBody::from(&NamenodeError::InvalidRequest(
        "request body or query could not be parsed".to_string(),
    )))
}

#[catch(500)]
fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Internal".to_string(),
        detail: "internal server error".to_string(),
    })
}

pub fn rocket(parts: ApiParts, config: Config) -> Result<Rocket<Build>> {
    let cors = CorsOptions::default()
        .to_cors()
        .map_err(|e| format!("error creating CORS fairing {e}"))?;
    Ok(rocket::custom(config)
        .manage(parts.state)
        .manage(parts.verifier)
        .manage(parts.ledger)
        .manage(parts.selection_policy)
        .mount("/", monitoring::routes())
        .mount("/", auth::routes())
        .mount("/", datanode::routes())
        .mount("/", namespace::routes())
        .register("/", catchers![unauthorized, not_found, bad_request, unprocessable, internal_error])
        .attach(cors)
        .attach(AdHoc::on_liftoff("Namenode API", |rocket| {
            let port = rocket.config().port;
            Box::pin(async move {
                info!(port, "Namenode api is live");
            })
        })))
}
