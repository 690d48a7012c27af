mod api_service;
mod config;
mod datanode;
mod error;
mod integrity_verifier;
mod ledger;
mod namenode_state;

use std::{path::Path, sync::Arc, time::Duration};

use config::CONFIG;
use ledger::default_ledger::DefaultLedger;
use rocket::config::LogLevel;
use utilities::{
    logger::{error, info, init_logger},
    result::Result,
};

use crate::{
    api_service::{ApiParts, rocket},
    datanode::{
        selection_policy::default_selection_policy::RoundRobinSelectionPolicy,
        service::DatanodeService,
    },
    integrity_verifier::IntegrityVerifier,
    namenode_state::{NamenodeState, StateSettings, state_mantainer::StateMantainer},
};

#[tokio::main]
async fn main() -> Result<()> {
    let _gaurd = init_logger(
        "Namenode",
        &CONFIG.id,
        CONFIG.log_level.clone(),
        CONFIG.apm_endpoint.as_deref(),
        &CONFIG.log_base,
    );
    info!(path=%CONFIG.ledger_file,"Creating a ledger");
    let ledger = match DefaultLedger::new(&CONFIG.ledger_file).await {
        Ok(v) => Arc::new(v),
        Err(e) => {
            error!(error=%e,"Error while intiating the ledger Hence shuting down");
            return Err(e);
        }
    };

    let state = Arc::new(NamenodeState::new(StateSettings {
        heartbeat_timeout: Duration::from_secs(CONFIG.heartbeat_timeout_secs),
        session_ttl: Duration::from_secs(CONFIG.session_ttl_secs),
        min_password_len: CONFIG.min_password_len,
    }));

    let mut state_mantainer = StateMantainer::new(
        state.clone(),
        ledger.clone(),
        Duration::from_secs(CONFIG.sweep_interval_secs),
    );
    if let Some(state_log_file) = CONFIG.state_log_file.as_deref() {
        state_mantainer = match state_mantainer.with_state_log(Path::new(state_log_file)).await {
            Ok(v) => v,
            Err(e) => {
                error!(error=%e,"Error while starting the state logger Hence shuting down");
                return Err(e);
            }
        };
    }
    let _sweeper = state_mantainer.start();

    let probe_timeout = Duration::from_millis(CONFIG.probe_timeout_ms);
    let parts = ApiParts {
        state: state.clone(),
        verifier: IntegrityVerifier::new(Arc::new(DatanodeService::new(probe_timeout)), probe_timeout),
        ledger,
        selection_policy: Arc::new(RoundRobinSelectionPolicy::new(
            state,
            CONFIG.max_placement_blocks,
        )),
    };
    let rocket_config = rocket::Config {
        address: CONFIG
            .api_address
            .parse()
            .map_err(|e| format!("invalid api_address {} : {e}", CONFIG.api_address))?,
        port: CONFIG.api_port,
        log_level: LogLevel::Off,
        ..rocket::Config::default()
    };
    info!(address=%CONFIG.api_address, port=%CONFIG.api_port, "Starting the namenode api");
    if let Err(e) = rocket(parts, rocket_config)?.launch().await {
        error!(error=%e,"Namenode api stopped with error");
        return Err(e.to_string().into());
    }
    Ok(())
}
