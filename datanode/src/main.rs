mod api_service;
mod config;
mod error;
mod namenode;
mod node_report;
mod state_mantainer;

use std::time::Duration;

use config::CONFIG;
use rocket::config::LogLevel;
use storage::file_storage::FileStorage;
use utilities::{
    logger::{error, info, init_logger, warn},
    result::Result,
    retry_policy::retry_with_backoff,
};

use crate::{
    api_service::{NodeSettings, rocket},
    namenode::service::NamenodeService,
    node_report::collect_report,
    state_mantainer::StateMantainer,
};

#[tokio::main]
async fn main() -> Result<()> {
    let _gaurd = init_logger(
        "Datanode",
        &CONFIG.datanode_id,
        CONFIG.log_level.clone(),
        CONFIG.apm_endpoint.as_deref(),
        &CONFIG.log_base,
    );
    let store = match FileStorage::new(CONFIG.storage_config()).await {
        Ok(v) => v,
        Err(e) => {
            error!(error=%e,"Error while creating the block store Hence shuting down");
            return Err(e);
        }
    };

    let namenode_service = NamenodeService::new(
        &CONFIG.namenode_addrs,
        &CONFIG.external_addrs,
        &CONFIG.datanode_id,
        Duration::from_secs(CONFIG.namenode_timeout_secs),
    );
    let capacity = collect_report(&store, CONFIG.capacity_bytes)
        .await
        .map(|report| report.free_space)
        .unwrap_or_default();
    let registration = retry_with_backoff(
        || namenode_service.register(capacity),
        CONFIG.register_max_retries,
    )
    .await;
    if let Err(e) = registration {
        // heartbeats register the node implicitly once the namenode is reachable
        warn!(error=%e,"Could not register with namenode, relying on heartbeats");
    }
    let _heartbeat = StateMantainer::new(store.clone(), namenode_service, CONFIG.capacity_bytes)
        .start_heartbeat_loop(Duration::from_secs(CONFIG.heartbeat_interval_secs));

    let settings = NodeSettings {
        node_id: CONFIG.datanode_id.clone(),
        max_block_size: CONFIG.max_block_size,
        capacity_override: CONFIG.capacity_bytes,
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
    info!(url=%CONFIG.external_addrs, port=%CONFIG.api_port, "Starting the datanode api");
    if let Err(e) = rocket(store, settings, rocket_config).launch().await {
        error!(error=%e,"Datanode api stopped with error");
        return Err(e.to_string().into());
    }
    Ok(())
}
