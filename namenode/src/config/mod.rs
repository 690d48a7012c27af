use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub id: String,
    pub api_address: String,
    pub api_port: u16,
    pub heartbeat_timeout_secs: u64,
    pub sweep_interval_secs: u64,
    pub probe_timeout_ms: u64,
    pub session_ttl_secs: u64,
    pub min_password_len: usize,
    pub max_placement_blocks: usize,
    pub ledger_file: String,
    pub state_log_file: Option<String>,
    pub log_level: String,
    pub log_base: String,
    pub apm_endpoint: Option<String>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            id: "namenode".to_string(),
            api_address: "0.0.0.0".to_string(),
            api_port: 8000,
            heartbeat_timeout_secs: 60,
            sweep_interval_secs: 30,
            probe_timeout_ms: 3000,
            session_ttl_secs: 86400,
            min_password_len: 6,
            max_placement_blocks: 100_000,
            ledger_file: "./temp/namenode/history.log".to_string(),
            state_log_file: Some("./temp/namenode/state.log".to_string()),
            log_level: "info".to_string(),
            log_base: "./temp/logs".to_string(),
            apm_endpoint: None,
        }
    }
}

pub fn figment() -> Figment {
    let env = std::env::var("ENV").unwrap_or_else(|_| "default".to_owned());
    let config_file_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| format!("./namenode/config/{}.yaml", env));
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Yaml::file(config_file_path))
        .merge(Env::prefixed("NAMENODE_"))
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| match figment().extract() {
    Ok(config) => config,
    Err(e) => {
        eprintln!("invalid namenode configuration: {e}");
        std::process::exit(1);
    }
});
