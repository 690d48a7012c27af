use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use storage::file_storage::FileStorageConfig;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub datanode_id: String,
    pub namenode_addrs: String,
    /// url announced to the namenode and handed out to clients
    pub external_addrs: String,
    pub api_address: String,
    pub api_port: u16,
    pub storage_path: String,
    // overrides the free space reported by the filesystem
    pub capacity_bytes: Option<u64>,
    pub max_block_size: u64,
    pub heartbeat_interval_secs: u64,
    pub register_max_retries: u8,
    pub namenode_timeout_secs: u64,
    pub log_level: String,
    pub log_base: String,
    pub apm_endpoint: Option<String>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            datanode_id: "datanode-1".to_string(),
            namenode_addrs: "http://127.0.0.1:8000".to_string(),
            external_addrs: "http://127.0.0.1:8001".to_string(),
            api_address: "0.0.0.0".to_string(),
            api_port: 8001,
            storage_path: "./temp/datanode-1".to_string(),
            capacity_bytes: None,
            max_block_size: 64 * 1024 * 1024,
            heartbeat_interval_secs: 10,
            register_max_retries: 5,
            namenode_timeout_secs: 5,
            log_level: "info".to_string(),
            log_base: "./temp/logs".to_string(),
            apm_endpoint: None,
        }
    }
}
impl Config {
    pub fn storage_config(&self) -> FileStorageConfig {
        FileStorageConfig {
            root: self.storage_path.clone(),
        }
    }
}

pub fn figment() -> Figment {
    let env = std::env::var("ENV").unwrap_or_else(|_| "default".to_owned());
    let config_file_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| format!("./datanode/config/{}.yaml", env));
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Yaml::file(config_file_path))
        .merge(Env::prefixed("DATANODE_"))
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| match figment().extract() {
    Ok(config) => config,
    Err(e) => {
        eprintln!("invalid datanode configuration: {e}");
        std::process::exit(1);
    }
});
