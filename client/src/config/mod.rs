use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub client_id: String,
    pub namenode_addrs: String,
    pub block_size: u64,
    pub token_file: String,
    pub max_retries: u8,
    pub request_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
    pub log_level: String,
    pub log_base: String,
    pub apm_endpoint: Option<String>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: "client".to_string(),
            namenode_addrs: "http://127.0.0.1:8000".to_string(),
            block_size: 4 * 1024 * 1024,
            token_file: "./temp/client/token".to_string(),
            max_retries: 3,
            request_timeout_secs: 30,
            transfer_timeout_secs: 120,
            log_level: "warn".to_string(),
            log_base: "./temp/logs".to_string(),
            apm_endpoint: None,
        }
    }
}

pub fn figment() -> Figment {
    let env = std::env::var("ENV").unwrap_or_else(|_| "default".to_owned());
    // giving default path to root of binary
    let config_file_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| format!("./client/config/{}.yaml", env));
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Yaml::file(config_file_path))
        .merge(Env::prefixed("CLIENT_"))
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| match figment().extract() {
    Ok(config) => config,
    Err(e) => {
        eprintln!("invalid client configuration: {e}");
        std::process::exit(1);
    }
});
