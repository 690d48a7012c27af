use std::time::Duration;

use command_runner::{CommandRunner, Outcome};
use config::CONFIG;
use datanode_service::DatanodeService;
use namenode::service::NamenodeService;
use token_store::TokenStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use utilities::{
    logger::{error, info, init_logger},
    result::Result,
};

mod chunk_joiner;
mod command_runner;
mod config;
mod datanode_service;
mod file_chunker;
mod namenode;
mod token_store;

#[tokio::main]
async fn main() -> Result<()> {
    let _gaurd = init_logger(
        "Client",
        &CONFIG.client_id,
        CONFIG.log_level.clone(),
        CONFIG.apm_endpoint.as_deref(),
        &CONFIG.log_base,
    );
    let namenode = NamenodeService::new(
        &CONFIG.namenode_addrs,
        Duration::from_secs(CONFIG.request_timeout_secs),
        CONFIG.max_retries,
    );
    let token_store = TokenStore::new(&CONFIG.token_file);
    namenode.set_token(token_store.load().await).await;
    let datanode = DatanodeService::new(Duration::from_secs(CONFIG.transfer_timeout_secs));
    let mut command_executer = CommandRunner::new(
        namenode,
        datanode,
        token_store,
        CONFIG.block_size,
        CONFIG.max_retries,
    );
    info!(namenode = %CONFIG.namenode_addrs, "starting the Client");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let input = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "error while reading the command");
                break;
            }
        };
        match command_executer.handle_input(&input).await {
            Ok(Outcome::Exit) => break,
            Ok(Outcome::Message(message)) if message.is_empty() => {}
            Ok(Outcome::Message(message)) => println!("{message}"),
            Err(message) => println!("Error : {message}"),
        }
    }
    Ok(())
}
