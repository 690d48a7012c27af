mod account_handler;
pub mod command;
mod delete_file_handler;
mod fetch_file_handler;
mod namespace_handler;
mod store_file_handler;
mod system_handler;

use crate::{datanode_service::DatanodeService, namenode::service::NamenodeService, token_store::TokenStore};
use account_handler::AccountHandler;
use command::{Command, USAGE, parse_command};
use delete_file_handler::DeleteFileHandler;
use fetch_file_handler::FetchFileHandler;
use namespace_handler::NamespaceHandler;
use store_file_handler::StoreFileHandler;
use system_handler::SystemHandler;
use utilities::result::Result;

/// What a handled line asks of the input loop
pub enum Outcome {
    Message(String),
    Exit,
}

pub struct CommandRunner {
    account_handler: AccountHandler,
    store_file_handler: StoreFileHandler,
    fetch_file_handler: FetchFileHandler,
    delete_file_handler: DeleteFileHandler,
    namespace_handler: NamespaceHandler,
    system_handler: SystemHandler,
}
impl CommandRunner {
    pub fn new(
        namenode: NamenodeService,
        datanode: DatanodeService,
        token_store: TokenStore,
        default_block_size: u64,
        max_retries: u8,
    ) -> Self {
        CommandRunner {
            account_handler: AccountHandler::new(namenode.clone(), token_store),
            store_file_handler: StoreFileHandler::new(
                namenode.clone(),
                datanode,
                default_block_size,
                max_retries,
            ),
            fetch_file_handler: FetchFileHandler::new(namenode.clone(), datanode),
            delete_file_handler: DeleteFileHandler::new(namenode.clone()),
            namespace_handler: NamespaceHandler::new(namenode.clone()),
            system_handler: SystemHandler::new(namenode),
        }
    }
    pub async fn handle_input(&mut self, input: &str) -> Result<Outcome> {
        let Some(command) = parse_command(input)? else {
            return Ok(Outcome::Message(String::new()));
        };
        let message = match command {
            Command::Help => USAGE.to_owned(),
            Command::Exit => return Ok(Outcome::Exit),
            Command::Ping => self.system_handler.ping().await?,
            Command::Register { username, password } => {
                self.account_handler.register(&username, &password).await?
            }
            Command::Login { username, password } => {
                self.account_handler.login(&username, &password).await?
            }
            Command::Logout => self.account_handler.logout().await?,
            Command::Put {
                local,
                remote,
                block_size,
            } => {
                self.store_file_handler
                    .store_file(local, remote, block_size)
                    .await?
            }
            Command::Get { remote, local } => self.fetch_file_handler.fetch_file(remote, local).await?,
            Command::Rm { path } => self.delete_file_handler.delete_file(&path).await?,
            Command::Ls { path, long } => {
                self.namespace_handler
                    .list(path.as_deref().unwrap_or("/"), long)
                    .await?
            }
            Command::Mkdir { path } => self.namespace_handler.mkdir(&path).await?,
            Command::Rmdir { path } => self.namespace_handler.rmdir(&path).await?,
            Command::Health { path } => self.system_handler.file_health(&path).await?,
            Command::Status => self.system_handler.status().await?,
            Command::Datanodes { detailed } => self.system_handler.datanodes(detailed).await?,
            Command::Config => self.system_handler.config(),
        };
        Ok(Outcome::Message(message))
    }
}
