use utilities::{
    logger::{instrument, tracing, warn},
    result::Result,
};

use crate::{namenode::service::NamenodeService, token_store::TokenStore};

pub struct AccountHandler {
    namenode: NamenodeService,
    token_store: TokenStore,
}
impl AccountHandler {
    pub fn new(namenode: NamenodeService, token_store: TokenStore) -> Self {
        Self {
            namenode,
            token_store,
        }
    }
    pub async fn register(&mut self, username: &str, password: &str) -> Result<String> {
        let registered = self.namenode.register(username, password).await?;
        Ok(format!("Registered {}, you can login now", registered.username))
    }
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String> {
        let session = self.namenode.login(username, password).await?;
        self.token_store.save(&session.token).await?;
        Ok(format!(
            "Logged in as {}, session valid until {}",
            session.username, session.expires_at
        ))
    }
    pub async fn logout(&mut self) -> Result<String> {
        if !self.namenode.has_token().await {
            return Ok("Not logged in".to_owned());
        }
        let result = self.namenode.logout().await;
        self.namenode.set_token(None).await;
        if let Err(e) = self.token_store.clear().await {
            warn!(error = %e, "Could not remove the token file");
        }
        match result {
            Ok(_) => Ok("Logged out".to_owned()),
            // session was already gone on the namenode side
            Err(e) if e.to_string().starts_with("Unauthorized") => Ok("Logged out".to_owned()),
            Err(e) => Err(e),
        }
    }
}
