use std::{sync::Arc, time::Duration};

use reqwest::{Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{sync::RwLock, time::sleep};
use utilities::{
    http_client_pool::HTTP_CLIENT_POOL,
    logger::{instrument, trace, tracing, warn},
    result::Result,
    retry_policy::backoff_for,
};

use super::models::*;

/// Percent-encodes a namespace path segment by segment, keeping the separators
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .bytes()
                .map(|b| match b {
                    b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                        (b as char).to_string()
                    }
                    _ => format!("%{b:02X}"),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Turns a non success namenode reply into `Kind: detail`
pub fn render_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => format!("{}: {}", error.error, error.detail),
        Err(_) => format!("Unexpected namenode reply {status}: {body}"),
    }
}

#[derive(Clone, Debug)]
pub struct NamenodeService {
    base: String,
    timeout: Duration,
    max_retries: u8,
    token: Arc<RwLock<Option<String>>>,
}

impl NamenodeService {
    pub fn new(namenode_addrs: &str, timeout: Duration, max_retries: u8) -> Self {
        Self {
            base: namenode_addrs.trim_end_matches('/').to_owned(),
            timeout,
            max_retries: max_retries.max(1),
            token: Arc::default(),
        }
    }
    pub fn address(&self) -> &str {
        &self.base
    }
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let client = HTTP_CLIENT_POOL.get_client(self.timeout).await?;
        let mut request = client.request(method, format!("{}{}", self.base, path));
        if let Some(token) = self.token.read().await.as_ref() {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    /// Retries only when the namenode could not be reached at all
    async fn send(&self, method: Method, path: &str, body: Option<&(impl Serialize + Sync)>) -> Result<Response> {
        let mut curr_try = 1;
        loop {
            let mut request = self.request(method.clone(), path).await?;
            if let Some(body) = body {
                request = request.json(body);
            }
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if (e.is_connect() || e.is_timeout()) && curr_try < self.max_retries => {
                    curr_try += 1;
                    let sleep_duration = backoff_for(curr_try);
                    warn!(error = %e, ?sleep_duration, "Namenode unreachable, retrying");
                    sleep(sleep_duration).await;
                }
                Err(e) => {
                    return Err(format!("Unreachable: namenode {} : {e}", self.base).into());
                }
            }
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T> {
        let response = self.send(method, path, body).await?;
        let status = response.status();
        trace!(%status, %path, "namenode replied");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(render_error(status, &body).into());
        }
        Ok(response.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(Method::GET, path, None::<&()>).await
    }

    pub async fn ping(&self) -> Result<NamenodeInfo> {
        self.get("/").await
    }
    #[instrument(name = "service_namenode_register", skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<RegisterResponse> {
        let body = Credentials { username, password };
        self.call(Method::POST, "/register", Some(&body)).await
    }
    #[instrument(name = "service_namenode_login", skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let body = Credentials { username, password };
        let response: LoginResponse = self.call(Method::POST, "/login", Some(&body)).await?;
        self.set_token(Some(response.token.clone())).await;
        Ok(response)
    }
    pub async fn logout(&self) -> Result<LogoutResponse> {
        let response = self.call(Method::POST, "/logout", None::<&()>).await?;
        self.set_token(None).await;
        Ok(response)
    }
    pub async fn placement(&self, blocks: u64) -> Result<Vec<String>> {
        let response: PlacementResponse = self.get(&format!("/placement?blocks={blocks}")).await?;
        Ok(response.placements)
    }
    #[instrument(name = "service_namenode_register_file", skip(self, registration), fields(filename = %registration.filename))]
    pub async fn register_file(&self, registration: &FileRegistration) -> Result<FileEntry> {
        self.call(Method::POST, "/register_file", Some(registration)).await
    }
    pub async fn file(&self, path: &str) -> Result<FileEntry> {
        self.get(&format!("/file/{}", encode_path(path))).await
    }
    pub async fn remove_file(&self, path: &str) -> Result<RemovedFile> {
        self.call(Method::DELETE, &format!("/rm/{}", encode_path(path)), None::<&()>)
            .await
    }
    pub async fn mkdir(&self, path: &str) -> Result<DirectoryEntry> {
        self.call(Method::POST, &format!("/mkdir/{}", encode_path(path)), None::<&()>)
            .await
    }
    pub async fn rmdir(&self, path: &str) -> Result<RemovedDirectory> {
        self.call(Method::DELETE, &format!("/rmdir/{}", encode_path(path)), None::<&()>)
            .await
    }
    pub async fn list(&self, path: &str) -> Result<Listing> {
        self.get(&format!("/ls?path=/{}", encode_path(path))).await
    }
    pub async fn file_health(&self, path: &str) -> Result<FileHealth> {
        self.get(&format!("/file_health/{}", encode_path(path))).await
    }
    pub async fn system_status(&self) -> Result<SystemStatus> {
        self.get("/system_status").await
    }
    pub async fn datanodes(&self) -> Result<DatanodeList> {
        self.get("/datanodes").await
    }
    pub async fn datanodes_detailed(&self) -> Result<DetailedDatanodeList> {
        self.get("/datanodes/detailed").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_encoded_per_segment() {
        assert_eq!(encode_path("/docs//my file.txt/"), "docs/my%20file.txt");
        assert_eq!(encode_path("/"), "");
        assert_eq!(encode_path("a?b#c"), "a%3Fb%23c");
    }

    #[test]
    fn errors_render_kind_and_detail() {
        let body = r#"{"error":"NotEmpty","detail":"/docs is not empty"}"#;
        assert_eq!(
            render_error(reqwest::StatusCode::CONFLICT, body),
            "NotEmpty: /docs is not empty"
        );
        assert!(render_error(reqwest::StatusCode::BAD_GATEWAY, "oops").contains("502"));
    }

    #[tokio::test]
    async fn unreachable_namenode_gives_up_after_retries() {
        let service = NamenodeService::new("http://127.0.0.1:1", Duration::from_millis(200), 2);
        let error = service.ping().await.unwrap_err();
        assert!(error.to_string().starts_with("Unreachable"));
    }
}
