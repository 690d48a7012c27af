use rocket::{Build, Config, Rocket, routes};
use storage::file_storage::FileStorage;

pub mod controller;

#[derive(Clone, Debug)]
pub struct NodeSettings {
    pub node_id: String,
    pub max_block_size: u64,
    pub capacity_override: Option<u64>,
}

pub fn rocket(store: FileStorage, settings: NodeSettings, config: Config) -> Rocket<Build> {
    rocket::custom(config).manage(store).manage(settings).mount(
        "/",
        routes![
            controller::upload_block,
            controller::get_block,
            controller::exists,
            controller::index,
            controller::health,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::{http::Status, local::asynchronous::Client};
    use serde_json::Value;
    use storage::file_storage::FileStorageConfig;

    async fn client(root: &std::path::Path) -> Client {
        let store = FileStorage::new(FileStorageConfig {
            root: root.to_string_lossy().to_string(),
        })
        .await
        .unwrap();
        let settings = NodeSettings {
            node_id: "dn-test".to_string(),
            max_block_size: 16,
            capacity_override: Some(1000),
        };
        Client::tracked(rocket(store, settings, Config::debug_default()))
            .await
            .unwrap()
    }

    #[rocket::async_test]
    async fn upload_then_fetch_block() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path()).await;

        let response = client
            .post("/upload_block/docs_a.txt__0__ab12")
            .body("hello world")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["size"], 11);
        assert_eq!(
            body["checksum"],
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );

        let response = client.get("/block/docs_a.txt__0__ab12").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_bytes().await.unwrap(), b"hello world");

        let response = client.head("/block/docs_a.txt__0__ab12").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let response = client.head("/block/missing").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client.get("/exists/docs_a.txt__0__ab12").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["exists"], true);

        let response = client.get("/health").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["node_id"], "dn-test");
        assert_eq!(body["total_blocks"], 1);
        assert_eq!(body["free_space"], 989);
    }

    #[rocket::async_test]
    async fn rejects_bad_ids_and_oversized_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(dir.path()).await;

        let response = client.post("/upload_block/.hidden").body("x").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
        let response = client.get("/block/..%2Fetc%2Fpasswd").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client
            .post("/upload_block/big")
            .body("0123456789abcdefXYZ")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::PayloadTooLarge);
        let response = client.get("/block/big").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
