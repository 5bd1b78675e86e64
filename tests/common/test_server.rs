use std::path::Path;
use std::sync::Arc;

use labtime::auth::TokenGenerator;
use labtime::server::{AppState, create_router};
use labtime::store::{SqliteStore, Store};
use serde_json::{Value, json};
use tempfile::TempDir;

pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const FACULTY_PASSWORD: &str = "faculty-secret";

/// An in-process server on a random local port, seeded with an admin
/// (`admin`), two faculty users (`f7`, `f9`) and two labs.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub store: Arc<SqliteStore>,
    server: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = Arc::new(
            SqliteStore::new(temp_dir.path().join("labtime.db")).expect("open store"),
        );
        store.initialize().expect("initialize store");

        let generator = TokenGenerator::new();
        let admin_hash = generator.hash(ADMIN_PASSWORD).expect("hash");
        let faculty_hash = generator.hash(FACULTY_PASSWORD).expect("hash");
        store
            .create_user("Administrator", "admin", &admin_hash, true)
            .expect("create admin");
        store
            .create_user("Grace Hopper", "f7", &faculty_hash, false)
            .expect("create faculty");
        store
            .create_user("Alan Turing", "f9", &faculty_hash, false)
            .expect("create faculty");
        store.create_lab("Lab 1").expect("create lab");
        store.create_lab("Lab 2").expect("create lab");

        let state = Arc::new(AppState::new(
            store.clone(),
            Arc::new(mockable::DefaultClock),
            Some(12),
        ));
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            temp_dir,
            base_url: format!("http://127.0.0.1:{port}"),
            store,
            server,
        }
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Logs in and returns the bearer token.
    pub async fn login(&self, faculty_id: &str, password: &str) -> String {
        let resp: Value = reqwest::Client::new()
            .post(self.url("/auth/login"))
            .json(&json!({ "faculty_id": faculty_id, "password": password }))
            .send()
            .await
            .expect("login request")
            .json()
            .await
            .expect("login response");
        resp["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login("admin", ADMIN_PASSWORD).await
    }

    pub async fn faculty_token(&self, faculty_id: &str) -> String {
        self.login(faculty_id, FACULTY_PASSWORD).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}
