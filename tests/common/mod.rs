//! Shared fixtures for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use arcana::auth::{epoch_secs, ApiKeyRecord, MemoryKeyStore, Principal};
use arcana::config::AppConfig;
use arcana::http::HttpServer;

#[allow(dead_code)]
pub const VALID_KEY: &str = "sk_live_orion";
#[allow(dead_code)]
pub const EXPIRED_KEY: &str = "sk_live_lapsed";
#[allow(dead_code)]
pub const DISABLED_KEY: &str = "sk_live_dormant";

/// A running server plus handles to poke at its state.
pub struct TestApp {
    pub addr: SocketAddr,
    pub keys: MemoryKeyStore,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server on an ephemeral port with a seeded key store.
pub async fn spawn_app(config: AppConfig) -> TestApp {
    let now = epoch_secs();
    let keys = MemoryKeyStore::new(None);
    keys.insert_key(
        VALID_KEY,
        ApiKeyRecord::new(Principal::new("u-1", "Vera Delling", "premium"), 0, None),
    );
    keys.insert_key(
        EXPIRED_KEY,
        ApiKeyRecord::new(
            Principal::new("u-2", "Milo Quist", "basic"),
            0,
            Some(now.saturating_sub(3600)),
        ),
    );
    let mut disabled = ApiKeyRecord::new(Principal::new("u-3", "Iris Kato", "basic"), 0, None);
    disabled.active = false;
    keys.insert_key(DISABLED_KEY, disabled);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, Arc::new(keys.clone()));
    tokio::spawn(server.run(listener));

    TestApp { addr, keys }
}

#[allow(dead_code)]
pub async fn spawn_default_app() -> TestApp {
    spawn_app(AppConfig::default()).await
}
