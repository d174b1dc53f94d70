//! Shared harness for gateway integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use object_gateway::config::GatewayConfig;
use object_gateway::http::HttpServer;
use object_gateway::lifecycle::Shutdown;
use object_gateway::store::{MemoryCounterStore, MemoryObjectStore};

/// A running gateway bound to a test port, with handles to its collaborators.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub objects: Arc<MemoryObjectStore>,
    pub counters: Arc<MemoryCounterStore>,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Spawn a gateway on the given address backed by fresh in-memory stores.
pub async fn start_gateway(addr: SocketAddr, config: GatewayConfig) -> TestGateway {
    let objects = Arc::new(MemoryObjectStore::new());
    let counters = Arc::new(MemoryCounterStore::new());
    let server = HttpServer::new(config, objects.clone(), counters.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind test listener");
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    TestGateway {
        addr,
        objects,
        counters,
        shutdown,
    }
}

/// Config with a known protected-tier secret and a roomy default quota.
pub fn test_config(secret: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.access.protected_secret = secret.to_string();
    config
}

/// Non-pooled client so tests never share connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .expect("build test client")
}
