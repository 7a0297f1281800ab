//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use alloy::primitives::U256;
use tokio::net::TcpListener;
use treasury_engine::blockchain::mock::{MockChain, TEST_PRIVATE_KEY};
use treasury_engine::blockchain::units::eth_to_wei;
use treasury_engine::blockchain::Wallet;
use treasury_engine::claims::default_targets;
use treasury_engine::{AppContext, HttpServer, Shutdown, TreasuryConfig};

/// A running service bound to an ephemeral port.
pub struct TestService {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn eth(value: f64) -> U256 {
    eth_to_wei(value).unwrap()
}

fn test_config() -> TreasuryConfig {
    let mut config = TreasuryConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.blockchain.receipt_poll_interval_ms = 10;
    config.blockchain.confirmation_timeout_secs = 2;
    config
}

/// Start the service against `chain`, or degraded when `chain` is `None`.
pub async fn start_service(chain: Option<Arc<MockChain>>) -> TestService {
    start_service_with(chain, |_| {}).await
}

/// Like [`start_service`], with a hook to adjust the configuration.
pub async fn start_service_with(
    chain: Option<Arc<MockChain>>,
    configure: impl FnOnce(&mut TreasuryConfig),
) -> TestService {
    let mut config = test_config();
    configure(&mut config);

    let ctx = chain.map(|chain| {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        Arc::new(AppContext::from_parts(chain, wallet, default_targets(), &config))
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, ctx);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    TestService {
        addr,
        client,
        shutdown,
    }
}
