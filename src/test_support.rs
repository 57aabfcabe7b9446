use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::store::Store;
use crate::transport::{bind, serve};

/// Starts a server on an ephemeral localhost port.
pub async fn spawn_server(settings: Settings) -> (SocketAddr, Arc<Store>) {
    let store = Arc::new(Store::new(settings.store.buckets).expect("store"));
    let listener = bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(serve(listener, store.clone(), settings));
    (addr, store)
}

pub async fn spawn_default_server() -> (SocketAddr, Arc<Store>) {
    let mut settings = Settings::default();
    settings.store.buckets = 8;
    spawn_server(settings).await
}

/// Polls `cond` until it holds or two seconds pass.
pub async fn wait_until<F: Fn() -> bool>(cond: F) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
