//! TCP transport
//!
//! Accepts connections, enforces the connection limit and hands every
//! accepted socket to its own session task.

use std::sync::Arc;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::store::Store;
use crate::transport::session;
use crate::utils::Result;

pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!("server started on {}", listener.local_addr()?);
    Ok(listener)
}

/// Builds the store from `settings`, binds and serves until the listener fails.
pub async fn start_server(settings: Settings) -> Result<()> {
    let store = Arc::new(Store::new(settings.store.buckets)?);
    info!("created storage with {} buckets", store.bucket_count());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = bind(addr).await?;
    serve(listener, store, settings).await
}

pub async fn serve(listener: TcpListener, store: Arc<Store>, settings: Settings) -> Result<()> {
    let limit = Arc::new(Semaphore::new(settings.server.max_connections));
    let max_frame_bytes = settings.server.max_frame_bytes;

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("accept failed: {e}");
                return Err(e.into());
            }
        };

        let Ok(permit) = limit.clone().try_acquire_owned() else {
            warn!("[{peer}] rejected: connection limit reached");
            drop(stream);
            continue;
        };

        let store = store.clone();
        tokio::spawn(async move {
            info!("[{peer}] new connection");
            if let Err(e) = session::handle_connection(stream, store, max_frame_bytes).await {
                warn!("[{peer}] session error: {e}");
            }
            info!("[{peer}] closed connection");
            drop(permit);
        });
    }
}
