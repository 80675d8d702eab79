// Server module entry point
// Accept loop for the static file server

pub mod connection;
pub mod listener;
pub mod request;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::logger;

// Re-export commonly used items
pub use connection::handle_connection;
pub use listener::create_reusable_listener;

/// Bind the configured address and serve until Ctrl-C
pub async fn run(config: Arc<Config>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.get_socket_addr()?;
    let listener = create_reusable_listener(addr, config.server.backlog)?;
    logger::log_server_start(&addr, &config);

    serve(listener, config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::log_error(&format!("Failed to listen for Ctrl-C: {e}"));
            std::future::pending::<()>().await;
        }
    })
    .await;
    Ok(())
}

/// Accept connections on `listener` until `shutdown` completes
///
/// Each connection is handled in its own task. Connections already accepted
/// keep running after shutdown.
pub async fn serve<S>(listener: TcpListener, config: Arc<Config>, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        if config.logging.access_log {
                            logger::log_connection_accepted(&peer_addr);
                        }
                        tokio::spawn(handle_connection(stream, peer_addr, Arc::clone(&config)));
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => {
                logger::log_server_stop();
                return;
            }
        }
    }
}
