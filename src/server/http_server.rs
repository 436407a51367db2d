//! TCP front end: accept connections and feed them to the dispatcher.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

use crate::server::config::ServerConfig;
use crate::server::dispatcher::Dispatcher;
use crate::server::error::Error;
use crate::server::handler::ErrorHandler;
use crate::server::router::Router;

/// Sent when every connection slot is taken. 503 is outside the dispatcher's status
/// table, so this response is written out by hand.
const AT_CAPACITY_RESPONSE: &[u8] = b"HTTP/1.1 503 Service Unavailable\r\n\
Content-Type: text/plain\r\n\
Content-Length: 45\r\n\
Connection: close\r\n\
\r\n\
Server is at capacity, please try again later";

/// An HTTP server.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    dispatcher: Dispatcher,
}

impl HttpServer {
    /// Create a server for a fully registered `router`.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(router),
        }
    }

    /// Replace the default error handler.
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.dispatcher = self.dispatcher.with_error_handler(handler);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Log the registered endpoints and middleware.
    fn display_server_info(&self) {
        let router = self.dispatcher.router();
        info!("Registered endpoints:");
        for route in router.registered_routes() {
            info!("  {} {}", route.method, route.path);
        }
        info!("Global middleware: {}", router.middleware().len());
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    ///
    /// The watcher runs outside the connection set so that shutdown only waits for
    /// connections.
    pub(crate) fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        })
    }

    /// Spawn a task for a newly accepted connection, or turn it away when at capacity.
    async fn handle_new_connection(
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        dispatcher: Arc<Dispatcher>,
        read_buffer_size: usize,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let _ = socket.write_all(AT_CAPACITY_RESPONSE).await;
                let _ = socket.shutdown().await;
                return;
            }
        };

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, &dispatcher, read_buffer_size).await {
                error!("Error handling connection from {addr}: {e}");
            }
        });
    }

    /// Handle connection errors.
    async fn handle_connection_error(e: std::io::Error) -> bool {
        error!("Error accepting connection: {e}");

        if e.kind() == std::io::ErrorKind::BrokenPipe {
            error!("Critical error accepting connection, shutting down");
            return true;
        }

        // For other errors, wait a bit before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        false
    }

    /// Perform graceful shutdown.
    pub(crate) async fn perform_shutdown(tasks: &mut JoinSet<()>, signal_watcher: JoinHandle<()>) {
        signal_watcher.abort();
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let _ = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        info!("Server shutdown complete");
    }

    /// Start the server and listen for incoming connections until Ctrl+C.
    pub async fn start(self) -> Result<(), Error> {
        self.display_server_info();

        let listener = self.setup_listener().await?;
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let dispatcher = Arc::new(self.dispatcher);

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let mut tasks = JoinSet::new();
        let signal_watcher = Self::setup_ctrl_c_handler(shutdown_tx);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            Self::handle_new_connection(
                                socket,
                                addr,
                                semaphore.clone(),
                                dispatcher.clone(),
                                self.config.read_buffer_size,
                                &mut tasks,
                            ).await;
                        },
                        Err(e) => {
                            if Self::handle_connection_error(e).await {
                                break;
                            }
                        }
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks, signal_watcher).await;

        Ok(())
    }

    /// Handle a single connection: read one request, write one dispatched response, then
    /// close.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        dispatcher: &Dispatcher,
        read_buffer_size: usize,
    ) -> Result<(), Error> {
        let request = Self::read_request(socket, read_buffer_size).await?;
        if request.is_empty() {
            debug!("Connection closed before sending a request");
            return Ok(());
        }

        let response = dispatcher.dispatch(&request).await;
        socket.write_all(&response).await?;
        socket.shutdown().await?;

        Ok(())
    }

    /// Read one request. The first read is expected to hold the whole head; when it
    /// announces a `Content-Length`, reading continues until the body is complete or the
    /// peer stops sending.
    async fn read_request(
        socket: &mut (impl AsyncRead + Unpin),
        read_buffer_size: usize,
    ) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0; read_buffer_size];
        let n = socket.read(&mut buf).await?;
        buf.truncate(n);

        let Some(expected) = message_length(&buf) else {
            if n == read_buffer_size {
                warn!("Request filled the {read_buffer_size}-byte read buffer and may be truncated");
            }
            return Ok(buf);
        };

        let mut chunk = vec![0; read_buffer_size];
        while buf.len() < expected {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                warn!("Connection closed after {} of {expected} request bytes", buf.len());
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        Ok(buf)
    }
}

/// Total length announced by a complete head in `buf`: the head, the blank line and the
/// `Content-Length` body bytes.
fn message_length(buf: &[u8]) -> Option<usize> {
    let head_end = buf.windows(4).position(|window| window == b"\r\n\r\n")? + 4;
    let head = std::str::from_utf8(&buf[..head_end]).ok()?;

    let body_length = head.split("\r\n").skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.eq_ignore_ascii_case("Content-Length") {
            return None;
        }
        value.trim().parse::<usize>().ok()
    })?;

    Some(head_end + body_length)
}
