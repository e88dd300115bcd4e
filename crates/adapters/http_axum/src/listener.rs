//! Trigger listener lifecycle: bind, serve, stop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use motion_app::ports::TriggerHandler;
use motion_domain::error::BindError;

/// How long [`TriggerListener::stop`] waits for in-flight requests before
/// aborting the server task.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A bound, serving trigger endpoint.
///
/// The socket is owned by the background server task. It is released when
/// [`stop`](Self::stop) completes, when the handler's shutdown signal fires,
/// or when the listener is dropped.
pub struct TriggerListener {
    local_addr: SocketAddr,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TriggerListener {
    /// Bind `addr` and start serving triggers to `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] when the address is invalid for this host or
    /// the port is already in use.
    pub async fn start<T: TriggerHandler>(
        addr: SocketAddr,
        handler: Arc<T>,
    ) -> Result<Self, BindError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BindError { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| BindError { addr, source })?;

        let mut handler_stopped = handler.shutdown_signal();
        let app = crate::router::build(handler);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let signal = async move {
                tokio::select! {
                    _ = stop_rx => {}
                    _ = handler_stopped.wait_for(|stopped| *stopped) => {}
                }
            };
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
            {
                tracing::error!(addr = %local_addr, error = %err, "trigger listener failed");
            }
            tracing::debug!(addr = %local_addr, "trigger listener socket closed");
        });

        tracing::info!(addr = %local_addr, "trigger listener bound");

        Ok(Self {
            local_addr,
            stop_tx: Some(stop_tx),
            task: Some(task),
        })
    }

    /// The address actually bound (resolves port `0`).
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether the server task is still accepting connections.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop accepting connections and wait until the socket is released.
    ///
    /// In-flight requests get [`SHUTDOWN_GRACE`] to finish. Calling this
    /// more than once is a no-op.
    pub async fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The task may already be gone after a handler shutdown.
            let _ = stop_tx.send(());
        }
        let Some(mut task) = self.task.take() else {
            return;
        };
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
            tracing::warn!(addr = %self.local_addr, "graceful stop timed out, aborting");
            task.abort();
            let _ = task.await;
        }
        tracing::info!(addr = %self.local_addr, "trigger listener stopped");
    }
}

impl Drop for TriggerListener {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::watch;

    struct CountingHandler {
        triggers: AtomicUsize,
        shutdown: watch::Sender<bool>,
    }

    impl CountingHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                triggers: AtomicUsize::new(0),
                shutdown: watch::channel(false).0,
            })
        }
    }

    impl TriggerHandler for CountingHandler {
        fn handle_trigger(&self) {
            self.triggers.fetch_add(1, Ordering::SeqCst);
        }

        fn shutdown_signal(&self) -> watch::Receiver<bool> {
            self.shutdown.subscribe()
        }
    }

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    async fn raw_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: sensor\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn should_serve_triggers_on_bound_port() {
        let handler = CountingHandler::new();
        let mut listener = TriggerListener::start(loopback(), Arc::clone(&handler))
            .await
            .unwrap();
        assert!(listener.is_running());
        assert_ne!(listener.local_addr().port(), 0);

        let response = raw_get(listener.local_addr(), "/motion").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("Successfully requested: /motion"));
        assert_eq!(handler.triggers.load(Ordering::SeqCst), 1);

        listener.stop().await;
    }

    #[tokio::test]
    async fn should_fail_with_bind_error_when_port_in_use() {
        let mut first = TriggerListener::start(loopback(), CountingHandler::new())
            .await
            .unwrap();
        let taken = first.local_addr();

        let err = TriggerListener::start(taken, CountingHandler::new())
            .await
            .err()
            .unwrap();
        assert_eq!(err.addr, taken);
        assert_eq!(err.source.kind(), std::io::ErrorKind::AddrInUse);

        first.stop().await;
    }

    #[tokio::test]
    async fn should_release_port_on_stop() {
        let mut listener = TriggerListener::start(loopback(), CountingHandler::new())
            .await
            .unwrap();
        let addr = listener.local_addr();

        listener.stop().await;
        assert!(!listener.is_running());

        let mut again = TriggerListener::start(addr, CountingHandler::new())
            .await
            .unwrap();
        assert_eq!(again.local_addr(), addr);
        again.stop().await;
    }

    #[tokio::test]
    async fn should_be_idempotent_on_stop() {
        let mut listener = TriggerListener::start(loopback(), CountingHandler::new())
            .await
            .unwrap();
        listener.stop().await;
        listener.stop().await;
        assert!(!listener.is_running());
    }

    #[tokio::test]
    async fn should_stop_when_handler_shuts_down() {
        let handler = CountingHandler::new();
        let mut listener = TriggerListener::start(loopback(), Arc::clone(&handler))
            .await
            .unwrap();
        let addr = listener.local_addr();

        handler.shutdown.send_replace(true);
        tokio::time::timeout(Duration::from_secs(5), async {
            while listener.is_running() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let mut again = TriggerListener::start(addr, CountingHandler::new())
            .await
            .unwrap();
        again.stop().await;
        listener.stop().await;
    }

    #[tokio::test]
    async fn should_release_port_on_drop() {
        let listener = TriggerListener::start(loopback(), CountingHandler::new())
            .await
            .unwrap();
        let addr = listener.local_addr();
        drop(listener);

        let rebound = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match TriggerListener::start(addr, CountingHandler::new()).await {
                    Ok(listener) => return listener,
                    Err(_) => tokio::time::sleep(Duration::from_millis(10)).await,
                }
            }
        })
        .await
        .unwrap();
        drop(rebound);
    }
}
