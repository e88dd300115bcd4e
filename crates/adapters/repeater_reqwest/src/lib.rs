//! # motion-adapter-repeater-reqwest
//!
//! Outbound repeater delivery built on [reqwest](https://docs.rs/reqwest).
//!
//! Each trigger results in one plain-HTTP `GET` per configured repeater,
//! with an `Authorization` header when the target carries one. The response
//! body is ignored; only success (2xx) or failure matters, and failures are
//! returned to the controller for logging. Nothing is retried.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `motion-app` and `motion-domain`.

mod config;
mod error;

pub use config::RepeaterConfig;
pub use error::RepeaterError;

use std::time::Duration;

use reqwest::header::AUTHORIZATION;

use motion_app::ports::RepeaterNotifier;
use motion_domain::error::RepeaterDeliveryError;
use motion_domain::sensor::RepeaterTarget;

/// [`RepeaterNotifier`] backed by a shared reqwest [`Client`](reqwest::Client).
#[derive(Debug, Clone)]
pub struct HttpRepeater {
    client: reqwest::Client,
}

impl HttpRepeater {
    /// Build the client with the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`RepeaterError::Client`] if reqwest cannot initialise.
    pub fn new(config: &RepeaterConfig) -> Result<Self, RepeaterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(RepeaterError::Client)?;
        Ok(Self { client })
    }
}

impl RepeaterNotifier for HttpRepeater {
    async fn notify(&self, target: &RepeaterTarget) -> Result<(), RepeaterDeliveryError> {
        let url = target.url();
        let mut request = self.client.get(&url);
        if let Some(auth) = target.auth() {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|err| RepeaterDeliveryError::Transport {
                url: url.clone(),
                source: Box::new(err),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepeaterDeliveryError::Status {
                url,
                status: status.as_u16(),
            });
        }
        tracing::trace!(url = %url, status = status.as_u16(), "repeater answered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use motion_domain::sensor::SensorConfig;

    type Seen = Arc<Mutex<Vec<Option<String>>>>;

    async fn spawn_repeater(status: StatusCode) -> (SocketAddr, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/motion",
                get(
                    move |State(seen): State<Seen>, headers: HeaderMap| async move {
                        let auth = headers
                            .get(AUTHORIZATION)
                            .and_then(|value| value.to_str().ok())
                            .map(str::to_string);
                        seen.lock().unwrap().push(auth);
                        status
                    },
                ),
            )
            .with_state(Arc::clone(&seen));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, seen)
    }

    async fn closed_port() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    fn target(port: u16, auth: Option<&str>) -> RepeaterTarget {
        SensorConfig::builder("Porch", 8080)
            .repeater("127.0.0.1", port, "/motion", auth)
            .build()
            .unwrap()
            .repeaters()[0]
            .clone()
    }

    fn repeater() -> HttpRepeater {
        HttpRepeater::new(&RepeaterConfig {
            timeout_secs: 2,
            ..RepeaterConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn should_succeed_on_2xx() {
        let (addr, seen) = spawn_repeater(StatusCode::OK).await;

        let result = repeater().notify(&target(addr.port(), None)).await;

        assert!(result.is_ok());
        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn should_send_authorization_header_when_configured() {
        let (addr, seen) = spawn_repeater(StatusCode::NO_CONTENT).await;

        repeater()
            .notify(&target(addr.port(), Some("Bearer secret")))
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some("Bearer secret".to_string())]
        );
    }

    #[tokio::test]
    async fn should_report_status_error_on_non_2xx() {
        let (addr, _seen) = spawn_repeater(StatusCode::SERVICE_UNAVAILABLE).await;

        let err = repeater()
            .notify(&target(addr.port(), None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepeaterDeliveryError::Status { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn should_report_transport_error_when_unreachable() {
        let port = closed_port().await;

        let err = repeater().notify(&target(port, None)).await.unwrap_err();

        match err {
            RepeaterDeliveryError::Transport { url, .. } => {
                assert_eq!(url, format!("http://127.0.0.1:{port}/motion"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
