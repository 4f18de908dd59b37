use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::OllamaClient;
use crate::observe::Observers;

#[derive(Debug, Default)]
struct StatusState {
    reachable: bool,
    catalog: Vec<String>,
    last_error: Option<String>,
}

/// Tracks whether the Ollama server answers and which models it has installed.
#[derive(Clone)]
pub struct StatusMonitor {
    client: OllamaClient,
    state: Arc<Mutex<StatusState>>,
    observers: Observers,
}

impl StatusMonitor {
    pub fn new(client: OllamaClient) -> Self {
        Self {
            client,
            state: Arc::default(),
            observers: Observers::default(),
        }
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.observers.subscribe(listener);
    }

    pub fn is_reachable(&self) -> bool {
        self.state().reachable
    }

    pub fn catalog(&self) -> Vec<String> {
        self.state().catalog.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Probe GET /api/version once. Reachable means exactly a 200 reply.
    pub async fn check_status(&self) -> bool {
        let reachable = match self.client.version().await {
            Ok(version) => {
                log::info!("Ollama server is running: {}", version);
                true
            }
            Err(e) => {
                log::warn!("Ollama server check failed: {}", e);
                false
            }
        };

        self.state().reachable = reachable;
        self.observers.notify();
        reachable
    }

    /// Fetch the model catalog and replace the published one with it.
    ///
    /// Any failure publishes an empty catalog and records why.
    pub async fn fetch_model_catalog(&self) -> Vec<String> {
        let (catalog, error) = match self.client.list_models().await {
            Ok(models) => (models, None),
            Err(e) => {
                log::warn!("Error fetching models: {}", e);
                (Vec::new(), Some(format!("Failed to fetch models: {}", e)))
            }
        };

        {
            let mut state = self.state();
            state.catalog = catalog.clone();
            state.last_error = error;
        }
        self.observers.notify();
        catalog
    }

    /// Whether the server has a model with exactly this name. Leaves published state alone.
    pub async fn check_model_exists(&self, name: &str) -> bool {
        match self.client.list_models().await {
            Ok(models) => models.iter().any(|m| m == name),
            Err(e) => {
                log::debug!("Model lookup for {} failed: {}", name, e);
                false
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, StatusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::OllamaEndpoint;
    use crate::test_support::{serve, unreachable_endpoint};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn monitor(endpoint: OllamaEndpoint) -> StatusMonitor {
        StatusMonitor::new(OllamaClient::new(endpoint))
    }

    fn tags(body: &'static str) -> Router {
        Router::new().route("/api/tags", get(move || async move { body }))
    }

    #[tokio::test]
    async fn status_200_is_reachable_whatever_the_body() {
        let router = Router::new().route("/api/version", get(|| async { "not even json" }));
        let monitor = monitor(serve(router).await);

        assert!(monitor.check_status().await);
        assert!(monitor.is_reachable());
    }

    #[tokio::test]
    async fn non_200_status_is_unreachable() {
        let router = Router::new().route(
            "/api/version",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "{\"version\":\"0.6.0\"}") }),
        );
        let monitor = monitor(serve(router).await);

        assert!(!monitor.check_status().await);
        assert!(!monitor.is_reachable());
    }

    #[tokio::test]
    async fn connection_refused_is_unreachable() {
        let monitor = monitor(unreachable_endpoint());
        assert!(!monitor.check_status().await);
        assert!(!monitor.check_status().await);
    }

    #[tokio::test]
    async fn status_overwrites_previous_value() {
        let router = Router::new().route("/api/version", get(|| async { "{}" }));
        let monitor = monitor(serve(router).await);
        assert!(monitor.check_status().await);

        let down = StatusMonitor {
            client: OllamaClient::new(unreachable_endpoint()),
            ..monitor.clone()
        };
        assert!(!down.check_status().await);
        assert!(!monitor.is_reachable());
    }

    #[tokio::test]
    async fn catalog_names_in_server_order() {
        let monitor = monitor(serve(tags(r#"{"models":[{"name":"b"},{"name":"a"}]}"#)).await);

        assert_eq!(monitor.fetch_model_catalog().await, vec!["b", "a"]);
        assert_eq!(monitor.catalog(), vec!["b", "a"]);
        assert_eq!(monitor.last_error(), None);
    }

    #[tokio::test]
    async fn failed_fetch_replaces_catalog_with_empty() {
        let router = Router::new()
            .route("/api/version", get(|| async { "{}" }))
            .route("/api/tags", get(|| async { r#"{"models":[{"name":"a"}]}"# }));
        let good = monitor(serve(router).await);
        assert_eq!(good.fetch_model_catalog().await, vec!["a"]);

        let broken = StatusMonitor {
            client: OllamaClient::new(serve(tags("garbage")).await),
            ..good.clone()
        };
        assert!(broken.fetch_model_catalog().await.is_empty());
        assert!(good.catalog().is_empty());
        let error = good.last_error().expect("decode error recorded");
        assert!(error.starts_with("Failed to fetch models"));
    }

    #[tokio::test]
    async fn unreachable_catalog_is_empty_with_error() {
        let monitor = monitor(unreachable_endpoint());
        assert!(monitor.fetch_model_catalog().await.is_empty());
        assert!(monitor.last_error().is_some());
    }

    #[tokio::test]
    async fn non_200_catalog_is_empty_with_error() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    r#"{"models":[{"name":"a"}]}"#,
                )
            }),
        );
        let monitor = monitor(serve(router).await);

        assert!(monitor.fetch_model_catalog().await.is_empty());
        assert!(monitor.catalog().is_empty());
        let error = monitor.last_error().expect("status error recorded");
        assert!(error.contains("500"));
    }

    #[tokio::test]
    async fn model_exists_is_exact_match() {
        let monitor =
            monitor(serve(tags(r#"{"models":[{"name":"llama3:latest"},{"name":"mistral"}]}"#)).await);

        assert!(monitor.check_model_exists("mistral").await);
        assert!(monitor.check_model_exists("llama3:latest").await);
        assert!(!monitor.check_model_exists("llama3").await);
        assert!(!monitor.check_model_exists("Mistral").await);
        assert!(monitor.catalog().is_empty());
    }

    #[tokio::test]
    async fn model_exists_false_when_unreachable() {
        assert!(!monitor(unreachable_endpoint()).check_model_exists("mistral").await);
    }

    #[tokio::test]
    async fn observers_hear_about_status_changes() {
        let monitor = monitor(unreachable_endpoint());
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        monitor.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        monitor.check_status().await;
        monitor.fetch_model_catalog().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
