//! In-process fake Ollama server for tests.

use axum::Router;

use crate::endpoint::OllamaEndpoint;

pub async fn serve(router: Router) -> OllamaEndpoint {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake ollama");
    let port = listener.local_addr().expect("local_addr").port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    OllamaEndpoint::new("127.0.0.1", port)
}

/// An endpoint on a port nothing is listening on.
pub fn unreachable_endpoint() -> OllamaEndpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    drop(listener);
    OllamaEndpoint::new("127.0.0.1", port)
}
