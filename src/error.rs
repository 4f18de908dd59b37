/// Everything that can go wrong talking to the Ollama server.
#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    /// Connection refused, DNS failure, timeout.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// Server answered with something other than 200.
    #[error("server returned {status}: {body}")]
    Protocol { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
}
