const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 11434;
const API_PREFIX: &str = "api";

/// Address of the local Ollama server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaEndpoint {
    protocol: String,
    host: String,
    port: u16,
}

impl Default for OllamaEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl OllamaEndpoint {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            protocol: "http".to_string(),
            host: host.to_string(),
            port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}/{}", self.protocol, self.host, self.port, API_PREFIX)
    }

    pub fn version_url(&self) -> String {
        self.url_for("version")
    }

    pub fn tags_url(&self) -> String {
        self.url_for("tags")
    }

    pub fn generate_url(&self) -> String {
        self.url_for("generate")
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}
