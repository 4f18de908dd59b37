use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::client::OllamaClient;
use crate::error::OllamaError;
use crate::message::Message;
use crate::observe::Observers;
use crate::protocol::{self, GenerationRequest};
use crate::status::StatusMonitor;

/// Offered in the model picker when the server lists nothing or cannot be asked.
pub const FALLBACK_MODELS: [&str; 3] = ["llama3.2", "llama3", "mistral"];

#[derive(Debug, Default)]
struct SessionState {
    conversation: Vec<Message>,
    busy: bool,
    error_message: Option<String>,
    available_models: Vec<String>,
}

/// The conversation with the local model, one exchange at a time.
#[derive(Clone)]
pub struct ChatSession {
    client: OllamaClient,
    runtime: Handle,
    state: Arc<Mutex<SessionState>>,
    observers: Observers,
}

impl ChatSession {
    pub fn new(client: OllamaClient, runtime: Handle) -> Self {
        Self {
            client,
            runtime,
            state: Arc::default(),
            observers: Observers::default(),
        }
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.observers.subscribe(listener);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state().conversation.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state().busy
    }

    pub fn error_message(&self) -> Option<String> {
        self.state().error_message.clone()
    }

    pub fn available_models(&self) -> Vec<String> {
        self.state().available_models.clone()
    }

    /// Start an exchange: the user's message lands in the log before this returns,
    /// and the request runs on the session's runtime.
    ///
    /// Returns `None` without touching anything when `prompt` is empty or another
    /// exchange is still in flight.
    pub fn send_prompt(&self, prompt: &str, model: &str) -> Option<JoinHandle<()>> {
        if prompt.is_empty() {
            return None;
        }
        {
            let mut state = self.state();
            if state.busy {
                return None;
            }
            state.conversation.push(Message::user(prompt));
            state.busy = true;
            state.error_message = None;
        }
        self.observers.notify();

        let session = self.clone();
        let prompt = prompt.to_string();
        let model = model.to_string();
        Some(self.runtime.spawn(async move {
            let (reply, error) = session.exchange(&prompt, &model).await;
            session.finish(reply, error);
        }))
    }

    /// Run the request and work out the assistant reply plus the error to publish, if any.
    async fn exchange(&self, prompt: &str, model: &str) -> (String, Option<String>) {
        let body = match serde_json::to_vec(&GenerationRequest { model, prompt }) {
            Ok(body) => body,
            Err(e) => {
                let e = OllamaError::Encode(e);
                log::warn!("{}", e);
                let text = "Failed to encode request".to_string();
                return (text.clone(), Some(text));
            }
        };

        match self.client.generate(body).await {
            Ok(raw) => {
                let text = protocol::decode_streaming_reply(&raw);
                if text.is_empty() {
                    (
                        "Received empty response from Ollama. The model might be having issues."
                            .to_string(),
                        None,
                    )
                } else {
                    (text, None)
                }
            }
            Err(OllamaError::Protocol { status, body }) => {
                log::warn!("Server error: {}, {}", status, body);
                (
                    format!("Error: server returned {}: {}", status, body),
                    Some(format!("Server error: {}", status)),
                )
            }
            Err(e) => {
                log::warn!("Error sending prompt: {}", e);
                (
                    format!(
                        "Error: Unable to get a response from Ollama. Please make sure Ollama is running and the model '{}' is available.\n\nTechnical details: {}",
                        model, e
                    ),
                    Some(format!("Request failed: {}", e)),
                )
            }
        }
    }

    fn finish(&self, reply: String, error: Option<String>) {
        {
            let mut state = self.state();
            state.conversation.push(Message::assistant(reply));
            state.error_message = error;
            state.busy = false;
        }
        self.observers.notify();
    }

    /// Refresh the model picker from the server, falling back to [`FALLBACK_MODELS`]
    /// so it is never empty.
    pub async fn fetch_available_models(&self, monitor: &StatusMonitor) -> Vec<String> {
        let mut models = monitor.fetch_model_catalog().await;
        if models.is_empty() {
            models = FALLBACK_MODELS.iter().map(|m| m.to_string()).collect();
        }

        self.state().available_models = models.clone();
        self.observers.notify();
        models
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
