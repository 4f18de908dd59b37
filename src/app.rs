use poll_promise::Promise;
use std::path::PathBuf;
use tokio::runtime::Handle;

use crate::client::OllamaClient;
use crate::endpoint::OllamaEndpoint;
use crate::prefs::Preferences;
use crate::pull::{ModelPuller, PullOutcome};
use crate::session::ChatSession;
use crate::status::StatusMonitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsTab {
    General,
    Advanced,
    About,
}

pub struct ChatApp {
    pub session: ChatSession,
    pub monitor: StatusMonitor,
    pub puller: ModelPuller,
    pub endpoint: OllamaEndpoint,
    pub runtime: Handle,
    pub prefs: Preferences,
    pub prefs_path: Option<PathBuf>,
    pub input: String,
    pub selected_model: String,
    pub pending_models: Option<Promise<Vec<String>>>,
    pub pull_input: String,
    pub pending_pull: Option<Promise<PullOutcome>>,
    pub last_pull: Option<PullOutcome>,
    pub pending_lookup: Option<Promise<(String, bool)>>,
    pub last_lookup: Option<(String, bool)>,
    pub show_settings: bool,
    pub active_settings_tab: SettingsTab,
}

impl ChatApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Handle,
        prefs: Preferences,
        prefs_path: Option<PathBuf>,
    ) -> Self {
        let endpoint = OllamaEndpoint::default();
        let client = OllamaClient::new(endpoint.clone());
        let session = ChatSession::new(client.clone(), runtime.clone());
        let monitor = StatusMonitor::new(client);

        let ctx = cc.egui_ctx.clone();
        session.subscribe(move || ctx.request_repaint());
        let ctx = cc.egui_ctx.clone();
        monitor.subscribe(move || ctx.request_repaint());

        let mut app = Self {
            session,
            monitor,
            puller: ModelPuller::default(),
            endpoint,
            runtime,
            prefs,
            prefs_path,
            input: String::new(),
            selected_model: String::new(),
            pending_models: None,
            pull_input: String::new(),
            pending_pull: None,
            last_pull: None,
            pending_lookup: None,
            last_lookup: None,
            show_settings: false,
            active_settings_tab: SettingsTab::General,
        };
        app.check_status();
        app.refresh_models();
        app
    }

    pub fn check_status(&self) {
        let monitor = self.monitor.clone();
        self.runtime.spawn(async move {
            monitor.check_status().await;
        });
    }

    pub fn refresh_models(&mut self) {
        if self.pending_models.is_some() {
            return;
        }
        let session = self.session.clone();
        let monitor = self.monitor.clone();
        let runtime = self.runtime.clone();
        self.pending_models = Some(Promise::spawn_thread("refresh_models", move || {
            runtime.block_on(async move { session.fetch_available_models(&monitor).await })
        }));
    }

    pub fn pull_model(&mut self) {
        if self.pending_pull.is_some() {
            return;
        }
        let name = self.pull_input.trim().to_string();
        let puller = self.puller.clone();
        let runtime = self.runtime.clone();
        self.last_pull = None;
        self.pending_pull = Some(Promise::spawn_thread("pull_model", move || {
            runtime.block_on(async move { puller.pull(&name).await })
        }));
    }

    pub fn lookup_model(&mut self) {
        if self.pending_lookup.is_some() {
            return;
        }
        let name = self.pull_input.trim().to_string();
        let monitor = self.monitor.clone();
        let runtime = self.runtime.clone();
        self.last_lookup = None;
        self.pending_lookup = Some(Promise::spawn_thread("lookup_model", move || {
            runtime.block_on(async move {
                let exists = monitor.check_model_exists(&name).await;
                (name, exists)
            })
        }));
    }

    /// Submission is only offered while the server answers and nothing is in flight.
    pub fn can_send(&self) -> bool {
        !submitted_prompt(&self.input).is_empty()
            && !self.selected_model.is_empty()
            && !self.session.is_busy()
            && self.monitor.is_reachable()
    }

    pub fn send_message(&mut self) {
        if !self.can_send() {
            return;
        }
        let input = std::mem::take(&mut self.input);
        self.session
            .send_prompt(submitted_prompt(&input), &self.selected_model);
    }

    pub fn save_prefs(&self) {
        let Some(path) = &self.prefs_path else {
            return;
        };
        if let Err(e) = self.prefs.save(path) {
            log::warn!("Failed to save preferences: {:#}", e);
        }
    }

    /// Pick up finished background work.
    pub fn poll_background(&mut self) {
        if let Some(models) = self.pending_models.as_ref().and_then(|p| p.ready()) {
            if !models.contains(&self.selected_model) {
                self.selected_model = models.first().cloned().unwrap_or_default();
            }
            self.pending_models = None;
        }

        if let Some(outcome) = self.pending_pull.as_ref().and_then(|p| p.ready()) {
            let pulled = outcome.success;
            self.last_pull = Some(outcome.clone());
            self.pending_pull = None;
            if pulled {
                self.refresh_models();
            }
        }

        if let Some(lookup) = self.pending_lookup.as_ref().and_then(|p| p.ready()) {
            self.last_lookup = Some(lookup.clone());
            self.pending_lookup = None;
        }
    }
}

/// The prompt as typed, minus the newline the Enter key leaves behind.
fn submitted_prompt(input: &str) -> &str {
    input
        .strip_suffix("\r\n")
        .or_else(|| input.strip_suffix('\n'))
        .unwrap_or(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_newline_is_dropped() {
        assert_eq!(submitted_prompt("What is 2+2?\n"), "What is 2+2?");
        assert_eq!(submitted_prompt("hi\r\n"), "hi");
        assert_eq!(submitted_prompt("\n"), "");
    }

    #[test]
    fn everything_else_is_kept_as_typed() {
        assert_eq!(submitted_prompt("  indented\n\nlast line "), "  indented\n\nlast line ");
        assert_eq!(submitted_prompt("two\n\n"), "two\n");
        assert_eq!(submitted_prompt("   "), "   ");
    }
}
