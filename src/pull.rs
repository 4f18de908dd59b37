use std::ffi::OsString;
use std::process::Stdio;

use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    pub success: bool,
    pub message: String,
}

impl PullOutcome {
    fn failed(message: String) -> Self {
        log::warn!("{}", message);
        Self {
            success: false,
            message,
        }
    }
}

/// Downloads models by shelling out to `ollama pull`.
#[derive(Debug, Clone)]
pub struct ModelPuller {
    program: OsString,
}

impl Default for ModelPuller {
    fn default() -> Self {
        Self::with_program("ollama")
    }
}

impl ModelPuller {
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub async fn pull(&self, model: &str) -> PullOutcome {
        let model = model.trim();
        if model.is_empty() {
            return PullOutcome::failed("Failed to pull model: no model name given".to_string());
        }

        log::info!("Pulling model {}", model);
        let output = Command::new(&self.program)
            .arg("pull")
            .arg(model)
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => PullOutcome {
                success: true,
                message: "Model pulled successfully".to_string(),
            },
            Ok(output) => PullOutcome::failed(format!(
                "Failed to pull model: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )),
            Err(e) => PullOutcome::failed(format!("Error executing pull command: {}", e)),
        }
    }
}
