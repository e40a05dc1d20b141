use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::application::{ChatObserver, ChatSession, CompletionProvider, RelayChatUseCase};
use crate::connector::{
    HttpRelayTransport, OpenAiCompletionProvider, ScriptedCompletionProvider, SystemClock,
};
use crate::domain::SystemInstruction;

pub struct ContainerConfig {
    /// Serve canned replies instead of calling a hosted provider.
    pub mock_provider: bool,
    /// Replace the built-in support prompt with the contents of this file.
    pub system_prompt_file: Option<String>,
}

pub struct Container {
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    pub fn system_instruction(&self) -> Result<SystemInstruction> {
        match self.config.system_prompt_file.as_deref() {
            Some(path) => {
                debug!("Loading system instruction from {}", path);
                SystemInstruction::from_file(path)
                    .with_context(|| format!("failed to load system instruction from {path}"))
            }
            None => Ok(SystemInstruction::default()),
        }
    }

    pub fn completion_provider(&self) -> Result<Arc<dyn CompletionProvider>> {
        if self.config.mock_provider {
            info!("Using mock completion provider");
            return Ok(Arc::new(ScriptedCompletionProvider::demo()));
        }

        let provider = OpenAiCompletionProvider::from_env()
            .context("OPENAI_API_KEY is not set (use --mock-provider to run offline)")?;
        info!(
            "Using completion provider at {} with model {}",
            provider.url(),
            provider.model()
        );
        Ok(Arc::new(provider))
    }

    pub fn relay_use_case(&self) -> Result<RelayChatUseCase> {
        Ok(RelayChatUseCase::new(
            self.completion_provider()?,
            self.system_instruction()?,
        ))
    }

    pub fn chat_session(&self, relay_url: &str, observer: Arc<dyn ChatObserver>) -> ChatSession {
        ChatSession::new(
            Arc::new(HttpRelayTransport::new(relay_url)),
            Arc::new(SystemClock),
        )
        .with_observer(observer)
    }
}
