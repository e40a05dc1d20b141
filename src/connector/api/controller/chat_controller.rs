use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::application::{ChatObserver, SubmitOutcome};
use crate::connector::TerminalView;

use super::super::Container;

const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Read lines from stdin and submit each one until EOF or `/quit`.
    pub async fn chat(&self, relay_url: String) -> Result<String> {
        let view = Arc::new(TerminalView::stdout());
        let session = self
            .container
            .chat_session(&relay_url, Arc::clone(&view) as Arc<dyn ChatObserver>);

        view.render_history(&session.messages().await);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut exchanges = 0usize;
        while let Some(line) = lines.next_line().await? {
            if QUIT_COMMANDS.contains(&line.trim()) {
                break;
            }
            match session.submit(&line).await {
                SubmitOutcome::Ignored => {}
                SubmitOutcome::Busy => debug!("Submission ignored while a reply is streaming"),
                SubmitOutcome::Completed { .. } | SubmitOutcome::Failed { .. } => exchanges += 1,
            }
        }

        Ok(format!("Chat ended after {exchanges} exchange(s)."))
    }
}
