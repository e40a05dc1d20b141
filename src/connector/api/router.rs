use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{ChatController, ServeController};

pub struct Router<'a> {
    serve_controller: ServeController<'a>,
    chat_controller: ChatController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            serve_controller: ServeController::new(container),
            chat_controller: ChatController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Serve { host, port } => self.serve_controller.serve(host, port).await,
            Commands::Chat { relay_url } => self.chat_controller.chat(relay_url).await,
        }
    }
}
