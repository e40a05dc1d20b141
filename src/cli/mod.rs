use clap::Subcommand;

use crate::connector::DEFAULT_RELAY_URL;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay HTTP server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Chat with a running relay from the terminal
    Chat {
        /// Relay endpoint to post conversations to
        #[arg(long, default_value = DEFAULT_RELAY_URL)]
        relay_url: String,
    },
}
