//! CLChat command line interface.
//!
//! `clchat listen [PORT]` waits for one peer; `clchat connect [PORT]`
//! dials it. The connecting side speaks first, then the two alternate
//! until someone types `quit`.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clchat::prelude::*;
use clchat::session::ConversationEngine;
use clchat::transport::TcpLineConnection;
use clchat::DEFAULT_HOST;
use tracing_subscriber::EnvFilter;

/// CLChat - two-peer, turn-taking chat over TCP
#[derive(Parser)]
#[command(name = "clchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for one peer to connect; they send the first message
    Listen {
        /// Port to listen on (1076-65534)
        #[arg(default_value_t = Port::default(), allow_negative_numbers = true)]
        port: Port,
    },

    /// Connect to a listening peer and send the first message
    Connect {
        /// Port the peer listens on (1076-65534)
        #[arg(default_value_t = Port::default(), allow_negative_numbers = true)]
        port: Port,

        /// Host the peer runs on
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
    },
}

impl Commands {
    fn into_parts(self) -> (Role, ChatConfig) {
        match self {
            Self::Listen { port } => (
                Role::Responder,
                ChatConfig {
                    port,
                    ..ChatConfig::default()
                },
            ),
            Self::Connect { port, host } => (
                Role::Initiator,
                ChatConfig {
                    port,
                    host,
                    ..ChatConfig::default()
                },
            ),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (role, config) = cli.command.into_parts();

    let engine = match open(role, &config).await {
        Ok(engine) => engine,
        Err(e) => {
            println!("An error occurred while opening the connection");
            println!("{e}");
            return ExitCode::SUCCESS;
        }
    };

    match role {
        Role::Initiator => println!("Connected. You can send your first message"),
        Role::Responder => println!("Connected. Waiting for the first message"),
    }
    println!("Note: enter '{QUIT_COMMAND}' to end the program\n");

    let mut console = StdConsole::new();
    match converse(engine, &mut console).await {
        Ok(CloseReason::RemoteClose) => {
            println!("Connection closed at other end.");
            ExitCode::SUCCESS
        }
        Ok(_) => {
            println!("Connection closed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Sorry, an error occurred. Connection lost.");
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Dials or listens depending on the role, then verifies the peer.
async fn open(
    role: Role,
    config: &ChatConfig,
) -> Result<ConversationEngine<TcpLineConnection>, ClChatError> {
    match role {
        Role::Initiator => Initiator::from_config(config).connect().await,
        Role::Responder => {
            let responder = Responder::from_config(config).await?;
            println!("Listening on port {}...", config.port);
            responder.accept().await
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
