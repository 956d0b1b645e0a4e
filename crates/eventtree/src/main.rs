mod chat; // Sample events and listener

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eventtree_core::{Delivery, DispatchConfig, Event, EventManager, Registration};
use log::{error, info};

use chat::{ChatListener, PlayerChatEvent, listener_enabled};

/// Messages published when no subcommand is given
const DEMO_MESSAGES: [(&str, &str); 3] = [
    ("Peter", "windows is bad"),
    ("Kevin", "Get yourself an Apple MacBook"),
    ("Karl", "linux is complicated"),
];

/// Eventtree: priority-ordered in-process event dispatch
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Dispatch configuration file (.json, .yaml or .toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also deliver events to handlers of their supertypes
    #[arg(long)]
    super_listeners: bool,

    /// Register the sample listener as a bare type instead of an instance
    #[arg(long)]
    as_type: bool,

    /// Disable the sample listener; only its call-always handlers run
    #[arg(long)]
    muted: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish one chat message
    Chat {
        /// Player writing the message
        sender: String,
        message: String,
    },
    /// Print the registered event tree
    Tree,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = env_logger::try_init() {
        eprintln!("Failed to initialize env_logger: {}", e);
    }

    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let mut config = match &args.config {
        Some(path) => match DispatchConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Could not load dispatch configuration: {}", e);
                eprintln!("Failed to load configuration: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => DispatchConfig::default(),
    };
    if args.super_listeners {
        config.allow_super_listeners = true;
    }

    let listener = Arc::new(ChatListener::new(!args.muted));
    let manager = EventManager::from_config(&config, listener_enabled);

    let registration = if args.as_type {
        Registration::of_type::<ChatListener>(ChatListener::handlers())
    } else {
        Registration::instance(Arc::clone(&listener), ChatListener::handlers())
    };
    match manager.register_event(registration) {
        Ok(report) => {
            for rejected in &report.rejected {
                eprintln!("Skipped handler: {}", rejected);
            }
        }
        Err(e) => {
            eprintln!("Failed to register listener: {}", e);
            return ExitCode::FAILURE;
        }
    }
    if let Err(e) = manager.sort_events() {
        eprintln!("Failed to sort handlers: {}", e);
        return ExitCode::FAILURE;
    }

    match args.command {
        Some(Commands::Tree) => println!("{}", manager.snapshot()),
        Some(Commands::Chat { sender, message }) => chat(&manager, &sender, &message),
        None => {
            println!("{}", manager.snapshot());
            println!();
            for (sender, message) in DEMO_MESSAGES {
                chat(&manager, sender, message);
            }
        }
    }

    info!("{} chat message(s) counted", listener.seen());
    ExitCode::SUCCESS
}

fn chat(manager: &EventManager<ChatListener>, sender: &str, message: &str) {
    match manager.call(PlayerChatEvent::new(sender, message)) {
        Delivery::Completed(event) | Delivery::Interrupted(event) => {
            if event.is_canceled() {
                info!("Message from {} was canceled", event.sender());
            } else {
                println!("{} -> {}", event.sender(), event.message());
            }
        }
        Delivery::Spawned => info!("Message from {} handed to the executor", sender),
    }
}
