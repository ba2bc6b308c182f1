//! chatpane CLI: terminal chat client

mod logging;

use chatpane_engine::{invoke_responder, load_transcript, ChatContext, ChatMessage, Config};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Chat in the terminal with a pluggable responder
#[derive(Parser)]
#[command(name = "chatpane")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: .chatpane/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSONL transcript to start from
    #[arg(long, global = true)]
    transcript: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Initialize .chatpane/ directory and config
    Init,

    /// Send one message and print the reply
    Ask {
        /// The message
        message: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    logging::init(interactive);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(&cwd));

    match cli.command {
        None | Some(Commands::Tui) => {
            let config = Config::load_or_default(&config_path)?;
            let history = read_history(cli.transcript.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(chatpane_tui::run_tui(config, history))
        }
        Some(Commands::Init) => cmd_init(&config_path),
        Some(Commands::Ask { message }) => {
            let config = Config::load_or_default(&config_path)?;
            let history = read_history(cli.transcript.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(cmd_ask(&config, history, &message))
        }
    }
}

fn read_history(path: Option<&Path>) -> Result<Vec<ChatMessage>, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let messages = load_transcript(path)?;
    debug!(path = %path.display(), messages = messages.len(), "transcript loaded");
    Ok(messages)
}

fn cmd_init(config_path: &Path) -> Result<(), Box<dyn Error>> {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    Config::default().save(config_path)?;
    info!(path = %config_path.display(), "config created");

    println!("Created {}", config_path.display());
    println!();
    println!("The default responder echoes messages. Set \"responder\" to a command, e.g.:");
    println!("  {{\"kind\": \"command\", \"command_argv\": [\"my-bot\", \"--stdin\"]}}");
    Ok(())
}

async fn cmd_ask(
    config: &Config,
    history: Vec<ChatMessage>,
    message: &str,
) -> Result<(), Box<dyn Error>> {
    if message.trim().is_empty() {
        return Err("message is empty".into());
    }

    let prompt = ChatContext::from_messages(history).build_prompt(
        &config.system_prompt,
        config.history_window,
        message,
    );
    let reply = invoke_responder(&config.responder, &prompt, config.request_timeout_seconds).await?;

    println!("{}", reply.content);
    if !reply.citations.is_empty() {
        println!();
        println!("Sources:");
        for (i, citation) in reply.citations.iter().enumerate() {
            println!("  [{}] {}", i + 1, citation.source);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_tui() {
        let cli = Cli::try_parse_from(["chatpane"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "chatpane",
            "ask",
            "hello there",
            "--config",
            "c.json",
            "--transcript",
            "t.jsonl",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Ask { ref message }) if message == "hello there"));
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert_eq!(cli.transcript, Some(PathBuf::from("t.jsonl")));
    }

    #[test]
    fn test_init_writes_default_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::default_path(dir.path());

        cmd_init(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        std::fs::write(&path, "{\"history_window\": 2}").unwrap();
        cmd_init(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap().history_window, 2);
    }

    #[test]
    fn test_read_history_without_path() {
        assert!(read_history(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ask_rejects_empty_message() {
        let err = cmd_ask(&Config::default(), Vec::new(), "  ").await.unwrap_err();
        assert_eq!(err.to_string(), "message is empty");
    }
}
