//! `chatrelay chat`: single-message or interactive tutor chat.
//!
//! Uses the same store and assembler as the gateway, so turns typed here
//! show up in `GET /api/history`.

use chatrelay_agent::ConversationAssembler;
use chatrelay_config::AppConfig;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    let store = chatrelay_history::build_from_config(&config.history);
    let provider = match chatrelay_providers::build_from_config(&config) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!();
            eprintln!("  ERROR: {e}");
            eprintln!();
            eprintln!("  Set one of these environment variables:");
            eprintln!("    OPENAI_API_KEY=sk-...");
            eprintln!("    CHATRELAY_API_KEY=sk-...");
            eprintln!();
            eprintln!("  Or add it to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            return Err(e.into());
        }
    };
    let assembler = ConversationAssembler::from_config(&config, store, provider);

    if let Some(msg) = message {
        let reply = assembler.handle_user_turn(&msg).await?;
        println!("{}", reply.text);
        return Ok(());
    }

    println!("chatrelay tutor (model: {})", assembler.model());
    println!("Type a message and press Enter. `exit` or Ctrl-D quits.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        match assembler.handle_user_turn(line).await {
            Ok(reply) => println!("\ntutor> {}\n", reply.text),
            Err(e) => eprintln!("\n  ❌ {e}\n"),
        }
    }

    Ok(())
}
