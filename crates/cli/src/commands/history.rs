//! `chatrelay history`: inspect or clear the stored conversation.

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = chatrelay_history::build_from_config(&config.history);

    let history = store.load().await;
    if history.is_empty() {
        println!("No messages stored.");
        return Ok(());
    }

    println!("🗂  {} of at most {} messages", history.len(), store.max_length());
    println!();
    for message in &history {
        println!(
            "  [{}] {:>9}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M:%S"),
            message.sender.as_str(),
            message.text
        );
    }

    Ok(())
}

pub async fn clear(confirm: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm {
        println!("⚠️  This will delete the stored conversation permanently.");
        println!("   Run with --confirm to proceed:");
        println!("   chatrelay history clear --confirm");
        return Ok(());
    }

    let config = super::load_config()?;
    let store = chatrelay_history::build_from_config(&config.history);

    if store.clear().await {
        println!("✅ History cleared");
        Ok(())
    } else {
        Err(format!("Failed to clear history at {}", config.history.path.display()).into())
    }
}
