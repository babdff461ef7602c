//! `chatrelay serve`: start the HTTP gateway.

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("chatrelay gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   History:   {} (max {})", config.history.path.display(), config.history.max_length);

    chatrelay_gateway::start(config).await?;

    Ok(())
}
