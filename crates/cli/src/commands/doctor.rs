//! `chatrelay doctor`: diagnose configuration and history health.

use chatrelay_config::AppConfig;
use chatrelay_core::history::LoadOutcome;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 chatrelay doctor");
    println!("===================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file, using defaults (run `chatrelay onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running other checks.");
            return Ok(());
        }
    };

    match chatrelay_providers::build_from_config(&config) {
        Ok(provider) => {
            println!(
                "  ✅ Provider configured: {} / {}",
                provider.name(),
                config.default_model
            );
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider reachable"),
                Ok(false) => {
                    println!("  ⚠️  Provider answered but rejected the request (check the API key)");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider unreachable: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Provider not usable: {e}");
            issues += 1;
        }
    }

    let store = chatrelay_history::build_from_config(&config.history);
    match store.load_outcome().await {
        LoadOutcome::Missing => println!(
            "  ✅ History: nothing stored yet ({})",
            config.history.path.display()
        ),
        LoadOutcome::Loaded(history) => println!(
            "  ✅ History: {} of {} messages ({})",
            history.len(),
            store.max_length(),
            config.history.path.display()
        ),
        LoadOutcome::Corrupt { reason } => {
            println!("  ❌ History file unreadable, it will be treated as empty: {reason}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
