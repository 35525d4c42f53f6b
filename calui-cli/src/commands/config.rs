use anyhow::{Context, Result};
use calui_core::config::CalUiConfig;
use owo_colors::OwoColorize;

pub fn run(config: &CalUiConfig, init: bool) -> Result<()> {
    let config_path = CalUiConfig::config_path().context("Could not locate config file")?;

    if init {
        if config_path.exists() {
            println!("Config already exists at {}", config_path.display());
        } else {
            CalUiConfig::create_default_config(&config_path)?;
            println!("{} {}", "Created".green(), config_path.display());
        }
    }

    let status = if config_path.exists() {
        String::new()
    } else {
        format!(" {}", "(not created, using defaults)".dimmed())
    };

    println!("{}", "Paths".bold());
    println!("  Config:       {}{}", config_path.display(), status);
    println!("{}", "Settings".bold());
    println!("  throttle_ms:  {}", config.throttle_ms);
    println!("  log_level:    {}", config.log_level);

    Ok(())
}
