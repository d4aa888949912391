use anyhow::Result;
use careercal_core::settings::Settings;
use owo_colors::OwoColorize;

pub fn run(settings: &Settings) -> Result<()> {
    let config_path = Settings::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Events:  {}", settings.events_path().display());
    println!();
    println!("{}", "Settings".bold());
    for line in settings.to_toml()?.lines().filter(|l| !l.is_empty()) {
        println!("  {}", line);
    }

    Ok(())
}
