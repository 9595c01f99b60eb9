//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use apo_core::models::config::ApoConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Get a configuration value by dotted key (e.g. "scan.ean13_heuristic")
    Get { key: String },

    /// Set a configuration value; JSON literals are parsed, anything else is a string
    Set { key: String, value: String },

    /// Show configuration file path
    Path,
}

/// Run a config subcommand against `--config` or the default location.
pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                eprintln!("{} No config file found, showing defaults.", style("ℹ").blue());
            }
            let config = load_or_default(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            save(&path, &ApoConfig::default())?;
            println!(
                "{} Created configuration file at {}",
                style("✓").green(),
                path.display()
            );
        }
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(load_or_default(&path)?)?;
            let value = lookup(&json, &key)
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let mut json = serde_json::to_value(load_or_default(&path)?)?;
            assign(&mut json, &key, value.clone())?;

            // Round-trip through the typed config to reject wrong value types
            let config: ApoConfig = serde_json::from_value(json)
                .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
            save(&path, &config)?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
        }
        ConfigCommand::Path => {
            println!("Configuration file: {}", path.display());
            if path.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!();
                println!("Run 'apo config init' to create a configuration file.");
            }
        }
    }

    Ok(())
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("apo")
        .join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<ApoConfig> {
    if path.exists() {
        Ok(ApoConfig::from_file(path)?)
    } else {
        Ok(ApoConfig::default())
    }
}

fn save(path: &Path, config: &ApoConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |node, part| node.get(part))
}

/// Set a dotted key; intermediate objects must exist, the leaf may be new.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parent_key, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };

    let mut parent = json;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            parent = parent
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    let object = parent
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set value at non-object path: {}", key))?;
    object.insert(leaf.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup() {
        let json = serde_json::to_value(ApoConfig::default()).unwrap();
        assert_eq!(lookup(&json, "scan.ean13_heuristic"), Some(&json!(true)));
        assert_eq!(lookup(&json, "manifest.max_input_bytes"), Some(&json!(4194304)));
        assert_eq!(lookup(&json, "scan.nope"), None);
    }

    #[test]
    fn test_assign_nested_override() {
        let mut json = serde_json::to_value(ApoConfig::default()).unwrap();
        assign(&mut json, "manifest.patterns.tour_name", json!("Tour:\\s*(.+)")).unwrap();

        let config: ApoConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.manifest.patterns.tour_name.as_deref(), Some("Tour:\\s*(.+)"));
    }

    #[test]
    fn test_assign_rejects_missing_path() {
        let mut json = serde_json::to_value(ApoConfig::default()).unwrap();
        assert!(assign(&mut json, "ocr.threshold", json!(1)).is_err());
        assert!(assign(&mut json, "scan.ean13_heuristic.x", json!(1)).is_err());
    }
}
