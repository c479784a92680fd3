use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

/// Write a default config into `cwd`. An existing config is only
/// replaced with `--force`.
pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        bail!(
            "{} already exists. Use --force to overwrite",
            DEFAULT_CONFIG_NAME
        );
    }

    let config_json = serde_json::to_string_pretty(&Config::default())?;
    fs::write(&config_path, config_json)?;

    eprintln!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();

        init(InitArgs { force: false }, cwd).unwrap();

        let content = fs::read_to_string(dir.path().join(DEFAULT_CONFIG_NAME)).unwrap();
        assert!(content.contains("\"outDir\": \"out\""));
        assert!(content.contains("\"revisionMode\": \"tracked\""));

        let config = Config::load(cwd).unwrap();
        assert_eq!(config.file_name, "track_changes.docx");
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        let config_path = dir.path().join(DEFAULT_CONFIG_NAME);
        fs::write(&config_path, r#"{ "outDir": "mine" }"#).unwrap();

        let err = init(InitArgs { force: false }, cwd).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(Config::load(cwd).unwrap().out_dir, "mine");

        init(InitArgs { force: true }, cwd).unwrap();
        assert_eq!(Config::load(cwd).unwrap().out_dir, "out");
    }
}
