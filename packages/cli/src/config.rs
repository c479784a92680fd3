use redline_compiler_docx::{DocumentSettings, RevisionMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "redline.config.json";

/// Redline configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory the document is written to
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Output file name inside `out_dir`
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Tracked revisions or visual-only markup
    #[serde(default)]
    pub revision_mode: RevisionMode,

    /// Default tab stop in twips
    #[serde(default = "default_tab_stop")]
    pub default_tab_stop: u32,

    /// Write the conversion-prompt suppression setting
    #[serde(default = "default_true")]
    pub suppress_convert_prompt: bool,
}

fn default_out_dir() -> String {
    "out".to_string()
}

fn default_file_name() -> String {
    "track_changes.docx".to_string()
}

fn default_tab_stop() -> u32 {
    DocumentSettings::default().default_tab_stop
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the default output file
    pub fn get_output_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.out_dir).join(&self.file_name)
    }

    pub fn document_settings(&self) -> DocumentSettings {
        DocumentSettings {
            track_revisions: true,
            suppress_convert_prompt: self.suppress_convert_prompt,
            default_tab_stop: self.default_tab_stop,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            file_name: default_file_name(),
            revision_mode: RevisionMode::default(),
            default_tab_stop: default_tab_stop(),
            suppress_convert_prompt: true,
        }
    }
}
