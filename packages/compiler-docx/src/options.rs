use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How edits are rendered in the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionMode {
    /// Real `w:ins`/`w:del` revisions; an edit that cannot be attached falls
    /// back to visual rendering on its own
    #[default]
    Tracked,
    /// Highlight and strike-through only, never a revision
    Visual,
}

impl FromStr for RevisionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tracked" => Ok(RevisionMode::Tracked),
            "visual" => Ok(RevisionMode::Visual),
            other => Err(format!("Unknown revision mode: {}. Use: tracked or visual", other)),
        }
    }
}

impl fmt::Display for RevisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionMode::Tracked => write!(f, "tracked"),
            RevisionMode::Visual => write!(f, "visual"),
        }
    }
}

/// Options for WordprocessingML compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub mode: RevisionMode,
    /// Pretty print the document part
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            mode: RevisionMode::Tracked,
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!("tracked".parse::<RevisionMode>(), Ok(RevisionMode::Tracked));
        assert_eq!("visual".parse::<RevisionMode>(), Ok(RevisionMode::Visual));
        assert!("both".parse::<RevisionMode>().is_err());
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in [RevisionMode::Tracked, RevisionMode::Visual] {
            assert_eq!(mode.to_string().parse::<RevisionMode>(), Ok(mode));
        }
    }
}
