use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use redline_compiler_docx::{
    compile_body, CompileOptions, CoreProperties, DocumentPackage, RevisionMode,
};
use redline_revisions::BatchInput;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Batch input file (originalText, changes, metadata)
    pub input: PathBuf,

    /// Output file (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Revision mode (tracked, visual)
    #[arg(short, long)]
    pub mode: Option<String>,
}

/// Build the document for `args.input` and return the absolute path written
pub fn export(args: ExportArgs, cwd: &str) -> Result<PathBuf> {
    let config = Config::load(cwd).context("Failed to load config")?;

    let mode = match args.mode.as_deref() {
        Some(mode) => mode.parse::<RevisionMode>().map_err(anyhow::Error::msg)?,
        None => config.revision_mode,
    };

    let input_path = resolve(cwd, &args.input);
    let content = fs::read_to_string(&input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;
    let batch: BatchInput = serde_json::from_str(&content)
        .with_context(|| format!("Invalid batch input in {}", input_path.display()))?;

    batch.metadata.validate()?;

    let options = CompileOptions {
        mode,
        ..Default::default()
    };
    let body = compile_body(&batch.original_text, &batch.changes, &options)?;

    let mut package = DocumentPackage::new(
        CoreProperties::from_metadata(&batch.metadata),
        config.document_settings(),
    );
    package.set_body(body.xml);

    let output_path = match &args.output {
        Some(output) => resolve(cwd, output),
        None => config.get_output_path(cwd),
    };
    package
        .save(&output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    eprintln!(
        "  {} {} edits ({} tracked, {} visual) → {}",
        "✓".green(),
        batch.changes.len(),
        body.stats.tracked,
        body.stats.visual,
        output_path.display()
    );

    Ok(output_path)
}

fn resolve(cwd: &str, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG_NAME;
    use std::io::Read;

    const BATCH: &str = r#"{
        "originalText": "The quick brown fox.\n\nIt jumped.",
        "changes": [
            { "id": 1, "type": "insertion", "position": 10, "content": "red ", "author": "Ann", "date": "2024-01-01T00:00:00Z" },
            { "id": 2, "type": "deletion", "position": 4, "content": "quick " }
        ],
        "metadata": { "title": "Fox", "author": ["Ann", "Bob"] }
    }"#;

    fn read_part(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut content = String::new();
        part.read_to_string(&mut content).unwrap();
        content
    }

    fn setup() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("batch.json"), BATCH).unwrap();
        let cwd = dir.path().to_str().unwrap().to_string();
        (dir, cwd)
    }

    fn args(output: Option<&str>, mode: Option<&str>) -> ExportArgs {
        ExportArgs {
            input: PathBuf::from("batch.json"),
            output: output.map(PathBuf::from),
            mode: mode.map(str::to_string),
        }
    }

    #[test]
    fn test_export_to_default_path() {
        let (dir, cwd) = setup();

        let path = export(args(None, None), &cwd).unwrap();
        assert_eq!(path, dir.path().join("out").join("track_changes.docx"));
        assert!(path.is_absolute());

        let document = read_part(&path, "word/document.xml");
        assert!(document.contains(r#"<w:ins w:id="2" w:author="Ann""#));
        assert!(document.contains(r#"<w:del w:id="1""#));

        let core = read_part(&path, "docProps/core.xml");
        assert!(core.contains("<dc:creator>Ann, Bob</dc:creator>"));
    }

    #[test]
    fn test_export_flags_override_config() {
        let (dir, cwd) = setup();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "outDir": "exports", "revisionMode": "tracked", "defaultTabStop": 720 }"#,
        )
        .unwrap();

        let path = export(args(Some("custom/edits.docx"), Some("visual")), &cwd).unwrap();
        assert_eq!(path, dir.path().join("custom").join("edits.docx"));

        let document = read_part(&path, "word/document.xml");
        assert!(!document.contains("<w:ins "));
        assert!(document.contains(r#"<w:highlight w:val="green"/>"#));

        let settings = read_part(&path, "word/settings.xml");
        assert!(settings.contains(r#"<w:defaultTabStop w:val="720"/>"#));
    }

    #[test]
    fn test_export_uses_config_mode() {
        let (dir, cwd) = setup();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "revisionMode": "visual" }"#,
        )
        .unwrap();

        let path = export(args(None, None), &cwd).unwrap();
        let document = read_part(&path, "word/document.xml");
        assert!(!document.contains("<w:del "));
        assert!(document.contains("<w:strike/>"));
    }

    #[test]
    fn test_export_rejects_unknown_mode() {
        let (_dir, cwd) = setup();
        let err = export(args(None, Some("both")), &cwd).unwrap_err();
        assert!(err.to_string().contains("Unknown revision mode"));
    }

    #[test]
    fn test_export_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = export(args(None, None), dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }

    #[test]
    fn test_export_fails_on_bad_edit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("batch.json"),
            r#"{ "originalText": "abc", "changes": [{ "id": "1", "type": "deletion", "position": 1, "content": "zz" }] }"#,
        )
        .unwrap();

        let err = export(args(None, None), dir.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains('1'));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_export_rejects_control_characters_in_metadata() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("batch.json"),
            r#"{ "originalText": "abc", "metadata": { "title": "bad\u0007title" } }"#,
        )
        .unwrap();

        let err = export(args(None, None), dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("U+0007"));
        assert!(!dir.path().join("out").exists());
    }
}
