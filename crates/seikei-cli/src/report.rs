use seikei_core::compare::Comparison;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

const ORIGINAL_FILE: &str = "original.txt";
const CLEANED_FILE: &str = "cleaned.txt";
const COMPARISON_FILE: &str = "comparison.json";
const DIFF_FILE: &str = "diff.html";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report io error: {0}")]
    Io(#[from] io::Error),
    #[error("report metadata error: {0}")]
    Metadata(#[from] toml::ser::Error),
    #[error("report json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("report time error: {0}")]
    Time(#[from] time::error::Format),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub id: String,
    pub created_at: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub kinds: Vec<String>,
    pub rule_count: usize,
    pub correction_count: usize,
    pub original_file: String,
    pub cleaned_file: String,
    pub comparison_file: String,
    pub diff_file: String,
}

impl ReportMetadata {
    pub fn new(
        comparison: &Comparison,
        provider: Option<(&str, &str)>,
        rule_count: usize,
    ) -> Result<Self, ReportError> {
        Ok(Self {
            id: Uuid::now_v7().to_string(),
            created_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
            provider: provider.map(|(name, _)| name.to_string()),
            model: provider.map(|(_, model)| model.to_string()),
            kinds: comparison
                .analyses
                .iter()
                .map(|analysis| analysis.kind.as_str().to_string())
                .collect(),
            rule_count,
            correction_count: comparison.corrections.len(),
            original_file: ORIGINAL_FILE.to_string(),
            cleaned_file: CLEANED_FILE.to_string(),
            comparison_file: COMPARISON_FILE.to_string(),
            diff_file: DIFF_FILE.to_string(),
        })
    }
}

/// Write a comparison and its visual diff under `reports_dir/<id>/`.
pub fn save(
    reports_dir: &Path,
    metadata: &ReportMetadata,
    comparison: &Comparison,
    diff_html: &str,
) -> Result<PathBuf, ReportError> {
    let dir = reports_dir.join(&metadata.id);
    fs::create_dir_all(&dir)?;

    write_atomic(&dir.join(&metadata.original_file), comparison.original.as_bytes())?;
    write_atomic(&dir.join(&metadata.cleaned_file), comparison.cleaned.as_bytes())?;
    let json = serde_json::to_string_pretty(comparison)?;
    write_atomic(&dir.join(&metadata.comparison_file), json.as_bytes())?;
    write_atomic(&dir.join(&metadata.diff_file), diff_html.as_bytes())?;
    let toml = toml::to_string_pretty(metadata)?;
    write_atomic(&dir.join("metadata.toml"), toml.as_bytes())?;

    Ok(dir)
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("report path missing parent directory"))?;
    let tmp_path = parent.join(".tmp-write");
    fs::write(&tmp_path, contents)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}
