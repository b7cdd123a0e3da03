//! Export rendering for assembled strategies: JSON, Markdown, and CSV.
//!
//! Every renderer is a pure function from a [`FrameworkOutput`] to one or
//! more in-memory files; writing to disk is the caller's concern.

mod csv;
mod markdown;

use std::fmt;
use std::str::FromStr;

use tracing::instrument;

use stratbuilder_shared::{FrameworkOutput, Result, StratBuilderError};

pub use csv::csv_exports;
pub use markdown::to_markdown;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
    Csv,
}

impl ExportFormat {
    /// All formats, in the order `all_exports` renders them.
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::Json,
        ExportFormat::Markdown,
        ExportFormat::Csv,
    ];
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Csv => "csv",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = StratBuilderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            other => Err(StratBuilderError::Export(format!(
                "unknown export format '{other}' (expected json, markdown, or csv)"
            ))),
        }
    }
}

/// One rendered export file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    /// Suggested filename, relative to the export directory.
    pub filename: String,
    /// Full file content.
    pub content: String,
}

/// Render a strategy in one format.
#[instrument(skip_all, fields(format = %format))]
pub fn export(output: &FrameworkOutput, format: ExportFormat) -> Result<Vec<ExportFile>> {
    match format {
        ExportFormat::Json => Ok(vec![ExportFile {
            filename: "strategy.json".to_string(),
            content: to_json(output)?,
        }]),
        ExportFormat::Markdown => Ok(vec![ExportFile {
            filename: "strategy.md".to_string(),
            content: to_markdown(output),
        }]),
        ExportFormat::Csv => Ok(csv_exports(output)),
    }
}

/// Render every format at once.
pub fn all_exports(output: &FrameworkOutput) -> Result<Vec<ExportFile>> {
    let mut files = Vec::new();
    for format in ExportFormat::ALL {
        files.extend(export(output, format)?);
    }
    Ok(files)
}

/// Serialize the full document as pretty-printed JSON. The JSON export is
/// lossless: deserializing it yields the original document.
pub fn to_json(output: &FrameworkOutput) -> Result<String> {
    serde_json::to_string_pretty(output)
        .map_err(|e| StratBuilderError::Export(format!("JSON serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratbuilder_shared::{BrandConfig, BusinessGoal, SourceMode};

    pub(crate) fn sample_output() -> FrameworkOutput {
        let config = BrandConfig {
            brand_name: "Acme".into(),
            primary_niche: "widget automation".into(),
            business_goals: vec![BusinessGoal::BrandAwareness],
            source_mode: SourceMode::Seed,
            sitemap_url: None,
            seed_entities: vec!["Widgets".into(), "Widget Tools".into()],
            competitors: vec!["Rivalcorp".into()],
            target_regions: vec!["US".into()],
        };
        stratbuilder_core::assemble(&config, &[]).expect("assemble")
    }

    #[test]
    fn format_parses_from_strings() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn json_export_round_trips_losslessly() {
        let output = sample_output();
        let json = to_json(&output).expect("serialize");
        let parsed: FrameworkOutput = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, output);
    }

    #[test]
    fn all_exports_cover_every_format() {
        let files = all_exports(&sample_output()).expect("exports");
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();

        assert!(names.contains(&"strategy.json"));
        assert!(names.contains(&"strategy.md"));
        assert!(names.contains(&"entities.csv"));
        assert!(names.contains(&"relationships.csv"));
        assert!(names.contains(&"queries.csv"));
        assert!(names.contains(&"content_hubs.csv"));
    }
}
