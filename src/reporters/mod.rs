//! Output reporters for doctor results
//!
//! Supported formats:
//! - `text` - terminal output grouped by category, with colors
//! - `json` - machine-readable JSON of the full result
//! - `score` - the bare 0-100 score, for scripting

mod json;
mod score;
mod text;

use crate::models::DoctorResult;
use anyhow::Result;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Score,
}

/// Render a doctor result in the given format.
pub fn report(result: &DoctorResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(result),
        OutputFormat::Json => json::render(result),
        OutputFormat::Score => score::render(result),
    }
}
