//! Bare score reporter for scripting

use crate::models::DoctorResult;
use anyhow::Result;

/// Render just the 0-100 score, newline-terminated.
pub fn render(result: &DoctorResult) -> Result<String> {
    Ok(format!("{}\n", result.score))
}
