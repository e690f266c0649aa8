//! JSON reporter
//!
//! Outputs the full DoctorResult as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::models::DoctorResult;
use anyhow::Result;

/// Render a result as JSON
pub fn render(result: &DoctorResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn output_is_valid_json() {
        let json_str = render(&test_result()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["score"], 95);
        assert_eq!(parsed["grade"], "A+");
        assert_eq!(
            parsed["rule_results"].as_array().expect("rules array").len(),
            2
        );
        assert_eq!(parsed["summary"]["errors"], 1);
        assert!(parsed["fixed_count"].is_null());
    }

    #[test]
    fn diagnostics_serialize_with_severity_strings() {
        let json_str = render(&test_result()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed["diagnostics"][0]["severity"], "error");
        assert_eq!(parsed["diagnostics"][0]["auto_fixable"], true);
    }
}
