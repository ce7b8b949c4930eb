use super::engine::MAX_FACTOR_SCORE;
use crate::stock::types::QualitativeOverrides;

/// Check qualitative scores against the 0-5 scale.
/// Returns all problems at once (not just the first).
///
/// The engine trusts these values as given; callers use the result to warn.
pub fn validate_qualitative(symbol: &str, qualitative: &QualitativeOverrides) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (name, value) in qualitative {
        if name.trim().is_empty() {
            errors.push(format!("{}.qualitative: factor name must not be empty", symbol));
        }
        if !value.is_finite() {
            errors.push(format!(
                "{}.qualitative.{}: score must be a finite number, got {}",
                symbol, name, value
            ));
        } else if *value < 0.0 || *value > MAX_FACTOR_SCORE {
            errors.push(format!(
                "{}.qualitative.{}: score {} is outside 0-{}",
                symbol, name, value, MAX_FACTOR_SCORE
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
