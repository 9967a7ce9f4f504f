//! Pipeline options, resolved once at the entry point.
//!
//! All defaults live here, on [`GenerateOptions`]. Downstream stages take the
//! resolved value as-is; nothing re-merges defaults later.

use std::collections::BTreeMap;

use crate::error::CadenceError;

/// Options consumed by synthesis and emission.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Base URL the generated script will hit.
    pub target: String,
    /// Simulated test duration, `Nh` or `Nm`. Default `1h`.
    pub duration: String,
    /// Uniform multiplier on all rate magnitudes. Default 1.0, must be > 0.
    pub scale: f64,
    /// Ratio of simulated time to wall-clock time (e.g. 24 = one simulated
    /// day per wall-clock hour). Default 1.0, must be > 0.
    pub time_scale: f64,
    /// HTTP headers sent with every generated request. Default empty.
    /// BTreeMap so the emitted script is byte-stable across runs.
    pub headers: BTreeMap<String, String>,
}

impl GenerateOptions {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            duration: "1h".to_string(),
            scale: 1.0,
            time_scale: 1.0,
            headers: BTreeMap::new(),
        }
    }

    /// Check the numeric caller contract. Runs before synthesis; a scale or
    /// time-scale of zero, below zero, NaN, or infinity never reaches the
    /// numeric core.
    pub fn ensure_valid(&self) -> Result<(), CadenceError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(CadenceError::InvalidOption {
                name: "scale",
                value: self.scale,
            });
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(CadenceError::InvalidOption {
                name: "time-scale",
                value: self.time_scale,
            });
        }
        Ok(())
    }
}

/// Parse a test duration of the form `Nh` or `Nm` into whole minutes.
pub fn parse_duration_minutes(input: &str) -> Result<u64, CadenceError> {
    let s = input.trim();
    let err = || CadenceError::DurationFormat {
        input: input.to_string(),
    };

    let Some(unit) = s.chars().last() else {
        return Err(err());
    };
    let digits = &s[..s.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    let value: u64 = digits.parse().map_err(|_| err())?;
    if value == 0 {
        return Err(err());
    }
    match unit {
        'h' => Ok(value * 60),
        'm' => Ok(value),
        _ => Err(err()),
    }
}

/// Parse a headers option into a string→string map.
///
/// Two textual forms are accepted: a JSON object literal (`{"A":"B"}`) or a
/// comma-separated `key:value` list (`A:B,C:D`).
pub fn parse_headers(input: &str) -> Result<BTreeMap<String, String>, CadenceError> {
    let s = input.trim();
    let fail = |reason: String| CadenceError::HeaderFormat {
        input: input.to_string(),
        reason,
    };

    if s.starts_with('{') {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| fail(format!("not a valid JSON object: {e}")))?;
        let obj = value
            .as_object()
            .ok_or_else(|| fail("JSON form must be an object".to_string()))?;
        let mut headers = BTreeMap::new();
        for (key, val) in obj {
            let val = val
                .as_str()
                .ok_or_else(|| fail(format!("value for {key:?} must be a string")))?;
            headers.insert(key.clone(), val.to_string());
        }
        return Ok(headers);
    }

    let mut headers = BTreeMap::new();
    for pair in s.split(',') {
        let (key, value) = pair
            .split_once(':')
            .ok_or_else(|| fail(format!("pair {pair:?} is missing a ':' separator")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(fail(format!("pair {pair:?} has an empty key")));
        }
        headers.insert(key.to_string(), value.trim().to_string());
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_hours_and_minutes() {
        assert_eq!(parse_duration_minutes("2h").unwrap(), 120);
        assert_eq!(parse_duration_minutes("90m").unwrap(), 90);
        assert_eq!(parse_duration_minutes("1h").unwrap(), 60);
    }

    #[test]
    fn test_duration_rejects_malformed_input() {
        for bad in ["", "h", "2d", "2.5h", "-1h", "0m", "2 h", "120"] {
            let err = parse_duration_minutes(bad).unwrap_err();
            assert!(
                matches!(err, CadenceError::DurationFormat { .. }),
                "{bad:?} should be a DurationFormat error"
            );
        }
    }

    #[test]
    fn test_headers_json_form() {
        let headers = parse_headers(r#"{"A":"B"}"#).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["A"], "B");
    }

    #[test]
    fn test_headers_pair_form() {
        let headers = parse_headers("A:B,C:D").unwrap();
        assert_eq!(headers["A"], "B");
        assert_eq!(headers["C"], "D");

        // Whitespace around keys and values is tolerated; a value may itself
        // contain a colon (split is on the first one only).
        let headers = parse_headers("Authorization: Bearer x:y").unwrap();
        assert_eq!(headers["Authorization"], "Bearer x:y");
    }

    #[test]
    fn test_headers_malformed_input_fails() {
        for bad in [r#"{"A":"B"#, "A=B", r#"{"A":1}"#, ":value"] {
            let err = parse_headers(bad).unwrap_err();
            assert!(
                matches!(err, CadenceError::HeaderFormat { .. }),
                "{bad:?} should be a HeaderFormat error, got {err}"
            );
        }

        let err = parse_headers("A=B").unwrap_err();
        assert!(err.to_string().contains("A=B"), "error should name the input");
    }

    #[test]
    fn test_option_contract_rejects_non_positive_factors() {
        let mut opts = GenerateOptions::new("http://localhost:8080");
        assert!(opts.ensure_valid().is_ok());

        opts.scale = 0.0;
        assert!(matches!(
            opts.ensure_valid().unwrap_err(),
            CadenceError::InvalidOption { name: "scale", .. }
        ));

        opts.scale = 1.0;
        opts.time_scale = -2.0;
        assert!(matches!(
            opts.ensure_valid().unwrap_err(),
            CadenceError::InvalidOption { name: "time-scale", .. }
        ));

        opts.time_scale = f64::NAN;
        assert!(opts.ensure_valid().is_err());
    }
}
