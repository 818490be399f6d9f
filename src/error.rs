//! Error type for the fallible, user-facing edges of the plotting engine.
//!
//! Degenerate numeric input (empty zooms, out-of-range indices, flat peak tops)
//! is never an error; those paths clamp or leave state untouched.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),
    #[error("Invalid range: {0:?}")]
    InvalidRange(String),
    #[error("Widget {0} does not accept typed values")]
    WidgetNotEditable(String),
    #[error("Delimited data has an odd number of values ({0})")]
    OddDsvTokenCount(usize),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlotError>;

/// Parse a user-typed number, trimming surrounding whitespace.
pub fn parse_number(text: &str) -> Result<f64> {
    let t = text.trim();
    t.parse::<f64>()
        .map_err(|_| PlotError::InvalidNumber(t.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 7.25 ").unwrap(), 7.25);
        assert!(matches!(
            parse_number("abc"),
            Err(PlotError::InvalidNumber(s)) if s == "abc"
        ));
    }

    #[test]
    fn test_error_messages() {
        let e = PlotError::OddDsvTokenCount(3);
        assert_eq!(e.to_string(), "Delimited data has an odd number of values (3)");
        let e = PlotError::WidgetNotEditable("zoomBox1D".into());
        assert!(e.to_string().contains("zoomBox1D"));
    }
}
