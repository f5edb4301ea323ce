//! Status-code range matching.
//!
//! # Responsibilities
//! - Parse status specs like `"404"` or `"500-599"` into inclusive intervals
//! - Answer membership queries for observed status codes
//!
//! # Design Decisions
//! - Malformed specs fail at construction, never at match time
//! - Linear scan: range lists are single-digit sized in practice
//! - Overlapping or duplicate ranges are permitted and harmless

use thiserror::Error;

/// Error raised while parsing a status range specification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeParseError {
    /// A bound was not a valid status code number.
    #[error("invalid status code in {spec:?}: {source}")]
    NotNumeric {
        spec: String,
        source: std::num::ParseIntError,
    },

    /// Low bound above high bound.
    #[error("inverted status range: {low}-{high}")]
    Inverted { low: u16, high: u16 },

    /// More than one `-` separator.
    #[error("malformed status range spec {spec:?}")]
    Malformed { spec: String },
}

/// Inclusive status-code intervals with any-match semantics.
#[derive(Debug, Clone, Default)]
pub struct StatusRanges(Vec<(u16, u16)>);

impl StatusRanges {
    /// Parse a list of specs. Fails fast on the first malformed entry so a
    /// bad configuration never makes it past startup.
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self, RangeParseError> {
        let mut ranges = Vec::with_capacity(specs.len());
        for spec in specs {
            ranges.push(parse_spec(spec.as_ref())?);
        }
        Ok(Self(ranges))
    }

    /// True iff `code` falls within at least one configured interval.
    pub fn contains(&self, code: u16) -> bool {
        self.0.iter().any(|&(low, high)| code >= low && code <= high)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn parse_spec(spec: &str) -> Result<(u16, u16), RangeParseError> {
    let trimmed = spec.trim();
    let mut parts = trimmed.split('-');

    let low = parse_bound(parts.next().unwrap_or(""), spec)?;
    let high = match parts.next() {
        Some(bound) => parse_bound(bound, spec)?,
        None => low,
    };

    if parts.next().is_some() {
        return Err(RangeParseError::Malformed {
            spec: spec.to_string(),
        });
    }
    if low > high {
        return Err(RangeParseError::Inverted { low, high });
    }

    Ok((low, high))
}

fn parse_bound(bound: &str, spec: &str) -> Result<u16, RangeParseError> {
    bound
        .trim()
        .parse()
        .map_err(|source| RangeParseError::NotNumeric {
            spec: spec.to_string(),
            source,
        })
}
