//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Status specs parse into ranges, rewrite regexes compile
//! - Addresses are well-formed, timeouts are nonzero
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: `ProxyConfig → Result<(), Vec<ValidationError>>`
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::intercept::StatusRanges;
use crate::rewrite::RewriteSet;

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check everything serde cannot, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".into(),
            message: format!("not a socket address: {:?}", config.listener.bind_address),
        });
    }

    if config.upstream.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "upstream.address".into(),
            message: format!("not a socket address: {:?}", config.upstream.address),
        });
    }

    if let Err(err) = StatusRanges::parse(&config.intercept.status) {
        errors.push(ValidationError {
            field: "intercept.status".into(),
            message: err.to_string(),
        });
    }

    if let Err(err) = RewriteSet::compile(&config.intercept.rewrites) {
        errors.push(ValidationError {
            field: "intercept.rewrites".into(),
            message: err.to_string(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.request_secs".into(),
            message: "must be greater than zero".into(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RewriteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.intercept.status = vec!["599-500".into()];
        config.intercept.rewrites = vec![RewriteConfig {
            regex: "(unclosed".into(),
            replacement: String::new(),
        }];
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"intercept.status"));
        assert!(fields.contains(&"intercept.rewrites"));
        assert!(fields.contains(&"timeouts.request_secs"));
    }

    #[test]
    fn test_inverted_range_is_reported() {
        let mut config = ProxyConfig::default();
        config.intercept.status = vec!["500-599".into(), "404-400".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("inverted"));
    }
}
