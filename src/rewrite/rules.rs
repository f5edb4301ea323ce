//! Compiled regex replacement rules.

use regex::bytes::Regex;
use thiserror::Error;

use crate::config::schema::RewriteConfig;

/// Error raised while compiling rewrite rules.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid rewrite regex {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        source: regex::Error,
    },
}

struct RewriteRule {
    regex: Regex,
    replacement: Vec<u8>,
}

/// An ordered set of `(regex, replacement)` rules applied to raw bodies.
#[derive(Default)]
pub struct RewriteSet {
    rules: Vec<RewriteRule>,
}

impl RewriteSet {
    /// Compile every configured rule, failing fast on a bad pattern.
    pub fn compile(configs: &[RewriteConfig]) -> Result<Self, RewriteError> {
        let mut rules = Vec::with_capacity(configs.len());
        for config in configs {
            let regex = Regex::new(&config.regex).map_err(|source| RewriteError::BadPattern {
                pattern: config.regex.clone(),
                source,
            })?;
            rules.push(RewriteRule {
                regex,
                replacement: config.replacement.clone().into_bytes(),
            });
        }
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order to `body`.
    pub fn apply(&self, body: &[u8]) -> Vec<u8> {
        let mut out = body.to_vec();
        for rule in &self.rules {
            out = rule
                .regex
                .replace_all(&out, rule.replacement.as_slice())
                .into_owned();
        }
        out
    }
}

impl std::fmt::Debug for RewriteSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteSet")
            .field("rules", &self.rules.len())
            .finish()
    }
}
