//! Wildcard patterns over event names
//!
//! Event names are dot-separated segments. A pattern segment is either a
//! literal, `*` (exactly one segment), or `**` (one or more segments).
//!
//! Supports:
//! - `user.*` → matches `user.login`, not `user.login.audit`
//! - `user.**` → matches both
//!
//! Does NOT support:
//! - Partial-segment wildcards: `user.log*`
//! - Character classes or alternation
//!
//! Patterns compile to anchored regexes; compiled artifacts are shared
//! process-wide so parsing the same pattern twice hits the cache.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Compiled patterns keyed by source text
static COMPILED: Lazy<DashMap<String, Arc<Regex>>> = Lazy::new(DashMap::new);

/// Rejection reasons for [`EventPattern::parse`]
#[derive(Debug, Error, Clone)]
pub enum PatternError {
    #[error("empty segment in pattern '{pattern}'")]
    EmptySegment { pattern: String },

    #[error("segment '{segment}' mixes '*' with other characters")]
    PartialWildcard { segment: String },

    #[error("pattern '{pattern}' failed to compile")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// True when `name` would be treated as a wildcard pattern by dispatch
pub fn is_pattern(name: &str) -> bool {
    name.contains('*')
}

/// A parsed wildcard pattern over event names
#[derive(Debug, Clone)]
pub struct EventPattern {
    source: Arc<str>,
    regex: Arc<Regex>,
}

impl EventPattern {
    /// Parse `pattern` into a matcher.
    ///
    /// Examples:
    /// - `"user.*"` → matches any two-segment name starting with `user.`
    /// - `"user.**"` → matches `user.` followed by one or more segments
    /// - `"user..login"`, `"user.log*"` → rejected
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        // Check cache first
        if let Some(cached) = COMPILED.get(pattern) {
            return Ok(Self {
                source: Arc::from(pattern),
                regex: Arc::clone(&cached),
            });
        }

        if pattern.is_empty() {
            return Err(PatternError::EmptySegment {
                pattern: pattern.to_string(),
            });
        }

        let mut parts = Vec::new();
        for segment in pattern.split('.') {
            let part = match segment {
                "" => {
                    return Err(PatternError::EmptySegment {
                        pattern: pattern.to_string(),
                    })
                }
                "*" => "[^.]+".to_string(),
                "**" => ".+".to_string(),
                literal if literal.contains('*') => {
                    return Err(PatternError::PartialWildcard {
                        segment: literal.to_string(),
                    })
                }
                literal => regex::escape(literal),
            };
            parts.push(part);
        }

        let anchored = format!("^{}$", parts.join(r"\."));
        let regex = Regex::new(&anchored).map_err(|source| PatternError::Compile {
            pattern: pattern.to_string(),
            source,
        })?;

        let regex = Arc::new(regex);
        COMPILED.insert(pattern.to_string(), Arc::clone(&regex));

        Ok(Self {
            source: Arc::from(pattern),
            regex,
        })
    }

    /// The pattern's source text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Anchored match against a concrete event name
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}
