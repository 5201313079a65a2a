//! Wait options and URL patterns handed to the driver.
//!
//! Maestro never polls on its own: waiting belongs to the [`PageDriver`]
//! implementation. These types only describe what to wait for and for how long.
//!
//! [`PageDriver`]: crate::driver::PageDriver

use crate::result::{MaestroError, MaestroResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }
}

// =============================================================================
// URL PATTERN
// =============================================================================

/// URL pattern for `wait_until_url_is`
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match, compiled up front
    Regex(Regex),
    /// Glob pattern (e.g., "**/todo/*")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Compile a regex pattern
    ///
    /// # Errors
    ///
    /// Returns [`MaestroError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn regex(pattern: &str) -> MaestroResult<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| MaestroError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(re) => re.is_match(url),
            Self::Glob(pattern) => Self::glob_matches(pattern, url),
            Self::Any => true,
        }
    }

    /// Glob matching where `*` spans any run of characters.
    ///
    /// The first piece is anchored at the start and the last at the end;
    /// the pieces between them are matched leftmost in the remaining middle.
    fn glob_matches(pattern: &str, url: &str) -> bool {
        let pieces: Vec<&str> = pattern.split('*').collect();
        let (first, last) = match pieces.as_slice() {
            [only] => return url == *only,
            [first, .., last] => (*first, *last),
            [] => return true,
        };
        if first.len() + last.len() > url.len() || !url.starts_with(first) || !url.ends_with(last)
        {
            return false;
        }

        let mut middle = &url[first.len()..url.len() - last.len()];
        for piece in &pieces[1..pieces.len() - 1] {
            match middle.find(piece) {
                Some(found) => middle = &middle[found + piece.len()..],
                None => return false,
            }
        }
        true
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b))
            | (Self::Prefix(a), Self::Prefix(b))
            | (Self::Contains(a), Self::Contains(b))
            | (Self::Glob(a), Self::Glob(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            (Self::Any, Self::Any) => true,
            _ => false,
        }
    }
}

impl Eq for UrlPattern {}

impl From<&str> for UrlPattern {
    /// Strings containing `*` are globs; everything else must match exactly.
    fn from(pattern: &str) -> Self {
        if pattern.contains('*') {
            Self::Glob(pattern.to_string())
        } else {
            Self::Exact(pattern.to_string())
        }
    }
}

impl From<String> for UrlPattern {
    fn from(pattern: String) -> Self {
        Self::from(pattern.as_str())
    }
}

impl From<Regex> for UrlPattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

impl From<&Regex> for UrlPattern {
    fn from(re: &Regex) -> Self {
        Self::Regex(re.clone())
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) | Self::Glob(p) => write!(f, "{p}"),
            Self::Prefix(p) => write!(f, "{p}*"),
            Self::Contains(p) => write!(f, "*{p}*"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::Any => write!(f, "*"),
        }
    }
}
