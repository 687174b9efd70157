//! Domain primitive types used across the buildcloud workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cloud environment's caller-given name paired with its run-scoped name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentIdentity {
    original: String,
    renamed: String,
}

impl EnvironmentIdentity {
    /// Creates an identity by prepending `prefix` to `original`.
    #[must_use]
    pub fn new(original: impl Into<String>, prefix: &str) -> Self {
        let original = original.into();
        let renamed = format!("{prefix}{original}");
        Self { original, renamed }
    }

    /// Returns the caller-given name.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Returns the run-scoped name every tool invocation uses.
    #[must_use]
    pub fn renamed(&self) -> &str {
        &self.renamed
    }
}

impl fmt::Display for EnvironmentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.renamed)
    }
}

/// Owner applied recursively to the run root before teardown reads from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    /// A named `user:group` pair.
    Named(String),
    /// Numeric user and group ids.
    Ids {
        /// User id.
        uid: u32,
        /// Group id.
        gid: u32,
    },
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(owner) => write!(f, "{owner}"),
            Self::Ids { uid, gid } => write!(f, "{uid}:{gid}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_prepends_prefix() {
        let id = EnvironmentIdentity::new("old-env", "cwr-");
        assert_eq!(id.original(), "old-env");
        assert_eq!(id.renamed(), "cwr-old-env");
        assert_eq!(id.to_string(), "cwr-old-env");
    }

    #[test]
    fn ownership_display() {
        assert_eq!(Ownership::Named("jenkins:jenkins".into()).to_string(), "jenkins:jenkins");
        assert_eq!(Ownership::Ids { uid: 1000, gid: 100 }.to_string(), "1000:100");
    }
}
