//! Error taxonomy for tag navigation
//!
//! Configuration and pattern errors end an invocation before any file I/O.
//! Read errors stay local to the file that produced them. Finding nothing is
//! not an error: lookups return `Ok(None)` or an empty list.

use std::path::PathBuf;

/// Result alias used throughout featnav-core
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `tagPattern` is not configured
    #[error("no tagPattern configured")]
    MissingConfiguration,

    /// `tagPattern` failed to compile
    #[error("invalid tagPattern regex `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A candidate file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file enumerator itself failed (not a per-file failure)
    #[error("file enumeration failed: {0}")]
    Walk(String),
}

impl Error {
    /// Whether this error should interrupt the user with a notification.
    ///
    /// Everything else is only logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Error::InvalidPattern { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invalid_pattern_is_user_visible() {
        let invalid = regex::Regex::new("(").unwrap_err();
        assert!(
            Error::InvalidPattern {
                pattern: "(".into(),
                source: invalid,
            }
            .is_user_visible()
        );
        assert!(!Error::MissingConfiguration.is_user_visible());
        assert!(
            !Error::Read {
                path: "a.feature".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            }
            .is_user_visible()
        );
    }

    #[test]
    fn test_read_error_message_names_the_file() {
        let err = Error::Read {
            path: PathBuf::from("specs/login.feature"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to read specs/login.feature: denied");
    }
}
