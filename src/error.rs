#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the statistics collector."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! `masterror::Error` expands field patterns that trip the
//! `non_shorthand_field_patterns` lint, so the lint is allowed for this module.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Unified error type returned by the fetch, normalization and orchestration
/// layers.
///
/// The first six variants form the closed set a presentation layer is
/// expected to report to users. The remaining variants cover the ambient
/// plumbing (configuration files and the blocking runtime).
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// The upstream API answered `404` for a page request.
    #[error("repository not found: {url}")]
    RepositoryNotFound {
        /// Request URL that produced the response.
        url: String
    },
    /// The upstream API rejected the supplied token with `401`.
    #[error("invalid credentials for {url}")]
    InvalidCredentials {
        /// Request URL that produced the response.
        url: String
    },
    /// The rate-limit budget reported by the upstream API is exhausted.
    #[error("rate limit of {limit} requests exhausted while requesting {url}")]
    RateLimitExceeded {
        /// Request URL that produced the response.
        url:           String,
        /// Request budget per window reported by `X-RateLimit-Limit`.
        limit:         u64,
        /// Moment the budget is replenished, from `X-RateLimit-Reset`.
        reset_at:      Option<DateTime<Utc>>,
        /// Whether the request carried a bearer token.
        authenticated: bool
    },
    /// Any other failed exchange with the upstream API.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Request URL that produced the failure.
        url:     String,
        /// HTTP status when a response was received.
        status:  Option<u16>,
        /// Response body or transport diagnostic.
        message: String
    },
    /// A raw record lacks a structurally required field.
    #[error("malformed {kind} record: {message}")]
    MalformedRecord {
        /// Record family being normalized.
        kind:    &'static str,
        /// Human readable description of the defect.
        message: String
    },
    /// Invalid URL, date, threshold or option supplied by the caller.
    #[error("invalid argument: {message}")]
    Argument {
        /// Human readable message describing the invalid input.
        message: String
    },
    /// Wraps I/O errors that occur while reading configuration files.
    #[error("failed to read configuration from {path:?}: {source}")]
    ConfigIo {
        /// Location of the configuration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    ConfigParse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// The runtime backing the blocking client could not be started.
    #[error("failed to start the blocking runtime: {source}")]
    Runtime {
        /// Underlying I/O error reported by tokio.
        source: std::io::Error
    },
    /// Writing a summary to the output stream failed.
    #[error("failed to write output: {source}")]
    Output {
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps JSON serialization errors raised while printing summaries.
    #[error("failed to serialize summary: {source}")]
    Serialize {
        /// Source serialization error from serde_json.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs an argument error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the invalid input.
    pub fn argument<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Argument {
            message: message.into()
        }
    }

    /// Constructs a malformed record error for the given record family.
    pub fn malformed<M>(kind: &'static str, message: M) -> Self
    where
        M: Into<String>
    {
        Self::MalformedRecord {
            kind,
            message: message.into()
        }
    }

    /// Constructs a transport error for the given request URL.
    pub fn transport<U, M>(url: U, status: Option<u16>, message: M) -> Self
    where
        U: Into<String>,
        M: Into<String>
    {
        Self::Transport {
            url: url.into(),
            status,
            message: message.into()
        }
    }

    /// Returns a follow-up suggestion for end users when one exists.
    ///
    /// Only rate-limit and credential failures carry a hint; the remaining
    /// variants are self-explanatory through their display output.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::RateLimitExceeded {
                reset_at,
                authenticated,
                ..
            } => {
                let wait = match reset_at {
                    Some(moment) => format!("wait until {}", moment.format("%Y-%m-%d %H:%M:%S UTC")),
                    None => "wait for the rate-limit window to reset".to_owned()
                };
                if *authenticated {
                    Some(wait)
                } else {
                    Some(format!("{wait} or supply a token to raise the request budget"))
                }
            }
            Self::InvalidCredentials {
                ..
            } => Some("check that the supplied token is valid and not expired".to_owned()),
            _ => None
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::ConfigParse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::ConfigIo`] variant capturing the failing path and
/// source.
///
/// # Parameters
///
/// * `path` - Location of the configuration file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn config_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::ConfigIo {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::Error;

    #[test]
    fn argument_constructor_populates_message() {
        let error = Error::argument("something went wrong");
        match error {
            Error::Argument {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected argument error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::malformed("commit", "missing commit body");
        assert_eq!(error.to_string(), error.to_display_string());
        assert_eq!(error.to_string(), "malformed commit record: missing commit body");
    }

    #[test]
    fn config_io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/repostat.yaml");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::config_io_error(path, io_error);

        match error {
            Error::ConfigIo {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected config io error, got {other:?}")
        }
    }

    #[test]
    fn serde_yaml_conversion_maps_to_parse_variant() {
        let error = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::ConfigParse { .. }));
    }

    #[test]
    fn unauthenticated_rate_limit_hint_suggests_token() {
        let error = Error::RateLimitExceeded {
            url:           "https://api.github.com/repos/o/r/commits".to_owned(),
            limit:         60,
            reset_at:      chrono::Utc.timestamp_opt(1_700_000_000, 0).single(),
            authenticated: false
        };

        let hint = error.hint().expect("rate limit errors carry a hint");
        assert!(hint.starts_with("wait until 2023-11-14 22:13:20 UTC"));
        assert!(hint.contains("supply a token"));
    }

    #[test]
    fn authenticated_rate_limit_hint_omits_token_suggestion() {
        let error = Error::RateLimitExceeded {
            url:           "https://api.github.com/repos/o/r/issues".to_owned(),
            limit:         5000,
            reset_at:      None,
            authenticated: true
        };

        let hint = error.hint().expect("rate limit errors carry a hint");
        assert!(!hint.contains("token"));
    }

    #[test]
    fn transport_errors_have_no_hint() {
        let error = Error::transport("https://api.github.com", Some(500), "boom");
        assert!(error.hint().is_none());
        assert_eq!(error.to_string(), "request to https://api.github.com failed: boom");
    }
}
