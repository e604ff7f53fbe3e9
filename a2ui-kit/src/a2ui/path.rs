//! Data Model Path Validation
//!
//! Paths address the data model with slash-separated segments (`/user/name`,
//! `/items/0/label`). Everything the agent or the UI writes goes through
//! [`validate_path`] first, so hostile paths never reach the store.
//!
//! Rules are checked in a fixed order and the first failing rule is reported.

use thiserror::Error;

/// Maximum number of segments in a path.
pub const MAX_PATH_DEPTH: usize = 10;

/// Maximum length of a single path segment, in characters.
pub const MAX_SEGMENT_LENGTH: usize = 50;

/// Maximum length of a surface or component id.
pub const MAX_ID_LENGTH: usize = 128;

const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', '"', '\'', '&', ';', '|', '`', '$', '(', ')', '{', '}', '[', ']', '\\',
];

const RESERVED_SEGMENTS: &[&str] = &["__proto__", "constructor", "prototype", "toString", "valueOf"];

/// Reason a path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path must start with '/'")]
    MissingLeadingSlash,

    #[error("path must not end with '/'")]
    TrailingSlash,

    #[error("path must not contain '..'")]
    Traversal,

    #[error("path must not contain '//'")]
    DoubleSlash,

    #[error("path contains forbidden character {0:?}")]
    ForbiddenCharacter(char),

    #[error("path has {depth} segments, limit is {max}")]
    TooDeep { depth: usize, max: usize },

    #[error("path contains an empty segment")]
    EmptySegment,

    #[error("path segment of {len} characters exceeds limit of {max}")]
    SegmentTooLong { len: usize, max: usize },

    #[error("path segment '{0}' must match [a-zA-Z0-9_-]+")]
    InvalidSegment(String),

    #[error("path segment '{0}' is reserved")]
    ReservedSegment(String),
}

/// Validate a data model path.
pub fn validate_path(path: &str) -> Result<(), PathError> {
    if path.trim().is_empty() {
        return Err(PathError::Empty);
    }
    if path == "/" {
        return Ok(());
    }
    if !path.starts_with('/') {
        return Err(PathError::MissingLeadingSlash);
    }
    if path.ends_with('/') {
        return Err(PathError::TrailingSlash);
    }
    if path.contains("..") {
        return Err(PathError::Traversal);
    }
    if path.contains("//") {
        return Err(PathError::DoubleSlash);
    }
    if let Some(c) = path.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(PathError::ForbiddenCharacter(c));
    }

    let segments: Vec<&str> = path[1..].split('/').collect();
    if segments.len() > MAX_PATH_DEPTH {
        return Err(PathError::TooDeep {
            depth: segments.len(),
            max: MAX_PATH_DEPTH,
        });
    }

    for segment in segments {
        if segment.is_empty() {
            return Err(PathError::EmptySegment);
        }
        let len = segment.chars().count();
        if len > MAX_SEGMENT_LENGTH {
            return Err(PathError::SegmentTooLong {
                len,
                max: MAX_SEGMENT_LENGTH,
            });
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(PathError::InvalidSegment(segment.to_string()));
        }
        if RESERVED_SEGMENTS.contains(&segment) {
            return Err(PathError::ReservedSegment(segment.to_string()));
        }
    }

    Ok(())
}

/// Check if a path passes [`validate_path`].
pub fn is_valid_path(path: &str) -> bool {
    validate_path(path).is_ok()
}

/// Collapse redundant slashes.
///
/// This only fixes formatting: `a//b/` becomes `/a/b`, but `..` and other
/// semantic violations are left in place for [`validate_path`] to reject.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Split a valid path into its segments. The root path has none.
pub(crate) fn segments(path: &str) -> Vec<&str> {
    if path == "/" {
        return Vec::new();
    }
    path.trim_start_matches('/').split('/').collect()
}

/// Check a surface or component identifier.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LENGTH
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}
