//! Test utilities for FairFare
//!
//! This module provides common test utilities: temporary files, tip and
//! profile builders, and assertion helpers.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::FairfareError;
use crate::models::{GoogleUser, Tip, TipId, TransportMode, User};

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// A tip authored by `username` with the given author score and rating
pub fn tip(id: TipId, username: &str, score: i64, rating: i64) -> Tip {
    Tip {
        id,
        origin: format!("Origin {}", id),
        destination: format!("Destination {}", id),
        transport_mode: TransportMode::Bus,
        estimated_cost: "₹20".to_string(),
        estimated_time: "20 minutes".to_string(),
        advice: format!("Advice for route {}", id),
        user: User::new(username, score, &[]),
        rating,
        coordinates: None,
    }
}

/// A Google profile for `name`
pub fn profile(name: &str) -> GoogleUser {
    GoogleUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        picture: String::new(),
    }
}

/// Assert that an error is the given [`FairfareError`] variant
///
/// # Panics
///
/// Panics if the result is Ok or the error has a different variant
pub fn assert_fairfare_error<T: std::fmt::Debug>(
    result: anyhow::Result<T>,
    matches: fn(&FairfareError) -> bool,
) {
    let err = result.expect_err("expected an error");
    match err.downcast_ref::<FairfareError>() {
        Some(inner) if matches(inner) => {}
        other => panic!("unexpected error: {:?} ({})", other, err),
    }
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or the message does not contain `expected`
pub fn assert_error_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, expected: &str) {
    let err = result.expect_err("expected an error");
    let message = format!("{:#}", err);
    assert!(
        message.contains(expected),
        "Error message '{}' does not contain '{}'",
        message,
        expected
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "a.yaml", "tips: {}");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "tips: {}");
    }

    #[test]
    fn test_tip_builder() {
        let tip = tip(7, "A", 5, 2);
        assert_eq!(tip.user.username, "A");
        assert_eq!(tip.user.score, 5);
        assert_eq!(tip.rating, 2);
    }

    #[test]
    fn test_assert_helpers() {
        let result: anyhow::Result<()> =
            Err(FairfareError::Validation("origin is required".to_string()).into());
        assert_error_contains(result, "origin is required");

        let result: anyhow::Result<()> = Err(FairfareError::NotFound("tip 9".to_string()).into());
        assert_fairfare_error(result, |e| matches!(e, FairfareError::NotFound(_)));
    }
}
