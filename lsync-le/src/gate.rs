//! Passcode gate for the sync workflow
//!
//! Admins walk straight in. Everyone else needs the shared passcode once per
//! browser session; the unlocked flag lives in the session's own
//! [`SessionGate`] value, so ending the session locks the gate again.
//!
//! There is no attempt limit. The passcode keeps casual visitors out of the
//! studio; it is not account security.

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// Wrong passcode; the user may try again
    #[error("Incorrect passcode")]
    Mismatch,

    /// No passcode is configured, so only admins can enter
    #[error("Sync passcode is not configured")]
    NotConfigured,
}

/// Per-browser-session gate state
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    unlocked: bool,
    failed_attempts: u32,
}

impl SessionGate {
    /// Locked gate for a new browser session
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the caller may reach song selection
    pub fn is_unlocked(&self, is_privileged: bool) -> bool {
        is_privileged || self.unlocked
    }

    /// Check a passcode (case-sensitive, exact)
    ///
    /// On success the gate stays unlocked for the rest of the session.
    /// Failure has no side effect besides the attempt counter used in logs.
    pub fn verify(&mut self, candidate: &str, expected: &str) -> Result<(), GateError> {
        if expected.is_empty() {
            return Err(GateError::NotConfigured);
        }

        if candidate == expected {
            self.unlocked = true;
            info!(
                failed_attempts = self.failed_attempts,
                "Sync gate unlocked for session"
            );
            Ok(())
        } else {
            self.failed_attempts = self.failed_attempts.saturating_add(1);
            warn!(failed_attempts = self.failed_attempts, "Sync gate passcode mismatch");
            Err(GateError::Mismatch)
        }
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gate_is_locked() {
        let gate = SessionGate::new();
        assert!(!gate.is_unlocked(false));
    }

    #[test]
    fn test_privileged_bypasses_gate() {
        let gate = SessionGate::new();
        assert!(gate.is_unlocked(true));
    }

    #[test]
    fn test_correct_code_unlocks_for_session() {
        let mut gate = SessionGate::new();
        assert_eq!(gate.verify("Encore", "Encore"), Ok(()));
        assert!(gate.is_unlocked(false));
        // stays unlocked
        assert!(gate.is_unlocked(false));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut gate = SessionGate::new();
        assert_eq!(gate.verify("encore", "Encore"), Err(GateError::Mismatch));
        assert!(!gate.is_unlocked(false));
    }

    #[test]
    fn test_retries_are_unlimited() {
        let mut gate = SessionGate::new();
        for _ in 0..50 {
            assert_eq!(gate.verify("wrong", "Encore"), Err(GateError::Mismatch));
        }
        assert_eq!(gate.failed_attempts(), 50);
        assert_eq!(gate.verify("Encore", "Encore"), Ok(()));
        assert!(gate.is_unlocked(false));
    }

    #[test]
    fn test_new_session_requires_verification_again() {
        let mut gate = SessionGate::new();
        gate.verify("Encore", "Encore").unwrap();

        let fresh = SessionGate::new();
        assert!(!fresh.is_unlocked(false));
        assert!(fresh.is_unlocked(true));
    }

    #[test]
    fn test_empty_expected_code_never_unlocks() {
        let mut gate = SessionGate::new();
        assert_eq!(gate.verify("", ""), Err(GateError::NotConfigured));
        assert!(!gate.is_unlocked(false));
    }
}
