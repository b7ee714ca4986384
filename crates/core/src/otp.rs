//! One-time codes for visitor e-mail verification.
//!
//! A pending registration stores only the hash of its code, bound to the
//! e-mail address so a code issued for one address never verifies another.

use chrono::Duration;
use rand::Rng;

use crate::error::CoreError;
use crate::hashing::sha256_hex;
use crate::types::Timestamp;

/// Number of digits in a verification code.
pub const CODE_LENGTH: usize = 6;

/// Minimum delay between two codes sent to the same address.
pub const RESEND_COOLDOWN_SECS: i64 = 60;

/// Generate a zero-padded numeric code of [`CODE_LENGTH`] digits.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

/// Hash a code for storage. The e-mail is part of the digest input.
pub fn hash_code(email: &str, code: &str) -> String {
    sha256_hex(format!("{email}:{}", code.trim()).as_bytes())
}

/// Snapshot of a pending verification as needed to accept or refuse a code.
#[derive(Debug, Clone, Copy)]
pub struct VerificationState {
    pub attempts: i32,
    pub max_attempts: i32,
    pub expires_at: Timestamp,
    pub sent_at: Timestamp,
}

impl VerificationState {
    /// Whether another code may be checked at `now`.
    pub fn check(&self, now: Timestamp) -> Result<(), CoreError> {
        if self.attempts >= self.max_attempts {
            return Err(CoreError::Forbidden(
                "Too many incorrect codes. Request a new one.".to_string(),
            ));
        }
        if now >= self.expires_at {
            return Err(CoreError::Validation(
                "Verification code expired. Request a new one.".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a fresh code may be sent at `now`.
    pub fn check_resend(&self, now: Timestamp) -> Result<(), CoreError> {
        let ready_at = self.sent_at + Duration::seconds(RESEND_COOLDOWN_SECS);
        if now < ready_at {
            let wait = (ready_at - now).num_seconds().max(1);
            return Err(CoreError::Conflict(format!(
                "A code was sent recently. Try again in {wait} seconds."
            )));
        }
        Ok(())
    }
}
