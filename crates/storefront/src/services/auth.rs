//! Login flow logic.
//!
//! Validation that runs before the backend is involved. The backend makes
//! the real decisions (passwords, OTP validity, lockouts); these checks
//! exist to give instant feedback and to avoid pointless round trips.

/// Length of a login one-time code.
pub const OTP_LENGTH: usize = 6;

/// Shown when the submitted code is not a 6-digit number.
pub const INVALID_OTP_MESSAGE: &str = "Please enter the 6-digit code";

/// Shown when login credentials are rejected.
pub const BAD_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Shown when an email address fails local validation.
pub const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address";

/// Whether a submitted code is exactly six ASCII digits.
#[must_use]
pub fn is_valid_otp(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_otp() {
        assert!(is_valid_otp("483920"));
        assert!(is_valid_otp("000000"));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(!is_valid_otp("12345"));
        assert!(!is_valid_otp("1234567"));
        assert!(!is_valid_otp(""));
    }

    #[test]
    fn test_non_digits_rejected() {
        assert!(!is_valid_otp("12a456"));
        assert!(!is_valid_otp("12 456"));
        // Non-ASCII digits have the right char count but must fail.
        assert!(!is_valid_otp("१२३४५६"));
    }
}
