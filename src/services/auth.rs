use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::errors::AppError;

type HmacSha1 = Hmac<Sha1>;

/// Issues and checks stateless admin session tokens:
/// `base64url(expires|nonce|username) . base64url(hmac)`.
pub struct SessionSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    fn mac(&self) -> Result<HmacSha1, AppError> {
        HmacSha1::new_from_slice(&self.secret)
            .map_err(|e| AppError::Config(format!("invalid session secret: {e}")))
    }

    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let expires = (now + self.ttl).timestamp();
        let nonce = uuid::Uuid::new_v4().simple();
        let payload = format!("{expires}|{nonce}|{username}");

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Returns the username the token was issued to.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(AppError::Unauthorized)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AppError::Unauthorized)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AppError::Unauthorized)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&signature).map_err(|_| AppError::Unauthorized)?;

        let payload = String::from_utf8(payload).map_err(|_| AppError::Unauthorized)?;
        let mut parts = payload.splitn(3, '|');
        let expires: i64 = parts
            .next()
            .and_then(|e| e.parse().ok())
            .ok_or(AppError::Unauthorized)?;
        let username = parts.nth(1).ok_or(AppError::Unauthorized)?;

        if now.timestamp() >= expires {
            return Err(AppError::Unauthorized);
        }
        Ok(username.to_string())
    }

    /// Constant-time comparison of a supplied secret against the expected one.
    pub fn credentials_match(&self, expected: &str, supplied: &str) -> bool {
        let Ok(mut expected_mac) = self.mac() else {
            return false;
        };
        expected_mac.update(expected.as_bytes());
        let expected_digest = expected_mac.finalize().into_bytes();

        let Ok(mut supplied_mac) = self.mac() else {
            return false;
        };
        supplied_mac.update(supplied.as_bytes());
        supplied_mac.verify_slice(&expected_digest).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> SessionSigner {
        SessionSigner::new("test-secret", 60)
    }

    #[test]
    fn test_issue_then_verify() {
        let now = Utc::now();
        let token = signer().issue("admin", now).unwrap();
        assert_eq!(signer().verify(&token, now).unwrap(), "admin");
    }

    #[test]
    fn test_username_with_separator() {
        let now = Utc::now();
        let token = signer().issue("ad|min", now).unwrap();
        assert_eq!(signer().verify(&token, now).unwrap(), "ad|min");
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let token = signer().issue("admin", now).unwrap();
        let later = now + Duration::minutes(61);
        assert!(matches!(signer().verify(&token, later), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_tampered_or_foreign_token_rejected() {
        let now = Utc::now();
        let token = signer().issue("admin", now).unwrap();

        let other = SessionSigner::new("other-secret", 60);
        assert!(other.verify(&token, now).is_err());

        let (_, sig) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(format!("{}|x|root", now.timestamp() + 3600));
        assert!(signer().verify(&format!("{forged_payload}.{sig}"), now).is_err());

        assert!(signer().verify("admin_session", now).is_err());
        assert!(signer().verify("", now).is_err());
    }

    #[test]
    fn test_credentials_match() {
        let s = signer();
        assert!(s.credentials_match("admin123", "admin123"));
        assert!(!s.credentials_match("admin123", "admin124"));
        assert!(!s.credentials_match("admin123", ""));
    }
}
