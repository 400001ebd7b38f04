/// JWT issuance and validation using HS256
///
/// The signer is built once from [`AuthConfig`] at startup and shared through
/// application state; there is no ambient key storage.
use crate::config::AuthConfig;
use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Audience
    pub aud: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    audience: String,
    issuer: String,
    ttl_secs: i64,
}

impl JwtSigner {
    pub fn new(cfg: &AuthConfig) -> Self {
        JwtSigner {
            encoding: EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
            audience: cfg.jwt_audience.clone(),
            issuer: cfg.jwt_issuer.clone(),
            ttl_secs: cfg.jwt_ttl_secs,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::seconds(self.ttl_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.clone()]);
        validation.set_issuer(&[self.issuer.clone()]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_audience: "feed-clients".to_string(),
            jwt_issuer: "feed-service".to_string(),
            jwt_ttl_secs: 3600,
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let signer = JwtSigner::new(&test_config());
        let user_id = Uuid::new_v4();

        let token = signer.issue(user_id).expect("should sign token");
        assert_eq!(token.matches('.').count(), 2);

        let claims = signer.verify(&token).expect("should verify token");
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.aud, "feed-clients");
        assert_eq!(claims.iss, "feed-service");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let signer = JwtSigner::new(&test_config());
        assert!(signer.verify("not.a.token").is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_audience() {
        let signer = JwtSigner::new(&test_config());

        let mut other_cfg = test_config();
        other_cfg.jwt_audience = "someone-else".to_string();
        let other = JwtSigner::new(&other_cfg);

        let token = other.issue(Uuid::new_v4()).expect("should sign token");
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let mut cfg = test_config();
        cfg.jwt_ttl_secs = -120;
        let signer = JwtSigner::new(&cfg);

        let token = signer.issue(Uuid::new_v4()).expect("should sign token");
        assert!(signer.verify(&token).is_err());
    }
}
