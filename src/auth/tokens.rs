//! Access token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the server secret. They carry the user
//! id, email and role so request handlers can authorize without a database
//! round trip.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::Claims;
use crate::domain::accounts::UserRole;

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl_seconds: u64,
}

impl TokenService {
    pub fn new(secret: &str, issuer: String, audience: String, ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            ttl_seconds,
        }
    }

    /// Issue an access token for the given user.
    pub fn issue(&self, user_id: Uuid, email: &str, role: UserRole) -> Result<(String, i64)> {
        let now = chrono::Utc::now().timestamp();
        let exp = now + self.ttl_seconds as i64;

        let claims = Claims {
            sub: user_id.to_string(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
            iat: now,
            exp,
            email: email.to_string(),
            role,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign access token")?;

        Ok((token, exp))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Invalid or expired token")?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            "test-secret",
            "heavenknows".to_string(),
            "heavenknows-api".to_string(),
            3600,
        )
    }

    #[test]
    fn issued_tokens_verify_round_trip() {
        let svc = service();
        let user_id = Uuid::new_v4();

        let (token, exp) = svc
            .issue(user_id, "tourist@example.com", UserRole::Tourist)
            .unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "tourist@example.com");
        assert_eq!(claims.role, UserRole::Tourist);
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let svc = service();
        let other = TokenService::new(
            "different-secret",
            "heavenknows".to_string(),
            "heavenknows-api".to_string(),
            3600,
        );

        let (token, _) = other
            .issue(Uuid::new_v4(), "x@example.com", UserRole::Admin)
            .unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let svc = service();
        let other = TokenService::new(
            "test-secret",
            "heavenknows".to_string(),
            "some-other-api".to_string(),
            3600,
        );

        let (token, _) = other
            .issue(Uuid::new_v4(), "x@example.com", UserRole::Tourist)
            .unwrap();
        assert!(svc.verify(&token).is_err());
    }
}
