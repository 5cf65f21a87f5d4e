//! HS256 token decoding on top of the deterministic claims checks.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token decode failed: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Token validation boundary consumed by the HTTP middleware.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HS256 (shared-secret) JWT codec.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256Jwt {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign claims into a compact token. Used by tests and tooling; token
    /// issuance is otherwise outside this service.
    pub fn encode(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        // Expiry is carried as an RFC3339 claim and checked deterministically
        // below, not via the numeric `exp` claim.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stockmaster_core::UserId;

    use crate::Role;

    fn sample_claims() -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: UserId::new(),
            role: Role::Godownadmin,
            location: Some("Central Godown".to_string()),
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn round_trips_signed_claims() {
        let jwt = Hs256Jwt::new(b"test-secret");
        let claims = sample_claims();
        let token = jwt.encode(&claims).unwrap();
        let decoded = jwt.validate(&token, Utc::now()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_wrong_secret() {
        let claims = sample_claims();
        let token = Hs256Jwt::new(b"secret-a").encode(&claims).unwrap();
        let err = Hs256Jwt::new(b"secret-b").validate(&token, Utc::now());
        assert!(matches!(err, Err(JwtError::Decode(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let jwt = Hs256Jwt::new(b"test-secret");
        let claims = sample_claims();
        let token = jwt.encode(&claims).unwrap();
        let err = jwt.validate(&token, claims.expires_at + Duration::seconds(1));
        assert!(matches!(
            err,
            Err(JwtError::Claims(TokenValidationError::Expired))
        ));
    }
}
