//! Token decoding and signature verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};

/// Verifies a bearer token and yields validated claims.
///
/// Trait seam so the API middleware can be tested with a stub validator.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// HS256 shared-secret validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            key: DecodingKey::from_secret(&secret),
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        // Claims carry explicit `issued_at`/`expires_at` fields instead of the
        // registered `exp`/`iat`, so the library's time checks are disabled and
        // `validate_claims` owns the time window.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &validation)
            .map_err(|e| TokenValidationError::Invalid(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use storefront_core::UserId;

    use crate::Role;

    fn mint(secret: &str, claims: &JwtClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("failed to encode jwt")
    }

    fn test_claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            roles: vec![Role::new("admin")],
            issued_at: now,
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn round_trips_a_valid_token() {
        let now = Utc::now();
        let claims = test_claims(now);
        let token = mint("test-secret", &claims);

        let validator = Hs256JwtValidator::new(b"test-secret".to_vec());
        let decoded = validator.validate(&token, now).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let token = mint("test-secret", &test_claims(now));

        let validator = Hs256JwtValidator::new(b"other-secret".to_vec());
        assert!(matches!(
            validator.validate(&token, now),
            Err(TokenValidationError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let issued = Utc::now() - Duration::hours(1);
        let token = mint("test-secret", &test_claims(issued));

        let validator = Hs256JwtValidator::new(b"test-secret".to_vec());
        assert_eq!(
            validator.validate(&token, Utc::now()),
            Err(TokenValidationError::Expired)
        );
    }
}
