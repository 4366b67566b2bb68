use chrono::Utc;
use jsonwebtoken::Validation;
use serde::Deserialize;

use crate::crypto::jwk::VerificationKey;
use crate::models::user::User;

/// The claims every session token must carry.
const REQUIRED_CLAIMS: [&str; 2] = ["exp", "iat"];

/// The claims read from a token. Anything else in the payload is ignored.
#[derive(Deserialize)]
struct TokenClaims {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    username: String,
    exp: i64,
    iat: i64,
}

impl TokenClaims {
    /// The user named by the claims; `id` wins over the registered `sub`.
    fn into_user(self) -> Option<User> {
        let id = self.id.or(self.sub)?;

        Some(User {
            id,
            username: self.username,
            exp: self.exp,
            iat: self.iat,
        })
    }
}

/// Verifies session tokens against the configured public key.
///
/// Stateless apart from the key material. Every failure, whether malformed
/// input, a bad signature, a foreign algorithm or an expired token, comes
/// back as `None`.
#[derive(Clone)]
pub struct TokenVerifier {
    key: VerificationKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Creates a new `TokenVerifier`.
    ///
    /// # Arguments
    ///
    /// * `key` - The verification key parsed at startup.
    pub fn new(key: VerificationKey) -> Self {
        let mut validation = Validation::new(key.algorithm());
        validation.leeway = 0;
        validation.validate_exp = true;
        // No audience is configured, so an `aud` claim is just another extra claim.
        validation.validate_aud = false;
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);

        Self { key, validation }
    }

    /// Verifies `token` and returns the user it was issued to.
    ///
    /// # Arguments
    ///
    /// * `token` - The bearer token to check.
    ///
    /// # Returns
    ///
    /// The decoded `User`, or `None` if the token is not valid right now.
    pub fn verify(&self, token: &str) -> Option<User> {
        let data = match jsonwebtoken::decode::<TokenClaims>(
            token,
            self.key.decoding_key(),
            &self.validation,
        ) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("❌ Token rejected: {}", e);
                return None;
            }
        };

        let Some(user) = data.claims.into_user() else {
            tracing::debug!("❌ Token carries neither id nor sub");
            return None;
        };

        if user.is_expired_at(Utc::now()) {
            tracing::debug!("❌ Token expired for user: {}", user.id);
            return None;
        }

        tracing::debug!("✅ Token verified for user: {}", user.id);
        Some(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::fixtures::{self, FOREIGN_PRIVATE_PEM};
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use sonic_rs::{JsonValueTrait, json};

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(fixtures::trusted_key())
    }

    #[test]
    fn valid_token_yields_its_claims() {
        let claims = fixtures::claims("7", "alice", 3600);
        let token = fixtures::sign(&claims);

        let user = verifier().verify(&token).unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.username, "alice");
        assert_eq!(user.exp, claims["exp"].as_i64().unwrap());
        assert_eq!(user.iat, claims["iat"].as_i64().unwrap());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = fixtures::sign(&fixtures::claims("7", "alice", -10));
        assert!(verifier().verify(&token).is_none());
    }

    #[test]
    fn token_expiring_this_second_is_rejected() {
        let token = fixtures::sign(&fixtures::claims("7", "alice", 0));
        assert!(verifier().verify(&token).is_none());
    }

    #[test]
    fn token_signed_by_another_key_is_rejected() {
        let token = fixtures::sign_with(FOREIGN_PRIVATE_PEM, &fixtures::claims("7", "alice", 3600));
        assert!(verifier().verify(&token).is_none());
    }

    #[test]
    fn hmac_token_is_rejected() {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &fixtures::claims("7", "alice", 3600),
            &EncodingKey::from_secret(fixtures::TRUSTED_PUBLIC_X.as_bytes()),
        )
        .unwrap();

        assert!(verifier().verify(&token).is_none());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = fixtures::valid_token("7", "alice");
        let forged = fixtures::valid_token("1", "admin");

        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(verifier().verify(&spliced).is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        let verifier = verifier();
        for token in ["", "not-a-token", "a.b.c", "....", "eyJhbGciOiJFZERTQSJ9.e30."] {
            assert!(verifier.verify(token).is_none(), "accepted {:?}", token);
        }
    }

    #[test]
    fn missing_claims_are_rejected() {
        let now = Utc::now().timestamp();
        let without_username = fixtures::sign(&json!({ "id": "7", "iat": now, "exp": now + 60 }));
        let without_exp = fixtures::sign(&json!({ "id": "7", "username": "alice", "iat": now }));
        let without_iat = fixtures::sign(&json!({ "id": "7", "username": "alice", "exp": now + 60 }));

        let verifier = verifier();
        assert!(verifier.verify(&without_username).is_none());
        assert!(verifier.verify(&without_exp).is_none());
        assert!(verifier.verify(&without_iat).is_none());
    }

    #[test]
    fn sub_claim_is_accepted_as_id() {
        let now = Utc::now().timestamp();
        let token = fixtures::sign(&json!({
            "sub": "u-9",
            "username": "bob",
            "iat": now,
            "exp": now + 60,
            "role": "member"
        }));

        let user = verifier().verify(&token).unwrap();
        assert_eq!(user.id, "u-9");
        assert_eq!(user.username, "bob");
    }

    #[test]
    fn id_wins_when_sub_is_also_present() {
        let now = Utc::now().timestamp();
        let token = fixtures::sign(&json!({
            "id": "7",
            "sub": "user-7",
            "username": "alice",
            "iat": now,
            "exp": now + 600
        }));

        let user = verifier().verify(&token).unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn audience_claim_is_ignored() {
        let now = Utc::now().timestamp();
        let token = fixtures::sign(&json!({
            "id": "7",
            "aud": "chatter",
            "username": "alice",
            "iat": now,
            "exp": now + 600
        }));

        assert_eq!(verifier().verify(&token).map(|u| u.id), Some("7".to_string()));
    }

    #[test]
    fn token_without_any_identifier_is_rejected() {
        let now = Utc::now().timestamp();
        let token = fixtures::sign(&json!({ "username": "alice", "iat": now, "exp": now + 600 }));
        assert!(verifier().verify(&token).is_none());
    }
}
