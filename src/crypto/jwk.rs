use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};

use crate::error::{AuthError, Result};

/// The public key that session tokens are verified against.
///
/// Built once at startup from the configured JSON Web Key. Only ever used
/// for verification; there is no signing side in this crate.
#[derive(Clone)]
pub struct VerificationKey {
    key: DecodingKey,
    algorithm: Algorithm,
}

impl VerificationKey {
    /// Parses a public JSON Web Key.
    ///
    /// # Arguments
    ///
    /// * `json` - The JWK as JSON text.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `VerificationKey`, or a configuration error
    /// when the key is malformed, symmetric, or of an unsupported type.
    pub fn from_jwk_json(json: &str) -> Result<Self> {
        let jwk: Jwk = sonic_rs::from_str(json)
            .map_err(|e| AuthError::Configuration(format!("JWK parse error: {}", e)))?;

        Self::from_jwk(&jwk)
    }

    /// Builds a verification key from an already parsed JWK.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
        if let AlgorithmParameters::OctetKey(_) = jwk.algorithm {
            return Err(AuthError::Configuration(
                "Symmetric JWK cannot be used as a public verification key".to_string(),
            ));
        }

        let algorithm = match jwk.common.key_algorithm.as_ref() {
            Some(declared) => signing_algorithm(declared)?,
            None => inferred_algorithm(&jwk.algorithm)?,
        };

        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| AuthError::Configuration(format!("JWK import error: {}", e)))?;

        tracing::debug!("🔑 Verification key loaded ({:?})", algorithm);

        Ok(Self { key, algorithm })
    }

    /// The signature algorithm tokens must be signed with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }
}

fn signing_algorithm(declared: &KeyAlgorithm) -> Result<Algorithm> {
    let algorithm = match declared {
        KeyAlgorithm::RS256 => Algorithm::RS256,
        KeyAlgorithm::RS384 => Algorithm::RS384,
        KeyAlgorithm::RS512 => Algorithm::RS512,
        KeyAlgorithm::PS256 => Algorithm::PS256,
        KeyAlgorithm::PS384 => Algorithm::PS384,
        KeyAlgorithm::PS512 => Algorithm::PS512,
        KeyAlgorithm::ES256 => Algorithm::ES256,
        KeyAlgorithm::ES384 => Algorithm::ES384,
        KeyAlgorithm::EdDSA => Algorithm::EdDSA,
        other => {
            return Err(AuthError::Configuration(format!(
                "JWK algorithm {:?} is not an asymmetric signature algorithm",
                other
            )));
        }
    };

    Ok(algorithm)
}

fn inferred_algorithm(params: &AlgorithmParameters) -> Result<Algorithm> {
    match params {
        AlgorithmParameters::RSA(_) => Ok(Algorithm::RS256),
        AlgorithmParameters::OctetKeyPair(_) => Ok(Algorithm::EdDSA),
        AlgorithmParameters::EllipticCurve(ec) => match ec.curve {
            EllipticCurve::P256 => Ok(Algorithm::ES256),
            EllipticCurve::P384 => Ok(Algorithm::ES384),
            ref curve => Err(AuthError::Configuration(format!(
                "Unsupported elliptic curve {:?}",
                curve
            ))),
        },
        AlgorithmParameters::OctetKey(_) => Err(AuthError::Configuration(
            "Symmetric JWK cannot be used as a public verification key".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::fixtures;

    const RSA_N: &str = "vdH6rR4xPdl4RPpHhQaRgWwlVtknSsXlRq7AfsSIFp3EZ4N1ixA14HzVYit-X3T8XyCNz1nOCt8_fzzZnMIJKHnTs3Pl3OR4dMe4nwLGVcZqhavbWUYDnzY1ZlVimIRaAQDeflI-5EiEPfQJ3f6_tIgPcUaWrhxv5eqQ7HqTkMP1FdsjyvEy0SgzyW4LcOXP8HLW8DyeGyZ0wYGDLhpHPl7KXJ80LtFszGCzTgo1Z9ql1UfUPu7J0nbFL8ANYHCTbcJgLEwyx461rTlkty-gOydpwhV8X_ohRADG3ZMo-by1481qqaqQ3LsOrYHTNejTerRJ0Iz49_1QDqD3kvLMIw";

    #[test]
    fn ed25519_key_infers_eddsa() {
        let key = VerificationKey::from_jwk_json(&fixtures::trusted_jwk()).unwrap();
        assert_eq!(key.algorithm(), Algorithm::EdDSA);
    }

    #[test]
    fn rsa_key_infers_rs256() {
        let json = format!(r#"{{"kty":"RSA","n":"{}","e":"AQAB"}}"#, RSA_N);
        let key = VerificationKey::from_jwk_json(&json).unwrap();
        assert_eq!(key.algorithm(), Algorithm::RS256);
    }

    #[test]
    fn declared_algorithm_wins() {
        let json = format!(r#"{{"kty":"RSA","alg":"PS256","n":"{}","e":"AQAB"}}"#, RSA_N);
        let key = VerificationKey::from_jwk_json(&json).unwrap();
        assert_eq!(key.algorithm(), Algorithm::PS256);
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = VerificationKey::from_jwk_json("{not json").err().unwrap();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn symmetric_key_is_rejected() {
        let err = VerificationKey::from_jwk_json(r#"{"kty":"oct","k":"c2VjcmV0"}"#)
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::Configuration(_)));
    }
}
