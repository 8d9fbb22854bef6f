//! Bearer token claims and verification
//!
//! Tokens are RS256 JWTs signed by the authentication service. Every service
//! verifies them with the public key.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Linked employee ID
    pub employee_id: String,
    /// User email
    pub email: String,
    /// Role ID at the time the token was issued
    pub role: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Read a PEM key from an environment variable holding either the PEM itself
/// or a path to a PEM file.
pub fn read_pem_from_env(var: &str) -> Result<String> {
    let value =
        std::env::var(var).map_err(|_| anyhow::anyhow!("{} environment variable not set", var))?;

    if value.starts_with("-----BEGIN") {
        return Ok(value);
    }

    let pem = std::fs::read_to_string(&value)
        .map_err(|e| anyhow::anyhow!("Failed to read key file {}: {}", value, e))?;
    Ok(pem.trim().to_string())
}

/// Verifies bearer tokens
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from an RSA public key in PEM format
    pub fn new(public_key_pem: &str) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Create a verifier from `JWT_PUBLIC_KEY`
    pub fn from_env() -> Result<Self> {
        let public_key = read_pem_from_env("JWT_PUBLIC_KEY")?;
        Self::new(&public_key)
    }

    /// Validate a token and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}
