//! Access token issuance
//!
//! Tokens are RS256 JWTs carrying the user id, linked employee id, email and
//! role. Permissions are not embedded; they are resolved from the role store
//! on every authenticated request.

use anyhow::Result;
use common::token::{Claims, TokenVerifier, read_pem_from_env};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::repositories::Credential;

/// Default access token lifetime: 24 hours
const DEFAULT_ACCESS_TOKEN_EXPIRY: u64 = 86_400;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens
    pub private_key: String,
    /// Public key for verifying tokens
    pub public_key: String,
    /// Access token expiration time in seconds
    pub access_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY`: Private key for signing tokens (PEM format) or path to private key file
    /// - `JWT_PUBLIC_KEY`: Public key for verifying tokens (PEM format) or path to public key file
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 86400)
    pub fn from_env() -> Result<Self> {
        let private_key = read_pem_from_env("JWT_PRIVATE_KEY")?;
        let public_key = read_pem_from_env("JWT_PUBLIC_KEY")?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_ACCESS_TOKEN_EXPIRY);

        Ok(JwtConfig {
            private_key,
            public_key,
            access_token_expiry,
        })
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    verifier: TokenVerifier,
    access_token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let verifier = TokenVerifier::new(&config.public_key)?;

        Ok(JwtService {
            encoding_key,
            verifier,
            access_token_expiry: config.access_token_expiry,
        })
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, credential: &Credential) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: credential.user_id,
            employee_id: credential.employee_id.clone(),
            email: credential.email.clone(),
            role: credential.role_id.clone(),
            iat: now,
            exp: now + self.access_token_expiry,
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifier matching the signing key
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }
}
