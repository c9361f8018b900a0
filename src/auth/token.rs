use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Role, SessionClaims};
use crate::config::SecurityConfig;

/// Payload signed into every token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: i64,
    pub email: String,
    pub rol: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Why a credential was rejected. All variants are 401 to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,

    #[error("expired")]
    Expired,

    #[error("invalid")]
    Invalid,
}

impl AuthError {
    /// Message shown to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "No se proporcionó un token de autenticación",
            AuthError::Expired => "Token expirado. Por favor inicia sesión nuevamente",
            AuthError::Invalid => "Token inválido",
        }
    }
}

#[derive(Debug, Error)]
#[error("JWT generation error: {0}")]
pub struct TokenGenerationError(String);

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Signs and verifies HS256 bearer tokens with the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("validation", &self.validation)
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl TokenService {
    pub fn new(config: &SecurityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            expiry: config.jwt_expiry(),
        }
    }

    pub fn issue(&self, subject: i64, email: &str, role: Role) -> Result<IssuedToken, TokenGenerationError> {
        self.issue_at(subject, email, role, Utc::now())
    }

    /// Issue a token as if signed at `issued_at`.
    pub fn issue_at(
        &self,
        subject: i64,
        email: &str,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenGenerationError> {
        let claims = TokenClaims {
            id: subject,
            email: email.to_string(),
            rol: role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.expiry).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenGenerationError(e.to_string()))?;

        Ok(IssuedToken { token, expires_in: self.expiry.num_seconds() })
    }

    /// Verify an `Authorization` header value of the form `Bearer <token>`.
    pub fn verify(&self, raw_header: Option<&str>) -> Result<SessionClaims, AuthError> {
        let token = raw_header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.verify_token(token)
    }

    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            }
        })?;

        Ok(SessionClaims {
            subject: data.claims.id,
            email: data.claims.email,
            role: data.claims.rol,
        })
    }
}
