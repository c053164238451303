//! Password hashing and access tokens.
//!
//! Passwords are hashed with Argon2id. Access tokens are HS256 JWTs carrying the account id and its role. The
//! [`JwtMiddlewareFactory`](crate::middleware::JwtMiddlewareFactory) verifies the token on every request and stores
//! the claims in the request extensions, where handlers pick them up through the [`JwtClaims`] extractor.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use bazaar_engine::db_types::{AdminId, CustomerId, MerchantId, Role};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The id of the account, interpreted according to `role`.
    pub sub: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn customer_id(&self) -> Result<CustomerId, ServerError> {
        self.require(Role::Customer).map(|_| CustomerId(self.sub))
    }

    pub fn merchant_id(&self) -> Result<MerchantId, ServerError> {
        self.require(Role::Merchant).map(|_| MerchantId(self.sub))
    }

    pub fn admin_id(&self) -> Result<AdminId, ServerError> {
        self.require(Role::Admin).map(|_| AdminId(self.sub))
    }

    fn require(&self, role: Role) -> Result<(), ServerError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions(format!("This action requires the {role} role")).into())
        }
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned().ok_or(ServerError::from(AuthError::MissingToken));
        ready(claims)
    }
}

//----------------------------------------------   Tokens  ------------------------------------------------------
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity: config.token_validity,
        }
    }

    /// Issue a new access token for the account.
    /// This method DOES NOT check the account's password. This must be done prior to calling `issue_token`.
    pub fn issue_token(&self, sub: i64, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims { sub, role, iat: now.timestamp(), exp: (now + self.validity).timestamp() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::ValidationError(format!("Could not sign access token. {e}")))
    }

    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<JwtClaims>(token, &self.decoding_key, &validation).map(|data| data.claims).map_err(|e| {
            debug!("🔐️ Access token rejected. {e}");
            match e.kind() {
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                    AuthError::PoorlyFormattedToken(e.to_string())
                },
                _ => AuthError::ValidationError(e.to_string()),
            }
        })
    }
}

//----------------------------------------------   Passwords  ---------------------------------------------------
pub fn hash_password(password: &str) -> Result<String, ServerError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServerError::Unspecified(format!("Could not hash password. {e}")))
}

/// Returns `Ok(false)` for a wrong password. A stored hash that cannot be parsed is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServerError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ServerError::BackendError(format!("Invalid password hash. {e}")))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
