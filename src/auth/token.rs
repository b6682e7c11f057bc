use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{config::TokenConfig, models::user::UserId};

const ALGORITHM: Algorithm = Algorithm::HS256;
const USER_ID_CLAIM: &str = "user_id";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("invalid token: unable to find user id in token claims")]
    ClaimMissing,
    #[error("invalid token: unexpected user id type present in token")]
    ClaimTypeInvalid,
    #[error("unable to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(inner: jsonwebtoken::errors::Error) -> Self {
        match inner.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::BadSignature,
            _ => TokenError::Malformed,
        }
    }
}

#[derive(Debug, Serialize)]
struct Claims {
    authorized: bool,
    user_id: UserId,
    exp: i64,
}

/// Issues and checks HS256 access tokens carrying a user id.
///
/// Tokens are never stored; they stop working once `exp` has passed.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifespan: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;

        TokenService {
            encoding_key: EncodingKey::from_secret(&config.signing_key),
            decoding_key: DecodingKey::from_secret(&config.signing_key),
            validation,
            lifespan: Duration::hours(config.lifespan_hours),
        }
    }

    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues a token as if it had been minted at `issued_at`.
    pub fn issue_at(&self, user_id: UserId, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            authorized: true,
            user_id,
            exp: (issued_at + self.lifespan).timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(TokenError::Signing)
    }

    /// Checks structure, algorithm, signature and expiry without looking at the identity.
    pub fn verify(&self, token: &str) -> Result<(), TokenError> {
        self.decode_claims(token).map(|_| ())
    }

    /// Fully verifies `token`, then reads its user id claim.
    pub fn extract_user_id(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = self.decode_claims(token)?;
        let value = claims.get(USER_ID_CLAIM).ok_or(TokenError::ClaimMissing)?;
        user_id_from_claim(value)
    }

    fn decode_claims(&self, token: &str) -> Result<Map<String, Value>, TokenError> {
        let data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

// JSON numbers may arrive as floats; accept them when they are whole and non-negative.
fn user_id_from_claim(value: &Value) -> Result<UserId, TokenError> {
    let Value::Number(number) = value else {
        return Err(TokenError::ClaimTypeInvalid);
    };

    if let Some(id) = number.as_i64() {
        return if id >= 0 {
            Ok(id)
        } else {
            Err(TokenError::ClaimTypeInvalid)
        };
    }

    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(TokenError::ClaimTypeInvalid),
    }
}
