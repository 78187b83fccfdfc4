use crate::error::{Error, Result};
use crate::models::application::ProposedSlot;
use crate::utils::time::from_rfc3339;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const TOKEN_TYPE: &str = "interview_confirmation";
const VALIDITY_DAYS: i64 = 7;

/// Verified contents of a confirmation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewToken {
    pub email: String,
    pub proposed_time: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InterviewClaims {
    email: String,
    time: String,
    #[serde(rename = "type")]
    token_type: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies signed, expiring confirmation tokens (HS256). Tokens
/// are self-contained bearer credentials; nothing is persisted server-side.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mints a token binding `email` to one proposed slot, valid for 7 days
    /// from `now`. Deterministic for a fixed `(email, slot, now)`, so
    /// re-issuing a batch with the same reference time reproduces the same
    /// tokens.
    pub fn issue(&self, email: &str, slot: &ProposedSlot, now: DateTime<Utc>) -> Result<String> {
        let claims = InterviewClaims {
            email: email.to_string(),
            time: slot.start.to_rfc3339(),
            token_type: TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(VALIDITY_DAYS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validates signature and payload. Expiry is checked against the
    /// injected `now` rather than the wall clock. A well-signed token minted
    /// for any other purpose is rejected as invalid.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<InterviewToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<InterviewClaims>(token, &self.decoding, &validation)
            .map_err(|e| Error::TokenInvalid(e.to_string()))?;
        let claims = data.claims;

        if now.timestamp() > claims.exp {
            return Err(Error::TokenExpired);
        }
        if claims.token_type != TOKEN_TYPE {
            return Err(Error::TokenInvalid("wrong token type".to_string()));
        }

        let proposed_time = from_rfc3339(&claims.time)
            .map_err(|_| Error::TokenInvalid("malformed time claim".to_string()))?;

        Ok(InterviewToken {
            email: claims.email,
            proposed_time,
            issued_at: DateTime::from_timestamp(claims.iat, 0)
                .ok_or_else(|| Error::TokenInvalid("malformed iat claim".to_string()))?,
            expires_at: DateTime::from_timestamp(claims.exp, 0)
                .ok_or_else(|| Error::TokenInvalid("malformed exp claim".to_string()))?,
        })
    }
}
