//! Upload tokens binding an upload session to a video record.

use crate::error::AuthError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Issuer written into every token this service signs.
pub const ISSUER: &str = "encoder";

const BEARER: &str = "Bearer";

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("static pattern"))
}

/// Identifier of the catalog record an upload belongs to.
///
/// It names a working directory and a storage prefix, so only a
/// conservative character set is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        if id_pattern().is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AuthError::Rejected)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UploadClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    video_id: String,
}

/// HS256 signer/verifier for upload tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        // Upload tokens are minted by the catalog API without expiry or audience.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn sign(&self, video_id: &VideoId) -> Result<String, AuthError> {
        let claims = UploadClaims {
            iss: Some(ISSUER.to_string()),
            video_id: video_id.0.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Sign(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<VideoId, AuthError> {
        let data = decode::<UploadClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| AuthError::Rejected)?;
        VideoId::parse(&data.claims.video_id)
    }

    /// Verifies an `Authorization` header value of the form `Bearer <token>`.
    pub fn verify_bearer(&self, header: &str) -> Result<VideoId, AuthError> {
        let mut parts = header.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(BEARER), Some(token), None) if !token.is_empty() => self.verify(token),
            _ => Err(AuthError::Rejected),
        }
    }
}
