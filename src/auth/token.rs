// HS256 JWT issuance and verification over a single shared secret
use anyhow::anyhow;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::{SecurityConfig, MAX_TOKEN_TTL_SECONDS};
use crate::models::{Claims, Role};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

fn base64url(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)
}

#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_seconds: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds: i64::try_from(ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Fails when no secret is configured; there is no built-in fallback.
    pub fn from_config(cfg: &SecurityConfig) -> anyhow::Result<Self> {
        let secret = cfg.jwt_secret.trim();
        if secret.is_empty() {
            return Err(anyhow!("JWT_SECRET is not set; refusing to sign tokens without a secret"));
        }
        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&cfg.token_ttl_seconds) {
            return Err(anyhow!(
                "token TTL must be between 1 and {} seconds, got {}",
                MAX_TOKEN_TTL_SECONDS,
                cfg.token_ttl_seconds
            ));
        }
        Ok(Self::new(secret.as_bytes(), cfg.token_ttl_seconds))
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Fails when `now + ttl` is not a representable timestamp.
    pub fn claims_for(&self, email: &str, role: Role, now: DateTime<Utc>) -> anyhow::Result<Claims> {
        let exp = Duration::try_seconds(self.ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| anyhow!("token TTL of {}s overflows the expiry timestamp", self.ttl_seconds))?;
        Ok(Claims {
            sub: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    pub fn sign(&self, claims: &Claims) -> anyhow::Result<String> {
        let header = Header {
            alg: ALGORITHM.into(),
            typ: "JWT".into(),
        };
        let header_b64 = base64url(&serde_json::to_vec(&header)?);
        let payload_b64 = base64url(&serde_json::to_vec(claims)?);

        let mut mac = self.mac();
        mac.update(format!("{}.{}", header_b64, payload_b64).as_bytes());
        let sig = base64url(&mac.finalize().into_bytes());

        Ok(format!("{}.{}.{}", header_b64, payload_b64, sig))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut parts = token.trim().split('.');
        let (h, p, s) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(p), Some(s), None) => (h, p, s),
            _ => return Err(TokenError::Malformed),
        };

        let header: Header =
            serde_json::from_slice(&decode_segment(h)?).map_err(|_| TokenError::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let mut mac = self.mac();
        mac.update(format!("{}.{}", h, p).as_bytes());
        mac.verify_slice(&decode_segment(s)?)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims =
            serde_json::from_slice(&decode_segment(p)?).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
