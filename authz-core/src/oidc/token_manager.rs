use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use josekit::jwk::alg::rsa::RsaKeyPair;
use shared::config::JwtConfig;
use shared::domain::entities::User;
use shared::{AppError, AppResult};
use uuid::Uuid;

use super::claims::{Claims, TokenError, TokenType};

const KEY_ID: &str = "heimdall-rs256";

/// A freshly signed token together with the claims baked into it.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and verifies RS256 tokens. The key pair is loaded once at startup
/// and read-only afterwards; the public half is served as a JWK set.
pub struct TokenManager {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public_jwks: serde_json::Value,
    access_ttl: Duration,
    refresh_ttl: Duration,
    remember_me_refresh_ttl: Duration,
}

impl TokenManager {
    pub fn from_key_files(config: &JwtConfig) -> AppResult<Self> {
        let private_pem = std::fs::read(&config.private_key_path).map_err(|e| {
            AppError::Internal(format!("read {}: {}", config.private_key_path, e))
        })?;
        let public_pem = std::fs::read(&config.public_key_path).map_err(|e| {
            AppError::Internal(format!("read {}: {}", config.public_key_path, e))
        })?;
        Self::from_pem(
            &private_pem,
            &public_pem,
            config.issuer.clone(),
            config.access_expiry_secs,
            config.refresh_expiry_secs,
            config.remember_me_refresh_expiry_secs,
        )
    }

    pub fn from_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        issuer: String,
        access_expiry_secs: i64,
        refresh_expiry_secs: i64,
        remember_me_refresh_expiry_secs: i64,
    ) -> AppResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| AppError::Internal(format!("private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| AppError::Internal(format!("public key: {}", e)))?;
        let public_jwks = Self::build_jwks(private_pem)?;
        Ok(Self {
            issuer,
            encoding_key,
            decoding_key,
            public_jwks,
            access_ttl: Duration::seconds(access_expiry_secs),
            refresh_ttl: Duration::seconds(refresh_expiry_secs),
            remember_me_refresh_ttl: Duration::seconds(remember_me_refresh_expiry_secs),
        })
    }

    fn build_jwks(private_pem: &[u8]) -> AppResult<serde_json::Value> {
        let key_pair = RsaKeyPair::from_pem(private_pem)
            .map_err(|e| AppError::Internal(format!("jwk derivation: {}", e)))?;
        let mut jwk = key_pair.to_jwk_public_key();
        jwk.set_key_id(KEY_ID);
        jwk.set_algorithm("RS256");
        jwk.set_key_use("sig");
        let jwk: serde_json::Value = serde_json::from_str(&jwk.to_string())?;
        Ok(serde_json::json!({"keys": [jwk]}))
    }

    /// The JWK set advertised at the well-known endpoint.
    pub fn jwks(&self) -> serde_json::Value {
        self.public_jwks.clone()
    }

    pub fn access_expiry_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn refresh_expiry_secs(&self, remember_me: bool) -> i64 {
        if remember_me {
            self.remember_me_refresh_ttl.num_seconds()
        } else {
            self.refresh_ttl.num_seconds()
        }
    }

    /// Sign a token of the given kind for a user. Role names are pinned on
    /// access tokens only.
    pub fn sign(
        &self,
        user: &User,
        roles: &[String],
        token_type: TokenType,
        mfa_verified: bool,
        remember_me: bool,
    ) -> AppResult<SignedToken> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => {
                if remember_me {
                    self.remember_me_refresh_ttl
                } else {
                    self.refresh_ttl
                }
            }
        };
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user.id.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
            user_id: user.id.to_string(),
            tenant_id: user.tenant_id.to_string(),
            email: user.email.clone(),
            roles: match token_type {
                TokenType::Access => Some(roles.to_vec()),
                TokenType::Refresh => None,
            },
            mfa_verified,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(KEY_ID.to_string());
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token signing: {}", e)))?;
        Ok(SignedToken { token, claims })
    }

    /// Verify signature, validity window and token kind. Revocation is the
    /// session index's concern, not this layer's.
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_nbf = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        if data.claims.token_type != expected {
            return Err(TokenError::WrongType);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rsa_private.pem"));
    const PUBLIC_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rsa_public.pem"));

    fn manager() -> TokenManager {
        TokenManager::from_pem(
            PRIVATE_PEM.as_bytes(),
            PUBLIC_PEM.as_bytes(),
            "https://heimdall.test".to_string(),
            900,
            7 * 24 * 3600,
            30 * 24 * 3600,
        )
        .unwrap()
    }

    fn user() -> User {
        User::new(
            Uuid::new_v4(),
            "a@x.test".to_string(),
            "idp-1".to_string(),
            Some("A".to_string()),
            Some("X".to_string()),
        )
    }

    #[test]
    fn sign_and_decode_round_trip() {
        let manager = manager();
        let user = user();
        let signed = manager
            .sign(&user, &["admin".to_string()], TokenType::Access, false, false)
            .unwrap();
        let claims = manager.decode(&signed.token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "a@x.test");
        assert_eq!(claims.roles.as_deref(), Some(&["admin".to_string()][..]));
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn refresh_tokens_carry_no_roles() {
        let manager = manager();
        let signed = manager
            .sign(&user(), &["admin".to_string()], TokenType::Refresh, false, false)
            .unwrap();
        assert!(signed.claims.roles.is_none());
        assert_eq!(signed.claims.exp - signed.claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn remember_me_extends_the_refresh_lifetime() {
        let manager = manager();
        let signed = manager
            .sign(&user(), &[], TokenType::Refresh, false, true)
            .unwrap();
        assert_eq!(signed.claims.exp - signed.claims.iat, 30 * 24 * 3600);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let manager = manager();
        let signed = manager
            .sign(&user(), &[], TokenType::Refresh, false, false)
            .unwrap();
        assert_eq!(
            manager.decode(&signed.token, TokenType::Access),
            Err(TokenError::WrongType)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let manager = manager();
        assert!(matches!(
            manager.decode("not-a-token", TokenType::Access),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn jwks_exposes_one_rs256_key() {
        let jwks = manager().jwks();
        let keys = jwks["keys"].as_array().unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0]["alg"], "RS256");
        assert_eq!(keys[0]["kty"], "RSA");
        assert_eq!(keys[0]["use"], "sig");
        assert!(keys[0]["n"].is_string());
    }
}
