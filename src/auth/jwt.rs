use chrono::{Duration, Utc};
use influence_api::TokenPair;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token generation failed: {0}")]
    GenerationFailed(jsonwebtoken::errors::Error),
    #[error("Token verification failed: {0}")]
    VerificationFailed(jsonwebtoken::errors::Error),
    #[error("Expected a {expected:?} token, got {actual:?}")]
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Identity claims embedded in every credential.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct IdentityClaims {
    pub email: Option<String>,
    pub name: Option<String>,
    pub user_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_account_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
    #[serde(flatten)]
    pub identity: IdentityClaims,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Signs an access/refresh pair carrying the same identity claims.
    pub fn issue_pair(&self, user_id: Uuid, identity: &IdentityClaims) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access: self.generate_token(user_id, identity, TokenType::Access, self.access_ttl)?,
            refresh: self.generate_token(user_id, identity, TokenType::Refresh, self.refresh_ttl)?,
        })
    }

    pub fn generate_token(
        &self,
        user_id: Uuid,
        identity: &IdentityClaims,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user_id,
            token_type,
            jti: Uuid::new_v4(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            identity: identity.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::GenerationFailed)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(JwtError::VerificationFailed)
    }

    pub fn verify_typed(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.verify_token(token)?;
        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// New access token from a refresh token; claims are carried over as-is.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String, JwtError> {
        let claims = self.verify_typed(refresh_token, TokenType::Refresh)?;
        self.generate_token(
            claims.sub,
            &claims.identity,
            TokenType::Access,
            self.access_ttl,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_jwt_manager() -> JwtManager {
        JwtManager::new(
            "my_secret_key_for_tests",
            Duration::minutes(5),
            Duration::days(1),
        )
    }

    fn identity() -> IdentityClaims {
        IdentityClaims {
            email: Some("a@x.com".to_string()),
            name: Some("A".to_string()),
            user_type: "influencer".to_string(),
            provider: Some("instagram".to_string()),
            provider_account_id: Some("1789".to_string()),
        }
    }

    #[test]
    fn issue_pair_embeds_identity_claims() {
        let jwt = make_jwt_manager();
        let user_id = Uuid::new_v4();
        let pair = jwt.issue_pair(user_id, &identity()).expect("pair");

        let access = jwt.verify_typed(&pair.access, TokenType::Access).unwrap();
        assert_eq!(access.sub, user_id);
        assert_eq!(access.identity, identity());
        assert!(access.exp > access.iat);

        let refresh = jwt.verify_typed(&pair.refresh, TokenType::Refresh).unwrap();
        assert!(refresh.exp > access.exp, "refresh must outlive access");
        assert_ne!(refresh.jti, access.jti);
    }

    #[test]
    fn provider_claims_are_omitted_when_absent() {
        let jwt = make_jwt_manager();
        let claims = IdentityClaims {
            provider: None,
            provider_account_id: None,
            ..identity()
        };
        let token = jwt
            .generate_token(Uuid::new_v4(), &claims, TokenType::Access, Duration::minutes(1))
            .unwrap();

        let verified = jwt.verify_token(&token).unwrap();
        assert_eq!(verified.identity.provider, None);
        assert_eq!(verified.identity.provider_account_id, None);
    }

    #[test]
    fn refresh_access_keeps_claims() {
        let jwt = make_jwt_manager();
        let user_id = Uuid::new_v4();
        let pair = jwt.issue_pair(user_id, &identity()).unwrap();

        let access = jwt.refresh_access(&pair.refresh).expect("refresh");
        let claims = jwt.verify_typed(&access, TokenType::Access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.identity, identity());
    }

    #[test]
    fn access_token_cannot_be_used_to_refresh() {
        let jwt = make_jwt_manager();
        let pair = jwt.issue_pair(Uuid::new_v4(), &identity()).unwrap();

        assert!(matches!(
            jwt.refresh_access(&pair.access),
            Err(JwtError::WrongTokenType { .. })
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = make_jwt_manager();
        let token = jwt
            .generate_token(
                Uuid::new_v4(),
                &identity(),
                TokenType::Access,
                Duration::minutes(-5),
            )
            .unwrap();

        assert!(matches!(
            jwt.verify_token(&token),
            Err(JwtError::VerificationFailed(_))
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = JwtManager::new("another_secret", Duration::minutes(5), Duration::days(1));
        let pair = other.issue_pair(Uuid::new_v4(), &identity()).unwrap();

        assert!(make_jwt_manager().verify_token(&pair.access).is_err());
    }
}
