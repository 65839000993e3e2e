//! JWT 토큰 처리.
//!
//! 계정 ID, 역할, 발급/만료 시각을 담은 서명 토큰을 발급하고 검증합니다.
//! 서명 키는 시작 시 한 번 로드되며, 키를 교체하면 이미 발급된 토큰은 모두 무효가 됩니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tasker_core::{Account, Role, MAX_TOKEN_TTL_MINUTES};
use uuid::Uuid;

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 계정 ID
    pub sub: Uuid,
    /// 발급 시점의 역할
    pub role: Role,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 주어진 시각 기준 만료 여부.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("잘못된 토큰")]
    InvalidToken,
}

/// 토큰 발급기 겸 검증기.
///
/// 요청 간에 공유되는 불변 상태입니다. 검증은 순수 계산이며 저장소에 접근하지 않습니다.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// 새 발급기 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC 서명 키
    /// * `ttl_minutes` - 토큰 유효 시간 (분), `1..=MAX_TOKEN_TTL_MINUTES`로 제한
    pub fn new(secret: &SecretString, ttl_minutes: i64) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        // 만료는 발급기와 같은 시계로 엄격하게 판정
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl: Duration::minutes(ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES)),
        }
    }

    /// 현재 시각 기준으로 토큰 발급.
    pub fn issue(&self, account: &Account) -> Result<String, JwtError> {
        self.issue_at(account, Utc::now())
    }

    /// 지정한 시각 기준으로 토큰 발급.
    pub fn issue_at(&self, account: &Account, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = Claims {
            sub: account.id,
            role: account.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(JwtError::from)
    }

    /// 토큰 검증.
    ///
    /// 형식 오류, 서명 불일치, 만료는 모두 에러입니다.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            }
        })?;

        if data.claims.is_expired_at(Utc::now()) {
            return Err(JwtError::TokenExpired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasker_core::NewAccount;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(secret), 60)
    }

    fn account(role: Role) -> Account {
        NewAccount::new("Ada", "ada@example.com", "hash".into(), role)
            .into_account(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = issuer(TEST_SECRET);
        let acct = account(Role::Admin);

        let token = issuer.issue(&acct).unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(claims.sub, acct.id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer(TEST_SECRET);
        let token = issuer
            .issue_at(&account(Role::User), Utc::now() - Duration::hours(2))
            .unwrap();

        assert!(matches!(issuer.validate(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_invalid_token() {
        let result = issuer(TEST_SECRET).validate("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_rotated_secret_invalidates_tokens() {
        let token = issuer(TEST_SECRET).issue(&account(Role::User)).unwrap();

        let rotated = issuer("rotated-secret-key-for-testing-minimum-32-chars");
        assert!(matches!(rotated.validate(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_out_of_range_ttl_is_clamped() {
        let issuer = TokenIssuer::new(&SecretString::from("clamp-secret"), i64::MAX);
        let now = Utc::now();
        let token = issuer.issue_at(&account(Role::User), now).unwrap();
        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL_MINUTES * 60);
    }

    #[test]
    fn test_debug_hides_keys() {
        let out = format!("{:?}", issuer(TEST_SECRET));
        assert!(!out.contains(TEST_SECRET));
        assert!(out.contains("ttl_minutes"));
    }
}
