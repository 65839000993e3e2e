//! 비밀번호 해싱 유틸리티.
//!
//! Argon2 기반 비밀번호 해싱 및 검증.
//! 해싱은 CPU를 오래 점유하므로 비동기 호출부에서는 `spawn_blocking`으로 감쌉니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 존재하지 않는 이메일로 로그인할 때 검증에 사용하는 해시.
///
/// 계정 유무와 관계없이 같은 비용의 검증을 수행해 응답 시간 차이를 줄입니다.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("tasker-dummy-password").ok());

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하며 호출마다 새 솔트를 생성합니다.
///
/// # Arguments
///
/// * `password` - 해싱할 평문 비밀번호
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// # Returns
///
/// 일치하면 `Ok(true)`, 불일치하면 `Ok(false)`. 해시 형식이 잘못되면 에러.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 저장된 해시가 없을 때(계정 없음) 수행하는 검증.
///
/// 결과는 항상 `false`입니다.
pub fn verify_against_dummy(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
