//! 관리자 등록 코드.
//!
//! 시작 시 한 번 로드되는 비밀값이며 이후 읽기 전용입니다.
//! 평문 대신 SHA-256 다이제스트만 보관하고, 같은 길이의 다이제스트를 상수 시간으로 비교합니다.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// 관리자 등록 코드 검사기.
#[derive(Clone, Default)]
pub struct AdminCode {
    digest: Option<[u8; 32]>,
}

impl std::fmt::Debug for AdminCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCode")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

impl AdminCode {
    /// 설정값으로 생성. `None`이면 관리자 등록이 항상 거부됩니다.
    pub fn new(code: Option<&SecretString>) -> Self {
        Self {
            digest: code.map(|c| digest(c.expose_secret())),
        }
    }

    /// 관리자 코드가 설정되어 있는지 확인.
    pub fn is_configured(&self) -> bool {
        self.digest.is_some()
    }

    /// 제출된 코드가 설정값과 일치하는지 확인.
    pub fn matches(&self, supplied: Option<&str>) -> bool {
        let (Some(expected), Some(supplied)) = (self.digest.as_ref(), supplied) else {
            return false;
        };
        let actual = digest(supplied);
        expected[..].ct_eq(&actual[..]).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_configured_code() {
        let code = AdminCode::new(Some(&SecretString::from("letmein")));
        assert!(code.is_configured());
        assert!(code.matches(Some("letmein")));
        assert!(!code.matches(Some("letmein ")));
        assert!(!code.matches(None));
    }

    #[test]
    fn test_unconfigured_never_matches() {
        let code = AdminCode::new(None);
        assert!(!code.matches(Some("")));
        assert!(!code.matches(None));
        assert!(format!("{code:?}").contains("false"));
    }

    #[test]
    fn test_codes_differing_in_one_char_do_not_match() {
        let code = AdminCode::new(Some(&SecretString::from("admin-code-1")));
        assert!(!code.matches(Some("admin-code-2")));
        assert!(!code.matches(Some("Admin-code-1")));
        assert!(!code.matches(Some("")));
        assert!(code.matches(Some("admin-code-1")));
    }
}
