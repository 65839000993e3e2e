//! 인증 및 권한 부여.
//!
//! # 구성 요소
//!
//! - [`TokenIssuer`]: 서명 토큰 발급/검증
//! - [`hash_password`], [`verify_password`]: Argon2 비밀번호 해싱
//! - [`AdminCode`]: 관리자 등록 코드 검사
//! - [`session::resolve`]: Authorization 헤더 → [`Identity`]
//! - [`CurrentAccount`], [`AdminAccount`]: Axum 추출기
//! - [`require_role`]: 역할 가드
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn statistics(AdminAccount(identity): AdminAccount) -> impl IntoResponse {
//!     format!("Hello, {}!", identity.account().name)
//! }
//! ```

mod admin_code;
mod jwt;
mod middleware;
mod password;
mod roles;
pub mod session;

pub use admin_code::AdminCode;
pub use jwt::{Claims, JwtError, TokenIssuer};
pub use middleware::{AdminAccount, CurrentAccount};
pub use password::{hash_password, verify_against_dummy, verify_password, PasswordError};
pub use roles::{require_role, ADMIN_ONLY};
pub use session::Identity;
