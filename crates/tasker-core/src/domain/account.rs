//! 계정 및 역할.
//!
//! 역할은 닫힌 열거형이며, 권한 검사는 이 열거형 위의 순수 함수로 표현합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 사용자 역할.
///
/// 역할은 계정 생성 시점에만 결정되며 이후 변경 경로가 없습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 일반 사용자 - 자기 소유 데이터만 접근
    #[default]
    User,
    /// 관리자 - 계정 삭제, 통계 조회 가능
    Admin,
}

impl Role {
    /// 관리자 여부.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// 이 역할이 `required` 역할이 요구되는 작업을 수행할 수 있는지 확인.
    pub fn satisfies(&self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => self.is_admin(),
        }
    }

    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// 저장소 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 저장된 계정.
///
/// `password_hash`는 외부로 직렬화되지 않습니다. 응답에는 [`AccountProfile`]을 사용합니다.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

impl Account {
    /// 공개 프로필로 변환.
    pub fn profile(&self) -> AccountProfile {
        AccountProfile::from(self)
    }
}

/// 외부에 노출되는 계정 정보 (비밀번호 해시 제외).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// 새 계정 입력 (검증 및 해싱 완료 상태).
#[derive(Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewAccount {
    /// 이름/이메일을 정규화하여 생성.
    pub fn new(name: &str, email: &str, password_hash: String, role: Role) -> Self {
        Self {
            name: normalize_name(name),
            email: normalize_email(email),
            password_hash,
            role,
        }
    }

    /// 저장될 계정 레코드 생성.
    pub fn into_account(self, id: Uuid, now: DateTime<Utc>) -> Account {
        Account {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 프로필 수정 입력. 역할은 포함되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// 정규화된 수정 입력 생성.
    pub fn new(name: Option<&str>, email: Option<&str>) -> Self {
        Self {
            name: name.map(normalize_name),
            email: email.map(normalize_email),
        }
    }

    /// 변경 사항이 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    /// 계정에 변경 사항 적용.
    pub fn apply(&self, account: &mut Account, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(email) = &self.email {
            account.email = email.clone();
        }
        account.updated_at = now;
    }
}

/// 이메일 정규화 (앞뒤 공백 제거, 소문자).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 이름 정규화 (앞뒤 공백 제거).
pub fn normalize_name(name: &str) -> String {
    name.trim().to_string()
}
