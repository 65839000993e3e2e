//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 프로세스 시작 시 한 번 로드되며 이후에는 읽기 전용입니다.

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// 환경 변수 접두사 (`TASKER__AUTH__JWT_SECRET` 형식).
pub const ENV_PREFIX: &str = "TASKER";

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// 데이터베이스 설정.
///
/// `url`이 없으면 인메모리 저장소로 동작합니다.
#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub url: Option<SecretString>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 10,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// 토큰 서명 비밀 키 (필수)
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub jwt_secret: Option<SecretString>,
    /// 관리자 등록 코드. 없으면 관리자 등록이 비활성화됩니다.
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub admin_code: Option<SecretString>,
    /// 토큰 유효 시간 (분)
    pub token_ttl_minutes: i64,
}

/// 기본 토큰 유효 시간: 7일.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

/// 토큰 유효 시간 상한: 1년.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            admin_code: None,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| SecretString::from(s.as_str())))
}

fn builder_with_defaults(
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    let server = ServerConfig::default();
    let database = DatabaseConfig::default();
    let logging = LoggingConfig::default();

    config::Config::builder()
        .set_default("server.host", server.host)?
        .set_default("server.port", i64::from(server.port))?
        .set_default("server.request_timeout_secs", server.request_timeout_secs as i64)?
        .set_default("database.max_connections", i64::from(database.max_connections))?
        .set_default("database.acquire_timeout_secs", database.acquire_timeout_secs as i64)?
        .set_default("auth.token_ttl_minutes", DEFAULT_TOKEN_TTL_MINUTES)?
        .set_default("logging.level", logging.level)?
        .set_default("logging.format", logging.format)
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일은 없어도 됩니다. 환경 변수(`TASKER__SECTION__KEY`)가 파일 값을 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = builder_with_defaults()?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    ///
    /// `TASKER_CONFIG` 환경 변수가 있으면 해당 경로를 사용합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var("TASKER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 미적용).
    pub fn from_toml_str(contents: &str) -> Result<Self, config::ConfigError> {
        let config: AppConfig = builder_with_defaults()?
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        self.jwt_secret()?;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.auth.token_ttl_minutes) {
            return Err(config::ConfigError::Message(format!(
                "auth.token_ttl_minutes must be between 1 and {MAX_TOKEN_TTL_MINUTES}"
            )));
        }
        Ok(())
    }

    /// 토큰 서명 키 반환.
    ///
    /// # Errors
    ///
    /// 서명 키가 설정되지 않으면 서버를 시작할 수 없습니다.
    pub fn jwt_secret(&self) -> Result<&SecretString, config::ConfigError> {
        self.auth.jwt_secret.as_ref().ok_or_else(|| {
            config::ConfigError::Message(format!(
                "auth.jwt_secret is not configured (set {ENV_PREFIX}__AUTH__JWT_SECRET)"
            ))
        })
    }
}
