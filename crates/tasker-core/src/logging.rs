//! tracing 구독자 초기화.
//!
//! `[logging]` 설정 섹션을 받아 전역 구독자를 한 번 설치합니다.
//! `RUST_LOG`가 있으면 설정 파일의 레벨보다 우선합니다.

use thiserror::Error;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

/// 설정 레벨 뒤에 붙는 기본 지시어.
///
/// sqlx는 info 레벨에서 모든 쿼리를 출력하므로 경고 이상만 남깁니다.
const DEPENDENCY_DIRECTIVES: &[&str] = &["sqlx::query=warn", "hyper=warn"];

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 개발용 여러 줄 형식
    #[default]
    Pretty,
    /// 로그 수집기용 JSON 한 줄
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

/// 로깅 초기화 에러.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log format: {0}")]
    UnknownFormat(String),

    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("global subscriber already installed")]
    AlreadyInitialized,
}

/// 구독자 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 필터 지시어 (예: "info", "tasker_api=debug")
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// 설정 파일의 로깅 섹션에서 생성합니다.
    ///
    /// 알 수 없는 형식은 `Pretty`로 대체됩니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
        }
    }

    /// 설정 레벨에 의존 크레이트 지시어를 덧붙인 필터 문자열.
    ///
    /// 사용자가 같은 대상을 직접 지정했으면 그 지시어를 유지합니다.
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![self.level.trim().to_string()];
        for extra in DEPENDENCY_DIRECTIVES {
            let target = extra.split('=').next().unwrap_or_default();
            if !self.level.contains(target) {
                directives.push((*extra).to_string());
            }
        }
        directives.retain(|d| !d.is_empty());
        directives.join(",")
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(self.filter_directives())
            .map_err(|e| LoggingError::InvalidFilter(e.to_string()))
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        match self.format {
            LogFormat::Pretty => fmt::layer().pretty().boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .boxed(),
            LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
        }
    }
}

/// 전역 구독자를 설치합니다.
///
/// ```no_run
/// use tasker_core::{init_logging, LogConfig, LoggingConfig};
///
/// init_logging(LogConfig::from_settings(&LoggingConfig::default())).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter()?;

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(filter)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    tracing::info!(
        format = ?config.format,
        filter = %config.filter_directives(),
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!(matches!(
            "fancy".parse::<LogFormat>(),
            Err(LoggingError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_log_config_from_settings() {
        let config = LogConfig::from_settings(&LoggingConfig {
            level: "tasker_api=debug".to_string(),
            format: "json".to_string(),
        });
        assert_eq!(config.level, "tasker_api=debug");
        assert_eq!(config.format, LogFormat::Json);

        let fallback = LogConfig::from_settings(&LoggingConfig {
            level: "info".to_string(),
            format: "fancy".to_string(),
        });
        assert_eq!(fallback.format, LogFormat::Pretty);
    }

    #[test]
    fn test_dependency_directives_appended() {
        let config = LogConfig::default();
        assert_eq!(config.filter_directives(), "info,sqlx::query=warn,hyper=warn");
    }

    #[test]
    fn test_explicit_directive_wins() {
        let config = LogConfig {
            level: "debug,sqlx::query=info".to_string(),
            format: LogFormat::Compact,
        };
        assert_eq!(config.filter_directives(), "debug,sqlx::query=info,hyper=warn");
    }

    #[test]
    fn test_invalid_filter_reported() {
        let config = LogConfig {
            level: "tasker_api=notalevel".to_string(),
            format: LogFormat::Pretty,
        };
        // RUST_LOG이 설정된 환경에서는 파일 레벨을 보지 않음
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(matches!(
                config.env_filter(),
                Err(LoggingError::InvalidFilter(_))
            ));
        }
    }
}
