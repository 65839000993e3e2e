//! # Tasker Core
//!
//! 멀티 테넌트 작업 관리 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 저장소나 HTTP 프레임워크에 의존하지 않는 순수 타입을 제공합니다:
//! - 계정 및 역할 (`Account`, `Role`)
//! - 계정이 소유하는 작업 (`Task`)과 읽기 시점 파생 필드
//! - 관리자 통계 집계 (owner 기준 group-by-reduce)
//! - 설정 관리
//! - 로깅 인프라
//! - 공통 에러 분류

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
