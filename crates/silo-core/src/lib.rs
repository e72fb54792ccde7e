//! # Silo Core
//!
//! 核心資料模型、配置、錯誤類型與外部儲存介面

pub mod config;
pub mod level;
pub mod movement;
pub mod plan;
pub mod silo;
pub mod store;

// Re-export 主要類型
pub use config::{ConsumptionOrder, LedgerConfig, UtilizationThresholds};
pub use level::{Batch, SiloLevel, UtilizationBucket};
pub use movement::{GroupBy, InboundMovement, MovementKind, MovementRecord, OutboundMovement};
pub use plan::{WithdrawalLine, WithdrawalPlan};
pub use silo::Silo;
pub use store::{InMemoryStore, MovementFilter, MovementStore, SiloRegistry};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// 筒倉庫存錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SiloError {
    #[error("筒倉 {silo_name} 容量不足，剩餘空間 {available_headroom}")]
    CapacityExceeded {
        silo_name: String,
        available_headroom: Decimal,
    },

    #[error("筒倉 {silo_name} 庫存不足：可用 {available}，需要 {requested}")]
    InsufficientStock {
        silo_name: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("找不到筒倉: {0}")]
    SiloNotFound(String),

    #[error("數量必須大於 0: {0}")]
    InvalidQuantity(Decimal),

    #[error("筒倉 {silo_name} 限定物料 {expected}，收到 {actual}")]
    MaterialMismatch {
        silo_name: String,
        expected: String,
        actual: String,
    },

    #[error("筒倉 {silo_name} {kind}時間 {timestamp} 早於最後一筆異動 {latest}")]
    BackdatedMovement {
        silo_name: String,
        kind: MovementKind,
        timestamp: DateTime<Utc>,
        latest: DateTime<Utc>,
    },

    #[error("儲存錯誤: {0}")]
    Store(String),

    #[error("序列化錯誤: {0}")]
    Serialization(String),

    #[error("配置錯誤: {0}")]
    Config(String),
}

impl SiloError {
    /// 是否為可預期的驗證結果（應回報給使用者而非視為故障）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. }
                | Self::InsufficientStock { .. }
                | Self::SiloNotFound(_)
                | Self::InvalidQuantity(_)
                | Self::MaterialMismatch { .. }
                | Self::BackdatedMovement { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SiloError>;
