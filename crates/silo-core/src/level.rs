//! 筒倉料位模型（由異動歷史推導，不持久化）

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::UtilizationThresholds;
use crate::movement::InboundMovement;
use crate::silo::Silo;

/// 庫存批次：某筆入庫尚未被提取的部分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// 來源入庫ID
    pub inbound_id: Uuid,

    /// 剩餘數量
    pub quantity: Decimal,

    /// 入庫時間
    pub created_at: DateTime<Utc>,

    /// 產品
    pub product: Option<String>,

    /// 供應商
    pub supplier: Option<String>,
}

impl Batch {
    /// 由入庫異動建立完整批次
    pub fn from_inbound(inbound: &InboundMovement) -> Self {
        Self {
            inbound_id: inbound.id,
            quantity: inbound.quantity,
            created_at: inbound.timestamp,
            product: inbound.product.clone(),
            supplier: inbound.supplier.clone(),
        }
    }

    /// 是否已耗盡
    pub fn is_depleted(&self) -> bool {
        self.quantity <= Decimal::ZERO
    }
}

/// 使用率分級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UtilizationBucket {
    /// 空倉（0%）
    Empty,
    /// 低（≤ 低門檻）
    Low,
    /// 中（≤ 中門檻）
    Medium,
    /// 高（≤ 高門檻）
    High,
    /// 滿（> 高門檻）
    Full,
}

impl UtilizationBucket {
    /// 按使用率百分比分級，各門檻含上界
    pub fn classify(percentage: Decimal, thresholds: &UtilizationThresholds) -> Self {
        if percentage <= Decimal::ZERO {
            Self::Empty
        } else if percentage <= thresholds.low {
            Self::Low
        } else if percentage <= thresholds.medium {
            Self::Medium
        } else if percentage <= thresholds.high {
            Self::High
        } else {
            Self::Full
        }
    }

    /// 標籤
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Full => "full",
        }
    }
}

/// 筒倉料位快照
///
/// `current_quantity` 恆等於 `available_batches` 剩餘數量之和，且不為負。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiloLevel {
    /// 筒倉
    pub silo: Silo,

    /// 現有量
    pub current_quantity: Decimal,

    /// 可用批次（由舊到新）
    pub available_batches: Vec<Batch>,

    /// 使用率（0 ~ 100）
    pub utilization_percentage: Decimal,

    /// 無庫存可扣的出庫數量（歷史資料不一致時出現）
    pub unreconciled_quantity: Decimal,
}

impl SiloLevel {
    /// 由批次清單建立料位快照
    pub fn from_batches(silo: Silo, batches: Vec<Batch>, unreconciled_quantity: Decimal) -> Self {
        let available_batches: Vec<Batch> =
            batches.into_iter().filter(|b| !b.is_depleted()).collect();
        let current_quantity = available_batches
            .iter()
            .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.quantity))
            .max(Decimal::ZERO);
        let utilization_percentage = utilization_percentage(current_quantity, silo.capacity);

        Self {
            silo,
            current_quantity,
            available_batches,
            utilization_percentage,
            unreconciled_quantity,
        }
    }

    /// 空筒倉
    pub fn empty(silo: Silo) -> Self {
        Self::from_batches(silo, Vec::new(), Decimal::ZERO)
    }

    /// 剩餘空間
    pub fn headroom(&self) -> Decimal {
        self.silo.headroom(self.current_quantity)
    }

    /// 使用率分級
    pub fn bucket(&self, thresholds: &UtilizationThresholds) -> UtilizationBucket {
        UtilizationBucket::classify(self.utilization_percentage, thresholds)
    }

    /// 最舊批次
    pub fn oldest_batch(&self) -> Option<&Batch> {
        self.available_batches.first()
    }
}

/// 使用率 = min(100, 現有量 / 容量 × 100)；容量為 0 時為 0
///
/// 運算溢位表示現有量遠超容量，視為 100。
pub fn utilization_percentage(current_quantity: Decimal, capacity: Decimal) -> Decimal {
    if capacity <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    current_quantity
        .checked_div(capacity)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ONE_HUNDRED, |pct| pct.min(Decimal::ONE_HUNDRED))
        .max(Decimal::ZERO)
}
