//! 帳本計算配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, SiloError};

/// 出庫扣減順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConsumptionOrder {
    /// 嚴格按時間：入庫與出庫合併為單一時間軸（同一時間先入後出）
    #[default]
    Chronological,

    /// 先處理全部入庫，再依序扣減全部出庫（相容舊版行為）
    InboundFirst,
}

/// 使用率分級門檻（百分比，含上界）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationThresholds {
    /// 低
    pub low: Decimal,
    /// 中
    pub medium: Decimal,
    /// 高
    pub high: Decimal,
}

impl Default for UtilizationThresholds {
    fn default() -> Self {
        Self {
            low: Decimal::from(25),
            medium: Decimal::from(50),
            high: Decimal::from(75),
        }
    }
}

/// 帳本計算配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// 出庫扣減順序
    pub consumption_order: ConsumptionOrder,

    /// 使用率分級門檻
    pub thresholds: UtilizationThresholds,

    /// 未分組鍵的標籤
    pub unknown_label: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            consumption_order: ConsumptionOrder::Chronological,
            thresholds: UtilizationThresholds::default(),
            unknown_label: "Unknown".to_string(),
        }
    }

    /// 建構器模式：設置扣減順序
    pub fn with_consumption_order(mut self, order: ConsumptionOrder) -> Self {
        self.consumption_order = order;
        self
    }

    /// 建構器模式：設置分級門檻
    pub fn with_thresholds(mut self, thresholds: UtilizationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// 建構器模式：設置未分組標籤
    pub fn with_unknown_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_label = label.into();
        self
    }

    /// 從 JSON 載入配置（缺少的欄位使用預設值）
    ///
    /// # 範例
    /// ```
    /// # use silo_core::{ConsumptionOrder, LedgerConfig};
    /// let config = LedgerConfig::from_json_str(r#"{"consumption_order":"InboundFirst"}"#).unwrap();
    /// assert_eq!(config.consumption_order, ConsumptionOrder::InboundFirst);
    /// ```
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| SiloError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 檢查門檻是否遞增且落在 0 ~ 100
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if t.low <= Decimal::ZERO || t.high > Decimal::ONE_HUNDRED {
            return Err(SiloError::Config(format!(
                "門檻必須介於 0 與 100 之間: low={}, high={}",
                t.low, t.high
            )));
        }
        if !(t.low < t.medium && t.medium < t.high) {
            return Err(SiloError::Config(format!(
                "門檻必須遞增: low={}, medium={}, high={}",
                t.low, t.medium, t.high
            )));
        }
        if self.unknown_label.trim().is_empty() {
            return Err(SiloError::Config("未分組標籤不可為空".to_string()));
        }
        Ok(())
    }
}
