//! 提取明細模型（出庫批次追溯）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 提取明細行：從某一入庫批次取走的數量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalLine {
    /// 來源入庫ID
    pub source_inbound_id: Uuid,

    /// 取走數量
    pub quantity_taken: Decimal,

    /// 產品
    pub product: Option<String>,

    /// 供應商
    pub supplier: Option<String>,
}

impl WithdrawalLine {
    /// 創建新的明細行
    pub fn new(source_inbound_id: Uuid, quantity_taken: Decimal) -> Self {
        Self {
            source_inbound_id,
            quantity_taken,
            product: None,
            supplier: None,
        }
    }

    /// 建構器模式：設置產品
    pub fn with_product(mut self, product: Option<String>) -> Self {
        self.product = product;
        self
    }

    /// 建構器模式：設置供應商
    pub fn with_supplier(mut self, supplier: Option<String>) -> Self {
        self.supplier = supplier;
        self
    }
}

/// 提取明細（按先進先出排列）
///
/// 出庫建立時計算一次並隨出庫記錄保存，之後不再重算。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalPlan {
    /// 明細行（由舊到新）
    pub lines: Vec<WithdrawalLine>,
}

impl WithdrawalPlan {
    /// 創建新的提取明細
    pub fn new(lines: Vec<WithdrawalLine>) -> Self {
        Self { lines }
    }

    /// 添加明細行
    pub fn add_line(&mut self, line: WithdrawalLine) {
        self.lines.push(line);
    }

    /// 明細合計數量
    pub fn total_taken(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.quantity_taken))
    }

    /// 檢查明細是否足額覆蓋請求數量
    pub fn is_complete(&self, requested: Decimal) -> bool {
        self.total_taken() == requested
    }

    /// 明細行數
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// 是否為空
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 序列化為 JSON（隨出庫記錄保存）
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(&self.lines).map_err(|e| crate::SiloError::Serialization(e.to_string()))
    }

    /// 從 JSON 還原
    pub fn from_json(payload: &str) -> crate::Result<Self> {
        let lines: Vec<WithdrawalLine> = serde_json::from_str(payload)
            .map_err(|e| crate::SiloError::Serialization(e.to_string()))?;
        Ok(Self { lines })
    }
}
