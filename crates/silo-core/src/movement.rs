//! 出入庫異動模型

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::plan::WithdrawalPlan;

/// 異動方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    /// 入庫（收料）
    Inbound,
    /// 出庫（發料）
    Outbound,
}

impl MovementKind {
    /// 標籤
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inbound => "入庫",
            Self::Outbound => "出庫",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 統計分組鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupBy {
    /// 按產品
    Product,
    /// 按供應商
    Supplier,
    /// 按操作員
    Operator,
    /// 按月份（YYYY-MM）
    Month,
}

/// 可參與統計的異動記錄
///
/// 入庫與出庫共用同一套統計邏輯，由各自實現提供分組鍵。
pub trait MovementRecord {
    /// 異動ID
    fn id(&self) -> Uuid;

    /// 異動方向
    fn kind(&self) -> MovementKind;

    /// 筒倉ID
    fn silo_id(&self) -> &str;

    /// 數量
    fn quantity(&self) -> Decimal;

    /// 異動時間
    fn timestamp(&self) -> DateTime<Utc>;

    /// 產品
    fn product(&self) -> Option<&str>;

    /// 供應商
    fn supplier(&self) -> Option<&str>;

    /// 操作員
    fn operator(&self) -> Option<&str>;

    /// 取得分組鍵，缺失或空白時返回 None
    fn group_key(&self, group_by: GroupBy) -> Option<String> {
        let key = match group_by {
            GroupBy::Product => self.product().map(str::to_string),
            GroupBy::Supplier => self.supplier().map(str::to_string),
            GroupBy::Operator => self.operator().map(str::to_string),
            GroupBy::Month => {
                let ts = self.timestamp();
                Some(format!("{:04}-{:02}", ts.year(), ts.month()))
            }
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

/// 入庫異動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMovement {
    /// 異動ID
    pub id: Uuid,

    /// 目標筒倉ID
    pub silo_id: String,

    /// 入庫數量（必須為正）
    pub quantity: Decimal,

    /// 入庫時間
    pub timestamp: DateTime<Utc>,

    /// 產品
    pub product: Option<String>,

    /// 供應商
    pub supplier: Option<String>,

    /// 操作員
    pub operator: Option<String>,

    /// 批號
    pub lot_number: Option<String>,

    /// 物料類型
    pub material_type: Option<String>,

    /// 品質指標（如水分、雜質），核心不解讀
    pub quality: BTreeMap<String, String>,
}

impl InboundMovement {
    /// 創建新的入庫異動
    pub fn new(silo_id: impl Into<String>, quantity: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            silo_id: silo_id.into(),
            quantity,
            timestamp,
            product: None,
            supplier: None,
            operator: None,
            lot_number: None,
            material_type: None,
            quality: BTreeMap::new(),
        }
    }

    /// 建構器模式：設置產品
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// 建構器模式：設置供應商
    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    /// 建構器模式：設置操作員
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// 建構器模式：設置批號
    pub fn with_lot_number(mut self, lot_number: impl Into<String>) -> Self {
        self.lot_number = Some(lot_number.into());
        self
    }

    /// 建構器模式：設置物料類型
    pub fn with_material_type(mut self, material_type: impl Into<String>) -> Self {
        self.material_type = Some(material_type.into());
        self
    }

    /// 建構器模式：添加品質指標
    pub fn with_quality(mut self, metric: impl Into<String>, value: impl Into<String>) -> Self {
        self.quality.insert(metric.into(), value.into());
        self
    }
}

impl MovementRecord for InboundMovement {
    fn id(&self) -> Uuid {
        self.id
    }

    fn kind(&self) -> MovementKind {
        MovementKind::Inbound
    }

    fn silo_id(&self) -> &str {
        &self.silo_id
    }

    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }

    fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }
}

/// 出庫異動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMovement {
    /// 異動ID
    pub id: Uuid,

    /// 來源筒倉ID
    pub silo_id: String,

    /// 出庫數量（必須為正）
    pub quantity: Decimal,

    /// 出庫時間
    pub timestamp: DateTime<Utc>,

    /// 產品
    pub product: Option<String>,

    /// 操作員
    pub operator: Option<String>,

    /// 去向（客戶、產線等）
    pub destination: Option<String>,

    /// 建立時計算的提取明細（時點快照，不再重算）
    pub withdrawal_plan: WithdrawalPlan,
}

impl OutboundMovement {
    /// 創建新的出庫異動
    pub fn new(silo_id: impl Into<String>, quantity: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            silo_id: silo_id.into(),
            quantity,
            timestamp,
            product: None,
            operator: None,
            destination: None,
            withdrawal_plan: WithdrawalPlan::default(),
        }
    }

    /// 建構器模式：設置產品
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// 建構器模式：設置操作員
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// 建構器模式：設置去向
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// 建構器模式：設置提取明細
    pub fn with_withdrawal_plan(mut self, plan: WithdrawalPlan) -> Self {
        self.withdrawal_plan = plan;
        self
    }
}

impl MovementRecord for OutboundMovement {
    fn id(&self) -> Uuid {
        self.id
    }

    fn kind(&self) -> MovementKind {
        MovementKind::Outbound
    }

    fn silo_id(&self) -> &str {
        &self.silo_id
    }

    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    /// 出庫本身沒有供應商；明細只有單一供應商時採用之
    fn supplier(&self) -> Option<&str> {
        let mut suppliers = self
            .withdrawal_plan
            .lines
            .iter()
            .map(|line| line.supplier.as_deref());
        let first = suppliers.next()??;
        if suppliers.all(|s| s == Some(first)) {
            Some(first)
        } else {
            None
        }
    }

    fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::WithdrawalLine;
    use chrono::TimeZone;

    fn ts(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_inbound_builder() {
        let inbound = InboundMovement::new("S1", Decimal::from(500), ts(3, 1))
            .with_product("Corn")
            .with_supplier("Farm A")
            .with_operator("alice")
            .with_lot_number("LOT-7")
            .with_quality("moisture", "13.5");

        assert_eq!(inbound.silo_id, "S1");
        assert_eq!(inbound.product.as_deref(), Some("Corn"));
        assert_eq!(inbound.lot_number.as_deref(), Some("LOT-7"));
        assert_eq!(inbound.quality.get("moisture").map(String::as_str), Some("13.5"));
        assert_eq!(inbound.kind(), MovementKind::Inbound);
    }

    #[test]
    fn test_group_key_month() {
        let inbound = InboundMovement::new("S1", Decimal::from(1), ts(11, 30));
        assert_eq!(inbound.group_key(GroupBy::Month), Some("2025-11".to_string()));
    }

    #[test]
    fn test_group_key_blank_is_missing() {
        let inbound = InboundMovement::new("S1", Decimal::from(1), ts(1, 1)).with_product("  ");
        assert_eq!(inbound.group_key(GroupBy::Product), None);
        assert_eq!(inbound.group_key(GroupBy::Supplier), None);
    }

    #[test]
    fn test_outbound_supplier_from_plan() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let single = WithdrawalPlan::new(vec![
            WithdrawalLine::new(a, Decimal::from(10)).with_supplier(Some("Farm A".into())),
            WithdrawalLine::new(b, Decimal::from(5)).with_supplier(Some("Farm A".into())),
        ]);
        let outbound =
            OutboundMovement::new("S1", Decimal::from(15), ts(2, 1)).with_withdrawal_plan(single);
        assert_eq!(outbound.supplier(), Some("Farm A"));

        let mixed = WithdrawalPlan::new(vec![
            WithdrawalLine::new(a, Decimal::from(10)).with_supplier(Some("Farm A".into())),
            WithdrawalLine::new(b, Decimal::from(5)).with_supplier(Some("Farm B".into())),
        ]);
        let outbound =
            OutboundMovement::new("S1", Decimal::from(15), ts(2, 1)).with_withdrawal_plan(mixed);
        assert_eq!(outbound.supplier(), None);

        let empty = OutboundMovement::new("S1", Decimal::from(15), ts(2, 1));
        assert_eq!(empty.supplier(), None);
    }
}
