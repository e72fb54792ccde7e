//! 筒倉模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 筒倉定義（來自外部登錄檔，核心只讀）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Silo {
    /// 筒倉ID
    pub id: String,

    /// 名稱
    pub name: String,

    /// 容量（非負）
    pub capacity: Decimal,

    /// 限定物料類型（None 表示不限）
    pub material_type: Option<String>,
}

impl Silo {
    /// 創建新的筒倉
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity: capacity.max(Decimal::ZERO),
            material_type: None,
        }
    }

    /// 建構器模式：設置限定物料類型
    pub fn with_material_type(mut self, material_type: impl Into<String>) -> Self {
        self.material_type = Some(material_type.into());
        self
    }

    /// 剩餘空間（容量 - 現有量，不低於 0）
    pub fn headroom(&self, current_quantity: Decimal) -> Decimal {
        (self.capacity - current_quantity).max(Decimal::ZERO)
    }

    /// 檢查是否接受指定物料
    ///
    /// 未限定物料類型的筒倉接受任何物料；未聲明物料類型的入庫也一律接受。
    pub fn accepts_material(&self, material_type: Option<&str>) -> bool {
        match (&self.material_type, material_type) {
            (Some(required), Some(actual)) => required.eq_ignore_ascii_case(actual),
            _ => true,
        }
    }
}
