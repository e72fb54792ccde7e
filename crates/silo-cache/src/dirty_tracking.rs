//! 髒標記追蹤

use std::collections::BTreeSet;

/// 髒標記追蹤器
///
/// 記錄歷史已變更、快取料位需要重算的筒倉。
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_silos: BTreeSet<String>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記筒倉為髒
    pub fn mark_dirty(&mut self, silo_id: impl Into<String>) {
        self.dirty_silos.insert(silo_id.into());
    }

    /// 檢查筒倉是否為髒
    pub fn is_dirty(&self, silo_id: &str) -> bool {
        self.dirty_silos.contains(silo_id)
    }

    /// 清除單一筒倉的髒標記，返回原本是否為髒
    pub fn clear_silo(&mut self, silo_id: &str) -> bool {
        self.dirty_silos.remove(silo_id)
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_silos.clear();
    }

    /// 獲取所有髒筒倉（按 ID 排列）
    pub fn dirty_silos(&self) -> Vec<String> {
        self.dirty_silos.iter().cloned().collect()
    }
}
