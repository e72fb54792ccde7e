//! 使用率統計與異動彙總

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use silo_core::{GroupBy, MovementRecord, SiloLevel, UtilizationBucket, UtilizationThresholds};
use std::collections::BTreeMap;

/// 全部筒倉的使用率統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetStats {
    /// 筒倉數量
    pub silo_count: usize,
    /// 空倉
    pub empty: usize,
    /// 低
    pub low: usize,
    /// 中
    pub medium: usize,
    /// 高
    pub high: usize,
    /// 滿
    pub full: usize,
    /// 總容量
    pub total_capacity: Decimal,
    /// 總現有量
    pub total_used: Decimal,
    /// 整體使用率（總容量為 0 時為 0）
    pub overall_utilization: Decimal,
}

impl FleetStats {
    /// 指定分級的筒倉數量
    pub fn count(&self, bucket: UtilizationBucket) -> usize {
        match bucket {
            UtilizationBucket::Empty => self.empty,
            UtilizationBucket::Low => self.low,
            UtilizationBucket::Medium => self.medium,
            UtilizationBucket::High => self.high,
            UtilizationBucket::Full => self.full,
        }
    }

    /// 總剩餘空間
    pub fn total_headroom(&self) -> Decimal {
        (self.total_capacity - self.total_used).max(Decimal::ZERO)
    }

    fn record(&mut self, bucket: UtilizationBucket) {
        match bucket {
            UtilizationBucket::Empty => self.empty += 1,
            UtilizationBucket::Low => self.low += 1,
            UtilizationBucket::Medium => self.medium += 1,
            UtilizationBucket::High => self.high += 1,
            UtilizationBucket::Full => self.full += 1,
        }
    }
}

/// 統計計算器
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// 彙總料位快照
    pub fn aggregate(levels: &[SiloLevel], thresholds: &UtilizationThresholds) -> FleetStats {
        let mut stats = FleetStats {
            silo_count: levels.len(),
            ..FleetStats::default()
        };

        for level in levels {
            stats.record(level.bucket(thresholds));
            stats.total_capacity = stats.total_capacity.saturating_add(level.silo.capacity);
            stats.total_used = stats.total_used.saturating_add(level.current_quantity);
        }

        // 超出容量的筒倉可使整體使用率大於 100，溢位時取 Decimal::MAX
        stats.overall_utilization = if stats.total_capacity > Decimal::ZERO {
            stats
                .total_used
                .checked_div(stats.total_capacity)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::MAX)
        } else {
            Decimal::ZERO
        };

        stats
    }

    /// 按分組鍵彙總異動數量
    ///
    /// 缺失或空白的分組鍵歸入 `unknown_label`。月份鍵為 `YYYY-MM`，
    /// 結果按鍵排序，因此月份彙總天然按時間排列。
    pub fn aggregate_movements<M: MovementRecord>(
        movements: &[M],
        group_by: GroupBy,
        unknown_label: &str,
    ) -> BTreeMap<String, Decimal> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();

        for movement in movements {
            let key = movement
                .group_key(group_by)
                .unwrap_or_else(|| unknown_label.to_string());
            let total = totals.entry(key).or_insert(Decimal::ZERO);
            *total = total.saturating_add(movement.quantity());
        }

        totals
    }
}
