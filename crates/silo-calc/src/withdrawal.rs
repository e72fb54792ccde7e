//! 出庫提取明細（批次追溯）

use rust_decimal::Decimal;
use silo_core::{Batch, WithdrawalLine, WithdrawalPlan};

/// 提取明細計算器
pub struct WithdrawalPlanner;

impl WithdrawalPlanner {
    /// 按先進先出計算提取明細
    ///
    /// `batches` 須由舊到新排列。呼叫前應已通過可用量檢查；
    /// 若庫存不足，明細只覆蓋現有批次（`is_complete` 為 false）。
    /// 不修改輸入批次，實際扣減在出庫寫入後由帳本重算體現。
    pub fn plan(batches: &[Batch], requested: Decimal) -> WithdrawalPlan {
        let mut plan = WithdrawalPlan::default();
        let mut still_needed = requested;

        for batch in batches {
            if still_needed <= Decimal::ZERO {
                break;
            }
            if batch.is_depleted() {
                continue;
            }

            let taken = batch.quantity.min(still_needed);

            plan.add_line(
                WithdrawalLine::new(batch.inbound_id, taken)
                    .with_product(batch.product.clone())
                    .with_supplier(batch.supplier.clone()),
            );

            still_needed -= taken;
        }

        if still_needed > Decimal::ZERO {
            tracing::warn!(
                "提取明細不足額：需要 {}，批次僅能提供 {}",
                requested,
                requested - still_needed
            );
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use silo_core::InboundMovement;

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, day, 0, 0, 0).unwrap()
    }

    fn batch(qty: i64, day: u32, product: &str) -> Batch {
        Batch::from_inbound(
            &InboundMovement::new("S1", Decimal::from(qty), t(day))
                .with_product(product)
                .with_supplier("Farm A"),
        )
    }

    #[test]
    fn test_fifo_order_preserved() {
        let a = batch(100, 1, "A");
        let b = batch(50, 2, "B");

        let plan = WithdrawalPlanner::plan(&[a.clone(), b.clone()], Decimal::from(120));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.lines[0].source_inbound_id, a.inbound_id);
        assert_eq!(plan.lines[0].quantity_taken, Decimal::from(100));
        assert_eq!(plan.lines[0].product.as_deref(), Some("A"));
        assert_eq!(plan.lines[1].source_inbound_id, b.inbound_id);
        assert_eq!(plan.lines[1].quantity_taken, Decimal::from(20));
        assert_eq!(plan.lines[1].supplier.as_deref(), Some("Farm A"));
        // B 剩餘 30
        assert_eq!(b.quantity - plan.lines[1].quantity_taken, Decimal::from(30));
        assert!(plan.is_complete(Decimal::from(120)));
    }

    #[test]
    fn test_exact_single_batch() {
        let a = batch(100, 1, "A");
        let b = batch(50, 2, "B");

        let plan = WithdrawalPlanner::plan(&[a, b], Decimal::from(100));

        // 恰好用完第一批，不產生零數量明細
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.total_taken(), Decimal::from(100));
    }

    #[test]
    fn test_input_not_mutated() {
        let batches = vec![batch(10, 1, "A"), batch(10, 2, "A")];
        let before = batches.clone();

        let _ = WithdrawalPlanner::plan(&batches, Decimal::from(15));

        assert_eq!(batches, before);
    }

    #[test]
    fn test_depleted_batches_skipped() {
        let mut empty = batch(10, 1, "A");
        empty.quantity = Decimal::ZERO;
        let full = batch(10, 2, "B");

        let plan = WithdrawalPlanner::plan(&[empty, full.clone()], Decimal::from(5));

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.lines[0].source_inbound_id, full.inbound_id);
    }

    #[test]
    fn test_zero_request_yields_empty_plan() {
        let plan = WithdrawalPlanner::plan(&[batch(10, 1, "A")], Decimal::ZERO);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_insufficient_batches_partial_plan() {
        let plan = WithdrawalPlanner::plan(&[batch(10, 1, "A")], Decimal::from(25));

        assert_eq!(plan.total_taken(), Decimal::from(10));
        assert!(!plan.is_complete(Decimal::from(25)));
    }
}
