//! 帳本性質測試

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use proptest::test_runner::Config;
use rust_decimal::Decimal;
use silo_calc::{LedgerEngine, WithdrawalPlanner};
use silo_core::{ConsumptionOrder, InboundMovement, LedgerConfig, OutboundMovement, Silo, SiloLevel};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn silo() -> Silo {
    Silo::new("S1", "Silo 1", Decimal::from(50_000))
}

/// (是否入庫, 數量, 分鐘偏移)
fn history() -> impl Strategy<Value = Vec<(bool, u32, i64)>> {
    prop::collection::vec((any::<bool>(), 1_u32..2_000, 0_i64..500), 0..40)
}

fn build(events: &[(bool, u32, i64)]) -> (Vec<InboundMovement>, Vec<OutboundMovement>) {
    let mut inbound = Vec::new();
    let mut outbound = Vec::new();
    for &(is_inbound, qty, minutes) in events {
        let ts = base() + Duration::minutes(minutes);
        if is_inbound {
            inbound.push(InboundMovement::new("S1", Decimal::from(qty), ts).with_product("P"));
        } else {
            outbound.push(OutboundMovement::new("S1", Decimal::from(qty), ts));
        }
    }
    (inbound, outbound)
}

fn config(order: ConsumptionOrder) -> LedgerConfig {
    LedgerConfig::default().with_consumption_order(order)
}

fn orders() -> impl Strategy<Value = ConsumptionOrder> {
    prop_oneof![
        Just(ConsumptionOrder::Chronological),
        Just(ConsumptionOrder::InboundFirst)
    ]
}

fn batch_sum(level: &SiloLevel) -> Decimal {
    level.available_batches.iter().map(|b| b.quantity).sum()
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn conservation_and_non_negativity(events in history(), order in orders()) {
        let (inbound, outbound) = build(&events);
        let level = LedgerEngine::compute_level(&silo(), &inbound, &outbound, &config(order));

        prop_assert_eq!(level.current_quantity, batch_sum(&level));
        prop_assert!(level.current_quantity >= Decimal::ZERO);
        prop_assert!(level.unreconciled_quantity >= Decimal::ZERO);
        prop_assert!(level.available_batches.iter().all(|b| b.quantity > Decimal::ZERO));
        prop_assert!(level.utilization_percentage <= Decimal::ONE_HUNDRED);
    }

    #[test]
    fn recomputation_is_deterministic(events in history(), order in orders()) {
        let (inbound, outbound) = build(&events);
        let first = LedgerEngine::compute_level(&silo(), &inbound, &outbound, &config(order));
        let second = LedgerEngine::compute_level(&silo(), &inbound, &outbound, &config(order));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn mass_balance_holds(events in history(), order in orders()) {
        let (inbound, outbound) = build(&events);
        let level = LedgerEngine::compute_level(&silo(), &inbound, &outbound, &config(order));

        let total_in: Decimal = inbound.iter().map(|m| m.quantity).sum();
        let total_out: Decimal = outbound.iter().map(|m| m.quantity).sum();

        // 現有量 = 入庫 - 實際扣到的出庫
        prop_assert_eq!(
            level.current_quantity,
            total_in - (total_out - level.unreconciled_quantity)
        );
        if order == ConsumptionOrder::InboundFirst {
            prop_assert_eq!(level.current_quantity, (total_in - total_out).max(Decimal::ZERO));
        }
    }

    #[test]
    fn withdrawal_plan_is_complete_and_minimal(events in history(), fraction in 1_u32..=100) {
        let (inbound, outbound) = build(&events);
        let level = LedgerEngine::compute_level(
            &silo(),
            &inbound,
            &outbound,
            &LedgerConfig::default(),
        );
        prop_assume!(level.current_quantity > Decimal::ZERO);

        let requested = (level.current_quantity * Decimal::from(fraction) / Decimal::from(100))
            .floor()
            .max(Decimal::ONE);
        let plan = WithdrawalPlanner::plan(&level.available_batches, requested);

        prop_assert_eq!(plan.total_taken(), requested);
        prop_assert!(plan.lines.iter().all(|l| l.quantity_taken > Decimal::ZERO));

        // 最少行數：累計到足額所需的最舊批次數
        let mut needed = 0;
        let mut running = Decimal::ZERO;
        for batch in &level.available_batches {
            if running >= requested {
                break;
            }
            running += batch.quantity;
            needed += 1;
        }
        prop_assert_eq!(plan.len(), needed);

        // 明細依批次順序
        for (line, batch) in plan.lines.iter().zip(level.available_batches.iter()) {
            prop_assert_eq!(line.source_inbound_id, batch.inbound_id);
        }
    }

    #[test]
    fn dispatching_a_plan_matches_recomputed_batches(events in history(), fraction in 1_u32..=100) {
        let (inbound, mut outbound) = build(&events);
        let cfg = LedgerConfig::default();
        let before = LedgerEngine::compute_level(&silo(), &inbound, &outbound, &cfg);
        prop_assume!(before.current_quantity > Decimal::ZERO);

        let requested = (before.current_quantity * Decimal::from(fraction) / Decimal::from(100))
            .floor()
            .max(Decimal::ONE);
        let plan = WithdrawalPlanner::plan(&before.available_batches, requested);

        // 新出庫晚於所有既有異動
        outbound.push(
            OutboundMovement::new("S1", requested, base() + Duration::days(30))
                .with_withdrawal_plan(plan.clone()),
        );
        let after = LedgerEngine::compute_level(&silo(), &inbound, &outbound, &cfg);

        prop_assert_eq!(after.current_quantity, before.current_quantity - requested);

        // 逐批扣掉明細後應與重算結果一致
        let mut expected: Vec<(uuid::Uuid, Decimal)> = before
            .available_batches
            .iter()
            .map(|b| (b.inbound_id, b.quantity))
            .collect();
        for line in &plan.lines {
            if let Some(entry) = expected.iter_mut().find(|(id, _)| *id == line.source_inbound_id) {
                entry.1 -= line.quantity_taken;
            }
        }
        expected.retain(|(_, q)| *q > Decimal::ZERO);
        let actual: Vec<(uuid::Uuid, Decimal)> = after
            .available_batches
            .iter()
            .map(|b| (b.inbound_id, b.quantity))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}
