//! 先進先出帳本：由出入庫歷史重建料位與批次組成

use rust_decimal::Decimal;
use silo_core::{
    Batch, ConsumptionOrder, InboundMovement, LedgerConfig, OutboundMovement, Silo, SiloLevel,
};
use std::collections::{HashMap, VecDeque};

/// 時間軸事件
#[derive(Debug, Clone, Copy)]
enum LedgerEvent<'a> {
    Inbound(&'a InboundMovement),
    Outbound(&'a OutboundMovement),
}

/// 帳本計算器
///
/// 每次查詢都從完整歷史重算，不保留任何狀態。
pub struct LedgerEngine;

impl LedgerEngine {
    /// 計算多個筒倉的料位
    ///
    /// 歷史可以是任意順序，內部按時間穩定排序（同一時間保持輸入順序）。
    /// 不屬於 `silos` 的異動會被忽略。輸出順序與 `silos` 相同。
    pub fn compute_levels(
        silos: &[Silo],
        inbound: &[InboundMovement],
        outbound: &[OutboundMovement],
        config: &LedgerConfig,
    ) -> Vec<SiloLevel> {
        tracing::debug!(
            "開始計算料位：筒倉 {} 座，入庫 {} 筆，出庫 {} 筆",
            silos.len(),
            inbound.len(),
            outbound.len()
        );

        let grouped_inbound = group_by_silo(inbound, |m| m.silo_id.as_str());
        let grouped_outbound = group_by_silo(outbound, |m| m.silo_id.as_str());

        silos
            .iter()
            .map(|silo| {
                let silo_inbound = grouped_inbound
                    .get(silo.id.as_str())
                    .cloned()
                    .unwrap_or_default();
                let silo_outbound = grouped_outbound
                    .get(silo.id.as_str())
                    .cloned()
                    .unwrap_or_default();
                Self::replay(silo, silo_inbound, silo_outbound, config.consumption_order)
            })
            .collect()
    }

    /// 計算單一筒倉的料位
    pub fn compute_level(
        silo: &Silo,
        inbound: &[InboundMovement],
        outbound: &[OutboundMovement],
        config: &LedgerConfig,
    ) -> SiloLevel {
        let silo_inbound = inbound.iter().filter(|m| m.silo_id == silo.id).collect();
        let silo_outbound = outbound.iter().filter(|m| m.silo_id == silo.id).collect();
        Self::replay(silo, silo_inbound, silo_outbound, config.consumption_order)
    }

    /// 依時間軸重播單一筒倉的異動
    fn replay(
        silo: &Silo,
        mut inbound: Vec<&InboundMovement>,
        mut outbound: Vec<&OutboundMovement>,
        order: ConsumptionOrder,
    ) -> SiloLevel {
        // sort_by_key 為穩定排序，同一時間保持輸入順序
        inbound.sort_by_key(|m| m.timestamp);
        outbound.sort_by_key(|m| m.timestamp);

        let mut batches: VecDeque<Batch> = VecDeque::with_capacity(inbound.len());
        let mut unreconciled = Decimal::ZERO;

        for event in Self::timeline(&inbound, &outbound, order) {
            match event {
                LedgerEvent::Inbound(movement) => {
                    if movement.quantity > Decimal::ZERO {
                        batches.push_back(Batch::from_inbound(movement));
                    } else {
                        tracing::warn!(
                            "筒倉 {} 入庫 {} 數量非正 ({})，略過",
                            silo.id,
                            movement.id,
                            movement.quantity
                        );
                    }
                }
                LedgerEvent::Outbound(movement) => {
                    unreconciled = unreconciled
                        .saturating_add(consume_fifo(&mut batches, movement.quantity));
                }
            }
        }

        if unreconciled > Decimal::ZERO {
            tracing::warn!(
                "筒倉 {} 出庫超出歷史庫存，未能對帳數量 {}",
                silo.id,
                unreconciled
            );
        }

        let level = SiloLevel::from_batches(silo.clone(), batches.into(), unreconciled);

        tracing::debug!(
            "筒倉 {} 料位: {} / {} ({}%), 批次 {} 個",
            silo.id,
            level.current_quantity,
            silo.capacity,
            level.utilization_percentage.round_dp(2),
            level.available_batches.len()
        );

        level
    }

    /// 建立事件時間軸（輸入須已按時間排序）
    fn timeline<'a>(
        inbound: &[&'a InboundMovement],
        outbound: &[&'a OutboundMovement],
        order: ConsumptionOrder,
    ) -> Vec<LedgerEvent<'a>> {
        let mut events = Vec::with_capacity(inbound.len() + outbound.len());

        match order {
            ConsumptionOrder::InboundFirst => {
                events.extend(inbound.iter().map(|m| LedgerEvent::Inbound(*m)));
                events.extend(outbound.iter().map(|m| LedgerEvent::Outbound(*m)));
            }
            ConsumptionOrder::Chronological => {
                // 合併兩條已排序序列；同一時間先入庫後出庫
                let mut i = 0;
                let mut o = 0;
                while i < inbound.len() || o < outbound.len() {
                    let take_inbound = match (inbound.get(i), outbound.get(o)) {
                        (Some(inb), Some(out)) => inb.timestamp <= out.timestamp,
                        (Some(_), None) => true,
                        _ => false,
                    };
                    if take_inbound {
                        events.push(LedgerEvent::Inbound(inbound[i]));
                        i += 1;
                    } else {
                        events.push(LedgerEvent::Outbound(outbound[o]));
                        o += 1;
                    }
                }
            }
        }

        events
    }
}

/// 從最舊批次開始扣減，返回扣不到的數量
///
/// 批次耗盡時停止，不產生負庫存。
pub(crate) fn consume_fifo(batches: &mut VecDeque<Batch>, quantity: Decimal) -> Decimal {
    let mut remaining = quantity.max(Decimal::ZERO);

    while remaining > Decimal::ZERO {
        let Some(oldest) = batches.front_mut() else {
            break;
        };

        if oldest.quantity <= remaining {
            remaining -= oldest.quantity;
            batches.pop_front();
        } else {
            oldest.quantity -= remaining;
            remaining = Decimal::ZERO;
        }
    }

    remaining
}

/// 按筒倉分組
fn group_by_silo<'a, M>(
    movements: &'a [M],
    silo_id: impl Fn(&'a M) -> &'a str,
) -> HashMap<&'a str, Vec<&'a M>> {
    let mut grouped: HashMap<&str, Vec<&M>> = HashMap::new();
    for movement in movements {
        grouped.entry(silo_id(movement)).or_default().push(movement);
    }
    grouped
}
