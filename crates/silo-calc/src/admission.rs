//! 出入庫受理服務

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use silo_core::{
    GroupBy, InboundMovement, LedgerConfig, MovementFilter, MovementStore, OutboundMovement,
    Silo, SiloError, SiloLevel, SiloRegistry,
};
use std::collections::BTreeMap;

use crate::ledger::LedgerEngine;
use crate::statistics::{FleetStats, StatisticsAggregator};
use crate::validation::AdmissionValidator;
use crate::withdrawal::WithdrawalPlanner;

/// 庫存服務
///
/// 連接外部儲存與帳本計算。每次受理都從儲存重新讀取該筒倉的完整歷史並重算料位，
/// 檢查不通過時不寫入任何資料。新異動不可早於該筒倉最後一筆異動，
/// 因此受理時的料位就是帳本重播到該時點的料位。同一筒倉的寫入序列化由儲存端負責。
pub struct InventoryService<S> {
    /// 外部儲存
    store: S,

    /// 帳本配置
    config: LedgerConfig,
}

impl<S> InventoryService<S>
where
    S: MovementStore + SiloRegistry,
{
    /// 創建新的庫存服務
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// 受理入庫
    pub fn receive(&self, inbound: InboundMovement) -> silo_core::Result<InboundMovement> {
        tracing::info!(
            "受理入庫：筒倉 {}，數量 {}",
            inbound.silo_id,
            inbound.quantity
        );

        AdmissionValidator::validate_quantity(inbound.quantity)?;
        let silo = self.require_silo(&inbound.silo_id)?;
        AdmissionValidator::validate_material(&silo, inbound.material_type.as_deref())?;

        let (level, latest) = self.fresh_state(&silo)?;
        if let Err(err) = AdmissionValidator::validate_chronology(&silo, &inbound, latest)
            .and_then(|_| {
                AdmissionValidator::validate_inbound_capacity(&silo, &level, inbound.quantity)
            })
        {
            tracing::info!("入庫被拒絕: {}", err);
            return Err(err);
        }

        self.store.insert_inbound(inbound.clone())?;

        tracing::info!(
            "入庫完成：筒倉 {} 料位 {} → {}",
            silo.id,
            level.current_quantity,
            level.current_quantity.saturating_add(inbound.quantity)
        );

        Ok(inbound)
    }

    /// 受理出庫
    ///
    /// 依當下批次組成計算提取明細並隨出庫記錄保存；傳入的明細會被覆蓋。
    pub fn dispatch(&self, outbound: OutboundMovement) -> silo_core::Result<OutboundMovement> {
        tracing::info!(
            "受理出庫：筒倉 {}，數量 {}",
            outbound.silo_id,
            outbound.quantity
        );

        AdmissionValidator::validate_quantity(outbound.quantity)?;
        let silo = self.require_silo(&outbound.silo_id)?;

        let (level, latest) = self.fresh_state(&silo)?;
        if let Err(err) = AdmissionValidator::validate_chronology(&silo, &outbound, latest)
            .and_then(|_| {
                AdmissionValidator::validate_outbound_availability(
                    &silo,
                    &level,
                    outbound.quantity,
                )
            })
        {
            tracing::info!("出庫被拒絕: {}", err);
            return Err(err);
        }

        let plan = WithdrawalPlanner::plan(&level.available_batches, outbound.quantity);
        tracing::debug!("提取明細 {} 行，合計 {}", plan.len(), plan.total_taken());

        let outbound = outbound.with_withdrawal_plan(plan);
        self.store.insert_outbound(outbound.clone())?;

        tracing::info!(
            "出庫完成：筒倉 {} 料位 {} → {}",
            silo.id,
            level.current_quantity,
            level.current_quantity.saturating_sub(outbound.quantity)
        );

        Ok(outbound)
    }

    /// 單一筒倉料位
    pub fn silo_level(&self, silo_id: &str) -> silo_core::Result<SiloLevel> {
        let silo = self.require_silo(silo_id)?;
        let (level, _) = self.fresh_state(&silo)?;
        Ok(level)
    }

    /// 多個筒倉料位（None 表示全部）
    pub fn silo_levels(&self, ids: Option<&[String]>) -> silo_core::Result<Vec<SiloLevel>> {
        let silos = self.store.list_silos(ids)?;
        let inbound = self.store.list_inbound(&MovementFilter::all())?;
        let outbound = self.store.list_outbound(&MovementFilter::all())?;

        Ok(LedgerEngine::compute_levels(
            &silos,
            &inbound,
            &outbound,
            &self.config,
        ))
    }

    /// 全部筒倉使用率統計
    pub fn fleet_stats(&self) -> silo_core::Result<FleetStats> {
        let levels = self.silo_levels(None)?;
        Ok(StatisticsAggregator::aggregate(
            &levels,
            &self.config.thresholds,
        ))
    }

    /// 入庫彙總
    pub fn inbound_breakdown(
        &self,
        filter: &MovementFilter,
        group_by: GroupBy,
    ) -> silo_core::Result<BTreeMap<String, Decimal>> {
        let movements = self.store.list_inbound(filter)?;
        Ok(StatisticsAggregator::aggregate_movements(
            &movements,
            group_by,
            &self.config.unknown_label,
        ))
    }

    /// 出庫彙總
    pub fn outbound_breakdown(
        &self,
        filter: &MovementFilter,
        group_by: GroupBy,
    ) -> silo_core::Result<BTreeMap<String, Decimal>> {
        let movements = self.store.list_outbound(filter)?;
        Ok(StatisticsAggregator::aggregate_movements(
            &movements,
            group_by,
            &self.config.unknown_label,
        ))
    }

    /// 查詢筒倉，不存在時返回 SiloNotFound
    fn require_silo(&self, silo_id: &str) -> silo_core::Result<Silo> {
        self.store
            .get_silo(silo_id)?
            .ok_or_else(|| SiloError::SiloNotFound(silo_id.to_string()))
    }

    /// 從儲存讀取完整歷史，返回重算後的料位與最後一筆異動時間
    fn fresh_state(&self, silo: &Silo) -> silo_core::Result<(SiloLevel, Option<DateTime<Utc>>)> {
        let filter = MovementFilter::for_silo(silo.id.clone());
        let inbound = self.store.list_inbound(&filter)?;
        let outbound = self.store.list_outbound(&filter)?;

        let latest = inbound
            .iter()
            .map(|m| m.timestamp)
            .chain(outbound.iter().map(|m| m.timestamp))
            .max();
        let level = LedgerEngine::compute_level(silo, &inbound, &outbound, &self.config);

        Ok((level, latest))
    }

    /// 獲取配置引用
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// 獲取儲存引用
    pub fn store(&self) -> &S {
        &self.store
    }
}
