//! 增量料位計算
//!
//! 以「最後處理的異動」為鍵快取每座筒倉的料位，歷史沒有變化時直接返回快照。
//! 結果與 [`LedgerEngine::compute_level`] 完全相同，只是省去重播。

use silo_calc::LedgerEngine;
use silo_core::{InboundMovement, LedgerConfig, MovementRecord, OutboundMovement, Silo, SiloLevel};
use std::collections::HashMap;
use uuid::Uuid;

use crate::dirty_tracking::DirtyTracker;

/// 筒倉歷史指紋
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFingerprint {
    /// 筒倉定義（容量變更也需重算）
    pub silo: Silo,
    /// 入庫筆數
    pub inbound_count: usize,
    /// 出庫筆數
    pub outbound_count: usize,
    /// 時間最晚的入庫ID
    pub last_inbound: Option<Uuid>,
    /// 時間最晚的出庫ID
    pub last_outbound: Option<Uuid>,
}

impl HistoryFingerprint {
    /// 計算指紋（只計入屬於該筒倉的異動）
    pub fn of(silo: &Silo, inbound: &[InboundMovement], outbound: &[OutboundMovement]) -> Self {
        let (inbound_count, last_inbound) = last_of(silo, inbound);
        let (outbound_count, last_outbound) = last_of(silo, outbound);

        Self {
            silo: silo.clone(),
            inbound_count,
            outbound_count,
            last_inbound,
            last_outbound,
        }
    }
}

/// 筆數與時間最晚者的ID（同一時間取輸入中較後者，與穩定排序一致）
fn last_of<M: MovementRecord>(silo: &Silo, movements: &[M]) -> (usize, Option<Uuid>) {
    let mut count = 0;
    let mut last: Option<&M> = None;

    for movement in movements.iter().filter(|m| m.silo_id() == silo.id) {
        count += 1;
        if last.map_or(true, |l| movement.timestamp() >= l.timestamp()) {
            last = Some(movement);
        }
    }

    (count, last.map(MovementRecord::id))
}

/// 快取命中統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: HistoryFingerprint,
    level: SiloLevel,
}

/// 增量計算器
#[derive(Debug)]
pub struct IncrementalCalculator {
    config: LedgerConfig,
    entries: HashMap<String, CacheEntry>,
    dirty: DirtyTracker,
    stats: CacheStats,
}

impl IncrementalCalculator {
    /// 創建新的增量計算器
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            dirty: DirtyTracker::new(),
            stats: CacheStats::default(),
        }
    }

    /// 標記筒倉需要重算（寫入新異動後呼叫）
    pub fn mark_dirty(&mut self, silo_id: impl Into<String>) {
        self.dirty.mark_dirty(silo_id);
    }

    /// 清空全部快取
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.dirty.clear();
    }

    /// 取得料位：指紋相同且未標記為髒時返回快取，否則重算
    pub fn level(
        &mut self,
        silo: &Silo,
        inbound: &[InboundMovement],
        outbound: &[OutboundMovement],
    ) -> SiloLevel {
        let fingerprint = HistoryFingerprint::of(silo, inbound, outbound);
        let was_dirty = self.dirty.clear_silo(&silo.id);

        if !was_dirty {
            if let Some(entry) = self.entries.get(&silo.id) {
                if entry.fingerprint == fingerprint {
                    self.stats.hits += 1;
                    tracing::debug!("筒倉 {} 料位快取命中", silo.id);
                    return entry.level.clone();
                }
            }
        }

        self.stats.misses += 1;
        tracing::debug!("筒倉 {} 料位重算（髒標記: {}）", silo.id, was_dirty);

        let level = LedgerEngine::compute_level(silo, inbound, outbound, &self.config);
        self.entries.insert(
            silo.id.clone(),
            CacheEntry {
                fingerprint,
                level: level.clone(),
            },
        );
        level
    }

    /// 多個筒倉料位，輸出順序與 `silos` 相同
    pub fn levels(
        &mut self,
        silos: &[Silo],
        inbound: &[InboundMovement],
        outbound: &[OutboundMovement],
    ) -> Vec<SiloLevel> {
        silos
            .iter()
            .map(|silo| self.level(silo, inbound, outbound))
            .collect()
    }

    /// 命中統計
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// 快取中的筒倉數量
    pub fn cached_silos(&self) -> usize {
        self.entries.len()
    }
}
