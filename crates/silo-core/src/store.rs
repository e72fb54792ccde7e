//! 外部儲存介面與記憶體實現

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::movement::{InboundMovement, MovementRecord, OutboundMovement};
use crate::silo::Silo;
use crate::{Result, SiloError};

/// 異動查詢條件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementFilter {
    /// 限定筒倉
    pub silo_id: Option<String>,

    /// 起始時間（含）
    pub from: Option<DateTime<Utc>>,

    /// 結束時間（含）
    pub to: Option<DateTime<Utc>>,
}

impl MovementFilter {
    /// 全部異動
    pub fn all() -> Self {
        Self::default()
    }

    /// 單一筒倉的全部異動
    pub fn for_silo(silo_id: impl Into<String>) -> Self {
        Self {
            silo_id: Some(silo_id.into()),
            ..Self::default()
        }
    }

    /// 建構器模式：設置時間區間
    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// 檢查記錄是否符合條件
    pub fn matches<M: MovementRecord>(&self, movement: &M) -> bool {
        if let Some(silo_id) = &self.silo_id {
            if movement.silo_id() != silo_id.as_str() {
                return false;
            }
        }
        let ts = movement.timestamp();
        if self.from.is_some_and(|from| ts < from) {
            return false;
        }
        if self.to.is_some_and(|to| ts > to) {
            return false;
        }
        true
    }
}

/// 異動儲存
///
/// 查詢結果按時間遞增排列，同一時間保持寫入順序。
pub trait MovementStore {
    /// 查詢入庫異動
    fn list_inbound(&self, filter: &MovementFilter) -> Result<Vec<InboundMovement>>;

    /// 查詢出庫異動
    fn list_outbound(&self, filter: &MovementFilter) -> Result<Vec<OutboundMovement>>;

    /// 寫入入庫異動
    fn insert_inbound(&self, movement: InboundMovement) -> Result<()>;

    /// 寫入出庫異動
    fn insert_outbound(&self, movement: OutboundMovement) -> Result<()>;
}

/// 筒倉登錄檔
pub trait SiloRegistry {
    /// 查詢筒倉（None 表示全部），按 ID 排列
    fn list_silos(&self, ids: Option<&[String]>) -> Result<Vec<Silo>>;

    /// 查詢單一筒倉
    fn get_silo(&self, id: &str) -> Result<Option<Silo>>;
}

/// 記憶體儲存（測試與示範用）
///
/// 只保證單次呼叫的原子性，不提供跨呼叫的檢查後寫入。
#[derive(Debug, Default)]
pub struct InMemoryStore {
    silos: RwLock<HashMap<String, Silo>>,
    inbound: RwLock<Vec<InboundMovement>>,
    outbound: RwLock<Vec<OutboundMovement>>,
}

impl InMemoryStore {
    /// 創建空儲存
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：登錄筒倉
    ///
    /// 持有所有權時不經過鎖；即使鎖已中毒，筒倉仍會寫入其中的資料。
    pub fn with_silos(mut self, silos: impl IntoIterator<Item = Silo>) -> Self {
        let map = self.silos.get_mut().unwrap_or_else(PoisonError::into_inner);
        for silo in silos {
            map.insert(silo.id.clone(), silo);
        }
        self
    }

    /// 登錄或更新筒倉
    pub fn upsert_silo(&self, silo: Silo) -> Result<()> {
        let mut map = self.silos.write().map_err(|_| poisoned("silos"))?;
        map.insert(silo.id.clone(), silo);
        Ok(())
    }
}

fn poisoned(table: &str) -> SiloError {
    SiloError::Store(format!("{table} 鎖已中毒"))
}

fn ordered<M: MovementRecord + Clone>(rows: &[M], filter: &MovementFilter) -> Vec<M> {
    let mut selected: Vec<M> = rows.iter().filter(|m| filter.matches(*m)).cloned().collect();
    selected.sort_by_key(|m| m.timestamp());
    selected
}

impl MovementStore for InMemoryStore {
    fn list_inbound(&self, filter: &MovementFilter) -> Result<Vec<InboundMovement>> {
        let rows = self.inbound.read().map_err(|_| poisoned("inbound"))?;
        Ok(ordered(&rows, filter))
    }

    fn list_outbound(&self, filter: &MovementFilter) -> Result<Vec<OutboundMovement>> {
        let rows = self.outbound.read().map_err(|_| poisoned("outbound"))?;
        Ok(ordered(&rows, filter))
    }

    fn insert_inbound(&self, movement: InboundMovement) -> Result<()> {
        let mut rows = self.inbound.write().map_err(|_| poisoned("inbound"))?;
        rows.push(movement);
        Ok(())
    }

    fn insert_outbound(&self, movement: OutboundMovement) -> Result<()> {
        let mut rows = self.outbound.write().map_err(|_| poisoned("outbound"))?;
        rows.push(movement);
        Ok(())
    }
}

impl SiloRegistry for InMemoryStore {
    fn list_silos(&self, ids: Option<&[String]>) -> Result<Vec<Silo>> {
        let map = self.silos.read().map_err(|_| poisoned("silos"))?;
        let mut silos: Vec<Silo> = match ids {
            Some(ids) => ids.iter().filter_map(|id| map.get(id).cloned()).collect(),
            None => map.values().cloned().collect(),
        };
        silos.sort_by(|a, b| a.id.cmp(&b.id));
        silos.dedup_by(|a, b| a.id == b.id);
        Ok(silos)
    }

    fn get_silo(&self, id: &str) -> Result<Option<Silo>> {
        let map = self.silos.read().map_err(|_| poisoned("silos"))?;
        Ok(map.get(id).cloned())
    }
}

impl<T: MovementStore + ?Sized> MovementStore for Arc<T> {
    fn list_inbound(&self, filter: &MovementFilter) -> Result<Vec<InboundMovement>> {
        (**self).list_inbound(filter)
    }

    fn list_outbound(&self, filter: &MovementFilter) -> Result<Vec<OutboundMovement>> {
        (**self).list_outbound(filter)
    }

    fn insert_inbound(&self, movement: InboundMovement) -> Result<()> {
        (**self).insert_inbound(movement)
    }

    fn insert_outbound(&self, movement: OutboundMovement) -> Result<()> {
        (**self).insert_outbound(movement)
    }
}

impl<T: SiloRegistry + ?Sized> SiloRegistry for Arc<T> {
    fn list_silos(&self, ids: Option<&[String]>) -> Result<Vec<Silo>> {
        (**self).list_silos(ids)
    }

    fn get_silo(&self, id: &str) -> Result<Option<Silo>> {
        (**self).get_silo(id)
    }
}
