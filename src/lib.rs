//! # Silo Inventory Ledger
//!
//! 筒倉先進先出庫存帳本
//!
//! - [`model`]: 筒倉、異動、批次、料位與儲存介面
//! - [`calc`]: 帳本重算、受理檢查、提取明細、統計彙總
//! - [`cache`]: 增量料位快取

pub use silo_cache as cache;
pub use silo_calc as calc;
pub use silo_core as model;

pub use silo_cache::IncrementalCalculator;
pub use silo_calc::{
    AdmissionValidator, FleetStats, InventoryService, LedgerEngine, StatisticsAggregator,
    WithdrawalPlanner,
};
pub use silo_core::{
    Batch, ConsumptionOrder, GroupBy, InMemoryStore, InboundMovement, LedgerConfig,
    MovementFilter, MovementKind, MovementRecord, MovementStore, OutboundMovement, Result, Silo,
    SiloError, SiloLevel, SiloRegistry, UtilizationBucket, UtilizationThresholds, WithdrawalLine,
    WithdrawalPlan,
};
