//! # Silo Calculation Engine
//!
//! 先進先出帳本、出入庫檢查、提取明細與使用率統計

pub mod admission;
pub mod ledger;
pub mod statistics;
pub mod validation;
pub mod withdrawal;

// Re-export 主要類型
pub use admission::InventoryService;
pub use ledger::LedgerEngine;
pub use statistics::{FleetStats, StatisticsAggregator};
pub use validation::AdmissionValidator;
pub use withdrawal::WithdrawalPlanner;
