//! # Silo Cache
//!
//! 料位快取與增量重算模組

pub mod dirty_tracking;
pub mod incremental;

// Re-export 主要類型
pub use dirty_tracking::DirtyTracker;
pub use incremental::{CacheStats, HistoryFingerprint, IncrementalCalculator};
