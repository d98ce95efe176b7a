// ==========================================
// 零件质检装箱系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod packing_box;
pub mod part;
pub mod state;
pub mod types;

// 重导出核心类型
pub use packing_box::{PackingBox, BOX_CAPACITY};
pub use part::{InspectionVerdict, Part};
pub use state::StorageSystem;
pub use types::{Criterion, PartFilter, RemovalLocation};
