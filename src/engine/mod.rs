// ==========================================
// 零件质检装箱系统 - 引擎层
// ==========================================
// 红线: 质检器不修改零件；只有存储引擎修改系统状态
// 红线: 引擎只依赖 StateStore trait,不直接访问数据库
// ==========================================
// 职责: 质检 / 装箱 / 报表
// ==========================================

pub mod report;
pub mod storage;
pub mod validator;

// 重导出核心引擎
pub use report::{InspectionSummary, ReasonBreakdown, ReportGenerator};
pub use storage::{AdmitOutcome, RecordOutcome, RemovalOutcome, StorageEngine};
pub use validator::{QualityCriteria, QualityValidator};
