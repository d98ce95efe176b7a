// ==========================================
// 零件质检装箱系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供状态存取接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod state_repo;
pub mod state_store;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use state_repo::SqliteStateRepository;
pub use state_store::StateStore;
