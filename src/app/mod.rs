// ==========================================
// 零件质检装箱系统 - 应用层
// ==========================================
// 职责: 组装各层,供入口程序使用
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
