// ==========================================
// 零件质检装箱系统 - 命令行层
// ==========================================
// 职责: 命令行参数与交互菜单
// ==========================================

pub mod args;
pub mod menu;

pub use args::{Cli, Commands, SyncArg};
pub use menu::{run, MenuAction};
