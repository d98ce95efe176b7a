// ==========================================
// 零件质检装箱系统 - 配置层
// ==========================================
// 职责: 应用配置加载 (命令行 / 环境变量 / 默认值)
// 存储: sistema_config 表只保存箱号计数器
// ==========================================

pub mod app_config;

// 重导出核心配置
pub use app_config::{
    config_keys, get_default_db_path, normalize_locale, AppConfig, SyncPolicy, DEFAULT_LOCALE,
    SUPPORTED_LOCALES,
};
