// ==========================================
// 零件质检装箱系统 - 应用配置
// ==========================================
// 职责: 数据库路径 / 语言 / 持久化开关 / 同步策略
// 优先级: 命令行参数 > 环境变量 > 默认值
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 环境变量: 数据库路径
pub const ENV_DB_PATH: &str = "PARTS_QC_DB_PATH";
/// 环境变量: 界面语言
pub const ENV_LOCALE: &str = "PARTS_QC_LOCALE";

/// 默认数据库文件名（与旧版一致）
pub const DEFAULT_DB_FILE: &str = "sistema_pecas.db";
/// 默认界面语言
pub const DEFAULT_LOCALE: &str = "en";
/// 支持的界面语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "pt-BR"];

// ==========================================
// 配置键 (sistema_config 表)
// ==========================================
pub mod config_keys {
    /// 箱号计数器
    pub const BOX_COUNTER: &str = "contador_caixas";
}

// ==========================================
// SyncPolicy - 同步策略
// ==========================================
// 说明: 核心引擎不自动落库,由调用方按策略决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncPolicy {
    EveryChange, // 每次变更后立即保存
    Manual,      // 仅在显式保存/退出时保存
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPolicy::EveryChange => write!(f, "EVERY_CHANGE"),
            SyncPolicy::Manual => write!(f, "MANUAL"),
        }
    }
}

// ==========================================
// AppConfig - 应用配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub db_path: String,
    pub locale: String,
    pub persistence: bool,
    pub sync_policy: SyncPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: get_default_db_path(),
            locale: default_locale(),
            persistence: true,
            sync_policy: SyncPolicy::EveryChange,
        }
    }
}

impl AppConfig {
    /// 以命令行覆盖项构造配置
    ///
    /// # 参数
    /// - db_path: 指定数据库路径（None 时读取环境变量/默认路径）
    /// - locale: 指定界面语言（不支持的语言回退为 en）
    pub fn with_overrides(
        db_path: Option<String>,
        locale: Option<String>,
        persistence: bool,
        sync_policy: SyncPolicy,
    ) -> Self {
        let defaults = Self::default();
        Self {
            db_path: db_path
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.db_path),
            locale: locale
                .map(|l| normalize_locale(&l))
                .unwrap_or(defaults.locale),
            persistence,
            sync_policy,
        }
    }
}

/// 语言代码归一化（不支持时回退默认语言）
pub fn normalize_locale(raw: &str) -> String {
    let trimmed = raw.trim();
    SUPPORTED_LOCALES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(trimmed) || l.split('-').next() == Some(trimmed))
        .map(|l| l.to_string())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

fn default_locale() -> String {
    std::env::var(ENV_LOCALE)
        .map(|l| normalize_locale(&l))
        .unwrap_or_else(|_| DEFAULT_LOCALE.to_string())
}

/// 获取默认数据库路径
///
/// 顺序: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(format!("./{}", DEFAULT_DB_FILE));

    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join("parts-qc");
        if std::fs::create_dir_all(&app_dir).is_ok() {
            path = app_dir.join(DEFAULT_DB_FILE);
        } else {
            tracing::warn!("无法创建数据目录 {:?}, 使用当前目录", app_dir);
        }
    }

    path.to_string_lossy().to_string()
}
