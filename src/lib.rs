// ==========================================
// 零件质检装箱系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + 交互式命令行
// 系统定位: 零件质检、自动装箱 (每箱 10 件) 与统计报表
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 质检/装箱/报表
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// 命令行层 - 参数与交互菜单
pub mod cli;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Criterion, PartFilter, RemovalLocation};

// 领域实体
pub use domain::{InspectionVerdict, PackingBox, Part, StorageSystem, BOX_CAPACITY};

// 引擎
pub use engine::{
    AdmitOutcome, InspectionSummary, QualityValidator, RecordOutcome, RemovalOutcome,
    ReportGenerator, StorageEngine,
};

// 仓储
pub use repository::{SqliteStateRepository, StateStore};

// API
pub use api::{ApiError, ApiResult, InspectionApi, PartInput};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "零件质检装箱系统";
