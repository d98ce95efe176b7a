// ==========================================
// 零件质检装箱系统 - 应用状态
// ==========================================
// 职责: 按配置组装 仓储 → 引擎 → API
// 说明: 数据库打开失败不终止启动,降级为仅内存运行
// ==========================================

use crate::api::InspectionApi;
use crate::config::AppConfig;
use crate::engine::{QualityCriteria, QualityValidator, StorageEngine};
use crate::repository::{SqliteStateRepository, StateStore};

/// 应用状态
///
/// 包含配置与质检API实例,由交互菜单独占持有
pub struct AppState {
    /// 生效配置
    pub config: AppConfig,

    /// 质检API
    pub inspection_api: InspectionApi,

    /// 持久化是否可用（禁用或打开失败时为 false）
    pub persistence_available: bool,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - config: 应用配置
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开 SQLite 状态仓储（persistence = true 时）
    /// 2. 初始化装箱引擎（加载已保存状态）
    /// 3. 创建质检API
    pub fn new(config: AppConfig) -> Self {
        tracing::info!(
            db_path = %config.db_path,
            persistence = config.persistence,
            sync_policy = %config.sync_policy,
            "初始化AppState"
        );

        let store: Option<Box<dyn StateStore>> = if config.persistence {
            match SqliteStateRepository::new(&config.db_path) {
                Ok(repo) => Some(Box::new(repo)),
                Err(e) => {
                    tracing::error!(error = %e, db_path = %config.db_path, "无法打开数据库,以仅内存模式运行");
                    None
                }
            }
        } else {
            tracing::info!("持久化已禁用");
            None
        };

        let engine = StorageEngine::initialize(store);
        let persistence_available = engine.has_store();
        let validator = QualityValidator::new(QualityCriteria::default());
        let inspection_api = InspectionApi::new(engine, validator, config.sync_policy);

        tracing::info!("AppState初始化成功");
        Self {
            config,
            inspection_api,
            persistence_available,
        }
    }
}
