// ==========================================
// 零件质检装箱系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供交互菜单调用
// ==========================================

pub mod error;
pub mod inspection_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use inspection_api::{
    parse_measurement, BoxView, InspectionApi, PartInput, RegistrationResult, RemovalResult,
    SummaryReport, EMPTY_VALUE_MESSAGE,
};
