// ==========================================
// 零件质检装箱系统 - 状态存储接口
// ==========================================
// 说明: Engine 只依赖本 trait,具体存储由仓储实现注入
// ==========================================

use crate::domain::state::StorageSystem;
use crate::repository::error::RepositoryResult;

/// 系统状态存储
///
/// 约定:
/// - `load` 返回最近一次完整同步的状态；存储中没有任何数据时返回 `Ok(None)`
/// - `save` 全量覆盖存储内容（含删除已不存在的零件/箱子），要么全部生效要么全部不生效
/// - `save(s)` 之后 `load()` 必须得到与 `s` 相同的状态
/// - 重量/长度为 NaN 或无穷的零件无法存储,`save` 返回 `InvalidData` 且不写入任何数据
pub trait StateStore {
    fn load(&self) -> RepositoryResult<Option<StorageSystem>>;

    fn save(&self, state: &StorageSystem) -> RepositoryResult<()>;

    /// 清空存储（保留表结构）
    fn clear(&self) -> RepositoryResult<()>;
}
