// ==========================================
// 零件质检装箱系统 - 装箱存储引擎
// ==========================================
// 红线: 只有本引擎可以开箱/封箱/换箱或从集合中删除零件
// 红线: 已封箱永不修改 (不允许从已封箱中取出零件)
// 红线: 引擎不自动落库,是否同步由调用方决定
// ==========================================
// 职责: 合格零件装箱 (满箱自动封箱并开新箱)、不合格登记、按ID移除
// ==========================================

use crate::domain::packing_box::{PackingBox, BOX_CAPACITY};
use crate::domain::part::Part;
use crate::domain::state::StorageSystem;
use crate::domain::types::RemovalLocation;
use crate::repository::error::RepositoryResult;
use crate::repository::state_store::StateStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// 操作结果
// ==========================================

/// 装箱结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmitOutcome {
    /// 本次装入是否触发封箱
    pub box_closed: bool,
    /// 零件是否被装入（前置条件不满足时为 false）
    pub stored: bool,
    pub message: String,
}

/// 不合格登记结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub recorded: bool,
    pub message: String,
}

/// 移除结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalOutcome {
    /// 是否找到并移除
    pub found: bool,
    /// 零件所在位置（未找到时为 None）
    pub location: Option<RemovalLocation>,
    pub message: String,
}

impl RemovalOutcome {
    fn not_removed(location: Option<RemovalLocation>, message: String) -> Self {
        Self {
            found: false,
            location,
            message,
        }
    }

    fn removed(location: RemovalLocation, message: String) -> Self {
        Self {
            found: true,
            location: Some(location),
            message,
        }
    }
}

// ==========================================
// StorageEngine - 装箱存储引擎
// ==========================================
pub struct StorageEngine {
    state: StorageSystem,
    store: Option<Box<dyn StateStore>>,
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// 创建无持久化的引擎（全新状态）
    pub fn new() -> Self {
        Self::with_state(StorageSystem::new())
    }

    /// 以已有状态创建引擎（无持久化）
    pub fn with_state(state: StorageSystem) -> Self {
        Self { state, store: None }
    }

    /// 初始化引擎
    ///
    /// # 参数
    /// - store: 可选的状态存储
    ///
    /// # 说明
    /// - 无存储: 全新状态
    /// - 存储有数据: 使用已保存的状态
    /// - 存储为空: 创建全新状态并立即保存
    /// - 加载失败: 记录错误日志,回退为全新状态（不向调用方传播）
    pub fn initialize(store: Option<Box<dyn StateStore>>) -> Self {
        let Some(store) = store else {
            debug!("未配置持久化,使用全新状态");
            return Self::new();
        };

        let state = match store.load() {
            Ok(Some(state)) if !state.is_empty() => {
                let violations = state.check_invariants();
                for v in &violations {
                    warn!(violation = %v, "已加载状态违反不变式");
                }
                info!(
                    parts = state.total_parts(),
                    closed_boxes = state.closed_boxes.len(),
                    active_box = state.active_box.id,
                    "已从存储恢复状态"
                );
                state
            }
            Ok(_) => {
                let fresh = StorageSystem::new();
                if let Err(e) = store.save(&fresh) {
                    error!(error = %e, "初始化空存储失败");
                }
                info!("存储为空,已创建全新状态");
                fresh
            }
            Err(e) => {
                error!(error = %e, error_debug = ?e, "加载持久化状态失败,回退为全新状态");
                StorageSystem::new()
            }
        };

        Self {
            state,
            store: Some(store),
        }
    }

    /// 当前状态（只读）
    pub fn state(&self) -> &StorageSystem {
        &self.state
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// 合格零件装箱
    ///
    /// # 前置条件
    /// - part.approved == true
    /// - 零件ID未在系统中登记
    ///
    /// # 返回
    /// - box_closed = true: 本次装入使在装箱满箱封箱,已开新箱
    #[instrument(skip(self, part), fields(part_id = %part.id))]
    pub fn admit(&mut self, part: Part) -> AdmitOutcome {
        if !part.approved {
            warn!("拒绝装箱: 零件不合格");
            return AdmitOutcome {
                box_closed: false,
                stored: false,
                message: "only approved parts may be stored".to_string(),
            };
        }
        if self.state.contains_part(&part.id) {
            warn!("拒绝装箱: 零件ID重复");
            return AdmitOutcome {
                box_closed: false,
                stored: false,
                message: format!("part {} is already registered", part.id),
            };
        }

        let part_id = part.id.clone();
        self.state.approved_parts.push(part.clone());
        let closed = self.state.active_box.pack(part);
        let fill = self.state.active_box.len();

        if !closed {
            debug!(box_id = self.state.active_box.id, fill, "零件已装箱");
            return AdmitOutcome {
                box_closed: false,
                stored: true,
                message: format!(
                    "Part {} added to box #{} ({}/{} parts)",
                    part_id, self.state.active_box.id, fill, BOX_CAPACITY
                ),
            };
        }

        // 满箱: 封箱 → 计数器递增 → 开新箱
        self.state.box_counter += 1;
        let sealed = std::mem::replace(
            &mut self.state.active_box,
            PackingBox::new(self.state.box_counter),
        );
        let sealed_id = sealed.id;
        self.state.closed_boxes.push(sealed);
        info!(
            closed_box = sealed_id,
            new_box = self.state.box_counter,
            "箱子已满,封箱并开新箱"
        );

        AdmitOutcome {
            box_closed: true,
            stored: true,
            message: format!(
                "Part {} added. Box #{} CLOSED ({} parts). Box #{} opened",
                part_id, sealed_id, BOX_CAPACITY, self.state.box_counter
            ),
        }
    }

    /// 登记不合格零件
    pub fn record_rejection(&mut self, part: Part) -> RecordOutcome {
        if part.approved {
            return RecordOutcome {
                recorded: false,
                message: format!("part {} is approved and must be boxed", part.id),
            };
        }
        if self.state.contains_part(&part.id) {
            warn!(part_id = %part.id, "拒绝登记: 零件ID重复");
            return RecordOutcome {
                recorded: false,
                message: format!("part {} is already registered", part.id),
            };
        }

        debug!(part_id = %part.id, reasons = part.rejection_reasons.len(), "不合格零件已登记");
        let message = format!("Part {} recorded as rejected", part.id);
        self.state.rejected_parts.push(part);
        RecordOutcome {
            recorded: true,
            message,
        }
    }

    /// 按ID移除零件
    ///
    /// # 查找顺序
    /// 1. 合格集合: 在装箱 → 已封箱 (拒绝移除) → 未装箱 (数据不一致,照常移除)
    /// 2. 不合格集合
    #[instrument(skip(self))]
    pub fn remove_by_id(&mut self, part_id: &str) -> RemovalOutcome {
        let part_id = part_id.trim();
        if part_id.is_empty() {
            return RemovalOutcome::not_removed(None, "part id must not be empty".to_string());
        }

        if let Some(idx) = self.state.approved_parts.iter().position(|p| p.id == part_id) {
            if let Some(sealed) = self.state.closed_boxes.iter().find(|b| b.contains(part_id)) {
                warn!(box_id = sealed.id, "拒绝移除: 零件位于已封箱");
                return RemovalOutcome::not_removed(
                    Some(RemovalLocation::SealedInClosedBox(sealed.id)),
                    format!(
                        "part {} is sealed in closed box #{} and cannot be removed",
                        part_id, sealed.id
                    ),
                );
            }

            self.state.approved_parts.remove(idx);
            let active_id = self.state.active_box.id;
            if self.state.active_box.take(part_id).is_some() {
                info!(box_id = active_id, "零件已从在装箱移除");
                return RemovalOutcome::removed(
                    RemovalLocation::ActiveBox(active_id),
                    format!("Part {} removed from active box #{}", part_id, active_id),
                );
            }

            warn!("移除的合格零件不在任何箱中");
            return RemovalOutcome::removed(
                RemovalLocation::ApprovedUnassigned,
                format!("Part {} removed (approved, not assigned to any box)", part_id),
            );
        }

        if let Some(idx) = self.state.rejected_parts.iter().position(|p| p.id == part_id) {
            self.state.rejected_parts.remove(idx);
            info!("不合格零件已移除");
            return RemovalOutcome::removed(
                RemovalLocation::Rejected,
                format!("Part {} removed (rejected)", part_id),
            );
        }

        RemovalOutcome::not_removed(None, format!("part {} not found", part_id))
    }

    /// 同步当前状态到存储（无存储时直接返回）
    pub fn sync(&self) -> RepositoryResult<()> {
        match &self.store {
            Some(store) => store.save(&self.state),
            None => Ok(()),
        }
    }

    /// 重置为全新状态,有存储时清空并保存
    pub fn reset(&mut self) -> RepositoryResult<()> {
        self.state = StorageSystem::new();
        if let Some(store) = &self.store {
            store.clear()?;
            store.save(&self.state)?;
        }
        info!("系统状态已重置");
        Ok(())
    }
}
