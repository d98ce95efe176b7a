// ==========================================
// 零件质检装箱系统 - 质检 API
// ==========================================
// 职责: 前端输入校验 → 质检 → 装箱/登记 → 按同步策略落库
// 红线: API 不直接修改状态,所有修改经由 StorageEngine
// ==========================================

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::SyncPolicy;
use crate::domain::packing_box::PackingBox;
use crate::domain::part::Part;
use crate::domain::types::PartFilter;
use crate::engine::report::{InspectionSummary, ReportGenerator};
use crate::engine::storage::{RemovalOutcome, StorageEngine};
use crate::engine::validator::QualityValidator;

// ==========================================
// PartInput - 前端原始输入
// ==========================================
/// 前端录入的原始字段（数值仍为字符串,由 API 解析）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartInput {
    pub id: String,
    pub weight: String,
    pub color: String,
    pub length: String,
}

impl PartInput {
    pub fn new(
        id: impl Into<String>,
        weight: impl Into<String>,
        color: impl Into<String>,
        length: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            weight: weight.into(),
            color: color.into(),
            length: length.into(),
        }
    }
}

/// 数值字段为空时的错误消息
pub const EMPTY_VALUE_MESSAGE: &str = "value must not be empty";

/// 解析数值字段（接受逗号小数点,拒绝 NaN/无穷）
pub fn parse_measurement(field: &str, raw: &str) -> ApiResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_input(field, EMPTY_VALUE_MESSAGE));
    }
    let value = trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ApiError::invalid_input(field, format!("not a number: {}", trimmed)))?;
    if !value.is_finite() {
        return Err(ApiError::invalid_input(
            field,
            format!("not a finite number: {}", trimmed),
        ));
    }
    Ok(value)
}

// ==========================================
// 返回结构
// ==========================================

/// 登记结果
///
/// sync_error 非空: 零件已登记（内存中生效）,但同步到存储失败
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResult {
    pub part: Part,
    pub box_closed: bool,
    pub message: String,
    pub sync_error: Option<String>,
}

/// 移除结果（引擎结果 + 同步情况）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalResult {
    pub outcome: RemovalOutcome,
    pub sync_error: Option<String>,
}

/// 箱子视图（用于列表展示）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxView {
    pub id: u32,
    pub closed: bool,
    pub fill: usize,
    pub part_ids: Vec<String>,
}

impl From<&PackingBox> for BoxView {
    fn from(b: &PackingBox) -> Self {
        Self {
            id: b.id,
            closed: b.closed,
            fill: b.len(),
            part_ids: b.part_ids().into_iter().map(String::from).collect(),
        }
    }
}

/// JSON 报表（汇总 + 生成时间）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub generated_at: String,
    pub summary: InspectionSummary,
}

// ==========================================
// InspectionApi - 质检 API
// ==========================================

/// 质检API
///
/// 职责：
/// 1. 原始输入校验（空ID、重复ID、空颜色、非数值）
/// 2. 质检 → 合格装箱 / 不合格登记
/// 3. 查询（零件、箱子、报表）
/// 4. 按 SyncPolicy 同步到存储
pub struct InspectionApi {
    engine: StorageEngine,
    validator: QualityValidator,
    sync_policy: SyncPolicy,
}

impl InspectionApi {
    /// 创建新的InspectionApi实例
    pub fn new(engine: StorageEngine, validator: QualityValidator, sync_policy: SyncPolicy) -> Self {
        Self {
            engine,
            validator,
            sync_policy,
        }
    }

    /// 零件ID是否已登记（供前端提前提示）
    pub fn is_registered(&self, part_id: &str) -> bool {
        self.engine.state().contains_part(part_id.trim())
    }

    /// 登记零件
    ///
    /// # 参数
    /// - input: 前端原始输入
    ///
    /// # 返回
    /// - Ok(RegistrationResult): 已质检并装箱/登记
    /// - Err(InvalidInput): 字段为空或非数值
    /// - Err(DuplicatePart): ID 已登记
    ///
    /// 同步失败不回滚登记,记录在 sync_error 中
    #[instrument(skip(self, input), fields(part_id = %input.id.trim()))]
    pub fn register_part(&mut self, input: PartInput) -> ApiResult<RegistrationResult> {
        let part = self.build_part(&input)?;
        let verdict = self.validator.validate(&part);
        let part = part.with_verdict(verdict);

        let (box_closed, message) = if part.approved {
            let outcome = self.engine.admit(part.clone());
            if !outcome.stored {
                return Err(ApiError::InternalError(outcome.message));
            }
            (outcome.box_closed, outcome.message)
        } else {
            let outcome = self.engine.record_rejection(part.clone());
            if !outcome.recorded {
                return Err(ApiError::InternalError(outcome.message));
            }
            (false, outcome.message)
        };

        debug!(approved = part.approved, box_closed, "零件已登记");
        let sync_error = self.sync_after_change();

        Ok(RegistrationResult {
            part,
            box_closed,
            message,
            sync_error,
        })
    }

    /// 按ID移除零件
    ///
    /// # 返回
    /// - Ok(RemovalResult): outcome.found=false 时状态未变（未找到或位于已封箱）
    /// - Err(InvalidInput): ID 为空
    pub fn remove_part(&mut self, part_id: &str) -> ApiResult<RemovalResult> {
        if part_id.trim().is_empty() {
            return Err(ApiError::invalid_input("id", "part id must not be empty"));
        }
        let outcome = self.engine.remove_by_id(part_id);
        let sync_error = if outcome.found {
            self.sync_after_change()
        } else {
            None
        };
        Ok(RemovalResult {
            outcome,
            sync_error,
        })
    }

    /// 列出零件（All: 先合格后不合格）
    pub fn list_parts(&self, filter: PartFilter) -> Vec<&Part> {
        let state = self.engine.state();
        match filter {
            PartFilter::Approved => state.approved_parts.iter().collect(),
            PartFilter::Rejected => state.rejected_parts.iter().collect(),
            PartFilter::All => state
                .approved_parts
                .iter()
                .chain(state.rejected_parts.iter())
                .collect(),
        }
    }

    /// 列出箱子（已封箱在前,在装箱最后）
    pub fn list_boxes(&self) -> Vec<BoxView> {
        let state = self.engine.state();
        state
            .closed_boxes
            .iter()
            .chain(std::iter::once(&state.active_box))
            .map(BoxView::from)
            .collect()
    }

    pub fn summary(&self) -> InspectionSummary {
        ReportGenerator::summarize(self.engine.state())
    }

    pub fn report(&self) -> String {
        ReportGenerator::generate_report(self.engine.state())
    }

    /// 汇总导出为 JSON
    pub fn summary_json(&self) -> ApiResult<String> {
        let report = SummaryReport {
            generated_at: Local::now().to_rfc3339(),
            summary: self.summary(),
        };
        serde_json::to_string_pretty(&report)
            .map_err(|e| ApiError::InternalError(format!("序列化失败: {}", e)))
    }

    /// 立即保存（与同步策略无关）
    pub fn save_now(&self) -> ApiResult<()> {
        self.engine.sync()?;
        info!("状态已手动保存");
        Ok(())
    }

    /// 清空全部数据
    pub fn reset(&mut self) -> ApiResult<()> {
        self.engine.reset()?;
        Ok(())
    }

    // ==========================================
    // 私有辅助方法
    // ==========================================

    fn build_part(&self, input: &PartInput) -> ApiResult<Part> {
        let id = input.id.trim();
        if id.is_empty() {
            return Err(ApiError::invalid_input("id", "part id must not be empty"));
        }
        if self.engine.state().contains_part(id) {
            warn!(part_id = %id, "零件ID重复");
            return Err(ApiError::DuplicatePart(id.to_string()));
        }
        let weight = parse_measurement("weight", &input.weight)?;
        let color = input.color.trim();
        if color.is_empty() {
            return Err(ApiError::invalid_input("color", "color must not be empty"));
        }
        let length = parse_measurement("length", &input.length)?;

        Ok(Part::new(id, weight, color, length))
    }

    /// 按策略同步,失败时返回错误描述（变更保留在内存中,下次保存时写入）
    fn sync_after_change(&self) -> Option<String> {
        if self.sync_policy != SyncPolicy::EveryChange {
            return None;
        }
        match self.engine.sync() {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "变更已生效,同步到存储失败");
                Some(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::StorageSystem;
    use crate::domain::types::RemovalLocation;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use crate::repository::state_store::StateStore;

    /// 保存总是失败的存储
    struct BrokenStore;

    impl StateStore for BrokenStore {
        fn load(&self) -> RepositoryResult<Option<StorageSystem>> {
            Ok(None)
        }

        fn save(&self, _state: &StorageSystem) -> RepositoryResult<()> {
            Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
        }

        fn clear(&self) -> RepositoryResult<()> {
            Ok(())
        }
    }

    fn api() -> InspectionApi {
        InspectionApi::new(
            StorageEngine::new(),
            QualityValidator::default(),
            SyncPolicy::Manual,
        )
    }

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement("weight", " 100.5 ").unwrap(), 100.5);
        assert_eq!(parse_measurement("weight", "100,5").unwrap(), 100.5);
        assert!(matches!(
            parse_measurement("weight", "abc"),
            Err(ApiError::InvalidInput { .. })
        ));
        assert!(matches!(
            parse_measurement("weight", "  "),
            Err(ApiError::InvalidInput { message, .. }) if message == EMPTY_VALUE_MESSAGE
        ));
        assert!(parse_measurement("weight", "NaN").is_err());
        assert!(parse_measurement("length", "inf").is_err());
    }

    #[test]
    fn test_register_approved_and_rejected() {
        let mut api = api();
        let ok = api
            .register_part(PartInput::new("P1", "100", "Azul", "15"))
            .unwrap();
        assert!(ok.part.approved);
        assert_eq!(ok.message, "Part P1 added to box #1 (1/10 parts)");
        assert!(ok.sync_error.is_none());

        let bad = api
            .register_part(PartInput::new("R1", "120", "red", "25"))
            .unwrap();
        assert!(!bad.part.approved);
        assert_eq!(bad.part.rejection_reasons.len(), 3);

        assert_eq!(api.list_parts(PartFilter::Approved).len(), 1);
        assert_eq!(api.list_parts(PartFilter::Rejected).len(), 1);
        assert_eq!(api.list_parts(PartFilter::All).len(), 2);
    }

    #[test]
    fn test_register_input_errors() {
        let mut api = api();
        assert!(matches!(
            api.register_part(PartInput::new("  ", "100", "blue", "15")),
            Err(ApiError::InvalidInput { .. })
        ));
        assert!(matches!(
            api.register_part(PartInput::new("P1", "100", "  ", "15")),
            Err(ApiError::InvalidInput { .. })
        ));
        assert!(matches!(
            api.register_part(PartInput::new("P1", "100", "blue", "x")),
            Err(ApiError::InvalidInput { .. })
        ));

        api.register_part(PartInput::new("P1", "100", "blue", "15"))
            .unwrap();
        assert!(api.is_registered(" P1 "));
        assert!(matches!(
            api.register_part(PartInput::new("P1", "100", "blue", "15")),
            Err(ApiError::DuplicatePart(_))
        ));
    }

    #[test]
    fn test_remove_part() {
        let mut api = api();
        api.register_part(PartInput::new("P1", "100", "blue", "15"))
            .unwrap();
        assert!(api.remove_part("").is_err());

        let removed = api.remove_part("P1").unwrap();
        assert!(removed.outcome.found);
        assert_eq!(removed.outcome.location, Some(RemovalLocation::ActiveBox(1)));
        assert!(removed.sync_error.is_none());
        assert!(!api.remove_part("P1").unwrap().outcome.found);
    }

    #[test]
    fn test_sync_failure_keeps_change_and_reports_it() {
        let engine = StorageEngine::initialize(Some(Box::new(BrokenStore)));
        let mut api = InspectionApi::new(engine, QualityValidator::default(), SyncPolicy::EveryChange);

        let registered = api
            .register_part(PartInput::new("P1", "100", "blue", "15"))
            .unwrap();
        assert!(registered.part.approved);
        assert_eq!(registered.message, "Part P1 added to box #1 (1/10 parts)");
        assert!(registered.sync_error.unwrap().contains("disk I/O error"));
        assert!(api.is_registered("P1"));
        assert_eq!(api.list_parts(PartFilter::Approved).len(), 1);

        // 再次登记同一ID 仍按重复处理
        assert!(matches!(
            api.register_part(PartInput::new("P1", "100", "blue", "15")),
            Err(ApiError::DuplicatePart(_))
        ));

        let removed = api.remove_part("P1").unwrap();
        assert!(removed.outcome.found);
        assert!(removed.sync_error.is_some());
        assert!(!api.is_registered("P1"));

        // 未找到时不尝试同步
        let missing = api.remove_part("P1").unwrap();
        assert!(!missing.outcome.found);
        assert!(missing.sync_error.is_none());

        assert!(matches!(api.save_now(), Err(ApiError::PersistenceError(_))));
    }

    #[test]
    fn test_manual_policy_skips_sync() {
        let engine = StorageEngine::initialize(Some(Box::new(BrokenStore)));
        let mut api = InspectionApi::new(engine, QualityValidator::default(), SyncPolicy::Manual);
        let registered = api
            .register_part(PartInput::new("P1", "100", "blue", "15"))
            .unwrap();
        assert!(registered.sync_error.is_none());
    }

    #[test]
    fn test_list_boxes_and_summary_json() {
        let mut api = api();
        for i in 0..12 {
            api.register_part(PartInput::new(format!("P{:02}", i), "100", "green", "12"))
                .unwrap();
        }
        let boxes = api.list_boxes();
        assert_eq!(boxes.len(), 2);
        assert!(boxes[0].closed);
        assert_eq!(boxes[0].fill, 10);
        assert_eq!(boxes[1].id, 2);
        assert_eq!(boxes[1].part_ids, vec!["P10", "P11"]);

        let json = api.summary_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["approved_count"], 12);
        assert_eq!(value["summary"]["closed_boxes"], 1);
        assert!(value["generated_at"].is_string());
    }
}
