// ==========================================
// 零件质检装箱系统 - 零件领域模型
// ==========================================
// 职责: 定义零件实体及其质检结论
// 红线: 质检结论只写入一次,之后零件不可变
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// InspectionVerdict - 质检结论
// ==========================================
/// 质检结论（由 QualityValidator 产出）
///
/// 约束: `reasons` 为空 ⇔ `approved == true`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionVerdict {
    pub approved: bool,
    pub reasons: Vec<String>,
}

impl InspectionVerdict {
    /// 构造结论,approved 由原因列表推导
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            approved: reasons.is_empty(),
            reasons,
        }
    }
}

// ==========================================
// Part - 零件
// ==========================================
// 用途: 一个被检零件的测量值与质检结论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,                     // 零件ID (系统内唯一)
    pub weight: f64,                    // 重量 (g)
    pub color: String,                  // 颜色
    pub length: f64,                    // 长度 (cm)
    pub approved: bool,                 // 是否合格
    pub rejection_reasons: Vec<String>, // 不合格原因 (合格时为空)
}

impl Part {
    /// 创建待检零件
    ///
    /// 初始状态: approved = false, 无不合格原因
    pub fn new(id: impl Into<String>, weight: f64, color: impl Into<String>, length: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            color: color.into(),
            length,
            approved: false,
            rejection_reasons: Vec::new(),
        }
    }

    /// 从持久化数据恢复零件（结论已确定）
    pub fn restore(
        id: String,
        weight: f64,
        color: String,
        length: f64,
        approved: bool,
        rejection_reasons: Vec<String>,
    ) -> Self {
        Self {
            id,
            weight,
            color,
            length,
            approved,
            rejection_reasons,
        }
    }

    /// 写入质检结论
    pub fn apply_verdict(&mut self, verdict: InspectionVerdict) {
        self.approved = verdict.approved;
        self.rejection_reasons = verdict.reasons;
    }

    /// 以结论构造新零件（消费式写法,便于链式调用）
    pub fn with_verdict(mut self, verdict: InspectionVerdict) -> Self {
        self.apply_verdict(verdict);
        self
    }

    /// 结论是否自洽: 原因为空 ⇔ 合格
    pub fn is_consistent(&self) -> bool {
        self.rejection_reasons.is_empty() == self.approved
    }
}
