// ==========================================
// 零件质检装箱系统 - 质检引擎
// ==========================================
// 红线: 纯函数,不修改零件,每个不合格项必须输出 reason
// ==========================================
// 职责: 重量 / 颜色 / 长度 三项独立判定
// 输入: Part (测量值)
// 输出: InspectionVerdict (是否合格 + 原因列表)
// ==========================================

use crate::domain::part::{InspectionVerdict, Part};
use serde::{Deserialize, Serialize};

/// 重量下限 (g)
pub const MIN_WEIGHT_G: f64 = 95.0;
/// 重量上限 (g)
pub const MAX_WEIGHT_G: f64 = 105.0;
/// 长度下限 (cm)
pub const MIN_LENGTH_CM: f64 = 10.0;
/// 长度上限 (cm)
pub const MAX_LENGTH_CM: f64 = 20.0;
/// 合格颜色
pub const ACCEPTED_COLORS: [&str; 2] = ["blue", "green"];

/// 旧系统（葡语）颜色别名 → 标准颜色
const COLOR_ALIASES: [(&str, &str); 2] = [("azul", "blue"), ("verde", "green")];

// ==========================================
// QualityCriteria - 质检标准
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCriteria {
    pub min_weight_g: f64,
    pub max_weight_g: f64,
    pub accepted_colors: Vec<String>,
    pub min_length_cm: f64,
    pub max_length_cm: f64,
}

impl Default for QualityCriteria {
    fn default() -> Self {
        Self {
            min_weight_g: MIN_WEIGHT_G,
            max_weight_g: MAX_WEIGHT_G,
            accepted_colors: ACCEPTED_COLORS.iter().map(|c| c.to_string()).collect(),
            min_length_cm: MIN_LENGTH_CM,
            max_length_cm: MAX_LENGTH_CM,
        }
    }
}

// ==========================================
// QualityValidator - 质检引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct QualityValidator {
    criteria: QualityCriteria,
}

impl QualityValidator {
    /// 创建新的 QualityValidator 实例
    ///
    /// # 参数
    /// - criteria: 质检标准
    pub fn new(criteria: QualityCriteria) -> Self {
        Self { criteria }
    }

    /// 质检单个零件
    ///
    /// # 返回
    /// - InspectionVerdict: approved 为 true 当且仅当三项全部通过;
    ///   reasons 顺序固定为 重量 → 颜色 → 长度
    pub fn validate(&self, part: &Part) -> InspectionVerdict {
        let reasons: Vec<String> = [
            self.check_weight(part.weight),
            self.check_color(&part.color),
            self.check_length(part.length),
        ]
        .into_iter()
        .flatten()
        .collect();

        InspectionVerdict::from_reasons(reasons)
    }

    /// 重量判定（闭区间）
    pub fn check_weight(&self, weight: f64) -> Option<String> {
        let c = &self.criteria;
        if (c.min_weight_g..=c.max_weight_g).contains(&weight) {
            return None;
        }
        Some(format!(
            "Weight out of range ({:.1}-{:.1}g): {:.1}g",
            c.min_weight_g, c.max_weight_g, weight
        ))
    }

    /// 颜色判定（去除首尾空白,不区分大小写）
    pub fn check_color(&self, color: &str) -> Option<String> {
        let normalized = normalize_color(color);
        if self
            .criteria
            .accepted_colors
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(&normalized))
        {
            return None;
        }
        Some(format!(
            "Color not accepted (expected: {}): {}",
            self.criteria.accepted_colors.join(" or "),
            color
        ))
    }

    /// 长度判定（闭区间）
    pub fn check_length(&self, length: f64) -> Option<String> {
        let c = &self.criteria;
        if (c.min_length_cm..=c.max_length_cm).contains(&length) {
            return None;
        }
        Some(format!(
            "Length out of range ({:.1}-{:.1}cm): {:.1}cm",
            c.min_length_cm, c.max_length_cm, length
        ))
    }
}

/// 颜色归一化: trim + 小写 + 别名映射
fn normalize_color(color: &str) -> String {
    let lowered = color.trim().to_lowercase();
    COLOR_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> QualityValidator {
        QualityValidator::default()
    }

    #[test]
    fn test_approved_part() {
        let part = Part::new("P001", 100.0, "blue", 15.0);
        let verdict = validator().validate(&part);
        assert!(verdict.approved);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn test_all_criteria_fail_in_order() {
        let part = Part::new("P002", 120.0, "red", 25.0);
        let verdict = validator().validate(&part);
        assert!(!verdict.approved);
        assert_eq!(verdict.reasons.len(), 3);
        assert_eq!(verdict.reasons[0], "Weight out of range (95.0-105.0g): 120.0g");
        assert_eq!(
            verdict.reasons[1],
            "Color not accepted (expected: blue or green): red"
        );
        assert_eq!(verdict.reasons[2], "Length out of range (10.0-20.0cm): 25.0cm");
    }

    #[test]
    fn test_inclusive_bounds() {
        let v = validator();
        for (w, l) in [(95.0, 10.0), (105.0, 20.0), (95.0, 20.0), (105.0, 10.0)] {
            let verdict = v.validate(&Part::new("B", w, "green", l));
            assert!(verdict.approved, "weight={} length={} should pass", w, l);
        }
    }

    #[test]
    fn test_just_outside_bounds_single_reason() {
        let v = validator();
        let verdict = v.validate(&Part::new("W", 94.9, "green", 15.0));
        assert_eq!(verdict.reasons.len(), 1);
        assert!(verdict.reasons[0].to_lowercase().contains("weight"));

        let verdict = v.validate(&Part::new("L", 100.0, "green", 20.1));
        assert_eq!(verdict.reasons.len(), 1);
        assert!(verdict.reasons[0].to_lowercase().contains("length"));
    }

    #[test]
    fn test_color_normalization() {
        let v = validator();
        assert!(v.check_color("  BLUE ").is_none());
        assert!(v.check_color("Green").is_none());
        assert!(v.check_color("azul").is_none());
        assert!(v.check_color(" Verde").is_none());
        assert!(v.check_color("").is_some());
        assert!(v.check_color("vermelho").is_some());
    }

    #[test]
    fn test_degenerate_values_do_not_panic() {
        let verdict = validator().validate(&Part::new("", -1.0, "", f64::NAN));
        assert_eq!(verdict.reasons.len(), 3);
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let part = Part::new("P9", 120.0, "red", 15.0);
        let before = part.clone();
        let _ = validator().validate(&part);
        assert_eq!(part, before);
    }

    #[test]
    fn test_custom_criteria() {
        let v = QualityValidator::new(QualityCriteria {
            accepted_colors: vec!["black".to_string()],
            ..QualityCriteria::default()
        });
        assert!(v.check_color("Black").is_none());
        assert!(v.check_color("blue").is_some());
    }
}
