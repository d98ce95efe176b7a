// ==========================================
// 零件质检装箱系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 质检项 (Criterion)
// ==========================================
// 顺序: Weight → Color → Length (与原因输出顺序一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criterion {
    Weight, // 重量
    Color,  // 颜色
    Length, // 长度
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [Criterion::Weight, Criterion::Color, Criterion::Length];

    /// 原因文本中用于识别该质检项的关键字（小写,含葡语旧数据）
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Criterion::Weight => &["weight", "peso"],
            Criterion::Color => &["color", "cor"],
            Criterion::Length => &["length", "comprimento"],
        }
    }

    /// 从不合格原因文本识别质检项
    ///
    /// 只匹配标签部分（首个 '(' 或 ':' 之前）,用户输入的数值/颜色不参与匹配；
    /// 按 Weight → Color → Length 顺序取第一个命中项
    pub fn classify_reason(reason: &str) -> Option<Criterion> {
        let label = reason
            .split(['(', ':'])
            .next()
            .unwrap_or(reason)
            .to_lowercase();
        Criterion::ALL
            .into_iter()
            .find(|c| c.keywords().iter().any(|k| label.contains(k)))
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Weight => write!(f, "WEIGHT"),
            Criterion::Color => write!(f, "COLOR"),
            Criterion::Length => write!(f, "LENGTH"),
        }
    }
}

// ==========================================
// 移除位置 (Removal Location)
// ==========================================
// 用途: remove_by_id 结果中说明零件所在位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalLocation {
    ActiveBox(u32),         // 从在装箱中移除
    SealedInClosedBox(u32), // 位于已封箱,拒绝移除
    ApprovedUnassigned,     // 合格但未装箱（数据不一致）
    Rejected,               // 从不合格列表移除
}

impl fmt::Display for RemovalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalLocation::ActiveBox(id) => write!(f, "ACTIVE_BOX(#{})", id),
            RemovalLocation::SealedInClosedBox(id) => write!(f, "CLOSED_BOX(#{})", id),
            RemovalLocation::ApprovedUnassigned => write!(f, "APPROVED_UNASSIGNED"),
            RemovalLocation::Rejected => write!(f, "REJECTED"),
        }
    }
}

// ==========================================
// 零件列表过滤 (Part Filter)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartFilter {
    Approved,
    Rejected,
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_english_reasons() {
        assert_eq!(
            Criterion::classify_reason("Weight out of range (95.0-105.0g): 120.0g"),
            Some(Criterion::Weight)
        );
        assert_eq!(
            Criterion::classify_reason("Color not accepted (expected: blue or green): red"),
            Some(Criterion::Color)
        );
        assert_eq!(
            Criterion::classify_reason("Length out of range (10.0-20.0cm): 25.0cm"),
            Some(Criterion::Length)
        );
    }

    #[test]
    fn test_classify_portuguese_reasons() {
        assert_eq!(
            Criterion::classify_reason("Peso fora do intervalo (95.0-105.0g): 120.0g"),
            Some(Criterion::Weight)
        );
        assert_eq!(
            Criterion::classify_reason("Cor inadequada (esperado: azul ou verde): vermelho"),
            Some(Criterion::Color)
        );
        assert_eq!(
            Criterion::classify_reason("Comprimento fora do intervalo (10.0-20.0cm): 25.0cm"),
            Some(Criterion::Length)
        );
    }

    #[test]
    fn test_classify_ignores_reported_value() {
        assert_eq!(
            Criterion::classify_reason(
                "Color not accepted (expected: blue or green): lightweight grey"
            ),
            Some(Criterion::Color)
        );
        assert_eq!(
            Criterion::classify_reason("Cor inadequada (esperado: azul ou verde): peso pesado"),
            Some(Criterion::Color)
        );
    }

    #[test]
    fn test_classify_unknown_reason() {
        assert_eq!(Criterion::classify_reason("surface scratched"), None);
    }
}
