// ==========================================
// 零件质检装箱系统 - 报表引擎
// ==========================================
// 红线: 纯函数,只读取状态,不做任何修改
// 红线: 空状态不得出现除零
// ==========================================
// 职责: 合格率统计 / 装箱统计 / 不合格原因分类
// ==========================================

use crate::domain::packing_box::BOX_CAPACITY;
use crate::domain::state::StorageSystem;
use crate::domain::types::Criterion;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// 报表宽度（标题居中与分隔线）
const REPORT_WIDTH: usize = 40;

// ==========================================
// ReasonBreakdown - 不合格原因分类计数
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonBreakdown {
    pub weight: usize,
    pub color: usize,
    pub length: usize,
}

impl ReasonBreakdown {
    pub fn get(&self, criterion: Criterion) -> usize {
        match criterion {
            Criterion::Weight => self.weight,
            Criterion::Color => self.color,
            Criterion::Length => self.length,
        }
    }

    fn bump(&mut self, criterion: Criterion) {
        match criterion {
            Criterion::Weight => self.weight += 1,
            Criterion::Color => self.color += 1,
            Criterion::Length => self.length += 1,
        }
    }
}

// ==========================================
// InspectionSummary - 质检汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionSummary {
    pub total_parts: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub approved_pct: f64,
    pub rejected_pct: f64,
    pub closed_boxes: usize,
    pub active_box_id: u32,
    pub active_box_fill: usize,
    pub box_capacity: usize,
    pub reasons: ReasonBreakdown,
}

// ==========================================
// ReportGenerator - 报表生成器
// ==========================================
pub struct ReportGenerator;

impl ReportGenerator {
    /// 汇总当前状态
    ///
    /// # 说明
    /// - 百分比 = 100 * 数量 / 总数；总数为 0 时均为 0.0
    /// - 每条原因按 重量 → 颜色 → 长度 的顺序取第一个命中的关键字计数
    pub fn summarize(state: &StorageSystem) -> InspectionSummary {
        let approved_count = state.approved_parts.len();
        let rejected_count = state.rejected_parts.len();
        let total_parts = approved_count + rejected_count;

        let mut reasons = ReasonBreakdown::default();
        state
            .rejected_parts
            .iter()
            .flat_map(|p| p.rejection_reasons.iter())
            .filter_map(|r| Criterion::classify_reason(r))
            .for_each(|c| reasons.bump(c));

        InspectionSummary {
            total_parts,
            approved_count,
            rejected_count,
            approved_pct: percentage(approved_count, total_parts),
            rejected_pct: percentage(rejected_count, total_parts),
            closed_boxes: state.closed_boxes.len(),
            active_box_id: state.active_box.id,
            active_box_fill: state.active_box.len(),
            box_capacity: BOX_CAPACITY,
            reasons,
        }
    }

    /// 生成文本报表
    ///
    /// 段落顺序: 标题 → 汇总 → 装箱 → 不合格原因（仅在有不合格零件时输出）
    pub fn generate_report(state: &StorageSystem) -> String {
        Self::render(&Self::summarize(state))
    }

    /// 渲染已有汇总
    pub fn render(summary: &InspectionSummary) -> String {
        let rule = "=".repeat(REPORT_WIDTH);
        let mut out = String::new();

        // write! 写入 String 不会失败
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{:^width$}", "QUALITY CONTROL REPORT", width = REPORT_WIDTH);
        let _ = writeln!(out, "{}", rule);

        let _ = writeln!(out);
        let _ = writeln!(out, "SUMMARY");
        let _ = writeln!(out, "  Total parts inspected: {}", summary.total_parts);
        let _ = writeln!(
            out,
            "  Approved: {} ({:.1}%)",
            summary.approved_count, summary.approved_pct
        );
        let _ = writeln!(
            out,
            "  Rejected: {} ({:.1}%)",
            summary.rejected_count, summary.rejected_pct
        );

        let _ = writeln!(out);
        let _ = writeln!(out, "STORAGE");
        let _ = writeln!(out, "  Closed boxes: {}", summary.closed_boxes);
        if summary.active_box_fill > 0 {
            let _ = writeln!(
                out,
                "  Box in progress: #{} ({}/{} parts)",
                summary.active_box_id, summary.active_box_fill, summary.box_capacity
            );
        } else {
            let _ = writeln!(out, "  Box in progress: #{} (empty)", summary.active_box_id);
        }

        if summary.rejected_count > 0 {
            let _ = writeln!(out);
            let _ = writeln!(out, "REJECTION BREAKDOWN");
            for criterion in Criterion::ALL {
                let _ = writeln!(
                    out,
                    "  {}: {}",
                    breakdown_label(criterion),
                    summary.reasons.get(criterion)
                );
            }
        }

        let _ = write!(out, "{}", rule);
        out
    }
}

fn breakdown_label(criterion: Criterion) -> &'static str {
    match criterion {
        Criterion::Weight => "Weight out of range",
        Criterion::Color => "Color not accepted",
        Criterion::Length => "Length out of range",
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
