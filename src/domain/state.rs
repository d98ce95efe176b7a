// ==========================================
// 零件质检装箱系统 - 系统状态
// ==========================================
// 职责: 聚合零件集合与箱子集合
// 红线: 只有 StorageEngine 可以修改箱子集合
// ==========================================

use crate::domain::packing_box::{PackingBox, BOX_CAPACITY};
use crate::domain::part::Part;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// StorageSystem - 存储系统状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSystem {
    pub approved_parts: Vec<Part>,   // 全部合格零件 (按登记顺序)
    pub rejected_parts: Vec<Part>,   // 全部不合格零件 (按登记顺序)
    pub closed_boxes: Vec<PackingBox>, // 已封箱 (按封箱顺序)
    pub active_box: PackingBox,      // 在装箱 (唯一可修改的箱子)
    pub box_counter: u32,            // 箱号计数器 (等于在装箱箱号)
}

impl Default for StorageSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageSystem {
    /// 全新状态: 空集合 + 1 号在装箱
    pub fn new() -> Self {
        Self {
            approved_parts: Vec::new(),
            rejected_parts: Vec::new(),
            closed_boxes: Vec::new(),
            active_box: PackingBox::new(1),
            box_counter: 1,
        }
    }

    /// 零件总数（合格 + 不合格）
    pub fn total_parts(&self) -> usize {
        self.approved_parts.len() + self.rejected_parts.len()
    }

    /// 三个主集合与在装箱均为空
    pub fn is_empty(&self) -> bool {
        self.approved_parts.is_empty()
            && self.rejected_parts.is_empty()
            && self.closed_boxes.is_empty()
            && self.active_box.is_empty()
    }

    pub fn contains_part(&self, part_id: &str) -> bool {
        self.find_part(part_id).is_some()
    }

    /// 在合格/不合格集合中查找零件
    pub fn find_part(&self, part_id: &str) -> Option<&Part> {
        self.approved_parts
            .iter()
            .chain(self.rejected_parts.iter())
            .find(|p| p.id == part_id)
    }

    /// 检查状态不变式
    ///
    /// # 返回
    /// 违反项说明列表（为空表示状态自洽）
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.box_counter < self.active_box.id {
            violations.push(format!(
                "box_counter {} is behind active box #{}",
                self.box_counter, self.active_box.id
            ));
        }

        if self.active_box.closed {
            violations.push(format!("active box #{} is marked closed", self.active_box.id));
        }
        if self.active_box.len() >= BOX_CAPACITY {
            violations.push(format!(
                "active box #{} holds {} parts (capacity {})",
                self.active_box.id,
                self.active_box.len(),
                BOX_CAPACITY
            ));
        }

        for b in &self.closed_boxes {
            if !b.closed || b.len() != BOX_CAPACITY {
                violations.push(format!(
                    "closed box #{} holds {} parts (closed={})",
                    b.id,
                    b.len(),
                    b.closed
                ));
            }
        }

        let approved_ids: HashSet<&str> = self.approved_parts.iter().map(|p| p.id.as_str()).collect();
        let boxed = self
            .closed_boxes
            .iter()
            .chain(std::iter::once(&self.active_box))
            .flat_map(|b| b.parts.iter().map(move |p| (b.id, p.id.as_str())));
        for (box_id, part_id) in boxed {
            if !approved_ids.contains(part_id) {
                violations.push(format!(
                    "part {} in box #{} is not in approved_parts",
                    part_id, box_id
                ));
            }
        }

        let mut seen = HashSet::new();
        for p in self.approved_parts.iter().chain(self.rejected_parts.iter()) {
            if !seen.insert(p.id.as_str()) {
                violations.push(format!("duplicate part id {}", p.id));
            }
            if !p.is_consistent() {
                violations.push(format!("part {} has an inconsistent verdict", p.id));
            }
        }

        violations
    }
}
