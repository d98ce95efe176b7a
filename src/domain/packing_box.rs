// ==========================================
// 零件质检装箱系统 - 包装箱领域模型
// ==========================================
// 红线: 箱满即封,封箱后不再修改
// ==========================================

use crate::domain::part::Part;
use serde::{Deserialize, Serialize};

/// 每箱容量（件）
pub const BOX_CAPACITY: usize = 10;

// ==========================================
// PackingBox - 包装箱
// ==========================================
// 约束: closed == true ⇔ parts.len() == BOX_CAPACITY
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingBox {
    pub id: u32,          // 箱号 (正整数,单调分配)
    pub parts: Vec<Part>, // 箱内零件 (按到达顺序)
    pub closed: bool,     // 是否已封箱
}

impl PackingBox {
    /// 创建空箱
    pub fn new(id: u32) -> Self {
        Self {
            id,
            parts: Vec::new(),
            closed: false,
        }
    }

    /// 当前件数
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contains(&self, part_id: &str) -> bool {
        self.parts.iter().any(|p| p.id == part_id)
    }

    /// 箱内零件ID列表
    pub fn part_ids(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.id.as_str()).collect()
    }

    /// 装入零件,装满时同步封箱
    ///
    /// # 返回
    /// - true: 本次装入使箱子封箱
    /// - false: 箱子仍可继续装入
    pub(crate) fn pack(&mut self, part: Part) -> bool {
        debug_assert!(!self.closed, "closed box must not be mutated");
        self.parts.push(part);
        if self.parts.len() == BOX_CAPACITY {
            self.closed = true;
        }
        self.closed
    }

    /// 从未封箱中取出零件
    pub(crate) fn take(&mut self, part_id: &str) -> Option<Part> {
        if self.closed {
            return None;
        }
        let pos = self.parts.iter().position(|p| p.id == part_id)?;
        Some(self.parts.remove(pos))
    }
}
