//! 批次划分
//!
//! 把未命中缓存的单元按顺序切分为不超过 `batch_size` 条的批次，
//! 批次内第 i 条原文与翻译结果的第 i 条一一对应。

use std::collections::VecDeque;

use super::unit::TranslatableUnit;

/// 一次网络请求对应的翻译批次
#[derive(Debug, Clone)]
pub struct Batch {
    /// 本轮中的批次序号，从 0 开始
    pub index: usize,
    pub units: Vec<TranslatableUnit>,
}

impl Batch {
    /// 按顺序提取原文
    pub fn texts(&self) -> Vec<String> {
        self.units.iter().map(|unit| unit.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// 按提交顺序每次取出队首 `batch_size` 个单元
#[derive(Debug)]
pub struct BatchQueue {
    pending: VecDeque<TranslatableUnit>,
    batch_size: usize,
    next_index: usize,
}

impl BatchQueue {
    pub fn new(units: Vec<TranslatableUnit>, batch_size: usize) -> Self {
        Self {
            pending: units.into(),
            batch_size: batch_size.max(1),
            next_index: 0,
        }
    }

    /// 尚未取出的单元数
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// 剩余单元还需要的批次数
    pub fn remaining_batches(&self) -> usize {
        self.pending.len().div_ceil(self.batch_size)
    }
}

impl Iterator for BatchQueue {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            return None;
        }

        let take = self.batch_size.min(self.pending.len());
        let batch = Batch {
            index: self.next_index,
            units: self.pending.drain(..take).collect(),
        };
        self.next_index += 1;
        Some(batch)
    }
}
