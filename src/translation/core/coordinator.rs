//! 翻译协调器
//!
//! 一轮翻译（pass）的完整流程：
//!
//! 1. 检查互斥状态：已有一轮在运行或队列非空时直接丢弃本次请求
//! 2. 按缓存命中与否划分单元，命中的立即回写
//! 3. 未命中的按提交顺序切分批次，逐批串行发送、回写、写入缓存
//! 4. 全部批次结束后持久化缓存一次，并清空运行状态
//!
//! 属性翻译走独立路径：每个未命中的属性单独发送请求并发执行，
//! 不受互斥状态约束，每条结果都会立即持久化缓存。

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;

use super::translator::{BatchTranslator, TranslatorStatsSnapshot};
use crate::translation::config::constants;
use crate::translation::pipeline::{BatchQueue, TranslatableUnit};
use crate::translation::storage::TranslationCache;

/// 一轮翻译的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// 本轮执行完毕
    Completed(PassReport),
    /// 已有一轮在运行，本次请求被丢弃
    Busy,
    /// 没有需要处理的单元，未做任何事
    Empty,
}

impl PassOutcome {
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            PassOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, PassOutcome::Busy)
    }
}

/// 单轮执行报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub units: usize,
    pub cache_hits: usize,
    pub translated: usize,
    pub batches: usize,
}

/// 属性翻译报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeReport {
    pub cache_hits: usize,
    pub requested: usize,
}

/// 协调器统计信息
#[derive(Debug, Default)]
pub struct CoordinatorStats {
    pub passes_completed: AtomicUsize,
    pub passes_dropped: AtomicUsize,
    pub units_processed: AtomicUsize,
    pub cache_hits: AtomicUsize,
    pub texts_translated: AtomicUsize,
    pub batches_sent: AtomicUsize,
    pub attribute_requests: AtomicUsize,
    /// 以微秒为单位累计
    pub processing_time: AtomicU64,
}

/// 统计信息快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorStatsSnapshot {
    pub passes_completed: usize,
    pub passes_dropped: usize,
    pub units_processed: usize,
    pub cache_hits: usize,
    pub texts_translated: usize,
    pub batches_sent: usize,
    pub attribute_requests: usize,
    pub processing_time: Duration,
    pub translator: TranslatorStatsSnapshot,
}

impl CoordinatorStats {
    fn add(counter: &AtomicUsize, n: usize) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    fn add_processing_time(&self, duration: Duration) {
        self.processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self, translator: TranslatorStatsSnapshot) -> CoordinatorStatsSnapshot {
        CoordinatorStatsSnapshot {
            passes_completed: self.passes_completed.load(Ordering::Relaxed),
            passes_dropped: self.passes_dropped.load(Ordering::Relaxed),
            units_processed: self.units_processed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            texts_translated: self.texts_translated.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            attribute_requests: self.attribute_requests.load(Ordering::Relaxed),
            processing_time: Duration::from_micros(self.processing_time.load(Ordering::Relaxed)),
            translator,
        }
    }
}

/// 翻译协调器
///
/// 运行在单线程执行器上：`running` 在第一个 await 之前置位，
/// 因此同一执行器上的并发调用能看到彼此的状态。
pub struct TranslationCoordinator {
    cache: Arc<TranslationCache>,
    translator: BatchTranslator,
    batch_size: usize,
    running: Cell<bool>,
    queue: RefCell<Vec<TranslatableUnit>>,
    stats: CoordinatorStats,
}

/// 本轮结束（包括 future 被提前丢弃）时复位运行状态
struct PassGuard<'a> {
    coordinator: &'a TranslationCoordinator,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.queue.borrow_mut().clear();
        self.coordinator.running.set(false);
    }
}

impl TranslationCoordinator {
    pub fn new(cache: Arc<TranslationCache>, translator: BatchTranslator) -> Self {
        Self {
            cache,
            translator,
            batch_size: constants::DEFAULT_BATCH_SIZE,
            running: Cell::new(false),
            queue: RefCell::new(Vec::new()),
            stats: CoordinatorStats::default(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// 当前轮次中尚未结束的单元数
    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn stats(&self) -> CoordinatorStatsSnapshot {
        self.stats.snapshot(self.translator.stats())
    }

    /// 执行一轮正文翻译
    pub async fn run(&self, units: Vec<TranslatableUnit>) -> PassOutcome {
        if self.running.get() || !self.queue.borrow().is_empty() {
            CoordinatorStats::add(&self.stats.passes_dropped, 1);
            tracing::debug!("已有翻译任务在运行，丢弃本次请求");
            return PassOutcome::Busy;
        }

        if units.is_empty() {
            return PassOutcome::Empty;
        }

        let start = Instant::now();
        self.running.set(true);
        *self.queue.borrow_mut() = units.clone();
        let _guard = PassGuard { coordinator: self };

        let mut report = PassReport {
            units: units.len(),
            ..Default::default()
        };

        let mut misses = Vec::new();
        for unit in units {
            match self.cache.get(&unit.text) {
                Some(translation) => {
                    unit.write(&translation);
                    report.cache_hits += 1;
                }
                None => misses.push(unit),
            }
        }

        tracing::debug!(
            "缓存命中 {} 条，待翻译 {} 条",
            report.cache_hits,
            misses.len()
        );

        let batches = BatchQueue::new(misses, self.batch_size);
        let total_batches = batches.remaining_batches();
        for batch in batches {
            tracing::debug!("发送批次 {}/{}（{} 条）", batch.index + 1, total_batches, batch.len());

            let translations = self.translator.translate(&batch.texts()).await;
            for (unit, translation) in batch.units.iter().zip(translations.iter()) {
                unit.write(translation);
                self.cache.set(&unit.text, translation);
            }

            report.translated += batch.len();
            report.batches += 1;
        }

        self.cache.save();

        CoordinatorStats::add(&self.stats.passes_completed, 1);
        CoordinatorStats::add(&self.stats.units_processed, report.units);
        CoordinatorStats::add(&self.stats.cache_hits, report.cache_hits);
        CoordinatorStats::add(&self.stats.texts_translated, report.translated);
        CoordinatorStats::add(&self.stats.batches_sent, report.batches);
        self.stats.add_processing_time(start.elapsed());

        tracing::info!(
            "翻译完成: {} 条文本，缓存命中 {} 条，新翻译 {} 条，共 {} 个批次",
            report.units,
            report.cache_hits,
            report.translated,
            report.batches
        );

        PassOutcome::Completed(report)
    }

    /// 翻译属性单元
    ///
    /// 每个未命中缓存的属性单独请求，所有请求并发执行，全部结束后返回。
    pub async fn translate_attributes(&self, units: Vec<TranslatableUnit>) -> AttributeReport {
        let mut report = AttributeReport::default();
        let mut pending = Vec::new();

        for unit in units {
            match self.cache.get(&unit.text) {
                Some(translation) => {
                    unit.write(&translation);
                    report.cache_hits += 1;
                }
                None => pending.push(unit),
            }
        }

        report.requested = pending.len();
        if pending.is_empty() {
            return report;
        }

        CoordinatorStats::add(&self.stats.attribute_requests, pending.len());
        tracing::debug!("并发翻译 {} 个属性", pending.len());

        let requests = pending.into_iter().map(|unit| async move {
            let translations = self
                .translator
                .translate(std::slice::from_ref(&unit.text))
                .await;
            if let Some(translation) = translations.first() {
                unit.write(translation);
                self.cache.set(&unit.text, translation);
                self.cache.save();
            }
        });
        join_all(requests).await;

        report
    }
}
