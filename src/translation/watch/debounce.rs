//! 变更防抖
//!
//! 连续的变更通知只会在最后一次通知之后静默满一个延迟周期时触发一次重新扫描。
//! 新通知只会取消尚在等待中的计时器；已经开始的重新扫描独立运行至结束。

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use tokio::task::JoinHandle;

use super::signal::ChangeSignal;

/// 重新扫描回调
pub type RescanFn = Rc<dyn Fn() -> LocalBoxFuture<'static, ()>>;

/// 变更防抖器
///
/// 依赖 `tokio::task::spawn_local`，必须在 `LocalSet` 中使用。
pub struct MutationDebouncer {
    delay: Duration,
    rescan: RescanFn,
    pending: RefCell<Option<JoinHandle<()>>>,
}

impl MutationDebouncer {
    pub fn new<F, Fut>(delay: Duration, rescan: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        Self {
            delay,
            rescan: Rc::new(move || rescan().boxed_local()),
            pending: RefCell::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 记录一次变更，重新开始计时
    pub fn on_change(&self) {
        self.cancel();

        let rescan = Rc::clone(&self.rescan);
        let delay = self.delay;
        let timer = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!("变更已静默 {:?}，重新扫描", delay);
            // 脱离计时器单独运行，后续通知无法中断
            tokio::task::spawn_local(rescan());
        });

        *self.pending.borrow_mut() = Some(timer);
    }

    /// 取消等待中的计时器，返回是否确有计时器被取消
    pub fn cancel(&self) -> bool {
        match self.pending.borrow_mut().take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// 订阅变更信号，每次通知都转发给 [`MutationDebouncer::on_change`]
    pub fn attach(self: &Rc<Self>, signal: &dyn ChangeSignal) {
        let debouncer = Rc::downgrade(self);
        signal.subscribe(Box::new(move || {
            if let Some(debouncer) = debouncer.upgrade() {
                debouncer.on_change();
            }
        }));
    }
}

impl Drop for MutationDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
