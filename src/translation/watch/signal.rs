//! 变更信号源

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;

/// 变更通知回调
pub type ChangeCallback = Box<dyn Fn()>;

/// 文档变更信号
pub trait ChangeSignal {
    fn subscribe(&self, callback: ChangeCallback);
}

/// 进程内信号中心，由修改文档的代码主动调用 [`SignalHub::notify`]
#[derive(Clone, Default)]
pub struct SignalHub {
    subscribers: Rc<RefCell<Vec<Rc<dyn Fn()>>>>,
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        // 回调中允许继续订阅
        let subscribers = self.subscribers.borrow().clone();
        for callback in subscribers {
            callback();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl ChangeSignal for SignalHub {
    fn subscribe(&self, callback: ChangeCallback) {
        self.subscribers.borrow_mut().push(Rc::from(callback));
    }
}

/// 文件签名：修改时间与长度
type FileSignature = Option<(Option<SystemTime>, u64)>;

fn file_signature(path: &Path) -> FileSignature {
    std::fs::metadata(path)
        .ok()
        .map(|meta| (meta.modified().ok(), meta.len()))
}

/// 轮询文件元数据的变更信号
pub struct FileWatcher {
    path: PathBuf,
    interval: Duration,
    hub: SignalHub,
    task: RefCell<Option<JoinHandle<()>>>,
}

impl FileWatcher {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
            hub: SignalHub::new(),
            task: RefCell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 开始轮询，必须在 `LocalSet` 中调用
    pub fn start(&self) {
        self.stop();

        let path = self.path.clone();
        let hub = self.hub.clone();
        let period = self.interval;
        let task = tokio::task::spawn_local(async move {
            let mut last = file_signature(&path);
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let current = file_signature(&path);
                if current != last {
                    tracing::debug!("检测到文件变化: {}", path.display());
                    last = current;
                    hub.notify();
                }
            }
        });

        *self.task.borrow_mut() = Some(task);
        tracing::info!("开始监听文件: {}", self.path.display());
    }

    pub fn stop(&self) {
        if let Some(task) = self.task.borrow_mut().take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .borrow()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl ChangeSignal for FileWatcher {
    fn subscribe(&self, callback: ChangeCallback) {
        self.hub.subscribe(callback);
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::task::LocalSet;

    #[test]
    fn test_hub_notifies_every_subscriber() {
        let hub = SignalHub::new();
        let count = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let count = Rc::clone(&count);
            hub.subscribe(Box::new(move || count.set(count.get() + 1)));
        }

        hub.notify();
        hub.clone().notify();
        assert_eq!(count.get(), 4);
        assert_eq!(hub.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_file_watcher_reports_modifications() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<p>a</p>").unwrap();

        LocalSet::new()
            .run_until(async {
                let watcher = FileWatcher::new(&path, Duration::from_millis(10));
                let count = Rc::new(Cell::new(0));
                let counter = Rc::clone(&count);
                watcher.subscribe(Box::new(move || counter.set(counter.get() + 1)));
                watcher.start();
                assert!(watcher.is_running());

                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(count.get(), 0);

                std::fs::write(&path, "<p>changed</p>").unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
                assert_eq!(count.get(), 1);

                watcher.stop();
                assert!(!watcher.is_running());
            })
            .await;
    }
}
