//! 变更监听与防抖
//!
//! [`ChangeSignal`] 抽象变更来源，[`MutationDebouncer`] 把连续的通知合并为一次重新扫描。

pub mod debounce;
pub mod signal;

pub use debounce::{MutationDebouncer, RescanFn};
pub use signal::{ChangeCallback, ChangeSignal, FileWatcher, SignalHub};
