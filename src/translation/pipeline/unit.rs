//! 可翻译单元与回写句柄

use std::fmt;
use std::rc::Rc;

/// 回写能力：一个句柄只对应一个可写位置（文本节点或元素的某个属性）
pub trait WriteTarget {
    fn write(&self, text: &str);
}

/// 一段待翻译的原文及其回写句柄
///
/// 每次扫描重新生成，从不持久化；克隆只增加句柄的引用计数。
#[derive(Clone)]
pub struct TranslatableUnit {
    pub handle: Rc<dyn WriteTarget>,
    /// 已去除首尾空白的非空原文
    pub text: String,
}

impl TranslatableUnit {
    pub fn new(handle: Rc<dyn WriteTarget>, text: impl Into<String>) -> Self {
        Self {
            handle,
            text: text.into(),
        }
    }

    pub fn write(&self, translation: &str) {
        self.handle.write(translation);
    }
}

impl fmt::Debug for TranslatableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatableUnit")
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}
