//! # 解析器模块
//!
//! 文档解析与序列化，目前只有 HTML。

pub mod html;
