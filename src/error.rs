//! Errors raised while reading or mutating the worksheet model.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SheetError {
    /// A shared-string cell whose value is not a non-negative integer
    #[error("共享字符串索引无效: {0:?}")]
    InvalidSharedStringIndex(String),

    /// Index past the end of the shared-string pool
    #[error("共享字符串索引 {index} 超出范围 (共 {len} 项)")]
    SharedStringOutOfRange { index: u32, len: usize },

    #[error("找不到工作表: {0}")]
    SheetNotFound(String),

    /// Cell reference that is not `<letters><row>`
    #[error("无效的单元格引用: {0:?}")]
    InvalidReference(String),
}
