use crate::tools::ToolError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 單一來源檔的處理錯誤，不會中止整個批次
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("無法取得影片長度 {}: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: ToolError,
    },

    #[error("擷取第 {index} 段失敗: {source}")]
    Extraction {
        index: usize,
        #[source]
        source: ToolError,
    },

    #[error("無法寫入合併清單 {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("合併影片失敗: {source}")]
    Merge {
        #[source]
        source: ToolError,
    },

    #[error("處理已被中斷")]
    Cancelled,
}

impl DigestError {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
