use crate::tools::VideoInfo;
use log::warn;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// 外部媒體工具呼叫失敗
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("無法啟動 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} 執行逾時（{timeout_secs} 秒）")]
    Timeout { program: String, timeout_secs: u64 },

    #[error("{program} 執行失敗 (exit code {code:?}): {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("輸出檔案未建立: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("{program} 已被中斷")]
    Cancelled { program: String },

    #[error("無法解析 ffprobe 輸出: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ToolError {
    /// 可重試的暫時性錯誤；逾時與中斷不重試
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Spawn { .. } | Self::Failed { .. } | Self::MissingOutput(_)
        )
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    #[must_use]
    pub fn program(&self) -> Option<&str> {
        match self {
            Self::Spawn { program, .. }
            | Self::Timeout { program, .. }
            | Self::Failed { program, .. }
            | Self::Cancelled { program } => Some(program),
            Self::MissingOutput(_) | Self::Parse(_) | Self::Io(_) => None,
        }
    }
}

/// 從來源擷取一段時間範圍（stream copy）
#[derive(Debug, Clone, PartialEq)]
pub struct CutRequest {
    pub source: PathBuf,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub output: PathBuf,
}

/// 依清單檔順序串接多個檔案（concat demuxer）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatRequest {
    pub manifest: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaRequest {
    Cut(CutRequest),
    Concat(ConcatRequest),
}

impl MediaRequest {
    #[must_use]
    pub fn output(&self) -> &Path {
        match self {
            Self::Cut(cut) => &cut.output,
            Self::Concat(concat) => &concat.output,
        }
    }
}

/// 媒體工具介面
///
/// 每次呼叫都是阻塞的原子操作，回傳成功或失敗。
/// 實際的程序啟動與參數組合由 adapter 負責，測試可替換為假工具。
pub trait MediaTool {
    fn probe(&self, path: &Path) -> Result<VideoInfo, ToolError>;

    fn execute(&self, request: &MediaRequest) -> Result<(), ToolError>;
}

impl<T: MediaTool + ?Sized> MediaTool for &T {
    fn probe(&self, path: &Path) -> Result<VideoInfo, ToolError> {
        (**self).probe(path)
    }

    fn execute(&self, request: &MediaRequest) -> Result<(), ToolError> {
        (**self).execute(request)
    }
}

/// 執行請求，暫時性失敗時最多嘗試 `attempts` 次
///
/// 收到中斷訊號後不再重試；此時的失敗一律回報為 `ToolError::Cancelled`
/// （Ctrl-C 也會送到子程序，子程序可能先以非零結束碼退出）。
pub fn execute_with_retry<T: MediaTool + ?Sized>(
    tool: &T,
    request: &MediaRequest,
    attempts: u32,
    shutdown_signal: &AtomicBool,
) -> Result<(), ToolError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        if shutdown_signal.load(Ordering::SeqCst) {
            return Err(ToolError::Cancelled {
                program: "media tool".to_string(),
            });
        }

        match tool.execute(request) {
            Ok(()) => return Ok(()),
            Err(e) if shutdown_signal.load(Ordering::SeqCst) && !e.is_cancelled() => {
                return Err(ToolError::Cancelled {
                    program: e.program().unwrap_or("media tool").to_string(),
                });
            }
            Err(e) if e.is_transient() && attempt < attempts => {
                warn!(
                    "媒體工具呼叫失敗，重試 {}/{}: {} ({e})",
                    attempt + 1,
                    attempts,
                    request.output().display()
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
