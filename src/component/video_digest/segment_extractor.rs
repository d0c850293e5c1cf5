use super::sampling_planner::TimeWindow;
use crate::tools::{
    CutRequest, DeletePolicy, MediaRequest, MediaTool, ToolError, execute_with_retry,
    remove_file_with_retry, segment_path,
};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

/// 實際長度達到預期長度的此倍數時視為異常片段
pub const MAX_DURATION_RATIO: f64 = 2.0;

/// 已擷取的暫存片段
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFile {
    pub path: PathBuf,
    pub index: usize,
    pub window: TimeWindow,
    /// 驗證時量到的實際長度
    pub actual_duration: Option<f64>,
}

/// 片段長度是否合理：未達預期長度的兩倍
#[must_use]
pub fn is_duration_plausible(expected: f64, actual: f64) -> bool {
    actual < expected * MAX_DURATION_RATIO
}

pub struct SegmentExtractor<'a, T: MediaTool + ?Sized> {
    tool: &'a T,
    require_accurate_duration: bool,
    retry_attempts: u32,
    delete_policy: DeletePolicy,
    shutdown_signal: &'a AtomicBool,
}

impl<'a, T: MediaTool + ?Sized> SegmentExtractor<'a, T> {
    pub const fn new(
        tool: &'a T,
        require_accurate_duration: bool,
        retry_attempts: u32,
        delete_policy: DeletePolicy,
        shutdown_signal: &'a AtomicBool,
    ) -> Self {
        Self {
            tool,
            require_accurate_duration,
            retry_attempts,
            delete_policy,
            shutdown_signal,
        }
    }

    /// 擷取單一片段
    ///
    /// - `Ok(Some(_))`：片段可用
    /// - `Ok(None)`：驗證不通過，片段已刪除（不算錯誤）
    /// - `Err(_)`：工具呼叫失敗，殘留的輸出檔已清除
    pub fn extract(
        &self,
        source: &Path,
        window: &TimeWindow,
        index: usize,
    ) -> Result<Option<SegmentFile>, ToolError> {
        let output = segment_path(source, index);
        let request = MediaRequest::Cut(CutRequest {
            source: source.to_path_buf(),
            start_seconds: window.start,
            duration_seconds: window.duration(),
            output: output.clone(),
        });

        debug!(
            "擷取片段 {index}: {:.2}s - {:.2}s -> {}",
            window.start,
            window.end,
            output.display()
        );

        let result = execute_with_retry(
            self.tool,
            &request,
            self.retry_attempts,
            self.shutdown_signal,
        );
        if let Err(e) = result {
            self.discard(&output);
            return Err(e);
        }

        let mut segment = SegmentFile {
            path: output,
            index,
            window: *window,
            actual_duration: None,
        };

        if !self.require_accurate_duration {
            return Ok(Some(segment));
        }

        let expected = window.duration();
        match self.tool.probe(&segment.path) {
            Ok(info) if is_duration_plausible(expected, info.duration_seconds) => {
                segment.actual_duration = Some(info.duration_seconds);
                Ok(Some(segment))
            }
            Ok(info) => {
                warn!(
                    "片段 {index} 長度異常（預期 {expected:.2}s，實際 {:.2}s），捨棄",
                    info.duration_seconds
                );
                self.discard(&segment.path);
                Ok(None)
            }
            Err(e) if e.is_cancelled() => {
                self.discard(&segment.path);
                Err(e)
            }
            Err(e) => {
                warn!("片段 {index} 無法讀取長度，捨棄: {e}");
                self.discard(&segment.path);
                Ok(None)
            }
        }
    }

    fn discard(&self, path: &Path) {
        if let Err(e) = remove_file_with_retry(path, self.delete_policy) {
            warn!("無法刪除片段 {}: {e}", path.display());
        }
    }
}
