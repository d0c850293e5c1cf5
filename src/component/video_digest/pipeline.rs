use super::error::DigestError;
use super::merge_coordinator::MergeCoordinator;
use super::sampling_planner::{PlanError, TimeWindow, plan};
use super::segment_extractor::{SegmentExtractor, SegmentFile};
use super::sequence_orderer::reorder;
use super::strategy_selector::select_strategy;
use crate::config::RunConfig;
use crate::tools::{DeletePolicy, MediaTool, remove_files_best_effort};
use indicatif::ProgressBar;
use log::{info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// 略過原因
#[derive(Debug)]
pub enum SkipReason {
    /// 輸出檔已存在
    AlreadyConverted(PathBuf),
    /// 影片太短，無法套用取樣策略
    InvalidPlan { duration: f64, error: PlanError },
    /// 所有片段都未通過驗證
    NoSurvivingSegments { planned: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyConverted(path) => write!(f, "輸出已存在: {}", path.display()),
            Self::InvalidPlan { duration, error } => {
                write!(f, "無法規劃取樣（長度 {duration:.1}s）: {error}")
            }
            Self::NoSurvivingSegments { planned } => {
                write!(f, "{planned} 個片段全部未通過驗證")
            }
        }
    }
}

/// 單一來源檔的處理結果
#[derive(Debug)]
pub enum DigestOutcome {
    Converted {
        output: PathBuf,
        planned: usize,
        merged: usize,
    },
    Skipped(SkipReason),
    Failed(DigestError),
}

impl DigestOutcome {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Failed(DigestError::Cancelled))
    }
}

/// 單一來源檔的完整流程：
/// 取得長度 → 選擇策略 → 規劃區間 → 逐段擷取 → （預告片）交錯排序 → 合併
pub struct DigestPipeline<'a, T: MediaTool + ?Sized> {
    tool: &'a T,
    run_config: &'a RunConfig,
    shutdown_signal: &'a AtomicBool,
}

impl<'a, T: MediaTool + ?Sized> DigestPipeline<'a, T> {
    pub const fn new(tool: &'a T, run_config: &'a RunConfig, shutdown_signal: &'a AtomicBool) -> Self {
        Self {
            tool,
            run_config,
            shutdown_signal,
        }
    }

    fn delete_policy(&self) -> DeletePolicy {
        DeletePolicy {
            attempts: self.run_config.delete_retry_attempts,
            delay: self.run_config.delete_retry_delay,
        }
    }

    pub fn process(&self, source: &Path) -> DigestOutcome {
        self.process_with_progress(source, &ProgressBar::hidden())
    }

    pub fn process_with_progress(&self, source: &Path, progress: &ProgressBar) -> DigestOutcome {
        let output = self.run_config.output_path_for(source);
        if self.run_config.skip_existing_output && output.exists() {
            return DigestOutcome::Skipped(SkipReason::AlreadyConverted(output));
        }

        let info = match self.tool.probe(source) {
            Ok(info) => info,
            Err(e) if e.is_cancelled() => return DigestOutcome::Failed(DigestError::Cancelled),
            Err(source_err) => {
                return DigestOutcome::Failed(DigestError::Probe {
                    path: source.to_path_buf(),
                    source: source_err,
                });
            }
        };

        let sampling = select_strategy(info.duration_seconds, self.run_config.mode);
        let windows = match plan(&sampling) {
            Ok(windows) => windows,
            Err(error) => {
                return DigestOutcome::Skipped(SkipReason::InvalidPlan {
                    duration: info.duration_seconds,
                    error,
                });
            }
        };

        info!(
            "{}: 長度 {:.1}s，共 {} 段，每段 {:.2}s",
            source.display(),
            info.duration_seconds,
            windows.len(),
            windows[0].duration()
        );

        let segments = match self.extract_all(source, &windows, progress) {
            Ok(segments) => segments,
            Err(e) => return DigestOutcome::Failed(e),
        };

        if segments.is_empty() {
            warn!("{}: 沒有可用片段，略過合併", source.display());
            return DigestOutcome::Skipped(SkipReason::NoSurvivingSegments {
                planned: windows.len(),
            });
        }

        let ordered = if sampling.random_mode {
            reorder(segments, self.run_config.shuffle_stride)
        } else {
            segments
        };

        let merger = MergeCoordinator::new(
            self.tool,
            self.run_config.tool_retry_attempts,
            self.delete_policy(),
            self.shutdown_signal,
        );
        match merger.merge(source, &ordered, &output) {
            Ok(()) => DigestOutcome::Converted {
                output,
                planned: windows.len(),
                merged: ordered.len(),
            },
            Err(e) => DigestOutcome::Failed(e),
        }
    }

    /// 逐段擷取；任何工具失敗或中斷都會刪除已擷取的片段
    fn extract_all(
        &self,
        source: &Path,
        windows: &[TimeWindow],
        progress: &ProgressBar,
    ) -> Result<Vec<SegmentFile>, DigestError> {
        let extractor = SegmentExtractor::new(
            self.tool,
            self.run_config.validate_segments,
            self.run_config.tool_retry_attempts,
            self.delete_policy(),
            self.shutdown_signal,
        );

        progress.set_length(windows.len() as u64);
        progress.set_position(0);

        let mut segments = Vec::with_capacity(windows.len());
        for (i, window) in windows.iter().enumerate() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                self.discard_segments(&segments);
                return Err(DigestError::Cancelled);
            }

            match extractor.extract(source, window, i + 1) {
                Ok(Some(segment)) => segments.push(segment),
                Ok(None) => {}
                Err(e) => {
                    self.discard_segments(&segments);
                    return Err(if e.is_cancelled() {
                        DigestError::Cancelled
                    } else {
                        DigestError::Extraction {
                            index: i + 1,
                            source: e,
                        }
                    });
                }
            }
            progress.inc(1);
        }

        Ok(segments)
    }

    fn discard_segments(&self, segments: &[SegmentFile]) {
        let failed = remove_files_best_effort(
            segments.iter().map(|segment| segment.path.as_path()),
            self.delete_policy(),
        );
        if failed > 0 {
            warn!("{failed} 個片段暫存檔未能刪除");
        }
    }
}
