//! 測試用的假媒體工具
//!
//! Cut 請求會在磁碟上建立片段檔案並記錄請求長度，Concat 請求會讀取清單檔內容並建立輸出檔。

#![allow(dead_code)]

use auto_video_digest::config::{DigestMode, RunConfig};
use auto_video_digest::tools::{MediaRequest, MediaTool, ToolError, VideoInfo};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct FakeMediaTool {
    /// 來源檔長度；未登記的來源 probe 失敗
    pub source_durations: HashMap<PathBuf, f64>,
    /// 片段實際長度 = 請求長度 × 倍率
    pub segment_factor: f64,
    /// 這些片段序號的實際長度改為請求長度的 3 倍
    pub oversized_indexes: Vec<usize>,
    /// 第 n 次 cut（從 1 起算）失敗
    pub fail_cut_at: Option<usize>,
    pub fail_concat: bool,
    /// 第 n 次 cut 時設定中斷旗標
    pub cancel_at_cut: Option<(usize, Arc<AtomicBool>)>,

    pub requests: RefCell<Vec<MediaRequest>>,
    pub manifests: RefCell<Vec<String>>,
    segment_durations: RefCell<HashMap<PathBuf, f64>>,
    cut_count: RefCell<usize>,
}

impl FakeMediaTool {
    pub fn with_source(path: &Path, duration: f64) -> Self {
        let mut tool = Self {
            segment_factor: 1.0,
            ..Self::default()
        };
        tool.source_durations.insert(path.to_path_buf(), duration);
        tool
    }

    pub fn cut_count(&self) -> usize {
        *self.cut_count.borrow()
    }

    pub fn concat_count(&self) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| matches!(r, MediaRequest::Concat(_)))
            .count()
    }

    fn segment_index(path: &Path) -> Option<usize> {
        let stem = path.file_stem()?.to_string_lossy().to_string();
        stem.rsplit_once("_seg_")?.1.parse().ok()
    }
}

impl MediaTool for FakeMediaTool {
    fn probe(&self, path: &Path) -> Result<VideoInfo, ToolError> {
        if let Some(&duration_seconds) = self.source_durations.get(path) {
            return Ok(VideoInfo {
                duration_seconds,
                dimensions: None,
            });
        }

        self.segment_durations
            .borrow()
            .get(path)
            .map(|&duration_seconds| VideoInfo {
                duration_seconds,
                dimensions: None,
            })
            .ok_or_else(|| ToolError::Failed {
                program: "ffprobe".to_string(),
                code: Some(1),
                stderr: format!("{}: No such file", path.display()),
            })
    }

    fn execute(&self, request: &MediaRequest) -> Result<(), ToolError> {
        self.requests.borrow_mut().push(request.clone());

        match request {
            MediaRequest::Cut(cut) => {
                let count = {
                    let mut count = self.cut_count.borrow_mut();
                    *count += 1;
                    *count
                };

                if let Some((at, signal)) = &self.cancel_at_cut {
                    if *at == count {
                        signal.store(true, Ordering::SeqCst);
                    }
                }

                if self.fail_cut_at == Some(count) {
                    return Err(ToolError::Failed {
                        program: "ffmpeg".to_string(),
                        code: Some(1),
                        stderr: "Invalid data found when processing input".to_string(),
                    });
                }

                let factor = if Self::segment_index(&cut.output)
                    .is_some_and(|i| self.oversized_indexes.contains(&i))
                {
                    3.0
                } else {
                    self.segment_factor
                };

                fs::write(&cut.output, b"segment")?;
                self.segment_durations
                    .borrow_mut()
                    .insert(cut.output.clone(), cut.duration_seconds * factor);
                Ok(())
            }
            MediaRequest::Concat(concat) => {
                self.manifests
                    .borrow_mut()
                    .push(fs::read_to_string(&concat.manifest)?);

                if self.fail_concat {
                    fs::write(&concat.output, b"")?;
                    return Err(ToolError::Failed {
                        program: "ffmpeg".to_string(),
                        code: Some(1),
                        stderr: "concat failed".to_string(),
                    });
                }

                fs::write(&concat.output, b"digest")?;
                Ok(())
            }
        }
    }
}

/// 不重試、不等待的執行設定
pub fn run_config(root: &Path, mode: DigestMode) -> RunConfig {
    let mut run_config = RunConfig::new(vec![root.to_path_buf()], mode);
    run_config.tool_retry_attempts = 1;
    run_config.delete_retry_attempts = 1;
    run_config.delete_retry_delay = Duration::ZERO;
    run_config
}

/// 目錄中剩餘的片段暫存檔、清單檔與未完成的合併輸出
pub fn leftover_temp_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            name.contains("_seg_")
                || name.ends_with("_merge_list.txt")
                || name.contains("_partial")
        })
        .collect()
}
