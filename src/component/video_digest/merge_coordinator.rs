use super::error::DigestError;
use super::segment_extractor::SegmentFile;
use crate::tools::{
    ConcatRequest, DeletePolicy, MediaRequest, MediaTool, ToolError, execute_with_retry,
    manifest_path, partial_output_path, remove_file_with_retry, remove_files_best_effort,
};
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// 清單檔中的一行：`file '<path>'`
///
/// 相對路徑會以清單檔所在目錄為基準解析，因此一律寫入絕對路徑。
/// concat demuxer 的單引號內不能直接出現單引號，需寫成 `'\''`。
#[must_use]
pub fn format_manifest_line(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
    format!("file '{escaped}'")
}

#[must_use]
pub fn format_manifest(segments: &[SegmentFile]) -> String {
    segments
        .iter()
        .map(|segment| format_manifest_line(&segment.path) + "\n")
        .collect()
}

pub struct MergeCoordinator<'a, T: MediaTool + ?Sized> {
    tool: &'a T,
    retry_attempts: u32,
    delete_policy: DeletePolicy,
    shutdown_signal: &'a AtomicBool,
}

impl<'a, T: MediaTool + ?Sized> MergeCoordinator<'a, T> {
    pub const fn new(
        tool: &'a T,
        retry_attempts: u32,
        delete_policy: DeletePolicy,
        shutdown_signal: &'a AtomicBool,
    ) -> Self {
        Self {
            tool,
            retry_attempts,
            delete_policy,
            shutdown_signal,
        }
    }

    /// 寫入清單檔、串接片段，最後無條件刪除清單檔與所有片段
    ///
    /// 串接先寫到暫存輸出，成功後才改名為 `output_path`；
    /// 失敗時只刪除暫存輸出，已存在的正式輸出不受影響。
    pub fn merge(
        &self,
        source: &Path,
        segments: &[SegmentFile],
        output_path: &Path,
    ) -> Result<(), DigestError> {
        let manifest = manifest_path(source);
        let partial = partial_output_path(output_path);

        let result = self
            .write_and_concat(&manifest, segments, &partial)
            .and_then(|()| {
                fs::rename(&partial, output_path).map_err(|e| DigestError::Merge {
                    source: ToolError::Io(e),
                })
            });

        if let Err(e) = remove_file_with_retry(&manifest, self.delete_policy) {
            warn!("無法刪除合併清單 {}: {e}", manifest.display());
        }
        let leftover = remove_files_best_effort(
            segments.iter().map(|segment| segment.path.as_path()),
            self.delete_policy,
        );
        if leftover > 0 {
            warn!("{leftover} 個片段暫存檔未能刪除");
        }

        match result {
            Ok(()) => {
                info!(
                    "已合併 {} 個片段: {}",
                    segments.len(),
                    output_path.display()
                );
                Ok(())
            }
            Err(e) => {
                if let Err(remove_err) = remove_file_with_retry(&partial, self.delete_policy) {
                    warn!(
                        "無法刪除未完成的輸出檔案 {}: {remove_err}",
                        partial.display()
                    );
                }
                Err(e)
            }
        }
    }

    fn write_and_concat(
        &self,
        manifest: &Path,
        segments: &[SegmentFile],
        output_path: &Path,
    ) -> Result<(), DigestError> {
        fs::write(manifest, format_manifest(segments)).map_err(|source| {
            DigestError::Manifest {
                path: manifest.to_path_buf(),
                source,
            }
        })?;

        let request = MediaRequest::Concat(ConcatRequest {
            manifest: manifest.to_path_buf(),
            output: output_path.to_path_buf(),
        });

        execute_with_retry(
            self.tool,
            &request,
            self.retry_attempts,
            self.shutdown_signal,
        )
        .map_err(|source| {
            if source.is_cancelled() {
                DigestError::Cancelled
            } else {
                DigestError::Merge { source }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::video_digest::sampling_planner::TimeWindow;
    use crate::tools::VideoInfo;
    use std::cell::RefCell;
    use tempfile::TempDir;

    static NOT_CANCELLED: AtomicBool = AtomicBool::new(false);

    struct RecordingTool {
        manifests: RefCell<Vec<String>>,
        outputs: RefCell<Vec<std::path::PathBuf>>,
        fail: bool,
    }

    impl RecordingTool {
        fn new(fail: bool) -> Self {
            Self {
                manifests: RefCell::new(Vec::new()),
                outputs: RefCell::new(Vec::new()),
                fail,
            }
        }
    }

    impl MediaTool for RecordingTool {
        fn probe(&self, _path: &Path) -> Result<VideoInfo, ToolError> {
            Err(ToolError::Parse("unused".to_string()))
        }

        fn execute(&self, request: &MediaRequest) -> Result<(), ToolError> {
            let MediaRequest::Concat(concat) = request else {
                panic!("只應收到 concat 請求");
            };
            self.manifests
                .borrow_mut()
                .push(fs::read_to_string(&concat.manifest)?);
            self.outputs.borrow_mut().push(concat.output.clone());
            fs::write(&concat.output, b"partial")?;
            if self.fail {
                return Err(ToolError::Failed {
                    program: "ffmpeg".to_string(),
                    code: Some(1),
                    stderr: "concat failed".to_string(),
                });
            }
            Ok(())
        }
    }

    fn make_segments(dir: &Path, indexes: &[usize]) -> Vec<SegmentFile> {
        indexes
            .iter()
            .map(|&index| {
                let path = dir.join(format!("movie_seg_{index}.mp4"));
                fs::write(&path, b"seg").unwrap();
                SegmentFile {
                    path,
                    index,
                    window: TimeWindow {
                        start: index as f64,
                        end: index as f64 + 1.0,
                    },
                    actual_duration: None,
                }
            })
            .collect()
    }

    fn policy() -> DeletePolicy {
        DeletePolicy {
            attempts: 1,
            delay: std::time::Duration::ZERO,
        }
    }

    #[test]
    fn test_manifest_line_escaping() {
        assert_eq!(
            format_manifest_line(Path::new("/v/a_seg_1.mp4")),
            "file '/v/a_seg_1.mp4'"
        );
        assert_eq!(
            format_manifest_line(Path::new("/v/it's_seg_1.mp4")),
            r"file '/v/it'\''s_seg_1.mp4'"
        );
    }

    #[test]
    fn test_manifest_line_relative_path_is_made_absolute() {
        let expected = std::env::current_dir()
            .unwrap()
            .join("videos")
            .join("movie_seg_1.mp4");

        assert_eq!(
            format_manifest_line(Path::new("videos/movie_seg_1.mp4")),
            format!("file '{}'", expected.display())
        );
    }

    #[test]
    fn test_merge_writes_manifest_in_order_and_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("movie.mp4");
        let output = temp_dir.path().join("movie_trailer.mp4");
        let segments = make_segments(temp_dir.path(), &[1, 4, 2]);

        let tool = RecordingTool::new(false);
        MergeCoordinator::new(&tool, 1, policy(), &NOT_CANCELLED)
            .merge(&source, &segments, &output)
            .unwrap();

        let manifests = tool.manifests.borrow();
        let lines: Vec<&str> = manifests[0].lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("movie_seg_1.mp4'"));
        assert!(lines[1].ends_with("movie_seg_4.mp4'"));
        assert!(lines[2].ends_with("movie_seg_2.mp4'"));

        // 先寫入暫存輸出再改名
        assert_eq!(
            tool.outputs.borrow()[0],
            temp_dir.path().join("movie_trailer_partial.mp4")
        );
        assert!(output.exists());
        assert!(!temp_dir.path().join("movie_trailer_partial.mp4").exists());
        assert!(!temp_dir.path().join("movie_merge_list.txt").exists());
        assert!(segments.iter().all(|s| !s.path.exists()));
    }

    #[test]
    fn test_merge_failure_still_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("movie.mp4");
        let output = temp_dir.path().join("movie_batch_merged.mp4");
        let segments = make_segments(temp_dir.path(), &[1, 2]);

        let tool = RecordingTool::new(true);
        let err = MergeCoordinator::new(&tool, 1, policy(), &NOT_CANCELLED)
            .merge(&source, &segments, &output)
            .unwrap_err();

        assert!(matches!(err, DigestError::Merge { .. }));
        assert!(!output.exists());
        assert!(
            !temp_dir.path().join("movie_batch_merged_partial.mp4").exists(),
            "不完整的輸出應被刪除"
        );
        assert!(!temp_dir.path().join("movie_merge_list.txt").exists());
        assert!(segments.iter().all(|s| !s.path.exists()));
    }

    #[test]
    fn test_merge_failure_keeps_previous_output() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("movie.mp4");
        let output = temp_dir.path().join("movie_batch_merged.mp4");
        fs::write(&output, b"previous digest").unwrap();
        let segments = make_segments(temp_dir.path(), &[1, 2]);

        let tool = RecordingTool::new(true);
        let result = MergeCoordinator::new(&tool, 1, policy(), &NOT_CANCELLED)
            .merge(&source, &segments, &output);

        assert!(result.is_err());
        assert_eq!(fs::read(&output).unwrap(), b"previous digest");
    }

    #[test]
    fn test_merge_replaces_previous_output_on_success() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("movie.mp4");
        let output = temp_dir.path().join("movie_batch_merged.mp4");
        fs::write(&output, b"previous digest").unwrap();
        let segments = make_segments(temp_dir.path(), &[1]);

        let tool = RecordingTool::new(false);
        MergeCoordinator::new(&tool, 1, policy(), &NOT_CANCELLED)
            .merge(&source, &segments, &output)
            .unwrap();

        assert_eq!(fs::read(&output).unwrap(), b"partial");
    }
}
