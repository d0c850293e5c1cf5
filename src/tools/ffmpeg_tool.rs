use crate::tools::{
    ConcatRequest, CutRequest, MediaRequest, MediaTool, ToolError, VideoInfo, build_probe_command,
    ensure_success, parse_probe_output, run_with_timeout,
};
use log::debug;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// 以 ffmpeg / ffprobe 子程序實作的媒體工具
pub struct FfmpegTool {
    timeout: Duration,
    shutdown_signal: Arc<AtomicBool>,
}

impl FfmpegTool {
    #[must_use]
    pub const fn new(timeout: Duration, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            timeout,
            shutdown_signal,
        }
    }

    #[must_use]
    pub fn build_command(request: &MediaRequest) -> Command {
        match request {
            MediaRequest::Cut(cut) => Self::build_cut_command(cut),
            MediaRequest::Concat(concat) => Self::build_concat_command(concat),
        }
    }

    /// 只保留第一條視訊與第一條音訊，保留 metadata，輸出 fast-start MP4
    fn build_cut_command(cut: &CutRequest) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error"])
            .args(["-ss", &format!("{:.3}", cut.start_seconds)])
            .arg("-i")
            .arg(&cut.source)
            .args(["-t", &format!("{:.3}", cut.duration_seconds)])
            .args([
                "-avoid_negative_ts", "make_zero",
                "-c", "copy",
                "-map", "0:v:0",
                "-map", "0:a:0?",
                "-map_metadata", "0",
                "-movflags", "+faststart",
                "-ignore_unknown",
                "-strict", "experimental",
                "-f", "mp4",
                "-y",
            ])
            .arg(&cut.output);
        cmd
    }

    fn build_concat_command(concat: &ConcatRequest) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error"])
            .args([
                "-f", "concat",
                "-safe", "0",
                "-protocol_whitelist", "file,http,https,tcp,tls",
            ])
            .arg("-i")
            .arg(&concat.manifest)
            .args([
                "-c", "copy",
                "-movflags", "+faststart",
                "-ignore_unknown",
                "-y",
            ])
            .arg(&concat.output);
        cmd
    }
}

impl MediaTool for FfmpegTool {
    fn probe(&self, path: &Path) -> Result<VideoInfo, ToolError> {
        let output = run_with_timeout(build_probe_command(path), self.timeout, &self.shutdown_signal)?;
        ensure_success("ffprobe", &output)?;
        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    fn execute(&self, request: &MediaRequest) -> Result<(), ToolError> {
        let command = Self::build_command(request);
        debug!("執行 {command:?}");

        let output = run_with_timeout(command, self.timeout, &self.shutdown_signal)?;
        ensure_success("ffmpeg", &output)?;
        verify_output(request)
    }
}

/// 結束碼為 0 但沒有輸出檔案同樣視為失敗
pub fn verify_output(request: &MediaRequest) -> Result<(), ToolError> {
    let destination = request.output();
    if destination.is_file() {
        Ok(())
    } else {
        Err(ToolError::MissingOutput(destination.to_path_buf()))
    }
}
