use crate::tools::ToolError;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub duration_seconds: f64,
    pub dimensions: Option<Dimensions>,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

/// 建立 ffprobe 指令（JSON 輸出 format 與 streams）
#[must_use]
pub fn build_probe_command(path: &Path) -> Command {
    let mut cmd = Command::new("ffprobe");
    cmd.args([
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
    ])
    .arg(path);
    cmd
}

/// 解析 ffprobe 的 JSON 輸出
///
/// 長度優先取 format，其次取視訊串流；尺寸為選填（純音訊片段沒有）。
pub fn parse_probe_output(stdout: &str) -> Result<VideoInfo, ToolError> {
    let probe: FfprobeOutput =
        serde_json::from_str(stdout).map_err(|e| ToolError::Parse(e.to_string()))?;

    let video_stream = probe.streams.as_ref().and_then(|streams| {
        streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
    });

    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or_else(|| video_stream.and_then(|s| s.duration.as_ref()))
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ToolError::Parse("無法取得影片長度".to_string()))?;

    let dimensions = video_stream.and_then(|s| match (s.width, s.height) {
        (Some(width), Some(height)) => Some(Dimensions { width, height }),
        _ => None,
    });

    Ok(VideoInfo {
        duration_seconds,
        dimensions,
    })
}
