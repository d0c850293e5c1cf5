mod ffmpeg_tool;
mod ffprobe_info;
mod file_tools;
mod media_tool;
mod path_validator;
mod process_runner;
mod video_scanner;

pub use ffmpeg_tool::{FfmpegTool, verify_output};
pub use ffprobe_info::{Dimensions, VideoInfo, build_probe_command, parse_probe_output};
pub use file_tools::{
    DeletePolicy, manifest_path, partial_output_path, remove_file_with_retry,
    remove_files_best_effort, segment_path, suffixed_path,
};
pub use media_tool::{
    ConcatRequest, CutRequest, MediaRequest, MediaTool, ToolError, execute_with_retry,
};
pub use path_validator::validate_directory_exists;
pub use process_runner::{ensure_success, run_with_timeout};
pub use video_scanner::{DiscoveryFilter, VideoFileInfo, discover_videos, scan_video_files};
