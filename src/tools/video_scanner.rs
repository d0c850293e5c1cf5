use crate::config::RunConfig;
use crate::tools::validate_directory_exists;
use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct VideoFileInfo {
    pub path: PathBuf,
    pub size: u64,
}

/// 掃描條件
#[derive(Debug, Clone)]
pub struct DiscoveryFilter {
    /// 檔案必須大於此大小
    pub min_size_bytes: u64,
    /// 含點號的副檔名，例如 ".mp4"（不分大小寫）
    pub extension: String,
    /// 檔名含有任一標記即排除（已轉換的輸出）
    pub exclusion_markers: Vec<String>,
}

impl DiscoveryFilter {
    #[must_use]
    pub fn from_run_config(run_config: &RunConfig) -> Self {
        Self {
            min_size_bytes: run_config.min_size_bytes,
            extension: run_config.extension.clone(),
            exclusion_markers: run_config.exclusion_markers.clone(),
        }
    }

    #[must_use]
    pub fn matches_name(&self, path: &Path) -> bool {
        let wanted = self.extension.trim_start_matches('.').to_lowercase();
        let has_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.to_lowercase() == wanted);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let excluded = self
            .exclusion_markers
            .iter()
            .any(|marker| !marker.is_empty() && file_name.contains(marker.as_str()));

        has_extension && !excluded
    }
}

/// 遞迴掃描單一根目錄，按大小排序（由小到大）
///
/// 回傳的都是絕對路徑，相對的根目錄會先轉為絕對路徑。
/// 根目錄本身無法讀取時回傳錯誤；子項目讀取失敗只記錄警告。
pub fn scan_video_files(directory: &Path, filter: &DiscoveryFilter) -> Result<Vec<VideoFileInfo>> {
    validate_directory_exists(directory)?;
    let root = fs::canonicalize(directory)
        .with_context(|| format!("無法取得絕對路徑: {}", directory.display()))?;

    let mut video_files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => bail!("無法讀取資料夾 {}: {e}", root.display()),
            Err(e) => {
                warn!("略過無法讀取的項目: {e}");
                continue;
            }
        };

        if !entry.file_type().is_file() || !filter.matches_name(entry.path()) {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            warn!("無法取得檔案大小: {}", entry.path().display());
            continue;
        };

        if metadata.len() > filter.min_size_bytes {
            video_files.push(VideoFileInfo {
                path: entry.into_path(),
                size: metadata.len(),
            });
        }
    }

    video_files.sort_by_key(|file| file.size);
    Ok(video_files)
}

/// 掃描所有根目錄；無法讀取的根目錄會被略過
#[must_use]
pub fn discover_videos(roots: &[PathBuf], filter: &DiscoveryFilter) -> Vec<VideoFileInfo> {
    let mut all_files = Vec::new();

    for root in roots {
        match scan_video_files(root, filter) {
            Ok(files) => {
                info!("{} 找到 {} 個影片", root.display(), files.len());
                all_files.extend(files);
            }
            Err(e) => warn!("略過根目錄 {}: {e}", root.display()),
        }
    }

    all_files
}
