use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MAX_RECENT_PATHS: usize = 10;

/// 預設最小檔案大小：1.2 GB
pub const DEFAULT_MIN_SIZE_BYTES: u64 = 1_200_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// 精華影片的產生模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigestMode {
    /// 均勻取樣，依時間順序合併
    Digest,
    /// 大量固定長度短片段，交錯排序後合併
    Trailer,
}

impl fmt::Display for DigestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest => write!(f, "digest"),
            Self::Trailer => write!(f, "trailer"),
        }
    }
}

/// 使用者設定（settings.json）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    /// 非空時取代內嵌的預設根目錄清單
    pub roots: Vec<String>,
    pub min_size_bytes: u64,
    pub extension: String,
    pub digest_suffix: String,
    pub trailer_suffix: String,
    pub validate_segments: bool,
    pub shuffle_stride: usize,
    pub tool_timeout_secs: u64,
    pub tool_retry_attempts: u32,
    pub delete_retry_attempts: u32,
    pub delete_retry_delay_ms: u64,
    pub skip_existing_output: bool,
    pub recent_paths: Vec<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            roots: Vec::new(),
            min_size_bytes: DEFAULT_MIN_SIZE_BYTES,
            extension: ".mp4".to_string(),
            digest_suffix: "batch_merged".to_string(),
            trailer_suffix: "trailer".to_string(),
            validate_segments: true,
            shuffle_stride: 5,
            tool_timeout_secs: 900,
            tool_retry_attempts: 2,
            delete_retry_attempts: 5,
            delete_retry_delay_ms: 500,
            skip_existing_output: true,
            recent_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// 編譯時嵌入的預設根目錄
    pub default_roots: Vec<PathBuf>,
    pub settings: UserSettings,
}

impl Config {
    /// 實際要掃描的根目錄：設定檔優先，其次為內嵌清單，最後附加最近使用的路徑
    #[must_use]
    pub fn effective_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = if self.settings.roots.is_empty() {
            self.default_roots.clone()
        } else {
            self.settings.roots.iter().map(PathBuf::from).collect()
        };

        for recent in &self.settings.recent_paths {
            let path = PathBuf::from(recent);
            if !roots.contains(&path) {
                roots.push(path);
            }
        }
        roots
    }

    /// 產生單次批次執行所需的完整設定
    #[must_use]
    pub fn run_config(&self, mode: DigestMode) -> RunConfig {
        let settings = &self.settings;
        let output_suffix = match mode {
            DigestMode::Digest => settings.digest_suffix.clone(),
            DigestMode::Trailer => settings.trailer_suffix.clone(),
        };

        RunConfig {
            roots: self.effective_roots(),
            min_size_bytes: settings.min_size_bytes,
            extension: settings.extension.clone(),
            mode,
            output_suffix,
            exclusion_markers: vec![
                format!("_{}", settings.digest_suffix),
                format!("_{}", settings.trailer_suffix),
            ],
            validate_segments: settings.validate_segments,
            shuffle_stride: settings.shuffle_stride.max(1),
            tool_timeout: Duration::from_secs(settings.tool_timeout_secs.max(1)),
            tool_retry_attempts: settings.tool_retry_attempts.max(1),
            delete_retry_attempts: settings.delete_retry_attempts.max(1),
            delete_retry_delay: Duration::from_millis(settings.delete_retry_delay_ms),
            skip_existing_output: settings.skip_existing_output,
        }
    }
}

/// 一次批次執行的設定，明確傳入處理流程
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub roots: Vec<PathBuf>,
    pub min_size_bytes: u64,
    pub extension: String,
    pub mode: DigestMode,
    pub output_suffix: String,
    /// 檔名含有任一標記的檔案視為已轉換
    pub exclusion_markers: Vec<String>,
    pub validate_segments: bool,
    pub shuffle_stride: usize,
    pub tool_timeout: Duration,
    pub tool_retry_attempts: u32,
    pub delete_retry_attempts: u32,
    pub delete_retry_delay: Duration,
    pub skip_existing_output: bool,
}

impl RunConfig {
    /// 測試與程式化呼叫使用的預設值
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, mode: DigestMode) -> Self {
        let config = Config {
            default_roots: roots,
            settings: UserSettings::default(),
        };
        config.run_config(mode)
    }

    /// `<dir>/<base>_<suffix><ext>`
    #[must_use]
    pub fn output_path_for(&self, source: &Path) -> PathBuf {
        crate::tools::suffixed_path(source, &self.output_suffix)
    }
}
