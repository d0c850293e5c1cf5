use crate::config::types::{Config, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 編譯時嵌入的預設根目錄清單（不需要外部檔案）
const DEFAULT_ROOTS_JSON: &str = include_str!("data/default_roots.json");

impl Config {
    pub fn new() -> Result<Self> {
        let default_roots = Self::load_embedded_roots()?;
        let settings = Self::load_settings().unwrap_or_default();

        Ok(Self {
            default_roots,
            settings,
        })
    }

    fn load_settings() -> Result<UserSettings> {
        let path = Path::new("settings.json");
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入預設根目錄
    fn load_embedded_roots() -> Result<Vec<PathBuf>> {
        serde_json::from_str(DEFAULT_ROOTS_JSON).context("無法解析嵌入的根目錄設定")
    }
}
