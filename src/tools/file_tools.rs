use log::warn;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io, thread};

/// 刪除暫存檔的重試策略
#[derive(Debug, Clone, Copy)]
pub struct DeletePolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for DeletePolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(500),
        }
    }
}

fn split_name(source: &Path) -> (PathBuf, String, OsString) {
    let parent = source.parent().unwrap_or(Path::new(".")).to_path_buf();
    let stem = source
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().to_string());
    let extension = source
        .extension()
        .map(|ext| {
            let mut dotted = OsString::from(".");
            dotted.push(ext);
            dotted
        })
        .unwrap_or_default();
    (parent, stem, extension)
}

/// `<dir>/<base>_<suffix><ext>`
#[must_use]
pub fn suffixed_path(source: &Path, suffix: &str) -> PathBuf {
    let (parent, stem, extension) = split_name(source);
    let mut name = OsString::from(format!("{stem}_{suffix}"));
    name.push(extension);
    parent.join(name)
}

/// `<dir>/<base>_seg_<index><ext>`
#[must_use]
pub fn segment_path(source: &Path, index: usize) -> PathBuf {
    suffixed_path(source, &format!("seg_{index}"))
}

/// `<dir>/<base>_merge_list.txt`，每個來源檔使用各自的清單檔
#[must_use]
pub fn manifest_path(source: &Path) -> PathBuf {
    let (parent, stem, _) = split_name(source);
    parent.join(format!("{stem}_merge_list.txt"))
}

/// 合併中的暫存輸出 `<dir>/<base>_partial<ext>`，成功後才改名為正式輸出
#[must_use]
pub fn partial_output_path(output: &Path) -> PathBuf {
    suffixed_path(output, "partial")
}

/// 刪除檔案，失敗時依策略重試；檔案不存在視為成功
pub fn remove_file_with_retry(path: &Path, policy: DeletePolicy) -> io::Result<()> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match fs::remove_file(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) if attempt < attempts => {
                warn!(
                    "無法刪除 {}，{}ms 後重試 ({attempt}/{attempts}): {e}",
                    path.display(),
                    policy.delay.as_millis()
                );
                thread::sleep(policy.delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// 盡力刪除多個暫存檔，回傳刪除失敗的數量
pub fn remove_files_best_effort<'a, I>(paths: I, policy: DeletePolicy) -> usize
where
    I: IntoIterator<Item = &'a Path>,
{
    paths
        .into_iter()
        .filter(|path| {
            remove_file_with_retry(path, policy)
                .inspect_err(|e| warn!("暫存檔刪除失敗 {}: {e}", path.display()))
                .is_err()
        })
        .count()
}
