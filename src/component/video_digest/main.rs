use super::pipeline::{DigestOutcome, DigestPipeline};
use crate::config::{Config, DigestMode, RunConfig};
use crate::tools::{DiscoveryFilter, FfmpegTool, MediaTool, VideoFileInfo, discover_videos};
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 單一檔案的處理紀錄
#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub outcome: DigestOutcome,
}

impl FileReport {
    /// 摘要中的單行說明：來源檔與結果原因
    #[must_use]
    pub fn detail(&self) -> String {
        let source = self.source.display();
        match &self.outcome {
            DigestOutcome::Converted {
                output,
                planned,
                merged,
            } => format!("{source}: 已建立 {}（{merged}/{planned} 段）", output.display()),
            DigestOutcome::Skipped(reason) => format!("{source}: 略過，{reason}"),
            DigestOutcome::Failed(e) => format!("{source}: 失敗，{e}"),
        }
    }
}

/// 批次處理結果
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<FileReport>,
    pub cancelled: bool,
}

impl BatchSummary {
    #[must_use]
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, DigestOutcome::Converted { .. }))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DigestOutcome::Skipped(_)))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DigestOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&DigestOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

/// 精華影片 / 預告片產生器
///
/// 掃描根目錄下的大型影片，逐一取樣片段並合併為精簡版本。
/// 一次只處理一個檔案，單一檔案失敗不影響其他檔案。
pub struct VideoDigest {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl VideoDigest {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&self, mode: DigestMode) -> Result<BatchSummary> {
        let title = match mode {
            DigestMode::Digest => "=== 影片精華合併 ===",
            DigestMode::Trailer => "=== 影片預告片產生 ===",
        };
        println!("{}", style(title).cyan().bold());

        let run_config = self.config.run_config(mode);

        println!("{}", style("掃描影片檔案中...").dim());
        let video_files = discover_videos(
            &run_config.roots,
            &DiscoveryFilter::from_run_config(&run_config),
        );

        if video_files.is_empty() {
            println!("{}", style("找不到任何符合條件的影片檔案").yellow());
            return Ok(BatchSummary::default());
        }

        println!(
            "{}",
            style(format!(
                "找到 {} 個影片檔案，依檔案大小排序（由小到大）：",
                video_files.len()
            ))
            .green()
        );

        for (index, file) in video_files.iter().enumerate() {
            let size_gb = file.size as f64 / 1024.0 / 1024.0 / 1024.0;
            println!(
                "  {}. {} ({:.2} GB)",
                index + 1,
                file.path.display(),
                size_gb
            );
        }

        println!();
        let tool = FfmpegTool::new(run_config.tool_timeout, Arc::clone(&self.shutdown_signal));
        let summary = Self::process_videos(&tool, &run_config, &video_files, &self.shutdown_signal);

        Self::print_summary(&summary);

        Ok(summary)
    }

    /// 依序處理所有影片，收到中斷訊號後停止
    pub fn process_videos<T: MediaTool + ?Sized>(
        tool: &T,
        run_config: &RunConfig,
        videos: &[VideoFileInfo],
        shutdown_signal: &AtomicBool,
    ) -> BatchSummary {
        let pipeline = DigestPipeline::new(tool, run_config, shutdown_signal);
        let mut summary = BatchSummary::default();

        for (index, video) in videos.iter().enumerate() {
            if shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，停止處理");
                summary.cancelled = true;
                break;
            }

            let video_name = video
                .path
                .file_name()
                .map_or_else(|| format!("video_{index}"), |s| s.to_string_lossy().to_string());

            println!(
                "\n{} [{}/{}] {}",
                style("處理中").cyan(),
                index + 1,
                videos.len(),
                style(&video_name).bold()
            );

            let progress_bar = Self::segment_progress_bar();
            let outcome = pipeline.process_with_progress(&video.path, &progress_bar);
            progress_bar.finish_and_clear();

            match &outcome {
                DigestOutcome::Converted {
                    output,
                    planned,
                    merged,
                } => {
                    println!(
                        "  {} 已建立 {}（{merged}/{planned} 段）",
                        style("✓").green(),
                        output.display()
                    );
                }
                DigestOutcome::Skipped(reason) => {
                    info!("略過 {video_name}: {reason}");
                    println!("  {} 略過: {reason}", style("⤳").dim());
                }
                DigestOutcome::Failed(e) => {
                    error!("處理影片失敗 {video_name}: {e}");
                    println!("  {} 處理失敗: {e}", style("✗").red());
                }
            }

            let cancelled = outcome.is_cancelled();
            summary.reports.push(FileReport {
                source: video.path.clone(),
                outcome,
            });

            if cancelled {
                summary.cancelled = true;
                break;
            }
        }

        summary
    }

    fn segment_progress_bar() -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        if let Ok(progress_style) = ProgressStyle::default_bar()
            .template("  {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress_bar.set_style(progress_style.progress_chars("#>-"));
        }
        progress_bar.set_message("擷取片段中...");
        progress_bar
    }

    fn print_summary(summary: &BatchSummary) {
        println!();
        println!("{}", style("=== 處理摘要 ===").cyan().bold());
        println!("  總計: {} 個影片", summary.reports.len());
        println!("  成功: {} 個", style(summary.converted()).green());

        if summary.skipped() > 0 {
            println!("  略過: {} 個", style(summary.skipped()).yellow());
        }
        if summary.failed() > 0 {
            println!("  失敗: {} 個", style(summary.failed()).red());
        }

        for report in &summary.reports {
            let marker = match report.outcome {
                DigestOutcome::Converted { .. } => style("✓").green(),
                DigestOutcome::Skipped(_) => style("⤳").yellow(),
                DigestOutcome::Failed(_) => style("✗").red(),
            };
            println!("    {marker} {}", report.detail());
        }

        if summary.cancelled {
            println!("{}", style("處理已中斷，尚未處理的檔案已略過").yellow());
        }

        info!(
            "批次處理完成 - 成功: {}, 略過: {}, 失敗: {}",
            summary.converted(),
            summary.skipped(),
            summary.failed()
        );
    }
}
