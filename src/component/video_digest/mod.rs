//! 影片精華 / 預告片產生元件
//!
//! 流程：
//! A. 取得影片長度（ffprobe）
//! B. 依長度與模式選擇取樣策略
//! C. 規劃取樣時間區間
//! D. 逐段擷取並驗證片段長度
//! E. （預告片）交錯排序
//! F. 以 concat demuxer 合併並清除暫存檔

mod error;
mod main;
mod merge_coordinator;
mod pipeline;
mod sampling_planner;
mod segment_extractor;
mod sequence_orderer;
mod strategy_selector;

pub use error::DigestError;
pub use main::{BatchSummary, FileReport, VideoDigest};
pub use merge_coordinator::{MergeCoordinator, format_manifest, format_manifest_line};
pub use pipeline::{DigestOutcome, DigestPipeline, SkipReason};
pub use sampling_planner::{MAX_SECTIONS, PlanError, SamplingConfig, TimeWindow, plan};
pub use segment_extractor::{
    MAX_DURATION_RATIO, SegmentExtractor, SegmentFile, is_duration_plausible,
};
pub use sequence_orderer::reorder;
pub use strategy_selector::{LONG_FORM_THRESHOLD_SECS, select_strategy};
