use super::sampling_planner::SamplingConfig;
use crate::config::DigestMode;

/// 超過此長度（1.4 小時）視為長片
pub const LONG_FORM_THRESHOLD_SECS: f64 = 5040.0;

const TRAILER_SECTIONS: f64 = 80.0;
const TRAILER_START_OFFSET: f64 = 60.0;
const TRAILER_END_MARGIN: f64 = 30.0;
const TRAILER_SEGMENT_SECS: f64 = 5.0;

const LONG_FORM_SECTIONS: f64 = 100.0;
const LONG_FORM_START_OFFSET: f64 = 20.0;
const LONG_FORM_COVERAGE: f64 = 0.2;

const SHORT_FORM_START_OFFSET: f64 = 8.0;
const SHORT_FORM_SAMPLE_RATE: f64 = 45.0;
const SHORT_FORM_COVERAGE: f64 = 0.16;

/// 依影片長度與模式選擇取樣參數
///
/// - 預告片模式：80 段、每段固定 5 秒，跳過開頭 60 秒與結尾 30 秒
/// - 長片（> 1.4 小時）：100 段，從 20 秒開始，覆蓋 20%
/// - 其他：從 8 秒開始，每 45 秒一段，覆蓋 16%
#[must_use]
pub fn select_strategy(duration: f64, mode: DigestMode) -> SamplingConfig {
    match mode {
        DigestMode::Trailer => SamplingConfig {
            start_time: TRAILER_START_OFFSET,
            end_time: duration - TRAILER_END_MARGIN,
            sample_rate: duration / TRAILER_SECTIONS,
            coverage: 0.0,
            fixed_duration: TRAILER_SEGMENT_SECS,
            random_mode: true,
        },
        DigestMode::Digest if duration > LONG_FORM_THRESHOLD_SECS => SamplingConfig {
            start_time: LONG_FORM_START_OFFSET,
            end_time: duration,
            sample_rate: duration / LONG_FORM_SECTIONS,
            coverage: LONG_FORM_COVERAGE,
            fixed_duration: 0.0,
            random_mode: false,
        },
        DigestMode::Digest => SamplingConfig {
            start_time: SHORT_FORM_START_OFFSET,
            end_time: duration,
            sample_rate: SHORT_FORM_SAMPLE_RATE,
            coverage: SHORT_FORM_COVERAGE,
            fixed_duration: 0.0,
            random_mode: false,
        },
    }
}
