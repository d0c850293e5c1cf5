use thiserror::Error;

/// 單一計畫允許的最大段數
pub const MAX_SECTIONS: usize = 100_000;

/// 取樣參數，完全決定一份取樣計畫
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// 採樣開始時刻（秒）
    pub start_time: f64,
    /// 採樣結束時刻（秒）
    pub end_time: f64,
    /// 每隔多少秒開始採樣一段
    pub sample_rate: f64,
    /// 剪輯覆蓋率，例如 0.2 代表總共擷取 20% 的長度
    pub coverage: f64,
    /// 每段固定長度（秒），0 代表依覆蓋率平均分配
    pub fixed_duration: f64,
    pub random_mode: bool,
}

impl SamplingConfig {
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// 取樣時間區間（秒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("結束時刻 {end_time:.2}s 必須大於開始時刻 {start_time:.2}s")]
    EmptyRange { start_time: f64, end_time: f64 },

    #[error("採樣間隔必須大於 0: {0}")]
    InvalidSampleRate(f64),

    #[error("覆蓋率必須介於 (0, 1]: {0}")]
    InvalidCoverage(f64),

    #[error("固定長度不可為負數: {0}")]
    InvalidFixedDuration(f64),

    #[error("段數過多（{sections:.0} 段，上限 {max}），請加大採樣間隔", max = MAX_SECTIONS)]
    TooManySections { sections: f64 },
}

/// 計算取樣時間區間
///
/// 段數為 `ceil(duration / sample_rate)`（至少 1 段）。各段起點在整個區間內均勻分布，
/// 每段長度則是固定長度，或 `duration * coverage / 段數`。
/// 最後一段的結尾可能超過 `end_time`，不做截斷。
pub fn plan(config: &SamplingConfig) -> Result<Vec<TimeWindow>, PlanError> {
    validate(config)?;

    let duration = config.duration();
    let sections = (duration / config.sample_rate).ceil();
    if !(sections <= MAX_SECTIONS as f64) {
        return Err(PlanError::TooManySections { sections });
    }
    let section_num = (sections as usize).max(1);

    let section_duration = if config.fixed_duration > 0.0 {
        config.fixed_duration
    } else {
        duration * config.coverage / section_num as f64
    };

    let spacing = duration / section_num as f64;

    Ok((0..section_num)
        .map(|i| {
            let start = config.start_time + spacing * i as f64;
            TimeWindow {
                start,
                end: start + section_duration,
            }
        })
        .collect())
}

fn validate(config: &SamplingConfig) -> Result<(), PlanError> {
    if !(config.end_time > config.start_time) {
        return Err(PlanError::EmptyRange {
            start_time: config.start_time,
            end_time: config.end_time,
        });
    }
    if !(config.sample_rate > 0.0) || !config.sample_rate.is_finite() {
        return Err(PlanError::InvalidSampleRate(config.sample_rate));
    }
    if config.fixed_duration < 0.0 || config.fixed_duration.is_nan() {
        return Err(PlanError::InvalidFixedDuration(config.fixed_duration));
    }
    if config.fixed_duration == 0.0 && !(config.coverage > 0.0 && config.coverage <= 1.0) {
        return Err(PlanError::InvalidCoverage(config.coverage));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage_config(start_time: f64, end_time: f64, sample_rate: f64, coverage: f64) -> SamplingConfig {
        SamplingConfig {
            start_time,
            end_time,
            sample_rate,
            coverage,
            fixed_duration: 0.0,
            random_mode: false,
        }
    }

    fn fixed_config(start_time: f64, end_time: f64, sample_rate: f64, fixed: f64) -> SamplingConfig {
        SamplingConfig {
            start_time,
            end_time,
            sample_rate,
            coverage: 0.0,
            fixed_duration: fixed,
            random_mode: true,
        }
    }

    #[test]
    fn test_window_count_is_ceil() {
        for (duration, rate) in [(100.0, 45.0), (90.0, 45.0), (3992.0, 45.0), (1.0, 45.0), (6000.0, 60.0)] {
            let windows = plan(&coverage_config(0.0, duration, rate, 0.16)).unwrap();
            let expected = (duration / rate).ceil() as usize;
            assert_eq!(windows.len(), expected.max(1), "duration={duration}, rate={rate}");
        }
    }

    #[test]
    fn test_sub_cadence_duration_yields_one_window() {
        let windows = plan(&coverage_config(8.0, 20.0, 45.0, 0.5)).unwrap();
        assert_eq!(windows.len(), 1);
        assert!((windows[0].start - 8.0).abs() < 1e-9);
        assert!((windows[0].duration() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_windows_strictly_increasing_and_positive() {
        let windows = plan(&coverage_config(20.0, 7200.0, 72.0, 0.2)).unwrap();
        for w in &windows {
            assert!(w.duration() > 0.0);
        }
        for pair in windows.windows(2) {
            assert!(pair[1].start > pair[0].start);
            assert!(pair[1].start >= pair[0].end, "區間不應重疊");
        }
    }

    #[test]
    fn test_coverage_mode_total_duration() {
        let config = coverage_config(8.0, 4000.0, 45.0, 0.16);
        let windows = plan(&config).unwrap();
        let total: f64 = windows.iter().map(TimeWindow::duration).sum();
        assert!((total - config.duration() * 0.16).abs() < 1e-6);
        assert!(windows.last().unwrap().end <= config.end_time + 1e-9);
    }

    #[test]
    fn test_fixed_mode_exact_span() {
        let windows = plan(&fixed_config(60.0, 5970.0, 75.0, 5.0)).unwrap();
        assert_eq!(windows.len(), 79);
        for w in &windows {
            assert!((w.duration() - 5.0).abs() < 1e-9);
        }
        assert!((windows[0].start - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_offsets_evenly_spaced() {
        let windows = plan(&coverage_config(10.0, 110.0, 25.0, 0.4)).unwrap();
        let starts: Vec<f64> = windows.iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![10.0, 35.0, 60.0, 85.0]);
        assert!((windows[0].duration() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_duration_overrun_is_not_clamped() {
        // 固定長度大於間隔時，最後一段會超過 end_time
        let config = fixed_config(0.0, 10.0, 5.0, 8.0);
        let windows = plan(&config).unwrap();
        assert_eq!(windows.len(), 2);
        let last = windows.last().unwrap();
        assert!((last.start - 5.0).abs() < 1e-9);
        assert!((last.end - 13.0).abs() < 1e-9);
        assert!(last.end > config.end_time);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            plan(&coverage_config(10.0, 10.0, 45.0, 0.2)),
            Err(PlanError::EmptyRange { .. })
        ));
        assert!(matches!(
            plan(&coverage_config(60.0, 30.0, 45.0, 0.2)),
            Err(PlanError::EmptyRange { .. })
        ));
        assert_eq!(
            plan(&coverage_config(0.0, 100.0, 0.0, 0.2)),
            Err(PlanError::InvalidSampleRate(0.0))
        );
        assert_eq!(
            plan(&coverage_config(0.0, 100.0, 45.0, 0.0)),
            Err(PlanError::InvalidCoverage(0.0))
        );
        assert_eq!(
            plan(&coverage_config(0.0, 100.0, 45.0, 1.5)),
            Err(PlanError::InvalidCoverage(1.5))
        );
        // 固定長度模式忽略覆蓋率
        assert!(plan(&fixed_config(0.0, 100.0, 45.0, 5.0)).is_ok());
    }

    #[test]
    fn test_tiny_sample_rate_is_rejected() {
        assert!(matches!(
            plan(&coverage_config(0.0, 3600.0, 1e-9, 0.2)),
            Err(PlanError::TooManySections { .. })
        ));
        assert!(matches!(
            plan(&fixed_config(0.0, f64::MAX, 1e-300, 5.0)),
            Err(PlanError::TooManySections { .. })
        ));

        let windows = plan(&coverage_config(0.0, MAX_SECTIONS as f64, 1.0, 0.5)).unwrap();
        assert_eq!(windows.len(), MAX_SECTIONS);
    }
}
