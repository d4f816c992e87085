//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Calculate progress percentage given total duration in milliseconds.
    pub fn percentage(&self, total_duration_ms: i64) -> f64 {
        if total_duration_ms <= 0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / total_duration_ms as f64) * 100.0).clamp(0.0, 100.0)
    }

    /// Whole percent of a program of `total_secs`, 100 once FFmpeg reports the end.
    pub fn percent_of(&self, total_secs: f64) -> u8 {
        if self.is_complete {
            return 100;
        }
        self.percentage((total_secs * 1000.0) as i64).floor() as u8
    }

    /// Estimate time remaining in seconds.
    pub fn eta_seconds(&self, total_duration_ms: i64) -> Option<f64> {
        if self.speed <= 0.0 || self.out_time_ms <= 0 {
            return None;
        }

        let remaining_ms = total_duration_ms - self.out_time_ms;
        if remaining_ms <= 0 {
            return Some(0.0);
        }

        Some((remaining_ms as f64 / 1000.0) / self.speed)
    }
}

/// Receives encode progress as a whole percentage in 0..=100.
pub type ProgressSink = Arc<dyn Fn(u8) + Send + Sync + 'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };

        assert!((progress.percentage(10000) - 50.0).abs() < 0.01);
        assert!((progress.percentage(5000) - 100.0).abs() < 0.01);
        assert!((progress.percentage(2500) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0), 0.0);
    }

    #[test]
    fn test_percent_of_program() {
        let mut progress = FfmpegProgress {
            out_time_ms: 4750,
            ..Default::default()
        };
        assert_eq!(progress.percent_of(9.5), 50);

        progress.out_time_ms = -20;
        assert_eq!(progress.percent_of(9.5), 0);

        progress.is_complete = true;
        assert_eq!(progress.percent_of(9.5), 100);
    }

    #[test]
    fn test_eta_calculation() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            speed: 2.0,
            ..Default::default()
        };

        // 5 seconds remaining at 2x speed
        let eta = progress.eta_seconds(10000).unwrap();
        assert!((eta - 2.5).abs() < 0.01);
    }

    #[test]
    fn test_eta_unknown_before_speed_reported() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };
        assert!(progress.eta_seconds(10000).is_none());
    }
}
