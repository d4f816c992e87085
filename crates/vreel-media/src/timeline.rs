//! Segment timing from narration durations.

use serde::{Deserialize, Serialize};

/// Fade-in length in seconds.
pub const FADE_IN_SECS: f64 = 0.5;
/// Fade-out length in seconds.
pub const FADE_OUT_SECS: f64 = 0.4;

/// Absolute timing of one overlay segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentTiming {
    pub start: f64,
    pub end: f64,
    /// End of the fade-in window, `min(start + 0.5, end)`
    pub fade_in_end: f64,
    /// Start of the fade-out window, `max(start, end - 0.4)`
    pub fade_out_start: f64,
}

impl SegmentTiming {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn fade_in_secs(&self) -> f64 {
        self.fade_in_end - self.start
    }

    pub fn fade_out_secs(&self) -> f64 {
        self.end - self.fade_out_start
    }
}

/// Contiguous timeline of all segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    segments: Vec<SegmentTiming>,
    total: f64,
}

impl Timeline {
    /// Lay durations end to end. Non-positive or non-finite durations
    /// are replaced by `fallback_secs`.
    pub fn from_durations(durations: &[f64], fallback_secs: f64) -> Self {
        let mut segments = Vec::with_capacity(durations.len());
        let mut cursor = 0.0;

        for &raw in durations {
            let duration = if raw.is_finite() && raw > 0.0 { raw } else { fallback_secs };
            let start = cursor;
            let end = start + duration;
            segments.push(SegmentTiming {
                start,
                end,
                fade_in_end: (start + FADE_IN_SECS).min(end),
                fade_out_start: (end - FADE_OUT_SECS).max(start),
            });
            cursor = end;
        }

        Self {
            segments,
            total: cursor,
        }
    }

    pub fn segments(&self) -> &[SegmentTiming] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&SegmentTiming> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all durations.
    pub fn total_duration(&self) -> f64 {
        self.total
    }

    /// Program length for the final encode trim.
    pub fn capped_duration(&self, max_secs: f64) -> f64 {
        self.total.min(max_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_contiguous_segments() {
        let timeline = Timeline::from_durations(&[3.0, 4.5, 2.0], 5.0);
        let spans: Vec<(f64, f64)> = timeline.segments().iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(spans, vec![(0.0, 3.0), (3.0, 7.5), (7.5, 9.5)]);
        assert!(approx(timeline.total_duration(), 9.5));

        for pair in timeline.segments().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_fade_windows() {
        let timeline = Timeline::from_durations(&[3.0], 5.0);
        let seg = timeline.get(0).unwrap();
        assert!(approx(seg.fade_in_end, 0.5));
        assert!(approx(seg.fade_out_start, 2.6));
    }

    #[test]
    fn test_fade_windows_clamped_for_short_segment() {
        let timeline = Timeline::from_durations(&[0.3], 5.0);
        let seg = timeline.get(0).unwrap();
        assert!(approx(seg.fade_in_end, 0.3));
        assert!(approx(seg.fade_out_start, 0.0));
    }

    #[test]
    fn test_invalid_duration_uses_fallback() {
        let timeline = Timeline::from_durations(&[0.0, f64::NAN, 2.0], 5.0);
        assert!(approx(timeline.total_duration(), 12.0));
    }

    #[test]
    fn test_capped_duration() {
        let timeline = Timeline::from_durations(&[400.0, 300.0], 5.0);
        assert!(approx(timeline.capped_duration(600.0), 600.0));
        assert!(Timeline::from_durations(&[], 5.0).is_empty());
    }
}
