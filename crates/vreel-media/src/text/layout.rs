//! Measurement, line wrapping and adaptive sizing.
//!
//! All measurements count visible characters only, so diacritics never
//! skew sizing or wrapping.

use super::tables::is_combining;

/// Count of characters excluding combining marks.
pub fn visible_length(text: &str) -> usize {
    text.chars().filter(|c| !is_combining(*c)).count()
}

/// Greedy word wrap under a visible-character budget.
///
/// A word that alone exceeds the budget gets a line of its own and is
/// never split. A word made only of marks, such as a pause sign, stays on
/// the line of the word before it.
pub fn wrap(text: &str, max_visible_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = visible_length(word);
        if word_len == 0 && !current.is_empty() {
            current.push(' ');
            current.push_str(word);
            continue;
        }
        if !current.is_empty() && current_len + 1 + word_len > max_visible_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Visible characters per primary line for a frame width.
pub fn line_budget(frame_width: u32) -> usize {
    if frame_width >= 1280 {
        55
    } else if frame_width >= 720 {
        42
    } else {
        32
    }
}

/// Base font sizes for the three frame-width tiers (>=1280, >=720, narrower).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSizeTiers {
    pub wide: u32,
    pub medium: u32,
    pub narrow: u32,
}

impl FontSizeTiers {
    /// Sizes for discrete draw directives.
    pub const DRAW_DIRECTIVE: FontSizeTiers = FontSizeTiers {
        wide: 52,
        medium: 42,
        narrow: 34,
    };

    /// Sizes for the subtitle track, slightly larger.
    pub const SUBTITLE: FontSizeTiers = FontSizeTiers {
        wide: 54,
        medium: 44,
        narrow: 36,
    };

    pub fn base_for(&self, frame_width: u32) -> u32 {
        if frame_width >= 1280 {
            self.wide
        } else if frame_width >= 720 {
            self.medium
        } else {
            self.narrow
        }
    }

    /// Base size scaled down as the text grows.
    pub fn size_for(&self, text: &str, frame_width: u32) -> u32 {
        scale_for_length(self.base_for(frame_width), visible_length(text))
    }
}

/// Length buckets: <30, <60, <100, <150, and the rest.
fn length_multiplier(visible: usize) -> f64 {
    match visible {
        0..=29 => 1.0,
        30..=59 => 0.82,
        60..=99 => 0.68,
        100..=149 => 0.56,
        _ => 0.48,
    }
}

fn scale_for_length(base: u32, visible: usize) -> u32 {
    (base as f64 * length_multiplier(visible)).round() as u32
}

/// Adaptive primary font size for the draw-directive renderer.
pub fn adaptive_font_size(text: &str, frame_width: u32) -> u32 {
    FontSizeTiers::DRAW_DIRECTIVE.size_for(text, frame_width)
}

/// Scale a primary size by a ratio, rounding half up.
pub fn scaled_size(primary: u32, ratio: f64) -> u32 {
    (primary as f64 * ratio).round() as u32
}
