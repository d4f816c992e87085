//! Draw-text directives for engines without a shaping library.
//!
//! Every wrapped line becomes one `drawtext` filter with an absolute
//! vertical position, an enable window and a fade alpha expression.

use vreel_models::OverlaySegment;

use super::{
    annotation_excerpt, segment_label, OverlayContext, ANNOTATION_EXTRA_BUDGET, ANNOTATION_MAX_LINES,
    ANNOTATION_SIZE_RATIO, LABEL_SIZE_RATIO,
};
use crate::filters::escape_filter_path;
use crate::text::{adaptive_font_size, line_budget, normalize, scaled_size, shape_for_fallback, visual_lines};
use crate::timeline::{SegmentTiming, Timeline};

/// Line advance relative to font size.
const LINE_HEIGHT_RATIO: f64 = 1.4;
/// Gap between the primary block, the label and the annotation.
const BLOCK_GAP_RATIO: f64 = 0.3;

/// What a directive draws, which decides its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveRole {
    Primary,
    Label,
    Annotation,
}

impl DirectiveRole {
    fn font_color(&self) -> &'static str {
        match self {
            Self::Primary => "white",
            Self::Label => "0xD4AF37",
            Self::Annotation => "0xE8E8E8",
        }
    }
}

/// One `drawtext` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawDirective {
    pub role: DirectiveRole,
    /// Visual-order glyphs, unescaped
    pub text: String,
    pub font_size: u32,
    /// Top edge in pixels
    pub y: u32,
    pub timing: SegmentTiming,
}

impl DrawDirective {
    /// Start and end of the window in which the directive is drawn.
    pub fn enable_window(&self) -> (f64, f64) {
        (self.timing.start, self.timing.end)
    }

    /// Render as a `drawtext=...` filter using the given font file.
    pub fn to_filter(&self, font_file: &str) -> String {
        let (start, end) = self.enable_window();
        format!(
            "drawtext=fontfile='{}':text='{}':fontsize={}:fontcolor={}:x=(w-text_w)/2:y={}:\
             shadowcolor=black@0.6:shadowx=2:shadowy=2:enable='between(t\\,{}\\,{})':{}",
            escape_filter_path(font_file),
            escape_drawtext(&self.text),
            self.font_size,
            self.role.font_color(),
            self.y,
            fmt_secs(start),
            fmt_secs(end),
            fade_alpha(&self.timing)
        )
    }
}

/// Escape text for a quoted `drawtext` value.
///
/// Backslash goes first so later escapes are not doubled.
pub fn escape_drawtext(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            ':' => out.push_str("\\:"),
            '[' => out.push_str("\\["),
            ']' => out.push_str("\\]"),
            '%' => out.push_str("%%"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            _ => out.push(c),
        }
    }
    out
}

/// Alpha expression fading in from `start` and out towards `end`.
///
/// A zero-length fade window drops its branch instead of dividing by zero.
pub fn fade_alpha(timing: &SegmentTiming) -> String {
    let hold = if timing.fade_out_secs() > 0.0 {
        format!(
            "if(gt(t\\,{fo})\\,1-(t-{fo})/{len}\\,1)",
            fo = fmt_secs(timing.fade_out_start),
            len = fmt_secs(timing.fade_out_secs())
        )
    } else {
        "1".to_string()
    };

    let expr = if timing.fade_in_secs() > 0.0 {
        format!(
            "if(lt(t\\,{fi})\\,(t-{s})/{len}\\,{hold})",
            fi = fmt_secs(timing.fade_in_end),
            s = fmt_secs(timing.start),
            len = fmt_secs(timing.fade_in_secs())
        )
    } else {
        hold
    };

    format!("alpha='{expr}'")
}

/// Seconds with at most millisecond precision and no trailing zeros.
fn fmt_secs(value: f64) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn line_height(size: u32) -> u32 {
    (size as f64 * LINE_HEIGHT_RATIO).round() as u32
}

/// Lay out every segment as a vertically centered block.
pub fn build_directives(segments: &[OverlaySegment], timeline: &Timeline, ctx: &OverlayContext) -> Vec<DrawDirective> {
    let budget = line_budget(ctx.frame_width);
    let mut directives = Vec::new();

    for (segment, timing) in segments.iter().zip(timeline.segments()) {
        let measured = normalize(&segment.display_text);
        let primary_size = adaptive_font_size(&measured, ctx.frame_width);
        let label_size = scaled_size(primary_size, LABEL_SIZE_RATIO);
        let annotation_size = scaled_size(primary_size, ANNOTATION_SIZE_RATIO);
        let gap = (primary_size as f64 * BLOCK_GAP_RATIO).round() as u32;

        let mut rows: Vec<(DirectiveRole, String, u32)> = visual_lines(&shape_for_fallback(&segment.display_text), budget)
            .into_iter()
            .map(|line| (DirectiveRole::Primary, line, primary_size))
            .collect();

        // Digits and ornate brackets are drawn as-is.
        rows.push((DirectiveRole::Label, segment_label(segment), label_size));

        if let Some(annotation) = segment.annotation_text.as_deref() {
            let shaped = shape_for_fallback(&annotation_excerpt(annotation));
            rows.extend(
                visual_lines(&shaped, budget + ANNOTATION_EXTRA_BUDGET)
                    .into_iter()
                    .take(ANNOTATION_MAX_LINES)
                    .map(|line| (DirectiveRole::Annotation, line, annotation_size)),
            );
        }

        let gaps = rows.windows(2).filter(|w| w[0].0 != w[1].0).count() as u32;
        let block_height: u32 = rows.iter().map(|(_, _, size)| line_height(*size)).sum::<u32>() + gaps * gap;
        let mut y = ctx.frame_height.saturating_sub(block_height) / 2;

        let mut previous_role = None;
        for (role, text, size) in rows {
            if previous_role.is_some_and(|r| r != role) {
                y += gap;
            }
            directives.push(DrawDirective {
                role,
                text,
                font_size: size,
                y,
                timing: *timing,
            });
            y += line_height(size);
            previous_role = Some(role);
        }
    }

    directives
}

/// Comma-join directives into one filter chain segment.
pub fn render_chain(directives: &[DrawDirective], font_file: &str) -> String {
    directives
        .iter()
        .map(|d| d.to_filter(font_file))
        .collect::<Vec<_>>()
        .join(",")
}
