//! Advanced SubStation Alpha subtitle documents for the native-shaping backend.
//!
//! Text is normalized only. The engine (libass with HarfBuzz and FriBidi)
//! performs joining and bidi itself.

use std::fmt::Write as _;
use std::path::Path;

use vreel_models::OverlaySegment;

use super::{
    annotation_excerpt, segment_label, OverlayContext, ANNOTATION_EXTRA_BUDGET, ANNOTATION_MAX_LINES,
    ANNOTATION_SIZE_RATIO, LABEL_SIZE_RATIO,
};
use crate::error::MediaResult;
use crate::text::{line_budget, normalize, scaled_size, wrap, FontSizeTiers};
use crate::timeline::{Timeline, FADE_IN_SECS, FADE_OUT_SECS};

/// Named styles declared in the document header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStyle {
    Verse,
    VerseNum,
    Tafsir,
}

impl EventStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verse => "Verse",
            Self::VerseNum => "VerseNum",
            Self::Tafsir => "Tafsir",
        }
    }

    fn layer(&self) -> u8 {
        match self {
            Self::Verse => 0,
            Self::VerseNum => 1,
            Self::Tafsir => 2,
        }
    }
}

/// One `Dialogue:` line.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueEvent {
    pub style: EventStyle,
    pub start: f64,
    pub end: f64,
    pub font_size: u32,
    /// Display lines, joined with `\N` on render
    pub lines: Vec<String>,
}

impl DialogueEvent {
    pub fn layer(&self) -> u8 {
        self.style.layer()
    }

    fn render(&self) -> String {
        let text: Vec<String> = self.lines.iter().map(|l| escape_event_text(l)).collect();
        format!(
            "Dialogue: {},{},{},{},,0,0,0,,{}{{\\fs{}}}{}",
            self.layer(),
            format_ass_time(self.start),
            format_ass_time(self.end),
            self.style.as_str(),
            fade_tag(),
            self.font_size,
            text.join("\\N")
        )
    }
}

/// Complete subtitle track.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleDocument {
    pub play_res_x: u32,
    pub play_res_y: u32,
    pub font_family: String,
    pub events: Vec<DialogueEvent>,
}

impl SubtitleDocument {
    /// Build events for every segment: verse text, label and optional commentary.
    pub fn build(segments: &[OverlaySegment], timeline: &Timeline, ctx: &OverlayContext) -> Self {
        let budget = line_budget(ctx.frame_width);
        let mut events = Vec::with_capacity(segments.len() * 3);

        for (segment, timing) in segments.iter().zip(timeline.segments()) {
            let primary = normalize(&segment.display_text);
            let size = FontSizeTiers::SUBTITLE.size_for(&primary, ctx.frame_width);

            events.push(DialogueEvent {
                style: EventStyle::Verse,
                start: timing.start,
                end: timing.end,
                font_size: size,
                lines: wrap(&primary, budget),
            });

            events.push(DialogueEvent {
                style: EventStyle::VerseNum,
                start: timing.start,
                end: timing.end,
                font_size: scaled_size(size, LABEL_SIZE_RATIO),
                lines: vec![segment_label(segment)],
            });

            if let Some(annotation) = segment.annotation_text.as_deref() {
                let text = normalize(&annotation_excerpt(annotation));
                let mut lines = wrap(&text, budget + ANNOTATION_EXTRA_BUDGET);
                lines.truncate(ANNOTATION_MAX_LINES);
                if !lines.is_empty() {
                    events.push(DialogueEvent {
                        style: EventStyle::Tafsir,
                        start: timing.start,
                        end: timing.end,
                        font_size: scaled_size(size, ANNOTATION_SIZE_RATIO),
                        lines,
                    });
                }
            }
        }

        Self {
            play_res_x: ctx.frame_width,
            play_res_y: ctx.frame_height,
            font_family: ctx.font.family_name(),
            events,
        }
    }

    /// Serialize to `.ass` text.
    pub fn render(&self) -> String {
        let font = &self.font_family;
        let mut out = String::new();
        let _ = write!(
            out,
            "[Script Info]\n\
             Title: Quran Video\n\
             ScriptType: v4.00+\n\
             PlayResX: {}\n\
             PlayResY: {}\n\
             WrapStyle: 0\n\
             \n\
             [V4+ Styles]\n\
             Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
             Style: Verse,{font},48,&H00FFFFFF,&H000000FF,&H00000000,&H96000000,0,0,0,0,100,100,0,0,1,3,2,5,40,40,30,0\n\
             Style: VerseNum,{font},24,&H0037AFD4,&H000000FF,&H00000000,&H96000000,0,0,0,0,100,100,0,0,1,2,1,5,40,40,20,0\n\
             Style: Tafsir,{font},26,&H00E8E8E8,&H000000FF,&H00000000,&H96000000,0,0,0,0,100,100,0,0,1,2,1,5,50,50,20,0\n\
             \n\
             [Fonts]\n\
             \n\
             [Events]\n\
             Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
            self.play_res_x, self.play_res_y
        );

        for event in &self.events {
            out.push_str(&event.render());
            out.push('\n');
        }

        out
    }

    /// Write the rendered document as UTF-8.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> MediaResult<()> {
        tokio::fs::write(path, self.render()).await?;
        Ok(())
    }
}

/// `H:MM:SS.CC`, rounded to the nearest centisecond.
pub fn format_ass_time(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let hours = total_cs / 360_000;
    let minutes = (total_cs / 6_000) % 60;
    let secs = (total_cs / 100) % 60;
    let cs = total_cs % 100;
    format!("{hours}:{minutes:02}:{secs:02}.{cs:02}")
}

fn fade_tag() -> String {
    format!(
        "{{\\fad({},{})}}",
        (FADE_IN_SECS * 1000.0).round() as u32,
        (FADE_OUT_SECS * 1000.0).round() as u32
    )
}

/// Braces open override blocks and a backslash starts `\N`-style escapes.
/// A word joiner after each literal backslash keeps libass from reading one.
fn escape_event_text(text: &str) -> String {
    text.replace('\\', "\\\u{2060}")
        .replace('{', "\\{")
        .replace('}', "\\}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vreel_models::FontSelection;

    fn ctx() -> OverlayContext {
        OverlayContext::new(1280, 720, FontSelection::new("Noto-Naskh-Arabic.ttf"), "/fonts")
    }

    #[test]
    fn test_format_ass_time() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(7.5), "0:00:07.50");
        assert_eq!(format_ass_time(3725.25), "1:02:05.25");
        assert_eq!(format_ass_time(59.999), "0:01:00.00");
        assert_eq!(format_ass_time(-1.0), "0:00:00.00");
    }

    #[test]
    fn test_events_per_segment() {
        let segments = vec![
            OverlaySegment::new("\u{0628}\u{0650}\u{0633}\u{0652}\u{0645}\u{0650}", "1:1", "a"),
            OverlaySegment::new("\u{0627}\u{0644}\u{0652}\u{062D}\u{064E}\u{0645}\u{0652}\u{062F}\u{064F}", "1:2", "b")
                .with_annotation("commentary"),
        ];
        let timeline = Timeline::from_durations(&[2.0, 3.0], 5.0);
        let doc = SubtitleDocument::build(&segments, &timeline, &ctx());

        assert_eq!(doc.events.len(), 5);
        assert_eq!(doc.events[2].style, EventStyle::Verse);
        assert_eq!(doc.events[4].style, EventStyle::Tafsir);
        assert_eq!(doc.events[4].layer(), 2);
        assert_eq!(doc.events[0].font_size, 54);
        assert_eq!(doc.events[1].font_size, 24); // 54 * 0.45 = 24.3
        assert_eq!(doc.events[4].font_size, 26); // 54 * 0.48 = 25.92
    }

    #[test]
    fn test_text_is_not_shaped_or_reordered() {
        let verse = "\u{200F}\u{0628}\u{0633}\u{0645}";
        let segments = vec![OverlaySegment::new(verse, "1:1", "a")];
        let timeline = Timeline::from_durations(&[2.0], 5.0);
        let doc = SubtitleDocument::build(&segments, &timeline, &ctx());
        assert_eq!(doc.events[0].lines, vec!["\u{0628}\u{0633}\u{0645}".to_string()]);
    }

    #[test]
    fn test_render_document() {
        let segments = vec![OverlaySegment::new("one two", "2:7", "a").with_annotation("x".repeat(200))];
        let timeline = Timeline::from_durations(&[2.0], 5.0);
        let doc = SubtitleDocument::build(&segments, &timeline, &ctx());
        let text = doc.render();

        assert!(text.contains("PlayResX: 1280\nPlayResY: 720\n"));
        assert!(text.contains("Style: Verse,Noto Naskh Arabic,48,"));
        assert!(text.contains("Dialogue: 0,0:00:00.00,0:00:02.00,Verse,,0,0,0,,{\\fad(500,400)}{\\fs54}one two\n"));
        assert!(text.contains("Dialogue: 1,0:00:00.00,0:00:02.00,VerseNum,,0,0,0,,{\\fad(500,400)}{\\fs24}\u{FD3F}7\u{FD3E}\n"));
        assert!(text.contains("Dialogue: 2,"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_wrapped_lines_joined_with_hard_breaks() {
        let words = vec!["word"; 20].join(" ");
        let segments = vec![OverlaySegment::new(words, "1:1", "a")];
        let timeline = Timeline::from_durations(&[2.0], 5.0);
        let doc = SubtitleDocument::build(&segments, &timeline, &ctx());
        assert!(doc.events[0].lines.len() > 1);
        assert!(doc.render().contains("word\\Nword"));
    }

    #[test]
    fn test_override_characters_escaped() {
        assert_eq!(escape_event_text("{\\b1}"), "\\{\\\u{2060}b1\\}");
        assert_eq!(escape_event_text("a\\Nb\\h"), "a\\\u{2060}Nb\\\u{2060}h");
        assert_eq!(escape_event_text("plain"), "plain");
    }
}
