//! FFmpeg filter-graph construction.
//!
//! The graph is written to a file and passed with `-filter_complex_script`,
//! so its length is not bounded by the command line.

use std::path::{Path, PathBuf};

use crate::overlay::{drawtext, DrawDirective};

/// Output pad of the composed video stream.
pub const VIDEO_OUT_LABEL: &str = "vout";

/// Escape a path used as a filter option value inside single quotes.
pub fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "\\\\").replace('\'', "\\'").replace(':', "\\:")
}

/// Escape a path for the `subtitles` filter, which re-parses its argument.
///
/// Backslashes become forward slashes so Windows paths survive.
pub fn escape_subtitles_path(path: &str) -> String {
    path.replace('\\', "/").replace(':', "\\:").replace('\'', "'\\''")
}

/// Text layer at the end of the chain.
#[derive(Debug, Clone)]
pub enum OverlayFilter {
    /// Burn in an `.ass` track with the given fonts directory.
    Subtitles { script: PathBuf, fonts_dir: PathBuf },
    /// Chain of `drawtext` filters using one font file.
    DrawText {
        directives: Vec<DrawDirective>,
        font_file: PathBuf,
    },
}

/// Background treatment and text overlay for one job.
#[derive(Debug, Clone)]
pub struct CompositeGraph {
    pub duration_secs: f64,
    pub frame_rate: u32,
    pub width: u32,
    pub height: u32,
    pub dim_opacity: f64,
    pub overlay: OverlayFilter,
}

impl CompositeGraph {
    /// Trim, normalize frame rate, aspect-fill, dim, then draw text.
    pub fn build(&self) -> String {
        let mut chain = vec![
            format!("trim=duration={:.3}", self.duration_secs),
            "setpts=PTS-STARTPTS".to_string(),
            format!("fps={}", self.frame_rate),
            format!(
                "scale={}:{}:force_original_aspect_ratio=increase",
                self.width, self.height
            ),
            format!("crop={}:{}", self.width, self.height),
            "setsar=1".to_string(),
            format!("drawbox=c=black@{:.2}:t=fill", self.dim_opacity.clamp(0.0, 1.0)),
        ];

        match &self.overlay {
            OverlayFilter::Subtitles { script, fonts_dir } => {
                chain.push(format!(
                    "subtitles='{}':fontsdir='{}'",
                    escape_subtitles_path(&path_str(script)),
                    escape_subtitles_path(&path_str(fonts_dir))
                ));
            }
            OverlayFilter::DrawText {
                directives,
                font_file,
            } => {
                if !directives.is_empty() {
                    chain.push(drawtext::render_chain(directives, &path_str(font_file)));
                }
            }
        }

        format!("[0:v]{}[{}]", chain.join(","), VIDEO_OUT_LABEL)
    }

    /// Write the graph next to the other job files.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        tokio::fs::write(path, self.build()).await
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
