//! Text preparation for burned-in overlays.
//!
//! Two treatments exist, one per render backend:
//! - native shaping backends receive [`normalize`]d logical text;
//! - the fallback backend receives normalized, [`shape`]d text whose lines
//!   are then reversed cluster-wise with [`reverse_clusters`].

pub mod layout;
pub mod normalize;
pub mod reorder;
pub mod shaping;
pub mod tables;

pub use layout::{adaptive_font_size, line_budget, scaled_size, visible_length, wrap, FontSizeTiers};
pub use normalize::normalize;
pub use reorder::{clusters, reverse_clusters};
pub use shaping::shape;
pub use tables::is_combining;

/// Normalize then shape, for renderers without a shaping engine.
pub fn shape_for_fallback(text: &str) -> String {
    shape(&normalize(text))
}

/// Wrap fallback text and put every line in visual order.
///
/// Wrapping happens on logical order so line order stays top to bottom.
pub fn visual_lines(shaped: &str, max_visible_chars: usize) -> Vec<String> {
    wrap(shaped, max_visible_chars)
        .iter()
        .map(|line| reverse_clusters(line))
        .collect()
}
