//! Visual reordering for strictly left-to-right renderers.

use super::tables::is_combining;

/// Split text into clusters of one base character plus its trailing marks.
///
/// Leading marks with no base form a cluster of their own.
pub fn clusters(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        if idx > start && !is_combining(c) {
            out.push(&text[start..idx]);
            start = idx;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }

    out
}

/// Reverse cluster order so a left-to-right engine draws right-to-left text
/// in reading order. Marks stay after their base glyph.
///
/// A leading run of marks has no base to travel with and stays in front, so
/// applying the reversal twice restores the input.
pub fn reverse_clusters(text: &str) -> String {
    let split = text
        .char_indices()
        .find(|(_, c)| !is_combining(*c))
        .map_or(text.len(), |(idx, _)| idx);
    let (prefix, body) = text.split_at(split);

    let mut out = String::with_capacity(text.len());
    out.push_str(prefix);
    for cluster in clusters(body).into_iter().rev() {
        out.push_str(cluster);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_stay_attached() {
        let text = "\u{FE91}\u{0650}\u{FEB4}\u{0652}\u{FEE2}";
        assert_eq!(
            reverse_clusters(text),
            "\u{FEE2}\u{FEB4}\u{0652}\u{FE91}\u{0650}"
        );
    }

    #[test]
    fn test_reversal_is_involution() {
        let text = "\u{0628}\u{0650}\u{0633}\u{0652}\u{0645}\u{0650} \u{0627}\u{0644}\u{0644}\u{0651}\u{0670}\u{0647}";
        assert_eq!(reverse_clusters(&reverse_clusters(text)), text);
        assert_eq!(clusters(&reverse_clusters(text)).len(), clusters(text).len());
    }

    #[test]
    fn test_leading_mark_cluster() {
        assert_eq!(clusters("\u{064E}ab"), vec!["\u{064E}", "a", "b"]);
        assert_eq!(clusters(""), Vec::<&str>::new());
    }

    #[test]
    fn test_leading_pause_mark_round_trips() {
        let line = "\u{06DB} \u{FED3}\u{0650}\u{FEF4}\u{FEEA}\u{0650}";
        let once = reverse_clusters(line);
        assert!(once.starts_with('\u{06DB}'));
        assert_eq!(reverse_clusters(&once), line);

        assert_eq!(reverse_clusters("\u{06DB}\u{0652}"), "\u{06DB}\u{0652}");
    }

    #[test]
    fn test_ascii_reversed() {
        assert_eq!(reverse_clusters("abc"), "cba");
    }
}
