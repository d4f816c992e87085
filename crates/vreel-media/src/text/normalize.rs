//! Removal of invisible and control code points.

/// Justification elongation (tatweel).
pub const TATWEEL: char = '\u{0640}';

fn is_invisible(c: char) -> bool {
    matches!(c,
        '\u{200B}'                      // zero-width space
        | '\u{200C}' | '\u{200D}'       // ZWNJ / ZWJ
        | '\u{2060}'                    // word joiner
        | '\u{FEFF}'                    // byte-order mark
        | '\u{00AD}'                    // soft hyphen
        | '\u{200E}' | '\u{200F}'       // LRM / RLM
        | '\u{202A}'..='\u{202E}'       // embeddings and overrides
        | '\u{2066}'..='\u{2069}')      // isolates
}

/// Strip invisible code points and collapse tatweel runs to a single one.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_tatweel = false;

    for c in text.chars().filter(|c| !is_invisible(*c)) {
        if c == TATWEEL {
            if previous_tatweel {
                continue;
            }
            previous_tatweel = true;
        } else {
            previous_tatweel = false;
        }
        out.push(c);
    }

    out
}
