//! Contextual glyph-form selection for joining scripts.
//!
//! Used only for renderers that lack their own shaping engine.

use super::tables::{glyph_forms, is_combining, ligature, LIGATURE_CONNECTOR};

/// Nearest non-combining character before `idx`.
fn previous_base(chars: &[char], idx: usize) -> Option<char> {
    chars[..idx].iter().rev().copied().find(|c| !is_combining(*c))
}

/// Nearest non-combining character after `idx`, with its position.
fn next_base(chars: &[char], idx: usize) -> Option<(usize, char)> {
    chars
        .iter()
        .enumerate()
        .skip(idx + 1)
        .find(|(_, c)| !is_combining(**c))
        .map(|(i, c)| (i, *c))
}

/// Replace base letters with their positional presentation forms and
/// contract lam-alef pairs into ligatures.
///
/// Combining marks are transparent to the joining context. Marks sitting
/// between a lam and the alef it fuses with follow the ligature glyph.
pub fn shape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut shaped = String::with_capacity(text.len() * 3);
    let mut i = 0;

    while i < chars.len() {
        let current = chars[i];
        let Some(forms) = glyph_forms(current) else {
            shaped.push(current);
            i += 1;
            continue;
        };

        let prev_joins = previous_base(&chars, i)
            .and_then(glyph_forms)
            .is_some_and(|f| f.joins_forward());
        let next = next_base(&chars, i);
        let next_joins = next
            .and_then(|(_, c)| glyph_forms(c))
            .is_some_and(|f| f.joins_backward());

        if current == LIGATURE_CONNECTOR {
            if let Some((next_idx, (isolated, final_))) =
                next.and_then(|(idx, c)| ligature(c).map(|lig| (idx, lig)))
            {
                shaped.push(if prev_joins { final_ } else { isolated });
                shaped.extend(&chars[i + 1..next_idx]);
                i = next_idx + 1;
                continue;
            }
        }

        let glyph = match (prev_joins, next_joins) {
            (true, true) if forms.medial.is_some() => forms.medial,
            (true, _) if forms.final_.is_some() => forms.final_,
            (_, true) if forms.initial.is_some() => forms.initial,
            _ => None,
        }
        .unwrap_or(forms.isolated);

        shaped.push(glyph);
        i += 1;
    }

    shaped
}
