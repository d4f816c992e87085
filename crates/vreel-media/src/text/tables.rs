//! Static Arabic glyph tables.
//!
//! Forms are Unicode Arabic Presentation Forms (A and B). Letters that only
//! join to the preceding letter carry `None` for their initial and medial
//! forms.

/// Positional forms of one base letter: isolated, initial, medial, final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphForms {
    pub isolated: char,
    pub initial: Option<char>,
    pub medial: Option<char>,
    pub final_: Option<char>,
}

impl GlyphForms {
    /// The letter connects to the letter after it.
    pub fn joins_forward(&self) -> bool {
        self.initial.is_some() || self.medial.is_some()
    }

    /// The letter connects to the letter before it.
    pub fn joins_backward(&self) -> bool {
        self.medial.is_some() || self.final_.is_some()
    }
}

const fn dual(base: char, isolated: u32) -> (char, GlyphForms) {
    // Dual-joining letters occupy four consecutive code points.
    (
        base,
        GlyphForms {
            isolated: cp(isolated),
            initial: Some(cp(isolated + 2)),
            medial: Some(cp(isolated + 3)),
            final_: Some(cp(isolated + 1)),
        },
    )
}

const fn right(base: char, isolated: u32) -> (char, GlyphForms) {
    (
        base,
        GlyphForms {
            isolated: cp(isolated),
            initial: None,
            medial: None,
            final_: Some(cp(isolated + 1)),
        },
    )
}

const fn cp(code: u32) -> char {
    match char::from_u32(code) {
        Some(c) => c,
        None => panic!("invalid code point in glyph table"),
    }
}

/// Base letter to positional forms, sorted by base code point.
pub static GLYPH_FORMS: &[(char, GlyphForms)] = &[
    (
        '\u{0621}',
        GlyphForms {
            isolated: '\u{FE80}',
            initial: None,
            medial: None,
            final_: None,
        },
    ),
    right('\u{0622}', 0xFE81),
    right('\u{0623}', 0xFE83),
    right('\u{0624}', 0xFE85),
    right('\u{0625}', 0xFE87),
    dual('\u{0626}', 0xFE89),
    right('\u{0627}', 0xFE8D),
    dual('\u{0628}', 0xFE8F),
    right('\u{0629}', 0xFE93),
    dual('\u{062A}', 0xFE95),
    dual('\u{062B}', 0xFE99),
    dual('\u{062C}', 0xFE9D),
    dual('\u{062D}', 0xFEA1),
    dual('\u{062E}', 0xFEA5),
    right('\u{062F}', 0xFEA9),
    right('\u{0630}', 0xFEAB),
    right('\u{0631}', 0xFEAD),
    right('\u{0632}', 0xFEAF),
    dual('\u{0633}', 0xFEB1),
    dual('\u{0634}', 0xFEB5),
    dual('\u{0635}', 0xFEB9),
    dual('\u{0636}', 0xFEBD),
    dual('\u{0637}', 0xFEC1),
    dual('\u{0638}', 0xFEC5),
    dual('\u{0639}', 0xFEC9),
    dual('\u{063A}', 0xFECD),
    // Tatweel keeps its own code point in every position.
    (
        '\u{0640}',
        GlyphForms {
            isolated: '\u{0640}',
            initial: Some('\u{0640}'),
            medial: Some('\u{0640}'),
            final_: Some('\u{0640}'),
        },
    ),
    dual('\u{0641}', 0xFED1),
    dual('\u{0642}', 0xFED5),
    dual('\u{0643}', 0xFED9),
    dual('\u{0644}', 0xFEDD),
    dual('\u{0645}', 0xFEE1),
    dual('\u{0646}', 0xFEE5),
    dual('\u{0647}', 0xFEE9),
    right('\u{0648}', 0xFEED),
    right('\u{0649}', 0xFEEF),
    dual('\u{064A}', 0xFEF1),
    right('\u{0671}', 0xFB50),
    right('\u{06C0}', 0xFBA4),
    dual('\u{06CC}', 0xFBFC),
];

/// The connector letter that forms ligatures (lam).
pub const LIGATURE_CONNECTOR: char = '\u{0644}';

/// Lam followed by an alef variant: (isolated ligature, final ligature).
pub static LIGATURES: &[(char, (char, char))] = &[
    ('\u{0622}', ('\u{FEF5}', '\u{FEF6}')),
    ('\u{0623}', ('\u{FEF7}', '\u{FEF8}')),
    ('\u{0625}', ('\u{FEF9}', '\u{FEFA}')),
    ('\u{0627}', ('\u{FEFB}', '\u{FEFC}')),
    // Alef wasla shares the plain alef ligature.
    ('\u{0671}', ('\u{FEFB}', '\u{FEFC}')),
];

/// Diacritics that are transparent to joining.
static TRANSPARENT_MARKS: &[char] = &[
    '\u{0610}', '\u{0612}', '\u{0613}', '\u{0614}', '\u{0615}', '\u{064B}', '\u{064C}',
    '\u{064D}', '\u{064E}', '\u{064F}', '\u{0650}', '\u{0651}', '\u{0652}', '\u{0653}',
    '\u{0654}', '\u{0655}', '\u{0656}', '\u{0657}', '\u{0658}', '\u{0670}', '\u{06D6}',
    '\u{06D7}', '\u{06D8}', '\u{06D9}', '\u{06DA}', '\u{06DB}', '\u{06DC}', '\u{06DF}',
    '\u{06E0}', '\u{06E1}', '\u{06E2}', '\u{06E3}', '\u{06E4}', '\u{06E7}', '\u{06E8}',
    '\u{06EA}', '\u{06EB}', '\u{06EC}', '\u{06ED}',
];

/// Look up the positional forms of a letter.
pub fn glyph_forms(c: char) -> Option<&'static GlyphForms> {
    GLYPH_FORMS
        .binary_search_by_key(&c, |(base, _)| *base)
        .ok()
        .map(|idx| &GLYPH_FORMS[idx].1)
}

/// Look up the lam ligature for the letter following a lam.
pub fn ligature(next: char) -> Option<(char, char)> {
    LIGATURES
        .iter()
        .find(|(alef, _)| *alef == next)
        .map(|(_, forms)| *forms)
}

/// Zero-width diacritic: never breaks joining, never counted as visible,
/// always travels with the preceding base glyph.
pub fn is_combining(c: char) -> bool {
    TRANSPARENT_MARKS.binary_search(&c).is_ok()
        || matches!(c,
            '\u{0300}'..='\u{036F}'
            | '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{06D6}'..='\u{06ED}'
            | '\u{FE20}'..='\u{FE2F}')
}
