//! Message text cleaning.
//!
//! Four pure stages run in a fixed order: emoji removal, special-character
//! removal, Ethiopic homoglyph folding and whitespace collapsing. Each stage
//! takes and returns plain text, so any of them can be tested on its own.

use crate::homoglyph::canonical_of;

/// Pictographic and symbol blocks removed by [`strip_emoji`].
const EMOJI_RANGES: &[(char, char)] = &[
    ('\u{2600}', '\u{26FF}'),   // miscellaneous symbols
    ('\u{2700}', '\u{27BF}'),   // dingbats
    ('\u{FE00}', '\u{FE0F}'),   // variation selectors
    ('\u{1F1E0}', '\u{1F1FF}'), // regional indicators (flags)
    ('\u{1F300}', '\u{1F5FF}'), // symbols & pictographs
    ('\u{1F600}', '\u{1F64F}'), // emoticons
    ('\u{1F680}', '\u{1F6FF}'), // transport & map
    ('\u{1F900}', '\u{1F9FF}'), // supplemental symbols & pictographs
    ('\u{1FA70}', '\u{1FAFF}'), // symbols & pictographs extended-A
];

pub fn is_emoji(c: char) -> bool {
    EMOJI_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

/// Latin letters: ASCII, Latin-1 supplement letters and Latin Extended-A/B.
pub fn is_latin_letter(c: char) -> bool {
    matches!(c,
        'a'..='z' | 'A'..='Z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{24F}')
}

/// Ethiopic syllables only; the block's punctuation, numerals and combining
/// marks (U+135D and up) are not part of the syllabary.
pub fn is_ethiopic_syllable(c: char) -> bool {
    ('\u{1200}'..='\u{135A}').contains(&c)
}

/// Characters that survive [`strip_special_characters`].
pub fn is_retained(c: char) -> bool {
    is_latin_letter(c) || c.is_ascii_digit() || c.is_whitespace() || is_ethiopic_syllable(c)
}

/// Remove emoji and pictographic symbols, leaving everything else in place.
pub fn strip_emoji(text: &str) -> String {
    text.chars().filter(|&c| !is_emoji(c)).collect()
}

/// Drop every character outside the retained classes.
///
/// Nothing is inserted where a character was removed, so `"a-b"` becomes
/// `"ab"`; spacing is left for [`collapse_whitespace`] to tidy.
pub fn strip_special_characters(text: &str) -> String {
    text.chars().filter(|&c| is_retained(c)).collect()
}

/// Fold Ethiopic letter variants onto their canonical letter.
pub fn normalize(text: &str) -> String {
    text.chars().map(canonical_of).collect()
}

/// Collapse each whitespace run to one space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Full cleaning pipeline for one message body.
pub fn preprocess_text(text: &str) -> String {
    collapse_whitespace(&normalize(&strip_special_characters(&strip_emoji(text))))
}

/// Clean a column of messages; output row `i` is the cleaned input row `i`.
pub fn preprocess_batch<S: AsRef<str>>(rows: &[S]) -> Vec<String> {
    rows.iter().map(|r| preprocess_text(r.as_ref())).collect()
}
