//! Ethiopic homoglyph folding table.
//!
//! Informal Amharic writing uses several consonant series interchangeably: the
//! h-sounds (ሀ ሐ ኀ, plus a few ኸ forms), the s-sounds (ሰ ሠ), the glottal and
//! pharyngeal vowel carriers (አ ዐ) and the ts-sounds (ጸ ፀ). Two labialized
//! spellings (ቊ, ኵ) also fold onto the plain u-form. Each entry below
//! maps one variant to the canonical letter that stands for its whole set.
//!
//! The sets are spelling conventions, not a formula over codepoints, so every
//! pair is listed by hand. Entries are sorted by variant so lookups can binary
//! search, and no canonical letter appears as a variant.

/// `(variant, canonical)` pairs, sorted by variant.
pub const FOLD_TABLE: &[(char, char)] = &[
    ('\u{1203}', '\u{1200}'), // ሃ -> ሀ
    ('\u{1210}', '\u{1200}'), // ሐ -> ሀ
    ('\u{1211}', '\u{1201}'), // ሑ -> ሁ
    ('\u{1212}', '\u{1202}'), // ሒ -> ሂ
    ('\u{1213}', '\u{1200}'), // ሓ -> ሀ
    ('\u{1214}', '\u{1204}'), // ሔ -> ሄ
    ('\u{1215}', '\u{1205}'), // ሕ -> ህ
    ('\u{1216}', '\u{1206}'), // ሖ -> ሆ
    ('\u{1220}', '\u{1230}'), // ሠ -> ሰ
    ('\u{1221}', '\u{1231}'), // ሡ -> ሱ
    ('\u{1222}', '\u{1232}'), // ሢ -> ሲ
    ('\u{1223}', '\u{1233}'), // ሣ -> ሳ
    ('\u{1224}', '\u{1234}'), // ሤ -> ሴ
    ('\u{1225}', '\u{1235}'), // ሥ -> ስ
    ('\u{1226}', '\u{1236}'), // ሦ -> ሶ
    ('\u{124A}', '\u{1241}'), // ቊ -> ቁ
    ('\u{1280}', '\u{1200}'), // ኀ -> ሀ
    ('\u{1281}', '\u{1201}'), // ኁ -> ሁ
    ('\u{1282}', '\u{1202}'), // ኂ -> ሂ
    ('\u{1283}', '\u{1200}'), // ኃ -> ሀ
    ('\u{1284}', '\u{1204}'), // ኄ -> ሄ
    ('\u{1285}', '\u{1200}'), // ኅ -> ሀ
    ('\u{1286}', '\u{1206}'), // ኆ -> ሆ
    ('\u{128C}', '\u{1204}'), // ኌ -> ሄ
    ('\u{12A3}', '\u{12A0}'), // ኣ -> አ
    ('\u{12B5}', '\u{12A9}'), // ኵ -> ኩ
    ('\u{12BA}', '\u{1202}'), // ኺ -> ሂ
    ('\u{12BB}', '\u{1200}'), // ኻ -> ሀ
    ('\u{12BE}', '\u{1206}'), // ኾ -> ሆ
    ('\u{12C4}', '\u{1204}'), // ዄ -> ሄ
    ('\u{12C5}', '\u{1201}'), // ዅ -> ሁ
    ('\u{12D0}', '\u{12A0}'), // ዐ -> አ
    ('\u{12D1}', '\u{12A1}'), // ዑ -> ኡ
    ('\u{12D2}', '\u{12A2}'), // ዒ -> ኢ
    ('\u{12D3}', '\u{12A0}'), // ዓ -> አ
    ('\u{12D4}', '\u{12A4}'), // ዔ -> ኤ
    ('\u{12D5}', '\u{12A5}'), // ዕ -> እ
    ('\u{12D6}', '\u{12A6}'), // ዖ -> ኦ
    ('\u{1338}', '\u{1340}'), // ጸ -> ፀ
    ('\u{1339}', '\u{1341}'), // ጹ -> ፁ
    ('\u{133A}', '\u{1342}'), // ጺ -> ፂ
    ('\u{133B}', '\u{1343}'), // ጻ -> ፃ
    ('\u{133C}', '\u{1344}'), // ጼ -> ፄ
    ('\u{133D}', '\u{1345}'), // ጽ -> ፅ
    ('\u{133E}', '\u{1346}'), // ጾ -> ፆ
];

/// Canonical letter for `c`, or `c` itself when it is not a known variant.
pub fn canonical_of(c: char) -> char {
    if !('\u{1203}'..='\u{133E}').contains(&c) {
        return c;
    }
    match FOLD_TABLE.binary_search_by_key(&c, |&(variant, _)| variant) {
        Ok(i) => FOLD_TABLE[i].1,
        Err(_) => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_without_duplicates() {
        for pair in FOLD_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{:?} before {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn canonical_letters_are_fixed_points() {
        for &(variant, canonical) in FOLD_TABLE {
            assert_ne!(variant, canonical);
            assert_eq!(canonical_of(canonical), canonical, "chain through {canonical}");
        }
    }

    #[test]
    fn every_member_of_a_set_folds_together() {
        let sets = [
            ("ሃኅኃሐሓኻኀ", 'ሀ'),
            ("ሑኁዅ", 'ሁ'),
            ("ዓኣዐ", 'አ'),
            ("ሥ", 'ስ'),
            ("ጸ", 'ፀ'),
            ("ቊ", 'ቁ'),
            ("ኵ", 'ኩ'),
        ];
        for (set, canonical) in sets {
            for c in set.chars() {
                assert_eq!(canonical_of(c), canonical, "{c}");
            }
        }
    }

    #[test]
    fn unmapped_codepoints_pass_through() {
        for c in ['a', 'Z', '7', ' ', 'ለ', 'ሀ', 'አ', 'ፀ', '😊'] {
            assert_eq!(canonical_of(c), c);
        }
    }
}
