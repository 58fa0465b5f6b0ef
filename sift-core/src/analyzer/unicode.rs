//! Character sets shared by the char filter and the tokenizer.
//!
//! Everything here is a pure lookup on a single code point. ASCII is resolved
//! without touching the Unicode tables.

use unicode_properties::{GeneralCategory, GeneralCategoryGroup, UnicodeGeneralCategory};

pub(crate) const NEL: char = '\u{0085}';
pub(crate) const LINE_SEPARATOR: char = '\u{2028}';
pub(crate) const PARAGRAPH_SEPARATOR: char = '\u{2029}';

/// `\n`, `\r`, NEL, LINE SEPARATOR, PARAGRAPH SEPARATOR.
#[inline(always)]
pub(crate) const fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\r' | NEL | LINE_SEPARATOR | PARAGRAPH_SEPARATOR)
}

/// Newline variants outside ASCII.
#[inline(always)]
pub(crate) const fn is_unicode_newline(c: char) -> bool {
    matches!(c, NEL | LINE_SEPARATOR | PARAGRAPH_SEPARATOR)
}

/// Space separators (category Zs) other than U+0020.
#[inline(always)]
pub(crate) const fn is_unicode_space(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Whitespace that a collapse pass folds into a single space.
#[inline(always)]
pub(crate) fn is_collapsible_space(c: char) -> bool {
    c.is_whitespace() && !is_newline(c)
}

/// ZERO WIDTH NON-JOINER, ZERO WIDTH JOINER, WORD JOINER.
#[inline(always)]
pub(crate) const fn is_joiner(c: char) -> bool {
    matches!(c, '\u{200C}' | '\u{200D}' | '\u{2060}')
}

/// ARABIC TATWEEL, NKO LAJANYALAN.
#[inline(always)]
pub(crate) const fn is_elongation(c: char) -> bool {
    matches!(c, '\u{0640}' | '\u{07FA}')
}

/// Category Mn.
#[inline]
pub(crate) fn is_nonspacing_mark(c: char) -> bool {
    !c.is_ascii() && c.general_category() == GeneralCategory::NonspacingMark
}

/// Categories Mn, Mc, Me.
#[inline]
pub(crate) fn is_mark(c: char) -> bool {
    !c.is_ascii() && c.general_category_group() == GeneralCategoryGroup::Mark
}

/// Categories L*.
#[inline]
pub(crate) fn is_alphabetic(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_alphabetic();
    }
    c.general_category_group() == GeneralCategoryGroup::Letter
}

/// Categories N* (Nd, Nl, No).
#[inline]
pub(crate) fn is_numeric(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_digit();
    }
    c.general_category_group() == GeneralCategoryGroup::Number
}

/// DIGIT ZERO of every supported decimal digit block, sorted.
///
/// Each entry starts a contiguous run of ten Nd code points mapping to
/// `0`..=`9`. Nd blocks missing here are left unchanged by digit mapping.
#[rustfmt::skip]
pub(crate) const DIGIT_ZEROS: &[u32] = &[
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic
    0x07C0, // NKo
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
    0x0DE6, // Sinhala Lith
    0x0E50, // Thai
    0x0ED0, // Lao
    0x0F20, // Tibetan
    0x1040, // Myanmar
    0x1090, // Myanmar Shan
    0x17E0, // Khmer
    0x1810, // Mongolian
    0x1946, // Limbu
    0x19D0, // New Tai Lue
    0x1A80, // Tai Tham Hora
    0x1A90, // Tai Tham Tham
    0x1B50, // Balinese
    0x1BB0, // Sundanese
    0x1C40, // Lepcha
    0x1C50, // Ol Chiki
    0xA620, // Vai
    0xA8D0, // Saurashtra
    0xA900, // Kayah Li
    0xA9D0, // Javanese
    0xA9F0, // Myanmar Tai Laing
    0xAA50, // Cham
    0xABF0, // Meetei Mayek
    0xFF10, // Fullwidth
    0x104A0, // Osmanya
    0x10D30, // Hanifi Rohingya
    0x1E950, // Adlam
];

/// ASCII digit for a supported script digit, `None` otherwise (including for
/// ASCII digits, which need no mapping).
#[inline]
pub(crate) fn ascii_digit(c: char) -> Option<char> {
    if c.is_ascii() {
        return None;
    }
    let cp = c as u32;
    let zero = match DIGIT_ZEROS.binary_search(&cp) {
        Ok(i) => DIGIT_ZEROS[i],
        Err(0) => return None,
        Err(i) => DIGIT_ZEROS[i - 1],
    };
    let value = cp - zero;
    if value < 10 {
        char::from_digit(value, 10)
    } else {
        None
    }
}
