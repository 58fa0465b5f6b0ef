//! Char Filter Module
//!
//! The first stage of the analysis pipeline: a pure text-to-text rewrite that
//! runs before tokenization. Given raw input like `"Foo\r\n\u{00A0} bar"`, the
//! standard filter produces `"Foo\n bar"`, and every token offset downstream is
//! measured against that output, never against the raw input.
//!
//! ## Contract
//!
//! - **Pure**: same `(text, options)` always yields the same result.
//! - **Idempotent**: `apply(apply(x)) == apply(x)` for fixed options.
//! - **Cheap when clean**: text that needs no rewriting is returned borrowed,
//!   with `changed == false`.
//!
//! ## Precedence
//!
//! [`StandardCharFilter`] runs its policies in a fixed order:
//!
//! 1. newline handling
//! 2. Unicode space separators → ASCII space
//! 3. whitespace collapse
//! 4. Unicode normalization form (NFC / NFKC)
//! 5. combining marks (strip Mn)
//! 6. joiners
//! 7. elongation
//! 8. digits
//!
//! Later steps can expose new whitespace runs (NFKC turns `¨` into a space
//! plus a mark; stripping a lone mark can leave two spaces adjacent), so a pass
//! that changed the text is repeated until nothing changes.

use std::borrow::Cow;
use std::io::Read;

use memchr::{memchr, memchr2};
use sift_types::{
    CharFilterOptions, CombiningMarkPolicy, DigitNormalization, ElongationHandling,
    JoinerHandling, NewlinePolicy, SpaceNormalization, UnicodeNormalization, WhitespaceCollapse,
};
use unicode_normalization::{is_nfc, is_nfkc, UnicodeNormalization as _};

use super::unicode;
use crate::error::AnalysisError;

/// Upper bound on extra passes while settling on a fixed point.
const MAX_SETTLE_PASSES: usize = 4;

/// Output of one char filter application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered<'a> {
    text: Cow<'a, str>,
    changed: bool,
}

impl<'a> Filtered<'a> {
    /// Wraps filter output, recording whether it differs from `input`.
    pub fn new(input: &str, text: Cow<'a, str>) -> Self {
        let changed = text.as_ref() != input;
        Self { text, changed }
    }

    /// The filtered text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True iff the output differs from the input.
    #[inline]
    pub const fn changed(&self) -> bool {
        self.changed
    }

    /// Consumes the result, returning the text.
    #[inline]
    pub fn into_text(self) -> Cow<'a, str> {
        self.text
    }

    /// Detaches the result from the input's lifetime.
    pub fn into_owned(self) -> Filtered<'static> {
        Filtered {
            text: Cow::Owned(self.text.into_owned()),
            changed: self.changed,
        }
    }
}

/// A pre-tokenization normalization stage.
///
/// Implementations must be stateless: one instance may be shared by any
/// number of pipelines and threads.
pub trait CharFilter: Send + Sync {
    /// Rewrites `text` according to `options`.
    fn apply<'a>(&self, text: &'a str, options: &CharFilterOptions) -> Filtered<'a>;

    /// Stable identifier, used by configs and pipeline fingerprints.
    fn name(&self) -> &'static str;

    /// Null-aware form of [`apply`](Self::apply): no text in, no text out.
    fn apply_opt<'a>(
        &self,
        text: Option<&'a str>,
        options: &CharFilterOptions,
    ) -> Option<Filtered<'a>> {
        text.map(|t| self.apply(t, options))
    }

    /// Drains `reader` into memory and filters the result.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::Io`] if reading fails or the input is not valid UTF-8.
    fn apply_reader(
        &self,
        reader: &mut dyn Read,
        options: &CharFilterOptions,
    ) -> Result<Filtered<'static>, AnalysisError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Ok(self.apply(&buf, options).into_owned())
    }
}

/// Implements every [`CharFilterOptions`] policy in precedence order.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCharFilter;

impl StandardCharFilter {
    /// Name reported by [`CharFilter::name`].
    pub const NAME: &'static str = "standard";

    /// Runs one pass of all eight steps.
    fn pass<'a>(&self, text: Cow<'a, str>, options: &CharFilterOptions) -> Cow<'a, str> {
        let text = newlines(text, options.newline_policy());

        let text = match options.space_normalization() {
            SpaceNormalization::None => text,
            SpaceNormalization::ConvertUnicodeSpacesToAscii => {
                replace_where(text, |c| unicode::is_unicode_space(c).then_some(' '))
            }
        };

        let text = match options.collapse_policy() {
            WhitespaceCollapse::None => text,
            WhitespaceCollapse::CollapseSequences => collapse(text),
        };

        let text = match options.unicode_normalization() {
            UnicodeNormalization::None => text,
            UnicodeNormalization::Nfc if is_nfc(&text) => text,
            UnicodeNormalization::Nfc => Cow::Owned(text.nfc().collect()),
            UnicodeNormalization::Nfkc if is_nfkc(&text) => text,
            UnicodeNormalization::Nfkc => Cow::Owned(text.nfkc().collect()),
        };

        let text = match options.combining_mark_policy() {
            CombiningMarkPolicy::Preserve => text,
            CombiningMarkPolicy::StripNonspacing => {
                remove_where(text, unicode::is_nonspacing_mark)
            }
        };

        let text = match options.joiner_handling() {
            JoinerHandling::Preserve | JoinerHandling::PreserveAsInnerWord => text,
            JoinerHandling::Remove => remove_where(text, unicode::is_joiner),
        };

        let text = match options.elongation_handling() {
            ElongationHandling::Preserve => text,
            ElongationHandling::Strip => remove_where(text, unicode::is_elongation),
        };

        match options.digit_normalization() {
            DigitNormalization::Preserve => text,
            DigitNormalization::MapToAscii => replace_where(text, unicode::ascii_digit),
        }
    }
}

impl CharFilter for StandardCharFilter {
    fn apply<'a>(&self, text: &'a str, options: &CharFilterOptions) -> Filtered<'a> {
        if text.is_empty() {
            return Filtered::new(text, Cow::Borrowed(text));
        }

        let mut settled = match self.pass(Cow::Borrowed(text), options) {
            Cow::Borrowed(unchanged) => return Filtered::new(text, Cow::Borrowed(unchanged)),
            Cow::Owned(first) => first,
        };

        for _ in 0..MAX_SETTLE_PASSES {
            let next = match self.pass(Cow::Borrowed(settled.as_str()), options) {
                Cow::Borrowed(_) => None,
                Cow::Owned(next) => Some(next),
            };
            match next {
                Some(next) => settled = next,
                None => return Filtered::new(text, Cow::Owned(settled)),
            }
        }

        tracing::warn!(
            passes = MAX_SETTLE_PASSES,
            len = text.len(),
            "char filter did not settle on a fixed point"
        );
        Filtered::new(text, Cow::Owned(settled))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Step 1. Allocates only when a newline actually needs rewriting.
fn newlines(text: Cow<'_, str>, policy: NewlinePolicy) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let needed = match policy {
        NewlinePolicy::Preserve => memchr(b'\r', bytes).is_some(),
        NewlinePolicy::NormalizeToLf => {
            memchr(b'\r', bytes).is_some() || has_unicode_newline(&text)
        }
        NewlinePolicy::Remove => memchr2(b'\n', b'\r', bytes).is_some() || has_unicode_newline(&text),
    };
    if !needed {
        return text;
    }

    let keep = policy != NewlinePolicy::Remove;
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if keep {
                    out.push('\n');
                }
            }
            '\n' => {
                if keep {
                    out.push('\n');
                }
            }
            c if unicode::is_unicode_newline(c) => match policy {
                NewlinePolicy::Preserve => out.push(c),
                NewlinePolicy::NormalizeToLf => out.push('\n'),
                NewlinePolicy::Remove => {}
            },
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

#[inline]
fn has_unicode_newline(text: &str) -> bool {
    !text.is_ascii() && text.chars().any(unicode::is_unicode_newline)
}

/// Step 3. Every run of non-newline whitespace becomes one ASCII space.
fn collapse(text: Cow<'_, str>) -> Cow<'_, str> {
    if !needs_collapse(&text) {
        return text;
    }

    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;

    for c in text.chars() {
        if unicode::is_collapsible_space(c) {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(c);
            prev_space = false;
        }
    }

    Cow::Owned(out)
}

/// A collapse is a no-op iff every whitespace run is a single ASCII space.
fn needs_collapse(text: &str) -> bool {
    let mut prev_space = false;
    for c in text.chars() {
        if unicode::is_collapsible_space(c) {
            if prev_space || c != ' ' {
                return true;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
    }
    false
}

fn remove_where(text: Cow<'_, str>, reject: impl Fn(char) -> bool) -> Cow<'_, str> {
    if !text.chars().any(&reject) {
        return text;
    }
    Cow::Owned(text.chars().filter(|&c| !reject(c)).collect())
}

fn replace_where(text: Cow<'_, str>, map: impl Fn(char) -> Option<char>) -> Cow<'_, str> {
    if !text.chars().any(|c| map(c).is_some()) {
        return text;
    }
    Cow::Owned(text.chars().map(|c| map(c).unwrap_or(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, options: CharFilterOptions) -> String {
        StandardCharFilter.apply(input, &options).text().to_owned()
    }

    fn std_run(input: &str) -> String {
        run(input, CharFilterOptions::standard())
    }

    fn only() -> sift_types::CharFilterOptionsBuilder {
        CharFilterOptions::passthrough().into()
    }

    #[test]
    fn newline_precedes_collapse() {
        assert_eq!(std_run("foo\t  bar\n  baz"), "foo bar\n baz");
    }

    #[test]
    fn empty_input_is_unchanged() {
        let out = StandardCharFilter.apply("", &CharFilterOptions::standard());
        assert_eq!(out.text(), "");
        assert!(!out.changed());
    }

    #[test]
    fn apply_opt_none_yields_none() {
        assert!(StandardCharFilter
            .apply_opt(None, &CharFilterOptions::standard())
            .is_none());
        let some = StandardCharFilter
            .apply_opt(Some(""), &CharFilterOptions::standard())
            .unwrap();
        assert_eq!(some.text(), "");
        assert!(!some.changed());
    }

    #[test]
    fn clean_text_is_borrowed() {
        let input = "hello world";
        let out = StandardCharFilter.apply(input, &CharFilterOptions::standard());
        assert!(!out.changed());
        assert!(matches!(out.into_text(), Cow::Borrowed(_)));
    }

    #[test]
    fn changed_flag_tracks_difference() {
        let out = StandardCharFilter.apply("a  b", &CharFilterOptions::standard());
        assert!(out.changed());
        assert_eq!(out.text(), "a b");
    }

    #[test]
    fn preserve_canonicalizes_cr() {
        let o = only().newline_policy(NewlinePolicy::Preserve).build();
        assert_eq!(run("a\r\nb\rc\nd", o), "a\nb\nc\nd");
        assert_eq!(run("a\u{2028}b", o), "a\u{2028}b");
    }

    #[test]
    fn normalize_to_lf_folds_every_variant() {
        let o = only().newline_policy(NewlinePolicy::NormalizeToLf).build();
        assert_eq!(run("a\r\nb\rc\u{0085}d\u{2028}e\u{2029}f", o), "a\nb\nc\nd\ne\nf");
    }

    #[test]
    fn remove_deletes_newlines() {
        let o = only().newline_policy(NewlinePolicy::Remove).build();
        assert_eq!(run("a\r\nb\nc\u{2029}d", o), "abcd");
    }

    #[test]
    fn remove_then_collapse() {
        let o = only()
            .newline_policy(NewlinePolicy::Remove)
            .collapse_policy(WhitespaceCollapse::CollapseSequences)
            .build();
        assert_eq!(run("a \n b", o), "a b");
    }

    #[test]
    fn collapse_keeps_newlines() {
        let o = only()
            .collapse_policy(WhitespaceCollapse::CollapseSequences)
            .build();
        assert_eq!(run("a \t \n\n \tb", o), "a \n\n b");
        assert_eq!(run("\ta", o), " a");
    }

    #[test]
    fn collapse_none_keeps_runs() {
        assert_eq!(run("a   b", CharFilterOptions::passthrough()), "a   b");
    }

    #[test]
    fn unicode_spaces_convert() {
        let o = only()
            .space_normalization(SpaceNormalization::ConvertUnicodeSpacesToAscii)
            .build();
        assert_eq!(run("a\u{00A0}b\u{2003}c\u{3000}d", o), "a b c d");
        // Two converted spaces stay two without collapse.
        assert_eq!(run("a\u{00A0}\u{00A0}b", o), "a  b");
    }

    #[test]
    fn unicode_spaces_left_alone_when_disabled() {
        assert_eq!(run("a\u{00A0}b", CharFilterOptions::passthrough()), "a\u{00A0}b");
    }

    #[test]
    fn nfc_composes() {
        let o = only().unicode_normalization(UnicodeNormalization::Nfc).build();
        assert_eq!(run("e\u{0301}", o), "\u{00E9}");
    }

    #[test]
    fn nfkc_folds_compatibility_forms() {
        let o = only().unicode_normalization(UnicodeNormalization::Nfkc).build();
        assert_eq!(run("\u{FB01}le", o), "file");
        assert_eq!(run("\u{FF21}", o), "A");
    }

    #[test]
    fn strip_nonspacing_marks() {
        let o = only()
            .unicode_normalization(UnicodeNormalization::None)
            .combining_mark_policy(CombiningMarkPolicy::StripNonspacing)
            .build();
        assert_eq!(run("cafe\u{0301}", o), "cafe");
        // Spacing marks (Mc) survive.
        assert_eq!(run("\u{0915}\u{0903}", o), "\u{0915}\u{0903}");
    }

    #[test]
    fn nfc_runs_before_mark_stripping() {
        // Precomposed after NFC, so the accent is no longer a separate mark.
        let o = only()
            .unicode_normalization(UnicodeNormalization::Nfc)
            .combining_mark_policy(CombiningMarkPolicy::StripNonspacing)
            .build();
        assert_eq!(run("e\u{0301}", o), "\u{00E9}");
    }

    #[test]
    fn joiners_removed_or_kept() {
        let remove = only().joiner_handling(JoinerHandling::Remove).build();
        assert_eq!(run("a\u{200C}b\u{200D}c\u{2060}d", remove), "abcd");
        let keep = only().joiner_handling(JoinerHandling::PreserveAsInnerWord).build();
        assert_eq!(run("a\u{200C}b", keep), "a\u{200C}b");
    }

    #[test]
    fn elongation_stripped() {
        let o = only().elongation_handling(ElongationHandling::Strip).build();
        assert_eq!(run("\u{0643}\u{0640}\u{0640}\u{062A}\u{0627}\u{0628}", o), "\u{0643}\u{062A}\u{0627}\u{0628}");
        assert_eq!(std_run("\u{0640}"), "");
    }

    #[test]
    fn digits_mapped_to_ascii() {
        let o = only().digit_normalization(DigitNormalization::MapToAscii).build();
        assert_eq!(run("\u{0661}\u{0662}\u{0663}", o), "123");
        assert_eq!(run("\u{0967}\u{0968}", o), "12");
        assert_eq!(run("\u{1D7CF}", o), "\u{1D7CF}");
    }

    #[test]
    fn digits_preserved_by_default() {
        assert_eq!(std_run("\u{0661}\u{0662}"), "\u{0661}\u{0662}");
    }

    #[test]
    fn nfkc_space_expansion_settles() {
        // U+00A8 DIAERESIS decomposes to SPACE + COMBINING DIAERESIS.
        let o = CharFilterOptions::builder()
            .unicode_normalization(UnicodeNormalization::Nfkc)
            .build();
        let once = run("a \u{00A8}", o);
        assert_eq!(run(&once, o), once);
        assert!(!once.contains("  "));
    }

    #[test]
    fn mark_strip_exposing_double_space_settles() {
        let o = CharFilterOptions::builder()
            .combining_mark_policy(CombiningMarkPolicy::StripNonspacing)
            .build();
        let once = run("a \u{0301} b", o);
        assert_eq!(once, "a b");
        assert_eq!(run(&once, o), once);
    }

    #[test]
    fn idempotent_across_policies() {
        let samples = [
            "foo\t  bar\n  baz",
            "a\r\n\r\n b",
            "Cafe\u{0301}\u{00A0}\u{00A0}au lait",
            "\u{0643}\u{0640}\u{062A}\u{200C}\u{0628} \u{0661}\u{0662}",
            "x \u{00A8} \u{0301} y",
            "\u{FB01} \u{2028} \u{3000}z",
        ];
        let configs = [
            CharFilterOptions::standard(),
            CharFilterOptions::passthrough(),
            CharFilterOptions::builder()
                .newline_policy(NewlinePolicy::Remove)
                .unicode_normalization(UnicodeNormalization::Nfkc)
                .combining_mark_policy(CombiningMarkPolicy::StripNonspacing)
                .joiner_handling(JoinerHandling::Remove)
                .digit_normalization(DigitNormalization::MapToAscii)
                .build(),
            CharFilterOptions::builder()
                .newline_policy(NewlinePolicy::NormalizeToLf)
                .space_normalization(SpaceNormalization::None)
                .build(),
        ];

        for o in configs {
            for s in samples {
                let once = run(s, o);
                let twice = StandardCharFilter.apply(&once, &o);
                assert_eq!(twice.text(), once, "input {s:?} options {o:?}");
                assert!(!twice.changed());
            }
        }
    }

    #[test]
    fn deterministic() {
        let s = "Ünïcödé\u{00A0} text\r\nwith\u{0640} stuff";
        assert_eq!(std_run(s), std_run(s));
    }

    #[test]
    fn reader_path_matches_string_path() {
        let input = "foo\t  bar\r\n  baz";
        let mut reader = input.as_bytes();
        let out = StandardCharFilter
            .apply_reader(&mut reader, &CharFilterOptions::standard())
            .unwrap();
        assert_eq!(out.text(), std_run(input));
        assert!(out.changed());
    }

    #[test]
    fn reader_rejects_invalid_utf8() {
        let mut reader: &[u8] = &[b'a', 0xFF, b'b'];
        let err = StandardCharFilter
            .apply_reader(&mut reader, &CharFilterOptions::standard())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Io(_)));
    }

    #[test]
    fn emoji_passthrough() {
        assert_eq!(std_run("Hello 🌍  World"), "Hello 🌍 World");
    }
}
