//! Immutable stage configuration.
//!
//! Both options types are built once through a builder and then shared
//! freely; they are `Copy` and carry no lifecycle beyond construction.
//!
//! # Precedence
//!
//! A char filter applies its policies in a fixed order: newline handling,
//! Unicode space conversion, whitespace collapse, Unicode normalization form,
//! combining marks, joiners, elongation, digits.

use serde::{Deserialize, Serialize};

/// Invalid tokenizer configuration, reported by [`TokenizerOptionsBuilder::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    /// `min_token_length` was zero.
    #[error("min_token_length must be at least 1, got {min}")]
    MinTokenLength {
        /// The rejected minimum.
        min: usize,
    },
    /// `max_token_length` was below `min_token_length`.
    #[error("max_token_length ({max}) must not be below min_token_length ({min})")]
    MaxBelowMin {
        /// Configured minimum.
        min: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Newline handling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewlinePolicy {
    /// Keep line breaks; `\r\n` and lone `\r` become `\n`.
    #[default]
    Preserve,
    /// Every newline variant (including NEL, LS, PS) becomes `\n`.
    NormalizeToLf,
    /// Delete every newline character.
    Remove,
}

/// Whitespace collapse policy, applied after newline handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhitespaceCollapse {
    /// Leave whitespace runs alone.
    None,
    /// Each run of non-newline whitespace becomes a single ASCII space.
    #[default]
    CollapseSequences,
}

/// Unicode space separator handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceNormalization {
    /// Leave Unicode spaces unchanged.
    None,
    /// Convert space separators (NBSP, EM SPACE, ...) to ASCII space.
    #[default]
    ConvertUnicodeSpacesToAscii,
}

/// Unicode normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnicodeNormalization {
    /// No normalization.
    None,
    /// Canonical composition.
    #[default]
    Nfc,
    /// Compatibility composition.
    Nfkc,
}

/// Combining mark handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombiningMarkPolicy {
    /// Keep combining marks.
    #[default]
    Preserve,
    /// Remove non-spacing marks (category Mn), keep the base characters.
    StripNonspacing,
}

/// Joiner handling (ZWNJ, ZWJ, WORD JOINER).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinerHandling {
    /// Keep joiners as-is.
    Preserve,
    /// Remove joiners.
    Remove,
    /// Keep joiners and have the tokenizer treat them as intra-word connectors.
    #[default]
    PreserveAsInnerWord,
}

/// Visual elongation handling (tatweel and similar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElongationHandling {
    /// Keep elongation characters.
    Preserve,
    /// Remove elongation characters.
    #[default]
    Strip,
}

/// Script-specific decimal digit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitNormalization {
    /// Keep script digits.
    #[default]
    Preserve,
    /// Map decimal digits of supported scripts to ASCII `0`-`9`.
    MapToAscii,
}

/// Char filter configuration. Every combination of policies is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CharFilterOptions {
    newline_policy: NewlinePolicy,
    collapse_policy: WhitespaceCollapse,
    space_normalization: SpaceNormalization,
    unicode_normalization: UnicodeNormalization,
    combining_mark_policy: CombiningMarkPolicy,
    joiner_handling: JoinerHandling,
    elongation_handling: ElongationHandling,
    digit_normalization: DigitNormalization,
}

impl CharFilterOptions {
    /// Starts a builder seeded with [`CharFilterOptions::standard`].
    pub fn builder() -> CharFilterOptionsBuilder {
        CharFilterOptionsBuilder::default()
    }

    /// General-purpose defaults for Latin and many non-Latin scripts:
    /// preserve newlines, collapse whitespace, convert Unicode spaces, NFC,
    /// keep marks, joiners as inner word, strip elongation, keep digits.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Options that change nothing. Useful as a base for single-policy stages.
    pub fn passthrough() -> Self {
        Self {
            newline_policy: NewlinePolicy::Preserve,
            collapse_policy: WhitespaceCollapse::None,
            space_normalization: SpaceNormalization::None,
            unicode_normalization: UnicodeNormalization::None,
            combining_mark_policy: CombiningMarkPolicy::Preserve,
            joiner_handling: JoinerHandling::Preserve,
            elongation_handling: ElongationHandling::Preserve,
            digit_normalization: DigitNormalization::Preserve,
        }
    }

    /// The configured newline policy.
    pub const fn newline_policy(&self) -> NewlinePolicy {
        self.newline_policy
    }
    /// The configured collapse policy.
    pub const fn collapse_policy(&self) -> WhitespaceCollapse {
        self.collapse_policy
    }
    /// The configured space normalization.
    pub const fn space_normalization(&self) -> SpaceNormalization {
        self.space_normalization
    }
    /// The configured Unicode normalization form.
    pub const fn unicode_normalization(&self) -> UnicodeNormalization {
        self.unicode_normalization
    }
    /// The configured combining mark policy.
    pub const fn combining_mark_policy(&self) -> CombiningMarkPolicy {
        self.combining_mark_policy
    }
    /// The configured joiner handling.
    pub const fn joiner_handling(&self) -> JoinerHandling {
        self.joiner_handling
    }
    /// The configured elongation handling.
    pub const fn elongation_handling(&self) -> ElongationHandling {
        self.elongation_handling
    }
    /// The configured digit normalization.
    pub const fn digit_normalization(&self) -> DigitNormalization {
        self.digit_normalization
    }
}

/// Builder for [`CharFilterOptions`].
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct CharFilterOptionsBuilder {
    inner: CharFilterOptions,
}

impl CharFilterOptionsBuilder {
    /// Sets newline policy.
    pub fn newline_policy(mut self, v: NewlinePolicy) -> Self {
        self.inner.newline_policy = v;
        self
    }
    /// Sets collapse policy.
    pub fn collapse_policy(mut self, v: WhitespaceCollapse) -> Self {
        self.inner.collapse_policy = v;
        self
    }
    /// Sets space normalization.
    pub fn space_normalization(mut self, v: SpaceNormalization) -> Self {
        self.inner.space_normalization = v;
        self
    }
    /// Sets the Unicode normalization form.
    pub fn unicode_normalization(mut self, v: UnicodeNormalization) -> Self {
        self.inner.unicode_normalization = v;
        self
    }
    /// Sets combining mark policy.
    pub fn combining_mark_policy(mut self, v: CombiningMarkPolicy) -> Self {
        self.inner.combining_mark_policy = v;
        self
    }
    /// Sets joiner handling.
    pub fn joiner_handling(mut self, v: JoinerHandling) -> Self {
        self.inner.joiner_handling = v;
        self
    }
    /// Sets elongation handling.
    pub fn elongation_handling(mut self, v: ElongationHandling) -> Self {
        self.inner.elongation_handling = v;
        self
    }
    /// Sets digit normalization.
    pub fn digit_normalization(mut self, v: DigitNormalization) -> Self {
        self.inner.digit_normalization = v;
        self
    }

    /// Finishes the builder. Infallible: all policy combinations are valid.
    pub fn build(self) -> CharFilterOptions {
        self.inner
    }
}

impl From<CharFilterOptions> for CharFilterOptionsBuilder {
    fn from(inner: CharFilterOptions) -> Self {
        Self { inner }
    }
}

/// Tokenizer configuration.
///
/// Invariant: `1 <= min_token_length <= max_token_length`. Lengths are in
/// UTF-16 code units and both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TokenizerOptionsBuilder")]
pub struct TokenizerOptions {
    keep_apostrophes: bool,
    keep_hyphens: bool,
    treat_joiner_as_inner_word: bool,
    emit_numeric: bool,
    emit_alpha: bool,
    emit_alpha_numeric: bool,
    min_token_length: usize,
    max_token_length: usize,
}

impl TokenizerOptions {
    /// Starts a builder seeded with [`TokenizerOptions::standard`].
    pub fn builder() -> TokenizerOptionsBuilder {
        TokenizerOptionsBuilder::default()
    }

    /// Every connector kept, every class emitted, no length bound beyond 1.
    pub fn standard() -> Self {
        Self {
            keep_apostrophes: true,
            keep_hyphens: true,
            treat_joiner_as_inner_word: true,
            emit_numeric: true,
            emit_alpha: true,
            emit_alpha_numeric: true,
            min_token_length: 1,
            max_token_length: usize::MAX,
        }
    }

    /// Copy of these options with joiner handling forced to `enabled`.
    pub const fn with_joiner_as_inner_word(mut self, enabled: bool) -> Self {
        self.treat_joiner_as_inner_word = enabled;
        self
    }

    /// Whether `'` and U+2019 may join word pieces.
    pub const fn keep_apostrophes(&self) -> bool {
        self.keep_apostrophes
    }
    /// Whether `-`, U+2010 and U+2011 may join word pieces.
    pub const fn keep_hyphens(&self) -> bool {
        self.keep_hyphens
    }
    /// Whether ZWNJ, ZWJ and WORD JOINER may join word pieces.
    pub const fn treat_joiner_as_inner_word(&self) -> bool {
        self.treat_joiner_as_inner_word
    }
    /// Emit runs made only of numbers.
    pub const fn emit_numeric(&self) -> bool {
        self.emit_numeric
    }
    /// Emit runs made only of letters.
    pub const fn emit_alpha(&self) -> bool {
        self.emit_alpha
    }
    /// Emit mixed letter/number runs.
    pub const fn emit_alpha_numeric(&self) -> bool {
        self.emit_alpha_numeric
    }
    /// Inclusive lower bound, in UTF-16 code units.
    pub const fn min_token_length(&self) -> usize {
        self.min_token_length
    }
    /// Inclusive upper bound, in UTF-16 code units.
    pub const fn max_token_length(&self) -> usize {
        self.max_token_length
    }

    /// Whether a term of `units` code units passes the length bounds.
    #[inline]
    pub const fn accepts_length(&self, units: usize) -> bool {
        units >= self.min_token_length && units <= self.max_token_length
    }
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for [`TokenizerOptions`]; validation runs once in [`build`](Self::build).
///
/// Also the deserialization shape of [`TokenizerOptions`], so stored configs
/// pass the same checks.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[must_use]
pub struct TokenizerOptionsBuilder {
    keep_apostrophes: bool,
    keep_hyphens: bool,
    treat_joiner_as_inner_word: bool,
    emit_numeric: bool,
    emit_alpha: bool,
    emit_alpha_numeric: bool,
    min_token_length: usize,
    max_token_length: usize,
}

impl Default for TokenizerOptionsBuilder {
    fn default() -> Self {
        TokenizerOptions::standard().into()
    }
}

impl From<TokenizerOptions> for TokenizerOptionsBuilder {
    fn from(o: TokenizerOptions) -> Self {
        Self {
            keep_apostrophes: o.keep_apostrophes,
            keep_hyphens: o.keep_hyphens,
            treat_joiner_as_inner_word: o.treat_joiner_as_inner_word,
            emit_numeric: o.emit_numeric,
            emit_alpha: o.emit_alpha,
            emit_alpha_numeric: o.emit_alpha_numeric,
            min_token_length: o.min_token_length,
            max_token_length: o.max_token_length,
        }
    }
}

impl TryFrom<TokenizerOptionsBuilder> for TokenizerOptions {
    type Error = OptionsError;

    fn try_from(b: TokenizerOptionsBuilder) -> Result<Self, Self::Error> {
        b.build()
    }
}

impl TokenizerOptionsBuilder {
    /// Sets [`TokenizerOptions::keep_apostrophes`].
    pub fn keep_apostrophes(mut self, v: bool) -> Self {
        self.keep_apostrophes = v;
        self
    }
    /// Sets [`TokenizerOptions::keep_hyphens`].
    pub fn keep_hyphens(mut self, v: bool) -> Self {
        self.keep_hyphens = v;
        self
    }
    /// Sets [`TokenizerOptions::treat_joiner_as_inner_word`].
    pub fn treat_joiner_as_inner_word(mut self, v: bool) -> Self {
        self.treat_joiner_as_inner_word = v;
        self
    }
    /// Sets [`TokenizerOptions::emit_numeric`].
    pub fn emit_numeric(mut self, v: bool) -> Self {
        self.emit_numeric = v;
        self
    }
    /// Sets [`TokenizerOptions::emit_alpha`].
    pub fn emit_alpha(mut self, v: bool) -> Self {
        self.emit_alpha = v;
        self
    }
    /// Sets [`TokenizerOptions::emit_alpha_numeric`].
    pub fn emit_alpha_numeric(mut self, v: bool) -> Self {
        self.emit_alpha_numeric = v;
        self
    }
    /// Sets the minimum length. Must be at least 1.
    pub fn min_token_length(mut self, v: usize) -> Self {
        self.min_token_length = v;
        self
    }
    /// Sets the maximum length. Must not be below the minimum.
    pub fn max_token_length(mut self, v: usize) -> Self {
        self.max_token_length = v;
        self
    }

    /// Validates and freezes the options.
    ///
    /// # Errors
    ///
    /// [`OptionsError::MinTokenLength`] if the minimum is zero,
    /// [`OptionsError::MaxBelowMin`] if the maximum is below the minimum.
    pub fn build(self) -> Result<TokenizerOptions, OptionsError> {
        if self.min_token_length < 1 {
            return Err(OptionsError::MinTokenLength {
                min: self.min_token_length,
            });
        }
        if self.max_token_length < self.min_token_length {
            return Err(OptionsError::MaxBelowMin {
                min: self.min_token_length,
                max: self.max_token_length,
            });
        }
        Ok(TokenizerOptions {
            keep_apostrophes: self.keep_apostrophes,
            keep_hyphens: self.keep_hyphens,
            treat_joiner_as_inner_word: self.treat_joiner_as_inner_word,
            emit_numeric: self.emit_numeric,
            emit_alpha: self.emit_alpha,
            emit_alpha_numeric: self.emit_alpha_numeric,
            min_token_length: self.min_token_length,
            max_token_length: self.max_token_length,
        })
    }
}
