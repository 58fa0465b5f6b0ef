//! Tokenizer Module
//!
//! The second stage of the analysis pipeline: it splits char-filtered text into
//! [`Token`]s with UTF-16 offsets and positions.
//!
//! ## What It Does
//!
//! Given filtered input like `"don't stop-me now 42"`, the standard tokenizer
//! emits:
//!
//! ```ignore
//! ("don't",   0..5,   0)
//! ("stop-me", 6..13,  1)
//! ("now",     14..17, 2)
//! ("42",      18..20, 3)
//! ```
//!
//! ## Clusters
//!
//! The unit of segmentation is a **cluster**: a base code point followed by
//! all of its combining marks (general category M*). A cluster is never split,
//! so `"a\u{0301}"` is always one two-unit piece and surrogate pairs cannot be
//! cut either. A mark with nothing to attach to (text-initial) is a boundary.
//!
//! Each cluster is classified by its base:
//!
//! - **alpha**: letters (L*)
//! - **numeric**: numbers (Nd, Nl, No)
//! - **connector**: apostrophes, hyphens and joiners, each only when enabled
//! - **boundary**: everything else
//!
//! A token is a maximal run of alpha/numeric clusters. A single connector
//! stays inside the run only when another word cluster follows it; a trailing
//! or doubled connector ends the token.
//!
//! ## Positions
//!
//! Positions start at 0 and grow by one per emitted token. Runs dropped by the
//! class flags or the length bounds reserve no position. After a token at
//! `u32::MAX`, emission stops.

use std::io::Read;
use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

use sift_types::{Position, Token, TokenizerOptions};

use super::unicode;
use crate::error::AnalysisError;

/// Splits text into tokens.
///
/// Implementations must be stateless and safe to share across threads.
pub trait Tokenizer: Send + Sync {
    /// Tokenizes `text`, offsets relative to `text`.
    fn tokenize(&self, text: &str, options: &TokenizerOptions) -> Vec<Token>;

    /// Stable identifier, used by configs and pipeline fingerprints.
    fn name(&self) -> &'static str;

    /// Null-aware form of [`tokenize`](Self::tokenize). `None` yields no tokens.
    fn tokenize_opt(&self, text: Option<&str>, options: &TokenizerOptions) -> Vec<Token> {
        match text {
            Some(text) => self.tokenize(text, options),
            None => Vec::new(),
        }
    }

    /// Drains `reader` into memory and tokenizes the result.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::Io`] if reading fails or the input is not valid UTF-8.
    fn tokenize_reader(
        &self,
        reader: &mut dyn Read,
        options: &TokenizerOptions,
    ) -> Result<Vec<Token>, AnalysisError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Ok(self.tokenize(&buf, options))
    }
}

/// Cluster-based word tokenizer.
///
/// # Example
///
/// ```
/// use sift_core::analyzer::tokenizer::StandardTokenizer;
/// use sift_types::TokenizerOptions;
///
/// let mut terms = Vec::new();
/// StandardTokenizer.for_each_token("state-of-the-art", &TokenizerOptions::standard(), |t| {
///     terms.push(t.term().to_owned());
/// });
/// assert_eq!(terms, ["state-of-the-art"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTokenizer;

impl StandardTokenizer {
    /// Name reported by [`Tokenizer::name`].
    pub const NAME: &'static str = "standard";

    /// Streams tokens of `text` into `emit`, left to right.
    pub fn for_each_token<F>(&self, text: &str, options: &TokenizerOptions, emit: F)
    where
        F: FnMut(Token),
    {
        let mut out = Emitter::new(options, emit);
        let mut run: Option<Run> = None;
        let mut pending_connector = false;

        for cluster in Clusters::new(text) {
            match classify(cluster.base, options) {
                kind @ (Kind::Alpha | Kind::Numeric) => match run.as_mut() {
                    Some(r) => r.extend(&cluster, kind),
                    None => run = Some(Run::start(&cluster, kind)),
                },
                Kind::Connector if run.is_some() && !pending_connector => {
                    pending_connector = true;
                    continue;
                }
                Kind::Connector | Kind::Boundary => {
                    if let Some(r) = run.take() {
                        out.flush(text, r);
                        if out.exhausted {
                            return;
                        }
                    }
                }
            }
            pending_connector = false;
        }

        if let Some(r) = run {
            out.flush(text, r);
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str, options: &TokenizerOptions) -> Vec<Token> {
        let mut tokens = Vec::new();
        self.for_each_token(text, options, |t| tokens.push(t));
        tokens
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Alpha,
    Numeric,
    Connector,
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunClass {
    Alpha,
    Numeric,
    AlphaNumeric,
}

#[inline(always)]
fn classify(c: char, options: &TokenizerOptions) -> Kind {
    if c.is_ascii() {
        return match c {
            'a'..='z' | 'A'..='Z' => Kind::Alpha,
            '0'..='9' => Kind::Numeric,
            '\'' if options.keep_apostrophes() => Kind::Connector,
            '-' if options.keep_hyphens() => Kind::Connector,
            _ => Kind::Boundary,
        };
    }

    if unicode::is_mark(c) {
        // Only reachable for a mark with no base.
        return Kind::Boundary;
    }
    if unicode::is_alphabetic(c) {
        return Kind::Alpha;
    }
    if unicode::is_numeric(c) {
        return Kind::Numeric;
    }

    match c {
        '\u{2019}' if options.keep_apostrophes() => Kind::Connector,
        '\u{2010}' | '\u{2011}' if options.keep_hyphens() => Kind::Connector,
        c if unicode::is_joiner(c) && options.treat_joiner_as_inner_word() => Kind::Connector,
        _ => Kind::Boundary,
    }
}

/// A base code point and its trailing marks.
#[derive(Debug)]
struct Cluster {
    base: char,
    bytes: Range<usize>,
    units: Range<usize>,
}

struct Clusters<'t> {
    chars: Peekable<CharIndices<'t>>,
    units: usize,
}

impl<'t> Clusters<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            units: 0,
        }
    }
}

impl Iterator for Clusters<'_> {
    type Item = Cluster;

    fn next(&mut self) -> Option<Cluster> {
        let (start, base) = self.chars.next()?;
        let unit_start = self.units;
        let mut end = start + base.len_utf8();
        self.units += base.len_utf16();

        while let Some(&(i, c)) = self.chars.peek() {
            if !unicode::is_mark(c) {
                break;
            }
            self.chars.next();
            end = i + c.len_utf8();
            self.units += c.len_utf16();
        }

        Some(Cluster {
            base,
            bytes: start..end,
            units: unit_start..self.units,
        })
    }
}

/// A candidate token under construction.
#[derive(Debug)]
struct Run {
    bytes: Range<usize>,
    units: Range<usize>,
    alpha: bool,
    numeric: bool,
}

impl Run {
    fn start(cluster: &Cluster, kind: Kind) -> Self {
        Self {
            bytes: cluster.bytes.clone(),
            units: cluster.units.clone(),
            alpha: kind == Kind::Alpha,
            numeric: kind == Kind::Numeric,
        }
    }

    /// Extends the run through `cluster`, swallowing any connector in between.
    fn extend(&mut self, cluster: &Cluster, kind: Kind) {
        self.bytes.end = cluster.bytes.end;
        self.units.end = cluster.units.end;
        self.alpha |= kind == Kind::Alpha;
        self.numeric |= kind == Kind::Numeric;
    }

    fn class(&self) -> RunClass {
        match (self.alpha, self.numeric) {
            (true, true) => RunClass::AlphaNumeric,
            (false, true) => RunClass::Numeric,
            _ => RunClass::Alpha,
        }
    }
}

struct Emitter<'o, F> {
    options: &'o TokenizerOptions,
    position: Position,
    exhausted: bool,
    emit: F,
}

impl<'o, F: FnMut(Token)> Emitter<'o, F> {
    fn new(options: &'o TokenizerOptions, emit: F) -> Self {
        Self {
            options,
            position: 0,
            exhausted: false,
            emit,
        }
    }

    fn flush(&mut self, text: &str, run: Run) {
        let wanted = match run.class() {
            RunClass::Alpha => self.options.emit_alpha(),
            RunClass::Numeric => self.options.emit_numeric(),
            RunClass::AlphaNumeric => self.options.emit_alpha_numeric(),
        };
        if !wanted || !self.options.accepts_length(run.units.len()) {
            return;
        }

        let token = Token::new(
            &text[run.bytes],
            run.units.start,
            run.units.end,
            self.position,
        );
        debug_assert!(token.is_ok(), "tokenizer built an invalid token: {token:?}");
        let Ok(token) = token else {
            return;
        };

        (self.emit)(token);
        match self.position.checked_add(1) {
            Some(next) => self.position = next,
            None => self.exhausted = true,
        }
    }
}
