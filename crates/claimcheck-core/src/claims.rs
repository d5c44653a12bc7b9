//! Claim extraction.
//!
//! A claim is one sentence of the text under validation, or the whole text
//! when sentence splitting is disabled. Sentence boundaries come from the
//! Unicode text segmentation rules (UAX #29), with a small repair pass so
//! that honorifics and initials ("Dr.", "J.") do not end a claim.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    /// Title or Latin abbreviation that never ends a sentence.
    ///
    /// Case-sensitive: "Dr." before a name joins, "dr." does not.
    static ref TRAILING_TITLE: Regex = Regex::new(
        r"(?:^|[\s(])(?:Mr|Mrs|Ms|Dr|Prof|Rev|St|Capt|Lt|Col|Sgt|Gen|Sen|Rep|Gov|vs|e\.g|i\.e)\.$"
    ).unwrap();

    /// Uppercase initial that starts a segment or follows a capitalised
    /// word ("J.", "John F."). A letter after a lowercase word
    /// ("vitamin C.") ends the sentence.
    static ref TRAILING_INITIAL: Regex = Regex::new(
        r"(?:^|(?:^|[\s(])[A-Z][\w'-]*\.?\s+)[A-Z]\.$"
    ).unwrap();
}

/// A single unit of text to be fact-checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Position of the claim in the input (0-based)
    pub index: usize,

    /// The claim text, trimmed of surrounding whitespace
    pub text: String,

    /// Byte range of the claim within the original input
    pub span: Range<usize>,
}

impl Claim {
    /// Create a claim directly. Mostly useful in tests.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let span = 0..text.len();
        Self { index, text, span }
    }
}

/// Sentence-level claim splitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSplitter;

impl SentenceSplitter {
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into sentence claims, preserving input order.
    pub fn split(&self, text: &str) -> Vec<Claim> {
        let mut spans: Vec<Range<usize>> = Vec::new();
        let mut pending: Option<Range<usize>> = None;

        for (offset, segment) in text.split_sentence_bound_indices() {
            let trimmed = segment.trim();
            if trimmed.is_empty() {
                continue;
            }

            let start = offset + (segment.len() - segment.trim_start().len());
            let end = start + trimmed.len();
            let span = match pending.take() {
                Some(prev) => prev.start..end,
                None => start..end,
            };

            if ends_with_abbreviation(&text[span.clone()]) {
                pending = Some(span);
            } else {
                spans.push(span);
            }
        }

        if let Some(span) = pending {
            spans.push(span);
        }

        spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| Claim {
                index,
                text: text[span.clone()].to_string(),
                span,
            })
            .collect()
    }
}

/// Produce the claims for `text`.
///
/// With `split_sentences` off, the whole text is a single claim. Blank text
/// yields no claims at all.
pub fn split_claims(text: &str, split_sentences: bool) -> Vec<Claim> {
    if split_sentences {
        return SentenceSplitter::new().split(text);
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let start = text.len() - text.trim_start().len();
    let span = start..start + trimmed.len();
    vec![Claim {
        index: 0,
        text: trimmed.to_string(),
        span,
    }]
}

/// Join claims with single spaces, in the order given.
pub fn join_claims<'a>(claims: impl IntoIterator<Item = &'a Claim>) -> String {
    claims
        .into_iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compile the segmentation patterns now rather than on first use.
///
/// Safe to call any number of times.
pub fn warm_up() {
    lazy_static::initialize(&TRAILING_TITLE);
    lazy_static::initialize(&TRAILING_INITIAL);
}

fn ends_with_abbreviation(segment: &str) -> bool {
    TRAILING_TITLE.is_match(segment) || TRAILING_INITIAL.is_match(segment)
}
