//! Lexical matchers that locate resource references inside raw text.
//!
//! Both matchers work on patterns rather than a structural parser. They sit behind
//! [`ReferenceMatcher`] so a real parser can replace either one without touching the rewrite
//! engine.

mod source;
mod stylesheet;

use std::ops::Range;

pub use source::SourceLiteralMatcher;
pub use stylesheet::StylesheetMatcher;

/// A reference located in a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatch {
  /// Byte range to replace; excludes any surrounding quotes.
  pub span: Range<usize>,
  /// Reference text as written inside the span.
  pub value: String,
}

/// Locates references that the rewrite engine should substitute.
pub trait ReferenceMatcher {
  /// Return the references found in `text`, ordered so that replacing them one after another
  /// never invalidates the spans that are still pending.
  fn find(&self, text: &str) -> Vec<ReferenceMatch>;
}
