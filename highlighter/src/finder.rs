use html_highlighter_dom::{Document, NodeId};
use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::range::{Range, XPathRange};
use crate::text_content::TextContent;

/// A lazy sequence of [`Range`]s matching a *subject*, over a
/// [`TextContent`]. "No more hits" is just `None`, which is what lets
/// [`HtmlHighlighter::add`](crate::HtmlHighlighter::add) drive any finder
/// with a plain `while let Some(range) = finder.next(...)`.
pub trait Finder {
    fn next(&mut self, doc: &Document, content: &TextContent, container: NodeId) -> Option<Range>;
}

/// What a [`TextFinder`] matches against the flat projection.
enum TextSubject {
    /// Case-insensitive literal substring match (ASCII case folding, so
    /// match offsets never drift from the flat projection's char indices).
    Literal(Vec<char>),
    Regex(Regex),
}

impl TextSubject {
    fn literal(needle: &str) -> Self {
        TextSubject::Literal(needle.chars().map(|c| c.to_ascii_lowercase()).collect())
    }
}

/// Finds non-overlapping matches of a literal string or a regular
/// expression over `content.text()`, left to right.
pub struct TextFinder<'a> {
    content: &'a TextContent,
    subject: TextSubject,
    haystack: String,
    haystack_lower: Vec<char>,
    char_pos: usize,
    byte_pos: usize,
}

impl<'a> TextFinder<'a> {
    pub fn literal(content: &'a TextContent, needle: &str) -> Self {
        Self::new(content, TextSubject::literal(needle))
    }

    pub fn regex(content: &'a TextContent, pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|err| Error::FinderConstruction(err.to_string()))?;
        Ok(Self::new(content, TextSubject::Regex(re)))
    }

    fn new(content: &'a TextContent, subject: TextSubject) -> Self {
        let haystack = content.text().to_string();
        let haystack_lower = haystack.chars().map(|c| c.to_ascii_lowercase()).collect();
        TextFinder {
            content,
            subject,
            haystack,
            haystack_lower,
            char_pos: 0,
            byte_pos: 0,
        }
    }

    /// Builds the [`Range`] covering the half-open char span
    /// `[start_char, end_char)` by binary-searching the marker list for
    /// each endpoint.
    fn build_range(&self, start_char: usize, end_char_exclusive: usize) -> Option<Range> {
        let start_abs = start_char as u32;
        let end_abs = (end_char_exclusive - 1) as u32;
        Range::from_absolute(self.content, start_abs, end_abs)
    }

    fn next_literal(&mut self, needle: &[char]) -> Option<Range> {
        if needle.is_empty() || self.char_pos + needle.len() > self.haystack_lower.len() {
            return None;
        }
        let hay = &self.haystack_lower;
        for start in self.char_pos..=hay.len() - needle.len() {
            if &hay[start..start + needle.len()] == needle {
                self.char_pos = start + needle.len();
                return self.build_range(start, start + needle.len());
            }
        }
        self.char_pos = hay.len();
        None
    }

    fn next_regex(&mut self) -> Option<Range> {
        let TextSubject::Regex(re) = &self.subject else {
            unreachable!("next_regex only called for TextSubject::Regex")
        };
        loop {
            let m = re.find_at(&self.haystack, self.byte_pos)?;
            let start_char = self.haystack[..m.start()].chars().count();
            let end_char = self.haystack[..m.end()].chars().count();
            self.byte_pos = if m.end() > m.start() { m.end() } else { m.end() + 1 };
            if end_char == start_char {
                // Zero-length match: skip it and keep advancing rather than
                // getting stuck at the same position forever.
                continue;
            }
            return self.build_range(start_char, end_char);
        }
    }

    fn advance(&mut self) -> Option<Range> {
        match &self.subject {
            TextSubject::Literal(needle) => {
                let needle = needle.clone();
                self.next_literal(&needle)
            }
            TextSubject::Regex(_) => self.next_regex(),
        }
    }
}

impl Finder for TextFinder<'_> {
    fn next(&mut self, _doc: &Document, _content: &TextContent, _container: NodeId) -> Option<Range> {
        self.advance()
    }
}

/// Yields exactly one [`Range`] (the resolved positions of a caller-supplied
/// XPath/offset pair), then nothing on subsequent calls. An explicit
/// two-state enum rather than a boolean flag plus an unconditional resolve
/// call, so a spent finder can't be accidentally re-resolved.
pub enum XpathFinder {
    Pending(XPathRange),
    Done,
}

impl XpathFinder {
    pub fn new(subject: XPathRange) -> Self {
        XpathFinder::Pending(subject)
    }
}

impl Finder for XpathFinder {
    fn next(&mut self, doc: &Document, content: &TextContent, container: NodeId) -> Option<Range> {
        match std::mem::replace(self, XpathFinder::Done) {
            XpathFinder::Pending(subject) => {
                let resolved = Range::resolve(doc, content, container, &subject);
                if resolved.is_none() {
                    let err = Error::UnresolvedXPath(subject.start.xpath.clone());
                    warn!(error = %err, end = %subject.end.xpath, "xpath range failed to resolve");
                }
                resolved
            }
            XpathFinder::Done => None,
        }
    }
}

/// What a caller hands to [`crate::HtmlHighlighter::add`]/`append` for a
/// single query: a closed enum rather than a runtime type test, so dispatch
/// to the right [`Finder`] is resolved statically and can't misclassify an
/// XPath descriptor pair as a string or vice versa.
#[derive(Debug, Clone)]
pub enum Subject {
    Literal(String),
    Regex(String),
    Xpath(XPathRange),
}

/// Constructs the right [`Finder`] for `subject`, returning a `Result` so a
/// construction failure (e.g. a malformed regex) can be logged and that
/// query skipped rather than aborting the whole batch.
pub fn make_finder<'a>(content: &'a TextContent, subject: &Subject) -> Result<Box<dyn Finder + 'a>> {
    match subject {
        Subject::Literal(needle) => Ok(Box::new(TextFinder::literal(content, needle))),
        Subject::Regex(pattern) => Ok(Box::new(TextFinder::regex(content, pattern)?)),
        Subject::Xpath(range) => Ok(Box::new(XpathFinder::new(range.clone()))),
    }
}
