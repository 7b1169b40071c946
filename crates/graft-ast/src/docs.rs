//! Documentation comments attached to statements.
//!
//! The text a consumer edits is a model of the comment, not its source form.
//! Alongside the model, a statement keeps the comment tokens it was parsed
//! from and a hash of the model at parse time; as long as the model is
//! unchanged the parsed tokens are printed byte for byte.

mod markdown;

use graft_syntax::SyntaxKind::{DOC_START, NEWLINE, TEXT_SECTION};
use xxhash_rust::xxh3::xxh3_128;

use crate::concrete::{ConcreteChild, Element, ensure_unspaced, first_child, prefer_unspaced};
use crate::node::NodeChild;
use crate::shared::{LocalText, SharedText as _};
use crate::{SyncConfig, Token};

pub(crate) use markdown::{abstract_markdown, markdown_to_doc_line};

/// Concrete tokens of a `##` comment.
#[derive(Debug, Clone, PartialEq)]
pub struct DocLine {
    pub open: NodeChild<Token>,
    /// Text sections and the line breaks between them.
    pub elements: Vec<NodeChild<Token>>,
    /// Line breaks between the comment and the documented statement.
    pub newlines: Vec<NodeChild<Token>>,
}

impl DocLine {
    /// Comment tokens for `text`. Continuation lines of Markdown are written
    /// at `indent`.
    pub fn from_text(text: &str, format: DocFormat, indent: &str) -> Self {
        match format {
            DocFormat::Plain => text_to_doc_line(text),
            DocFormat::Markdown => markdown_to_doc_line(text, indent),
        }
    }

    pub fn to_text(&self, format: DocFormat) -> String {
        match format {
            DocFormat::Plain => doc_line_to_text(self),
            DocFormat::Markdown => abstract_markdown(&self.elements),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    /// The comment text as written, minus the space after `##`.
    Plain,
    /// Markdown with hard wrapping and tags normalized away.
    Markdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Documentation {
    format: DocFormat,
    parsed: Option<DocLine>,
    hash: Option<u128>,
    text: LocalText,
}

pub(crate) fn content_hash(text: &str) -> u128 {
    xxh3_128(text.as_bytes())
}

impl Documentation {
    pub fn empty(format: DocFormat) -> Self {
        Self { format, parsed: None, hash: None, text: LocalText::default() }
    }

    pub(crate) fn parsed(format: DocFormat, doc_line: DocLine) -> Self {
        let text = doc_line.to_text(format);
        Self {
            format,
            hash: Some(content_hash(&text)),
            parsed: Some(doc_line),
            text: LocalText::new(text),
        }
    }

    pub fn format(&self) -> DocFormat {
        self.format
    }

    pub fn text(&self) -> &LocalText {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut LocalText {
        &mut self.text
    }

    pub fn doc_line(&self) -> Option<&DocLine> {
        self.parsed.as_ref()
    }

    fn is_unchanged(&self) -> bool {
        self.hash.is_some_and(|hash| content_hash(self.text.as_str()) == hash)
    }

    /// Appends the comment tokens, if any, and reports whether it did.
    pub(crate) fn push_concrete(
        &self,
        indent: Option<&str>,
        config: &SyncConfig,
        out: &mut Vec<ConcreteChild>,
    ) -> bool {
        let indent = indent.unwrap_or("");
        if let Some(parsed) = self.parsed.as_ref().filter(|_| self.is_unchanged()) {
            out.extend(doc_line_to_concrete(parsed, indent));
            return true;
        }

        let text = self.text.as_str();
        if text.is_empty() {
            return false;
        }
        let doc_line = DocLine::from_text(text, self.format, &format!("{indent}{}", config.doc_indent));
        out.extend(doc_line_to_concrete(&doc_line, indent));
        true
    }

    pub(crate) fn set(&mut self, text: &str) {
        if self.text.as_str() != text {
            self.text.set(text);
        }
    }
}

/// Text sections keep the whitespace they were parsed with; sections without
/// whitespace are aligned with the text of the first line.
pub(crate) fn doc_line_to_concrete(doc_line: &DocLine, indent: &str) -> Vec<ConcreteChild> {
    let mut out = vec![first_child(&doc_line.open)];
    let mut prev_is_newline = None;
    let mut extra_indent = String::new();

    for element in &doc_line.elements {
        let is_newline = element.node.is_newline();
        if is_newline {
            out.push(ensure_unspaced(element, false));
        } else {
            let whitespace = match (element.whitespace(), prev_is_newline) {
                (Some(ws), _) => ws.to_owned(),
                (None, Some(true)) => format!("{indent}{extra_indent}"),
                (None, _) => String::new(),
            };
            if prev_is_newline.is_none() {
                extra_indent = format!("  {whitespace}");
            }
            out.push(ConcreteChild::new(whitespace, Element::Token(element.node.clone())));
        }
        prev_is_newline = Some(is_newline);
    }

    out.extend(doc_line.newlines.iter().map(prefer_unspaced));
    out
}

/// Reads a plain comment back: the lines of the comment, without the single
/// space conventionally written after `##`.
pub(crate) fn doc_line_to_text(doc_line: &DocLine) -> String {
    let mut text = String::new();
    for (i, element) in doc_line.elements.iter().enumerate() {
        if element.node.is_newline() {
            text.push('\n');
            continue;
        }
        if i == 0 {
            text.push_str(element.whitespace().unwrap_or(""));
        }
        text.push_str(element.node.code());
    }
    match text.strip_prefix(' ') {
        Some(stripped) => stripped.to_owned(),
        None => text,
    }
}

/// The first line is split the way the tokenizer splits it, so that a printed
/// comment parses back into the same tokens.
pub(crate) fn text_to_doc_line(text: &str) -> DocLine {
    let mut lines = text.split('\n');
    let mut elements = Vec::new();

    let first = format!(" {}", lines.next().unwrap_or(""));
    let code = first.trim_start_matches(' ');
    if code.is_empty() {
        elements.push(NodeChild::unspaced(Token::new(TEXT_SECTION, &first)));
    } else {
        let leading = &first[..first.len() - code.len()];
        elements.push(NodeChild::new(Some(leading.to_owned()), Token::new(TEXT_SECTION, code)));
    }

    for line in lines {
        elements.push(NodeChild::unspaced(Token::new(NEWLINE, "\n")));
        if !line.is_empty() {
            elements.push(NodeChild::autospaced(Token::new(TEXT_SECTION, line)));
        }
    }

    DocLine {
        open: NodeChild::unspaced(Token::new(DOC_START, "##")),
        elements,
        newlines: vec![NodeChild::unspaced(Token::new(NEWLINE, "\n"))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(doc_line: &DocLine, indent: &str) -> String {
        doc_line_to_concrete(doc_line, indent)
            .into_iter()
            .map(|child| match child.element {
                Element::Token(token) => format!("{}{}", child.whitespace, token.code()),
                Element::Node(_) => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn plain_text_round_trip() {
        for text in ["Some docs", "two\nlines", "gap\n\nbetween", "  indented"] {
            let doc_line = text_to_doc_line(text);
            assert_eq!(doc_line_to_text(&doc_line), text);
        }
    }

    #[test]
    fn plain_text_rendering() {
        assert_eq!(render(&text_to_doc_line("Some docs"), ""), "## Some docs\n");
        assert_eq!(render(&text_to_doc_line("first\nsecond"), "    "), "## first\n       second\n");
    }

    #[test]
    fn unchanged_text_reuses_parsed_tokens() {
        let doc_line = DocLine {
            open: NodeChild::unspaced(Token::new(DOC_START, "##")),
            elements: vec![NodeChild::new(Some("   ".to_owned()), Token::new(TEXT_SECTION, "Wide"))],
            newlines: vec![NodeChild::unspaced(Token::new(NEWLINE, "\n"))],
        };
        let mut doc = Documentation::parsed(DocFormat::Plain, doc_line);
        assert_eq!(doc.text().as_str(), "  Wide");

        let print = |doc: &Documentation| {
            let mut out = Vec::new();
            doc.push_concrete(None, &SyncConfig::default(), &mut out);
            out.into_iter()
                .map(|child| match child.element {
                    Element::Token(token) => format!("{}{}", child.whitespace, token.code()),
                    Element::Node(_) => unreachable!(),
                })
                .collect::<String>()
        };
        assert_eq!(print(&doc), "##   Wide\n");

        doc.set("Narrow");
        assert_eq!(print(&doc), "## Narrow\n");

        doc.set("  Wide");
        assert_eq!(print(&doc), "##   Wide\n");

        doc.set("");
        assert_eq!(print(&doc), "");
    }
}
