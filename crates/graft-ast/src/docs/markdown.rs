//! Markdown model of function documentation.
//!
//! In source, paragraphs are hard-wrapped and separated by blank lines. In the
//! model a paragraph is a single line and one line break separates paragraphs;
//! each further blank line is kept as an extra line break. Leading `ICON name`
//! lines are tags. Headings, list items, quotes, table rows and fenced code are
//! kept line by line.

use graft_syntax::SyntaxKind::{DOC_START, NEWLINE, TEXT_SECTION};

use super::DocLine;
use crate::Token;
use crate::node::NodeChild;

const TAG_PREFIX: &str = "ICON ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Blank,
    Paragraph,
    Heading,
    /// List items, quotes and table rows. Paragraph lines directly below one
    /// continue it.
    Container,
    Fence,
}

fn classify(line: &str) -> Line {
    let line = line.trim_start();
    if line.is_empty() {
        Line::Blank
    } else if line.starts_with("```") || line.starts_with("~~~") {
        Line::Fence
    } else if line.starts_with('#') {
        Line::Heading
    } else if line.starts_with(['|', '>']) || is_list_item(line) {
        Line::Container
    } else {
        Line::Paragraph
    }
}

fn is_list_item(line: &str) -> bool {
    if let Some(rest) = line.strip_prefix(['-', '*', '+']) {
        return rest.is_empty() || rest.starts_with(' ');
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && matches!(&line.as_bytes()[digits..], [b'.' | b')'] | [b'.' | b')', b' ', ..])
}

struct Block {
    kind: Line,
    /// Blank source lines before the block.
    gap: usize,
    lines: Vec<String>,
}

/// Reads the model out of the comment's text sections.
pub(crate) fn abstract_markdown(elements: &[NodeChild<Token>]) -> String {
    let mut tags = Vec::new();
    let mut reading_tags = true;
    let mut raw = String::new();

    for (i, element) in elements.iter().enumerate() {
        if element.node.is_newline() {
            if !reading_tags {
                raw.push('\n');
            }
            continue;
        }
        let code = if i == 0 { element.node.code().trim_start() } else { element.node.code() };
        if reading_tags {
            if code.starts_with(TAG_PREFIX) {
                tags.push(code);
                continue;
            }
            reading_tags = false;
        }
        raw.push_str(code);
    }

    let normalized = normalize(&raw);
    if !normalized.is_empty() {
        tags.push(&normalized);
    }
    tags.join("\n")
}

fn normalize(raw: &str) -> String {
    let mut blocks: Vec<Block> = Vec::new();
    let mut gap = 0;
    let mut lines = raw.split('\n');

    while let Some(line) = lines.next() {
        let kind = classify(line);
        match (kind, blocks.last_mut()) {
            (Line::Blank, _) => {
                gap += 1;
                continue;
            }
            (Line::Fence, _) => {
                let mut fence = vec![line.to_owned()];
                for line in lines.by_ref() {
                    fence.push(line.to_owned());
                    if classify(line) == Line::Fence {
                        break;
                    }
                }
                blocks.push(Block { kind, gap, lines: fence });
            }
            (Line::Paragraph, Some(last)) if gap == 0 && last.kind == Line::Paragraph => {
                let joined = &mut last.lines[0];
                joined.push(' ');
                joined.push_str(line.trim());
            }
            (Line::Paragraph, Some(last)) if gap == 0 && last.kind == Line::Container => {
                last.lines.push(line.to_owned());
            }
            (Line::Paragraph, _) => {
                blocks.push(Block { kind, gap, lines: vec![line.trim().to_owned()] });
            }
            _ => blocks.push(Block { kind, gap, lines: vec![line.to_owned()] }),
        }
        gap = 0;
    }

    let mut out = String::new();
    let mut prev = None;
    for block in &blocks {
        if let Some(prev) = prev {
            let breaks = match (prev, block.kind) {
                (Line::Paragraph | Line::Heading, Line::Paragraph) if block.gap > 0 => block.gap,
                _ => block.gap + 1,
            };
            out.extend(std::iter::repeat_n('\n', breaks));
        }
        out.push_str(&block.lines.join("\n"));
        prev = Some(block.kind);
    }
    out
}

struct DocTokens {
    indent: String,
    elements: Vec<NodeChild<Token>>,
}

impl DocTokens {
    fn text(&mut self, text: &str) {
        let whitespace = if self.elements.is_empty() { " " } else { self.indent.as_str() };
        self.elements.push(NodeChild::new(Some(whitespace.to_owned()), Token::new(TEXT_SECTION, text)));
    }

    fn newlines(&mut self, count: usize) {
        for _ in 0..count {
            self.elements.push(NodeChild::unspaced(Token::new(NEWLINE, "\n")));
        }
    }
}

/// Renders the model as a comment whose continuation lines start with
/// `indent`.
pub(crate) fn markdown_to_doc_line(markdown: &str, indent: &str) -> DocLine {
    let mut tokens = DocTokens { indent: indent.to_owned(), elements: Vec::new() };
    let mut prev: Option<Line> = None;
    let mut reading_tags = true;
    let mut in_fence = false;
    let mut pending = 0;

    for (i, line) in markdown.split('\n').enumerate() {
        if i > 0 {
            pending += 1;
        }

        if in_fence {
            tokens.newlines(pending);
            pending = 0;
            if !line.is_empty() {
                tokens.text(line);
            }
            if classify(line) == Line::Fence {
                in_fence = false;
                prev = Some(Line::Fence);
            }
            continue;
        }

        if reading_tags && line.starts_with(TAG_PREFIX) {
            tokens.newlines(pending.min(1));
            pending = 0;
            tokens.text(line);
            continue;
        }
        reading_tags = false;

        let kind = classify(line);
        if kind == Line::Blank {
            continue;
        }

        let breaks = match (prev, kind) {
            (None, _) => pending.min(1),
            (Some(Line::Paragraph | Line::Heading), Line::Paragraph) => pending + 1,
            _ => pending,
        };
        tokens.newlines(breaks);
        pending = 0;
        tokens.text(line);

        let continues_container = prev == Some(Line::Container) && kind == Line::Paragraph && breaks == 1;
        if !continues_container {
            prev = Some(kind);
        }
        in_fence = kind == Line::Fence;
    }

    DocLine {
        open: NodeChild::unspaced(Token::new(DOC_START, "##")),
        elements: tokens.elements,
        newlines: vec![NodeChild::unspaced(Token::new(NEWLINE, "\n"))],
    }
}
