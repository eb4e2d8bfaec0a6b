//! Markdown section-tree parser.
//!
//! Turns heading-delimited markdown into an ordered forest of [`Section`]s
//! with 1-based line spans. Tokenization is CommonMark via pulldown-cmark;
//! the tree is built from the flat heading stream with a stack of open
//! sections ordered by level.
//!
//! The parser never fails: empty input and heading-free input both yield an
//! empty forest, and preamble text before the first heading is dropped
//! (callers that need it read the raw document content).

use crate::model::Section;
use crate::parser::frontmatter;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Enable MyST-mode extensions (tables, strikethrough) during
    /// tokenization. Heading extraction itself is dialect-independent.
    pub myst: bool,
}

/// A heading observed in the token stream, before tree building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// 1-based line of the heading in the original input.
    pub line: usize,
}

/// Parse markdown into a forest of top-level sections.
pub fn parse(markdown: &str, options: ParseOptions) -> Vec<Section> {
    let (body, line_offset) = strip_frontmatter(markdown);
    let headings = scan_headings(body, options);
    if headings.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = body.lines().collect();
    let mut sections = Vec::with_capacity(headings.len());
    for (i, h) in headings.iter().enumerate() {
        // Body spans from the line after the heading to the line before the
        // next heading at any level, or end of input.
        let body_first = h.end_line; // 0-based index of the line after the heading
        let body_last = match headings.get(i + 1) {
            Some(next) => next.start_line.saturating_sub(1),
            None => lines.len(),
        };
        let span = &lines[body_first.min(lines.len())..body_last.max(body_first).min(lines.len())];
        let content = span.join("\n").trim().to_string();

        // line_end: last non-blank body line, or the heading line itself.
        let line_end = span
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map(|rel| body_first + rel + 1)
            .unwrap_or(h.end_line);

        sections.push(Section {
            title: h.text.clone(),
            level: h.level,
            content,
            line_start: h.start_line + line_offset,
            line_end: line_end + line_offset,
            subsections: Vec::new(),
        });
    }

    build_forest(sections)
}

/// Extract the flat heading list without building a tree.
pub fn extract_headings(markdown: &str) -> Vec<Heading> {
    let (body, line_offset) = strip_frontmatter(markdown);
    scan_headings(body, ParseOptions::default())
        .into_iter()
        .map(|h| Heading {
            level: h.level,
            text: h.text,
            line: h.start_line + line_offset,
        })
        .collect()
}

/// Heading with its full line span (setext headings occupy two lines).
struct RawHeading {
    level: u8,
    text: String,
    /// 1-based first line of the heading.
    start_line: usize,
    /// 1-based last line of the heading.
    end_line: usize,
}

fn scan_headings(body: &str, options: ParseOptions) -> Vec<RawHeading> {
    let mut opts = Options::empty();
    if options.myst {
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_STRIKETHROUGH);
    }

    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(body.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let line_of = |byte: usize| line_starts.partition_point(|&s| s <= byte);

    let mut headings = Vec::new();
    let mut current: Option<(u8, String, std::ops::Range<usize>)> = None;

    for (event, range) in Parser::new_ext(body, opts).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((level as u8, String::new(), range));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text, span)) = current.take() {
                    let start_line = line_of(span.start);
                    let end_line = line_of(span.end.saturating_sub(1).max(span.start));
                    headings.push(RawHeading {
                        level,
                        text: text.trim().to_string(),
                        start_line,
                        end_line,
                    });
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, text, _)) = current.as_mut() {
                    text.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, text, _)) = current.as_mut() {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }
    headings
}

/// Build the nesting from the flat section list.
///
/// Stack of open sections ordered by level: pop while top level ≥ new level
/// (closing siblings and uncles), then nest under the new top or push to the
/// root list.
fn build_forest(flat: Vec<Section>) -> Vec<Section> {
    let mut roots: Vec<Section> = Vec::new();
    // Index path into the forest under construction; avoids holding
    // overlapping &mut borrows of nested children.
    let mut stack: Vec<(u8, usize)> = Vec::new();

    for section in flat {
        while stack
            .last()
            .is_some_and(|&(level, _)| level >= section.level)
        {
            stack.pop();
        }
        let level = section.level;
        if stack.is_empty() {
            roots.push(section);
            stack.push((level, roots.len() - 1));
        } else {
            let parent = resolve_path(&mut roots, &stack);
            parent.subsections.push(section);
            stack.push((level, parent.subsections.len() - 1));
        }
    }
    roots
}

fn resolve_path<'a>(roots: &'a mut Vec<Section>, stack: &[(u8, usize)]) -> &'a mut Section {
    let mut node = &mut roots[stack[0].1];
    for &(_, idx) in &stack[1..] {
        node = &mut node.subsections[idx];
    }
    node
}

/// Skip a leading frontmatter block so its `---` delimiters cannot be
/// misread as setext-heading underlines. Returns the remaining body and the
/// number of lines skipped.
fn strip_frontmatter(input: &str) -> (&str, usize) {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let Some((_, consumed)) = frontmatter::split(input) else {
        return (input, 0);
    };
    let mut rest = input;
    for _ in 0..consumed {
        match rest.find('\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return ("", consumed),
        }
    }
    (rest, consumed)
}
