// Copyright (c) 2025 Ismael Theiskaa
// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Utilities for text wrapping.

use std::str::SplitWhitespace;

use scraper::{ElementRef, Html, Node};

use crate::Mm;

/// A line produced by [`wrap`](fn.wrap.html).
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// The text of the line, with single spaces between words.
    pub text: String,
    /// The horizontal offset of the line inside the text box.
    pub indent: Mm,
    /// True for the last line of a paragraph, which is never justified.
    pub ends_paragraph: bool,
}

/// Combines the words of a paragraph into lines with a maximum width.
///
/// The first line may be narrower than the others to make room for an indentation.  A word
/// that does not fit on a line of its own is split between characters, so every call to `next`
/// makes progress even if the width is smaller than a single character.
pub struct Wrapper<'s, F: Fn(&str) -> Mm> {
    words: SplitWhitespace<'s>,
    measure: F,
    first_width: Mm,
    width: Mm,
    pending: Option<String>,
    lines: usize,
}

impl<'s, F: Fn(&str) -> Mm> Wrapper<'s, F> {
    /// Creates a new wrapper for the words of `paragraph`.
    pub fn new(paragraph: &'s str, measure: F, first_width: Mm, width: Mm) -> Wrapper<'s, F> {
        Wrapper {
            words: paragraph.split_whitespace(),
            measure,
            first_width,
            width,
            pending: None,
            lines: 0,
        }
    }

    fn fits(&self, s: &str, width: Mm) -> bool {
        (self.measure)(s).0 <= width.0 + 1e-4
    }

    /// Splits a word into the longest prefix that fits into `width` (at least one character)
    /// and the remainder.
    fn split_word(&self, word: &str, width: Mm) -> (String, String) {
        let mut end = word.chars().next().map(char::len_utf8).unwrap_or(0);
        for (idx, c) in word.char_indices().skip(1) {
            let next = idx + c.len_utf8();
            if !self.fits(&word[..next], width) {
                break;
            }
            end = next;
        }
        (word[..end].to_owned(), word[end..].to_owned())
    }
}

impl<'s, F: Fn(&str) -> Mm> Iterator for Wrapper<'s, F> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let width = if self.lines == 0 {
            self.first_width
        } else {
            self.width
        };
        let mut line = String::new();

        loop {
            let word = match self.pending.take() {
                Some(word) => word,
                None => match self.words.next() {
                    Some(word) => word.to_owned(),
                    None => break,
                },
            };

            if line.is_empty() {
                if self.fits(&word, width) {
                    line = word;
                } else {
                    let (head, tail) = self.split_word(&word, width);
                    line = head;
                    if !tail.is_empty() {
                        self.pending = Some(tail);
                    }
                    break;
                }
            } else {
                let candidate = format!("{} {}", line, word);
                if self.fits(&candidate, width) {
                    line = candidate;
                } else {
                    self.pending = Some(word);
                    break;
                }
            }
        }

        if line.is_empty() {
            None
        } else {
            self.lines += 1;
            Some(line)
        }
    }
}

/// Breaks text into lines no wider than `width`.
///
/// `\n` starts a new paragraph; an empty paragraph yields an empty line, so empty text still
/// produces one line.  The first line is shortened by `indent`.
pub fn wrap<F: Fn(&str) -> Mm>(text: &str, width: Mm, indent: Mm, measure: F) -> Vec<Line> {
    let mut result = Vec::new();
    for (i, paragraph) in text.split('\n').enumerate() {
        let paragraph = paragraph.trim_end_matches('\r');
        let first_indent = if i == 0 { indent } else { Mm(0.0) };
        let lines: Vec<String> =
            Wrapper::new(paragraph, &measure, width - first_indent, width).collect();

        if lines.is_empty() {
            result.push(Line {
                text: String::new(),
                indent: first_indent,
                ends_paragraph: true,
            });
            continue;
        }

        let count = lines.len();
        for (j, text) in lines.into_iter().enumerate() {
            result.push(Line {
                text,
                indent: if j == 0 { first_indent } else { Mm(0.0) },
                ends_paragraph: j + 1 == count,
            });
        }
    }
    result
}

/// Flattens an HTML fragment into plain text.
///
/// Tags are dropped; `<br>` and the end of block elements (paragraphs, divisions, list items,
/// table rows and headings) become line breaks.  Source whitespace is collapsed as a browser
/// would and character references are decoded by the HTML parser.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    flatten(fragment.root_element(), &mut out);

    let lines: Vec<String> = out
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    lines.join("\n").trim_matches('\n').to_owned()
}

fn flatten(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let content: &str = text.text.as_ref();
                out.extend(content.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(elem) => match elem.name() {
                "br" => out.push('\n'),
                "script" | "style" => {}
                name => {
                    if let Some(child) = ElementRef::wrap(child) {
                        flatten(child, out);
                    }
                    if is_block(name) {
                        out.push('\n');
                    }
                }
            },
            _ => {}
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div" | "li" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One millimeter per character.
    fn mono(s: &str) -> Mm {
        Mm(s.chars().count() as f32)
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap("aaaa bbbb cc dddd", Mm(9.0), Mm(0.0), mono);
        assert_eq!(texts(&lines), vec!["aaaa bbbb", "cc dddd"]);
        assert!(!lines[0].ends_paragraph);
        assert!(lines[1].ends_paragraph);
    }

    #[test]
    fn test_wrap_paragraphs_and_empty_text() {
        let lines = wrap("ab\n\ncd", Mm(10.0), Mm(0.0), mono);
        assert_eq!(texts(&lines), vec!["ab", "", "cd"]);
        assert_eq!(wrap("", Mm(10.0), Mm(0.0), mono).len(), 1);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap("abcdefghij", Mm(4.0), Mm(0.0), mono);
        assert_eq!(texts(&lines), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_makes_progress_on_tiny_width() {
        let lines = wrap("abc", Mm(0.1), Mm(0.0), mono);
        assert_eq!(texts(&lines), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_wrap_indent_only_on_first_line() {
        let lines = wrap("aaa bbb ccc", Mm(7.0), Mm(2.0), mono);
        assert_eq!(texts(&lines), vec!["aaa", "bbb ccc"]);
        assert_eq!(lines[0].indent, Mm(2.0));
        assert_eq!(lines[1].indent, Mm(0.0));
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(html_to_text("<b>Bold</b> &amp; <i>it</i>"), "Bold & it");
        assert_eq!(html_to_text("one<br/>two <p>three</p>four"), "one\ntwo three\nfour");
        assert_eq!(html_to_text("a\n   b &#65;&#x42;"), "a b AB");
        assert_eq!(html_to_text("1 < 2 & 3"), "1 < 2 & 3");
    }

    #[test]
    fn test_html_named_entities() {
        assert_eq!(
            html_to_text("caf&eacute; &mdash; 5&nbsp;&times;&nbsp;3 &hellip;"),
            "café — 5 × 3 …"
        );
        assert_eq!(html_to_text("&euro;&copy;&lt;&gt;&quot;&#39;"), "€©<>\"'");
    }

    #[test]
    fn test_html_blocks_and_scripts() {
        assert_eq!(
            html_to_text("<ul><li>one</li><li>two</li></ul><h2>Title</h2><script>x()</script>end"),
            "one\ntwo\nTitle\nend"
        );
        assert_eq!(html_to_text("<table><tr><td>a</td><td>b</td></tr></table>"), "ab");
    }
}
