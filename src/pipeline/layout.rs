//! Text layout: paragraphs → wrapped lines → positioned lines on pages.
//!
//! Layout is a pure function of the letter text and the [`PageSetup`], kept
//! apart from PDF serialisation so the structure of a rendered letter
//! (paragraph order, line widths, page breaks) can be asserted directly.
//!
//! Lines are measured with the Adobe metrics of Times-Roman, the builtin font
//! the renderer uses, so a wrapped line never runs into the right margin. An
//! optional column cap applies on top of the width limit. Characters the
//! font's WinAnsi encoding cannot show are replaced with `?` and logged.

use crate::config::PageSetup;
use tracing::warn;

/// Advance widths of Times-Roman for ASCII 0x20..=0x7E, in 1/1000 em.
/// Index = (char as usize) - 32.
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // sp ! " # $ % & ' ( ) * + , - . /
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // 0-9
    278, 278, 564, 564, 564, 444, 921, // : ; < = > ? @
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, // A-M
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, // N-Z
    333, 278, 333, 469, 500, 333, // [ \ ] ^ _ `
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, // a-m
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, // n-z
    480, 200, 480, 541, // { | } ~
];

/// Width used for characters outside the table.
const FALLBACK_WIDTH: u16 = 500;

/// Shown in place of characters the builtin font cannot encode.
const REPLACEMENT_CHAR: char = '?';

/// Non-Latin-1 characters present in WinAnsiEncoding (0x80..=0x9F).
const WINANSI_EXTRAS: [char; 27] = [
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•', '–',
    '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Whether the builtin Times-Roman can show `c`.
pub fn is_encodable(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WINANSI_EXTRAS.contains(&c)
}

/// Rendered width of `text` in points at `font_size_pt`.
pub fn measure(text: &str, font_size_pt: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as usize;
            if (32..=126).contains(&code) {
                TIMES_ROMAN_WIDTHS[code - 32] as u32
            } else {
                FALLBACK_WIDTH as u32
            }
        })
        .sum();
    units as f32 * font_size_pt / 1000.0
}

/// One line of text at its final position. Coordinates are PDF points with
/// the origin at the bottom-left corner; `y_pt` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_pt: f32,
    pub y_pt: f32,
    /// 0-based index of the paragraph this line belongs to.
    pub paragraph: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub pages: Vec<LaidOutPage>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }

    /// Paragraph blocks in document order, each as its lines joined by `\n`.
    pub fn paragraphs(&self) -> Vec<String> {
        let mut out: Vec<(usize, String)> = Vec::new();
        for line in self.lines() {
            match out.last_mut() {
                Some((idx, text)) if *idx == line.paragraph => {
                    text.push('\n');
                    text.push_str(&line.text);
                }
                _ => out.push((line.paragraph, line.text.clone())),
            }
        }
        out.into_iter().map(|(_, text)| text).collect()
    }
}

/// Lay out `text` on as many pages as it needs.
pub fn layout_letter(text: &str, setup: &PageSetup) -> LaidOutDocument {
    let top = setup.height_pt - setup.margin_pt;
    let bottom = setup.margin_pt;

    let mut pages = vec![LaidOutPage::default()];
    let mut y = top;
    let mut at_page_top = true;

    for (idx, paragraph) in split_paragraphs(text).iter().enumerate() {
        if !at_page_top {
            y -= setup.paragraph_spacing_pt;
        }
        for hard_line in paragraph {
            for line in wrap_line(hard_line, setup) {
                if y < bottom {
                    pages.push(LaidOutPage::default());
                    y = top;
                }
                if let Some(page) = pages.last_mut() {
                    page.lines.push(PlacedLine {
                        text: line,
                        x_pt: setup.margin_pt,
                        y_pt: y,
                        paragraph: idx,
                    });
                }
                y -= setup.line_height_pt;
                at_page_top = false;
            }
        }
    }

    LaidOutDocument { pages }
}

/// Split on blank lines. Each paragraph keeps its explicit line breaks so a
/// sign-off like "Best regards,\nJane" stays on two lines.
pub fn split_paragraphs(text: &str) -> Vec<Vec<String>> {
    let text = normalise_typography(&text.replace("\r\n", "\n").replace('\r', "\n"));
    let (text, replaced) = replace_unencodable(&text);
    if replaced > 0 {
        warn!(
            "Replaced {} character(s) the PDF font cannot show with '{}'",
            replaced, REPLACEMENT_CHAR
        );
    }
    let mut paragraphs = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Greedy word wrap of one hard line to the usable width and column cap.
/// Words that cannot fit on a line by themselves are broken.
pub fn wrap_line(line: &str, setup: &PageSetup) -> Vec<String> {
    let fits = |s: &str| {
        measure(s, setup.font_size_pt) <= setup.usable_width_pt()
            && setup.max_columns.is_none_or(|cols| s.chars().count() <= cols)
    };

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if fits(word) {
            current = word.to_string();
        } else {
            for ch in word.chars() {
                current.push(ch);
                if !fits(&current) {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Map typographic punctuation to the ASCII forms every builtin PDF font
/// can show. Other characters pass through.
fn normalise_typography(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => "'".to_string(),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => "\"".to_string(),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => "-".to_string(),
            '\u{2026}' => "...".to_string(),
            '\u{00A0}' | '\u{2009}' | '\u{202F}' => " ".to_string(),
            '\u{2022}' => "*".to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// Swap unencodable characters for [`REPLACEMENT_CHAR`]. Whitespace is kept
/// for the paragraph and word splitting that follows.
fn replace_unencodable(text: &str) -> (String, usize) {
    let mut replaced = 0;
    let out = text
        .chars()
        .map(|c| {
            if c.is_whitespace() || is_encodable(c) {
                c
            } else {
                replaced += 1;
                REPLACEMENT_CHAR
            }
        })
        .collect();
    (out, replaced)
}
