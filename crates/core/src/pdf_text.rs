//! Positioned text extracted from PDF pages.
//!
//! pdfium reports every character with a bounding box in page space (points,
//! origin bottom-left). The helpers here turn that glyph soup into lines,
//! words and cells that the table and document converters lay out.

use pdfium_render::prelude::*;
use std::cmp::Ordering;

/// One character with its bounding box in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Glyph {
    pub fn new(ch: char, left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            ch,
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top - self.height
    }

    fn is_blank(&self) -> bool {
        self.ch.is_whitespace()
    }
}

/// Glyphs sharing a baseline, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    glyphs: Vec<Glyph>,
}

/// A run of text on one line, bounded by wide horizontal gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCell {
    pub left: f32,
    pub right: f32,
    pub text: String,
}

impl TextLine {
    fn new(mut glyphs: Vec<Glyph>) -> Self {
        glyphs.sort_by(|a, b| a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal));
        Self { glyphs }
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Highest glyph top on the line.
    pub fn top(&self) -> f32 {
        self.glyphs
            .iter()
            .map(|g| g.top)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Lowest glyph bottom on the line.
    pub fn bottom(&self) -> f32 {
        self.glyphs
            .iter()
            .map(|g| g.bottom())
            .fold(f32::INFINITY, f32::min)
    }

    /// Average height of the visible glyphs, a proxy for the font size.
    pub fn font_size(&self) -> f32 {
        let visible: Vec<f32> = self
            .glyphs
            .iter()
            .filter(|g| !g.is_blank() && g.height > 0.0)
            .map(|g| g.height)
            .collect();
        if visible.is_empty() {
            return 0.0;
        }
        visible.iter().sum::<f32>() / visible.len() as f32
    }

    /// Line text, inserting a space where glyphs are further apart than `word_gap`.
    pub fn text(&self, word_gap: f32) -> String {
        join_glyphs(&self.glyphs, word_gap)
    }

    /// Split the line wherever visible glyphs are at least `cell_gap` apart.
    pub fn cells(&self, cell_gap: f32, word_gap: f32) -> Vec<TextCell> {
        let mut groups: Vec<Vec<Glyph>> = Vec::new();
        let mut current: Vec<Glyph> = Vec::new();
        let mut prev_right: Option<f32> = None;

        for glyph in &self.glyphs {
            if !glyph.is_blank() {
                if let Some(right) = prev_right {
                    if glyph.left - right >= cell_gap && !current.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                }
                prev_right = Some(glyph.right());
            }
            current.push(*glyph);
        }
        if !current.is_empty() {
            groups.push(current);
        }

        groups
            .into_iter()
            .filter_map(|glyphs| {
                let visible: Vec<&Glyph> = glyphs.iter().filter(|g| !g.is_blank()).collect();
                let first = visible.first()?;
                let last = visible.last()?;
                Some(TextCell {
                    left: first.left,
                    right: last.right(),
                    text: join_glyphs(&glyphs, word_gap),
                })
            })
            .collect()
    }
}

fn join_glyphs(glyphs: &[Glyph], word_gap: f32) -> String {
    let mut text = String::new();
    let mut prev_right: Option<f32> = None;

    for glyph in glyphs {
        if glyph.is_blank() {
            if !text.is_empty() && !text.ends_with(' ') {
                text.push(' ');
            }
            continue;
        }
        if let Some(right) = prev_right {
            if glyph.left - right > word_gap && !text.ends_with(' ') {
                text.push(' ');
            }
        }
        text.push(glyph.ch);
        prev_right = Some(glyph.right());
    }

    text.trim_end().to_string()
}

/// Group glyphs into lines, top of the page first.
///
/// Glyphs whose tops are within `tolerance` of the first glyph of the current
/// line join that line.
pub fn group_into_lines(mut glyphs: Vec<Glyph>, tolerance: f32) -> Vec<TextLine> {
    glyphs.sort_by(|a, b| match b.top.partial_cmp(&a.top).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal),
        other => other,
    });

    let mut lines = Vec::new();
    let mut current: Vec<Glyph> = Vec::new();
    let mut current_top: Option<f32> = None;

    for glyph in glyphs {
        match current_top {
            Some(top) if (top - glyph.top).abs() <= tolerance => current.push(glyph),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::new(std::mem::take(&mut current)));
                }
                current_top = Some(glyph.top);
                current.push(glyph);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::new(current));
    }

    // Lines made only of whitespace carry no content.
    lines.retain(|line| line.glyphs.iter().any(|g| !g.is_blank()));
    lines
}

/// Map a character reported by pdfium to one that is legal in XML text.
///
/// pdfium reports a generated end-of-line hyphen as `U+0002`. Other control
/// characters except tab, newline and carriage return are dropped.
pub fn printable_char(ch: char) -> Option<char> {
    match ch {
        '\u{2}' => Some('-'),
        '\t' | '\n' | '\r' => Some(ch),
        c if c.is_control() => None,
        c => Some(c),
    }
}

/// Every printable character on `page` that has a unicode value and a
/// bounding box.
pub fn page_glyphs(page: &PdfPage) -> Vec<Glyph> {
    let text = match page.text() {
        Ok(text) => text,
        Err(_) => return Vec::new(),
    };

    let mut glyphs = Vec::new();
    for segment in text.segments().iter() {
        if let Ok(chars) = segment.chars() {
            for char_result in chars.iter() {
                if let Some(ch) = char_result.unicode_char().and_then(printable_char) {
                    if let Ok(bounds) = char_result.loose_bounds() {
                        glyphs.push(Glyph::new(
                            ch,
                            bounds.left().value,
                            bounds.top().value,
                            bounds.width().value,
                            bounds.height().value,
                        ));
                    }
                }
            }
        }
    }
    glyphs
}
