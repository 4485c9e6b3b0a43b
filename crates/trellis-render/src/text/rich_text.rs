//! Tokenizer for lightly tagged text.
//!
//! Tagged text is plain UTF-8 with a handful of inline tags:
//!
//! - `<b>` and `<i>` switch on bold or italic until the matching close tag
//! - `</...>` (any closing tag) restores the style active before the last
//!   opening tag
//! - `<color="#RRGGBB">` sets the text color, `<color="default">` restores
//!   the default; the quotes are optional
//!
//! Unknown tags are dropped. An unterminated tag ends the text.

use crate::types::Color;

/// One element of tagged text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextToken<'a> {
    /// Plain text without tags or line breaks.
    Run(&'a str),
    /// A line break.
    Newline,
    /// `<b>`.
    Bold,
    /// `<i>`.
    Italic,
    /// Any closing tag.
    Close,
    /// A color tag; `None` selects the default color.
    Color(Option<Color>),
}

/// Iterator over the [`TextToken`]s of a string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

/// Split tagged text into tokens.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = TextToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.rest.is_empty() {
                return None;
            }

            if let Some(after) = self.rest.strip_prefix('\n') {
                self.rest = after;
                return Some(TextToken::Newline);
            }

            if let Some(after) = self.rest.strip_prefix('<') {
                let Some(end) = after.find('>') else {
                    self.rest = "";
                    return None;
                };
                let tag = &after[..end];
                self.rest = &after[end + 1..];
                match parse_tag(tag) {
                    Some(token) => return Some(token),
                    None => continue,
                }
            }

            let end = self.rest.find(['<', '\n']).unwrap_or(self.rest.len());
            let (run, rest) = self.rest.split_at(end);
            self.rest = rest;
            return Some(TextToken::Run(run));
        }
    }
}

fn parse_tag(tag: &str) -> Option<TextToken<'static>> {
    let tag = tag.trim();
    if tag.starts_with('/') {
        return Some(TextToken::Close);
    }
    match tag {
        "b" => return Some(TextToken::Bold),
        "i" => return Some(TextToken::Italic),
        _ => {}
    }

    let value = tag.strip_prefix("color=")?.trim_matches('"');
    if value == "default" {
        return Some(TextToken::Color(None));
    }
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    Color::from_hex(hex).map(|c| TextToken::Color(Some(c)))
}

/// Active style while walking tagged text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
}

/// Style and color state driven by [`TextToken`]s.
#[derive(Debug, Clone)]
pub struct StyleState {
    style: TextStyle,
    stack: Vec<TextStyle>,
    color: Color,
    default_color: Color,
}

impl StyleState {
    pub fn new(default_color: Color) -> Self {
        Self {
            style: TextStyle::default(),
            stack: Vec::new(),
            color: default_color,
            default_color,
        }
    }

    #[inline]
    pub fn style(&self) -> TextStyle {
        self.style
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Apply a styling token. Runs and line breaks are ignored.
    ///
    /// A close tag with nothing open is a no-op.
    pub fn apply(&mut self, token: &TextToken<'_>) {
        match token {
            TextToken::Bold => {
                self.stack.push(self.style);
                self.style.bold = true;
            }
            TextToken::Italic => {
                self.stack.push(self.style);
                self.style.italic = true;
            }
            TextToken::Close => {
                if let Some(previous) = self.stack.pop() {
                    self.style = previous;
                }
            }
            TextToken::Color(color) => self.color = color.unwrap_or(self.default_color),
            TextToken::Run(_) | TextToken::Newline => {}
        }
    }
}
