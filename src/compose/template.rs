//! Placeholder templates for subject and body text.
//!
//! Syntax: `{Field}` is replaced by the value of `Field`; `{{` and `}}`
//! produce literal braces. Templates are checked once when parsed, so a bad
//! template fails before any message is composed.

use crate::error::{MailerError, Result};

/// Placeholder fields a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Recipient name.
    Name,
    /// Matching key.
    Key,
}

impl Field {
    fn from_placeholder(name: &str) -> Option<Self> {
        match name {
            "Name" => Some(Self::Name),
            "PAN" | "Key" => Some(Self::Key),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Field),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct Vars<'a> {
    pub name: &'a str,
    pub key: &'a str,
}

impl Template {
    /// Parse template text.
    ///
    /// Unknown or empty placeholders and unbalanced braces are
    /// [`MailerError::Template`] errors.
    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, c)| c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(MailerError::Template(format!(
                            "unclosed '{{' at byte {pos}"
                        )));
                    }
                    let field = Field::from_placeholder(name.trim()).ok_or_else(|| {
                        MailerError::Template(format!("unknown placeholder '{{{name}}}'"))
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(field));
                }
                '}' => {
                    return Err(MailerError::Template(format!(
                        "single '}}' at byte {pos}"
                    )));
                }
                _ => literal.push(ch),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Substitute `vars` into the template.
    pub fn render(&self, vars: &Vars<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(Field::Name) => out.push_str(vars.name),
                Segment::Placeholder(Field::Key) => out.push_str(vars.key),
            }
        }
        out
    }
}
