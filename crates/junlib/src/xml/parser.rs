//! XML parser implementation

use indexmap::IndexMap;

use crate::config::ParseConfig;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::cursor::Cursor;
use crate::xml::model::{Content, Document, Element};

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: ParseConfig,
    depth: u16,
    input_len: usize,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, ParseConfig::default())
    }

    /// Create a new XML parser with custom configuration
    pub fn with_config(input: &'a [u8], config: ParseConfig) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
            input_len: input.len(),
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size > 0 && self.input_len > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                0,
                1,
                1,
            ));
        }

        self.skip_misc()?;
        if self.cursor.is_eof() {
            return Err(self.error_here("missing root element"));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            let pos = self.cursor.position();
            return Err(Error::with_message(
                ErrorKind::InvalidToken,
                Span::new(pos, pos),
                "content after root element",
            ));
        }

        Ok(Document { root })
    }

    /// Skip the prolog / epilog: whitespace, declarations, comments, PIs
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
            } else if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
            } else if self.cursor.starts_with(b"<!") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.enter()?;
        self.expect_byte(b'<')?;

        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here("unexpected closing tag"));
        }

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.current() == Some(b'/') {
            self.cursor.advance();
            self.expect_byte(b'>')?;
            self.leave();
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect_byte(b'>')?;

        let mut children = Vec::new();
        loop {
            if self.cursor.starts_with(b"</") {
                self.cursor.advance_by(2);
                let start = self.cursor.position();
                let close_name = self.parse_name()?;
                if close_name != name {
                    let end = self.cursor.position();
                    return Err(Error::with_message(
                        ErrorKind::Expected {
                            expected: format!("</{name}>"),
                            found: format!("</{close_name}>"),
                        },
                        Span::new(start, end),
                        "mismatched closing tag",
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
                continue;
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                let text = self.parse_cdata()?;
                push_text(&mut children, text);
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                children.push(Content::Element(child));
                continue;
            }

            if self.cursor.is_eof() {
                return Err(self.error_here("unterminated element"));
            }

            if let Some(text) = self.parse_text()? {
                push_text(&mut children, text);
            }
        }

        self.leave();
        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn enter(&mut self) -> Result<()> {
        if self.config.max_depth > 0 && self.depth >= self.config.max_depth {
            let pos = self.cursor.position();
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                pos.offset,
                pos.line,
                pos.col,
            ));
        }
        self.depth = self.depth.saturating_add(1);
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here("unexpected end of input")),
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                let pos = self.cursor.position();
                return Err(Error::with_message(
                    ErrorKind::DuplicateKey { key: name },
                    Span::new(pos, pos),
                    "duplicate attribute",
                ));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let raw = self.cursor.take_while(|b| b != quote && b != b'<');
        match self.cursor.current() {
            Some(b'<') => Err(self.error_here("'<' in attribute value")),
            Some(_) => {
                self.cursor.advance();
                decode_entities(&bytes_to_string(raw)?)
            }
            None => Err(self.error_here("unterminated attribute value")),
        }
    }

    fn parse_text(&mut self) -> Result<Option<String>> {
        let raw = self.cursor.take_while(|b| b != b'<');
        let text = decode_entities(&bytes_to_string(raw)?)?;

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    fn parse_cdata(&mut self) -> Result<String> {
        match self.cursor.take_until(b"]]>") {
            Some(raw) => bytes_to_string(raw),
            None => Err(self.error_here("unterminated CDATA section")),
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        match self.cursor.current() {
            None => return Err(self.error_here("expected name")),
            Some(first) if !is_name_start(first) => return Err(self.error_here("invalid name")),
            Some(_) => {}
        }
        bytes_to_string(self.cursor.take_while(is_name_char))
    }

    /// Skip `<!DOCTYPE ...>`, including an internal subset in brackets
    fn skip_doctype(&mut self) -> Result<()> {
        let mut brackets = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => brackets += 1,
                b']' => brackets = brackets.saturating_sub(1),
                b'>' if brackets == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here("unterminated markup"))
    }

    fn skip_until(&mut self, terminator: &[u8]) -> Result<()> {
        match self.cursor.take_until(terminator) {
            Some(_) => Ok(()),
            None => Err(self.error_here("unterminated markup")),
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            let found = self
                .cursor
                .current()
                .map_or_else(|| "end of input".to_string(), |b| format!("'{}'", char::from(b)));
            let pos = self.cursor.position();
            Err(Error::new(
                ErrorKind::Expected {
                    expected: format!("'{}'", char::from(expected)),
                    found,
                },
                Span::new(pos, pos),
            ))
        }
    }

    fn error_here(&self, message: &str) -> Error {
        let pos = self.cursor.position();
        Error::with_message(ErrorKind::InvalidToken, Span::new(pos, pos), message)
    }
}

/// Append text, merging with a preceding text node
fn push_text(children: &mut Vec<Content>, text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(Content::Text(previous)) = children.last_mut() {
        previous.push_str(&text);
    } else {
        children.push(Content::Text(text));
    }
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| Error::with_message(ErrorKind::InvalidToken, Span::empty(), "invalid utf-8"))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

/// Whether `name` would parse back as a tag or attribute name
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes.next().is_some_and(is_name_start) && bytes.all(is_name_char)
}

fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = if terminated {
            match entity.as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric_entity(&entity),
            }
        } else {
            None
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(Error::with_message(
                    ErrorKind::InvalidToken,
                    Span::empty(),
                    format!("invalid xml entity: &{entity}"),
                ));
            }
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
