//! Parser for the loose literal syntax found in older transcript files.
//!
//! Early runs wrote records with single-quoted strings and `True`/`False`/`None`
//! constants instead of JSON. This parser accepts that form and produces the
//! same `serde_json::Value` a JSON line would.

use serde_json::{Map, Number, Value};

/// Deepest container nesting accepted, same as serde_json's recursion limit
const MAX_DEPTH: usize = 128;

/// Parse a single literal expression into a JSON value
pub fn parse_literal(input: &str) -> Result<Value, String> {
    let mut parser = LiteralParser::new(input);
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(format!("unexpected '{}' at offset {}", c, parser.pos));
    }
    Ok(value)
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl LiteralParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(format!(
                "expected '{}' but found '{}' at offset {}",
                expected,
                c,
                self.pos - 1
            )),
            None => Err(format!("expected '{}' but input ended", expected)),
        }
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        match self.peek() {
            Some(open @ ('{' | '[' | '(')) => self.parse_container(open),
            Some('\'') | Some('"') => self.parse_strings().map(Value::String),
            Some(c) if is_string_prefix(c) && matches!(self.peek_at(1), Some('\'' | '"')) => {
                self.parse_strings().map(Value::String)
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_constant(),
            Some(c) => Err(format!("unexpected '{}' at offset {}", c, self.pos)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn parse_container(&mut self, open: char) -> Result<Value, String> {
        if self.depth >= MAX_DEPTH {
            return Err(format!("nesting too deep at offset {}", self.pos));
        }
        self.depth += 1;
        let value = match open {
            '{' => self.parse_dict(),
            '[' => self.parse_sequence('[', ']'),
            _ => self.parse_tuple(),
        }?;
        self.depth -= 1;
        Ok(value)
    }

    fn parse_dict(&mut self) -> Result<Value, String> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key = match self.parse_value()? {
                Value::String(key) => key,
                other => return Err(format!("dict keys must be strings, found {}", other)),
            };
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_whitespace();
            match self.next() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                Some(c) => return Err(format!("unexpected '{}' in dict", c)),
                None => return Err("unterminated dict".to_string()),
            }
        }
    }

    fn parse_sequence(&mut self, open: char, close: char) -> Result<Value, String> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Value::Array(items));
            }

            items.push(self.parse_value()?);

            self.skip_whitespace();
            match self.next() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(Value::Array(items)),
                Some(c) => return Err(format!("unexpected '{}' in sequence", c)),
                None => return Err("unterminated sequence".to_string()),
            }
        }
    }

    /// `(x)` is just `x`; `()`, `(x,)` and `(x, y)` are tuples
    fn parse_tuple(&mut self) -> Result<Value, String> {
        self.expect('(')?;
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(Value::Array(Vec::new()));
        }

        let first = self.parse_value()?;
        self.skip_whitespace();
        match self.peek() {
            Some(')') => {
                self.pos += 1;
                Ok(first)
            }
            Some(',') => {
                // Re-enter as a sequence with the first element already consumed
                self.pos += 1;
                let mut items = vec![first];
                loop {
                    self.skip_whitespace();
                    if self.peek() == Some(')') {
                        self.pos += 1;
                        return Ok(Value::Array(items));
                    }
                    items.push(self.parse_value()?);
                    self.skip_whitespace();
                    match self.next() {
                        Some(',') => continue,
                        Some(')') => return Ok(Value::Array(items)),
                        Some(c) => return Err(format!("unexpected '{}' in tuple", c)),
                        None => return Err("unterminated tuple".to_string()),
                    }
                }
            }
            Some(c) => Err(format!("unexpected '{}' in tuple", c)),
            None => Err("unterminated tuple".to_string()),
        }
    }

    /// Adjacent string literals are concatenated, as in `'a' "b"`
    fn parse_strings(&mut self) -> Result<String, String> {
        let mut out = self.parse_string()?;
        loop {
            let save = self.pos;
            self.skip_whitespace();
            let starts_string = match self.peek() {
                Some('\'' | '"') => true,
                Some(c) if is_string_prefix(c) => matches!(self.peek_at(1), Some('\'' | '"')),
                _ => false,
            };
            if !starts_string {
                self.pos = save;
                return Ok(out);
            }
            out.push_str(&self.parse_string()?);
        }
    }

    fn parse_string(&mut self) -> Result<String, String> {
        let mut raw = false;
        if let Some(c) = self.peek() {
            if is_string_prefix(c) {
                raw = c == 'r' || c == 'R';
                self.pos += 1;
            }
        }

        let quote = match self.next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err("expected string".to_string()),
        };

        let mut out = String::new();
        loop {
            let c = self.next().ok_or("unterminated string")?;
            if c == quote {
                return Ok(out);
            }
            if c == '\n' {
                return Err("newline inside string".to_string());
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let escaped = self.next().ok_or("unterminated escape")?;
            if raw {
                out.push('\\');
                out.push(escaped);
                continue;
            }
            match escaped {
                '\n' => {}
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                digit @ '0'..='7' => out.push(self.parse_octal_escape(digit)?),
                'a' => out.push('\u{07}'),
                'b' => out.push('\u{08}'),
                'f' => out.push('\u{0C}'),
                'v' => out.push('\u{0B}'),
                'x' => out.push(self.parse_hex_escape(2)?),
                'u' => out.push(self.parse_hex_escape(4)?),
                'U' => out.push(self.parse_hex_escape(8)?),
                // Unknown escapes keep the backslash
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    fn parse_hex_escape(&mut self, len: usize) -> Result<char, String> {
        let mut digits = String::with_capacity(len);
        for _ in 0..len {
            let c = self.next().ok_or("truncated escape sequence")?;
            digits.push(c);
        }
        let code = u32::from_str_radix(&digits, 16)
            .map_err(|_| format!("invalid escape sequence '{}'", digits))?;
        char::from_u32(code).ok_or_else(|| format!("invalid code point {:#x}", code))
    }

    /// Up to three octal digits, the first already consumed
    fn parse_octal_escape(&mut self, first: char) -> Result<char, String> {
        let mut code = first.to_digit(8).ok_or("invalid octal escape")?;
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(8)) {
                Some(digit) => {
                    code = code * 8 + digit;
                    self.pos += 1;
                }
                None => break,
            }
        }
        char::from_u32(code).ok_or_else(|| format!("invalid code point {:#o}", code))
    }

    fn parse_number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    if matches!(self.peek_at(1), Some('-' | '+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }

        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        let text = text.strip_prefix('+').unwrap_or(&text);

        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("invalid number '{}'", text))
    }

    fn parse_constant(&mut self) -> Result<Value, String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            _ => Err(format!("unknown name '{}'", word)),
        }
    }
}

fn is_string_prefix(c: char) -> bool {
    matches!(c, 'u' | 'U' | 'r' | 'R')
}
