use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Number};
use strata_api::{HierarchicalValue, LoadError, Loader, MAX_NESTING};

/// Loads every top-level value of an Ion text unit.
///
/// Values may be separated by whitespace or comments, or simply
/// concatenated (`{}{}` is two values). Empty or blank input yields no
/// values. The `$ion_1_0` version marker and top-level
/// `$ion_symbol_table::{...}` structs are system values and are skipped.
///
/// Ion values land in the hierarchy as follows:
///
/// | Ion | value |
/// |---|---|
/// | null, `null.<type>` | null |
/// | bool | bool |
/// | int, decimal, float | number |
/// | string, symbol, clob, timestamp | string |
/// | blob | base64 string |
/// | list, sexp | sequence |
/// | struct | struct (last duplicate field wins) |
///
/// Annotations are dropped. `nan` and `±inf` have no number to land in and
/// are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl Loader for TextLoader {
    fn load(&self, text: &str) -> Result<Vec<HierarchicalValue>, LoadError> {
        let mut reader = Reader::new(text);
        let mut values = Vec::new();
        while let Some(value) = reader.next_top_level()? {
            values.push(value);
        }
        Ok(values)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Reader
// ═══════════════════════════════════════════════════════════════

const NULL_TYPES: &[&str] = &[
    "null", "bool", "int", "float", "decimal", "timestamp", "symbol", "string", "clob", "blob",
    "list", "sexp", "struct",
];

/// One parsed value with what the top level needs to spot system values.
struct Parsed {
    value: HierarchicalValue,
    annotations: Vec<String>,
    /// The value was an unquoted identifier symbol.
    identifier: bool,
}

struct Reader<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, bytes: text.as_bytes(), pos: 0 }
    }

    fn next_top_level(&mut self) -> Result<Option<HierarchicalValue>, LoadError> {
        loop {
            self.skip_trivia()?;
            if self.at_end() {
                return Ok(None);
            }
            let start = self.pos;
            let parsed = self.value(0, false)?;

            if parsed.identifier && parsed.annotations.is_empty() {
                if let HierarchicalValue::String(symbol) = &parsed.value {
                    if symbol == "$ion_1_0" {
                        continue;
                    }
                    if is_version_marker(symbol) {
                        return Err(self.error_at(start, format!("unsupported Ion version marker {symbol}")));
                    }
                }
            }
            if parsed.value.is_object()
                && parsed.annotations.first().is_some_and(|a| a == "$ion_symbol_table")
            {
                continue;
            }
            return Ok(Some(parsed.value));
        }
    }

    // ── Values ──────────────────────────────────────────────────

    /// `depth` counts the containers enclosing this value.
    fn value(&mut self, depth: usize, in_sexp: bool) -> Result<Parsed, LoadError> {
        let mut annotations = Vec::new();
        loop {
            self.skip_trivia()?;
            let start = self.pos;
            let Some(c) = self.peek() else {
                return Err(self.error("expected value, found end of input"));
            };

            let value = match c {
                b'{' if self.peek_at(1) == Some(b'{') => self.lob()?,
                b'{' => self.struct_body(depth)?,
                b'[' => self.list_body(depth)?,
                b'(' => self.sexp_body(depth)?,
                b'"' => {
                    self.pos += 1;
                    HierarchicalValue::String(self.escaped("\"", false)?)
                }
                b'\'' if self.starts_with("'''") => HierarchicalValue::String(self.long_string()?),
                b'\'' => {
                    self.pos += 1;
                    let symbol = self.escaped("'", false)?;
                    if self.annotation_follows()? {
                        annotations.push(symbol);
                        continue;
                    }
                    HierarchicalValue::String(symbol)
                }
                b'0'..=b'9' => self.numeric()?,
                b'-' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => self.numeric()?,
                b'+' | b'-' if self.starts_with_word(1, "inf") => {
                    return Err(self.special_float(start, 4));
                }
                c if is_identifier_start(c) => {
                    let word = self.identifier();
                    if self.annotation_follows()? {
                        annotations.push(word.to_string());
                        continue;
                    }
                    match word {
                        "null" => self.typed_null()?,
                        "true" => HierarchicalValue::Bool(true),
                        "false" => HierarchicalValue::Bool(false),
                        "nan" => return Err(self.special_float(start, 3)),
                        _ => {
                            return Ok(Parsed {
                                value: HierarchicalValue::String(word.to_string()),
                                annotations,
                                identifier: true,
                            });
                        }
                    }
                }
                c if in_sexp && is_operator(c) => {
                    while self.peek().is_some_and(is_operator) {
                        self.pos += 1;
                    }
                    HierarchicalValue::String(self.text[start..self.pos].to_string())
                }
                _ => {
                    return Err(self.error(format!("unexpected character {:?}", self.current_char())));
                }
            };
            return Ok(Parsed { value, annotations, identifier: false });
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, LoadError> {
        let depth = depth + 1;
        if depth > MAX_NESTING {
            return Err(self.error(format!("values nested deeper than {MAX_NESTING} levels")));
        }
        Ok(depth)
    }

    fn struct_body(&mut self, depth: usize) -> Result<HierarchicalValue, LoadError> {
        let depth = self.enter(depth)?;
        self.pos += 1;
        let mut fields = Map::new();
        loop {
            self.skip_trivia()?;
            if self.eat(b'}') {
                return Ok(HierarchicalValue::Object(fields));
            }
            let name = self.field_name()?;
            self.skip_trivia()?;
            if self.starts_with("::") || !self.eat(b':') {
                return Err(self.error(format!("expected ':' after field name, found {}", self.describe_next())));
            }
            let field = self.value(depth, false)?;
            fields.insert(name, field.value);

            self.skip_trivia()?;
            if self.eat(b',') {
                continue;
            }
            if self.eat(b'}') {
                return Ok(HierarchicalValue::Object(fields));
            }
            return Err(self.error(format!("expected ',' or '}}', found {}", self.describe_next())));
        }
    }

    fn field_name(&mut self) -> Result<String, LoadError> {
        match self.peek() {
            Some(b'"') => {
                self.pos += 1;
                self.escaped("\"", false)
            }
            Some(b'\'') if self.starts_with("'''") => self.long_string(),
            Some(b'\'') => {
                self.pos += 1;
                self.escaped("'", false)
            }
            Some(c) if is_identifier_start(c) => Ok(self.identifier().to_string()),
            _ => Err(self.error(format!("expected field name, found {}", self.describe_next()))),
        }
    }

    fn list_body(&mut self, depth: usize) -> Result<HierarchicalValue, LoadError> {
        let depth = self.enter(depth)?;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(b']') {
                return Ok(HierarchicalValue::Array(items));
            }
            items.push(self.value(depth, false)?.value);

            self.skip_trivia()?;
            if self.eat(b',') {
                continue;
            }
            if self.eat(b']') {
                return Ok(HierarchicalValue::Array(items));
            }
            return Err(self.error(format!("expected ',' or ']', found {}", self.describe_next())));
        }
    }

    fn sexp_body(&mut self, depth: usize) -> Result<HierarchicalValue, LoadError> {
        let depth = self.enter(depth)?;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.eat(b')') {
                return Ok(HierarchicalValue::Array(items));
            }
            items.push(self.value(depth, true)?.value);
        }
    }

    fn typed_null(&mut self) -> Result<HierarchicalValue, LoadError> {
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(is_identifier_start) {
            self.pos += 1;
            let start = self.pos;
            let type_name = self.identifier();
            if !NULL_TYPES.contains(&type_name) {
                return Err(self.error_at(start, format!("unknown null type '{type_name}'")));
            }
        }
        Ok(HierarchicalValue::Null)
    }

    // ── Text ────────────────────────────────────────────────────

    fn long_string(&mut self) -> Result<String, LoadError> {
        let mut text = String::new();
        loop {
            self.pos += 3;
            text.push_str(&self.escaped("'''", true)?);

            // Adjacent long strings are one value.
            let after = self.pos;
            self.skip_trivia()?;
            if !self.starts_with("'''") {
                self.pos = after;
                return Ok(text);
            }
        }
    }

    /// Read up to and past `terminator`, resolving escapes.
    fn escaped(&mut self, terminator: &str, multiline: bool) -> Result<String, LoadError> {
        let start = self.pos;
        let mut out = String::new();
        loop {
            if self.starts_with(terminator) {
                self.pos += terminator.len();
                return Ok(out);
            }
            let Some(c) = self.next_char() else {
                return Err(self.error_at(start, "unterminated text"));
            };
            match c {
                '\\' => self.escape(&mut out)?,
                '\n' | '\r' if !multiline => {
                    return Err(self.error_at(self.pos - 1, "line break inside a quoted value"));
                }
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LoadError> {
        let at = self.pos - 1;
        let Some(c) = self.next_char() else {
            return Err(self.error_at(at, "unterminated escape"));
        };
        let resolved = match c {
            'a' => '\u{07}',
            'b' => '\u{08}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{0C}',
            'r' => '\r',
            'v' => '\u{0B}',
            '0' => '\0',
            '?' | '"' | '\'' | '/' | '\\' => c,
            // Escaped line break continues the text.
            '\n' => return Ok(()),
            '\r' => {
                self.eat(b'\n');
                return Ok(());
            }
            'x' => self.hex_escape(at, 2)?,
            'u' => {
                let unit = self.hex_code(at, 4)?;
                if (0xD800..0xDC00).contains(&unit) {
                    if !self.starts_with("\\u") {
                        return Err(self.error_at(at, "unpaired surrogate in escape"));
                    }
                    self.pos += 2;
                    let low = self.hex_code(at, 4)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(self.error_at(at, "unpaired surrogate in escape"));
                    }
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(code).ok_or_else(|| self.error_at(at, "invalid escape"))?
                } else {
                    char::from_u32(unit).ok_or_else(|| self.error_at(at, "invalid escape"))?
                }
            }
            'U' => self.hex_escape(at, 8)?,
            other => return Err(self.error_at(at, format!("invalid escape '\\{other}'"))),
        };
        out.push(resolved);
        Ok(())
    }

    fn hex_escape(&mut self, at: usize, digits: usize) -> Result<char, LoadError> {
        let code = self.hex_code(at, digits)?;
        char::from_u32(code).ok_or_else(|| self.error_at(at, "escape is not a character"))
    }

    fn hex_code(&mut self, at: usize, digits: usize) -> Result<u32, LoadError> {
        let text = self.text;
        let hex = text
            .get(self.pos..self.pos + digits)
            .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.error_at(at, format!("expected {digits} hex digits in escape")))?;
        self.pos += digits;
        u32::from_str_radix(hex, 16).map_err(|_| self.error_at(at, "invalid escape"))
    }

    /// Blob or clob between `{{` and `}}`.
    fn lob(&mut self) -> Result<HierarchicalValue, LoadError> {
        let start = self.pos;
        self.pos += 2;
        self.skip_whitespace();

        let value = if self.eat(b'"') {
            self.escaped("\"", false)?
        } else if self.starts_with("'''") {
            self.long_string()?
        } else {
            let body_start = self.pos;
            let Some(len) = self.text[body_start..].find("}}") else {
                return Err(self.error_at(start, "unterminated blob"));
            };
            let encoded: String = self.text[body_start..body_start + len]
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            self.pos = body_start + len;
            let bytes = STANDARD
                .decode(&encoded)
                .map_err(|e| self.error_at(body_start, format!("invalid blob: {e}")))?;
            STANDARD.encode(bytes)
        };

        self.skip_whitespace();
        if !self.starts_with("}}") {
            return Err(self.error(format!("expected '}}}}', found {}", self.describe_next())));
        }
        self.pos += 2;
        Ok(HierarchicalValue::String(value))
    }

    // ── Numbers and timestamps ──────────────────────────────────

    fn numeric(&mut self) -> Result<HierarchicalValue, LoadError> {
        let start = self.pos;
        if self.timestamp_follows() {
            while self
                .peek()
                .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b':' | b'.' | b'T' | b'Z'))
            {
                self.pos += 1;
            }
            let token = &self.text[start..self.pos];
            return if is_timestamp(token) {
                Ok(HierarchicalValue::String(token.to_string()))
            } else {
                Err(self.error_at(start, format!("invalid timestamp '{token}'")))
            };
        }

        self.eat(b'-');
        let radix = matches!(self.bytes.get(self.pos..self.pos + 2), Some([b'0', b'x' | b'X' | b'b' | b'B']));
        while let Some(b) = self.peek() {
            let exponent_sign = !radix
                && matches!(b, b'+' | b'-')
                && matches!(self.bytes[self.pos - 1], b'e' | b'E' | b'd' | b'D');
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        let token = &self.text[start..self.pos];
        parse_number(token).map_err(|message| self.error_at(start, format!("{message} '{token}'")))
    }

    fn timestamp_follows(&self) -> bool {
        let head = &self.bytes[self.pos..];
        head.len() > 4 && head[..4].iter().all(u8::is_ascii_digit) && matches!(head[4], b'-' | b'T')
    }

    // ── Lexing helpers ──────────────────────────────────────────

    fn skip_trivia(&mut self) -> Result<(), LoadError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("//") {
                while self.peek().is_some_and(|b| b != b'\n') {
                    self.pos += 1;
                }
            } else if self.starts_with("/*") {
                let start = self.pos;
                match self.text[self.pos + 2..].find("*/") {
                    Some(len) => self.pos += len + 4,
                    None => return Err(self.error_at(start, "unterminated comment")),
                }
            } else {
                return Ok(());
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)) {
            self.pos += 1;
        }
    }

    /// After a symbol: is it an annotation (`sym::`)? Consumes the `::`.
    fn annotation_follows(&mut self) -> Result<bool, LoadError> {
        let after = self.pos;
        self.skip_trivia()?;
        if self.starts_with("::") {
            self.pos += 2;
            Ok(true)
        } else {
            self.pos = after;
            Ok(false)
        }
    }

    fn identifier(&mut self) -> &'a str {
        let text = self.text;
        let start = self.pos;
        while self.peek().is_some_and(is_identifier_part) {
            self.pos += 1;
        }
        &text[start..self.pos]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    /// `word` at `ahead`, not followed by more identifier characters.
    fn starts_with_word(&self, ahead: usize, word: &str) -> bool {
        let from = self.pos + ahead;
        self.bytes.get(from..).is_some_and(|rest| rest.starts_with(word.as_bytes()))
            && !self.bytes.get(from + word.len()).copied().is_some_and(is_identifier_part)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.text[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn current_char(&self) -> char {
        self.text[self.pos..].chars().next().unwrap_or_default()
    }

    fn describe_next(&self) -> String {
        if self.at_end() {
            "end of input".to_string()
        } else {
            format!("{:?}", self.current_char())
        }
    }

    // ── Errors ──────────────────────────────────────────────────

    fn error(&self, message: impl Into<String>) -> LoadError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> LoadError {
        let (line, column) = line_column(self.text, offset);
        LoadError::at(message, line, column)
    }

    fn special_float(&self, start: usize, len: usize) -> LoadError {
        let token = &self.text[start..start + len];
        self.error_at(start, format!("float {token} cannot be represented"))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Token rules
// ═══════════════════════════════════════════════════════════════

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_identifier_part(b: u8) -> bool {
    is_identifier_start(b) || b.is_ascii_digit()
}

fn is_operator(b: u8) -> bool {
    b"!#%&*+-./;<=>?@^`|~".contains(&b)
}

fn is_version_marker(symbol: &str) -> bool {
    symbol
        .strip_prefix("$ion_")
        .and_then(|rest| rest.split_once('_'))
        .is_some_and(|(major, minor)| {
            !major.is_empty()
                && !minor.is_empty()
                && major.bytes().all(|b| b.is_ascii_digit())
                && minor.bytes().all(|b| b.is_ascii_digit())
        })
}

/// 1-based line and column of a byte offset.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line, column)
}

/// Ion int, decimal or float literal, with an optional leading `-`.
fn parse_number(token: &str) -> Result<HierarchicalValue, &'static str> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = body.strip_prefix(prefix) {
            let digits = strip_underscores(digits, radix).ok_or("invalid integer")?;
            return integer(negative, &digits, radix);
        }
    }

    let digits = strip_underscores(body, 10).ok_or("invalid number")?;
    let int_part = digits.bytes().take_while(u8::is_ascii_digit).count();
    if int_part == 0 || (int_part > 1 && digits.starts_with('0')) {
        return Err("invalid number");
    }

    if digits.len() == int_part {
        return integer(negative, &digits, 10);
    }
    if !digits[int_part..].bytes().all(|b| b.is_ascii_digit() || b"eEdD.+-".contains(&b)) {
        return Err("invalid number");
    }

    // Decimals use `d` for the exponent; both land in an f64.
    let literal = format!("{}{}", if negative { "-" } else { "" }, digits.replace(['d', 'D'], "e"));
    let parsed: f64 = literal.parse().map_err(|_| "invalid number")?;
    Number::from_f64(parsed)
        .map(HierarchicalValue::Number)
        .ok_or("number out of range")
}

/// Digits without `_` separators; each `_` must sit between two digits.
fn strip_underscores(digits: &str, radix: u32) -> Option<String> {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len());
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'_' {
            let between = i > 0
                && (bytes[i - 1] as char).is_digit(radix)
                && bytes.get(i + 1).is_some_and(|&n| (n as char).is_digit(radix));
            if !between {
                return None;
            }
        } else {
            out.push(b as char);
        }
    }
    Some(out)
}

fn integer(negative: bool, digits: &str, radix: u32) -> Result<HierarchicalValue, &'static str> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err("invalid integer");
    }
    let magnitude = i128::from_str_radix(digits, radix).map_err(|_| "integer out of range")?;
    let n = if negative { -magnitude } else { magnitude };
    if let Ok(n) = i64::try_from(n) {
        Ok(HierarchicalValue::from(n))
    } else if let Ok(n) = u64::try_from(n) {
        Ok(HierarchicalValue::from(n))
    } else {
        Err("integer out of range")
    }
}

/// `YYYY T`, `YYYY-MM T`, `YYYY-MM-DD[T]` or a full date-time with offset.
fn is_timestamp(token: &str) -> bool {
    let b = token.as_bytes();
    let digits = |range: std::ops::Range<usize>| {
        b.get(range).is_some_and(|d| d.iter().all(u8::is_ascii_digit))
    };

    if !digits(0..4) {
        return false;
    }
    match &b[4..] {
        b"T" => return true,
        [b'-', ..] => {}
        _ => return false,
    }
    if !digits(5..7) {
        return false;
    }
    match &b[7..] {
        b"T" => return true,
        [b'-', ..] => {}
        _ => return false,
    }
    if !digits(8..10) {
        return false;
    }
    match &b[10..] {
        b"" | b"T" => return true,
        [b'T', ..] => {}
        _ => return false,
    }

    // hh:mm[:ss[.fff]] followed by Z or ±hh:mm.
    let rest = &b[11..];
    let time_len = rest
        .iter()
        .position(|&c| matches!(c, b'Z' | b'+' | b'-'))
        .unwrap_or(rest.len());
    let (time, offset) = rest.split_at(time_len);
    let time_ok = match time {
        [h1, h2, b':', m1, m2] => [h1, h2, m1, m2].iter().all(|d| d.is_ascii_digit()),
        [h1, h2, b':', m1, m2, b':', s1, s2, frac @ ..] => {
            [h1, h2, m1, m2, s1, s2].iter().all(|d| d.is_ascii_digit())
                && match frac {
                    [] => true,
                    [b'.', digits @ ..] => !digits.is_empty() && digits.iter().all(u8::is_ascii_digit),
                    _ => false,
                }
        }
        _ => false,
    };
    let offset_ok = match offset {
        b"Z" => true,
        [b'+' | b'-', h1, h2, b':', m1, m2] => [h1, h2, m1, m2].iter().all(|d| d.is_ascii_digit()),
        _ => false,
    };
    time_ok && offset_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load_one(text: &str) -> HierarchicalValue {
        let mut values = TextLoader.load(text).unwrap();
        assert_eq!(values.len(), 1, "{text}");
        values.remove(0)
    }

    #[test]
    fn json_is_ion() {
        assert_eq!(
            load_one(r#"{"a": 1, "b": {"c": "x"}, "d": [true, null, 2.5]}"#),
            json!({"a": 1, "b": {"c": "x"}, "d": [true, null, 2.5]})
        );
    }

    #[test]
    fn symbol_field_names() {
        assert_eq!(load_one("{a:{b:{c:42}}}"), json!({"a": {"b": {"c": 42}}}));
        assert_eq!(load_one("{'quoted name': 1, $x_1: 2}"), json!({"quoted name": 1, "$x_1": 2}));
    }

    #[test]
    fn system_values_are_skipped() {
        let values = TextLoader
            .load("$ion_1_0 $ion_symbol_table::{symbols:[\"a\"]} {a:1}")
            .unwrap();
        assert_eq!(values, vec![json!({"a": 1})]);

        let err = TextLoader.load("$ion_2_0 {a:1}").unwrap_err();
        assert!(err.message.contains("version"));
    }

    #[test]
    fn comments_and_annotations() {
        let text = "// leading\n{ /* inline */ a: units::kg::7, b: 'tag'::\"x\" }";
        assert_eq!(load_one(text), json!({"a": 7, "b": "x"}));
    }

    #[test]
    fn scalars() {
        assert_eq!(
            load_one(
                "[null.int, null, 0x1F, -0b101, 1_000, 18446744073709551615, 1.5d1, 2.5e-1, \
                 -0.125, sym, 2007-02-23T12:14:33.079-08:00, 2007T, 2020-01-01, \
                 {{aGVsbG8=}}, {{ \"clob\" }}, '''long ''' '''string''']"
            ),
            json!([
                null, null, 31, -5, 1000, 18446744073709551615u64, 15.0, 0.25, -0.125, "sym",
                "2007-02-23T12:14:33.079-08:00", "2007T", "2020-01-01", "aGVsbG8=", "clob",
                "long string"
            ])
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            load_one(r#""tab\tquote\"\x41é\U0001F600😀""#),
            json!("tab\tquote\"Aé😀😀")
        );
    }

    #[test]
    fn sexp_is_a_sequence() {
        assert_eq!(load_one("(+ 1 (f x))"), json!(["+", 1, ["f", "x"]]));
    }

    #[test]
    fn trailing_commas() {
        assert_eq!(load_one("{a:[1,2,],}"), json!({"a": [1, 2]}));
    }

    #[test]
    fn blank_input_has_no_values() {
        assert!(TextLoader.load("").unwrap().is_empty());
        assert!(TextLoader.load("  \n\t // only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn concatenated_values_are_counted() {
        assert_eq!(TextLoader.load("{}{}").unwrap().len(), 2);
        assert_eq!(TextLoader.load("{a:1}\n{a:2}\n3").unwrap().len(), 3);
    }

    #[test]
    fn malformed_input_reports_position() {
        let err = TextLoader.load("{a:1,\n  b: }").unwrap_err();
        assert_eq!(err.position, Some((2, 6)));

        let err = TextLoader.load("{a:1").unwrap_err();
        assert_eq!(err.position, Some((1, 5)));
    }

    #[test]
    fn rejected_literals() {
        for text in ["nan", "+inf", "[-inf]", "007", "1__0", "0xZZ", "2007-13", "null.widget", "{a 1}"] {
            assert!(TextLoader.load(text).is_err(), "{text}");
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let ok = format!("{}{}", "[".repeat(MAX_NESTING), "]".repeat(MAX_NESTING));
        assert!(TextLoader.load(&ok).is_ok());

        let deep = format!("{}{}", "[".repeat(MAX_NESTING + 1), "]".repeat(MAX_NESTING + 1));
        let err = TextLoader.load(&deep).unwrap_err();
        assert!(err.message.contains("nested deeper"));
        assert_eq!(err.position, Some((1, MAX_NESTING + 1)));
    }
}
