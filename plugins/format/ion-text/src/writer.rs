use std::fmt::Write as _;

use serde_json::{Map, Number};
use strata_api::{HierarchicalValue, ValueWriter, WriteError};

enum Frame {
    /// `slot` is the field name this struct is stored under in its parent.
    Struct { slot: Option<String>, fields: Map<String, HierarchicalValue> },
    List { slot: Option<String>, items: Vec<HierarchicalValue> },
}

/// Builds values scope by scope and prints them as Ion text on `finish`.
///
/// Nothing is printed until every scope is closed, so a writer abandoned
/// after an error never yields a truncated struct. Field names are bare
/// symbols where Ion allows it and quoted symbols otherwise; floats carry an
/// exponent so they read back as floats rather than decimals.
#[derive(Default)]
pub struct TextWriter {
    frames: Vec<Frame>,
    field_name: Option<String>,
    top_level: Vec<HierarchicalValue>,
}

impl TextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field name the next value is stored under, if the current scope is a struct.
    fn take_slot(&mut self) -> Result<Option<String>, WriteError> {
        match self.frames.last() {
            Some(Frame::Struct { .. }) => self.field_name.take().map(Some).ok_or(WriteError::NoFieldName),
            _ => {
                self.field_name = None;
                Ok(None)
            }
        }
    }

    fn attach(&mut self, slot: Option<String>, value: HierarchicalValue) -> Result<(), WriteError> {
        match self.frames.last_mut() {
            Some(Frame::Struct { fields, .. }) => {
                let name = slot.ok_or(WriteError::NoFieldName)?;
                fields.insert(name, value);
            }
            Some(Frame::List { items, .. }) => items.push(value),
            None => self.top_level.push(value),
        }
        Ok(())
    }
}

impl ValueWriter for TextWriter {
    fn begin_struct(&mut self) -> Result<(), WriteError> {
        let slot = self.take_slot()?;
        self.frames.push(Frame::Struct { slot, fields: Map::new() });
        Ok(())
    }

    fn end_struct(&mut self) -> Result<(), WriteError> {
        match self.frames.pop() {
            Some(Frame::Struct { slot, fields }) => {
                self.field_name = None;
                self.attach(slot, HierarchicalValue::Object(fields))
            }
            Some(other) => {
                self.frames.push(other);
                Err(WriteError::ScopeMismatch { expected: "struct" })
            }
            None => Err(WriteError::ScopeMismatch { expected: "struct" }),
        }
    }

    fn begin_list(&mut self) -> Result<(), WriteError> {
        let slot = self.take_slot()?;
        self.frames.push(Frame::List { slot, items: Vec::new() });
        Ok(())
    }

    fn end_list(&mut self) -> Result<(), WriteError> {
        match self.frames.pop() {
            Some(Frame::List { slot, items }) => self.attach(slot, HierarchicalValue::Array(items)),
            Some(other) => {
                self.frames.push(other);
                Err(WriteError::ScopeMismatch { expected: "list" })
            }
            None => Err(WriteError::ScopeMismatch { expected: "list" }),
        }
    }

    fn set_field_name(&mut self, name: &str) -> Result<(), WriteError> {
        match self.frames.last() {
            Some(Frame::Struct { .. }) => {
                self.field_name = Some(name.to_string());
                Ok(())
            }
            _ => Err(WriteError::NotInStruct),
        }
    }

    fn clear_field_name(&mut self) {
        self.field_name = None;
    }

    fn write_value(&mut self, value: &HierarchicalValue) -> Result<(), WriteError> {
        let slot = self.take_slot()?;
        self.attach(slot, value.clone())
    }

    fn depth(&self) -> usize {
        self.frames.len()
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, WriteError> {
        if !self.frames.is_empty() {
            return Err(WriteError::UnbalancedScope { depth: self.frames.len() });
        }
        let mut out = String::new();
        for (i, value) in self.top_level.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            write_ion(&mut out, value);
        }
        Ok(out.into_bytes())
    }
}

fn write_ion(out: &mut String, value: &HierarchicalValue) {
    match value {
        HierarchicalValue::Null => out.push_str("null"),
        HierarchicalValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        HierarchicalValue::Number(n) => write_number(out, n),
        HierarchicalValue::String(s) => write_quoted(out, s, '"'),
        HierarchicalValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_ion(out, item);
            }
            out.push(']');
        }
        HierarchicalValue::Object(fields) => {
            out.push('{');
            for (i, (name, field)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_symbol(out, name);
                out.push(':');
                write_ion(out, field);
            }
            out.push('}');
        }
    }
}

fn write_number(out: &mut String, n: &Number) {
    if n.is_i64() || n.is_u64() {
        out.push_str(&n.to_string());
    } else if let Some(f) = n.as_f64() {
        // `1.5` alone would read back as a decimal.
        let _ = write!(out, "{f:e}");
    }
}

fn write_symbol(out: &mut String, name: &str) {
    if is_bare_symbol(name) {
        out.push_str(name);
    } else {
        write_quoted(out, name, '\'');
    }
}

/// Identifier symbols that read back as themselves. Keywords and `$<n>`
/// symbol ids must be quoted.
fn is_bare_symbol(name: &str) -> bool {
    let mut bytes = name.bytes();
    let starts_ok = bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_' || b == b'$');
    starts_ok
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
        && !matches!(name, "null" | "true" | "false" | "nan")
        && !name
            .strip_prefix('$')
            .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

fn write_quoted(out: &mut String, text: &str, quote: char) {
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}
