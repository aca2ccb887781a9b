//! Column-type grammar.
//!
//! ```text
//! types     := type ( (',' | ':' | ';') type )*
//! type      := primitive
//!            | 'array' '<' type '>'
//!            | 'map' '<' primitive ',' type '>'
//!            | 'struct' '<' [ name ':' type ( ',' name ':' type )* ] '>'
//! primitive := void | boolean | tinyint | smallint | int | bigint | float
//!            | double | string | date | timestamp | binary
//!            | decimal [ '(' p [ ',' s ] ')' ] | char '(' n ')'
//!            | varchar '(' n ')' | interval_year_month | interval_day_time
//!            | unknown
//! ```
//!
//! Keywords are case-insensitive. Field names keep their spelling.

use std::collections::HashSet;

use strata_api::{Field, MAX_NESTING, PrimitiveKind, TypeNode};

use crate::error::SchemaError;

const DECIMAL_MAX_PRECISION: u32 = 38;
const DECIMAL_DEFAULT_PRECISION: u8 = 10;
const DECIMAL_DEFAULT_SCALE: u8 = 0;
const CHAR_MAX_LENGTH: u32 = 255;
const VARCHAR_MAX_LENGTH: u32 = 65535;
// The record struct wrapping the columns takes one level.
const MAX_TYPE_NESTING: usize = MAX_NESTING - 1;

// ═══════════════════════════════════════════════════════════════
//  Tokens
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Punct(char),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, SchemaError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if is_word_char(c) {
            let mut word = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !is_word_char(c) {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token { kind: TokenKind::Word(word), offset });
        } else if matches!(c, '<' | '>' | '(' | ')' | ',' | ':' | ';') {
            tokens.push(Token { kind: TokenKind::Punct(c), offset });
            chars.next();
        } else {
            return Err(SchemaError::Parse {
                position: offset,
                message: format!("unexpected character {c:?}"),
            });
        }
    }

    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

// ═══════════════════════════════════════════════════════════════
//  Parser
// ═══════════════════════════════════════════════════════════════

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    /// Open array, map and struct types.
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, SchemaError> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            end: input.len(),
            depth: 0,
        })
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.offset)
    }

    fn error(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::Parse {
            position: self.offset(),
            message: message.into(),
        }
    }

    fn peek_punct(&self, c: char) -> bool {
        matches!(self.tokens.get(self.pos), Some(Token { kind: TokenKind::Punct(p), .. }) if *p == c)
    }

    fn expect_punct(&mut self, c: char) -> Result<(), SchemaError> {
        if self.peek_punct(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'{}", self.found())))
        }
    }

    fn expect_word(&mut self, what: &str) -> Result<String, SchemaError> {
        match self.tokens.get(self.pos) {
            Some(Token { kind: TokenKind::Word(w), .. }) => {
                let w = w.clone();
                self.pos += 1;
                Ok(w)
            }
            _ => Err(self.error(format!("expected {what}{}", self.found()))),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<u32, SchemaError> {
        let offset = self.offset();
        let word = self.expect_word(what)?;
        word.parse::<u32>().map_err(|_| SchemaError::Parse {
            position: offset,
            message: format!("expected {what}, found '{word}'"),
        })
    }

    fn found(&self) -> String {
        match self.tokens.get(self.pos) {
            Some(Token { kind: TokenKind::Word(w), .. }) => format!(", found '{w}'"),
            Some(Token { kind: TokenKind::Punct(p), .. }) => format!(", found '{p}'"),
            None => ", found end of input".to_string(),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<TypeNode>, SchemaError> {
        let mut types = Vec::new();
        while !self.at_end() {
            types.push(self.parse_type()?);
            if self.at_end() {
                break;
            }
            if self.peek_punct(',') || self.peek_punct(':') || self.peek_punct(';') {
                self.pos += 1;
                if self.at_end() {
                    return Err(self.error("expected type after separator, found end of input"));
                }
            } else {
                return Err(self.error(format!("expected type separator{}", self.found())));
            }
        }
        Ok(types)
    }

    fn parse_type(&mut self) -> Result<TypeNode, SchemaError> {
        let offset = self.offset();
        let word = self.expect_word("type name")?;

        match word.to_ascii_lowercase().as_str() {
            "array" => self.nested(offset, Self::parse_array_body),
            "map" => self.nested(offset, Self::parse_map_body),
            "struct" => self.nested(offset, Self::parse_struct_body),
            "uniontype" => Err(SchemaError::Parse {
                position: offset,
                message: "type category 'uniontype' is not supported".to_string(),
            }),
            name => self.parse_primitive(name, offset).map(TypeNode::Primitive),
        }
    }

    fn nested(
        &mut self,
        offset: usize,
        body: fn(&mut Self) -> Result<TypeNode, SchemaError>,
    ) -> Result<TypeNode, SchemaError> {
        if self.depth == MAX_TYPE_NESTING {
            return Err(SchemaError::Parse {
                position: offset,
                message: format!("types nested deeper than {MAX_TYPE_NESTING} levels"),
            });
        }
        self.depth += 1;
        let ty = body(self)?;
        self.depth -= 1;
        Ok(ty)
    }

    fn parse_array_body(&mut self) -> Result<TypeNode, SchemaError> {
        self.expect_punct('<')?;
        let element = self.parse_type()?;
        self.expect_punct('>')?;
        Ok(TypeNode::List(Box::new(element)))
    }

    fn parse_map_body(&mut self) -> Result<TypeNode, SchemaError> {
        self.expect_punct('<')?;
        let key_offset = self.offset();
        let key = match self.parse_type()? {
            TypeNode::Primitive(kind) => kind,
            other => {
                return Err(SchemaError::Parse {
                    position: key_offset,
                    message: format!("map key must be a primitive type, found {other}"),
                });
            }
        };
        self.expect_punct(',')?;
        let value = self.parse_type()?;
        self.expect_punct('>')?;
        Ok(TypeNode::Map { key, value: Box::new(value) })
    }

    fn parse_struct_body(&mut self) -> Result<TypeNode, SchemaError> {
        self.expect_punct('<')?;
        let mut fields = Vec::new();
        let mut seen = HashSet::new();

        if self.peek_punct('>') {
            self.pos += 1;
            return Ok(TypeNode::Struct(fields));
        }

        loop {
            let name = self.expect_word("field name")?;
            self.expect_punct(':')?;
            let field_type = self.parse_type()?;
            if !seen.insert(name.clone()) {
                return Err(SchemaError::DuplicateField { name });
            }
            fields.push(Field { name, field_type });

            if self.peek_punct(',') {
                self.pos += 1;
            } else {
                self.expect_punct('>')?;
                return Ok(TypeNode::Struct(fields));
            }
        }
    }

    fn parse_primitive(&mut self, name: &str, offset: usize) -> Result<PrimitiveKind, SchemaError> {
        let kind = match name {
            "void" => PrimitiveKind::Void,
            "boolean" => PrimitiveKind::Boolean,
            "tinyint" => PrimitiveKind::Byte,
            "smallint" => PrimitiveKind::Short,
            "int" | "integer" => PrimitiveKind::Int,
            "bigint" => PrimitiveKind::Long,
            "float" => PrimitiveKind::Float,
            "double" => PrimitiveKind::Double,
            "string" => PrimitiveKind::String,
            "date" => PrimitiveKind::Date,
            "timestamp" => PrimitiveKind::Timestamp,
            "binary" => PrimitiveKind::Binary,
            "interval_year_month" => PrimitiveKind::IntervalYearMonth,
            "interval_day_time" => PrimitiveKind::IntervalDayTime,
            "unknown" => PrimitiveKind::Unknown,
            "char" => PrimitiveKind::Char { length: self.parse_length("char", CHAR_MAX_LENGTH)? },
            "varchar" => PrimitiveKind::Varchar { length: self.parse_length("varchar", VARCHAR_MAX_LENGTH)? },
            "decimal" => self.parse_decimal()?,
            other => {
                return Err(SchemaError::Parse {
                    position: offset,
                    message: format!("unknown type '{other}'"),
                });
            }
        };
        Ok(kind)
    }

    fn parse_length(&mut self, type_name: &str, max: u32) -> Result<u32, SchemaError> {
        self.expect_punct('(')?;
        let offset = self.offset();
        let length = self.expect_number("length")?;
        if length == 0 || length > max {
            return Err(SchemaError::Parse {
                position: offset,
                message: format!("{type_name} length must be between 1 and {max}, got {length}"),
            });
        }
        self.expect_punct(')')?;
        Ok(length)
    }

    fn parse_decimal(&mut self) -> Result<PrimitiveKind, SchemaError> {
        if !self.peek_punct('(') {
            return Ok(PrimitiveKind::Decimal {
                precision: DECIMAL_DEFAULT_PRECISION,
                scale: DECIMAL_DEFAULT_SCALE,
            });
        }
        self.pos += 1;

        let offset = self.offset();
        let precision = self.expect_number("precision")?;
        let scale = if self.peek_punct(',') {
            self.pos += 1;
            self.expect_number("scale")?
        } else {
            u32::from(DECIMAL_DEFAULT_SCALE)
        };
        self.expect_punct(')')?;

        if precision == 0 || precision > DECIMAL_MAX_PRECISION || scale > precision {
            return Err(SchemaError::Parse {
                position: offset,
                message: format!(
                    "invalid decimal({precision},{scale}): precision must be 1..={DECIMAL_MAX_PRECISION} and scale at most precision"
                ),
            });
        }

        // Both bounded by DECIMAL_MAX_PRECISION above.
        Ok(PrimitiveKind::Decimal {
            precision: precision as u8,
            scale: scale as u8,
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  Entry points
// ═══════════════════════════════════════════════════════════════

/// Parse a separated list of column types. Blank input is an empty list.
pub fn parse_type_list(input: &str) -> Result<Vec<TypeNode>, SchemaError> {
    Parser::new(input)?.parse_list()
}

/// Parse exactly one type.
pub fn parse_type(input: &str) -> Result<TypeNode, SchemaError> {
    let mut parser = Parser::new(input)?;
    let ty = parser.parse_type()?;
    if !parser.at_end() {
        return Err(parser.error(format!("unexpected trailing input{}", parser.found())));
    }
    Ok(ty)
}
