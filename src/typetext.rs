//! Type text front end.
//!
//! The component-discovery side hands prop types over as the text a type
//! checker prints (`string[]`, `{ id: number; tags?: string[] }`,
//! `"admin" | "guest"`). This module turns that text into a [`TypeDesc`].
//!
//! Policy:
//! - only shapes the synthesizer understands are recognized; named
//!   references, generics, function types and `any` become `Unknown`
//! - `null` / `undefined` arms are dropped from unions, X ∪ null → X
//! - `[]` on an unknown element gives an untyped array
//! - [`parse`] never fails; [`try_parse`] reports malformed text
use tracing::debug;

use crate::ir::{Field, TypeDesc, Variant};

/// Bracket/union nesting beyond this is rejected as malformed.
pub const MAX_PARSE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeTextError {
    #[error("unexpected end of type text")]
    UnexpectedEnd,
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedLiteral(usize),
    #[error("type text nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Parse type text, degrading malformed input to [`TypeDesc::Unknown`].
pub fn parse(text: &str) -> TypeDesc {
    try_parse(text).unwrap_or_else(|error| {
        debug!(%error, text, "unparseable type text, degrading to unknown");
        TypeDesc::Unknown
    })
}

pub fn try_parse(text: &str) -> Result<TypeDesc, TypeTextError> {
    let mut parser = Parser::new(text, 0, 0);
    let ty = parser.union()?;
    parser.finish()?;
    Ok(ty)
}

// ————————————————————————————————————————————————————————————————————————————
// PARSER
// ————————————————————————————————————————————————————————————————————————————

/// One arm of a union before collapsing.
enum Arm {
    Literal(String),
    Nullish,
    Type(TypeDesc),
}

impl Arm {
    fn into_desc(self) -> TypeDesc {
        match self {
            Arm::Literal(text) => TypeDesc::Union(vec![Variant::Literal(text)]),
            Arm::Nullish => TypeDesc::Unknown,
            Arm::Type(ty) => ty,
        }
    }

    fn into_array(self) -> TypeDesc {
        match self.into_desc() {
            TypeDesc::Unknown => TypeDesc::Array(None),
            element => TypeDesc::array_of(element),
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// offset of `src` inside the original text, for error messages
    base: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, base: usize, depth: usize) -> Self {
        Self { src, pos: 0, base, depth }
    }

    fn rest(&self) -> &'a str { &self.src[self.pos..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> TypeTextError {
        match self.peek() {
            Some(found) => TypeTextError::Unexpected { found, offset: self.base + self.pos },
            None => TypeTextError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, c: char) -> Result<(), TypeTextError> {
        if self.eat(c) { Ok(()) } else { Err(self.unexpected()) }
    }

    fn finish(&mut self) -> Result<(), TypeTextError> {
        self.skip_ws();
        if self.pos < self.src.len() { Err(self.unexpected()) } else { Ok(()) }
    }

    /// One more level of nesting; every recursive rule goes through here.
    fn descend(&mut self) -> Result<(), TypeTextError> {
        self.depth += 1;
        if self.depth > MAX_PARSE_DEPTH {
            return Err(TypeTextError::TooDeep(MAX_PARSE_DEPTH));
        }
        Ok(())
    }

    fn union(&mut self) -> Result<TypeDesc, TypeTextError> {
        self.descend()?;
        // leading `|` is legal in multi-line unions
        self.eat('|');
        let mut arms = vec![self.postfix()?];
        while self.eat('|') {
            arms.push(self.postfix()?);
        }
        self.depth -= 1;
        Ok(collapse_union(arms))
    }

    fn postfix(&mut self) -> Result<Arm, TypeTextError> {
        let entry = self.depth;
        self.skip_ws();
        if let Some(word) = self.peek_ident() {
            if matches!(word, "readonly" | "keyof" | "typeof" | "unique") && self.ident_is_prefix(word) {
                self.pos += word.len();
                self.descend()?;
                let inner = self.postfix()?;
                self.depth = entry;
                return Ok(if word == "readonly" { inner } else { Arm::Type(TypeDesc::Unknown) });
            }
        }
        let mut arm = self.primary()?;
        loop {
            let save = self.pos;
            if self.eat('[') && self.eat(']') {
                // each suffix wraps the element once more
                self.descend()?;
                arm = Arm::Type(arm.into_array());
            } else {
                self.pos = save;
                break;
            }
        }
        self.depth = entry;
        Ok(arm)
    }

    fn primary(&mut self) -> Result<Arm, TypeTextError> {
        self.skip_ws();
        match self.peek() {
            None => Err(TypeTextError::UnexpectedEnd),
            Some('(') => self.group(),
            Some('{') => self.object().map(Arm::Type),
            Some('[') => {
                // tuples are not synthesized
                self.skip_balanced('[', ']')?;
                Ok(Arm::Type(TypeDesc::Unknown))
            }
            Some(q @ ('"' | '\'' | '`')) => self.literal(q).map(Arm::Literal),
            Some(c) if c == '-' || c.is_ascii_digit() => {
                self.number_literal()?;
                Ok(Arm::Type(TypeDesc::number()))
            }
            Some(c) if is_ident_start(c) => self.named(),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn group(&mut self) -> Result<Arm, TypeTextError> {
        let open = self.pos;
        self.skip_balanced('(', ')')?;
        let close = self.pos;
        if self.eat_str("=>") {
            // function type: consume the return type and give up on it
            let entry = self.depth;
            self.descend()?;
            self.postfix()?;
            self.depth = entry;
            return Ok(Arm::Type(TypeDesc::Unknown));
        }
        let inner = &self.src[open + 1..close - 1];
        let mut sub = Parser::new(inner, self.base + open + 1, self.depth);
        let ty = sub.union()?;
        sub.finish()?;
        Ok(Arm::Type(ty))
    }

    fn object(&mut self) -> Result<TypeDesc, TypeTextError> {
        self.descend()?;
        self.expect('{')?;
        let mut fields: Vec<Field> = Vec::new();
        loop {
            if self.eat('}') {
                break;
            }
            let name = self.member_name()?;
            self.eat('?');
            self.skip_ws();
            let ty = if self.peek() == Some('(') {
                // method signature
                self.skip_balanced('(', ')')?;
                self.expect(':')?;
                self.union()?;
                TypeDesc::Unknown
            } else {
                self.expect(':')?;
                self.union()?
            };
            if let Some(name) = name {
                if !fields.iter().any(|f| f.name == name) {
                    fields.push(Field { name, ty });
                }
            }
            if !(self.eat(';') || self.eat(',')) {
                self.expect('}')?;
                break;
            }
        }
        self.depth -= 1;
        Ok(TypeDesc::Object(fields))
    }

    /// `None` for index signatures, which carry no field.
    fn member_name(&mut self) -> Result<Option<String>, TypeTextError> {
        self.skip_ws();
        match self.peek() {
            Some('[') => {
                self.skip_balanced('[', ']')?;
                Ok(None)
            }
            Some(q @ ('"' | '\'')) => {
                let text = self.literal(q)?;
                Ok(Some(crate::ir::unquote(&text).to_string()))
            }
            Some(c) if is_ident_start(c) => {
                let mut word = self.ident();
                // `readonly` is a modifier unless it is the member itself
                while word == "readonly" {
                    match self.peek_after_ws() {
                        Some(q @ ('"' | '\'')) => {
                            self.skip_ws();
                            let text = self.literal(q)?;
                            return Ok(Some(crate::ir::unquote(&text).to_string()));
                        }
                        Some(c) if is_ident_start(c) => {
                            self.skip_ws();
                            word = self.ident();
                        }
                        _ => break,
                    }
                }
                Ok(Some(word.to_string()))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn named(&mut self) -> Result<Arm, TypeTextError> {
        let name = self.ident();
        let mut args = Vec::new();
        if self.eat('<') {
            args.push(self.union()?);
            while self.eat(',') {
                args.push(self.union()?);
            }
            self.expect('>')?;
        }
        Ok(match (name, args.len()) {
            ("string", 0) => Arm::Type(TypeDesc::string()),
            ("number" | "bigint", 0) => Arm::Type(TypeDesc::number()),
            ("boolean" | "true" | "false", 0) => Arm::Type(TypeDesc::boolean()),
            ("null" | "undefined" | "void", 0) => Arm::Nullish,
            ("object" | "Object", 0) => Arm::Type(TypeDesc::Object(Vec::new())),
            ("Array" | "ReadonlyArray", 0) => Arm::Type(TypeDesc::Array(None)),
            ("Array" | "ReadonlyArray", 1) => Arm::Type(Arm::Type(args.remove(0)).into_array()),
            _ => Arm::Type(TypeDesc::Unknown),
        })
    }

    fn literal(&mut self, quote: char) -> Result<String, TypeTextError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                None => return Err(TypeTextError::UnterminatedLiteral(self.base + start)),
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => break,
                Some(_) => {}
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    /// `-1`, `1_000`, `2.5`, `1e-3`, `10n`. Every part that is started must have digits.
    fn number_literal(&mut self) -> Result<(), TypeTextError> {
        if self.peek() == Some('-') {
            self.bump();
        }
        self.digits()?;
        if self.peek() == Some('.') {
            self.bump();
            self.digits()?;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            self.digits()?;
        }
        if self.peek() == Some('n') {
            self.bump();
        }
        Ok(())
    }

    fn digits(&mut self) -> Result<(), TypeTextError> {
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(self.unexpected());
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '_') {
            self.bump();
        }
        Ok(())
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn peek_ident(&self) -> Option<&'a str> {
        let rest = self.rest();
        let first = rest.chars().next()?;
        if !is_ident_start(first) {
            return None;
        }
        let end = rest.find(|c: char| !is_ident_continue(c)).unwrap_or(rest.len());
        Some(&rest[..end])
    }

    /// `word` is used as a type operator: followed by whitespace and more type.
    fn ident_is_prefix(&self, word: &str) -> bool {
        let after = &self.rest()[word.len()..];
        let trimmed = after.trim_start();
        after.len() != trimmed.len()
            && trimmed.chars().next().is_some_and(|c| !matches!(c, '|' | ']' | ')' | '>' | ',' | ';' | '}' | '['))
    }

    fn peek_after_ws(&self) -> Option<char> {
        self.rest().trim_start().chars().next()
    }

    /// Skip a bracketed run starting at `open`, honoring quotes.
    fn skip_balanced(&mut self, open: char, close: char) -> Result<(), TypeTextError> {
        self.skip_ws();
        if self.peek() != Some(open) {
            return Err(self.unexpected());
        }
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(TypeTextError::UnexpectedEnd),
                Some(q @ ('"' | '\'' | '`')) => {
                    self.literal(q)?;
                }
                Some(c) => {
                    self.bump();
                    if c == open {
                        depth += 1;
                        if depth > MAX_PARSE_DEPTH {
                            return Err(TypeTextError::TooDeep(MAX_PARSE_DEPTH));
                        }
                    } else if c == close {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
}

// X ∪ null → X, nested unions flattened, repeated arms merged
fn collapse_union(arms: Vec<Arm>) -> TypeDesc {
    let mut variants: Vec<Variant> = Vec::new();
    let mut push = |v: Variant| {
        if !variants.contains(&v) {
            variants.push(v);
        }
    };
    for arm in arms {
        match arm {
            Arm::Nullish => {}
            Arm::Literal(text) => push(Variant::Literal(text)),
            Arm::Type(TypeDesc::Union(inner)) => inner.into_iter().for_each(&mut push),
            Arm::Type(ty) => push(Variant::Type(ty)),
        }
    }
    match variants.len() {
        0 => TypeDesc::Unknown,
        1 => match variants.remove(0) {
            Variant::Type(ty) => ty,
            literal => TypeDesc::Union(vec![literal]),
        },
        _ => TypeDesc::Union(variants),
    }
}
