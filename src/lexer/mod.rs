//! The lexer: raw text to a lazy token stream.
//!
//! `Lexer::next_token` yields one token at a time; the parser drives it
//! and keeps its own lookahead. State is a byte cursor plus line/column
//! tracking, so lexing is restartable per file and never allocates except
//! for quoted names and string bodies.

use crate::error::{Error, Result, Span};
use crate::ir::float::HexFloatKind;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    /// `@name` or `@"quoted"`
    GlobalNamed(String),
    /// `@42`
    GlobalNum(u64),
    /// `%name` or `%"quoted"`
    LocalNamed(String),
    /// `%42`
    LocalNum(u64),
    /// `!name` (possibly dotted, as in `!llvm.module.flags`)
    MetadataName(String),
    /// `!42`
    MetadataNum(u64),
    /// `!"..."`
    MetadataStr(String),
    /// `#42`
    AttrGroup(u64),
    /// `$name` or `$"quoted"`
    ComdatName(String),
    /// A bare keyword, opcode, or type word such as `define` or `i32`.
    Word(&'a str),
    Int(i128),
    Float(f64),
    /// Hexadecimal float literal with its exact bit pattern.
    HexFloat { kind: HexFloatKind, bits: u128 },
    /// `"..."` with escapes decoded.
    Str(String),
    /// `c"..."` with escapes decoded.
    CStr(Vec<u8>),
    Punct(char),
    /// `...`
    Ellipsis,
    Eof,
}

impl TokenKind<'_> {
    /// Short human description for expected-vs-found diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::GlobalNamed(name) => format!("@{}", name),
            TokenKind::GlobalNum(n) => format!("@{}", n),
            TokenKind::LocalNamed(name) => format!("%{}", name),
            TokenKind::LocalNum(n) => format!("%{}", n),
            TokenKind::MetadataName(name) => format!("!{}", name),
            TokenKind::MetadataNum(n) => format!("!{}", n),
            TokenKind::MetadataStr(s) => format!("!\"{}\"", s),
            TokenKind::AttrGroup(n) => format!("#{}", n),
            TokenKind::ComdatName(name) => format!("${}", name),
            TokenKind::Word(w) => format!("'{}'", w),
            TokenKind::Int(v) => format!("integer {}", v),
            TokenKind::Float(v) => format!("float {}", v),
            TokenKind::HexFloat { .. } => "hex float".to_string(),
            TokenKind::Str(s) => format!("\"{}\"", s),
            TokenKind::CStr(_) => "byte string".to_string(),
            TokenKind::Punct(c) => format!("'{}'", c),
            TokenKind::Ellipsis => "'...'".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'$' || b == b'.' || b == b'_'
}

fn is_ident_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'$' || b == b'.' || b == b'_'
}

fn is_md_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'$' || b == b'.' || b == b'_' || b == b'-'
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    fn err(&self, span: Span, message: impl Into<String>) -> Error {
        Error::Lex {
            span,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.bump();
            } else if b == b';' {
                while let Some(b) = self.peek() {
                    if b == b'\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    /// Reads the remainder of a quoted string (the opening `"` is already
    /// consumed), decoding `\\` and `\XX` escapes into bytes.
    fn read_quoted_bytes(&mut self, start: Span) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            match self.bump() {
                None => return Err(self.err(start, "unterminated string literal")),
                Some(b'"') => return Ok(out),
                Some(b'\\') => match self.bump() {
                    Some(b'\\') => out.push(b'\\'),
                    Some(hi) if hi.is_ascii_hexdigit() => {
                        let lo = self
                            .bump()
                            .filter(|b| b.is_ascii_hexdigit())
                            .ok_or_else(|| self.err(start, "invalid \\XX escape"))?;
                        let hex = [hi, lo];
                        let text = std::str::from_utf8(&hex).unwrap();
                        out.push(u8::from_str_radix(text, 16).unwrap());
                    }
                    _ => return Err(self.err(start, "invalid escape in string literal")),
                },
                Some(b) => out.push(b),
            }
        }
    }

    fn read_quoted_string(&mut self, start: Span) -> Result<String> {
        let bytes = self.read_quoted_bytes(start)?;
        String::from_utf8(bytes).map_err(|_| self.err(start, "string literal is not valid UTF-8"))
    }

    /// Reads an identifier body in the unquoted charset; `self.pos` must
    /// already sit on an identifier-start byte.
    fn read_ident(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_ident_cont(b) {
                self.bump();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    fn read_digits(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    /// Reads a sigil-prefixed name: quoted, numeric, or unquoted. The
    /// sigil itself is already consumed.
    fn read_sigil_name(&mut self, start: Span, sigil: char) -> Result<SigilName> {
        match self.peek() {
            Some(b'"') => {
                self.bump();
                Ok(SigilName::Named(self.read_quoted_string(start)?))
            }
            Some(b) if b.is_ascii_digit() => {
                let digits = self.read_digits();
                let n = digits
                    .parse::<u64>()
                    .map_err(|_| self.err(start, format!("{}{} out of range", sigil, digits)))?;
                Ok(SigilName::Num(n))
            }
            Some(b) if is_ident_start(b) => Ok(SigilName::Named(self.read_ident().to_string())),
            _ => Err(self.err(start, format!("expected name after '{}'", sigil))),
        }
    }

    fn lex_number(&mut self, start: Span) -> Result<TokenKind<'a>> {
        let neg = self.peek() == Some(b'-');
        if neg {
            self.bump();
        }
        if !neg && self.peek() == Some(b'0') && self.peek_at(1) == Some(b'x') {
            self.bump();
            self.bump();
            let kind = match self.peek() {
                Some(b'H') => {
                    self.bump();
                    HexFloatKind::Half
                }
                Some(b'K') => {
                    self.bump();
                    HexFloatKind::X86Fp80
                }
                Some(b'L') => {
                    self.bump();
                    HexFloatKind::Fp128
                }
                Some(b'M') => {
                    self.bump();
                    HexFloatKind::PpcFp128
                }
                _ => HexFloatKind::Double,
            };
            let digit_start = self.pos;
            while let Some(b) = self.peek() {
                if b.is_ascii_hexdigit() {
                    self.bump();
                } else {
                    break;
                }
            }
            let digits = &self.src[digit_start..self.pos];
            if digits.is_empty() || digits.len() > kind.digits() {
                return Err(self.err(
                    start,
                    format!(
                        "hex float literal needs 1-{} hex digits, found {}",
                        kind.digits(),
                        digits.len()
                    ),
                ));
            }
            let bits = u128::from_str_radix(digits, 16)
                .map_err(|_| self.err(start, "invalid hex float literal"))?;
            return Ok(TokenKind::HexFloat { kind, bits });
        }

        let digit_start = self.pos;
        self.read_digits();
        if self.pos == digit_start {
            return Err(self.err(start, "expected digits after '-'"));
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') {
            is_float = true;
            self.bump();
            self.read_digits();
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            is_float = true;
            self.bump();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.bump();
            }
            if self.read_digits().is_empty() {
                return Err(self.err(start, "missing exponent digits in float literal"));
            }
        }
        let text = &self.src[digit_start..self.pos];
        if is_float {
            let v: f64 = text
                .parse()
                .map_err(|_| self.err(start, format!("invalid float literal {}", text)))?;
            Ok(TokenKind::Float(if neg { -v } else { v }))
        } else {
            let v: i128 = text
                .parse()
                .map_err(|_| self.err(start, format!("integer literal {} out of range", text)))?;
            Ok(TokenKind::Int(if neg { -v } else { v }))
        }
    }

    /// Produces the next token, or `TokenKind::Eof` at end of input.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        self.skip_trivia();
        let span = self.span();
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(b'@') => {
                self.bump();
                match self.read_sigil_name(span, '@')? {
                    SigilName::Named(name) => TokenKind::GlobalNamed(name),
                    SigilName::Num(n) => TokenKind::GlobalNum(n),
                }
            }
            Some(b'%') => {
                self.bump();
                match self.read_sigil_name(span, '%')? {
                    SigilName::Named(name) => TokenKind::LocalNamed(name),
                    SigilName::Num(n) => TokenKind::LocalNum(n),
                }
            }
            Some(b'$') => {
                self.bump();
                match self.read_sigil_name(span, '$')? {
                    SigilName::Named(name) => TokenKind::ComdatName(name),
                    SigilName::Num(n) => TokenKind::ComdatName(n.to_string()),
                }
            }
            Some(b'#') => {
                self.bump();
                let digits = self.read_digits();
                if digits.is_empty() {
                    return Err(self.err(span, "expected attribute group number after '#'"));
                }
                let n = digits
                    .parse::<u64>()
                    .map_err(|_| self.err(span, "attribute group number out of range"))?;
                TokenKind::AttrGroup(n)
            }
            Some(b'!') => {
                self.bump();
                match self.peek() {
                    Some(b'"') => {
                        self.bump();
                        TokenKind::MetadataStr(self.read_quoted_string(span)?)
                    }
                    Some(b) if b.is_ascii_digit() => {
                        let digits = self.read_digits();
                        let n = digits
                            .parse::<u64>()
                            .map_err(|_| self.err(span, "metadata number out of range"))?;
                        TokenKind::MetadataNum(n)
                    }
                    Some(b) if is_md_name_byte(b) && !b.is_ascii_digit() => {
                        let start = self.pos;
                        while let Some(b) = self.peek() {
                            if is_md_name_byte(b) {
                                self.bump();
                            } else {
                                break;
                            }
                        }
                        TokenKind::MetadataName(self.src[start..self.pos].to_string())
                    }
                    _ => TokenKind::Punct('!'),
                }
            }
            Some(b'"') => {
                self.bump();
                TokenKind::Str(self.read_quoted_string(span)?)
            }
            Some(b'c') if self.peek_at(1) == Some(b'"') => {
                self.bump();
                self.bump();
                TokenKind::CStr(self.read_quoted_bytes(span)?)
            }
            Some(b'.') if self.peek_at(1) == Some(b'.') && self.peek_at(2) == Some(b'.') => {
                self.bump();
                self.bump();
                self.bump();
                TokenKind::Ellipsis
            }
            Some(b) if b.is_ascii_digit() || b == b'-' => self.lex_number(span)?,
            Some(b) if is_ident_start(b) => TokenKind::Word(self.read_ident()),
            Some(b @ (b'=' | b',' | b'(' | b')' | b'{' | b'}' | b'[' | b']' | b'<' | b'>'
            | b'*' | b':')) => {
                self.bump();
                TokenKind::Punct(b as char)
            }
            Some(b) => {
                return Err(self.err(span, format!("illegal character '{}'", b as char)));
            }
        };
        Ok(Token { kind, span })
    }
}

enum SigilName {
    Named(String),
    Num(u64),
}
