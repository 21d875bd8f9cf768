//! Type grammar: base types plus pointer and function suffixes.

use super::Parser;
use crate::ast::Item;
use crate::error::Result;
use crate::ir::float::FloatKind;
use crate::ir::types::Type;
use crate::lexer::TokenKind;

impl<'a> Parser<'a> {
    /// `%name = type <body>` or `%name = type opaque`.
    pub(super) fn parse_type_def(&mut self) -> Result<Item> {
        let name = match self.advance()?.kind {
            TokenKind::LocalNamed(name) => name,
            _ => unreachable!(),
        };
        self.expect_punct('=')?;
        self.expect_word("type")?;
        let body = if self.eat_word("opaque")? {
            None
        } else {
            Some(self.parse_type()?)
        };
        Ok(Item::TypeDef { name, body })
    }

    pub(super) fn parse_type(&mut self) -> Result<Type> {
        let base = self.parse_base_type()?;
        self.parse_type_suffix(base)
    }

    fn parse_base_type(&mut self) -> Result<Type> {
        match &self.tok.kind {
            TokenKind::Word(w) => {
                let ty = match *w {
                    "void" => Type::Void,
                    "label" => Type::Label,
                    "metadata" => Type::Metadata,
                    "token" => Type::Token,
                    w => {
                        if let Some(kind) = FloatKind::from_str(w) {
                            Type::Float(kind)
                        } else if let Some(bits) = parse_int_type(w) {
                            Type::Int(bits)
                        } else {
                            return Err(self.err_expected("type"));
                        }
                    }
                };
                self.advance()?;
                Ok(ty)
            }
            TokenKind::LocalNamed(_) => match self.advance()?.kind {
                TokenKind::LocalNamed(name) => Ok(Type::Named(name)),
                _ => unreachable!(),
            },
            TokenKind::Punct('[') => {
                self.advance()?;
                let len = self.expect_u64()?;
                self.expect_word("x")?;
                let elem = self.parse_type()?;
                self.expect_punct(']')?;
                Ok(Type::Array {
                    len,
                    elem: Box::new(elem),
                })
            }
            TokenKind::Punct('{') => {
                self.advance()?;
                let fields = self.parse_struct_fields('}')?;
                Ok(Type::Struct {
                    fields,
                    packed: false,
                })
            }
            TokenKind::Punct('<') => {
                self.advance()?;
                if self.eat_punct('{')? {
                    let fields = self.parse_struct_fields('}')?;
                    self.expect_punct('>')?;
                    return Ok(Type::Struct {
                        fields,
                        packed: true,
                    });
                }
                let scalable = self.eat_word("vscale")?;
                if scalable {
                    self.expect_word("x")?;
                }
                let len = self.expect_u64()?;
                self.expect_word("x")?;
                let elem = self.parse_type()?;
                self.expect_punct('>')?;
                Ok(Type::Vector {
                    len,
                    elem: Box::new(elem),
                    scalable,
                })
            }
            _ => Err(self.err_expected("type")),
        }
    }

    fn parse_struct_fields(&mut self, close: char) -> Result<Vec<Type>> {
        let mut fields = Vec::new();
        if self.eat_punct(close)? {
            return Ok(fields);
        }
        loop {
            fields.push(self.parse_type()?);
            if !self.eat_punct(',')? {
                break;
            }
        }
        self.expect_punct(close)?;
        Ok(fields)
    }

    /// Pointer stars, address spaces, and function parameter lists bind
    /// tighter left to right: `i32 (i8*)*` is a pointer to a function.
    fn parse_type_suffix(&mut self, mut ty: Type) -> Result<Type> {
        loop {
            match &self.tok.kind {
                TokenKind::Punct('*') => {
                    self.advance()?;
                    ty = Type::Ptr {
                        pointee: Box::new(ty),
                        addr_space: 0,
                    };
                }
                TokenKind::Word("addrspace") => {
                    self.advance()?;
                    self.expect_punct('(')?;
                    let addr_space = self.expect_u32()?;
                    self.expect_punct(')')?;
                    self.expect_punct('*')?;
                    ty = Type::Ptr {
                        pointee: Box::new(ty),
                        addr_space,
                    };
                }
                TokenKind::Punct('(') => {
                    self.advance()?;
                    let mut params = Vec::new();
                    let mut variadic = false;
                    if !self.eat_punct(')')? {
                        loop {
                            if self.tok.kind == TokenKind::Ellipsis {
                                self.advance()?;
                                variadic = true;
                                break;
                            }
                            params.push(self.parse_type()?);
                            if !self.eat_punct(',')? {
                                break;
                            }
                        }
                        self.expect_punct(')')?;
                    }
                    ty = Type::Func {
                        ret: Box::new(ty),
                        params,
                        variadic,
                    };
                }
                _ => return Ok(ty),
            }
        }
    }
}

/// `iN` with 1 <= N <= 2^23, digits only after the `i`.
fn parse_int_type(word: &str) -> Option<u32> {
    let digits = word.strip_prefix('i')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let bits: u32 = digits.parse().ok()?;
    if (1..=1 << 23).contains(&bits) {
        Some(bits)
    } else {
        None
    }
}
