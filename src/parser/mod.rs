//! Recursive-descent parser from tokens to the unresolved syntax tree.
//!
//! The parser owns the lexer and pulls tokens on demand with one token of
//! lookahead beyond the current one. Each `parse_*` method consumes
//! exactly the tokens of its construct, so the grammar reads directly off
//! the call structure. Anything unexpected is an `Error::Syntax` carrying
//! the token's position, what the grammar wanted, and what it found.

mod constants;
mod functions;
mod globals;
mod instructions;
mod metadata;
mod types;

use crate::ast::Item;
use crate::error::{Error, Result};
use crate::ir::enums::{
    CallingConv, FnAttr, Linkage, ParamAttr, SelectionKind, UnnamedAddr, Visibility,
};
use crate::lexer::{Lexer, Token, TokenKind};

/// Parses a whole source file into top-level items in source order.
pub fn parse(src: &str) -> Result<Vec<Item>> {
    let mut parser = Parser::new(src)?;
    let mut items = Vec::new();
    while parser.tok.kind != TokenKind::Eof {
        items.push(parser.parse_item()?);
    }
    Ok(items)
}

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    /// The current token.
    tok: Token<'a>,
    peeked: Option<Token<'a>>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(src);
        let tok = lexer.next_token()?;
        Ok(Parser {
            lexer,
            tok,
            peeked: None,
        })
    }

    /// Consumes the current token and returns it.
    fn advance(&mut self) -> Result<Token<'a>> {
        let next = match self.peeked.take() {
            Some(tok) => tok,
            None => self.lexer.next_token()?,
        };
        Ok(std::mem::replace(&mut self.tok, next))
    }

    /// The token after the current one.
    fn peek(&mut self) -> Result<&TokenKind<'a>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(&self.peeked.as_ref().unwrap().kind)
    }

    fn err_expected(&self, expected: impl Into<String>) -> Error {
        Error::Syntax {
            span: self.tok.span,
            expected: expected.into(),
            found: self.tok.kind.describe(),
        }
    }

    /// The current token's word, if it is one.
    fn word(&self) -> Option<&'a str> {
        match self.tok.kind {
            TokenKind::Word(w) => Some(w),
            _ => None,
        }
    }

    fn eat_word(&mut self, word: &str) -> Result<bool> {
        if self.word() == Some(word) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.eat_word(word)? {
            Ok(())
        } else {
            Err(self.err_expected(format!("'{}'", word)))
        }
    }

    fn eat_punct(&mut self, c: char) -> Result<bool> {
        if self.tok.kind == TokenKind::Punct(c) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<()> {
        if self.eat_punct(c)? {
            Ok(())
        } else {
            Err(self.err_expected(format!("'{}'", c)))
        }
    }

    fn expect_str(&mut self) -> Result<String> {
        match self.tok.kind {
            TokenKind::Str(_) => match self.advance()?.kind {
                TokenKind::Str(s) => Ok(s),
                _ => unreachable!(),
            },
            _ => Err(self.err_expected("string literal")),
        }
    }

    fn expect_int(&mut self) -> Result<i128> {
        match self.tok.kind {
            TokenKind::Int(v) => {
                self.advance()?;
                Ok(v)
            }
            _ => Err(self.err_expected("integer")),
        }
    }

    fn expect_u64(&mut self) -> Result<u64> {
        let v = self.expect_int()?;
        u64::try_from(v).map_err(|_| self.err_expected("non-negative integer"))
    }

    fn expect_u32(&mut self) -> Result<u32> {
        let v = self.expect_int()?;
        u32::try_from(v).map_err(|_| self.err_expected("non-negative integer"))
    }

    fn parse_item(&mut self) -> Result<Item> {
        match &self.tok.kind {
            TokenKind::Word("source_filename") => {
                self.advance()?;
                self.expect_punct('=')?;
                Ok(Item::SourceFilename(self.expect_str()?))
            }
            TokenKind::Word("target") => {
                self.advance()?;
                let which = self
                    .word()
                    .ok_or_else(|| self.err_expected("'datalayout' or 'triple'"))?;
                match which {
                    "datalayout" => {
                        self.advance()?;
                        self.expect_punct('=')?;
                        Ok(Item::DataLayout(self.expect_str()?))
                    }
                    "triple" => {
                        self.advance()?;
                        self.expect_punct('=')?;
                        Ok(Item::TargetTriple(self.expect_str()?))
                    }
                    _ => Err(self.err_expected("'datalayout' or 'triple'")),
                }
            }
            TokenKind::Word("module") => {
                self.advance()?;
                self.expect_word("asm")?;
                Ok(Item::ModuleAsm(self.expect_str()?))
            }
            TokenKind::Word("declare") | TokenKind::Word("define") => {
                self.parse_function().map(Item::Function)
            }
            TokenKind::Word("attributes") => self.parse_attr_group_def(),
            TokenKind::GlobalNamed(_) | TokenKind::GlobalNum(_) => self.parse_global_item(),
            TokenKind::LocalNamed(_) => self.parse_type_def(),
            TokenKind::ComdatName(_) => self.parse_comdat_def(),
            TokenKind::MetadataNum(_) => self.parse_metadata_def(),
            TokenKind::MetadataName(_) => self.parse_named_metadata(),
            _ => Err(self.err_expected("top-level entity")),
        }
    }

    fn parse_comdat_def(&mut self) -> Result<Item> {
        let name = match self.advance()?.kind {
            TokenKind::ComdatName(name) => name,
            _ => unreachable!(),
        };
        self.expect_punct('=')?;
        self.expect_word("comdat")?;
        let word = self
            .word()
            .ok_or_else(|| self.err_expected("comdat selection kind"))?;
        let kind = SelectionKind::from_str(word)
            .ok_or_else(|| self.err_expected("comdat selection kind"))?;
        self.advance()?;
        Ok(Item::Comdat { name, kind })
    }

    fn parse_attr_group_def(&mut self) -> Result<Item> {
        self.expect_word("attributes")?;
        let id = match self.tok.kind {
            TokenKind::AttrGroup(n) => {
                self.advance()?;
                n
            }
            _ => return Err(self.err_expected("attribute group id")),
        };
        self.expect_punct('=')?;
        self.expect_punct('{')?;
        let mut attrs = Vec::new();
        while !self.eat_punct('}')? {
            attrs.push(self.parse_fn_attr()?);
        }
        Ok(Item::AttrGroup { id, attrs })
    }

    /// One function or call-site attribute: a keyword, `align N`, a string
    /// pair, or a `#N` group reference.
    fn parse_fn_attr(&mut self) -> Result<FnAttr> {
        match &self.tok.kind {
            TokenKind::Word("align") => {
                self.advance()?;
                Ok(FnAttr::Align(self.expect_u64()?))
            }
            TokenKind::Word(w) => {
                let w = w.to_string();
                self.advance()?;
                Ok(FnAttr::Word(w))
            }
            TokenKind::Str(_) => {
                let key = self.expect_str()?;
                let value = if self.eat_punct('=')? {
                    Some(self.expect_str()?)
                } else {
                    None
                };
                Ok(FnAttr::Str(key, value))
            }
            TokenKind::AttrGroup(n) => {
                let n = *n;
                self.advance()?;
                Ok(FnAttr::Group(n))
            }
            _ => Err(self.err_expected("attribute")),
        }
    }

    /// Zero or more parameter attributes in front of a value or name.
    fn parse_param_attrs(&mut self) -> Result<Vec<ParamAttr>> {
        let mut attrs = Vec::new();
        loop {
            match self.word() {
                Some("align") => {
                    self.advance()?;
                    attrs.push(ParamAttr::Align(self.expect_u64()?));
                }
                Some(w) => match ParamAttr::from_word(w) {
                    Some(attr) => {
                        self.advance()?;
                        attrs.push(attr);
                    }
                    None => break,
                },
                None => break,
            }
        }
        Ok(attrs)
    }

    fn parse_linkage(&mut self) -> Result<Option<Linkage>> {
        if let Some(w) = self.word() {
            if let Some(linkage) = Linkage::from_str(w) {
                self.advance()?;
                return Ok(Some(linkage));
            }
        }
        Ok(None)
    }

    fn parse_visibility(&mut self) -> Result<Option<Visibility>> {
        if let Some(w) = self.word() {
            if let Some(vis) = Visibility::from_str(w) {
                self.advance()?;
                return Ok(Some(vis));
            }
        }
        Ok(None)
    }

    fn parse_unnamed_addr(&mut self) -> Result<Option<UnnamedAddr>> {
        if let Some(w) = self.word() {
            if let Some(ua) = UnnamedAddr::from_str(w) {
                self.advance()?;
                return Ok(Some(ua));
            }
        }
        Ok(None)
    }

    fn parse_cconv(&mut self) -> Result<Option<CallingConv>> {
        if let Some(w) = self.word() {
            if let Some(cc) = CallingConv::from_str(w) {
                self.advance()?;
                return Ok(Some(cc));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Item;
    use crate::ir::enums::FnAttr;

    #[test]
    fn test_parse_module_header_lines() {
        let items = parse(
            "source_filename = \"t.c\"\n\
             target datalayout = \"e-m:e\"\n\
             target triple = \"x86_64-unknown-linux-gnu\"\n\
             module asm \".globl foo\"",
        )
        .unwrap();
        assert_eq!(
            items,
            vec![
                Item::SourceFilename("t.c".into()),
                Item::DataLayout("e-m:e".into()),
                Item::TargetTriple("x86_64-unknown-linux-gnu".into()),
                Item::ModuleAsm(".globl foo".into()),
            ]
        );
    }

    #[test]
    fn test_parse_comdat_def() {
        let items = parse("$c = comdat largest").unwrap();
        assert_eq!(
            items,
            vec![Item::Comdat {
                name: "c".into(),
                kind: SelectionKind::Largest,
            }]
        );
    }

    #[test]
    fn test_parse_attr_group() {
        let items = parse("attributes #0 = { noinline nounwind \"frame-pointer\"=\"all\" }")
            .unwrap();
        assert_eq!(
            items,
            vec![Item::AttrGroup {
                id: 0,
                attrs: vec![
                    FnAttr::Word("noinline".into()),
                    FnAttr::Word("nounwind".into()),
                    FnAttr::Str("frame-pointer".into(), Some("all".into())),
                ],
            }]
        );
    }

    #[test]
    fn test_parse_error_carries_position() {
        let err = parse("target triple 3").unwrap_err();
        match err {
            Error::Syntax {
                span,
                expected,
                found,
            } => {
                assert_eq!((span.line, span.col), (1, 15));
                assert_eq!(expected, "'='");
                assert_eq!(found, "integer 3");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_stray_token() {
        assert!(matches!(parse(") "), Err(Error::Syntax { .. })));
    }
}
