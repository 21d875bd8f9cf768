//! Metadata definitions and named metadata.

use super::Parser;
use crate::ast::{Item, MdOperand};
use crate::error::Result;
use crate::lexer::TokenKind;

impl<'a> Parser<'a> {
    /// `!N = [distinct] !{ operands }`
    pub(super) fn parse_metadata_def(&mut self) -> Result<Item> {
        let id = match self.advance()?.kind {
            TokenKind::MetadataNum(n) => n,
            _ => unreachable!(),
        };
        self.expect_punct('=')?;
        let distinct = self.eat_word("distinct")?;
        self.expect_punct('!')?;
        self.expect_punct('{')?;
        let mut operands = Vec::new();
        if !self.eat_punct('}')? {
            loop {
                operands.push(self.parse_md_operand()?);
                if !self.eat_punct(',')? {
                    break;
                }
            }
            self.expect_punct('}')?;
        }
        Ok(Item::MetadataDef {
            id,
            distinct,
            operands,
        })
    }

    /// `!name = !{!0, !1, ...}`
    pub(super) fn parse_named_metadata(&mut self) -> Result<Item> {
        let name = match self.advance()?.kind {
            TokenKind::MetadataName(name) => name,
            _ => unreachable!(),
        };
        self.expect_punct('=')?;
        self.expect_punct('!')?;
        self.expect_punct('{')?;
        let mut nodes = Vec::new();
        if !self.eat_punct('}')? {
            loop {
                match self.tok.kind {
                    TokenKind::MetadataNum(n) => {
                        self.advance()?;
                        nodes.push(n);
                    }
                    _ => return Err(self.err_expected("metadata node reference")),
                }
                if !self.eat_punct(',')? {
                    break;
                }
            }
            self.expect_punct('}')?;
        }
        Ok(Item::NamedMetadata { name, nodes })
    }

    fn parse_md_operand(&mut self) -> Result<MdOperand> {
        match &self.tok.kind {
            TokenKind::Word("null") => {
                self.advance()?;
                Ok(MdOperand::Null)
            }
            TokenKind::MetadataStr(_) => match self.advance()?.kind {
                TokenKind::MetadataStr(s) => Ok(MdOperand::Str(s)),
                _ => unreachable!(),
            },
            TokenKind::MetadataNum(n) => {
                let n = *n;
                self.advance()?;
                Ok(MdOperand::Node(n))
            }
            _ => Ok(MdOperand::Value(self.parse_typed_value()?)),
        }
    }
}
