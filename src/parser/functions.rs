//! Function headers, bodies, and terminators.

use super::Parser;
use crate::ast::{Block, FuncDef, Param, SwitchCase, Term};
use crate::error::Result;
use crate::ir::enums::FnAttr;
use crate::ir::types::LocalIdent;
use crate::lexer::TokenKind;

/// Keyword attributes accepted in function and call-site attribute
/// position. The set is closed so that a following top-level keyword
/// (`define`, `target`, ...) is never swallowed as an attribute.
pub(super) fn is_fn_attr_word(word: &str) -> bool {
    matches!(
        word,
        "alwaysinline"
            | "argmemonly"
            | "builtin"
            | "cold"
            | "convergent"
            | "hot"
            | "inlinehint"
            | "minsize"
            | "mustprogress"
            | "naked"
            | "nobuiltin"
            | "nofree"
            | "noinline"
            | "norecurse"
            | "noreturn"
            | "nosync"
            | "nounwind"
            | "optnone"
            | "optsize"
            | "readnone"
            | "readonly"
            | "sanitize_address"
            | "sanitize_memory"
            | "sanitize_thread"
            | "speculatable"
            | "ssp"
            | "sspreq"
            | "sspstrong"
            | "strictfp"
            | "uwtable"
            | "willreturn"
            | "writeonly"
    )
}

impl<'a> Parser<'a> {
    /// `declare ...` or `define ... { blocks }`.
    pub(super) fn parse_function(&mut self) -> Result<FuncDef> {
        let is_definition = self.eat_word("define")?;
        if !is_definition {
            self.expect_word("declare")?;
        }
        let linkage = self.parse_linkage()?;
        let visibility = self.parse_visibility()?;
        let cconv = self.parse_cconv()?;
        let ret_attrs = self.parse_param_attrs()?;
        let ret_ty = self.parse_type()?;
        let name = self.parse_global_ident()?;
        let (params, variadic) = self.parse_fn_params()?;
        let unnamed_addr = self.parse_unnamed_addr()?;

        let mut attrs = Vec::new();
        let mut section = None;
        let mut comdat = None;
        let mut align = None;
        let mut metadata = Vec::new();
        loop {
            match &self.tok.kind {
                TokenKind::Word("section") => {
                    self.advance()?;
                    section = Some(self.expect_str()?);
                }
                TokenKind::Word("comdat") => {
                    self.advance()?;
                    comdat = Some(self.parse_comdat_ref(&name)?);
                }
                TokenKind::Word("align") => {
                    self.advance()?;
                    align = Some(self.expect_u64()?);
                }
                TokenKind::Word(w) if is_fn_attr_word(w) => {
                    attrs.push(FnAttr::Word(w.to_string()));
                    self.advance()?;
                }
                TokenKind::Str(_) | TokenKind::AttrGroup(_) => {
                    attrs.push(self.parse_fn_attr()?);
                }
                TokenKind::MetadataName(_) => {
                    let kind = match self.advance()?.kind {
                        TokenKind::MetadataName(kind) => kind,
                        _ => unreachable!(),
                    };
                    let node = match self.tok.kind {
                        TokenKind::MetadataNum(n) => {
                            self.advance()?;
                            n
                        }
                        _ => return Err(self.err_expected("metadata node reference")),
                    };
                    metadata.push((kind, node));
                }
                _ => break,
            }
        }

        let blocks = if is_definition {
            self.parse_blocks()?
        } else {
            Vec::new()
        };

        Ok(FuncDef {
            is_definition,
            name,
            linkage,
            visibility,
            cconv,
            unnamed_addr,
            ret_attrs,
            ret_ty,
            params,
            variadic,
            attrs,
            section,
            comdat,
            align,
            metadata,
            blocks,
        })
    }

    fn parse_fn_params(&mut self) -> Result<(Vec<Param>, bool)> {
        self.expect_punct('(')?;
        let mut params = Vec::new();
        let mut variadic = false;
        if !self.eat_punct(')')? {
            loop {
                if self.tok.kind == TokenKind::Ellipsis {
                    self.advance()?;
                    variadic = true;
                    break;
                }
                let ty = self.parse_type()?;
                let attrs = self.parse_param_attrs()?;
                let name = match self.tok.kind {
                    TokenKind::LocalNamed(_) | TokenKind::LocalNum(_) => {
                        Some(self.parse_local_ident()?)
                    }
                    _ => None,
                };
                params.push(Param { ty, attrs, name });
                if !self.eat_punct(',')? {
                    break;
                }
            }
            self.expect_punct(')')?;
        }
        Ok((params, variadic))
    }

    fn parse_blocks(&mut self) -> Result<Vec<Block>> {
        self.expect_punct('{')?;
        let mut blocks = Vec::new();
        while !self.eat_punct('}')? {
            blocks.push(self.parse_block()?);
        }
        Ok(blocks)
    }

    fn parse_block(&mut self) -> Result<Block> {
        let label = self.parse_block_label()?;
        let mut insts = Vec::new();
        loop {
            if let Some(term) = self.try_parse_terminator()? {
                return Ok(Block { label, insts, term });
            }
            insts.push(self.parse_inst()?);
        }
    }

    /// A label is a word, string, or number directly followed by `:`.
    fn parse_block_label(&mut self) -> Result<Option<LocalIdent>> {
        let can_label = matches!(
            self.tok.kind,
            TokenKind::Word(_) | TokenKind::Str(_) | TokenKind::Int(_)
        );
        if !can_label || *self.peek()? != TokenKind::Punct(':') {
            return Ok(None);
        }
        let tok = self.advance()?;
        self.expect_punct(':')?;
        Ok(Some(match tok.kind {
            TokenKind::Word(w) => LocalIdent::Named(w.to_string()),
            TokenKind::Str(s) => LocalIdent::Named(s),
            TokenKind::Int(v) => {
                let n = u64::try_from(v).map_err(|_| self.err_expected("block label"))?;
                LocalIdent::Num(n)
            }
            _ => unreachable!(),
        }))
    }

    /// `label %dest`
    fn parse_label_ref(&mut self) -> Result<LocalIdent> {
        self.expect_word("label")?;
        self.parse_local_ident()
    }

    fn try_parse_terminator(&mut self) -> Result<Option<Term>> {
        let term = match self.word() {
            Some("ret") => {
                self.advance()?;
                if self.eat_word("void")? {
                    Term::Ret(None)
                } else {
                    Term::Ret(Some(self.parse_typed_value()?))
                }
            }
            Some("br") => {
                self.advance()?;
                if self.word() == Some("label") {
                    Term::Br(self.parse_label_ref()?)
                } else {
                    let cond = self.parse_typed_value()?;
                    self.expect_punct(',')?;
                    let if_true = self.parse_label_ref()?;
                    self.expect_punct(',')?;
                    let if_false = self.parse_label_ref()?;
                    Term::CondBr {
                        cond,
                        if_true,
                        if_false,
                    }
                }
            }
            Some("switch") => {
                self.advance()?;
                let value = self.parse_typed_value()?;
                self.expect_punct(',')?;
                let default = self.parse_label_ref()?;
                self.expect_punct('[')?;
                let mut cases = Vec::new();
                while !self.eat_punct(']')? {
                    let ty = self.parse_type()?;
                    let case_value = self.parse_const()?;
                    self.expect_punct(',')?;
                    let dest = self.parse_label_ref()?;
                    cases.push(SwitchCase {
                        ty,
                        value: case_value,
                        dest,
                    });
                }
                Term::Switch {
                    value,
                    default,
                    cases,
                }
            }
            Some("unreachable") => {
                self.advance()?;
                Term::Unreachable
            }
            _ => return Ok(None),
        };
        Ok(Some(term))
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use crate::ast::{AstValue, Item, TypedValue};
    use crate::ir::enums::{Linkage, ParamAttr};
    use crate::ir::types::{GlobalIdent, Type};

    fn parse_fn(src: &str) -> FuncDef {
        match parse(src).unwrap().into_iter().next().unwrap() {
            Item::Function(func) => func,
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_parse_declare() {
        let f = parse_fn("declare i32 @printf(i8* nocapture, ...)");
        assert!(!f.is_definition);
        assert_eq!(f.name, GlobalIdent::Named("printf".into()));
        assert_eq!(f.ret_ty, Type::Int(32));
        assert!(f.variadic);
        assert_eq!(f.params.len(), 1);
        assert_eq!(f.params[0].ty, Type::Int(8).ptr_to());
        assert_eq!(f.params[0].attrs, vec![ParamAttr::NoCapture]);
        assert_eq!(f.params[0].name, None);
        assert!(f.blocks.is_empty());
    }

    #[test]
    fn test_parse_define_header() {
        let f = parse_fn(
            "define internal fastcc i32 @f(i32 %a) unnamed_addr noinline #0 section \".text.f\" align 16 !dbg !3 {\n\
             ret i32 %a\n\
             }",
        );
        assert!(f.is_definition);
        assert_eq!(f.linkage, Some(Linkage::Internal));
        assert_eq!(
            f.attrs,
            vec![FnAttr::Word("noinline".into()), FnAttr::Group(0)]
        );
        assert_eq!(f.section.as_deref(), Some(".text.f"));
        assert_eq!(f.align, Some(16));
        assert_eq!(f.metadata, vec![("dbg".into(), 3)]);
        assert_eq!(f.blocks.len(), 1);
    }

    #[test]
    fn test_parse_blocks_and_labels() {
        let f = parse_fn(
            "define void @f() {\n\
             entry:\n\
             br label %1\n\
             1:\n\
             br label %\"odd name\"\n\
             \"odd name\":\n\
             ret void\n\
             }",
        );
        assert_eq!(f.blocks.len(), 3);
        assert_eq!(f.blocks[0].label, Some(LocalIdent::Named("entry".into())));
        assert_eq!(f.blocks[1].label, Some(LocalIdent::Num(1)));
        assert_eq!(
            f.blocks[2].label,
            Some(LocalIdent::Named("odd name".into()))
        );
        assert_eq!(f.blocks[0].term, Term::Br(LocalIdent::Num(1)));
    }

    #[test]
    fn test_parse_unlabeled_entry_block() {
        let f = parse_fn("define void @f() {\nret void\n}");
        assert_eq!(f.blocks.len(), 1);
        assert_eq!(f.blocks[0].label, None);
        assert_eq!(f.blocks[0].term, Term::Ret(None));
    }

    #[test]
    fn test_parse_cond_br_and_switch() {
        let f = parse_fn(
            "define void @f(i1 %c, i32 %x) {\n\
             br i1 %c, label %a, label %b\n\
             a:\n\
             switch i32 %x, label %b [\n\
               i32 0, label %a\n\
               i32 1, label %b\n\
             ]\n\
             b:\n\
             unreachable\n\
             }",
        );
        assert_eq!(
            f.blocks[0].term,
            Term::CondBr {
                cond: TypedValue {
                    ty: Type::Int(1),
                    value: AstValue::Local(LocalIdent::Named("c".into())),
                },
                if_true: LocalIdent::Named("a".into()),
                if_false: LocalIdent::Named("b".into()),
            }
        );
        match &f.blocks[1].term {
            Term::Switch { default, cases, .. } => {
                assert_eq!(*default, LocalIdent::Named("b".into()));
                assert_eq!(cases.len(), 2);
                assert_eq!(cases[1].dest, LocalIdent::Named("b".into()));
            }
            other => panic!("unexpected terminator {:?}", other),
        }
        assert_eq!(f.blocks[2].term, Term::Unreachable);
    }
}
