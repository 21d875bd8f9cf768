//! Constant expressions and instruction operands.

use super::Parser;
use crate::ast::{AstValue, Const, TypedConst, TypedValue};
use crate::error::Result;
use crate::ir::enums::ConvOp;
use crate::ir::types::{GlobalIdent, LocalIdent};
use crate::lexer::TokenKind;

impl<'a> Parser<'a> {
    /// `<type> <constant>`
    pub(super) fn parse_typed_const(&mut self) -> Result<TypedConst> {
        let ty = self.parse_type()?;
        let value = self.parse_const()?;
        Ok(TypedConst { ty, value })
    }

    /// `<type> <value>` where the value may also be a local.
    pub(super) fn parse_typed_value(&mut self) -> Result<TypedValue> {
        let ty = self.parse_type()?;
        let value = self.parse_value()?;
        Ok(TypedValue { ty, value })
    }

    /// A local or a constant, type known from context.
    pub(super) fn parse_value(&mut self) -> Result<AstValue> {
        match &self.tok.kind {
            TokenKind::LocalNamed(_) | TokenKind::LocalNum(_) => {
                Ok(AstValue::Local(self.parse_local_ident()?))
            }
            _ => Ok(AstValue::Const(self.parse_const()?)),
        }
    }

    pub(super) fn parse_local_ident(&mut self) -> Result<LocalIdent> {
        match self.advance()?.kind {
            TokenKind::LocalNamed(name) => Ok(LocalIdent::Named(name)),
            TokenKind::LocalNum(n) => Ok(LocalIdent::Num(n)),
            _ => Err(self.err_expected("local identifier")),
        }
    }

    pub(super) fn parse_global_ident(&mut self) -> Result<GlobalIdent> {
        match self.advance()?.kind {
            TokenKind::GlobalNamed(name) => Ok(GlobalIdent::Named(name)),
            TokenKind::GlobalNum(n) => Ok(GlobalIdent::Num(n)),
            _ => Err(self.err_expected("global identifier")),
        }
    }

    /// True when the current token can begin a constant. Used to decide
    /// whether a global has an initializer.
    pub(super) fn starts_const(&self) -> bool {
        match &self.tok.kind {
            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::HexFloat { .. }
            | TokenKind::CStr(_)
            | TokenKind::GlobalNamed(_)
            | TokenKind::GlobalNum(_)
            | TokenKind::Punct('{')
            | TokenKind::Punct('[')
            | TokenKind::Punct('<') => true,
            TokenKind::Word(w) => matches!(
                *w,
                "null" | "undef" | "poison" | "zeroinitializer" | "true" | "false"
                    | "getelementptr"
            ) || ConvOp::from_str(w).is_some(),
            _ => false,
        }
    }

    pub(super) fn parse_const(&mut self) -> Result<Const> {
        match &self.tok.kind {
            TokenKind::Int(v) => {
                let v = *v;
                self.advance()?;
                Ok(Const::Int(v))
            }
            TokenKind::Float(v) => {
                let v = *v;
                self.advance()?;
                Ok(Const::Float(v))
            }
            TokenKind::HexFloat { kind, bits } => {
                let (kind, bits) = (*kind, *bits);
                self.advance()?;
                Ok(Const::HexFloat { kind, bits })
            }
            TokenKind::CStr(_) => match self.advance()?.kind {
                TokenKind::CStr(bytes) => Ok(Const::CStr(bytes)),
                _ => unreachable!(),
            },
            TokenKind::GlobalNamed(_) | TokenKind::GlobalNum(_) => {
                Ok(Const::Global(self.parse_global_ident()?))
            }
            TokenKind::Punct('{') => {
                self.advance()?;
                Ok(Const::Struct(self.parse_const_list('}')?))
            }
            TokenKind::Punct('[') => {
                self.advance()?;
                Ok(Const::Array(self.parse_const_list(']')?))
            }
            TokenKind::Punct('<') => {
                self.advance()?;
                if self.eat_punct('{')? {
                    let fields = self.parse_const_list('}')?;
                    self.expect_punct('>')?;
                    return Ok(Const::Struct(fields));
                }
                Ok(Const::Vector(self.parse_const_list('>')?))
            }
            TokenKind::Word("null") => {
                self.advance()?;
                Ok(Const::Null)
            }
            TokenKind::Word("undef") => {
                self.advance()?;
                Ok(Const::Undef)
            }
            TokenKind::Word("poison") => {
                self.advance()?;
                Ok(Const::Poison)
            }
            TokenKind::Word("zeroinitializer") => {
                self.advance()?;
                Ok(Const::Zero)
            }
            TokenKind::Word("true") => {
                self.advance()?;
                Ok(Const::Int(1))
            }
            TokenKind::Word("false") => {
                self.advance()?;
                Ok(Const::Int(0))
            }
            TokenKind::Word("getelementptr") => {
                self.advance()?;
                let inbounds = self.eat_word("inbounds")?;
                self.expect_punct('(')?;
                let elem_ty = self.parse_type()?;
                self.expect_punct(',')?;
                let base = Box::new(self.parse_typed_const()?);
                let mut indices = Vec::new();
                while self.eat_punct(',')? {
                    indices.push(self.parse_typed_const()?);
                }
                self.expect_punct(')')?;
                Ok(Const::Gep {
                    inbounds,
                    elem_ty,
                    base,
                    indices,
                })
            }
            TokenKind::Word(w) => match ConvOp::from_str(w) {
                Some(op) => {
                    self.advance()?;
                    self.expect_punct('(')?;
                    let value = Box::new(self.parse_typed_const()?);
                    self.expect_word("to")?;
                    let to = self.parse_type()?;
                    self.expect_punct(')')?;
                    Ok(Const::Conv { op, value, to })
                }
                None => Err(self.err_expected("constant")),
            },
            _ => Err(self.err_expected("constant")),
        }
    }

    fn parse_const_list(&mut self, close: char) -> Result<Vec<TypedConst>> {
        let mut elems = Vec::new();
        if self.eat_punct(close)? {
            return Ok(elems);
        }
        loop {
            elems.push(self.parse_typed_const()?);
            if !self.eat_punct(',')? {
                break;
            }
        }
        self.expect_punct(close)?;
        Ok(elems)
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use crate::ast::{GlobalDef, Item};
    use crate::ir::float::HexFloatKind;
    use crate::ir::types::Type;

    fn parse_init(src: &str) -> (Type, Const) {
        let items = parse(&format!("@g = global {}", src)).unwrap();
        match items.into_iter().next().unwrap() {
            Item::Global(GlobalDef {
                content_ty,
                init: Some(init),
                ..
            }) => (content_ty, init),
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_parse_scalar_constants() {
        assert_eq!(parse_init("i32 -7"), (Type::Int(32), Const::Int(-7)));
        assert_eq!(parse_init("i1 true"), (Type::Int(1), Const::Int(1)));
        assert_eq!(
            parse_init("double 1.5"),
            (
                Type::Float(crate::ir::float::FloatKind::Double),
                Const::Float(1.5)
            )
        );
        assert_eq!(
            parse_init("half 0xH3C00"),
            (
                Type::Float(crate::ir::float::FloatKind::Half),
                Const::HexFloat {
                    kind: HexFloatKind::Half,
                    bits: 0x3C00,
                }
            )
        );
        assert_eq!(parse_init("i8* null"), (Type::Int(8).ptr_to(), Const::Null));
    }

    #[test]
    fn test_parse_aggregate_constants() {
        let (_, c) = parse_init("{ i32, i8 } { i32 1, i8 2 }");
        assert_eq!(
            c,
            Const::Struct(vec![
                TypedConst {
                    ty: Type::Int(32),
                    value: Const::Int(1),
                },
                TypedConst {
                    ty: Type::Int(8),
                    value: Const::Int(2),
                },
            ])
        );

        let (_, c) = parse_init("[2 x i16] [i16 3, i16 4]");
        assert_eq!(
            c,
            Const::Array(vec![
                TypedConst {
                    ty: Type::Int(16),
                    value: Const::Int(3),
                },
                TypedConst {
                    ty: Type::Int(16),
                    value: Const::Int(4),
                },
            ])
        );

        let (_, c) = parse_init("[4 x i8] c\"ab\\00\\01\"");
        assert_eq!(c, Const::CStr(vec![b'a', b'b', 0, 1]));
    }

    #[test]
    fn test_parse_gep_const_expr() {
        let (_, c) = parse_init(
            "i32* getelementptr inbounds ([4 x i32], [4 x i32]* @arr, i64 0, i64 2)",
        );
        match c {
            Const::Gep {
                inbounds,
                elem_ty,
                base,
                indices,
            } => {
                assert!(inbounds);
                assert_eq!(
                    elem_ty,
                    Type::Array {
                        len: 4,
                        elem: Box::new(Type::Int(32)),
                    }
                );
                assert_eq!(base.value, Const::Global(GlobalIdent::Named("arr".into())));
                assert_eq!(indices.len(), 2);
            }
            other => panic!("unexpected constant {:?}", other),
        }
    }

    #[test]
    fn test_parse_conv_const_expr() {
        let (_, c) = parse_init("i32* bitcast (i8* @buf to i32*)");
        assert_eq!(
            c,
            Const::Conv {
                op: ConvOp::BitCast,
                value: Box::new(TypedConst {
                    ty: Type::Int(8).ptr_to(),
                    value: Const::Global(GlobalIdent::Named("buf".into())),
                }),
                to: Type::Int(32).ptr_to(),
            }
        );
    }
}
