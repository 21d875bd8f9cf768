//! Non-terminator instructions.

use super::functions::is_fn_attr_word;
use super::Parser;
use crate::ast::{CallArg, Inst, OperandBundle};
use crate::error::Result;
use crate::ir::enums::{BinOp, ConvOp, FastMathFlag, FloatPred, IntPred};
use crate::ir::instruction::BinFlags;
use crate::ir::types::LocalIdent;
use crate::lexer::TokenKind;

impl<'a> Parser<'a> {
    pub(super) fn parse_inst(&mut self) -> Result<Inst> {
        match &self.tok.kind {
            TokenKind::LocalNamed(_) | TokenKind::LocalNum(_) => {
                let result = self.parse_local_ident()?;
                self.expect_punct('=')?;
                self.parse_value_inst(result)
            }
            TokenKind::Word("store") => self.parse_store(),
            TokenKind::Word("tail") | TokenKind::Word("call") => self.parse_call(None),
            _ => Err(self.err_expected("instruction")),
        }
    }

    fn parse_value_inst(&mut self, result: LocalIdent) -> Result<Inst> {
        let word = self.word().ok_or_else(|| self.err_expected("opcode"))?;
        if let Some(op) = BinOp::from_str(word) {
            return self.parse_binary(result, op);
        }
        if let Some(op) = ConvOp::from_str(word) {
            self.advance()?;
            let value = self.parse_typed_value()?;
            self.expect_word("to")?;
            let to = self.parse_type()?;
            return Ok(Inst::Conv {
                result,
                op,
                value,
                to,
            });
        }
        match word {
            "extractelement" => {
                self.advance()?;
                let vec = self.parse_typed_value()?;
                self.expect_punct(',')?;
                let index = self.parse_typed_value()?;
                Ok(Inst::ExtractElement { result, vec, index })
            }
            "insertelement" => {
                self.advance()?;
                let vec = self.parse_typed_value()?;
                self.expect_punct(',')?;
                let elem = self.parse_typed_value()?;
                self.expect_punct(',')?;
                let index = self.parse_typed_value()?;
                Ok(Inst::InsertElement {
                    result,
                    vec,
                    elem,
                    index,
                })
            }
            "shufflevector" => {
                self.advance()?;
                let v1 = self.parse_typed_value()?;
                self.expect_punct(',')?;
                let v2 = self.parse_typed_value()?;
                self.expect_punct(',')?;
                let mask = self.parse_typed_value()?;
                Ok(Inst::ShuffleVector {
                    result,
                    v1,
                    v2,
                    mask,
                })
            }
            "extractvalue" => {
                self.advance()?;
                let agg = self.parse_typed_value()?;
                let indices = self.parse_agg_indices()?;
                Ok(Inst::ExtractValue {
                    result,
                    agg,
                    indices,
                })
            }
            "insertvalue" => {
                self.advance()?;
                let agg = self.parse_typed_value()?;
                self.expect_punct(',')?;
                let elem = self.parse_typed_value()?;
                let indices = self.parse_agg_indices()?;
                Ok(Inst::InsertValue {
                    result,
                    agg,
                    elem,
                    indices,
                })
            }
            "alloca" => self.parse_alloca(result),
            "load" => {
                self.advance()?;
                let volatile = self.eat_word("volatile")?;
                let ty = self.parse_type()?;
                self.expect_punct(',')?;
                let ptr = self.parse_typed_value()?;
                let align = self.parse_align_trailer()?;
                Ok(Inst::Load {
                    result,
                    volatile,
                    ty,
                    ptr,
                    align,
                })
            }
            "getelementptr" => {
                self.advance()?;
                let inbounds = self.eat_word("inbounds")?;
                let elem_ty = self.parse_type()?;
                self.expect_punct(',')?;
                let ptr = self.parse_typed_value()?;
                let mut indices = Vec::new();
                while self.eat_punct(',')? {
                    indices.push(self.parse_typed_value()?);
                }
                Ok(Inst::Gep {
                    result,
                    inbounds,
                    elem_ty,
                    ptr,
                    indices,
                })
            }
            "icmp" => {
                self.advance()?;
                let pred_word = self
                    .word()
                    .ok_or_else(|| self.err_expected("icmp predicate"))?;
                let pred = IntPred::from_str(pred_word)
                    .ok_or_else(|| self.err_expected("icmp predicate"))?;
                self.advance()?;
                let ty = self.parse_type()?;
                let lhs = self.parse_value()?;
                self.expect_punct(',')?;
                let rhs = self.parse_value()?;
                Ok(Inst::ICmp {
                    result,
                    pred,
                    ty,
                    lhs,
                    rhs,
                })
            }
            "fcmp" => {
                self.advance()?;
                let fmf = self.parse_fast_math_flags()?;
                let pred_word = self
                    .word()
                    .ok_or_else(|| self.err_expected("fcmp predicate"))?;
                let pred = FloatPred::from_str(pred_word)
                    .ok_or_else(|| self.err_expected("fcmp predicate"))?;
                self.advance()?;
                let ty = self.parse_type()?;
                let lhs = self.parse_value()?;
                self.expect_punct(',')?;
                let rhs = self.parse_value()?;
                Ok(Inst::FCmp {
                    result,
                    pred,
                    fmf,
                    ty,
                    lhs,
                    rhs,
                })
            }
            "phi" => {
                self.advance()?;
                let ty = self.parse_type()?;
                let mut incoming = Vec::new();
                loop {
                    self.expect_punct('[')?;
                    let value = self.parse_value()?;
                    self.expect_punct(',')?;
                    let label = self.parse_local_ident()?;
                    self.expect_punct(']')?;
                    incoming.push((value, label));
                    if !self.eat_punct(',')? {
                        break;
                    }
                }
                Ok(Inst::Phi {
                    result,
                    ty,
                    incoming,
                })
            }
            "select" => {
                self.advance()?;
                let cond = self.parse_typed_value()?;
                self.expect_punct(',')?;
                let if_true = self.parse_typed_value()?;
                self.expect_punct(',')?;
                let if_false = self.parse_typed_value()?;
                Ok(Inst::Select {
                    result,
                    cond,
                    if_true,
                    if_false,
                })
            }
            "call" | "tail" => self.parse_call(Some(result)),
            _ => Err(self.err_expected("opcode")),
        }
    }

    fn parse_binary(&mut self, result: LocalIdent, op: BinOp) -> Result<Inst> {
        self.advance()?;
        let mut flags = BinFlags::default();
        if op.has_wrap_flags() {
            loop {
                if self.eat_word("nuw")? {
                    flags.nuw = true;
                } else if self.eat_word("nsw")? {
                    flags.nsw = true;
                } else {
                    break;
                }
            }
        } else if op.has_exact_flag() {
            flags.exact = self.eat_word("exact")?;
        }
        let fmf = if op.is_float() {
            self.parse_fast_math_flags()?
        } else {
            Vec::new()
        };
        let ty = self.parse_type()?;
        let lhs = self.parse_value()?;
        self.expect_punct(',')?;
        let rhs = self.parse_value()?;
        Ok(Inst::Binary {
            result,
            op,
            flags,
            fmf,
            ty,
            lhs,
            rhs,
        })
    }

    fn parse_fast_math_flags(&mut self) -> Result<Vec<FastMathFlag>> {
        let mut fmf = Vec::new();
        while let Some(w) = self.word() {
            match FastMathFlag::from_str(w) {
                Some(flag) => {
                    self.advance()?;
                    fmf.push(flag);
                }
                None => break,
            }
        }
        Ok(fmf)
    }

    /// `, N, N, ...` after the aggregate operand.
    fn parse_agg_indices(&mut self) -> Result<Vec<u64>> {
        let mut indices = Vec::new();
        while self.eat_punct(',')? {
            indices.push(self.expect_u64()?);
        }
        if indices.is_empty() {
            return Err(self.err_expected("aggregate index"));
        }
        Ok(indices)
    }

    fn parse_alloca(&mut self, result: LocalIdent) -> Result<Inst> {
        self.advance()?;
        let ty = self.parse_type()?;
        let mut count = None;
        let mut align = None;
        while self.eat_punct(',')? {
            if self.word() == Some("align") {
                self.advance()?;
                align = Some(self.expect_u64()?);
            } else if count.is_none() {
                count = Some(self.parse_typed_value()?);
            } else {
                return Err(self.err_expected("'align'"));
            }
        }
        Ok(Inst::Alloca {
            result,
            ty,
            count,
            align,
        })
    }

    fn parse_store(&mut self) -> Result<Inst> {
        self.expect_word("store")?;
        let volatile = self.eat_word("volatile")?;
        let value = self.parse_typed_value()?;
        self.expect_punct(',')?;
        let ptr = self.parse_typed_value()?;
        let align = self.parse_align_trailer()?;
        Ok(Inst::Store {
            volatile,
            value,
            ptr,
            align,
        })
    }

    fn parse_align_trailer(&mut self) -> Result<Option<u64>> {
        if self.eat_punct(',')? {
            self.expect_word("align")?;
            Ok(Some(self.expect_u64()?))
        } else {
            Ok(None)
        }
    }

    fn parse_call(&mut self, result: Option<LocalIdent>) -> Result<Inst> {
        let tail = self.eat_word("tail")?;
        self.expect_word("call")?;
        let cconv = self.parse_cconv()?;
        let ret_attrs = self.parse_param_attrs()?;
        let ret_ty = self.parse_type()?;
        let callee = self.parse_value()?;
        self.expect_punct('(')?;
        let mut args = Vec::new();
        if !self.eat_punct(')')? {
            loop {
                let ty = self.parse_type()?;
                let attrs = self.parse_param_attrs()?;
                let value = self.parse_value()?;
                args.push(CallArg {
                    attrs,
                    value: crate::ast::TypedValue { ty, value },
                });
                if !self.eat_punct(',')? {
                    break;
                }
            }
            self.expect_punct(')')?;
        }

        let mut attrs = Vec::new();
        loop {
            match &self.tok.kind {
                TokenKind::Word("align") => {
                    self.advance()?;
                    attrs.push(crate::ir::enums::FnAttr::Align(self.expect_u64()?));
                }
                TokenKind::Word(w) if is_fn_attr_word(w) => {
                    attrs.push(crate::ir::enums::FnAttr::Word(w.to_string()));
                    self.advance()?;
                }
                TokenKind::Str(_) | TokenKind::AttrGroup(_) => {
                    attrs.push(self.parse_fn_attr()?);
                }
                _ => break,
            }
        }

        let mut bundles = Vec::new();
        if self.eat_punct('[')? {
            loop {
                let tag = self.expect_str()?;
                self.expect_punct('(')?;
                let mut inputs = Vec::new();
                if !self.eat_punct(')')? {
                    loop {
                        inputs.push(self.parse_typed_value()?);
                        if !self.eat_punct(',')? {
                            break;
                        }
                    }
                    self.expect_punct(')')?;
                }
                bundles.push(OperandBundle { tag, inputs });
                if !self.eat_punct(',')? {
                    break;
                }
            }
            self.expect_punct(']')?;
        }

        Ok(Inst::Call {
            result,
            tail,
            cconv,
            ret_attrs,
            ret_ty,
            callee,
            args,
            attrs,
            bundles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use crate::ast::{AstValue, Const, Item, TypedValue};
    use crate::ir::types::{GlobalIdent, Type};

    fn parse_insts(body: &str) -> Vec<Inst> {
        let src = format!("define void @f(i32 %a, i32 %b) {{\n{}\nret void\n}}", body);
        match parse(&src).unwrap().into_iter().next().unwrap() {
            Item::Function(func) => func.blocks.into_iter().next().unwrap().insts,
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_parse_binary_with_flags() {
        let insts = parse_insts("%c = add nuw nsw i32 %a, %b\n%d = udiv exact i32 %c, 2");
        match &insts[0] {
            Inst::Binary { op, flags, .. } => {
                assert_eq!(*op, BinOp::Add);
                assert!(flags.nuw && flags.nsw && !flags.exact);
            }
            other => panic!("unexpected inst {:?}", other),
        }
        match &insts[1] {
            Inst::Binary { op, flags, rhs, .. } => {
                assert_eq!(*op, BinOp::UDiv);
                assert!(flags.exact);
                assert_eq!(*rhs, AstValue::Const(Const::Int(2)));
            }
            other => panic!("unexpected inst {:?}", other),
        }
    }

    #[test]
    fn test_parse_fadd_fast_math() {
        let insts = parse_insts("%x = fadd fast nnan double 1.0, 2.0");
        match &insts[0] {
            Inst::Binary { op, fmf, .. } => {
                assert_eq!(*op, BinOp::FAdd);
                assert_eq!(*fmf, vec![FastMathFlag::Fast, FastMathFlag::NNaN]);
            }
            other => panic!("unexpected inst {:?}", other),
        }
    }

    #[test]
    fn test_parse_memory_insts() {
        let insts = parse_insts(
            "%p = alloca i32, align 4\n\
             %q = alloca i8, i64 16\n\
             %v = load volatile i32, i32* %p, align 4\n\
             store i32 %v, i32* %p\n\
             %e = getelementptr inbounds [4 x i32], [4 x i32]* @arr, i64 0, i64 1",
        );
        match &insts[0] {
            Inst::Alloca { count, align, .. } => {
                assert!(count.is_none());
                assert_eq!(*align, Some(4));
            }
            other => panic!("unexpected inst {:?}", other),
        }
        match &insts[1] {
            Inst::Alloca { count, .. } => assert!(count.is_some()),
            other => panic!("unexpected inst {:?}", other),
        }
        match &insts[2] {
            Inst::Load {
                volatile, align, ..
            } => {
                assert!(*volatile);
                assert_eq!(*align, Some(4));
            }
            other => panic!("unexpected inst {:?}", other),
        }
        assert!(matches!(&insts[3], Inst::Store { .. }));
        match &insts[4] {
            Inst::Gep {
                inbounds, indices, ..
            } => {
                assert!(*inbounds);
                assert_eq!(indices.len(), 2);
            }
            other => panic!("unexpected inst {:?}", other),
        }
    }

    #[test]
    fn test_parse_phi_and_select() {
        let insts = parse_insts(
            "%p = phi i32 [ %a, %entry ], [ 0, %other ]\n\
             %s = select i1 true, i32 %a, i32 %b",
        );
        match &insts[0] {
            Inst::Phi { incoming, .. } => {
                assert_eq!(incoming.len(), 2);
                assert_eq!(
                    incoming[0],
                    (
                        AstValue::Local(LocalIdent::Named("a".into())),
                        LocalIdent::Named("entry".into())
                    )
                );
            }
            other => panic!("unexpected inst {:?}", other),
        }
        assert!(matches!(&insts[1], Inst::Select { .. }));
    }

    #[test]
    fn test_parse_aggregate_and_vector_insts() {
        let insts = parse_insts(
            "%x = extractvalue { i32, i8 } %agg, 0\n\
             %y = insertvalue { i32, i8 } %agg, i8 7, 1\n\
             %e = extractelement <4 x i32> %v, i64 0\n\
             %m = shufflevector <4 x i32> %v, <4 x i32> %w, <2 x i32> <i32 0, i32 4>",
        );
        match &insts[0] {
            Inst::ExtractValue { indices, .. } => assert_eq!(*indices, vec![0]),
            other => panic!("unexpected inst {:?}", other),
        }
        match &insts[1] {
            Inst::InsertValue { indices, .. } => assert_eq!(*indices, vec![1]),
            other => panic!("unexpected inst {:?}", other),
        }
        assert!(matches!(&insts[2], Inst::ExtractElement { .. }));
        assert!(matches!(&insts[3], Inst::ShuffleVector { .. }));
    }

    #[test]
    fn test_parse_call_forms() {
        let insts = parse_insts(
            "%r = tail call i32 @f(i32 %a)\n\
             call void @g()\n\
             %s = call i32 (i8*, ...) @printf(i8* @fmt, i32 5) nounwind [ \"deopt\"(i32 1) ]",
        );
        match &insts[0] {
            Inst::Call {
                result, tail, args, ..
            } => {
                assert_eq!(*result, Some(LocalIdent::Named("r".into())));
                assert!(*tail);
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected inst {:?}", other),
        }
        match &insts[1] {
            Inst::Call { result, .. } => assert_eq!(*result, None),
            other => panic!("unexpected inst {:?}", other),
        }
        match &insts[2] {
            Inst::Call {
                ret_ty,
                callee,
                attrs,
                bundles,
                ..
            } => {
                assert_eq!(
                    *ret_ty,
                    Type::Func {
                        ret: Box::new(Type::Int(32)),
                        params: vec![Type::Int(8).ptr_to()],
                        variadic: true,
                    }
                );
                assert_eq!(
                    *callee,
                    AstValue::Const(Const::Global(GlobalIdent::Named("printf".into())))
                );
                assert_eq!(
                    *attrs,
                    vec![crate::ir::enums::FnAttr::Word("nounwind".into())]
                );
                assert_eq!(bundles.len(), 1);
                assert_eq!(bundles[0].tag, "deopt");
                assert_eq!(
                    bundles[0].inputs,
                    vec![TypedValue {
                        ty: Type::Int(32),
                        value: AstValue::Const(Const::Int(1)),
                    }]
                );
            }
            other => panic!("unexpected inst {:?}", other),
        }
    }

    #[test]
    fn test_parse_conversions() {
        let insts = parse_insts("%t = trunc i32 %a to i8\n%p = inttoptr i32 %a to i32*");
        match &insts[0] {
            Inst::Conv { op, to, .. } => {
                assert_eq!(*op, ConvOp::Trunc);
                assert_eq!(*to, Type::Int(8));
            }
            other => panic!("unexpected inst {:?}", other),
        }
        match &insts[1] {
            Inst::Conv { op, .. } => assert_eq!(*op, ConvOp::IntToPtr),
            other => panic!("unexpected inst {:?}", other),
        }
    }
}
