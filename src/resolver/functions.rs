//! Function resolution: headers, then bodies in two stages.
//!
//! Stage one walks the definition collecting every local definition
//! (parameters, block labels, instruction results) and drives the
//! per-function counter, so stage two can link uses that appear before
//! their definition, as phi operands routinely do.

use std::collections::HashMap;

use super::numbering::Counter;
use super::Resolver;
use crate::ast::{self, FuncDef};
use crate::error::{Error, Result};
use crate::ir::function::{Block, Function, Param};
use crate::ir::instruction::{CallArg, Instruction, OperandBundle, SwitchCase, Terminator, Value};
use crate::ir::types::{LocalIdent, Type};
use crate::ir::Constant;

/// Local definitions of one function body. Labels and values share the
/// `%` namespace.
struct Scope {
    values: HashMap<LocalIdent, Type>,
    labels: Vec<LocalIdent>,
}

impl Scope {
    fn bind_value(&mut self, ident: LocalIdent, ty: Type) -> Result<()> {
        if self.labels.contains(&ident) || self.values.insert(ident.clone(), ty).is_some() {
            return Err(Error::DuplicateDefinition(ident.to_string()));
        }
        Ok(())
    }

    fn bind_label(&mut self, ident: LocalIdent) -> Result<()> {
        if self.values.contains_key(&ident) || self.labels.contains(&ident) {
            return Err(Error::DuplicateDefinition(ident.to_string()));
        }
        self.labels.push(ident);
        Ok(())
    }
}

/// The stage-one plan: resolved labels and result identifiers, indexed by
/// block and instruction position.
struct BodyPlan {
    scope: Scope,
    param_names: Vec<LocalIdent>,
    labels: Vec<LocalIdent>,
    results: Vec<Vec<Option<LocalIdent>>>,
}

impl Resolver {
    pub(super) fn declare_function(&mut self, def: &FuncDef) {
        self.check_type(&def.ret_ty);
        for param in &def.params {
            self.check_type(&param.ty);
        }
        self.check_attr_groups(&def.attrs);
        let comdat = def.comdat.as_ref().and_then(|name| self.lookup_comdat(name));
        self.module.funcs.push(Function {
            is_definition: def.is_definition,
            name: def.name.clone(),
            linkage: def.linkage,
            visibility: def.visibility,
            cconv: def.cconv,
            unnamed_addr: def.unnamed_addr,
            ret_attrs: def.ret_attrs.clone(),
            ret_ty: def.ret_ty.clone(),
            params: def
                .params
                .iter()
                .map(|p| Param {
                    ty: p.ty.clone(),
                    attrs: p.attrs.clone(),
                    name: None,
                })
                .collect(),
            variadic: def.variadic,
            attrs: def.attrs.clone(),
            section: def.section.clone(),
            comdat,
            align: def.align,
            metadata: Vec::new(),
            blocks: Vec::new(),
        });
    }

    pub(super) fn define_function(&mut self, idx: usize, def: &FuncDef) -> Result<()> {
        let mut attachments = Vec::with_capacity(def.metadata.len());
        for (kind, node) in &def.metadata {
            match self.md_ids.get(node) {
                Some(md_idx) => attachments.push((kind.clone(), *md_idx)),
                None => self.record_unresolved(format!("!{}", node)),
            }
        }
        self.module.funcs[idx].metadata = attachments;

        if !def.is_definition {
            return Ok(());
        }

        let plan = self.collect_body(def)?;
        let params: Vec<Param> = def
            .params
            .iter()
            .zip(&plan.param_names)
            .map(|(p, name)| Param {
                ty: p.ty.clone(),
                attrs: p.attrs.clone(),
                name: Some(name.clone()),
            })
            .collect();

        let mut blocks = Vec::with_capacity(def.blocks.len());
        for (b, block) in def.blocks.iter().enumerate() {
            let mut insts = Vec::with_capacity(block.insts.len());
            for (i, inst) in block.insts.iter().enumerate() {
                insts.push(self.link_inst(&plan, inst, plan.results[b][i].clone())?);
            }
            let term = self.link_term(&plan, def, &block.term)?;
            blocks.push(Block {
                label: plan.labels[b].clone(),
                insts,
                term,
            });
        }

        let func = &mut self.module.funcs[idx];
        func.params = params;
        func.blocks = blocks;
        Ok(())
    }

    /// Stage one: bind every local definition and number the unnamed ones.
    fn collect_body(&mut self, def: &FuncDef) -> Result<BodyPlan> {
        let mut counter = Counter::new(def.name.to_string());
        let mut scope = Scope {
            values: HashMap::new(),
            labels: Vec::new(),
        };

        let mut param_names = Vec::with_capacity(def.params.len());
        for param in &def.params {
            let ident = match &param.name {
                Some(ident) => {
                    counter.check_local(ident)?;
                    ident.clone()
                }
                None => LocalIdent::Num(counter.assign()),
            };
            scope.bind_value(ident.clone(), param.ty.clone())?;
            param_names.push(ident);
        }

        let mut labels = Vec::with_capacity(def.blocks.len());
        let mut results = Vec::with_capacity(def.blocks.len());
        for block in &def.blocks {
            let label = match &block.label {
                Some(ident) => {
                    counter.check_local(ident)?;
                    ident.clone()
                }
                None => LocalIdent::Num(counter.assign()),
            };
            scope.bind_label(label.clone())?;
            labels.push(label);

            let mut block_results = Vec::with_capacity(block.insts.len());
            for inst in &block.insts {
                let result_ty = self.inst_result_ty(inst)?;
                let ident = match (inst.result(), result_ty) {
                    (Some(ident), Some(ty)) => {
                        counter.check_local(ident)?;
                        scope.bind_value(ident.clone(), ty)?;
                        Some(ident.clone())
                    }
                    (Some(ident), None) => {
                        return Err(Error::TypeMismatch(format!(
                            "{} binds an instruction that produces no value",
                            ident
                        )))
                    }
                    // A discarded non-void result still takes a slot.
                    (None, Some(ty)) => {
                        let ident = LocalIdent::Num(counter.assign());
                        scope.bind_value(ident.clone(), ty)?;
                        Some(ident)
                    }
                    (None, None) => None,
                };
                block_results.push(ident);
            }
            results.push(block_results);
        }

        Ok(BodyPlan {
            scope,
            param_names,
            labels,
            results,
        })
    }

    /// The type an instruction produces, derived from its written types
    /// alone; `None` for `store` and void calls.
    fn inst_result_ty(&mut self, inst: &ast::Inst) -> Result<Option<Type>> {
        let ty = match inst {
            ast::Inst::Binary { op, ty, .. } => {
                if op.is_float() {
                    if !ty.is_float_or_float_vector() {
                        return Err(Error::TypeMismatch(format!(
                            "{} requires a floating-point type, found {}",
                            op, ty
                        )));
                    }
                } else if !ty.is_int_or_int_vector() {
                    return Err(Error::TypeMismatch(format!(
                        "{} requires an integer type, found {}",
                        op, ty
                    )));
                }
                ty.clone()
            }
            ast::Inst::ExtractElement { vec, .. } => self.vector_elem(&vec.ty)?,
            ast::Inst::InsertElement { vec, .. } => vec.ty.clone(),
            ast::Inst::ShuffleVector { v1, mask, .. } => {
                let elem = self.vector_elem(&v1.ty)?;
                match &mask.ty {
                    Type::Vector { len, scalable, .. } => Type::Vector {
                        len: *len,
                        elem: Box::new(elem),
                        scalable: *scalable,
                    },
                    other => {
                        return Err(Error::TypeMismatch(format!(
                            "shufflevector mask must be a vector, found {}",
                            other
                        )))
                    }
                }
            }
            ast::Inst::ExtractValue { agg, indices, .. } => {
                self.agg_navigate(&agg.ty, indices)?
            }
            ast::Inst::InsertValue {
                agg, elem, indices, ..
            } => {
                let field = self.agg_navigate(&agg.ty, indices)?;
                if field != elem.ty {
                    return Err(Error::TypeMismatch(format!(
                        "insertvalue element has type {}, field expects {}",
                        elem.ty, field
                    )));
                }
                agg.ty.clone()
            }
            ast::Inst::Alloca { ty, .. } => ty.clone().ptr_to(),
            ast::Inst::Load { ty, ptr, .. } => {
                self.check_pointee(&ptr.ty, ty, "load")?;
                ty.clone()
            }
            ast::Inst::Store { value, ptr, .. } => {
                self.check_pointee(&ptr.ty, &value.ty, "store")?;
                return Ok(None);
            }
            ast::Inst::Gep {
                elem_ty,
                ptr,
                indices,
                ..
            } => self.gep_value_ty(elem_ty, &ptr.ty, indices)?,
            ast::Inst::Conv { to, .. } => to.clone(),
            ast::Inst::ICmp { ty, .. } => {
                if !ty.is_int_or_int_vector() && !ty.is_ptr_or_ptr_vector() {
                    return Err(Error::TypeMismatch(format!(
                        "icmp requires integer or pointer operands, found {}",
                        ty
                    )));
                }
                bool_result_for(ty)
            }
            ast::Inst::FCmp { ty, .. } => {
                if !ty.is_float_or_float_vector() {
                    return Err(Error::TypeMismatch(format!(
                        "fcmp requires floating-point operands, found {}",
                        ty
                    )));
                }
                bool_result_for(ty)
            }
            ast::Inst::Phi { ty, .. } => ty.clone(),
            ast::Inst::Select { if_true, cond, .. } => {
                let ok = match &cond.ty {
                    Type::Int(1) => true,
                    Type::Vector { elem, .. } => **elem == Type::Int(1),
                    _ => false,
                };
                if !ok {
                    return Err(Error::TypeMismatch(format!(
                        "select condition must be i1, found {}",
                        cond.ty
                    )));
                }
                if_true.ty.clone()
            }
            ast::Inst::Call { ret_ty, .. } => {
                let ret = call_ret_ty(ret_ty);
                if ret == Type::Void {
                    return Ok(None);
                }
                ret
            }
        };
        Ok(Some(ty))
    }

    /// Stage two: link one instruction's operands against the scope.
    fn link_inst(
        &mut self,
        plan: &BodyPlan,
        inst: &ast::Inst,
        result: Option<LocalIdent>,
    ) -> Result<Instruction> {
        let linked = match inst {
            ast::Inst::Binary {
                op,
                flags,
                fmf,
                ty,
                lhs,
                rhs,
                ..
            } => Instruction::Binary {
                result: result.unwrap(),
                op: *op,
                flags: *flags,
                fmf: fmf.clone(),
                ty: ty.clone(),
                lhs: self.link_value(plan, ty, lhs)?,
                rhs: self.link_value(plan, ty, rhs)?,
            },
            ast::Inst::ExtractElement { vec, index, .. } => Instruction::ExtractElement {
                result: result.unwrap(),
                vec: self.link_typed(plan, vec)?,
                index: self.link_typed(plan, index)?,
            },
            ast::Inst::InsertElement {
                vec, elem, index, ..
            } => Instruction::InsertElement {
                result: result.unwrap(),
                vec: self.link_typed(plan, vec)?,
                elem: self.link_typed(plan, elem)?,
                index: self.link_typed(plan, index)?,
            },
            ast::Inst::ShuffleVector { v1, v2, mask, .. } => Instruction::ShuffleVector {
                result: result.unwrap(),
                v1: self.link_typed(plan, v1)?,
                v2: self.link_typed(plan, v2)?,
                mask: self.link_typed(plan, mask)?,
            },
            ast::Inst::ExtractValue { agg, indices, .. } => Instruction::ExtractValue {
                result: result.unwrap(),
                agg: self.link_typed(plan, agg)?,
                indices: indices.clone(),
            },
            ast::Inst::InsertValue {
                agg, elem, indices, ..
            } => Instruction::InsertValue {
                result: result.unwrap(),
                agg: self.link_typed(plan, agg)?,
                elem: self.link_typed(plan, elem)?,
                indices: indices.clone(),
            },
            ast::Inst::Alloca {
                ty, count, align, ..
            } => Instruction::Alloca {
                result: result.unwrap(),
                ty: ty.clone(),
                count: count
                    .as_ref()
                    .map(|c| self.link_typed(plan, c))
                    .transpose()?,
                align: *align,
            },
            ast::Inst::Load {
                volatile,
                ty,
                ptr,
                align,
                ..
            } => Instruction::Load {
                result: result.unwrap(),
                volatile: *volatile,
                ty: ty.clone(),
                ptr: self.link_typed(plan, ptr)?,
                align: *align,
            },
            ast::Inst::Store {
                volatile,
                value,
                ptr,
                align,
            } => Instruction::Store {
                volatile: *volatile,
                value: self.link_typed(plan, value)?,
                ptr: self.link_typed(plan, ptr)?,
                align: *align,
            },
            ast::Inst::Gep {
                inbounds,
                elem_ty,
                ptr,
                indices,
                ..
            } => Instruction::Gep {
                result: result.unwrap(),
                inbounds: *inbounds,
                elem_ty: elem_ty.clone(),
                ptr: self.link_typed(plan, ptr)?,
                indices: indices
                    .iter()
                    .map(|i| self.link_typed(plan, i))
                    .collect::<Result<Vec<_>>>()?,
            },
            ast::Inst::Conv { op, value, to, .. } => Instruction::Conv {
                result: result.unwrap(),
                op: *op,
                value: self.link_typed(plan, value)?,
                to: to.clone(),
            },
            ast::Inst::ICmp {
                pred, ty, lhs, rhs, ..
            } => Instruction::ICmp {
                result: result.unwrap(),
                pred: *pred,
                ty: ty.clone(),
                lhs: self.link_value(plan, ty, lhs)?,
                rhs: self.link_value(plan, ty, rhs)?,
            },
            ast::Inst::FCmp {
                pred,
                fmf,
                ty,
                lhs,
                rhs,
                ..
            } => Instruction::FCmp {
                result: result.unwrap(),
                pred: *pred,
                fmf: fmf.clone(),
                ty: ty.clone(),
                lhs: self.link_value(plan, ty, lhs)?,
                rhs: self.link_value(plan, ty, rhs)?,
            },
            ast::Inst::Phi { ty, incoming, .. } => {
                let incoming = incoming
                    .iter()
                    .map(|(value, label)| {
                        let value = self.link_value(plan, ty, value)?;
                        Ok((value, self.link_label(plan, label)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Instruction::Phi {
                    result: result.unwrap(),
                    ty: ty.clone(),
                    incoming,
                }
            }
            ast::Inst::Select {
                cond,
                if_true,
                if_false,
                ..
            } => Instruction::Select {
                result: result.unwrap(),
                cond: self.link_typed(plan, cond)?,
                if_true: self.link_typed(plan, if_true)?,
                if_false: self.link_typed(plan, if_false)?,
            },
            ast::Inst::Call {
                tail,
                cconv,
                ret_attrs,
                ret_ty,
                callee,
                args,
                attrs,
                bundles,
                ..
            } => {
                self.check_attr_groups(attrs);
                let fn_ty = match ret_ty {
                    Type::Func { .. } => ret_ty.clone(),
                    ret => Type::Func {
                        ret: Box::new(ret.clone()),
                        params: args.iter().map(|a| a.value.ty.clone()).collect(),
                        variadic: false,
                    },
                };
                let callee = self.link_value(plan, &fn_ty.ptr_to(), callee)?;
                let args = args
                    .iter()
                    .map(|a| {
                        Ok(CallArg {
                            attrs: a.attrs.clone(),
                            value: self.link_typed(plan, &a.value)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let bundles = bundles
                    .iter()
                    .map(|b| {
                        Ok(OperandBundle {
                            tag: b.tag.clone(),
                            inputs: b
                                .inputs
                                .iter()
                                .map(|v| self.link_typed(plan, v))
                                .collect::<Result<Vec<_>>>()?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Instruction::Call {
                    result,
                    tail: *tail,
                    cconv: *cconv,
                    ret_attrs: ret_attrs.clone(),
                    ret_ty: call_ret_ty(ret_ty),
                    callee,
                    args,
                    attrs: attrs.clone(),
                    bundles,
                }
            }
        };
        Ok(linked)
    }

    fn link_term(&mut self, plan: &BodyPlan, def: &FuncDef, term: &ast::Term) -> Result<Terminator> {
        Ok(match term {
            ast::Term::Ret(None) => {
                if def.ret_ty != Type::Void {
                    return Err(Error::TypeMismatch(format!(
                        "{} returns {} but ret has no value",
                        def.name, def.ret_ty
                    )));
                }
                Terminator::Ret(None)
            }
            ast::Term::Ret(Some(tv)) => {
                if tv.ty != def.ret_ty {
                    return Err(Error::TypeMismatch(format!(
                        "{} returns {} but ret value has type {}",
                        def.name, def.ret_ty, tv.ty
                    )));
                }
                Terminator::Ret(Some(self.link_typed(plan, tv)?))
            }
            ast::Term::Br(dest) => Terminator::Br(self.link_label(plan, dest)),
            ast::Term::CondBr {
                cond,
                if_true,
                if_false,
            } => {
                if cond.ty != Type::Int(1) {
                    return Err(Error::TypeMismatch(format!(
                        "br condition must be i1, found {}",
                        cond.ty
                    )));
                }
                Terminator::CondBr {
                    cond: self.link_typed(plan, cond)?,
                    if_true: self.link_label(plan, if_true),
                    if_false: self.link_label(plan, if_false),
                }
            }
            ast::Term::Switch {
                value,
                default,
                cases,
            } => {
                if !value.ty.is_int() {
                    return Err(Error::TypeMismatch(format!(
                        "switch value must be an integer, found {}",
                        value.ty
                    )));
                }
                let linked_cases = cases
                    .iter()
                    .map(|case| {
                        if case.ty != value.ty {
                            return Err(Error::TypeMismatch(format!(
                                "switch case of type {} under a {} switch",
                                case.ty, value.ty
                            )));
                        }
                        Ok(SwitchCase {
                            value: self.resolve_const(&case.ty, &case.value)?,
                            dest: self.link_label(plan, &case.dest),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Terminator::Switch {
                    value: self.link_typed(plan, value)?,
                    default: self.link_label(plan, default),
                    cases: linked_cases,
                }
            }
            ast::Term::Unreachable => Terminator::Unreachable,
        })
    }

    fn link_typed(&mut self, plan: &BodyPlan, tv: &ast::TypedValue) -> Result<Value> {
        self.link_value(plan, &tv.ty, &tv.value)
    }

    fn link_value(&mut self, plan: &BodyPlan, ty: &Type, value: &ast::AstValue) -> Result<Value> {
        self.check_type(ty);
        match value {
            ast::AstValue::Local(ident) => {
                match plan.scope.values.get(ident) {
                    Some(def_ty) => {
                        if def_ty != ty {
                            return Err(Error::TypeMismatch(format!(
                                "{} has type {}, used as {}",
                                ident, def_ty, ty
                            )));
                        }
                    }
                    None => {
                        self.record_unresolved(ident.to_string());
                        return Ok(Value::Const(Constant::Poison(ty.clone())));
                    }
                }
                Ok(Value::Local {
                    ident: ident.clone(),
                    ty: ty.clone(),
                })
            }
            ast::AstValue::Const(c) => Ok(Value::Const(self.resolve_const(ty, c)?)),
        }
    }

    fn link_label(&mut self, plan: &BodyPlan, label: &LocalIdent) -> LocalIdent {
        if !plan.scope.labels.contains(label) {
            self.record_unresolved(label.to_string());
        }
        label.clone()
    }

    fn vector_elem(&mut self, ty: &Type) -> Result<Type> {
        match ty {
            Type::Vector { elem, .. } => Ok(elem.as_ref().clone()),
            other => Err(Error::TypeMismatch(format!(
                "expected a vector type, found {}",
                other
            ))),
        }
    }

    /// Walks `extractvalue`/`insertvalue` indices through an aggregate.
    fn agg_navigate(&mut self, ty: &Type, indices: &[u64]) -> Result<Type> {
        let mut cur = ty.clone();
        for &idx in indices {
            // Peel named types without consuming the index.
            while let Type::Named(name) = &cur {
                match self.module.type_body(name).cloned() {
                    Some(body) => cur = body,
                    None => {
                        return Err(Error::TypeMismatch(format!(
                            "cannot index into opaque type %{}",
                            name
                        )))
                    }
                }
            }
            cur = match &cur {
                Type::Array { len, elem } => {
                    if idx >= *len {
                        return Err(Error::TypeMismatch(format!(
                            "index {} out of range for {}",
                            idx, cur
                        )));
                    }
                    elem.as_ref().clone()
                }
                Type::Struct { fields, .. } => fields
                    .get(idx as usize)
                    .cloned()
                    .ok_or_else(|| {
                        Error::TypeMismatch(format!("index {} out of range for {}", idx, cur))
                    })?,
                other => {
                    return Err(Error::TypeMismatch(format!(
                        "cannot index into type {}",
                        other
                    )))
                }
            };
        }
        Ok(cur)
    }

    /// Result type of a `getelementptr` instruction; struct steps need a
    /// constant index, array and vector steps may be dynamic.
    fn gep_value_ty(
        &mut self,
        elem_ty: &Type,
        ptr_ty: &Type,
        indices: &[ast::TypedValue],
    ) -> Result<Type> {
        let addr_space = match ptr_ty {
            Type::Ptr { addr_space, .. } => *addr_space,
            other => {
                return Err(Error::TypeMismatch(format!(
                    "getelementptr base must be a pointer, found {}",
                    other
                )))
            }
        };
        let mut cur = elem_ty.clone();
        for index in indices.iter().skip(1) {
            loop {
                match &cur {
                    Type::Named(name) => match self.module.type_body(name).cloned() {
                        Some(body) => cur = body,
                        None => {
                            return Err(Error::TypeMismatch(format!(
                                "cannot index into opaque type %{}",
                                name
                            )))
                        }
                    },
                    _ => break,
                }
            }
            cur = match &cur {
                Type::Array { elem, .. } | Type::Vector { elem, .. } => elem.as_ref().clone(),
                Type::Struct { fields, .. } => {
                    let idx = match &index.value {
                        ast::AstValue::Const(ast::Const::Int(v)) => *v,
                        _ => {
                            return Err(Error::TypeMismatch(
                                "struct index must be a constant integer".to_string(),
                            ))
                        }
                    };
                    fields
                        .get(idx as usize)
                        .cloned()
                        .ok_or_else(|| {
                            Error::TypeMismatch(format!(
                                "struct index {} out of range for {}",
                                idx, cur
                            ))
                        })?
                }
                other => {
                    return Err(Error::TypeMismatch(format!(
                        "cannot index into type {}",
                        other
                    )))
                }
            };
        }
        Ok(Type::Ptr {
            pointee: Box::new(cur),
            addr_space,
        })
    }

    fn check_pointee(&mut self, ptr_ty: &Type, want: &Type, what: &str) -> Result<()> {
        match ptr_ty {
            Type::Ptr { pointee, .. } if pointee.as_ref() == want => Ok(()),
            Type::Ptr { pointee, .. } => Err(Error::TypeMismatch(format!(
                "{} of {} through a pointer to {}",
                what, want, pointee
            ))),
            other => Err(Error::TypeMismatch(format!(
                "{} requires a pointer operand, found {}",
                what, other
            ))),
        }
    }
}

fn call_ret_ty(written: &Type) -> Type {
    match written {
        Type::Func { ret, .. } => ret.as_ref().clone(),
        other => other.clone(),
    }
}

fn bool_result_for(operand_ty: &Type) -> Type {
    match operand_ty {
        Type::Vector { len, scalable, .. } => Type::Vector {
            len: *len,
            elem: Box::new(Type::Int(1)),
            scalable: *scalable,
        },
        _ => Type::Int(1),
    }
}

#[cfg(test)]
mod tests {
    use super::super::resolve;
    use super::*;
    use crate::parser;

    fn resolve_src(src: &str) -> crate::error::Result<crate::ir::Module> {
        resolve(parser::parse(src).unwrap())
    }

    #[test]
    fn test_local_numbering_sequence() {
        // %0 is the unnamed entry label; results continue from it.
        let src = "define i32 @f(i32 %a) {\n\
                   %1 = add i32 %a, 1\n\
                   %2 = add i32 %1, 1\n\
                   ret i32 %2\n\
                   }";
        assert!(resolve_src(src).is_ok());
    }

    #[test]
    fn test_local_numbering_mismatch() {
        let src = "define i32 @f(i32 %a) {\n\
                   %1 = add i32 %a, 1\n\
                   %5 = add i32 %1, 1\n\
                   ret i32 %5\n\
                   }";
        let err = resolve_src(src).unwrap_err();
        assert_eq!(
            err,
            Error::Numbering {
                scope: "@f".into(),
                expected: 2,
                found: 5,
            }
        );
    }

    #[test]
    fn test_unnamed_params_and_blocks_numbered() {
        // Params take 0 and 1, the entry label takes 2, the result takes 3.
        let src = "define i32 @f(i32, i32) {\n\
                   %3 = add i32 %0, %1\n\
                   ret i32 %3\n\
                   }";
        let module = resolve_src(src).unwrap();
        let func = &module.funcs[0];
        assert_eq!(func.params[0].name, Some(LocalIdent::Num(0)));
        assert_eq!(func.params[1].name, Some(LocalIdent::Num(1)));
        assert_eq!(func.blocks[0].label, LocalIdent::Num(2));
    }

    #[test]
    fn test_forward_use_in_phi() {
        let src = "define i32 @f(i1 %c) {\n\
                   entry:\n\
                   br i1 %c, label %a, label %b\n\
                   a:\n\
                   br label %b\n\
                   b:\n\
                   %r = phi i32 [ 1, %entry ], [ %x, %a ]\n\
                   %x = add i32 %r, 0\n\
                   ret i32 %x\n\
                   }";
        assert!(resolve_src(src).is_ok());
    }

    #[test]
    fn test_undefined_local_collected() {
        let src = "define i32 @f() {\n\
                   %r = add i32 %nope, 1\n\
                   ret i32 %r\n\
                   }";
        let err = resolve_src(src).unwrap_err();
        assert_eq!(err, Error::Unresolved(vec!["%nope".into()]));
    }

    #[test]
    fn test_undefined_label_collected() {
        let src = "define void @f() {\n\
                   br label %missing\n\
                   }";
        let err = resolve_src(src).unwrap_err();
        assert_eq!(err, Error::Unresolved(vec!["%missing".into()]));
    }

    #[test]
    fn test_duplicate_local_rejected() {
        let src = "define i32 @f(i32 %a) {\n\
                   %a = add i32 1, 2\n\
                   ret i32 %a\n\
                   }";
        let err = resolve_src(src).unwrap_err();
        assert_eq!(err, Error::DuplicateDefinition("%a".into()));
    }

    #[test]
    fn test_use_with_wrong_type_rejected() {
        let src = "define void @f(i32 %a) {\n\
                   %r = add i64 %a, 1\n\
                   ret void\n\
                   }";
        let err = resolve_src(src).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }

    #[test]
    fn test_discarded_call_result_takes_slot() {
        // The unbound i32 call occupies %0 (after the entry label), so the
        // next explicit number must be 2.
        let src = "declare i32 @g()\n\
                   define void @f() {\n\
                   entry:\n\
                   call i32 @g()\n\
                   %0 = add i32 1, 1\n\
                   ret void\n\
                   }";
        let err = resolve_src(src).unwrap_err();
        assert_eq!(
            err,
            Error::Numbering {
                scope: "@f".into(),
                expected: 1,
                found: 0,
            }
        );
    }

    #[test]
    fn test_void_call_binding_rejected() {
        let src = "declare void @g()\n\
                   define void @f() {\n\
                   %r = call void @g()\n\
                   ret void\n\
                   }";
        let err = resolve_src(src).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }

    #[test]
    fn test_ret_type_checked() {
        let src = "define i32 @f() {\nret void\n}";
        assert!(resolve_src(src).is_err());
        let src = "define void @f() {\nret i32 0\n}";
        assert!(resolve_src(src).is_err());
    }

    #[test]
    fn test_extractvalue_through_named_type() {
        // Peeling %rec must not consume the first index: 1, 1 lands on i64.
        let src = "%rec = type { i32, { i8, i64 } }\n\
                   define i64 @f(%rec %r) {\n\
                   %x = extractvalue %rec %r, 1, 1\n\
                   ret i64 %x\n\
                   }";
        let module = resolve_src(src).unwrap();
        match &module.funcs[0].blocks[0].insts[0] {
            Instruction::ExtractValue { indices, .. } => assert_eq!(indices, &[1, 1]),
            other => panic!("unexpected inst {:?}", other),
        }
    }

    #[test]
    fn test_insertvalue_element_type_checked() {
        let src = "%rec = type { i32, { i8, i64 } }\n\
                   define %rec @f(%rec %r) {\n\
                   %r2 = insertvalue %rec %r, i8* null, 1, 1\n\
                   ret %rec %r2\n\
                   }";
        let err = resolve_src(src).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)), "{:?}", err);
    }

    #[test]
    fn test_insertvalue_index_range_checked() {
        let src = "define { i32, i32 } @f({ i32, i32 } %r) {\n\
                   %r2 = insertvalue { i32, i32 } %r, i32 0, 5\n\
                   ret { i32, i32 } %r2\n\
                   }";
        let err = resolve_src(src).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)), "{:?}", err);
    }

    #[test]
    fn test_call_through_function_pointer() {
        let src = "define i32 @f(i32 (i32)* %fp) {\n\
                   %r = call i32 %fp(i32 7)\n\
                   ret i32 %r\n\
                   }";
        let module = resolve_src(src).unwrap();
        match &module.funcs[0].blocks[0].insts[0] {
            Instruction::Call { callee, .. } => match callee {
                Value::Local { ty, .. } => assert!(ty.is_ptr()),
                other => panic!("unexpected callee {:?}", other),
            },
            other => panic!("unexpected inst {:?}", other),
        }
    }
}
