//! Resolution of global variables, aliases, and constants.

use super::Resolver;
use crate::ast::{AliasDef, Const, GlobalDef, TypedConst};
use crate::error::{Error, Result};
use crate::ir::float::{self, FloatKind, HexFloatKind};
use crate::ir::global::{Alias, GlobalVar};
use crate::ir::types::Type;
use crate::ir::Constant;

impl Resolver {
    pub(super) fn declare_global(&mut self, def: &GlobalDef) {
        self.check_type(&def.content_ty);
        let comdat = def.comdat.as_ref().and_then(|name| self.lookup_comdat(name));
        self.module.globals.push(GlobalVar {
            name: def.name.clone(),
            linkage: def.linkage,
            visibility: def.visibility,
            unnamed_addr: def.unnamed_addr,
            addr_space: def.addr_space.unwrap_or(0) as u32,
            immutable: def.immutable,
            content_ty: def.content_ty.clone(),
            init: None,
            section: def.section.clone(),
            comdat,
            align: def.align,
        });
    }

    pub(super) fn define_global(&mut self, idx: usize, def: &GlobalDef) -> Result<()> {
        if let Some(init) = &def.init {
            let init = self.resolve_const(&def.content_ty, init)?;
            self.module.globals[idx].init = Some(init);
        }
        Ok(())
    }

    pub(super) fn declare_alias(&mut self, def: &AliasDef) {
        self.check_type(&def.content_ty);
        self.module.aliases.push(Alias {
            name: def.name.clone(),
            linkage: def.linkage,
            visibility: def.visibility,
            unnamed_addr: def.unnamed_addr,
            content_ty: def.content_ty.clone(),
            // Stand-in until pass two resolves the aliasee.
            aliasee: Constant::Poison(def.aliasee.ty.clone()),
        });
    }

    pub(super) fn define_alias(&mut self, idx: usize, def: &AliasDef) -> Result<()> {
        let aliasee = self.resolve_typed_const(&def.aliasee)?;
        self.module.aliases[idx].aliasee = aliasee;
        Ok(())
    }

    pub(crate) fn lookup_comdat(&mut self, name: &str) -> Option<usize> {
        match self.comdats.get(name) {
            Some(idx) => Some(*idx),
            None => {
                self.record_unresolved(format!("${}", name));
                None
            }
        }
    }

    pub(crate) fn resolve_typed_const(&mut self, tc: &TypedConst) -> Result<Constant> {
        self.resolve_const(&tc.ty, &tc.value)
    }

    /// Resolves a constant literal against its declared type.
    pub(crate) fn resolve_const(&mut self, ty: &Type, value: &Const) -> Result<Constant> {
        self.check_type(ty);
        match value {
            Const::Int(v) => {
                if !ty.is_int() {
                    return Err(Error::TypeMismatch(format!(
                        "integer constant {} declared with non-integer type {}",
                        v, ty
                    )));
                }
                Ok(Constant::Int {
                    ty: ty.clone(),
                    value: *v,
                })
            }
            Const::Float(v) => {
                let kind = self.float_kind(ty)?;
                let bits = float::bits_from_decimal(kind, *v).ok_or_else(|| {
                    Error::TypeMismatch(format!(
                        "constant {} is not exactly representable as {}",
                        v, kind
                    ))
                })?;
                Ok(Constant::Float { kind, bits })
            }
            Const::HexFloat { kind, bits } => {
                let target = self.float_kind(ty)?;
                let bits = convert_hex_float(target, *kind, *bits).ok_or_else(|| {
                    Error::TypeMismatch(format!(
                        "hex float literal does not fit type {}",
                        ty
                    ))
                })?;
                Ok(Constant::Float { kind: target, bits })
            }
            Const::Null => {
                if !ty.is_ptr_or_ptr_vector() {
                    return Err(Error::TypeMismatch(format!(
                        "null constant declared with non-pointer type {}",
                        ty
                    )));
                }
                Ok(Constant::Null(ty.clone()))
            }
            Const::Undef => Ok(Constant::Undef(ty.clone())),
            Const::Poison => Ok(Constant::Poison(ty.clone())),
            Const::Zero => Ok(Constant::Zero(ty.clone())),
            Const::Struct(fields) => {
                if let Some(expected) = self.struct_fields(ty) {
                    if expected.len() != fields.len() {
                        return Err(Error::TypeMismatch(format!(
                            "struct constant has {} fields, type {} has {}",
                            fields.len(),
                            ty,
                            expected.len()
                        )));
                    }
                    for (field, want) in fields.iter().zip(&expected) {
                        if field.ty != *want {
                            return Err(Error::TypeMismatch(format!(
                                "struct field of type {} where {} was declared",
                                field.ty, want
                            )));
                        }
                    }
                }
                let fields = fields
                    .iter()
                    .map(|f| self.resolve_typed_const(f))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Constant::Struct {
                    ty: ty.clone(),
                    fields,
                })
            }
            Const::Array(elems) => {
                let (len, elem_ty) = match ty {
                    Type::Array { len, elem } => (*len, elem.as_ref().clone()),
                    _ => {
                        return Err(Error::TypeMismatch(format!(
                            "array constant declared with non-array type {}",
                            ty
                        )))
                    }
                };
                if len != elems.len() as u64 {
                    return Err(Error::TypeMismatch(format!(
                        "array constant has {} elements, type {} wants {}",
                        elems.len(),
                        ty,
                        len
                    )));
                }
                let elems = elems
                    .iter()
                    .map(|e| {
                        if e.ty != elem_ty {
                            return Err(Error::TypeMismatch(format!(
                                "array element of type {} where {} was declared",
                                e.ty, elem_ty
                            )));
                        }
                        self.resolve_typed_const(e)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Constant::Array {
                    ty: ty.clone(),
                    elems,
                })
            }
            Const::CStr(bytes) => {
                match ty {
                    Type::Array { len, elem }
                        if **elem == Type::Int(8) && *len == bytes.len() as u64 => {}
                    _ => {
                        return Err(Error::TypeMismatch(format!(
                            "byte string of {} bytes declared with type {}",
                            bytes.len(),
                            ty
                        )))
                    }
                }
                Ok(Constant::CharArray {
                    ty: ty.clone(),
                    bytes: bytes.clone(),
                })
            }
            Const::Vector(elems) => {
                let len = match ty {
                    Type::Vector { len, .. } => *len,
                    _ => {
                        return Err(Error::TypeMismatch(format!(
                            "vector constant declared with non-vector type {}",
                            ty
                        )))
                    }
                };
                if len != elems.len() as u64 {
                    return Err(Error::TypeMismatch(format!(
                        "vector constant has {} elements, type {} wants {}",
                        elems.len(),
                        ty,
                        len
                    )));
                }
                let elems = elems
                    .iter()
                    .map(|e| self.resolve_typed_const(e))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Constant::Vector {
                    ty: ty.clone(),
                    elems,
                })
            }
            Const::Global(ident) => match self.lookup_global(ident) {
                Some(target) => Ok(Constant::Global {
                    ty: ty.clone(),
                    target,
                }),
                // Recorded; poison keeps resolution going.
                None => Ok(Constant::Poison(ty.clone())),
            },
            Const::Gep {
                inbounds,
                elem_ty,
                base,
                indices,
            } => {
                self.check_type(elem_ty);
                let base = self.resolve_typed_const(base)?;
                let indices = indices
                    .iter()
                    .map(|i| self.resolve_typed_const(i))
                    .collect::<Result<Vec<_>>>()?;
                let ty = self.gep_result_ty(elem_ty, &base.ty(), &indices)?;
                Ok(Constant::Gep {
                    ty,
                    inbounds: *inbounds,
                    elem_ty: elem_ty.clone(),
                    base: Box::new(base),
                    indices,
                })
            }
            Const::Conv { op, value, to } => {
                self.check_type(to);
                let value = self.resolve_typed_const(value)?;
                Ok(Constant::Conv {
                    op: *op,
                    value: Box::new(value),
                    to: to.clone(),
                })
            }
        }
    }

    fn float_kind(&self, ty: &Type) -> Result<FloatKind> {
        match ty {
            Type::Float(kind) => Ok(*kind),
            _ => Err(Error::TypeMismatch(format!(
                "float constant declared with non-float type {}",
                ty
            ))),
        }
    }

    /// The field types of a struct type, following one level of nominal
    /// indirection. `None` when the type is opaque or not a struct.
    fn struct_fields(&self, ty: &Type) -> Option<Vec<Type>> {
        match ty {
            Type::Struct { fields, .. } => Some(fields.clone()),
            Type::Named(name) => match self.module.type_body(name) {
                Some(Type::Struct { fields, .. }) => Some(fields.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Computes the result type of a `getelementptr`: the first index
    /// steps across the pointer, the rest navigate into the element type.
    pub(crate) fn gep_result_ty(
        &mut self,
        elem_ty: &Type,
        base_ty: &Type,
        indices: &[Constant],
    ) -> Result<Type> {
        let addr_space = match base_ty {
            Type::Ptr { addr_space, .. } => *addr_space,
            _ => {
                return Err(Error::TypeMismatch(format!(
                    "getelementptr base must be a pointer, found {}",
                    base_ty
                )))
            }
        };
        for index in indices {
            if !index.ty().is_int_or_int_vector() {
                return Err(Error::TypeMismatch(format!(
                    "getelementptr index must be an integer, found {}",
                    index.ty()
                )));
            }
        }
        let mut cur = elem_ty.clone();
        for index in indices.iter().skip(1) {
            cur = self.navigate(&cur, index)?;
        }
        Ok(Type::Ptr {
            pointee: Box::new(cur),
            addr_space,
        })
    }

    fn navigate(&mut self, ty: &Type, index: &Constant) -> Result<Type> {
        match ty {
            Type::Array { elem, .. } | Type::Vector { elem, .. } => Ok(elem.as_ref().clone()),
            Type::Struct { fields, .. } => {
                let idx = match index {
                    Constant::Int { value, .. } => *value,
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
                        Error::TypeMismatch(format!("struct index {} out of range for {}", idx, ty))
                    })
            }
            Type::Named(name) => match self.module.type_body(name).cloned() {
                Some(body) => self.navigate(&body, index),
                None => Err(Error::TypeMismatch(format!(
                    "cannot index into opaque type %{}",
                    name
                ))),
            },
            _ => Err(Error::TypeMismatch(format!(
                "cannot index into type {}",
                ty
            ))),
        }
    }
}

/// Maps a hex literal's bits into the declared float kind. A plain `0x`
/// literal carries double bits and may also initialize a `float` when the
/// value narrows exactly.
fn convert_hex_float(target: FloatKind, literal: HexFloatKind, bits: u128) -> Option<u128> {
    match (target, literal) {
        (FloatKind::Double, HexFloatKind::Double) => Some(bits),
        (FloatKind::Single, HexFloatKind::Double) => {
            let wide = f64::from_bits(bits as u64);
            let narrow = wide as f32;
            if narrow as f64 == wide || wide.is_nan() {
                Some(narrow.to_bits() as u128)
            } else {
                None
            }
        }
        (FloatKind::Half, HexFloatKind::Half) => Some(bits),
        (FloatKind::X86Fp80, HexFloatKind::X86Fp80) => Some(bits),
        (FloatKind::Fp128, HexFloatKind::Fp128) => Some(bits),
        (FloatKind::PpcFp128, HexFloatKind::PpcFp128) => Some(bits),
        _ => None,
    }
}
