//! Resolved constants.
//!
//! Constants are immutable values embeddable in global initializers,
//! instruction operands, and metadata. Each carries enough type
//! information to answer `ty()` without module context; references to
//! global entities are arena indices, so printing those does need the
//! module (see the printer).

use super::enums::ConvOp;
use super::float::FloatKind;
use super::types::Type;
use super::GlobalRef;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Integer constant; `i1` prints as `true`/`false`.
    Int { ty: Type, value: i128 },
    /// Floating-point constant as an exact bit pattern.
    Float { kind: FloatKind, bits: u128 },
    /// `null` of a pointer type.
    Null(Type),
    Undef(Type),
    Poison(Type),
    /// `zeroinitializer`
    Zero(Type),
    Struct { ty: Type, fields: Vec<Constant> },
    Array { ty: Type, elems: Vec<Constant> },
    /// `c"..."` byte array.
    CharArray { ty: Type, bytes: Vec<u8> },
    Vector { ty: Type, elems: Vec<Constant> },
    /// The address of a global entity; `ty` is the pointer type.
    Global { ty: Type, target: GlobalRef },
    /// `getelementptr [inbounds] (T, P base, indices...)`
    Gep {
        /// Result type, computed at resolution.
        ty: Type,
        inbounds: bool,
        elem_ty: Type,
        base: Box<Constant>,
        indices: Vec<Constant>,
    },
    /// Conversion expression such as `bitcast (i8* @g to i32*)`.
    Conv {
        op: ConvOp,
        value: Box<Constant>,
        to: Type,
    },
}

impl Constant {
    /// The type of this constant.
    pub fn ty(&self) -> Type {
        match self {
            Constant::Int { ty, .. }
            | Constant::Struct { ty, .. }
            | Constant::Array { ty, .. }
            | Constant::CharArray { ty, .. }
            | Constant::Vector { ty, .. }
            | Constant::Global { ty, .. }
            | Constant::Gep { ty, .. } => ty.clone(),
            Constant::Float { kind, .. } => Type::Float(*kind),
            Constant::Null(ty) | Constant::Undef(ty) | Constant::Poison(ty) | Constant::Zero(ty) => {
                ty.clone()
            }
            Constant::Conv { to, .. } => to.clone(),
        }
    }

    /// True for the boolean constants `true` and `false`.
    pub fn is_bool(&self) -> bool {
        matches!(self, Constant::Int { ty: Type::Int(1), .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_types() {
        let c = Constant::Int {
            ty: Type::Int(32),
            value: -7,
        };
        assert_eq!(c.ty(), Type::Int(32));

        let f = Constant::Float {
            kind: FloatKind::Double,
            bits: 1.0f64.to_bits() as u128,
        };
        assert_eq!(f.ty(), Type::Float(FloatKind::Double));

        let n = Constant::Null(Type::Int(8).ptr_to());
        assert_eq!(n.ty(), Type::Int(8).ptr_to());
    }

    #[test]
    fn test_is_bool() {
        let t = Constant::Int {
            ty: Type::Int(1),
            value: 1,
        };
        assert!(t.is_bool());
        let i = Constant::Int {
            ty: Type::Int(8),
            value: 1,
        };
        assert!(!i.is_bool());
    }
}
