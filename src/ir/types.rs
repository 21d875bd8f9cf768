//! The IR type system and identifier forms.

use std::fmt;

use super::float::FloatKind;

/// A module-level identifier: `@name` or `@N`. Unnamed entities carry the
/// implicit number assigned by the numbering scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlobalIdent {
    Named(String),
    Num(u64),
}

/// A function-local identifier: `%name`, `%N`, or a block label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalIdent {
    Named(String),
    Num(u64),
}

/// True if `s` can be printed without quotes:
/// `[A-Za-z$._][A-Za-z$._0-9]*`.
pub fn is_unquoted_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '$' || c == '.' || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '$' || c == '.' || c == '_')
}

/// Writes a name, quoting and `\XX`-escaping it when it falls outside the
/// unquoted identifier charset.
pub fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_unquoted_ident(name) {
        return f.write_str(name);
    }
    f.write_str("\"")?;
    for &b in name.as_bytes() {
        if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
            write!(f, "{}", b as char)?;
        } else {
            write!(f, "\\{:02X}", b)?;
        }
    }
    f.write_str("\"")
}

impl fmt::Display for GlobalIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@")?;
        match self {
            GlobalIdent::Named(name) => write_name(f, name),
            GlobalIdent::Num(n) => write!(f, "{}", n),
        }
    }
}

impl fmt::Display for LocalIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("%")?;
        match self {
            LocalIdent::Named(name) => write_name(f, name),
            LocalIdent::Num(n) => write!(f, "{}", n),
        }
    }
}

/// A first-class IR type. Named struct references stay nominal (`Named`);
/// their bodies live in the module's type definition list, which is what
/// lets recursive and opaque structs exist without reference cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    /// `iN`
    Int(u32),
    Float(FloatKind),
    /// `T*` or `T addrspace(N)*`
    Ptr { pointee: Box<Type>, addr_space: u32 },
    /// `[N x T]`
    Array { len: u64, elem: Box<Type> },
    /// `<N x T>` or `<vscale x N x T>`
    Vector {
        len: u64,
        elem: Box<Type>,
        scalable: bool,
    },
    /// `{ T, ... }` or `<{ T, ... }>`
    Struct { fields: Vec<Type>, packed: bool },
    /// Reference to `%name = type ...`
    Named(String),
    /// `R (A, ...)`
    Func {
        ret: Box<Type>,
        params: Vec<Type>,
        variadic: bool,
    },
    Label,
    Metadata,
    Token,
}

impl Type {
    pub fn ptr_to(self) -> Type {
        Type::Ptr {
            pointee: Box::new(self),
            addr_space: 0,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float(_))
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, Type::Ptr { .. })
    }

    /// Integer, or vector of integers.
    pub fn is_int_or_int_vector(&self) -> bool {
        match self {
            Type::Int(_) => true,
            Type::Vector { elem, .. } => elem.is_int(),
            _ => false,
        }
    }

    /// Float, or vector of floats.
    pub fn is_float_or_float_vector(&self) -> bool {
        match self {
            Type::Float(_) => true,
            Type::Vector { elem, .. } => elem.is_float(),
            _ => false,
        }
    }

    /// Pointer, or vector of pointers.
    pub fn is_ptr_or_ptr_vector(&self) -> bool {
        match self {
            Type::Ptr { .. } => true,
            Type::Vector { elem, .. } => elem.is_ptr(),
            _ => false,
        }
    }

    /// Types usable as first-class instruction operands.
    pub fn is_first_class(&self) -> bool {
        !matches!(self, Type::Void | Type::Func { .. })
    }

    /// For aggregate navigation: the type at `index`, if statically known.
    pub fn element_at(&self, index: u64) -> Option<&Type> {
        match self {
            Type::Array { elem, .. } => Some(elem),
            Type::Vector { elem, .. } => Some(elem),
            Type::Struct { fields, .. } => fields.get(index as usize),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int(bits) => write!(f, "i{}", bits),
            Type::Float(kind) => write!(f, "{}", kind),
            Type::Ptr {
                pointee,
                addr_space,
            } => {
                if *addr_space == 0 {
                    write!(f, "{}*", pointee)
                } else {
                    write!(f, "{} addrspace({})*", pointee, addr_space)
                }
            }
            Type::Array { len, elem } => write!(f, "[{} x {}]", len, elem),
            Type::Vector {
                len,
                elem,
                scalable,
            } => {
                if *scalable {
                    write!(f, "<vscale x {} x {}>", len, elem)
                } else {
                    write!(f, "<{} x {}>", len, elem)
                }
            }
            Type::Struct { fields, packed } => {
                if *packed {
                    write!(f, "<{{")?;
                } else {
                    write!(f, "{{")?;
                }
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}", field)?;
                }
                if !fields.is_empty() {
                    write!(f, " ")?;
                }
                if *packed {
                    write!(f, "}}>")
                } else {
                    write!(f, "}}")
                }
            }
            Type::Named(name) => {
                f.write_str("%")?;
                write_name(f, name)
            }
            Type::Func {
                ret,
                params,
                variadic,
            } => {
                write!(f, "{} (", ret)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                if *variadic {
                    if params.is_empty() {
                        write!(f, "...")?;
                    } else {
                        write!(f, ", ...")?;
                    }
                }
                write!(f, ")")
            }
            Type::Label => write!(f, "label"),
            Type::Metadata => write!(f, "metadata"),
            Type::Token => write!(f, "token"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalar_types() {
        assert_eq!(format!("{}", Type::Void), "void");
        assert_eq!(format!("{}", Type::Int(32)), "i32");
        assert_eq!(format!("{}", Type::Float(FloatKind::Double)), "double");
        assert_eq!(format!("{}", Type::Label), "label");
    }

    #[test]
    fn test_display_pointer_types() {
        assert_eq!(format!("{}", Type::Int(8).ptr_to()), "i8*");
        let p = Type::Ptr {
            pointee: Box::new(Type::Float(FloatKind::Single)),
            addr_space: 5,
        };
        assert_eq!(format!("{}", p), "float addrspace(5)*");
    }

    #[test]
    fn test_display_aggregate_types() {
        let arr = Type::Array {
            len: 4,
            elem: Box::new(Type::Int(32)),
        };
        assert_eq!(format!("{}", arr), "[4 x i32]");

        let vec = Type::Vector {
            len: 8,
            elem: Box::new(Type::Int(16)),
            scalable: false,
        };
        assert_eq!(format!("{}", vec), "<8 x i16>");

        let svec = Type::Vector {
            len: 2,
            elem: Box::new(Type::Int(64)),
            scalable: true,
        };
        assert_eq!(format!("{}", svec), "<vscale x 2 x i64>");

        let st = Type::Struct {
            fields: vec![Type::Int(32), Type::Int(8).ptr_to()],
            packed: false,
        };
        assert_eq!(format!("{}", st), "{ i32, i8* }");

        let packed = Type::Struct {
            fields: vec![Type::Int(8)],
            packed: true,
        };
        assert_eq!(format!("{}", packed), "<{ i8 }>");

        let empty = Type::Struct {
            fields: vec![],
            packed: false,
        };
        assert_eq!(format!("{}", empty), "{}");
    }

    #[test]
    fn test_display_func_type() {
        let fnty = Type::Func {
            ret: Box::new(Type::Int(32)),
            params: vec![Type::Int(8).ptr_to()],
            variadic: true,
        };
        assert_eq!(format!("{}", fnty), "i32 (i8*, ...)");
    }

    #[test]
    fn test_display_idents_with_quoting() {
        assert_eq!(format!("{}", GlobalIdent::Named("main".into())), "@main");
        assert_eq!(format!("{}", GlobalIdent::Num(0)), "@0");
        assert_eq!(
            format!("{}", GlobalIdent::Named("odd name".into())),
            "@\"odd name\""
        );
        assert_eq!(
            format!("{}", LocalIdent::Named("a\\b".into())),
            "%\"a\\5Cb\""
        );
        assert_eq!(format!("{}", LocalIdent::Num(7)), "%7");
    }

    #[test]
    fn test_unquoted_charset() {
        assert!(is_unquoted_ident("a$._9"));
        assert!(is_unquoted_ident(".str"));
        assert!(!is_unquoted_ident("9lives"));
        assert!(!is_unquoted_ident("has space"));
        assert!(!is_unquoted_ident(""));
    }
}
