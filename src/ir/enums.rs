//! Fixed enumeration spellings of the IR grammar.
//!
//! Each enum here is a closed set of keywords with a bidirectional
//! string mapping: `from_str` is used by the parser (returning `None` for
//! words outside the set, which the grammar treats as a syntax error) and
//! `Display` is used by the printer. The tables are static data; nothing
//! here carries state.

use std::fmt;

macro_rules! spelling_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

spelling_enum! {
    /// Linkage of a global entity. `external` is the default and is not
    /// printed on definitions.
    Linkage {
        Private => "private",
        Internal => "internal",
        AvailableExternally => "available_externally",
        LinkOnce => "linkonce",
        Weak => "weak",
        Common => "common",
        Appending => "appending",
        ExternWeak => "extern_weak",
        LinkOnceOdr => "linkonce_odr",
        WeakOdr => "weak_odr",
        External => "external",
    }
}

spelling_enum! {
    Visibility {
        Default => "default",
        Hidden => "hidden",
        Protected => "protected",
    }
}

spelling_enum! {
    UnnamedAddr {
        UnnamedAddr => "unnamed_addr",
        LocalUnnamedAddr => "local_unnamed_addr",
    }
}

spelling_enum! {
    /// Comdat selection kind.
    SelectionKind {
        Any => "any",
        ExactMatch => "exactmatch",
        Largest => "largest",
        NoDuplicates => "noduplicates",
        SameSize => "samesize",
    }
}

spelling_enum! {
    CallingConv {
        C => "ccc",
        Fast => "fastcc",
        Cold => "coldcc",
    }
}

spelling_enum! {
    /// Binary and bitwise opcodes; all take two operands of the stated type.
    BinOp {
        Add => "add",
        FAdd => "fadd",
        Sub => "sub",
        FSub => "fsub",
        Mul => "mul",
        FMul => "fmul",
        UDiv => "udiv",
        SDiv => "sdiv",
        FDiv => "fdiv",
        URem => "urem",
        SRem => "srem",
        FRem => "frem",
        Shl => "shl",
        LShr => "lshr",
        AShr => "ashr",
        And => "and",
        Or => "or",
        Xor => "xor",
    }
}

impl BinOp {
    /// True for the floating-point opcodes, which admit fast-math flags.
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            BinOp::FAdd | BinOp::FSub | BinOp::FMul | BinOp::FDiv | BinOp::FRem
        )
    }

    /// True for opcodes that admit `nuw`/`nsw` wrap flags.
    pub fn has_wrap_flags(&self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Shl)
    }

    /// True for opcodes that admit the `exact` flag.
    pub fn has_exact_flag(&self) -> bool {
        matches!(
            self,
            BinOp::UDiv | BinOp::SDiv | BinOp::LShr | BinOp::AShr
        )
    }
}

spelling_enum! {
    /// Conversion opcodes; all take one operand and a target type.
    ConvOp {
        Trunc => "trunc",
        ZExt => "zext",
        SExt => "sext",
        FPTrunc => "fptrunc",
        FPExt => "fpext",
        FPToUI => "fptoui",
        FPToSI => "fptosi",
        UIToFP => "uitofp",
        SIToFP => "sitofp",
        PtrToInt => "ptrtoint",
        IntToPtr => "inttoptr",
        BitCast => "bitcast",
        AddrSpaceCast => "addrspacecast",
    }
}

spelling_enum! {
    /// Integer comparison predicates for `icmp`.
    IntPred {
        Eq => "eq",
        Ne => "ne",
        Ugt => "ugt",
        Uge => "uge",
        Ult => "ult",
        Ule => "ule",
        Sgt => "sgt",
        Sge => "sge",
        Slt => "slt",
        Sle => "sle",
    }
}

spelling_enum! {
    /// Floating-point comparison predicates for `fcmp`.
    FloatPred {
        False => "false",
        OEq => "oeq",
        OGt => "ogt",
        OGe => "oge",
        OLt => "olt",
        OLe => "ole",
        ONe => "one",
        Ord => "ord",
        UEq => "ueq",
        UGt => "ugt",
        UGe => "uge",
        ULt => "ult",
        ULe => "ule",
        UNe => "une",
        Uno => "uno",
        True => "true",
    }
}

spelling_enum! {
    FastMathFlag {
        Fast => "fast",
        NNaN => "nnan",
        NInf => "ninf",
        NSZ => "nsz",
        ARcp => "arcp",
        Contract => "contract",
        AFn => "afn",
        Reassoc => "reassoc",
    }
}

/// Parameter (and return value) attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamAttr {
    ZeroExt,
    SignExt,
    InReg,
    ByVal,
    SRet,
    NoAlias,
    NoCapture,
    NonNull,
    ReadOnly,
    ReadNone,
    Returned,
    Align(u64),
}

impl ParamAttr {
    /// Word-only attributes; `align N` is handled separately by the parser.
    pub fn from_word(s: &str) -> Option<Self> {
        match s {
            "zeroext" => Some(ParamAttr::ZeroExt),
            "signext" => Some(ParamAttr::SignExt),
            "inreg" => Some(ParamAttr::InReg),
            "byval" => Some(ParamAttr::ByVal),
            "sret" => Some(ParamAttr::SRet),
            "noalias" => Some(ParamAttr::NoAlias),
            "nocapture" => Some(ParamAttr::NoCapture),
            "nonnull" => Some(ParamAttr::NonNull),
            "readonly" => Some(ParamAttr::ReadOnly),
            "readnone" => Some(ParamAttr::ReadNone),
            "returned" => Some(ParamAttr::Returned),
            _ => None,
        }
    }
}

impl fmt::Display for ParamAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamAttr::ZeroExt => write!(f, "zeroext"),
            ParamAttr::SignExt => write!(f, "signext"),
            ParamAttr::InReg => write!(f, "inreg"),
            ParamAttr::ByVal => write!(f, "byval"),
            ParamAttr::SRet => write!(f, "sret"),
            ParamAttr::NoAlias => write!(f, "noalias"),
            ParamAttr::NoCapture => write!(f, "nocapture"),
            ParamAttr::NonNull => write!(f, "nonnull"),
            ParamAttr::ReadOnly => write!(f, "readonly"),
            ParamAttr::ReadNone => write!(f, "readnone"),
            ParamAttr::Returned => write!(f, "returned"),
            ParamAttr::Align(n) => write!(f, "align {}", n),
        }
    }
}

/// Function and call-site attributes. `Group` is a reference to an
/// `attributes #N` definition; the resolver checks that the group exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FnAttr {
    /// Keyword attribute such as `noinline` or `nounwind`. The keyword set
    /// is open in the grammar; any plain word in attribute position parses.
    Word(String),
    /// String attribute, `"key"` or `"key"="value"`.
    Str(String, Option<String>),
    /// Attribute group reference, `#N`.
    Group(u64),
    Align(u64),
}

impl fmt::Display for FnAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FnAttr::Word(w) => f.write_str(w),
            FnAttr::Str(k, None) => write!(f, "\"{}\"", k),
            FnAttr::Str(k, Some(v)) => write!(f, "\"{}\"=\"{}\"", k, v),
            FnAttr::Group(n) => write!(f, "#{}", n),
            FnAttr::Align(n) => write!(f, "align {}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linkage_round_trip() {
        for text in [
            "private",
            "internal",
            "available_externally",
            "linkonce",
            "weak",
            "common",
            "appending",
            "extern_weak",
            "linkonce_odr",
            "weak_odr",
            "external",
        ] {
            let linkage = Linkage::from_str(text).expect(text);
            assert_eq!(linkage.as_str(), text);
        }
        assert_eq!(Linkage::from_str("static"), None);
    }

    #[test]
    fn test_binop_flags() {
        assert!(BinOp::Add.has_wrap_flags());
        assert!(!BinOp::UDiv.has_wrap_flags());
        assert!(BinOp::UDiv.has_exact_flag());
        assert!(BinOp::FAdd.is_float());
        assert!(!BinOp::Xor.is_float());
    }

    #[test]
    fn test_predicate_spellings() {
        assert_eq!(IntPred::from_str("slt"), Some(IntPred::Slt));
        assert_eq!(format!("{}", IntPred::Uge), "uge");
        assert_eq!(FloatPred::from_str("une"), Some(FloatPred::UNe));
        assert_eq!(format!("{}", FloatPred::OEq), "oeq");
    }

    #[test]
    fn test_fn_attr_display() {
        assert_eq!(format!("{}", FnAttr::Word("noinline".into())), "noinline");
        assert_eq!(format!("{}", FnAttr::Group(3)), "#3");
        assert_eq!(
            format!("{}", FnAttr::Str("frame-pointer".into(), Some("all".into()))),
            "\"frame-pointer\"=\"all\""
        );
    }
}
