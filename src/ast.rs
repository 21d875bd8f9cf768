//! The unresolved syntax tree.
//!
//! The parser produces these types directly; they mirror the resolved IR
//! but keep every cross-reference symbolic: globals by identifier,
//! metadata nodes by printed number, types by name. The resolver turns
//! them into `ir` values in two passes.

use crate::ir::enums::{
    BinOp, CallingConv, ConvOp, FastMathFlag, FloatPred, FnAttr, IntPred, Linkage, ParamAttr,
    SelectionKind, UnnamedAddr, Visibility,
};
use crate::ir::float::HexFloatKind;
use crate::ir::instruction::BinFlags;
use crate::ir::types::{GlobalIdent, LocalIdent, Type};

/// A constant literal without its type; the type always comes from the
/// surrounding [`TypedConst`] or from the entity carrying the literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    Int(i128),
    /// Decimal float literal; conversion to bits waits for the type.
    Float(f64),
    HexFloat {
        kind: HexFloatKind,
        bits: u128,
    },
    Null,
    Undef,
    Poison,
    Zero,
    Struct(Vec<TypedConst>),
    Array(Vec<TypedConst>),
    CStr(Vec<u8>),
    Vector(Vec<TypedConst>),
    /// Symbolic reference to a global entity, resolved in pass two.
    Global(GlobalIdent),
    Gep {
        inbounds: bool,
        elem_ty: Type,
        base: Box<TypedConst>,
        indices: Vec<TypedConst>,
    },
    Conv {
        op: ConvOp,
        value: Box<TypedConst>,
        to: Type,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedConst {
    pub ty: Type,
    pub value: Const,
}

/// An instruction operand before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum AstValue {
    Local(LocalIdent),
    Const(Const),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub ty: Type,
    pub value: AstValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallArg {
    pub attrs: Vec<ParamAttr>,
    pub value: TypedValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperandBundle {
    pub tag: String,
    pub inputs: Vec<TypedValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    Binary {
        result: LocalIdent,
        op: BinOp,
        flags: BinFlags,
        fmf: Vec<FastMathFlag>,
        ty: Type,
        lhs: AstValue,
        rhs: AstValue,
    },
    ExtractElement {
        result: LocalIdent,
        vec: TypedValue,
        index: TypedValue,
    },
    InsertElement {
        result: LocalIdent,
        vec: TypedValue,
        elem: TypedValue,
        index: TypedValue,
    },
    ShuffleVector {
        result: LocalIdent,
        v1: TypedValue,
        v2: TypedValue,
        mask: TypedValue,
    },
    ExtractValue {
        result: LocalIdent,
        agg: TypedValue,
        indices: Vec<u64>,
    },
    InsertValue {
        result: LocalIdent,
        agg: TypedValue,
        elem: TypedValue,
        indices: Vec<u64>,
    },
    Alloca {
        result: LocalIdent,
        ty: Type,
        count: Option<TypedValue>,
        align: Option<u64>,
    },
    Load {
        result: LocalIdent,
        volatile: bool,
        ty: Type,
        ptr: TypedValue,
        align: Option<u64>,
    },
    Store {
        volatile: bool,
        value: TypedValue,
        ptr: TypedValue,
        align: Option<u64>,
    },
    Gep {
        result: LocalIdent,
        inbounds: bool,
        elem_ty: Type,
        ptr: TypedValue,
        indices: Vec<TypedValue>,
    },
    Conv {
        result: LocalIdent,
        op: ConvOp,
        value: TypedValue,
        to: Type,
    },
    ICmp {
        result: LocalIdent,
        pred: IntPred,
        ty: Type,
        lhs: AstValue,
        rhs: AstValue,
    },
    FCmp {
        result: LocalIdent,
        pred: FloatPred,
        fmf: Vec<FastMathFlag>,
        ty: Type,
        lhs: AstValue,
        rhs: AstValue,
    },
    Phi {
        result: LocalIdent,
        ty: Type,
        incoming: Vec<(AstValue, LocalIdent)>,
    },
    Select {
        result: LocalIdent,
        cond: TypedValue,
        if_true: TypedValue,
        if_false: TypedValue,
    },
    Call {
        result: Option<LocalIdent>,
        tail: bool,
        cconv: Option<CallingConv>,
        ret_attrs: Vec<ParamAttr>,
        ret_ty: Type,
        callee: AstValue,
        args: Vec<CallArg>,
        attrs: Vec<FnAttr>,
        bundles: Vec<OperandBundle>,
    },
}

impl Inst {
    /// The identifier this instruction binds, if any.
    pub fn result(&self) -> Option<&LocalIdent> {
        match self {
            Inst::Binary { result, .. }
            | Inst::ExtractElement { result, .. }
            | Inst::InsertElement { result, .. }
            | Inst::ShuffleVector { result, .. }
            | Inst::ExtractValue { result, .. }
            | Inst::InsertValue { result, .. }
            | Inst::Alloca { result, .. }
            | Inst::Load { result, .. }
            | Inst::Gep { result, .. }
            | Inst::Conv { result, .. }
            | Inst::ICmp { result, .. }
            | Inst::FCmp { result, .. }
            | Inst::Phi { result, .. }
            | Inst::Select { result, .. } => Some(result),
            Inst::Call { result, .. } => result.as_ref(),
            Inst::Store { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub ty: Type,
    pub value: Const,
    pub dest: LocalIdent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Ret(Option<TypedValue>),
    Br(LocalIdent),
    CondBr {
        cond: TypedValue,
        if_true: LocalIdent,
        if_false: LocalIdent,
    },
    Switch {
        value: TypedValue,
        default: LocalIdent,
        cases: Vec<SwitchCase>,
    },
    Unreachable,
}

/// A basic block as written; `label` is `None` when the block relies on
/// implicit numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: Option<LocalIdent>,
    pub insts: Vec<Inst>,
    pub term: Term,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Type,
    pub attrs: Vec<ParamAttr>,
    pub name: Option<LocalIdent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDef {
    pub name: GlobalIdent,
    pub linkage: Option<Linkage>,
    pub visibility: Option<Visibility>,
    pub unnamed_addr: Option<UnnamedAddr>,
    pub addr_space: Option<u64>,
    /// `constant` rather than `global`.
    pub immutable: bool,
    pub content_ty: Type,
    /// `None` for declarations (`external global i32` with no initializer).
    pub init: Option<Const>,
    pub section: Option<String>,
    pub comdat: Option<String>,
    pub align: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDef {
    pub name: GlobalIdent,
    pub linkage: Option<Linkage>,
    pub visibility: Option<Visibility>,
    pub unnamed_addr: Option<UnnamedAddr>,
    pub content_ty: Type,
    pub aliasee: TypedConst,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub is_definition: bool,
    pub name: GlobalIdent,
    pub linkage: Option<Linkage>,
    pub visibility: Option<Visibility>,
    pub cconv: Option<CallingConv>,
    pub unnamed_addr: Option<UnnamedAddr>,
    pub ret_attrs: Vec<ParamAttr>,
    pub ret_ty: Type,
    pub params: Vec<Param>,
    pub variadic: bool,
    pub attrs: Vec<FnAttr>,
    pub section: Option<String>,
    pub comdat: Option<String>,
    pub align: Option<u64>,
    /// Metadata attachments by printed node number.
    pub metadata: Vec<(String, u64)>,
    pub blocks: Vec<Block>,
}

/// One metadata node operand as written.
#[derive(Debug, Clone, PartialEq)]
pub enum MdOperand {
    Null,
    Str(String),
    /// `!N` reference by printed number.
    Node(u64),
    Value(TypedValue),
}

/// One top-level entity in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    SourceFilename(String),
    DataLayout(String),
    TargetTriple(String),
    ModuleAsm(String),
    TypeDef {
        name: String,
        body: Option<Type>,
    },
    Comdat {
        name: String,
        kind: SelectionKind,
    },
    Global(GlobalDef),
    Alias(AliasDef),
    Function(FuncDef),
    AttrGroup {
        id: u64,
        attrs: Vec<FnAttr>,
    },
    NamedMetadata {
        name: String,
        nodes: Vec<u64>,
    },
    MetadataDef {
        id: u64,
        distinct: bool,
        operands: Vec<MdOperand>,
    },
}
