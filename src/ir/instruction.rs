//! Resolved instructions and operand values.

use super::constant::Constant;
use super::enums::{
    BinOp, CallingConv, ConvOp, FastMathFlag, FloatPred, FnAttr, IntPred, ParamAttr,
};
use super::types::{LocalIdent, Type};

/// An instruction operand. Globals appear as `Const(Constant::Global)`;
/// locals carry their identifier and type directly, both fixed by the
/// resolver's per-function pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Local { ident: LocalIdent, ty: Type },
    Const(Constant),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Local { ty, .. } => ty.clone(),
            Value::Const(c) => c.ty(),
        }
    }
}

/// `nuw`/`nsw`/`exact` integer flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BinFlags {
    pub nuw: bool,
    pub nsw: bool,
    pub exact: bool,
}

/// One argument at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallArg {
    pub attrs: Vec<ParamAttr>,
    pub value: Value,
}

/// A call-site operand bundle, `"tag"(inputs...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperandBundle {
    pub tag: String,
    pub inputs: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Binary and bitwise ops: `%r = add nuw i32 %a, %b`.
    Binary {
        result: LocalIdent,
        op: BinOp,
        flags: BinFlags,
        fmf: Vec<FastMathFlag>,
        ty: Type,
        lhs: Value,
        rhs: Value,
    },
    ExtractElement {
        result: LocalIdent,
        vec: Value,
        index: Value,
    },
    InsertElement {
        result: LocalIdent,
        vec: Value,
        elem: Value,
        index: Value,
    },
    ShuffleVector {
        result: LocalIdent,
        v1: Value,
        v2: Value,
        mask: Value,
    },
    ExtractValue {
        result: LocalIdent,
        agg: Value,
        indices: Vec<u64>,
    },
    InsertValue {
        result: LocalIdent,
        agg: Value,
        elem: Value,
        indices: Vec<u64>,
    },
    Alloca {
        result: LocalIdent,
        ty: Type,
        count: Option<Value>,
        align: Option<u64>,
    },
    Load {
        result: LocalIdent,
        volatile: bool,
        ty: Type,
        ptr: Value,
        align: Option<u64>,
    },
    Store {
        volatile: bool,
        value: Value,
        ptr: Value,
        align: Option<u64>,
    },
    Gep {
        result: LocalIdent,
        inbounds: bool,
        elem_ty: Type,
        ptr: Value,
        indices: Vec<Value>,
    },
    /// `%r = trunc i64 %x to i32` and the other eleven conversions.
    Conv {
        result: LocalIdent,
        op: ConvOp,
        value: Value,
        to: Type,
    },
    ICmp {
        result: LocalIdent,
        pred: IntPred,
        ty: Type,
        lhs: Value,
        rhs: Value,
    },
    FCmp {
        result: LocalIdent,
        pred: FloatPred,
        fmf: Vec<FastMathFlag>,
        ty: Type,
        lhs: Value,
        rhs: Value,
    },
    Phi {
        result: LocalIdent,
        ty: Type,
        incoming: Vec<(Value, LocalIdent)>,
    },
    Select {
        result: LocalIdent,
        cond: Value,
        if_true: Value,
        if_false: Value,
    },
    Call {
        /// `None` for void calls.
        result: Option<LocalIdent>,
        tail: bool,
        cconv: Option<CallingConv>,
        ret_attrs: Vec<ParamAttr>,
        ret_ty: Type,
        callee: Value,
        args: Vec<CallArg>,
        attrs: Vec<FnAttr>,
        bundles: Vec<OperandBundle>,
    },
}

impl Instruction {
    /// The identifier this instruction defines, if any.
    pub fn result(&self) -> Option<&LocalIdent> {
        match self {
            Instruction::Binary { result, .. }
            | Instruction::ExtractElement { result, .. }
            | Instruction::InsertElement { result, .. }
            | Instruction::ShuffleVector { result, .. }
            | Instruction::ExtractValue { result, .. }
            | Instruction::InsertValue { result, .. }
            | Instruction::Alloca { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::Gep { result, .. }
            | Instruction::Conv { result, .. }
            | Instruction::ICmp { result, .. }
            | Instruction::FCmp { result, .. }
            | Instruction::Phi { result, .. }
            | Instruction::Select { result, .. } => Some(result),
            Instruction::Call { result, .. } => result.as_ref(),
            Instruction::Store { .. } => None,
        }
    }
}

/// Switch case: integer constant to destination label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwitchCase {
    pub value: Constant,
    pub dest: LocalIdent,
}

/// The single terminator closing each basic block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminator {
    Ret(Option<Value>),
    /// `br label %dest`
    Br(LocalIdent),
    CondBr {
        cond: Value,
        if_true: LocalIdent,
        if_false: LocalIdent,
    },
    Switch {
        value: Value,
        default: LocalIdent,
        cases: Vec<SwitchCase>,
    },
    Unreachable,
}
