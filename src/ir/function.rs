//! Resolved functions and basic blocks.

use super::enums::{CallingConv, FnAttr, Linkage, ParamAttr, UnnamedAddr, Visibility};
use super::instruction::{Instruction, Terminator};
use super::types::{GlobalIdent, LocalIdent, Type};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub ty: Type,
    pub attrs: Vec<ParamAttr>,
    /// Every definition parameter has an identifier after resolution;
    /// unnamed ones carry their implicit number. Declarations leave this
    /// `None`.
    pub name: Option<LocalIdent>,
}

/// A basic block: zero or more instructions and exactly one terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: LocalIdent,
    pub insts: Vec<Instruction>,
    pub term: Terminator,
}

/// A function declaration (`blocks` empty) or definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// `define` rather than `declare`.
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
    pub comdat: Option<usize>,
    pub align: Option<u64>,
    /// Metadata attachments, `!dbg !0`.
    pub metadata: Vec<(String, super::metadata::MdNodeId)>,
    pub blocks: Vec<Block>,
}

impl Function {
    /// The function's own type, `R (A, ...)`.
    pub fn fn_ty(&self) -> Type {
        Type::Func {
            ret: Box::new(self.ret_ty.clone()),
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            variadic: self.variadic,
        }
    }
}
