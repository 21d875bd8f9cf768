//! Resolved metadata graphs.
//!
//! Metadata nodes live in one arena owned by the module; every reference
//! between nodes is an arena index (`MdNodeId`), which is what makes
//! self-referential and mutually-recursive graphs representable without
//! ownership cycles. Uniqued nodes are structurally deduplicated by the
//! resolver; `distinct` nodes keep their identity.

use super::instruction::Value;

/// Index into the module's metadata node arena.
pub type MdNodeId = usize;

/// One metadata node definition, `!N = [distinct] !{ ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MdNode {
    /// The printed identifier, preserved from the source.
    pub id: u64,
    pub distinct: bool,
    pub operands: Vec<MdOperand>,
}

/// A metadata operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MdOperand {
    /// `null`
    Null,
    /// `!"..."`
    Str(String),
    /// `!N` reference to another node (possibly this one).
    Node(MdNodeId),
    /// A typed IR value, such as `i32 7` or `i8* @g`.
    Value(Value),
}

/// `!name = !{!0, !1, ...}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedMd {
    pub name: String,
    pub nodes: Vec<MdNodeId>,
}
