//! The resolved intermediate representation.
//!
//! Everything in this module is produced by the resolver and read by the
//! printer (and by downstream consumers). The module owns all top-level
//! entities; cross-references are arena indices, never owning pointers,
//! so removing a use never implies removing its target.

pub mod constant;
pub mod enums;
pub mod float;
pub mod function;
pub mod global;
pub mod instruction;
pub mod metadata;
pub mod module;
pub mod types;

pub use constant::Constant;
pub use function::{Block, Function, Param};
pub use global::{Alias, Comdat, GlobalVar};
pub use instruction::{Instruction, Terminator, Value};
pub use metadata::{MdNode, MdNodeId, MdOperand, NamedMd};
pub use module::{AttrGroup, Module, TypeDef};
pub use types::{GlobalIdent, LocalIdent, Type};

/// Reference to a module-level entity by arena index. Two references to
/// the same entity compare equal, which is what gives forward references
/// their identity guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalRef {
    Global(usize),
    Alias(usize),
    Func(usize),
}
