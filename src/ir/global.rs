//! Module-level data entities: global variables, aliases, and comdats.

use super::constant::Constant;
use super::enums::{Linkage, SelectionKind, UnnamedAddr, Visibility};
use super::types::{GlobalIdent, Type};

/// A global variable or constant declaration/definition.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub name: GlobalIdent,
    pub linkage: Option<Linkage>,
    pub visibility: Option<Visibility>,
    pub unnamed_addr: Option<UnnamedAddr>,
    pub addr_space: u32,
    /// `constant` rather than `global`.
    pub immutable: bool,
    /// The type of the contents (the symbol itself has pointer type).
    pub content_ty: Type,
    /// `None` for external declarations.
    pub init: Option<Constant>,
    pub section: Option<String>,
    /// Index into the module's comdat list.
    pub comdat: Option<usize>,
    pub align: Option<u64>,
}

/// `@a = alias T, T* @target`
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: GlobalIdent,
    pub linkage: Option<Linkage>,
    pub visibility: Option<Visibility>,
    pub unnamed_addr: Option<UnnamedAddr>,
    pub content_ty: Type,
    /// The aliasee, usually a global reference or a cast of one.
    pub aliasee: Constant,
}

/// `$name = comdat kind`
#[derive(Debug, Clone, PartialEq)]
pub struct Comdat {
    pub name: String,
    pub kind: SelectionKind,
}
