//! The fully resolved module: the assembler's deliverable.

use std::fmt;

use super::function::Function;
use super::global::{Alias, Comdat, GlobalVar};
use super::metadata::{MdNode, NamedMd};
use super::types::{GlobalIdent, Type};
use super::GlobalRef;
use crate::ir::enums::FnAttr;

/// `%name = type ...`; `body` is `None` while the type is opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub body: Option<Type>,
}

/// `attributes #N = { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct AttrGroup {
    pub id: u64,
    pub attrs: Vec<FnAttr>,
}

/// The top-level container of all entities produced by assembly. Owns
/// everything; cross-references between entities are arena indices
/// (`GlobalRef`, `MdNodeId`) or nominal type names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub source_filename: Option<String>,
    pub data_layout: Option<String>,
    pub target_triple: Option<String>,
    pub module_asm: Vec<String>,
    pub type_defs: Vec<TypeDef>,
    pub comdats: Vec<Comdat>,
    pub globals: Vec<GlobalVar>,
    pub aliases: Vec<Alias>,
    pub funcs: Vec<Function>,
    pub attr_groups: Vec<AttrGroup>,
    pub named_md: Vec<NamedMd>,
    pub metadata: Vec<MdNode>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier of the entity behind a reference.
    pub fn global_ident(&self, r: GlobalRef) -> &GlobalIdent {
        match r {
            GlobalRef::Global(i) => &self.globals[i].name,
            GlobalRef::Alias(i) => &self.aliases[i].name,
            GlobalRef::Func(i) => &self.funcs[i].name,
        }
    }

    /// Looks up a type definition body by name; `None` if the name is
    /// unknown or the type is opaque.
    pub fn type_body(&self, name: &str) -> Option<&Type> {
        self.type_defs
            .iter()
            .find(|td| td.name == name)
            .and_then(|td| td.body.as_ref())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::printer::write_module(self, f)
    }
}
