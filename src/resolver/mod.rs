//! Two-pass resolution from the syntax tree to the IR.
//!
//! Pass one declares: it reserves an arena slot and a symbol table entry
//! for every module-level entity, checking duplicates and the implicit
//! numbering as it goes. Pass two defines: it resolves initializers,
//! aliasees, function bodies, and metadata operands against the now
//! complete tables, so forward references cost nothing special.
//!
//! A reference that never finds its definition does not abort the run;
//! it is recorded, a poison value stands in, and resolution continues so
//! the final error can list every unresolved reference in the file.

mod functions;
mod globals;
mod metadata;
pub mod numbering;

use std::collections::{HashMap, HashSet};

use crate::ast::Item;
use crate::error::{Error, Result};
use crate::ir::enums::FnAttr;
use crate::ir::metadata::MdNodeId;
use crate::ir::module::{AttrGroup, Module, TypeDef};
use crate::ir::types::{GlobalIdent, Type};
use crate::ir::{Comdat, GlobalRef};
use numbering::Counter;

/// Resolves parsed items into a module, or fails with the first
/// structural error (duplicates, numbering, type mismatches) or with the
/// full list of unresolved references.
pub fn resolve(items: Vec<Item>) -> Result<Module> {
    Resolver::new().run(items)
}

pub(crate) struct Resolver {
    pub(crate) module: Module,
    pub(crate) globals: HashMap<GlobalIdent, GlobalRef>,
    pub(crate) comdats: HashMap<String, usize>,
    pub(crate) md_ids: HashMap<u64, MdNodeId>,
    pub(crate) attr_group_ids: HashSet<u64>,
    pub(crate) type_names: HashSet<String>,
    unresolved: Vec<String>,
    unresolved_seen: HashSet<String>,
}

impl Resolver {
    fn new() -> Self {
        Resolver {
            module: Module::new(),
            globals: HashMap::new(),
            comdats: HashMap::new(),
            md_ids: HashMap::new(),
            attr_group_ids: HashSet::new(),
            type_names: HashSet::new(),
            unresolved: Vec::new(),
            unresolved_seen: HashSet::new(),
        }
    }

    fn run(mut self, items: Vec<Item>) -> Result<Module> {
        self.declare(&items)?;
        self.define(&items)?;
        self.unique_metadata();
        if !self.unresolved.is_empty() {
            return Err(Error::Unresolved(self.unresolved));
        }
        Ok(self.module)
    }

    /// Records a reference that found no definition; resolution continues
    /// so later misses are collected too.
    pub(crate) fn record_unresolved(&mut self, name: String) {
        if self.unresolved_seen.insert(name.clone()) {
            self.unresolved.push(name);
        }
    }

    /// Walks a type and records every reference to an undefined named type.
    pub(crate) fn check_type(&mut self, ty: &Type) {
        match ty {
            Type::Named(name) => {
                if !self.type_names.contains(name) {
                    self.record_unresolved(format!("%{}", name));
                }
            }
            Type::Ptr { pointee, .. } => self.check_type(pointee),
            Type::Array { elem, .. } | Type::Vector { elem, .. } => self.check_type(elem),
            Type::Struct { fields, .. } => {
                for field in fields {
                    self.check_type(field);
                }
            }
            Type::Func { ret, params, .. } => {
                self.check_type(ret);
                for param in params {
                    self.check_type(param);
                }
            }
            _ => {}
        }
    }

    pub(crate) fn lookup_global(&mut self, ident: &GlobalIdent) -> Option<GlobalRef> {
        match self.globals.get(ident) {
            Some(r) => Some(*r),
            None => {
                self.record_unresolved(ident.to_string());
                None
            }
        }
    }

    /// Checks that every `#N` group reference has a definition.
    pub(crate) fn check_attr_groups(&mut self, attrs: &[FnAttr]) {
        for attr in attrs {
            if let FnAttr::Group(n) = attr {
                if !self.attr_group_ids.contains(n) {
                    self.record_unresolved(format!("#{}", n));
                }
            }
        }
    }

    fn declare(&mut self, items: &[Item]) -> Result<()> {
        // Leaf entities first: types, comdats, and attribute groups carry
        // no references of their own, and everything else may point at
        // them regardless of source order.
        for item in items {
            match item {
                Item::SourceFilename(s) => self.module.source_filename = Some(s.clone()),
                Item::DataLayout(s) => self.module.data_layout = Some(s.clone()),
                Item::TargetTriple(s) => self.module.target_triple = Some(s.clone()),
                Item::ModuleAsm(s) => self.module.module_asm.push(s.clone()),
                Item::TypeDef { name, body } => {
                    if !self.type_names.insert(name.clone()) {
                        return Err(Error::DuplicateDefinition(format!("%{}", name)));
                    }
                    self.module.type_defs.push(TypeDef {
                        name: name.clone(),
                        body: body.clone(),
                    });
                }
                Item::Comdat { name, kind } => {
                    if self.comdats.contains_key(name) {
                        return Err(Error::DuplicateDefinition(format!("${}", name)));
                    }
                    self.comdats.insert(name.clone(), self.module.comdats.len());
                    self.module.comdats.push(Comdat {
                        name: name.clone(),
                        kind: *kind,
                    });
                }
                Item::AttrGroup { id, attrs } => {
                    if !self.attr_group_ids.insert(*id) {
                        return Err(Error::DuplicateDefinition(format!("#{}", id)));
                    }
                    self.module.attr_groups.push(AttrGroup {
                        id: *id,
                        attrs: attrs.clone(),
                    });
                }
                _ => {}
            }
        }

        // Globals, aliases, and functions share one namespace and one
        // module-level counter.
        let mut counter = Counter::new("module");
        for item in items {
            match item {
                Item::Global(def) => {
                    counter.check_global(&def.name)?;
                    let slot = GlobalRef::Global(self.module.globals.len());
                    self.bind_global(def.name.clone(), slot)?;
                    self.declare_global(def);
                }
                Item::Alias(def) => {
                    counter.check_global(&def.name)?;
                    let slot = GlobalRef::Alias(self.module.aliases.len());
                    self.bind_global(def.name.clone(), slot)?;
                    self.declare_alias(def);
                }
                Item::Function(def) => {
                    counter.check_global(&def.name)?;
                    let slot = GlobalRef::Func(self.module.funcs.len());
                    self.bind_global(def.name.clone(), slot)?;
                    self.declare_function(def);
                }
                Item::MetadataDef { id, distinct, .. } => {
                    self.declare_metadata(*id, *distinct)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn bind_global(&mut self, name: GlobalIdent, slot: GlobalRef) -> Result<()> {
        if self.globals.contains_key(&name) {
            return Err(Error::DuplicateDefinition(name.to_string()));
        }
        self.globals.insert(name, slot);
        Ok(())
    }

    fn define(&mut self, items: &[Item]) -> Result<()> {
        let mut global_idx = 0;
        let mut alias_idx = 0;
        let mut func_idx = 0;
        for item in items {
            match item {
                Item::Global(def) => {
                    self.define_global(global_idx, def)?;
                    global_idx += 1;
                }
                Item::Alias(def) => {
                    self.define_alias(alias_idx, def)?;
                    alias_idx += 1;
                }
                Item::Function(def) => {
                    self.define_function(func_idx, def)?;
                    func_idx += 1;
                }
                Item::MetadataDef { id, operands, .. } => {
                    self.define_metadata(*id, operands)?;
                }
                Item::NamedMetadata { name, nodes } => {
                    self.define_named_metadata(name, nodes);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn resolve_src(src: &str) -> Result<Module> {
        resolve(parser::parse(src).unwrap())
    }

    #[test]
    fn test_resolve_module_header() {
        let module = resolve_src(
            "source_filename = \"t.c\"\ntarget triple = \"x86_64-unknown-linux-gnu\"",
        )
        .unwrap();
        assert_eq!(module.source_filename.as_deref(), Some("t.c"));
        assert_eq!(
            module.target_triple.as_deref(),
            Some("x86_64-unknown-linux-gnu")
        );
    }

    #[test]
    fn test_duplicate_global_rejected() {
        let err = resolve_src("@g = global i32 0\n@g = global i32 1").unwrap_err();
        assert_eq!(err, Error::DuplicateDefinition("@g".into()));
    }

    #[test]
    fn test_module_numbering_checked() {
        assert!(resolve_src("@0 = global i32 0\n@1 = global i32 1").is_ok());
        let err = resolve_src("@0 = global i32 0\n@2 = global i32 1").unwrap_err();
        assert_eq!(
            err,
            Error::Numbering {
                scope: "module".into(),
                expected: 1,
                found: 2,
            }
        );
    }

    #[test]
    fn test_named_globals_skip_numbering() {
        // Named entities never consume a slot, so the first numbered
        // global after two named ones is still @0.
        assert!(resolve_src("@a = global i32 0\n@b = global i32 1\n@0 = global i32 2").is_ok());
    }

    #[test]
    fn test_functions_share_module_counter() {
        assert!(resolve_src(
            "@0 = global i32 0\ndeclare void @1()\n@2 = global i32 1"
        )
        .is_ok());
        assert!(resolve_src("@0 = global i32 0\ndeclare void @0()").is_err());
    }

    #[test]
    fn test_unresolved_references_all_collected() {
        let err = resolve_src(
            "@p = global i32* @missing1\n@q = global i32* @missing2\n!llvm.x = !{!9}",
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::Unresolved(vec![
                "@missing1".into(),
                "@missing2".into(),
                "!9".into()
            ])
        );
    }

    #[test]
    fn test_forward_reference_resolves() {
        let module = resolve_src("@p = global i32* @g\n@g = global i32 7").unwrap();
        assert_eq!(module.globals.len(), 2);
        match &module.globals[0].init {
            Some(crate::ir::Constant::Global { target, .. }) => {
                assert_eq!(*target, GlobalRef::Global(1));
            }
            other => panic!("unexpected init {:?}", other),
        }
    }

    #[test]
    fn test_unknown_named_type_reported() {
        let err = resolve_src("@g = global %missing zeroinitializer").unwrap_err();
        assert_eq!(err, Error::Unresolved(vec!["%missing".into()]));
    }
}
