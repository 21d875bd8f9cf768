//! Metadata resolution and structural uniquing.

use std::collections::HashMap;

use super::Resolver;
use crate::ast;
use crate::error::{Error, Result};
use crate::ir::instruction::Value;
use crate::ir::metadata::{MdNode, MdOperand, NamedMd};
use crate::ir::Constant;

impl Resolver {
    pub(super) fn declare_metadata(&mut self, id: u64, distinct: bool) -> Result<()> {
        if self.md_ids.contains_key(&id) {
            return Err(Error::DuplicateDefinition(format!("!{}", id)));
        }
        self.md_ids.insert(id, self.module.metadata.len());
        // Operands are filled in pass two; the empty placeholder gives the
        // node its arena slot so cycles can point at it already.
        self.module.metadata.push(MdNode {
            id,
            distinct,
            operands: Vec::new(),
        });
        Ok(())
    }

    pub(super) fn define_metadata(&mut self, id: u64, operands: &[ast::MdOperand]) -> Result<()> {
        let mut resolved = Vec::with_capacity(operands.len());
        for operand in operands {
            resolved.push(self.resolve_md_operand(operand)?);
        }
        let idx = self.md_ids[&id];
        self.module.metadata[idx].operands = resolved;
        Ok(())
    }

    fn resolve_md_operand(&mut self, operand: &ast::MdOperand) -> Result<MdOperand> {
        Ok(match operand {
            ast::MdOperand::Null => MdOperand::Null,
            ast::MdOperand::Str(s) => MdOperand::Str(s.clone()),
            ast::MdOperand::Node(n) => match self.md_ids.get(n) {
                Some(idx) => MdOperand::Node(*idx),
                None => {
                    self.record_unresolved(format!("!{}", n));
                    MdOperand::Null
                }
            },
            ast::MdOperand::Value(tv) => {
                let value = match &tv.value {
                    ast::AstValue::Const(c) => Value::Const(self.resolve_const(&tv.ty, c)?),
                    ast::AstValue::Local(ident) => {
                        // Locals have no meaning at module scope.
                        self.record_unresolved(ident.to_string());
                        Value::Const(Constant::Poison(tv.ty.clone()))
                    }
                };
                MdOperand::Value(value)
            }
        })
    }

    pub(super) fn define_named_metadata(&mut self, name: &str, nodes: &[u64]) {
        let mut resolved = Vec::with_capacity(nodes.len());
        for n in nodes {
            match self.md_ids.get(n) {
                Some(idx) => resolved.push(*idx),
                None => self.record_unresolved(format!("!{}", n)),
            }
        }
        // Repeated named metadata lines append, they do not redefine.
        if let Some(existing) = self
            .module
            .named_md
            .iter_mut()
            .find(|nm| nm.name == name)
        {
            existing.nodes.extend(resolved);
        } else {
            self.module.named_md.push(NamedMd {
                name: name.to_string(),
                nodes: resolved,
            });
        }
    }

    /// Structurally deduplicates uniqued (non-`distinct`) nodes until a
    /// fixpoint: merging two leaves can make their parents equal, so one
    /// pass is not enough. Nodes on reference cycles keep their identity;
    /// graph-shape uniquing of cyclic metadata is not attempted.
    pub(super) fn unique_metadata(&mut self) {
        loop {
            let cyclic = self.cyclic_md_nodes();
            let len = self.module.metadata.len();
            let mut replace: Vec<usize> = (0..len).collect();
            let mut seen: HashMap<Vec<MdOperand>, usize> = HashMap::new();
            let mut changed = false;
            for (i, node) in self.module.metadata.iter().enumerate() {
                if node.distinct || cyclic[i] {
                    continue;
                }
                match seen.get(&node.operands) {
                    Some(&rep) => {
                        replace[i] = rep;
                        changed = true;
                    }
                    None => {
                        seen.insert(node.operands.clone(), i);
                    }
                }
            }
            if !changed {
                return;
            }

            // Compact the arena: drop replaced nodes and renumber the rest.
            let mut remap = vec![0usize; len];
            let mut kept = Vec::with_capacity(len);
            for (i, node) in self.module.metadata.drain(..).enumerate() {
                if replace[i] == i {
                    remap[i] = kept.len();
                    kept.push(node);
                }
            }
            for i in 0..len {
                if replace[i] != i {
                    remap[i] = remap[replace[i]];
                }
            }
            self.module.metadata = kept;
            self.apply_md_remap(&remap);
        }
    }

    fn apply_md_remap(&mut self, remap: &[usize]) {
        for node in &mut self.module.metadata {
            for operand in &mut node.operands {
                if let MdOperand::Node(idx) = operand {
                    *idx = remap[*idx];
                }
            }
        }
        for named in &mut self.module.named_md {
            for idx in &mut named.nodes {
                *idx = remap[*idx];
            }
        }
        for func in &mut self.module.funcs {
            for (_, idx) in &mut func.metadata {
                *idx = remap[*idx];
            }
        }
        for idx in self.md_ids.values_mut() {
            *idx = remap[*idx];
        }
    }

    /// Marks every node that can reach itself through `Node` operands.
    fn cyclic_md_nodes(&self) -> Vec<bool> {
        let len = self.module.metadata.len();
        let mut cyclic = vec![false; len];
        for start in 0..len {
            let mut stack = vec![start];
            let mut visited = vec![false; len];
            while let Some(i) = stack.pop() {
                for operand in &self.module.metadata[i].operands {
                    if let MdOperand::Node(next) = operand {
                        if *next == start {
                            cyclic[start] = true;
                            stack.clear();
                            break;
                        }
                        if !visited[*next] {
                            visited[*next] = true;
                            stack.push(*next);
                        }
                    }
                }
            }
        }
        cyclic
    }
}

#[cfg(test)]
mod tests {
    use super::super::resolve;
    use super::*;
    use crate::parser;

    fn resolve_src(src: &str) -> crate::error::Result<crate::ir::Module> {
        resolve(parser::parse(src).unwrap())
    }

    #[test]
    fn test_uniqued_duplicates_merge() {
        let module = resolve_src(
            "!a = !{!0, !1}\n\
             !0 = !{i32 1}\n\
             !1 = !{i32 1}",
        )
        .unwrap();
        assert_eq!(module.metadata.len(), 1);
        assert_eq!(module.named_md[0].nodes, vec![0, 0]);
    }

    #[test]
    fn test_dedup_cascades_to_parents() {
        // Merging !2 and !3 makes !0 and !1 structurally equal too.
        let module = resolve_src(
            "!a = !{!0, !1}\n\
             !0 = !{!2}\n\
             !1 = !{!3}\n\
             !2 = !{i32 7}\n\
             !3 = !{i32 7}",
        )
        .unwrap();
        assert_eq!(module.metadata.len(), 2);
        assert_eq!(module.named_md[0].nodes, vec![0, 0]);
    }

    #[test]
    fn test_distinct_nodes_never_merge() {
        let module = resolve_src(
            "!a = !{!0, !1}\n\
             !0 = distinct !{i32 1}\n\
             !1 = distinct !{i32 1}",
        )
        .unwrap();
        assert_eq!(module.metadata.len(), 2);
        assert_eq!(module.named_md[0].nodes, vec![0, 1]);
    }

    #[test]
    fn test_self_referential_node_survives() {
        let module = resolve_src("!a = !{!0}\n!0 = !{!0}").unwrap();
        assert_eq!(module.metadata.len(), 1);
        assert_eq!(module.metadata[0].operands, vec![MdOperand::Node(0)]);
    }

    #[test]
    fn test_mutual_cycle_survives() {
        let module = resolve_src(
            "!a = !{!0, !1}\n\
             !0 = !{!1}\n\
             !1 = !{!0}",
        )
        .unwrap();
        assert_eq!(module.metadata.len(), 2);
    }

    #[test]
    fn test_duplicate_metadata_id_rejected() {
        let err = resolve_src("!0 = !{}\n!0 = !{}").unwrap_err();
        assert_eq!(err, Error::DuplicateDefinition("!0".into()));
    }

    #[test]
    fn test_forward_metadata_reference() {
        let module = resolve_src("!0 = !{!1}\n!1 = !{i32 1}").unwrap();
        assert_eq!(module.metadata[0].operands, vec![MdOperand::Node(1)]);
    }

    #[test]
    fn test_named_metadata_appends() {
        let module = resolve_src(
            "!a = !{!0}\n!0 = !{i32 1}\n!a = !{!1}\n!1 = !{i32 2}",
        )
        .unwrap();
        assert_eq!(module.named_md.len(), 1);
        assert_eq!(module.named_md[0].nodes.len(), 2);
    }
}
