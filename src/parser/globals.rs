//! Global variables and aliases.

use super::Parser;
use crate::ast::{AliasDef, GlobalDef, Item};
use crate::error::Result;
use crate::ir::types::GlobalIdent;
use crate::lexer::TokenKind;

impl<'a> Parser<'a> {
    /// Dispatches `@name = ...` to a global variable or an alias.
    pub(super) fn parse_global_item(&mut self) -> Result<Item> {
        let name = self.parse_global_ident()?;
        self.expect_punct('=')?;
        let linkage = self.parse_linkage()?;
        let visibility = self.parse_visibility()?;
        let unnamed_addr = self.parse_unnamed_addr()?;

        if self.eat_word("alias")? {
            let content_ty = self.parse_type()?;
            self.expect_punct(',')?;
            let aliasee = self.parse_typed_const()?;
            return Ok(Item::Alias(AliasDef {
                name,
                linkage,
                visibility,
                unnamed_addr,
                content_ty,
                aliasee,
            }));
        }

        let addr_space = if self.eat_word("addrspace")? {
            self.expect_punct('(')?;
            let n = self.expect_u64()?;
            self.expect_punct(')')?;
            Some(n)
        } else {
            None
        };
        let immutable = if self.eat_word("constant")? {
            true
        } else {
            self.expect_word("global")?;
            false
        };
        let content_ty = self.parse_type()?;
        let init = if self.starts_const() {
            Some(self.parse_const()?)
        } else {
            None
        };

        let mut section = None;
        let mut comdat = None;
        let mut align = None;
        while self.eat_punct(',')? {
            match self.word() {
                Some("section") => {
                    self.advance()?;
                    section = Some(self.expect_str()?);
                }
                Some("comdat") => {
                    self.advance()?;
                    comdat = Some(self.parse_comdat_ref(&name)?);
                }
                Some("align") => {
                    self.advance()?;
                    align = Some(self.expect_u64()?);
                }
                _ => return Err(self.err_expected("'section', 'comdat', or 'align'")),
            }
        }

        Ok(Item::Global(GlobalDef {
            name,
            linkage,
            visibility,
            unnamed_addr,
            addr_space,
            immutable,
            content_ty,
            init,
            section,
            comdat,
            align,
        }))
    }

    /// `comdat` or `comdat($name)`; the bare form names the entity's own
    /// comdat.
    pub(super) fn parse_comdat_ref(&mut self, owner: &GlobalIdent) -> Result<String> {
        if self.eat_punct('(')? {
            let name = match self.advance()?.kind {
                TokenKind::ComdatName(name) => name,
                _ => return Err(self.err_expected("comdat name")),
            };
            self.expect_punct(')')?;
            Ok(name)
        } else {
            Ok(match owner {
                GlobalIdent::Named(name) => name.clone(),
                GlobalIdent::Num(n) => n.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;
    use crate::ast::{Const, TypedConst};
    use crate::ir::enums::{Linkage, UnnamedAddr, Visibility};
    use crate::ir::types::Type;

    #[test]
    fn test_parse_global_with_trailers() {
        let items = parse(
            "@msg = private unnamed_addr constant [3 x i8] c\"hi\\00\", section \".rodata\", align 1",
        )
        .unwrap();
        assert_eq!(
            items,
            vec![Item::Global(GlobalDef {
                name: GlobalIdent::Named("msg".into()),
                linkage: Some(Linkage::Private),
                visibility: None,
                unnamed_addr: Some(UnnamedAddr::UnnamedAddr),
                addr_space: None,
                immutable: true,
                content_ty: Type::Array {
                    len: 3,
                    elem: Box::new(Type::Int(8)),
                },
                init: Some(Const::CStr(vec![b'h', b'i', 0])),
                section: Some(".rodata".into()),
                comdat: None,
                align: Some(1),
            })]
        );
    }

    #[test]
    fn test_parse_external_global_declaration() {
        let items = parse("@errno = external global i32").unwrap();
        match &items[0] {
            Item::Global(g) => {
                assert_eq!(g.linkage, Some(Linkage::External));
                assert_eq!(g.init, None);
                assert!(!g.immutable);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_comdat_forms() {
        let items = parse(
            "@a = global i32 0, comdat\n@b = global i32 0, comdat($grp)",
        )
        .unwrap();
        match (&items[0], &items[1]) {
            (Item::Global(a), Item::Global(b)) => {
                assert_eq!(a.comdat.as_deref(), Some("a"));
                assert_eq!(b.comdat.as_deref(), Some("grp"));
            }
            other => panic!("unexpected items {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_addrspace() {
        let items = parse("@shared = addrspace(3) global i64 0").unwrap();
        match &items[0] {
            Item::Global(g) => assert_eq!(g.addr_space, Some(3)),
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_parse_alias() {
        let items = parse("@a = hidden alias i32, i32* @g").unwrap();
        assert_eq!(
            items,
            vec![Item::Alias(AliasDef {
                name: GlobalIdent::Named("a".into()),
                linkage: None,
                visibility: Some(Visibility::Hidden),
                unnamed_addr: None,
                content_ty: Type::Int(32),
                aliasee: TypedConst {
                    ty: Type::Int(32).ptr_to(),
                    value: Const::Global(GlobalIdent::Named("g".into())),
                },
            })]
        );
    }
}
