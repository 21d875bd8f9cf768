//! The implicit numbering scheme.
//!
//! Unnamed entities receive 0, 1, 2, ... in order of appearance; named
//! entities never consume a slot. When the source spells a number out
//! explicitly it must match the slot the counter would assign, otherwise
//! every later number in the scope would silently shift.

use crate::error::{Error, Result};
use crate::ir::types::{GlobalIdent, LocalIdent};

pub struct Counter {
    scope: String,
    next: u64,
}

impl Counter {
    pub fn new(scope: impl Into<String>) -> Self {
        Counter {
            scope: scope.into(),
            next: 0,
        }
    }

    /// Claims the next slot for an entity with no written name.
    pub fn assign(&mut self) -> u64 {
        let n = self.next;
        self.next += 1;
        n
    }

    fn check_num(&mut self, found: u64) -> Result<()> {
        if found != self.next {
            return Err(Error::Numbering {
                scope: self.scope.clone(),
                expected: self.next,
                found,
            });
        }
        self.next += 1;
        Ok(())
    }

    pub fn check_global(&mut self, ident: &GlobalIdent) -> Result<()> {
        match ident {
            GlobalIdent::Named(_) => Ok(()),
            GlobalIdent::Num(n) => self.check_num(*n),
        }
    }

    pub fn check_local(&mut self, ident: &LocalIdent) -> Result<()> {
        match ident {
            LocalIdent::Named(_) => Ok(()),
            LocalIdent::Num(n) => self.check_num(*n),
        }
    }
}
