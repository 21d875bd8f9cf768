//! # Mica IR Assembler
//!
//! Mica reads a textual, LLVM-flavored intermediate representation and turns
//! it into a structured in-memory module, then prints the module back in a
//! single canonical form. It is an assembler, not a compiler: no optimization,
//! no code generation, just parsing, resolution, and printing.
//!
//! ## Overview
//!
//! The pipeline has four stages:
//!
//! - **Lexer**: splits the source into tokens, tracking line and column for
//!   error reporting.
//! - **Parser**: recursive descent over the token stream into an unresolved
//!   syntax tree in which references are still plain names.
//! - **Resolver**: two passes over the tree. The first declares every
//!   module-level entity and checks the implicit numbering; the second
//!   resolves every reference, so forward references and metadata cycles
//!   work without special handling in the input.
//! - **Printer**: `Module` implements `Display`, producing canonical text
//!   that parses back to the same module.
//!
//! ## Quick Start
//!
//! ```rust
//! let module = mica::assemble(
//!     r#"
//! define i32 @add(i32 %a, i32 %b) {
//! entry:
//!   %sum = add nsw i32 %a, %b
//!   ret i32 %sum
//! }
//! "#,
//! )?;
//!
//! print!("{}", module);
//! # Ok::<(), mica::Error>(())
//! ```

pub mod ast;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod resolver;

use std::fs;
use std::path::Path;

pub use error::{Error, Result, Span};
pub use ir::Module;

/// Assembles IR text into a resolved module.
pub fn assemble(src: &str) -> Result<Module> {
    resolver::resolve(parser::parse(src)?)
}

/// Reads a file and assembles its contents.
pub fn assemble_file<P: AsRef<Path>>(path: P) -> Result<Module> {
    assemble(&fs::read_to_string(path)?)
}
