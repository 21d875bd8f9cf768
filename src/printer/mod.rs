//! Canonical text output.
//!
//! The printer is total over resolved modules and deterministic: the same
//! module always prints the same bytes, and printing the parse of its own
//! output reproduces it. Sections appear in a fixed order separated by
//! single blank lines; instructions are indented two spaces.

use std::fmt::{self, Write as _};

use crate::ir::enums::Linkage;
use crate::ir::float::format_float;
use crate::ir::function::{Block, Function, Param};
use crate::ir::instruction::{BinFlags, CallArg, Instruction, Terminator, Value};
use crate::ir::metadata::{MdNode, MdOperand};
use crate::ir::module::Module;
use crate::ir::types::{write_name, LocalIdent, Type};
use crate::ir::{Alias, Constant, GlobalVar};

/// Entry point used by `Module`'s `Display` impl.
pub fn write_module(m: &Module, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut sep = Sections::new();

    let has_header = m.source_filename.is_some()
        || m.data_layout.is_some()
        || m.target_triple.is_some()
        || !m.module_asm.is_empty();
    if has_header {
        sep.begin(f)?;
        if let Some(name) = &m.source_filename {
            write!(f, "source_filename = ")?;
            write_quoted(f, name)?;
            writeln!(f)?;
        }
        if let Some(layout) = &m.data_layout {
            write!(f, "target datalayout = ")?;
            write_quoted(f, layout)?;
            writeln!(f)?;
        }
        if let Some(triple) = &m.target_triple {
            write!(f, "target triple = ")?;
            write_quoted(f, triple)?;
            writeln!(f)?;
        }
        for asm in &m.module_asm {
            write!(f, "module asm ")?;
            write_quoted(f, asm)?;
            writeln!(f)?;
        }
    }

    if !m.type_defs.is_empty() {
        sep.begin(f)?;
        for td in &m.type_defs {
            write!(f, "%")?;
            write_name(f, &td.name)?;
            match &td.body {
                Some(body) => writeln!(f, " = type {}", body)?,
                None => writeln!(f, " = type opaque")?,
            }
        }
    }

    if !m.comdats.is_empty() {
        sep.begin(f)?;
        for comdat in &m.comdats {
            writeln!(f, "${} = comdat {}", comdat.name, comdat.kind)?;
        }
    }

    if !m.globals.is_empty() {
        sep.begin(f)?;
        for global in &m.globals {
            write_global(m, f, global)?;
        }
    }

    if !m.aliases.is_empty() {
        sep.begin(f)?;
        for alias in &m.aliases {
            write_alias(m, f, alias)?;
        }
    }

    for func in &m.funcs {
        sep.begin(f)?;
        write_function(m, f, func)?;
    }

    if !m.attr_groups.is_empty() {
        sep.begin(f)?;
        for group in &m.attr_groups {
            write!(f, "attributes #{} = {{", group.id)?;
            for attr in &group.attrs {
                write!(f, " {}", attr)?;
            }
            writeln!(f, " }}")?;
        }
    }

    if !m.named_md.is_empty() || !m.metadata.is_empty() {
        sep.begin(f)?;
        for named in &m.named_md {
            write!(f, "!{} = !{{", named.name)?;
            for (i, idx) in named.nodes.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "!{}", m.metadata[*idx].id)?;
            }
            writeln!(f, "}}")?;
        }
        for node in &m.metadata {
            write_md_node(m, f, node)?;
        }
    }

    Ok(())
}

/// Emits the single blank line between sections.
struct Sections {
    first: bool,
}

impl Sections {
    fn new() -> Self {
        Sections { first: true }
    }

    fn begin(&mut self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first {
            self.first = false;
            Ok(())
        } else {
            writeln!(f)
        }
    }
}

fn write_global(m: &Module, f: &mut fmt::Formatter<'_>, g: &GlobalVar) -> fmt::Result {
    write!(f, "{} =", g.name)?;
    if let Some(linkage) = g.linkage {
        // `external` on a definition is the default; spelling it out is
        // only meaningful on initializer-less declarations.
        if linkage != Linkage::External || g.init.is_none() {
            write!(f, " {}", linkage)?;
        }
    }
    if let Some(vis) = g.visibility {
        write!(f, " {}", vis)?;
    }
    if let Some(ua) = g.unnamed_addr {
        write!(f, " {}", ua)?;
    }
    if g.addr_space != 0 {
        write!(f, " addrspace({})", g.addr_space)?;
    }
    write!(f, " {}", if g.immutable { "constant" } else { "global" })?;
    write!(f, " {}", g.content_ty)?;
    if let Some(init) = &g.init {
        write!(f, " ")?;
        write_const(m, f, init)?;
    }
    if let Some(section) = &g.section {
        write!(f, ", section ")?;
        write_quoted(f, section)?;
    }
    if let Some(comdat) = g.comdat {
        write_comdat_ref(f, &m.comdats[comdat].name, &g.name.to_string())?;
    }
    if let Some(align) = g.align {
        write!(f, ", align {}", align)?;
    }
    writeln!(f)
}

fn write_alias(m: &Module, f: &mut fmt::Formatter<'_>, a: &Alias) -> fmt::Result {
    write!(f, "{} =", a.name)?;
    if let Some(linkage) = a.linkage {
        write!(f, " {}", linkage)?;
    }
    if let Some(vis) = a.visibility {
        write!(f, " {}", vis)?;
    }
    if let Some(ua) = a.unnamed_addr {
        write!(f, " {}", ua)?;
    }
    write!(f, " alias {}, {} ", a.content_ty, a.aliasee.ty())?;
    write_const(m, f, &a.aliasee)?;
    writeln!(f)
}

/// The bare `, comdat` form names the entity's own comdat.
fn write_comdat_ref(f: &mut fmt::Formatter<'_>, comdat: &str, owner: &str) -> fmt::Result {
    if owner.strip_prefix('@') == Some(comdat) {
        write!(f, ", comdat")
    } else {
        write!(f, ", comdat(${})", comdat)
    }
}

fn write_function(m: &Module, f: &mut fmt::Formatter<'_>, func: &Function) -> fmt::Result {
    write!(f, "{}", if func.is_definition { "define" } else { "declare" })?;
    if let Some(linkage) = func.linkage {
        if linkage != Linkage::External || !func.is_definition {
            write!(f, " {}", linkage)?;
        }
    }
    if let Some(vis) = func.visibility {
        write!(f, " {}", vis)?;
    }
    if let Some(cconv) = func.cconv {
        write!(f, " {}", cconv)?;
    }
    for attr in &func.ret_attrs {
        write!(f, " {}", attr)?;
    }
    write!(f, " {} {}(", func.ret_ty, func.name)?;
    for (i, param) in func.params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_param(f, param)?;
    }
    if func.variadic {
        if !func.params.is_empty() {
            write!(f, ", ")?;
        }
        write!(f, "...")?;
    }
    write!(f, ")")?;
    if let Some(ua) = func.unnamed_addr {
        write!(f, " {}", ua)?;
    }
    for attr in &func.attrs {
        write!(f, " {}", attr)?;
    }
    if let Some(section) = &func.section {
        write!(f, " section ")?;
        write_quoted(f, section)?;
    }
    if let Some(comdat) = func.comdat {
        // Function comdats have no leading comma.
        let own = func.name.to_string();
        if own.strip_prefix('@') == Some(m.comdats[comdat].name.as_str()) {
            write!(f, " comdat")?;
        } else {
            write!(f, " comdat(${})", m.comdats[comdat].name)?;
        }
    }
    if let Some(align) = func.align {
        write!(f, " align {}", align)?;
    }
    for (kind, idx) in &func.metadata {
        write!(f, " !{} !{}", kind, m.metadata[*idx].id)?;
    }
    if !func.is_definition {
        return writeln!(f);
    }
    writeln!(f, " {{")?;
    for (i, block) in func.blocks.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        write_block(m, f, block)?;
    }
    writeln!(f, "}}")
}

fn write_param(f: &mut fmt::Formatter<'_>, param: &Param) -> fmt::Result {
    write!(f, "{}", param.ty)?;
    for attr in &param.attrs {
        write!(f, " {}", attr)?;
    }
    if let Some(name) = &param.name {
        write!(f, " {}", name)?;
    }
    Ok(())
}

fn write_block(m: &Module, f: &mut fmt::Formatter<'_>, block: &Block) -> fmt::Result {
    match &block.label {
        LocalIdent::Named(name) => {
            write_name(f, name)?;
            writeln!(f, ":")?;
        }
        LocalIdent::Num(n) => writeln!(f, "{}:", n)?,
    }
    for inst in &block.insts {
        write!(f, "  ")?;
        write_inst(m, f, inst)?;
    }
    write!(f, "  ")?;
    write_term(m, f, &block.term)
}

fn write_flags(f: &mut fmt::Formatter<'_>, flags: &BinFlags) -> fmt::Result {
    if flags.nuw {
        write!(f, " nuw")?;
    }
    if flags.nsw {
        write!(f, " nsw")?;
    }
    if flags.exact {
        write!(f, " exact")?;
    }
    Ok(())
}

fn write_inst(m: &Module, f: &mut fmt::Formatter<'_>, inst: &Instruction) -> fmt::Result {
    match inst {
        Instruction::Binary {
            result,
            op,
            flags,
            fmf,
            ty,
            lhs,
            rhs,
        } => {
            write!(f, "{} = {}", result, op)?;
            write_flags(f, flags)?;
            for flag in fmf {
                write!(f, " {}", flag)?;
            }
            write!(f, " {} ", ty)?;
            write_value(m, f, lhs)?;
            write!(f, ", ")?;
            write_value(m, f, rhs)?;
        }
        Instruction::ExtractElement { result, vec, index } => {
            write!(f, "{} = extractelement ", result)?;
            write_typed_value(m, f, vec)?;
            write!(f, ", ")?;
            write_typed_value(m, f, index)?;
        }
        Instruction::InsertElement {
            result,
            vec,
            elem,
            index,
        } => {
            write!(f, "{} = insertelement ", result)?;
            write_typed_value(m, f, vec)?;
            write!(f, ", ")?;
            write_typed_value(m, f, elem)?;
            write!(f, ", ")?;
            write_typed_value(m, f, index)?;
        }
        Instruction::ShuffleVector {
            result,
            v1,
            v2,
            mask,
        } => {
            write!(f, "{} = shufflevector ", result)?;
            write_typed_value(m, f, v1)?;
            write!(f, ", ")?;
            write_typed_value(m, f, v2)?;
            write!(f, ", ")?;
            write_typed_value(m, f, mask)?;
        }
        Instruction::ExtractValue {
            result,
            agg,
            indices,
        } => {
            write!(f, "{} = extractvalue ", result)?;
            write_typed_value(m, f, agg)?;
            for idx in indices {
                write!(f, ", {}", idx)?;
            }
        }
        Instruction::InsertValue {
            result,
            agg,
            elem,
            indices,
        } => {
            write!(f, "{} = insertvalue ", result)?;
            write_typed_value(m, f, agg)?;
            write!(f, ", ")?;
            write_typed_value(m, f, elem)?;
            for idx in indices {
                write!(f, ", {}", idx)?;
            }
        }
        Instruction::Alloca {
            result,
            ty,
            count,
            align,
        } => {
            write!(f, "{} = alloca {}", result, ty)?;
            if let Some(count) = count {
                write!(f, ", ")?;
                write_typed_value(m, f, count)?;
            }
            if let Some(align) = align {
                write!(f, ", align {}", align)?;
            }
        }
        Instruction::Load {
            result,
            volatile,
            ty,
            ptr,
            align,
        } => {
            write!(f, "{} = load ", result)?;
            if *volatile {
                write!(f, "volatile ")?;
            }
            write!(f, "{}, ", ty)?;
            write_typed_value(m, f, ptr)?;
            if let Some(align) = align {
                write!(f, ", align {}", align)?;
            }
        }
        Instruction::Store {
            volatile,
            value,
            ptr,
            align,
        } => {
            write!(f, "store ")?;
            if *volatile {
                write!(f, "volatile ")?;
            }
            write_typed_value(m, f, value)?;
            write!(f, ", ")?;
            write_typed_value(m, f, ptr)?;
            if let Some(align) = align {
                write!(f, ", align {}", align)?;
            }
        }
        Instruction::Gep {
            result,
            inbounds,
            elem_ty,
            ptr,
            indices,
        } => {
            write!(f, "{} = getelementptr ", result)?;
            if *inbounds {
                write!(f, "inbounds ")?;
            }
            write!(f, "{}, ", elem_ty)?;
            write_typed_value(m, f, ptr)?;
            for idx in indices {
                write!(f, ", ")?;
                write_typed_value(m, f, idx)?;
            }
        }
        Instruction::Conv {
            result,
            op,
            value,
            to,
        } => {
            write!(f, "{} = {} ", result, op)?;
            write_typed_value(m, f, value)?;
            write!(f, " to {}", to)?;
        }
        Instruction::ICmp {
            result,
            pred,
            ty,
            lhs,
            rhs,
        } => {
            write!(f, "{} = icmp {} {} ", result, pred, ty)?;
            write_value(m, f, lhs)?;
            write!(f, ", ")?;
            write_value(m, f, rhs)?;
        }
        Instruction::FCmp {
            result,
            pred,
            fmf,
            ty,
            lhs,
            rhs,
        } => {
            write!(f, "{} = fcmp", result)?;
            for flag in fmf {
                write!(f, " {}", flag)?;
            }
            write!(f, " {} {} ", pred, ty)?;
            write_value(m, f, lhs)?;
            write!(f, ", ")?;
            write_value(m, f, rhs)?;
        }
        Instruction::Phi {
            result,
            ty,
            incoming,
        } => {
            write!(f, "{} = phi {} ", result, ty)?;
            for (i, (value, label)) in incoming.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "[ ")?;
                write_value(m, f, value)?;
                write!(f, ", {} ]", label)?;
            }
        }
        Instruction::Select {
            result,
            cond,
            if_true,
            if_false,
        } => {
            write!(f, "{} = select ", result)?;
            write_typed_value(m, f, cond)?;
            write!(f, ", ")?;
            write_typed_value(m, f, if_true)?;
            write!(f, ", ")?;
            write_typed_value(m, f, if_false)?;
        }
        Instruction::Call {
            result,
            tail,
            cconv,
            ret_attrs,
            ret_ty,
            callee,
            args,
            attrs,
            bundles,
        } => {
            if let Some(result) = result {
                write!(f, "{} = ", result)?;
            }
            if *tail {
                write!(f, "tail ")?;
            }
            write!(f, "call")?;
            if let Some(cconv) = cconv {
                write!(f, " {}", cconv)?;
            }
            for attr in ret_attrs {
                write!(f, " {}", attr)?;
            }
            // Variadic callees need their full function type spelled out
            // for the argument list to parse back unambiguously.
            match callee_fn_ty(callee) {
                Some(fn_ty @ Type::Func { variadic: true, .. }) => {
                    write!(f, " {}", fn_ty)?;
                }
                _ => write!(f, " {}", ret_ty)?,
            }
            write!(f, " ")?;
            write_value(m, f, callee)?;
            write!(f, "(")?;
            for (i, CallArg { attrs, value }) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", value.ty())?;
                for attr in attrs {
                    write!(f, " {}", attr)?;
                }
                write!(f, " ")?;
                write_value(m, f, value)?;
            }
            write!(f, ")")?;
            for attr in attrs {
                write!(f, " {}", attr)?;
            }
            if !bundles.is_empty() {
                write!(f, " [ ")?;
                for (i, bundle) in bundles.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_quoted(f, &bundle.tag)?;
                    write!(f, "(")?;
                    for (j, input) in bundle.inputs.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write_typed_value(m, f, input)?;
                    }
                    write!(f, ")")?;
                }
                write!(f, " ]")?;
            }
        }
    }
    writeln!(f)
}

fn callee_fn_ty(callee: &Value) -> Option<Type> {
    match callee.ty() {
        Type::Ptr { pointee, .. } => match *pointee {
            fn_ty @ Type::Func { .. } => Some(fn_ty),
            _ => None,
        },
        _ => None,
    }
}

fn write_term(m: &Module, f: &mut fmt::Formatter<'_>, term: &Terminator) -> fmt::Result {
    match term {
        Terminator::Ret(None) => writeln!(f, "ret void"),
        Terminator::Ret(Some(value)) => {
            write!(f, "ret ")?;
            write_typed_value(m, f, value)?;
            writeln!(f)
        }
        Terminator::Br(dest) => writeln!(f, "br label {}", dest),
        Terminator::CondBr {
            cond,
            if_true,
            if_false,
        } => {
            write!(f, "br ")?;
            write_typed_value(m, f, cond)?;
            writeln!(f, ", label {}, label {}", if_true, if_false)
        }
        Terminator::Switch {
            value,
            default,
            cases,
        } => {
            write!(f, "switch ")?;
            write_typed_value(m, f, value)?;
            writeln!(f, ", label {} [", default)?;
            for case in cases {
                write!(f, "    {} ", case.value.ty())?;
                write_const(m, f, &case.value)?;
                writeln!(f, ", label {}", case.dest)?;
            }
            writeln!(f, "  ]")
        }
        Terminator::Unreachable => writeln!(f, "unreachable"),
    }
}

fn write_typed_value(m: &Module, f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    write!(f, "{} ", value.ty())?;
    write_value(m, f, value)
}

fn write_value(m: &Module, f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Local { ident, .. } => write!(f, "{}", ident),
        Value::Const(c) => write_const(m, f, c),
    }
}

fn write_const(m: &Module, f: &mut fmt::Formatter<'_>, c: &Constant) -> fmt::Result {
    match c {
        Constant::Int { ty, value } => {
            if *ty == Type::Int(1) {
                write!(f, "{}", if *value != 0 { "true" } else { "false" })
            } else {
                write!(f, "{}", value)
            }
        }
        Constant::Float { kind, bits } => write!(f, "{}", format_float(*kind, *bits)),
        Constant::Null(_) => write!(f, "null"),
        Constant::Undef(_) => write!(f, "undef"),
        Constant::Poison(_) => write!(f, "poison"),
        Constant::Zero(_) => write!(f, "zeroinitializer"),
        Constant::Struct { ty, fields } => {
            let packed = matches!(ty, Type::Struct { packed: true, .. });
            if fields.is_empty() {
                return write!(f, "{}", if packed { "<{}>" } else { "{}" });
            }
            write!(f, "{}", if packed { "<{ " } else { "{ " })?;
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} ", field.ty())?;
                write_const(m, f, field)?;
            }
            write!(f, "{}", if packed { " }>" } else { " }" })
        }
        Constant::Array { elems, .. } => {
            write!(f, "[")?;
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} ", elem.ty())?;
                write_const(m, f, elem)?;
            }
            write!(f, "]")
        }
        Constant::CharArray { bytes, .. } => {
            write!(f, "c\"")?;
            for &b in bytes {
                if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
                    write!(f, "{}", b as char)?;
                } else {
                    write!(f, "\\{:02X}", b)?;
                }
            }
            write!(f, "\"")
        }
        Constant::Vector { elems, .. } => {
            write!(f, "<")?;
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{} ", elem.ty())?;
                write_const(m, f, elem)?;
            }
            write!(f, ">")
        }
        Constant::Global { target, .. } => write!(f, "{}", m.global_ident(*target)),
        Constant::Gep {
            inbounds,
            elem_ty,
            base,
            indices,
            ..
        } => {
            write!(f, "getelementptr ")?;
            if *inbounds {
                write!(f, "inbounds ")?;
            }
            write!(f, "({}, {} ", elem_ty, base.ty())?;
            write_const(m, f, base)?;
            for idx in indices {
                write!(f, ", {} ", idx.ty())?;
                write_const(m, f, idx)?;
            }
            write!(f, ")")
        }
        Constant::Conv { op, value, to } => {
            write!(f, "{} ({} ", op, value.ty())?;
            write_const(m, f, value)?;
            write!(f, " to {})", to)
        }
    }
}

fn write_md_node(m: &Module, f: &mut fmt::Formatter<'_>, node: &MdNode) -> fmt::Result {
    write!(f, "!{} = ", node.id)?;
    if node.distinct {
        write!(f, "distinct ")?;
    }
    write!(f, "!{{")?;
    for (i, operand) in node.operands.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match operand {
            MdOperand::Null => write!(f, "null")?,
            MdOperand::Str(s) => {
                write!(f, "!")?;
                write_quoted(f, s)?;
            }
            MdOperand::Node(idx) => write!(f, "!{}", m.metadata[*idx].id)?,
            MdOperand::Value(value) => write_typed_value(m, f, value)?,
        }
    }
    writeln!(f, "}}")
}

/// Writes `s` as a quoted string with `\XX` escapes.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for &b in s.as_bytes() {
        if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
            write!(f, "{}", b as char)?;
        } else {
            write!(f, "\\{:02X}", b)?;
        }
    }
    write!(f, "\"")
}

#[cfg(test)]
mod tests {
    use crate::parser;
    use crate::resolver;

    fn canon(src: &str) -> String {
        resolver::resolve(parser::parse(src).unwrap())
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_print_global_section() {
        assert_eq!(
            canon("@g = global i32 7, align 4"),
            "@g = global i32 7, align 4\n"
        );
        assert_eq!(
            canon("@msg = private constant [3 x i8] c\"hi\\00\""),
            "@msg = private constant [3 x i8] c\"hi\\00\"\n"
        );
    }

    #[test]
    fn test_print_sections_in_order() {
        let out = canon(
            "define void @f() {\nret void\n}\n\
             target triple = \"x86_64\"\n\
             %t = type opaque\n\
             @g = global i32 0",
        );
        assert_eq!(
            out,
            "target triple = \"x86_64\"\n\
             \n\
             %t = type opaque\n\
             \n\
             @g = global i32 0\n\
             \n\
             define void @f() {\n\
             0:\n\
             \x20 ret void\n\
             }\n"
        );
    }

    #[test]
    fn test_print_bool_and_float_constants() {
        assert_eq!(canon("@b = global i1 true"), "@b = global i1 true\n");
        assert_eq!(
            canon("@d = global double 1.5"),
            "@d = global double 1.500000e+00\n"
        );
        assert_eq!(
            canon("@h = global half 0xH3C00"),
            "@h = global half 0xH3C00\n"
        );
    }

    #[test]
    fn test_print_function_body() {
        let out = canon(
            "define i32 @add(i32 %a, i32 %b) {\n\
             entry:\n\
             %c = add nsw i32 %a, %b\n\
             ret i32 %c\n\
             }",
        );
        assert_eq!(
            out,
            "define i32 @add(i32 %a, i32 %b) {\n\
             entry:\n\
             \x20 %c = add nsw i32 %a, %b\n\
             \x20 ret i32 %c\n\
             }\n"
        );
    }

    #[test]
    fn test_print_switch_layout() {
        let out = canon(
            "define void @f(i32 %x) {\n\
             entry:\n\
             switch i32 %x, label %done [\n\
             i32 0, label %done\n\
             ]\n\
             done:\n\
             ret void\n\
             }",
        );
        assert_eq!(
            out,
            "define void @f(i32 %x) {\n\
             entry:\n\
             \x20 switch i32 %x, label %done [\n\
             \x20   i32 0, label %done\n\
             \x20 ]\n\
             \n\
             done:\n\
             \x20 ret void\n\
             }\n"
        );
    }

    #[test]
    fn test_print_variadic_call_spells_fn_type() {
        let out = canon(
            "declare i32 @printf(i8*, ...)\n\
             @fmt = global [2 x i8] c\"x\\00\"\n\
             define void @f() {\n\
             %s = call i32 (i8*, ...) @printf(i8* bitcast ([2 x i8]* @fmt to i8*))\n\
             ret void\n\
             }",
        );
        assert!(out.contains("call i32 (i8*, ...) @printf("), "{}", out);
    }

    #[test]
    fn test_print_metadata_section() {
        let out = canon("!name = !{!0}\n!0 = distinct !{!0, !\"s\", null}");
        assert_eq!(
            out,
            "!name = !{!0}\n!0 = distinct !{!0, !\"s\", null}\n"
        );
    }
}
