//! Default converters for the leaf IR node kinds (immediates, ranges, types
//! and targets).

use super::{Doc, PrintError, Printer, Registry};
use crate::{
    DataType, FloatImm, IncompleteType, IntImm, Node, Path, PointerType, PrimType, Range, Target,
    TupleType,
};

pub(super) fn register(registry: &mut Registry) {
    registry
        .set_dispatch::<IntImm>("", print_int_imm)
        .set_dispatch::<FloatImm>("", print_float_imm)
        .set_dispatch::<Range>("", print_range)
        .set_dispatch::<PrimType>("", print_prim_type)
        .set_dispatch::<PointerType>("", print_pointer_type)
        .set_dispatch::<TupleType>("", print_tuple_type)
        .set_dispatch::<IncompleteType>("", print_incomplete_type)
        .set_dispatch::<Target>("", print_target);
}

/// Text used for `dtype` wherever it's printed as a name or string.
fn dtype_name(dtype: DataType) -> String {
    if dtype.is_void() { "void".to_string() } else { dtype.to_string() }
}

/// Immediates of the default type print as bare literals, `bool` ones as
/// `True`/`False`, and all others as explicit casts (e.g. `int8(5)`).
fn print_int_imm(imm: &IntImm, _: &Path, printer: &Printer<'_>) -> Result<Doc, PrintError> {
    let IntImm { value, dtype } = *imm;
    Ok(if dtype == printer.config().int_dtype {
        Doc::int(value)
    } else if dtype == DataType::BOOL {
        Doc::boolean(value != 0)
    } else {
        printer.builtin(&dtype_name(dtype)).call([Doc::int(value)])
    })
}

fn print_float_imm(imm: &FloatImm, _: &Path, printer: &Printer<'_>) -> Result<Doc, PrintError> {
    let FloatImm { value, dtype } = *imm;
    Ok(if dtype == printer.config().float_dtype {
        Doc::float(value)
    } else {
        printer.builtin(&dtype_name(dtype)).call([Doc::float(value)])
    })
}

fn print_range(range: &Range, path: &Path, printer: &Printer<'_>) -> Result<Doc, PrintError> {
    let Range { min, extent } = range;
    Ok(printer.builtin("Range").call([
        printer.convert(min, &path.attr("min"))?,
        printer.convert(extent, &path.attr("extent"))?,
    ]))
}

fn print_prim_type(ty: &PrimType, _: &Path, printer: &Printer<'_>) -> Result<Doc, PrintError> {
    Ok(printer.builtin(&dtype_name(ty.dtype)))
}

fn print_pointer_type(
    ty: &PointerType,
    path: &Path,
    printer: &Printer<'_>,
) -> Result<Doc, PrintError> {
    let PointerType { element_type, storage_scope } = ty;

    // Primitive pointees are named by a string, not printed as types.
    let element_type = match element_type {
        Node::PrimType(prim) => Doc::str(dtype_name(prim.dtype)),
        _ => printer.convert(element_type, &path.attr("element_type"))?,
    };

    let mut args = vec![element_type];
    if !storage_scope.is_empty() {
        args.push(Doc::str(storage_scope.clone()));
    }
    Ok(printer.builtin("Ptr").call(args))
}

fn print_tuple_type(ty: &TupleType, path: &Path, printer: &Printer<'_>) -> Result<Doc, PrintError> {
    if ty.fields.is_empty() {
        return Ok(Doc::none());
    }
    let fields = printer.convert_as_list(&Node::Array(ty.fields.clone()), &path.attr("fields"))?;
    Ok(printer.builtin("Tuple").call(fields.elements))
}

fn print_incomplete_type(
    _: &IncompleteType,
    _: &Path,
    printer: &Printer<'_>,
) -> Result<Doc, PrintError> {
    Ok(printer.builtin("IncompleteType").call([]))
}

/// Targets print as `target({...})`, with their exported configuration.
fn print_target(target: &Target, path: &Path, printer: &Printer<'_>) -> Result<Doc, PrintError> {
    let config = Node::from(target.export());
    Ok(printer.builtin("target").call([printer.convert(&config, path)?]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::PrinterConfig;

    fn print(node: impl Into<Node>, config: &PrinterConfig) -> String {
        let registry = Registry::with_builtins();
        Printer::new(&registry, config).print(&node.into()).unwrap().to_string()
    }

    #[test]
    fn immediates() {
        let config = PrinterConfig::default();
        assert_eq!(print(IntImm::new(5, DataType::INT32), &config), "5");
        assert_eq!(print(IntImm::new(5, DataType::INT8), &config), "int8(5)");
        assert_eq!(print(IntImm::new(-7, DataType::INT64), &config), "int64(-7)");
        assert_eq!(print(IntImm::new(1, DataType::BOOL), &config), "True");
        assert_eq!(print(IntImm::new(0, DataType::BOOL), &config), "False");
        assert_eq!(print(FloatImm::new(1.5, DataType::FLOAT32), &config), "1.5");
        assert_eq!(print(FloatImm::new(1.5, DataType::FLOAT16), &config), "float16(1.5)");
    }

    #[test]
    fn immediates_follow_configured_defaults() {
        let config = PrinterConfig {
            int_dtype: DataType::INT64,
            float_dtype: DataType::FLOAT64,
            ..PrinterConfig::default()
        };
        assert_eq!(print(IntImm::new(5, DataType::INT64), &config), "5");
        assert_eq!(print(IntImm::new(5, DataType::INT32), &config), "int32(5)");
        assert_eq!(print(FloatImm::new(0.5, DataType::FLOAT32), &config), "float32(0.5)");
    }

    #[test]
    fn bool_default_wins_over_bool_literal() {
        let config = PrinterConfig { int_dtype: DataType::BOOL, ..PrinterConfig::default() };
        assert_eq!(print(IntImm::new(1, DataType::BOOL), &config), "1");
    }

    #[test]
    fn vector_bool_is_a_cast() {
        let config = PrinterConfig::default();
        let boolx4 = DataType::BOOL.with_lanes(4).unwrap();
        assert_eq!(print(IntImm::new(1, boolx4), &config), "boolx4(1)");
    }

    #[test]
    fn types() {
        let config = PrinterConfig::default();
        assert_eq!(print(PrimType::new(DataType::FLOAT32), &config), "float32");
        assert_eq!(print(PrimType::new(DataType::VOID), &config), "void");
        assert_eq!(print(IncompleteType, &config), "IncompleteType()");
        assert_eq!(print(TupleType::new([]), &config), "None");
        assert_eq!(
            print(
                TupleType::new([PrimType::new(DataType::INT32).into(), IncompleteType.into()]),
                &config
            ),
            "Tuple(int32, IncompleteType())"
        );
    }

    #[test]
    fn pointers() {
        let config = PrinterConfig::default();
        let void = PrimType::new(DataType::VOID);
        assert_eq!(print(PointerType::new(void, ""), &config), r#"Ptr("void")"#);
        assert_eq!(
            print(PointerType::new(PrimType::new(DataType::FLOAT16), "shared"), &config),
            r#"Ptr("float16", "shared")"#
        );

        // Non-primitive pointees are printed as types.
        let ptr_to_ptr = PointerType::new(PointerType::new(void, "global"), "");
        assert_eq!(print(ptr_to_ptr, &config), r#"Ptr(Ptr("void", "global"))"#);
    }

    #[test]
    fn prefixed() {
        let config = PrinterConfig::default().with_prefix("T");
        assert_eq!(print(IntImm::new(5, DataType::INT8), &config), "T.int8(5)");
        assert_eq!(print(IntImm::new(5, DataType::INT32), &config), "5");
        assert_eq!(print(PrimType::new(DataType::VOID), &config), "T.void");
        assert_eq!(
            print(Range::new(IntImm::new(0, DataType::INT32), 4i64), &config),
            "T.Range(0, 4)"
        );
    }

    #[test]
    fn target() {
        let config = PrinterConfig::default();
        let target = Target::new("llvm").with_keys(["cpu"]).with_attr("mcpu", "skylake");
        assert_eq!(
            print(target, &config),
            r#"target({"kind": "llvm", "tag": "", "keys": ["cpu"], "mcpu": "skylake"})"#
        );
    }
}
