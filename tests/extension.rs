//! Extending printing from outside the crate: new node kinds, dialect
//! overrides, structural dumps, and sharing a registry across threads.

use irdoc::print::repr::{ReprRegistry, generic_repr};
use irdoc::print::{Doc, NodeType, PrintError, Printer, PrinterConfig, Registry};
use irdoc::{DataType, ExtNode, FieldValue, Fields, IntImm, Node, NodeKind, Path, PrimType};
use irdoc::{Range, TupleType};
use std::any::Any;
use std::fmt::Write as _;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Variable reference, defined "downstream" of the core node kinds.
#[derive(Debug)]
struct Var {
    name: String,
    dtype: DataType,
}

impl ExtNode for Var {
    fn kind(&self) -> NodeKind {
        Self::KIND
    }

    fn fields(&self) -> Fields<'_> {
        let mut fields = Fields::new();
        fields.push(("name", FieldValue::Str(&self.name)));
        fields.push(("dtype", FieldValue::DataType(self.dtype)));
        fields
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl NodeType for Var {
    const KIND: NodeKind = NodeKind::new("tir.Var");

    fn cast(node: &Node) -> Option<&Self> {
        node.as_ext()
    }
}

fn var(name: &str) -> Node {
    Node::ext(Var { name: name.to_string(), dtype: DataType::INT32 })
}

fn registry_with_var() -> Registry {
    let mut registry = Registry::with_builtins();
    registry
        .set_dispatch::<Var>("", |var, _, _| Ok(Doc::id(var.name.clone())))
        .set_dispatch::<Var>("relax", |var, _, printer| {
            Ok(printer.builtin("Var").call([Doc::str(var.name.clone())]))
        });
    registry
}

#[test]
fn ext_kind_nested_in_builtin() {
    init_logging();
    let registry = registry_with_var();
    let config = PrinterConfig::default();
    let printer = Printer::new(&registry, &config);

    let range = Node::from(Range::new(IntImm::new(0, DataType::INT32), var("n")));
    let doc = printer.print(&range).unwrap();
    assert_eq!(doc.to_string(), "Range(0, n)");
    assert_eq!(doc.as_call().unwrap().args[1].source_paths(), [Path::root().attr("extent")]);
}

#[test]
fn dialect_overrides_default() {
    init_logging();
    let registry = registry_with_var();
    let range = Node::from(Range::new(var("i"), var("n")));

    let print_in = |dialect: &str| {
        let config = PrinterConfig::default().with_dialect(dialect);
        Printer::new(&registry, &config).print(&range).unwrap().to_string()
    };
    assert_eq!(print_in(""), "Range(i, n)");
    assert_eq!(print_in("relax"), r#"Range(Var("i"), Var("n"))"#);

    // Dialects without their own converter fall back to the default one.
    assert_eq!(print_in("tir"), "Range(i, n)");
}

#[test]
fn unsupported_kind_reports_exact_path() {
    init_logging();
    let registry = Registry::with_builtins();
    let config = PrinterConfig::default();
    let printer = Printer::new(&registry, &config);

    let range = Node::from(Range::new(IntImm::new(0, DataType::INT32), var("n")));
    let err = printer.print(&range).unwrap_err();
    match &err {
        PrintError::UnsupportedKind { kind, path } => {
            assert_eq!(*kind, Var::KIND);
            assert_eq!(*path, Path::root().attr("extent"));
        }
        _ => panic!("unexpected error: {err}"),
    }
    assert_eq!(err.to_string(), "unsupported node kind `tir.Var` at <root>.extent");

    // Failures deep inside generic values keep their full path too.
    let nested = Node::from(vec![Node::Int(1), Node::from(vec![Node::None, var("x")])]);
    let err = printer.print(&nested).unwrap_err();
    assert_eq!(err.path(), Some(&Path::root().index(1).index(1)));
}

#[test]
fn kind_reuse_is_a_mismatch() {
    init_logging();
    let mut registry = Registry::new();
    registry.set_dispatch::<IntImm>("", |imm, _, _| Ok(Doc::int(imm.value)));

    /// Pretends to be an `IntImm`, without being one.
    #[derive(Debug)]
    struct Impostor;

    impl ExtNode for Impostor {
        fn kind(&self) -> NodeKind {
            NodeKind::INT_IMM
        }

        fn fields(&self) -> Fields<'_> {
            Fields::new()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    let config = PrinterConfig::default();
    let err = Printer::new(&registry, &config).print(&Node::ext(Impostor)).unwrap_err();
    assert!(matches!(err, PrintError::KindMismatch { kind: NodeKind::INT_IMM, .. }));
}

#[test]
fn malformed_dtype_propagates() {
    init_logging();
    let mut registry = Registry::with_builtins();
    registry.register(NodeKind::STR, "dtype", |node, _, printer| {
        let Node::Str(s) = node else { unreachable!() };
        let dtype: DataType = s.parse()?;
        Ok(printer.builtin(&dtype.to_string()))
    });

    let config = PrinterConfig::default().with_dialect("dtype");
    let printer = Printer::new(&registry, &config);
    assert_eq!(printer.print(&Node::from("float16x4")).unwrap().to_string(), "float16x4");

    let range = Node::from(Range::new("int32", "int"));
    let err = printer.print(&range).unwrap_err();
    assert!(matches!(err, PrintError::MalformedDataType { .. }));
    assert_eq!(err.path(), Some(&Path::root().attr("extent")));
    assert_eq!(
        err.to_string(),
        "malformed data type tag `int`: invalid bit width at <root>.extent"
    );

    let err = printer.print(&Node::from(vec![Node::from("int8"), Node::from("uint")])).unwrap_err();
    assert_eq!(err.path(), Some(&Path::root().index(1)));
}

#[test]
fn array_override_must_stay_a_list() {
    init_logging();
    let mut registry = Registry::with_builtins();
    registry.register(NodeKind::ARRAY, "flat", |_, _, _| Ok(Doc::none()));

    let tuple = Node::from(TupleType::new([PrimType::new(DataType::INT8).into()]));
    let config = PrinterConfig::default().with_dialect("flat");
    let err = Printer::new(&registry, &config).print(&tuple).unwrap_err();
    match &err {
        PrintError::UnexpectedDoc { expected, found, path } => {
            assert_eq!(*expected, "list");
            assert_eq!(*found, "literal");
            assert_eq!(*path, Path::root().attr("fields"));
        }
        _ => panic!("unexpected error: {err}"),
    }
    assert_eq!(err.to_string(), "expected list document at <root>.fields, found literal");

    // Other dialects still get the default (list-producing) array converter.
    let config = PrinterConfig::default();
    assert_eq!(Printer::new(&registry, &config).print(&tuple).unwrap().to_string(), "Tuple(int8)");
}

#[test]
fn repr_of_ext_kinds() {
    let mut registry = ReprRegistry::with_builtins();
    let range = Node::from(Range::new(IntImm::new(0, DataType::INT32), var("n")));

    // Without a registered function, fields are listed generically.
    assert_eq!(
        registry.repr(&range).unwrap(),
        r#"Range(min=IntImm(value=0, dtype=int32), extent=tir.Var(name="n", dtype=int32))"#
    );

    registry.register(Var::KIND, |node, printer| match Var::cast(node) {
        Some(var) => write!(printer, "%{}", var.name),
        None => generic_repr(node, printer),
    });
    assert!(registry.contains(Var::KIND));
    assert_eq!(
        registry.repr(&range).unwrap(),
        "Range(min=IntImm(value=0, dtype=int32), extent=%n)"
    );
}

#[test]
fn concurrent_prints_share_one_registry() {
    init_logging();
    let registry = registry_with_var();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8i64)
            .map(|i| {
                let registry = &registry;
                scope.spawn(move || {
                    let config = if i % 2 == 0 {
                        PrinterConfig::default()
                    } else {
                        PrinterConfig::default().with_dialect("relax")
                    };
                    let printer = Printer::new(registry, &config);
                    let range = Node::from(Range::new(IntImm::new(i, DataType::INT32), var("n")));
                    printer.print(&range).map(|doc| doc.to_string())
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected = if i % 2 == 0 {
                format!("Range({i}, n)")
            } else {
                format!(r#"Range({i}, Var("n"))"#)
            };
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });
}
