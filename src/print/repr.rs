//! Structural dumps ("repr"s) of [`Node`]s, for debugging.
//!
//! Unlike [`Printer`](super::Printer), this doesn't build any [`Doc`](super::Doc),
//! nor does it have any notion of dialects or paths: a [`ReprRegistry`] maps
//! node kinds to functions writing a single line of text, with all built-in
//! kinds (and any kinds without a registered function) using [`generic_repr`],
//! which lists a node's fields (see [`Node::fields`]) as `name=value` pairs.
//!
//! For example, `IntImm::new(5, DataType::INT8)` dumps as `IntImm(value=5, dtype=int8)`.

use super::RegistryError;
use crate::{FieldValue, Node, NodeKind};
use itertools::Itertools as _;
use rustc_hash::FxHashMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Function writing the repr of a [`Node`] (of a specific kind).
pub type ReprFn = dyn Fn(&Node, &mut ReprPrinter<'_>) -> fmt::Result + Send + Sync;

#[derive(Default)]
pub struct ReprRegistry {
    fns: FxHashMap<NodeKind, Arc<ReprFn>>,
}

impl ReprRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`ReprRegistry`] with all the node kinds defined in this crate
    /// explicitly bound to [`generic_repr`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in [
            NodeKind::INT_IMM,
            NodeKind::FLOAT_IMM,
            NodeKind::RANGE,
            NodeKind::PRIM_TYPE,
            NodeKind::POINTER_TYPE,
            NodeKind::TUPLE_TYPE,
            NodeKind::INCOMPLETE_TYPE,
            NodeKind::TARGET,
        ] {
            registry.register(kind, generic_repr);
        }
        registry
    }

    pub fn try_register(&mut self, kind: NodeKind, f: Arc<ReprFn>) -> Result<(), RegistryError> {
        if self.fns.contains_key(&kind) {
            return Err(RegistryError::DuplicateRepr { kind });
        }
        log::debug!("registering repr for {kind:?}");
        self.fns.insert(kind, f);
        Ok(())
    }

    /// Like [`ReprRegistry::try_register`], but treating a duplicate as fatal.
    #[track_caller]
    pub fn register(
        &mut self,
        kind: NodeKind,
        f: impl Fn(&Node, &mut ReprPrinter<'_>) -> fmt::Result + Send + Sync + 'static,
    ) -> &mut Self {
        if let Err(err) = self.try_register(kind, Arc::new(f)) {
            panic!("{err}");
        }
        self
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.fns.contains_key(&kind)
    }

    /// Dump `node` (and, recursively, its children) as a single line.
    ///
    /// Fails only if a registered repr function fails (writing itself can't).
    pub fn repr(&self, node: &Node) -> Result<String, fmt::Error> {
        let mut printer = ReprPrinter { registry: self, out: String::new() };
        printer.print(node)?;
        Ok(printer.out)
    }
}

/// Output buffer for repr functions (see [`ReprRegistry::repr`]).
pub struct ReprPrinter<'a> {
    registry: &'a ReprRegistry,
    out: String,
}

impl fmt::Write for ReprPrinter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_str(s)
    }
}

impl ReprPrinter<'_> {
    /// Write the repr of `node`, using the function registered for its kind
    /// (or [`generic_repr`], if there isn't one).
    pub fn print(&mut self, node: &Node) -> fmt::Result {
        let registry = self.registry;
        match registry.fns.get(&node.kind()) {
            Some(f) => f(node, self),
            None => generic_repr(node, self),
        }
    }

    /// Write the default textual form of a field's value.
    pub fn print_field(&mut self, value: FieldValue<'_>) -> fmt::Result {
        let registry = self.registry;
        match value {
            FieldValue::Node(node) => self.print(node),
            FieldValue::Nodes(nodes) => write!(
                self,
                "[{}]",
                nodes.iter().map(|node| field_repr(registry, FieldValue::Node(node))).format(", ")
            ),
            FieldValue::Map(map) => write!(
                self,
                "{{{}}}",
                map.iter().format_with(", ", |(key, value), f| {
                    f(&format_args!("{key:?}: {}", field_repr(registry, FieldValue::Node(value))))
                })
            ),
            FieldValue::Target(target) => self.print(&Node::Target(target.clone())),
            FieldValue::DataType(dtype) => write!(self, "{dtype}"),
            FieldValue::Int(x) => write!(self, "{x}"),
            FieldValue::Float(x) => write!(self, "{x:?}"),
            FieldValue::Bool(b) => write!(self, "{b}"),
            FieldValue::Str(s) => write!(self, "{s:?}"),
            FieldValue::Strs(strs) => write!(self, "[{:?}]", strs.iter().format(", ")),
            FieldValue::Absent => self.write_str("None"),
        }
    }
}

/// [`fmt::Display`] adapter for [`ReprPrinter::print_field`], to allow
/// nesting reprs inside `itertools` formatting.
struct FieldRepr<'a> {
    registry: &'a ReprRegistry,
    value: FieldValue<'a>,
}

fn field_repr<'a>(registry: &'a ReprRegistry, value: FieldValue<'a>) -> FieldRepr<'a> {
    FieldRepr { registry, value }
}

impl fmt::Display for FieldRepr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = ReprPrinter { registry: self.registry, out: String::new() };
        printer.print_field(self.value)?;
        f.write_str(&printer.out)
    }
}

/// Write `Kind(field=value, ...)`, listing all of `node`'s fields, in order.
pub fn generic_repr(node: &Node, printer: &mut ReprPrinter<'_>) -> fmt::Result {
    let registry = printer.registry;
    write!(
        printer,
        "{}({})",
        node.kind(),
        node.fields().into_iter().format_with(", ", |(name, value), f| {
            f(&format_args!("{name}={}", field_repr(registry, value)))
        })
    )
}
