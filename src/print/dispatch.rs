//! `(kind, dialect)`-keyed converter table ([`Registry`]).

use super::{Doc, PrintError, Printer};
use crate::{FloatImm, IncompleteType, IntImm, Node, NodeKind, Path, PointerType, PrimType};
use crate::{Range, Target, TupleType};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

/// Converter function, from a node (found at a path) to a [`Doc`].
///
/// Converters must only recurse through [`Printer::convert`] (extending the
/// path with the field they descend into), and must not swallow errors.
pub type ConvertFn = dyn Fn(&Node, &Path, &Printer<'_>) -> Result<Doc, PrintError> + Send + Sync;

/// One converter in a [`Registry`], for a specific dialect of some node kind.
#[derive(Clone)]
pub struct DispatchEntry {
    /// Dialect this converter applies to (`""` for the default).
    pub dialect: String,
    pub converter: Arc<ConvertFn>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("converter for {kind:?} (dialect {dialect:?}) registered more than once")]
    DuplicateRegistration { kind: NodeKind, dialect: String },

    #[error("repr function for {kind:?} registered more than once")]
    DuplicateRepr { kind: NodeKind },
}

/// Table of converters, keyed by node kind and dialect.
///
/// A [`Registry`] is populated once (through `&mut self` methods), after which
/// it's only ever read (by [`Registry::dispatch`]), and can be shared across
/// threads, for any number of concurrent print operations.
///
/// Entries are never replaced or removed, so dialects can only override the
/// default (`""`) converter of a node kind by registering their own converter
/// for that kind, which takes precedence whenever that dialect is active.
#[derive(Default)]
pub struct Registry {
    entries: FxHashMap<NodeKind, SmallVec<[DispatchEntry; 1]>>,
}

/// Statically-typed node, which can be extracted from a [`Node`] of kind `KIND`.
///
/// Implemented for all built-in leaf kinds, and can be implemented for
/// [`ExtNode`](crate::ExtNode)s (through [`Node::as_ext`]), to allow using
/// [`Registry::set_dispatch`] for them.
pub trait NodeType: 'static {
    const KIND: NodeKind;

    fn cast(node: &Node) -> Option<&Self>;
}

macro_rules! impl_node_type {
    (
        by_val { $($by_val_ty:ident => $by_val_kind:ident),* $(,)? }
        shared { $($shared_ty:ident => $shared_kind:ident),* $(,)? }
    ) => {
        $(impl NodeType for $by_val_ty {
            const KIND: NodeKind = NodeKind::$by_val_kind;

            fn cast(node: &Node) -> Option<&Self> {
                match node {
                    Node::$by_val_ty(x) => Some(x),
                    _ => None,
                }
            }
        })*
        $(impl NodeType for $shared_ty {
            const KIND: NodeKind = NodeKind::$shared_kind;

            fn cast(node: &Node) -> Option<&Self> {
                match node {
                    Node::$shared_ty(x) => Some(&**x),
                    _ => None,
                }
            }
        })*
    };
}
impl_node_type! {
    by_val {
        IntImm => INT_IMM,
        FloatImm => FLOAT_IMM,
        PrimType => PRIM_TYPE,
        IncompleteType => INCOMPLETE_TYPE,
    }
    shared {
        Range => RANGE,
        PointerType => POINTER_TYPE,
        TupleType => TUPLE_TYPE,
        Target => TARGET,
    }
}

impl Registry {
    /// Create an empty [`Registry`] (see also [`Registry::with_builtins`]).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`Registry`] with default-dialect converters for all the
    /// node kinds defined in this crate (leaf IR kinds and generic values).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::ir::register(&mut registry);
        super::runtime::register(&mut registry);
        registry
    }

    /// Add `converter` for `kind` in `dialect`, failing if that pair
    /// already has a converter.
    pub fn try_register(
        &mut self,
        kind: NodeKind,
        dialect: &str,
        converter: Arc<ConvertFn>,
    ) -> Result<(), RegistryError> {
        let entries = self.entries.entry(kind).or_default();
        if entries.iter().any(|entry| entry.dialect == dialect) {
            return Err(RegistryError::DuplicateRegistration { kind, dialect: dialect.to_string() });
        }
        log::debug!("registering converter for {kind:?} (dialect {dialect:?})");
        entries.push(DispatchEntry { dialect: dialect.to_string(), converter });
        Ok(())
    }

    /// Like [`Registry::try_register`], but treating a duplicate as fatal
    /// (as it can only be caused by a mistake in populating the [`Registry`]).
    #[track_caller]
    pub fn register(
        &mut self,
        kind: NodeKind,
        dialect: &str,
        converter: impl Fn(&Node, &Path, &Printer<'_>) -> Result<Doc, PrintError>
        + Send
        + Sync
        + 'static,
    ) -> &mut Self {
        if let Err(err) = self.try_register(kind, dialect, Arc::new(converter)) {
            panic!("{err}");
        }
        self
    }

    /// Register a converter taking the statically-typed node `T`.
    #[track_caller]
    pub fn set_dispatch<T: NodeType>(
        &mut self,
        dialect: &str,
        converter: impl Fn(&T, &Path, &Printer<'_>) -> Result<Doc, PrintError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.register(T::KIND, dialect, move |node, path, printer| {
            let node = T::cast(node).ok_or_else(|| PrintError::KindMismatch {
                kind: T::KIND,
                expected: std::any::type_name::<T>(),
                path: path.clone(),
            })?;
            converter(node, path, printer)
        })
    }

    /// Whether `kind` has a converter registered specifically for `dialect`.
    pub fn contains(&self, kind: NodeKind, dialect: &str) -> bool {
        self.entries.get(&kind).is_some_and(|entries| entries.iter().any(|e| e.dialect == dialect))
    }

    /// All dialects with a converter for `kind`, in registration order.
    pub fn dialects(&self, kind: NodeKind) -> impl Iterator<Item = &str> + '_ {
        self.entries.get(&kind).into_iter().flatten().map(|entry| &entry.dialect[..])
    }

    /// Find the converter for `kind` in `dialect`, falling back to the
    /// default dialect (`""`), if `dialect` has no converter of its own.
    pub fn lookup(&self, kind: NodeKind, dialect: &str) -> Option<&DispatchEntry> {
        let entries = self.entries.get(&kind)?;
        let find = |dialect: &str| entries.iter().find(|entry| entry.dialect == dialect);
        find(dialect).or_else(|| {
            if dialect.is_empty() {
                return None;
            }
            log::trace!("no converter for {kind:?} in dialect {dialect:?}, using default");
            find("")
        })
    }

    /// Convert `node` using the converter for its kind and the active dialect
    /// of `printer`, without recording `path` on the result (prefer using
    /// [`Printer::convert`], which does).
    pub fn dispatch(
        &self,
        node: &Node,
        path: &Path,
        printer: &Printer<'_>,
    ) -> Result<Doc, PrintError> {
        let kind = node.kind();
        match self.lookup(kind, printer.dialect()) {
            Some(entry) => (entry.converter)(node, path, printer),
            None => {
                log::debug!("no converter for {kind:?} at {path}");
                Err(PrintError::UnsupportedKind { kind, path: path.clone() })
            }
        }
    }
}
