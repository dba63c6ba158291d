//! Converting anything in the IR, from leaves upwards, into [`Doc`]uments.
//!
//! # Usage
//!
//! To start, populate a [`Registry`] (e.g. [`Registry::with_builtins`], plus
//! any converters for externally-defined node kinds or dialects), and pick a
//! [`PrinterConfig`] (active dialect, default dtypes, optional prefix).
//!
//! With those, a [`Printer`] can convert any [`Node`] into a [`Doc`], through
//! [`Printer::print`] (for a root node) or [`Printer::convert`] (for a node
//! found at some [`Path`], typically used by converters to recurse).
//!
//! ```
//! use irdoc::print::{Printer, PrinterConfig, Registry};
//! use irdoc::{DataType, IntImm, Node, Range};
//!
//! let registry = Registry::with_builtins();
//! let config = PrinterConfig::default();
//! let printer = Printer::new(&registry, &config);
//!
//! let range = Node::from(Range::new(
//!     IntImm::new(0, DataType::INT32),
//!     IntImm::new(10, DataType::INT32),
//! ));
//! assert_eq!(printer.print(&range).unwrap().to_string(), "Range(0, 10)");
//! ```
//!
//! Independently, [`repr::ReprRegistry`] provides structural dumps of nodes.

use crate::dtype::MalformedDataType;
use crate::{DataType, Node, NodeKind, Path};
use serde::{Deserialize, Serialize};

mod dispatch;
pub mod doc;
mod ir;
pub mod repr;
mod runtime;

pub use dispatch::{ConvertFn, DispatchEntry, NodeType, Registry, RegistryError};
pub use doc::{Doc, ListDoc};

/// Errors produced while converting [`Node`]s into [`Doc`]s.
///
/// All of these carry the [`Path`] reached when the error occurred, and
/// converters propagate errors from their children unchanged.
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("unsupported node kind {kind:?} at {path}")]
    UnsupportedKind { kind: NodeKind, path: Path },

    /// A converter registered for `kind` was handed a node of another type
    /// (only possible when an [`ExtNode`](crate::ExtNode) reuses a kind).
    #[error("converter for {kind:?} expected `{expected}` at {path}")]
    KindMismatch { kind: NodeKind, expected: &'static str, path: Path },

    #[error("expected {expected} document at {path}, found {found}")]
    UnexpectedDoc { expected: &'static str, found: &'static str, path: Path },

    /// A [`DataType`] had no canonical encoding, while converting the node
    /// at `path` (attached by [`Printer::convert`], when the error first
    /// passes through it).
    #[error("{source}{}", .path.as_ref().map(|path| format!(" at {path}")).unwrap_or_default())]
    MalformedDataType { source: MalformedDataType, path: Option<Path> },
}

// NOTE converters use `?` on `MalformedDataType`, which can't know the path.
impl From<MalformedDataType> for PrintError {
    fn from(source: MalformedDataType) -> Self {
        Self::MalformedDataType { source, path: None }
    }
}

impl PrintError {
    /// The [`Path`] at which conversion failed, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::UnsupportedKind { path, .. }
            | Self::KindMismatch { path, .. }
            | Self::UnexpectedDoc { path, .. } => Some(path),
            Self::MalformedDataType { path, .. } => path.as_ref(),
        }
    }

    /// Attach `path` to an error that doesn't have one yet, leaving any
    /// (deeper) path already recorded untouched.
    fn located_at(self, path: &Path) -> Self {
        match self {
            Self::MalformedDataType { source, path: None } => {
                Self::MalformedDataType { source, path: Some(path.clone()) }
            }
            err => err,
        }
    }
}

/// Ambient configuration for a [`Printer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrinterConfig {
    /// Active dialect, used to pick between converters registered for the
    /// same node kind (with `""` being the default dialect).
    pub dialect: String,

    /// Integer immediates of this type print as bare literals (e.g. `5`),
    /// all others as explicit casts (e.g. `int8(5)`).
    pub int_dtype: DataType,

    /// Float immediates of this type print as bare literals (e.g. `1.5`),
    /// all others as explicit casts (e.g. `float16(1.5)`).
    pub float_dtype: DataType,

    /// Namespace for the constructors used in printed documents, e.g. with
    /// `Some("T")`, `Range(0, 10)` becomes `T.Range(0, 10)`.
    pub prefix: Option<String>,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            dialect: String::new(),
            int_dtype: DataType::INT32,
            float_dtype: DataType::FLOAT32,
            prefix: None,
        }
    }
}

impl PrinterConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// The conversion context, threaded through all converters.
///
/// A [`Printer`] only borrows its [`Registry`] and [`PrinterConfig`], so it's
/// cheap to create one per print operation (and share the rest across them).
#[derive(Copy, Clone)]
pub struct Printer<'a> {
    registry: &'a Registry,
    config: &'a PrinterConfig,
}

impl<'a> Printer<'a> {
    pub fn new(registry: &'a Registry, config: &'a PrinterConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn config(&self) -> &'a PrinterConfig {
        self.config
    }

    pub fn dialect(&self) -> &'a str {
        &self.config.dialect
    }

    /// Convert `node` as the root of a print operation.
    pub fn print(&self, node: &Node) -> Result<Doc, PrintError> {
        self.convert(node, &Path::root())
    }

    /// Convert `node`, found at `path` (relative to the print root).
    ///
    /// The resulting [`Doc`] records `path` in its [`Doc::source_paths`].
    pub fn convert(&self, node: &Node, path: &Path) -> Result<Doc, PrintError> {
        let doc = self.registry.dispatch(node, path, self).map_err(|err| err.located_at(path))?;
        Ok(doc.with_source_path(path.clone()))
    }

    /// Like [`Printer::convert`], but requiring a [`ListDoc`] result
    /// (e.g. when converting a [`Node::Array`]).
    pub fn convert_as_list(&self, node: &Node, path: &Path) -> Result<ListDoc, PrintError> {
        self.convert(node, path)?.into_list().map_err(|doc| PrintError::UnexpectedDoc {
            expected: "list",
            found: doc.kind_name(),
            path: path.clone(),
        })
    }

    /// Reference to the constructor/builtin `name` (e.g. `Range`, or `int8`),
    /// taking [`PrinterConfig::prefix`] into account.
    pub fn builtin(&self, name: &str) -> Doc {
        match &self.config.prefix {
            Some(prefix) => Doc::id(prefix.clone()).attr(name),
            None => Doc::id(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_json() {
        let config = PrinterConfig::from_json(
            r#"{ "dialect": "relax", "int_dtype": "int64", "prefix": "T" }"#,
        )
        .unwrap();
        assert_eq!(config.dialect, "relax");
        assert_eq!(config.int_dtype, DataType::INT64);
        assert_eq!(config.float_dtype, DataType::FLOAT32);
        assert_eq!(config.prefix.as_deref(), Some("T"));

        assert_eq!(PrinterConfig::from_json("{}").unwrap(), PrinterConfig::default());
        assert!(PrinterConfig::from_json(r#"{ "int_dtype": "int" }"#).is_err());
        assert!(PrinterConfig::from_json(r#"{ "colour": true }"#).is_err());
    }

    #[test]
    fn builtin_respects_prefix() {
        let registry = Registry::new();
        let config = PrinterConfig::default();
        assert_eq!(Printer::new(&registry, &config).builtin("Range").to_string(), "Range");

        let config = PrinterConfig::default().with_prefix("T");
        assert_eq!(Printer::new(&registry, &config).builtin("Range").to_string(), "T.Range");
    }
}
