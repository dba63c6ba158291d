//! Document trees ([`Doc`]), the output of converting [`Node`](crate::Node)s.
//!
//! A [`Doc`] is an expression-like tree (literals, identifiers, attribute
//! accesses, calls, lists and dicts), which a layout engine can later render
//! as source text. Documents are built bottom-up and never mutated after
//! construction, only composed into larger documents.
//!
//! Each document node also records the [`Path`]s of the IR nodes it was
//! produced from (see [`Doc::source_paths`]), to allow mapping any part of the
//! rendered output back to the IR.
//!
//! The [`fmt::Display`] impl produces single-line (Python-like) text, without
//! any layout, which is mostly useful for debugging and testing.

use crate::Path;
use itertools::Itertools as _;
use smallvec::SmallVec;
use std::fmt;

/// Source paths attached to a document node.
pub type SourcePaths = SmallVec<[Path; 1]>;

#[derive(Clone, Debug, derive_more::From)]
pub enum Doc {
    Literal(LiteralDoc),
    Id(IdDoc),
    Attr(AttrAccessDoc),
    Call(CallDoc),
    List(ListDoc),
    Dict(DictDoc),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Literal value (`None`, `True`, `5`, `1.5`, `"text"`).
#[derive(Clone, Debug)]
pub struct LiteralDoc {
    pub value: Literal,
    pub source_paths: SourcePaths,
}

/// Identifier (e.g. a dtype name used as a constructor, like `int8`).
#[derive(Clone, Debug)]
pub struct IdDoc {
    pub name: String,
    pub source_paths: SourcePaths,
}

/// Attribute access (`value.name`).
#[derive(Clone, Debug)]
pub struct AttrAccessDoc {
    pub value: Box<Doc>,
    pub name: String,
    pub source_paths: SourcePaths,
}

/// Call expression (`callee(args...)`).
#[derive(Clone, Debug)]
pub struct CallDoc {
    pub callee: Box<Doc>,
    pub args: Vec<Doc>,
    pub source_paths: SourcePaths,
}

/// List expression (`[elements...]`).
#[derive(Clone, Debug)]
pub struct ListDoc {
    pub elements: Vec<Doc>,
    pub source_paths: SourcePaths,
}

/// Dict expression (`{key: value, ...}`), entries kept in order.
#[derive(Clone, Debug)]
pub struct DictDoc {
    pub entries: Vec<(Doc, Doc)>,
    pub source_paths: SourcePaths,
}

impl Doc {
    fn literal(value: Literal) -> Self {
        LiteralDoc { value, source_paths: SourcePaths::new() }.into()
    }

    pub fn none() -> Self {
        Self::literal(Literal::None)
    }

    pub fn boolean(b: bool) -> Self {
        Self::literal(Literal::Bool(b))
    }

    pub fn int(x: i64) -> Self {
        Self::literal(Literal::Int(x))
    }

    pub fn float(x: f64) -> Self {
        Self::literal(Literal::Float(x))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Self::literal(Literal::Str(s.into()))
    }

    pub fn id(name: impl Into<String>) -> Self {
        IdDoc { name: name.into(), source_paths: SourcePaths::new() }.into()
    }

    pub fn list(elements: impl IntoIterator<Item = Doc>) -> Self {
        ListDoc { elements: elements.into_iter().collect(), source_paths: SourcePaths::new() }
            .into()
    }

    pub fn dict(entries: impl IntoIterator<Item = (Doc, Doc)>) -> Self {
        DictDoc { entries: entries.into_iter().collect(), source_paths: SourcePaths::new() }
            .into()
    }

    /// Build `self.name`.
    pub fn attr(self, name: impl Into<String>) -> Self {
        AttrAccessDoc { value: Box::new(self), name: name.into(), source_paths: SourcePaths::new() }
            .into()
    }

    /// Build `self(args...)`.
    pub fn call(self, args: impl IntoIterator<Item = Doc>) -> Self {
        CallDoc {
            callee: Box::new(self),
            args: args.into_iter().collect(),
            source_paths: SourcePaths::new(),
        }
        .into()
    }

    /// Short name of this document's variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Id(_) => "identifier",
            Self::Attr(_) => "attribute access",
            Self::Call(_) => "call",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
        }
    }

    pub fn source_paths(&self) -> &[Path] {
        match self {
            Self::Literal(doc) => &doc.source_paths,
            Self::Id(doc) => &doc.source_paths,
            Self::Attr(doc) => &doc.source_paths,
            Self::Call(doc) => &doc.source_paths,
            Self::List(doc) => &doc.source_paths,
            Self::Dict(doc) => &doc.source_paths,
        }
    }

    /// Record `path` as (one of) the origin(s) of this document node.
    ///
    /// This consumes `self`, i.e. it's part of constructing the document,
    /// and a path already present is not recorded twice.
    pub fn with_source_path(mut self, path: Path) -> Self {
        let source_paths = match &mut self {
            Self::Literal(doc) => &mut doc.source_paths,
            Self::Id(doc) => &mut doc.source_paths,
            Self::Attr(doc) => &mut doc.source_paths,
            Self::Call(doc) => &mut doc.source_paths,
            Self::List(doc) => &mut doc.source_paths,
            Self::Dict(doc) => &mut doc.source_paths,
        };
        if !source_paths.contains(&path) {
            source_paths.push(path);
        }
        self
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(doc) => Some(&doc.value),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallDoc> {
        match self {
            Self::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListDoc> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictDoc> {
        match self {
            Self::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Extract a [`ListDoc`], or give back `self` if it's any other kind.
    pub fn into_list(self) -> Result<ListDoc, Self> {
        match self {
            Self::List(list) => Ok(list),
            other => Err(other),
        }
    }

    /// The name of this identifier, or (for `a.b`) of the outermost attribute.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(doc) => Some(&doc.name),
            Self::Attr(doc) => Some(&doc.name),
            _ => None,
        }
    }
}

impl CallDoc {
    /// Name of the callee (e.g. `"int8"` for both `int8(5)` and `T.int8(5)`).
    pub fn callee_name(&self) -> Option<&str> {
        self.callee.name()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(x) => write!(f, "{x}"),
            Self::Float(x) if x.is_finite() => write!(f, "{x:?}"),
            Self::Float(x) if x.is_nan() => f.write_str("float(\"nan\")"),
            Self::Float(x) => {
                write!(f, "float(\"{}inf\")", if x.is_sign_negative() { "-" } else { "" })
            }
            Self::Str(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    // Unescape single quotes, we're in a double-quoted string.
                    if c == '\'' {
                        f.write_str("'")?;
                    } else {
                        write!(f, "{}", c.escape_debug())?;
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

impl fmt::Display for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(doc) => write!(f, "{}", doc.value),
            Self::Id(doc) => f.write_str(&doc.name),
            Self::Attr(doc) => write!(f, "{}.{}", doc.value, doc.name),
            Self::Call(doc) => write!(f, "{}({})", doc.callee, doc.args.iter().format(", ")),
            Self::List(doc) => write!(f, "[{}]", doc.elements.iter().format(", ")),
            Self::Dict(doc) => write!(
                f,
                "{{{}}}",
                doc.entries.iter().format_with(", ", |(k, v), f| f(&format_args!("{k}: {v}")))
            ),
        }
    }
}
