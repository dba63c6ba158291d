//! **`irdoc`** converts immutable, strongly-typed compiler IR nodes into
//! structured *documents* (see [`print::doc`]), which can later be laid out and
//! rendered as source text, and also provides a minimal structural dump
//! (see [`print::repr`]) for debugging.
//!
//! Conversion is type-directed: a [`print::Registry`] maps every node kind
//! (optionally specialized per "dialect", i.e. alternate surface syntax) to a
//! converter, and converters recurse through the [`print::Printer`] context,
//! extending a provenance [`Path`] at every field they descend into.
//!
//! #### Notable types/modules
//!
//! ##### IR data types
//! * [`Node`]: any printable IR node (leaf kinds, generic values, and [`ExtNode`]s)
//! * [`DataType`]: scalar datatypes, with their canonical encoding (e.g. `int32`)
//! * [`Target`]: compilation target descriptors
//!
//! ##### Printing
//! * [`print::Registry`]: `(kind, dialect)`-keyed converter table
//! * [`print::Printer`]: the conversion context (dialect, default dtypes)
//! * [`print::repr::ReprRegistry`]: structural dumps of nodes
//!

// BEGIN - Embark standard lints v6 for Rust 1.55+
// do not change or add/remove here, but one can add exceptions after this section
// for more info see: <https://github.com/EmbarkStudios/rust-ecosystem/issues/59>
#![deny(unsafe_code)]
#![warn(
    clippy::all,
    clippy::await_holding_lock,
    clippy::char_lit_as_u8,
    clippy::checked_conversions,
    clippy::dbg_macro,
    clippy::debug_assert_with_mut_call,
    clippy::doc_markdown,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::exit,
    clippy::expl_impl_clone_on_copy,
    clippy::explicit_deref_methods,
    clippy::explicit_into_iter_loop,
    clippy::fallible_impl_from,
    clippy::filter_map_next,
    clippy::flat_map_option,
    clippy::float_cmp_const,
    clippy::fn_params_excessive_bools,
    clippy::from_iter_instead_of_collect,
    clippy::if_let_mutex,
    clippy::implicit_clone,
    clippy::imprecise_flops,
    clippy::inefficient_to_string,
    clippy::invalid_upcast_comparisons,
    clippy::large_digit_groups,
    clippy::large_stack_arrays,
    clippy::large_types_passed_by_value,
    clippy::let_unit_value,
    clippy::linkedlist,
    clippy::lossy_float_literal,
    clippy::macro_use_imports,
    clippy::manual_ok_or,
    clippy::map_err_ignore,
    clippy::map_flatten,
    clippy::map_unwrap_or,
    clippy::match_same_arms,
    clippy::match_wild_err_arm,
    clippy::match_wildcard_for_single_variants,
    clippy::mem_forget,
    clippy::missing_enforced_import_renames,
    clippy::mut_mut,
    clippy::mutex_integer,
    clippy::needless_borrow,
    clippy::needless_continue,
    clippy::needless_for_each,
    clippy::option_option,
    clippy::path_buf_push_overwrite,
    clippy::ptr_as_ptr,
    clippy::rc_mutex,
    clippy::ref_option_ref,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::same_functions_in_if_condition,
    clippy::semicolon_if_nothing_returned,
    clippy::single_match_else,
    clippy::string_add_assign,
    clippy::string_add,
    clippy::string_lit_as_bytes,
    clippy::string_to_string,
    clippy::todo,
    clippy::trait_duplication_in_bounds,
    clippy::unimplemented,
    clippy::unnested_or_patterns,
    clippy::unused_self,
    clippy::useless_transmute,
    clippy::verbose_file_reads,
    clippy::zero_sized_map_values,
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms
)]
// END - Embark standard lints v6 for Rust 1.55+
// crate-specific exceptions:
#![allow(
    // NOTE `match` is used when `if let` is too long.
    clippy::single_match_else,

    // NOTE `Path` is never "empty", only rooted (see `Path::is_root`).
    clippy::len_without_is_empty,
)]
#![forbid(unsafe_code)]

// NOTE all the modules are declared here, but they're documented "inside"
// (i.e. using inner doc comments).
pub mod dtype;
pub mod path;
pub mod print;
pub mod target;

use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Insertion-ordered map (used wherever key order must be deterministic).
//
// HACK work around the lack of `FxIndex{Map,Set}` type aliases elsewhere.
pub type FxIndexMap<K, V> =
    indexmap::IndexMap<K, V, std::hash::BuildHasherDefault<rustc_hash::FxHasher>>;

pub use dtype::DataType;
pub use path::{Path, PathStep};
pub use target::Target;

/// Runtime identifier for the kind of a [`Node`] (e.g. `"IntImm"`).
///
/// Built-in kinds are associated constants, while [`ExtNode`] kinds are
/// chosen by their defining crate (and should be namespaced, e.g. `"tir.Var"`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub struct NodeKind(&'static str);

impl NodeKind {
    pub const INT_IMM: Self = Self("IntImm");
    pub const FLOAT_IMM: Self = Self("FloatImm");
    pub const RANGE: Self = Self("Range");
    pub const PRIM_TYPE: Self = Self("PrimType");
    pub const POINTER_TYPE: Self = Self("PointerType");
    pub const TUPLE_TYPE: Self = Self("TupleType");
    pub const INCOMPLETE_TYPE: Self = Self("IncompleteType");
    pub const TARGET: Self = Self("Target");

    pub const STR: Self = Self("runtime.String");
    pub const INT: Self = Self("runtime.Int");
    pub const FLOAT: Self = Self("runtime.Float");
    pub const BOOL: Self = Self("runtime.Bool");
    pub const NONE: Self = Self("runtime.None");
    pub const ARRAY: Self = Self("runtime.Array");
    pub const MAP: Self = Self("runtime.Map");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.0)
    }
}

/// Any printable IR node.
///
/// Nodes are immutable, and cheap to clone (non-[`Copy`] contents are shared
/// through [`Arc`]), so converters can freely build temporary nodes (e.g. a
/// [`Node::Map`] out of [`Target::export`]) to delegate their conversion.
#[derive(Clone, Debug, derive_more::From)]
pub enum Node {
    /// Integer immediate (constant), see [`IntImm`].
    #[from]
    IntImm(IntImm),

    /// Floating-point immediate (constant), see [`FloatImm`].
    #[from]
    FloatImm(FloatImm),

    Range(Arc<Range>),

    #[from]
    PrimType(PrimType),

    PointerType(Arc<PointerType>),

    TupleType(Arc<TupleType>),

    #[from]
    IncompleteType(IncompleteType),

    Target(Arc<Target>),

    // Generic values, e.g. produced by `Target::export`.
    Str(Arc<str>),
    #[from]
    Int(i64),
    #[from]
    Float(f64),
    #[from]
    Bool(bool),
    None,
    Array(Arc<[Node]>),
    Map(Arc<FxIndexMap<String, Node>>),

    /// Node kinds defined outside of this crate (see [`ExtNode`]).
    Ext(Arc<dyn ExtNode>),
}

// HACK these behave like the `#[from]` conversions above, but also `Arc`-wrap.
macro_rules! impl_from_shared {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(impl From<$ty> for Node {
            fn from(x: $ty) -> Self {
                Node::$variant(Arc::new(x))
            }
        })+
    };
}
impl_from_shared! {
    Range(Range),
    PointerType(PointerType),
    TupleType(TupleType),
    Target(Target),
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Str(s.into())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Str(s.into())
    }
}

impl From<Vec<Node>> for Node {
    fn from(elements: Vec<Node>) -> Self {
        Node::Array(elements.into())
    }
}

impl From<FxIndexMap<String, Node>> for Node {
    fn from(map: FxIndexMap<String, Node>) -> Self {
        Node::Map(Arc::new(map))
    }
}

impl Node {
    /// Wrap an externally-defined node.
    pub fn ext(node: impl ExtNode) -> Self {
        Node::Ext(Arc::new(node))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::IntImm(_) => NodeKind::INT_IMM,
            Self::FloatImm(_) => NodeKind::FLOAT_IMM,
            Self::Range(_) => NodeKind::RANGE,
            Self::PrimType(_) => NodeKind::PRIM_TYPE,
            Self::PointerType(_) => NodeKind::POINTER_TYPE,
            Self::TupleType(_) => NodeKind::TUPLE_TYPE,
            Self::IncompleteType(_) => NodeKind::INCOMPLETE_TYPE,
            Self::Target(_) => NodeKind::TARGET,
            Self::Str(_) => NodeKind::STR,
            Self::Int(_) => NodeKind::INT,
            Self::Float(_) => NodeKind::FLOAT,
            Self::Bool(_) => NodeKind::BOOL,
            Self::None => NodeKind::NONE,
            Self::Array(_) => NodeKind::ARRAY,
            Self::Map(_) => NodeKind::MAP,
            Self::Ext(ext) => ext.kind(),
        }
    }

    /// Downcast a [`Node::Ext`] to its concrete (externally-defined) type.
    pub fn as_ext<T: ExtNode>(&self) -> Option<&T> {
        match self {
            Self::Ext(ext) => ext.as_any().downcast_ref(),
            _ => None,
        }
    }

    /// All fields of this node, in declaration order (used for reflection,
    /// e.g. by [`print::repr`]).
    pub fn fields(&self) -> Fields<'_> {
        let mut fields = Fields::new();
        match self {
            Self::IntImm(IntImm { value, dtype }) => {
                fields.push(("value", FieldValue::Int(*value)));
                fields.push(("dtype", FieldValue::DataType(*dtype)));
            }
            Self::FloatImm(FloatImm { value, dtype }) => {
                fields.push(("value", FieldValue::Float(*value)));
                fields.push(("dtype", FieldValue::DataType(*dtype)));
            }
            Self::Range(range) => {
                let Range { min, extent } = &**range;
                fields.push(("min", FieldValue::Node(min)));
                fields.push(("extent", FieldValue::Node(extent)));
            }
            Self::PrimType(PrimType { dtype }) => {
                fields.push(("dtype", FieldValue::DataType(*dtype)));
            }
            Self::PointerType(ty) => {
                let PointerType { element_type, storage_scope } = &**ty;
                fields.push(("element_type", FieldValue::Node(element_type)));
                fields.push(("storage_scope", FieldValue::Str(storage_scope)));
            }
            Self::TupleType(ty) => fields.push(("fields", FieldValue::Nodes(&ty.fields))),
            Self::IncompleteType(IncompleteType) => {}
            Self::Target(target) => return target.fields(),
            Self::Str(s) => fields.push(("value", FieldValue::Str(s))),
            Self::Int(x) => fields.push(("value", FieldValue::Int(*x))),
            Self::Float(x) => fields.push(("value", FieldValue::Float(*x))),
            Self::Bool(b) => fields.push(("value", FieldValue::Bool(*b))),
            Self::None => {}
            Self::Array(elements) => fields.push(("elements", FieldValue::Nodes(elements))),
            Self::Map(map) => fields.push(("entries", FieldValue::Map(map))),
            Self::Ext(ext) => return ext.fields(),
        }
        fields
    }
}

/// Reflected fields of a [`Node`] (see [`Node::fields`]).
pub type Fields<'a> = SmallVec<[(&'static str, FieldValue<'a>); 4]>;

/// The value of one reflected field (see [`Node::fields`]).
#[derive(Copy, Clone, Debug)]
pub enum FieldValue<'a> {
    Node(&'a Node),
    Nodes(&'a [Node]),
    Map(&'a FxIndexMap<String, Node>),
    Target(&'a Arc<Target>),
    DataType(DataType),
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(&'a str),
    Strs(&'a [String]),
    Absent,
}

/// Interface for node kinds defined outside of this crate.
///
/// To print such nodes, a converter for their [`kind`](ExtNode::kind) has to be
/// registered (see [`print::Registry`]), but [`print::repr`] works out of the box,
/// through [`fields`](ExtNode::fields).
pub trait ExtNode: fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> NodeKind;

    /// All fields of this node, in declaration order.
    fn fields(&self) -> Fields<'_>;

    fn as_any(&self) -> &dyn Any;
}

/// Integer immediate: the constant `value`, of type `dtype`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntImm {
    pub value: i64,
    pub dtype: DataType,
}

impl IntImm {
    pub fn new(value: i64, dtype: DataType) -> Self {
        Self { value, dtype }
    }
}

/// Floating-point immediate: the constant `value`, of type `dtype`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatImm {
    pub value: f64,
    pub dtype: DataType,
}

impl FloatImm {
    pub fn new(value: f64, dtype: DataType) -> Self {
        Self { value, dtype }
    }
}

/// Half-open range `min..min+extent`.
#[derive(Clone, Debug)]
pub struct Range {
    pub min: Node,
    pub extent: Node,
}

impl Range {
    pub fn new(min: impl Into<Node>, extent: impl Into<Node>) -> Self {
        Self { min: min.into(), extent: extent.into() }
    }
}

/// Primitive (scalar or vector) type, including `void`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrimType {
    pub dtype: DataType,
}

impl PrimType {
    pub fn new(dtype: DataType) -> Self {
        Self { dtype }
    }
}

/// Pointer type, to values of `element_type`, in `storage_scope` (where an
/// empty `storage_scope` denotes the default, e.g. global memory).
#[derive(Clone, Debug)]
pub struct PointerType {
    pub element_type: Node,
    pub storage_scope: String,
}

impl PointerType {
    pub fn new(element_type: impl Into<Node>, storage_scope: impl Into<String>) -> Self {
        Self { element_type: element_type.into(), storage_scope: storage_scope.into() }
    }
}

/// Tuple type, with field types `fields` (empty denotes the unit type).
#[derive(Clone, Debug)]
pub struct TupleType {
    pub fields: Arc<[Node]>,
}

impl TupleType {
    pub fn new(fields: impl IntoIterator<Item = Node>) -> Self {
        Self { fields: fields.into_iter().collect() }
    }
}

/// Placeholder for a type that hasn't been inferred/resolved yet.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IncompleteType;
