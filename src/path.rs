//! Provenance paths ([`Path`]), from a print root to a node being converted.
//!
//! A [`Path`] is a persistent singly-linked list, with the last step at the
//! head, so extending it (e.g. [`Path::attr`]) is O(1) and never affects any
//! other [`Path`] sharing the same prefix (e.g. one for a sibling node).

use std::fmt;
use std::sync::Arc;

/// One step in a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Field access (`.name`).
    Attr(&'static str),

    /// Array element access (`[idx]`).
    Index(usize),

    /// Map value access (`["key"]`), for string-keyed maps.
    MapValue(Arc<str>),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attr(name) => write!(f, ".{name}"),
            Self::Index(idx) => write!(f, "[{idx}]"),
            Self::MapValue(key) => write!(f, "[{key:?}]"),
        }
    }
}

#[derive(Clone, Default)]
pub struct Path(Option<Arc<PathLink>>);

struct PathLink {
    parent: Path,
    step: PathStep,

    /// Number of steps in the whole path, including this one.
    len: usize,
}

impl Path {
    /// The empty path, denoting the print root itself.
    pub fn root() -> Self {
        Self(None)
    }

    fn push(&self, step: PathStep) -> Self {
        Path(Some(Arc::new(PathLink { parent: self.clone(), step, len: self.len() + 1 })))
    }

    pub fn attr(&self, name: &'static str) -> Self {
        self.push(PathStep::Attr(name))
    }

    pub fn index(&self, idx: usize) -> Self {
        self.push(PathStep::Index(idx))
    }

    pub fn map_value(&self, key: &str) -> Self {
        self.push(PathStep::MapValue(key.into()))
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |link| link.len)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    pub fn last_step(&self) -> Option<&PathStep> {
        self.0.as_ref().map(|link| &link.step)
    }

    /// The path this one was extended from (`None` for the root).
    pub fn parent(&self) -> Option<&Path> {
        self.0.as_ref().map(|link| &link.parent)
    }

    /// All steps, in root-to-leaf order.
    pub fn steps(&self) -> Vec<&PathStep> {
        let mut steps = Vec::with_capacity(self.len());
        let mut path = self;
        while let Some(link) = &path.0 {
            steps.push(&link.step);
            path = &link.parent;
        }
        steps.reverse();
        steps
    }

    /// Ancestor of `self` (or `self` itself) with exactly `len` steps.
    fn truncated(&self, len: usize) -> Option<&Path> {
        let mut path = self;
        while path.len() > len {
            path = path.parent()?;
        }
        (path.len() == len).then_some(path)
    }

    /// Whether `prefix` is an ancestor of `self` (or equal to it).
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.truncated(prefix.len()) == Some(prefix)
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        if a.len() != b.len() {
            return false;
        }
        loop {
            match (&a.0, &b.0) {
                (None, None) => return true,
                (Some(x), Some(y)) if Arc::ptr_eq(x, y) => return true,
                (Some(x), Some(y)) if x.step == y.step => {
                    a = &x.parent;
                    b = &y.parent;
                }
                _ => return false,
            }
        }
    }
}

impl Eq for Path {}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<root>")?;
        for step in self.steps() {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}
