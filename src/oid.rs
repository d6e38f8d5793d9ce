use std::fmt;

/// An owned object identifier.
///
/// Ordering is lexicographic over the arcs, which is the order agents walk in.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct ObjectId(Vec<u64>);

impl ObjectId {
    pub fn new(arcs: Vec<u64>) -> Self {
        Self(arcs)
    }

    pub fn arcs(&self) -> &[u64] {
        &self.0
    }

    /// Returns `true` when `self` lies strictly below `root`.
    pub fn is_descendant_of(&self, root: &ObjectId) -> bool {
        self.0.len() > root.0.len() && self.0.starts_with(&root.0)
    }

    /// The final arc, which is the row index for a table column instance.
    pub fn last_arc(&self) -> Option<u64> {
        self.0.last().copied()
    }

    /// Appends one arc.
    pub fn child(&self, arc: u64) -> Self {
        let mut arcs = self.0.clone();
        arcs.push(arc);
        Self(arcs)
    }
}

impl From<&[u64]> for ObjectId {
    fn from(arcs: &[u64]) -> Self {
        Self(arcs.to_vec())
    }
}

impl From<Vec<u64>> for ObjectId {
    fn from(arcs: Vec<u64>) -> Self {
        Self(arcs)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
            for arc in arcs {
                write!(f, ".{}", arc)?;
            }
        }
        Ok(())
    }
}
