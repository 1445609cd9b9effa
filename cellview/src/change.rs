/// The kind of structural change applied to an item collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeKind {
    /// `count` items were inserted at `from`.
    Insert,
    /// `count` items were removed starting at `from` (indexes before the removal).
    Remove,
    /// Items in `[from, to]` were replaced with new values.
    Replace,
    /// Items in `[from, to]` were reordered.
    Permute,
    /// The whole collection was replaced.
    SetAll,
}

/// A structural change descriptor: `{kind, from, to, count}`.
///
/// `to` is inclusive. For an empty change (`count == 0`) it equals `from`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListChange {
    pub kind: ChangeKind,
    pub from: usize,
    pub to: usize,
    pub count: usize,
}

impl ListChange {
    fn spanning(kind: ChangeKind, from: usize, count: usize) -> Self {
        Self {
            kind,
            from,
            to: from + count.saturating_sub(1),
            count,
        }
    }

    pub fn insert(at: usize, count: usize) -> Self {
        Self::spanning(ChangeKind::Insert, at, count)
    }

    pub fn remove(from: usize, count: usize) -> Self {
        Self::spanning(ChangeKind::Remove, from, count)
    }

    /// Replacement of the inclusive span `[from, to]`.
    pub fn replace(from: usize, to: usize) -> Self {
        let to = to.max(from);
        Self {
            kind: ChangeKind::Replace,
            from,
            to,
            count: to - from + 1,
        }
    }

    /// Reordering inside the inclusive span `[from, to]`.
    pub fn permute(from: usize, to: usize) -> Self {
        let to = to.max(from);
        Self {
            kind: ChangeKind::Permute,
            from,
            to,
            count: to - from + 1,
        }
    }

    /// Full replacement, `count` being the new collection length.
    pub fn set_all(count: usize) -> Self {
        Self::spanning(ChangeKind::SetAll, 0, count)
    }

    /// Signed shift applied to indexes after the change, for positional changes.
    pub fn shift(&self) -> Option<isize> {
        match self.kind {
            ChangeKind::Insert => isize::try_from(self.count).ok(),
            ChangeKind::Remove => isize::try_from(self.count).ok().map(|c| -c),
            _ => None,
        }
    }
}

/// Why a viewport state was produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpdateType {
    /// First state after construction, or after a reset (factory change, orientation change).
    #[default]
    Init,
    /// Scroll offset or viewport geometry changed; the items did not.
    Scroll,
    /// The item collection changed.
    Change,
}
