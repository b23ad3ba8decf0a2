use std::collections::BTreeMap;

/// Keyed collection delta capturing additions, removals, and updates.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionDelta<Id, Patch> {
    pub added: Vec<Id>,
    pub removed: Vec<Id>,
    pub updated: Vec<Patch>,
}

impl<Id, Patch> CollectionDelta<Id, Patch> {
    pub(super) fn new() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            updated: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

impl<Id, Patch> Default for CollectionDelta<Id, Patch> {
    fn default() -> Self {
        Self::new()
    }
}

pub(super) fn diff_collection<Id, T, Patch, FPatch>(
    before: &BTreeMap<Id, T>,
    after: &BTreeMap<Id, T>,
    mut patch_fn: FPatch,
) -> CollectionDelta<Id, Patch>
where
    Id: Ord + Clone,
    FPatch: FnMut(&Id, &T, &T) -> Option<Patch>,
{
    let mut delta = CollectionDelta::new();

    for (id, entry) in after {
        match before.get(id) {
            Some(prev) => {
                if let Some(patch) = patch_fn(id, prev, entry) {
                    delta.updated.push(patch);
                }
            }
            None => delta.added.push(id.clone()),
        }
    }

    delta.removed.extend(
        before
            .keys()
            .filter(|id| !after.contains_key(*id))
            .cloned(),
    );
    delta
}
