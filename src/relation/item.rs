//! RelationItem and RelationSet: the per-owner rule tables.
//!
//! These types only hold data. The propagation that reads them lives on the
//! stage (see [`crate::relation::apply`]) because applying a rule moves other
//! objects.

use super::types::{RelationDef, RelationType};
use crate::geometry::Rect;
use crate::stage::ObjectId;

// ---------------------------------------------------------------------------
// RelationItem
// ---------------------------------------------------------------------------

/// All rules one owner holds against a single target.
///
/// The item caches the target's geometry as of the last propagation so that
/// the next change can be expressed as a delta.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationItem {
    target: ObjectId,
    defs: Vec<RelationDef>,
    pub(crate) target_rect: Rect,
}

impl RelationItem {
    pub(crate) fn new(target: ObjectId, target_rect: Rect) -> Self {
        Self {
            target,
            defs: Vec::new(),
            target_rect,
        }
    }

    /// The object this item tracks.
    pub fn target(&self) -> ObjectId {
        self.target
    }

    /// Rules in application order.
    pub fn defs(&self) -> &[RelationDef] {
        &self.defs
    }

    /// An empty item is pruned by its set.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Whether a rule of this type is present.
    pub fn contains(&self, relation_type: RelationType) -> bool {
        self.defs.iter().any(|d| d.relation_type == relation_type)
    }

    /// Add a rule, replacing the percent flag of an existing rule of the same
    /// type. `Size` expands into `Width` and `Height`.
    pub(crate) fn add(&mut self, relation_type: RelationType, use_percent: bool) {
        if relation_type == RelationType::Size {
            self.add(RelationType::Width, use_percent);
            self.add(RelationType::Height, use_percent);
            return;
        }
        if let Some(def) = self.defs.iter_mut().find(|d| d.relation_type == relation_type) {
            def.use_percent = use_percent;
            return;
        }
        let at = self
            .defs
            .iter()
            .position(|d| d.relation_type > relation_type)
            .unwrap_or(self.defs.len());
        self.defs.insert(at, RelationDef::new(relation_type, use_percent));
    }

    /// Remove a rule. `Size` removes both `Width` and `Height`.
    pub(crate) fn remove(&mut self, relation_type: RelationType) {
        if relation_type == RelationType::Size {
            self.remove(RelationType::Width);
            self.remove(RelationType::Height);
            return;
        }
        self.defs.retain(|d| d.relation_type != relation_type);
    }
}

// ---------------------------------------------------------------------------
// RelationSet
// ---------------------------------------------------------------------------

/// Every relation item an object owns, at most one per target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationSet {
    items: Vec<RelationItem>,
}

impl RelationSet {
    /// All items, in the order their targets were first added.
    pub fn items(&self) -> &[RelationItem] {
        &self.items
    }

    /// Number of targets tracked.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item for `target`, if any.
    pub fn item(&self, target: ObjectId) -> Option<&RelationItem> {
        self.items.iter().find(|i| i.target == target)
    }

    pub(crate) fn item_mut(&mut self, target: ObjectId) -> Option<&mut RelationItem> {
        self.items.iter_mut().find(|i| i.target == target)
    }

    /// Iterate over tracked targets.
    pub fn targets(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.items.iter().map(|i| i.target)
    }

    /// Add a rule. Returns `true` when a new item (new target) was created.
    pub(crate) fn add(
        &mut self,
        target: ObjectId,
        target_rect: Rect,
        relation_type: RelationType,
        use_percent: bool,
    ) -> bool {
        if let Some(item) = self.item_mut(target) {
            item.add(relation_type, use_percent);
            return false;
        }
        let mut item = RelationItem::new(target, target_rect);
        item.add(relation_type, use_percent);
        self.items.push(item);
        true
    }

    /// Remove one rule, or every rule when `relation_type` is `None`.
    ///
    /// Returns `true` when the target's item was pruned.
    pub(crate) fn remove(&mut self, target: ObjectId, relation_type: Option<RelationType>) -> bool {
        let Some(idx) = self.items.iter().position(|i| i.target == target) else {
            return false;
        };
        match relation_type {
            Some(ty) => self.items[idx].remove(ty),
            None => self.items[idx].defs.clear(),
        }
        if self.items[idx].is_empty() {
            self.items.remove(idx);
            true
        } else {
            false
        }
    }

    /// Drop every item, returning the targets that were tracked.
    pub(crate) fn clear(&mut self) -> Vec<ObjectId> {
        self.items.drain(..).map(|i| i.target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<ObjectId> {
        let mut sm: SlotMap<ObjectId, ()> = SlotMap::with_key();
        (0..n).map(|_| sm.insert(())).collect()
    }

    fn types(item: &RelationItem) -> Vec<RelationType> {
        item.defs().iter().map(|d| d.relation_type).collect()
    }

    #[test]
    fn defs_are_kept_in_application_order() {
        let t = ids(1)[0];
        let mut item = RelationItem::new(t, Rect::EMPTY);
        item.add(RelationType::Width, false);
        item.add(RelationType::RightExtRight, false);
        item.add(RelationType::LeftLeft, false);
        assert_eq!(
            types(&item),
            vec![RelationType::LeftLeft, RelationType::Width, RelationType::RightExtRight]
        );
    }

    #[test]
    fn duplicate_type_replaces_percent_flag() {
        let t = ids(1)[0];
        let mut item = RelationItem::new(t, Rect::EMPTY);
        item.add(RelationType::LeftLeft, false);
        item.add(RelationType::LeftLeft, true);
        assert_eq!(item.defs().len(), 1);
        assert!(item.defs()[0].use_percent);
    }

    #[test]
    fn size_expands_and_removes_as_pair() {
        let t = ids(1)[0];
        let mut item = RelationItem::new(t, Rect::EMPTY);
        item.add(RelationType::Size, false);
        assert_eq!(types(&item), vec![RelationType::Width, RelationType::Height]);
        item.remove(RelationType::Size);
        assert!(item.is_empty());
    }

    #[test]
    fn set_holds_one_item_per_target() {
        let v = ids(2);
        let mut set = RelationSet::default();
        assert!(set.add(v[0], Rect::EMPTY, RelationType::LeftLeft, false));
        assert!(!set.add(v[0], Rect::EMPTY, RelationType::TopTop, false));
        assert!(set.add(v[1], Rect::EMPTY, RelationType::Width, false));
        assert_eq!(set.len(), 2);
        assert_eq!(set.item(v[0]).unwrap().defs().len(), 2);
    }

    #[test]
    fn empty_items_are_pruned() {
        let v = ids(1);
        let mut set = RelationSet::default();
        set.add(v[0], Rect::EMPTY, RelationType::LeftLeft, false);
        set.add(v[0], Rect::EMPTY, RelationType::TopTop, false);
        assert!(!set.remove(v[0], Some(RelationType::LeftLeft)));
        assert!(set.remove(v[0], Some(RelationType::TopTop)));
        assert!(set.is_empty());
    }

    #[test]
    fn remove_all_for_target() {
        let v = ids(2);
        let mut set = RelationSet::default();
        set.add(v[0], Rect::EMPTY, RelationType::Size, false);
        set.add(v[1], Rect::EMPTY, RelationType::LeftLeft, false);
        assert!(set.remove(v[0], None));
        assert_eq!(set.targets().collect::<Vec<_>>(), vec![v[1]]);
        assert!(!set.remove(v[0], None));
    }
}
