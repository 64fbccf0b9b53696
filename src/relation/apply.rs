//! Relation propagation.
//!
//! When a target moves or resizes, every owner holding an item against it
//! re-applies that item's rules using the delta between the target's
//! current rect and the rect cached at the previous propagation. An owner
//! that is already being processed further up the call stack only refreshes
//! its cache, which keeps cyclic graphs finite.

use tracing::{debug, trace};

use super::types::{RelationDef, RelationType};
use crate::error::ConfigError;
use crate::gear::GearKind;
use crate::geometry::{Axis, Point, Rect};
use crate::stage::{ObjectId, Stage};

// ---------------------------------------------------------------------------
// Rule classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Edge {
    Near,
    Center,
    Far,
}

impl Edge {
    fn factor(self) -> f32 {
        match self {
            Edge::Near => 0.0,
            Edge::Center => 0.5,
            Edge::Far => 1.0,
        }
    }
}

/// What a rule does, independent of axis.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Rule {
    /// Keep `mine` edge at a fixed offset (or ratio) from `theirs`.
    Move { mine: Edge, theirs: Edge },
    /// Keep the extent at a fixed difference (or ratio) from the target's.
    Extent,
    /// Move only the `mine` edge, stretching the extent.
    Extend { mine: Edge, theirs: Edge },
}

fn classify(ty: RelationType) -> Rule {
    use Edge::*;
    use RelationType::*;
    match ty {
        LeftLeft | TopTop => Rule::Move { mine: Near, theirs: Near },
        LeftCenter | TopMiddle => Rule::Move { mine: Near, theirs: Center },
        LeftRight | TopBottom => Rule::Move { mine: Near, theirs: Far },
        CenterCenter | MiddleMiddle => Rule::Move { mine: Center, theirs: Center },
        RightLeft | BottomTop => Rule::Move { mine: Far, theirs: Near },
        RightCenter | BottomMiddle => Rule::Move { mine: Far, theirs: Center },
        RightRight | BottomBottom => Rule::Move { mine: Far, theirs: Far },
        Width | Height | Size => Rule::Extent,
        LeftExtLeft | TopExtTop => Rule::Extend { mine: Near, theirs: Near },
        LeftExtRight | TopExtBottom => Rule::Extend { mine: Near, theirs: Far },
        RightExtLeft | BottomExtTop => Rule::Extend { mine: Far, theirs: Near },
        RightExtRight | BottomExtBottom => Rule::Extend { mine: Far, theirs: Far },
    }
}

fn start_of(r: Rect, axis: Axis) -> f32 {
    r.origin().get(axis)
}

fn extent_of(r: Rect, axis: Axis) -> f32 {
    r.size().get(axis)
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

impl Stage {
    /// Add a rule making `owner` follow `target`.
    ///
    /// Adding a type already present for the pair replaces its percent flag.
    pub fn add_relation(
        &mut self,
        owner: ObjectId,
        target: ObjectId,
        relation_type: RelationType,
        use_percent: bool,
    ) -> Result<(), ConfigError> {
        if owner == target {
            return Err(ConfigError::SelfRelation);
        }
        let target_rect = self.objects.get(target).ok_or(ConfigError::UnknownObject)?.rect();
        if !self.objects.contains_key(owner) {
            return Err(ConfigError::UnknownObject);
        }
        if self.is_ancestor_of(owner, target) {
            return Err(ConfigError::DescendantRelation);
        }
        let Some(obj) = self.objects.get_mut(owner) else {
            return Err(ConfigError::UnknownObject);
        };
        if obj.relations.add(target, target_rect, relation_type, use_percent) {
            if let Some(entry) = self.dependents.entry(target) {
                entry.or_default().push(owner);
            }
        }
        trace!(?owner, ?target, relation = relation_type.name(), use_percent, "relation added");
        Ok(())
    }

    /// Add several rules against one target, all or nothing.
    ///
    /// A type listed twice is rejected.
    pub fn add_relations(
        &mut self,
        owner: ObjectId,
        target: ObjectId,
        defs: &[RelationDef],
    ) -> Result<(), ConfigError> {
        for (i, def) in defs.iter().enumerate() {
            if defs[..i].iter().any(|d| d.relation_type == def.relation_type) {
                return Err(ConfigError::DuplicateRelation(def.relation_type));
            }
        }
        if owner == target {
            return Err(ConfigError::SelfRelation);
        }
        if !self.objects.contains_key(owner) || !self.objects.contains_key(target) {
            return Err(ConfigError::UnknownObject);
        }
        if self.is_ancestor_of(owner, target) {
            return Err(ConfigError::DescendantRelation);
        }
        for def in defs {
            self.add_relation(owner, target, def.relation_type, def.use_percent)?;
        }
        Ok(())
    }

    /// Remove one rule, or every rule for the pair when `relation_type` is
    /// `None`.
    pub fn remove_relation(
        &mut self,
        owner: ObjectId,
        target: ObjectId,
        relation_type: Option<RelationType>,
    ) {
        let Some(obj) = self.objects.get_mut(owner) else {
            return;
        };
        if obj.relations.remove(target, relation_type) {
            self.unregister_dependent(target, owner);
        }
    }

    /// Drop every rule `owner` holds.
    pub fn clear_relations(&mut self, owner: ObjectId) {
        let Some(obj) = self.objects.get_mut(owner) else {
            return;
        };
        for target in obj.relations.clear() {
            self.unregister_dependent(target, owner);
        }
    }

    /// Owners that currently hold an item against `target`.
    pub fn relation_dependents(&self, target: ObjectId) -> &[ObjectId] {
        self.dependents.get(target).map(Vec::as_slice).unwrap_or_default()
    }

    fn unregister_dependent(&mut self, target: ObjectId, owner: ObjectId) {
        if let Some(owners) = self.dependents.get_mut(target) {
            owners.retain(|&o| o != owner);
        }
    }

    /// Remove rules held by `id` and rules held against it.
    pub(crate) fn detach_relations(&mut self, id: ObjectId) {
        self.clear_relations(id);
        if let Some(owners) = self.dependents.remove(id) {
            for owner in owners {
                if let Some(obj) = self.objects.get_mut(owner) {
                    obj.relations.remove(id, None);
                }
            }
        }
    }

    /// Drop rules whose target lies outside `id`'s own subtree, except rules
    /// against `keep`. Used before an object is parked in a pool.
    pub(crate) fn drop_external_relations(&mut self, id: ObjectId, keep: ObjectId) {
        let Some(obj) = self.objects.get(id) else {
            return;
        };
        let external: Vec<ObjectId> = obj
            .relations
            .targets()
            .filter(|&t| t != keep && !self.is_ancestor_of(id, t))
            .collect();
        for target in external {
            self.remove_relation(id, target, None);
        }
    }

    // ── Propagation ──────────────────────────────────────────────────

    pub(crate) fn propagate_xy_changed(&mut self, target: ObjectId) {
        let owners = match self.dependents.get(target) {
            Some(v) if !v.is_empty() => v.clone(),
            _ => return,
        };
        let originator = !self.dealing.contains(&target);
        if originator {
            self.dealing.push(target);
        }
        for owner in owners {
            // Children never follow their parent's position; they already
            // live in its coordinate space.
            if self.parent(owner) == Some(target) {
                continue;
            }
            if self.dealing.contains(&owner) {
                trace!(?owner, ?target, "relation cycle, cache refreshed only");
                self.refresh_relation_cache(owner, target);
                continue;
            }
            self.dealing.push(owner);
            self.apply_target_xy_changed(owner, target);
            self.dealing.pop();
        }
        if originator {
            self.dealing.pop();
        }
    }

    pub(crate) fn propagate_size_changed(&mut self, target: ObjectId) {
        let owners = match self.dependents.get(target) {
            Some(v) if !v.is_empty() => v.clone(),
            _ => return,
        };
        let originator = !self.dealing.contains(&target);
        if originator {
            self.dealing.push(target);
        }
        for owner in owners {
            if self.dealing.contains(&owner) {
                trace!(?owner, ?target, "relation cycle, cache refreshed only");
                self.refresh_relation_cache(owner, target);
                continue;
            }
            self.dealing.push(owner);
            self.apply_target_size_changed(owner, target);
            self.dealing.pop();
        }
        if originator {
            self.dealing.pop();
        }
    }

    fn refresh_relation_cache(&mut self, owner: ObjectId, target: ObjectId) {
        let Some(rect) = self.objects.get(target).map(|o| o.rect()) else {
            return;
        };
        if let Some(item) = self.objects.get_mut(owner).and_then(|o| o.relations.item_mut(target)) {
            item.target_rect = rect;
        }
    }

    fn relation_snapshot(&self, owner: ObjectId, target: ObjectId) -> Option<(Vec<RelationDef>, Rect, Rect)> {
        let t = self.objects.get(target)?.rect();
        let item = self.objects.get(owner)?.relations.item(target)?;
        Some((item.defs().to_vec(), item.target_rect, t))
    }

    fn apply_target_xy_changed(&mut self, owner: ObjectId, target: ObjectId) {
        let Some((defs, cached, current)) = self.relation_snapshot(owner, target) else {
            return;
        };
        let Some(before) = self.objects.get(owner).map(|o| o.rect()) else {
            return;
        };
        let delta = current.origin() - cached.origin();
        let owner_contains_target = self.parent(target) == Some(owner);

        for def in &defs {
            let axis = def.axis();
            let d = delta.get(axis);
            if d == 0.0 {
                continue;
            }
            let Some(o) = self.objects.get(owner).map(|o| o.rect()) else {
                return;
            };
            match classify(def.relation_type) {
                Rule::Move { .. } => self.set_axis_start(owner, axis, start_of(o, axis) + d),
                Rule::Extent => {}
                Rule::Extend { mine: Edge::Near, .. } => {
                    let start = start_of(o, axis);
                    self.set_axis_extent(owner, axis, extent_of(o, axis) - d);
                    if !owner_contains_target {
                        self.set_axis_start(owner, axis, start + d);
                    }
                }
                Rule::Extend { .. } => {
                    let start = start_of(o, axis);
                    self.set_axis_extent(owner, axis, extent_of(o, axis) + d);
                    if !owner_contains_target {
                        self.set_axis_start(owner, axis, start);
                    }
                }
            }
        }

        let latest = self.objects.get(target).map(|o| o.rect());
        if let (Some(latest), Some(item)) = (
            latest,
            self.objects.get_mut(owner).and_then(|o| o.relations.item_mut(target)),
        ) {
            item.target_rect.x = latest.x;
            item.target_rect.y = latest.y;
        }
        self.finish_relation_pass(owner, before);
    }

    fn apply_target_size_changed(&mut self, owner: ObjectId, target: ObjectId) {
        let Some((defs, cached, current)) = self.relation_snapshot(owner, target) else {
            return;
        };
        let Some(before) = self.objects.get(owner).map(|o| o.rect()) else {
            return;
        };
        let target_is_parent = self.parent(owner) == Some(target);
        let owner_contains_target = self.parent(target) == Some(owner);

        for def in &defs {
            let axis = def.axis();
            let cached_extent = extent_of(cached, axis);
            let target_extent = extent_of(current, axis);
            if cached_extent == target_extent {
                continue;
            }
            let pos = if target_is_parent { 0.0 } else { start_of(current, axis) };
            let delta = if def.use_percent {
                if cached_extent != 0.0 {
                    target_extent / cached_extent
                } else {
                    1.0
                }
            } else {
                target_extent - cached_extent
            };
            let Some(o) = self.objects.get(owner).map(|o| o.rect()) else {
                return;
            };
            let start = start_of(o, axis);
            let extent = extent_of(o, axis);

            match classify(def.relation_type) {
                Rule::Move { mine, theirs } => {
                    let next = if def.use_percent {
                        let anchor = start + extent * mine.factor();
                        pos + (anchor - pos) * delta - extent * mine.factor()
                    } else {
                        start + delta * theirs.factor()
                    };
                    self.set_axis_start(owner, axis, next);
                }
                Rule::Extent => {
                    let mut v = extent - cached_extent;
                    if def.use_percent {
                        v *= delta;
                    }
                    self.set_axis_extent(owner, axis, target_extent + v);
                }
                Rule::Extend { mine: Edge::Near, theirs } => {
                    let v = if def.use_percent {
                        pos + (start - pos) * delta - start
                    } else {
                        delta * theirs.factor()
                    };
                    self.set_axis_extent(owner, axis, extent - v);
                    self.set_axis_start(owner, axis, start + v);
                }
                Rule::Extend { theirs, .. } => {
                    // A container stretching toward its own child measures in
                    // its own space, where its near edge is 0.
                    let near = if owner_contains_target { 0.0 } else { start };
                    let v = if def.use_percent {
                        pos + (near + extent - pos) * delta - (near + extent)
                    } else {
                        delta * theirs.factor()
                    };
                    self.set_axis_extent(owner, axis, extent + v);
                    if !owner_contains_target {
                        self.set_axis_start(owner, axis, start);
                    }
                }
            }
        }

        let latest = self.objects.get(target).map(|o| o.rect());
        if let (Some(latest), Some(item)) = (
            latest,
            self.objects.get_mut(owner).and_then(|o| o.relations.item_mut(target)),
        ) {
            item.target_rect.width = latest.width;
            item.target_rect.height = latest.height;
        }
        self.finish_relation_pass(owner, before);
    }

    /// The owner resized itself. Rules anchoring a far or centre edge keep
    /// that edge in place.
    pub(crate) fn on_owner_size_changed(&mut self, owner: ObjectId, dw: f32, dh: f32) {
        let Some(obj) = self.objects.get(owner) else {
            return;
        };
        if obj.relations.is_empty() {
            return;
        }
        let before = obj.rect();
        let mut shift_x = None;
        let mut shift_y = None;
        for def in obj.relations.items().iter().flat_map(|i| i.defs()) {
            if let Rule::Move { mine, .. } = classify(def.relation_type) {
                let slot = match def.axis() {
                    Axis::X => &mut shift_x,
                    Axis::Y => &mut shift_y,
                };
                slot.get_or_insert(mine.factor());
            }
        }
        let dx = shift_x.map_or(0.0, |f| f * dw);
        let dy = shift_y.map_or(0.0, |f| f * dh);
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.set_xy(owner, before.x - dx, before.y - dy);
        self.finish_relation_pass(owner, before);
    }

    /// Shift gear-stored values by whatever the rules just did to `owner`.
    fn finish_relation_pass(&mut self, owner: ObjectId, before: Rect) {
        let Some(after) = self.objects.get(owner).map(|o| o.rect()) else {
            return;
        };
        let moved = after.origin() - before.origin();
        if moved != Point::ZERO {
            self.update_gear_from_relations(owner, GearKind::XY, moved);
        }
        let resized = after.size() - before.size();
        if resized.width != 0.0 || resized.height != 0.0 {
            self.update_gear_from_relations(
                owner,
                GearKind::Size,
                Point::new(resized.width, resized.height),
            );
        }
        debug!(?owner, ?before, ?after, "relations applied");
    }

    fn set_axis_start(&mut self, id: ObjectId, axis: Axis, v: f32) {
        match axis {
            Axis::X => self.set_x(id, v),
            Axis::Y => self.set_y(id, v),
        }
    }

    fn set_axis_extent(&mut self, id: ObjectId, axis: Axis, v: f32) {
        match axis {
            Axis::X => self.set_width(id, v),
            Axis::Y => self.set_height(id, v),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
