//! The stage: object arena, tree operations, and the frame loop.
//!
//! Every object, controller, scroll pane and list lives in one [`Stage`].
//! Objects refer to each other only by [`ObjectId`]; the stage owns the
//! parent/child links and the reverse index of relation listeners, so no
//! object ever holds a reference to another.

pub mod event;
pub mod geometry;
pub mod object;

use std::fmt;

use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, trace};

pub use event::{EventQueue, StageEvent};
pub use object::{AnimationState, Capabilities, Color, ObjectData, ObjectId};

use crate::config::StageConfig;
use crate::controller::{Controller, ControllerId, PageIdAllocator};
use crate::list::{ListState, ObjectFactory};
use crate::scroll::ScrollPane;
use crate::tween::{TweenTarget, Tweener};

/// Empty slice constant for returning when an object has no children.
const EMPTY_CHILDREN: &[ObjectId] = &[];

/// Upper bound on validate passes per call; later dirt waits for the next frame.
const MAX_VALIDATE_PASSES: usize = 8;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The retained object tree plus everything attached to it.
pub struct Stage {
    pub(crate) objects: SlotMap<ObjectId, ObjectData>,
    children: SecondaryMap<ObjectId, Vec<ObjectId>>,
    parent: SecondaryMap<ObjectId, ObjectId>,
    /// Reverse relation index: target -> owners holding an item against it.
    pub(crate) dependents: SecondaryMap<ObjectId, Vec<ObjectId>>,
    pub(crate) controllers: SlotMap<ControllerId, Controller>,
    pub(crate) container_controllers: SecondaryMap<ObjectId, Vec<ControllerId>>,
    pub(crate) panes: SecondaryMap<ObjectId, ScrollPane>,
    pub(crate) lists: SecondaryMap<ObjectId, ListState>,
    /// Containers whose content bounds must be recomputed.
    dirty_bounds: Vec<ObjectId>,
    pub(crate) tweens: Tweener,
    pub(crate) pages: PageIdAllocator,
    /// Relation owners currently being processed.
    pub(crate) dealing: Vec<ObjectId>,
    pub(crate) events: EventQueue,
    pub(crate) config: StageConfig,
    pub(crate) clock: f64,
    /// Depth of descriptor builds in progress.
    pub(crate) constructing: u32,
    pub(crate) factory: Option<Box<dyn ObjectFactory>>,
    root: ObjectId,
}

impl Stage {
    /// Create a stage with an empty root object.
    pub fn new(config: StageConfig) -> Self {
        let mut objects = SlotMap::with_key();
        let root = objects.insert(ObjectData::new("root"));
        let mut children = SecondaryMap::new();
        children.insert(root, Vec::new());
        Self {
            objects,
            children,
            parent: SecondaryMap::new(),
            dependents: SecondaryMap::new(),
            controllers: SlotMap::with_key(),
            container_controllers: SecondaryMap::new(),
            panes: SecondaryMap::new(),
            lists: SecondaryMap::new(),
            dirty_bounds: Vec::new(),
            tweens: Tweener::new(),
            pages: PageIdAllocator::new(),
            dealing: Vec::new(),
            events: EventQueue::new(),
            config,
            clock: 0.0,
            constructing: 0,
            factory: None,
            root,
        }
    }

    /// The root object. It is never disposed.
    pub fn root(&self) -> ObjectId {
        self.root
    }

    /// The stage's tunables.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Mutable tunables. Changes apply from the next operation that reads them.
    pub fn config_mut(&mut self) -> &mut StageConfig {
        &mut self.config
    }

    /// Seconds elapsed across all ticks.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// The page id allocator shared by every controller on this stage.
    pub fn page_ids(&mut self) -> &mut PageIdAllocator {
        &mut self.pages
    }

    /// Install the factory used to create list items by resource url.
    pub fn set_object_factory(&mut self, factory: impl ObjectFactory + 'static) {
        self.factory = Some(Box::new(factory));
    }

    // ── Objects ──────────────────────────────────────────────────────

    /// Insert a detached object (no parent).
    pub fn create_object(&mut self, data: ObjectData) -> ObjectId {
        let id = self.objects.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert an object as the last child of `parent`.
    pub fn create_child(&mut self, parent: ObjectId, data: ObjectData) -> ObjectId {
        let id = self.create_object(data);
        self.add_child(parent, id);
        id
    }

    /// Attach `child` as the last child of `parent`, detaching it from any
    /// previous parent. Refuses to create a cycle.
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) {
        if !self.objects.contains_key(parent)
            || !self.objects.contains_key(child)
            || parent == child
            || self.is_ancestor_of(child, parent)
        {
            debug!(?parent, ?child, "add_child ignored");
            return;
        }
        self.detach(child);
        self.parent.insert(child, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(child);
        }
        self.set_bounds_changed(parent);
    }

    /// Detach `child` from its parent without disposing it.
    pub fn remove_child(&mut self, child: ObjectId) {
        self.detach(child);
    }

    fn detach(&mut self, id: ObjectId) {
        if let Some(old) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(old) {
                siblings.retain(|&c| c != id);
            }
            self.set_bounds_changed(old);
        }
    }

    /// Read an object.
    pub fn get(&self, id: ObjectId) -> Option<&ObjectData> {
        self.objects.get(id)
    }

    /// Whether `id` refers to a live object.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Number of live objects, root and pooled items included.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Always `false`: the root exists for the stage's lifetime.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The object's parent, `None` for the root and for detached objects.
    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.parent.get(id).copied()
    }

    /// Children in display order.
    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.children.get(id).map_or(EMPTY_CHILDREN, Vec::as_slice)
    }

    pub(crate) fn set_children_order(&mut self, id: ObjectId, order: Vec<ObjectId>) {
        if let Some(kids) = self.children.get_mut(id) {
            *kids = order;
        }
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor_of(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// First direct child of `parent` with the given name.
    pub fn find_child(&self, parent: ObjectId, name: &str) -> Option<ObjectId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.objects.get(c).is_some_and(|o| o.name == name))
    }

    /// `start` and all its descendants, depth-first pre-order.
    pub fn walk_depth_first(&self, start: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        if !self.objects.contains_key(start) {
            return out;
        }
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.children(id).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Dispose an object and its whole subtree.
    ///
    /// Relations held by or against disposed objects are dropped, their
    /// controllers, panes and lists go away, and running gear tweens are
    /// killed. Gears elsewhere that were bound to a disposed controller
    /// become inert.
    pub fn dispose(&mut self, id: ObjectId) {
        if id == self.root || !self.objects.contains_key(id) {
            return;
        }
        self.detach(id);
        let subtree = self.walk_depth_first(id);
        for &obj in &subtree {
            self.kill_gear_tweens(obj);
            self.detach_relations(obj);
            if let Some(ids) = self.container_controllers.remove(obj) {
                for c in ids {
                    self.controllers.remove(c);
                }
            }
            self.panes.remove(obj);
            if let Some(mut list) = self.lists.remove(obj) {
                for pooled in list.pool.clear() {
                    self.dispose(pooled);
                }
            }
        }
        for obj in subtree {
            self.children.remove(obj);
            self.parent.remove(obj);
            self.objects.remove(obj);
        }
        self.dirty_bounds.retain(|d| self.objects.contains_key(*d));
        trace!(?id, "disposed");
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Drain every pending event, oldest first.
    pub fn take_events(&mut self) -> Vec<StageEvent> {
        self.events.drain()
    }

    /// The pending event queue.
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    // ── Frame loop ───────────────────────────────────────────────────

    /// Advance one frame: clock, gear tweens, scroll tweens, then validate.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.clock += f64::from(dt);
        for sample in self.tweens.advance(dt) {
            match sample.target {
                TweenTarget::Gear { object, kind } => {
                    self.on_gear_tween_sample(object, kind, sample.id, sample.value, sample.finished)
                }
            }
        }
        self.advance_scroll_panes(dt);
        self.validate();
    }

    /// Whether a gear tween or a scroll tween is still running.
    pub fn is_animating(&self) -> bool {
        !self.tweens.is_empty() || self.panes.values().any(|p| p.is_tweening())
    }

    /// Mark a container's content bounds as stale.
    pub(crate) fn set_bounds_changed(&mut self, id: ObjectId) {
        if self.objects.contains_key(id) && !self.dirty_bounds.contains(&id) {
            self.dirty_bounds.push(id);
        }
    }

    /// Whether any container is waiting for [`validate`](Self::validate).
    pub fn needs_validate(&self) -> bool {
        !self.dirty_bounds.is_empty()
    }

    /// Recompute stale content bounds and refresh dirty lists.
    ///
    /// A list is refreshed at most once per call; anything it dirties again
    /// waits for the next call.
    pub fn validate(&mut self) {
        let mut done: Vec<ObjectId> = Vec::new();
        for _ in 0..MAX_VALIDATE_PASSES {
            let pending: Vec<ObjectId> = std::mem::take(&mut self.dirty_bounds);
            let (now, later): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(|id| !done.contains(id));
            self.dirty_bounds.extend(later);
            if now.is_empty() {
                break;
            }
            for id in now {
                done.push(id);
                self.update_bounds(id);
            }
        }
    }

    fn update_bounds(&mut self, id: ObjectId) {
        if self.lists.contains_key(id) {
            self.refresh_list_pass(id);
        } else if self.panes.contains_key(id) {
            let bounds = self.children_bounds(id);
            self.set_content_size(id, bounds.size());
        }
    }

    /// Union of the displayed children's rects, anchored at the origin.
    pub(crate) fn children_bounds(&self, id: ObjectId) -> crate::geometry::Rect {
        use crate::geometry::Rect;
        self.children(id)
            .iter()
            .filter_map(|&c| self.objects.get(c))
            .filter(|o| o.is_displayed())
            .fold(Rect::EMPTY, |acc, o| acc.union(Rect::new(0.0, 0.0, o.x + o.width, o.y + o.height)))
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(StageConfig::default())
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("objects", &self.objects.len())
            .field("controllers", &self.controllers.len())
            .field("panes", &self.panes.len())
            .field("lists", &self.lists.len())
            .field("tweens", &self.tweens.len())
            .field("clock", &self.clock)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
