//! Controller operations on the stage: page edits, selection, broadcast and
//! actions.

use tracing::{debug, trace, warn};

use super::action::{ActionKind, ControllerAction, PageTarget};
use super::page::PageId;
use super::state::{Controller, ControllerId};
use crate::error::ConfigError;
use crate::gear::GearKind;
use crate::stage::{ObjectId, Stage, StageEvent};

impl Stage {
    // ── Configuration ────────────────────────────────────────────────

    /// Attach a new, page-less controller to `container`.
    pub fn add_controller(
        &mut self,
        container: ObjectId,
        name: impl Into<String>,
    ) -> Result<ControllerId, ConfigError> {
        if !self.objects.contains_key(container) {
            return Err(ConfigError::UnknownObject);
        }
        let id = self.controllers.insert(Controller::new(name, container));
        if let Some(entry) = self.container_controllers.entry(container) {
            entry.or_default().push(id);
        }
        Ok(id)
    }

    pub fn controller(&self, id: ControllerId) -> Option<&Controller> {
        self.controllers.get(id)
    }

    /// Controllers attached to `container`, in creation order.
    pub fn controllers_of(&self, container: ObjectId) -> &[ControllerId] {
        self.container_controllers
            .get(container)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn controller_by_name(&self, container: ObjectId, name: &str) -> Option<ControllerId> {
        self.controllers_of(container)
            .iter()
            .copied()
            .find(|&c| self.controllers.get(c).is_some_and(|ctrl| ctrl.name() == name))
    }

    /// Append a page. The first page added becomes selected.
    pub fn add_page(&mut self, controller: ControllerId, name: impl Into<String>) -> Result<PageId, ConfigError> {
        let count = self.controller_ref(controller)?.page_count();
        self.insert_page(controller, count, name)
    }

    /// Insert a page at `index` (clamped to the page count).
    pub fn insert_page(
        &mut self,
        controller: ControllerId,
        index: usize,
        name: impl Into<String>,
    ) -> Result<PageId, ConfigError> {
        let id = self.pages.allocate();
        let ctrl = self.controller_mut(controller)?;
        ctrl.insert_page(index, id, name);
        if ctrl.selected_index().is_none() {
            self.change_page(controller, 0);
        }
        Ok(id)
    }

    /// Remove the page at `index`. The selection is clamped to the remaining
    /// pages and re-broadcast.
    pub fn remove_page_at(&mut self, controller: ControllerId, index: usize) -> Result<(), ConfigError> {
        let ctrl = self.controller_mut(controller)?;
        let count = ctrl.page_count();
        if ctrl.remove_page_at(index).is_none() {
            return Err(ConfigError::PageIndexOutOfRange {
                controller: ctrl.name().to_owned(),
                index,
                count,
            });
        }
        let remaining = ctrl.page_count();
        match ctrl.selected_index() {
            _ if remaining == 0 => ctrl.set_selected_raw(None),
            Some(sel) if sel >= remaining => {
                ctrl.set_selected_raw(Some(remaining - 1));
                self.broadcast_page(controller);
            }
            Some(sel) if sel > index => ctrl.set_selected_raw(Some(sel - 1)),
            _ => self.broadcast_page(controller),
        }
        Ok(())
    }

    /// Remove every page; the selection becomes `None`.
    pub fn clear_pages(&mut self, controller: ControllerId) -> Result<(), ConfigError> {
        self.controller_mut(controller)?.clear_pages();
        Ok(())
    }

    pub fn add_controller_action(
        &mut self,
        controller: ControllerId,
        action: ControllerAction,
    ) -> Result<(), ConfigError> {
        self.controller_mut(controller)?.actions.push(action);
        Ok(())
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select a page by index.
    ///
    /// Selecting the current page is a no-op. A request made while this
    /// controller is broadcasting is deferred until the broadcast finishes;
    /// the last deferred request wins.
    pub fn set_selected_index(&mut self, controller: ControllerId, index: usize) -> Result<(), ConfigError> {
        let ctrl = self.controller_mut(controller)?;
        if index >= ctrl.page_count() {
            return Err(ConfigError::PageIndexOutOfRange {
                controller: ctrl.name().to_owned(),
                index,
                count: ctrl.page_count(),
            });
        }
        if ctrl.changing {
            trace!(controller = ctrl.name(), index, "page change deferred");
            ctrl.pending = Some(index);
            return Ok(());
        }
        if ctrl.selected_index() == Some(index) {
            return Ok(());
        }
        self.change_page(controller, index);
        Ok(())
    }

    /// Select a page by name.
    pub fn set_selected_page(&mut self, controller: ControllerId, name: &str) -> Result<(), ConfigError> {
        let ctrl = self.controller_ref(controller)?;
        let index = ctrl.page_index_by_name(name).ok_or_else(|| ConfigError::UnknownPage {
            controller: ctrl.name().to_owned(),
            page: name.to_owned(),
        })?;
        self.set_selected_index(controller, index)
    }

    /// Select a page by id.
    pub fn set_selected_page_id(&mut self, controller: ControllerId, page: PageId) -> Result<(), ConfigError> {
        let ctrl = self.controller_ref(controller)?;
        let index = ctrl.page_index_by_id(page).ok_or_else(|| ConfigError::UnknownPage {
            controller: ctrl.name().to_owned(),
            page: page.to_string(),
        })?;
        self.set_selected_index(controller, index)
    }

    /// Move the selection without broadcasting; used while a component is
    /// being built.
    pub(crate) fn select_page_silently(&mut self, controller: ControllerId, index: usize) {
        if let Some(ctrl) = self.controllers.get_mut(controller) {
            if index < ctrl.page_count() {
                ctrl.set_selected_raw(Some(index));
            }
        }
    }

    fn change_page(&mut self, controller: ControllerId, index: usize) {
        let mut index = index;
        loop {
            let Some(ctrl) = self.controllers.get_mut(controller) else {
                return;
            };
            if !ctrl.select(index) {
                break;
            }
            debug!(
                controller = ctrl.name(),
                previous = ?ctrl.previous_page(),
                current = ?ctrl.selected_page(),
                "page changed"
            );
            self.broadcast_page(controller);

            let Some(ctrl) = self.controllers.get_mut(controller) else {
                return;
            };
            match ctrl.pending.take() {
                Some(next) if next < ctrl.page_count() => index = next,
                _ => break,
            }
        }
    }

    /// Re-apply the current page to every bound gear, then run actions and
    /// queue a [`StageEvent::PageChanged`].
    fn broadcast_page(&mut self, controller: ControllerId) {
        let Some(ctrl) = self.controllers.get_mut(controller) else {
            return;
        };
        ctrl.changing = true;
        let previous = ctrl.previous_index();
        let current = ctrl.selected_index();
        let (prev_id, cur_id) = (ctrl.previous_page_id(), ctrl.selected_page_id());

        self.apply_controller(controller);
        self.run_controller_actions(controller, prev_id, cur_id);
        self.events.push(StageEvent::PageChanged {
            controller,
            previous,
            current,
        });

        if let Some(ctrl) = self.controllers.get_mut(controller) {
            ctrl.changing = false;
        }
    }

    /// Apply every gear bound to `controller` within the owner's subtree.
    ///
    /// Display gears across the whole subtree settle first so visibility is
    /// final before any property gear starts tweening.
    pub fn apply_controller(&mut self, controller: ControllerId) {
        let Some(owner) = self.controllers.get(controller).map(Controller::owner) else {
            return;
        };
        let subtree = self.walk_depth_first(owner);
        for &obj in &subtree {
            if self.gear_controller(obj, GearKind::Display) == Some(controller) {
                self.apply_gear(obj, GearKind::Display);
            }
        }
        for &obj in &subtree {
            for kind in GearKind::ALL.into_iter().skip(1) {
                if self.gear_controller(obj, kind) == Some(controller) {
                    self.apply_gear(obj, kind);
                }
            }
            self.handle_pane_controller_changed(obj, controller);
        }
    }

    fn run_controller_actions(&mut self, controller: ControllerId, previous: Option<PageId>, current: Option<PageId>) {
        let Some(ctrl) = self.controllers.get(controller) else {
            return;
        };
        if ctrl.actions.is_empty() {
            return;
        }
        let actions = ctrl.actions.clone();
        for action in &actions {
            if action.matches(previous, current) {
                self.enter_action(controller, action);
            } else {
                self.leave_action(controller, action);
            }
        }
    }

    fn enter_action(&mut self, controller: ControllerId, action: &ControllerAction) {
        let Some(ctrl) = self.controllers.get(controller) else {
            return;
        };
        let owner = ctrl.owner();
        match &action.kind {
            ActionKind::PlayTransition {
                transition,
                play_times,
                delay,
                ..
            } => {
                self.events.push(StageEvent::TransitionPlay {
                    object: owner,
                    transition: transition.clone(),
                    play_times: *play_times,
                    delay: *delay,
                });
            }
            ActionKind::ChangePage {
                object,
                controller: other_name,
                target,
            } => {
                let container = match object {
                    Some(name) => match self.find_child(owner, name) {
                        Some(c) => c,
                        None => {
                            warn!(object = %name, "change-page action: no such child");
                            return;
                        }
                    },
                    None => owner,
                };
                let Some(other) = self.controller_by_name(container, other_name) else {
                    warn!(controller = %other_name, "change-page action: no such controller");
                    return;
                };
                if other == controller {
                    return;
                }
                let (Some(source), Some(dest)) = (self.controllers.get(controller), self.controllers.get(other)) else {
                    return;
                };
                if dest.changing {
                    return;
                }
                let index = match target {
                    PageTarget::SameIndex => source.selected_index().filter(|&i| i < dest.page_count()),
                    PageTarget::SameName => source.selected_page().and_then(|n| dest.page_index_by_name(n)),
                    PageTarget::Page(name) => dest.page_index_by_name(name),
                };
                if let Some(index) = index {
                    if let Err(e) = self.set_selected_index(other, index) {
                        warn!(error = %e, "change-page action failed");
                    }
                }
            }
        }
    }

    fn leave_action(&mut self, controller: ControllerId, action: &ControllerAction) {
        if let ActionKind::PlayTransition {
            transition,
            stop_on_exit: true,
            ..
        } = &action.kind
        {
            let Some(owner) = self.controllers.get(controller).map(Controller::owner) else {
                return;
            };
            self.events.push(StageEvent::TransitionStop {
                object: owner,
                transition: transition.clone(),
            });
        }
    }

    fn controller_ref(&self, id: ControllerId) -> Result<&Controller, ConfigError> {
        self.controllers.get(id).ok_or(ConfigError::UnknownController)
    }

    fn controller_mut(&mut self, id: ControllerId) -> Result<&mut Controller, ConfigError> {
        self.controllers.get_mut(id).ok_or(ConfigError::UnknownController)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::ObjectData;
    use pretty_assertions::assert_eq;

    fn setup(pages: &[&str]) -> (Stage, ObjectId, ControllerId) {
        let mut s = Stage::default();
        let root = s.root();
        let comp = s.create_child(root, ObjectData::new("comp"));
        let c = s.add_controller(comp, "c1").unwrap();
        for p in pages {
            s.add_page(c, *p).unwrap();
        }
        s.take_events();
        (s, comp, c)
    }

    fn page_changes(s: &mut Stage) -> Vec<(Option<usize>, Option<usize>)> {
        s.take_events()
            .into_iter()
            .filter_map(|e| match e {
                StageEvent::PageChanged { previous, current, .. } => Some((previous, current)),
                _ => None,
            })
            .collect()
    }

    // ── Pages ────────────────────────────────────────────────────────

    #[test]
    fn first_page_becomes_selected() {
        let (s, _, c) = setup(&["a", "b"]);
        assert_eq!(s.controller(c).unwrap().selected_index(), Some(0));
    }

    #[test]
    fn empty_controller_has_no_selection() {
        let (s, _, c) = setup(&[]);
        assert_eq!(s.controller(c).unwrap().selected_index(), None);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let (mut s, _, c) = setup(&["a", "b"]);
        let err = s.set_selected_index(c, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "page index 2 out of range for controller `c1` with 2 pages"
        );
        assert_eq!(s.controller(c).unwrap().selected_index(), Some(0));
    }

    #[test]
    fn same_index_is_silent() {
        let (mut s, _, c) = setup(&["a", "b"]);
        s.set_selected_index(c, 0).unwrap();
        assert!(page_changes(&mut s).is_empty());
    }

    #[test]
    fn selection_by_name_and_id() {
        let (mut s, _, c) = setup(&["a", "b", "c"]);
        s.set_selected_page(c, "c").unwrap();
        assert_eq!(s.controller(c).unwrap().selected_index(), Some(2));
        let b = s.controller(c).unwrap().page_id(1).unwrap();
        s.set_selected_page_id(c, b).unwrap();
        assert_eq!(s.controller(c).unwrap().previous_page(), Some("c"));
        assert!(matches!(s.set_selected_page(c, "zzz"), Err(ConfigError::UnknownPage { .. })));
    }

    #[test]
    fn removing_selected_last_page_clamps() {
        let (mut s, _, c) = setup(&["a", "b", "c"]);
        s.set_selected_index(c, 2).unwrap();
        s.remove_page_at(c, 2).unwrap();
        assert_eq!(s.controller(c).unwrap().selected_index(), Some(1));
        s.remove_page_at(c, 0).unwrap();
        assert_eq!(s.controller(c).unwrap().selected_page(), Some("b"));
        s.remove_page_at(c, 0).unwrap();
        assert_eq!(s.controller(c).unwrap().selected_index(), None);
    }

    #[test]
    fn page_ids_unique_across_controllers() {
        let (mut s, comp, c) = setup(&["a", "b"]);
        let c2 = s.add_controller(comp, "c2").unwrap();
        let x = s.add_page(c2, "a").unwrap();
        let ids: Vec<PageId> = s.controller(c).unwrap().pages().iter().map(|p| p.id).collect();
        assert!(!ids.contains(&x));
    }

    #[test]
    fn controller_lookup_by_name() {
        let (s, comp, c) = setup(&["a"]);
        assert_eq!(s.controller_by_name(comp, "c1"), Some(c));
        assert_eq!(s.controller_by_name(comp, "nope"), None);
    }

    // ── Actions ──────────────────────────────────────────────────────

    #[test]
    fn change_page_action_drives_other_controller() {
        let (mut s, comp, c) = setup(&["a", "b"]);
        let c2 = s.add_controller(comp, "c2").unwrap();
        s.add_page(c2, "x").unwrap();
        s.add_page(c2, "y").unwrap();
        s.add_controller_action(
            c,
            ControllerAction::new(ActionKind::ChangePage {
                object: None,
                controller: "c2".into(),
                target: PageTarget::SameIndex,
            }),
        )
        .unwrap();
        s.set_selected_index(c, 1).unwrap();
        assert_eq!(s.controller(c2).unwrap().selected_page(), Some("y"));
    }

    #[test]
    fn mutual_actions_do_not_loop() {
        let (mut s, comp, c) = setup(&["a", "b"]);
        let c2 = s.add_controller(comp, "c2").unwrap();
        s.add_page(c2, "a").unwrap();
        s.add_page(c2, "b").unwrap();
        for (from, to) in [(c, "c2"), (c2, "c1")] {
            s.add_controller_action(
                from,
                ControllerAction::new(ActionKind::ChangePage {
                    object: None,
                    controller: to.into(),
                    target: PageTarget::SameName,
                }),
            )
            .unwrap();
        }
        s.set_selected_index(c, 1).unwrap();
        assert_eq!(s.controller(c).unwrap().selected_index(), Some(1));
        assert_eq!(s.controller(c2).unwrap().selected_index(), Some(1));
    }

    #[test]
    fn transition_actions_emit_events() {
        let (mut s, comp, c) = setup(&["a", "b"]);
        let b = s.controller(c).unwrap().page_id(1).unwrap();
        s.add_controller_action(
            c,
            ControllerAction::new(ActionKind::PlayTransition {
                transition: "t0".into(),
                play_times: 1,
                delay: 0.0,
                stop_on_exit: true,
            })
            .to_pages([b]),
        )
        .unwrap();
        s.set_selected_index(c, 1).unwrap();
        s.set_selected_index(c, 0).unwrap();
        let transitions: Vec<StageEvent> = s
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, StageEvent::TransitionPlay { .. } | StageEvent::TransitionStop { .. }))
            .collect();
        assert_eq!(
            transitions,
            vec![
                StageEvent::TransitionPlay {
                    object: comp,
                    transition: "t0".into(),
                    play_times: 1,
                    delay: 0.0
                },
                StageEvent::TransitionStop {
                    object: comp,
                    transition: "t0".into()
                },
            ]
        );
    }

    #[test]
    fn page_changed_reports_indices() {
        let (mut s, _, c) = setup(&["a", "b", "c"]);
        s.set_selected_index(c, 2).unwrap();
        s.set_selected_index(c, 1).unwrap();
        assert_eq!(page_changes(&mut s), vec![(Some(0), Some(2)), (Some(2), Some(1))]);
    }
}
