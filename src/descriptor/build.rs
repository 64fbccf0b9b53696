//! Building a component from its descriptor.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::model::{ComponentDescriptor, ControllerDescriptor, ObjectDescriptor, RelationTarget};
use super::parser::parse_relation_list;
use crate::controller::{ControllerAction, ControllerId, PageId};
use crate::error::ConfigError;
use crate::gear::GearKind;
use crate::stage::{ObjectData, ObjectId, Stage};

/// Controllers declared by one component, with their descriptor page ids.
#[derive(Default)]
struct Scope {
    controllers: HashMap<String, (ControllerId, HashMap<String, PageId>)>,
}

impl Scope {
    fn controller(&self, name: &str) -> Result<(ControllerId, &HashMap<String, PageId>), ConfigError> {
        self.controllers
            .get(name)
            .map(|(c, pages)| (*c, pages))
            .ok_or(ConfigError::UnknownController)
    }
}

fn page_of(
    stage: &Stage,
    controller: ControllerId,
    pages: &HashMap<String, PageId>,
    local: &str,
) -> Result<PageId, ConfigError> {
    pages.get(local).copied().ok_or_else(|| ConfigError::UnknownPage {
        controller: stage
            .controller(controller)
            .map(|c| c.name().to_owned())
            .unwrap_or_default(),
        page: local.to_owned(),
    })
}

impl Stage {
    /// Build a component under `parent` and return its root object.
    ///
    /// Gears apply their initial pages without tweening. On error nothing is
    /// left behind: the partially built component is disposed.
    pub fn build(&mut self, parent: ObjectId, desc: &ComponentDescriptor) -> Result<ObjectId, ConfigError> {
        if !self.objects.contains_key(parent) {
            return Err(ConfigError::UnknownObject);
        }
        let root = self.create_object(
            ObjectData::new(desc.name.as_str()).with_size(desc.size.width, desc.size.height),
        );
        self.constructing += 1;
        let mut built = Vec::new();
        let result = self.build_component(root, desc, &mut built);
        if result.is_ok() {
            for c in built {
                self.apply_controller(c);
            }
        }
        self.constructing -= 1;

        if let Err(e) = result {
            warn!(component = %desc.name, error = %e, "component build failed");
            self.dispose(root);
            return Err(e);
        }
        for id in self.walk_depth_first(root) {
            if let Some(obj) = self.objects.get_mut(id) {
                obj.under_construct = false;
            }
        }
        self.add_child(parent, root);
        debug!(component = %desc.name, objects = self.walk_depth_first(root).len(), "component built");
        Ok(root)
    }

    fn build_component(
        &mut self,
        root: ObjectId,
        desc: &ComponentDescriptor,
        built: &mut Vec<ControllerId>,
    ) -> Result<(), ConfigError> {
        if let Some(obj) = self.objects.get_mut(root) {
            obj.under_construct = true;
        }

        let mut scope = Scope::default();
        for cd in &desc.controllers {
            let (id, pages) = self.build_controller(root, cd)?;
            scope.controllers.insert(cd.name.clone(), (id, pages));
            built.push(id);
        }
        for cd in &desc.controllers {
            self.build_actions(&scope, cd)?;
        }

        let mut children = Vec::with_capacity(desc.children.len());
        for od in &desc.children {
            let id = self.build_object(root, od, built)?;
            children.push(id);
        }
        for (od, &id) in desc.children.iter().zip(&children) {
            self.build_relations(root, id, od)?;
            self.build_gears(&scope, id, od)?;
        }

        if let Some(options) = &desc.scroll {
            self.set_scroll_pane(root, options.clone())?;
        }
        Ok(())
    }

    fn build_controller(
        &mut self,
        root: ObjectId,
        cd: &ControllerDescriptor,
    ) -> Result<(ControllerId, HashMap<String, PageId>), ConfigError> {
        let id = self.add_controller(root, cd.name.as_str())?;
        let mut pages = HashMap::with_capacity(cd.pages.len());
        for (i, page) in cd.pages.iter().enumerate() {
            let page_id = self.pages.allocate();
            if let Some(ctrl) = self.controllers.get_mut(id) {
                ctrl.insert_page(i, page_id, page.name.as_str());
            }
            pages.insert(page.id.clone(), page_id);
        }
        if !cd.pages.is_empty() {
            if cd.selected >= cd.pages.len() {
                return Err(ConfigError::PageIndexOutOfRange {
                    controller: cd.name.clone(),
                    index: cd.selected,
                    count: cd.pages.len(),
                });
            }
            self.select_page_silently(id, cd.selected);
        }
        Ok((id, pages))
    }

    fn build_actions(&mut self, scope: &Scope, cd: &ControllerDescriptor) -> Result<(), ConfigError> {
        let (id, pages) = scope.controller(&cd.name)?;
        for ad in &cd.actions {
            let map = |locals: &[String]| -> Result<Vec<PageId>, ConfigError> {
                locals.iter().map(|p| page_of(self, id, pages, p)).collect()
            };
            let action = ControllerAction::new(ad.kind.clone())
                .from_pages(map(&ad.from_pages)?)
                .to_pages(map(&ad.to_pages)?);
            self.add_controller_action(id, action)?;
        }
        Ok(())
    }

    fn build_object(
        &mut self,
        root: ObjectId,
        od: &ObjectDescriptor,
        built: &mut Vec<ControllerId>,
    ) -> Result<ObjectId, ConfigError> {
        let (mut width, mut height) = (od.width, od.height);
        if let Some(comp) = &od.component {
            if width == 0.0 && height == 0.0 {
                width = comp.size.width;
                height = comp.size.height;
            }
        }
        let mut data = ObjectData::new(od.name.as_str())
            .with_position(od.x, od.y)
            .with_size(width, height);
        data.resource_url = od.resource_url.clone();
        data.caps = od.caps.clone();
        data.under_construct = true;
        let id = self.create_child(root, data);
        if !od.visible {
            self.set_visible(id, false);
        }
        if let Some(comp) = &od.component {
            self.build_component(id, comp, built)?;
        }
        if let Some(options) = &od.list {
            self.make_list(id, options.clone())?;
        }
        Ok(id)
    }

    fn build_relations(&mut self, root: ObjectId, id: ObjectId, od: &ObjectDescriptor) -> Result<(), ConfigError> {
        for rd in &od.relations {
            let target = match &rd.target {
                RelationTarget::Parent => root,
                RelationTarget::Sibling(name) => {
                    self.find_child(root, name).ok_or_else(|| ConfigError::UnknownChild {
                        object: self.objects.get(root).map(|o| o.name.clone()).unwrap_or_default(),
                        name: name.clone(),
                    })?
                }
            };
            let defs = parse_relation_list(&rd.defs)?;
            self.add_relations(id, target, &defs)?;
        }
        Ok(())
    }

    fn build_gears(&mut self, scope: &Scope, id: ObjectId, od: &ObjectDescriptor) -> Result<(), ConfigError> {
        for gd in &od.gears {
            let (controller, pages) = scope.controller(&gd.controller)?;
            self.set_gear(id, gd.kind, Some(controller))?;
            if gd.kind == GearKind::Display {
                let shown = gd
                    .pages
                    .iter()
                    .map(|p| page_of(self, controller, pages, p))
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_display_pages(id, shown)?;
                continue;
            }
            for (page, value) in &gd.values {
                let page = page_of(self, controller, pages, page)?;
                self.add_gear_status(id, gd.kind, Some(page), value)?;
            }
            if let Some(value) = &gd.default {
                self.add_gear_status(id, gd.kind, None, value)?;
            }
            if let Some(tween) = gd.tween {
                self.set_gear_tween(id, gd.kind, tween)?;
            }
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ActionKind;
    use crate::descriptor::model::{ActionDescriptor, GearDescriptor};
    use crate::descriptor::parser::ParseError;
    use crate::geometry::{Point, Rect};
    use crate::gear::TweenConfig;
    use crate::stage::{Capabilities, StageEvent};
    use pretty_assertions::assert_eq;

    fn panel() -> ComponentDescriptor {
        ComponentDescriptor::new("panel")
            .with_size(400.0, 300.0)
            .with_controller(
                ControllerDescriptor::new("state")
                    .page("0", "closed")
                    .page("1", "open")
                    .selected(1),
            )
            .with_child(
                ObjectDescriptor::new("bg")
                    .sized(400.0, 300.0)
                    .relation(RelationTarget::Parent, "size"),
            )
            .with_child(
                ObjectDescriptor::new("close")
                    .at(370.0, 10.0)
                    .sized(20.0, 20.0)
                    .relation(RelationTarget::Sibling("bg".into()), "right-right")
                    .gear(GearDescriptor::new(GearKind::Display, "state").pages(["1"])),
            )
            .with_child(
                ObjectDescriptor::new("title")
                    .sized(100.0, 20.0)
                    .caps(Capabilities {
                        text: Some("Panel".into()),
                        ..Capabilities::default()
                    })
                    .gear(
                        GearDescriptor::new(GearKind::XY, "state")
                            .value("0", "-")
                            .value("1", "10,40")
                            .tween(TweenConfig::enabled()),
                    ),
            )
    }

    fn child(s: &Stage, comp: ObjectId, name: &str) -> ObjectId {
        s.find_child(comp, name).unwrap()
    }

    // ── Structure ────────────────────────────────────────────────────

    #[test]
    fn builds_tree_and_controllers() {
        let mut s = Stage::default();
        let comp = s.build(s.root(), &panel()).unwrap();
        assert_eq!(s.parent(comp), Some(s.root()));
        assert_eq!(s.children(comp).len(), 3);
        let c = s.controller_by_name(comp, "state").unwrap();
        assert_eq!(s.controller(c).unwrap().selected_page(), Some("open"));
        assert_eq!(s.get(comp).unwrap().rect(), Rect::new(0.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn initial_page_applies_without_tween() {
        let mut s = Stage::default();
        let comp = s.build(s.root(), &panel()).unwrap();
        let title = child(&s, comp, "title");
        assert_eq!(s.get(title).unwrap().position(), Point::new(10.0, 40.0));
        assert!(!s.gear(title, GearKind::XY).unwrap().is_tweening());
        // Sentinel page falls back to the captured default.
        let c = s.controller_by_name(comp, "state").unwrap();
        s.config_mut().gear_tweens = false;
        s.set_selected_index(c, 0).unwrap();
        assert_eq!(s.get(title).unwrap().position(), Point::ZERO);
    }

    #[test]
    fn no_events_while_building() {
        let mut s = Stage::default();
        s.build(s.root(), &panel()).unwrap();
        assert!(!s
            .take_events()
            .iter()
            .any(|e| matches!(e, StageEvent::PageChanged { .. })));
    }

    #[test]
    fn relations_follow_component() {
        let mut s = Stage::default();
        let comp = s.build(s.root(), &panel()).unwrap();
        s.set_size(comp, 500.0, 300.0);
        let bg = child(&s, comp, "bg");
        let close = child(&s, comp, "close");
        assert_eq!(s.get(bg).unwrap().width(), 500.0);
        assert_eq!(s.get(close).unwrap().x(), 470.0);
    }

    #[test]
    fn display_gear_from_descriptor() {
        let mut s = Stage::default();
        let comp = s.build(s.root(), &panel()).unwrap();
        let close = child(&s, comp, "close");
        let c = s.controller_by_name(comp, "state").unwrap();
        assert!(s.get(close).unwrap().is_displayed());
        s.set_selected_index(c, 0).unwrap();
        assert!(!s.get(close).unwrap().is_displayed());
    }

    #[test]
    fn actions_map_descriptor_pages() {
        let desc = ComponentDescriptor::new("c").with_controller(
            ControllerDescriptor::new("c1").page("a", "one").page("b", "two").action(ActionDescriptor {
                from_pages: vec![],
                to_pages: vec!["b".into()],
                kind: ActionKind::PlayTransition {
                    transition: "t0".into(),
                    play_times: 1,
                    delay: 0.0,
                    stop_on_exit: false,
                },
            }),
        );
        let mut s = Stage::default();
        let comp = s.build(s.root(), &desc).unwrap();
        let c = s.controller_by_name(comp, "c1").unwrap();
        s.set_selected_index(c, 1).unwrap();
        assert!(s
            .take_events()
            .iter()
            .any(|e| matches!(e, StageEvent::TransitionPlay { transition, .. } if transition == "t0")));
    }

    // ── Failures ─────────────────────────────────────────────────────

    #[test]
    fn duplicate_relation_rejects_whole_build() {
        let desc = ComponentDescriptor::new("c").with_child(
            ObjectDescriptor::new("a").relation(RelationTarget::Parent, "left-left,left-left"),
        );
        let mut s = Stage::default();
        let before = s.len();
        let err = s.build(s.root(), &desc).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRelation(_)));
        assert_eq!(s.len(), before);
        assert!(s.children(s.root()).is_empty());
    }

    #[test]
    fn bad_value_reports_parse_error() {
        let desc = ComponentDescriptor::new("c")
            .with_controller(ControllerDescriptor::new("c1").page("0", "a"))
            .with_child(
                ObjectDescriptor::new("a").gear(GearDescriptor::new(GearKind::XY, "c1").value("0", "1,x")),
            );
        let mut s = Stage::default();
        let err = s.build(s.root(), &desc).unwrap_err();
        assert!(matches!(err, ConfigError::Descriptor(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn unknown_sibling_and_page() {
        let mut s = Stage::default();
        let desc = ComponentDescriptor::new("c")
            .with_child(ObjectDescriptor::new("a").relation(RelationTarget::Sibling("zz".into()), "left-left"));
        assert!(matches!(s.build(s.root(), &desc), Err(ConfigError::UnknownChild { .. })));

        let desc = ComponentDescriptor::new("c")
            .with_controller(ControllerDescriptor::new("c1").page("0", "a"))
            .with_child(
                ObjectDescriptor::new("a").gear(GearDescriptor::new(GearKind::Display, "c1").pages(["9"])),
            );
        assert!(matches!(s.build(s.root(), &desc), Err(ConfigError::UnknownPage { .. })));
    }

    #[test]
    fn nested_component_scopes_controllers() {
        let inner = ComponentDescriptor::new("inner")
            .with_size(50.0, 50.0)
            .with_controller(ControllerDescriptor::new("c1").page("0", "x").page("1", "y"))
            .with_child(ObjectDescriptor::new("dot").gear(GearDescriptor::new(GearKind::Display, "c1").pages(["1"])));
        let outer = ComponentDescriptor::new("outer")
            .with_controller(ControllerDescriptor::new("c1").page("0", "p"))
            .with_child(ObjectDescriptor::new("inner").component(inner));
        let mut s = Stage::default();
        let comp = s.build(s.root(), &outer).unwrap();
        let inner = child(&s, comp, "inner");
        let dot = child(&s, inner, "dot");
        assert_eq!(s.get(inner).unwrap().width(), 50.0);
        assert!(!s.get(dot).unwrap().is_displayed());
        let c = s.controller_by_name(inner, "c1").unwrap();
        s.set_selected_index(c, 1).unwrap();
        assert!(s.get(dot).unwrap().is_displayed());
    }
}
