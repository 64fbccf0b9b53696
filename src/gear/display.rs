//! Display gear: page-driven visibility with tween locks.
//!
//! The display gear shows its object on a set of pages. Property gears that
//! share its controller take a lock while they tween so an object leaving
//! its visible pages stays shown until the tween ends. Locks are tagged with
//! the apply they were taken under; a later apply voids them.

use super::{Gear, GearKind};
use crate::controller::{ControllerId, PageId};
use crate::error::ConfigError;
use crate::stage::{ObjectId, Stage};

impl Stage {
    /// Set the pages on which `owner` is shown. Empty means every page.
    pub fn set_display_pages(
        &mut self,
        owner: ObjectId,
        pages: impl IntoIterator<Item = PageId>,
    ) -> Result<(), ConfigError> {
        let gear = self
            .gear_mut(owner, GearKind::Display)
            .ok_or(ConfigError::NoGear(GearKind::Display))?;
        gear.pages = pages.into_iter().collect();
        Ok(())
    }

    pub(crate) fn apply_display_gear(&mut self, owner: ObjectId, page: Option<PageId>) {
        let Some(gear) = self.gear_mut(owner, GearKind::Display) else {
            return;
        };
        gear.flag = gear.flag.wrapping_add(1);
        let listed = gear.pages.is_empty() || page.is_some_and(|p| gear.pages.contains(&p));
        gear.visible_count = u32::from(listed);
        self.check_gear_display(owner);
    }

    /// Hold `owner` visible regardless of page. Returns a token for
    /// [`release_display_lock`](Self::release_display_lock), or `None` when
    /// the object has no display gear.
    pub fn add_display_lock(&mut self, owner: ObjectId) -> Option<u32> {
        let gear = self.gear_mut(owner, GearKind::Display)?;
        gear.visible_count += 1;
        let token = gear.flag;
        self.check_gear_display(owner);
        Some(token)
    }

    /// Release a lock. Tokens from an earlier apply are ignored.
    pub fn release_display_lock(&mut self, owner: ObjectId, token: u32) {
        let Some(gear) = self.gear_mut(owner, GearKind::Display) else {
            return;
        };
        if gear.flag == token && gear.visible_count > 0 {
            gear.visible_count -= 1;
        }
        self.check_gear_display(owner);
    }

    pub(crate) fn display_lock_valid(&self, owner: ObjectId, token: u32) -> bool {
        self.gear(owner, GearKind::Display).is_some_and(|g| g.flag == token)
    }

    /// Take a lock only when the display gear is driven by `controller`.
    pub(crate) fn lock_display_for(&mut self, owner: ObjectId, controller: ControllerId) -> Option<u32> {
        if self.gear_controller(owner, GearKind::Display) == Some(controller) {
            self.add_display_lock(owner)
        } else {
            None
        }
    }

    /// Sync the object's internal visibility with its display gear.
    pub(crate) fn check_gear_display(&mut self, owner: ObjectId) {
        let connected = self.gear(owner, GearKind::Display).map_or(true, Gear::connected);
        self.set_internal_visible(owner, connected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gear::TweenConfig;
    use crate::stage::ObjectData;
    use crate::tween::EaseType;

    fn setup() -> (Stage, ControllerId, ObjectId, [PageId; 2]) {
        let mut s = Stage::default();
        let root = s.root();
        let comp = s.create_child(root, ObjectData::new("comp"));
        let obj = s.create_child(comp, ObjectData::new("a"));
        let c = s.add_controller(comp, "c1").unwrap();
        let pages = [s.add_page(c, "show").unwrap(), s.add_page(c, "hide").unwrap()];
        s.set_gear(obj, GearKind::Display, Some(c)).unwrap();
        s.set_display_pages(obj, [pages[0]]).unwrap();
        (s, c, obj, pages)
    }

    fn shown(s: &Stage, id: ObjectId) -> bool {
        s.get(id).unwrap().is_displayed()
    }

    #[test]
    fn visibility_follows_pages() {
        let (mut s, c, obj, _) = setup();
        s.set_selected_index(c, 1).unwrap();
        assert!(!shown(&s, obj));
        s.set_selected_index(c, 0).unwrap();
        assert!(shown(&s, obj));
    }

    #[test]
    fn lock_keeps_object_visible() {
        let (mut s, c, obj, _) = setup();
        let token = s.add_display_lock(obj).unwrap();
        s.apply_gear(obj, GearKind::Display);
        // A fresh apply voids the earlier token.
        assert!(!s.display_lock_valid(obj, token));
        s.set_selected_index(c, 1).unwrap();
        let token = s.add_display_lock(obj).unwrap();
        assert!(shown(&s, obj));
        s.release_display_lock(obj, token);
        assert!(!shown(&s, obj));
    }

    #[test]
    fn stale_token_release_is_ignored() {
        let (mut s, c, obj, _) = setup();
        let stale = s.add_display_lock(obj).unwrap();
        s.set_selected_index(c, 1).unwrap();
        s.set_selected_index(c, 0).unwrap();
        s.release_display_lock(obj, stale);
        assert!(shown(&s, obj));
    }

    #[test]
    fn tweening_gear_holds_object_visible_until_done() {
        let (mut s, c, obj, pages) = setup();
        s.set_gear(obj, GearKind::XY, Some(c)).unwrap();
        s.set_gear_tween(
            obj,
            GearKind::XY,
            TweenConfig::enabled().with_ease(EaseType::Linear).with_duration(0.5),
        )
        .unwrap();
        s.add_gear_status(obj, GearKind::XY, Some(pages[1]), "80,0").unwrap();
        s.set_selected_index(c, 1).unwrap();
        assert!(shown(&s, obj));
        s.tick(0.25);
        assert!(shown(&s, obj));
        s.tick(0.25);
        assert!(!shown(&s, obj));
    }

    #[test]
    fn unbound_display_gear_shows() {
        let (mut s, _, obj, _) = setup();
        s.set_gear(obj, GearKind::Display, None).unwrap();
        s.check_gear_display(obj);
        assert!(shown(&s, obj));
    }
}
