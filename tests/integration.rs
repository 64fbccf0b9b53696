//! Integration tests for stagecraft.
//!
//! These tests exercise the public API from outside the crate: relations,
//! gears and controllers, scroll panes and virtual lists working together on
//! one stage.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use stagecraft::descriptor::{
    ComponentDescriptor, ControllerDescriptor, GearDescriptor, ObjectDescriptor, RelationTarget,
};
use stagecraft::gear::GearKind;
use stagecraft::geometry::Point;
use stagecraft::list::{ListLayout, ListOptions, SelectionMode};
use stagecraft::relation::RelationType;
use stagecraft::scroll::{ScrollOptions, ScrollType};
use stagecraft::testing::{outline, Pilot};
use stagecraft::{ObjectData, ObjectId, Stage, StageConfig, StageEvent};

const ROW: &str = "ui://row";

fn rows(url: &str) -> Option<ObjectData> {
    (url == ROW).then(|| ObjectData::new("row").with_size(100.0, 30.0).selectable())
}

fn pos(stage: &Stage, id: ObjectId) -> Point {
    stage.get(id).unwrap().position()
}

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

#[test]
fn relation_chain_composes_rules() {
    let mut stage = Stage::default();
    let root = stage.root();
    let c = stage.create_child(root, ObjectData::new("c").with_size(100.0, 50.0));
    let b = stage.create_child(
        root,
        ObjectData::new("b").with_position(0.0, 60.0).with_size(100.0, 20.0),
    );
    let a = stage.create_child(
        root,
        ObjectData::new("a").with_position(110.0, 60.0).with_size(40.0, 20.0),
    );
    stage.add_relation(b, c, RelationType::Width, false).unwrap();
    stage.add_relation(a, b, RelationType::LeftRight, false).unwrap();

    stage.set_size(c, 130.0, 70.0);

    assert_eq!(stage.get(b).unwrap().width(), 130.0);
    assert_eq!(pos(&stage, a), Point::new(140.0, 60.0));
}

#[test]
fn self_relation_is_rejected_without_side_effects() {
    let mut stage = Stage::default();
    let root = stage.root();
    let a = stage.create_child(root, ObjectData::new("a"));
    assert!(stage.add_relation(a, a, RelationType::LeftLeft, false).is_err());
    assert!(stage.get(a).unwrap().relations().is_empty());
}

// ---------------------------------------------------------------------------
// Gears and controllers
// ---------------------------------------------------------------------------

#[test]
fn gear_pages_default_and_sticky_writes() {
    let mut stage = Stage::default();
    let root = stage.root();
    let comp = stage.create_child(root, ObjectData::new("comp").with_size(400.0, 400.0));
    let obj = stage.create_child(comp, ObjectData::new("obj").with_position(50.0, 0.0));
    let c = stage.add_controller(comp, "state").unwrap();
    let p1 = stage.add_page(c, "p1").unwrap();
    let p2 = stage.add_page(c, "p2").unwrap();

    stage.set_gear(obj, GearKind::XY, Some(c)).unwrap();
    stage.add_gear_status(obj, GearKind::XY, Some(p1), "-").unwrap();
    stage.add_gear_status(obj, GearKind::XY, Some(p2), "100,0").unwrap();

    stage.set_selected_index(c, 0).unwrap();
    assert_eq!(pos(&stage, obj).x, 50.0);
    stage.set_selected_index(c, 1).unwrap();
    assert_eq!(pos(&stage, obj).x, 100.0);
    stage.set_selected_index(c, 0).unwrap();
    assert_eq!(pos(&stage, obj).x, 50.0);

    stage.set_xy(obj, 77.0, 0.0);
    stage.set_selected_index(c, 1).unwrap();
    assert_eq!(pos(&stage, obj).x, 100.0);
    stage.set_selected_index(c, 0).unwrap();
    assert_eq!(pos(&stage, obj).x, 77.0);
}

#[test]
fn repeated_apply_is_silent() {
    let mut stage = Stage::default();
    let root = stage.root();
    let comp = stage.create_child(root, ObjectData::new("comp"));
    let obj = stage.create_child(comp, ObjectData::new("obj"));
    let c = stage.add_controller(comp, "state").unwrap();
    stage.add_page(c, "a").unwrap();
    let b = stage.add_page(c, "b").unwrap();
    stage.set_gear(obj, GearKind::XY, Some(c)).unwrap();
    stage.add_gear_status(obj, GearKind::XY, Some(b), "30,40").unwrap();
    stage.set_selected_index(c, 1).unwrap();
    stage.take_events();

    stage.apply_gear(obj, GearKind::XY);
    stage.apply_gear(obj, GearKind::XY);

    assert_eq!(pos(&stage, obj), Point::new(30.0, 40.0));
    assert!(stage.take_events().is_empty());
}

#[test]
fn descriptor_gear_moves_related_sibling() {
    let desc = ComponentDescriptor::new("panel")
        .with_size(300.0, 100.0)
        .with_controller(ControllerDescriptor::new("mode").page("0", "up").page("1", "down"))
        .with_child(
            ObjectDescriptor::new("button")
                .at(10.0, 10.0)
                .sized(50.0, 20.0)
                .gear(GearDescriptor::new(GearKind::XY, "mode").value("1", "110,10")),
        )
        .with_child(
            ObjectDescriptor::new("label")
                .at(70.0, 10.0)
                .sized(40.0, 20.0)
                .relation(RelationTarget::Sibling("button".into()), "left-right"),
        );

    let mut stage = Stage::default();
    let root = stage.root();
    let panel = stage.build(root, &desc).unwrap();
    let button = stage.find_child(panel, "button").unwrap();
    let label = stage.find_child(panel, "label").unwrap();
    let mode = stage.controller_by_name(panel, "mode").unwrap();

    stage.set_selected_index(mode, 1).unwrap();
    assert_eq!(pos(&stage, button), Point::new(110.0, 10.0));
    assert_eq!(pos(&stage, label), Point::new(170.0, 10.0));
}

// ---------------------------------------------------------------------------
// Scroll panes
// ---------------------------------------------------------------------------

fn scroller(pilot: &mut Pilot, options: ScrollOptions) -> ObjectId {
    let stage = pilot.stage_mut();
    let root = stage.root();
    let c = stage.create_child(root, ObjectData::new("c").with_size(100.0, 300.0));
    stage.create_child(c, ObjectData::new("content").with_size(100.0, 1000.0));
    stage.set_scroll_pane(c, options).unwrap();
    c
}

#[test]
fn position_clamps_to_overlap() {
    let mut pilot = Pilot::default();
    let c = scroller(
        &mut pilot,
        ScrollOptions::new(ScrollType::Vertical).with_bounce_back(false),
    );
    pilot.stage_mut().set_pos_y(c, 950.0, false);
    assert_eq!(pilot.stage().scroll_pane(c).unwrap().pos_y(), 700.0);
}

#[test]
fn pull_past_edge_springs_back() {
    let mut pilot = Pilot::default();
    let c = scroller(&mut pilot, ScrollOptions::new(ScrollType::Vertical));
    pilot.stage_mut().set_pos_y(c, 700.0, false);

    pilot.press(c, Point::new(50.0, 250.0));
    for i in 1..=10 {
        pilot.move_to(c, Point::new(50.0, 250.0 - 20.0 * i as f32));
        pilot.frame();
    }
    let pane = pilot.stage().scroll_pane(c).unwrap();
    assert!(pane.origin().y < -700.0);
    assert_eq!(pane.pos_y(), 700.0);

    pilot.release(c);
    assert!(pilot.settle(600));
    let pane = pilot.stage().scroll_pane(c).unwrap();
    assert_eq!(pane.pos_y(), 700.0);
    assert!((pane.origin().y + 700.0).abs() < 1e-3);
}

/// Drag `distance` pixels in 10-pixel steps, hold still, then let go.
fn slow_drag(pilot: &mut Pilot, c: ObjectId, distance: f32) {
    let start = Point::new(50.0, 50.0);
    pilot.press(c, start);
    let steps = (distance.abs() / 10.0) as usize;
    for i in 1..=steps {
        pilot.move_to(c, Point::new(50.0, 50.0 + distance.signum() * 10.0 * i as f32));
        pilot.frame();
    }
    pilot.frames(10);
    pilot.release(c);
}

#[test]
fn page_release_depends_on_drag_direction() {
    let mut pilot = Pilot::default();
    let stage = pilot.stage_mut();
    let root = stage.root();
    let c = stage.create_child(root, ObjectData::new("pages").with_size(100.0, 100.0));
    stage.create_child(c, ObjectData::new("content").with_size(100.0, 500.0));
    stage
        .set_scroll_pane(c, ScrollOptions::new(ScrollType::Vertical).with_page_mode())
        .unwrap();
    stage.set_pos_y(c, 100.0, false);

    // Back by a fifth of a page: springs forward to page 1.
    slow_drag(&mut pilot, c, 20.0);
    assert!(pilot.settle(600));
    assert_eq!(pilot.stage().scroll_pane(c).unwrap().pos_y(), 100.0);

    // Back by two fifths: returns to page 0.
    slow_drag(&mut pilot, c, 40.0);
    assert!(pilot.settle(600));
    assert_eq!(pilot.stage().scroll_pane(c).unwrap().pos_y(), 0.0);

    // Forward by two fifths: turns to page 1.
    slow_drag(&mut pilot, c, -40.0);
    assert!(pilot.settle(600));
    assert_eq!(pilot.stage().scroll_pane(c).unwrap().pos_y(), 100.0);
}

// ---------------------------------------------------------------------------
// Virtual lists
// ---------------------------------------------------------------------------

fn virtual_list(config: StageConfig, looping: bool) -> (Pilot, ObjectId, Rc<RefCell<Vec<usize>>>) {
    let mut pilot = Pilot::new(config).with_factory(rows);
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let stage = pilot.stage_mut();
    let root = stage.root();
    let list = stage.create_list(
        root,
        ObjectData::new("list").with_size(100.0, 300.0),
        ListOptions::new(ListLayout::SingleColumn).with_default_item(ROW),
    );
    stage
        .set_item_renderer(list, move |_, index, _| sink.borrow_mut().push(index))
        .unwrap();
    if looping {
        stage.set_virtual_and_loop(list).unwrap();
    } else {
        stage.set_virtual(list).unwrap();
    }
    stage.set_num_items(list, 1000).unwrap();
    stage.validate();
    (pilot, list, log)
}

fn live(stage: &Stage, list: ObjectId) -> Vec<usize> {
    stage.live_items(list).into_iter().map(|(i, _)| i).collect()
}

#[test]
fn virtual_window_tracks_scroll_offset() {
    let lookahead = 2;
    let config = StageConfig::default().with_list_lookahead_lines(lookahead);
    let (mut pilot, list, _) = virtual_list(config, false);

    for target in [0.0, 15.0, 300.0, 4321.0, 29_700.0, 120.0] {
        pilot.stage_mut().set_pos_y(list, target, false);
        pilot.frame();
        let stage = pilot.stage();
        let indices = live(stage, list);
        let pos = stage.scroll_pane(list).unwrap().pos_y();

        // One extra line when the view straddles two rows.
        assert!(indices.len() >= 10 && indices.len() <= 10 + 1 + lookahead, "{indices:?}");
        assert_eq!(indices[0], (pos / 30.0).floor() as usize);
        assert!(indices.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(stage.children(list).len(), indices.len());
    }
}

#[test]
fn loop_window_is_a_modulo_range() {
    let (mut pilot, list, _) = virtual_list(StageConfig::default(), true);
    pilot.stage_mut().set_pos_y(list, 0.0, false);
    for _ in 0..5 {
        pilot.wheel(list, -3.0);
        pilot.frame();
        let indices = live(pilot.stage(), list);
        assert!(indices.len() >= 10 && indices.len() <= 11);
        assert!(indices.windows(2).all(|w| w[1] == (w[0] + 1) % 1000));
    }
}

#[test]
fn refresh_twice_renders_nothing_new() {
    let (mut pilot, list, log) = virtual_list(StageConfig::default(), false);
    pilot.stage_mut().set_pos_y(list, 450.0, false);
    pilot.frame();
    let before = live(pilot.stage(), list);
    log.borrow_mut().clear();

    pilot.stage_mut().refresh_list(list);
    pilot.stage_mut().refresh_list(list);
    pilot.frame();

    assert_eq!(live(pilot.stage(), list), before);
    assert!(log.borrow().is_empty());
}

#[test]
fn pooled_objects_stay_bounded_while_scrolling() {
    let (mut pilot, list, _) = virtual_list(StageConfig::default(), false);
    let start = pilot.stage().len();
    pilot.drag(list, Point::new(50.0, 280.0), Point::new(50.0, 20.0), 8);
    assert!(pilot.settle(1200));
    assert!(pilot.stage().len() <= start + 1);
    assert!(pilot.events().contains(&StageEvent::ScrollEnd(list)));
}

// ---------------------------------------------------------------------------
// Plain lists
// ---------------------------------------------------------------------------

#[test]
fn plain_list_outline() {
    let mut pilot = Pilot::default().with_factory(rows);
    let stage = pilot.stage_mut();
    let root = stage.root();
    let list = stage.create_list(
        root,
        ObjectData::new("list").with_size(100.0, 300.0),
        ListOptions::default()
            .with_default_item(ROW)
            .with_gaps(2.0, 0.0)
            .with_selection_mode(SelectionMode::Single)
            .without_scroll_on_click(),
    );
    stage.set_num_items(list, 3).unwrap();
    stage.validate();
    let second = stage.children(list)[1];
    pilot.click(second);

    insta::assert_snapshot!(outline(pilot.stage(), list), @r"
    list 0,0 100x300 scroll=0,0
      row 0,0 100x30
      row 0,32 100x30 selected
      row 0,64 100x30
    ");
    assert!(pilot
        .events()
        .contains(&StageEvent::ItemClicked { list, index: 1 }));
}
