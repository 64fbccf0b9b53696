//! Snapshot rendering helpers.
//!
//! Converts a stage subtree into a plain-text outline suitable for snapshot
//! testing and assertions.

use std::fmt::Write;

use crate::stage::{ObjectId, Stage};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render the subtree under `id` as an indented outline.
///
/// One line per object, children indented two spaces under their parent:
/// the name, position and size, followed by markers for hidden and
/// selected objects and a `scroll` marker with the pane position.
///
/// # Examples
///
/// ```
/// use stagecraft::stage::{ObjectData, Stage};
/// use stagecraft::testing::outline;
///
/// let mut stage = Stage::default();
/// let root = stage.root();
/// let panel = stage.create_child(root, ObjectData::new("panel").with_size(40.0, 20.0));
/// assert_eq!(outline(&stage, panel), "panel 0,0 40x20");
/// ```
pub fn outline(stage: &Stage, id: ObjectId) -> String {
    let mut out = String::new();
    write_node(stage, id, 0, &mut out);
    out.truncate(out.trim_end().len());
    out
}

fn write_node(stage: &Stage, id: ObjectId, depth: usize, out: &mut String) {
    let Some(obj) = stage.get(id) else {
        return;
    };
    let _ = write!(
        out,
        "{:indent$}{} {},{} {}x{}",
        "",
        obj.name,
        obj.x(),
        obj.y(),
        obj.width(),
        obj.height(),
        indent = depth * 2
    );
    if !obj.is_displayed() {
        out.push_str(" hidden");
    }
    if obj.caps().selected == Some(true) {
        out.push_str(" selected");
    }
    if let Some(pane) = stage.scroll_pane(id) {
        let pos = pane.pos();
        let _ = write!(out, " scroll={},{}", pos.x, pos.y);
    }
    out.push('\n');
    for &child in stage.children(id) {
        write_node(stage, child, depth + 1, out);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::ObjectData;

    // ---------------------------------------------------------------
    // outline
    // ---------------------------------------------------------------

    #[test]
    fn outline_indents_children() {
        let mut stage = Stage::default();
        let root = stage.root();
        let a = stage.create_child(root, ObjectData::new("a").with_size(10.0, 10.0));
        stage.create_child(a, ObjectData::new("b").with_position(2.0, 3.0).with_size(4.0, 5.0));
        insta::assert_snapshot!(outline(&stage, a), @r"
        a 0,0 10x10
          b 2,3 4x5
        ");
    }

    #[test]
    fn outline_marks_state() {
        let mut stage = Stage::default();
        let root = stage.root();
        let a = stage.create_child(root, ObjectData::new("a").selectable());
        stage.set_selected(a, true);
        let b = stage.create_child(root, ObjectData::new("b"));
        stage.set_visible(b, false);
        assert_eq!(outline(&stage, a), "a 0,0 0x0 selected");
        assert_eq!(outline(&stage, b), "b 0,0 0x0 hidden");
    }

    #[test]
    fn outline_of_missing_object_is_empty() {
        let mut stage = Stage::default();
        let root = stage.root();
        let a = stage.create_child(root, ObjectData::new("a"));
        stage.dispose(a);
        assert_eq!(outline(&stage, a), "");
    }
}
