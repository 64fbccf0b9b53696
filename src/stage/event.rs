//! Stage events: notifications queued for the host.
//!
//! The stage never calls out to host code while it is mutating itself.
//! Instead it appends [`StageEvent`]s to an [`EventQueue`] that the host
//! drains once per frame.

use crate::controller::ControllerId;
use crate::gear::GearKind;

use super::object::ObjectId;

// ---------------------------------------------------------------------------
// StageEvent
// ---------------------------------------------------------------------------

/// Something observable happened on the stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    /// An object's position changed.
    XyChanged(ObjectId),
    /// An object's size changed.
    SizeChanged(ObjectId),
    /// A controller switched pages.
    PageChanged {
        controller: ControllerId,
        previous: Option<usize>,
        current: Option<usize>,
    },
    /// A gear tween reached its end value.
    GearStop { object: ObjectId, kind: GearKind },
    /// A scroll pane's position changed.
    Scroll(ObjectId),
    /// A scroll gesture or scroll tween finished.
    ScrollEnd(ObjectId),
    /// Content was pulled down past the top edge and released.
    PullDownRelease(ObjectId),
    /// Content was pulled up past the bottom edge and released.
    PullUpRelease(ObjectId),
    /// A controller action asks the host to play a transition.
    TransitionPlay {
        object: ObjectId,
        transition: String,
        play_times: u32,
        delay: f32,
    },
    /// A controller action asks the host to stop a transition.
    TransitionStop { object: ObjectId, transition: String },
    /// A list item was clicked.
    ItemClicked { list: ObjectId, index: usize },
}

// ---------------------------------------------------------------------------
// EventQueue
// ---------------------------------------------------------------------------

/// Ordered queue of pending stage events.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: Vec<StageEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: StageEvent) {
        self.pending.push(event);
    }

    /// Drain and return all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Pending events without draining.
    pub fn pending(&self) -> &[StageEvent] {
        &self.pending
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether there are no pending events.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn drain_empties_queue_in_order() {
        let mut sm: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let a = sm.insert(());
        let b = sm.insert(());
        let mut q = EventQueue::new();
        q.push(StageEvent::XyChanged(a));
        q.push(StageEvent::Scroll(b));
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events, vec![StageEvent::XyChanged(a), StageEvent::Scroll(b)]);
        assert!(q.is_empty());
    }
}
