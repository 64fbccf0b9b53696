//! Relation kinds and single anchor rules.

use crate::geometry::Axis;

/// One anchor rule kind.
///
/// The declaration order is the application order: position rules first,
/// then size rules, then edge extensions. Each name reads
/// "my edge" `_` "target edge".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationType {
    LeftLeft,
    LeftCenter,
    LeftRight,
    CenterCenter,
    RightLeft,
    RightCenter,
    RightRight,
    TopTop,
    TopMiddle,
    TopBottom,
    MiddleMiddle,
    BottomTop,
    BottomMiddle,
    BottomBottom,
    Width,
    Height,
    LeftExtLeft,
    LeftExtRight,
    RightExtLeft,
    RightExtRight,
    TopExtTop,
    TopExtBottom,
    BottomExtTop,
    BottomExtBottom,
    /// Compound: expands to `Width` + `Height` when added.
    Size,
}

impl RelationType {
    /// The axis this rule acts on. `Size` reports `X`; it never survives `add`.
    pub fn axis(self) -> Axis {
        use RelationType::*;
        match self {
            LeftLeft | LeftCenter | LeftRight | CenterCenter | RightLeft | RightCenter
            | RightRight | Width | LeftExtLeft | LeftExtRight | RightExtLeft | RightExtRight
            | Size => Axis::X,
            _ => Axis::Y,
        }
    }

    /// Whether the rule only moves the owner.
    pub fn is_position(self) -> bool {
        self <= RelationType::BottomBottom
    }

    /// Descriptor name, as used in serialized relation lists.
    pub fn name(self) -> &'static str {
        use RelationType::*;
        match self {
            LeftLeft => "left-left",
            LeftCenter => "left-center",
            LeftRight => "left-right",
            CenterCenter => "center-center",
            RightLeft => "right-left",
            RightCenter => "right-center",
            RightRight => "right-right",
            TopTop => "top-top",
            TopMiddle => "top-middle",
            TopBottom => "top-bottom",
            MiddleMiddle => "middle-middle",
            BottomTop => "bottom-top",
            BottomMiddle => "bottom-middle",
            BottomBottom => "bottom-bottom",
            Width => "width-width",
            Height => "height-height",
            LeftExtLeft => "leftext-left",
            LeftExtRight => "leftext-right",
            RightExtLeft => "rightext-left",
            RightExtRight => "rightext-right",
            TopExtTop => "topext-top",
            TopExtBottom => "topext-bottom",
            BottomExtTop => "bottomext-top",
            BottomExtBottom => "bottomext-bottom",
            Size => "size",
        }
    }

    /// Inverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<RelationType> {
        use RelationType::*;
        const ALL: [RelationType; 25] = [
            LeftLeft,
            LeftCenter,
            LeftRight,
            CenterCenter,
            RightLeft,
            RightCenter,
            RightRight,
            TopTop,
            TopMiddle,
            TopBottom,
            MiddleMiddle,
            BottomTop,
            BottomMiddle,
            BottomBottom,
            Width,
            Height,
            LeftExtLeft,
            LeftExtRight,
            RightExtLeft,
            RightExtRight,
            TopExtTop,
            TopExtBottom,
            BottomExtTop,
            BottomExtBottom,
            Size,
        ];
        ALL.into_iter().find(|t| t.name() == name)
    }
}

/// One anchor rule bound to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    pub relation_type: RelationType,
    /// Track the target proportionally instead of by pixel offset.
    pub use_percent: bool,
}

impl RelationDef {
    pub fn new(relation_type: RelationType, use_percent: bool) -> Self {
        Self { relation_type, use_percent }
    }

    pub fn axis(&self) -> Axis {
        self.relation_type.axis()
    }
}
