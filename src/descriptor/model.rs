//! Descriptor data model.
//!
//! A [`ComponentDescriptor`] is the read-only description of one component:
//! its controllers, its children with their default geometry, and the
//! serialized relation and gear tables attached to each child. Page
//! references inside a descriptor use the descriptor's own page ids; the
//! stage maps them to [`PageId`](crate::controller::PageId)s when it builds
//! the component.

use crate::controller::ActionKind;
use crate::gear::{GearKind, TweenConfig};
use crate::geometry::Size;
use crate::list::ListOptions;
use crate::scroll::ScrollOptions;
use crate::stage::Capabilities;

/// A component: a container with controllers and children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentDescriptor {
    pub name: String,
    pub size: Size,
    pub controllers: Vec<ControllerDescriptor>,
    pub children: Vec<ObjectDescriptor>,
    /// Makes the component a scroll container.
    pub scroll: Option<ScrollOptions>,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    pub fn with_controller(mut self, controller: ControllerDescriptor) -> Self {
        self.controllers.push(controller);
        self
    }

    pub fn with_child(mut self, child: ObjectDescriptor) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_scroll(mut self, options: ScrollOptions) -> Self {
        self.scroll = Some(options);
        self
    }
}

/// A page as declared in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    /// Descriptor-local id, referenced by gears and actions.
    pub id: String,
    pub name: String,
}

/// A controller declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerDescriptor {
    pub name: String,
    pub pages: Vec<PageDescriptor>,
    /// Initially selected page index.
    pub selected: usize,
    pub actions: Vec<ActionDescriptor>,
}

impl ControllerDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a page (builder).
    pub fn page(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.pages.push(PageDescriptor {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }

    pub fn action(mut self, action: ActionDescriptor) -> Self {
        self.actions.push(action);
        self
    }
}

/// A controller action keyed by descriptor page ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDescriptor {
    pub from_pages: Vec<String>,
    pub to_pages: Vec<String>,
    pub kind: ActionKind,
}

/// Where a relation list points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationTarget {
    /// The component being built.
    Parent,
    /// A sibling, by name.
    Sibling(String),
}

/// One serialized relation list, e.g. `left-left,width-width%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub target: RelationTarget,
    pub defs: String,
}

/// One serialized gear table.
#[derive(Debug, Clone, PartialEq)]
pub struct GearDescriptor {
    pub kind: GearKind,
    /// Name of a controller declared by the enclosing component.
    pub controller: String,
    /// Display gears: descriptor page ids the object shows on.
    pub pages: Vec<String>,
    /// `(page id, serialized value)` pairs.
    pub values: Vec<(String, String)>,
    pub default: Option<String>,
    pub tween: Option<TweenConfig>,
}

impl GearDescriptor {
    pub fn new(kind: GearKind, controller: impl Into<String>) -> Self {
        Self {
            kind,
            controller: controller.into(),
            pages: Vec::new(),
            values: Vec::new(),
            default: None,
            tween: None,
        }
    }

    pub fn value(mut self, page: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push((page.into(), value.into()));
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn pages<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pages = pages.into_iter().map(Into::into).collect();
        self
    }

    pub fn tween(mut self, config: TweenConfig) -> Self {
        self.tween = Some(config);
        self
    }
}

/// A child object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescriptor {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub visible: bool,
    pub resource_url: Option<String>,
    pub caps: Capabilities,
    pub relations: Vec<RelationDescriptor>,
    pub gears: Vec<GearDescriptor>,
    /// A nested component in place of a plain object.
    pub component: Option<Box<ComponentDescriptor>>,
    /// Makes the object a list.
    pub list: Option<ListOptions>,
}

impl ObjectDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            visible: true,
            resource_url: None,
            caps: Capabilities::default(),
            relations: Vec::new(),
            gears: Vec::new(),
            component: None,
            list: None,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn caps(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    pub fn relation(mut self, target: RelationTarget, defs: impl Into<String>) -> Self {
        self.relations.push(RelationDescriptor {
            target,
            defs: defs.into(),
        });
        self
    }

    pub fn gear(mut self, gear: GearDescriptor) -> Self {
        self.gears.push(gear);
        self
    }

    pub fn component(mut self, component: ComponentDescriptor) -> Self {
        self.component = Some(Box::new(component));
        self
    }

    pub fn list(mut self, options: ListOptions) -> Self {
        self.list = Some(options);
        self
    }
}
