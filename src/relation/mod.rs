//! Relations: anchor rules that keep an object's edges, centre or extent
//! tied to another object's.

pub mod apply;
pub mod item;
pub mod types;

pub use item::{RelationItem, RelationSet};
pub use types::{RelationDef, RelationType};
