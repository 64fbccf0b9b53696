//! Configuration errors.
//!
//! Every variant is returned synchronously by the operation that detected it,
//! and that operation leaves the stage untouched.

use crate::descriptor::parser::ParseError;
use crate::gear::GearKind;
use crate::relation::RelationType;

/// A rejected configuration request.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("an object cannot hold a relation to itself")]
    SelfRelation,
    #[error("relation target is a descendant of the owner")]
    DescendantRelation,
    #[error("relation `{0:?}` is listed twice for the same target")]
    DuplicateRelation(RelationType),
    #[error("page index {index} out of range for controller `{controller}` with {count} pages")]
    PageIndexOutOfRange {
        controller: String,
        index: usize,
        count: usize,
    },
    #[error("controller `{controller}` has no page `{page}`")]
    UnknownPage { controller: String, page: String },
    #[error("object does not exist")]
    UnknownObject,
    #[error("controller does not exist")]
    UnknownController,
    #[error("object `{object}` has no child named `{name}`")]
    UnknownChild { object: String, name: String },
    #[error("object `{object}` lacks the `{capability}` capability needed by a {kind:?} gear")]
    MissingCapability {
        object: String,
        kind: GearKind,
        capability: &'static str,
    },
    #[error("object has no {0:?} gear")]
    NoGear(GearKind),
    #[error("object `{0}` is not a list")]
    NotAList(String),
    #[error("list `{0}` has no item type to create")]
    NoItemType(String),
    #[error("no object factory can create `{0}`")]
    FactoryMiss(String),
    #[error(transparent)]
    Descriptor(#[from] ParseError),
}
