//! Component descriptors: the serialized description a component is built
//! from, and the parsers for its value strings.

pub mod build;
pub mod model;
pub mod parser;
pub mod tokenizer;

pub use model::{
    ActionDescriptor, ComponentDescriptor, ControllerDescriptor, GearDescriptor, ObjectDescriptor,
    PageDescriptor, RelationDescriptor, RelationTarget,
};
pub use parser::{parse_gear_value, parse_relation_list, ParseError};
