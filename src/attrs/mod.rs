//! Attribute bags and their projection onto map options and event bindings.

pub mod bag;
pub mod extract;

pub use bag::{AttrValue, Attrs};
pub use extract::{attr_name, event_name, extract, is_event_attr, OptionsAndEvents};
