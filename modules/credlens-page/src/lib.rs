//! Page surrogate for the credibility overlay. Models exactly the DOM
//! properties the catalog and overlay logic depend on: layout rect, computed
//! display/visibility/opacity/position, inline styles, and tree structure.
//! The hosting layer owns the real page; this crate owns the badge state.

pub mod catalog;
pub mod dom;
pub mod overlay;

pub use catalog::{scan, Catalog};
pub use dom::{ComputedStyle, Document, Element, ElementId, Rect};
pub use overlay::OverlayManager;
