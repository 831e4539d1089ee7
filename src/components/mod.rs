//! UI-independent surfaces and the Leptos component built on them.

pub mod vis_surface;
