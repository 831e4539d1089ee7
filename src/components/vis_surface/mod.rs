//! Configuration and event-overlay layer for vis.js style surfaces.
//!
//! Three surfaces sit on top of a pluggable [`Backend`]:
//! - [`NetworkManager`]: nodes and edges, orb badges painted after every
//!   draw, physics/solver/layout controls
//! - [`TimelineManager`]: items and groups
//! - [`GraphManager`]: a network instantiated from an HTML template together
//!   with its physics toggle and layout selector
//!
//! Every surface keeps a snapshot of its options, merges caller patches one
//! level deep, reconciles incoming entities into the renderer's collections,
//! and delays single clicks long enough to tell them apart from double clicks.
//!
//! # Example
//!
//! ```ignore
//! use vis_surface::{Entity, MemoryBackend, MountPoint, NetworkData, NetworkManager};
//!
//! let network = NetworkManager::new(MemoryBackend::new(), &MountPoint("graph".into()))?;
//! network.set_data(Some(NetworkData {
//!     nodes: Some(vec![Entity::new(1).with("label", "a").with("edgeCount", 3)]),
//!     ..Default::default()
//! }));
//! ```

mod backend;
mod clicks;
mod component;
mod dataset;
mod error;
mod events;
mod graph;
pub mod headless;
mod layout;
mod network;
mod options;
mod orbs;
mod timeline;
mod types;
pub mod web;

pub use backend::{
	Backend, Capabilities, EventHandler, EventPayload, NetworkRenderer, Renderer, TimelineRenderer,
};
pub use clicks::{ClickDisambiguator, DOUBLE_CLICK_WINDOW, Scheduler};
pub use component::VisGraph;
pub use dataset::{DataSet, EntityStore, Reconciled, reconcile};
pub use error::{Result, SurfaceError};
pub use events::{Callback, Events, NETWORK_EVENTS, ONLOAD, TIMELINE_EVENTS};
pub use graph::{
	DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_URI, GraphConfig, GraphManager, SelectControl,
	TemplateCache, TemplateFetcher, TemplateHost, ToggleControl,
};
pub use headless::{MemoryBackend, MountPoint};
pub use layout::{EdgeFlow, Layout, Solver};
pub use network::NetworkManager;
pub use options::{SurfaceDefaults, as_patch, merge, merge_into, network_options};
pub use orbs::{
	Badge, BadgeContent, Compass, DrawContext, Orb, OrbColors, TextMeasure, TextMetrics,
	draw_orbs, entity_orbs, paint_badge, plan_badge, plan_badges,
};
pub use timeline::TimelineManager;
pub use types::{Entity, EntityId, NetworkData, Position, TimelineData};
