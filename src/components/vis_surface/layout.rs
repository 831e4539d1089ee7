//! Physics solvers and layout presets understood by the network surface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SurfaceError;

/// Physics solver names, as the renderer spells them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Solver {
	/// Barnes-Hut gravity.
	BarnesHut,
	/// Plain repulsion.
	Repulsion,
	/// Repulsion used by hierarchical layouts.
	HierarchicalRepulsion,
	/// Force Atlas 2, the default.
	#[default]
	ForceAtlas2Based,
}

impl Solver {
	/// Name as the renderer spells it.
	pub fn as_str(self) -> &'static str {
		match self {
			Solver::BarnesHut => "barnesHut",
			Solver::Repulsion => "repulsion",
			Solver::HierarchicalRepulsion => "hierarchicalRepulsion",
			Solver::ForceAtlas2Based => "forceAtlas2Based",
		}
	}

	/// Hierarchical layout is switched on exactly when this solver is active.
	pub fn is_hierarchical(self) -> bool {
		self == Solver::HierarchicalRepulsion
	}
}

impl fmt::Display for Solver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Solver {
	type Err = SurfaceError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"barnesHut" => Ok(Solver::BarnesHut),
			"repulsion" => Ok(Solver::Repulsion),
			"hierarchicalRepulsion" => Ok(Solver::HierarchicalRepulsion),
			"forceAtlas2Based" => Ok(Solver::ForceAtlas2Based),
			other => Err(SurfaceError::Misuse(format!("unknown solver `{other}`"))),
		}
	}
}

/// Layout presets offered by the graph container's layout selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layout {
	/// Free layout driven by the solver.
	#[default]
	Standard,
	/// Hierarchy flowing top to bottom.
	HierarchyTop,
	/// Hierarchy flowing bottom to top.
	HierarchyBottom,
	/// Hierarchy flowing left to right.
	HierarchyLeft,
	/// Hierarchy flowing right to left.
	HierarchyRight,
}

/// How a hierarchical layout bends smooth edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeFlow {
	/// Top-down or bottom-up: `vertical` smoothing becomes `horizontal`.
	Vertical,
	/// Left-right or right-left: `horizontal` smoothing becomes `vertical`.
	Horizontal,
}

impl EdgeFlow {
	/// Returns the `(from, to)` smooth type swap this flow requires.
	pub fn smooth_swap(self) -> (&'static str, &'static str) {
		match self {
			EdgeFlow::Vertical => ("vertical", "horizontal"),
			EdgeFlow::Horizontal => ("horizontal", "vertical"),
		}
	}
}

impl Layout {
	/// Value used by the layout selector.
	pub fn as_str(self) -> &'static str {
		match self {
			Layout::Standard => "standard",
			Layout::HierarchyTop => "hierarchyTop",
			Layout::HierarchyBottom => "hierarchyBottom",
			Layout::HierarchyLeft => "hierarchyLeft",
			Layout::HierarchyRight => "hierarchyRight",
		}
	}

	/// Renderer direction code, `None` for the free layout.
	pub fn direction(self) -> Option<&'static str> {
		match self {
			Layout::Standard => None,
			Layout::HierarchyTop => Some("UD"),
			Layout::HierarchyBottom => Some("DU"),
			Layout::HierarchyLeft => Some("LR"),
			Layout::HierarchyRight => Some("RL"),
		}
	}

	/// Which way the hierarchy runs, `None` for the free layout.
	pub fn edge_flow(self) -> Option<EdgeFlow> {
		match self {
			Layout::Standard => None,
			Layout::HierarchyTop | Layout::HierarchyBottom => Some(EdgeFlow::Vertical),
			Layout::HierarchyLeft | Layout::HierarchyRight => Some(EdgeFlow::Horizontal),
		}
	}
}

impl fmt::Display for Layout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Layout {
	type Err = SurfaceError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"standard" => Ok(Layout::Standard),
			"hierarchyTop" => Ok(Layout::HierarchyTop),
			"hierarchyBottom" => Ok(Layout::HierarchyBottom),
			"hierarchyLeft" => Ok(Layout::HierarchyLeft),
			"hierarchyRight" => Ok(Layout::HierarchyRight),
			other => Err(SurfaceError::Misuse(format!("unknown layout `{other}`"))),
		}
	}
}
