//! Process mining over shipment event logs: directly-follows-graph discovery
//! and bottleneck maps rendered through Graphviz.

mod dfg;
mod render;

pub use dfg::{DirectlyFollowsGraph, Edge};
pub use render::{MapFormat, RenderError, render_bottleneck_map, render_dot};
