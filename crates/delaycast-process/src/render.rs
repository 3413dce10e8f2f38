//! Graphviz rendering of a directly-follows graph as a bottleneck map.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

use chrono::TimeDelta;
use delaycast_core::EventLog;
use thiserror::Error;
use tracing::info;

use crate::DirectlyFollowsGraph;

const START_NODE: &str = "__start__";
const END_NODE: &str = "__end__";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("event log is empty")]
    EmptyLog,

    #[error("graphviz 'dot' executable not found; install graphviz or use --format dot")]
    GraphvizMissing,

    #[error("graphviz failed ({status}): {stderr}")]
    Graphviz { status: String, stderr: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapFormat {
    #[default]
    Dot,
    Png,
    Svg,
}

impl MapFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl FromStr for MapFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dot" | "gv" => Ok(Self::Dot),
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(format!("unsupported map format: {other}")),
        }
    }
}

/// Graphviz DOT source for `dfg`.
///
/// Nodes carry occurrence counts, edges carry `frequency | mean wait`, and the
/// slowest edge is drawn in red.
pub fn render_dot(dfg: &DirectlyFollowsGraph) -> String {
    let slowest = dfg
        .bottlenecks(1)
        .into_iter()
        .next()
        .filter(|e| e.mean_duration > TimeDelta::zero());
    let max_freq = dfg.edges().iter().map(|e| e.frequency).max().unwrap_or(1);

    let mut out = String::from("digraph dfg {\n  rankdir=LR;\n");
    out.push_str(
        "  node [shape=box, style=\"rounded,filled\", fillcolor=\"#eceff1\", fontname=\"Helvetica\"];\n",
    );
    out.push_str("  edge [fontname=\"Helvetica\", fontsize=10];\n");
    out.push_str(&format!(
        "  \"{START_NODE}\" [label=\"\", shape=circle, fillcolor=\"#43a047\", width=0.3];\n"
    ));
    out.push_str(&format!(
        "  \"{END_NODE}\" [label=\"\", shape=doublecircle, fillcolor=\"#e53935\", width=0.3];\n"
    ));

    for (activity, count) in dfg.activities() {
        let name = escape(activity);
        out.push_str(&format!("  \"{name}\" [label=\"{name} ({count})\"];\n"));
    }

    for (activity, count) in dfg.start_activities() {
        out.push_str(&format!(
            "  \"{START_NODE}\" -> \"{}\" [label=\"{count}\", style=dashed];\n",
            escape(activity)
        ));
    }

    for edge in dfg.edges() {
        let width = 1.0 + 2.0 * edge.frequency as f64 / max_freq as f64;
        let is_slowest = slowest
            .as_ref()
            .is_some_and(|s| s.source == edge.source && s.target == edge.target);
        let colour = if is_slowest {
            ", color=\"#d32f2f\", fontcolor=\"#d32f2f\""
        } else {
            ""
        };
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [label=\"{} | {}\", penwidth={width:.1}{colour}];\n",
            escape(&edge.source),
            escape(&edge.target),
            edge.frequency,
            format_duration(edge.mean_duration),
        ));
    }

    for (activity, count) in dfg.end_activities() {
        out.push_str(&format!(
            "  \"{}\" -> \"{END_NODE}\" [label=\"{count}\", style=dashed];\n",
            escape(activity)
        ));
    }

    out.push_str("}\n");
    out
}

/// Discover the graph for `log` and write it to `output` in `format`.
///
/// DOT is written directly; PNG and SVG are produced by piping the DOT source
/// through the Graphviz `dot` executable.
pub fn render_bottleneck_map(
    log: &EventLog,
    format: MapFormat,
    output: &Path,
) -> Result<PathBuf, RenderError> {
    if log.is_empty() {
        return Err(RenderError::EmptyLog);
    }
    let dfg = DirectlyFollowsGraph::discover(log);
    let dot = render_dot(&dfg);

    match format {
        MapFormat::Dot => std::fs::write(output, dot)?,
        MapFormat::Png | MapFormat::Svg => run_graphviz(&dot, format, output)?,
    }

    info!(path = %output.display(), format = format.extension(), "wrote bottleneck map");
    Ok(output.to_path_buf())
}

fn run_graphviz(dot: &str, format: MapFormat, output: &Path) -> Result<(), RenderError> {
    let mut command = Command::new("dot");
    command
        .arg(format!("-T{}", format.extension()))
        .arg("-o")
        .arg(output);
    pipe_into(command, dot)
}

/// Feed `input` to `command` on stdin and wait for it to exit.
///
/// The child is always waited on; a failed write only surfaces once the exit
/// status has been checked.
fn pipe_into(mut command: Command, input: &str) -> Result<(), RenderError> {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RenderError::GraphvizMissing,
            _ => RenderError::Io(e),
        })?;

    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Ok(()),
    };

    let result = child.wait_with_output()?;
    if !result.status.success() {
        return Err(RenderError::Graphviz {
            status: result.status.to_string(),
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }
    written?;
    Ok(())
}

/// Compact duration label: `4d`, `2d 6h`, `5h 30m`, `45m`, `0m`.
pub(crate) fn format_duration(d: TimeDelta) -> String {
    let minutes = d.num_minutes().max(0);
    let (days, hours, mins) = (minutes / 1440, (minutes % 1440) / 60, minutes % 60);
    match (days, hours, mins) {
        (0, 0, m) => format!("{m}m"),
        (0, h, 0) => format!("{h}h"),
        (0, h, m) => format!("{h}h {m}m"),
        (d, 0, _) => format!("{d}d"),
        (d, h, _) => format!("{d}d {h}h"),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
