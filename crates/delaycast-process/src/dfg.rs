//! Directly-follows-graph discovery.
//!
//! Events are grouped by case and ordered by timestamp (stable for ties, so
//! log order breaks them). Every adjacent pair `(a, b)` in a trace is one
//! observation of the edge `a → b`; the waiting time of an observation is the
//! gap between the two timestamps.

use std::collections::{BTreeMap, HashMap};

use chrono::TimeDelta;
use delaycast_core::{Event, EventLog};
use tracing::info;

/// An aggregated `source → target` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Number of times `target` directly followed `source`.
    pub frequency: usize,
    /// Mean gap between the two events over all observations.
    pub mean_duration: TimeDelta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectlyFollowsGraph {
    edges: BTreeMap<(String, String), (usize, TimeDelta)>,
    start_activities: BTreeMap<String, usize>,
    end_activities: BTreeMap<String, usize>,
    activities: BTreeMap<String, usize>,
    cases: usize,
}

impl DirectlyFollowsGraph {
    pub fn discover(log: &EventLog) -> Self {
        // Accumulate: case_id → trace, in first-seen order.
        let mut order: Vec<&str> = Vec::new();
        let mut traces: HashMap<&str, Vec<&Event>> = HashMap::new();
        for event in log.events() {
            traces
                .entry(event.case_id.as_str())
                .or_insert_with(|| {
                    order.push(event.case_id.as_str());
                    Vec::new()
                })
                .push(event);
        }

        let mut dfg = Self {
            cases: order.len(),
            ..Self::default()
        };

        for case in order {
            let Some(trace) = traces.get_mut(case) else {
                continue;
            };
            trace.sort_by_key(|e| e.timestamp);

            for event in trace.iter() {
                *dfg.activities.entry(event.activity.clone()).or_default() += 1;
            }
            if let (Some(first), Some(last)) = (trace.first(), trace.last()) {
                *dfg.start_activities.entry(first.activity.clone()).or_default() += 1;
                *dfg.end_activities.entry(last.activity.clone()).or_default() += 1;
            }
            for pair in trace.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let entry = dfg
                    .edges
                    .entry((a.activity.clone(), b.activity.clone()))
                    .or_insert((0, TimeDelta::zero()));
                entry.0 += 1;
                entry.1 += b.timestamp - a.timestamp;
            }
        }

        info!(
            cases = dfg.cases,
            activities = dfg.activities.len(),
            edges = dfg.edges.len(),
            "discovered directly-follows graph"
        );
        dfg
    }

    /// All edges, ordered by `(source, target)`.
    pub fn edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|((source, target), &(frequency, total))| Edge {
                source: source.clone(),
                target: target.clone(),
                frequency,
                mean_duration: mean(total, frequency),
            })
            .collect()
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<Edge> {
        self.edges()
            .into_iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// The `n` edges with the longest mean waiting time, slowest first.
    ///
    /// Ties go to the more frequent edge, then to `(source, target)` order.
    pub fn bottlenecks(&self, n: usize) -> Vec<Edge> {
        let mut edges = self.edges();
        edges.sort_by(|a, b| {
            b.mean_duration
                .cmp(&a.mean_duration)
                .then(b.frequency.cmp(&a.frequency))
                .then_with(|| (&a.source, &a.target).cmp(&(&b.source, &b.target)))
        });
        edges.truncate(n);
        edges
    }

    /// Activity → number of cases starting with it.
    pub fn start_activities(&self) -> &BTreeMap<String, usize> {
        &self.start_activities
    }

    /// Activity → number of cases ending with it.
    pub fn end_activities(&self) -> &BTreeMap<String, usize> {
        &self.end_activities
    }

    /// Activity → total occurrences.
    pub fn activities(&self) -> &BTreeMap<String, usize> {
        &self.activities
    }

    pub fn case_count(&self) -> usize {
        self.cases
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

fn mean(total: TimeDelta, count: usize) -> TimeDelta {
    match i32::try_from(count) {
        Ok(n) if n > 0 => total / n,
        _ => TimeDelta::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn synthetic_log_edges() {
        let dfg = DirectlyFollowsGraph::discover(&EventLog::synthetic());
        assert_eq!(dfg.case_count(), 3);
        assert_eq!(dfg.edges().len(), 5);

        let e = dfg.edge("Order Received", "Customs Check").unwrap();
        assert_eq!(e.frequency, 2);
        assert_eq!(e.mean_duration, TimeDelta::days(1));

        let e = dfg.edge("Customs Check", "Delivered").unwrap();
        assert_eq!(e.frequency, 1);
        assert_eq!(e.mean_duration, TimeDelta::days(3));

        let e = dfg.edge("Order Received", "Delivered").unwrap();
        assert_eq!(e.mean_duration, TimeDelta::days(2));

        assert!(dfg.edge("Delivered", "Order Received").is_none());
    }

    #[test]
    fn synthetic_log_start_end_and_counts() {
        let dfg = DirectlyFollowsGraph::discover(&EventLog::synthetic());
        assert_eq!(dfg.start_activities().get("Order Received"), Some(&3));
        assert_eq!(dfg.start_activities().len(), 1);
        assert_eq!(dfg.end_activities().get("Delivered"), Some(&3));
        assert_eq!(dfg.activities().get("Customs Check"), Some(&2));
        assert_eq!(dfg.activities().get("Warehouse Hold"), Some(&1));
    }

    #[test]
    fn warehouse_hold_is_the_bottleneck() {
        let dfg = DirectlyFollowsGraph::discover(&EventLog::synthetic());
        let slow = dfg.bottlenecks(2);
        assert_eq!(slow.len(), 2);
        assert_eq!(
            (slow[0].source.as_str(), slow[0].target.as_str()),
            ("Customs Check", "Warehouse Hold")
        );
        assert_eq!(
            (slow[1].source.as_str(), slow[1].target.as_str()),
            ("Warehouse Hold", "Delivered")
        );
        assert_eq!(slow[0].mean_duration, TimeDelta::days(4));
    }

    #[test]
    fn unordered_log_is_sorted_per_case() {
        let t = |h: u32| Utc.with_ymd_and_hms(2026, 3, 1, h, 0, 0).unwrap();
        let log = EventLog::new(vec![
            Event::new("A", "Delivered", t(9)),
            Event::new("B", "Order Received", t(1)),
            Event::new("A", "Order Received", t(2)),
            Event::new("B", "Delivered", t(5)),
        ]);

        let dfg = DirectlyFollowsGraph::discover(&log);
        let e = dfg.edge("Order Received", "Delivered").unwrap();
        assert_eq!(e.frequency, 2);
        // (7h + 4h) / 2
        assert_eq!(e.mean_duration, TimeDelta::minutes(330));
        assert_eq!(dfg.edges().len(), 1);
    }

    #[test]
    fn self_loops_are_edges() {
        let t = |d: u32| Utc.with_ymd_and_hms(2026, 3, d, 0, 0, 0).unwrap();
        let log = EventLog::new(vec![
            Event::new("C", "Customs Check", t(1)),
            Event::new("C", "Customs Check", t(2)),
        ]);
        let dfg = DirectlyFollowsGraph::discover(&log);
        assert_eq!(dfg.edge("Customs Check", "Customs Check").unwrap().frequency, 1);
    }

    #[test]
    fn empty_log() {
        let dfg = DirectlyFollowsGraph::discover(&EventLog::default());
        assert!(dfg.is_empty());
        assert!(dfg.edges().is_empty());
        assert!(dfg.bottlenecks(3).is_empty());
    }
}
