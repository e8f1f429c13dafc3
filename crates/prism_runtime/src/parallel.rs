//! Parallel event processing.
//!
//! Events are independent: each worker builds its own [`Event`] over the
//! shared, immutable [`ProjectionGraph`]. No cache state crosses events.

use prism_engine::{Event, ProjectionGraph};
use prism_foundation::{EventRecord, Result};
use rayon::prelude::*;
use tracing::debug;

/// Applies `f` to every record on the rayon thread pool.
///
/// Results come back in input order.
///
/// # Errors
/// Returns the first error produced by `f`.
pub fn project_events<T, F>(graph: &ProjectionGraph, records: Vec<EventRecord>, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&Event<'_>) -> Result<T> + Sync,
{
    debug!(events = records.len(), "projecting events in parallel");
    records
        .into_par_iter()
        .map(|record| {
            let event = Event::new(graph, record);
            f(&event)
        })
        .collect()
}
