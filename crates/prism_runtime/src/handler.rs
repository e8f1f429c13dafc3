//! Drives analyses through a run.
//!
//! The handler owns the projection registry during setup, seals it into a
//! graph, checks every analysis against the run's beams, and then feeds
//! events through all remaining analyses. Each event gets a fresh
//! [`Event`] cache shared by every analysis.

use std::fmt;

use prism_engine::{CacheStats, Event, ProjectionGraph, ProjectionId, ProjectionRegistry};
use prism_foundation::{BeamPairs, Error, ErrorContext, ErrorKind, EventRecord, PdgId, Result};
use tracing::{debug, info, warn};

use crate::analysis::{Analysis, Outcome, Setup};
use crate::config::RunConfig;

// =============================================================================
// Statistics
// =============================================================================

/// Per-analysis event counts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisStats {
    /// Events the analysis accepted.
    pub accepted: u64,
    /// Events the analysis vetoed.
    pub vetoed: u64,
    /// Sum of accepted event weights.
    pub sum_w: f64,
}

/// Summary of one analysis after the run.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisSummary {
    /// Analysis name.
    pub name: String,
    /// Event counts.
    pub stats: AnalysisStats,
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Run name.
    pub name: String,
    /// Events processed.
    pub events: u64,
    /// Sum of event weights.
    pub sum_w: f64,
    /// Sum of squared event weights.
    pub sum_w2: f64,
    /// Analyses that took part, in registration order.
    pub analyses: Vec<AnalysisSummary>,
    /// Analyses dropped for incompatible beams.
    pub dropped: Vec<String>,
    /// Projection cache counters over all events.
    pub cache: CacheStats,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "run {}: {} events, sum of weights {}",
            self.name, self.events, self.sum_w
        )?;
        for analysis in &self.analyses {
            writeln!(
                f,
                "  {}: {} accepted, {} vetoed",
                analysis.name, analysis.stats.accepted, analysis.stats.vetoed
            )?;
        }
        write!(
            f,
            "  cache: {} computed, {} hits",
            self.cache.computed, self.cache.hits
        )
    }
}

// =============================================================================
// Handler
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Setup,
    Running,
    Finished,
}

struct Entry {
    analysis: Box<dyn Analysis>,
    projections: Vec<ProjectionId>,
    beams: Option<BeamPairs>,
    stats: AnalysisStats,
}

impl Entry {
    fn name(&self) -> &str {
        self.analysis.name()
    }
}

/// Runs a set of analyses over a stream of events.
pub struct AnalysisHandler {
    config: RunConfig,
    phase: Phase,
    registry: Option<ProjectionRegistry>,
    graph: Option<ProjectionGraph>,
    entries: Vec<Entry>,
    dropped: Vec<String>,
    beams_checked: bool,
    events: u64,
    sum_w: f64,
    sum_w2: f64,
    cache: CacheStats,
}

impl AnalysisHandler {
    /// Creates a handler for the given run.
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            phase: Phase::Setup,
            registry: Some(ProjectionRegistry::new()),
            graph: None,
            entries: Vec::new(),
            dropped: Vec::new(),
            beams_checked: false,
            events: 0,
            sum_w: 0.0,
            sum_w2: 0.0,
            cache: CacheStats::default(),
        }
    }

    /// Adds an analysis.
    ///
    /// # Errors
    /// Returns an analysis error if the run already started or the name is
    /// already taken.
    pub fn add_analysis(&mut self, analysis: impl Analysis + 'static) -> Result<&mut Self> {
        let name = analysis.name().to_string();
        if self.phase != Phase::Setup {
            return Err(analysis_error(&name, "cannot add an analysis after initialisation"));
        }
        if self.entries.iter().any(|e| e.name() == name) {
            return Err(analysis_error(&name, "an analysis with this name is already registered"));
        }
        self.entries.push(Entry {
            analysis: Box::new(analysis),
            projections: Vec::new(),
            beams: None,
            stats: AnalysisStats::default(),
        });
        Ok(self)
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The sealed projection graph, once initialised.
    #[must_use]
    pub fn graph(&self) -> Option<&ProjectionGraph> {
        self.graph.as_ref()
    }

    /// Names of the analyses still taking part.
    pub fn analysis_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::name)
    }

    /// Names of analyses dropped for incompatible beams.
    #[must_use]
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    /// Events processed so far.
    #[must_use]
    pub fn events(&self) -> u64 {
        self.events
    }

    /// Initialises all analyses and seals the projection graph.
    ///
    /// If the run beams are configured, incompatible analyses are dropped
    /// here; otherwise the check happens on the first event with beams.
    ///
    /// # Errors
    /// Any setup error from an analysis, from sealing, or from constraint
    /// aggregation. Also fails if no analysis is compatible with the beams.
    pub fn init(&mut self) -> Result<()> {
        if self.phase != Phase::Setup {
            return Ok(());
        }
        let mut registry = self
            .registry
            .take()
            .ok_or_else(|| Error::internal("projection registry already consumed"))?;

        for entry in &mut self.entries {
            let name = entry.analysis.name().to_string();
            let mut setup = Setup::new(&mut registry, &name);
            entry.analysis.init(&mut setup)?;
            entry.projections = setup.into_declared();
            debug!(analysis = %name, projections = entry.projections.len(), "initialised analysis");
        }

        let graph = registry.seal()?;
        for entry in &mut self.entries {
            let beams = graph
                .combined_beams(entry.projections.iter().copied())
                .map_err(|e| e.in_frame(entry.analysis.name().to_string()))?;
            entry.beams = Some(beams.intersect(&entry.analysis.required_beams()));
        }
        info!(
            run = %self.config.name,
            analyses = self.entries.len(),
            projections = graph.len(),
            distinct = graph.identity_count(),
            "initialised run"
        );
        self.graph = Some(graph);
        self.phase = Phase::Running;

        if let Some((a, b)) = self.config.beams {
            self.check_beams(a, b)?;
        }
        Ok(())
    }

    /// Drops analyses that do not accept the collision of `a` on `b`.
    fn check_beams(&mut self, a: PdgId, b: PdgId) -> Result<()> {
        self.beams_checked = true;
        if self.config.ignore_beams {
            return Ok(());
        }
        let before = self.entries.len();
        let dropped = &mut self.dropped;
        self.entries.retain(|entry| {
            let compatible = entry.beams.as_ref().is_some_and(|beams| beams.accepts(a, b));
            if !compatible {
                warn!(
                    analysis = %entry.name(),
                    beams = %format!("{a} {b}"),
                    "analysis is not compatible with the run beams and will not be run"
                );
                dropped.push(entry.name().to_string());
            }
            compatible
        });
        if before > 0 && self.entries.is_empty() {
            return Err(Error::configuration(format!(
                "no analysis is compatible with beams {a} {b}"
            )));
        }
        Ok(())
    }

    /// Runs every analysis on one event.
    ///
    /// Returns the number of analyses that accepted the event.
    ///
    /// # Errors
    /// Returns an error if the handler was not initialised, if beam
    /// checking drops every analysis, or if an analysis fails.
    pub fn analyze(&mut self, record: EventRecord) -> Result<usize> {
        if self.phase == Phase::Setup {
            self.init()?;
        }
        if self.phase == Phase::Finished {
            return Err(Error::configuration("run already finalised"));
        }
        if !self.beams_checked {
            if let Some((a, b)) = record.beam_ids() {
                info!(beams = %format!("{a} {b}"), "run beams taken from the first event");
                self.check_beams(a, b)?;
            }
        }

        let Self {
            graph,
            entries,
            events,
            sum_w,
            sum_w2,
            cache,
            ..
        } = self;
        let graph = graph
            .as_ref()
            .ok_or_else(|| Error::internal("projection graph missing after init"))?;

        let event = Event::new(graph, record);
        let weight = event.weight();
        let number = event.number();
        let mut accepted = 0;
        for entry in entries.iter_mut() {
            let outcome = entry.analysis.analyze(&event).map_err(|e| {
                let context = e.context.clone().unwrap_or_else(ErrorContext::new);
                e.with_context(context.with_event(number).with_frame(entry.analysis.name()))
            })?;
            match outcome {
                Outcome::Accepted => {
                    accepted += 1;
                    entry.stats.accepted += 1;
                    entry.stats.sum_w += weight;
                }
                Outcome::Vetoed(reason) => {
                    entry.stats.vetoed += 1;
                    debug!(analysis = %entry.name(), event = number, %reason, "event vetoed");
                }
            }
        }

        *events += 1;
        *sum_w += weight;
        *sum_w2 += weight * weight;
        cache.merge(event.stats());
        Ok(accepted)
    }

    /// Processes records until they run out or `max_events` is reached,
    /// then finalises.
    ///
    /// # Errors
    /// Any error from [`init`](Self::init), [`analyze`](Self::analyze), or
    /// [`finalize`](Self::finalize).
    pub fn run<I>(&mut self, records: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = EventRecord>,
    {
        self.init()?;
        for record in records {
            if self.config.max_events.is_some_and(|max| self.events >= max) {
                info!(max = self.events, "event limit reached");
                break;
            }
            self.analyze(record)?;
        }
        self.finalize()
    }

    /// Finalises every analysis and returns the run summary.
    ///
    /// # Errors
    /// Returns the first analysis finalisation error.
    pub fn finalize(&mut self) -> Result<RunSummary> {
        if self.phase == Phase::Setup {
            self.init()?;
        }
        if self.phase == Phase::Running {
            for entry in &mut self.entries {
                let name = entry.analysis.name().to_string();
                entry.analysis.finalize().map_err(|e| e.in_frame(name))?;
            }
            self.phase = Phase::Finished;
        }

        let summary = RunSummary {
            name: self.config.name.clone(),
            events: self.events,
            sum_w: self.sum_w,
            sum_w2: self.sum_w2,
            analyses: self
                .entries
                .iter()
                .map(|e| AnalysisSummary {
                    name: e.name().to_string(),
                    stats: e.stats.clone(),
                })
                .collect(),
            dropped: self.dropped.clone(),
            cache: self.cache,
        };
        info!(
            run = %summary.name,
            events = summary.events,
            computed = summary.cache.computed,
            hits = summary.cache.hits,
            "finished run"
        );
        Ok(summary)
    }
}

impl fmt::Debug for AnalysisHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisHandler")
            .field("run", &self.config.name)
            .field("phase", &self.phase)
            .field("analyses", &self.entries.len())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

fn analysis_error(analysis: &str, message: &str) -> Error {
    Error::new(ErrorKind::Analysis {
        analysis: analysis.to_string(),
        message: message.to_string(),
    })
}
