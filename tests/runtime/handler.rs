//! Integration tests for the analysis handler

use prism_engine::Handle;
use prism_engine::projections::FinalState;
use prism_foundation::{BeamPairs, Comparison, Error, ErrorKind, PdgId, Quantity, Result};
use prism_runtime::{Analysis, AnalysisHandler, Outcome, RunConfig, Setup};

use crate::{Electrons, pp_event};

fn lhc() -> BeamPairs {
    BeamPairs::single(PdgId::PROTON, PdgId::PROTON)
}

fn lep() -> BeamPairs {
    BeamPairs::single(PdgId::ELECTRON, PdgId::POSITRON)
}

// =============================================================================
// Running
// =============================================================================

#[test]
fn identical_analyses_share_projection_values() {
    let mut handler = AnalysisHandler::new(RunConfig::new("shared"));
    handler
        .add_analysis(Electrons::new("A", 2.47, 1))
        .unwrap()
        .add_analysis(Electrons::new("B", 2.47, 1))
        .unwrap();

    let summary = handler.run((0..3).map(pp_event)).unwrap();
    assert_eq!(summary.events, 3);
    assert!((summary.sum_w - 6.0).abs() < 1e-12);
    assert!((summary.sum_w2 - 12.0).abs() < 1e-12);
    // Final state and selection once per event; B's selection is a hit.
    assert_eq!(summary.cache.computed, 6);
    assert_eq!(summary.cache.hits, 3);
    assert!(summary.analyses.iter().all(|a| a.stats.accepted == 3));
    assert_eq!(handler.graph().unwrap().identity_count(), 2);
}

#[test]
fn vetoes_stay_with_the_vetoing_analysis() {
    let mut handler = AnalysisHandler::new(RunConfig::new("vetoes"));
    handler
        .add_analysis(Electrons::new("single", 2.47, 1))
        .unwrap()
        .add_analysis(Electrons::new("pair", 2.47, 2))
        .unwrap()
        .add_analysis(Electrons::new("wide-pair", 2.5, 2))
        .unwrap();

    let summary = handler.run((0..4).map(pp_event)).unwrap();
    let stats: Vec<(u64, u64)> = summary
        .analyses
        .iter()
        .map(|a| (a.stats.accepted, a.stats.vetoed))
        .collect();
    assert_eq!(stats, vec![(4, 0), (0, 4), (4, 0)]);
    assert!((summary.analyses[0].stats.sum_w - 8.0).abs() < 1e-12);
    assert!(summary.to_string().contains("pair: 0 accepted, 4 vetoed"));
}

#[test]
fn event_limit_stops_the_run() {
    let mut handler = AnalysisHandler::new(RunConfig::new("limited").with_max_events(2));
    handler.add_analysis(Electrons::new("A", 2.47, 1)).unwrap();
    let summary = handler.run((0..10).map(pp_event)).unwrap();
    assert_eq!(summary.events, 2);
    assert_eq!(handler.events(), 2);
}

/// Looks at soft and hard particles through two separate final states.
#[derive(Default)]
struct SoftAndHard {
    soft: Option<Handle<FinalState>>,
    hard: Option<Handle<FinalState>>,
}

impl Analysis for SoftAndHard {
    fn name(&self) -> &str {
        "SOFT_AND_HARD"
    }

    fn init(&mut self, setup: &mut Setup<'_>) -> Result<()> {
        self.soft = Some(setup.register(FinalState::new().with_cut(Quantity::Pt, Comparison::Less, 15.0)?)?);
        self.hard = Some(setup.register(FinalState::new().with_cut(Quantity::Pt, Comparison::Greater, 20.0)?)?);
        Ok(())
    }

    fn analyze(&mut self, event: &prism_engine::Event<'_>) -> Result<Outcome> {
        let (Some(soft), Some(hard)) = (self.soft, self.hard) else {
            return Err(Error::configuration("analysis used before init"));
        };
        let soft = event.apply(soft)?.value().map_or(0, Vec::len);
        let hard = event.apply(hard)?.value().map_or(0, Vec::len);
        Ok(if soft == 1 && hard == 4 {
            Outcome::Accepted
        } else {
            Outcome::veto(format!("{soft} soft, {hard} hard"))
        })
    }
}

#[test]
fn independent_projections_may_cut_disjoint_ranges() {
    let mut handler = AnalysisHandler::new(RunConfig::new("disjoint").with_beams(PdgId::PROTON, PdgId::PROTON));
    handler.add_analysis(SoftAndHard::default()).unwrap();
    handler.init().unwrap();
    assert_eq!(handler.analysis_names().collect::<Vec<_>>(), vec!["SOFT_AND_HARD"]);

    let summary = handler.run((0..2).map(pp_event)).unwrap();
    assert_eq!(summary.analyses[0].stats.accepted, 2);
}

// =============================================================================
// Beam Compatibility
// =============================================================================

#[test]
fn configured_beams_drop_incompatible_analyses_at_init() {
    let config = RunConfig::new("lhc").with_beams(PdgId::PROTON, PdgId::PROTON);
    let mut handler = AnalysisHandler::new(config);
    handler
        .add_analysis(Electrons::new("LHC", 2.47, 1).for_beams(lhc()))
        .unwrap()
        .add_analysis(Electrons::new("LEP", 2.47, 1).for_beams(lep()))
        .unwrap();

    handler.init().unwrap();
    assert_eq!(handler.dropped(), ["LEP".to_string()]);
    assert_eq!(handler.analysis_names().collect::<Vec<_>>(), vec!["LHC"]);
}

#[test]
fn beams_are_read_from_the_first_event() {
    let mut handler = AnalysisHandler::new(RunConfig::new("deferred"));
    handler
        .add_analysis(Electrons::new("LEP", 2.47, 1).for_beams(lep()))
        .unwrap()
        .add_analysis(Electrons::new("LHC", 2.47, 1).for_beams(lhc()))
        .unwrap();

    handler.init().unwrap();
    assert!(handler.dropped().is_empty());

    let accepted = handler.analyze(pp_event(1)).unwrap();
    assert_eq!(accepted, 1);
    assert_eq!(handler.dropped(), ["LEP".to_string()]);

    let summary = handler.finalize().unwrap();
    assert_eq!(summary.analyses.len(), 1);
    assert_eq!(summary.dropped, vec!["LEP".to_string()]);
}

#[test]
fn no_compatible_analysis_is_a_configuration_error() {
    let config = RunConfig::new("lep-only").with_beams(PdgId::PROTON, PdgId::PROTON);
    let mut handler = AnalysisHandler::new(config);
    handler
        .add_analysis(Electrons::new("LEP", 2.47, 1).for_beams(lep()))
        .unwrap();
    let err = handler.init().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Configuration(_)));
}

#[test]
fn ignoring_beams_keeps_every_analysis() {
    let config = RunConfig::new("forced")
        .with_beams(PdgId::PROTON, PdgId::PROTON)
        .with_ignore_beams(true);
    let mut handler = AnalysisHandler::new(config);
    handler
        .add_analysis(Electrons::new("LEP", 2.47, 1).for_beams(lep()))
        .unwrap();
    let summary = handler.run([pp_event(1)]).unwrap();
    assert!(summary.dropped.is_empty());
    assert_eq!(summary.analyses[0].stats.accepted, 1);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn duplicate_and_late_analyses_are_rejected() {
    let mut handler = AnalysisHandler::new(RunConfig::new("dupes"));
    handler.add_analysis(Electrons::new("A", 2.47, 1)).unwrap();
    let dup = handler.add_analysis(Electrons::new("A", 2.5, 1)).unwrap_err();
    assert!(matches!(dup.kind, ErrorKind::Analysis { .. }));

    handler.init().unwrap();
    let late = handler.add_analysis(Electrons::new("B", 2.5, 1)).unwrap_err();
    assert!(matches!(late.kind, ErrorKind::Analysis { .. }));
}

struct Failing;

impl Analysis for Failing {
    fn name(&self) -> &str {
        "FAILING"
    }

    fn init(&mut self, _: &mut Setup<'_>) -> Result<()> {
        Ok(())
    }

    fn analyze(&mut self, event: &prism_engine::Event<'_>) -> Result<Outcome> {
        if event.number() == 2 {
            return Err(Error::internal("histogram overflow"));
        }
        Ok(Outcome::Accepted)
    }
}

#[test]
fn analysis_errors_carry_event_and_analysis() {
    let mut handler = AnalysisHandler::new(RunConfig::new("failing"));
    handler.add_analysis(Failing).unwrap();
    let err = handler.run((0..5).map(pp_event)).unwrap_err();

    let context = err.context.unwrap();
    assert_eq!(context.event, Some(2));
    assert_eq!(context.stack, vec!["FAILING"]);
    assert_eq!(handler.events(), 2);
}
