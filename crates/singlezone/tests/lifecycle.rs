mod common;

use onezone_core::{Args, Constant, EvaluationError, Imf};
use onezone_singlezone::{
    Action, Config, ConfigurationError, Error, Event, Phase, SingleZone, Status, Timeline,
};

#[test]
fn validation_is_idempotent() {
    let mut valid = SingleZone::new(common::star_forming());
    assert_eq!(valid.validate(), Ok(()));
    assert_eq!(valid.validate(), Ok(()));
    assert_eq!(valid.phase(), Phase::Validated);
    assert_eq!(valid.history().len(), 1);

    let mut invalid = SingleZone::new(common::star_forming().with_element(common::oxygen()));
    let first = invalid.validate();
    let second = invalid.validate();
    assert_eq!(
        first,
        Err(Error::Configuration(ConfigurationError::DuplicateSpecies(
            "O".into()
        ))),
    );
    assert_eq!(first, second);
    assert_eq!(invalid.phase(), Phase::Constructed);
}

#[test]
fn advance_after_finalization_is_rejected_without_mutation() {
    let mut zone = SingleZone::new(common::star_forming());
    assert_eq!(zone.run_unobserved(), Ok(Status::Complete));
    assert_eq!(zone.phase(), Phase::Finalized);

    let history = zone.history().to_vec();
    let time = zone.time();
    let budget = *zone.mass_budget().unwrap();

    for _ in 0..3 {
        assert_eq!(
            zone.advance(),
            Err(Error::InvalidState {
                operation: "advance",
                phase: Phase::Finalized,
            }),
        );
    }
    assert_eq!(
        zone.run_unobserved(),
        Err(Error::InvalidState {
            operation: "run",
            phase: Phase::Finalized,
        }),
    );

    assert_eq!(zone.history(), history.as_slice());
    assert_eq!(zone.time(), time);
    assert_eq!(*zone.mass_budget().unwrap(), budget);
}

#[test]
fn invalid_state_errors_name_the_phase() {
    let mut zone = SingleZone::new(common::star_forming());
    let error = zone.advance().unwrap_err();
    assert_eq!(error.to_string(), "cannot advance while the run is constructed");
}

#[test]
fn stopped_runs_resume_where_they_left_off() {
    let mut uninterrupted = SingleZone::new(common::star_forming());
    uninterrupted.run_unobserved().unwrap();

    let mut resumed = SingleZone::new(common::star_forming());
    let status = resumed
        .run(|event: &Event<'_>| (event.step == 40).then_some(Action::StopEarly))
        .unwrap();
    assert_eq!(status, Status::StoppedByObserver);
    assert_eq!(resumed.phase(), Phase::Running);
    assert_eq!(resumed.step(), 40);

    assert_eq!(resumed.run_unobserved(), Ok(Status::Complete));
    assert_eq!(resumed.into_history(), uninterrupted.into_history());
}

#[test]
fn observer_can_stop_before_the_first_step() {
    let mut zone = SingleZone::new(common::star_forming());
    let status = zone
        .run(|_: &Event<'_>| Some(Action::StopEarly))
        .unwrap();

    assert_eq!(status, Status::StoppedByObserver);
    assert_eq!(zone.phase(), Phase::Validated);
    assert_eq!(zone.step(), 0);
}

#[test]
fn failed_runs_are_finalized() {
    let config = common::star_forming().with_mass_loading(|t: f64| if t < 0.5 { 1.0 } else { -1.0 });
    let mut zone = SingleZone::new(config);

    let error = zone.run_unobserved().unwrap_err();
    assert!(matches!(error, Error::Evaluation(_)), "{error}");
    assert_eq!(zone.phase(), Phase::Finalized);
    assert!(zone.time() < 0.5 + 1e-9);
    assert!(matches!(zone.advance(), Err(Error::InvalidState { .. })));
}

#[test]
fn imf_failures_finalize_the_run_at_start() {
    let truncated = Imf::custom(|m: f64| if m > 50.0 { -1.0 } else { m.powf(-2.3) });
    let mut zone = SingleZone::new(common::star_forming().with_imf(truncated));
    zone.validate().unwrap();

    let error = zone.advance().unwrap_err();
    assert!(
        matches!(
            error,
            Error::Evaluation(EvaluationError::Domain { args: Args::One(m), .. }) if m > 50.0
        ),
        "{error}",
    );
    assert_eq!(zone.phase(), Phase::Finalized);
    assert_eq!(zone.step(), 0);
    assert_eq!(zone.history().len(), 1);
    assert!(matches!(zone.advance(), Err(Error::InvalidState { .. })));
}

#[test]
fn oversized_timelines_fail_validation() {
    for step in [1e-300, 1e-9] {
        let config = common::star_forming().with_timeline(Timeline::new(0.0, 13.0, step));
        let mut zone = SingleZone::new(config);

        let error = zone.validate().unwrap_err();
        assert!(
            matches!(&error, Error::Configuration(e) if e.field() == "timeline.step"),
            "{error}",
        );
        assert_eq!(zone.phase(), Phase::Constructed);
        assert!(zone.history().is_empty());
    }
}

#[test]
fn single_step_timelines_finalize_immediately() {
    let config = Config::new(Timeline::new(0.0, 0.01, 0.01))
        .with_imf(Imf::Salpeter)
        .with_star_formation_efficiency(Constant(1.0))
        .with_inflow(Constant(0.0))
        .with_mass_loading(Constant(0.0));
    let mut zone = SingleZone::new(config);

    zone.validate().unwrap();
    zone.advance().unwrap();
    assert_eq!(zone.phase(), Phase::Finalized);
    assert_eq!(zone.history().len(), 2);
}
