#![cfg(feature = "serde-derive")]

mod common;

use onezone_singlezone::{DelayTimeDistribution, Parameters, Recycling, SingleZone, Timeline};

#[test]
fn parameters_load_from_json() {
    let parameters: Parameters = serde_json::from_str(
        r#"{
            "initial_gas_mass": 1e10,
            "hydrogen_fraction": 0.75,
            "recycling": { "kind": "continuous" },
            "delay_time_distribution": { "kind": "power_law", "slope": -1.0 },
            "ia_minimum_delay": 0.1
        }"#,
    )
    .unwrap();

    assert_eq!(parameters.initial_gas_mass, 1e10);
    assert_eq!(parameters.recycling, Recycling::Continuous);
    assert_eq!(
        parameters.delay_time_distribution,
        DelayTimeDistribution::PowerLaw { slope: -1.0 }
    );
    assert_eq!(parameters.upper_stellar_mass, 100.0);

    let config = common::star_forming_with(parameters);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn unknown_recycling_kinds_are_rejected() {
    let result: Result<Recycling, _> = serde_json::from_str(r#"{ "kind": "delayed" }"#);
    assert!(result.is_err());
}

#[test]
fn snapshots_serialize() {
    let config = common::star_forming();
    let timeline = *config.timeline();
    assert_eq!(timeline, Timeline::new(0.0, 2.0, 0.01));

    let mut zone = SingleZone::new(config);
    zone.validate().unwrap();
    zone.advance().unwrap();

    let initial = serde_json::to_value(&zone.history()[0]).unwrap();
    assert_eq!(initial["step"], 0);
    assert_eq!(initial["elements"][0]["symbol"], "O");
    // [O/H] is -inf with no oxygen, which JSON has no number for.
    assert!(initial["elements"][0]["abundance"].is_null());

    let first = serde_json::to_value(zone.latest().unwrap()).unwrap();
    assert!(first["star_formation_rate"].as_f64().unwrap() > 0.0);
    assert!(first["diagnostics"].as_array().unwrap().is_empty());

    let budget = serde_json::to_value(zone.mass_budget().unwrap()).unwrap();
    assert!(budget["formed"].as_f64().unwrap() > 0.0);
}
