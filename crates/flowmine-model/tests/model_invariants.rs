// SPDX-License-Identifier: Apache-2.0

use flowmine_model::{
    ActivityName, CaseId, DiscoveredModel, Event, ModelError, ModelMetadata, ParallelPair,
    Timestamp, Trace, Transition, ACTIVITY_MAX_LEN, CASE_ID_MAX_LEN,
};

fn activity(name: &str) -> ActivityName {
    ActivityName::parse(name).expect("activity")
}

fn empty_metadata() -> ModelMetadata {
    ModelMetadata {
        algorithm: "alpha-miner".to_string(),
        discovered_at: Timestamp::from_millis(0),
        trace_count: 0,
        event_count: 0,
        causal_relations: 0,
        parallel_relations: 0,
        choice_relations: 0,
    }
}

fn model_with(
    activities: Vec<ActivityName>,
    start: Vec<ActivityName>,
    end: Vec<ActivityName>,
    transitions: Vec<Transition>,
    parallel: Vec<ParallelPair>,
) -> DiscoveredModel {
    let mut model = DiscoveredModel {
        model_id: String::new(),
        activities,
        start_activities: start,
        end_activities: end,
        transitions,
        parallel_pairs: parallel,
        metadata: empty_metadata(),
    };
    model.model_id = model.fingerprint().expect("fingerprint");
    model
}

#[test]
fn case_id_rejects_hidden_trimming() {
    assert!(CaseId::parse("case-7").is_ok());
    assert!(CaseId::parse(" case-7").is_err());
    assert!(CaseId::parse("case-7 ").is_err());
    assert!(CaseId::parse("").is_err());
}

#[test]
fn activity_name_rejects_hidden_trimming() {
    assert!(ActivityName::parse("Approve Invoice").is_ok());
    assert!(ActivityName::parse(" Approve").is_err());
    assert!(ActivityName::parse("Approve ").is_err());
    assert!(ActivityName::parse("").is_err());
}

#[test]
fn max_size_limits_are_enforced() {
    let too_long_case = "c".repeat(CASE_ID_MAX_LEN + 1);
    assert!(CaseId::parse(&too_long_case).is_err());
    let too_long_activity = "a".repeat(ACTIVITY_MAX_LEN + 1);
    assert!(ActivityName::parse(&too_long_activity).is_err());
}

#[test]
fn timestamp_parses_rfc3339_and_epoch_millis() {
    let rfc = Timestamp::parse("1970-01-01T00:00:01Z").expect("rfc3339");
    assert_eq!(rfc.as_millis(), 1_000);
    let offset = Timestamp::parse("1970-01-01T01:00:00+01:00").expect("offset");
    assert_eq!(offset.as_millis(), 0);
    let fractional = Timestamp::parse("1970-01-01T00:00:00.250Z").expect("fractional");
    assert_eq!(fractional.as_millis(), 250);
    let millis = Timestamp::parse("1700000000000").expect("millis");
    assert_eq!(millis.as_millis(), 1_700_000_000_000);
    assert!(Timestamp::parse("yesterday").is_err());
    assert!(Timestamp::parse("").is_err());
}

#[test]
fn trace_orders_events_with_stable_tie_break() {
    let case = CaseId::parse("c1").expect("case");
    let events = vec![
        Event::new(case.clone(), activity("C"), Timestamp::from_millis(30)),
        Event::new(case.clone(), activity("A"), Timestamp::from_millis(10)),
        Event::new(case.clone(), activity("B1"), Timestamp::from_millis(20)),
        Event::new(case.clone(), activity("B2"), Timestamp::from_millis(20)),
    ];
    let trace = Trace::new(case, events);
    let order: Vec<&str> = trace
        .events()
        .iter()
        .map(|e| e.activity.as_str())
        .collect();
    assert_eq!(order, ["A", "B1", "B2", "C"]);
    assert_eq!(trace.span_millis(), 20);
}

#[test]
fn trace_activity_pairs_walk_consecutive_events() {
    let case = CaseId::parse("c1").expect("case");
    let events = vec![
        Event::new(case.clone(), activity("A"), Timestamp::from_millis(1)),
        Event::new(case.clone(), activity("B"), Timestamp::from_millis(2)),
        Event::new(case.clone(), activity("C"), Timestamp::from_millis(3)),
    ];
    let trace = Trace::new(case, events);
    let pairs: Vec<(&str, &str)> = trace
        .activity_pairs()
        .map(|(a, b)| (a.as_str(), b.as_str()))
        .collect();
    assert_eq!(pairs, [("A", "B"), ("B", "C")]);
}

#[test]
fn model_validate_accepts_closed_model() {
    let model = model_with(
        vec![activity("A"), activity("B"), activity("C")],
        vec![activity("A")],
        vec![activity("C")],
        vec![Transition {
            from: activity("A"),
            to: activity("B"),
            frequency: 1,
        }],
        vec![ParallelPair(activity("B"), activity("C"))],
    );
    model.validate().expect("closed model validates");
}

#[test]
fn model_validate_rejects_unknown_activities() {
    let model = model_with(
        vec![activity("A")],
        vec![activity("A")],
        vec![activity("Z")],
        vec![],
        vec![],
    );
    assert!(matches!(
        model.validate(),
        Err(ModelError::UnknownActivity { field: "end_activities", .. })
    ));
}

#[test]
fn model_validate_rejects_zero_frequency_and_duplicates() {
    let zero = model_with(
        vec![activity("A"), activity("B")],
        vec![activity("A")],
        vec![activity("B")],
        vec![Transition {
            from: activity("A"),
            to: activity("B"),
            frequency: 0,
        }],
        vec![],
    );
    assert!(matches!(zero.validate(), Err(ModelError::ZeroFrequency { .. })));

    let duplicated = model_with(
        vec![activity("A"), activity("A")],
        vec![],
        vec![],
        vec![],
        vec![],
    );
    assert!(matches!(
        duplicated.validate(),
        Err(ModelError::DuplicateActivity(_))
    ));
}

#[test]
fn model_validate_rejects_fingerprint_drift() {
    let mut model = model_with(vec![activity("A")], vec![], vec![], vec![], vec![]);
    model.model_id = "deadbeef".to_string();
    assert!(matches!(
        model.validate(),
        Err(ModelError::FingerprintMismatch { .. })
    ));
}

#[test]
fn parallel_pair_matches_both_directions() {
    let pair = ParallelPair(activity("B"), activity("C"));
    assert!(pair.contains(&activity("B"), &activity("C")));
    assert!(pair.contains(&activity("C"), &activity("B")));
    assert!(!pair.contains(&activity("A"), &activity("B")));
}
