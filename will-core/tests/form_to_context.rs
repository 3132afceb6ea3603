//! Public API path from an accepted form to the two render-ready contexts.

use pretty_assertions::assert_eq;
use will_core::context::build_will_context;
use will_core::document::prepare_context;
use will_core::mirror::derive_mirror;
use will_core::{ContextValue, FormFields, FormSession, FormStep, StepPosition};

fn data(pairs: &[(&str, &str)]) -> FormFields {
    pairs.iter().copied().collect()
}

fn completed_session() -> FormSession {
    let mut session = FormSession::new();
    let payloads = [
        data(&[
            ("name", "Jane Doe"),
            ("gender", "Female"),
            ("dob", "1980-05-01"),
            ("phone", "4165550100"),
            ("email", "jane@example.com"),
            ("street_number", "1"),
            ("street_name", "main st"),
            ("city", "springfield"),
            ("regional_municipality", "metro"),
            ("province", "on"),
            ("postal_code", "a1a1a1"),
        ]),
        data(&[
            ("exec1_name", "John Doe"),
            ("exec1_relation", "Wife"),
            ("exec1_dob", "1978-03-02"),
        ]),
        data(&[
            ("beneficiary_1_name", "Kid One"),
            ("beneficiary_1_relation", "son"),
            ("beneficiary_1_dob", "2010-02-01"),
            ("beneficiary_2_name", "Kid Two"),
            ("beneficiary_2_relation", "daughter"),
            ("beneficiary_2_dob", "2012-06-30"),
            ("equal_shares", "on"),
        ]),
        FormFields::new(),
        data(&[("terms_agreement", "yes"), ("mirror_will", "true")]),
    ];
    for (step, payload) in FormStep::ALL.into_iter().zip(payloads) {
        session.submit(step, payload).unwrap();
    }
    session
}

#[test]
fn completed_session_builds_equal_share_context() {
    let session = completed_session();
    assert_eq!(session.current_step, StepPosition::Complete);

    let prepared = prepare_context(&build_will_context(&session.accumulator));

    assert_eq!(prepared.text("name"), "JANE DOE");
    assert_eq!(prepared.text("dob"), "1980-05-01");
    assert_eq!(prepared.text("equal_share_percentage"), "50.00");
    assert_eq!(prepared.get("equal_shares"), Some(&ContextValue::Bool(true)));
    match prepared.get("beneficiaries") {
        Some(ContextValue::List(items)) => assert_eq!(items.len(), 2),
        other => panic!("unexpected beneficiaries: {other:?}"),
    }
}

#[test]
fn mirror_of_completed_session_swaps_roles() {
    let context = build_will_context(&completed_session().accumulator);

    let mirror = derive_mirror(&context).unwrap();

    assert_eq!(mirror.context().text("name"), "JOHN DOE");
    assert_eq!(mirror.context().text("executor_name_one"), "JANE DOE");
    assert_eq!(mirror.context().text("gender"), "MALE");
    assert_eq!(mirror.context().text("pronoun"), "HIS");
    assert_eq!(context.text("executor_name_one"), "John Doe");
}
