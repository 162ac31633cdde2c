#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::{json, Value};
use vitalproxy_core::domain::PatientFeatures;

fn sample() -> Value {
    json!({
        "age": 65,
        "sex": "Male",
        "bmi": 28.5,
        "systolic_bp": 140,
        "diastolic_bp": 90,
        "glucose": 110.0,
        "cholesterol": 200.0,
        "creatinine": 1.2,
        "diabetes": 1,
        "hypertension": 1,
        "diagnosis": "Heart Failure",
        "readmission_30d": 0
    })
}

#[test]
fn accepts_complete_record() {
    let p: PatientFeatures = serde_json::from_value(sample()).expect("must parse");
    assert_eq!(p.age, 65);
    assert_eq!(p.diagnosis, "Heart Failure");
    assert_eq!(p.readmission_30d, 0);
}

#[test]
fn integer_literals_accepted_for_float_fields() {
    let mut v = sample();
    v["glucose"] = json!(110);
    let p: PatientFeatures = serde_json::from_value(v).expect("must parse");
    assert_eq!(p.glucose, 110.0);
}

#[test]
fn every_field_is_required() {
    let full = sample();
    for key in full.as_object().unwrap().keys() {
        let mut v = full.clone();
        v.as_object_mut().unwrap().remove(key);
        let res = serde_json::from_value::<PatientFeatures>(v);
        assert!(res.is_err(), "missing {key} must be rejected");
    }
}

#[test]
fn mistyped_fields_rejected() {
    let cases = [
        ("age", json!("not_a_number")),
        ("age", json!(65.5)),
        ("sex", json!(1)),
        ("bmi", json!("heavy")),
        ("diabetes", json!(true)),
        ("diagnosis", json!(null)),
    ];
    for (key, bad) in cases {
        let mut v = sample();
        v[key] = bad.clone();
        assert!(
            serde_json::from_value::<PatientFeatures>(v).is_err(),
            "{key}={bad} must be rejected"
        );
    }
}

#[test]
fn scoring_payload_wraps_features_and_adds_placeholder() {
    let p: PatientFeatures = serde_json::from_value(sample()).unwrap();
    let payload = serde_json::to_value(p.to_scoring_payload()).unwrap();

    let features = payload["features"].as_object().expect("features object");
    assert_eq!(features.len(), 13);
    assert_eq!(features["mortality"], json!("0"));
    for (k, v) in sample().as_object().unwrap() {
        assert_eq!(&features[k], v, "field {k} forwarded unmodified");
    }
    assert_eq!(payload.as_object().unwrap().len(), 1);
}
