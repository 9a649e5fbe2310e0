//! Test to verify test infrastructure works correctly

mod common;

use common::builders::{example_log, SessionLogBuilder};
use replaysync_rs::types::EventRole;

#[test]
fn test_infrastructure_setup() {
    let log = SessionLogBuilder::new()
        .counterpart(0.0, "hello")
        .scored(4.5, 77, "solid")
        .build();

    assert_eq!(log.messages.len(), 2);
    assert_eq!(log.messages[0].role, EventRole::Counterpart);
    assert_eq!(log.messages[1].score, Some(77));
}

#[test]
fn test_example_log_shape() {
    let log = example_log();
    assert_eq!(log.messages.len(), 3);
    assert_eq!(log.messages[1].score, Some(82));
    assert_eq!(log.messages[2].score, Some(45));
}

#[test]
fn test_float_comparison() {
    common::assert_float_eq(1.0, 1.0000001, 0.001);
}

#[test]
#[should_panic]
fn test_float_comparison_fails() {
    common::assert_float_eq(1.0, 2.0, 0.001);
}
