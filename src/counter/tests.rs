use assert_call::{call, CallRecorder};
use rstest::rstest;

use super::*;

#[rstest]
#[case(0, inc(3), 3)]
#[case(3, dec(1), 2)]
#[case(2, AnyAction::new("UNKNOWN"), 2)]
#[case(5, AnyAction::new(INC), 6)]
#[case(5, AnyAction::new(DEC), 4)]
#[case(i64::MAX, inc(1), i64::MAX)]
fn reduce(#[case] state: i64, #[case] action: AnyAction, #[case] expected: i64) {
    assert_eq!(counter_reducer(&state, &action), expected);
}

#[test]
fn store_starts_at_one() {
    assert_eq!(*counter_store().get_state(), 1);
}

#[test]
fn subscriber_sees_each_state() {
    let mut cr = CallRecorder::new();
    let s = counter_store();
    let _s = s.subscribe(|x| call!("{}", x));

    s.dispatch(inc(1)).unwrap();
    s.dispatch(inc(2)).unwrap();
    s.dispatch(dec(10)).unwrap();
    s.dispatch(AnyAction::new("E")).unwrap();
    cr.verify(["2", "4", "-6", "-6"]);
}
