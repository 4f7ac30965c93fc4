use std::{cell::RefCell, rc::Rc};

use assert_call::{call, CallRecorder};

use super::*;

#[test]
fn notify_in_registration_order() {
    let mut cr = CallRecorder::new();
    let ls = RefCell::new(Listeners::<i32>::new());
    ls.borrow_mut().insert(|x| call!("a{}", x));
    ls.borrow_mut().insert(|x| call!("b{}", x));
    ls.borrow_mut().insert(|x| call!("c{}", x));

    Listeners::notify(&ls, &1);
    cr.verify(["a1", "b1", "c1"]);
}

#[test]
fn remove_is_idempotent() {
    let mut ls = Listeners::<i32>::new();
    let id = ls.insert(|_| {});
    assert_eq!(ls.len(), 1);
    assert!(ls.remove(id));
    assert!(!ls.remove(id));
    assert!(ls.is_empty());
}

#[test]
fn ids_are_not_reused() {
    let mut ls = Listeners::<i32>::new();
    let a = ls.insert(|_| {});
    ls.remove(a);
    let b = ls.insert(|_| {});
    assert_ne!(a, b);
    assert!(!ls.contains(a));
    assert!(ls.contains(b));
}

#[test]
fn removed_during_notify_is_skipped() {
    let mut cr = CallRecorder::new();
    let ls = Rc::new(RefCell::new(Listeners::<i32>::new()));
    let second = Rc::new(RefCell::new(None));
    let ls0 = ls.clone();
    let second0 = second.clone();
    ls.borrow_mut().insert(move |_| {
        call!("first");
        if let Some(id) = second0.borrow_mut().take() {
            ls0.borrow_mut().remove(id);
        }
    });
    *second.borrow_mut() = Some(ls.borrow_mut().insert(|_| call!("second")));

    Listeners::notify(&ls, &0);
    cr.verify("first");
    Listeners::notify(&ls, &0);
    cr.verify("first");
}

#[test]
fn added_during_notify_waits_for_next() {
    let mut cr = CallRecorder::new();
    let ls = Rc::new(RefCell::new(Listeners::<i32>::new()));
    let ls0 = ls.clone();
    let added = Rc::new(RefCell::new(false));
    ls.borrow_mut().insert(move |_| {
        call!("first");
        if !added.replace(true) {
            ls0.borrow_mut().insert(|_| call!("late"));
        }
    });

    Listeners::notify(&ls, &0);
    cr.verify("first");
    Listeners::notify(&ls, &0);
    cr.verify(["first", "late"]);
}

#[test]
fn unsized_payload() {
    let mut cr = CallRecorder::new();
    let ls = RefCell::new(Listeners::<[i32]>::new());
    ls.borrow_mut().insert(|xs| call!("{}", xs.len()));
    Listeners::notify(&ls, &[1, 2, 3][..]);
    cr.verify("3");
}

#[test]
fn display_id() {
    let mut ls = Listeners::<i32>::new();
    let id = ls.insert(|_| {});
    assert_eq!(id.to_string(), "#0");
}

#[test]
fn notify_latest_reads_value_per_listener() {
    let mut cr = CallRecorder::new();
    let value = Rc::new(RefCell::new(Rc::new(1)));
    let ls = RefCell::new(Listeners::<i32>::new());
    let v = value.clone();
    ls.borrow_mut().insert(move |x| {
        call!("a{}", x);
        *v.borrow_mut() = Rc::new(2);
    });
    ls.borrow_mut().insert(|x| call!("b{}", x));

    Listeners::notify_latest(&ls, || value.borrow().clone());
    cr.verify(["a1", "b2"]);
}
