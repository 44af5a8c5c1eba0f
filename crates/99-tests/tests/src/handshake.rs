use data_channel::handshake::{GET_VERSION_KEY, VERSION_RESULT_KEY};

use crate::{recorder, TwoProcess};

#[test]
fn matching_builds_report_equal() {
    let processes = TwoProcess::with_versions("v1", "v1");
    processes.register_both().expect("register");

    let (seen, callback) = recorder::<bool>();
    processes
        .module_namespace()
        .expect("module namespace")
        .checking_version_equals(callback)
        .expect("request");
    processes.pump();

    assert_eq!(*seen.lock(), vec![true]);
}

#[test]
fn stale_host_build_reports_unequal() {
    let processes = TwoProcess::with_versions("v1", "v2");
    processes.register_both().expect("register");

    let (seen, callback) = recorder::<bool>();
    processes
        .module_namespace()
        .expect("module namespace")
        .checking_version_equals(callback)
        .expect("request");
    processes.pump();

    assert_eq!(*seen.lock(), vec![false]);
}

#[test]
fn host_can_ask_the_module() {
    let processes = TwoProcess::with_versions("v3", "v3");
    processes.register_both().expect("register");

    let (seen, callback) = recorder::<bool>();
    processes
        .host_namespace()
        .expect("host namespace")
        .checking_version_equals(callback)
        .expect("request");
    processes.pump();

    assert_eq!(*seen.lock(), vec![true]);
}

#[test]
fn unregistered_host_never_answers() {
    let processes = TwoProcess::new();
    processes
        .module
        .register(Some(&processes.module_context), crate::HOST_PACKAGE)
        .expect("module register");

    let (seen, callback) = recorder::<bool>();
    processes
        .module_namespace()
        .expect("module namespace")
        .checking_version_equals(callback)
        .expect("request");
    processes.pump();

    assert!(seen.lock().is_empty());
}

#[test]
fn repeated_checks_keep_the_first_callback() {
    let processes = TwoProcess::new();
    processes.register_both().expect("register");

    let module = processes.module_namespace().expect("module namespace");
    let (first, on_first) = recorder::<bool>();
    let (second, on_second) = recorder::<bool>();
    module.checking_version_equals(on_first).expect("first");
    module.checking_version_equals(on_second).expect("second");
    processes.pump();

    // Two requests, two answers, both routed to the callback installed first.
    assert_eq!(*first.lock(), vec![true, true]);
    assert!(second.lock().is_empty());
}

#[test]
fn handshake_keys_stay_installed() {
    let processes = TwoProcess::new();
    processes.register_both().expect("register");

    let module = processes.module_namespace().expect("module namespace");
    module.checking_version_equals(|_| {}).expect("request");
    assert!(!module.remove_wait(GET_VERSION_KEY));
    assert!(!module.remove_wait(VERSION_RESULT_KEY));
    assert_eq!(processes.module.handler_count(), 2);
}
