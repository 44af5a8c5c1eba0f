use data_channel::{ChannelError, ChannelSettings, RegisterOutcome};

use crate::{build, recorder, TwoProcess, HOST_PACKAGE};

#[test]
fn registering_twice_binds_one_receiver() {
    let processes = TwoProcess::new();
    let first = processes
        .module
        .register(Some(&processes.module_context), HOST_PACKAGE)
        .expect("first");
    let second = processes
        .module
        .register(Some(&processes.module_context), HOST_PACKAGE)
        .expect("second");

    assert_eq!(first, RegisterOutcome::Registered);
    assert_eq!(second, RegisterOutcome::AlreadyRegistered);
    assert_eq!(processes.bus.receiver_count(), 1);
    assert_eq!(processes.module.handler_count(), 1);
}

#[test]
fn register_without_context_is_a_no_op() {
    let processes = TwoProcess::new();
    let outcome = processes
        .module
        .register(None, HOST_PACKAGE)
        .expect("register");
    assert_eq!(outcome, RegisterOutcome::MissingContext);
    assert_eq!(processes.bus.receiver_count(), 0);
}

#[test]
fn disabled_feature_sends_and_installs_nothing() {
    let processes = TwoProcess::with_settings(
        ChannelSettings::new(build("1")).with_enabled(false),
        ChannelSettings::new(build("1")).with_enabled(false),
    );
    assert_eq!(
        processes
            .module
            .register(Some(&processes.module_context), HOST_PACKAGE)
            .expect("register"),
        RegisterOutcome::Disabled
    );

    let module = processes.module_namespace().expect("module namespace");
    let (seen, callback) = recorder::<i32>();
    assert!(!module.wait("answer", callback));
    module.put("answer", 42i32).expect("put");
    module.checking_version_equals(|_| {}).expect("request");

    assert_eq!(processes.pump(), 0);
    assert_eq!(processes.bus.metrics().accepted, 0);
    assert_eq!(processes.module.handler_count(), 0);
    assert!(seen.lock().is_empty());
}

#[test]
fn disabling_at_runtime_silences_puts() {
    let processes = TwoProcess::new();
    processes.register_both().expect("register");

    let (seen, callback) = recorder::<i32>();
    processes
        .host_namespace()
        .expect("host namespace")
        .wait("answer", callback);
    let module = processes.module_namespace().expect("module namespace");
    module.put("answer", 1i32).expect("put");
    processes.module.set_enabled(false);
    module.put("answer", 2i32).expect("put while disabled");
    processes.pump();

    assert_eq!(*seen.lock(), vec![1]);
}

#[test]
fn bootstrap_phase_is_a_configuration_error() {
    let processes = TwoProcess::new();
    processes.host_env.set_bootstrap_phase(true);

    let register = processes
        .host
        .register(Some(&processes.host_context), HOST_PACKAGE);
    assert!(matches!(register, Err(ChannelError::Config(_))));
    let namespace = processes
        .host
        .namespace(&processes.host_context, HOST_PACKAGE);
    assert!(matches!(namespace, Err(ChannelError::Config(_))));

    processes.host_env.set_bootstrap_phase(false);
    assert_eq!(
        processes
            .host
            .register(Some(&processes.host_context), HOST_PACKAGE)
            .expect("register after bootstrap"),
        RegisterOutcome::Registered
    );
}

#[test]
fn dropping_a_channel_releases_its_receiver() {
    let processes = TwoProcess::new();
    processes.register_both().expect("register");
    assert_eq!(processes.bus.receiver_count(), 2);

    let TwoProcess { bus, module, .. } = processes;
    drop(module);
    assert_eq!(bus.receiver_count(), 1);
}
