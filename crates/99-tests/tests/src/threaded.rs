use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::{eventually, init_tracing, recorder, TwoProcess};

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn background_delivery_reaches_waiters() {
    init_tracing();
    let processes = TwoProcess::new();
    processes.register_both().expect("register");
    let worker = processes.bus.spawn_delivery(Duration::from_millis(5));

    let (seen, callback) = recorder::<i64>();
    processes
        .host_namespace()
        .expect("host namespace")
        .wait("sample", callback);
    let module = processes.module_namespace().expect("module namespace");
    for sample in 0..100i64 {
        module.put("sample", sample).expect("put");
    }

    assert!(eventually(TIMEOUT, || seen.lock().len() == 100));
    worker.stop();
    assert_eq!(*seen.lock(), (0..100).collect::<Vec<i64>>());
}

#[test]
fn waits_installed_during_delivery_are_safe() {
    init_tracing();
    let processes = TwoProcess::new();
    processes.register_both().expect("register");
    let worker = processes.bus.spawn_delivery(Duration::from_millis(5));

    let host = processes.host_namespace().expect("host namespace");
    let module = processes.module_namespace().expect("module namespace");
    let hits = Arc::new(AtomicUsize::new(0));

    let installer = {
        let host = host.clone();
        let hits = Arc::clone(&hits);
        thread::spawn(move || {
            for key in 0..50 {
                let hits = Arc::clone(&hits);
                host.wait(format!("key-{key}"), move |_: i32| {
                    hits.fetch_add(1, Ordering::SeqCst);
                });
            }
        })
    };
    let sender = thread::spawn(move || {
        for round in 0..50 {
            module.put("noise", round).expect("put");
        }
    });
    installer.join().expect("installer thread");
    sender.join().expect("sender thread");

    // Every key is installed now, so one final put per key must land.
    let module = processes.module_namespace().expect("module namespace");
    for key in 0..50 {
        module.put(format!("key-{key}"), key).expect("put");
    }
    assert!(eventually(TIMEOUT, || hits.load(Ordering::SeqCst) == 50));
    worker.stop();
    assert_eq!(processes.host.handler_count(), 51);
}

#[test]
fn version_check_completes_on_the_delivery_thread() {
    init_tracing();
    let processes = TwoProcess::with_versions("2.0", "2.0");
    processes.register_both().expect("register");
    let worker = processes.bus.spawn_delivery(Duration::from_millis(5));

    let (seen, callback) = recorder::<bool>();
    processes
        .module_namespace()
        .expect("module namespace")
        .checking_version_equals(callback)
        .expect("request");

    assert!(eventually(TIMEOUT, || !seen.lock().is_empty()));
    worker.stop();
    assert_eq!(*seen.lock(), vec![true]);
}
