use data_channel::{Parcel, Serial};

use crate::{recorder, TwoProcess};

#[derive(Debug, Clone, PartialEq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
struct HookSnapshot {
    method: String,
    calls: u64,
    args: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
struct Unrelated {
    calls: u64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Preferences {
    theme: String,
    verbose: bool,
}

#[test]
fn parcel_crosses_processes() {
    let processes = TwoProcess::new();
    processes.register_both().expect("register");

    let (seen, callback) = recorder::<Parcel<HookSnapshot>>();
    processes
        .module_namespace()
        .expect("module namespace")
        .wait("snapshot", callback);

    let snapshot = HookSnapshot {
        method: "onCreate".into(),
        calls: 3,
        args: vec![1, -1],
    };
    processes
        .host_namespace()
        .expect("host namespace")
        .put("snapshot", Parcel(snapshot.clone()))
        .expect("put");
    processes.pump();

    assert_eq!(*seen.lock(), vec![Parcel(snapshot)]);
}

#[test]
fn serial_crosses_processes() {
    let processes = TwoProcess::new();
    processes.register_both().expect("register");

    let (seen, callback) = recorder::<Serial<Preferences>>();
    processes
        .host_namespace()
        .expect("host namespace")
        .wait("prefs", callback);

    let prefs = Preferences {
        theme: "dark".into(),
        verbose: true,
    };
    processes
        .module_namespace()
        .expect("module namespace")
        .put("prefs", Serial(prefs.clone()))
        .expect("put");
    processes.pump();

    assert_eq!(*seen.lock(), vec![Serial(prefs)]);
}

#[test]
fn parcel_of_another_type_falls_back_to_default() {
    let processes = TwoProcess::new();
    processes.register_both().expect("register");

    let fallback = Parcel(Unrelated { calls: 0 });
    let (seen, callback) = recorder::<Parcel<Unrelated>>();
    processes
        .module_namespace()
        .expect("module namespace")
        .wait_or("snapshot", fallback.clone(), callback);

    processes
        .host_namespace()
        .expect("host namespace")
        .put(
            "snapshot",
            Parcel(HookSnapshot {
                method: "onResume".into(),
                calls: 1,
                args: Vec::new(),
            }),
        )
        .expect("put");
    processes.pump();

    assert_eq!(*seen.lock(), vec![fallback]);
}

#[test]
fn serial_is_not_readable_as_parcel() {
    let processes = TwoProcess::new();
    processes.register_both().expect("register");

    let (seen, callback) = recorder::<Parcel<Unrelated>>();
    processes
        .host_namespace()
        .expect("host namespace")
        .wait("blob", callback);
    processes
        .module_namespace()
        .expect("module namespace")
        .put("blob", Serial(Preferences {
            theme: "light".into(),
            verbose: false,
        }))
        .expect("put");
    processes.pump();

    assert!(seen.lock().is_empty());
}
