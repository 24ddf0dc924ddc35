#![cfg(feature = "instrument")]

use std::cell::Cell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use timelog::{
    bind, call_site, guard_args, trace_call, trace_method, try_trace_call, try_trace_method,
    with_sink, MemorySink, Record, RecordKind, Sentinel, Severity, Traced,
};

type Ints = Vec<i32>;

fn get(vec: Ints, index: usize) -> i32 {
    vec[index]
}

struct IntVec {
    items: Ints,
}

impl IntVec {
    fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn init(&mut self, items: Ints) {
        self.items = items;
    }

    fn append(&mut self, value: i32) {
        self.items.push(value);
    }

    fn get(&self, index: usize) -> i32 {
        self.items[index]
    }

    fn checked_get(&self, index: usize) -> Result<i32, String> {
        self.items
            .get(index)
            .copied()
            .ok_or_else(|| format!("index {} out of range for {} items", index, self.items.len()))
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<Record>) {
    let sink = Arc::new(MemorySink::new());
    let value = with_sink(sink.clone(), f);
    (value, sink.take())
}

fn kinds(records: &[Record]) -> Vec<&'static str> {
    records
        .iter()
        .map(|record| match record.kind {
            RecordKind::Entry => "entry",
            RecordKind::Finished { .. } => "finished",
            RecordKind::Failure { .. } => "failure",
            RecordKind::Fatal => "fatal",
            RecordKind::InvalidArgument { .. } => "invalid",
        })
        .collect()
}

#[test]
fn test_wrapped_result_matches_direct_call() {
    let vec = vec![1, 2, 3, 4, 5];
    let direct = get(vec.clone(), 2);
    let (wrapped, records) = capture(|| trace_call!(get, vec.clone(), 2));

    assert_eq!(wrapped, direct);
    assert_eq!(wrapped, 3);
    assert_eq!(kinds(&records), vec!["entry", "finished"], "one entry then one success record");
}

#[test]
fn test_out_of_range_returns_integer_minimum() {
    let vec = vec![1, 2, 3, 4, 5];
    let (value, records) = capture(|| trace_call!(get, vec.clone(), 7));

    assert_eq!(value, i32::MIN);
    assert_eq!(kinds(&records), vec!["entry", "failure"]);
    match &records[1].kind {
        RecordKind::Failure { description } => {
            assert!(
                description.contains("out of bounds"),
                "unexpected description: {}",
                description
            )
        }
        other => panic!("expected failure record, got {:?}", other),
    }
    assert_eq!(records[1].severity, Severity::Failure);
}

#[test]
fn test_entry_record_carries_call_metadata() {
    let vec = vec![1, 2, 3];
    let (_, records) = capture(|| trace_call!(get, vec.clone(), 0));

    let entry = &records[0];
    assert_eq!(entry.call, "get");
    assert!(entry.file.ends_with("wrapper_tests.rs"));
    assert!(entry.line > 0);
    let header = entry.lines().next().unwrap();
    assert!(header.contains("get(vec.clone(), 0)"), "unexpected header: {}", header);
}

#[test]
fn test_err_result_returns_sentinel() {
    fn ratio(a: f64, b: f64) -> Result<f64, String> {
        if b == 0.0 {
            Err("division by zero".to_string())
        } else {
            Ok(a / b)
        }
    }

    let (ok, _) = capture(|| try_trace_call!(ratio, 1.0, 4.0));
    assert_eq!(ok, 0.25);

    let (value, records) = capture(|| try_trace_call!(ratio, 1.0, 0.0));
    assert!(value.is_nan());
    assert_eq!(kinds(&records), vec!["entry", "failure"]);
    assert_eq!(records[1].kind, RecordKind::Failure { description: "division by zero".into() });
}

#[test]
fn test_bound_method_mutates_same_receiver() {
    let mut iv = IntVec::new();
    let (_, records) = capture(|| {
        trace_method!(&mut iv, IntVec::init, vec![1, 2, 3, 4, 5]);
        trace_method!(&mut iv, IntVec::append, 6);
    });

    assert_eq!(iv.len(), 6, "direct call sees the appended element");
    assert_eq!(iv.get(5), 6);
    assert_eq!(kinds(&records), vec!["entry", "finished", "entry", "finished"]);
}

#[test]
fn test_bound_method_failure_returns_sentinel() {
    let mut iv = IntVec::new();
    iv.init(vec![1, 2, 3, 4, 5]);

    let (value, records) = capture(|| trace_method!(&iv, IntVec::get, 7));
    assert_eq!(value, i32::MIN);
    assert_eq!(kinds(&records), vec!["entry", "failure"]);
    assert_eq!(records[0].call, "IntVec::get");

    let (value, records) = capture(|| try_trace_method!(&iv, IntVec::checked_get, 9));
    assert_eq!(value, i32::MIN);
    assert_eq!(
        records[1].kind,
        RecordKind::Failure { description: "index 9 out of range for 5 items".into() }
    );

    assert_eq!(iv.len(), 5, "receiver stays usable after a contained failure");
}

#[test]
fn test_explicit_bind_and_reuse() {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let (_, records) = capture(|| {
        let mut insert = bind(&mut counts, HashMap::insert, call_site!("insert"));
        insert.call(("a", 1));
        insert.call(("b", 2));
    });
    assert_eq!(counts.len(), 2);
    assert_eq!(records.len(), 4);
}

#[test]
fn test_guarded_operation_skips_body() {
    let body_runs = Cell::new(0);
    let lookup = |index: i32| -> i32 {
        guard_args!(op = "lookup"; index => -1);
        body_runs.set(body_runs.get() + 1);
        index * 10
    };

    let (value, records) = capture(|| lookup(i32::sentinel()));
    assert_eq!(value, -1);
    assert_eq!(body_runs.get(), 0, "body must not run for an invalid argument");
    assert_eq!(kinds(&records), vec!["invalid"]);
    assert_eq!(records[0].severity, Severity::Failure);

    let (value, records) = capture(|| lookup(4));
    assert_eq!(value, 40);
    assert_eq!(body_runs.get(), 1);
    assert!(records.is_empty());
}

#[test]
fn test_guard_inside_wrapped_call() {
    fn area(width: u32, height: u32) -> u32 {
        guard_args!(width, height => u32::MAX);
        width * height
    }

    let (value, records) = capture(|| trace_call!(area, 3, 0));
    assert_eq!(value, u32::MAX, "the guard's fallback, not the wrapper's sentinel");
    assert_eq!(kinds(&records), vec!["entry", "invalid", "finished"]);
    assert_eq!(records[1].call, "area");
}

#[test]
fn test_unit_function_failure() {
    fn explode() {
        panic!("explode called");
    }

    let (_, records) = capture(|| trace_call!(explode));
    assert_eq!(kinds(&records), vec!["entry", "failure"]);
    assert_eq!(records[0].lines().next().map(|line| line.ends_with("explode()")), Some(true));
}

#[test]
fn test_unrecognized_panic_payload_is_fatal() {
    struct Opaque;

    let (value, records) = capture(|| {
        let opaque = || -> Option<String> { std::panic::panic_any(Opaque) };
        Traced::new(opaque, call_site!("opaque")).call(())
    });
    assert_eq!(value, None);
    assert_eq!(kinds(&records), vec!["entry", "fatal"]);
    assert!(records[1].message.ends_with("opaque: Unknown exception"));
}

#[test]
fn test_sentinels_are_deterministic() {
    assert_eq!(i32::sentinel(), i32::sentinel());
    assert_eq!(u64::sentinel(), u64::sentinel());
    assert_eq!(f64::sentinel().to_bits(), f64::sentinel().to_bits());
    assert_eq!(String::sentinel(), String::sentinel());
    assert_eq!(Option::<Box<i32>>::sentinel(), Option::<Box<i32>>::sentinel());
    assert_eq!(Severity::sentinel(), Severity::sentinel());
}

#[test]
fn test_sentinels_differ_from_normal_values() {
    assert_ne!(i32::sentinel(), 42);
    assert_ne!(i8::sentinel(), -1);
    assert_ne!(u32::sentinel(), 7);
    assert!(!2.5f32.is_sentinel());
    assert_ne!(bool::sentinel(), true);
    assert_ne!(String::sentinel(), "hello");
    assert_ne!(Option::<u8>::sentinel(), Some(0));
    assert_ne!(Severity::sentinel(), Severity::Debug);
}

#[test]
fn test_std_return_types_fall_back_to_empty_values() {
    fn label(code: u8) -> &'static str {
        ["ok", "warn"][code as usize]
    }
    fn config_path(parts: Vec<&str>) -> PathBuf {
        parts.iter().collect()
    }
    fn shared_name(name: String) -> Arc<str> {
        assert!(!name.is_empty(), "name must not be empty");
        Arc::from(name)
    }
    fn header(bytes: Vec<u8>) -> [u8; 4] {
        [bytes[0], bytes[1], bytes[2], bytes[3]]
    }
    fn boxed(value: i32) -> Box<i32> {
        Box::new(value.checked_mul(2).expect("overflow"))
    }

    let (value, records) = capture(|| trace_call!(label, 9));
    assert_eq!(value, "");
    assert_eq!(kinds(&records), vec!["entry", "failure"]);

    let (value, _) = capture(|| trace_call!(config_path, vec!["etc", "app.toml"]));
    assert_eq!(value, PathBuf::from("etc/app.toml"));

    let (value, _) = capture(|| trace_call!(shared_name, String::new()));
    assert!(value.is_sentinel());

    let (value, _) = capture(|| trace_call!(header, vec![1, 2]));
    assert_eq!(value, [0; 4]);

    let (value, records) = capture(|| trace_call!(boxed, i32::MAX));
    assert_eq!(*value, 0);
    assert_eq!(records[1].kind, RecordKind::Failure { description: "overflow".into() });
}
