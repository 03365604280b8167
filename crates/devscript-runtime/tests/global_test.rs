//! Process-wide engine lifecycle
//!
//! The global state machine is one-shot per process, so the whole lifecycle
//! is exercised by a single test in its own binary.

use devscript_runtime::global::{self, EngineState};
use devscript_runtime::rhai::Dynamic;
use devscript_runtime::{Arguments, EngineConfig, NativeValue};
use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_process_lifecycle() {
    assert_eq!(global::state(), EngineState::Uninitialized);
    assert!(panic::catch_unwind(|| global::compile("1", false)).is_err());

    assert!(global::init_with(EngineConfig::new().module_name("pv")));
    assert_eq!(global::state(), EngineState::Ready);
    assert!(!global::init());

    let hits = Arc::new(AtomicUsize::new(0));
    let counted = hits.clone();
    global::register_io_intr("P1", move || {
        counted.fetch_add(1, Ordering::SeqCst);
    });

    let mut args = Arguments::new();
    args.insert("x".to_string(), NativeValue::Long(5));
    assert_eq!(global::exec("x + 1", &args, false).unwrap(), NativeValue::Long(6));
    let err = global::exec("x / 0", &args, true).unwrap_err();
    assert_eq!(err.error_type(), "ArithmeticError");

    let fragment = global::compile(r#"pv::iointr("P1", x)"#, false).unwrap();
    let result = global::eval(&fragment, &args, true).unwrap();
    global::destroy(fragment);
    assert_eq!(result, NativeValue::Bool(true));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        global::context().registry().cached("P1"),
        Some(NativeValue::Long(5))
    );

    let (value, ok) = global::convert(&Dynamic::from(2.5_f64));
    assert!(ok);
    assert_eq!(value, NativeValue::Double(2.5));

    global::shutdown();
    assert_eq!(global::state(), EngineState::Finalized);
    assert!(!global::init());
    assert!(panic::catch_unwind(|| global::exec("1", &Arguments::new(), true)).is_err());
}
