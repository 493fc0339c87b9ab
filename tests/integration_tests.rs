//! Integration tests for chain evaluation and chain definitions
//!
//! These tests exercise the public API end to end, counting side effects
//! to verify which steps actually ran.

use chain_let::chain::{evaluate, Chain, Environment, FailurePredicate, Outcome, Step};
use chain_let::config::Settings;
use chain_let::definition::ChainLoader;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::cell::Cell;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static DEMOS: Lazy<PathBuf> = Lazy::new(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos"));

fn int_at(env: &Environment, path: &str) -> i64 {
    env.get_path(path).and_then(Value::as_i64).unwrap_or_default()
}

// ============================================================================
// Core evaluation
// ============================================================================

#[test]
fn test_two_step_scenario_completes() {
    let result = Chain::new()
        .step("a", |_| json!({"ok": 1}))
        .step("b", |env| {
            if int_at(env, "a.ok") == 1 {
                json!({"ok": 2})
            } else {
                json!({"break": "fail-a"})
            }
        })
        .run(|env| json!(int_at(env, "b.ok") + 1));

    assert_eq!(result, json!(3));
}

#[test]
fn test_two_step_scenario_breaks_at_first_step() {
    let b_calls = Cell::new(0);
    let final_calls = Cell::new(0);

    let result = Chain::new()
        .step("a", |_| json!({"break": "fail-a"}))
        .step("b", |env| {
            b_calls.set(b_calls.get() + 1);
            if int_at(env, "a.ok") == 1 {
                json!({"ok": 2})
            } else {
                json!({"break": "fail-a"})
            }
        })
        .run(|env| {
            final_calls.set(final_calls.get() + 1);
            json!(int_at(env, "b.ok") + 1)
        });

    assert_eq!(result, json!({"break": "fail-a"}));
    assert_eq!(b_calls.get(), 0);
    assert_eq!(final_calls.get(), 0);
}

#[test]
fn test_steps_run_once_up_to_first_failure() {
    let counters: Vec<Arc<AtomicUsize>> = (0..5).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let final_calls = Arc::new(AtomicUsize::new(0));
    let failing = 2;

    let mut chain = Chain::new();
    for (i, counter) in counters.iter().enumerate() {
        let counter = counter.clone();
        chain.push(Step::new(format!("s{}", i), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if i == failing {
                json!({"break": i})
            } else {
                json!(i)
            }
        }));
    }

    let final_counter = final_calls.clone();
    let outcome = chain.outcome(move |_| {
        final_counter.fetch_add(1, Ordering::SeqCst);
        json!("done")
    });

    assert_eq!(
        outcome,
        Outcome::ShortCircuited {
            step: "s2".to_string(),
            index: 2,
            value: json!({"break": 2}),
        }
    );
    let calls: Vec<usize> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(calls, vec![1, 1, 1, 0, 0]);
    assert_eq!(final_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_success_sees_every_binding() {
    let result = Chain::new()
        .step("x", |_| json!(1))
        .step("y", |env| json!(int_at(env, "x") + 1))
        .step("z", |env| json!(int_at(env, "x") + int_at(env, "y")))
        .run(|env| env.to_json());

    assert_eq!(result, json!({"x": 1, "y": 2, "z": 3}));
}

#[test]
fn test_rebinding_res_repeatedly() {
    let result = Chain::new()
        .step("res", |_| json!({"value": 1}))
        .step("res", |env| json!({"value": int_at(env, "res.value") * 10}))
        .step("res", |env| json!({"value": int_at(env, "res.value") + 5}))
        .run(|env| env.get("res").cloned().unwrap_or(Value::Null));

    assert_eq!(result, json!({"value": 15}));
}

#[test]
fn test_null_short_circuits_even_without_predicate() {
    let final_calls = Cell::new(0);

    let result = Chain::new()
        .predicate(FailurePredicate::Never)
        .step("a", |_| json!({"break": "ignored"}))
        .step("b", |_| Value::Null)
        .run(|_| {
            final_calls.set(final_calls.get() + 1);
            json!("done")
        });

    assert_eq!(result, Value::Null);
    assert_eq!(final_calls.get(), 0);
}

#[test]
fn test_mapping_without_sentinel_proceeds() {
    let result = Chain::new()
        .step("a", |_| json!({"error": "not the sentinel"}))
        .run(|_| json!("done"));

    assert_eq!(result, json!("done"));
}

#[test]
fn test_empty_chain_uses_initial_bindings() {
    let bindings = Environment::from_json(&json!({"seed": 9}));
    let result = Chain::new()
        .with_bindings(bindings)
        .run(|env| json!(int_at(env, "seed") * 2));

    assert_eq!(result, json!(18));

    let result = Chain::new().run(|env| json!(env.len()));
    assert_eq!(result, json!(0));
}

#[test]
fn test_custom_predicate_per_invocation() {
    let negative = FailurePredicate::custom(|v| v.as_i64().is_some_and(|n| n < 0));

    let result = Chain::new()
        .predicate(negative.clone())
        .step("a", |_| json!(4))
        .step("b", |_| json!(-1))
        .run(|_| json!("done"));
    assert_eq!(result, json!(-1));

    let result = Chain::new()
        .predicate(negative)
        .step("a", |_| json!(4))
        .run(|env| env.get("a").cloned().unwrap_or(Value::Null));
    assert_eq!(result, json!(4));
}

#[test]
fn test_condition_predicate() {
    let predicate = FailurePredicate::condition("exists error or code >= 400").unwrap();

    let outcome = Chain::new()
        .predicate(predicate)
        .step("fetch", |_| json!({"code": 200, "body": "ok"}))
        .step("parse", |_| json!({"code": 422}))
        .step("store", |_| json!({"code": 201}))
        .outcome(|_| json!("stored"));

    match outcome {
        Outcome::ShortCircuited { step, value, .. } => {
            assert_eq!(step, "parse");
            assert_eq!(value, json!({"code": 422}));
        }
        other => panic!("Expected short-circuit, got {:?}", other),
    }
}

#[derive(Debug, PartialEq)]
enum FetchError {
    Timeout,
}

#[test]
fn test_step_error_passes_through_unmodified() {
    let later = Cell::new(0);

    let result: Result<Value, FetchError> = Chain::fallible()
        .step("a", |_| json!(1))
        .try_step("b", |_| Err(FetchError::Timeout))
        .step("c", |_| {
            later.set(later.get() + 1);
            json!(3)
        })
        .try_run(|_| Ok(json!("done")));

    assert_eq!(result, Err(FetchError::Timeout));
    assert_eq!(later.get(), 0);
}

#[test]
fn test_fallible_chain_short_circuit_is_ok() {
    let result: Result<Value, FetchError> = Chain::fallible()
        .try_step("a", |_| Ok(json!({"break": "no stock"})))
        .try_step("b", |_| Err(FetchError::Timeout))
        .try_run(|_| Ok(json!("done")));

    assert_eq!(result, Ok(json!({"break": "no stock"})));
}

#[test]
fn test_final_error_passes_through_unmodified() {
    let result: Result<Value, FetchError> = Chain::fallible()
        .step("a", |_| json!({"ok": 1}))
        .try_step("b", |_| Ok(json!({"ok": 2})))
        .try_run(|_| Err(FetchError::Timeout));

    assert_eq!(result, Err(FetchError::Timeout));
}

#[test]
fn test_failing_final_not_called_after_short_circuit() {
    let final_calls = Cell::new(0);

    let result: Result<Value, FetchError> = Chain::fallible()
        .step("a", |_| json!({"break": "no stock"}))
        .try_run(|_| {
            final_calls.set(final_calls.get() + 1);
            Err(FetchError::Timeout)
        });

    assert_eq!(result, Ok(json!({"break": "no stock"})));
    assert_eq!(final_calls.get(), 0);
}

#[test]
fn test_free_function_with_initial_environment() {
    let steps: Vec<Step<'_, Infallible>> = vec![
        Step::new("doubled", |env| json!(int_at(env, "n") * 2)),
        Step::new("check", |env| {
            if int_at(env, "doubled") > 10 {
                json!({"break": "too large"})
            } else {
                json!(true)
            }
        }),
    ];

    let result = evaluate(
        steps,
        |env| Ok(env.get("doubled").cloned().unwrap_or(Value::Null)),
        &FailurePredicate::default(),
        Environment::from_json(&json!({"n": 4})),
    );
    assert_eq!(result, Ok(json!(8)));
}

#[test]
fn test_configurable_sentinel_from_settings() {
    let settings = Settings::default().with_sentinel("halt").unwrap();

    let result = Chain::new()
        .predicate(settings.predicate())
        .step("a", |_| json!({"break": 1}))
        .step("b", |_| json!({"halt": "stop"}))
        .run(|_| json!("done"));

    assert_eq!(result, json!({"halt": "stop"}));
}

// ============================================================================
// Chain definitions
// ============================================================================

#[test]
fn test_checkout_demo_completes() {
    let def = ChainLoader::new().load(DEMOS.join("checkout.yaml")).unwrap();
    assert!(def.unbound_references().is_empty());
    assert_eq!(
        def.summary(),
        "checkout: Look up an order, check stock, then price it"
    );

    let outcome = def
        .evaluate(&Settings::default(), &Environment::empty())
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Completed(json!({
            "order": 1001,
            "summary": "order 1001: 2 x widget at 4.5 EUR"
        }))
    );
}

#[test]
fn test_checkout_demo_out_of_stock() {
    let def = ChainLoader::new().load(DEMOS.join("checkout.yaml")).unwrap();

    // Replaces the stock binding so `available` resolves to nothing
    let extra = Environment::from_json(&json!({"stock": {}}));
    let outcome = def.evaluate(&Settings::default(), &extra).unwrap();

    assert_eq!(
        outcome,
        Outcome::ShortCircuited {
            step: "available".to_string(),
            index: 1,
            value: Value::Null,
        }
    );
}

#[test]
fn test_declined_demo_stops_at_payment() {
    let def = ChainLoader::new().load(DEMOS.join("declined.yaml")).unwrap();
    let outcome = def
        .evaluate(&Settings::default(), &Environment::empty())
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::ShortCircuited {
            step: "payment".to_string(),
            index: 1,
            value: json!({"status": "declined", "reason": "card expired"}),
        }
    );
}
