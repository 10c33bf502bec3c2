//! Built-in functions available to test steps
//!
//! The engine treats these as opaque callables; they exist so suites work
//! out of the box and so the examples in the docs run. Math operands may be
//! passed positionally or as `x`/`y` kwargs.

pub mod http;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::common::{Error, Result};
use crate::engine::registry::{sync_function, FunctionProvider, StepFunction};

/// Default math and utility functions
pub struct BuiltinFunctions;

impl FunctionProvider for BuiltinFunctions {
    fn functions(&self) -> Vec<(String, StepFunction)> {
        vec![
            (
                "ping".to_string(),
                sync_function(|_, _| Ok(json!("pong"))),
            ),
            (
                "add".to_string(),
                sync_function(|args, kwargs| {
                    let (a, b) = operands(&args, &kwargs, "add")?;
                    arith("add", &a, &b, i64::checked_add, |x, y| x + y)
                }),
            ),
            (
                "subtract".to_string(),
                sync_function(|args, kwargs| {
                    let (a, b) = operands(&args, &kwargs, "subtract")?;
                    arith("subtract", &a, &b, i64::checked_sub, |x, y| x - y)
                }),
            ),
            (
                "multiply".to_string(),
                sync_function(|args, kwargs| {
                    let (a, b) = operands(&args, &kwargs, "multiply")?;
                    arith("multiply", &a, &b, i64::checked_mul, |x, y| x * y)
                }),
            ),
            ("divide".to_string(), sync_function(divide)),
            ("int_add".to_string(), sync_function(int_add)),
            ("sleep".to_string(), sleep_function()),
        ]
    }
}

/// Fetch the two operands from positional args or `x`/`y` kwargs
fn operands(
    args: &[Value],
    kwargs: &Map<String, Value>,
    function: &str,
) -> Result<(Value, Value)> {
    let a = operand(args, kwargs, 0, "x", function)?;
    let b = operand(args, kwargs, 1, "y", function)?;
    Ok((a, b))
}

fn operand(
    args: &[Value],
    kwargs: &Map<String, Value>,
    index: usize,
    key: &str,
    function: &str,
) -> Result<Value> {
    args.get(index)
        .or_else(|| kwargs.get(key))
        .cloned()
        .ok_or_else(|| {
            Error::function_fault(function, format!("missing operand '{key}' (position {index})"))
        })
}

/// Integer arithmetic when both operands are integers, float otherwise
fn arith(
    function: &str,
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(result) = int_op(x, y) {
            return Ok(json!(result));
        }
    }
    let x = as_f64(a, function)?;
    let y = as_f64(b, function)?;
    Ok(json!(float_op(x, y)))
}

fn as_f64(value: &Value, function: &str) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::function_fault(function, format!("{value} is not a number")))
}

/// Division returns null for a zero divisor rather than faulting, so suites
/// can assert on the sentinel with `is_none`
fn divide(args: Vec<Value>, kwargs: Map<String, Value>) -> Result<Value> {
    let (a, b) = operands(&args, &kwargs, "divide")?;
    let y = as_f64(&b, "divide")?;
    if y == 0.0 {
        return Ok(Value::Null);
    }
    let x = as_f64(&a, "divide")?;
    if let (Some(xi), Some(yi)) = (a.as_i64(), b.as_i64()) {
        // checked ops: i64::MIN / -1 overflows, fall through to the float path
        if let (Some(0), Some(q)) = (xi.checked_rem(yi), xi.checked_div(yi)) {
            return Ok(json!(q));
        }
    }
    Ok(json!(x / y))
}

/// Variadic integer sum that faults on a non-integer argument
fn int_add(args: Vec<Value>, _kwargs: Map<String, Value>) -> Result<Value> {
    let mut sum: i64 = 0;
    for arg in &args {
        let n = arg
            .as_i64()
            .ok_or_else(|| Error::function_fault("int_add", format!("{arg} is not an integer")))?;
        sum = sum
            .checked_add(n)
            .ok_or_else(|| Error::function_fault("int_add", "integer overflow"))?;
    }
    Ok(json!(sum))
}

/// Suspend the current case for the given number of seconds
fn sleep_function() -> StepFunction {
    Arc::new(|args, kwargs| {
        Box::pin(async move {
            let seconds = operand(&args, &kwargs, 0, "seconds", "sleep")?;
            let seconds = as_f64(&seconds, "sleep")?;
            let duration =
                Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX);
            tokio::time::sleep(duration).await;
            Ok(Value::Null)
        })
    })
}
