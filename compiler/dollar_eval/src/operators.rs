//! Operator dispatch.
//!
//! Direct match on the operator name. The operator table is fixed, so the
//! arithmetic, comparison and logic operators map straight onto the value
//! model's methods; operand forcing happens inside those methods.

use dollar_ir::OpDef;
use dollar_value::error::exception;
use dollar_value::{EvalResult, Value};

pub fn evaluate_unary(op: &OpDef, operand: &Value) -> EvalResult {
    match op.name {
        "negate" => operand.negate(),
        "not" => operand.not(),
        "fix" => operand.fix_deep(),
        "size" => operand.size(),
        "inc" => operand.plus(&Value::int(1)),
        "dec" => operand.minus(&Value::int(1)),
        "read" => read(operand),
        _ => Err(exception(format!("'{}' is not a unary operator", op.name))),
    }
}

pub fn evaluate_binary(op: &OpDef, lhs: &Value, rhs: &Value) -> EvalResult {
    match op.name {
        "plus" => lhs.plus(rhs),
        "minus" => lhs.minus(rhs),
        "multiply" => lhs.multiply(rhs),
        "divide" => lhs.divide(rhs),
        "modulus" => lhs.modulus(rhs),
        "less-than" => lhs.less_than(rhs),
        "greater-than" => lhs.greater_than(rhs),
        "less-than-equal" => lhs.less_equal(rhs),
        "greater-than-equal" => lhs.greater_equal(rhs),
        "equal" => lhs.equal_to(rhs),
        "not-equal" => lhs.not_equal_to(rhs),
        "and" => lhs.and(rhs),
        "or" => lhs.or(rhs),
        _ => Err(exception(format!("'{}' is not a value operator", op.name))),
    }
}

/// Non-blocking consuming read from a resource; other values read as
/// themselves.
fn read(operand: &Value) -> EvalResult {
    let forced = operand.fix(1)?;
    match forced.untagged() {
        Value::Resource(handle) => Ok(handle.backend().read(false, true)),
        _ => Ok(forced),
    }
}
