//! AST evaluation over a closed scope (§4.1).

use super::parser::{CmpOp, Expr};
use super::scope::Scope;

pub fn evaluate(expr: &Expr, scope: &Scope) -> Result<f64, String> {
    match expr {
        Expr::Num(n) => Ok(*n),
        Expr::Var(name) => scope
            .get(name)
            .ok_or_else(|| format!("unknown variable '{name}'")),
        Expr::Neg(inner) => Ok(-evaluate(inner, scope)?),
        Expr::Add(a, b) => Ok(evaluate(a, scope)? + evaluate(b, scope)?),
        Expr::Sub(a, b) => Ok(evaluate(a, scope)? - evaluate(b, scope)?),
        Expr::Mul(a, b) => Ok(evaluate(a, scope)? * evaluate(b, scope)?),
        Expr::Div(a, b) => {
            let divisor = evaluate(b, scope)?;
            if divisor == 0.0 {
                return Err("division by zero".to_string());
            }
            Ok(evaluate(a, scope)? / divisor)
        }
        Expr::Cmp(a, op, b) => {
            let lhs = evaluate(a, scope)?;
            let rhs = evaluate(b, scope)?;
            let result = match op {
                CmpOp::Lt => lhs < rhs,
                CmpOp::Le => lhs <= rhs,
                CmpOp::Gt => lhs > rhs,
                CmpOp::Ge => lhs >= rhs,
                CmpOp::Eq => lhs == rhs,
                CmpOp::Ne => lhs != rhs,
            };
            Ok(if result { 1.0 } else { 0.0 })
        }
        Expr::Call(name, args) => eval_call(name, args, scope),
    }
}

/// Truthiness for predicate formulas like `condition_expr`: any nonzero
/// result is truthy, matching Python's numeric-truthiness semantics the
/// original content model relies on.
pub fn evaluate_truthy(expr: &Expr, scope: &Scope) -> Result<bool, String> {
    Ok(evaluate(expr, scope)? != 0.0)
}

fn eval_call(name: &str, args: &[Expr], scope: &Scope) -> Result<f64, String> {
    let values: Result<Vec<f64>, String> = args.iter().map(|a| evaluate(a, scope)).collect();
    let values = values?;
    match name {
        "min" => values
            .into_iter()
            .reduce(f64::min)
            .ok_or_else(|| "min() requires at least one argument".to_string()),
        "max" => values
            .into_iter()
            .reduce(f64::max)
            .ok_or_else(|| "max() requires at least one argument".to_string()),
        "abs" => {
            if values.len() != 1 {
                return Err("abs() takes exactly one argument".to_string());
            }
            Ok(values[0].abs())
        }
        other => Err(format!("unknown function '{other}'")),
    }
}
