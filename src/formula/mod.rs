//! The formula evaluator (§4.1): a small, sandboxed arithmetic/predicate
//! language over a closed per-call variable scope.

mod cache;
mod eval;
mod lexer;
mod parser;
mod scope;
mod validate;

pub use parser::{CmpOp, Expr};
pub use scope::Scope;

/// Evaluate `expr_src` against `scope`. Per §4.1's contract, this function
/// **never** returns an error to the caller: a parse or evaluation failure
/// is logged at `warn` level and folded into `0.0`, exactly as the original
/// content engine's `eval_formula` swallows every exception.
pub fn eval_formula(expr_src: &str, scope: &Scope) -> f64 {
    match cache::compile_cached(expr_src) {
        Ok(expr) => match eval::evaluate(&expr, scope) {
            Ok(value) => value,
            Err(reason) => {
                log::warn!("formula evaluation failed for '{expr_src}': {reason}");
                0.0
            }
        },
        Err(reason) => {
            log::warn!("formula compilation failed for '{expr_src}': {reason}");
            0.0
        }
    }
}

/// Evaluate a formula as a boolean predicate (used by `condition_expr` and
/// `if_condition`). An empty string is treated as `true` (no condition).
pub fn eval_predicate(expr_src: &str, scope: &Scope) -> bool {
    if expr_src.trim().is_empty() {
        return true;
    }
    match cache::compile_cached(expr_src) {
        Ok(expr) => eval::evaluate_truthy(&expr, scope).unwrap_or_else(|reason| {
            log::warn!("predicate evaluation failed for '{expr_src}': {reason}");
            false
        }),
        Err(reason) => {
            log::warn!("predicate compilation failed for '{expr_src}': {reason}");
            false
        }
    }
}

/// Validate a formula string without evaluating it — used when blueprints
/// are loaded, so malformed content surfaces at load time, not mid-combat.
pub fn validate(expr_src: &str) -> Result<(), String> {
    validate::validate_formula(expr_src)?;
    let tokens = lexer::tokenize(expr_src)?;
    parser::parse(&tokens)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::CombatEntity;
    use crate::model::stats::StatsBlock;

    fn make_entity(ad: i32, hp: i32, max_hp: i32) -> CombatEntity {
        let mut stats = StatsBlock::zero();
        stats.ad = ad;
        stats.max_hp = max_hp;
        CombatEntity {
            current_hp: hp,
            ..CombatEntity::new("e", "Entity", stats)
        }
    }

    #[test]
    fn basic_arithmetic_over_scope() {
        let source = make_entity(20, 100, 100);
        let target = make_entity(0, 100, 100);
        let scope = Scope::build(&source, &target, None);
        assert_eq!(eval_formula("AD*1.0", &scope), 20.0);
    }

    #[test]
    fn unparseable_formula_yields_zero_not_panic() {
        let source = make_entity(20, 100, 100);
        let target = make_entity(0, 100, 100);
        let scope = Scope::build(&source, &target, None);
        assert_eq!(eval_formula("AD *", &scope), 0.0);
    }

    #[test]
    fn forbidden_token_yields_zero() {
        let source = make_entity(20, 100, 100);
        let target = make_entity(0, 100, 100);
        let scope = Scope::build(&source, &target, None);
        assert_eq!(eval_formula("__import__('os')", &scope), 0.0);
    }

    #[test]
    fn predicate_uses_hp_percent_threshold() {
        let source = make_entity(0, 100, 100);
        let mut target = make_entity(0, 30, 100);
        target.current_hp = 30;
        let scope = Scope::build(&source, &target, None);
        assert!(eval_predicate("T_HP_PERCENT < 0.5", &scope));
        assert!(!eval_predicate("T_HP_PERCENT > 0.5", &scope));
    }

    #[test]
    fn min_max_abs_functions() {
        let source = make_entity(20, 100, 100);
        let target = make_entity(0, 100, 100);
        let scope = Scope::build(&source, &target, None);
        assert_eq!(eval_formula("min(5, 3)", &scope), 3.0);
        assert_eq!(eval_formula("max(5, 3)", &scope), 5.0);
        assert_eq!(eval_formula("abs(-7)", &scope), 7.0);
    }
}
