//! Static safety validation for formula source text (§4.1).
//!
//! Run once, at parse time, before a formula is ever cached or evaluated.
//! The forbidden-token list is the spec's own (a near-exact subset of
//! `original_source/core/engine/formula_engine.py`'s broader denylist, which
//! additionally bans `file` and `input` — this crate follows the spec's list
//! exactly rather than the original's superset).
const FORBIDDEN_TOKENS: &[&str] = &[
    "import", "exec", "eval", "compile", "open", "__", "os.", "sys.",
];

pub fn validate_formula(src: &str) -> Result<(), String> {
    let lowered = src.to_lowercase();
    for token in FORBIDDEN_TOKENS {
        if lowered.contains(token) {
            return Err(format!("formula contains forbidden token '{token}'"));
        }
    }
    Ok(())
}
