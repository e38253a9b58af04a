//! Column-name helpers for model formulas.
//!
//! Formula syntax uses parentheses for terms such as `C(group)` and cannot
//! reference names that contain them, slashes, or whitespace. Names are
//! sanitized before they reach a formula; the original name is kept for
//! reporting.

/// Characters removed from names before they are used in a formula.
pub const FORMULA_RESERVED: [char; 3] = ['(', ')', '/'];

/// Strip formula-reserved characters and replace spaces with underscores.
///
/// The mapping is pure and idempotent. It is not injective: `"a b"` and
/// `"a_b"` both map to `"a_b"`. Callers that rename table columns must
/// check for collisions (see [`crate::DataTable::with_renamed`]).
pub fn sanitize_formula_name(name: &str) -> String {
    name.chars()
        .filter(|ch| !FORMULA_RESERVED.contains(ch))
        .map(|ch| if ch == ' ' { '_' } else { ch })
        .collect()
}

/// Returns true when `name` can be referenced literally inside a formula.
pub fn is_formula_safe(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|ch| FORMULA_RESERVED.contains(&ch) || ch.is_whitespace() || ch == '~')
}
