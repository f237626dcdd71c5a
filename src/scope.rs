//! Project-scope detection over raw, uncompiled filter expressions.
//!
//! Callers use this to refuse broad scans that are not restricted to a
//! project. Only the field path in front of the first operator is looked at;
//! the expression is never compiled.

use crate::lexer::Lexer;
use crate::token::TokenKind;

/// Field paths that restrict a query to one project.
pub const PROJECT_SCOPE_FIELDS: &[&str] = &["project_id", "data.project", "metadata.project"];

/// The text in front of the first operator, if the expression has one and
/// everything before it is a well-formed field path.
fn field_text(expression: &str) -> Option<&str> {
    for token in Lexer::new(expression) {
        match token.kind {
            TokenKind::Segment(_) | TokenKind::Dot => continue,
            TokenKind::Operator(_) => return Some(&expression[..token.span.start]),
            TokenKind::Value(_) | TokenKind::Illegal => return None,
        }
    }
    None
}

/// True iff at least one expression filters on a project-scoping field.
pub fn has_project_scope<S: AsRef<str>>(expressions: &[S]) -> bool {
    expressions
        .iter()
        .filter_map(|expression| field_text(expression.as_ref()))
        .any(|field| PROJECT_SCOPE_FIELDS.contains(&field))
}
