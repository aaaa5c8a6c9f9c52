//! Pattern leaf classification.
//!
//! Pattern documents embed their mini-language inside otherwise ordinary
//! string values. A single classification pass turns each leaf into a tagged
//! [`PatternLeaf`] up front, so the matcher dispatches over an enum instead
//! of every matcher re-parsing the string on its own.

use crate::value::Value;

/// The type wildcards: `@string@`, `@integer@`, and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    String,
    Integer,
    Double,
    Number,
    Boolean,
    Array,
    Null,
}

impl TypeKind {
    /// The bit-exact token text.
    pub fn token(&self) -> &'static str {
        match self {
            TypeKind::String => "@string@",
            TypeKind::Integer => "@integer@",
            TypeKind::Double => "@double@",
            TypeKind::Number => "@number@",
            TypeKind::Boolean => "@boolean@",
            TypeKind::Array => "@array@",
            TypeKind::Null => "@null@",
        }
    }

    fn from_token(s: &str) -> Option<TypeKind> {
        match s {
            "@string@" => Some(TypeKind::String),
            "@integer@" => Some(TypeKind::Integer),
            "@double@" => Some(TypeKind::Double),
            "@number@" => Some(TypeKind::Number),
            "@boolean@" => Some(TypeKind::Boolean),
            "@array@" => Some(TypeKind::Array),
            "@null@" => Some(TypeKind::Null),
            _ => None,
        }
    }

    /// Whether `actual`'s runtime type satisfies this wildcard.
    pub fn accepts(&self, actual: &Value) -> bool {
        match self {
            TypeKind::String => matches!(actual, Value::String(_)),
            TypeKind::Integer => matches!(actual, Value::Int(_)),
            TypeKind::Double => matches!(actual, Value::Float(_)),
            TypeKind::Number => matches!(actual, Value::Int(_) | Value::Float(_)),
            TypeKind::Boolean => matches!(actual, Value::Bool(_)),
            TypeKind::Array => matches!(actual, Value::Array(_)),
            TypeKind::Null => matches!(actual, Value::Null),
        }
    }
}

/// A recognized pattern token.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternToken {
    /// `@string@`, `@integer@`, ...
    Type(TypeKind),
    /// `@*@` or `@wildcard@`: any single present value.
    Any,
    /// `@...@`: trailing rest-of-array marker, or optional-key marker.
    Rest,
    /// `@string@.regex(<pattern>)`.
    Regex(String),
    /// `@expr(<expression>)@`.
    Expr(String),
    /// `@callback(<name>)@`.
    Callback(String),
}

impl PatternToken {
    /// Token text for mismatch messages.
    pub fn describe(&self) -> String {
        match self {
            PatternToken::Type(kind) => kind.token().to_string(),
            PatternToken::Any => "@*@".to_string(),
            PatternToken::Rest => "@...@".to_string(),
            PatternToken::Regex(re) => format!("@string@.regex({})", re),
            PatternToken::Expr(expr) => format!("@expr({})@", expr),
            PatternToken::Callback(name) => format!("@callback({})@", name),
        }
    }
}

/// A classified pattern leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternLeaf {
    /// Plain value, matched by type-aware equality.
    Literal(Value),
    /// A recognized token.
    Token(PatternToken),
    /// Token-shaped but unrecognized; fails the match with an explicit
    /// message so a typo never matches silently.
    Unsupported(String),
}

/// Classify a scalar pattern value. Only strings can carry tokens; every
/// other scalar is a literal.
pub fn classify(pattern: &Value) -> PatternLeaf {
    match pattern {
        Value::String(s) => classify_str(s),
        other => PatternLeaf::Literal(other.clone()),
    }
}

fn classify_str(s: &str) -> PatternLeaf {
    if let Some(kind) = TypeKind::from_token(s) {
        return PatternLeaf::Token(PatternToken::Type(kind));
    }
    match s {
        "@*@" | "@wildcard@" => return PatternLeaf::Token(PatternToken::Any),
        "@...@" => return PatternLeaf::Token(PatternToken::Rest),
        _ => {}
    }
    if let Some(re) = s
        .strip_prefix("@string@.regex(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return PatternLeaf::Token(PatternToken::Regex(re.to_string()));
    }
    if let Some(expr) = s
        .strip_prefix("@expr(")
        .and_then(|rest| rest.strip_suffix(")@"))
    {
        return PatternLeaf::Token(PatternToken::Expr(expr.to_string()));
    }
    if let Some(name) = s
        .strip_prefix("@callback(")
        .and_then(|rest| rest.strip_suffix(")@"))
    {
        return PatternLeaf::Token(PatternToken::Callback(name.to_string()));
    }
    // Token-shaped but unknown: `@integr@` must fail loudly, not match as a
    // literal. A lone "@" or text with interior @s (emails) stays literal.
    if s.len() >= 3 && s.starts_with('@') && s.ends_with('@') {
        return PatternLeaf::Unsupported(s.to_string());
    }
    PatternLeaf::Literal(Value::String(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_s(s: &str) -> PatternLeaf {
        classify(&Value::String(s.to_string()))
    }

    #[test]
    fn test_type_tokens() {
        for (token, kind) in [
            ("@string@", TypeKind::String),
            ("@integer@", TypeKind::Integer),
            ("@double@", TypeKind::Double),
            ("@number@", TypeKind::Number),
            ("@boolean@", TypeKind::Boolean),
            ("@array@", TypeKind::Array),
            ("@null@", TypeKind::Null),
        ] {
            assert_eq!(
                classify_s(token),
                PatternLeaf::Token(PatternToken::Type(kind)),
                "token {}",
                token
            );
        }
    }

    #[test]
    fn test_wildcard_spellings() {
        assert_eq!(classify_s("@*@"), PatternLeaf::Token(PatternToken::Any));
        assert_eq!(
            classify_s("@wildcard@"),
            PatternLeaf::Token(PatternToken::Any)
        );
    }

    #[test]
    fn test_rest_token() {
        assert_eq!(classify_s("@...@"), PatternLeaf::Token(PatternToken::Rest));
    }

    #[test]
    fn test_regex_token_keeps_parens() {
        assert_eq!(
            classify_s("@string@.regex(^([a-z]+)[0-9]+$)"),
            PatternLeaf::Token(PatternToken::Regex("^([a-z]+)[0-9]+$".to_string()))
        );
    }

    #[test]
    fn test_expr_token() {
        assert_eq!(
            classify_s("@expr(value > 5 and value < 10)@"),
            PatternLeaf::Token(PatternToken::Expr("value > 5 and value < 10".to_string()))
        );
    }

    #[test]
    fn test_callback_token() {
        assert_eq!(
            classify_s("@callback(is_uuid)@"),
            PatternLeaf::Token(PatternToken::Callback("is_uuid".to_string()))
        );
    }

    #[test]
    fn test_plain_string_is_literal() {
        assert_eq!(
            classify_s("Star-Wars T-shirt"),
            PatternLeaf::Literal(Value::from("Star-Wars T-shirt"))
        );
    }

    #[test]
    fn test_email_is_literal() {
        assert_eq!(
            classify_s("user@example.com"),
            PatternLeaf::Literal(Value::from("user@example.com"))
        );
    }

    #[test]
    fn test_typo_is_unsupported() {
        assert_eq!(
            classify_s("@integr@"),
            PatternLeaf::Unsupported("@integr@".to_string())
        );
    }

    #[test]
    fn test_non_string_scalars_are_literals() {
        assert_eq!(classify(&Value::Int(7)), PatternLeaf::Literal(Value::Int(7)));
        assert_eq!(classify(&Value::Null), PatternLeaf::Literal(Value::Null));
    }
}
