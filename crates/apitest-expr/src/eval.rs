//! Tree-walking evaluator. Pure: no I/O, no clock, no mutation of the bound
//! value, so evaluation is safe to run against untrusted pattern files.

use crate::{BinaryOp, EvalError, Expr, Func, UnaryOp, Value};

/// Evaluate `expr` with the single variable `value` bound to `bound`.
pub fn evaluate(expr: &Expr, bound: &Value) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Null => Ok(Value::Null),
        Expr::TypeLiteral(t) => Ok(Value::Type(t.clone())),
        Expr::Var(name) => {
            if name == "value" {
                Ok(bound.clone())
            } else {
                Err(EvalError::UndefinedVariable(name.clone()))
            }
        }
        Expr::Array(elements) => {
            let values: Result<Vec<_>, _> = elements.iter().map(|e| evaluate(e, bound)).collect();
            Ok(Value::Array(values?))
        }
        Expr::Unary { op, expr } => {
            let val = evaluate(expr, bound)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!val.as_bool()?)),
                UnaryOp::Neg => Ok(Value::Number(-val.as_number()?)),
            }
        }
        Expr::Binary { op, left, right } => eval_binary(*op, left, right, bound),
        Expr::Call { name, arg } => {
            let func = Func::from_name(name)
                .ok_or_else(|| EvalError::UndefinedFunction(name.clone()))?;
            eval_call(func, &evaluate(arg, bound)?)
        }
        Expr::Index { expr, index } => {
            let base = evaluate(expr, bound)?;
            let idx = evaluate(index, bound)?;
            eval_index(&base, &idx)
        }
        Expr::Property { expr, name } => {
            let base = evaluate(expr, bound)?;
            match &base {
                Value::Object(obj) => obj
                    .get(name)
                    .cloned()
                    .ok_or_else(|| EvalError::KeyNotFound(name.clone())),
                _ => Err(EvalError::TypeError {
                    expected: "object",
                    got: base.type_name(),
                }),
            }
        }
    }
}

fn eval_call(func: Func, arg: &Value) -> Result<Value, EvalError> {
    match func {
        Func::Len => match arg {
            Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
            Value::Array(a) => Ok(Value::Number(a.len() as f64)),
            Value::Object(o) => Ok(Value::Number(o.len() as f64)),
            _ => Err(EvalError::TypeError {
                expected: "string, array, or object",
                got: arg.type_name(),
            }),
        },
        Func::Type => Ok(Value::Type(arg.type_name().to_string())),
        Func::Abs => Ok(Value::Number(arg.as_number()?.abs())),
        Func::Lower => Ok(Value::String(arg.as_str()?.to_lowercase())),
        Func::Upper => Ok(Value::String(arg.as_str()?.to_uppercase())),
    }
}

fn eval_index(base: &Value, idx: &Value) -> Result<Value, EvalError> {
    match base {
        Value::Array(arr) => {
            let i = idx.as_number()?;
            let actual_index = if i < 0.0 {
                // Negative indexing: -1 is the last element.
                let neg = (-i) as usize;
                if neg > arr.len() {
                    return Err(EvalError::IndexOutOfBounds {
                        index: i as i64,
                        len: arr.len(),
                    });
                }
                arr.len() - neg
            } else {
                i as usize
            };
            arr.get(actual_index)
                .cloned()
                .ok_or(EvalError::IndexOutOfBounds {
                    index: i as i64,
                    len: arr.len(),
                })
        }
        Value::Object(obj) => {
            let key = idx.as_str()?;
            obj.get(key)
                .cloned()
                .ok_or_else(|| EvalError::KeyNotFound(key.to_string()))
        }
        _ => Err(EvalError::TypeError {
            expected: "array or object",
            got: base.type_name(),
        }),
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    bound: &Value,
) -> Result<Value, EvalError> {
    // and/or short-circuit before the right side is evaluated.
    if op == BinaryOp::And {
        if !evaluate(left, bound)?.as_bool()? {
            return Ok(Value::Bool(false));
        }
        return Ok(Value::Bool(evaluate(right, bound)?.as_bool()?));
    }
    if op == BinaryOp::Or {
        if evaluate(left, bound)?.as_bool()? {
            return Ok(Value::Bool(true));
        }
        return Ok(Value::Bool(evaluate(right, bound)?.as_bool()?));
    }

    let l = evaluate(left, bound)?;
    let r = evaluate(right, bound)?;

    match op {
        BinaryOp::Add => match (&l, &r) {
            (Value::String(ls), Value::String(rs)) => Ok(Value::String(format!("{}{}", ls, rs))),
            _ => Ok(Value::Number(l.as_number()? + r.as_number()?)),
        },
        BinaryOp::Sub => Ok(Value::Number(l.as_number()? - r.as_number()?)),
        BinaryOp::Mul => Ok(Value::Number(l.as_number()? * r.as_number()?)),
        BinaryOp::Mod => Ok(Value::Number(l.as_number()? % r.as_number()?)),
        BinaryOp::Div => {
            let divisor = r.as_number()?;
            if divisor == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Value::Number(l.as_number()? / divisor))
            }
        }
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&l, &r))),
        BinaryOp::Ne => Ok(Value::Bool(!values_equal(&l, &r))),
        BinaryOp::Lt => compare(&l, &r, |o| o == std::cmp::Ordering::Less),
        BinaryOp::Le => compare(&l, &r, |o| o != std::cmp::Ordering::Greater),
        BinaryOp::Gt => compare(&l, &r, |o| o == std::cmp::Ordering::Greater),
        BinaryOp::Ge => compare(&l, &r, |o| o != std::cmp::Ordering::Less),
        BinaryOp::In => {
            let arr = r.as_array()?;
            Ok(Value::Bool(arr.iter().any(|v| values_equal(&l, v))))
        }
        BinaryOp::Contains => Ok(Value::Bool(l.as_str()?.contains(r.as_str()?))),
        BinaryOp::StartsWith => Ok(Value::Bool(l.as_str()?.starts_with(r.as_str()?))),
        BinaryOp::EndsWith => Ok(Value::Bool(l.as_str()?.ends_with(r.as_str()?))),
        BinaryOp::Matches => {
            let re = regex::Regex::new(r.as_str()?)
                .map_err(|e| EvalError::InvalidRegex(e.to_string()))?;
            Ok(Value::Bool(re.is_match(l.as_str()?)))
        }
        BinaryOp::And | BinaryOp::Or => unreachable!(),
    }
}

fn compare(
    l: &Value,
    r: &Value,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<Value, EvalError> {
    let ordering = match (l, r) {
        (Value::String(ls), Value::String(rs)) => ls.cmp(rs),
        _ => {
            let (ln, rn) = (l.as_number()?, r.as_number()?);
            ln.partial_cmp(&rn).ok_or(EvalError::TypeError {
                expected: "comparable number",
                got: "NaN",
            })?
        }
    };
    Ok(Value::Bool(accept(ordering)))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        // `type(x) == null` compares a Type against the null literal.
        (Value::Null, Value::Type(t)) | (Value::Type(t), Value::Null) => t == "null",
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).map(|bv| values_equal(v, bv)).unwrap_or(false))
        }
        (Value::Type(a), Value::Type(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn eval(src: &str, bound: &Value) -> Result<Value, EvalError> {
        evaluate(&parse(src).unwrap(), bound)
    }

    #[test]
    fn test_short_circuit_and() {
        // The right side would divide by zero if evaluated.
        let v = Value::Number(0.0);
        assert_eq!(
            eval("value > 0 and 1 / value > 0", &v).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_short_circuit_or() {
        let v = Value::Number(0.0);
        assert_eq!(
            eval("value == 0 or 1 / value > 0", &v).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("1 / 0", &Value::Null), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(
            eval(r#""foo" + "bar""#, &Value::Null).unwrap(),
            Value::String("foobar".to_string())
        );
    }

    #[test]
    fn test_string_ordering() {
        assert_eq!(
            eval(r#""abc" < "abd""#, &Value::Null).unwrap(),
            Value::Bool(true)
        );
    }
}
