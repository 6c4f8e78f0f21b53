//! PHP constant values and their `var_export` source form.

use serde::Serialize;

/// A value a PHP constant expression evaluates to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<(ArrayKey, PhpValue)>),
}

/// Key of a PHP array entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArrayKey {
    Int(i64),
    String(String),
}

impl ArrayKey {
    /// Normalize a string key the way PHP does: canonical decimal integers
    /// become integer keys.
    pub fn from_string(key: String) -> Self {
        let canonical = match key.strip_prefix('-') {
            Some(digits) => !digits.is_empty() && !digits.starts_with('0'),
            None => key == "0" || !key.starts_with('0'),
        };
        if canonical && !key.is_empty() && key.trim_start_matches('-').bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = key.parse::<i64>() {
                return Self::Int(n);
            }
        }
        Self::String(key)
    }
}

impl PhpValue {
    pub fn is_empty_array(&self) -> bool {
        matches!(self, Self::Array(entries) if entries.is_empty())
    }

    /// Render the value exactly as PHP's `var_export($value, true)` does.
    pub fn export(&self) -> String {
        let mut out = String::new();
        self.export_into(1, &mut out);
        out
    }

    fn export_into(&self, level: usize, out: &mut String) {
        match self {
            Self::Null => out.push_str("NULL"),
            Self::Bool(true) => out.push_str("true"),
            Self::Bool(false) => out.push_str("false"),
            Self::Int(n) => out.push_str(&n.to_string()),
            Self::Float(f) => out.push_str(&export_float(*f)),
            Self::String(s) => out.push_str(&export_string(s)),
            Self::Array(entries) => {
                if level > 1 {
                    out.push('\n');
                    push_spaces(out, level - 1);
                }
                out.push_str("array (\n");
                for (key, value) in entries {
                    push_spaces(out, level + 1);
                    match key {
                        ArrayKey::Int(n) => out.push_str(&n.to_string()),
                        ArrayKey::String(s) => out.push_str(&export_string(s)),
                    }
                    out.push_str(" => ");
                    value.export_into(level + 2, out);
                    out.push_str(",\n");
                }
                if level > 1 {
                    push_spaces(out, level - 1);
                }
                out.push(')');
            }
        }
    }
}

fn push_spaces(out: &mut String, count: usize) {
    out.push_str(&" ".repeat(count));
}

/// Single-quoted PHP string literal. NUL bytes cannot live inside single
/// quotes, so they are spliced in as `"\0"`.
fn export_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped.replace('\0', "' . \"\\0\" . '"))
}

/// Shortest round-trip float form with PHP's conventions: a trailing `.0`
/// on integral values and `E+n` exponents outside the fixed range.
fn export_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    let sci = format!("{:e}", f);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let decimal_point = exponent + 1;

    if decimal_point < -3 || decimal_point > 17 {
        let (sign, digits) = match mantissa.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", mantissa),
        };
        let digits = digits.replace('.', "");
        let (first, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{first}.{rest}E{exp_sign}{}", exponent.abs());
    }

    let fixed = format!("{}", f);
    if fixed.contains('.') {
        fixed
    } else {
        format!("{fixed}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalars() {
        assert_eq!(PhpValue::Null.export(), "NULL");
        assert_eq!(PhpValue::Bool(true).export(), "true");
        assert_eq!(PhpValue::Bool(false).export(), "false");
        assert_eq!(PhpValue::Int(-42).export(), "-42");
    }

    #[test]
    fn test_strings_are_single_quoted_and_escaped() {
        assert_eq!(PhpValue::String("abc".into()).export(), "'abc'");
        assert_eq!(PhpValue::String("it's".into()).export(), r"'it\'s'");
        assert_eq!(PhpValue::String(r"C:\dir".into()).export(), r"'C:\\dir'");
        assert_eq!(PhpValue::String("\n".into()).export(), "'\n'");
    }

    #[test]
    fn test_floats() {
        assert_eq!(PhpValue::Float(1.5).export(), "1.5");
        assert_eq!(PhpValue::Float(2.0).export(), "2.0");
        assert_eq!(PhpValue::Float(-0.25).export(), "-0.25");
        assert_eq!(PhpValue::Float(0.0001).export(), "0.0001");
        assert_eq!(PhpValue::Float(0.00001).export(), "1.0E-5");
        assert_eq!(PhpValue::Float(1.5e-7).export(), "1.5E-7");
        assert_eq!(PhpValue::Float(1e20).export(), "1.0E+20");
        assert_eq!(PhpValue::Float(1e15).export(), "1000000000000000.0");
    }

    #[test]
    fn test_list_array() {
        let value = PhpValue::Array(vec![
            (ArrayKey::Int(0), PhpValue::Int(1)),
            (ArrayKey::Int(1), PhpValue::String("two".into())),
        ]);
        assert_eq!(value.export(), "array (\n  0 => 1,\n  1 => 'two',\n)");
    }

    #[test]
    fn test_nested_array() {
        let value = PhpValue::Array(vec![(
            ArrayKey::String("a".into()),
            PhpValue::Array(vec![(ArrayKey::Int(0), PhpValue::Bool(true))]),
        )]);
        assert_eq!(
            value.export(),
            "array (\n  'a' => \n  array (\n    0 => true,\n  ),\n)"
        );
    }

    #[test]
    fn test_empty_array() {
        let value = PhpValue::Array(Vec::new());
        assert!(value.is_empty_array());
        assert_eq!(value.export(), "array (\n)");
    }

    #[test]
    fn test_array_key_normalization() {
        assert_eq!(ArrayKey::from_string("12".into()), ArrayKey::Int(12));
        assert_eq!(ArrayKey::from_string("-3".into()), ArrayKey::Int(-3));
        assert_eq!(ArrayKey::from_string("0".into()), ArrayKey::Int(0));
        assert_eq!(ArrayKey::from_string("012".into()), ArrayKey::String("012".into()));
        assert_eq!(ArrayKey::from_string("-0".into()), ArrayKey::String("-0".into()));
        assert_eq!(ArrayKey::from_string("1.5".into()), ArrayKey::String("1.5".into()));
        assert_eq!(ArrayKey::from_string("".into()), ArrayKey::String("".into()));
    }
}
