//! Constant-expression parser for default values and constant initializers.
//!
//! Only the subset PHP allows in compile-time constant contexts and that can
//! be evaluated without running code is recognized: scalars, arrays, unary
//! sign, class constants and named constants. Anything else yields `None`
//! and the caller treats the value as unreadable.

/// Parsed constant expression. Names are as written until the source walk
/// rewrites them to fully-qualified form.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<ArrayItem>),
    Negate(Box<Expr>),
    Plus(Box<Expr>),
    ClassConstant { class: String, name: String },
    /// `Foo::class`
    ClassName(String),
    /// `__CLASS__`
    MagicClass,
    /// A global constant; holds candidate names in lookup order.
    Constant(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Str(String),
    Punct(&'static str),
}

/// Parse a single constant expression.
pub fn parse_expr(src: &str) -> Option<Expr> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    parser.at_end().then_some(expr)
}

/// Split `src` on `separator` wherever it is not nested in brackets or quotes.
pub fn split_top_level(src: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in src.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&src[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&src[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\\' || !c.is_ascii()
}

fn tokenize(src: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
        } else if c == '/' && next == Some('*') {
            i += 2;
            while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                i += 1;
            }
            i += 2;
        } else if (c == '/' && next == Some('/')) || c == '#' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
            let start = i;
            let hex = c == '0' && matches!(next, Some('x' | 'X'));
            while i < chars.len() {
                let ch = chars[i];
                let exponent_sign = (ch == '+' || ch == '-')
                    && !hex
                    && matches!(chars.get(i - 1), Some('e' | 'E'));
                if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                    i += 1;
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(chars[start..i].iter().collect()));
        } else if is_ident_char(c) {
            let start = i;
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if c == '\'' {
            let (value, end) = single_quoted(&chars, i + 1)?;
            tokens.push(Token::Str(value));
            i = end;
        } else if c == '"' {
            let (value, end) = double_quoted(&chars, i + 1)?;
            tokens.push(Token::Str(value));
            i = end;
        } else if c == '=' && next == Some('>') {
            tokens.push(Token::Punct("=>"));
            i += 2;
        } else if c == ':' && next == Some(':') {
            tokens.push(Token::Punct("::"));
            i += 2;
        } else {
            let punct = match c {
                '(' => "(",
                ')' => ")",
                '[' => "[",
                ']' => "]",
                ',' => ",",
                '+' => "+",
                '-' => "-",
                _ => return None,
            };
            tokens.push(Token::Punct(punct));
            i += 1;
        }
    }

    Some(tokens)
}

/// Returns the unescaped content and the index after the closing quote.
fn single_quoted(chars: &[char], mut i: usize) -> Option<(String, usize)> {
    let mut out = String::new();
    while i < chars.len() {
        match chars[i] {
            '\'' => return Some((out, i + 1)),
            '\\' if matches!(chars.get(i + 1), Some('\\' | '\'')) => {
                out.push(chars[i + 1]);
                i += 2;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    None
}

/// Double-quoted strings are accepted only without interpolation.
fn double_quoted(chars: &[char], mut i: usize) -> Option<(String, usize)> {
    let mut out = String::new();
    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => return Some((out, i + 1)),
            '$' if chars
                .get(i + 1)
                .is_some_and(|n| n.is_alphabetic() || *n == '_' || *n == '{') =>
            {
                return None;
            }
            '{' if chars.get(i + 1) == Some(&'$') => return None,
            '\\' => {
                let Some(&esc) = chars.get(i + 1) else {
                    out.push('\\');
                    i += 1;
                    continue;
                };
                i += 2;
                match esc {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'v' => out.push('\u{0B}'),
                    'e' => out.push('\u{1B}'),
                    'f' => out.push('\u{0C}'),
                    '\\' => out.push('\\'),
                    '$' => out.push('$'),
                    '"' => out.push('"'),
                    'x' if chars.get(i).is_some_and(|h| h.is_ascii_hexdigit()) => {
                        let start = i;
                        while i < chars.len() && i - start < 2 && chars[i].is_ascii_hexdigit() {
                            i += 1;
                        }
                        let digits: String = chars[start..i].iter().collect();
                        out.push(char::from(u8::from_str_radix(&digits, 16).ok()?));
                    }
                    'u' if chars.get(i) == Some(&'{') => {
                        let close = chars[i..].iter().position(|&ch| ch == '}')? + i;
                        let digits: String = chars[i + 1..close].iter().collect();
                        out.push(char::from_u32(u32::from_str_radix(&digits, 16).ok()?)?);
                        i = close + 1;
                    }
                    '0'..='7' => {
                        let start = i - 1;
                        while i < chars.len() && i - start < 3 && ('0'..='7').contains(&chars[i]) {
                            i += 1;
                        }
                        let digits: String = chars[start..i].iter().collect();
                        let code = u32::from_str_radix(&digits, 8).ok()? & 0xFF;
                        out.push(char::from_u32(code)?);
                    }
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    None
}

fn parse_number(raw: &str) -> Option<Expr> {
    let s = raw.replace('_', "");
    let lower = s.to_ascii_lowercase();

    let radix = if let Some(rest) = lower.strip_prefix("0x") {
        Some((rest.to_string(), 16))
    } else if let Some(rest) = lower.strip_prefix("0b") {
        Some((rest.to_string(), 2))
    } else if let Some(rest) = lower.strip_prefix("0o") {
        Some((rest.to_string(), 8))
    } else if lower.len() > 1 && lower.starts_with('0') && lower.bytes().all(|b| b.is_ascii_digit()) {
        Some((lower[1..].to_string(), 8))
    } else {
        None
    };

    if let Some((digits, radix)) = radix {
        if digits.is_empty() {
            return None;
        }
        return match i64::from_str_radix(&digits, radix) {
            Ok(n) => Some(Expr::Int(n)),
            // PHP promotes out-of-range integer literals to float.
            Err(_) => u128::from_str_radix(&digits, radix).ok().map(|n| Expr::Float(n as f64)),
        };
    }

    if lower.contains(['.', 'e']) {
        return lower.parse::<f64>().ok().map(Expr::Float);
    }

    match lower.parse::<i64>() {
        Ok(n) => Some(Expr::Int(n)),
        Err(_) => lower.parse::<f64>().ok().map(Expr::Float),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Option<Expr> {
        if self.eat("-") {
            return Some(Expr::Negate(Box::new(self.expr()?)));
        }
        if self.eat("+") {
            return Some(Expr::Plus(Box::new(self.expr()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Option<Expr> {
        match self.next()? {
            Token::Number(raw) => parse_number(&raw),
            Token::Str(value) => Some(Expr::Str(value)),
            Token::Punct("(") => {
                let inner = self.expr()?;
                self.eat(")").then_some(inner)
            }
            Token::Punct("[") => Some(Expr::Array(self.array_items("]")?)),
            Token::Ident(name) => self.identifier(name),
            Token::Punct(_) => None,
        }
    }

    fn identifier(&mut self, name: String) -> Option<Expr> {
        if name.eq_ignore_ascii_case("array") && self.eat("(") {
            return Some(Expr::Array(self.array_items(")")?));
        }
        if self.eat("::") {
            let Some(Token::Ident(member)) = self.next() else {
                return None;
            };
            if member.eq_ignore_ascii_case("class") {
                return Some(Expr::ClassName(name));
            }
            return Some(Expr::ClassConstant { class: name, name: member });
        }
        match name.to_ascii_lowercase().as_str() {
            "null" | "\\null" => Some(Expr::Null),
            "true" | "\\true" => Some(Expr::Bool(true)),
            "false" | "\\false" => Some(Expr::Bool(false)),
            "__class__" => Some(Expr::MagicClass),
            _ => Some(Expr::Constant(vec![name])),
        }
    }

    fn array_items(&mut self, close: &str) -> Option<Vec<ArrayItem>> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Some(items);
            }
            let first = self.expr()?;
            let item = if self.eat("=>") {
                ArrayItem {
                    key: Some(first),
                    value: self.expr()?,
                }
            } else {
                ArrayItem {
                    key: None,
                    value: first,
                }
            };
            items.push(item);
            if !self.eat(",") {
                return self.eat(close).then_some(items);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(parse_expr("null"), Some(Expr::Null));
        assert_eq!(parse_expr("NULL"), Some(Expr::Null));
        assert_eq!(parse_expr("True"), Some(Expr::Bool(true)));
        assert_eq!(parse_expr("42"), Some(Expr::Int(42)));
        assert_eq!(parse_expr("1_000"), Some(Expr::Int(1000)));
        assert_eq!(parse_expr("0x1F"), Some(Expr::Int(31)));
        assert_eq!(parse_expr("0b101"), Some(Expr::Int(5)));
        assert_eq!(parse_expr("0755"), Some(Expr::Int(493)));
        assert_eq!(parse_expr("0o17"), Some(Expr::Int(15)));
        assert_eq!(parse_expr("1.5"), Some(Expr::Float(1.5)));
        assert_eq!(parse_expr(".5"), Some(Expr::Float(0.5)));
        assert_eq!(parse_expr("1e-3"), Some(Expr::Float(0.001)));
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse_expr(r"'it\'s'"), Some(Expr::Str("it's".into())));
        assert_eq!(parse_expr(r"'a\nb'"), Some(Expr::Str(r"a\nb".into())));
        assert_eq!(parse_expr(r#""a\tb""#), Some(Expr::Str("a\tb".into())));
        assert_eq!(parse_expr(r#""\x41\101""#), Some(Expr::Str("AA".into())));
        assert_eq!(parse_expr(r#""cost: \$5""#), Some(Expr::Str("cost: $5".into())));
        assert_eq!(parse_expr(r#""hello $name""#), None);
    }

    #[test]
    fn test_unary() {
        assert_eq!(parse_expr("-1"), Some(Expr::Negate(Box::new(Expr::Int(1)))));
        assert_eq!(parse_expr("+(2)"), Some(Expr::Plus(Box::new(Expr::Int(2)))));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(parse_expr("array()"), Some(Expr::Array(vec![])));
        assert_eq!(parse_expr("[]"), Some(Expr::Array(vec![])));
        assert_eq!(
            parse_expr("['a' => 1, 2,]"),
            Some(Expr::Array(vec![
                ArrayItem {
                    key: Some(Expr::Str("a".into())),
                    value: Expr::Int(1),
                },
                ArrayItem {
                    key: None,
                    value: Expr::Int(2),
                },
            ]))
        );
        assert_eq!(parse_expr("ARRAY(1, [2])").map(|e| matches!(e, Expr::Array(ref v) if v.len() == 2)), Some(true));
    }

    #[test]
    fn test_names() {
        assert_eq!(
            parse_expr("self::MODE"),
            Some(Expr::ClassConstant {
                class: "self".into(),
                name: "MODE".into()
            })
        );
        assert_eq!(parse_expr(r"\Foo\Bar::class"), Some(Expr::ClassName(r"\Foo\Bar".into())));
        assert_eq!(parse_expr("__CLASS__"), Some(Expr::MagicClass));
        assert_eq!(parse_expr("PHP_EOL"), Some(Expr::Constant(vec!["PHP_EOL".into()])));
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(parse_expr("1 + 2"), None);
        assert_eq!(parse_expr("new Foo()"), None);
        assert_eq!(parse_expr("'a' . 'b'"), None);
        assert_eq!(parse_expr("<<<EOT\nx\nEOT"), None);
        assert_eq!(parse_expr(""), None);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a, [1, 2], 'x,y'", ','), vec!["a", " [1, 2]", " 'x,y'"]);
        assert_eq!(split_top_level("X = 1", '='), vec!["X ", " 1"]);
    }
}
