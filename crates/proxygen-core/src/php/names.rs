//! Namespace and `use` import resolution.

use std::collections::HashMap;

/// Builtin type keywords that never name a class.
const BUILTIN_TYPES: &[&str] = &[
    "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null", "object",
    "static", "string", "true", "void",
];

/// Name resolution state for one namespace block.
#[derive(Debug, Clone, Default)]
pub struct NameContext {
    namespace: String,
    /// Lowercase alias → fully-qualified class name.
    imports: HashMap<String, String>,
}

impl NameContext {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into().trim_matches('\\').to_string(),
            imports: HashMap::new(),
        }
    }

    /// Fully-qualified name of a class declared in this namespace.
    pub fn qualify_declaration(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}\\{}", self.namespace, name)
        }
    }

    /// Resolve a class reference as written in source.
    pub fn resolve_class(&self, name: &str) -> String {
        let name = name.trim();
        if let Some(fq) = name.strip_prefix('\\') {
            return fq.to_string();
        }
        if let Some(rest) = strip_prefix_ignore_case(name, "namespace\\") {
            return self.qualify_declaration(rest);
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        if let Some(target) = self.imports.get(&first.to_ascii_lowercase()) {
            return match rest {
                Some(rest) => format!("{target}\\{rest}"),
                None => target.clone(),
            };
        }
        self.qualify_declaration(name)
    }

    /// Candidate names for a constant reference, in lookup order. Unqualified
    /// constants fall back to the global namespace.
    pub fn constant_candidates(&self, name: &str) -> Vec<String> {
        if let Some(fq) = name.strip_prefix('\\') {
            return vec![fq.to_string()];
        }
        if name.contains('\\') {
            return vec![self.resolve_class(name)];
        }
        if self.namespace.is_empty() {
            vec![name.to_string()]
        } else {
            vec![self.qualify_declaration(name), name.to_string()]
        }
    }

    /// Register the imports of a `use ...;` declaration given its source text.
    /// Function and constant imports are ignored.
    pub fn add_use_declaration(&mut self, text: &str) {
        let body = text.trim().trim_end_matches(';').trim();
        let Some(body) = strip_keyword(body, "use") else {
            return;
        };
        if strip_keyword(body, "function").is_some() || strip_keyword(body, "const").is_some() {
            return;
        }

        if let (Some(open), Some(close)) = (body.find('{'), body.rfind('}')) {
            let prefix = body[..open].trim().trim_end_matches('\\');
            for item in body[open + 1..close].split(',') {
                let item = item.trim();
                if item.is_empty()
                    || strip_keyword(item, "function").is_some()
                    || strip_keyword(item, "const").is_some()
                {
                    continue;
                }
                self.add_import(&format!("{prefix}\\{item}"));
            }
        } else {
            for item in body.split(',') {
                self.add_import(item.trim());
            }
        }
    }

    fn add_import(&mut self, clause: &str) {
        let words: Vec<&str> = clause.split_whitespace().collect();
        let (path, alias) = match words.as_slice() {
            [path, kw, alias] if kw.eq_ignore_ascii_case("as") => (*path, Some(*alias)),
            [path] => (*path, None),
            _ => return,
        };
        let path = path.trim_start_matches('\\');
        if path.is_empty() {
            return;
        }
        let alias = alias.unwrap_or_else(|| path.rsplit('\\').next().unwrap_or(path));
        self.imports.insert(alias.to_ascii_lowercase(), path.to_string());
    }
}

/// Whether `name` is a builtin type keyword rather than a class.
pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.iter().any(|b| b.eq_ignore_ascii_case(name))
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

/// Strip a leading keyword followed by whitespace, case-insensitively.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    let rest = &text[keyword.len()..];
    (head.eq_ignore_ascii_case(keyword) && rest.starts_with(char::is_whitespace)).then(|| rest.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_namespace() {
        let ctx = NameContext::default();
        assert_eq!(ctx.resolve_class("Foo"), "Foo");
        assert_eq!(ctx.resolve_class("\\Foo\\Bar"), "Foo\\Bar");
        assert_eq!(ctx.qualify_declaration("Foo"), "Foo");
    }

    #[test]
    fn test_namespaced_resolution() {
        let ctx = NameContext::new("App\\Service");
        assert_eq!(ctx.resolve_class("Mailer"), "App\\Service\\Mailer");
        assert_eq!(ctx.resolve_class("Sub\\Mailer"), "App\\Service\\Sub\\Mailer");
        assert_eq!(ctx.resolve_class("namespace\\Mailer"), "App\\Service\\Mailer");
        assert_eq!(ctx.resolve_class("\\DateTime"), "DateTime");
    }

    #[test]
    fn test_use_imports() {
        let mut ctx = NameContext::new("App");
        ctx.add_use_declaration("use Psr\\Log\\LoggerInterface;");
        ctx.add_use_declaration("use Foo\\Bar as Baz, \\Other\\Thing;");
        ctx.add_use_declaration("use Vendor\\Pkg\\{Alpha, Beta as B};");
        ctx.add_use_declaration("use function Vendor\\helper;");

        assert_eq!(ctx.resolve_class("LoggerInterface"), "Psr\\Log\\LoggerInterface");
        assert_eq!(ctx.resolve_class("loggerinterface"), "Psr\\Log\\LoggerInterface");
        assert_eq!(ctx.resolve_class("Baz"), "Foo\\Bar");
        assert_eq!(ctx.resolve_class("Thing"), "Other\\Thing");
        assert_eq!(ctx.resolve_class("Alpha"), "Vendor\\Pkg\\Alpha");
        assert_eq!(ctx.resolve_class("B"), "Vendor\\Pkg\\Beta");
        assert_eq!(ctx.resolve_class("Baz\\Inner"), "Foo\\Bar\\Inner");
        assert_eq!(ctx.resolve_class("helper"), "App\\helper");
    }

    #[test]
    fn test_constant_candidates() {
        let ctx = NameContext::new("App");
        assert_eq!(ctx.constant_candidates("FLAG"), vec!["App\\FLAG", "FLAG"]);
        assert_eq!(ctx.constant_candidates("\\FLAG"), vec!["FLAG"]);
        assert_eq!(NameContext::default().constant_candidates("FLAG"), vec!["FLAG"]);
    }

    #[test]
    fn test_builtin_types() {
        assert!(is_builtin_type("INT"));
        assert!(is_builtin_type("callable"));
        assert!(!is_builtin_type("array"));
        assert!(!is_builtin_type("Foo"));
    }
}
