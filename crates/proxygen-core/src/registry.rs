//! Registry of parsed class declarations and static reflection over them.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::model::{
    ClassKind, DefaultValue, MethodDescriptor, MethodRole, ParameterDescriptor, TargetClass,
};
use crate::php::literal::{ArrayItem, Expr};
use crate::php::{self, builtins, ClassDecl, ConstExpr, DeclKind, MethodDecl, ParamDecl};
use crate::value::{ArrayKey, PhpValue};

/// Nesting limit for constant evaluation; guards against reference cycles.
const MAX_EVAL_DEPTH: usize = 32;

/// All classes, interfaces and traits loaded so far.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassDecl>,
    /// Lowercase name → position in `classes`.
    index: HashMap<String, usize>,
    /// Global constants by declared name.
    constants: HashMap<String, ConstExpr>,
    files: Vec<PathBuf>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and register a PHP file. Returns the classes and interfaces it
    /// added, in declaration order.
    pub fn load_file(&mut self, path: &Path) -> CoreResult<Vec<String>> {
        let source = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        self.load_source(path, &source)
    }

    /// Register PHP source text as if read from `path`. Redeclared classes
    /// are not part of the returned names.
    pub fn load_source(&mut self, path: &Path, source: &str) -> CoreResult<Vec<String>> {
        let file = php::parse_source(path, source)?;

        for constant in file.constants {
            self.constants.entry(constant.name).or_insert(constant.value);
        }
        let mut added = Vec::new();
        for class in file.classes {
            let name = (class.kind != DeclKind::Trait).then(|| class.name.clone());
            if self.insert(class) {
                added.extend(name);
            }
        }
        self.files.push(path.to_path_buf());

        Ok(added)
    }

    /// Add a declaration unless its name is taken. Returns whether it was
    /// added.
    fn insert(&mut self, class: ClassDecl) -> bool {
        let key = normalize(&class.name);
        if let Some(&existing) = self.index.get(&key) {
            let first = &self.classes[existing];
            warn!(
                class = %class.name,
                file = %class.source.display(),
                line = class.line,
                first_file = %first.source.display(),
                first_line = first.line,
                "Class redeclared, keeping first declaration"
            );
            return false;
        }
        self.index.insert(key, self.classes.len());
        self.classes.push(class);
        true
    }

    /// Look up any declaration, traits included.
    pub fn get(&self, name: &str) -> Option<&ClassDecl> {
        self.index.get(&normalize(name)).map(|&i| &self.classes[i])
    }

    /// Whether `name` is a known class or interface.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some_and(|c| c.kind != DeclKind::Trait)
    }

    /// Files loaded so far, in load order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Build the reflected model of a class or interface.
    pub fn reflect(&self, name: &str) -> CoreResult<TargetClass> {
        let class = self
            .get(name)
            .filter(|c| c.kind != DeclKind::Trait)
            .ok_or_else(|| CoreError::class_not_found(name, self.joined_files()))?;

        let kind = match class.kind {
            DeclKind::Class { is_abstract: true } => ClassKind::AbstractClass,
            DeclKind::Interface => ClassKind::Interface,
            _ => ClassKind::Class,
        };

        let mut methods = Vec::new();
        let mut seen = HashSet::new();
        let mut visited = HashSet::new();
        self.collect_methods(class, &mut seen, &mut visited, &mut methods);

        debug!(class = %class.name, methods = methods.len(), "Reflected class");
        Ok(TargetClass {
            name: class.name.clone(),
            kind,
            methods,
        })
    }

    fn joined_files(&self) -> String {
        self.files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Own methods, then trait methods, then the parent chain, then
    /// interfaces. Earlier names shadow later ones.
    fn collect_methods(
        &self,
        class: &ClassDecl,
        seen: &mut HashSet<String>,
        visited: &mut HashSet<String>,
        out: &mut Vec<MethodDescriptor>,
    ) {
        if !visited.insert(normalize(&class.name)) {
            return;
        }

        for method in &class.methods {
            if seen.insert(method.name.to_ascii_lowercase()) {
                out.push(self.describe_method(method, class));
            }
        }

        let ancestors = class
            .traits
            .iter()
            .chain(class.parent.iter())
            .chain(class.interfaces.iter());
        for ancestor in ancestors {
            match self.get(ancestor) {
                Some(decl) => self.collect_methods(decl, seen, visited, out),
                None => debug!(class = %class.name, ancestor = %ancestor, "Skipping unknown ancestor"),
            }
        }
    }

    fn describe_method(&self, method: &MethodDecl, class: &ClassDecl) -> MethodDescriptor {
        MethodDescriptor {
            name: method.name.clone(),
            flags: method.flags,
            is_static: method.is_static,
            returns_reference: method.returns_reference,
            parameters: method
                .parameters
                .iter()
                .enumerate()
                .map(|(position, param)| self.describe_parameter(param, position, class, method))
                .collect(),
            role: MethodRole::classify(&method.name),
            declaring_class: class.name.clone(),
        }
    }

    fn describe_parameter(
        &self,
        param: &ParamDecl,
        position: usize,
        class: &ClassDecl,
        method: &MethodDecl,
    ) -> ParameterDescriptor {
        let default = param.default.as_ref().map(|default| {
            match default.expr.as_ref().and_then(|e| self.evaluate(e, 0)) {
                Some(value) => DefaultValue::Value(value),
                None => {
                    debug!(
                        class = %class.name,
                        method = %method.name,
                        parameter = %param.name,
                        source = %default.source,
                        "Default value is not statically readable"
                    );
                    DefaultValue::Unreadable(default.source.clone())
                }
            }
        });

        let null_default = matches!(default, Some(DefaultValue::Value(PhpValue::Null)));
        ParameterDescriptor {
            name: param.name.clone(),
            type_hint: param.type_hint.clone(),
            by_reference: param.by_reference,
            allows_null: param.nullable_type || (param.type_hint.is_some() && null_default),
            variadic: param.variadic,
            default,
            position,
        }
    }

    /// Evaluate a constant expression. `None` when any part is unknown or
    /// not a compile-time value.
    pub fn evaluate(&self, expr: &Expr, depth: usize) -> Option<PhpValue> {
        if depth > MAX_EVAL_DEPTH {
            return None;
        }
        match expr {
            Expr::Null => Some(PhpValue::Null),
            Expr::Bool(b) => Some(PhpValue::Bool(*b)),
            Expr::Int(n) => Some(PhpValue::Int(*n)),
            Expr::Float(f) => Some(PhpValue::Float(*f)),
            Expr::Str(s) => Some(PhpValue::String(s.clone())),
            Expr::Array(items) => self.evaluate_array(items, depth),
            Expr::Negate(inner) => match numeric(self.evaluate(inner, depth + 1)?)? {
                PhpValue::Int(n) => Some(match n.checked_neg() {
                    Some(n) => PhpValue::Int(n),
                    None => PhpValue::Float(-(n as f64)),
                }),
                PhpValue::Float(f) => Some(PhpValue::Float(-f)),
                _ => None,
            },
            Expr::Plus(inner) => numeric(self.evaluate(inner, depth + 1)?),
            Expr::ClassConstant { class, name } => self.class_constant(class, name, depth + 1),
            Expr::Constant(candidates) => candidates
                .iter()
                .find_map(|name| self.global_constant(name, depth + 1)),
            Expr::ClassName(_) | Expr::MagicClass => None,
        }
    }

    fn evaluate_array(&self, items: &[ArrayItem], depth: usize) -> Option<PhpValue> {
        let mut entries: Vec<(ArrayKey, PhpValue)> = Vec::new();
        let mut next_index: i64 = 0;

        for item in items {
            let value = self.evaluate(&item.value, depth + 1)?;
            let key = match &item.key {
                None => ArrayKey::Int(next_index),
                Some(key) => match self.evaluate(key, depth + 1)? {
                    PhpValue::Int(n) => ArrayKey::Int(n),
                    PhpValue::String(s) => ArrayKey::from_string(s),
                    PhpValue::Bool(b) => ArrayKey::Int(i64::from(b)),
                    PhpValue::Float(f) if f.is_finite() => ArrayKey::Int(f.trunc() as i64),
                    PhpValue::Null => ArrayKey::String(String::new()),
                    _ => return None,
                },
            };
            if let ArrayKey::Int(n) = key {
                if n >= next_index {
                    next_index = n.checked_add(1)?;
                }
            }
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }

        Some(PhpValue::Array(entries))
    }

    fn class_constant(&self, class: &str, name: &str, depth: usize) -> Option<PhpValue> {
        let mut visited = HashSet::new();
        let constant = self.find_class_constant(class, name, &mut visited)?;
        self.evaluate(constant.expr.as_ref()?, depth + 1)
    }

    /// Find a constant on a class or anything it inherits from.
    fn find_class_constant(
        &self,
        class: &str,
        name: &str,
        visited: &mut HashSet<String>,
    ) -> Option<&ConstExpr> {
        let decl = self.get(class)?;
        if !visited.insert(normalize(&decl.name)) {
            return None;
        }
        if let Some(constant) = decl.constants.iter().find(|c| c.name == name) {
            return Some(&constant.value);
        }
        decl.parent
            .iter()
            .chain(decl.interfaces.iter())
            .chain(decl.traits.iter())
            .find_map(|ancestor| self.find_class_constant(ancestor, name, visited))
    }

    fn global_constant(&self, name: &str, depth: usize) -> Option<PhpValue> {
        match self.constants.get(name) {
            Some(constant) => self.evaluate(constant.expr.as_ref()?, depth + 1),
            None => builtins::constant(name),
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_start_matches('\\').to_ascii_lowercase()
}

/// Convert a value for unary arithmetic the way PHP does for constant
/// operands. Non-numeric strings and arrays are rejected.
fn numeric(value: PhpValue) -> Option<PhpValue> {
    match value {
        PhpValue::Int(_) | PhpValue::Float(_) => Some(value),
        PhpValue::Bool(b) => Some(PhpValue::Int(i64::from(b))),
        PhpValue::Null => Some(PhpValue::Int(0)),
        PhpValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(PhpValue::Int)
                .or_else(|_| s.parse::<f64>().map(PhpValue::Float))
                .ok()
        }
        PhpValue::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TypeHint, Visibility};
    use pretty_assertions::assert_eq;

    fn registry(sources: &[(&str, &str)]) -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        for (path, source) in sources {
            registry
                .load_source(Path::new(path), source)
                .expect("load source");
        }
        registry
    }

    fn method_names(class: &TargetClass) -> Vec<&str> {
        class.methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = registry(&[("a.php", "<?php namespace App; class Mailer {} trait T {}")]);
        assert!(registry.contains("App\\Mailer"));
        assert!(registry.contains("\\app\\mailer"));
        assert!(!registry.contains("App\\T"));
        assert!(registry.get("App\\T").is_some());
        assert_eq!(registry.files(), &[PathBuf::from("a.php")]);
    }

    #[test]
    fn test_redeclaration_keeps_first() {
        let registry = registry(&[
            ("a.php", "<?php class Foo { public function first() {} }"),
            ("b.php", "<?php class Foo { public function second() {} }"),
        ]);
        let foo = registry.reflect("Foo").expect("reflect");
        assert_eq!(method_names(&foo), vec!["first"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_load_source_returns_only_added_classes() {
        let mut registry = ClassRegistry::new();
        let first = registry
            .load_source(Path::new("a.php"), "<?php class Foo {} trait Helper {}")
            .expect("load");
        assert_eq!(first, vec!["Foo"]);

        let second = registry
            .load_source(Path::new("b.php"), "<?php class FOO {} interface Bar {}")
            .expect("load");
        assert_eq!(second, vec!["Bar"]);
    }

    #[test]
    fn test_reflect_unknown_class() {
        let registry = registry(&[("a.php", "<?php class Foo {}"), ("b.php", "<?php")]);
        let err = registry.reflect("Missing").unwrap_err();
        assert_eq!(err.to_string(), "Class Missing not found in files a.php,b.php");
    }

    #[test]
    fn test_method_order_follows_inheritance() {
        let registry = registry(&[(
            "a.php",
            "<?php
interface Countable { public function count(); }
interface Named { public function name(); }
trait Greets { public function greet() {} public function name() {} }
class Base implements Countable {
    public function base() {}
    public function count() {}
}
class Child extends Base implements Named {
    use Greets;
    public function own() {}
    public function BASE() {}
}
",
        )]);
        let child = registry.reflect("Child").expect("reflect");
        assert_eq!(method_names(&child), vec!["own", "BASE", "greet", "name", "count"]);
        assert_eq!(child.methods[2].declaring_class, "Greets");
        assert_eq!(child.methods[4].declaring_class, "Base");
    }

    #[test]
    fn test_kinds_and_roles() {
        let registry = registry(&[(
            "a.php",
            "<?php
abstract class Base { public function __GET($name) {} }
interface Contract {}
",
        )]);
        let base = registry.reflect("Base").expect("reflect");
        assert_eq!(base.kind, ClassKind::AbstractClass);
        assert_eq!(base.methods[0].role, MethodRole::Get);
        assert_eq!(registry.reflect("Contract").expect("reflect").kind, ClassKind::Interface);
    }

    #[test]
    fn test_parameter_descriptors() {
        let registry = registry(&[(
            "a.php",
            "<?php
class Foo {
    private function run(Bar $a = null, ?int $b = 5, $c = null, array $d = [], $e = PHP_EOL) {}
}
",
        )]);
        let foo = registry.reflect("Foo").expect("reflect");
        let method = &foo.methods[0];
        assert_eq!(method.visibility(), Visibility::Private);

        let params = &method.parameters;
        assert!(params[0].allows_null);
        assert_eq!(params[0].type_hint, Some(TypeHint::Class("Bar".into())));
        assert!(params[1].allows_null);
        assert_eq!(params[1].default, Some(DefaultValue::Value(PhpValue::Int(5))));
        assert!(!params[2].allows_null);
        assert_eq!(params[2].default, Some(DefaultValue::Value(PhpValue::Null)));
        assert_eq!(params[3].default, Some(DefaultValue::Value(PhpValue::Array(vec![]))));
        assert_eq!(
            params[4].default,
            Some(DefaultValue::Value(PhpValue::String("\n".into())))
        );
        let positions: Vec<_> = params.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_constant_defaults_resolve_through_hierarchy() {
        let registry = registry(&[(
            "a.php",
            "<?php
namespace App;

const LIMIT = 10;
define('App\\MODE', 'fast');

interface HasLevel { const LEVEL = -3; }
class Base implements HasLevel { const NAME = 'base'; }
class Child extends Base {
    public function run($a = self::NAME, $b = self::LEVEL, $c = LIMIT, $d = MODE, $e = __CLASS__) {}
}
",
        )]);
        let child = registry.reflect("App\\Child").expect("reflect");
        let defaults: Vec<_> = child.methods[0]
            .parameters
            .iter()
            .map(|p| p.default.clone())
            .collect();
        assert_eq!(
            defaults,
            vec![
                Some(DefaultValue::Value(PhpValue::String("base".into()))),
                Some(DefaultValue::Value(PhpValue::Int(-3))),
                Some(DefaultValue::Value(PhpValue::Int(10))),
                Some(DefaultValue::Value(PhpValue::String("fast".into()))),
                Some(DefaultValue::Value(PhpValue::String("App\\Child".into()))),
            ]
        );
    }

    #[test]
    fn test_unreadable_defaults() {
        let registry = registry(&[(
            "a.php",
            "<?php
class Foo {
    const LOOP = self::LOOP;
    public function run($a = UNKNOWN_CONSTANT, $b = self::LOOP, $c = Missing::X) {}
}
",
        )]);
        let foo = registry.reflect("Foo").expect("reflect");
        let params = &foo.methods[0].parameters;
        assert_eq!(params[0].default, Some(DefaultValue::Unreadable("UNKNOWN_CONSTANT".into())));
        assert_eq!(params[1].default, Some(DefaultValue::Unreadable("self::LOOP".into())));
        assert_eq!(params[2].default, Some(DefaultValue::Unreadable("Missing::X".into())));
    }

    #[test]
    fn test_array_evaluation() {
        let registry = ClassRegistry::new();
        let array = |items: Vec<(Option<Expr>, Expr)>| {
            Expr::Array(
                items
                    .into_iter()
                    .map(|(key, value)| ArrayItem { key, value })
                    .collect(),
            )
        };
        let expr = array(vec![
            (None, Expr::Int(1)),
            (Some(Expr::Str("5".into())), Expr::Int(2)),
            (None, Expr::Int(3)),
            (Some(Expr::Int(0)), Expr::Str("first".into())),
            (Some(Expr::Str("05".into())), Expr::Bool(true)),
        ]);
        assert_eq!(
            registry.evaluate(&expr, 0),
            Some(PhpValue::Array(vec![
                (ArrayKey::Int(0), PhpValue::String("first".into())),
                (ArrayKey::Int(5), PhpValue::Int(2)),
                (ArrayKey::Int(6), PhpValue::Int(3)),
                (ArrayKey::String("05".into()), PhpValue::Bool(true)),
            ]))
        );
    }

    #[test]
    fn test_unary_operators() {
        let registry = ClassRegistry::new();
        let negate = |e: Expr| Expr::Negate(Box::new(e));
        assert_eq!(registry.evaluate(&negate(Expr::Int(4)), 0), Some(PhpValue::Int(-4)));
        assert_eq!(registry.evaluate(&negate(Expr::Float(1.5)), 0), Some(PhpValue::Float(-1.5)));
        assert_eq!(
            registry.evaluate(&Expr::Plus(Box::new(Expr::Bool(true))), 0),
            Some(PhpValue::Int(1))
        );
        assert_eq!(registry.evaluate(&negate(Expr::Str("abc".into())), 0), None);
    }
}
