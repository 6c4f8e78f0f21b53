//! tree-sitter walk that turns a PHP file into declaration records.

use std::path::Path;

use tracing::{debug, warn};
use tree_sitter::{Node, Parser, Tree};

use super::literal::{self, ArrayItem, Expr};
use super::names::{is_builtin_type, NameContext};
use super::{ClassDecl, ConstDecl, ConstExpr, DeclKind, MethodDecl, ParamDecl, SourceFile};
use crate::error::{CoreError, CoreResult};
use crate::model::{TypeHint, Visibility, VisibilityFlags};

/// Parse PHP source text into declarations.
///
/// Syntax errors do not abort loading: tree-sitter recovers and whatever
/// declarations survive are returned, with a warning naming the first
/// error line.
pub fn parse_source(path: &Path, source: &str) -> CoreResult<SourceFile> {
    let tree = parse_tree(source)?;
    let root = tree.root_node();

    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        warn!(file = %path.display(), line, "PHP syntax error, using recovered declarations");
    }

    let mut walker = Walker {
        source: source.as_bytes(),
        path,
        ctx: NameContext::default(),
        file: SourceFile {
            path: path.to_path_buf(),
            ..Default::default()
        },
    };
    walker.walk(root);

    debug!(
        file = %path.display(),
        classes = walker.file.classes.len(),
        constants = walker.file.constants.len(),
        "Parsed PHP source"
    );
    Ok(walker.file)
}

fn parse_tree(source: &str) -> CoreResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
        .map_err(|e| CoreError::Grammar(e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| CoreError::Grammar("parser produced no syntax tree".to_string()))
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    children(node)
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error_line)
}

fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// The class a member is declared in, for `self`, `static` and `parent`.
struct ClassScope {
    name: String,
    parent: Option<String>,
}

struct Walker<'s> {
    source: &'s [u8],
    path: &'s Path,
    ctx: NameContext,
    file: SourceFile,
}

impl Walker<'_> {
    fn text(&self, node: Node) -> String {
        node.utf8_text(self.source).unwrap_or("").to_string()
    }

    fn walk(&mut self, node: Node) {
        match node.kind() {
            "namespace_definition" => self.namespace(node),
            "namespace_use_declaration" => {
                let text = self.text(node);
                self.ctx.add_use_declaration(&text);
            }
            "class_declaration" | "interface_declaration" | "trait_declaration" => {
                if let Some(class) = self.class_like(node) {
                    self.file.classes.push(class);
                }
            }
            "const_declaration" => {
                let constants = self.constants(node, None);
                self.file.constants.extend(constants);
            }
            "function_call_expression" => {
                if let Some(constant) = self.define(node) {
                    self.file.constants.push(constant);
                }
            }
            "function_definition" | "enum_declaration" => {}
            _ => self.walk_children(node),
        }
    }

    fn walk_children(&mut self, node: Node) {
        for child in children(node) {
            self.walk(child);
        }
    }

    fn namespace(&mut self, node: Node) {
        let parts = children(node);
        let name = node
            .child_by_field_name("name")
            .or_else(|| parts.iter().copied().find(|c| c.kind() == "namespace_name"))
            .map(|n| self.text(n))
            .unwrap_or_default();
        let body = node
            .child_by_field_name("body")
            .or_else(|| parts.iter().copied().find(|c| c.kind() == "compound_statement"));

        match body {
            Some(body) => {
                let outer = std::mem::replace(&mut self.ctx, NameContext::new(name));
                self.walk_children(body);
                self.ctx = outer;
            }
            None => self.ctx = NameContext::new(name),
        }
    }

    fn class_like(&mut self, node: Node) -> Option<ClassDecl> {
        let name = self.text(node.child_by_field_name("name")?);
        let fq_name = self.ctx.qualify_declaration(&name);

        let mut kind = match node.kind() {
            "interface_declaration" => DeclKind::Interface,
            "trait_declaration" => DeclKind::Trait,
            _ => DeclKind::Class { is_abstract: false },
        };
        let mut parent = None;
        let mut interfaces = Vec::new();
        let mut body = node.child_by_field_name("body");

        for child in children(node) {
            match child.kind() {
                "abstract_modifier" | "abstract" => {
                    if let DeclKind::Class { .. } = kind {
                        kind = DeclKind::Class { is_abstract: true };
                    }
                }
                "base_clause" => {
                    let names = self.clause_names(child);
                    if kind == DeclKind::Interface {
                        interfaces.extend(names);
                    } else {
                        parent = names.into_iter().next();
                    }
                }
                "class_interface_clause" => interfaces.extend(self.clause_names(child)),
                "declaration_list" if body.is_none() => body = Some(child),
                _ => {}
            }
        }

        let scope = ClassScope {
            name: fq_name.clone(),
            parent: parent.clone(),
        };
        let mut class = ClassDecl {
            name: fq_name,
            kind,
            parent,
            interfaces,
            traits: Vec::new(),
            constants: Vec::new(),
            methods: Vec::new(),
            source: self.path.to_path_buf(),
            line: node.start_position().row + 1,
        };

        for member in body.map(children).unwrap_or_default() {
            match member.kind() {
                "method_declaration" => {
                    if let Some(method) = self.method(member, &scope) {
                        class.methods.push(method);
                    }
                }
                "const_declaration" => {
                    let constants = self.constants(member, Some(&scope));
                    class.constants.extend(constants);
                }
                "use_declaration" => {
                    let traits = self.trait_uses(member);
                    class.traits.extend(traits);
                }
                _ => {}
            }
        }

        debug!(
            class = %class.name,
            kind = ?class.kind,
            methods = class.methods.len(),
            "Found class declaration"
        );
        Some(class)
    }

    /// Names listed in an `extends` or `implements` clause.
    fn clause_names(&self, node: Node) -> Vec<String> {
        let text = self.text(node);
        let list = text
            .trim()
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest)
            .unwrap_or("");
        list.split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| self.ctx.resolve_class(n))
            .collect()
    }

    /// Traits imported by a `use A, B;` or `use A { ... }` member.
    fn trait_uses(&self, node: Node) -> Vec<String> {
        let text = self.text(node);
        let list = text.trim().get(3..).unwrap_or("");
        let list = list.split(['{', ';']).next().unwrap_or("");
        list.split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| self.ctx.resolve_class(n))
            .collect()
    }

    fn method(&self, node: Node, scope: &ClassScope) -> Option<MethodDecl> {
        let name_node = node.child_by_field_name("name")?;
        let mut method = MethodDecl {
            name: self.text(name_node),
            flags: VisibilityFlags::default(),
            is_static: false,
            returns_reference: false,
            parameters: Vec::new(),
        };

        for child in children(node) {
            let before_name = child.start_byte() < name_node.start_byte();
            match child.kind() {
                "visibility_modifier" => {
                    if let Some(visibility) = Visibility::from_label(&self.text(child)) {
                        method.flags.set(visibility);
                    }
                }
                "static_modifier" | "static" if before_name => method.is_static = true,
                "reference_modifier" | "&" if before_name => method.returns_reference = true,
                "formal_parameters" => method.parameters = self.parameters(child, scope),
                _ => {}
            }
        }

        Some(method)
    }

    fn parameters(&self, node: Node, scope: &ClassScope) -> Vec<ParamDecl> {
        children(node)
            .into_iter()
            .filter(|c| c.is_named() && c.kind().ends_with("parameter"))
            .filter_map(|c| self.parameter(c, scope))
            .collect()
    }

    /// Walk a parameter's children positionally:
    /// `[attributes] [modifiers] [type] [&] [...] $name [= default]`.
    fn parameter(&self, node: Node, scope: &ClassScope) -> Option<ParamDecl> {
        let mut name: Option<String> = None;
        let mut type_text: Option<String> = None;
        let mut by_reference = false;
        let mut variadic = node.kind() == "variadic_parameter";
        let mut default_text: Option<String> = None;
        let mut after_equals = false;

        for child in children(node) {
            match child.kind() {
                "variable_name" => name = Some(self.text(child)),
                "by_ref" => {
                    by_reference = true;
                    name = children(child)
                        .into_iter()
                        .find(|c| c.kind() == "variable_name")
                        .map(|c| self.text(c));
                }
                "reference_modifier" | "&" if name.is_none() => by_reference = true,
                "..." => variadic = true,
                "=" => after_equals = true,
                "attribute_list" | "comment" => {}
                kind if kind.ends_with("_modifier") => {}
                _ if !child.is_named() => {}
                _ if after_equals => {
                    if default_text.is_none() {
                        default_text = Some(self.text(child));
                    }
                }
                _ if name.is_none() && type_text.is_none() => type_text = Some(self.text(child)),
                _ => {}
            }
        }

        let name = name?.trim_start_matches('$').to_string();
        let (type_hint, nullable_type) = match type_text {
            Some(text) => {
                let (hint, nullable) = self.parse_type(&text, scope);
                (Some(hint), nullable)
            }
            None => (None, false),
        };
        let default = default_text
            .filter(|_| !variadic)
            .map(|text| self.const_expr(text.trim(), Some(scope)));

        Some(ParamDecl {
            name,
            type_hint,
            nullable_type,
            by_reference,
            variadic,
            default,
        })
    }

    /// Interpret a type declaration. Returns the hint and whether the type
    /// itself admits null.
    fn parse_type(&self, text: &str, scope: &ClassScope) -> (TypeHint, bool) {
        let compact: String = text.split_whitespace().collect();

        if let Some(inner) = compact.strip_prefix('?') {
            let (hint, _) = self.type_atom(inner, scope);
            return (hint, true);
        }

        if !compact.contains(['|', '&', '(']) {
            return self.type_atom(&compact, scope);
        }

        let mut rendered = String::new();
        let mut nullable = false;
        let mut atom = String::new();
        for c in compact.chars().chain(std::iter::once('|')) {
            if matches!(c, '|' | '&' | '(' | ')') {
                if !atom.is_empty() {
                    let (hint, atom_nullable) = self.type_atom(&atom, scope);
                    nullable |= atom_nullable;
                    rendered.push_str(hint.render());
                    atom.clear();
                }
                rendered.push(c);
            } else {
                atom.push(c);
            }
        }
        rendered.pop();
        (TypeHint::Compound(rendered), nullable)
    }

    fn type_atom(&self, atom: &str, scope: &ClassScope) -> (TypeHint, bool) {
        let lower = atom.to_ascii_lowercase();
        match lower.as_str() {
            "array" => (TypeHint::Array, false),
            "mixed" | "null" => (TypeHint::Builtin(lower), true),
            "self" => (TypeHint::Class(scope.name.clone()), false),
            "parent" => match &scope.parent {
                Some(parent) => (TypeHint::Class(parent.clone()), false),
                None => (TypeHint::Builtin(lower), false),
            },
            _ if is_builtin_type(&lower) => (TypeHint::Builtin(lower), false),
            _ => (TypeHint::Class(self.ctx.resolve_class(atom)), false),
        }
    }

    /// Constants declared by a `const` statement, in a class or at top level.
    fn constants(&self, node: Node, scope: Option<&ClassScope>) -> Vec<ConstDecl> {
        let mut elements: Vec<String> = children(node)
            .into_iter()
            .filter(|c| c.kind() == "const_element")
            .map(|c| self.text(c))
            .collect();

        if elements.is_empty() {
            let text = self.text(node);
            let text = text.trim().trim_end_matches(';');
            let lower = text.to_ascii_lowercase();
            if let Some(idx) = lower.find("const ") {
                elements = literal::split_top_level(&text[idx + 6..], ',')
                    .into_iter()
                    .map(str::to_string)
                    .collect();
            }
        }

        elements
            .iter()
            .filter_map(|element| {
                let (lhs, rhs) = element.split_once('=')?;
                let name = lhs.split_whitespace().last()?;
                let name = match scope {
                    Some(_) => name.to_string(),
                    None => self.ctx.qualify_declaration(name),
                };
                Some(ConstDecl {
                    name,
                    value: self.const_expr(rhs.trim(), scope),
                })
            })
            .collect()
    }

    /// A `define('NAME', value)` call.
    fn define(&self, node: Node) -> Option<ConstDecl> {
        let text = self.text(node);
        let open = text.find('(')?;
        if !text[..open].trim().trim_start_matches('\\').eq_ignore_ascii_case("define") {
            return None;
        }
        let args = text[open + 1..].trim_end().strip_suffix(')')?;
        let parts = literal::split_top_level(args, ',');
        if parts.len() < 2 {
            return None;
        }
        let Some(Expr::Str(name)) = literal::parse_expr(parts[0].trim()) else {
            return None;
        };
        Some(ConstDecl {
            name: name.trim_start_matches('\\').to_string(),
            value: self.const_expr(parts[1].trim(), None),
        })
    }

    fn const_expr(&self, source: &str, scope: Option<&ClassScope>) -> ConstExpr {
        ConstExpr {
            source: source.to_string(),
            expr: literal::parse_expr(source).and_then(|e| self.resolve_expr(e, scope)),
        }
    }

    /// Rewrite names in a constant expression to fully-qualified form.
    /// References to `self` outside a class cannot be resolved.
    fn resolve_expr(&self, expr: Expr, scope: Option<&ClassScope>) -> Option<Expr> {
        Some(match expr {
            Expr::ClassConstant { class, name } => Expr::ClassConstant {
                class: self.resolve_scoped_class(&class, scope)?,
                name,
            },
            Expr::ClassName(class) => Expr::Str(self.resolve_scoped_class(&class, scope)?),
            Expr::MagicClass => Expr::Str(scope?.name.clone()),
            Expr::Constant(names) => {
                let name = names.first()?;
                Expr::Constant(self.ctx.constant_candidates(name))
            }
            Expr::Array(items) => Expr::Array(
                items
                    .into_iter()
                    .map(|item| {
                        Some(ArrayItem {
                            key: match item.key {
                                Some(key) => Some(self.resolve_expr(key, scope)?),
                                None => None,
                            },
                            value: self.resolve_expr(item.value, scope)?,
                        })
                    })
                    .collect::<Option<Vec<_>>>()?,
            ),
            Expr::Negate(inner) => Expr::Negate(Box::new(self.resolve_expr(*inner, scope)?)),
            Expr::Plus(inner) => Expr::Plus(Box::new(self.resolve_expr(*inner, scope)?)),
            other => other,
        })
    }

    fn resolve_scoped_class(&self, class: &str, scope: Option<&ClassScope>) -> Option<String> {
        match class.to_ascii_lowercase().as_str() {
            "self" | "static" => Some(scope?.name.clone()),
            "parent" => scope?.parent.clone(),
            _ => Some(self.ctx.resolve_class(class)),
        }
    }
}
