//! PHP source parsing.
//!
//! Source files are parsed with tree-sitter-php into declaration records.
//! Names in these records are already fully qualified; default values are
//! kept as parsed constant expressions and only evaluated on reflection.

pub mod builtins;
pub mod literal;
pub mod names;
mod parser;

use std::path::PathBuf;

use crate::model::{TypeHint, VisibilityFlags};
use literal::Expr;

pub use parser::parse_source;

/// Declarations found in one source file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub path: PathBuf,
    pub classes: Vec<ClassDecl>,
    /// Global constants from `const` statements and `define()` calls.
    pub constants: Vec<ConstDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class { is_abstract: bool },
    Interface,
    Trait,
}

/// A class, interface or trait declaration.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub kind: DeclKind,
    pub parent: Option<String>,
    /// Implemented interfaces, or extended interfaces for an interface.
    pub interfaces: Vec<String>,
    pub traits: Vec<String>,
    pub constants: Vec<ConstDecl>,
    pub methods: Vec<MethodDecl>,
    pub source: PathBuf,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub flags: VisibilityFlags,
    pub is_static: bool,
    pub returns_reference: bool,
    pub parameters: Vec<ParamDecl>,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub type_hint: Option<TypeHint>,
    /// `?T`, a union with `null`, `mixed` or `null`.
    pub nullable_type: bool,
    pub by_reference: bool,
    pub variadic: bool,
    pub default: Option<ConstExpr>,
}

/// A named constant.
#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub name: String,
    pub value: ConstExpr,
}

/// A constant expression as written, with its parsed form when the
/// expression is statically readable.
#[derive(Debug, Clone)]
pub struct ConstExpr {
    pub source: String,
    pub expr: Option<Expr>,
}
