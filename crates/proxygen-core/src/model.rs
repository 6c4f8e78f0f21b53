//! Reflected class model.
//!
//! These types are plain data built once per requested class by
//! [`ClassRegistry::reflect`](crate::registry::ClassRegistry::reflect). Code
//! generation only ever sees this model, never the parsed source.

use serde::Serialize;

use crate::value::PhpValue;

/// A class or interface selected for proxy generation.
#[derive(Debug, Clone, Serialize)]
pub struct TargetClass {
    pub name: String,
    pub kind: ClassKind,
    pub methods: Vec<MethodDescriptor>,
}

/// Declaration keyword of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    AbstractClass,
    Interface,
}

impl ClassKind {
    /// Keyword(s) that open the generated declaration.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::AbstractClass => "abstract class",
            Self::Interface => "interface",
        }
    }
}

/// Method visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

impl Visibility {
    /// Fixed precedence used by [`Visibility::resolve`].
    pub const PRECEDENCE: [Visibility; 3] =
        [Visibility::Public, Visibility::Private, Visibility::Protected];

    /// Parse a lowercase label such as `"protected"`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "protected" => Some(Self::Protected),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
        }
    }

    /// Compute the single visibility of a method from its flags.
    ///
    /// Flags are checked in [`Visibility::PRECEDENCE`] order and the last
    /// set flag wins. A method without any flag is public.
    pub fn resolve(flags: VisibilityFlags) -> Self {
        Self::PRECEDENCE
            .iter()
            .copied()
            .filter(|v| flags.is_set(*v))
            .last()
            .unwrap_or(Self::Public)
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw visibility modifiers as declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityFlags {
    pub public: bool,
    pub private: bool,
    pub protected: bool,
}

impl VisibilityFlags {
    pub fn is_set(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => self.public,
            Visibility::Private => self.private,
            Visibility::Protected => self.protected,
        }
    }

    pub fn set(&mut self, visibility: Visibility) {
        match visibility {
            Visibility::Public => self.public = true,
            Visibility::Private => self.private = true,
            Visibility::Protected => self.protected = true,
        }
    }
}

/// Special role a method plays when a proxy delegates to its inner member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodRole {
    /// `__call($name, $arguments)`
    Call,
    /// `__get($name)`
    Get,
    /// `__set($name, $value)`
    Set,
    /// `__isset($name)`
    Isset,
    /// `__unset($name)`
    Unset,
    Ordinary,
}

impl MethodRole {
    /// Classify a method by name. PHP method names are case-insensitive.
    pub fn classify(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "__call" => Self::Call,
            "__get" => Self::Get,
            "__set" => Self::Set,
            "__isset" => Self::Isset,
            "__unset" => Self::Unset,
            _ => Self::Ordinary,
        }
    }
}

/// One method of a [`TargetClass`].
#[derive(Debug, Clone, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub flags: VisibilityFlags,
    pub is_static: bool,
    pub returns_reference: bool,
    pub parameters: Vec<ParameterDescriptor>,
    pub role: MethodRole,
    /// Class, interface or trait the method was declared in.
    pub declaring_class: String,
}

impl MethodDescriptor {
    pub fn visibility(&self) -> Visibility {
        Visibility::resolve(self.flags)
    }

    pub fn first_parameter(&self) -> Option<&ParameterDescriptor> {
        self.parameters.first()
    }

    pub fn last_parameter(&self) -> Option<&ParameterDescriptor> {
        self.parameters.last()
    }
}

/// A parameter type constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum TypeHint {
    /// Class or interface, fully qualified without a leading backslash.
    Class(String),
    /// The generic `array` type.
    Array,
    /// A builtin keyword type such as `int` or `callable`.
    Builtin(String),
    /// Union, intersection or DNF type, class names already resolved.
    Compound(String),
}

impl TypeHint {
    /// Source form of the hint.
    pub fn render(&self) -> &str {
        match self {
            Self::Class(name) | Self::Builtin(name) | Self::Compound(name) => name,
            Self::Array => "array",
        }
    }
}

/// A declared default value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    Value(PhpValue),
    /// The expression could not be evaluated statically; holds its source.
    Unreadable(String),
}

/// One parameter of a [`MethodDescriptor`].
#[derive(Debug, Clone, Serialize)]
pub struct ParameterDescriptor {
    /// Name without the leading `$`.
    pub name: String,
    pub type_hint: Option<TypeHint>,
    pub by_reference: bool,
    pub allows_null: bool,
    pub variadic: bool,
    pub default: Option<DefaultValue>,
    pub position: usize,
}

impl ParameterDescriptor {
    /// Create a plain untyped, required parameter.
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            by_reference: false,
            allows_null: false,
            variadic: false,
            default: None,
            position,
        }
    }

    /// `$name` as it appears in source.
    pub fn variable(&self) -> String {
        format!("${}", self.name)
    }
}
