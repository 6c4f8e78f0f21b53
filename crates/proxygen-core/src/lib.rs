//! Core of proxygen: the reflected class model and the static PHP loader
//! that builds it.
//!
//! Sources are parsed with tree-sitter; nothing is ever executed. The
//! [`ClassLoader`] reads user files and extension stubs into a
//! [`ClassRegistry`], which reflects requested classes into [`TargetClass`]
//! values for code generation.

pub mod error;
pub mod loader;
pub mod model;
pub mod php;
pub mod registry;
pub mod stubs;
pub mod value;

pub use error::{CoreError, CoreResult};
pub use loader::{split_list, ClassLoader, EXTENSION_PREFIX};
pub use model::{
    ClassKind, DefaultValue, MethodDescriptor, MethodRole, ParameterDescriptor, TargetClass,
    TypeHint, Visibility, VisibilityFlags,
};
pub use registry::ClassRegistry;
pub use stubs::StubCatalog;
pub use value::{ArrayKey, PhpValue};
