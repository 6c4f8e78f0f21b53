//! # proxygen codegen
//!
//! Turns reflected PHP classes into proxy class source.
//!
//! Each selected method is re-declared with the same visibility, static and
//! by-reference flags and parameter list, and its body optionally calls
//! before/after hooks and delegates to an inner object.

pub mod body;
pub mod class;
pub mod config;
pub mod error;
pub mod filter;
pub mod signature;

pub use body::emit_body;
pub use class::{generate_proxy, write_proxies, GeneratedProxy, BEGIN_MARKER, END_MARKER};
pub use config::GenerationConfig;
pub use error::{CodegenError, CodegenResult};
pub use filter::select_methods;
pub use signature::{reconstruct, render_parameter, Signature};
