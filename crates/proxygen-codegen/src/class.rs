//! Proxy class emission.

use std::io::Write;

use proxygen_core::{MethodDescriptor, TargetClass};
use serde::Serialize;
use tracing::debug;

use crate::body::emit_body;
use crate::config::GenerationConfig;
use crate::error::CodegenResult;
use crate::filter::select_methods;
use crate::signature::reconstruct;

pub const BEGIN_MARKER: &str = "/**\n* BEGIN AUTOGENERATED CODE\n*/\n";
pub const END_MARKER: &str = "/**\n* END AUTOGENERATED CODE\n*/\n";

const MEMBER_INDENT: &str = "    ";
const BODY_INDENT: &str = "        ";

/// PHP source of one proxy class.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedProxy {
    pub class_name: String,
    pub content: String,
    pub method_count: usize,
}

/// Generate the proxy source for a reflected class.
pub fn generate_proxy(class: &TargetClass, config: &GenerationConfig) -> CodegenResult<GeneratedProxy> {
    let methods = select_methods(class, config);

    let mut content = String::from(BEGIN_MARKER);
    content.push_str(class.kind.keyword());
    content.push(' ');
    content.push_str(&class.name);
    content.push_str("\n{\n");

    for method in &methods {
        content.push_str(&emit_method(class, method, config)?);
    }

    content.push_str("}\n");
    content.push_str(END_MARKER);

    debug!(class = %class.name, methods = methods.len(), "Generated proxy");
    Ok(GeneratedProxy {
        class_name: class.name.clone(),
        content,
        method_count: methods.len(),
    })
}

fn emit_method(class: &TargetClass, method: &MethodDescriptor, config: &GenerationConfig) -> CodegenResult<String> {
    let signature = reconstruct(method);
    let body = emit_body(class, method, &signature, config)?;

    let mut out = String::new();
    out.push_str(MEMBER_INDENT);
    out.push_str(method.visibility().label());
    out.push(' ');
    if method.is_static {
        out.push_str("static ");
    }
    out.push_str("function ");
    if method.returns_reference {
        out.push('&');
    }
    out.push_str(&format!("{}({})\n{MEMBER_INDENT}{{\n", method.name, signature.declaration()));
    for line in &body {
        out.push_str(&format!("{BODY_INDENT}{line}\n"));
    }
    out.push_str(&format!("{MEMBER_INDENT}}}\n\n"));
    Ok(out)
}

/// Write generated proxies in order.
pub fn write_proxies<W: Write>(out: &mut W, proxies: &[GeneratedProxy]) -> CodegenResult<()> {
    for proxy in proxies {
        out.write_all(proxy.content.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}
