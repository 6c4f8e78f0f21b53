//! Parameter list reconstruction.

use proxygen_core::{DefaultValue, MethodDescriptor, ParameterDescriptor};

/// Declaration and call-side parameter lists of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub parameters: Vec<String>,
    pub call_arguments: Vec<String>,
}

impl Signature {
    /// Parameter list as it appears between the parentheses of the declaration.
    pub fn declaration(&self) -> String {
        self.parameters.join(", ")
    }

    /// Argument list forwarding every parameter in order.
    pub fn call(&self) -> String {
        self.call_arguments.join(", ")
    }
}

pub fn reconstruct(method: &MethodDescriptor) -> Signature {
    Signature {
        parameters: method.parameters.iter().map(render_parameter).collect(),
        call_arguments: method.parameters.iter().map(call_argument).collect(),
    }
}

/// `[Type ][&][...]$name[ = default]`
pub fn render_parameter(param: &ParameterDescriptor) -> String {
    let mut out = String::new();
    if let Some(hint) = &param.type_hint {
        out.push_str(hint.render());
        out.push(' ');
    }
    if param.by_reference {
        out.push('&');
    }
    if param.variadic {
        out.push_str("...");
    }
    out.push_str(&param.variable());
    if let Some(default) = render_default(param) {
        out.push_str(" = ");
        out.push_str(&default);
    }
    out
}

fn render_default(param: &ParameterDescriptor) -> Option<String> {
    if param.variadic {
        return None;
    }
    if param.allows_null {
        return Some("null".to_string());
    }
    Some(match param.default.as_ref()? {
        DefaultValue::Unreadable(_) => "NULL".to_string(),
        DefaultValue::Value(value) if value.is_empty_array() => "array()".to_string(),
        DefaultValue::Value(value) => value.export(),
    })
}

fn call_argument(param: &ParameterDescriptor) -> String {
    if param.variadic {
        format!("...{}", param.variable())
    } else {
        param.variable()
    }
}
