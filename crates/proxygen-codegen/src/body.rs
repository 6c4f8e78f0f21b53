//! Method body emission.

use proxygen_core::{MethodDescriptor, MethodRole, ParameterDescriptor, TargetClass};

use crate::config::GenerationConfig;
use crate::error::{CodegenError, CodegenResult};
use crate::signature::Signature;

/// Delegating statement for a method.
enum Delegation {
    /// An expression whose value the proxy returns.
    Returning(String),
    /// A statement with no value.
    Statement(String),
}

/// Body statements of a proxied method, without indentation.
pub fn emit_body(
    class: &TargetClass,
    method: &MethodDescriptor,
    signature: &Signature,
    config: &GenerationConfig,
) -> CodegenResult<Vec<String>> {
    let mut lines = Vec::new();

    if let Some(hook) = &config.method_before {
        lines.push(hook_call(hook));
    }

    let delegation = match &config.inner_property {
        Some(inner) => Some(delegate(class, method, signature, inner)?),
        None => None,
    };
    let after = config.method_after.as_deref().map(hook_call);

    match (delegation, after) {
        (Some(Delegation::Returning(expr)), Some(after)) => {
            let result = result_variable(method);
            let bind = if method.returns_reference && method.role == MethodRole::Ordinary {
                "&"
            } else {
                ""
            };
            lines.push(format!("{result} = {bind}{expr};"));
            lines.push(after);
            lines.push(format!("return {result};"));
        }
        (Some(Delegation::Returning(expr)), None) => lines.push(format!("return {expr};")),
        (Some(Delegation::Statement(statement)), after) => {
            lines.push(statement);
            lines.extend(after);
        }
        (None, after) => lines.extend(after),
    }

    Ok(lines)
}

fn hook_call(hook: &str) -> String {
    format!("$this->{hook}(__FUNCTION__, func_get_args());")
}

fn delegate(
    class: &TargetClass,
    method: &MethodDescriptor,
    signature: &Signature,
    inner: &str,
) -> CodegenResult<Delegation> {
    let first = || required(class, method, method.first_parameter());
    let last = || required(class, method, method.last_parameter());

    Ok(match method.role {
        MethodRole::Call => Delegation::Returning(format!(
            "call_user_func_array(array($this->{inner}, {}), {})",
            first()?.variable(),
            last()?.variable()
        )),
        MethodRole::Get => Delegation::Returning(format!("$this->{inner}->{}", first()?.variable())),
        MethodRole::Isset => {
            Delegation::Returning(format!("isset($this->{inner}->{})", first()?.variable()))
        }
        MethodRole::Unset => {
            Delegation::Statement(format!("unset($this->{inner}->{});", first()?.variable()))
        }
        MethodRole::Set => Delegation::Returning(format!(
            "$this->{inner}->{} = {}",
            first()?.variable(),
            last()?.variable()
        )),
        MethodRole::Ordinary => Delegation::Returning(format!(
            "$this->{inner}->{}({})",
            method.name,
            signature.call()
        )),
    })
}

fn required<'a>(
    class: &TargetClass,
    method: &MethodDescriptor,
    param: Option<&'a ParameterDescriptor>,
) -> CodegenResult<&'a ParameterDescriptor> {
    param.ok_or_else(|| CodegenError::missing_parameter(&class.name, &method.name))
}

/// `$result`, suffixed until it does not shadow a parameter.
fn result_variable(method: &MethodDescriptor) -> String {
    let mut name = "result".to_string();
    while method.parameters.iter().any(|p| p.name == name) {
        name.push('_');
    }
    format!("${name}")
}
