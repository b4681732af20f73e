//! Step-function filter.
//!
//! Most declarations in a unit are not step functions; rejections are
//! expected and only traced on the debug channel.

use log::debug;

use crate::analyzers::MethodDecl;

/// Package alias qualifying the framework's result marker type.
pub const RESULT_PACKAGE_ALIAS: &str = "smachine";
/// Right-hand identifier of the framework's result marker type.
pub const RESULT_MARKER: &str = "StateUpdate";
/// Fragment identifying a context-like parameter type.
pub const CONTEXT_TYPE_FRAGMENT: &str = "Context";

/// Whether any parameter's declared type text looks context-like.
pub fn takes_context(parameters: &[(String, String)]) -> bool {
    parameters
        .iter()
        .any(|(_, ty)| ty.contains(CONTEXT_TYPE_FRAGMENT))
}

/// Name of the context-like parameter, when present.
pub fn context_param_name(parameters: &[(String, String)]) -> Option<&str> {
    parameters
        .iter()
        .find(|(_, ty)| ty.contains(CONTEXT_TYPE_FRAGMENT))
        .map(|(name, _)| name.as_str())
}

/// Decide whether a declaration is a step function. All conditions are
/// required: a named receiver, a context-like parameter, at least one
/// declared result, and a first result of `smachine.StateUpdate`.
pub fn is_step_function(decl: &MethodDecl) -> bool {
    if decl.receiver.is_none() {
        debug!("skip {}: no receiver", decl.name);
        return false;
    }
    if !takes_context(&decl.parameters) {
        debug!("skip {}: no context parameter", decl.name);
        return false;
    }
    if !decl.has_results {
        debug!("skip {}: no result declared", decl.name);
        return false;
    }
    match &decl.first_result {
        Some((package, marker))
            if package == RESULT_PACKAGE_ALIAS && marker == RESULT_MARKER =>
        {
            true
        }
        Some((package, marker)) => {
            debug!(
                "skip {}: result type {}.{} is not {}.{}",
                decl.name, package, marker, RESULT_PACKAGE_ALIAS, RESULT_MARKER
            );
            false
        }
        None => {
            debug!("skip {}: result type is not a dotted reference", decl.name);
            false
        }
    }
}
