//! Deferred flag templates.
//!
//! Some configure flags depend on run-time values (the install prefix, an
//! inherited `CFLAGS`). They are declared as templates with `{options.<field>}`
//! and `{env.<VAR>}` placeholders and resolved in a single pass right before
//! the command runs. Substituted text is never re-scanned.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::core::env::BuildEnv;
use crate::core::error::StepError;
use crate::core::options::BuildOptions;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{(options|env)\.([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex")
    })
}

fn option_value(options: &BuildOptions, field: &str) -> Option<String> {
    match field {
        "install_dir" => Some(options.install_dir.display().to_string()),
        "target_arch" => Some(options.target_arch.clone()),
        "build_static" => Some(options.build_static.to_string()),
        "jobs" => Some(options.jobs.to_string()),
        _ => None,
    }
}

/// Resolve `template` against `options` and, when given, `env`.
///
/// Unset environment variables resolve to the empty string. Unknown option
/// fields, or `{env.*}` without an environment, are errors.
pub fn resolve(
    template: &str,
    options: &BuildOptions,
    env: Option<&BuildEnv>,
) -> Result<String, StepError> {
    let mut failure: Option<String> = None;

    let resolved = placeholder().replace_all(template, |caps: &Captures| {
        let key = &caps[2];
        let value = match &caps[1] {
            "options" => option_value(options, key)
                .ok_or_else(|| format!("unknown option '{}'", key)),
            _ => env
                .map(|env| env.get(key).to_string())
                .ok_or_else(|| format!("no environment for '{}'", key)),
        };
        value.unwrap_or_else(|reason| {
            failure.get_or_insert(reason);
            String::new()
        })
    });

    match failure {
        Some(reason) => Err(StepError::Template {
            template: template.to_string(),
            reason,
        }),
        None => Ok(resolved.into_owned()),
    }
}
