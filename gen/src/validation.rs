//! Configuration validation, run before any schema is read.
//!
//! Everything checked here is knowable from the config alone, so a bad
//! contract list or toggle combination fails in microseconds instead of
//! after a parallel generation phase.

use std::collections::HashSet;

use cosmogen_define::CodegenConfig;

use crate::errors::GeneratorError;
use crate::naming::to_module_ident;

/// Module identifiers the bundle claims for itself.
const RESERVED_MODULE_IDENTS: &[&str] = &["shared"];

/// Validates a configuration.
///
/// ## Errors
///
/// - [`GeneratorError::Config`] - empty contract list, surfaces enabled
///   without the types they compile against, a reserved or invalid module
///   identifier, or a malformed bundle file name
/// - [`GeneratorError::DuplicateModuleName`] - two contracts whose names
///   normalize to the same module identifier
pub fn validate_config(config: &CodegenConfig) -> Result<(), GeneratorError> {
    if config.contracts.is_empty() {
        return Err(GeneratorError::Config(
            "contract list is empty; nothing to generate".to_string(),
        ));
    }

    let options = &config.options;
    if !options.types.enabled && options.client.enabled {
        return Err(GeneratorError::Config(
            "client generation requires type generation".to_string(),
        ));
    }
    if !options.types.enabled && options.message_composer.enabled {
        return Err(GeneratorError::Config(
            "message composer generation requires type generation".to_string(),
        ));
    }
    if options.concurrency == 0 {
        return Err(GeneratorError::Config(
            "concurrency must be at least 1".to_string(),
        ));
    }

    let bundle_stem = match &options.bundle {
        Some(bundle) => {
            let file = bundle.bundle_file.as_str();
            let stem = file.strip_suffix(".rs").ok_or_else(|| {
                GeneratorError::Config(format!("bundle file '{file}' must end in .rs"))
            })?;
            if let Some(scope) = &bundle.scope {
                if !is_valid_ident(scope) {
                    return Err(GeneratorError::Config(format!(
                        "bundle scope '{scope}' is not a valid module identifier"
                    )));
                }
            }
            Some(stem.to_string())
        }
        None => None,
    };

    let mut seen: HashSet<String> = HashSet::new();
    for contract in &config.contracts {
        let ident = to_module_ident(&contract.name);
        if ident.is_empty() {
            return Err(GeneratorError::Config(format!(
                "contract name '{}' normalizes to an empty module identifier",
                contract.name
            )));
        }
        if RESERVED_MODULE_IDENTS.contains(&ident.as_str())
            || bundle_stem.as_deref() == Some(ident.as_str())
            || ident == "lib"
        {
            return Err(GeneratorError::Config(format!(
                "contract name '{}' collides with the reserved module '{ident}'",
                contract.name
            )));
        }
        if !seen.insert(ident) {
            return Err(GeneratorError::DuplicateModuleName {
                name: contract.name.clone(),
            });
        }
    }

    Ok(())
}

fn is_valid_ident(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
