//! The generation pipeline: fan out per module, join, bundle, write.
//!
//! Modules are independent until bundling, so each one runs on its own
//! blocking task with a semaphore bounding how many are in flight. The
//! join barrier collects results by input position, keeping output
//! deterministic regardless of completion order. The first failed module
//! aborts the run; nothing reaches the filesystem unless every module
//! succeeded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cosmogen_define::{CodegenConfig, ContractSpec, GenerateOptions, GeneratedModule};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::bundle::build_bundle;
use crate::codegen::generate_module;
use crate::errors::GeneratorError;
use crate::loader::load_schema;
use crate::lower::lower_document;
use crate::naming::to_module_ident;
use crate::output::{print_dry_run, render_bundle, write_staged};
use crate::validation::validate_config;

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub modules: usize,
    pub files: usize,
    pub shared_types: usize,
}

/// Runs the whole pipeline for one configuration.
///
/// Relative schema directories and the output path are resolved against
/// `base_dir` (the configuration file's directory). With `dry_run` set the
/// rendered files are printed to stdout and the output directory is left
/// untouched.
///
/// ## Errors
///
/// Any [`GeneratorError`] from validation, loading, synthesis, bundling,
/// or writing. The error is always the first one encountered in input
/// order on the failing phase.
pub async fn run(
    config: &CodegenConfig,
    base_dir: &Path,
    dry_run: bool,
) -> Result<RunSummary, GeneratorError> {
    validate_config(config)?;

    let modules = generate_modules(config, base_dir).await?;
    let module_count = modules.len();

    let (bundle_file, scope) = match &config.options.bundle {
        Some(bundle) => (bundle.bundle_file.clone(), bundle.scope.clone()),
        None => ("lib.rs".to_string(), None),
    };

    let bundle = build_bundle(modules, scope)?;
    let shared_types = bundle.shared.len();
    let with_support =
        config.options.client.enabled || config.options.message_composer.enabled;
    let files = render_bundle(&bundle, &bundle_file, with_support)?;

    if dry_run {
        print_dry_run(&files);
    } else {
        let out_dir = resolve(base_dir, &config.out_path);
        write_staged(&files, &out_dir)?;
    }

    Ok(RunSummary {
        modules: module_count,
        files: files.len(),
        shared_types,
    })
}

/// Fans module generation out over blocking tasks and joins the results in
/// input order.
async fn generate_modules(
    config: &CodegenConfig,
    base_dir: &Path,
) -> Result<Vec<GeneratedModule>, GeneratorError> {
    let semaphore = Arc::new(Semaphore::new(config.options.concurrency));
    let mut set: JoinSet<Result<(usize, GeneratedModule), GeneratorError>> = JoinSet::new();

    for (index, contract) in config.contracts.iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let spec = contract.clone();
        let options = config.options.clone();
        let base = base_dir.to_path_buf();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.map_err(|e| {
                GeneratorError::CodeGen(format!("concurrency limiter closed: {e}"))
            })?;
            tokio::task::spawn_blocking(move || {
                let module = generate_one(&spec, &options, &base)?;
                Ok((index, module))
            })
            .await
            .map_err(|e| GeneratorError::CodeGen(format!("module task failed: {e}")))?
        });
    }

    let mut slots: Vec<Option<GeneratedModule>> = vec![None; config.contracts.len()];
    while let Some(joined) = set.join_next().await {
        let result = joined
            .map_err(|e| GeneratorError::CodeGen(format!("module task failed: {e}")))
            .and_then(|inner| inner);
        match result {
            Ok((index, module)) => {
                tracing::debug!(module = %module.module_ident, "module generated");
                slots[index] = Some(module);
            }
            Err(err) => {
                // Fail fast: stop the remaining branches and surface the
                // first error.
                set.shutdown().await;
                return Err(err);
            }
        }
    }

    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| GeneratorError::CodeGen("a module branch vanished".to_string()))
}

/// One parallel branch: load, lower, plan.
fn generate_one(
    spec: &ContractSpec,
    options: &GenerateOptions,
    base_dir: &Path,
) -> Result<GeneratedModule, GeneratorError> {
    let module_ident = to_module_ident(&spec.name);
    let schema_dir = resolve(base_dir, &spec.schema_dir);

    tracing::info!(module = %module_ident, dir = %schema_dir.display(), "generating module");
    let doc = load_schema(&module_ident, &schema_dir)?;
    let lowered = lower_document(&module_ident, &doc)?;
    generate_module(&spec.name, &module_ident, &lowered, options)
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{marketplace_schema, royalties_schema, write_schema};
    use cosmogen_define::{BundleOptions, ComposerOptions};
    use std::fs;
    use tempfile::TempDir;

    fn make_config(names: &[(&str, &str)]) -> CodegenConfig {
        CodegenConfig {
            contracts: names
                .iter()
                .map(|(name, dir)| ContractSpec::new(*name, *dir))
                .collect(),
            out_path: PathBuf::from("src"),
            options: GenerateOptions {
                message_composer: ComposerOptions {
                    enabled: true,
                    include_instantiate: true,
                },
                ..GenerateOptions::default()
            },
        }
    }

    fn seed_schemas(temp: &TempDir) {
        write_schema(temp.path(), "royalties", royalties_schema());
        write_schema(temp.path(), "marketplace", marketplace_schema());
    }

    #[tokio::test]
    async fn generates_a_two_module_bundle() {
        let temp = TempDir::new().unwrap();
        seed_schemas(&temp);
        let mut config = make_config(&[
            ("Bs721Royalties", "royalties"),
            ("Bs721AccountMarketplace", "marketplace"),
        ]);
        // Both contracts declare an InstantiateMsg, so the bundle needs a
        // scope to namespace them.
        config.options.bundle = Some(BundleOptions {
            bundle_file: "lib.rs".to_string(),
            scope: Some("contracts".to_string()),
        });

        let summary = run(&config, temp.path(), false).await.unwrap();
        assert_eq!(summary.modules, 2);
        assert_eq!(summary.files, 4);
        // Uint128 is declared identically by both schemas.
        assert_eq!(summary.shared_types, 1);

        let out = temp.path().join("src");
        for name in [
            "lib.rs",
            "shared.rs",
            "bs721_royalties.rs",
            "bs721_account_marketplace.rs",
        ] {
            assert!(out.join(name).exists(), "missing {name}");
        }

        let lib = fs::read_to_string(out.join("lib.rs")).unwrap();
        assert!(lib.contains("pub mod bs721_royalties;"));
        assert!(lib.contains("pub mod contracts {"));

        let royalties = fs::read_to_string(out.join("bs721_royalties.rs")).unwrap();
        assert!(royalties.contains("pub use crate::shared::Uint128;"));
        assert!(royalties.contains("pub struct Bs721RoyaltiesClient<Q>"));
    }

    #[tokio::test]
    async fn colliding_message_names_conflict_without_a_scope() {
        let temp = TempDir::new().unwrap();
        seed_schemas(&temp);
        let config = make_config(&[
            ("Bs721Royalties", "royalties"),
            ("Bs721AccountMarketplace", "marketplace"),
        ]);

        let err = run(&config, temp.path(), false).await.unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::BundleConflict { symbol, .. } if symbol == "ExecuteMsg"
        ));
        assert!(!temp.path().join("src").exists());
    }

    #[tokio::test]
    async fn scoped_bundle_uses_the_configured_file_name() {
        let temp = TempDir::new().unwrap();
        seed_schemas(&temp);
        let mut config = make_config(&[("Bs721Royalties", "royalties")]);
        config.options.bundle = Some(BundleOptions {
            bundle_file: "bundle.rs".to_string(),
            scope: Some("contracts".to_string()),
        });

        run(&config, temp.path(), false).await.unwrap();

        let out = temp.path().join("src");
        assert!(out.join("bundle.rs").exists());
        assert!(!out.join("lib.rs").exists());
        let bundle = fs::read_to_string(out.join("bundle.rs")).unwrap();
        assert!(bundle.contains("pub mod contracts {"));
    }

    #[tokio::test]
    async fn a_failing_module_leaves_no_output() {
        let temp = TempDir::new().unwrap();
        seed_schemas(&temp);
        let config = make_config(&[
            ("Bs721Royalties", "royalties"),
            ("Ghost", "no-such-dir"),
        ]);

        let err = run(&config, temp.path(), false).await.unwrap_err();
        assert!(matches!(err, GeneratorError::SchemaNotFound { .. }));
        assert!(!temp.path().join("src").exists());
    }

    #[tokio::test]
    async fn duplicate_module_names_fail_before_loading() {
        let temp = TempDir::new().unwrap();
        let config = make_config(&[
            ("Bs721Royalties", "royalties"),
            ("bs721_royalties", "royalties"),
        ]);

        let err = run(&config, temp.path(), true).await.unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateModuleName { .. }));
    }

    #[tokio::test]
    async fn types_only_config_emits_no_client_or_composer() {
        let temp = TempDir::new().unwrap();
        seed_schemas(&temp);
        let mut config = make_config(&[("Bs721Royalties", "royalties")]);
        config.options.client.enabled = false;
        config.options.message_composer = ComposerOptions::default();

        run(&config, temp.path(), false).await.unwrap();

        let royalties =
            fs::read_to_string(temp.path().join("src/bs721_royalties.rs")).unwrap();
        assert!(royalties.contains("pub enum ExecuteMsg"));
        assert!(!royalties.contains("Client<"));
        assert!(!royalties.contains("_msg("));

        // The shared module drops the client support surface too.
        let shared = fs::read_to_string(temp.path().join("src/shared.rs")).unwrap();
        for symbol in [
            "ContractQuerier",
            "ContractClientError",
            "ExecuteEnvelope",
            "InstantiateEnvelope",
        ] {
            assert!(!shared.contains(symbol), "unexpected symbol {symbol}");
        }
    }

    #[tokio::test]
    async fn reruns_produce_byte_identical_output() {
        let temp = TempDir::new().unwrap();
        seed_schemas(&temp);
        let mut config = make_config(&[
            ("Bs721Royalties", "royalties"),
            ("Bs721AccountMarketplace", "marketplace"),
        ]);
        config.options.bundle = Some(BundleOptions {
            bundle_file: "lib.rs".to_string(),
            scope: Some("contracts".to_string()),
        });

        run(&config, temp.path(), false).await.unwrap();
        config.out_path = PathBuf::from("second");
        run(&config, temp.path(), false).await.unwrap();

        for name in [
            "lib.rs",
            "shared.rs",
            "bs721_royalties.rs",
            "bs721_account_marketplace.rs",
        ] {
            let first = fs::read(temp.path().join("src").join(name)).unwrap();
            let second = fs::read(temp.path().join("second").join(name)).unwrap();
            assert_eq!(first, second, "output of {name} differs between runs");
        }
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        seed_schemas(&temp);
        let config = make_config(&[("Bs721Royalties", "royalties")]);

        let summary = run(&config, temp.path(), true).await.unwrap();
        assert_eq!(summary.modules, 1);
        assert!(!temp.path().join("src").exists());
    }

    #[tokio::test]
    async fn output_order_follows_the_contract_list() {
        let temp = TempDir::new().unwrap();
        seed_schemas(&temp);
        let mut config = make_config(&[
            ("Bs721AccountMarketplace", "marketplace"),
            ("Bs721Royalties", "royalties"),
        ]);
        config.options.bundle = Some(BundleOptions {
            bundle_file: "lib.rs".to_string(),
            scope: Some("contracts".to_string()),
        });

        run(&config, temp.path(), false).await.unwrap();
        let lib = fs::read_to_string(temp.path().join("src/lib.rs")).unwrap();
        let marketplace_pos = lib.find("pub mod bs721_account_marketplace;").unwrap();
        let royalties_pos = lib.find("pub mod bs721_royalties;").unwrap();
        assert!(marketplace_pos < royalties_pos);
    }
}
