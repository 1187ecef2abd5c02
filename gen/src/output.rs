//! Output assembly and file writing for generated bundles.
//!
//! The final phase is single-threaded: render every file's tokens, validate
//! each with `syn`, format with `prettyplease`, and only then touch the
//! output directory. Files are staged into a temporary directory next to
//! the output directory and swapped in with a single rename, so a failing
//! run never leaves a half-written bundle behind.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── lib.rs              # Bundle root (name configurable)
//! ├── shared.rs           # Support types + hoisted declarations
//! ├── bs721_royalties.rs  # One file per contract module
//! └── ...
//! ```

use std::fs;
use std::path::Path;

use cosmogen_define::Bundle;
use proc_macro2::TokenStream;

use crate::bundle::render_bundle_file;
use crate::codegen::render_module_file;
use crate::codegen::support::render_shared_module;
use crate::errors::GeneratorError;

/// One fully rendered output file, ready to write.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub name: String,
    pub contents: String,
}

/// Renders, validates, and formats every file in the bundle. The shared
/// module carries the client/composer support surface only when
/// `with_support` is set.
///
/// ## Errors
///
/// Returns [`GeneratorError::CodeGen`] when any rendered file fails to
/// parse as Rust, naming the file.
pub fn render_bundle(
    bundle: &Bundle,
    bundle_file: &str,
    with_support: bool,
) -> Result<Vec<RenderedFile>, GeneratorError> {
    let mut files = Vec::with_capacity(bundle.entries.len() + 2);

    files.push(rendered(bundle_file, render_bundle_file(bundle))?);
    files.push(rendered(
        "shared.rs",
        render_shared_module(&bundle.shared, with_support),
    )?);
    for entry in &bundle.entries {
        let name = format!("{}.rs", entry.module.module_ident);
        files.push(rendered(&name, render_module_file(entry))?);
    }

    Ok(files)
}

fn rendered(name: &str, tokens: TokenStream) -> Result<RenderedFile, GeneratorError> {
    let file = validate_code(name, &tokens)?;
    Ok(RenderedFile {
        name: name.to_string(),
        contents: format_code(&file),
    })
}

/// Validates generated tokens by parsing them as a Rust file.
pub fn validate_code(name: &str, tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGen(format!("generated '{name}' is invalid: {e}")))
}

/// Formats a validated file and prepends the generation notice.
pub fn format_code(file: &syn::File) -> String {
    let formatted = prettyplease::unparse(file);
    format!(
        "// This code was automatically generated by cosmogen. Do not edit manually.\n\n{formatted}"
    )
}

/// Writes the rendered files into `out_dir` all-or-nothing.
///
/// Every file is first written into a staging directory created next to
/// `out_dir` (same filesystem, so the final rename is atomic). Any
/// previous output directory is parked aside, the staged directory is
/// swapped in with one rename, and entries the run did not regenerate are
/// carried over afterwards.
///
/// ## Errors
///
/// Returns [`GeneratorError::Write`] with the offending path when staging
/// or swapping fails. A failure before the swap leaves `out_dir`
/// untouched; a failed swap puts the previous output back.
pub fn write_staged(files: &[RenderedFile], out_dir: &Path) -> Result<(), GeneratorError> {
    let write_err = |path: &Path| {
        let path = path.display().to_string();
        move |source: std::io::Error| GeneratorError::Write {
            path: path.clone(),
            source,
        }
    };

    let parent = match out_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_err(parent))?;
    let stage = tempfile::Builder::new()
        .prefix(".cosmogen-stage")
        .tempdir_in(parent)
        .map_err(write_err(parent))?;

    for file in files {
        let staged_path = stage.path().join(&file.name);
        fs::write(&staged_path, &file.contents).map_err(write_err(&staged_path))?;
    }

    let previous = if out_dir.exists() {
        let parked = tempfile::Builder::new()
            .prefix(".cosmogen-prev")
            .tempdir_in(parent)
            .map_err(write_err(parent))?;
        fs::rename(out_dir, parked.path().join("out")).map_err(write_err(out_dir))?;
        Some(parked)
    } else {
        None
    };

    if let Err(source) = fs::rename(stage.path(), out_dir) {
        if let Some(parked) = &previous {
            let _ = fs::rename(parked.path().join("out"), out_dir);
        }
        return Err(write_err(out_dir)(source));
    }

    if let Some(parked) = previous {
        let old_out = parked.path().join("out");
        if let Err(source) = carry_over(files, &old_out, out_dir) {
            // Leave the parked directory on disk rather than deleting
            // entries that never made it back.
            let kept = parked.keep();
            tracing::warn!(parked = %kept.display(), "previous output left parked");
            return Err(write_err(out_dir)(source));
        }
    }

    tracing::debug!(files = files.len(), out_dir = %out_dir.display(), "bundle written");
    Ok(())
}

/// Moves entries of the previous output that this run did not regenerate
/// into the new output directory.
fn carry_over(
    files: &[RenderedFile],
    old_out: &Path,
    out_dir: &Path,
) -> std::io::Result<()> {
    for entry in fs::read_dir(old_out)? {
        let entry = entry?;
        let name = entry.file_name();
        if files.iter().any(|file| name == *file.name) {
            continue;
        }
        fs::rename(entry.path(), out_dir.join(&name))?;
    }
    Ok(())
}

/// Prints every rendered file to stdout instead of writing it.
pub fn print_dry_run(files: &[RenderedFile]) {
    for file in files {
        println!("=== {} ===\n{}\n", file.name, file.contents);
    }
}
