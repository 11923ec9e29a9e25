//! Helpers that run the whole pipeline (parse, bind, shake, render) over
//! source fixtures.

use crate::parse::{parse_module, ParseError};
use thiserror::Error;
use treeshake_core::{render_bundle, Bundle, OutputOptions, RenderedBundle, ShakeError, ShakeStats, TreeshakeOptions};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Shake error: {0}")]
    Shake(#[from] ShakeError),
}

/// Output of one complete run
#[derive(Debug)]
pub struct ShakeOutput {
    pub code: String,
    pub stats: ShakeStats,
    pub bundle: RenderedBundle,
}

/// Parses and binds modules without shaking them.
///
/// # Arguments
///
/// * `modules` - `(id, source)` pairs in execution order, dependencies first;
///   the last one is the entry
/// * `options` - Tree-shaking options for the bundle
pub fn bind_modules(modules: &[(&str, &str)], options: TreeshakeOptions) -> Result<Bundle, FixtureError> {
    let mut bundle = Bundle::new(options);
    for (index, (id, source)) in modules.iter().enumerate() {
        parse_module(&mut bundle, id, source, index + 1 == modules.len())?;
    }
    bundle.bind()?;
    Ok(bundle)
}

/// Runs the full pipeline over several modules.
///
/// # Returns
///
/// The rendered bundle together with the run's statistics
pub fn shake_modules(
    modules: &[(&str, &str)],
    options: TreeshakeOptions,
    output: &OutputOptions,
) -> Result<ShakeOutput, FixtureError> {
    let bundle = bind_modules(modules, options)?;
    let stats = bundle.shake()?;
    let rendered = render_bundle(&bundle, output)?;
    Ok(ShakeOutput {
        code: rendered.code.clone(),
        stats,
        bundle: rendered,
    })
}

/// Shakes a single entry module with default options and returns its code.
pub fn shake(source: &str) -> Result<String, FixtureError> {
    shake_with(source, TreeshakeOptions::default())
}

/// Shakes a single entry module with the given options.
pub fn shake_with(source: &str, options: TreeshakeOptions) -> Result<String, FixtureError> {
    Ok(shake_modules(&[("main.js", source)], options, &OutputOptions::default())?.code)
}
