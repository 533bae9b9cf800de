//! Deploy-pipeline lifecycle surface.
//!
//! The host calls two hooks on a plugin:
//!
//! ```text
//!  configure(ctx)  ── resolve options, validate, report defaults ── Err = abort deploy
//!        │
//!  willUpload(ctx) ── brotli capability ─> codec plan ─> select files ─> passes
//!        │
//!        v
//!  UploadOutcome { distFiles?, gzippedFiles, brotliCompressedFiles }
//! ```
//!
//! Options are read fresh from the context's [`ConfigStore`] on each hook; the
//! plugin itself holds no per-run state.

mod context;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capability::{can_use_brotli, CapabilityOracle, SupportTable};
use crate::codec::{CodecPlan, EncoderSet};
use crate::config::{Resolution, RunConfig};
use crate::error::Result;
use crate::executor::{CompressionOutcome, Executor};
use crate::select::{FileSelector, GlobPattern};

pub use context::DeployContext;

/// Result reported back to the host from `willUpload`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    /// Original dist files followed by every kept compressed sibling.
    /// Only present when `keep` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_files: Option<Vec<String>>,
    /// Outputs of the gzip pass
    pub gzipped_files: Vec<String>,
    /// Outputs of the brotli pass
    pub brotli_compressed_files: Vec<String>,
}

impl UploadOutcome {
    /// Shape the host-facing result.
    ///
    /// With `keep` the dist file list is a new list holding the originals
    /// and then the gzip and brotli outputs.
    pub fn new(dist_files: &[String], outcome: CompressionOutcome, keep: bool) -> Self {
        let CompressionOutcome {
            gzipped_files,
            brotli_compressed_files,
        } = outcome;

        let dist_files = keep.then(|| {
            dist_files
                .iter()
                .chain(&gzipped_files)
                .chain(&brotli_compressed_files)
                .cloned()
                .collect()
        });

        Self {
            dist_files,
            gzipped_files,
            brotli_compressed_files,
        }
    }
}

/// Boxed future returned by [`DeployPlugin::will_upload`]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lifecycle hooks a deploy host drives.
///
/// Implementations must be safe to share across threads.
pub trait DeployPlugin: Send + Sync {
    /// Plugin instance name
    fn name(&self) -> &str;

    /// Resolve and validate options. Must not touch the filesystem.
    fn configure(&self, context: &DeployContext) -> Result<()>;

    /// Do the plugin's work right before upload
    fn will_upload<'a>(&'a self, context: &'a DeployContext) -> BoxFuture<'a, Result<UploadOutcome>>;
}

/// The compress-before-upload plugin
#[derive(Clone)]
pub struct CompressPlugin {
    name: String,
    oracle: Arc<dyn CapabilityOracle>,
}

impl CompressPlugin {
    /// Create a plugin using the built-in browser support table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            oracle: Arc::new(SupportTable::default()),
        }
    }

    /// Use a different capability oracle
    pub fn with_oracle(mut self, oracle: Arc<dyn CapabilityOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Resolve options and compile patterns, logging defaulted keys.
    ///
    /// Returns the resolution so callers can inspect what was defaulted.
    pub fn resolve(&self, context: &DeployContext, log_defaults: bool) -> Result<Resolution> {
        let resolution = RunConfig::resolve(
            &context.config,
            &context.dist_dir,
            &context.dist_files,
            log_defaults,
        )?;
        FileSelector::new(
            &resolution.config.file_pattern,
            resolution.config.ignore_pattern.as_deref(),
        )?;
        Ok(resolution)
    }

    async fn compress(&self, context: &DeployContext) -> Result<UploadOutcome> {
        let config = self.resolve(context, false)?.config;
        let selector =
            FileSelector::new(&config.file_pattern, config.ignore_pattern.as_deref())?;

        // Checked as late as possible so earlier hooks can still adjust targets.
        let can_use_brotli = can_use_brotli(&context.project, self.oracle.as_ref());
        let plan = CodecPlan::select(&config.compression, can_use_brotli);
        let encoders = EncoderSet::for_plan(plan, config.zopfli)?;

        tracing::debug!("compressing `{}`", selector.include().as_str());
        tracing::debug!(
            "ignoring `{}`",
            selector.exclude().map_or("null", GlobPattern::as_str)
        );

        let files = selector.select(&config.dist_files);
        let outcome = Executor::new(&config.dist_dir, config.keep)
            .run(&files, &encoders)
            .await?;

        tracing::info!("compressed {} files ok", outcome.len());
        if config.keep {
            tracing::info!("keep is enabled, added compressed files to `distFiles`");
        }

        Ok(UploadOutcome::new(&config.dist_files, outcome, config.keep))
    }
}

impl std::fmt::Debug for CompressPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressPlugin")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl DeployPlugin for CompressPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&self, context: &DeployContext) -> Result<()> {
        self.resolve(context, true).map(|_| ())
    }

    fn will_upload<'a>(&'a self, context: &'a DeployContext) -> BoxFuture<'a, Result<UploadOutcome>> {
        Box::pin(async move {
            self.compress(context).await.inspect_err(|e| {
                tracing::error!("{}", e);
            })
        })
    }
}
