//! # deploy-compress - Pre-upload compression for static build artifacts
//!
//! A deploy-pipeline step that runs right before upload. Given a dist
//! directory and the relative paths of its files, it selects files by glob,
//! compresses each with gzip and/or brotli, and either replaces the original
//! in place or keeps a `.gz`/`.br` sibling next to it. The produced paths are
//! reported back so later stages can set `Content-Encoding` headers.
//!
//! ## Pipeline
//!
//! ```text
//!   configure ──> RunConfig (validated)
//!                     │
//!   willUpload ──> can_use_brotli(project targets)
//!                     │
//!                  CodecPlan { must_gzip, must_brotli }
//!                     │
//!                  FileSelector::select(dist_files)
//!                     │
//!          ┌──────────┴──────────┐
//!     gzip pass             brotli pass      (concurrent, per file fan-out)
//!          └──────────┬──────────┘
//!                     v
//!   UploadOutcome { distFiles?, gzippedFiles, brotliCompressedFiles }
//! ```
//!
//! ## Codec selection
//!
//! | `compression`         | brotli supported | brotli unsupported |
//! |-----------------------|------------------|--------------------|
//! | `["best"]` (default)  | brotli           | gzip               |
//! | `["gzip"]`            | gzip             | gzip               |
//! | `["brotli"]`          | brotli           | brotli             |
//! | `["gzip", "brotli"]`  | both (`keep`)    | both (`keep`)      |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use deploy_compress::{CompressPlugin, ConfigMap, DeployContext, DeployPlugin};
//!
//! let context = DeployContext::new("dist", vec!["assets/app.js".into()])
//!     .with_config(ConfigMap::new().with("compression", "gzip"));
//!
//! let plugin = CompressPlugin::new("compress");
//! plugin.configure(&context)?;
//! let outcome = plugin.will_upload(&context).await?;
//! assert_eq!(outcome.gzipped_files, vec!["assets/app.js"]);
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Option resolution, defaults and validation
//! - [`capability`]: Browser targets and brotli capability lookup
//! - [`select`]: Include/exclude glob selection
//! - [`codec`]: Selector tokens, codec plan and stream encoders
//! - [`executor`]: Concurrent compress-and-replace passes
//! - [`plugin`]: Lifecycle hooks and the host-facing result
//! - [`error`]: Error types and result aliases

pub mod capability;
pub mod codec;
pub mod config;
pub mod error;
pub mod executor;
pub mod plugin;
pub mod select;

// Re-exports for convenience
pub use capability::{can_use_brotli, CapabilityOracle, Project, SupportTable, Targets};
pub use codec::{Codec, CodecPlan, CompressionSelector, CompressionToken, StreamEncoder};
pub use config::{Config, ConfigMap, ConfigStore, RunConfig};
pub use error::{CompressError, Result};
pub use executor::{CompressionOutcome, Executor};
pub use plugin::{CompressPlugin, DeployContext, DeployPlugin, UploadOutcome};
pub use select::FileSelector;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
