//! Concurrent compress-and-replace passes.
//!
//! One pass runs per required codec and both passes run at the same time.
//! Inside a pass every selected file is dispatched at once. Each file is
//! streamed through the encoder on the blocking pool into a sibling
//! `<file><suffix>`, which is then either renamed over the original
//! (`keep = false`) or left next to it (`keep = true`).
//!
//! Entries must stay inside the dist directory: absolute paths and `..`
//! components are rejected before anything is opened.
//!
//! A pass completes when all of its files complete. The first failure fails
//! the pass; results are ordered by input, never by completion.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::codec::{EncoderSet, StreamEncoder};
use crate::error::{CompressError, Result};

/// Paths produced by one run, per codec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionOutcome {
    /// Outputs of the gzip pass
    pub gzipped_files: Vec<String>,
    /// Outputs of the brotli pass
    pub brotli_compressed_files: Vec<String>,
}

impl CompressionOutcome {
    /// Total number of files produced
    pub fn len(&self) -> usize {
        self.gzipped_files.len() + self.brotli_compressed_files.len()
    }

    /// Check if nothing was produced
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs codec passes over files under a dist directory
#[derive(Debug, Clone)]
pub struct Executor {
    dist_dir: PathBuf,
    keep: bool,
}

impl Executor {
    /// Create an executor rooted at `dist_dir`
    pub fn new(dist_dir: impl Into<PathBuf>, keep: bool) -> Self {
        Self {
            dist_dir: dist_dir.into(),
            keep,
        }
    }

    /// Run every pass the encoder set calls for
    pub async fn run(&self, files: &[String], encoders: &EncoderSet) -> Result<CompressionOutcome> {
        let (gzipped_files, brotli_compressed_files) = tokio::try_join!(
            self.maybe_pass(files, encoders.gzip.clone()),
            self.maybe_pass(files, encoders.brotli.clone())
        )?;

        Ok(CompressionOutcome {
            gzipped_files,
            brotli_compressed_files,
        })
    }

    async fn maybe_pass(
        &self,
        files: &[String],
        encoder: Option<Arc<dyn StreamEncoder>>,
    ) -> Result<Vec<String>> {
        match encoder {
            Some(encoder) => self.run_pass(files, encoder).await,
            None => Ok(Vec::new()),
        }
    }

    /// Compress all `files` with one encoder; output order follows `files`
    pub async fn run_pass(
        &self,
        files: &[String],
        encoder: Arc<dyn StreamEncoder>,
    ) -> Result<Vec<String>> {
        try_join_all(
            files
                .iter()
                .map(|file| self.compress_file(file, Arc::clone(&encoder))),
        )
        .await
    }

    /// Compress one file and return the relative path to report for it
    pub async fn compress_file(
        &self,
        relative: &str,
        encoder: Arc<dyn StreamEncoder>,
    ) -> Result<String> {
        let name = encoder.name();
        match self.try_compress_file(relative, encoder).await {
            Ok(produced) => {
                tracing::info!("✔  {}", produced);
                Ok(produced)
            },
            Err(e) => {
                tracing::error!("{} failed for {}: {}", name, relative, e);
                Err(e)
            },
        }
    }

    /// `relative` joined onto the dist directory; entries that would resolve
    /// outside of it are rejected
    fn source_path(&self, relative: &str) -> Result<PathBuf> {
        let inside = Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside || relative.is_empty() {
            return Err(CompressError::OutsideDistDir {
                path: relative.to_string(),
            });
        }
        Ok(self.dist_dir.join(relative))
    }

    async fn try_compress_file(
        &self,
        relative: &str,
        encoder: Arc<dyn StreamEncoder>,
    ) -> Result<String> {
        let suffix = encoder.codec().suffix();
        let source = self.source_path(relative)?;
        let target = with_suffix(&source, suffix);

        let (src, dst) = (source.clone(), target.clone());
        tokio::task::spawn_blocking(move || encode_file(encoder.as_ref(), &src, &dst)).await??;

        if self.keep {
            Ok(format!("{relative}{suffix}"))
        } else {
            tokio::fs::rename(&target, &source)
                .await
                .map_err(|e| CompressError::io(&target, e))?;
            Ok(relative.to_string())
        }
    }
}

/// Stream `src` through `encoder` into `dst`
fn encode_file(encoder: &dyn StreamEncoder, src: &Path, dst: &Path) -> Result<()> {
    let input = File::open(src).map_err(|e| CompressError::io(src, e))?;
    let output = File::create(dst).map_err(|e| CompressError::io(dst, e))?;

    let mut reader = BufReader::new(input);
    let mut writer = BufWriter::new(output);
    encoder
        .encode(&mut reader, &mut writer)
        .map_err(|e| CompressError::io(src, e))?;

    writer
        .into_inner()
        .map_err(|e| CompressError::io(dst, e.into_error()))?;
    Ok(())
}

/// `path` with `suffix` appended to its final component
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BrotliEncoder, CodecPlan, GzipEncoder};
    use std::io::Read;

    fn dist_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, body) in files {
            let full = dir.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, body).unwrap();
        }
        dir
    }

    fn gunzip(path: &Path) -> String {
        let mut out = String::new();
        flate2::read::GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    fn files(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("dist/assets/app.js"), ".gz"),
            PathBuf::from("dist/assets/app.js.gz")
        );
    }

    #[tokio::test]
    async fn test_replace_in_place() {
        let dist = dist_with(&[("assets/foo.js", "alert(\"Hello foo world!\");")]);
        let executor = Executor::new(dist.path(), false);

        let out = executor
            .run_pass(&files(&["assets/foo.js"]), Arc::new(GzipEncoder::new()))
            .await
            .unwrap();

        assert_eq!(out, vec!["assets/foo.js"]);
        assert!(!dist.path().join("assets/foo.js.gz").exists());
        assert_eq!(
            gunzip(&dist.path().join("assets/foo.js")),
            "alert(\"Hello foo world!\");"
        );
    }

    #[tokio::test]
    async fn test_keep_leaves_both_files() {
        let dist = dist_with(&[("app.css", "body{}")]);
        let executor = Executor::new(dist.path(), true);

        let out = executor
            .run_pass(&files(&["app.css"]), Arc::new(BrotliEncoder::new()))
            .await
            .unwrap();

        assert_eq!(out, vec!["app.css.br"]);
        assert_eq!(
            std::fs::read_to_string(dist.path().join("app.css")).unwrap(),
            "body{}"
        );
        assert!(dist.path().join("app.css.br").exists());
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let names: Vec<String> = (0..24).map(|i| format!("chunk-{i:02}.js")).collect();
        let bodies: Vec<String> = (0..24)
            .map(|i| "x".repeat(if i % 2 == 0 { 50_000 } else { 10 }))
            .collect();
        let pairs: Vec<(&str, &str)> = names
            .iter()
            .zip(&bodies)
            .map(|(n, b)| (n.as_str(), b.as_str()))
            .collect();
        let dist = dist_with(&pairs);
        let executor = Executor::new(dist.path(), true);

        let out = executor
            .run_pass(&names, Arc::new(GzipEncoder::new()))
            .await
            .unwrap();

        let expected: Vec<String> = names.iter().map(|n| format!("{n}.gz")).collect();
        assert_eq!(out, expected);
    }

    #[tokio::test]
    async fn test_missing_file_fails_pass() {
        let dist = dist_with(&[("present.js", "ok")]);
        let executor = Executor::new(dist.path(), false);

        let err = executor
            .run_pass(
                &files(&["present.js", "missing.js"]),
                Arc::new(GzipEncoder::new()),
            )
            .await
            .unwrap_err();

        match err {
            CompressError::Io { path, .. } => assert!(path.ends_with("missing.js")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_absolute_entry_is_rejected() {
        let dist = dist_with(&[("inside.js", "ok")]);
        let elsewhere = dist_with(&[("victim.js", "untouched")]);
        let victim = elsewhere.path().join("victim.js");
        let executor = Executor::new(dist.path(), false);

        let err = executor
            .run_pass(
                &[victim.to_string_lossy().into_owned()],
                Arc::new(GzipEncoder::new()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CompressError::OutsideDistDir { .. }));
        assert_eq!(std::fs::read_to_string(&victim).unwrap(), "untouched");
        assert!(!with_suffix(&victim, ".gz").exists());
    }

    #[tokio::test]
    async fn test_parent_dir_entry_is_rejected() {
        let root = dist_with(&[("dist/inside.js", "ok"), ("outside.js", "untouched")]);
        let executor = Executor::new(root.path().join("dist"), true);

        let err = executor
            .run_pass(&files(&["../outside.js"]), Arc::new(BrotliEncoder::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, CompressError::OutsideDistDir { path } if path == "../outside.js"));
        assert!(!root.path().join("outside.js.br").exists());
    }

    #[tokio::test]
    async fn test_dot_segments_stay_inside() {
        let dist = dist_with(&[("assets/app.js", "ok")]);
        let executor = Executor::new(dist.path(), true);

        let out = executor
            .run_pass(&files(&["./assets/app.js"]), Arc::new(GzipEncoder::new()))
            .await
            .unwrap();

        assert_eq!(out, vec!["./assets/app.js.gz"]);
        assert_eq!(gunzip(&dist.path().join("assets/app.js.gz")), "ok");
    }

    #[tokio::test]
    async fn test_run_skips_unrequired_pass() {
        let dist = dist_with(&[("a.js", "a"), ("b.js", "b")]);
        let executor = Executor::new(dist.path(), true);
        let plan = CodecPlan {
            must_gzip: true,
            must_brotli: false,
        };
        let encoders = EncoderSet::for_plan(plan, false).unwrap();

        let outcome = executor
            .run(&files(&["a.js", "b.js"]), &encoders)
            .await
            .unwrap();

        assert_eq!(outcome.gzipped_files, vec!["a.js.gz", "b.js.gz"]);
        assert!(outcome.brotli_compressed_files.is_empty());
        assert_eq!(outcome.len(), 2);
    }
}
