//! Filepath: src/core/optimize/mod.rs
//! Orchestrates the individual optimization passes (whitespace,
//! comments, license, data compaction, skeleton) over single files
//! and batches.

pub mod comments;
pub mod data;
pub mod license;
pub mod skeleton;
pub mod whitespace;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::core::util::{approx_tokens, CancellationToken};
use skeleton::AnalyzerRegistry;

/// Which passes to run, and in what combination. Construct with
/// `Default`, or one of the presets below.
#[derive(Debug, Clone, Copy)]
pub struct OptimizeOptions {
    pub collapse_empty_lines: bool,
    pub strip_license: bool,
    pub strip_comments: bool,
    pub compact_data_files: bool,
    pub skeleton_mode: bool,
    pub trim_whitespace: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            collapse_empty_lines: true,
            strip_license: false,
            strip_comments: false,
            compact_data_files: false,
            skeleton_mode: false,
            trim_whitespace: true,
        }
    }
}

impl OptimizeOptions {
    /// Every lossy pass turned on except skeleton mode.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            collapse_empty_lines: true,
            strip_license: true,
            strip_comments: true,
            compact_data_files: true,
            skeleton_mode: false,
            trim_whitespace: true,
        }
    }

    /// Skeleton mode only. Falls through to untouched content when a
    /// skeleton can't be generated (no analyzer registered for the
    /// file's extension) — no other pass runs to mask that.
    #[must_use]
    pub fn skeleton() -> Self {
        Self {
            collapse_empty_lines: false,
            strip_license: false,
            strip_comments: false,
            compact_data_files: false,
            skeleton_mode: true,
            trim_whitespace: false,
        }
    }
}

fn ext_of(path: &Path) -> String {
    path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase()
}

/// Run the configured passes over one file's content. Returns the
/// optimized text and whether a skeleton substitution was used (callers
/// aggregate this into `OptimizeStats::skeletons_used`).
#[must_use]
pub fn optimize_content_inner(
    path: &Path,
    content: &str,
    opts: &OptimizeOptions,
    registry: Option<&AnalyzerRegistry>,
) -> (String, bool) {
    let ext = ext_of(path);

    if opts.skeleton_mode {
        let sk = skeleton::generate_skeleton(registry, path, content);
        if !sk.is_empty() {
            return (sk, true);
        }
    }

    let mut out = content.to_string();

    if opts.strip_license {
        out = license::strip_license_with_hint(&out, &ext);
    }
    if opts.strip_comments {
        out = comments::strip_comments(&out, &ext);
    }
    if opts.compact_data_files {
        out = data::compact(&out, path);
    }
    if opts.trim_whitespace {
        out = whitespace::trim_trailing_whitespace(&out);
    }
    if opts.collapse_empty_lines {
        out = whitespace::collapse_empty_lines(&out);
    }

    (out, false)
}

/// Run the configured passes over one file's content.
#[must_use]
pub fn optimize_content(
    path: &Path,
    content: &str,
    opts: &OptimizeOptions,
    registry: Option<&AnalyzerRegistry>,
) -> String {
    optimize_content_inner(path, content, opts, registry).0
}

/// Aggregate savings from a batch optimization run.
#[derive(Debug, Clone, Default)]
pub struct OptimizeStats {
    pub original_size: usize,
    pub optimized_size: usize,
    pub saved_bytes: usize,
    pub saved_percent: f64,
    pub files_processed: usize,
    pub skeletons_used: usize,
}

/// Optimize a batch of `(path, content)` pairs in parallel, preserving
/// input order in the returned vector. Checks `cancel` between items;
/// a cancelled run returns whatever finished before the cancellation
/// was observed.
pub fn optimize_batch(
    files: &[(std::path::PathBuf, String)],
    opts: &OptimizeOptions,
    registry: Option<&AnalyzerRegistry>,
    cancel: &CancellationToken,
) -> (Vec<(std::path::PathBuf, String)>, OptimizeStats) {
    let skeletons_used = AtomicUsize::new(0);

    let results: Vec<(std::path::PathBuf, String)> = files
        .par_iter()
        .map_init(
            || (),
            |(), (path, content)| {
                if cancel.is_cancelled() {
                    return (path.clone(), content.clone());
                }
                let (out, used_skeleton) =
                    optimize_content_inner(path, content, opts, registry);
                if used_skeleton {
                    skeletons_used.fetch_add(1, Ordering::Relaxed);
                }
                (path.clone(), out)
            },
        )
        .collect();

    let original_size: usize = files.iter().map(|(_, c)| c.len()).sum();
    let optimized_size: usize = results.iter().map(|(_, c)| c.len()).sum();
    let saved_bytes = original_size.saturating_sub(optimized_size);
    let saved_percent = if original_size == 0 {
        0.0
    } else {
        (saved_bytes as f64 / original_size as f64) * 100.0
    };

    let stats = OptimizeStats {
        original_size,
        optimized_size,
        saved_bytes,
        saved_percent,
        files_processed: files.len(),
        skeletons_used: skeletons_used.load(Ordering::Relaxed),
    };

    (results, stats)
}

/// Coarse, pre-run estimate (0-100) of expected byte savings, used by
/// the CLI to print a preview before committing to a full optimize
/// pass. Not derived from `approx_tokens` directly, but kept in this
/// module since it reasons about the same options struct.
#[must_use]
pub fn estimate_savings(opts: &OptimizeOptions) -> u8 {
    let mut score: u32 = 0;
    if opts.skeleton_mode {
        score += 60;
    }
    if opts.strip_comments {
        score += 15;
    }
    if opts.compact_data_files {
        score += 10;
    }
    if opts.collapse_empty_lines {
        score += 5;
    }
    if opts.strip_license {
        score += 3;
    }
    if opts.trim_whitespace {
        score += 2;
    }
    score.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_trim_and_collapse() {
        let opts = OptimizeOptions::default();
        let out = optimize_content(Path::new("a.txt"), "a  \n\n\n\nb", &opts, None);
        assert_eq!(out, "a\n\n\nb");
    }

    #[test]
    fn skeleton_mode_falls_through_without_registry() {
        let opts = OptimizeOptions::skeleton();
        let out = optimize_content(Path::new("a.rs"), "fn a() {}  \n", &opts, None);
        assert_eq!(out, "fn a() {}  \n");
    }

    #[test]
    fn estimate_savings_caps_at_100() {
        let opts = OptimizeOptions::aggressive();
        assert!(estimate_savings(&opts) <= 100);
    }

    #[test]
    fn batch_preserves_order_and_sums_sizes() {
        let files = vec![
            (std::path::PathBuf::from("a.txt"), "aaa".to_string()),
            (std::path::PathBuf::from("b.txt"), "bb".to_string()),
        ];
        let opts = OptimizeOptions::default();
        let cancel = CancellationToken::new();
        let (out, stats) = optimize_batch(&files, &opts, None, &cancel);
        assert_eq!(out[0].0, files[0].0);
        assert_eq!(out[1].0, files[1].0);
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.original_size, 5);
    }

    #[test]
    fn approx_tokens_used_elsewhere_sanity() {
        assert_eq!(approx_tokens("abcd"), 1);
    }
}
