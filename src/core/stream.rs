//! Filepath: src/core/stream.rs
//! The streaming context builder: assembles a project's selected
//! files into an artifact, choosing between an in-memory build and a
//! spill-file-backed streaming build based on estimated memory risk.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use memchr::memchr_iter;
use tempfile::NamedTempFile;

use crate::core::error::{PipelineError, Result};
use crate::core::format::Entry;
use crate::core::optimize::skeleton::AnalyzerRegistry;
use crate::core::optimize::{optimize_content, OptimizeOptions};
use crate::core::util::{approx_tokens, to_slash_path, CancellationToken};

const LOW_RISK_MAX: u64 = 10 * 1024 * 1024;
const MEDIUM_RISK_MAX: u64 = 50 * 1024 * 1024;
const HIGH_RISK_MAX: u64 = 200 * 1024 * 1024;

const MAX_PAGE_LINES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRisk {
    Low,
    Medium,
    High,
    Critical,
}

/// Classify the memory risk of building `total_bytes` of selected
/// content in memory. High/Critical pushes the builder into streaming
/// mode.
#[must_use]
pub fn assess_memory_risk(total_bytes: u64) -> MemoryRisk {
    if total_bytes <= LOW_RISK_MAX {
        MemoryRisk::Low
    } else if total_bytes <= MEDIUM_RISK_MAX {
        MemoryRisk::Medium
    } else if total_bytes <= HIGH_RISK_MAX {
        MemoryRisk::High
    } else {
        MemoryRisk::Critical
    }
}

/// Lexically normalize a path: resolve `.`/`..` components without
/// touching the filesystem (no symlink resolution).
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve `candidate` to an absolute, lexically clean path and
/// require it to live under `project_root` (or equal it). Used to
/// guard every caller-supplied path before it is read.
pub fn guard_path(project_root: &Path, candidate: &Path) -> Result<PathBuf> {
    let abs_root = if project_root.is_absolute() {
        project_root.to_path_buf()
    } else {
        std::env::current_dir()?.join(project_root)
    };
    let abs_candidate = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        abs_root.join(candidate)
    };

    let clean_root = clean_path(&abs_root);
    let clean_candidate = clean_path(&abs_candidate);

    if clean_candidate == clean_root || clean_candidate.starts_with(&clean_root) {
        Ok(clean_candidate)
    } else {
        Err(PipelineError::InvalidArgument("path traversal not allowed".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ContextSummary {
    pub id: String,
    pub project_path: String,
    pub file_count: usize,
    pub total_size: u64,
    pub token_count: usize,
    pub created_at: String,
    pub status: BuildStatus,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ContextChunk {
    pub start_line: usize,
    pub line_count: usize,
    pub text: String,
    pub eof: bool,
}

/// A handle over a spilled artifact supporting paginated reads. The
/// spill file is removed when this value (and its `NamedTempFile`)
/// drops.
pub struct StreamingContext {
    pub id: String,
    pub project_path: String,
    pub total_characters: usize,
    pub token_count: usize,
    line_index: Vec<(u64, u64)>,
    spill: NamedTempFile,
}

impl StreamingContext {
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.line_index.len()
    }

    /// Paginated read: `start_line` is 0-based, `line_count` must be
    /// in `1..=1000`.
    pub fn get_context_content(
        &mut self,
        start_line: usize,
        line_count: usize,
    ) -> Result<ContextChunk> {
        if line_count == 0 || line_count > MAX_PAGE_LINES {
            return Err(PipelineError::InvalidArgument(format!(
                "lineCount must be in 1..={MAX_PAGE_LINES}"
            )));
        }
        let total = self.total_lines();
        if start_line >= total && total > 0 {
            return Err(PipelineError::InvalidArgument(
                "startLine out of range".to_string(),
            ));
        }
        if total == 0 {
            return Ok(ContextChunk { start_line, line_count: 0, text: String::new(), eof: true });
        }

        let last_line = (start_line + line_count).min(total) - 1;
        let (start_off, _) = self.line_index[start_line];
        let (last_off, last_len) = self.line_index[last_line];
        let end_off = last_off + last_len;

        self.spill.as_file_mut().seek(SeekFrom::Start(start_off))?;
        let mut buf = vec![0u8; (end_off - start_off) as usize];
        self.spill.as_file_mut().read_exact(&mut buf)?;
        let text = String::from_utf8_lossy(&buf).into_owned();

        let delivered = last_line - start_line + 1;
        let eof = start_line + delivered >= total;

        Ok(ContextChunk { start_line, line_count: delivered, text, eof })
    }
}

pub enum BuildResult {
    InMemory { summary: ContextSummary, artifact: String },
    Streaming(StreamingContext),
}

fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("ctx-{n:016x}")
}

fn header_line(path: &str) -> String {
    format!("--- File: {path} ---\n")
}

struct LineIndexBuilder {
    offset: u64,
    pending_start: u64,
    pending_len: u64,
    index: Vec<(u64, u64)>,
}

impl LineIndexBuilder {
    fn new() -> Self {
        Self { offset: 0, pending_start: 0, pending_len: 0, index: Vec::new() }
    }

    fn feed(&mut self, chunk: &[u8]) {
        let mut last_cut = 0usize;
        for nl in memchr_iter(b'\n', chunk) {
            let line_len = self.pending_len + (nl - last_cut) as u64 + 1;
            self.index.push((self.pending_start, line_len));
            last_cut = nl + 1;
            self.pending_start = self.offset + last_cut as u64;
            self.pending_len = 0;
        }
        self.pending_len += (chunk.len() - last_cut) as u64;
        self.offset += chunk.len() as u64;
    }

    fn finish(mut self) -> Vec<(u64, u64)> {
        if self.pending_len > 0 {
            self.index.push((self.pending_start, self.pending_len));
        }
        self.index
    }
}

/// Build a streaming context: writes each selected file's header and
/// optimized content into a spill file while maintaining a byte-level
/// line index.
pub fn build_streaming(
    project_path: &Path,
    files: &[(PathBuf, String)],
    opts: &OptimizeOptions,
    registry: Option<&AnalyzerRegistry>,
    cancel: &CancellationToken,
) -> Result<StreamingContext> {
    let mut spill = NamedTempFile::new()?;
    let mut builder = LineIndexBuilder::new();
    let mut total_characters = 0usize;

    for (path, content) in files {
        if cancel.is_cancelled() {
            drop(spill);
            return Err(PipelineError::Cancelled);
        }
        let slash_path = to_slash_path(path);
        let header = header_line(&slash_path);
        let optimized = optimize_content(path, content, opts, registry);

        spill.write_all(header.as_bytes())?;
        builder.feed(header.as_bytes());

        spill.write_all(optimized.as_bytes())?;
        builder.feed(optimized.as_bytes());

        let sep = "\n\n";
        spill.write_all(sep.as_bytes())?;
        builder.feed(sep.as_bytes());

        total_characters += header.chars().count() + optimized.chars().count() + 2;
    }

    spill.flush()?;
    let line_index = builder.finish();

    Ok(StreamingContext {
        id: generate_id(),
        project_path: to_slash_path(project_path),
        total_characters,
        token_count: (total_characters + 3) / 4,
        line_index,
        spill,
    })
}

/// Validate the project root and every selected path, assess memory
/// risk, and build either an in-memory artifact or a streaming one.
pub fn build_context(
    project_path: &Path,
    selected_files: &[PathBuf],
    opts: &OptimizeOptions,
    registry: Option<&AnalyzerRegistry>,
    cancel: &CancellationToken,
) -> Result<BuildResult> {
    if !project_path.is_dir() {
        return Err(PipelineError::InvalidArgument(
            "projectPath is not an accessible directory".to_string(),
        ));
    }

    let mut total_bytes = 0u64;
    let mut loaded: Vec<(PathBuf, String)> = Vec::with_capacity(selected_files.len());
    for candidate in selected_files {
        let guarded = guard_path(project_path, candidate)?;
        let content = std::fs::read_to_string(&guarded)?;
        total_bytes += content.len() as u64;
        let rel = guarded.strip_prefix(project_path).unwrap_or(&guarded).to_path_buf();
        loaded.push((rel, content));
    }

    let risk = assess_memory_risk(total_bytes);

    if matches!(risk, MemoryRisk::High | MemoryRisk::Critical) {
        let ctx = build_streaming(project_path, &loaded, opts, registry, cancel)?;
        return Ok(BuildResult::Streaming(ctx));
    }

    let mut entries = Vec::with_capacity(loaded.len());
    for (path, content) in &loaded {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let optimized = optimize_content(path, content, opts, registry);
        entries.push(Entry { path: to_slash_path(path), content: optimized });
    }

    let artifact = crate::core::format::format_plain(&entries);
    let token_count = approx_tokens(&artifact);

    let summary = ContextSummary {
        id: generate_id(),
        project_path: to_slash_path(project_path),
        file_count: entries.len(),
        total_size: total_bytes,
        token_count,
        created_at: chrono::Utc::now().to_rfc3339(),
        status: BuildStatus::Completed,
        metadata: HashMap::new(),
    };

    Ok(BuildResult::InMemory { summary, artifact })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_thresholds_classify_correctly() {
        assert_eq!(assess_memory_risk(1024), MemoryRisk::Low);
        assert_eq!(assess_memory_risk(20 * 1024 * 1024), MemoryRisk::Medium);
        assert_eq!(assess_memory_risk(100 * 1024 * 1024), MemoryRisk::High);
        assert_eq!(assess_memory_risk(500 * 1024 * 1024), MemoryRisk::Critical);
    }

    #[test]
    fn clean_path_resolves_parent_components() {
        let p = clean_path(Path::new("/a/b/../c/./d"));
        assert_eq!(p, PathBuf::from("/a/c/d"));
    }

    #[test]
    fn guard_path_rejects_traversal_outside_root() {
        let root = Path::new("/project/root");
        let outside = Path::new("/project/root/../../etc/passwd");
        assert!(guard_path(root, outside).is_err());
    }

    #[test]
    fn guard_path_allows_project_root_itself() {
        let root = Path::new("/project/root");
        let result = guard_path(root, Path::new("/project/root")).unwrap();
        assert_eq!(result, PathBuf::from("/project/root"));
    }

    #[test]
    fn streaming_round_trip_over_pages() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![(
            PathBuf::from("a.txt"),
            (0..50).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n"),
        )];
        let opts = OptimizeOptions::default();
        let cancel = CancellationToken::new();
        let mut ctx = build_streaming(dir.path(), &files, &opts, None, &cancel).unwrap();

        let total = ctx.total_lines();
        let mut reassembled = String::new();
        let mut start = 0usize;
        loop {
            let page = ctx.get_context_content(start, 10).unwrap();
            reassembled.push_str(&page.text);
            start += page.line_count;
            if page.eof || start >= total {
                break;
            }
        }
        assert!(reassembled.contains("line 0"));
        assert!(reassembled.contains("line 49"));
    }

    #[test]
    fn page_size_over_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![(PathBuf::from("a.txt"), "x".to_string())];
        let opts = OptimizeOptions::default();
        let cancel = CancellationToken::new();
        let mut ctx = build_streaming(dir.path(), &files, &opts, None, &cancel).unwrap();
        assert!(ctx.get_context_content(0, 1001).is_err());
    }
}
