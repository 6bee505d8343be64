//! Filepath: src/core/classify.rs
//! Content classification: extension table first, magic-byte probe
//! second, printable-ratio heuristic last. Never opens the file
//! itself — the caller supplies the name and a content sample.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Binary,
}

const TEXT_EXTENSIONS: &[&str] = &[
    "rs", "py", "go", "js", "jsx", "ts", "tsx", "java", "kt", "c", "h", "cpp", "cc", "cxx", "hpp",
    "cs", "rb", "php", "sh", "bash", "zsh", "fish", "ps1", "sql", "yaml", "yml", "json", "toml",
    "ini", "cfg", "conf", "md", "markdown", "rst", "txt", "html", "htm", "xml", "css", "scss",
    "sass", "less", "vue", "svelte", "swift", "scala", "clj", "ex", "exs", "erl", "hs", "lua",
    "pl", "r", "jl", "dart", "proto", "graphql", "gql", "csv", "tsv", "env", "gitignore",
    "dockerignore", "editorconfig", "lock",
];

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "avif", "zip", "tar", "gz", "bz2",
    "xz", "7z", "rar", "exe", "dll", "so", "dylib", "bin", "o", "a", "class", "jar", "pdf", "doc",
    "docx", "xls", "xlsx", "ppt", "pptx", "ttf", "otf", "woff", "woff2", "mp3", "mp4", "wav",
    "mkv", "mov", "avi", "flac", "ogg", "sqlite", "db", "pyc", "wasm",
];

/// Extensionless basenames that are known text.
const TEXT_BASENAMES: &[&str] = &[
    "Makefile", "Dockerfile", "Rakefile", "Gemfile", "Procfile", "LICENSE", "README", "CHANGELOG",
    "AUTHORS", "CONTRIBUTING",
];

const MMAP_PROBE_SAMPLE: usize = 8192;

fn extension_of(name: &str) -> Option<&str> {
    let base = name.rsplit('/').next().unwrap_or(name);
    if TEXT_BASENAMES.iter().any(|b| *b == base) {
        return None;
    }
    let (_, ext) = base.rsplit_once('.')?;
    if ext.is_empty() || ext == base {
        return None;
    }
    Some(ext)
}

fn detect_by_extension(name: &str) -> Option<ContentType> {
    let base = name.rsplit('/').next().unwrap_or(name);
    if TEXT_BASENAMES.iter().any(|b| *b == base) {
        return Some(ContentType::Text);
    }
    let ext = extension_of(name)?.to_ascii_lowercase();
    if TEXT_EXTENSIONS.iter().any(|e| *e == ext) {
        return Some(ContentType::Text);
    }
    if BINARY_EXTENSIONS.iter().any(|e| *e == ext) {
        return Some(ContentType::Binary);
    }
    None
}

type Magic = (&'static [u8], usize);

const MAGIC_TABLE: &[Magic] = &[
    (b"\x89PNG\r\n\x1a\n", 0),
    (b"\xFF\xD8\xFF", 0),
    (b"GIF87a", 0),
    (b"GIF89a", 0),
    (b"PK\x03\x04", 0),
    (b"PK\x05\x06", 0),
    (b"PK\x07\x08", 0),
    (b"Rar!\x1a\x07", 0),
    (b"\x1F\x8B", 0),
    (b"BZh", 0),
    (b"MZ", 0),
    (b"\x7FELF", 0),
    (b"\xCA\xFE\xBA\xBE", 0),
    (b"%PDF", 0),
    (b"\x00\x00\x01\x00", 0),
    (b"OTTO", 0),
    (b"wOFF", 0),
    (b"wOF2", 0),
    (b"ID3", 0),
    (b"\x1A\x45\xDF\xA3", 0),
    (b"SQLite format 3\x00", 0),
];

fn match_magic(bytes: &[u8]) -> Option<ContentType> {
    for (sig, offset) in MAGIC_TABLE {
        if bytes.len() >= offset + sig.len() && &bytes[*offset..*offset + sig.len()] == *sig {
            return Some(ContentType::Binary);
        }
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        return Some(ContentType::Binary);
    }
    if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
        return Some(ContentType::Binary);
    }
    None
}

/// Probe raw bytes with no extension hint available.
#[must_use]
pub fn detect_by_content(bytes: &[u8]) -> ContentType {
    if bytes.is_empty() {
        return ContentType::Text;
    }
    if let Some(ct) = match_magic(bytes) {
        return ct;
    }
    let sample = &bytes[..bytes.len().min(MMAP_PROBE_SAMPLE)];
    if sample.contains(&0) {
        return ContentType::Binary;
    }
    match std::str::from_utf8(sample) {
        Err(_) => ContentType::Binary,
        Ok(text) => {
            let non_printable = text
                .chars()
                .filter(|c| !c.is_ascii_graphic() && !matches!(c, ' ' | '\t' | '\n' | '\r'))
                .count();
            let total = text.chars().count().max(1);
            if (non_printable * 100) / total > 10 {
                ContentType::Binary
            } else {
                ContentType::Text
            }
        }
    }
}

/// Classify a file by name (extension / well-known basename) first,
/// falling back to content inspection when the extension is unknown.
#[must_use]
pub fn classify(name: &str, bytes: &[u8]) -> ContentType {
    detect_by_extension(name).unwrap_or_else(|| detect_by_content(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_text_extension_short_circuits_probe() {
        assert_eq!(classify("main.rs", &[0u8; 100]), ContentType::Text);
    }

    #[test]
    fn known_binary_extension_short_circuits_probe() {
        assert_eq!(classify("photo.png", b"not actually png bytes"), ContentType::Binary);
    }

    #[test]
    fn png_magic_detected_without_extension() {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        assert_eq!(classify("mystery", &bytes), ContentType::Binary);
    }

    #[test]
    fn empty_file_is_text() {
        assert_eq!(classify("mystery", b""), ContentType::Text);
    }

    #[test]
    fn nul_byte_forces_binary() {
        assert_eq!(classify("mystery", b"abc\0def"), ContentType::Binary);
    }

    #[test]
    fn plain_prose_is_text() {
        assert_eq!(
            classify("mystery", b"the quick brown fox jumps over the lazy dog"),
            ContentType::Text
        );
    }

    #[test]
    fn known_basename_without_extension_is_text() {
        assert_eq!(classify("Dockerfile", &[]), ContentType::Text);
    }
}
