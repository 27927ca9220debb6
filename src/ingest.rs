use crate::parser::is_valid;
use crate::utils::get_extension;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions accepted for books when walking a directory or archive
pub const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "text", "pdf"];

/// A named piece of text pulled from disk or an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub content: String,
}

/// What kind of source is being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Catalog files: supported extensions only, strict UTF-8
    Code,
    /// Books: plain text read lossily, PDFs through text extraction
    Document,
}

impl Mode {
    fn accepts(self, name: &str) -> bool {
        match self {
            Mode::Code => is_valid(name),
            Mode::Document => {
                get_extension(name).is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.as_str()))
            }
        }
    }

    fn decode(self, name: &str, bytes: Vec<u8>) -> Result<String> {
        match self {
            Mode::Code => String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", name)),
            Mode::Document if get_extension(name).as_deref() == Some("pdf") => {
                pdf_extract::extract_text_from_mem(&bytes)
                    .with_context(|| format!("Failed to extract text from PDF: {}", name))
            }
            Mode::Document => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_file(path: &Path, mode: Mode) -> Result<SourceFile> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let filename = file_name(path);
    let content = mode.decode(&filename, bytes)?;
    Ok(SourceFile { filename, content })
}

fn read_zip(path: &Path, mode: Mode) -> Result<Vec<SourceFile>> {
    let file = std::fs::File::open(path).with_context(|| format!("Failed to open ZIP file: {}", path.display()))?;
    let mut archive =
        zip::ZipArchive::new(file).with_context(|| format!("Failed to read ZIP archive: {}", path.display()))?;

    let mut sources = Vec::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping entry {} in {}: {}", i, path.display(), e);
                continue;
            }
        };
        if entry.is_dir() || !mode.accepts(entry.name()) {
            continue;
        }

        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        if let Err(e) = entry.read_to_end(&mut bytes) {
            warn!("Skipping {} in {}: {}", name, path.display(), e);
            continue;
        }

        match mode.decode(&name, bytes) {
            Ok(content) => sources.push(SourceFile { filename: name, content }),
            Err(e) => warn!("Skipping {} in {}: {:#}", name, path.display(), e),
        }
    }

    debug!("Read {} entries from {}", sources.len(), path.display());
    Ok(sources)
}

fn read_dir(path: &Path, mode: Mode) -> Vec<SourceFile> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error accessing entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !mode.accepts(&file_name(entry.path())) {
            continue;
        }

        match read_file(entry.path(), mode) {
            Ok(source) => sources.push(source),
            Err(e) => warn!("Skipping {}: {:#}", entry.path().display(), e),
        }
    }
    sources
}

fn read_with(path: &Path, mode: Mode) -> Result<Vec<SourceFile>> {
    if !path.exists() {
        bail!("Path does not exist: {}", path.display());
    }

    if path.is_dir() {
        Ok(read_dir(path, mode))
    } else if is_zip(path) {
        read_zip(path, mode)
    } else if mode == Mode::Document || mode.accepts(&file_name(path)) {
        Ok(vec![read_file(path, mode)?])
    } else {
        bail!("Unsupported file type: {}", path.display());
    }
}

/// Catalog sources under `path`: a single file, a directory tree or a ZIP
/// archive. Only supported code and markup files are returned.
pub fn read_sources(path: &Path) -> Result<Vec<SourceFile>> {
    read_with(path, Mode::Code)
}

/// Book sources under `path`. A single file is read whatever its extension;
/// directories and archives contribute text and PDF documents only.
pub fn read_documents(path: &Path) -> Result<Vec<SourceFile>> {
    read_with(path, Mode::Document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game.html");
        std::fs::write(&path, "<title>Game</title>").unwrap();

        let sources = read_sources(&path).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].filename, "game.html");
        assert_eq!(sources[0].content, "<title>Game</title>");
    }

    #[test]
    fn test_unsupported_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image.png");
        std::fs::write(&path, "png").unwrap();
        assert!(read_sources(&path).is_err());
    }

    #[test]
    fn test_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_sources(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_read_directory_filters_extensions() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        std::fs::write(temp_dir.path().join("a.js"), "let a = 1;").unwrap();
        std::fs::write(temp_dir.path().join("nested/b.py"), "import os").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "skip me").unwrap();
        std::fs::write(temp_dir.path().join("bad.css"), [0xff, 0xfe, 0x00]).unwrap();

        let sources = read_sources(temp_dir.path()).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.filename.as_str()).collect();
        assert_eq!(names, vec!["a.js", "b.py"]);
    }

    #[test]
    fn test_read_zip_archive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("apps.zip");
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let options = zip::write::FileOptions::default();
            zip.start_file("apps/timer.html", options).unwrap();
            zip.write_all(b"<h1>Timer</h1>").unwrap();
            zip.start_file("apps/readme.txt", options).unwrap();
            zip.write_all(b"not an app").unwrap();
            zip.finish().unwrap();
        }

        let sources = read_sources(&path).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].filename, "apps/timer.html");
        assert_eq!(sources[0].content, "<h1>Timer</h1>");

        let documents = read_documents(&path).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].filename, "apps/readme.txt");
    }

    #[test]
    fn test_read_documents_single_file_any_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.rtf");
        std::fs::write(&path, b"Gate 1 text \xff").unwrap();

        let documents = read_documents(&path).unwrap();
        assert_eq!(documents.len(), 1);
        assert!(documents[0].content.starts_with("Gate 1 text"));
    }
}
