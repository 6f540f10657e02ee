use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{Error, Result};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,;:!?\-()]").expect("valid regex"));
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

const MIN_PARAGRAPH_CHARS: usize = 30;
const MIN_CHUNK_CHARS: usize = 20;

#[derive(Debug, Clone)]
pub struct DocumentChunk {
    pub id: String,
    pub doc_id: String,
    pub doc_path: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 300 }
    }
}

/// Collapse whitespace and replace anything but word characters, whitespace
/// and `.,;:!?-()` with spaces.
pub fn clean_text(text: &str) -> String {
    let replaced = DISALLOWED.replace_all(text, " ");
    WHITESPACE.replace_all(&replaced, " ").trim().to_string()
}

/// Split raw text into normalized chunks of roughly `chunk_size` characters.
///
/// Paragraphs (blank-line separated) that fit are kept whole; longer ones are
/// packed sentence by sentence, and a single sentence that does not fit on
/// its own is cut into windows of `chunk_size / 10` words.
pub fn split_into_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let words_per_window = (chunk_size / 10).max(1);

    for raw_paragraph in PARAGRAPH_BREAK.split(text) {
        let paragraph = clean_text(raw_paragraph);
        if paragraph.chars().count() < MIN_PARAGRAPH_CHARS {
            continue;
        }
        if paragraph.chars().count() <= chunk_size {
            chunks.push(paragraph);
            continue;
        }

        let mut current = String::new();
        for sentence in SENTENCE_END.split(&paragraph) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }
            if current.chars().count() + sentence.chars().count() > chunk_size {
                if current.is_empty() {
                    let words: Vec<&str> = sentence.split_whitespace().collect();
                    for window in words.chunks(words_per_window) {
                        chunks.push(window.join(" "));
                    }
                } else {
                    chunks.push(std::mem::take(&mut current).trim().to_string());
                    current = sentence.to_string();
                }
            } else if current.is_empty() {
                current = sentence.to_string();
            } else {
                current.push(' ');
                current.push_str(sentence);
            }
        }
        if !current.is_empty() {
            chunks.push(current.trim().to_string());
        }
    }

    chunks.retain(|c| c.trim().chars().count() > MIN_CHUNK_CHARS);
    chunks
}

#[derive(Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self { chunking_config: ChunkingConfig { chunk_size } }
    }

    /// Chunk every `.txt` file under `data_dir`, in sorted path order.
    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<DocumentChunk>> {
        let files = self.list_txt_files(data_dir);
        if files.is_empty() {
            tracing::warn!(dir = %data_dir.display(), "no .txt files found");
            return Ok(vec![]);
        }
        let mut all_chunks = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!(file = %file_path.display(), "processing file {}/{}", file_index + 1, files.len());
            all_chunks.extend(self.process_file(file_path)?);
        }
        tracing::info!(files = files.len(), chunks = all_chunks.len(), "processed documents");
        Ok(all_chunks)
    }

    pub fn process_file(&self, file_path: &Path) -> Result<Vec<DocumentChunk>> {
        let content = self.read_file_content(file_path)?;
        let doc_id = self.extract_doc_id(file_path);
        Ok(self.chunk_content(&content, &doc_id, file_path))
    }

    pub fn chunk_content(&self, content: &str, doc_id: &str, file_path: &Path) -> Vec<DocumentChunk> {
        let texts = split_into_chunks(content, self.chunking_config.chunk_size);
        let total_chunks = texts.len();
        texts
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| DocumentChunk {
                id: format!("{}:{}", doc_id, chunk_index),
                doc_id: doc_id.to_string(),
                doc_path: file_path.to_string_lossy().to_string(),
                content,
                chunk_index,
                total_chunks,
            })
            .collect()
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        let io_err = |source| Error::Io { path: file_path.display().to_string(), source };
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path).map_err(io_err)?).to_string()),
        }
    }

    fn extract_doc_id(&self, file_path: &Path) -> String {
        file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string())
    }

    fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("txt") { txt_files.push(path.to_path_buf()); }
        }
        txt_files.sort();
        txt_files
    }
}
