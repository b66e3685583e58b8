use indexmap::IndexMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Where corrected documents end up. The batch driver hands each document
/// over exactly once, keyed by its generated output name.
pub trait DocumentSink: Debug {
    fn accept(&mut self, output_name: &str, bytes: &[u8]) -> anyhow::Result<()>;
}

/// Writes each document as a file under a directory.
#[derive(Debug)]
pub struct FileDocumentSink {
    directory_path: PathBuf,
}

impl FileDocumentSink {
    pub fn new(directory_path: PathBuf) -> Self {
        Self { directory_path }
    }
}

impl DocumentSink for FileDocumentSink {
    fn accept(&mut self, output_name: &str, bytes: &[u8]) -> anyhow::Result<()> {
        let mut writer = BufWriter::new(File::create(self.directory_path.join(output_name))?);
        writer.write_all(bytes)?;
        Ok(())
    }
}

/// Collects documents in memory, preserving the order they were produced in.
#[derive(Debug, Default)]
pub struct MemoryDocumentSink {
    documents: IndexMap<String, Vec<u8>>,
}

impl MemoryDocumentSink {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn documents(&self) -> &IndexMap<String, Vec<u8>> {
        &self.documents
    }

    pub fn document(&self, output_name: &str) -> Option<&[u8]> {
        self.documents.get(output_name).map(Vec::as_slice)
    }
}

impl DocumentSink for MemoryDocumentSink {
    fn accept(&mut self, output_name: &str, bytes: &[u8]) -> anyhow::Result<()> {
        self.documents.insert(output_name.to_string(), bytes.to_vec());
        Ok(())
    }
}
