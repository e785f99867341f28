use crate::storage::Blob;

use std::time::Instant;

use uuid::Uuid;

/// Chunks accumulated for one recording.
#[derive(Debug)]
pub struct RecordingSession {
    id: Uuid,
    mime_type: String,
    chunks: Vec<Vec<u8>>,
    started_at: Instant,
}

impl RecordingSession {
    /// Start an empty session.
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mime_type: mime_type.into(),
            chunks: Vec::new(),
            started_at: Instant::now(),
        }
    }

    /// Append a chunk in arrival order. Empty chunks are dropped.
    ///
    /// Returns whether the chunk was kept.
    pub fn append(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    /// Concatenate every chunk into one blob tagged with the MIME type.
    pub fn to_blob(&self) -> Blob {
        let total: usize = self.chunks.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(total);
        for chunk in &self.chunks {
            bytes.extend_from_slice(chunk);
        }
        Blob::new(bytes, self.mime_type.clone())
    }

    /// Drop every chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Session id for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Configured MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Chunks kept so far.
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// When recording started.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}
