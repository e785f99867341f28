mod blob;
mod filename;
mod sink;
mod target;
mod write_scope;

pub(crate) use write_scope::WriteScope;

pub use {
    blob::Blob,
    filename::{FALLBACK_EXTENSION, extension_for_mime, recording_filename},
    sink::{PersistOutcome, StorageSink},
    target::StorageTarget,
};
