//! Repository traits for audit operations.

pub mod blobs;
pub mod manifests;
pub mod tags;

pub use blobs::BlobRepo;
pub use manifests::ManifestRepo;
pub use tags::TagRepo;
