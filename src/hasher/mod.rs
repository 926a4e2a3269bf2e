pub mod index;
pub mod xxhash;

pub use index::{Deduplicator, FingerprintIndex};
pub use xxhash::{fingerprint, Fingerprint};
