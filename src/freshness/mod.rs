//! Content hashes for rendered artifacts and build-to-build diffs.

mod hash;
mod table;

pub use hash::{ContentHash, hash_bytes, hash_file};
pub use table::{HashTable, changed_outputs};
