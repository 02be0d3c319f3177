//! Cache store adapters.

mod disk;

pub use disk::DiskCacheStore;
