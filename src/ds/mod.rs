pub mod count_buckets;
pub mod slot_arena;

#[cfg(any(test, debug_assertions))]
pub use count_buckets::{BucketDebug, CountBucketsSnapshot};
pub use count_buckets::{BucketKeysIter, CountBuckets, CountBucketsIter, DEFAULT_BUCKET_PREALLOC};
pub use slot_arena::{SlotArena, SlotId};
