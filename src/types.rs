// Fast hash sets using AHash instead of the default SipHash.
// Import these throughout the codebase with `use crate::types::HashSet`.
// Also import `HashSetExt` when you need `::new()` or `::with_capacity()`.
pub(crate) type HashSet<K> = ahash::HashSet<K>;
pub(crate) use ahash::HashSetExt;
