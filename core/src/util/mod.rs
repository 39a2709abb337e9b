pub mod chars;

/// FxHash map for small keys such as `Arc<str>` names and file ids.
pub type FastHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

pub type FastHashSet<K> = rustc_hash::FxHashSet<K>;
