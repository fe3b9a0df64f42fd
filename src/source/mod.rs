//! Source resolution and caching

pub mod cache;
pub mod resolver;

pub use cache::{CacheManager, CachedSource};
pub use resolver::{resolve_base64, resolve_cache, ResolvedPdf};
