//! Turns a tool's `source` argument into PDF bytes

use crate::error::{Error, Result};
use crate::source::CacheManager;
use base64::Engine;
use std::sync::Arc;
use tokio::sync::RwLock;

/// PDF bytes ready for splitting
#[derive(Debug, Clone)]
pub struct ResolvedPdf {
    pub data: Arc<Vec<u8>>,
    /// Name remembered with a cached upload
    pub cached_name: Option<String>,
}

fn check_header(data: &[u8]) -> Result<()> {
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: "Decoded data is not a valid PDF file".to_string(),
        });
    }
    Ok(())
}

/// Decode base64 PDF content
pub fn resolve_base64(base64_data: &str) -> Result<ResolvedPdf> {
    let engine = base64::engine::general_purpose::STANDARD;
    let data = engine.decode(base64_data.trim())?;
    check_header(&data)?;

    Ok(ResolvedPdf {
        data: Arc::new(data),
        cached_name: None,
    })
}

/// Look up a previously cached upload
pub async fn resolve_cache(
    cache_key: &str,
    cache: &Arc<RwLock<CacheManager>>,
) -> Result<ResolvedPdf> {
    let cached = cache
        .read()
        .await
        .get(cache_key)
        .ok_or_else(|| Error::CacheKeyNotFound {
            key: cache_key.to_string(),
        })?;

    Ok(ResolvedPdf {
        data: cached.data,
        cached_name: cached.name,
    })
}
