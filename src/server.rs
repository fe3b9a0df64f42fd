//! MCP Server implementation using rmcp

use crate::chapters::{
    create_toc_text, outline_to_ranges, split_document, toc_entries, ChapterArtifact,
    Diagnostics, ProcessingResult, Status, TocEntry,
};
use crate::error::Error;
use crate::pdf::{PdfDocument, SourceDocument};
use crate::source::{resolve_base64, resolve_cache, CacheManager, ResolvedPdf};
use anyhow::Result;
use base64::Engine;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// PDF source specification
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum PdfSource {
    /// Base64 encoded PDF data
    Base64 {
        /// Base64 encoded PDF content
        base64: String,
    },
    /// Reference to a cached upload
    CacheRef {
        /// Cache key returned by `extract_toc` with `cache: true`
        cache_key: String,
    },
}

impl<'de> serde::Deserialize<'de> for PdfSource {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let Some(obj) = value.as_object() else {
            return Err(serde::de::Error::custom(format!(
                "Invalid source: expected an object with \"base64\" or \"cache_key\", but got {}",
                json_kind(&value)
            )));
        };

        if let Some(v) = obj.get("base64") {
            if let Some(s) = v.as_str() {
                return Ok(PdfSource::Base64 {
                    base64: s.to_string(),
                });
            }
            return Err(serde::de::Error::custom("\"base64\" must be a string"));
        }
        if let Some(v) = obj.get("cache_key") {
            if let Some(s) = v.as_str() {
                return Ok(PdfSource::CacheRef {
                    cache_key: s.to_string(),
                });
            }
            return Err(serde::de::Error::custom("\"cache_key\" must be a string"));
        }

        let keys: Vec<&String> = obj.keys().collect();
        Err(serde::de::Error::custom(format!(
            "Invalid source: expected an object with \"base64\" or \"cache_key\", but got keys: {:?}",
            keys
        )))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Null => "null",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Resource configuration for the chapter splitter server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum total bytes of cached uploads (default: 512MB)
    pub cache_max_bytes: usize,
    /// Maximum number of cached uploads (default: 100)
    pub cache_max_entries: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cache_max_bytes: 512 * 1024 * 1024, // 512MB
            cache_max_entries: 100,
        }
    }
}

/// Chapter splitter MCP server
#[derive(Clone)]
pub struct PdfServer {
    cache: Arc<RwLock<CacheManager>>,
    tool_router: ToolRouter<Self>,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Request/Response types for split_by_outline
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SplitByOutlineParams {
    /// Source PDF to split
    pub source: PdfSource,
    /// Display name used in messages (default: "input.pdf", or the name given when caching)
    #[serde(default)]
    pub name: Option<String>,
    /// Include base64 chapter content in the response (default: true)
    #[serde(default = "default_true")]
    pub include_data: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ChapterInfo {
    /// File name, e.g. "01_introduction.pdf"
    pub filename: String,
    /// First page in the source document (1-indexed)
    pub first_page: u32,
    pub page_count: u32,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_base64: Option<String>,
}

impl ChapterInfo {
    fn from_artifact(artifact: ChapterArtifact, include_data: bool) -> Self {
        let engine = base64::engine::general_purpose::STANDARD;
        Self {
            size_bytes: artifact.data.len(),
            data_base64: include_data.then(|| engine.encode(&artifact.data)),
            filename: artifact.filename,
            first_page: artifact.first_page + 1,
            page_count: artifact.page_count,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SplitByOutlineResult {
    pub source: String,
    pub status: Status,
    pub message: String,
    pub toc_text: String,
    /// JSON array of top-level entries, as text
    pub toc_json: String,
    pub console_log: String,
    pub warnings: Vec<String>,
    pub chapters: Vec<ChapterInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SplitByOutlineResult {
    fn from_processing(source: String, result: ProcessingResult, include_data: bool) -> Self {
        // Full trace stays in `message`
        let error = (result.status == Status::Error)
            .then(|| result.message.lines().next().unwrap_or_default().to_string());
        Self {
            source,
            status: result.status,
            message: result.message,
            toc_text: result.toc_text,
            toc_json: result.toc_json,
            console_log: result.console_log,
            warnings: result.warnings,
            chapters: result
                .chapters
                .into_iter()
                .map(|chapter| ChapterInfo::from_artifact(chapter, include_data))
                .collect(),
            error,
        }
    }

    fn failed(source: String, error: String) -> Self {
        Self {
            source,
            status: Status::Error,
            message: error.clone(),
            toc_text: String::new(),
            toc_json: String::new(),
            console_log: String::new(),
            warnings: Vec::new(),
            chapters: Vec::new(),
            error: Some(error),
        }
    }
}

// ============================================================================
// Request/Response types for extract_toc
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractTocParams {
    /// Source PDF to inspect
    pub source: PdfSource,
    /// Name remembered with the cached upload
    #[serde(default)]
    pub name: Option<String>,
    /// Cache the source PDF and return a cache_key for split_by_outline
    #[serde(default)]
    pub cache: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PlannedChapter {
    pub slug: String,
    pub filename: String,
    /// 1-indexed, inclusive
    pub first_page: u32,
    /// 1-indexed, inclusive
    pub last_page: u32,
    pub page_count: u32,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ExtractTocResult {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    pub page_count: u32,
    pub toc_text: String,
    /// Top-level entries with 1-indexed pages
    pub entries: Vec<TocEntry>,
    /// Chapters split_by_outline would produce
    pub chapters: Vec<PlannedChapter>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractTocResult {
    fn failed(source: String, error: String) -> Self {
        Self {
            source,
            cache_key: None,
            page_count: 0,
            toc_text: String::new(),
            entries: Vec::new(),
            chapters: Vec::new(),
            warnings: Vec::new(),
            error: Some(error),
        }
    }
}

#[tool_router]
impl PdfServer {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new PdfServer with full configuration
    pub fn with_config(config: ServerConfig) -> Self {
        let cache = CacheManager::new(config.cache_max_entries, config.cache_max_bytes);
        Self {
            cache: Arc::new(RwLock::new(cache)),
            tool_router: Self::tool_router(),
        }
    }

    /// Split a PDF into one PDF per top-level bookmark
    #[tool(
        description = "Split a PDF into chapters using its bookmarks (outline). Each top-level bookmark starts a chapter that runs until the next one; the last chapter runs to the end of the document. Returns a text and JSON table of contents plus one base64 PDF per chapter, named like \"01_introduction.pdf\".

Source format: must be one of {\"base64\": \"...\"} or {\"cache_key\": \"...\"}"
    )]
    async fn split_by_outline(
        &self,
        Parameters(params): Parameters<SplitByOutlineParams>,
    ) -> String {
        let result = self
            .process_split_by_outline(&params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "split_by_outline failed");
                SplitByOutlineResult::failed(Self::source_name(&params.source), e.client_message())
            });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }

    /// Preview the table of contents and chapter plan
    #[tool(
        description = "Read a PDF's bookmarks and report the full table of contents, the top-level entries, and the chapters split_by_outline would produce, without generating them. Set cache=true to keep the PDF and get a cache_key to split it later without re-uploading.

Source format: must be one of {\"base64\": \"...\"} or {\"cache_key\": \"...\"}"
    )]
    async fn extract_toc(&self, Parameters(params): Parameters<ExtractTocParams>) -> String {
        let result = self
            .process_extract_toc(&params)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "extract_toc failed");
                ExtractTocResult::failed(Self::source_name(&params.source), e.client_message())
            });

        serde_json::to_string_pretty(&result).unwrap_or_default()
    }
}

impl PdfServer {
    fn source_name(source: &PdfSource) -> String {
        match source {
            PdfSource::Base64 { .. } => "<base64>".to_string(),
            PdfSource::CacheRef { cache_key } => format!("<cache:{}>", cache_key),
        }
    }

    async fn resolve_source(&self, source: &PdfSource) -> crate::error::Result<ResolvedPdf> {
        match source {
            PdfSource::Base64 { base64 } => resolve_base64(base64),
            PdfSource::CacheRef { cache_key } => resolve_cache(cache_key, &self.cache).await,
        }
    }

    async fn process_split_by_outline(
        &self,
        params: &SplitByOutlineParams,
    ) -> crate::error::Result<SplitByOutlineResult> {
        let resolved = self.resolve_source(&params.source).await?;
        let name = params.name.clone().or(resolved.cached_name);
        let data = resolved.data;

        let result = tokio::task::spawn_blocking(move || split_document(&data, name.as_deref()))
            .await
            .map_err(|e| Error::TaskJoin {
                reason: e.to_string(),
            })?;

        tracing::info!(
            status = ?result.status,
            chapters = result.chapters.len(),
            "split_by_outline finished"
        );

        Ok(SplitByOutlineResult::from_processing(
            Self::source_name(&params.source),
            result,
            params.include_data,
        ))
    }

    async fn process_extract_toc(
        &self,
        params: &ExtractTocParams,
    ) -> crate::error::Result<ExtractTocResult> {
        let resolved = self.resolve_source(&params.source).await?;
        let data = Arc::clone(&resolved.data);

        let mut result = tokio::task::spawn_blocking(move || {
            let doc = PdfDocument::open_bytes(&data)?;
            let mut diagnostics = Diagnostics::new();

            let toc = create_toc_text(&doc, &mut diagnostics);
            let entries = toc_entries(&doc, &mut diagnostics);
            let chapters = outline_to_ranges(&doc, &mut diagnostics)
                .into_iter()
                .map(|range| PlannedChapter {
                    filename: range.filename(),
                    first_page: range.start + 1,
                    last_page: range.end,
                    page_count: range.len(),
                    slug: range.slug,
                })
                .collect();

            Ok::<_, Error>(ExtractTocResult {
                source: String::new(),
                cache_key: None,
                page_count: doc.page_count(),
                toc_text: toc.text,
                entries,
                chapters,
                warnings: diagnostics.into_lines(),
                error: None,
            })
        })
        .await
        .map_err(|e| Error::TaskJoin {
            reason: e.to_string(),
        })??;

        result.source = Self::source_name(&params.source);
        if params.cache {
            let name = params.name.clone().or(resolved.cached_name);
            result.cache_key = self.cache.write().await.insert(resolved.data, name);
            if result.cache_key.is_none() {
                result
                    .warnings
                    .push("Warning: PDF is too large to cache".to_string());
            }
        }

        Ok(result)
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "PDF chapter splitter: use extract_toc to preview a PDF's bookmarks and chapter \
                 plan, then split_by_outline to get one PDF per top-level bookmark."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server with default configuration
pub async fn run_server() -> Result<()> {
    run_server_with_config(ServerConfig::default()).await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    let server = PdfServer::with_config(config);

    tracing::info!("PDF chapter splitter ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
