//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes sanitizing, cropping and reply composition over stdio so an
//! assistant can produce messages Telegram accepts under MarkdownV2.
//!
//! # Architecture
//!
//! The MCP server is a presentation layer. It wraps the same core library
//! that the CLI commands use, and every `#[tool]` method delegates to it.

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use tgmark_core::{
    ReplyOptions, compose_reply, crop_report, escape_url, sanitize, sanitize_and_crop,
};


/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `sanitize` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SanitizeParams {
    /// Raw text to escape for MarkdownV2.
    pub text: String,
}

/// Parameters for the `escape_url` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct EscapeUrlParams {
    /// Link target to escape.
    pub url: String,
}

/// Parameters for the `crop` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CropParams {
    /// Sanitized text to crop.
    pub text: String,
    /// Maximum length in chars.
    pub max: usize,
    /// Sanitize the input first and re-sanitize the result.
    #[serde(default)]
    pub sanitize: bool,
}

/// Parameters for the `render_reply` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RenderReplyParams {
    /// Raw reply body.
    pub text: String,
    /// Source URL linked in the footer.
    pub source_url: Option<String>,
    /// Footer link text.
    pub label: Option<String>,
    /// Message limit in chars (at most 4096).
    pub limit: Option<usize>,
}

/// MCP server exposing tgmark to AI assistants.
#[derive(Clone)]
pub struct TgmarkServer {
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
    max_input: Option<usize>,
    reply: ReplyOptions,
}

impl Default for TgmarkServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl TgmarkServer {
    /// Create a server with default limits.
    pub fn new() -> Self {
        Self::with_limits(
            Some(tgmark_core::DEFAULT_MAX_INPUT_BYTES),
            ReplyOptions::default(),
        )
    }

    /// Create a server with an input cap and reply defaults.
    pub fn with_limits(max_input: Option<usize>, reply: ReplyOptions) -> Self {
        Self {
            tool_router: Self::tool_router(),
            max_input,
            reply,
        }
    }

    fn check_input(&self, text: &str) -> Result<(), McpError> {
        match self.max_input {
            Some(max) if text.len() > max => Err(McpError::invalid_params(
                format!("input too large: {} bytes (limit: {max} bytes)", text.len()),
                None,
            )),
            _ => Ok(()),
        }
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "char_limit": self.reply.limit,
        });

        let text = if params.format == "json" {
            serde_json::to_string_pretty(&info)
                .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Escape text for MarkdownV2.
    #[tool(
        description = "Escape text for Telegram MarkdownV2. Keeps bold, italic, underline, strikethrough, spoiler, code, links, quotes and custom emoji; escapes everything else."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn sanitize(
        &self,
        Parameters(params): Parameters<SanitizeParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "sanitize", len = params.text.len(), "executing MCP tool");
        self.check_input(&params.text)?;

        let text = sanitize(&params.text);

        tracing::info!(tool = "sanitize", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Escape a link target.
    #[tool(description = "Escape a URL for use inside a MarkdownV2 inline link: ( ) and \\ get a backslash.")]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn escape_url(
        &self,
        Parameters(params): Parameters<EscapeUrlParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "escape_url", "executing MCP tool");
        self.check_input(&params.url)?;

        let text = escape_url(&params.url);

        tracing::info!(tool = "escape_url", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Crop sanitized text.
    #[tool(
        description = "Crop sanitized MarkdownV2 text to a char budget at a word boundary, escaping markers left unpaired and appending an escaped ellipsis. Returns JSON."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", max = params.max))]
    fn crop(&self, Parameters(params): Parameters<CropParams>) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "crop", sanitize = params.sanitize, "executing MCP tool");
        self.check_input(&params.text)?;

        let report = if params.sanitize {
            sanitize_and_crop(&params.text, params.max)
        } else {
            crop_report(&params.text, params.max)
        };

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(tool = "crop", changed = report.changed, "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Compose a reply with a source footer.
    #[tool(
        description = "Sanitize a reply body, crop it so it fits a Telegram message together with an optional [src](url) footer, and return JSON with the final text."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn render_reply(
        &self,
        Parameters(params): Parameters<RenderReplyParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "render_reply", limit = ?params.limit, "executing MCP tool");
        self.check_input(&params.text)?;

        let options = ReplyOptions {
            limit: params.limit.unwrap_or(self.reply.limit),
            label: params.label.unwrap_or_else(|| self.reply.label.clone()),
        };
        let reply = compose_reply(&params.text, params.source_url.as_deref(), &options)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let json = serde_json::to_string_pretty(&reply)
            .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;

        tracing::info!(
            tool = "render_reply",
            cropped = reply.cropped,
            length = reply.length,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for TgmarkServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Run reply text through `render_reply` (or `sanitize`) before sending it with parse_mode MarkdownV2.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}
