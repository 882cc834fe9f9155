//! Webscout CLI - web search and documentation crawling from the command line

mod mcp;

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use webscout::{process_request, ProcessRequest, ProcessResponse};

/// Environment variable holding a raw JSON request (legacy interface)
const JSON_ENV_VAR: &str = "WEBSCOUT_JSON";

/// Webscout - web search and documentation crawling tool
#[derive(Parser, Debug)]
#[command(name = "webscout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search the web for a query
    #[arg(long, short = 's', value_name = "QUERY", conflicts_with = "docs")]
    search: Option<String>,

    /// Crawl a documentation site starting from a seed URL
    #[arg(long, short = 'd', value_name = "URL")]
    docs: Option<String>,

    /// Maximum number of results (search default 5; docs default and cap 10)
    #[arg(long, short = 'l', value_name = "N")]
    limit: Option<u64>,

    /// Maximum snippet length in characters (search mode, default 300)
    #[arg(long, value_name = "N")]
    snippet_len: Option<u64>,

    /// Maximum content length in characters per page (default 2000)
    #[arg(long, alias = "content-limit", value_name = "N")]
    content_len: Option<u64>,

    /// Skip page content extraction (docs mode)
    #[arg(long)]
    no_content: bool,

    /// Write the JSON response to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<String>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Raw JSON request, e.g. '{"mode":"search","query":"..."}' (legacy)
    #[arg(value_name = "JSON")]
    json_input: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Mcp) = cli.command {
        mcp::run_server().await;
        return;
    }

    let request = match resolve_request(&cli) {
        Ok(req) => req,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!("Usage: webscout --search <QUERY> | --docs <URL>");
            eprintln!("   or: webscout '{{\"mode\":\"search\",\"query\":\"...\"}}'");
            eprintln!("   or: webscout mcp");
            std::process::exit(1);
        }
    };

    print_progress(&request);

    match process_request(request).await {
        Ok(response) => emit_response(&response, cli.output.as_deref(), cli.compact),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Resolve the request from flags, the positional JSON argument, the
/// environment, or piped stdin, in that order of precedence
fn resolve_request(cli: &Cli) -> Result<ProcessRequest, String> {
    if cli.search.is_some() || cli.docs.is_some() {
        return request_from_flags(cli);
    }
    if let Some(ref raw) = cli.json_input {
        return parse_json_request(raw);
    }
    if let Ok(raw) = std::env::var(JSON_ENV_VAR) {
        return parse_json_request(&raw);
    }
    if !io::stdin().is_terminal() {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        if !raw.trim().is_empty() {
            return parse_json_request(raw.trim());
        }
    }
    Err("no request given".to_string())
}

fn request_from_flags(cli: &Cli) -> Result<ProcessRequest, String> {
    let mut request = if let Some(ref query) = cli.search {
        ProcessRequest::search(query)
    } else if let Some(ref url) = cli.docs {
        if cli.limit.is_some_and(|l| l > 10) {
            return Err("docs mode supports at most 10 results".to_string());
        }
        ProcessRequest::docs(url)
    } else {
        return Err("no request given".to_string());
    };

    request.limit = cli.limit;
    request.snippet_len = cli.snippet_len;
    if let Some(len) = cli.content_len {
        request.content_len = Some(Some(len));
        request.content_limit = Some(Some(len));
    }
    if cli.no_content {
        request.include_content = Some(false);
    }
    Ok(request)
}

fn parse_json_request(raw: &str) -> Result<ProcessRequest, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON request: {}", e))
}

fn print_progress(request: &ProcessRequest) {
    match request.mode.as_str() {
        "search" => {
            if let Some(ref query) = request.query {
                eprintln!("Searching for: {}", query);
            }
        }
        "docs" => {
            if let Some(ref url) = request.url {
                eprintln!("Crawling docs from: {}", url);
            }
        }
        _ => {}
    }
}

fn emit_response(response: &ProcessResponse, output: Option<&str>, compact: bool) {
    let json = render_json(response, compact);

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Wrote response to {}", path);
        }
        None => writeln_safe(&json),
    }
}

fn render_json(response: &ProcessResponse, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(response)
    } else {
        serde_json::to_string_pretty(response)
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error serializing response: {}", e);
        std::process::exit(1);
    })
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webscout::{DocsResponse, SearchResponse};

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("webscout").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_search_flags_build_request() {
        let cli = cli(&["--search", "rust async", "--limit", "3", "--snippet-len", "100"]);
        let req = request_from_flags(&cli).unwrap();

        assert_eq!(req.mode, "search");
        assert_eq!(req.query.as_deref(), Some("rust async"));
        assert_eq!(req.limit, Some(3));
        assert_eq!(req.snippet_len, Some(100));
    }

    #[test]
    fn test_docs_flags_build_request() {
        let cli = cli(&["--docs", "https://example.com/docs", "--no-content"]);
        let req = request_from_flags(&cli).unwrap();

        assert_eq!(req.mode, "docs");
        assert_eq!(req.url.as_deref(), Some("https://example.com/docs"));
        assert_eq!(req.include_content, Some(false));
        assert!(req.limit.is_none());
    }

    #[test]
    fn test_docs_limit_above_cap_rejected() {
        let cli = cli(&["--docs", "https://example.com/docs", "--limit", "11"]);
        let err = request_from_flags(&cli).unwrap_err();
        assert!(err.contains("at most 10"));
    }

    #[test]
    fn test_content_len_flag_sets_both_fields() {
        let cli = cli(&["--search", "q", "--content-len", "500"]);
        let req = request_from_flags(&cli).unwrap();
        assert_eq!(req.content_len, Some(Some(500)));
        assert_eq!(req.content_limit, Some(Some(500)));
    }

    #[test]
    fn test_search_and_docs_conflict() {
        let result = Cli::try_parse_from(["webscout", "--search", "q", "--docs", "u"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_legacy_json_parses() {
        let req = parse_json_request(r#"{"mode":"docs","url":"https://example.com/docs"}"#).unwrap();
        assert_eq!(req.mode, "docs");
        assert_eq!(req.url.as_deref(), Some("https://example.com/docs"));
    }

    #[test]
    fn test_legacy_json_rejects_garbage() {
        assert!(parse_json_request("not json").is_err());
    }

    #[test]
    fn test_render_json_pretty_and_compact() {
        let response = ProcessResponse::Search(SearchResponse {
            query: "q".to_string(),
            results: Vec::new(),
        });

        let compact = render_json(&response, true);
        assert_eq!(compact, r#"{"query":"q","results":[]}"#);

        let pretty = render_json(&response, false);
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_docs_response_renders_untagged() {
        let response = ProcessResponse::Docs(DocsResponse {
            base_url: "https://example.com/docs".to_string(),
            results: Vec::new(),
        });
        let json = render_json(&response, true);
        assert!(json.starts_with(r#"{"base_url":"#));
    }
}
