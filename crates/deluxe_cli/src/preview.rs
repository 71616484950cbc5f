use std::collections::HashMap;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use deluxe_core::assemble::{AssembleError, assemble_collection};
use deluxe_core::delivery::{HOME_SLUG, PageQuery};
use deluxe_core::templates::render_page_html;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{error, info, warn};

use crate::client::EntrySource;

pub const PREVIEW_JSON_PATH: &str = "/api/preview";
pub const PREVIEW_HOME_PATH: &str = "/api/preview/home";

type BoxedResponse = Response<Box<dyn Read + Send>>;

pub struct PreviewOpts {
    pub host: String,
    pub port: u16,
    pub secret: Option<String>,
    pub stylesheet_href: Option<String>,
}

pub struct PreviewHandle {
    pub url: String,
    shutdown: Arc<AtomicBool>,
    join: JoinHandle<Result<()>>,
}

impl PreviewHandle {
    pub fn stop(self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        match self.join.join() {
            Ok(result) => result,
            Err(_) => anyhow::bail!("preview thread panicked"),
        }
    }
}

struct PreviewContext {
    source: Arc<dyn EntrySource>,
    secret: Option<String>,
    stylesheet_href: Option<String>,
}

impl PreviewContext {
    /// An unconfigured secret rejects every request.
    fn secret_matches(&self, given: Option<&String>) -> bool {
        match (&self.secret, given) {
            (Some(expected), Some(given)) => !given.is_empty() && expected == given,
            _ => false,
        }
    }
}

pub fn run_preview(opts: PreviewOpts, source: Arc<dyn EntrySource>) -> Result<()> {
    let (server, addr) = bind_server(&opts.host, opts.port)?;
    let url = preview_url(&opts.host, addr);
    info!(%url, "preview server listening");
    if opts.secret.is_none() {
        warn!("no preview secret configured, all preview requests will be rejected");
    }
    let ctx = context_from(opts, source);
    serve_loop(server, ctx, None)
}

pub fn spawn_preview(opts: PreviewOpts, source: Arc<dyn EntrySource>) -> Result<PreviewHandle> {
    let (server, addr) = bind_server(&opts.host, opts.port)?;
    let url = preview_url(&opts.host, addr);
    let ctx = context_from(opts, source);
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_thread = shutdown.clone();
    let join = thread::spawn(move || serve_loop(server, ctx, Some(shutdown_thread)));

    Ok(PreviewHandle {
        url,
        shutdown,
        join,
    })
}

fn context_from(opts: PreviewOpts, source: Arc<dyn EntrySource>) -> PreviewContext {
    PreviewContext {
        source,
        secret: opts.secret,
        stylesheet_href: opts.stylesheet_href,
    }
}

fn bind_server(host: &str, port: u16) -> Result<(Server, SocketAddr)> {
    let addr = format!("{host}:{port}");
    let server =
        Server::http(&addr).map_err(|err| anyhow::anyhow!("failed to bind to {addr}: {err}"))?;
    let actual = server
        .server_addr()
        .to_ip()
        .ok_or_else(|| anyhow::anyhow!("failed to resolve socket address"))?;
    Ok((server, actual))
}

fn preview_url(host: &str, addr: SocketAddr) -> String {
    format!("http://{host}:{}/", addr.port())
}

fn serve_loop(
    server: Server,
    ctx: PreviewContext,
    shutdown: Option<Arc<AtomicBool>>,
) -> Result<()> {
    loop {
        if let Some(flag) = &shutdown {
            if flag.load(Ordering::SeqCst) {
                break;
            }
        }

        let request = match server.recv_timeout(Duration::from_millis(200)) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(err) => return Err(err.into()),
        };

        let response = handle_request(&request, &ctx);
        if let Err(err) = request.respond(response) {
            warn!(error = %err, "failed to send response");
        }
    }
    Ok(())
}

fn handle_request(request: &Request, ctx: &PreviewContext) -> BoxedResponse {
    if request.method() != &Method::Get && request.method() != &Method::Head {
        return text_response(405, "Method Not Allowed");
    }

    let (path, query) = split_url(request.url());
    match path.trim_end_matches('/') {
        PREVIEW_JSON_PATH => preview_json(ctx, &query),
        PREVIEW_HOME_PATH => preview_home(ctx, &query),
        _ => text_response(404, "Not Found"),
    }
}

fn preview_json(ctx: &PreviewContext, query: &HashMap<String, String>) -> BoxedResponse {
    if !ctx.secret_matches(query.get("secret")) {
        return json_message(401, "Invalid preview secret");
    }

    let page_query = PageQuery::for_slug(query.get("slug").map(String::as_str));
    let collection = match ctx.source.fetch_entries(&page_query) {
        Ok(collection) => collection,
        Err(err) => {
            error!(error = %format!("{err:#}"), "error fetching preview");
            return json_message(500, "Error fetching preview");
        }
    };

    let page = match assemble_collection(&collection) {
        Ok(page) => page,
        Err(AssembleError::NotFound) => {
            return json_message(404, "No entry found for that slug");
        }
    };
    match serde_json::to_string(&page) {
        Ok(body) => json_response(200, body),
        Err(err) => {
            error!(error = %err, "failed to serialize preview page");
            json_message(500, "Error fetching preview")
        }
    }
}

fn preview_home(ctx: &PreviewContext, query: &HashMap<String, String>) -> BoxedResponse {
    if !ctx.secret_matches(query.get("secret")) {
        return text_response(401, "Invalid preview secret");
    }

    let collection = match ctx.source.fetch_entries(&PageQuery::for_slug(Some(HOME_SLUG))) {
        Ok(collection) => collection,
        Err(err) => {
            error!(error = %format!("{err:#}"), "error fetching Contentful data");
            return text_response(500, "Error fetching Contentful data");
        }
    };
    let page = match assemble_collection(&collection) {
        Ok(page) => page,
        Err(AssembleError::NotFound) => {
            return text_response(404, "No entry found for this slug");
        }
    };

    match render_page_html(&page, ctx.stylesheet_href.as_deref()) {
        Ok(html) => Response::from_string(html)
            .with_header(header("text/html; charset=utf-8"))
            .boxed(),
        Err(err) => {
            error!(error = %format!("{err:#}"), "preview render error");
            text_response(500, "Error rendering preview page")
        }
    }
}

fn split_url(url: &str) -> (String, HashMap<String, String>) {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let path = urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| path.to_string());
    (path, parse_query(query))
}

fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let (Some(key), Some(value)) = (decode_component(key), decode_component(value)) else {
            continue;
        };
        params.entry(key).or_insert(value);
    }
    params
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .ok()
        .map(|decoded| decoded.into_owned())
}

fn header(content_type: &str) -> Header {
    Header::from_bytes("Content-Type", content_type).expect("valid header")
}

fn text_response(status: u16, body: &str) -> BoxedResponse {
    Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(header("text/plain; charset=utf-8"))
        .boxed()
}

fn json_response(status: u16, body: String) -> BoxedResponse {
    Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(header("application/json; charset=utf-8"))
        .boxed()
}

fn json_message(status: u16, message: &str) -> BoxedResponse {
    json_response(status, serde_json::json!({ "message": message }).to_string())
}
