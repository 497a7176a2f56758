//! HTTP server for interactive mode
//!
//! `phenoviz serve results.json` → starts server, opens browser, shows the
//! rendered report; the API endpoints expose the chart configurations and
//! summary for other payload files on disk.

use crate::chart::{self, ChartBundle};
use crate::model::VizPayload;
use crate::report::{self, Summary};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChartParams {
    pub path: String,
}

#[derive(Serialize)]
pub struct ChartReport {
    pub generated: String,
    pub summary: Summary,
    pub charts: ChartBundle,
}

/// Start server, open browser, serve the report
pub fn start(port: u16, path: PathBuf) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", port);
    let path_str = path
        .canonicalize()
        .unwrap_or(path.clone())
        .display()
        .to_string();

    eprintln!("\n\x1b[1;32m◈ Phenoviz\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Payload: {}\n", path_str);

    // Open browser
    let _ = open::that(&url);

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &path_str) {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

fn handle_request(mut request: Request, default_path: &str) -> std::io::Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/");
    let method = request.method().clone();

    match (&method, path) {
        // Rendered report page for the default payload
        (&Method::Get, "/") => match load_payload(default_path) {
            Ok(payload) => {
                let mut html = Vec::new();
                report::html::write(&mut html, &payload)?;
                let response = Response::from_data(html).with_header(
                    Header::from_bytes(&b"Content-Type"[..], &b"text/html"[..]).unwrap(),
                );
                request.respond(response)
            }
            Err(e) => {
                let response = Response::from_string(format!("Failed to load payload: {}", e))
                    .with_status_code(500);
                request.respond(response)
            }
        },

        // API: chart configurations for a payload
        (&Method::Get, "/api/charts") | (&Method::Post, "/api/charts") => {
            let params = parse_params(&mut request, default_path)?;
            eprintln!("→ {}", params.path);

            let json = match load_payload(&params.path) {
                Ok(payload) => {
                    let report = ChartReport {
                        generated: chrono::Local::now().to_rfc3339(),
                        summary: Summary::from_payload(&payload),
                        charts: chart::build_all(&payload),
                    };
                    serde_json::to_string(&ApiResponse::success(report))?
                }
                Err(e) => serde_json::to_string(&ApiResponse::<ChartReport>::failure(e))?,
            };

            let response = Response::from_string(json).with_header(
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
            );
            request.respond(response)
        }

        // API: summary only
        (&Method::Get, "/api/summary") => {
            let params = parse_params(&mut request, default_path)?;
            let json = match load_payload(&params.path) {
                Ok(payload) => {
                    serde_json::to_string(&ApiResponse::success(Summary::from_payload(&payload)))?
                }
                Err(e) => serde_json::to_string(&ApiResponse::<Summary>::failure(e))?,
            };

            let response = Response::from_string(json).with_header(
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
            );
            request.respond(response)
        }

        // 404
        _ => {
            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

fn parse_params(request: &mut Request, default_path: &str) -> std::io::Result<ChartParams> {
    let url = request.url().to_string();

    // Try query string
    if let Some(query) = url.split('?').nth(1) {
        if let Ok(params) = serde_urlencoded::from_str::<ChartParams>(query) {
            return Ok(params);
        }
    }

    // Try JSON body
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body)?;
    if !body.is_empty() {
        if let Ok(params) = serde_json::from_str::<ChartParams>(&body) {
            return Ok(params);
        }
    }

    // Fall back to default path
    Ok(ChartParams {
        path: default_path.to_string(),
    })
}

fn load_payload(path: &str) -> Result<VizPayload, String> {
    let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    VizPayload::from_reader(std::io::BufReader::new(file)).map_err(|e| e.to_string())
}
