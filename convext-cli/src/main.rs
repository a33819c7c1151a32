//! Convext command line front end
//!
//! Newline-delimited JSON-RPC 2.0 over stdin/stdout.
//!
//! Methods:
//! - ping: Server name and version
//! - converters/list: Metadata of registered converters
//! - encode: Host value to JSON through one converter
//! - decode: JSON to host value through one converter
//! - document/serialize: List or map document to JSON
//! - document/deserialize: JSON list or map document to host values
//!
//! Configuration (environment):
//! - CONVEXT_LOG: log level written to stderr (default `info`)
//! - CONVEXT_TRACE: include converter traces in responses

mod handlers;
mod protocol;
mod settings;

use convext::Convext;
use protocol::{RpcError, RpcRequest, RpcResponse};
use settings::Settings;
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};

fn init_logging(settings: &Settings) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(settings.log_level)
        .with_ansi(false)
        .with_target(false)
        .init();
}

fn write_response(out: &mut impl Write, response: &RpcResponse) -> io::Result<()> {
    let line = serde_json::to_string(response).map_err(io::Error::other)?;
    writeln!(out, "{}", line)?;
    out.flush()
}

fn main() {
    let settings = Settings::from_env();
    init_logging(&settings);

    let convext = Convext::with_standard_converters().with_tracing(settings.trace);

    info!(version = env!("CARGO_PKG_VERSION"), converters = convext.registry().len(), "convext ready");
    debug!(?settings, "settings loaded");

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("input closed");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let request: RpcRequest = match serde_json::from_str(line) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(error = %e, "unparseable request");
                        let response = RpcResponse::new(None, Err(RpcError::parse_error(&e)));
                        if let Err(e) = write_response(&mut io::stdout().lock(), &response) {
                            error!(error = %e, "failed to write response");
                            break;
                        }
                        continue;
                    }
                };

                let response = handlers::handle_request(&convext, &settings, &request);

                // Notifications get no response
                if request.id.is_none() {
                    debug!(method = %request.method, "notification processed");
                    continue;
                }

                if let Err(e) = write_response(&mut io::stdout().lock(), &response) {
                    error!(error = %e, "failed to write response");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        }
    }

    info!("shutting down");
}
