/// Turns a captured body on disk into a transport-shaped response.
///
/// The CLI has no transport; it opens the file and attaches the headers
/// the server would have sent, so the exact client code path is used.
use anyhow::{Context, Result};
use chtsv_client::response::{ENCODING_HEADER, FORMAT_HEADER};
use chtsv_client::{ClientConfig, Response, ResponseDecoder};
use chtsv_decoder::DecoderConfig;
use tokio::fs::File;
use tracing::debug;

use crate::InputArgs;

/// Open the body file as a `200 OK` response.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub async fn open(args: &InputArgs) -> Result<Response<File>> {
    let file = File::open(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    debug!(
        path = %args.file.display(),
        format = %args.format,
        encoding = args.encoding.as_deref().unwrap_or("identity"),
        "opened captured body"
    );

    let mut response = Response::new(200, file).with_header(FORMAT_HEADER, &args.format);
    if let Some(encoding) = &args.encoding {
        response = response.with_header(ENCODING_HEADER, encoding);
    }
    Ok(response)
}

/// Response decoder configured from the command-line flags.
pub fn decoder(args: &InputArgs) -> ResponseDecoder {
    ResponseDecoder::new(ClientConfig {
        decoder: DecoderConfig {
            read_chunk_size: args.chunk_size,
            ..DecoderConfig::default()
        },
        ..ClientConfig::default()
    })
}
