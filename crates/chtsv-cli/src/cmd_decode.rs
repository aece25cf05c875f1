/// Implementation of `chtsv decode`.
///
/// Decodes a captured response body and writes it as JSON to stdout or
/// to `-o <file>`.
///
/// # Output modes
///
/// ```text
/// ┌──────────┬──────────────────────────────────────────────────────────────┐
/// │ Mode     │ Output                                                       │
/// ├──────────┼──────────────────────────────────────────────────────────────┤
/// │ default  │ {"meta":[..],"data":[..],"rows":n,"totals"?,"extremes"?}     │
/// │ --pretty │ same document, indented                                      │
/// │ --stream │ one row per line, then {"totals"?,"extremes"?} if present    │
/// └──────────┴──────────────────────────────────────────────────────────────┘
/// ```
///
/// `JSON` bodies are passed through as the parsed document and cannot be
/// combined with `--stream`.
use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use chtsv_client::RowStream;
use chtsv_types::ExtraData;
use tokio::io::AsyncRead;

use crate::{DecodeArgs, input};

/// Run the `chtsv decode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the body fails to
/// decode, or the output cannot be written.
pub async fn run(args: &DecodeArgs) -> Result<()> {
    let response = input::open(&args.input).await?;
    let decoder = input::decoder(&args.input);
    let mut out = open_output(args)?;

    if args.stream {
        let stream = decoder
            .stream(response)
            .await
            .with_context(|| format!("failed to decode {}", args.input.file.display()))?;
        write_stream(stream, &mut out).await?;
    } else {
        let output = decoder
            .collect(response)
            .await
            .with_context(|| format!("failed to decode {}", args.input.file.display()))?;
        if args.pretty {
            serde_json::to_writer_pretty(&mut out, &output)?;
        } else {
            serde_json::to_writer(&mut out, &output)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

fn open_output(args: &DecodeArgs) -> Result<Box<dyn Write>> {
    Ok(match &args.output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("cannot write {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Write each row as soon as its batch is decoded.
async fn write_stream<R: AsyncRead + Unpin>(
    mut stream: RowStream<R>,
    out: &mut dyn Write,
) -> Result<()> {
    while let Some(batch) = stream.next_batch().await {
        for row in batch? {
            serde_json::to_writer(&mut *out, &row)?;
            writeln!(out)?;
        }
    }

    let extra = ExtraData {
        totals: stream.totals().cloned(),
        extremes: stream.extremes().cloned(),
    };
    if !extra.is_empty() {
        serde_json::to_writer(&mut *out, &extra)?;
        writeln!(out)?;
    }
    Ok(())
}
