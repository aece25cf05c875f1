/// Implementation of `chtsv inspect`.
///
/// Streams a captured response body through the decoder without keeping
/// the rows, then prints a structured summary to stdout.
///
/// # Output format
///
/// ```text
/// Format: TSVWithNamesAndTypes (zstd)
/// Column 0: id UInt64
/// Column 1: name String
/// Rows: 1000 in 3 batches
/// Totals: present
/// Extremes: absent
/// ```
use anyhow::{Context, Result};
use chtsv_types::ResponseFormat;

use crate::{InspectArgs, input};

/// Run the `chtsv inspect` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the body fails to
/// decode.
pub async fn run(args: &InspectArgs) -> Result<()> {
    let response = input::open(&args.input).await?;
    let decoder = input::decoder(&args.input);

    let format = decoder.resolve_format(&response.meta)?;
    let encoding = response
        .meta
        .content_encoding()
        .unwrap_or("identity")
        .to_string();
    println!("Format: {format} ({encoding})");

    if let ResponseFormat::Json = format {
        decoder
            .collect(response)
            .await
            .with_context(|| format!("failed to decode {}", args.input.file.display()))?;
        println!("Body: JSON document");
        return Ok(());
    }

    let mut stream = decoder
        .stream(response)
        .await
        .with_context(|| format!("failed to decode {}", args.input.file.display()))?;

    let mut rows = 0usize;
    let mut batches = 0usize;
    while let Some(batch) = stream.next_batch().await {
        let batch =
            batch.with_context(|| format!("failed to decode {}", args.input.file.display()))?;
        rows += batch.len();
        batches += 1;
    }

    for (idx, column) in stream.meta().iter().enumerate() {
        match &column.type_name {
            Some(type_name) => println!("Column {idx}: {} {type_name}", column.name),
            None => println!("Column {idx}: {}", column.name),
        }
    }
    println!(
        "Rows: {rows} in {batches} batch{}",
        if batches == 1 { "" } else { "es" }
    );
    println!("Totals: {}", presence(stream.totals().is_some()));
    println!("Extremes: {}", presence(stream.extremes().is_some()));
    Ok(())
}

fn presence(present: bool) -> &'static str {
    if present { "present" } else { "absent" }
}
