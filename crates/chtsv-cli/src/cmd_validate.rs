/// Implementation of `chtsv validate`.
///
/// Decodes the whole body and reports either a series of success
/// checkmarks (`✓`) or a diagnostic failure line (`✗`). The dispatcher in
/// `main.rs` turns the returned `Err` into exit code 1.
///
/// # Success output
///
/// ```text
/// ✓ Format: TSVWithNamesAndTypes
/// ✓ Header: 3 columns, 3 types
/// ✓ Rows: 1000 rows decoded
/// ✓ Extra: totals and extremes
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: row has 2 columns, expected 3
/// ```
use anyhow::{Result, anyhow};
use chtsv_client::{ClientError, QueryOutput};
use chtsv_decoder::DecodeError;

use crate::{ValidateArgs, input};

/// Run the `chtsv validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, or if the body fails
/// any decoding check.
pub async fn run(args: &ValidateArgs) -> Result<()> {
    let response = input::open(&args.input).await?;
    let decoder = input::decoder(&args.input);

    let format = match decoder.resolve_format(&response.meta) {
        Ok(format) => format,
        Err(e) => return fail(&e),
    };
    println!("✓ Format: {format}");

    let result = match decoder.collect(response).await {
        Ok(QueryOutput::Tabular(result)) => result,
        Ok(QueryOutput::Json { .. }) => {
            println!("✓ Body: well-formed JSON document");
            return Ok(());
        }
        Err(e) => return fail(&e),
    };

    let typed = result
        .meta
        .iter()
        .filter(|column| column.type_name.is_some())
        .count();
    if !result.meta.is_empty() {
        println!("✓ Header: {} columns, {typed} types", result.meta.len());
    }
    println!(
        "✓ Rows: {} row{} decoded",
        result.rows,
        if result.rows == 1 { "" } else { "s" }
    );
    let extra = match (result.totals.is_some(), result.extremes.is_some()) {
        (true, true) => "totals and extremes",
        (true, false) => "totals",
        (false, true) => "extremes",
        (false, false) => "none",
    };
    println!("✓ Extra: {extra}");
    Ok(())
}

fn fail(e: &ClientError) -> Result<()> {
    println!("✗ Error: {}", diagnostic(e));
    Err(anyhow!("validation failed"))
}

// ── Error formatting ──────────────────────────────────────────────────────────

/// Converts a `ClientError` into a one-line diagnostic.
///
/// ```text
/// ┌──────────────────────────────┬──────────────────────────────────────┐
/// │ Error                        │ Diagnostic                           │
/// ├──────────────────────────────┼──────────────────────────────────────┤
/// │ Decode(ExtraRowCount)        │ "N rows after the data section"      │
/// │ Decode(InvalidValue)         │ "cannot decode <text> as <type>"     │
/// │ anything else                │ "<error Display>"                    │
/// └──────────────────────────────┴──────────────────────────────────────┘
/// ```
fn diagnostic(e: &ClientError) -> String {
    match e {
        ClientError::Decode(DecodeError::ExtraRowCount { count }) => {
            format!("{count} rows after the data section, expected at most 3")
        }
        ClientError::Decode(DecodeError::InvalidValue { tag, text }) => {
            format!("cannot decode {text:?} as {tag}")
        }
        other => other.to_string(),
    }
}
