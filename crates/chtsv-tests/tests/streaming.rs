//! End-to-end tests through the client: a canned transport feeds
//! responses into [`Client`], and the streaming and materializing modes
//! must agree on every row.

use std::future::Future;
use std::io::{self, Cursor};

use chtsv_client::{Client, ClientError, QueryOutput, Response, Transport};
use chtsv_decoder::DecodeError;
use chtsv_types::Value;

/// Transport that answers every query with the same body.
struct Canned {
    format: &'static str,
    encoding: Option<&'static str>,
    body: Vec<u8>,
}

impl Canned {
    fn tsv(format: &'static str, body: Vec<u8>) -> Self {
        Self {
            format,
            encoding: None,
            body,
        }
    }

    fn zstd(format: &'static str, body: &[u8]) -> Self {
        Self {
            format,
            encoding: Some("zstd"),
            body: zstd::encode_all(body, 3).unwrap(),
        }
    }
}

impl Transport for Canned {
    type Body = Cursor<Vec<u8>>;

    fn execute(&self, _query: &str) -> impl Future<Output = io::Result<Response<Self::Body>>> + Send {
        let mut response = Response::new(200, Cursor::new(self.body.clone()))
            .with_header("X-ClickHouse-Format", self.format);
        if let Some(encoding) = self.encoding {
            response = response.with_header("Content-Encoding", encoding);
        }
        async move { Ok(response) }
    }
}

/// `rows` data rows plus totals and extremes.
fn large_body(rows: usize) -> Vec<u8> {
    let mut body = b"n\tlabel\tvals\nUInt32\tString\tArray(Int16)\n".to_vec();
    for i in 0..rows {
        body.extend_from_slice(format!("{i}\trow\\t{i}\t[{},-1]\n", i % 100).as_bytes());
    }
    body.extend_from_slice(b"\n0\t\t[]\n\n0\tmin\t[]\n");
    body.extend_from_slice(format!("{}\tmax\t[]\n", rows - 1).as_bytes());
    body
}

#[tokio::test]
async fn streaming_and_materializing_agree_on_100k_rows() {
    let body = large_body(100_000);
    let client = Client::new(Canned::tsv("TSVWithNamesAndTypes", body));

    let materialized = client
        .query("SELECT")
        .await
        .unwrap()
        .into_tabular()
        .unwrap();
    assert_eq!(materialized.rows, 100_000);

    let mut stream = client.query_stream("SELECT").await.unwrap();
    let mut streamed = Vec::with_capacity(100_000);
    while let Some(row) = stream.next().await {
        streamed.push(row.unwrap());
    }

    assert!(stream.is_finished());
    assert_eq!(streamed, materialized.data);
    assert_eq!(stream.meta(), materialized.meta);
    assert_eq!(stream.totals(), materialized.totals.as_ref());
    assert_eq!(stream.extremes(), materialized.extremes.as_ref());

    let last = &streamed[99_999];
    assert_eq!(last.get("n"), Some(&Value::Int(99_999)));
    // `\t` is not in the unescape table, so it survives verbatim.
    assert_eq!(last.get("label"), Some(&Value::String("row\\t99999".into())));
    assert_eq!(
        stream.extremes().unwrap().max.get("n"),
        Some(&Value::Int(99_999))
    );
}

#[tokio::test]
async fn metadata_is_known_before_rows_are_exhausted() {
    let client = Client::new(Canned::tsv("TSVWithNamesAndTypes", large_body(10)));
    let mut stream = client.query_stream("SELECT").await.unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.get("n"), Some(&Value::Int(0)));
    let meta = stream.meta();
    assert_eq!(meta.len(), 3);
    assert_eq!(meta[2].type_name.as_deref(), Some("Array(Int16)"));
    assert!(stream.totals().is_none());
}

#[tokio::test]
async fn zstd_body_is_decompressed_before_decoding() {
    let plain = large_body(5_000);
    let expected = Client::new(Canned::tsv("TSVWithNamesAndTypes", plain.clone()))
        .query("SELECT")
        .await
        .unwrap();
    let compressed = Client::new(Canned::zstd("TSVWithNamesAndTypes", &plain))
        .query("SELECT")
        .await
        .unwrap();

    let (QueryOutput::Tabular(expected), QueryOutput::Tabular(compressed)) = (expected, compressed)
    else {
        panic!("expected tabular results");
    };
    assert_eq!(compressed.data, expected.data);
    assert_eq!(compressed.totals, expected.totals);
    assert_eq!(
        compressed.response.content_encoding(),
        Some("zstd"),
        "transport metadata is passed through"
    );
}

#[tokio::test]
async fn truncated_zstd_body_is_an_error() {
    let plain = large_body(2_000);
    let mut compressed = zstd::encode_all(plain.as_slice(), 3).unwrap();
    compressed.truncate(compressed.len() / 2);
    let canned = || Canned {
        format: "TSVWithNamesAndTypes",
        encoding: Some("zstd"),
        body: compressed.clone(),
    };

    let err = Client::new(canned()).query("SELECT").await.unwrap_err();
    assert!(
        matches!(err, ClientError::Decode(DecodeError::DecompressFailed(_))),
        "got {err:?}"
    );

    let mut stream = Client::new(canned()).query_stream("SELECT").await.unwrap();
    let mut failed = false;
    while let Some(row) = stream.next().await {
        if let Err(err) = row {
            assert!(matches!(err, ClientError::Decode(DecodeError::DecompressFailed(_))));
            failed = true;
        }
    }
    assert!(failed, "a cut-off body must not end the stream cleanly");
}

#[tokio::test]
async fn gzip_must_be_removed_by_the_transport() {
    let client = Client::new(Canned {
        format: "TabSeparated",
        encoding: Some("gzip"),
        body: b"1\n".to_vec(),
    });
    let err = client.query("SELECT").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn decode_error_mid_stream_ends_the_stream() {
    let client = Client::new(Canned::tsv(
        "TSVWithNamesAndTypes",
        b"n\nUInt8\n1\n2\nnope\n3\n".to_vec(),
    ));
    let mut stream = client.query_stream("SELECT").await.unwrap();

    let mut rows = 0;
    let mut failed = false;
    while let Some(row) = stream.next().await {
        match row {
            Ok(_) => rows += 1,
            Err(ClientError::Decode(_)) => failed = true,
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert!(failed);
    // The region holding the bad value fails as a whole.
    assert_eq!(rows, 0);
    assert!(stream.is_finished());
}

#[tokio::test]
async fn json_cannot_be_streamed() {
    let client = Client::new(Canned::tsv("JSON", br#"{"data":[]}"#.to_vec()));
    assert!(matches!(
        client.query_stream("SELECT").await,
        Err(ClientError::StreamingJson)
    ));
}
