use chtsv_client::{Response, ResponseDecoder};
use chtsv_decoder::TsvDecoder;
use chtsv_types::TsvFormat;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn typed_body(rows: usize) -> Vec<u8> {
    let mut body = b"id\tname\tscore\ttags\nUInt64\tString\tFloat64\tArray(String)\n".to_vec();
    for i in 0..rows {
        body.extend_from_slice(
            format!("{i}\tuser\\'{i}\t{}.5\t['a','b\\'c']\n", i % 1000).as_bytes(),
        );
    }
    body
}

fn untyped_body(rows: usize) -> Vec<u8> {
    let mut body = b"id\tname\tscore\n".to_vec();
    for i in 0..rows {
        body.extend_from_slice(format!("{i}\tuser{i}\t{}.5\n", i % 1000).as_bytes());
    }
    body
}

fn bench_decode_one_shot(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_one_shot");
    for rows in [1_000, 100_000] {
        let typed = typed_body(rows);
        group.throughput(Throughput::Bytes(typed.len() as u64));
        group.bench_with_input(BenchmarkId::new("typed", rows), &typed, |b, body| {
            b.iter(|| TsvDecoder::decode(TsvFormat::WITH_NAMES_AND_TYPES, body).unwrap());
        });

        let untyped = untyped_body(rows);
        group.throughput(Throughput::Bytes(untyped.len() as u64));
        group.bench_with_input(BenchmarkId::new("untyped", rows), &untyped, |b, body| {
            b.iter(|| TsvDecoder::decode(TsvFormat::WITH_NAMES, body).unwrap());
        });
    }
    group.finish();
}

fn bench_decode_chunked(c: &mut Criterion) {
    let body = typed_body(100_000);
    let mut group = c.benchmark_group("decode_chunked");
    group.throughput(Throughput::Bytes(body.len() as u64));
    for chunk in [64, 1_500, 64 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                TsvDecoder::decode_chunks(TsvFormat::WITH_NAMES_AND_TYPES, body.chunks(chunk))
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_stream_zstd(c: &mut Criterion) {
    let body = typed_body(100_000);
    let compressed = zstd::encode_all(body.as_slice(), 3).unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let decoder = ResponseDecoder::default();

    let mut group = c.benchmark_group("stream_zstd");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("collect_100k", |b| {
        b.iter(|| {
            let response = Response::new(200, compressed.as_slice())
                .with_header("X-ClickHouse-Format", "TSVWithNamesAndTypes")
                .with_header("Content-Encoding", "zstd");
            runtime.block_on(decoder.collect(response)).unwrap()
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_decode_one_shot,
    bench_decode_chunked,
    bench_stream_zstd
);
criterion_main!(benches);
