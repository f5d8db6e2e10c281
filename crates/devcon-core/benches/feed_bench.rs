//! Throughput benchmarks for the decode → parse → dispatch pipeline.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use devcon_core::{Parser, Screen, Utf8};

struct Corpus {
    id: &'static str,
    bytes: Vec<u8>,
}

fn corpora() -> Vec<Corpus> {
    let plain = "the quick brown fox jumps over the lazy dog\r\n"
        .repeat(64)
        .into_bytes();

    let dense_sgr = "\x1b[1;31mR\x1b[0m \x1b[38;5;196mI\x1b[0m \x1b[38;2;1;2;3mT\x1b[0m\r\n"
        .repeat(64)
        .into_bytes();

    let scroll_storm = "line of text that will push the region\n".repeat(256).into_bytes();

    let unicode = "héllo wörld — 中文字符 …\r\n".repeat(64).into_bytes();

    vec![
        Corpus { id: "plain", bytes: plain },
        Corpus { id: "dense_sgr", bytes: dense_sgr },
        Corpus { id: "scroll_storm", bytes: scroll_storm },
        Corpus { id: "unicode", bytes: unicode },
    ]
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    for corpus in corpora() {
        group.throughput(Throughput::Bytes(corpus.bytes.len() as u64));
        group.bench_function(corpus.id, |b| {
            b.iter(|| {
                let mut decoder = Utf8::new();
                let mut parser = Parser::new();
                let mut dispatched = 0usize;
                for &byte in &corpus.bytes {
                    let points = decoder.feed(byte);
                    for &raw in points {
                        if parser.feed(raw).is_some() {
                            dispatched += 1;
                        }
                    }
                }
                black_box(dispatched)
            });
        });
    }
    group.finish();
}

fn bench_screen(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen_feed");
    for corpus in corpora() {
        group.throughput(Throughput::Bytes(corpus.bytes.len() as u64));
        group.bench_function(corpus.id, |b| {
            b.iter(|| {
                let mut screen = Screen::new();
                screen.resize(80, 24).expect("resize");
                screen.feed_text(&corpus.bytes);
                black_box(screen.age())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parser, bench_screen);
criterion_main!(benches);
