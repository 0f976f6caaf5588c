use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use prompt_stream::models::event::decode;
use prompt_stream::streaming::{EventDispatcher, SseDecoder};
use std::hint::black_box;

fn sample_stream(deltas: usize) -> String {
    let mut out = String::from("event: pair.created\ndata: {\"id\":\"pair-1\"}\n\n");
    for i in 0..deltas {
        out.push_str(&format!(
            "event: chat.content\ndata: {{\"data\":\"token {} of the answer \"}}\n\n",
            i
        ));
    }
    out.push_str("event: tool.calls\ndata: {\"data\":[{\"id\":\"t1\",\"name\":\"search\",\"args\":{\"q\":\"rust\"}}]}\n\n");
    out
}

fn benchmark_sse_decoding(c: &mut Criterion) {
    let input = sample_stream(500);
    let bytes = input.as_bytes();

    let mut group = c.benchmark_group("sse_decoding");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("single_chunk", |b| {
        b.iter(|| {
            let mut decoder = SseDecoder::new();
            let frames = decoder.feed(black_box(bytes));
            black_box(frames.len() + decoder.finish().len())
        });
    });

    group.bench_function("network_sized_chunks", |b| {
        b.iter(|| {
            let mut decoder = SseDecoder::new();
            let mut count = 0;
            for chunk in bytes.chunks(100) {
                count += decoder.feed(black_box(chunk)).len();
            }
            black_box(count + decoder.finish().len())
        });
    });

    group.finish();
}

fn benchmark_event_decode(c: &mut Criterion) {
    c.bench_function("decode_chat_content", |b| {
        b.iter(|| black_box(decode(black_box("chat.content"), black_box(r#"{"data":"Hello"}"#))));
    });

    c.bench_function("decode_image_partial", |b| {
        b.iter(|| {
            black_box(decode(
                black_box("image.partial"),
                black_box(r#"{"data":{"index":"2","b64":"iVBORw0KGgo="}}"#),
            ))
        });
    });
}

fn benchmark_dispatch(c: &mut Criterion) {
    let input = sample_stream(500);
    let mut decoder = SseDecoder::new();
    let mut frames = decoder.feed(input.as_bytes());
    frames.extend(decoder.finish());

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(frames.len() as u64));

    group.bench_function("dispatch_and_join", |b| {
        b.iter(|| {
            let mut dispatcher = EventDispatcher::new(());
            for frame in &frames {
                dispatcher.dispatch(black_box(frame)).unwrap();
            }
            black_box(dispatcher.finish())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_sse_decoding,
    benchmark_event_decode,
    benchmark_dispatch
);
criterion_main!(benches);
