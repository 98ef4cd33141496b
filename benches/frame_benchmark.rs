//! Frame benchmark: Measure the per-tick cost of the frame sequence.
//!
//! Target: advancing a frame is a few ns; copying it out for the host stays
//! well under a microsecond for label-sized frames.

use animated_label::frame::split_lines;
use animated_label::{FrameSequence, Size};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn spinner() -> FrameSequence {
    let mut seq = FrameSequence::new("-");
    for frame in ["\\", "|", "/"] {
        seq.add_frame(frame);
    }
    seq
}

fn frame_advance(c: &mut Criterion) {
    let mut seq = spinner();

    c.bench_function("frame_advance", |b| {
        b.iter(|| {
            seq.advance();
            black_box(seq.current_index())
        })
    });
}

fn frame_tick_copy(c: &mut Criterion) {
    let mut seq = FrameSequence::new("[=   ]\nloading");
    seq.add_frame("[ =  ]\nloading.");
    seq.add_frame("[  = ]\nloading..");

    c.bench_function("frame_tick_copy", |b| {
        b.iter(|| {
            seq.advance();
            black_box(seq.current().to_vec())
        })
    });
}

fn frame_add(c: &mut Criterion) {
    c.bench_function("frame_add_multiline", |b| {
        b.iter(|| {
            let mut seq = FrameSequence::new("start");
            seq.add_frame(black_box("line one\r\nline two\nthe third, longest line"));
            black_box(seq.bounds())
        })
    });
}

fn measure(c: &mut Criterion) {
    let ascii = split_lines("the quick brown fox\njumps over");
    let cjk = split_lines("日本語のテキスト\n中文");

    c.bench_function("size_of_lines_ascii", |b| {
        b.iter(|| Size::of_lines(black_box(&ascii)))
    });

    c.bench_function("size_of_lines_cjk", |b| {
        b.iter(|| Size::of_lines(black_box(&cjk)))
    });
}

criterion_group!(benches, frame_advance, frame_tick_copy, frame_add, measure);
criterion_main!(benches);
