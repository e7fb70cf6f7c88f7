use animgif::Decoder;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rgb::RGBA8;
use std::io::Cursor;

/// 10x10 image with a graphic control extension
const SAMPLE: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
    0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02, 0x16, 0x8C, 0x2D, 0x99,
    0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75, 0xEC, 0x95, 0xFA, 0xA8,
    0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C, 0x01, 0x00,
];

/// Build an animation by repeating the sample frame
fn animation(n_frames: usize) -> Vec<u8> {
    // header, screen, global table
    let preamble = &SAMPLE[..25];
    let frame = &SAMPLE[25..];
    let mut gif = preamble.to_vec();
    for _ in 0..n_frames {
        gif.extend_from_slice(frame);
    }
    gif.push(0x3B);
    gif
}

fn decode_steps(crit: &mut Criterion) {
    let gif = animation(50);
    crit.bench_function("decode_steps", |b| {
        b.iter(|| {
            let steps =
                Decoder::new(Cursor::new(black_box(&gif))).into_steps::<RGBA8>();
            for step in steps {
                black_box(step.unwrap());
            }
        })
    });
}

fn identify(crit: &mut Criterion) {
    let gif = animation(50);
    crit.bench_function("identify", |b| {
        b.iter(|| {
            let info = Decoder::new(Cursor::new(black_box(&gif))).identify();
            black_box(info.unwrap());
        })
    });
}

criterion_group!(benches, decode_steps, identify);
criterion_main!(benches);
