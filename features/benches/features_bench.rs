use criterion::{black_box, criterion_group, criterion_main, Criterion};
use voicegate_features::{compare, extract, ExtractorConfig, RawAudioFrame};

fn make_sine(freq_hz: f64, n_samples: usize, sample_rate: u32) -> Vec<f32> {
    (0..n_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (0.5 * (freq_hz * 2.0 * std::f64::consts::PI * t).sin()) as f32
        })
        .collect()
}

fn bench_extract_quarter_second(c: &mut Criterion) {
    let cfg = ExtractorConfig {
        min_capture_secs: 0.25,
    };
    let frame = RawAudioFrame::new(make_sine(120.0, 2000, 8000), 8000);

    c.bench_function("features_extract_250ms_8k", |b| {
        b.iter(|| {
            let _ = black_box(extract(black_box(&frame), &cfg));
        });
    });
}

fn bench_compare(c: &mut Criterion) {
    let cfg = ExtractorConfig {
        min_capture_secs: 0.25,
    };
    let enrolled = extract(&RawAudioFrame::new(make_sine(120.0, 2000, 8000), 8000), &cfg).unwrap();
    let candidate = extract(&RawAudioFrame::new(make_sine(125.0, 2000, 8000), 8000), &cfg).unwrap();

    c.bench_function("features_compare", |b| {
        b.iter(|| {
            let _ = black_box(compare(black_box(&candidate), Some(black_box(&enrolled))));
        });
    });
}

criterion_group!(benches, bench_extract_quarter_second, bench_compare);
criterion_main!(benches);
