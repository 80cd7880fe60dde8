//! Benchmarks for sampling, aggregation, and end-to-end analysis.
//!
//! Run with: cargo bench
//!
//! The video benchmark requires fixture files from
//! `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use criterion::Criterion;
use ffmpeg_next::util::log::Level as LogLevel;
use framemood::{
    AnalysisOptions, ClassifyError, Frame, ImageClassifier, InMemorySource, Prediction, Report,
    VideoAnalyzer, onnx::to_nchw, summarize,
};
use image::{Rgb, RgbImage};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// Labels by mean red intensity, so every frame does a little real work.
struct MeanRed;

impl ImageClassifier for MeanRed {
    fn classify(&self, image: &RgbImage) -> Result<Vec<Prediction>, ClassifyError> {
        let sum: u64 = image.pixels().map(|pixel| u64::from(pixel.0[0])).sum();
        let mean = sum / u64::from(image.width() * image.height()).max(1);
        let label = match mean {
            0..=84 => "sadness",
            85..=169 => "neutral",
            _ => "joy",
        };
        Ok(vec![Prediction::new(label, 1.0)])
    }
}

fn frames(count: u64, width: u32, height: u32) -> Vec<Frame> {
    (0..count)
        .map(|index| {
            let shade = (index * 7 % 256) as u8;
            Frame::from_rgb_image(index, RgbImage::from_pixel(width, height, Rgb([shade, 0, 0])))
        })
        .collect()
}

fn benchmark_in_memory_pipeline(criterion: &mut Criterion) {
    let clip = frames(300, 64, 48);

    criterion.bench_function("analyze 300 in-memory frames (default policy)", |bencher| {
        bencher.iter(|| {
            let mut analyzer = VideoAnalyzer::new(&MeanRed, AnalysisOptions::new());
            let _log = analyzer.run(InMemorySource::new(clip.clone())).unwrap();
        });
    });

    criterion.bench_function("analyze 300 in-memory frames (stride 1, cap 300)", |bencher| {
        bencher.iter(|| {
            let options = AnalysisOptions::new().with_stride(1).with_cap(300);
            let mut analyzer = VideoAnalyzer::new(&MeanRed, options);
            let _log = analyzer.run(InMemorySource::new(clip.clone())).unwrap();
        });
    });
}

fn benchmark_aggregation(criterion: &mut Criterion) {
    let options = AnalysisOptions::new().with_stride(1).with_cap(10_000);
    let mut analyzer = VideoAnalyzer::new(&MeanRed, options);
    let log = analyzer
        .run(InMemorySource::new(frames(10_000, 2, 2)))
        .unwrap();

    criterion.bench_function("summarize 10k outcomes", |bencher| {
        bencher.iter(|| summarize(&log));
    });

    criterion.bench_function("build report for 10k outcomes", |bencher| {
        bencher.iter(|| Report::from_log(&log));
    });
}

fn benchmark_preprocessing(criterion: &mut Criterion) {
    let image = RgbImage::from_pixel(640, 480, Rgb([120, 80, 200]));

    criterion.bench_function("resize and normalise 640x480 to 224 NCHW", |bencher| {
        bencher.iter(|| to_nchw(&image, 224, [0.5; 3], [0.5; 3]));
    });
}

fn benchmark_video_analysis(criterion: &mut Criterion) {
    ffmpeg_next::util::log::set_level(LogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    criterion.bench_function("analyze fixture video (default policy)", |bencher| {
        bencher.iter(|| {
            let options = AnalysisOptions::new().with_resolution(Some(224), None);
            let mut analyzer = VideoAnalyzer::new(&MeanRed, options);
            let _report = analyzer.analyze_file(SAMPLE_VIDEO).unwrap();
        });
    });
}

criterion::criterion_group!(
    benches,
    benchmark_in_memory_pipeline,
    benchmark_aggregation,
    benchmark_preprocessing,
    benchmark_video_analysis,
);
criterion::criterion_main!(benches);
