use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use bench_result_lib::{chart, util, ResultFile, Window, WINDOW_LEN};

fn bench_render_svg(c: &mut Criterion) {
    let results = ResultFile::parse(&util::generate_result_text(WINDOW_LEN));
    let config = chart::RenderConfig::default();

    let mut group = c.benchmark_group("bench_result_lib::chart::render_svg");

    for window in Window::ALL.iter() {
        let series = results.series(*window).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(window), &series, |b, series| {
            b.iter(|| {
                std::hint::black_box(chart::render_svg_with(series, &config)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render_svg);
criterion_main!(benches);
