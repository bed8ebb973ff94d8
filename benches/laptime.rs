use core::f64::consts::PI;
use criterion::Criterion;
use raceline::{LapTimeCalculator, Launch, Point, RacingLine, Smoothing};

/// A rounded rectangle of `n` vertices, straights joined by tight hairpins
fn circuit(n: usize) -> RacingLine {
    (0..n)
        .map(|i| {
            let θ = 2. * PI * i as f64 / n as f64;
            let (c, s) = (θ.cos(), θ.sin());
            Point::new(
                400. * c.signum() * c.abs().powf(0.3),
                120. * s.signum() * s.abs().powf(0.3),
                0.,
            )
        })
        .collect::<Vec<_>>()
        .into()
}

fn bench_lap_time(bench: &mut Criterion) {
    let calculator = LapTimeCalculator::default();
    for n in [100, 1000] {
        let line = circuit(n);
        for (name, launch) in [("standing", Launch::default()), ("flying", Launch::Flying)] {
            bench.bench_function(&format!("laptime-{name}-{n}"), |b| {
                b.iter(|| calculator.lap_time(&line, launch).unwrap())
            });
        }
    }
}

fn bench_profile(bench: &mut Criterion) {
    let calculator = LapTimeCalculator::default();
    let line = circuit(1000);
    bench.bench_function("laptime-profile-1000", |b| {
        b.iter(|| calculator.profile(&line, Launch::Flying).unwrap())
    });
}

fn bench_smoothing(bench: &mut Criterion) {
    let weights = (0..1000)
        .map(|i| if (i / 20) % 2 == 0 { 0.2 } else { 0.8 })
        .collect::<Vec<f64>>();
    let smoothing = Smoothing::default();
    bench.bench_function("smoothing-1000", |b| {
        b.iter(|| smoothing.apply(&weights).unwrap())
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(1000)
        .significance_level(0.1);
    #[cfg(feature = "smol_bench")]
    let mut criterion: criterion::Criterion<_> = {
        use core::time::Duration;
        Criterion::default()
            .measurement_time(Duration::from_millis(1))
            .sample_size(10)
            .nresamples(1)
            .without_plots()
            .configure_from_args()
    };
    bench_lap_time(&mut criterion);
    bench_profile(&mut criterion);
    bench_smoothing(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
