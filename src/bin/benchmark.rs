use std::time::Instant;

use anyhow::{Result, bail};
use epicycles::engine::{EngineSettings, EpicycleEngine};
use epicycles::geometry::Point;

const DEFAULT_SEED: u64 = 0xE91C_2026;

struct Args {
    sizes: Vec<usize>,
    runs: usize,
    ticks: usize,
    seed: u64,
    max_ms: f64,
    ci_smoke: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        sizes: vec![16, 33, 64, 128, 256],
        runs: 20,
        ticks: 1000,
        seed: DEFAULT_SEED,
        max_ms: 9.0,
        ci_smoke: false,
    };

    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--sizes", Some(x)) => {
                let sizes = x
                    .split(',')
                    .filter_map(|s| s.trim().parse::<usize>().ok())
                    .filter(|&n| n > 0)
                    .collect::<Vec<_>>();
                if !sizes.is_empty() {
                    args.sizes = sizes;
                }
                i += 2;
            }
            ("--runs", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.runs = n.max(1);
                }
                i += 2;
            }
            ("--ticks", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.ticks = n.max(1);
                }
                i += 2;
            }
            ("--seed", Some(x)) => {
                if let Ok(n) = x.parse::<u64>() {
                    args.seed = n;
                }
                i += 2;
            }
            ("--max-ms", Some(x)) => {
                if let Ok(v) = x.parse::<f64>() {
                    args.max_ms = v.max(0.1);
                }
                i += 2;
            }
            ("--ci-smoke", _) => {
                args.ci_smoke = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }
    args
}

/// Random walk with steps long enough to pass point decimation.
fn random_stroke(rng: &mut fastrand::Rng, n: usize) -> Vec<Point> {
    let mut p = Point::ORIGIN;
    (0..n)
        .map(|_| {
            let a = rng.f64() * std::f64::consts::TAU;
            let step = 10.0 + rng.f64() * 20.0;
            p = Point::new(p.x + step * a.cos(), p.y + step * a.sin());
            p
        })
        .collect()
}

fn main() -> Result<()> {
    let args = parse_args();
    let mut rng = fastrand::Rng::with_seed(args.seed);
    let mut worst_recompute_ms = 0.0f64;

    println!("{:>6} {:>8} {:>14} {:>12}", "points", "gears", "recompute ms", "tick us");
    for &n in &args.sizes {
        let points = random_stroke(&mut rng, n);
        let mut engine = EpicycleEngine::with_points(EngineSettings::default(), points);

        let t0 = Instant::now();
        for _ in 0..args.runs {
            engine.recompute();
        }
        let recompute_ms = t0.elapsed().as_secs_f64() * 1000.0 / args.runs as f64;
        worst_recompute_ms = worst_recompute_ms.max(recompute_ms);

        let t1 = Instant::now();
        for _ in 0..args.ticks {
            engine.tick();
        }
        let tick_us = t1.elapsed().as_secs_f64() * 1e6 / args.ticks as f64;

        println!(
            "{:>6} {:>8} {:>14.3} {:>12.2}",
            n,
            engine.gears().len(),
            recompute_ms,
            tick_us
        );
    }

    if args.ci_smoke && worst_recompute_ms > args.max_ms {
        bail!(
            "recompute took {:.3} ms, over the {:.3} ms budget",
            worst_recompute_ms,
            args.max_ms
        );
    }
    Ok(())
}
