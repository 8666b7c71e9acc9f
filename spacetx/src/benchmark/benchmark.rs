use std::time::Instant;

use crate::simulation::engine::SimulationCore;
use crate::simulation::error::ConfigError;
use crate::simulation::frustum::Frustum;
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec3, Transaction};

/// Deterministic amount spread covering every size class, no rand needed
fn amount_for(i: usize) -> f64 {
    let i_f = i as f64;
    let base = ((i_f * 0.37).sin() * 0.5 + 0.5) * 4.0; // 0..4 decades
    10f64.powf(base) + 1.0
}

/// Core with `n` entities already ingested and started
fn make_core(n: usize) -> Result<SimulationCore, ConfigError> {
    let params = Parameters {
        max_entities: n,
        ..Parameters::default()
    };
    let mut core = SimulationCore::new(params)?;

    for i in 0..n {
        core.process_transaction(&Transaction::new(format!("bench-{i}"), amount_for(i)));
    }
    core.start();
    core.drain_events();
    Ok(core)
}

/// Time `tick` for a range of population sizes
pub fn bench_tick() -> Result<(), ConfigError> {
    let ns = [250, 500, 1000, 2000, 4000, 8000];
    let steps = 20;

    for n in ns {
        let mut core = make_core(n)?;
        let dt = core.params().frame_delta();

        // Warm up
        core.tick(dt);

        let t0 = Instant::now();
        for _ in 0..steps {
            core.tick(dt);
        }
        let per_tick = t0.elapsed().as_secs_f64() / steps as f64;
        core.drain_events();

        println!(
            "N = {n:5}, tick = {:8.6} s, captured = {:5}, index nodes = {:5}",
            per_tick,
            core.store().all().filter(|e| e.is_captured()).count(),
            core.index().node_count()
        );
    }
    Ok(())
}

/// Compare indexed visibility queries against a brute-force frustum scan
pub fn bench_visibility() -> Result<(), ConfigError> {
    let ns = [250, 500, 1000, 2000, 4000, 8000];
    let queries = 200;

    for n in ns {
        let mut core = make_core(n)?;
        let dt = core.params().frame_delta();
        core.tick(dt);

        // A narrow camera sweeping around the disc, 60 degree fov
        let cameras: Vec<(NVec3, Frustum)> = (0..queries)
            .map(|q| {
                let a = q as f64 / queries as f64 * std::f64::consts::TAU;
                let eye = NVec3::new(150.0 * a.cos(), 40.0, 150.0 * a.sin());
                let frustum = Frustum::perspective(&eye, &NVec3::zeros(), &NVec3::y(), 1.047, 1.6, 0.1, 120.0);
                (eye, frustum)
            })
            .collect();

        let t0 = Instant::now();
        let mut indexed_hits = 0;
        for (eye, frustum) in &cameras {
            indexed_hits += core.query_visible(eye, frustum, 120.0).len();
        }
        let dt_indexed = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        let mut brute_hits = 0;
        for (_, frustum) in &cameras {
            brute_hits += core.store().all().filter(|e| frustum.contains_point(&e.position)).count();
        }
        let dt_brute = t1.elapsed().as_secs_f64();

        println!(
            "N = {n:5}, indexed = {:8.6} s ({indexed_hits} hits), brute = {:8.6} s ({brute_hits} hits)",
            dt_indexed, dt_brute
        );
    }
    Ok(())
}

/// Tick cost over a fine range of n, as CSV
/// Paste output directly into a spreadsheet to graph
pub fn bench_tick_curve() -> Result<(), ConfigError> {
    println!("N,tick_ms");

    for n in (250..=8000).step_by(250) {
        let mut core = make_core(n)?;
        let dt = core.params().frame_delta();
        let steps = if n <= 2000 { 10 } else { 3 };

        let t0 = Instant::now();
        for _ in 0..steps {
            core.tick(dt);
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6}", n, ms);
    }
    Ok(())
}
