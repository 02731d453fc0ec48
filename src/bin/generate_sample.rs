//! Writes a synthetic USGS-style earthquake catalogue for trying the explorer
//! without network access.
//!
//! Usage: `generate_sample [OUTPUT.csv]` (default `data/2024-2025.csv`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Seismically active regions: (name, lat, lon, spread in degrees, typical depth km).
const REGIONS: [(&str, f64, f64, f64, f64); 8] = [
    ("Honshu, Japan", 38.0, 142.0, 3.0, 40.0),
    ("Northern Chile", -22.0, -69.5, 3.5, 90.0),
    ("Southern Alaska", 60.5, -150.0, 2.5, 35.0),
    ("Central California", 36.5, -121.0, 1.5, 8.0),
    ("Sumatra, Indonesia", -1.0, 99.5, 4.0, 50.0),
    ("Tonga", -20.0, -175.0, 2.5, 250.0),
    ("Central Italy", 42.5, 13.2, 1.0, 10.0),
    ("Eastern Turkey", 38.5, 39.5, 2.0, 12.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Gutenberg-Richter-like magnitude: exponential above a completeness floor.
    fn magnitude(&mut self) -> f64 {
        let m = 2.5 - self.next_f64().max(1e-12).ln() / std::f64::consts::LN_10;
        (m.min(9.0) * 10.0).round() / 10.0
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let out: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/2024-2025.csv"));
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);
    let start: DateTime<Utc> = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .context("building catalogue start time")?;
    let span_secs = 2 * 365 * 86_400;
    let n_events = 1_500;

    let mut times: Vec<DateTime<Utc>> = (0..n_events)
        .map(|_| start + Duration::seconds(rng.range(0.0, span_secs as f64) as i64))
        .collect();
    times.sort();

    let mut writer = csv::Writer::from_path(&out).with_context(|| format!("creating {}", out.display()))?;
    writer.write_record(["time", "latitude", "longitude", "depth", "mag", "duration", "place"])?;

    for (i, time) in times.iter().enumerate() {
        let (name, lat, lon, spread, depth) = REGIONS[(rng.next_u64() % REGIONS.len() as u64) as usize];
        let mag = rng.magnitude();
        let depth = rng.gauss(depth, depth * 0.3).max(0.5);
        // Rupture duration grows roughly tenfold per two magnitude units.
        let duration = 10f64.powf(0.5 * mag - 1.5) * rng.range(0.8, 1.2);

        // Every 50th row has no magnitude, like real catalogues.
        let mag_cell = if i % 50 == 49 { String::new() } else { format!("{mag:.1}") };

        writer.write_record([
            time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            format!("{:.4}", rng.gauss(lat, spread / 2.0).clamp(-90.0, 90.0)),
            format!("{:.4}", (rng.gauss(lon, spread / 2.0) + 180.0).rem_euclid(360.0) - 180.0),
            format!("{depth:.2}"),
            mag_cell,
            format!("{duration:.1}"),
            format!("{:.0} km from {name}", rng.range(5.0, 120.0)),
        ])?;
    }
    writer.flush()?;

    log::info!("wrote {n_events} events to {}", out.display());
    println!("Wrote {n_events} events to {}", out.display());
    Ok(())
}
