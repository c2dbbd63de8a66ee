#![allow(dead_code)]

use nalgebra::Point3;
use std::f64::consts::TAU;

/// Stem surface returns: `n` points on a ring of radius `r` around
/// `(cx, cy)`, heights spread over `[z_lo, z_hi)` independently of the angle.
///
/// `wobble` adds a radial `wobble·sin(5θ)` so the ring has a small spread.
pub fn stem(
    cx: f64,
    cy: f64,
    r: f64,
    n: usize,
    (z_lo, z_hi): (f64, f64),
    wobble: f64,
) -> Vec<Point3<f64>> {
    (0..n)
        .map(|i| {
            let t = TAU * i as f64 / n as f64;
            let ri = r + wobble * (5.0 * t).sin();
            let slot = ((i * 37) % n) as f64 + 0.5;
            let z = z_lo + (z_hi - z_lo) * slot / n as f64;
            Point3::new(cx + ri * t.cos(), cy + ri * t.sin(), z)
        })
        .collect()
}

/// Stem returns in a thin slice around 1.35.
pub fn breast_stem(cx: f64, cy: f64, r: f64, n: usize) -> Vec<Point3<f64>> {
    stem(cx, cy, r, n, (1.25, 1.45), 0.005)
}

/// Lower stem and crown returns that never reach the breast-height band.
pub fn off_band_clutter(cx: f64, cy: f64) -> Vec<Point3<f64>> {
    let mut pts = stem(cx, cy, 0.18, 80, (0.0, 0.8), 0.01);
    pts.extend((0..150).map(|i| {
        let t = TAU * i as f64 / 150.0;
        let r = 0.5 + 2.0 * ((i * 13) % 150) as f64 / 150.0;
        Point3::new(cx + r * t.cos(), cy + r * t.sin(), 4.0 + (i % 30) as f64 * 0.2)
    }));
    pts
}
