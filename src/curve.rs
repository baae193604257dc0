use serde::{Deserialize, Serialize};

/// Number of straight segments used to flatten each cubic span
const SEGMENTS_PER_SPAN: usize = 16;

/// Interpolation used to connect line-chart points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    Linear,
    #[default]
    Natural,
}

impl Curve {
    pub fn interpolate(self, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        match self {
            Curve::Linear => points.to_vec(),
            Curve::Natural => natural(points),
        }
    }
}

/// Natural cubic spline through `points`, flattened to a polyline.
/// Fewer than three points are returned as-is.
pub fn natural(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (ax, bx) = control_points(&xs);
    let (ay, by) = control_points(&ys);

    let mut out = Vec::with_capacity((points.len() - 1) * SEGMENTS_PER_SPAN + 1);
    out.push(points[0]);
    for i in 0..points.len() - 1 {
        let p0 = points[i];
        let c1 = (ax[i], ay[i]);
        let c2 = (bx[i], by[i]);
        let p3 = points[i + 1];
        for s in 1..=SEGMENTS_PER_SPAN {
            let t = s as f64 / SEGMENTS_PER_SPAN as f64;
            out.push(cubic_bezier(p0, c1, c2, p3, t));
        }
    }
    out
}

/// Bezier control points of the natural spline through `x`, solved with
/// the tridiagonal (Thomas) algorithm. Requires at least 3 values.
fn control_points(x: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = x.len() - 1;
    let mut a = vec![0.0; n];
    let mut b = vec![0.0; n];
    let mut r = vec![0.0; n];

    a[0] = 0.0;
    b[0] = 2.0;
    r[0] = x[0] + 2.0 * x[1];
    for i in 1..n - 1 {
        a[i] = 1.0;
        b[i] = 4.0;
        r[i] = 4.0 * x[i] + 2.0 * x[i + 1];
    }
    a[n - 1] = 2.0;
    b[n - 1] = 7.0;
    r[n - 1] = 8.0 * x[n - 1] + x[n];

    for i in 1..n {
        let m = a[i] / b[i - 1];
        b[i] -= m;
        r[i] -= m * r[i - 1];
    }

    a[n - 1] = r[n - 1] / b[n - 1];
    for i in (0..n - 1).rev() {
        a[i] = (r[i] - a[i + 1]) / b[i];
    }
    b[n - 1] = (x[n] + a[n - 1]) / 2.0;
    for i in 0..n - 1 {
        b[i] = 2.0 * x[i + 1] - a[i + 1];
    }

    (a, b)
}

fn cubic_bezier(
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
    t: f64,
) -> (f64, f64) {
    let u = 1.0 - t;
    let w0 = u * u * u;
    let w1 = 3.0 * u * u * t;
    let w2 = 3.0 * u * t * t;
    let w3 = t * t * t;
    (
        w0 * p0.0 + w1 * p1.0 + w2 * p2.0 + w3 * p3.0,
        w0 * p0.1 + w1 * p1.1 + w2 * p2.1 + w3 * p3.1,
    )
}
