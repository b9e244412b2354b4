//! Clipping of chart geometry to the visible value range.
//!
//! Plotters maps coordinates outside the axis range onto the plot border, so
//! lines and bands are cut at the range limits before they are drawn.

/// `(x, y)` in chart units.
pub type Point = (f64, f64);

/// Split a polyline into the runs that stay within `lo..=hi`.
///
/// Segments that cross a limit are cut at the interpolated crossing point, so
/// each run starts and ends either on an input vertex or exactly on a limit.
pub fn clip_polyline(points: &[Point], lo: f64, hi: f64) -> Vec<Vec<Point>> {
    let mut runs = Vec::new();

    if let [only] = points {
        if only.1 >= lo && only.1 <= hi {
            runs.push(vec![*only]);
        }
        return runs;
    }

    let mut current: Vec<Point> = Vec::new();
    for pair in points.windows(2) {
        let (p, q) = (pair[0], pair[1]);
        let Some((t0, t1)) = visible_span(p.1, q.1, lo, hi) else {
            flush(&mut runs, &mut current);
            continue;
        };

        if t0 > 0.0 {
            flush(&mut runs, &mut current);
        }
        if current.is_empty() {
            current.push(lerp(p, q, t0));
        }
        current.push(lerp(p, q, t1));
        if t1 < 1.0 {
            flush(&mut runs, &mut current);
        }
    }
    flush(&mut runs, &mut current);

    runs
}

/// Closed polygons covering the band between two curves sampled at the same
/// `x` values, limited to `lo..=hi`.
///
/// Band edges are clamped per vertex. Stretches where the clamped band has no
/// height (both curves beyond the same limit) produce no polygon.
pub fn clip_band(samples: &[(f64, f64, f64)], lo: f64, hi: f64) -> Vec<Vec<Point>> {
    let mut polygons = Vec::new();
    let mut upper: Vec<Point> = Vec::new();
    let mut lower: Vec<Point> = Vec::new();

    for &(x, a, b) in samples {
        let top = a.max(b).clamp(lo, hi);
        let bottom = a.min(b).clamp(lo, hi);
        if top > bottom {
            upper.push((x, top));
            lower.push((x, bottom));
            continue;
        }
        close_band(&mut polygons, &mut upper, &mut lower);
    }
    close_band(&mut polygons, &mut upper, &mut lower);

    polygons
}

/// Parameter interval `[t0, t1]` of the segment `y0 -> y1` inside `lo..=hi`.
fn visible_span(y0: f64, y1: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    if !y0.is_finite() || !y1.is_finite() {
        return None;
    }

    let dy = y1 - y0;
    if dy == 0.0 {
        return (y0 >= lo && y0 <= hi).then_some((0.0, 1.0));
    }

    let (a, b) = ((lo - y0) / dy, (hi - y0) / dy);
    let (enter, exit) = if a < b { (a, b) } else { (b, a) };
    let (t0, t1) = (enter.max(0.0), exit.min(1.0));
    (t0 <= t1).then_some((t0, t1))
}

fn lerp(p: Point, q: Point, t: f64) -> Point {
    if t <= 0.0 {
        return p;
    }
    if t >= 1.0 {
        return q;
    }
    (p.0 + (q.0 - p.0) * t, p.1 + (q.1 - p.1) * t)
}

fn flush(runs: &mut Vec<Vec<Point>>, current: &mut Vec<Point>) {
    if !current.is_empty() {
        runs.push(std::mem::take(current));
    }
}

fn close_band(polygons: &mut Vec<Vec<Point>>, upper: &mut Vec<Point>, lower: &mut Vec<Point>) {
    if upper.len() >= 2 {
        let mut polygon = std::mem::take(upper);
        polygon.extend(lower.drain(..).rev());
        polygons.push(polygon);
    }
    upper.clear();
    lower.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn line_inside_the_range_is_untouched() {
        let line = [(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)];
        assert_eq!(clip_polyline(&line, 0.0, 200.0), vec![line.to_vec()]);
    }

    #[test]
    fn line_leaving_the_top_ends_on_the_limit() {
        // 150 -> 250 crosses 200 halfway.
        let runs = clip_polyline(&[(0.0, 100.0), (1.0, 150.0), (2.0, 250.0), (3.0, 400.0)], 0.0, 200.0);
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.len(), 3);
        assert!(close(run[2], (1.5, 200.0)), "{run:?}");
    }

    #[test]
    fn line_entering_from_below_starts_on_the_limit() {
        let runs = clip_polyline(&[(0.0, -40.0), (1.0, -20.0), (2.0, 20.0), (3.0, 60.0)], 0.0, 200.0);
        assert_eq!(runs.len(), 1);
        assert!(close(runs[0][0], (1.5, 0.0)), "{:?}", runs[0]);
        assert!(close(*runs[0].last().unwrap(), (3.0, 60.0)));
    }

    #[test]
    fn excursions_split_the_line_into_runs() {
        let runs = clip_polyline(&[(0.0, 150.0), (1.0, 250.0), (2.0, 150.0)], 0.0, 200.0);
        assert_eq!(runs.len(), 2);
        assert!(close(runs[0][1], (0.5, 200.0)));
        assert!(close(runs[1][0], (1.5, 200.0)));
    }

    #[test]
    fn segment_jumping_over_the_range_keeps_the_middle() {
        let runs = clip_polyline(&[(0.0, -100.0), (1.0, 300.0)], 0.0, 200.0);
        assert_eq!(runs.len(), 1);
        assert!(close(runs[0][0], (0.25, 0.0)));
        assert!(close(runs[0][1], (0.75, 200.0)));
    }

    #[test]
    fn line_entirely_outside_produces_nothing() {
        assert!(clip_polyline(&[(0.0, 210.0), (1.0, 500.0)], 0.0, 200.0).is_empty());
        assert!(clip_polyline(&[(0.0, -1.0)], 0.0, 200.0).is_empty());
        assert!(clip_polyline(&[], 0.0, 200.0).is_empty());
    }

    #[test]
    fn band_is_clamped_and_dropped_where_flat() {
        let samples = [
            (0.0, 150.0, -20.0),
            (1.0, 190.0, 10.0),
            (2.0, 260.0, 60.0),
            (3.0, 300.0, 220.0),
            (4.0, 400.0, 300.0),
        ];
        let polygons = clip_band(&samples, 0.0, 200.0);
        assert_eq!(polygons.len(), 1);
        let polygon = &polygons[0];
        assert_eq!(
            polygon,
            &vec![
                (0.0, 150.0),
                (1.0, 190.0),
                (2.0, 200.0),
                (2.0, 60.0),
                (1.0, 10.0),
                (0.0, 0.0)
            ]
        );
        assert!(polygon.iter().all(|&(_, y)| (0.0..=200.0).contains(&y)));
    }

    #[test]
    fn band_order_of_curves_does_not_matter() {
        let a = clip_band(&[(0.0, 10.0, 50.0), (1.0, 20.0, 60.0)], 0.0, 200.0);
        let b = clip_band(&[(0.0, 50.0, 10.0), (1.0, 60.0, 20.0)], 0.0, 200.0);
        assert_eq!(a, b);
    }
}
