use std::f64::consts::PI;

/// A caliper pressed flat against one edge of a convex hull.
///
/// Every minimum-area enclosing rectangle of a convex polygon has a side
/// collinear with one of the polygon's edges, so sweeping a caliper over all
/// edges enumerates every candidate footprint.
#[derive(Debug, Clone, Copy)]
pub struct Caliper<'a> {
    pub convex_hull: &'a [geo::Point<f64>],
    pub edge_index: usize,
}

impl<'a> Caliper<'a> {
    /// One caliper per hull edge, in hull order.
    pub fn sweep(convex_hull: &'a [geo::Point<f64>]) -> impl Iterator<Item = Caliper<'a>> + 'a {
        (0..convex_hull.len()).map(move |edge_index| Caliper {
            convex_hull,
            edge_index,
        })
    }

    /// Direction of the supporting edge, in `[0, 2pi)`.
    pub fn angle(&self) -> f64 {
        let size = self.convex_hull.len();
        let from = &self.convex_hull[self.edge_index];
        let to = &self.convex_hull[(self.edge_index + 1) % size];
        let t = (to.y() - from.y()).atan2(to.x() - from.x());

        if t >= 0.0 {
            t
        } else {
            t + PI * 2.0
        }
    }

    /// Tightest rectangle around the hull with one side along the edge.
    ///
    /// Corners go (min u, min v), (max u, min v), (max u, max v),
    /// (min u, max v) where u runs along the edge, so corner 0 to corner 1
    /// is the box length and corner 0 to corner 3 its width.
    pub fn rectangle(&self) -> [(f64, f64); 4] {
        let (sin, cos) = self.angle().sin_cos();

        let (u_min, u_max, v_min, v_max) = self.convex_hull.iter().fold(
            (
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
            ),
            |(u_min, u_max, v_min, v_max), p| {
                let u = p.x() * cos + p.y() * sin;
                let v = -p.x() * sin + p.y() * cos;
                (u_min.min(u), u_max.max(u), v_min.min(v), v_max.max(v))
            },
        );

        let corner = |u: f64, v: f64| (u * cos - v * sin, u * sin + v * cos);
        [
            corner(u_min, v_min),
            corner(u_max, v_min),
            corner(u_max, v_max),
            corner(u_min, v_max),
        ]
    }
}
