//! Initial placement for newly added nodes.
//!
//! Nodes are dealt out along diagonal bands of width `2 * rest_length`,
//! starting near the top-left corner, so that no two new nodes share a
//! position. Coincident nodes would leave the repulsion direction undefined
//! and the pair would never separate.

use super::config::Viewport;
use super::vector::Vec2;

/// Deterministic jitter in `[0, 1)`.
///
/// Linear congruential sequence; layouts are reproducible for a given seed.
#[derive(Debug, Clone)]
struct Jitter {
    state: u32,
}

impl Jitter {
    const MULTIPLIER: u32 = 9301;
    const INCREMENT: u32 = 49297;
    const MODULUS: u32 = 233_280;

    fn new(seed: u32) -> Self {
        Self {
            state: seed % Self::MODULUS,
        }
    }

    fn next(&mut self) -> f64 {
        self.state = (self.state * Self::MULTIPLIER + Self::INCREMENT) % Self::MODULUS;
        f64::from(self.state) / f64::from(Self::MODULUS)
    }
}

/// Cursor that hands out starting positions.
#[derive(Debug, Clone)]
pub struct Placement {
    last: Option<Vec2>,
    jitter: Jitter,
    seed: u32,
}

impl Placement {
    pub fn new(seed: u32) -> Self {
        Self {
            last: None,
            jitter: Jitter::new(seed),
            seed,
        }
    }

    /// Return the position for the next node and advance the cursor.
    pub fn next(&mut self, rest_length: f64, viewport: Option<Viewport>) -> Vec2 {
        let band = 2.0 * rest_length;
        let placed = self.last.unwrap_or(Vec2::new(band, band));

        let mut next = placed;
        let overflowed = viewport.is_some_and(|v| {
            (v.width > 0.0 && placed.x > v.width) || (v.height > 0.0 && placed.y > v.height)
        });

        if overflowed {
            next.x = band + rest_length * self.jitter.next();
            next.y = band + rest_length * self.jitter.next();
        } else if placed.y <= band {
            next.y = placed.x + band;
            next.x = band + rest_length * self.jitter.next();
        } else if placed.y <= placed.x {
            next.y -= band;
        } else {
            next.x += band;
        }

        self.last = Some(next);
        placed
    }

    /// Forget every placed node; the jitter sequence restarts from its seed.
    pub fn reset(&mut self) {
        self.last = None;
        self.jitter = Jitter::new(self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_node_at_band_corner() {
        let mut placement = Placement::new(0);
        assert_eq!(placement.next(50.0, None), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_no_two_nodes_coincide() {
        let mut placement = Placement::new(3);
        let points: Vec<Vec2> = (0..64).map(|_| placement.next(50.0, None)).collect();

        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                assert!(a.distance(*b) > 1.0, "{a} and {b} coincide");
            }
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let mut first = Placement::new(11);
        let mut second = Placement::new(11);
        for _ in 0..20 {
            assert_eq!(first.next(50.0, None), second.next(50.0, None));
        }
    }

    #[test]
    fn test_wraps_inside_viewport() {
        let viewport = Some(Viewport::new(300.0, 300.0));
        let mut placement = Placement::new(0);

        for _ in 0..50 {
            let p = placement.next(50.0, viewport);
            // A point may overshoot by at most one band before the cursor wraps.
            assert!(p.x <= 300.0 + 100.0 && p.y <= 300.0 + 100.0, "{p} escaped");
        }
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut placement = Placement::new(5);
        let first: Vec<Vec2> = (0..5).map(|_| placement.next(50.0, None)).collect();
        placement.reset();
        let again: Vec<Vec2> = (0..5).map(|_| placement.next(50.0, None)).collect();
        assert_eq!(first, again);
    }
}
