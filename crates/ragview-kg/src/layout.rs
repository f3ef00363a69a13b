//! 3-D force-directed layout.
//!
//! Fruchterman & Reingold (1991) in three dimensions. Initial positions come
//! from a seeded RNG so the same graph always lands in the same place.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::KnowledgeGraph;

pub type Position = [f64; 3];

const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct SpringLayout {
    /// Optimal distance between nodes.
    pub k: f64,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self { k: 0.5, iterations: 50, seed: 42 }
    }
}

impl SpringLayout {
    /// Positions indexed like `graph.nodes()`, rescaled into [-1, 1].
    pub fn compute(&self, graph: &KnowledgeGraph) -> Vec<Position> {
        let n = graph.node_count();
        match n {
            0 => return vec![],
            1 => return vec![[0.0; 3]],
            _ => {}
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<Position> = (0..n)
            .map(|_| [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()])
            .collect();

        let k = self.k;
        let k_squared = k * k;
        let mut temperature = 0.1;
        let cooling = temperature / (self.iterations as f64 + 1.0);

        for _ in 0..self.iterations {
            let mut disp = vec![[0.0f64; 3]; n];

            // Repulsion between every pair: k² / d
            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = sub(pos[i], pos[j]);
                    let dist = norm(delta).max(MIN_DISTANCE);
                    let force = k_squared / dist;
                    for axis in 0..3 {
                        let f = delta[axis] / dist * force;
                        disp[i][axis] += f;
                        disp[j][axis] -= f;
                    }
                }
            }

            // Attraction along edges: d² / k
            for &(u, v) in graph.edges() {
                if u == v {
                    continue;
                }
                let delta = sub(pos[u], pos[v]);
                let dist = norm(delta).max(MIN_DISTANCE);
                let force = dist * dist / k;
                for axis in 0..3 {
                    let f = delta[axis] / dist * force;
                    disp[u][axis] -= f;
                    disp[v][axis] += f;
                }
            }

            // Displacement capped by temperature
            for (p, d) in pos.iter_mut().zip(&disp) {
                let len = norm(*d).max(MIN_DISTANCE);
                let step = len.min(temperature);
                for axis in 0..3 {
                    p[axis] += d[axis] / len * step;
                }
            }

            temperature -= cooling;
        }

        rescale(&mut pos);
        pos
    }
}

fn sub(a: Position, b: Position) -> Position {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(v: Position) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Center on the mean and scale so the largest coordinate magnitude is 1.
fn rescale(pos: &mut [Position]) {
    let n = pos.len() as f64;
    let mut center = [0.0; 3];
    for p in pos.iter() {
        for axis in 0..3 {
            center[axis] += p[axis] / n;
        }
    }
    let mut lim: f64 = 0.0;
    for p in pos.iter_mut() {
        for axis in 0..3 {
            p[axis] -= center[axis];
            lim = lim.max(p[axis].abs());
        }
    }
    if lim > 0.0 {
        for p in pos.iter_mut() {
            for axis in 0..3 {
                p[axis] /= lim;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_with_tail() -> KnowledgeGraph {
        let mut g = KnowledgeGraph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        g.add_edge("c", "a");
        g.add_edge("c", "d");
        g
    }

    #[test]
    fn test_empty_and_single() {
        let layout = SpringLayout::default();
        assert!(layout.compute(&KnowledgeGraph::new()).is_empty());

        let mut g = KnowledgeGraph::new();
        g.add_node("solo");
        assert_eq!(layout.compute(&g), vec![[0.0; 3]]);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let g = triangle_with_tail();
        let layout = SpringLayout::default();
        assert_eq!(layout.compute(&g), layout.compute(&g));
    }

    #[test]
    fn test_positions_within_unit_cube() {
        let g = triangle_with_tail();
        let pos = SpringLayout::default().compute(&g);
        assert_eq!(pos.len(), 4);
        let max = pos.iter().flat_map(|p| p.iter()).fold(0.0f64, |m, c| m.max(c.abs()));
        assert!((max - 1.0).abs() < 1e-9);
        assert!(pos.iter().flat_map(|p| p.iter()).all(|c| c.is_finite()));
    }

    #[test]
    fn test_neighbours_closer_than_strangers() {
        let mut g = KnowledgeGraph::new();
        g.add_edge("a", "b");
        g.add_node("far");
        let layout = SpringLayout { iterations: 200, ..SpringLayout::default() };
        let pos = layout.compute(&g);
        let ab = norm(sub(pos[0], pos[1]));
        let a_far = norm(sub(pos[0], pos[2]));
        assert!(ab < a_far, "linked {ab} vs unlinked {a_far}");
    }
}
