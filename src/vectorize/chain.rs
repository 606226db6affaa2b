//! Edge chain tracing: 8-connected edge pixels → ordered pixel chains.
//!
//! Each unvisited edge pixel starts a greedy walk that always moves to the
//! first unvisited edge neighbor in row-major order. A finished walk is
//! spliced onto the first earlier chain with an 8-adjacent endpoint,
//! reversing it when needed so the result still runs head to tail.
//! Junction handling is a heuristic: at a Y or X intersection the chain
//! shape depends on scan order.

use std::collections::VecDeque;

use image::GrayImage;
use log::debug;

/// Offsets in row-major scan order.
const NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// An ordered run of connected edge pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelChain {
    pixels: VecDeque<(i32, i32)>,
}

impl PixelChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn head(&self) -> Option<(i32, i32)> {
        self.pixels.front().copied()
    }

    pub fn tail(&self) -> Option<(i32, i32)> {
        self.pixels.back().copied()
    }

    pub fn push_back(&mut self, pixel: (i32, i32)) {
        self.pixels.push_back(pixel);
    }

    pub fn push_front(&mut self, pixel: (i32, i32)) {
        self.pixels.push_front(pixel);
    }

    pub fn reverse(&mut self) {
        self.pixels.make_contiguous().reverse();
    }

    /// Append `other` after this chain's tail.
    pub fn append(&mut self, other: PixelChain) {
        self.pixels.extend(other.pixels);
    }

    /// Put `other` in front of this chain's head.
    pub fn prepend(&mut self, other: PixelChain) {
        for pixel in other.pixels.into_iter().rev() {
            self.pixels.push_front(pixel);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(i32, i32)> {
        self.pixels.iter()
    }

    pub fn to_vec(&self) -> Vec<(i32, i32)> {
        self.pixels.iter().copied().collect()
    }
}

impl FromIterator<(i32, i32)> for PixelChain {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        Self {
            pixels: iter.into_iter().collect(),
        }
    }
}

/// 8-adjacent or identical.
fn touches(a: (i32, i32), b: (i32, i32)) -> bool {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy < 3
}

/// Trace every edge pixel (value > 0) into chains, dropping chains with
/// fewer than `min_length` pixels.
pub fn trace_edges(edges: &GrayImage, min_length: usize) -> Vec<PixelChain> {
    let (w, h) = edges.dimensions();
    let (w, h) = (w as i32, h as i32);
    let is_edge = |x: i32, y: i32| {
        x >= 0 && y >= 0 && x < w && y < h && edges.get_pixel(x as u32, y as u32)[0] > 0
    };
    let index = |x: i32, y: i32| (y * w + x) as usize;
    let mut visited = vec![false; (w * h) as usize];
    let mut chains: Vec<PixelChain> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if !is_edge(x, y) || visited[index(x, y)] {
                continue;
            }

            let mut walk = PixelChain::new();
            let mut current = Some((x, y));
            while let Some((cx, cy)) = current {
                visited[index(cx, cy)] = true;
                walk.push_back((cx, cy));
                current = NEIGHBORS
                    .iter()
                    .map(|&(dx, dy)| (cx + dx, cy + dy))
                    .find(|&(nx, ny)| is_edge(nx, ny) && !visited[index(nx, ny)]);
            }

            stitch(&mut chains, walk);
        }
    }

    let total = chains.len();
    chains.retain(|c| c.len() >= min_length);
    debug!(
        "traced {total} chains, {} with at least {min_length} pixels",
        chains.len()
    );
    chains
}

/// Splice `walk` onto the first chain it touches, or start a new chain.
fn stitch(chains: &mut Vec<PixelChain>, mut walk: PixelChain) {
    let (Some(head), Some(tail)) = (walk.head(), walk.tail()) else {
        return;
    };
    for chain in chains.iter_mut() {
        let (Some(chain_head), Some(chain_tail)) = (chain.head(), chain.tail()) else {
            continue;
        };
        if touches(chain_tail, head) {
            chain.append(walk);
        } else if touches(chain_tail, tail) {
            walk.reverse();
            chain.append(walk);
        } else if touches(chain_head, tail) {
            chain.prepend(walk);
        } else if touches(chain_head, head) {
            walk.reverse();
            chain.prepend(walk);
        } else {
            continue;
        }
        return;
    }
    chains.push(walk);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn draw(pixels: &[(u32, u32)], size: u32) -> GrayImage {
        let mut img = GrayImage::new(size, size);
        for &(x, y) in pixels {
            img.put_pixel(x, y, Luma([255]));
        }
        img
    }

    fn is_connected(chain: &PixelChain) -> bool {
        let pixels = chain.to_vec();
        pixels.windows(2).all(|w| touches(w[0], w[1]) && w[0] != w[1])
    }

    #[test]
    fn straight_line_is_one_chain() {
        let line: Vec<(u32, u32)> = (5..45).map(|x| (x, 20)).collect();
        let chains = trace_edges(&draw(&line, 64), 10);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 40);
        assert_eq!(chains[0].head(), Some((5, 20)));
        assert_eq!(chains[0].tail(), Some((44, 20)));
    }

    #[test]
    fn diagonal_line_is_one_chain() {
        let line: Vec<(u32, u32)> = (0..30).map(|i| (i + 2, i + 1)).collect();
        let chains = trace_edges(&draw(&line, 40), 10);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 30);
        assert!(is_connected(&chains[0]));
    }

    #[test]
    fn short_chains_are_dropped() {
        let mut pixels: Vec<(u32, u32)> = (0..20).map(|x| (x, 2)).collect();
        pixels.extend((0..5).map(|x| (x + 10, 30)));
        let chains = trace_edges(&draw(&pixels, 40), 10);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 20);
    }

    #[test]
    fn walk_started_at_apex_is_stitched() {
        // The scan meets the apex first and walks down the right arm; the
        // left arm is a second walk spliced on reversed at the head.
        let mut pixels: Vec<(u32, u32)> = (0..10).map(|i| (i, 9 - i)).collect();
        pixels.extend((0..10).map(|i| (10 + i, i)));
        let chains = trace_edges(&draw(&pixels, 32), 5);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 20);
        assert_eq!(chains[0].head(), Some((0, 9)));
        assert_eq!(chains[0].tail(), Some((19, 9)));
        assert!(is_connected(&chains[0]));
    }

    #[test]
    fn later_walk_is_prepended_when_it_touches_the_head() {
        let mut chains = vec![[(5, 5), (6, 5), (7, 5)].into_iter().collect::<PixelChain>()];
        stitch(&mut chains, [(2, 5), (3, 5), (4, 5)].into_iter().collect());
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].head(), Some((2, 5)));
        assert!(is_connected(&chains[0]));

        stitch(&mut chains, [(10, 5), (9, 5), (8, 5)].into_iter().collect());
        assert_eq!(chains[0].tail(), Some((10, 5)));
        assert!(is_connected(&chains[0]));
        assert_eq!(chains[0].len(), 9);
    }

    #[test]
    fn empty_image_has_no_chains() {
        assert!(trace_edges(&GrayImage::new(16, 16), 1).is_empty());
    }
}
