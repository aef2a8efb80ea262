use crate::types::{EPSILON, Placement, Rect};

/// An accepted position for one rectangle on a sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub x: f64,
    pub y: f64,
    /// Footprint as placed, already rotated when `rotated` is set.
    pub rect: Rect,
    pub rotated: bool,
}

impl Fit {
    fn right(&self) -> f64 {
        self.x + self.rect.w
    }

    fn top(&self) -> f64 {
        self.y + self.rect.h
    }

    fn overlaps(&self, other: &Fit, gap: f64) -> bool {
        self.x < other.right() + gap - EPSILON
            && other.x < self.right() + gap - EPSILON
            && self.y < other.top() + gap - EPSILON
            && other.y < self.top() + gap - EPSILON
    }
}

/// One opened stock sheet and everything placed on it so far.
#[derive(Debug, Clone)]
pub struct SheetBin {
    pub instance_id: String,
    /// Index into the ordered inventory rows this sheet was opened from.
    pub row_index: usize,
    stock: Rect,
    kerf: f64,
    occupied: Vec<Fit>,
    used_area: f64,
    pub placements: Vec<Placement>,
}

impl SheetBin {
    pub fn new(instance_id: String, row_index: usize, stock: Rect, kerf: f64) -> Self {
        Self {
            instance_id,
            row_index,
            stock,
            kerf,
            occupied: Vec::new(),
            used_area: 0.0,
            placements: Vec::new(),
        }
    }

    pub fn stock(&self) -> Rect {
        self.stock
    }

    pub fn used_area(&self) -> f64 {
        self.used_area
    }

    pub fn free_area(&self) -> f64 {
        self.stock.area() - self.used_area
    }

    pub fn hosts_liner(&self) -> bool {
        self.placements.iter().any(|p| p.is_liner)
    }

    /// Reserves the area of `fit` without recording a placement.
    pub fn occupy(&mut self, fit: Fit) {
        self.used_area += fit.rect.area();
        self.occupied.push(fit);
    }

    pub fn commit(&mut self, fit: Fit, placement: Placement) {
        self.occupy(fit);
        self.placements.push(placement);
    }

    /// First-fit position for `piece`, unrotated orientation first.
    pub fn find_fit(&self, piece: Rect) -> Option<Fit> {
        orientations(piece).find_map(|rotated| self.first_fit(&[], piece, rotated))
    }

    /// Positions for two separately cut panels. Every orientation of `a`
    /// is tried before giving up, each paired with every orientation of `b`.
    pub fn find_pair_fit(&self, a: Rect, b: Rect) -> Option<[Fit; 2]> {
        for rotated_a in orientations(a) {
            let Some(fit_a) = self.first_fit(&[], a, rotated_a) else {
                continue;
            };
            for rotated_b in orientations(b) {
                if let Some(fit_b) = self.first_fit(&[fit_a], b, rotated_b) {
                    return Some([fit_a, fit_b]);
                }
            }
        }
        None
    }

    /// Positions for an L-cut: the combined blank is placed as one rectangle
    /// and then split back into the long and short wall.
    pub fn find_lcut_fit(&self, long: Rect, short: Rect) -> Option<[Fit; 2]> {
        let blank = Rect::new(long.w + short.w, long.h);
        for rotated in orientations(blank) {
            let Some(fit) = self.first_fit(&[], blank, rotated) else {
                continue;
            };
            let parts = if rotated {
                [
                    Fit {
                        x: fit.x,
                        y: fit.y,
                        rect: long.rotated(),
                        rotated: true,
                    },
                    Fit {
                        x: fit.x,
                        y: fit.y + long.w,
                        rect: short.rotated(),
                        rotated: true,
                    },
                ]
            } else {
                [
                    Fit {
                        x: fit.x,
                        y: fit.y,
                        rect: long,
                        rotated: false,
                    },
                    Fit {
                        x: fit.x + long.w,
                        y: fit.y,
                        rect: short,
                        rotated: false,
                    },
                ]
            };
            if self.split_is_valid(&parts) {
                return Some(parts);
            }
        }
        None
    }

    fn split_is_valid(&self, parts: &[Fit; 2]) -> bool {
        parts.iter().all(|p| self.in_bounds(p) && self.is_free(&[], p))
            && !parts[0].overlaps(&parts[1], 0.0)
    }

    fn in_bounds(&self, fit: &Fit) -> bool {
        fit.x >= -EPSILON
            && fit.y >= -EPSILON
            && fit.right() <= self.stock.w + EPSILON
            && fit.top() <= self.stock.h + EPSILON
    }

    fn is_free(&self, extra: &[Fit], fit: &Fit) -> bool {
        self.occupied
            .iter()
            .chain(extra)
            .all(|o| !o.overlaps(fit, self.kerf))
    }

    /// Scans anchor points row by row (y ascending, then x ascending) and
    /// returns the first position where `piece` fits. `extra` holds
    /// tentative placements that are not committed yet.
    fn first_fit(&self, extra: &[Fit], piece: Rect, rotated: bool) -> Option<Fit> {
        let rect = if rotated { piece.rotated() } else { piece };
        if !rect.fits_in(&self.stock) {
            return None;
        }

        let mut xs = vec![0.0];
        let mut ys = vec![0.0];
        for o in self.occupied.iter().chain(extra) {
            xs.push(o.right() + self.kerf);
            ys.push(o.top() + self.kerf);
        }
        sort_anchors(&mut xs);
        sort_anchors(&mut ys);

        for &y in &ys {
            for &x in &xs {
                let fit = Fit { x, y, rect, rotated };
                if self.in_bounds(&fit) && self.is_free(extra, &fit) {
                    return Some(fit);
                }
            }
        }
        None
    }
}

fn orientations(piece: Rect) -> impl Iterator<Item = bool> {
    let rotations: &[bool] = if piece.is_square() {
        &[false]
    } else {
        &[false, true]
    };
    rotations.iter().copied()
}

fn sort_anchors(anchors: &mut Vec<f64>) {
    anchors.sort_by(f64::total_cmp);
    anchors.dedup_by(|a, b| (*a - *b).abs() <= EPSILON);
}
