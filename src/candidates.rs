//! Placement candidates: single panels and two-panel bundle cuts.
//!
//! Every candidate carries a cost estimate at the cheapest inventory rate. The
//! estimate is only used to rank the queue; final pricing happens in
//! [`crate::cost`].

use crate::types::{EPSILON, PanelBlueprint, PanelRole, Rect, SQ_IN_PER_SQ_FT};

/// Candidate kind. Declaration order is queue priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateKind {
    /// Long and short wall of equal height cut as one blank.
    LCut,
    /// Two panels sharing an edge, placed side by side.
    Bundle,
    Single,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub kind: CandidateKind,
    /// Indices into the panel list. Always one entry for singles, two for bundles.
    pub members: Vec<usize>,
    pub total_area: f64,
    pub longest_side: f64,
    pub cost_impact: f64,
    pub bundle_savings: f64,
}

impl Candidate {
    pub fn is_bundle(&self) -> bool {
        self.kind != CandidateKind::Single
    }
}

/// Panel pairs that may be cut together.
const BUNDLE_TABLE: &[(PanelRole, PanelRole, CandidateKind)] = &[
    (PanelRole::LongWall(1), PanelRole::ShortWall(1), CandidateKind::LCut),
    (PanelRole::LongWall(2), PanelRole::ShortWall(2), CandidateKind::LCut),
    (PanelRole::Floor, PanelRole::LongWall(1), CandidateKind::Bundle),
    (PanelRole::Floor, PanelRole::ShortWall(1), CandidateKind::Bundle),
];

/// Combined blank of an L-cut: both walls laid end to end at their shared height.
pub fn lcut_blank(long: &PanelBlueprint, short: &PanelBlueprint) -> Rect {
    Rect::new(long.width + short.width, long.height)
}

/// Longest side length two rectangles have in common.
fn shared_edge(a: Rect, b: Rect) -> Option<f64> {
    [(a.w, b.w), (a.w, b.h), (a.h, b.w), (a.h, b.h)]
        .into_iter()
        .filter(|(p, q)| (p - q).abs() <= EPSILON)
        .map(|(p, _)| p)
        .max_by(f64::total_cmp)
}

fn area_cost(area: f64, rate: f64) -> f64 {
    area / SQ_IN_PER_SQ_FT * rate
}

fn single(index: usize, panel: &PanelBlueprint, rate: f64) -> Candidate {
    let rect = panel.rect();
    Candidate {
        id: format!("single:{}", panel.id),
        name: panel.name.clone(),
        kind: CandidateKind::Single,
        members: vec![index],
        total_area: rect.area(),
        longest_side: rect.longest_side(),
        cost_impact: area_cost(rect.area(), rate),
        bundle_savings: 0.0,
    }
}

fn bundle(
    kind: CandidateKind,
    (ia, a): (usize, &PanelBlueprint),
    (ib, b): (usize, &PanelBlueprint),
    rate: f64,
    edge_allowance: f64,
) -> Option<Candidate> {
    let (edge, longest_side) = match kind {
        CandidateKind::LCut => {
            if (a.height - b.height).abs() > EPSILON {
                return None;
            }
            (a.height, lcut_blank(a, b).longest_side())
        }
        _ => (
            shared_edge(a.rect(), b.rect())?,
            a.rect().longest_side().max(b.rect().longest_side()),
        ),
    };

    let total_area = a.rect().area() + b.rect().area();
    let bundle_savings = area_cost(edge * edge_allowance, rate);
    Some(Candidate {
        id: format!("bundle:{}+{}", a.id, b.id),
        name: format!("{} + {}", a.name, b.name),
        kind,
        members: vec![ia, ib],
        total_area,
        longest_side,
        cost_impact: area_cost(total_area, rate) - bundle_savings,
        bundle_savings,
    })
}

/// Builds the placement queue for `panels`.
///
/// `reference_rate` is the cheapest cost per square foot in the inventory and
/// `edge_allowance` the strip width, in inches, saved along a shared edge.
/// The queue holds L-cuts, then other bundles, then singles; each group is
/// ordered by cost impact, total area, longest side and name.
pub fn generate_candidates(
    panels: &[PanelBlueprint],
    reference_rate: f64,
    edge_allowance: f64,
) -> Vec<Candidate> {
    let find = |role: PanelRole| panels.iter().enumerate().find(|(_, p)| p.role == role);

    let mut candidates: Vec<Candidate> = BUNDLE_TABLE
        .iter()
        .filter_map(|&(first, second, kind)| {
            bundle(kind, find(first)?, find(second)?, reference_rate, edge_allowance)
        })
        .collect();

    candidates.extend(
        panels
            .iter()
            .enumerate()
            .map(|(i, panel)| single(i, panel, reference_rate)),
    );

    candidates.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then(a.cost_impact.total_cmp(&b.cost_impact))
            .then(a.total_area.total_cmp(&b.total_area))
            .then(a.longest_side.total_cmp(&b.longest_side))
            .then_with(|| a.name.cmp(&b.name))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::build_panels;
    use crate::types::{FabricationEnvelope, PlanterInput};

    fn box_panels(shelf: bool) -> Vec<PanelBlueprint> {
        let input = PlanterInput {
            shelf_enabled: shelf,
            ..PlanterInput::new(36.0, 24.0, 18.0)
        };
        let outer = FabricationEnvelope {
            length: 36.0,
            width: 24.0,
            height: 18.0,
        };
        build_panels(&input, &outer, None)
    }

    #[test]
    fn test_single_cost_impact() {
        let panels = box_panels(false);
        let queue = generate_candidates(&panels, 2.0, 0.5);
        let floor = queue.iter().find(|c| c.id == "single:floor").unwrap();
        assert!((floor.cost_impact - 24.0 * 36.0 / 144.0 * 2.0).abs() < 1e-9);
        assert_eq!(floor.bundle_savings, 0.0);
        assert_eq!(floor.members.len(), 1);
    }

    #[test]
    fn test_bundles_from_table() {
        let panels = box_panels(false);
        let queue = generate_candidates(&panels, 2.0, 0.5);
        let bundles: Vec<&str> = queue
            .iter()
            .filter(|c| c.is_bundle())
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(bundles.len(), 4);
        assert!(bundles.contains(&"bundle:long-1+short-1"));
        assert!(bundles.contains(&"bundle:long-2+short-2"));
        assert!(bundles.contains(&"bundle:floor+long-1"));
        assert!(bundles.contains(&"bundle:floor+short-1"));
        assert_eq!(queue.len(), 4 + panels.len());
    }

    #[test]
    fn test_bundle_cheaper_than_its_singles() {
        let panels = box_panels(false);
        let queue = generate_candidates(&panels, 2.73, 0.5);
        let cost = |id: &str| queue.iter().find(|c| c.id == id).unwrap().cost_impact;
        let pos = |id: &str| queue.iter().position(|c| c.id == id).unwrap();

        let bundle = cost("bundle:floor+long-1");
        assert!(bundle < cost("single:floor") + cost("single:long-1"));
        assert!(pos("bundle:floor+long-1") < pos("single:floor"));
        assert!(pos("bundle:floor+long-1") < pos("single:long-1"));

        let b = &queue[pos("bundle:floor+long-1")];
        // shared edge is the 36in floor length
        assert!((b.bundle_savings - 36.0 * 0.5 / 144.0 * 2.73).abs() < 1e-9);
    }

    #[test]
    fn test_queue_order() {
        let panels = box_panels(true);
        let queue = generate_candidates(&panels, 2.0, 0.5);

        let kinds: Vec<CandidateKind> = queue.iter().map(|c| c.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert_eq!(queue[0].kind, CandidateKind::LCut);

        for pair in queue.windows(2) {
            if pair[0].kind == pair[1].kind {
                assert!(pair[0].cost_impact <= pair[1].cost_impact);
            }
        }

        // identical walls tie on everything but the name
        let lcuts: Vec<&str> = queue
            .iter()
            .filter(|c| c.kind == CandidateKind::LCut)
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(lcuts, ["bundle:long-1+short-1", "bundle:long-2+short-2"]);

        // floor and shelf share every metric, Floor sorts before Shelf
        let floor = queue.iter().position(|c| c.id == "single:floor").unwrap();
        let shelf = queue.iter().position(|c| c.id == "single:shelf").unwrap();
        assert!(floor < shelf);
    }

    #[test]
    fn test_lcut_blank_and_longest_side() {
        let panels = box_panels(false);
        let queue = generate_candidates(&panels, 2.0, 0.5);
        let lcut = &queue[0];
        let long = &panels[lcut.members[0]];
        let short = &panels[lcut.members[1]];
        assert_eq!(lcut_blank(long, short), Rect::new(60.0, 18.0));
        assert_eq!(lcut.longest_side, 60.0);
    }

    #[test]
    fn test_liner_panels_are_never_bundled() {
        let input = PlanterInput {
            floor_enabled: false,
            ..PlanterInput::new(36.0, 24.0, 18.0)
        };
        let outer = FabricationEnvelope {
            length: 36.0,
            width: 24.0,
            height: 18.0,
        };
        let inner = FabricationEnvelope {
            length: 30.0,
            width: 18.0,
            height: 9.0,
        };
        let panels = build_panels(&input, &outer, Some(&inner));
        let queue = generate_candidates(&panels, 2.0, 0.5);
        for c in queue.iter().filter(|c| c.is_bundle()) {
            assert!(c.members.iter().all(|&i| !panels[i].is_liner()));
        }
        assert_eq!(queue.iter().filter(|c| c.is_bundle()).count(), 2);
    }
}
