use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::blueprint::build_panels;
use crate::candidates::{Candidate, CandidateKind, generate_candidates};
use crate::cost::{self, Surcharges};
use crate::dimensions::{self, DEFAULT_LINER_HEIGHT_PERCENT, LipPolicy};
use crate::error::{SolveError, SolveResult};
use crate::inventory::{self, SheetMode};
use crate::sheet::{Fit, SheetBin};
use crate::types::{
    CostBreakdown, EPSILON, FabricationEnvelope, PanelBlueprint, Placement, PlanterInput,
    SheetInventoryRow, SolverResult,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    pub inventory: Vec<SheetInventoryRow>,
    #[serde(default)]
    pub mode: SheetMode,
    #[serde(default)]
    pub manual_row_order: Vec<String>,
    #[serde(default = "default_liner_height_percent")]
    pub liner_height_percent: f64,
    #[serde(default)]
    pub lip_policy: LipPolicy,
    /// Gap kept between separately cut panels, in inches.
    #[serde(default)]
    pub kerf: f64,
    /// Strip width saved per inch of shared edge when two panels are cut together.
    #[serde(default = "default_bundle_edge_allowance")]
    pub bundle_edge_allowance: f64,
    #[serde(default)]
    pub surcharges: Surcharges,
}

impl SolveOptions {
    pub fn new(inventory: Vec<SheetInventoryRow>) -> Self {
        Self {
            inventory,
            mode: SheetMode::Auto,
            manual_row_order: Vec::new(),
            liner_height_percent: DEFAULT_LINER_HEIGHT_PERCENT,
            lip_policy: LipPolicy::default(),
            kerf: 0.0,
            bundle_edge_allowance: default_bundle_edge_allowance(),
            surcharges: Surcharges::default(),
        }
    }
}

fn default_liner_height_percent() -> f64 {
    DEFAULT_LINER_HEIGHT_PERCENT
}

fn default_bundle_edge_allowance() -> f64 {
    0.5
}

pub struct Solver {
    planter: PlanterInput,
    fabrication_dims: Option<FabricationEnvelope>,
    breakdowns: Vec<CostBreakdown>,
    options: SolveOptions,
}

impl Solver {
    /// `fabrication_dims` overrides the outer envelope derived from `planter`.
    pub fn new(
        planter: PlanterInput,
        fabrication_dims: Option<FabricationEnvelope>,
        breakdowns: Vec<CostBreakdown>,
        options: SolveOptions,
    ) -> Self {
        Self {
            planter,
            fabrication_dims,
            breakdowns,
            options,
        }
    }

    pub fn outer_envelope(&self) -> FabricationEnvelope {
        self.fabrication_dims.unwrap_or_else(|| {
            dimensions::outer_envelope(&self.planter, self.options.lip_policy)
        })
    }

    pub fn liner_envelope(&self) -> Option<FabricationEnvelope> {
        dimensions::liner_envelope(&self.planter, self.options.liner_height_percent / 100.0)
    }

    pub fn panels(&self) -> Vec<PanelBlueprint> {
        build_panels(
            &self.planter,
            &self.outer_envelope(),
            self.liner_envelope().as_ref(),
        )
    }

    pub fn solve(&self) -> SolveResult<SolverResult> {
        let options = &self.options;
        if options.inventory.is_empty() {
            return Err(SolveError::EmptyInventory);
        }

        let panels = self.panels();
        let rows = inventory::order_rows(&options.inventory, options.mode, &options.manual_row_order);
        let queue = generate_candidates(
            &panels,
            inventory::reference_rate(&options.inventory),
            options.bundle_edge_allowance,
        );
        debug!(
            panels = panels.len(),
            candidates = queue.len(),
            rows = rows.len(),
            "starting placement"
        );

        let mut engine = PlacementEngine::new(&panels, &rows, options.kerf, options.mode);
        engine.run(&queue);

        // A liner that collapsed to nothing is not charged.
        let charged = PlanterInput {
            liner_enabled: self.liner_envelope().is_some(),
            ..self.planter.clone()
        };
        let summary = cost::aggregate(
            &charged,
            &self.breakdowns,
            &options.surcharges,
            &engine.bins,
            &rows,
        );

        let unplaced: Vec<String> = panels
            .iter()
            .zip(&engine.placed)
            .filter(|(_, placed)| !**placed)
            .map(|(p, _)| p.id.clone())
            .collect();
        if !unplaced.is_empty() {
            warn!(?unplaced, "panels left without a sheet");
        }

        let placements: Vec<Placement> = engine
            .bins
            .iter()
            .flat_map(|b| b.placements.iter().cloned())
            .collect();

        let result = SolverResult {
            placements,
            sheets: summary.sheets,
            panel_count: panels.len(),
            complete: unplaced.is_empty(),
            unplaced,
            total_material_cost: summary.material_cost,
            total_labor_cost: summary.labor_cost,
            surcharge_cost: summary.surcharge_cost,
            total_fabrication_cost: summary.total_cost,
            quoted_price: summary.total_cost * (1.0 + self.planter.margin_percent / 100.0),
            bundle_savings: engine.bundle_savings,
            liner_area: summary.liner_area,
            liner_labor_cost: summary.liner_labor_cost,
            liner_material_cost: summary.liner_material_cost,
            utilization_percent: summary.utilization_percent,
            solved_at_ms: now_ms(),
        };

        info!(
            sheets = result.sheet_count(),
            placed = result.placements.len(),
            panels = result.panel_count,
            material = result.total_material_cost,
            total = result.total_fabrication_cost,
            "solve finished"
        );
        Ok(result)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Search state of one solve: opened sheets, per-row usage and placed panels.
struct PlacementEngine<'a> {
    panels: &'a [PanelBlueprint],
    rows: &'a [&'a SheetInventoryRow],
    kerf: f64,
    mode: SheetMode,
    bins: Vec<SheetBin>,
    opened: Vec<u32>,
    placed: Vec<bool>,
    bundle_savings: f64,
}

/// A fresh sheet that could take the current candidate.
struct NewSheet {
    row_index: usize,
    fits: Vec<Fit>,
    fits_all: bool,
    cost: f64,
    waste: f64,
}

impl NewSheet {
    fn is_better_than(&self, other: &NewSheet) -> bool {
        if self.fits_all != other.fits_all {
            return self.fits_all;
        }
        if (self.cost - other.cost).abs() > EPSILON {
            return self.cost < other.cost;
        }
        self.waste < other.waste - EPSILON
    }
}

fn fit_candidate(bin: &SheetBin, candidate: &Candidate, panels: &[PanelBlueprint]) -> Option<Vec<Fit>> {
    let rect = |slot: usize| panels[candidate.members[slot]].rect();
    match candidate.kind {
        CandidateKind::Single => bin.find_fit(rect(0)).map(|fit| vec![fit]),
        CandidateKind::Bundle => bin.find_pair_fit(rect(0), rect(1)).map(Vec::from),
        CandidateKind::LCut => bin.find_lcut_fit(rect(0), rect(1)).map(Vec::from),
    }
}

impl<'a> PlacementEngine<'a> {
    fn new(
        panels: &'a [PanelBlueprint],
        rows: &'a [&'a SheetInventoryRow],
        kerf: f64,
        mode: SheetMode,
    ) -> Self {
        Self {
            panels,
            rows,
            kerf,
            mode,
            bins: Vec::new(),
            opened: vec![0; rows.len()],
            placed: vec![false; panels.len()],
            bundle_savings: 0.0,
        }
    }

    fn run(&mut self, queue: &[Candidate]) {
        for (pos, candidate) in queue.iter().enumerate() {
            if candidate.members.iter().any(|&i| self.placed[i]) {
                debug!(candidate = %candidate.id, "skipped, panel already placed");
                continue;
            }

            if let Some((bin_index, fits)) = self.best_open_bin(candidate) {
                self.commit(bin_index, candidate, &fits);
                continue;
            }

            match self.best_new_sheet(candidate, &queue[pos + 1..]) {
                Some(choice) => {
                    let bin_index = self.open_sheet(choice.row_index);
                    self.commit(bin_index, candidate, &choice.fits);
                }
                None => debug!(candidate = %candidate.id, "dropped, no sheet fits"),
            }
        }
    }

    /// Open sheet leaving the least free area, earliest opened on ties.
    /// Every open sheet is re-evaluated for every candidate.
    fn best_open_bin(&self, candidate: &Candidate) -> Option<(usize, Vec<Fit>)> {
        let mut best: Option<(usize, Vec<Fit>, f64)> = None;
        for (bin_index, bin) in self.bins.iter().enumerate() {
            let Some(fits) = fit_candidate(bin, candidate, self.panels) else {
                continue;
            };
            let waste = bin.free_area() - candidate.total_area;
            if best.as_ref().is_none_or(|(_, _, w)| waste < *w - EPSILON) {
                best = Some((bin_index, fits, waste));
            }
        }
        best.map(|(bin_index, fits, _)| (bin_index, fits))
    }

    /// Fresh sheet for a candidate no open sheet can take. In manual mode the
    /// row order is binding and the first listed row that fits is used.
    fn best_new_sheet(&self, candidate: &Candidate, rest: &[Candidate]) -> Option<NewSheet> {
        let mut best: Option<NewSheet> = None;
        for (row_index, row) in self.rows.iter().enumerate() {
            if row.remaining(self.opened[row_index]) == Some(0) {
                continue;
            }
            let bin = SheetBin::new(String::new(), row_index, row.rect(), self.kerf);
            let Some(fits) = fit_candidate(&bin, candidate, self.panels) else {
                continue;
            };
            let fits_all = match self.mode {
                SheetMode::Manual => false,
                SheetMode::Auto => self.fits_all_remaining(&bin, &fits, candidate, rest),
            };
            let option = NewSheet {
                row_index,
                fits_all,
                cost: row.sheet_cost(),
                waste: bin.free_area() - candidate.total_area,
                fits,
            };
            if self.mode == SheetMode::Manual {
                return Some(option);
            }
            if best.as_ref().is_none_or(|b| option.is_better_than(b)) {
                best = Some(option);
            }
        }
        best
    }

    /// Whether `bin`, after taking `fits`, could also hold every panel the
    /// rest of the queue still needs, each placed on its own in the order of
    /// the remaining single candidates.
    fn fits_all_remaining(
        &self,
        bin: &SheetBin,
        fits: &[Fit],
        candidate: &Candidate,
        rest: &[Candidate],
    ) -> bool {
        let mut sim = bin.clone();
        for &fit in fits {
            sim.occupy(fit);
        }

        rest.iter()
            .filter(|c| c.kind == CandidateKind::Single)
            .map(|c| c.members[0])
            .filter(|index| !self.placed[*index] && !candidate.members.contains(index))
            .all(|index| match sim.find_fit(self.panels[index].rect()) {
                Some(fit) => {
                    sim.occupy(fit);
                    true
                }
                None => false,
            })
    }

    fn open_sheet(&mut self, row_index: usize) -> usize {
        self.opened[row_index] += 1;
        let row = self.rows[row_index];
        let instance_id = format!("{}-{}", row.id, self.opened[row_index]);
        debug!(instance = %instance_id, "opened sheet");
        self.bins
            .push(SheetBin::new(instance_id, row_index, row.rect(), self.kerf));
        self.bins.len() - 1
    }

    fn commit(&mut self, bin_index: usize, candidate: &Candidate, fits: &[Fit]) {
        let bin = &mut self.bins[bin_index];
        let row_id = &self.rows[bin.row_index].id;
        for (&index, &fit) in candidate.members.iter().zip(fits) {
            let panel = &self.panels[index];
            let placement = Placement {
                id: format!("{}/{}", bin.instance_id, panel.id),
                candidate_id: candidate.id.clone(),
                panel_id: panel.id.clone(),
                panel_name: panel.name.clone(),
                sheet_instance_id: bin.instance_id.clone(),
                row_id: row_id.clone(),
                x: fit.x,
                y: fit.y,
                width: fit.rect.w,
                height: fit.rect.h,
                rotated: fit.rotated,
                is_bundle: candidate.is_bundle(),
                is_liner: panel.is_liner(),
                panel_type: panel.panel_type(),
            };
            bin.commit(fit, placement);
            self.placed[index] = true;
        }
        self.bundle_savings += candidate.bundle_savings;
        debug!(candidate = %candidate.id, instance = %bin.instance_id, "placed");
    }
}
