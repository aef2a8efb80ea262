//! Material, labor and surcharge totals for a finished layout.

use serde::{Deserialize, Serialize};

use crate::sheet::SheetBin;
use crate::types::{CostBreakdown, PlanterInput, SheetInventoryRow, SheetUsage};

/// Flat add-on charges applied when their feature is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Surcharges {
    #[serde(default)]
    pub shelf: f64,
    #[serde(default)]
    pub double_bottom: f64,
}

/// Optional features whose labor is only charged when switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Liner,
    Shelf,
    WeightPlate,
}

impl Feature {
    /// Maps a labor category name onto the feature it prices, if any.
    pub fn from_category(category: &str) -> Option<Self> {
        let normalized: String = category
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|&c| !matches!(c, ' ' | '_' | '-'))
            .collect();
        match normalized.as_str() {
            "liner" => Some(Feature::Liner),
            "shelf" => Some(Feature::Shelf),
            "weightplate" => Some(Feature::WeightPlate),
            _ => None,
        }
    }

    pub fn is_enabled(self, input: &PlanterInput) -> bool {
        match self {
            Feature::Liner => input.liner_enabled,
            Feature::Shelf => input.shelf_enabled,
            Feature::WeightPlate => input.weight_plate_enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CostSummary {
    pub sheets: Vec<SheetUsage>,
    pub material_cost: f64,
    pub labor_cost: f64,
    pub surcharge_cost: f64,
    pub total_cost: f64,
    pub liner_area: f64,
    pub liner_labor_cost: f64,
    pub liner_material_cost: f64,
    pub utilization_percent: f64,
}

/// Price of one labor line, zero when its feature is switched off.
pub fn labor_price(input: &PlanterInput, breakdown: &CostBreakdown) -> f64 {
    match Feature::from_category(&breakdown.category) {
        Some(feature) if !feature.is_enabled(input) => 0.0,
        _ => breakdown.price,
    }
}

pub fn surcharge_total(input: &PlanterInput, surcharges: &Surcharges) -> f64 {
    let shelf = if input.shelf_enabled { surcharges.shelf } else { 0.0 };
    let double_bottom = if input.floor_enabled {
        surcharges.double_bottom
    } else {
        0.0
    };
    shelf + double_bottom
}

/// Totals up a layout. Every opened sheet is charged in full.
pub fn aggregate(
    input: &PlanterInput,
    breakdowns: &[CostBreakdown],
    surcharges: &Surcharges,
    bins: &[SheetBin],
    rows: &[&SheetInventoryRow],
) -> CostSummary {
    let mut summary = CostSummary::default();
    let mut opened_area = 0.0;
    let mut used_area = 0.0;

    for bin in bins {
        let row = rows[bin.row_index];
        let cost = row.sheet_cost();
        let stock_area = bin.stock().area();
        let hosts_liner = bin.hosts_liner();

        summary.material_cost += cost;
        if hosts_liner {
            summary.liner_material_cost += cost;
        }
        summary.liner_area += bin
            .placements
            .iter()
            .filter(|p| p.is_liner)
            .map(|p| p.area())
            .sum::<f64>();
        opened_area += stock_area;
        used_area += bin.used_area();

        summary.sheets.push(SheetUsage {
            instance_id: bin.instance_id.clone(),
            row_id: row.id.clone(),
            name: row.name.clone(),
            width: row.width,
            height: row.height,
            cost,
            used_area: bin.used_area(),
            utilization_percent: percent(bin.used_area(), stock_area),
            placement_count: bin.placements.len(),
            hosts_liner,
        });
    }

    summary.labor_cost = breakdowns.iter().map(|b| labor_price(input, b)).sum();
    summary.liner_labor_cost = breakdowns
        .iter()
        .filter(|b| Feature::from_category(&b.category) == Some(Feature::Liner))
        .map(|b| labor_price(input, b))
        .sum();
    summary.surcharge_cost = surcharge_total(input, surcharges);
    summary.total_cost = summary.material_cost + summary.labor_cost + summary.surcharge_cost;
    summary.utilization_percent = percent(used_area, opened_area);
    summary
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Fit;
    use crate::types::{PanelType, Placement, Rect};

    fn row() -> SheetInventoryRow {
        SheetInventoryRow {
            id: "std".into(),
            name: "Standard".into(),
            width: 48.0,
            height: 96.0,
            cost_per_sqft: 2.5,
            quantity: 5,
            limit_quantity: true,
        }
    }

    fn place(bin: &mut SheetBin, x: f64, w: f64, h: f64, is_liner: bool) {
        let fit = Fit {
            x,
            y: 0.0,
            rect: Rect::new(w, h),
            rotated: false,
        };
        let instance_id = bin.instance_id.clone();
        bin.commit(
            fit,
            Placement {
                id: format!("{instance_id}/{x}"),
                candidate_id: "single".into(),
                panel_id: "panel".into(),
                panel_name: "Panel".into(),
                sheet_instance_id: instance_id,
                row_id: "std".into(),
                x,
                y: 0.0,
                width: w,
                height: h,
                rotated: false,
                is_bundle: false,
                is_liner,
                panel_type: if is_liner { PanelType::Liner } else { PanelType::Long },
            },
        );
    }

    fn breakdowns() -> Vec<CostBreakdown> {
        vec![
            CostBreakdown::new("Welding", "Low", 100.0),
            CostBreakdown::new("Liner", "Medium", 40.0),
            CostBreakdown::new("Shelf", "Low", 25.0),
            CostBreakdown::new("weight_plate", "High", 15.0),
        ]
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(Feature::from_category(" Weight Plate "), Some(Feature::WeightPlate));
        assert_eq!(Feature::from_category("weight-plate"), Some(Feature::WeightPlate));
        assert_eq!(Feature::from_category("LINER"), Some(Feature::Liner));
        assert_eq!(Feature::from_category("Welding"), None);
    }

    #[test]
    fn test_disabled_features_cost_nothing() {
        let input = PlanterInput::new(36.0, 24.0, 24.0);
        let r = row();
        let summary = aggregate(&input, &breakdowns(), &Surcharges::default(), &[], &[&r]);
        assert_eq!(summary.labor_cost, 100.0);
        assert_eq!(summary.liner_labor_cost, 0.0);
        assert_eq!(summary.material_cost, 0.0);
        assert_eq!(summary.utilization_percent, 0.0);
    }

    #[test]
    fn test_full_costing() {
        let input = PlanterInput {
            liner_enabled: true,
            shelf_enabled: true,
            weight_plate_enabled: true,
            ..PlanterInput::new(36.0, 24.0, 24.0)
        };
        let r = row();
        let mut first = SheetBin::new("std-1".into(), 0, r.rect(), 0.0);
        place(&mut first, 0.0, 24.0, 96.0, false);
        let mut second = SheetBin::new("std-2".into(), 0, r.rect(), 0.0);
        place(&mut second, 0.0, 12.0, 48.0, true);
        place(&mut second, 12.0, 12.0, 48.0, false);

        let surcharges = Surcharges {
            shelf: 30.0,
            double_bottom: 20.0,
        };
        let summary = aggregate(&input, &breakdowns(), &surcharges, &[first, second], &[&r]);

        // 32 sqft at 2.5 per sheet
        assert!((summary.material_cost - 160.0).abs() < 1e-9);
        assert!((summary.liner_material_cost - 80.0).abs() < 1e-9);
        assert_eq!(summary.labor_cost, 180.0);
        assert_eq!(summary.liner_labor_cost, 40.0);
        assert_eq!(summary.surcharge_cost, 50.0);
        assert!((summary.total_cost - (160.0 + 180.0 + 50.0)).abs() < 1e-9);
        assert_eq!(summary.liner_area, 576.0);
        assert!((summary.utilization_percent - 3456.0 / 9216.0 * 100.0).abs() < 1e-9);

        assert_eq!(summary.sheets.len(), 2);
        assert!(!summary.sheets[0].hosts_liner);
        assert!(summary.sheets[1].hosts_liner);
        assert_eq!(summary.sheets[1].placement_count, 2);
        assert!((summary.sheets[0].utilization_percent - 50.0).abs() < 1e-9);
    }
}
