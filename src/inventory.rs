//! Ordering of stock-sheet rows for opening new sheet instances.

use serde::{Deserialize, Serialize};

use crate::types::SheetInventoryRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetMode {
    /// Rows are ranked by whole-sheet cost.
    #[default]
    Auto,
    /// Rows are used exactly in the order the caller gives.
    Manual,
}

/// Rows in the order new sheet instances should be tried.
///
/// In auto mode every row is kept, cheapest whole sheet first, ties broken by
/// cost per square foot and then by id. In manual mode only the rows named in
/// `manual_order` are used, in that order; with no order given the inventory
/// order is kept as is.
pub fn order_rows<'a>(
    inventory: &'a [SheetInventoryRow],
    mode: SheetMode,
    manual_order: &[String],
) -> Vec<&'a SheetInventoryRow> {
    match mode {
        SheetMode::Auto => {
            let mut rows: Vec<&SheetInventoryRow> = inventory.iter().collect();
            rows.sort_by(|a, b| {
                a.sheet_cost()
                    .total_cmp(&b.sheet_cost())
                    .then(a.cost_per_sqft.total_cmp(&b.cost_per_sqft))
                    .then_with(|| a.id.cmp(&b.id))
            });
            rows
        }
        SheetMode::Manual if manual_order.is_empty() => inventory.iter().collect(),
        SheetMode::Manual => {
            let mut rows: Vec<&SheetInventoryRow> = Vec::with_capacity(manual_order.len());
            for id in manual_order {
                let Some(row) = inventory.iter().find(|r| &r.id == id) else {
                    continue;
                };
                if !rows.iter().any(|r| r.id == row.id) {
                    rows.push(row);
                }
            }
            rows
        }
    }
}

/// Cheapest cost per square foot in the inventory, used to rank candidates.
pub fn reference_rate(inventory: &[SheetInventoryRow]) -> f64 {
    inventory
        .iter()
        .map(|r| r.cost_per_sqft)
        .min_by(f64::total_cmp)
        .unwrap_or(0.0)
}
