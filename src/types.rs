use serde::{Deserialize, Deserializer, Serialize};

/// Tolerance for geometric comparisons, in inches.
pub const EPSILON: f64 = 1e-6;

/// Square inches per square foot.
pub const SQ_IN_PER_SQ_FT: f64 = 144.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn rotated(&self) -> Self {
        Self {
            w: self.h,
            h: self.w,
        }
    }

    pub fn longest_side(&self) -> f64 {
        self.w.max(self.h)
    }

    pub fn is_square(&self) -> bool {
        (self.w - self.h).abs() <= EPSILON
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.w <= other.w + EPSILON && self.h <= other.h + EPSILON
    }
}

/// Outer or liner box envelope a panel set is cut for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FabricationEnvelope {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl FabricationEnvelope {
    pub fn is_valid(&self) -> bool {
        self.length > 0.0 && self.width > 0.0 && self.height > 0.0
    }
}

/// Coarse panel category used for reporting and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelType {
    Floor,
    Long,
    Short,
    Shelf,
    Liner,
}

/// The exact position a panel takes in the finished planter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelRole {
    Floor,
    LongWall(u8),
    ShortWall(u8),
    Shelf,
    LinerBottom,
    LinerLong(u8),
    LinerShort(u8),
}

impl PanelRole {
    pub fn panel_type(self) -> PanelType {
        match self {
            PanelRole::Floor => PanelType::Floor,
            PanelRole::LongWall(_) => PanelType::Long,
            PanelRole::ShortWall(_) => PanelType::Short,
            PanelRole::Shelf => PanelType::Shelf,
            PanelRole::LinerBottom | PanelRole::LinerLong(_) | PanelRole::LinerShort(_) => {
                PanelType::Liner
            }
        }
    }

    pub fn is_liner(self) -> bool {
        self.panel_type() == PanelType::Liner
    }

    pub fn id(self) -> String {
        match self {
            PanelRole::Floor => "floor".to_string(),
            PanelRole::LongWall(n) => format!("long-{n}"),
            PanelRole::ShortWall(n) => format!("short-{n}"),
            PanelRole::Shelf => "shelf".to_string(),
            PanelRole::LinerBottom => "liner-bottom".to_string(),
            PanelRole::LinerLong(n) => format!("liner-long-{n}"),
            PanelRole::LinerShort(n) => format!("liner-short-{n}"),
        }
    }

    pub fn name(self) -> String {
        match self {
            PanelRole::Floor => "Floor".to_string(),
            PanelRole::LongWall(n) => format!("Long Wall {n}"),
            PanelRole::ShortWall(n) => format!("Short Wall {n}"),
            PanelRole::Shelf => "Shelf".to_string(),
            PanelRole::LinerBottom => "Liner Bottom".to_string(),
            PanelRole::LinerLong(n) => format!("Liner Long Wall {n}"),
            PanelRole::LinerShort(n) => format!("Liner Short Wall {n}"),
        }
    }
}

/// A named rectangle that has to be cut from sheet stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelBlueprint {
    pub id: String,
    pub name: String,
    pub role: PanelRole,
    pub width: f64,
    pub height: f64,
}

impl PanelBlueprint {
    pub fn new(role: PanelRole, width: f64, height: f64) -> Self {
        Self {
            id: role.id(),
            name: role.name(),
            role,
            width,
            height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }

    pub fn panel_type(&self) -> PanelType {
        self.role.panel_type()
    }

    pub fn is_liner(&self) -> bool {
        self.role.is_liner()
    }
}

/// Catalog entry for a purchasable stock sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetInventoryRow {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub cost_per_sqft: f64,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(default)]
    pub limit_quantity: bool,
}

impl SheetInventoryRow {
    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }

    pub fn area_sqft(&self) -> f64 {
        self.width * self.height / SQ_IN_PER_SQ_FT
    }

    /// Price of one whole sheet; opened sheets are never pro-rated.
    pub fn sheet_cost(&self) -> f64 {
        self.area_sqft() * self.cost_per_sqft
    }

    /// How many more instances may be opened after `opened` were already used.
    pub fn remaining(&self, opened: u32) -> Option<u32> {
        if self.limit_quantity {
            Some(self.quantity.saturating_sub(opened))
        } else {
            None
        }
    }
}

/// Box geometry and feature switches as captured upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanterInput {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub margin_percent: f64,
    #[serde(default)]
    pub thickness: f64,
    #[serde(default)]
    pub lip: f64,
    #[serde(default)]
    pub liner_enabled: bool,
    #[serde(default)]
    pub liner_depth: f64,
    #[serde(default)]
    pub liner_thickness: f64,
    #[serde(default)]
    pub weight_plate_enabled: bool,
    #[serde(default = "default_true")]
    pub floor_enabled: bool,
    #[serde(default)]
    pub shelf_enabled: bool,
}

impl PlanterInput {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
            margin_percent: 0.0,
            thickness: 0.0,
            lip: 0.0,
            liner_enabled: false,
            liner_depth: 0.0,
            liner_thickness: 0.0,
            weight_plate_enabled: false,
            floor_enabled: true,
            shelf_enabled: false,
        }
    }
}

/// One resolved labor tier price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub category: String,
    #[serde(default)]
    pub tier_used: String,
    pub price: f64,
}

impl CostBreakdown {
    pub fn new(category: &str, tier_used: &str, price: f64) -> Self {
        Self {
            category: category.to_string(),
            tier_used: tier_used.to_string(),
            price,
        }
    }
}

/// Placement of one panel on one sheet instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub id: String,
    pub candidate_id: String,
    pub panel_id: String,
    pub panel_name: String,
    pub sheet_instance_id: String,
    pub row_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotated: bool,
    pub is_bundle: bool,
    pub is_liner: bool,
    pub panel_type: PanelType,
}

impl Placement {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.x + other.width - EPSILON
            && other.x < self.x + self.width - EPSILON
            && self.y < other.y + other.height - EPSILON
            && other.y < self.y + self.height - EPSILON
    }
}

/// Summary of one opened sheet instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetUsage {
    pub instance_id: String,
    pub row_id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub cost: f64,
    pub used_area: f64,
    pub utilization_percent: f64,
    pub placement_count: usize,
    pub hosts_liner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverResult {
    pub placements: Vec<Placement>,
    pub sheets: Vec<SheetUsage>,
    pub panel_count: usize,
    pub unplaced: Vec<String>,
    pub complete: bool,
    pub total_material_cost: f64,
    pub total_labor_cost: f64,
    pub surcharge_cost: f64,
    pub total_fabrication_cost: f64,
    pub quoted_price: f64,
    pub bundle_savings: f64,
    pub liner_area: f64,
    pub liner_labor_cost: f64,
    pub liner_material_cost: f64,
    pub utilization_percent: f64,
    pub solved_at_ms: u64,
}

impl SolverResult {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn placements_on<'a>(&'a self, instance_id: &'a str) -> impl Iterator<Item = &'a Placement> {
        self.placements
            .iter()
            .filter(move |p| p.sheet_instance_id == instance_id)
    }
}

fn default_true() -> bool {
    true
}

/// Accepts any JSON number holding a non-negative whole value, e.g. `10` or `10.0`.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, got {value}"
        )));
    }
    Ok(value as u32)
}
