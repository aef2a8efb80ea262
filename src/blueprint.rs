use crate::types::{FabricationEnvelope, PanelBlueprint, PanelRole, PlanterInput};

/// Expands the envelopes into the panels to cut, in a fixed order.
pub fn build_panels(
    input: &PlanterInput,
    outer: &FabricationEnvelope,
    liner: Option<&FabricationEnvelope>,
) -> Vec<PanelBlueprint> {
    let mut panels = Vec::new();

    if input.floor_enabled {
        panels.push(PanelBlueprint::new(PanelRole::Floor, outer.width, outer.length));
    }
    for n in 1..=2 {
        panels.push(PanelBlueprint::new(
            PanelRole::LongWall(n),
            outer.length,
            outer.height,
        ));
    }
    for n in 1..=2 {
        panels.push(PanelBlueprint::new(
            PanelRole::ShortWall(n),
            outer.width,
            outer.height,
        ));
    }
    if input.shelf_enabled {
        panels.push(PanelBlueprint::new(PanelRole::Shelf, outer.width, outer.length));
    }

    if let Some(inner) = liner.filter(|inner| inner.is_valid()) {
        panels.push(PanelBlueprint::new(
            PanelRole::LinerBottom,
            inner.width,
            inner.length,
        ));
        for n in 1..=2 {
            panels.push(PanelBlueprint::new(
                PanelRole::LinerLong(n),
                inner.length,
                inner.height,
            ));
        }
        for n in 1..=2 {
            panels.push(PanelBlueprint::new(
                PanelRole::LinerShort(n),
                inner.width,
                inner.height,
            ));
        }
    }

    panels
}
