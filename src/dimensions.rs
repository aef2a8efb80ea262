//! Outer and liner envelope derivation.

use serde::{Deserialize, Serialize};

use crate::types::{FabricationEnvelope, PlanterInput};

/// Which axes of the box receive the lip allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LipPolicy {
    /// Length, width and height.
    #[default]
    AllAxes,
    /// Length and width only.
    Footprint,
    /// Height only.
    HeightOnly,
    /// The lip is ignored.
    None,
}

impl LipPolicy {
    fn axes(self) -> (bool, bool, bool) {
        match self {
            LipPolicy::AllAxes => (true, true, true),
            LipPolicy::Footprint => (true, true, false),
            LipPolicy::HeightOnly => (false, false, true),
            LipPolicy::None => (false, false, false),
        }
    }
}

pub const DEFAULT_LINER_HEIGHT_PERCENT: f64 = 50.0;

/// Outer fabrication envelope of the box with the lip applied per `policy`.
pub fn outer_envelope(input: &PlanterInput, policy: LipPolicy) -> FabricationEnvelope {
    let (on_length, on_width, on_height) = policy.axes();
    let lip = |apply: bool| if apply { input.lip } else { 0.0 };
    FabricationEnvelope {
        length: input.length + lip(on_length),
        width: input.width + lip(on_width),
        height: input.height + lip(on_height),
    }
}

/// Liner envelope, or `None` when the liner is off or collapses to nothing.
pub fn liner_envelope(input: &PlanterInput, height_fraction: f64) -> Option<FabricationEnvelope> {
    if !input.liner_enabled {
        return None;
    }
    let envelope = FabricationEnvelope {
        length: (input.length - input.liner_depth).max(0.0),
        width: (input.width - input.liner_depth).max(0.0),
        height: input.height * height_fraction,
    };
    envelope.is_valid().then_some(envelope)
}
