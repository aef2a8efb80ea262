use clap::Parser;
use planter_nest::dimensions::LipPolicy;
use planter_nest::inventory::SheetMode;
use planter_nest::render;
use planter_nest::solver::{SolveOptions, Solver};
use planter_nest::types::{
    CostBreakdown, FabricationEnvelope, Placement, PlanterInput, Rect, SheetInventoryRow,
};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "planter_nest",
    about = "Quote and nest sheet-metal planter boxes"
)]
struct Cli {
    /// Box length in inches
    #[arg(long)]
    length: f64,

    /// Box width in inches
    #[arg(long)]
    width: f64,

    /// Box height in inches
    #[arg(long)]
    height: f64,

    /// Lip allowance in inches
    #[arg(long, default_value_t = 0.0)]
    lip: f64,

    /// Axes that receive the lip: all-axes, footprint, height-only or none
    #[arg(long, default_value = "all-axes", value_parser = parse_lip_policy)]
    lip_policy: LipPolicy,

    /// Outer envelope as LxWxH, overriding the one derived from the box
    #[arg(long, value_parser = parse_envelope)]
    fabrication_dims: Option<FabricationEnvelope>,

    /// Margin percentage applied to the quoted price
    #[arg(long, default_value_t = 0.0)]
    margin: f64,

    /// Add a liner
    #[arg(long)]
    liner: bool,

    /// Liner inset from the box length and width, in inches
    #[arg(long, default_value_t = 0.0)]
    liner_depth: f64,

    /// Liner height as a percentage of the box height
    #[arg(long, default_value_t = 50.0)]
    liner_height_percent: f64,

    /// Add a shelf
    #[arg(long)]
    shelf: bool,

    /// Add a weight plate
    #[arg(long)]
    weight_plate: bool,

    /// Leave out the floor panel
    #[arg(long)]
    no_floor: bool,

    /// Stock sheets as id:name:WxH:rate:qty[:limit] (e.g. hr16:HR 16ga:48x96:2.73:10:limit)
    #[arg(long = "sheet", num_args = 1.., required = true)]
    sheets: Vec<String>,

    /// Labor lines as category:tier:price (e.g. welding:Low:120)
    #[arg(long = "breakdown", num_args = 1..)]
    breakdowns: Vec<String>,

    /// Sheet selection: auto or manual
    #[arg(long, default_value = "auto", value_parser = parse_mode)]
    mode: SheetMode,

    /// Sheet ids to use, in order, in manual mode (comma separated)
    #[arg(long, value_delimiter = ',')]
    row_order: Vec<String>,

    /// Gap between separately cut panels in inches
    #[arg(long, default_value_t = 0.0)]
    kerf: f64,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_lip_policy(s: &str) -> Result<LipPolicy, String> {
    match s {
        "all-axes" => Ok(LipPolicy::AllAxes),
        "footprint" => Ok(LipPolicy::Footprint),
        "height-only" => Ok(LipPolicy::HeightOnly),
        "none" => Ok(LipPolicy::None),
        _ => Err(format!(
            "invalid lip policy '{}', expected: all-axes, footprint, height-only, or none",
            s
        )),
    }
}

fn parse_mode(s: &str) -> Result<SheetMode, String> {
    match s {
        "auto" => Ok(SheetMode::Auto),
        "manual" => Ok(SheetMode::Manual),
        _ => Err(format!("invalid mode '{}', expected: auto or manual", s)),
    }
}

fn parse_positive(s: &str, what: &str, input: &str) -> Result<f64, String> {
    let value = s
        .parse::<f64>()
        .map_err(|_| format!("invalid {} in '{}'", what, input))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{} must be positive in '{}'", what, input));
    }
    Ok(value)
}

fn parse_dimensions(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let w = parse_positive(parts[0], "width", s)?;
    let h = parse_positive(parts[1], "height", s)?;
    Ok(Rect::new(w, h))
}

fn parse_envelope(s: &str) -> Result<FabricationEnvelope, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 3 {
        return Err(format!("invalid envelope '{}', expected LxWxH", s));
    }
    Ok(FabricationEnvelope {
        length: parse_positive(parts[0], "length", s)?,
        width: parse_positive(parts[1], "width", s)?,
        height: parse_positive(parts[2], "height", s)?,
    })
}

fn parse_sheet(s: &str) -> Result<SheetInventoryRow, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if !(5..=6).contains(&parts.len()) {
        return Err(format!(
            "invalid sheet '{}', expected id:name:WxH:rate:qty[:limit]",
            s
        ));
    }
    let size = parse_dimensions(parts[2])?;
    let cost_per_sqft = parse_positive(parts[3], "rate", s)?;
    let quantity = parts[4]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    let limit_quantity = match parts.get(5) {
        None => false,
        Some(&"limit") => true,
        Some(other) => return Err(format!("unknown sheet flag '{}' in '{}'", other, s)),
    };
    Ok(SheetInventoryRow {
        id: parts[0].to_string(),
        name: parts[1].to_string(),
        width: size.w,
        height: size.h,
        cost_per_sqft,
        quantity,
        limit_quantity,
    })
}

fn parse_breakdown(s: &str) -> Result<CostBreakdown, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("invalid breakdown '{}', expected category:tier:price", s));
    }
    let price = parts[2]
        .parse::<f64>()
        .map_err(|_| format!("invalid price in '{}'", s))?;
    Ok(CostBreakdown::new(parts[0], parts[1], price))
}

fn collect_or_exit<T>(items: &[String], parse: impl Fn(&str) -> Result<T, String>) -> Vec<T> {
    items
        .iter()
        .map(|s| parse(s.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        })
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    let inventory = collect_or_exit(&cli.sheets, parse_sheet);
    let breakdowns = collect_or_exit(&cli.breakdowns, parse_breakdown);

    let planter = PlanterInput {
        margin_percent: cli.margin,
        lip: cli.lip,
        liner_enabled: cli.liner,
        liner_depth: cli.liner_depth,
        weight_plate_enabled: cli.weight_plate,
        floor_enabled: !cli.no_floor,
        shelf_enabled: cli.shelf,
        ..PlanterInput::new(cli.length, cli.width, cli.height)
    };
    let options = SolveOptions {
        mode: cli.mode,
        manual_row_order: cli.row_order,
        liner_height_percent: cli.liner_height_percent,
        lip_policy: cli.lip_policy,
        kerf: cli.kerf,
        ..SolveOptions::new(inventory)
    };

    let solver = Solver::new(planter, cli.fabrication_dims, breakdowns, options);
    let result = solver.solve().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Output results
    for sheet in &result.sheets {
        println!(
            "Sheet {} ({} {}x{}, ${:.2}):",
            sheet.instance_id, sheet.name, sheet.width, sheet.height, sheet.cost
        );
        let placements: Vec<&Placement> = result.placements_on(&sheet.instance_id).collect();
        for p in &placements {
            let rot = if p.rotated { " [rotated]" } else { "" };
            let bundle = if p.is_bundle { " [bundle]" } else { "" };
            println!(
                "  {} {}x{} @ ({}, {}){}{}",
                p.panel_name, p.width, p.height, p.x, p.y, rot, bundle
            );
        }
        if cli.layout {
            print!(
                "{}",
                render::render_sheet(Rect::new(sheet.width, sheet.height), &placements)
            );
        }
        println!();
    }

    if !result.unplaced.is_empty() {
        println!("Unplaced panels: {}", result.unplaced.join(", "));
    }

    println!(
        "Summary: {} sheet{} used, {:.1}% utilization",
        result.sheet_count(),
        if result.sheet_count() == 1 { "" } else { "s" },
        result.utilization_percent,
    );
    println!(
        "  material ${:.2}, labor ${:.2}, surcharges ${:.2}, total ${:.2}, quoted ${:.2}",
        result.total_material_cost,
        result.total_labor_cost,
        result.surcharge_cost,
        result.total_fabrication_cost,
        result.quoted_price,
    );
    if result.liner_area > 0.0 {
        println!(
            "  liner {:.1} sq in, labor ${:.2}, sheets ${:.2}",
            result.liner_area, result.liner_labor_cost, result.liner_material_cost
        );
    }
    if result.bundle_savings > 0.0 {
        println!("  bundle savings ${:.2}", result.bundle_savings);
    }
}
