use echopick::config::PlannerConfig;
use echopick::error::Diagnostic;
use echopick::planner::{PlanOutcome, plan};
use echopick::plate_io::{read_target_plates, write_source_plate, write_transfer_list};
use echopick::render_layout::export_layout_svg;
use serde::Serialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

const DEFAULT_TARGET_DIR: &str = "target_plate_layouts";
const STAGE_ONE_FILE: &str = "step1.csv";
const STAGE_TWO_FILE: &str = "step2.csv";

#[derive(Serialize)]
struct PlanSummary {
    target_plates: usize,
    reagents: usize,
    demand_units: u32,
    transfers_per_well: u32,
    source_plates: usize,
    stage_one_transfers: usize,
    stage_two_transfers: usize,
    warnings: Vec<Diagnostic>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  echopick_cli --version\n  \
  echopick_cli [--config PATH] [--out DIR] [--svg] [--summary] [-f FILE...]\n\n  \
  Without -f, all files in '{DEFAULT_TARGET_DIR}/' are used, sorted by name.\n  \
  Outputs: {STAGE_ONE_FILE}, {STAGE_TWO_FILE} and one source_N.csv per source plate."
    );
}

struct CliArgs {
    files: Vec<PathBuf>,
    config_path: Option<String>,
    out_dir: PathBuf,
    write_svg: bool,
    print_summary: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs {
        files: vec![],
        config_path: None,
        out_dir: PathBuf::from("."),
        write_svg: false,
        print_summary: false,
    };
    let mut idx = 0;
    while idx < args.len() {
        match args[idx].as_str() {
            "-f" => {
                let before = cli.files.len();
                idx += 1;
                while idx < args.len() && !args[idx].starts_with('-') {
                    cli.files.push(PathBuf::from(&args[idx]));
                    idx += 1;
                }
                if cli.files.len() == before {
                    return Err("Missing FILE after -f".to_string());
                }
            }
            "--config" => {
                if idx + 1 >= args.len() {
                    return Err("Missing PATH after --config".to_string());
                }
                cli.config_path = Some(args[idx + 1].clone());
                idx += 2;
            }
            "--out" => {
                if idx + 1 >= args.len() {
                    return Err("Missing DIR after --out".to_string());
                }
                cli.out_dir = PathBuf::from(&args[idx + 1]);
                idx += 2;
            }
            "--svg" => {
                cli.write_svg = true;
                idx += 1;
            }
            "--summary" => {
                cli.print_summary = true;
                idx += 1;
            }
            other => {
                usage();
                return Err(format!("Unknown argument '{other}'"));
            }
        }
    }
    Ok(cli)
}

fn discover_targets() -> Result<Vec<PathBuf>, String> {
    let dir = Path::new(DEFAULT_TARGET_DIR);
    if !dir.is_dir() {
        return Err(format!(
            "No input files given and no '{DEFAULT_TARGET_DIR}/' directory found"
        ));
    }
    let entries = fs::read_dir(dir)
        .map_err(|e| format!("Could not read '{DEFAULT_TARGET_DIR}/': {e}"))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(format!("'{DEFAULT_TARGET_DIR}/' contains no layout files"));
    }
    Ok(files)
}

fn report(outcome: &PlanOutcome) {
    let demand_units: u32 = outcome.demand.values().sum();
    println!(
        "Demand: {} reagent(s), {} transfer(s) total",
        outcome.demand.len(),
        demand_units
    );
    println!("Transfers per source well: {}", outcome.capacity.transfers_per_well);
    println!("Source wells per reagent:");
    for (code, wells) in &outcome.capacity.wells_per_reagent {
        println!("  {code}: {wells}");
    }
    println!("Source plates: {}", outcome.layout.plates.len());
    for plate in &outcome.layout.plates {
        println!(
            "  Source{} ({}): {} well(s)",
            plate.number,
            plate.label,
            plate.wells.len()
        );
    }
    println!("Stage 1: {} transfer(s)", outcome.stage_one.len());
    println!("Stage 2: {} transfer(s)", outcome.stage_two.len());
}

fn summarize(targets: usize, outcome: &PlanOutcome) -> PlanSummary {
    PlanSummary {
        target_plates: targets,
        reagents: outcome.demand.len(),
        demand_units: outcome.demand.values().sum(),
        transfers_per_well: outcome.capacity.transfers_per_well,
        source_plates: outcome.layout.plates.len(),
        stage_one_transfers: outcome.stage_one.len(),
        stage_two_transfers: outcome.stage_two.len(),
        warnings: outcome.diagnostics.clone(),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("echopick {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
        return Ok(());
    }

    let cli = parse_args(&args[1..])?;
    let config = match &cli.config_path {
        Some(path) => PlannerConfig::load_from_path(path).map_err(|e| e.to_string())?,
        None => PlannerConfig::default(),
    };

    let files = if cli.files.is_empty() {
        discover_targets()?
    } else {
        cli.files.clone()
    };
    println!("Importing {} target plate file(s):", files.len());
    for file in &files {
        println!("  {}", file.display());
    }

    let format = config.plate_format();
    let targets = read_target_plates(&files, &format).map_err(|e| format!("{e:#}"))?;
    let outcome = plan(&targets, &config).map_err(|e| e.to_string())?;
    report(&outcome);

    for diagnostic in &outcome.diagnostics {
        eprintln!("WARNING: {diagnostic}");
    }
    if outcome.has_unmet_demand() {
        return Err(format!(
            "{} demand unit(s) could not be sourced; no files written",
            outcome.unmet_demand().count()
        ));
    }

    if cli.print_summary {
        let text = serde_json::to_string_pretty(&summarize(targets.len(), &outcome))
            .map_err(|e| format!("Could not serialize summary: {e}"))?;
        println!("{text}");
    }

    fs::create_dir_all(&cli.out_dir)
        .map_err(|e| format!("Could not create output directory '{}': {e}", cli.out_dir.display()))?;
    let stage_one_path = cli.out_dir.join(STAGE_ONE_FILE);
    write_transfer_list(&stage_one_path, &outcome.stage_one, config.transfer_volume)
        .map_err(|e| e.to_string())?;
    let stage_two_path = cli.out_dir.join(STAGE_TWO_FILE);
    write_transfer_list(&stage_two_path, &outcome.stage_two, config.transfer_volume)
        .map_err(|e| e.to_string())?;
    println!(
        "Wrote '{}' and '{}'",
        stage_one_path.display(),
        stage_two_path.display()
    );

    for plate in &outcome.layout.plates {
        let layout_path = cli.out_dir.join(format!("source_{}.csv", plate.number));
        write_source_plate(&layout_path, plate, &format).map_err(|e| e.to_string())?;
        println!("Wrote '{}'", layout_path.display());
        if cli.write_svg {
            let svg_path = cli.out_dir.join(format!("source_{}.svg", plate.number));
            fs::write(&svg_path, export_layout_svg(plate, &config))
                .map_err(|e| format!("Could not write SVG '{}': {e}", svg_path.display()))?;
            println!("Wrote '{}'", svg_path.display());
        }
    }
    Ok(())
}
