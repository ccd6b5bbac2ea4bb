use clap::Parser;
use deliverable::config::{load_zones, Settings};
use deliverable::delivery::{DeliveryFeeResolver, ResolutionResult};
use deliverable::distance::{DistanceProvider, Location, StraightLineProvider};
use deliverable::{logging, server};
use std::path::PathBuf;
use std::sync::Arc;

/// deliverable: delivery-zone resolution engine
///
/// Quotes delivery fee and estimated time for a customer address, or serves
/// the same over HTTP for checkout sessions.
///
/// Examples:
///   deliverable "Rua Augusta, 500, São Paulo" --origin "Av. Paulista, 1000, São Paulo" --zones zones.json
///   deliverable --destination=-23.5587,-46.6620 --origin=-23.5614,-46.6559 --straight-line --zones zones.json
///   deliverable --serve --port 8080
#[derive(Parser)]
#[command(name = "deliverable", version, about, long_about = None)]
struct Cli {
    /// Customer destination (positional): an address or "lat,lon".
    #[arg(index = 1)]
    destination_positional: Option<String>,

    /// Customer destination (named): an address or "lat,lon".
    #[arg(long, short = 'd', allow_hyphen_values = true)]
    destination: Option<String>,

    /// Restaurant origin: an address or "lat,lon". Overrides the settings file.
    #[arg(long, short = 'o', allow_hyphen_values = true)]
    origin: Option<String>,

    /// JSON file with the zone table (array of zones). Overrides the settings file.
    #[arg(long, short = 'z')]
    zones: Option<PathBuf>,

    /// Tolerance in km added to both edges of every zone.
    #[arg(long, short = 't')]
    tolerance: Option<f64>,

    /// Settings file. Defaults to ~/.deliverable/settings.json.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Offline mode: straight-line distance between coordinates, no network.
    #[arg(long)]
    straight_line: bool,

    /// Run the HTTP quote server.
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    // ── Settings ────────────────────────────────────────────────

    let settings_result = match &cli.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut settings = settings_result.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if let Some(ref path) = cli.zones {
        let zones = load_zones(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        settings.zones = Some(zones);
    }
    if let Some(tolerance) = cli.tolerance {
        settings.tolerance_km = tolerance;
    }
    if let Some(ref origin) = cli.origin {
        settings.origin = Some(Location::from(origin.as_str()));
    }

    let provider: Arc<dyn DistanceProvider> = if cli.straight_line {
        Arc::new(StraightLineProvider)
    } else {
        Arc::new(settings.provider.road_provider())
    };

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        if let Err(e) = server::start(&cli.host, cli.port, settings, provider).await {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // ── One-shot quote ──────────────────────────────────────────

    let Some(destination) = cli.destination.as_deref().or(cli.destination_positional.as_deref()) else {
        print_usage();
        std::process::exit(1);
    };
    let destination = Location::from(destination);

    let Some(origin) = settings.origin.clone() else {
        eprintln!("Error: No restaurant origin. Use --origin or set \"origin\" in the settings file.");
        std::process::exit(1);
    };
    let Some(zones) = settings.zones.clone() else {
        eprintln!("Error: No zone table. Use --zones or set \"zones\" in the settings file.");
        std::process::exit(1);
    };

    let resolver =
        DeliveryFeeResolver::new(provider).with_fallback_zone(settings.fallback_zone.to_zone());

    let result = match resolver.resolve(&origin, &destination, &zones, settings.tolerance_km).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_json(&ResolutionResult::failed(&e));
            std::process::exit(1);
        }
    };

    eprintln!("  {}", banner(&destination, &result));
    print_json(&result);
}

fn banner(destination: &Location, result: &ResolutionResult) -> String {
    let distance = result
        .distance_km
        .map(|d| format!("{:.2} km", d))
        .unwrap_or_else(|| "?".into());
    match (&result.zone, result.fee) {
        (Some(zone), Some(fee)) if result.deliverable => format!(
            "Deliverable to {} ({}) via zone '{}': fee {:.2}, {}",
            destination, distance, zone.id, fee, zone.estimated_time
        ),
        _ => format!("Outside the delivery area: {} ({})", destination, distance),
    }
}

fn print_json(result: &ResolutionResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: cannot encode result: {}", e),
    }
}

fn print_usage() {
    eprintln!("Error: No destination specified.");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  deliverable \"Rua Augusta, 500, São Paulo\" --zones zones.json");
    eprintln!("  deliverable --destination=-23.5587,-46.6620 --straight-line");
    eprintln!("  deliverable --serve --port 8080");
}
