/// Habitat suitability model runner: combines the ingested per-site layers
/// into one composite suitability raster per site × GCM under an emissions
/// scenario.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use habitat_core::model::{build_suitability, SuitabilityInputs};
use habitat_core::raster::Raster;
use habitat_core::site::SiteFile;
use habitat_core::sources::maca::{self, Scenario};
use habitat_core::sources::naming;
use habitat_core::suitability::SpeciesProfile;

#[derive(Parser, Debug)]
#[command(
    name = "suitability",
    about = "Run the habitat suitability model over ingested site rasters"
)]
struct Args {
    /// Site boundary file
    #[arg(long, default_value = "data/sites.json")]
    sites: PathBuf,

    /// Process only this site id (omit to process all sites)
    #[arg(long)]
    site: Option<String>,

    /// Directory of ingested raster JSON layers
    #[arg(long, default_value = "data/processed")]
    data_dir: PathBuf,

    /// Output directory (defaults to the data directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emissions scenario (rcp45 | rcp85)
    #[arg(long, default_value = "rcp85")]
    scenario: Scenario,

    /// Global Climate Models to run
    #[arg(long, value_delimiter = ',', default_values_t = maca::DEFAULT_GCMS.iter().map(|s| s.to_string()))]
    gcms: Vec<String>,

    /// Species tolerance profile JSON (defaults to the built-in blue oak
    /// profile)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// POLARIS soil property the soil layer was ingested with
    #[arg(long, default_value = "ph")]
    soil_prop: String,

    /// Also write a binary suitable/unsuitable mask at this score cutoff
    #[arg(long)]
    threshold: Option<f32>,
}

fn load_layer(data_dir: &Path, name: &str) -> Result<Raster> {
    Raster::from_json_file(&data_dir.join(name))
        .with_context(|| format!("Missing ingested layer {name} — run the ingest tool first"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let profile = match &args.profile {
        Some(path) => SpeciesProfile::load(path)?,
        None => SpeciesProfile::blue_oak(),
    };
    if let Some(t) = args.threshold {
        if !(0.0..=1.0).contains(&t) {
            bail!("threshold must lie in [0, 1], got {t}");
        }
    }

    let out_dir = args.output.clone().unwrap_or_else(|| args.data_dir.clone());
    fs::create_dir_all(&out_dir)?;

    let site_file = SiteFile::load(&args.sites)?;

    for site in &site_file.sites {
        if let Some(ref filter) = args.site {
            if &site.id != filter {
                continue;
            }
        }

        eprintln!(
            "[suitability] Site: {} — {} ({})",
            site.id, profile.species, args.scenario
        );

        let elevation = load_layer(&args.data_dir, &naming::elevation_raster(&site.id))?;
        let aspect = load_layer(&args.data_dir, &naming::aspect_raster(&site.id))?;
        let soil_ph = load_layer(&args.data_dir, &naming::soil_raster(&site.id, &args.soil_prop))?;

        for gcm in &args.gcms {
            let temp_name = naming::max_temp_raster(&site.id, args.scenario, gcm);
            let max_temp = match Raster::from_json_file(&args.data_dir.join(&temp_name)) {
                Ok(ra) => ra,
                Err(e) => {
                    eprintln!("  [warn] {e:#} — skipping {gcm}");
                    continue;
                }
            };

            let inputs = SuitabilityInputs {
                elevation: elevation.clone(),
                aspect: aspect.clone(),
                soil_ph: soil_ph.clone(),
                max_temp,
            };
            let result = build_suitability(&inputs, &profile, args.threshold)?;

            for stats in &result.layer_stats {
                eprintln!(
                    "    {:<10} score: min {:.3}  max {:.3}  mean {:.3}  ({:.1}% valid)",
                    stats.name,
                    stats.min,
                    stats.max,
                    stats.mean,
                    stats.valid_fraction * 100.0
                );
            }
            let c = &result.composite_stats;
            eprintln!(
                "  {} composite: min {:.3}  max {:.3}  mean {:.3}  ({:.1}% valid)",
                gcm,
                c.min,
                c.max,
                c.mean,
                c.valid_fraction * 100.0
            );

            let out_name = naming::suitability_raster(&site.id, args.scenario, gcm);
            result.composite.write_json_file(&out_dir.join(&out_name))?;
            eprintln!("  Wrote {}", out_dir.join(&out_name).display());

            if let Some(mask) = &result.mask {
                let suitable = mask.data.iter().filter(|v| **v == 1.0).count();
                eprintln!(
                    "    {} of {} cells at or above threshold {}",
                    suitable,
                    mask.data.len(),
                    args.threshold.unwrap_or_default()
                );
                let mask_name = naming::suitability_mask(&site.id, args.scenario, gcm);
                mask.write_json_file(&out_dir.join(&mask_name))?;
                eprintln!("  Wrote {}", out_dir.join(&mask_name).display());
            }
        }
    }

    Ok(())
}
