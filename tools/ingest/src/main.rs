/// Site ingestion tool: turns locally downloaded source tiles — SRTM
/// elevation GeoTIFFs, POLARIS soil GeoTIFFs, MACA climate slice exports —
/// into per-site raster JSON layers, and prints the remote URLs to fetch.
///
/// SRTM tiles:    loose `N37W120.tif` files or `.tar`/`.tar.gz` bundles
/// POLARIS tiles: `lat3738_lon-121-120.tif` (per property/stat/depth)
/// MACA slices:   `macav2metdata_tasmax_*_CONUS_monthly.tif` exports, one
///                mean-tasmax grid per five-year slice, Kelvin, georeferenced
///                by GeoTIFF tags on the 0–360 longitude CONUS grid.
use std::fs;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use flate2::read::GzDecoder;
use serde::Serialize;
use tiff::decoder::DecodingResult;
use tiff::tags::Tag;

use habitat_core::climate::{composite_mean, to_fahrenheit};
use habitat_core::raster::{Bounds, Raster};
use habitat_core::site::{Site, SiteFile, BOUNDS_BUFFER_DEG};
use habitat_core::sources::maca::{self, Scenario};
use habitat_core::sources::{naming, polaris, srtm};
use habitat_core::terrain::compute_aspect;
use habitat_core::units::wrap_longitude;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "ingest",
    about = "Build per-site raster layers from downloaded SRTM / POLARIS / MACA tiles"
)]
struct Args {
    /// Site boundary file
    #[arg(long, default_value = "data/sites.json")]
    sites: PathBuf,

    /// Process only this site id (omit to process all sites)
    #[arg(long)]
    site: Option<String>,

    /// Directory containing SRTM elevation tiles
    #[arg(long, default_value = "data/raw/srtm")]
    dem_dir: PathBuf,

    /// Directory containing POLARIS soil tiles
    #[arg(long, default_value = "data/raw/polaris")]
    soil_dir: PathBuf,

    /// Directory containing MACA climate slice exports
    #[arg(long, default_value = "data/raw/maca")]
    climate_dir: PathBuf,

    /// Output directory for per-site raster JSON (created if absent)
    #[arg(short, long, default_value = "data/processed")]
    output: PathBuf,

    /// Margin added around site bounds, in degrees
    #[arg(long, default_value_t = BOUNDS_BUFFER_DEG)]
    buffer: f64,

    /// POLARIS soil property
    #[arg(long, default_value = polaris::DEFAULT_PROPERTY)]
    soil_prop: String,

    /// POLARIS summary statistic
    #[arg(long, default_value = polaris::DEFAULT_STAT)]
    soil_stat: String,

    /// POLARIS soil depth (cm)
    #[arg(long, default_value = polaris::DEFAULT_DEPTH)]
    soil_depth: String,

    /// Emissions scenario (rcp45 | rcp85)
    #[arg(long, default_value = "rcp85")]
    scenario: Scenario,

    /// Global Climate Models to ingest
    #[arg(long, value_delimiter = ',', default_values_t = maca::DEFAULT_GCMS.iter().map(|s| s.to_string()))]
    gcms: Vec<String>,

    /// Five-year time slice start years
    #[arg(long, value_delimiter = ',', default_values_t = maca::DEFAULT_TIME_SLICE_STARTS.to_vec())]
    time_slices: Vec<u16>,

    /// Print the source URLs for each site and exit
    #[arg(long)]
    print_urls: bool,
}

// ── Output manifest ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Manifest {
    site_id: String,
    bounds: Bounds,
    elevation: Option<String>,
    aspect: Option<String>,
    soil: Option<String>,
    climate: Vec<String>,
}

// ── GeoTIFF decoding ─────────────────────────────────────────────────────────

struct DecodedTiff {
    /// NaN-mapped values in TIFF storage order (row 0 = northernmost).
    values: Vec<f32>,
    cols: usize,
    rows: usize,
    /// Bounds from the ModelPixelScale/ModelTiepoint tags, when present,
    /// with longitudes wrapped to (−180°, 180°].
    georef: Option<Bounds>,
}

/// Decode a GeoTIFF into f32 values. F32 data maps the −9999 sentinel (and
/// native NaN) to no-data; I16 data maps the SRTM −32768 void sentinel.
/// TIFF-level failures are reported as None so one bad tile does not abort
/// the run.
fn decode_tiff<R: Read + Seek>(reader: R, label: &str) -> Option<DecodedTiff> {
    let mut decoder = match tiff::decoder::Decoder::new(reader) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("  [warn] Skipping {} (not a valid TIFF: {})", label, e);
            return None;
        }
    };
    let (cols, rows) = match decoder.dimensions() {
        Ok((w, h)) => (w as usize, h as usize),
        Err(e) => {
            eprintln!("  [warn] Skipping {} (dimensions error: {})", label, e);
            return None;
        }
    };
    if cols == 0 || rows == 0 {
        eprintln!("  [warn] Empty TIFF: {}", label);
        return None;
    }

    let georef = read_georef(&mut decoder, cols, rows);

    let img = match decoder.read_image() {
        Ok(i) => i,
        Err(e) => {
            eprintln!("  [warn] Skipping {} (read_image error: {})", label, e);
            return None;
        }
    };

    let values: Vec<f32> = match img {
        DecodingResult::F32(v) => v
            .into_iter()
            .map(|x| if x == srtm::DEM_NODATA_F32 { f32::NAN } else { x })
            .collect(),
        DecodingResult::I16(v) => v
            .into_iter()
            .map(|x| {
                if x == srtm::SRTM_NODATA_I16 {
                    f32::NAN
                } else {
                    f32::from(x)
                }
            })
            .collect(),
        _ => {
            eprintln!(
                "  [warn] Unexpected pixel type (expected F32 or I16) in {}",
                label
            );
            return None;
        }
    };

    Some(DecodedTiff {
        values,
        cols,
        rows,
        georef,
    })
}

/// Bounds from GeoTIFF georeferencing tags: the tiepoint fixes the top-left
/// corner, the pixel scale spans the grid from there.
fn read_georef<R: Read + Seek>(
    decoder: &mut tiff::decoder::Decoder<R>,
    cols: usize,
    rows: usize,
) -> Option<Bounds> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }
    let (sx, sy) = (scale[0], scale[1]);
    let (left, top) = (tiepoint[3], tiepoint[4]);

    let min_lon = wrap_longitude(left);
    let max_lon = wrap_longitude(left + sx * cols as f64);
    let max_lat = top;
    let min_lat = top - sy * rows as f64;
    Some(Bounds::new(min_lon, min_lat, max_lon, max_lat))
}

/// Build a Raster from decoded TIFF values. TIFF row 0 is the north edge;
/// `Raster` row 0 is the south edge, so rows are reversed here.
fn tile_to_raster(values: &[f32], cols: usize, rows: usize, bounds: Bounds) -> Raster {
    let mut data = Vec::with_capacity(cols * rows);
    for r in (0..rows).rev() {
        data.extend_from_slice(&values[r * cols..(r + 1) * cols]);
    }
    Raster {
        data,
        width: cols,
        height: rows,
        min_lon: bounds.min_lon,
        max_lon: bounds.max_lon,
        min_lat: bounds.min_lat,
        max_lat: bounds.max_lat,
    }
}

// ── DEM tiles ────────────────────────────────────────────────────────────────

/// Collect every SRTM tile in `dem_dir` overlapping `bounds`: loose `.tif`
/// granules plus the contents of `.tar`/`.tar.gz` bundles.
fn collect_dem_tiles(dem_dir: &Path, bounds: &Bounds) -> Result<Vec<Raster>> {
    let mut tiles = Vec::new();

    let entries = fs::read_dir(dem_dir)
        .with_context(|| format!("Cannot read DEM directory {}", dem_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let Some(fname) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if fname.ends_with(".tif") {
            maybe_push_dem_tile(fname, bounds, &mut tiles, || {
                let mut buf = Vec::new();
                fs::File::open(&path)?.read_to_end(&mut buf)?;
                Ok(buf)
            });
        } else if fname.ends_with(".tar") {
            let file = fs::File::open(&path)
                .with_context(|| format!("Cannot open {}", path.display()))?;
            scan_dem_archive(&mut tar::Archive::new(file), bounds, &mut tiles)?;
        } else if fname.ends_with(".tar.gz") || fname.ends_with(".tgz") {
            let file = fs::File::open(&path)
                .with_context(|| format!("Cannot open {}", path.display()))?;
            scan_dem_archive(&mut tar::Archive::new(GzDecoder::new(file)), bounds, &mut tiles)?;
        }
    }
    Ok(tiles)
}

/// Parse a tile filename, check overlap, load and decode it, and push the
/// resulting 1°×1° raster. `load` is deferred so non-overlapping tiles are
/// never read.
fn maybe_push_dem_tile(
    fname: &str,
    bounds: &Bounds,
    tiles: &mut Vec<Raster>,
    load: impl FnOnce() -> io::Result<Vec<u8>>,
) {
    let Some((lat_sw, lon_sw)) = srtm::parse_coord_chunk(fname) else {
        eprintln!("  [warn] Cannot parse granule coords from: {}", fname);
        return;
    };
    if !srtm::granule_overlaps(lat_sw, lon_sw, bounds) {
        return;
    }
    let buf = match load() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("  [warn] Read failed for {}: {}", fname, e);
            return;
        }
    };
    let Some(decoded) = decode_tiff(io::Cursor::new(buf), fname) else {
        return;
    };
    let tile_bounds = Bounds::new(lon_sw, lat_sw, lon_sw + 1.0, lat_sw + 1.0);
    tiles.push(tile_to_raster(
        &decoded.values,
        decoded.cols,
        decoded.rows,
        tile_bounds,
    ));
}

/// Walk one tar bundle of DEM tiles.
fn scan_dem_archive<R: Read>(
    archive: &mut tar::Archive<R>,
    bounds: &Bounds,
    tiles: &mut Vec<Raster>,
) -> Result<()> {
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let Some(fname) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !fname.ends_with(".tif") {
            continue;
        }
        let fname = fname.to_string();
        maybe_push_dem_tile(&fname, bounds, tiles, || {
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf)?;
            Ok(buf)
        });
    }
    Ok(())
}

// ── Soil tiles ───────────────────────────────────────────────────────────────

/// Load the POLARIS tiles named by the site's URL list from `soil_dir`.
fn collect_soil_tiles(soil_dir: &Path, urls: &[String]) -> Vec<Raster> {
    let mut tiles = Vec::new();
    for url in urls {
        let Some(fname) = url.rsplit('/').next() else {
            continue;
        };
        let path = soil_dir.join(fname);
        if !path.exists() {
            eprintln!("  [warn] Missing POLARIS tile: {} — skipping", path.display());
            continue;
        }
        let Some((lat_sw, lon_sw)) = polaris::sw_corner_from_filename(fname) else {
            eprintln!("  [warn] Cannot parse tile coords from: {}", fname);
            continue;
        };
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("  [warn] Cannot open {}: {}", path.display(), e);
                continue;
            }
        };
        let Some(decoded) = decode_tiff(io::BufReader::new(file), fname) else {
            continue;
        };
        tiles.push(tile_to_raster(
            &decoded.values,
            decoded.cols,
            decoded.rows,
            polaris::tile_bounds(lat_sw, lon_sw),
        ));
    }
    tiles
}

// ── Climate slices ───────────────────────────────────────────────────────────

/// Load, crop, and convert the MACA slices for one GCM. Returns the
/// Fahrenheit slice stack, cropped to the site bounds.
fn collect_climate_slices(
    climate_dir: &Path,
    gcm: &str,
    scenario: Scenario,
    time_slices: &[u16],
    bounds: &Bounds,
) -> Vec<Raster> {
    let mut slices = Vec::new();
    for &start in time_slices {
        let fname = maca::slice_filename(gcm, scenario, start);
        let path = climate_dir.join(&fname);
        if !path.exists() {
            eprintln!("  [warn] Missing MACA slice: {} — skipping", path.display());
            continue;
        }
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("  [warn] Cannot open {}: {}", path.display(), e);
                continue;
            }
        };
        let Some(decoded) = decode_tiff(io::BufReader::new(file), &fname) else {
            continue;
        };
        let Some(georef) = decoded.georef else {
            eprintln!("  [warn] {} carries no georeferencing tags — skipping", fname);
            continue;
        };
        let full = tile_to_raster(&decoded.values, decoded.cols, decoded.rows, georef);
        match full.crop(*bounds) {
            Ok(cropped) => slices.push(to_fahrenheit(&cropped)),
            Err(e) => {
                eprintln!("  [warn] {}: {} — skipping", fname, e);
            }
        }
    }
    slices
}

// ── URL printing ─────────────────────────────────────────────────────────────

fn print_urls(site: &Site, args: &Args) {
    let bounds = site.buffered_bounds(args.buffer);

    println!("# {} — SRTM elevation", site.id);
    for granule in srtm::granules_for_bounds(bounds) {
        println!("{}", srtm::download_url(&granule));
    }

    println!("# {} — POLARIS soil", site.id);
    for url in polaris::tile_urls(&args.soil_prop, &args.soil_stat, &args.soil_depth, bounds) {
        println!("{url}");
    }

    println!("# {} — MACA {} tasmax", site.id, args.scenario);
    for gcm in &args.gcms {
        for &start in &args.time_slices {
            println!("{}", maca::slice_url(gcm, args.scenario, start));
        }
    }
}

// ── Per-site processing ──────────────────────────────────────────────────────

fn process_site(site: &Site, args: &Args) -> Result<Manifest> {
    let bounds = site.buffered_bounds(args.buffer);
    let mut manifest = Manifest {
        site_id: site.id.clone(),
        bounds,
        elevation: None,
        aspect: None,
        soil: None,
        climate: Vec::new(),
    };

    // Elevation + aspect.
    if args.dem_dir.is_dir() {
        let tiles = collect_dem_tiles(&args.dem_dir, &bounds)?;
        if tiles.is_empty() {
            eprintln!("  [warn] No DEM tiles cover {} — skipping elevation", site.id);
        } else {
            let elevation = Raster::mosaic(&tiles, bounds)?;
            eprintln!(
                "  Elevation: {} tiles → {}×{} grid ({:.1}% valid)",
                tiles.len(),
                elevation.width,
                elevation.height,
                elevation.valid_fraction() * 100.0
            );

            let name = naming::elevation_raster(&site.id);
            elevation.write_json_file(&args.output.join(&name))?;
            manifest.elevation = Some(name);

            let aspect = compute_aspect(&elevation);
            let name = naming::aspect_raster(&site.id);
            aspect.write_json_file(&args.output.join(&name))?;
            manifest.aspect = Some(name);
        }
    } else {
        eprintln!(
            "  [warn] DEM directory {} not found — skipping elevation",
            args.dem_dir.display()
        );
    }

    // Soil.
    let soil_urls = polaris::tile_urls(&args.soil_prop, &args.soil_stat, &args.soil_depth, bounds);
    let soil_tiles = if args.soil_dir.is_dir() {
        collect_soil_tiles(&args.soil_dir, &soil_urls)
    } else {
        eprintln!(
            "  [warn] Soil directory {} not found — skipping soil",
            args.soil_dir.display()
        );
        Vec::new()
    };
    if !soil_tiles.is_empty() {
        let soil = Raster::mosaic(&soil_tiles, bounds)?;
        eprintln!(
            "  Soil {}: {} tiles → {}×{} grid",
            args.soil_prop,
            soil_tiles.len(),
            soil.width,
            soil.height
        );
        let name = naming::soil_raster(&site.id, &args.soil_prop);
        soil.write_json_file(&args.output.join(&name))?;
        manifest.soil = Some(name);
    }

    // Projected climate, one composite per GCM.
    if args.climate_dir.is_dir() {
        for gcm in &args.gcms {
            let slices = collect_climate_slices(
                &args.climate_dir,
                gcm,
                args.scenario,
                &args.time_slices,
                &bounds,
            );
            if slices.is_empty() {
                eprintln!("  [warn] No MACA slices for {} — skipping", gcm);
                continue;
            }
            let composite = composite_mean(&slices)?;
            eprintln!(
                "  Climate {} {}: {} slices → mean max temp {:.1} °F",
                gcm,
                args.scenario,
                slices.len(),
                composite.mean_value()
            );
            let name = naming::max_temp_raster(&site.id, args.scenario, gcm);
            composite.write_json_file(&args.output.join(&name))?;
            manifest.climate.push(name);
        }
    } else {
        eprintln!(
            "  [warn] Climate directory {} not found — skipping climate",
            args.climate_dir.display()
        );
    }

    Ok(manifest)
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let site_file = SiteFile::load(&args.sites)?;

    for site in &site_file.sites {
        if let Some(ref filter) = args.site {
            if &site.id != filter {
                continue;
            }
        }

        if args.print_urls {
            print_urls(site, &args);
            continue;
        }

        eprintln!("[ingest] Site: {} ({})", site.id, site.name);
        fs::create_dir_all(&args.output)?;

        let manifest = process_site(site, &args)?;
        let manifest_path = args.output.join(naming::manifest(&site.id));
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("Write failed: {}", manifest_path.display()))?;
        eprintln!("  Wrote {}", manifest_path.display());
    }

    Ok(())
}
