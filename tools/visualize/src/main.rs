//! Diagnostic visualizer — renders a site's raster layers to PNG with a
//! per-layer colormap and the site boundary drawn on top.
//! Not part of the main pipeline; no tests, no clippy target.
//!
//! Usage: visualize <site-id> [data-dir] [plots-dir] [sites-file]

use std::env;
use std::fs;
use std::path::Path;

use habitat_core::raster::Raster;
use habitat_core::site::{Site, SiteFile};

// ── Colour helpers ────────────────────────────────────────────────────────────

const NODATA_GRAY: [u8; 3] = [200, 200, 200];

/// Piecewise-linear ramp through evenly spaced colour stops, t in [0, 1].
fn lerp_ramp(stops: &[[u8; 3]], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (stops.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(stops.len() - 2);
    let f = scaled - i as f32;
    let a = stops[i];
    let b = stops[i + 1];
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * f) as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * f) as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * f) as u8,
    ]
}

/// Matplotlib-like "terrain" ramp for elevation and aspect.
fn terrain(t: f32) -> [u8; 3] {
    lerp_ramp(
        &[
            [51, 51, 153],
            [0, 153, 204],
            [0, 204, 102],
            [255, 255, 128],
            [153, 102, 51],
            [255, 255, 255],
        ],
        t,
    )
}

/// Viridis-like ramp for soil properties.
fn viridis(t: f32) -> [u8; 3] {
    lerp_ramp(
        &[
            [68, 1, 84],
            [59, 82, 139],
            [33, 145, 140],
            [94, 201, 98],
            [253, 231, 37],
        ],
        t,
    )
}

/// Yellow→red heat ramp for projected temperature.
fn heat(t: f32) -> [u8; 3] {
    lerp_ramp(
        &[
            [255, 255, 178],
            [254, 204, 92],
            [253, 141, 60],
            [240, 59, 32],
            [189, 0, 38],
        ],
        t,
    )
}

/// White→green ramp for suitability scores.
fn suitability_green(t: f32) -> [u8; 3] {
    lerp_ramp(&[[247, 252, 245], [161, 217, 155], [0, 109, 44]], t)
}

/// Colormap and value range for a layer, chosen by filename suffix.
/// Suitability layers use the fixed [0, 1] range; everything else
/// stretches between the layer's valid min and max.
fn style_for(name: &str, ra: &Raster) -> (fn(f32) -> [u8; 3], f32, f32) {
    if name.ends_with("_suitability.json") || name.ends_with("_suitability_mask.json") {
        (suitability_green, 0.0, 1.0)
    } else if name.ends_with("_max_temp.json") {
        (heat, ra.min_value(), ra.max_value())
    } else if name.contains("_soil_") {
        (viridis, ra.min_value(), ra.max_value())
    } else {
        (terrain, ra.min_value(), ra.max_value())
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn render_layer(ra: &Raster, site: &Site, out_path: &Path, name: &str) {
    let (cmap, lo, hi) = style_for(name, ra);
    let span = if hi > lo { hi - lo } else { 1.0 };

    let mut img = image::RgbImage::new(ra.width as u32, ra.height as u32);
    for r in 0..ra.height {
        for c in 0..ra.width {
            let v = ra.get(r, c);
            let px = if v.is_nan() {
                NODATA_GRAY
            } else {
                cmap((v - lo) / span)
            };
            // Raster row 0 is the south edge; image row 0 is the top.
            let img_row = (ra.height - 1 - r) as u32;
            img.put_pixel(c as u32, img_row, image::Rgb(px));
        }
    }

    draw_boundary(&mut img, ra, site);

    img.save(out_path)
        .unwrap_or_else(|e| panic!("failed to save {}: {e}", out_path.display()));
    println!("Wrote {}", out_path.display());
}

/// Trace the boundary rings in black, stepping each segment at sub-pixel
/// resolution.
fn draw_boundary(img: &mut image::RgbImage, ra: &Raster, site: &Site) {
    let cw = ra.cell_width_deg();
    let ch = ra.cell_height_deg();

    for ring in &site.boundary {
        let n = ring.len();
        for i in 0..n {
            let [x0, y0] = ring[i];
            let [x1, y1] = ring[(i + 1) % n];
            let steps = (((x1 - x0) / cw).abs().max(((y1 - y0) / ch).abs()).ceil() as usize)
                .max(1)
                * 2;
            for s in 0..=steps {
                let t = s as f64 / steps as f64;
                let lon = x0 + (x1 - x0) * t;
                let lat = y0 + (y1 - y0) * t;
                if lon < ra.min_lon || lon > ra.max_lon || lat < ra.min_lat || lat > ra.max_lat {
                    continue;
                }
                let col = (((lon - ra.min_lon) / cw) as usize).min(ra.width - 1);
                let row = (((lat - ra.min_lat) / ch) as usize).min(ra.height - 1);
                let img_row = (ra.height - 1 - row) as u32;
                img.put_pixel(col as u32, img_row, image::Rgb([0, 0, 0]));
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: visualize <site-id> [data-dir] [plots-dir] [sites-file]");
        std::process::exit(1);
    }
    let site_id = &args[1];
    let data_dir = Path::new(args.get(2).map(String::as_str).unwrap_or("data/processed"));
    let plots_dir = Path::new(args.get(3).map(String::as_str).unwrap_or("data/plots"));
    let sites_path = Path::new(args.get(4).map(String::as_str).unwrap_or("data/sites.json"));

    let site_file = SiteFile::load(sites_path).expect("cannot load site file");
    let site = site_file
        .sites
        .iter()
        .find(|s| &s.id == site_id)
        .unwrap_or_else(|| panic!("unknown site id: {site_id}"));

    fs::create_dir_all(plots_dir).expect("cannot create plots directory");

    let prefix = format!("{site_id}_");
    let mut rendered = 0usize;
    let entries = fs::read_dir(data_dir).expect("cannot read data directory");
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| n.starts_with(&prefix) && n.ends_with(".json") && !n.ends_with("_manifest.json"))
        .collect();
    names.sort();

    for name in &names {
        let ra = match Raster::from_json_file(&data_dir.join(name)) {
            Ok(ra) => ra,
            Err(e) => {
                eprintln!("Skipping {name}: {e:#}");
                continue;
            }
        };
        let png_name = name.replace(".json", ".png");
        render_layer(&ra, site, &plots_dir.join(png_name), name);
        rendered += 1;
    }

    if rendered == 0 {
        eprintln!("No raster layers found for {site_id} in {}", data_dir.display());
    }
}
