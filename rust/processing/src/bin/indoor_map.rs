// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `indoor-map`: render one level of a GeoJSON indoor map to JSON.
//!
//! Loads the features, rebuilds every level, places labels for the chosen
//! level and zoom over the whole map and writes a [`WallsDocument`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indoor_lite_processing::{Config, FixedAdvance, IndoorMap, View, WallsDocument};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "indoor-map")]
#[command(about = "Synthesize walls and place labels for an indoor GeoJSON map")]
struct Args {
    /// GeoJSON feature collection
    input: PathBuf,

    /// Level number to render
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    level: i32,

    /// Map zoom, defaults to INDOOR_ZOOM or 19
    #[arg(long)]
    zoom: Option<f64>,

    /// Output file, stdout when absent
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    let zoom = args.zoom.unwrap_or(config.zoom);

    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let mut map = IndoorMap::new(config);
    map.load_geojson(&json)
        .with_context(|| format!("parsing {}", args.input.display()))?;
    map.rebuild_all()?;

    let Some(extent) = map.extent() else {
        anyhow::bail!("{} contains no usable features", args.input.display());
    };
    let view = View {
        level: args.level,
        extent,
        zoom,
    };

    let frame = map.frame(&view, &mut FixedAdvance::default())?;
    tracing::info!(
        level = args.level,
        zoom,
        items = frame.items.len(),
        labels = frame.report.placed,
        no_fit = frame.report.no_fit,
        "Rendered level"
    );

    let document = WallsDocument::from_frame(args.level, &frame);
    let json = document.to_json()?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
