use anyhow::{Context, Result};
use clap::{Parser, command};
use std::path::PathBuf;

use crate::io::topo::TopoType;

/// Configure a flood-solver run and synthesize its initial surfaces
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Case directory holding the topography raster and the gauge CSV
    case_dir: PathBuf,

    /// Run directory for parameter and initializer files
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Also write a flat reservoir step surface to init.xyz
    #[arg(long)]
    step_init: bool,

    /// Event start time (UTC) for the geospatial overlay
    #[arg(long, default_value = "1959-12-02 05:14:00")]
    event_time: String,
}

#[derive(Debug)]
pub struct CaseArgs {
    pub outdir: PathBuf,
    pub topo_path: PathBuf,
    pub topo_type: TopoType,
    pub gauge_path: PathBuf,
    pub step_init: bool,
    pub event_time: String,
}

pub fn get_args() -> Result<CaseArgs> {
    let args = Args::parse();
    let case_dir = args.case_dir;

    // Topography is the first file with a gridded raster extension in the
    // case directory; gauges are the first CSV.
    let mut topo = None;
    let mut gauge_path = None;
    let entries = case_dir
        .read_dir()
        .with_context(|| format!("Failed to read case directory: {:?}", case_dir))?;
    for entry in entries {
        let path = entry?.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if ext == "csv" {
            gauge_path.get_or_insert(path);
            continue;
        }
        if topo.is_none() {
            if let Some(tt) = TopoType::from_extension(ext) {
                if tt != TopoType::Xyz {
                    topo = Some((path, tt));
                }
            }
        }
    }

    let (topo_path, topo_type) = topo.ok_or_else(|| {
        anyhow::anyhow!(
            "No gridded topography (.tt2/.tt3/.asc) found in {:?}",
            case_dir
        )
    })?;
    let gauge_path = gauge_path
        .ok_or_else(|| anyhow::anyhow!("No gauge location CSV found in {:?}", case_dir))?;

    let outdir = args.outdir.unwrap_or_else(|| case_dir.join("_data"));

    Ok(CaseArgs {
        outdir,
        topo_path,
        topo_type,
        gauge_path,
        step_init: args.step_init,
        event_time: args.event_time,
    })
}
