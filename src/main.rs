use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

mod cli;
mod config;
mod error;
mod grid;
mod io;
mod plot;
mod qinit;

use cli::get_args;
use config::{Domain, RunConfig};
use grid::RasterGrid;
use io::datafile::DataDir;
use io::gauges::read_gauges;
use io::topo::{RasterSource, TopoFile};
use io::xyz;
use plot::PlotConfig;
use qinit::{DamLine, InitSurface, StepSurface};

fn main() -> Result<()> {
    let args = get_args()?;

    // The topography footprint drives the computational domain
    let mut topo = TopoFile::new(&args.topo_path, args.topo_type);
    let header = topo
        .header()
        .with_context(|| format!("Failed to read topography header: {:?}", args.topo_path))?;

    println!("\nTopo domain for {:?}:", args.topo_path);
    println!("{:<12} ({:14.8}, {:12.8})", "Lower left", header.xll, header.yll);
    println!(
        "{:<12} ({:14.8}, {:12.8})",
        "Upper right",
        header.x_upper(),
        header.y_upper()
    );

    let domain = Domain::from_topo(&header, 0.975);
    println!("\nComputational domain");
    println!(
        "{:<12} ({:14.8}, {:12.8})",
        "Lower left", domain.lower[0], domain.lower[1]
    );
    println!(
        "{:<12} ({:14.8}, {:12.8})",
        "Upper right", domain.upper[0], domain.upper[1]
    );
    println!("Computed aspect ratio    : {:20.12}", domain.aspect_ratio());

    let gauges = read_gauges(&args.gauge_path)
        .with_context(|| format!("Failed to read gauge locations: {:?}", args.gauge_path))?;
    println!("\nLocation of Gauges:");
    for g in &gauges {
        println!("\tGauge {} at ({}, {})", g.id, g.x, g.y);
    }

    let topo_fname = args
        .topo_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // the reservoir refinement region reaches up to the dam crest
    let dam = DamLine::malpasset();
    dam.validate()?;
    let gate_x = 0.5 * (dam.x3 + dam.x4);
    let run = RunConfig::benchmark(
        domain,
        gate_x,
        topo_fname,
        args.topo_type,
        "init_h.xyz".to_string(),
        gauges,
    );

    let event_time = NaiveDateTime::parse_from_str(&args.event_time, "%Y-%m-%d %H:%M:%S")
        .context("Failed to parse event time")?;
    let plot = PlotConfig::benchmark(
        domain,
        event_time,
        run.flood.mi,
        run.claw.num_cells[0] as i64,
        run.flood.maxlevel,
    );

    let mut sink = DataDir::create(&args.outdir)?;
    let written = run.write_all(&mut sink)?;
    plot.write(&mut sink)?;
    println!(
        "\nWrote {} parameter files to {:?}",
        written.len() + 1,
        sink.root()
    );

    // Initial reservoir surfaces either side of the dam line
    synthesize_surfaces(&mut topo, &dam, sink.root())?;

    // Optional laboratory-style flat reservoir behind the gate
    if args.step_init {
        let step = StepSurface::benchmark();
        let flat = RasterGrid::uniform(domain.lower, domain.upper, header.cols, header.rows, |x, _| {
            step.eval(x)
        })?;
        let path = sink.root().join("init.xyz");
        xyz::write_grid(&flat, &path)?;
        println!("Step surface saved to {:?}", path);
    }

    println!("\nPreprocessing complete. Output saved to {:?}", sink.root());
    Ok(())
}

/// Reads the full grid and writes both initializer files.
fn synthesize_surfaces(
    source: &mut dyn RasterSource,
    dam: &DamLine,
    outdir: &Path,
) -> Result<()> {
    println!("\nReading topography grid...");
    let grid = source.read_grid()?;
    println!(
        "  {} rows x {} cols ({} samples)",
        grid.rows(),
        grid.cols(),
        grid.len()
    );

    let surf = InitSurface::new(&grid, dam);
    let pb = ProgressBar::new(2 * grid.rows() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})")?
            .progress_chars("#>-"),
    );

    let h_path = outdir.join("init_h.xyz");
    let eta_path = outdir.join("init_eta.xyz");
    surf.write_pair(&h_path, &eta_path, &pb)?;
    pb.finish_and_clear();

    println!("Initial surfaces saved to {:?} and {:?}", h_path, eta_path);
    Ok(())
}
