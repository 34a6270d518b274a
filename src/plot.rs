use crate::config::Domain;
use crate::error::PrepError;
use crate::io::datafile::{DataValue, IniDocument, RunConfigSink};
use chrono::NaiveDateTime;

/// Geospatial overlay export parameters for the plotting tool.
#[derive(Debug, Clone)]
pub struct KmlOverlay {
    pub name: String,
    pub index_fname: String,
    /// Date/time of the event in UTC.
    pub start_time: NaiveDateTime,
    pub tz_offset_hours: i64,
    pub xlimits: [f64; 2],
    pub ylimits: [f64; 2],
    pub use_figure_limits: bool,
    /// Tiled images load faster but need GDAL on the plotting side.
    pub tile_images: bool,
    pub figsize: [f64; 2],
    pub dpi: f64,
}

/// Aims for one pixel per finest-level grid cell: block count times
/// coarse cells times 2^maxlevel, spread over the figure width.
pub fn finest_dpi(figsize_x: f64, mi: i64, mx: i64, maxlevel: i64) -> f64 {
    (mi * mx * (1_i64 << maxlevel)) as f64 / figsize_x
}

/// Colormap plus its color-axis range.
#[derive(Debug, Clone)]
pub struct ColormapRange {
    pub cmap: String,
    pub cmin: f64,
    pub cmax: f64,
}

impl ColormapRange {
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.cmin >= self.cmax {
            return Err(PrepError::InvalidConfig(format!(
                "color range [{}, {}] of {:?} is empty",
                self.cmin, self.cmax, self.cmap
            )));
        }
        Ok(())
    }
}

/// Per-frame figure: flooded depth over shaded land.
#[derive(Debug, Clone)]
pub struct FrameFigure {
    pub name: String,
    pub figno: i64,
    pub water: ColormapRange,
    pub land: ColormapRange,
    pub add_colorbar: bool,
    pub colorbar_label: String,
    pub show_patch_edges: bool,
}

/// Time-series figure drawn once per gauge.
#[derive(Debug, Clone)]
pub struct GaugeFigure {
    pub name: String,
    pub figno: i64,
    pub surface_style: String,
    pub topo_style: String,
    pub xlabel: String,
}

/// Hardcopy switches for the frame printer.
#[derive(Debug, Clone)]
pub struct Hardcopy {
    pub print_format: String,
    pub max_frames: usize,
    pub fignos: Vec<i64>,
    pub gaugenos: String,
    pub html: bool,
    pub html_movie: bool,
    pub latex: bool,
    pub kml: bool,
    pub overwrite: bool,
    pub parallel: bool,
}

/// Everything the external plotting tool needs for one run.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub format: String,
    pub kml: KmlOverlay,
    pub frame: FrameFigure,
    pub gauge: GaugeFigure,
    pub hardcopy: Hardcopy,
}

impl PlotConfig {
    /// Dam-break benchmark plots: one KML frame figure over the
    /// computational domain and a surface/topo curve per gauge.
    pub fn benchmark(
        domain: Domain,
        event: NaiveDateTime,
        mi: i64,
        mx: i64,
        maxlevel: i64,
    ) -> Self {
        let figsize = [36.0, 1.9782];
        PlotConfig {
            format: "forestclaw".to_string(),
            kml: KmlOverlay {
                name: "Benchmark test".to_string(),
                index_fname: "Benchmark test".to_string(),
                start_time: event,
                tz_offset_hours: 1,
                xlimits: [domain.lower[0], domain.upper[0]],
                ylimits: [domain.lower[1], domain.upper[1]],
                use_figure_limits: true,
                tile_images: false,
                figsize,
                dpi: finest_dpi(figsize[0], mi, mx, maxlevel),
            },
            frame: FrameFigure {
                name: "Benchmark test".to_string(),
                figno: 1,
                water: ColormapRange {
                    cmap: "googleearth_flooding".to_string(),
                    cmin: 0.0,
                    cmax: 5.0,
                },
                land: ColormapRange {
                    cmap: "land_flood_colormap".to_string(),
                    cmin: 0.0,
                    cmax: 3.0,
                },
                add_colorbar: true,
                colorbar_label: "meters".to_string(),
                show_patch_edges: false,
            },
            gauge: GaugeFigure {
                name: "Flood height".to_string(),
                figno: 300,
                surface_style: "b-".to_string(),
                topo_style: "g-".to_string(),
                xlabel: "time (hours)".to_string(),
            },
            hardcopy: Hardcopy {
                print_format: "png".to_string(),
                max_frames: 100,
                fignos: vec![1, 300],
                gaugenos: "all".to_string(),
                html: true,
                html_movie: true,
                latex: false,
                kml: true,
                overwrite: true,
                parallel: false,
            },
        }
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        self.frame.water.validate()?;
        self.frame.land.validate()?;
        if self.kml.dpi <= 0.0 || self.kml.figsize[0] <= 0.0 || self.kml.figsize[1] <= 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "degenerate overlay raster: figsize {:?} at {} dpi",
                self.kml.figsize, self.kml.dpi
            )));
        }
        if !(-12..=14).contains(&self.kml.tz_offset_hours) {
            return Err(PrepError::InvalidConfig(format!(
                "timezone offset {} out of range",
                self.kml.tz_offset_hours
            )));
        }
        Ok(())
    }

    pub fn to_ini(&self) -> IniDocument {
        let mut doc = IniDocument::new();
        doc.set("plotdata", "format", &self.format);
        doc.set("plotdata", "print_format", &self.hardcopy.print_format);
        doc.set("plotdata", "print_framenos", self.hardcopy.max_frames);
        doc.set("plotdata", "print_gaugenos", &self.hardcopy.gaugenos);
        doc.set(
            "plotdata",
            "print_fignos",
            self.hardcopy
                .fignos
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        );
        doc.set("plotdata", "html", DataValue::Bool(self.hardcopy.html));
        doc.set(
            "plotdata",
            "html_movie",
            DataValue::Bool(self.hardcopy.html_movie),
        );
        doc.set("plotdata", "latex", DataValue::Bool(self.hardcopy.latex));
        doc.set("plotdata", "kml", DataValue::Bool(self.hardcopy.kml));
        doc.set(
            "plotdata",
            "overwrite",
            DataValue::Bool(self.hardcopy.overwrite),
        );
        doc.set("plotdata", "parallel", DataValue::Bool(self.hardcopy.parallel));

        doc.set("kml", "name", &self.kml.name);
        doc.set("kml", "index_fname", &self.kml.index_fname);
        doc.set(
            "kml",
            "starttime",
            self.kml.start_time.format("%Y-%m-%d %H:%M:%S"),
        );
        doc.set("kml", "tz_offset", self.kml.tz_offset_hours);
        doc.set(
            "kml",
            "xlimits",
            format!("{} {}", self.kml.xlimits[0], self.kml.xlimits[1]),
        );
        doc.set(
            "kml",
            "ylimits",
            format!("{} {}", self.kml.ylimits[0], self.kml.ylimits[1]),
        );
        doc.set(
            "kml",
            "use_figure_limits",
            DataValue::Bool(self.kml.use_figure_limits),
        );
        doc.set("kml", "tile_images", DataValue::Bool(self.kml.tile_images));
        doc.set(
            "kml",
            "figsize",
            format!("{} {}", self.kml.figsize[0], self.kml.figsize[1]),
        );
        doc.set("kml", "dpi", self.kml.dpi);

        doc.set("figure.frame", "name", &self.frame.name);
        doc.set("figure.frame", "figno", self.frame.figno);
        doc.set("figure.frame", "water_cmap", &self.frame.water.cmap);
        doc.set("figure.frame", "water_cmin", self.frame.water.cmin);
        doc.set("figure.frame", "water_cmax", self.frame.water.cmax);
        doc.set("figure.frame", "land_cmap", &self.frame.land.cmap);
        doc.set("figure.frame", "land_cmin", self.frame.land.cmin);
        doc.set("figure.frame", "land_cmax", self.frame.land.cmax);
        doc.set(
            "figure.frame",
            "add_colorbar",
            DataValue::Bool(self.frame.add_colorbar),
        );
        doc.set("figure.frame", "colorbar_label", &self.frame.colorbar_label);
        doc.set(
            "figure.frame",
            "patchedges_show",
            DataValue::Bool(self.frame.show_patch_edges),
        );

        doc.set("figure.gauges", "name", &self.gauge.name);
        doc.set("figure.gauges", "figno", self.gauge.figno);
        doc.set("figure.gauges", "surface_style", &self.gauge.surface_style);
        doc.set("figure.gauges", "topo_style", &self.gauge.topo_style);
        doc.set("figure.gauges", "xlabel", &self.gauge.xlabel);
        doc
    }

    /// Validates, then emits `plot.ini` through the sink.
    pub fn write(&self, sink: &mut dyn RunConfigSink) -> Result<(), PrepError> {
        self.validate()?;
        sink.write_ini("plot.ini", &self.to_ini())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> Domain {
        Domain {
            lower: [-146.25, -55.1125],
            upper: [1823.25, 53.1125],
        }
    }

    fn event() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("1959-12-02 05:14:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn dpi_targets_one_pixel_per_finest_cell() {
        // 18 blocks of 54 cells refined 2^3, over a 36 inch figure
        assert_eq!(finest_dpi(36.0, 18, 54, 3), 216.0);
    }

    #[test]
    fn benchmark_limits_track_the_domain() {
        let plot = PlotConfig::benchmark(domain(), event(), 18, 54, 3);
        assert_eq!(plot.kml.xlimits, [-146.25, 1823.25]);
        assert_eq!(plot.kml.ylimits, [-55.1125, 53.1125]);
        assert_eq!(plot.kml.dpi, 216.0);
        plot.validate().unwrap();
    }

    #[test]
    fn ini_carries_the_event_time_and_colormaps() {
        let ini = PlotConfig::benchmark(domain(), event(), 18, 54, 3).to_ini();
        let text = ini.render();
        assert!(text.contains("[kml]\n"));
        assert!(text.contains("starttime = 1959-12-02 05:14:00"));
        assert!(text.contains("tz_offset = 1"));
        assert!(text.contains("water_cmap = googleearth_flooding"));
        assert!(text.contains("print_fignos = 1 300"));
        assert!(text.contains("html = T"));
        assert!(text.contains("latex = F"));
    }

    #[test]
    fn empty_color_range_is_rejected() {
        let mut plot = PlotConfig::benchmark(domain(), event(), 18, 54, 3);
        plot.frame.water.cmax = plot.frame.water.cmin;
        assert!(matches!(
            plot.validate(),
            Err(PrepError::InvalidConfig(_))
        ));
    }
}
