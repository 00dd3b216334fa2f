//! Job files
//!
//! A job file is a JSON document describing one placement operation, its
//! geometry in a declared unit and where to write the result:
//!
//! ```json
//! {
//!   "name": "collar",
//!   "unit": "inch",
//!   "operation": {
//!     "type": "hexagonal_fill",
//!     "region": { "left": 0, "bottom": 0, "right": 4, "top": 2 }
//!   },
//!   "output": "collar.csv"
//! }
//! ```
//!
//! Geometry and length settings are converted to millimeters on load;
//! every output is written in millimeters. Curve fills and arrays are
//! materialized into a [`MemoryDocument`] so that host-side behavior (undo
//! groups, failed copies, overlap cleanup) is exercised exactly as it would be
//! against a drawing application.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use stonepath_core::{Bounds, LengthUnit, Point};
use stonepath_designer::rhinestone::export::export_to_file;
use stonepath_designer::{
    calculate_circular_grid, calculate_hexagonal_grid, calculate_image_map_from_path,
    calculate_outline, calculate_pixel_grid, calculate_random_scatter, calculate_square_grid,
    create_array, execute_fill, write_template, ArrayOperation, CircularArrayParams, Curve,
    CurveFillEngine, CurveSegment, ExportFormat, FillRegion, FillSettings, FillStatistics,
    GridArrayParams, HexGridParams, ImageMapParams, LinearArrayParams, MemoryDocument,
    PathArrayParams, PlacementPoint, Polygon, RhinestoneLayout, RhinestoneSettings, ScatterParams,
    ShapeHandle, TemplateParams,
};
use stonepath_settings::Config;

/// Curve geometry: explicit segments, or a polyline when no segments are given
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSpec {
    pub segments: Vec<CurveSegment>,
    pub polyline: Vec<Point>,
    pub closed: bool,
}

impl CurveSpec {
    fn to_curve(&self, unit: LengthUnit) -> Curve {
        if self.segments.is_empty() {
            let points: Vec<Point> = self.polyline.iter().map(|p| point_to_mm(*p, unit)).collect();
            Curve::from_polyline(&points, self.closed)
        } else {
            Curve::new(
                self.segments
                    .iter()
                    .map(|s| CurveSegment {
                        start: point_to_mm(s.start, unit),
                        end: point_to_mm(s.end, unit),
                        control1: s.control1.map(|p| point_to_mm(p, unit)),
                        control2: s.control2.map(|p| point_to_mm(p, unit)),
                        is_bezier: s.is_bezier,
                    })
                    .collect(),
            )
        }
    }
}

/// Array description in a job file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArraySpec {
    Linear(LinearArrayParams),
    Grid(GridArrayParams),
    Circular(CircularArrayParams),
    Path {
        path: CurveSpec,
        step: f64,
        #[serde(default)]
        count: u32,
        #[serde(default)]
        rotate_copies: bool,
    },
}

impl ArraySpec {
    fn to_operation(&self, unit: LengthUnit) -> ArrayOperation {
        match self {
            ArraySpec::Linear(p) => ArrayOperation::Linear(LinearArrayParams {
                spacing: unit.to_mm(p.spacing),
                ..p.clone()
            }),
            ArraySpec::Grid(p) => ArrayOperation::Grid(GridArrayParams {
                column_spacing: unit.to_mm(p.column_spacing),
                row_spacing: unit.to_mm(p.row_spacing),
                ..p.clone()
            }),
            ArraySpec::Circular(p) => ArrayOperation::Circular(CircularArrayParams {
                radius: unit.to_mm(p.radius),
                center: p.center.map(|c| point_to_mm(c, unit)),
                ..p.clone()
            }),
            ArraySpec::Path {
                path,
                step,
                count,
                rotate_copies,
            } => ArrayOperation::Path(PathArrayParams {
                path: path.to_curve(unit),
                step: unit.to_mm(*step),
                count: *count,
                rotate_copies: *rotate_copies,
            }),
        }
    }
}

/// One placement operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    CurveFill {
        curve: CurveSpec,
        /// Bounding boxes of the fill elements
        elements: Vec<Bounds>,
        #[serde(default)]
        settings: Option<FillSettings>,
    },
    HexagonalFill {
        region: Bounds,
        #[serde(default)]
        outline: Option<Vec<Point>>,
        #[serde(default)]
        settings: Option<RhinestoneSettings>,
        #[serde(default)]
        grid: HexGridParams,
        #[serde(default)]
        elements: Vec<Bounds>,
    },
    SquareFill {
        region: Bounds,
        #[serde(default)]
        outline: Option<Vec<Point>>,
        #[serde(default)]
        settings: Option<RhinestoneSettings>,
        #[serde(default)]
        elements: Vec<Bounds>,
    },
    CircularFill {
        region: Bounds,
        #[serde(default)]
        outline: Option<Vec<Point>>,
        #[serde(default)]
        settings: Option<RhinestoneSettings>,
        #[serde(default)]
        elements: Vec<Bounds>,
    },
    PixelFill {
        region: Bounds,
        #[serde(default)]
        outline: Option<Vec<Point>>,
        #[serde(default)]
        settings: Option<RhinestoneSettings>,
    },
    /// Stones along a curve
    OutlineFill {
        curve: CurveSpec,
        #[serde(default)]
        settings: Option<RhinestoneSettings>,
        #[serde(default)]
        elements: Vec<Bounds>,
    },
    RandomScatter {
        region: Bounds,
        #[serde(default)]
        outline: Option<Vec<Point>>,
        #[serde(default)]
        settings: Option<RhinestoneSettings>,
        #[serde(default)]
        scatter: ScatterParams,
        #[serde(default)]
        elements: Vec<Bounds>,
    },
    ImageMap {
        /// Relative paths resolve against the job file's directory
        image: PathBuf,
        region: Bounds,
        #[serde(default)]
        settings: Option<RhinestoneSettings>,
        #[serde(default)]
        params: ImageMapParams,
    },
    Array {
        base: Bounds,
        array: ArraySpec,
        #[serde(default)]
        remove_overlaps: bool,
    },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::CurveFill { .. } => "curve_fill",
            Operation::HexagonalFill { .. } => "hexagonal_fill",
            Operation::SquareFill { .. } => "square_fill",
            Operation::CircularFill { .. } => "circular_fill",
            Operation::PixelFill { .. } => "pixel_fill",
            Operation::OutlineFill { .. } => "outline_fill",
            Operation::RandomScatter { .. } => "random_scatter",
            Operation::ImageMap { .. } => "image_map",
            Operation::Array { .. } => "array",
        }
    }
}

/// A job file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub name: Option<String>,
    /// Unit of every length in the job; the configured default when unset
    #[serde(default)]
    pub unit: Option<LengthUnit>,
    pub operation: Operation,
    pub output: PathBuf,
    /// Export format for rhinestone layouts; taken from the output extension,
    /// then the configured default, when unset
    #[serde(default)]
    pub format: Option<ExportFormat>,
    /// Also write a printable SVG template of a rhinestone layout here
    #[serde(default)]
    pub template: Option<PathBuf>,
}

/// Outcome of one job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub name: String,
    pub operation: &'static str,
    /// Placements written
    pub count: usize,
    pub output: PathBuf,
}

/// Curve fill output document
#[derive(Debug, Serialize)]
struct CurveFillOutput<'a> {
    statistics: FillStatistics,
    placements: &'a [PlacementPoint],
}

/// Array output document
#[derive(Debug, Serialize)]
struct ArrayOutput {
    copies: Vec<Bounds>,
}

fn point_to_mm(p: Point, unit: LengthUnit) -> Point {
    Point::new(unit.to_mm(p.x), unit.to_mm(p.y))
}

fn bounds_to_mm(b: &Bounds, unit: LengthUnit) -> Bounds {
    Bounds::new(
        unit.to_mm(b.left),
        unit.to_mm(b.bottom),
        unit.to_mm(b.right),
        unit.to_mm(b.top),
    )
}

fn fill_settings_to_mm(settings: &FillSettings, unit: LengthUnit) -> FillSettings {
    FillSettings {
        spacing_value: unit.to_mm(settings.spacing_value),
        spacing_min: unit.to_mm(settings.spacing_min),
        spacing_max: unit.to_mm(settings.spacing_max),
        start_padding: unit.to_mm(settings.start_padding),
        end_padding: unit.to_mm(settings.end_padding),
        offset_from_curve: unit.to_mm(settings.offset_from_curve),
        ..settings.clone()
    }
}

fn stone_settings_to_mm(settings: &RhinestoneSettings, unit: LengthUnit) -> RhinestoneSettings {
    RhinestoneSettings {
        spacing: unit.to_mm(settings.spacing),
        min_gap: unit.to_mm(settings.min_gap),
        outline_offset: unit.to_mm(settings.outline_offset),
        ..settings.clone()
    }
}

fn hex_params_to_mm(params: &HexGridParams, unit: LengthUnit) -> HexGridParams {
    HexGridParams {
        offset_x: unit.to_mm(params.offset_x),
        offset_y: unit.to_mm(params.offset_y),
        edge_margin: unit.to_mm(params.edge_margin),
        horizontal_spacing: unit.to_mm(params.horizontal_spacing),
        vertical_spacing: unit.to_mm(params.vertical_spacing),
        ..params.clone()
    }
}

/// Read and parse a job file
pub fn load_job(path: &Path) -> anyhow::Result<Job> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading job {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing job {}", path.display()))
}

/// Load and run the job at `path`. Relative paths inside the job resolve
/// against the job file's directory.
pub fn run_job_file(path: &Path, config: &Config) -> anyhow::Result<JobReport> {
    let job = load_job(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    run_job(&job, config, base_dir)
}

/// Run one job
pub fn run_job(job: &Job, config: &Config, base_dir: &Path) -> anyhow::Result<JobReport> {
    let unit = job.unit.unwrap_or(config.units.default_unit);
    let name = job
        .name
        .clone()
        .unwrap_or_else(|| job.operation.kind().to_string());
    let output = resolve_output(&job.output, config, base_dir);

    tracing::info!("Running job '{}' ({}, {})", name, job.operation.kind(), unit);

    let count = match &job.operation {
        Operation::CurveFill {
            curve,
            elements,
            settings,
        } => {
            let settings = settings
                .as_ref()
                .map(|s| fill_settings_to_mm(s, unit))
                .unwrap_or_else(|| config.curve_filler.fill_settings());
            let element_bounds: Vec<Bounds> = elements.iter().map(|b| bounds_to_mm(b, unit)).collect();
            run_curve_fill(curve.to_curve(unit), element_bounds, settings, &output)?
        }
        Operation::HexagonalFill {
            region,
            outline,
            settings,
            grid,
            elements,
        } => {
            let settings = stone_settings(settings.as_ref(), config, unit);
            let outline = outline_to_mm(outline.as_deref(), unit);
            let region = fill_region(region, outline.as_ref(), unit);
            let elements: Vec<Bounds> = elements.iter().map(|b| bounds_to_mm(b, unit)).collect();
            let grid = hex_params_to_mm(grid, unit);
            let layout = calculate_hexagonal_grid(&region, &settings, &grid, &elements)?;
            write_layout_output(&layout, job, config, &output, base_dir)?
        }
        Operation::SquareFill {
            region,
            outline,
            settings,
            elements,
        } => {
            let settings = stone_settings(settings.as_ref(), config, unit);
            let outline = outline_to_mm(outline.as_deref(), unit);
            let region = fill_region(region, outline.as_ref(), unit);
            let elements: Vec<Bounds> = elements.iter().map(|b| bounds_to_mm(b, unit)).collect();
            let layout = calculate_square_grid(&region, &settings, &elements)?;
            write_layout_output(&layout, job, config, &output, base_dir)?
        }
        Operation::CircularFill {
            region,
            outline,
            settings,
            elements,
        } => {
            let settings = stone_settings(settings.as_ref(), config, unit);
            let outline = outline_to_mm(outline.as_deref(), unit);
            let region = fill_region(region, outline.as_ref(), unit);
            let elements: Vec<Bounds> = elements.iter().map(|b| bounds_to_mm(b, unit)).collect();
            let layout = calculate_circular_grid(&region, &settings, &elements)?;
            write_layout_output(&layout, job, config, &output, base_dir)?
        }
        Operation::PixelFill {
            region,
            outline,
            settings,
        } => {
            let settings = stone_settings(settings.as_ref(), config, unit);
            let outline = outline_to_mm(outline.as_deref(), unit);
            let region = fill_region(region, outline.as_ref(), unit);
            let layout = calculate_pixel_grid(&region, &settings)?;
            write_layout_output(&layout, job, config, &output, base_dir)?
        }
        Operation::OutlineFill {
            curve,
            settings,
            elements,
        } => {
            let settings = stone_settings(settings.as_ref(), config, unit);
            let elements: Vec<Bounds> = elements.iter().map(|b| bounds_to_mm(b, unit)).collect();
            let layout = calculate_outline(&curve.to_curve(unit), &settings, &elements)?;
            write_layout_output(&layout, job, config, &output, base_dir)?
        }
        Operation::RandomScatter {
            region,
            outline,
            settings,
            scatter,
            elements,
        } => {
            let settings = stone_settings(settings.as_ref(), config, unit);
            let outline = outline_to_mm(outline.as_deref(), unit);
            let region = fill_region(region, outline.as_ref(), unit);
            let elements: Vec<Bounds> = elements.iter().map(|b| bounds_to_mm(b, unit)).collect();
            let layout = calculate_random_scatter(&region, &settings, scatter, &elements);
            write_layout_output(&layout, job, config, &output, base_dir)?
        }
        Operation::ImageMap {
            image,
            region,
            settings,
            params,
        } => {
            let settings = stone_settings(settings.as_ref(), config, unit);
            let image = if image.is_absolute() {
                image.clone()
            } else {
                base_dir.join(image)
            };
            let layout =
                calculate_image_map_from_path(&image, &bounds_to_mm(region, unit), &settings, params)?;
            write_layout_output(&layout, job, config, &output, base_dir)?
        }
        Operation::Array {
            base,
            array,
            remove_overlaps,
        } => run_array(
            &bounds_to_mm(base, unit),
            &array.to_operation(unit),
            *remove_overlaps,
            &output,
        )?,
    };

    tracing::info!("Job '{}' wrote {} placements to {}", name, count, output.display());
    Ok(JobReport {
        name,
        operation: job.operation.kind(),
        count,
        output,
    })
}

/// Run jobs strictly one after another, stopping at the first failure
pub fn run_jobs(paths: &[PathBuf], config: &Config) -> anyhow::Result<Vec<JobReport>> {
    paths
        .iter()
        .map(|path| run_job_file(path, config).with_context(|| format!("job {}", path.display())))
        .collect()
}

fn resolve_output(output: &Path, config: &Config, base_dir: &Path) -> PathBuf {
    if output.is_absolute() {
        output.to_path_buf()
    } else {
        config
            .export
            .output_dir
            .as_deref()
            .unwrap_or(base_dir)
            .join(output)
    }
}

fn stone_settings(
    settings: Option<&RhinestoneSettings>,
    config: &Config,
    unit: LengthUnit,
) -> RhinestoneSettings {
    settings
        .map(|s| stone_settings_to_mm(s, unit))
        .unwrap_or_else(|| config.rhinestone.rhinestone_settings())
}

fn outline_to_mm(outline: Option<&[Point]>, unit: LengthUnit) -> Option<Polygon> {
    outline.map(|vertices| Polygon::new(vertices.iter().map(|p| point_to_mm(*p, unit)).collect()))
}

fn fill_region<'a>(region: &Bounds, outline: Option<&'a Polygon>, unit: LengthUnit) -> FillRegion<'a> {
    let region = FillRegion::rect(bounds_to_mm(region, unit));
    match outline {
        Some(polygon) => region.with_container(polygon),
        None => region,
    }
}

fn export_format(job: &Job, config: &Config, output: &Path) -> ExportFormat {
    job.format
        .or_else(|| {
            output
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(|ext| ext.parse().ok())
        })
        .unwrap_or(config.export.default_format)
}

fn write_layout_output(
    layout: &RhinestoneLayout,
    job: &Job,
    config: &Config,
    output: &Path,
    base_dir: &Path,
) -> anyhow::Result<usize> {
    let stats = layout.statistics();
    tracing::info!(
        "{} stones, coverage {:.2} mm², sizes {:?}",
        stats.total_stones,
        stats.coverage_area,
        stats.size_distribution
    );
    if layout.containment_fallbacks > 0 {
        tracing::warn!(
            "{} containment tests fell back to the region policy",
            layout.containment_fallbacks
        );
    }
    if layout.is_empty() {
        bail!("layout is empty; nothing written to {}", output.display());
    }
    let format = export_format(job, config, output);
    export_to_file(layout, output, format)?;
    if let Some(template) = &job.template {
        let template = resolve_output(template, config, base_dir);
        write_template(layout, &template, &TemplateParams::default())?;
    }
    Ok(layout.len())
}

fn write_json<T: Serialize>(value: &T, output: &Path) -> anyhow::Result<()> {
    let file =
        File::create(output).with_context(|| format!("creating {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn run_curve_fill(
    curve: Curve,
    element_bounds: Vec<Bounds>,
    settings: FillSettings,
    output: &Path,
) -> anyhow::Result<usize> {
    let mut doc = MemoryDocument::new();
    let elements: Vec<_> = element_bounds.iter().map(|b| doc.add_shape(*b)).collect();
    let engine = CurveFillEngine::new(curve, element_bounds)?;
    let session = execute_fill(engine, &mut doc, &elements, settings)?;

    let statistics = session.statistics();
    tracing::info!(
        "Curve fill: {} elements on a {:.2} mm curve ({} spacing, {} angle)",
        statistics.element_count,
        statistics.curve_length,
        statistics.spacing_mode,
        statistics.angle_mode
    );
    write_json(
        &CurveFillOutput {
            statistics,
            placements: session.placements(),
        },
        output,
    )?;
    Ok(session.len())
}

fn run_array(
    base: &Bounds,
    operation: &ArrayOperation,
    remove_overlaps: bool,
    output: &Path,
) -> anyhow::Result<usize> {
    let mut doc = MemoryDocument::new();
    let source = doc.add_shape(*base);
    let copies = create_array(operation, &source, &mut doc, remove_overlaps)?;
    let copies = copies
        .iter()
        .map(ShapeHandle::bounds)
        .collect::<Result<Vec<_>, _>>()?;
    let count = copies.len();
    write_json(&ArrayOutput { copies }, output)?;
    Ok(count)
}
