//! Placement exports for stone-setting machines and other software
//!
//! - CSV: `Index,X,Y,Stone Size,Rotation`, coordinates to 3 decimals,
//!   rotation to 1 decimal
//! - JSON: `{ "stone_count": n, "stones": [{ index, x, y, size, rotation }] }`
//! - GDS: whitespace-separated `X Y Diameter Rotation` lines after a two line
//!   comment header
//!
//! All writers keep placement order; indices are 1-based.

use super::RhinestoneLayout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use stonepath_core::{Error, PlacementError, Result};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Gds,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Gds => "gds",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = PlacementError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "gds" => Ok(ExportFormat::Gds),
            other => Err(PlacementError::invalid(
                "format",
                format!("unknown export format '{other}'"),
            )),
        }
    }
}

/// One stone in the JSON export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedStone {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub size: String,
    pub rotation: f64,
}

/// JSON export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub stone_count: usize,
    pub stones: Vec<ExportedStone>,
}

impl From<&RhinestoneLayout> for ExportDocument {
    fn from(layout: &RhinestoneLayout) -> Self {
        ExportDocument {
            stone_count: layout.len(),
            stones: layout
                .iter()
                .enumerate()
                .map(|(i, p)| ExportedStone {
                    index: i + 1,
                    x: p.x,
                    y: p.y,
                    size: p.stone_size.clone(),
                    rotation: p.rotation,
                })
                .collect(),
        }
    }
}

pub fn write_csv<W: Write>(layout: &RhinestoneLayout, mut w: W) -> std::io::Result<()> {
    writeln!(w, "Index,X,Y,Stone Size,Rotation")?;
    for (i, p) in layout.iter().enumerate() {
        writeln!(
            w,
            "{},{:.3},{:.3},{},{:.1}",
            i + 1,
            p.x,
            p.y,
            p.stone_size,
            p.rotation
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(layout: &RhinestoneLayout, mut w: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut w, &ExportDocument::from(layout))?;
    writeln!(w)?;
    Ok(())
}

pub fn write_gds<W: Write>(layout: &RhinestoneLayout, mut w: W) -> std::io::Result<()> {
    writeln!(w, "# Rhinestone Placement Data ({} stones)", layout.len())?;
    writeln!(w, "# Format: X Y Size Rotation")?;
    for p in layout.iter() {
        writeln!(
            w,
            "{:.3} {:.3} {:.2} {:.1}",
            p.x,
            p.y,
            p.effective_diameter(),
            p.rotation
        )?;
    }
    Ok(())
}

/// Write `layout` in `format`
pub fn write_layout<W: Write>(layout: &RhinestoneLayout, format: ExportFormat, w: W) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(layout, w)?,
        ExportFormat::Json => write_json(layout, w)?,
        ExportFormat::Gds => write_gds(layout, w)?,
    }
    Ok(())
}

/// Export `layout` to a file. Empty layouts are refused.
pub fn export_to_file(layout: &RhinestoneLayout, path: &Path, format: ExportFormat) -> Result<()> {
    if layout.is_empty() {
        return Err(Error::Placement(PlacementError::NothingToExport));
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_layout(layout, format, &mut writer)?;
    writer.flush()?;
    tracing::info!("Exported {} stones to {} ({})", layout.len(), path.display(), format);
    Ok(())
}
