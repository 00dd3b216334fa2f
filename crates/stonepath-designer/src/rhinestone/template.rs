//! Printable stone templates
//!
//! Renders a layout as an SVG page with one outlined circle per stone and an
//! optional size label below it. Document coordinates are y-up; the page is
//! y-down, so y is flipped against the page height.

use super::{stone_diameter, RhinestoneLayout};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use stonepath_core::{Error, PlacementError, Result};

/// Page and label options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateParams {
    /// Page width in mm
    pub page_width: f64,
    /// Page height in mm
    pub page_height: f64,
    pub show_labels: bool,
    /// Circle stroke width in mm
    pub outline_width: f64,
    /// Label font size in mm
    pub label_size: f64,
}

impl Default for TemplateParams {
    fn default() -> Self {
        // A4 portrait
        Self {
            page_width: 210.0,
            page_height: 297.0,
            show_labels: true,
            outline_width: 0.2,
            label_size: 2.0,
        }
    }
}

/// SVG document for `layout`
pub fn render_template(layout: &RhinestoneLayout, params: &TemplateParams) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">\n",
        w = params.page_width,
        h = params.page_height
    ));
    svg.push_str(&format!(
        "  <g id=\"stone-template\" fill=\"none\" stroke=\"black\" stroke-width=\"{}\">\n",
        params.outline_width
    ));

    for p in layout.iter() {
        let diameter = p.diameter.unwrap_or_else(|| stone_diameter(&p.stone_size));
        let cy = params.page_height - p.y;
        svg.push_str(&format!(
            "    <circle cx=\"{:.3}\" cy=\"{:.3}\" r=\"{:.3}\"/>\n",
            p.x,
            cy,
            diameter / 2.0
        ));
        if params.show_labels {
            svg.push_str(&format!(
                "    <text x=\"{:.3}\" y=\"{:.3}\" font-size=\"{}\" text-anchor=\"middle\" stroke=\"none\" fill=\"black\">{}</text>\n",
                p.x,
                cy + diameter,
                params.label_size,
                p.stone_size
            ));
        }
    }

    svg.push_str("  </g>\n</svg>\n");
    svg
}

/// Write the template for `layout` to `path`. Empty layouts are refused.
pub fn write_template(layout: &RhinestoneLayout, path: &Path, params: &TemplateParams) -> Result<()> {
    if layout.is_empty() {
        return Err(Error::Placement(PlacementError::NothingToExport));
    }
    fs::write(path, render_template(layout, params))?;
    tracing::info!("Generated template for {} stones at {}", layout.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhinestone::RhinestonePlacement;

    fn layout() -> RhinestoneLayout {
        RhinestoneLayout::new(vec![
            RhinestonePlacement {
                x: 10.0,
                y: 20.0,
                stone_size: "SS10".to_string(),
                rotation: 0.0,
                element_index: None,
                diameter: None,
            },
            RhinestonePlacement {
                x: 15.0,
                y: 20.0,
                stone_size: "SS20".to_string(),
                rotation: 0.0,
                element_index: None,
                diameter: Some(5.0),
            },
        ])
    }

    #[test]
    fn test_circles_flip_to_page_coordinates() {
        let svg = render_template(&layout(), &TemplateParams::default());
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("<circle cx=\"10.000\" cy=\"277.000\" r=\"1.400\"/>"));
        assert!(svg.contains("r=\"2.500\""));
        assert!(svg.contains(">SS20</text>"));
    }

    #[test]
    fn test_labels_can_be_hidden() {
        let params = TemplateParams {
            show_labels: false,
            ..TemplateParams::default()
        };
        let svg = render_template(&layout(), &params);
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn test_empty_layout_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_template(
            &RhinestoneLayout::default(),
            &dir.path().join("t.svg"),
            &TemplateParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Placement(PlacementError::NothingToExport)));
    }
}
