//! Image-driven stone placement
//!
//! The image is laid over the region (padded to keep its aspect ratio when
//! asked) and sampled on a square grid whose pitch follows the stone size and
//! density. A cell gets a stone when its luminance is at or below the
//! threshold, or at or above it when inverted. Image row 0 is the top edge
//! of the region.

use super::{remove_overlaps, stone_diameter, RhinestoneLayout, RhinestonePlacement, RhinestoneSettings};
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stonepath_core::{Bounds, Error, PlacementError};

/// How each stone's size is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SizeMode {
    /// Always the primary stone size
    #[default]
    Primary,
    /// Darker cells get larger sizes from the configured size list
    Brightness,
}

/// Image sampling options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageMapParams {
    /// Luminance cutoff in `[0, 1]`
    pub threshold: f64,
    pub invert: bool,
    /// Cells less opaque than this are skipped; 0 disables the test
    pub alpha_threshold: f64,
    pub keep_aspect: bool,
    pub size_mode: SizeMode,
}

impl Default for ImageMapParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            invert: false,
            alpha_threshold: 0.1,
            keep_aspect: true,
            size_mode: SizeMode::Primary,
        }
    }
}

/// Relative luminance of an sRGB pixel, normalized to `[0, 1]`
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    (0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)) / 255.0
}

/// Load an image file and map it over `bounds`
pub fn calculate_image_map_from_path(
    path: &Path,
    bounds: &Bounds,
    settings: &RhinestoneSettings,
    params: &ImageMapParams,
) -> Result<RhinestoneLayout, Error> {
    let image = image::open(path)
        .map_err(|e| Error::Image(format!("failed to open {}: {}", path.display(), e)))?;
    Ok(calculate_image_map(&image, bounds, settings, params)?)
}

/// Map an in-memory image over `bounds`
pub fn calculate_image_map(
    image: &DynamicImage,
    bounds: &Bounds,
    settings: &RhinestoneSettings,
    params: &ImageMapParams,
) -> Result<RhinestoneLayout, PlacementError> {
    let pixels: RgbaImage = image.to_rgba8();
    let (img_w, img_h) = pixels.dimensions();
    let out_w = bounds.width();
    let out_h = bounds.height();

    if img_w == 0 || img_h == 0 || out_w <= 0.0 || out_h <= 0.0 {
        tracing::warn!("Image map skipped: empty image or region");
        return Ok(RhinestoneLayout::default());
    }

    let scale_x = out_w / f64::from(img_w);
    let scale_y = out_h / f64::from(img_h);
    let (mm_per_px_x, mm_per_px_y) = if params.keep_aspect {
        let s = scale_x.min(scale_y);
        (s, s)
    } else {
        (scale_x, scale_y)
    };
    let render_w = f64::from(img_w) * mm_per_px_x;
    let render_h = f64::from(img_h) * mm_per_px_y;
    let pad_x = (out_w - render_w) / 2.0;
    let pad_y = (out_h - render_h) / 2.0;

    let picker = settings.size_picker();
    let base_diameter = if picker.is_mixed() {
        picker.average_diameter()
    } else {
        stone_diameter(&settings.stone_size)
    };
    let base_spacing = (base_diameter + settings.min_gap + settings.spacing).max(0.1);
    let spacing = base_spacing / settings.clamped_density();
    if !spacing.is_finite() {
        return Err(PlacementError::invalid("spacing", "grid pitch is not finite"));
    }

    let mut size_order = settings.size_choices();
    size_order.sort_by(|a, b| stone_diameter(a).total_cmp(&stone_diameter(b)));

    let left = bounds.left + pad_x;
    let top = bounds.top - pad_y;
    let mut placements = Vec::new();

    // u runs right from the rendered left edge, v runs down from its top edge
    for v in (0..).map(|j| spacing / 2.0 + j as f64 * spacing).take_while(|v| *v < render_h) {
        let py = (v / mm_per_px_y) as u32;
        for u in (0..).map(|i| spacing / 2.0 + i as f64 * spacing).take_while(|u| *u < render_w) {
            let px = (u / mm_per_px_x) as u32;
            if px >= img_w || py >= img_h {
                continue;
            }

            let [r, g, b, a] = pixels.get_pixel(px, py).0;
            let alpha = f64::from(a) / 255.0;
            if params.alpha_threshold > 0.0 && alpha < params.alpha_threshold {
                continue;
            }

            let brightness = luminance(r, g, b);
            let place = if params.invert {
                brightness >= params.threshold
            } else {
                brightness <= params.threshold
            };
            if !place {
                continue;
            }

            let stone_size = match params.size_mode {
                SizeMode::Brightness if size_order.len() > 1 => {
                    let last = size_order.len() - 1;
                    let idx = ((1.0 - brightness) * last as f64 + 0.5) as usize;
                    size_order[idx.min(last)].clone()
                }
                _ => settings.stone_size.clone(),
            };
            let diameter = stone_diameter(&stone_size);

            placements.push(RhinestonePlacement {
                x: left + u,
                y: top - v,
                stone_size,
                rotation: settings.rotation,
                element_index: None,
                diameter: Some(diameter),
            });
        }
    }

    if settings.remove_overlaps {
        placements = remove_overlaps(placements, settings.min_gap);
    }

    tracing::info!("Image map: {} stones from {}x{} image", placements.len(), img_w, img_h);
    Ok(RhinestoneLayout::new(placements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn half_dark(w: u32, h: u32) -> DynamicImage {
        // top half black, bottom half white
        let img = RgbaImage::from_fn(w, h, |_, y| {
            if y < h / 2 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    fn settings() -> RhinestoneSettings {
        RhinestoneSettings {
            stone_size: "SS10".to_string(),
            min_gap: 0.2,
            density: 1.0,
            ..RhinestoneSettings::default()
        }
    }

    #[test]
    fn test_luminance_weights() {
        assert_eq!(luminance(0, 0, 0), 0.0);
        assert!((luminance(255, 255, 255) - 1.0).abs() < 1e-12);
        assert!(luminance(0, 255, 0) > luminance(255, 0, 0));
    }

    #[test]
    fn test_dark_top_half_maps_to_region_top() {
        let bounds = Bounds::new(0.0, 0.0, 30.0, 30.0);
        let layout =
            calculate_image_map(&half_dark(10, 10), &bounds, &settings(), &ImageMapParams::default())
                .unwrap();
        assert!(!layout.is_empty());
        assert!(layout.iter().all(|p| p.y > 15.0));
    }

    #[test]
    fn test_invert_selects_bright_cells() {
        let bounds = Bounds::new(0.0, 0.0, 30.0, 30.0);
        let params = ImageMapParams {
            invert: true,
            ..ImageMapParams::default()
        };
        let layout = calculate_image_map(&half_dark(10, 10), &bounds, &settings(), &params).unwrap();
        assert!(!layout.is_empty());
        assert!(layout.iter().all(|p| p.y < 15.0));
    }

    #[test]
    fn test_transparent_cells_are_skipped() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let layout = calculate_image_map(
            &img,
            &Bounds::new(0.0, 0.0, 20.0, 20.0),
            &settings(),
            &ImageMapParams::default(),
        )
        .unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn test_brightness_size_mode_uses_largest_for_black() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        let settings = RhinestoneSettings {
            stone_sizes: vec!["SS20".to_string(), "SS6".to_string(), "SS10".to_string()],
            ..settings()
        };
        let params = ImageMapParams {
            size_mode: SizeMode::Brightness,
            ..ImageMapParams::default()
        };
        let layout =
            calculate_image_map(&img, &Bounds::new(0.0, 0.0, 40.0, 40.0), &settings, &params).unwrap();
        assert!(!layout.is_empty());
        assert!(layout.iter().all(|p| p.stone_size == "SS20"));
    }

    #[test]
    fn test_keep_aspect_pads_wide_region() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255])));
        let layout = calculate_image_map(
            &img,
            &Bounds::new(0.0, 0.0, 60.0, 30.0),
            &settings(),
            &ImageMapParams::default(),
        )
        .unwrap();
        assert!(layout.iter().all(|p| p.x > 15.0 && p.x < 45.0));
    }

    #[test]
    fn test_missing_file_is_image_error() {
        let err = calculate_image_map_from_path(
            Path::new("/nonexistent/stonepath.png"),
            &Bounds::new(0.0, 0.0, 10.0, 10.0),
            &settings(),
            &ImageMapParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Image(_)));
    }
}
