use std::str::FromStr;

use svgtypes::{Length, LengthUnit, ViewBox};

/// Raster target when neither the root attributes nor the view box yield a
/// usable size.
pub const FALLBACK_WIDTH: u32 = 800;
pub const FALLBACK_HEIGHT: u32 = 600;

/// Pixel size of the bitmap a conversion draws into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

impl RasterSize {
    pub fn fallback() -> Self {
        RasterSize { width: FALLBACK_WIDTH, height: FALLBACK_HEIGHT }
    }
}

/// Resolves the raster size of an SVG root element from its attributes.
///
/// Resolution order per dimension: explicit `width`/`height` attribute in
/// absolute units, then the view box size. If either dimension is still
/// unresolved the pair falls back to 800x600 as a whole, so the output never
/// mixes a declared width with a fallback height.
pub fn resolve_raster_size(
    width: Option<&str>,
    height: Option<&str>,
    view_box: Option<&str>,
) -> RasterSize {
    let view_box = view_box.and_then(|value| ViewBox::from_str(value).ok());

    let width = width
        .and_then(length_to_px)
        .or_else(|| view_box.map(|vb| vb.w).filter(|w| *w > 0.0));
    let height = height
        .and_then(length_to_px)
        .or_else(|| view_box.map(|vb| vb.h).filter(|h| *h > 0.0));

    match (width, height) {
        (Some(width), Some(height)) => RasterSize {
            width: to_canvas_px(width),
            height: to_canvas_px(height),
        },
        _ => RasterSize::fallback(),
    }
}

/// Converts a length attribute to user-space pixels. Relative units (`%`,
/// `em`, `ex`) depend on a layout context the raster pass does not have and
/// count as unresolved, as do zero and negative lengths.
fn length_to_px(attr: &str) -> Option<f64> {
    let length = Length::from_str(attr).ok()?;
    let px = match length.unit {
        LengthUnit::None | LengthUnit::Px => length.number,
        LengthUnit::In => length.number * 96.0,
        LengthUnit::Cm => length.number * 96.0 / 2.54,
        LengthUnit::Mm => length.number * 96.0 / 25.4,
        LengthUnit::Pt => length.number * 96.0 / 72.0,
        LengthUnit::Pc => length.number * 16.0,
        LengthUnit::Em | LengthUnit::Ex | LengthUnit::Percent => return None,
    };
    (px > 0.0).then_some(px)
}

/// Canvas dimensions are whole pixels; fractional sizes truncate like a
/// `canvas.width` assignment does, but never below one pixel.
fn to_canvas_px(value: f64) -> u32 {
    (value as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_attributes_win() {
        let size = resolve_raster_size(Some("100"), Some("50"), Some("0 0 200 100"));
        assert_eq!(size, RasterSize { width: 100, height: 50 });
    }

    #[test]
    fn px_unit_is_accepted() {
        let size = resolve_raster_size(Some("320px"), Some("240px"), None);
        assert_eq!(size, RasterSize { width: 320, height: 240 });
    }

    #[test]
    fn absolute_units_convert_to_px() {
        let size = resolve_raster_size(Some("1in"), Some("72pt"), None);
        assert_eq!(size, RasterSize { width: 96, height: 96 });
    }

    #[test]
    fn view_box_fills_in_missing_attributes() {
        let size = resolve_raster_size(None, None, Some("0 0 200 100"));
        assert_eq!(size, RasterSize { width: 200, height: 100 });
    }

    #[test]
    fn percent_attributes_defer_to_view_box() {
        // The preview injects width="100%"/height="100%" on bare roots.
        let size = resolve_raster_size(Some("100%"), Some("100%"), Some("0 0 640 480"));
        assert_eq!(size, RasterSize { width: 640, height: 480 });
    }

    #[test]
    fn no_size_information_falls_back() {
        assert_eq!(resolve_raster_size(None, None, None), RasterSize::fallback());
        assert_eq!(
            resolve_raster_size(None, None, None),
            RasterSize { width: 800, height: 600 }
        );
    }

    #[test]
    fn partial_size_information_falls_back_as_a_pair() {
        let size = resolve_raster_size(Some("100"), None, None);
        assert_eq!(size, RasterSize::fallback());
    }

    #[test]
    fn zero_and_garbage_lengths_are_unresolved() {
        assert_eq!(resolve_raster_size(Some("0"), Some("0"), None), RasterSize::fallback());
        assert_eq!(
            resolve_raster_size(Some("abc"), Some("def"), Some("not a view box")),
            RasterSize::fallback()
        );
    }

    #[test]
    fn fractional_sizes_truncate_but_stay_positive() {
        let size = resolve_raster_size(Some("199.7"), Some("0.4"), None);
        assert_eq!(size, RasterSize { width: 199, height: 1 });
    }
}
