use log::info;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::state::with_state;

/// Quick heuristic acceptance of SVG-looking text. This is deliberately not
/// a parser: anything carrying an `<svg` tag somewhere is let through, and
/// the rendering surface decides what it can actually display.
pub fn looks_like_svg(text: &str) -> bool {
    text.trim_start().starts_with("<svg") || text.contains("<svg")
}

/// Replaces the live preview with `svg_content` and records it as the
/// current source text.
///
/// Text that does not pass [`looks_like_svg`] leaves the preview and the
/// session state untouched. Markup the browser cannot parse renders as a
/// broken or empty preview; that is not detected here.
pub fn update_svg_preview(document: &Document, svg_content: &str) -> Result<(), JsValue> {
    if !looks_like_svg(svg_content) {
        return Ok(());
    }

    with_state(|state| state.set_svg_text(svg_content));

    let container = document
        .get_element_by_id("svg-preview-container")
        .ok_or("Preview container not found")?;
    container.set_inner_html(svg_content);

    if let Some(svg_element) = container.query_selector("svg")? {
        normalize_svg_sizing(&svg_element)?;
    }

    info!("svg preview updated ({} bytes)", svg_content.len());
    Ok(())
}

/// Injects default sizing attributes on the rendered root element so it
/// measures and serializes predictably. Existing attributes are never
/// overwritten.
pub fn normalize_svg_sizing(svg_element: &Element) -> Result<(), JsValue> {
    if svg_element.get_attribute("width").is_none() {
        svg_element.set_attribute("width", "100%")?;
    }
    if svg_element.get_attribute("height").is_none() {
        svg_element.set_attribute("height", "100%")?;
    }
    if svg_element.get_attribute("preserveAspectRatio").is_none() {
        svg_element.set_attribute("preserveAspectRatio", "xMidYMid meet")?;
    }
    Ok(())
}
