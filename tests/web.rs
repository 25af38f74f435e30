#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::Document;

use svg_raster_webapp::convert;
use svg_raster_webapp::preview;
use svg_raster_webapp::state::{with_state, OutputFormat};

wasm_bindgen_test_configure!(run_in_browser);

fn ensure_converter_dom() -> Document {
    let document = web_sys::window().unwrap().document().unwrap();
    if document.get_element_by_id("svg-preview-container").is_none() {
        let body = document.body().unwrap();
        body.insert_adjacent_html(
            "beforeend",
            r#"
            <div id="svg-preview-container"></div>
            <div id="image-output-container"></div>
            <button id="btn-download" disabled>Download</button>
            <button id="btn-copy" disabled>Copy to Clipboard</button>
            "#,
        )
        .unwrap();
    }
    document
}

fn preview_svg(document: &Document) -> Option<web_sys::Element> {
    document
        .get_element_by_id("svg-preview-container")
        .unwrap()
        .query_selector("svg")
        .unwrap()
}

#[wasm_bindgen_test]
fn preview_injects_default_sizing() {
    let document = ensure_converter_dom();

    preview::update_svg_preview(&document, "<svg><rect width=\"10\" height=\"10\"/></svg>")
        .unwrap();

    let svg = preview_svg(&document).expect("preview should hold an svg element");
    assert_eq!(svg.get_attribute("width").as_deref(), Some("100%"));
    assert_eq!(svg.get_attribute("height").as_deref(), Some("100%"));
    assert_eq!(
        svg.get_attribute("preserveAspectRatio").as_deref(),
        Some("xMidYMid meet")
    );
}

#[wasm_bindgen_test]
fn preview_keeps_explicit_sizing() {
    let document = ensure_converter_dom();

    preview::update_svg_preview(&document, "<svg width=\"100\" height=\"50\"></svg>").unwrap();

    let svg = preview_svg(&document).expect("preview should hold an svg element");
    assert_eq!(svg.get_attribute("width").as_deref(), Some("100"));
    assert_eq!(svg.get_attribute("height").as_deref(), Some("50"));
    // preserveAspectRatio was absent, so the default still gets injected
    assert_eq!(
        svg.get_attribute("preserveAspectRatio").as_deref(),
        Some("xMidYMid meet")
    );
}

#[wasm_bindgen_test]
fn rejected_text_leaves_preview_and_state_alone() {
    let document = ensure_converter_dom();

    preview::update_svg_preview(&document, "<svg width=\"42\" height=\"42\"></svg>").unwrap();

    preview::update_svg_preview(&document, "").unwrap();
    preview::update_svg_preview(&document, "<div>not svg</div>").unwrap();

    let svg = preview_svg(&document).expect("previous preview should survive");
    assert_eq!(svg.get_attribute("width").as_deref(), Some("42"));
    with_state(|state| {
        assert_eq!(state.svg_text(), Some("<svg width=\"42\" height=\"42\"></svg>"));
    });
}

#[wasm_bindgen_test]
async fn convert_png_uses_explicit_dimensions() {
    let document = ensure_converter_dom();

    preview::update_svg_preview(
        &document,
        "<svg width=\"100\" height=\"50\"><rect width=\"100\" height=\"50\" fill=\"red\"/></svg>",
    )
    .unwrap();

    convert::convert_to_image(OutputFormat::Png).await.unwrap();

    with_state(|state| {
        let raster = state.raster().expect("conversion should produce a raster");
        let info = raster.info();
        assert_eq!((info.width, info.height), (100, 50));
        assert_eq!(info.format, "png");
        assert!(raster.data_url().starts_with("data:image/png"));
    });
}

#[wasm_bindgen_test]
async fn convert_jpeg_resolves_view_box_dimensions() {
    let document = ensure_converter_dom();

    preview::update_svg_preview(
        &document,
        "<svg viewBox=\"0 0 200 100\"><circle cx=\"100\" cy=\"50\" r=\"40\"/></svg>",
    )
    .unwrap();

    convert::convert_to_image(OutputFormat::Jpeg).await.unwrap();

    with_state(|state| {
        let raster = state.raster().expect("conversion should produce a raster");
        let info = raster.info();
        assert_eq!((info.width, info.height), (200, 100));
        assert_eq!(info.format, "jpeg");
        assert!(raster.data_url().starts_with("data:image/jpeg"));
    });
}

#[wasm_bindgen_test]
async fn convert_without_size_information_falls_back() {
    let document = ensure_converter_dom();

    preview::update_svg_preview(&document, "<svg><circle cx=\"10\" cy=\"10\" r=\"5\"/></svg>")
        .unwrap();

    convert::convert_to_image(OutputFormat::Png).await.unwrap();

    with_state(|state| {
        let raster = state.raster().expect("conversion should produce a raster");
        let info = raster.info();
        assert_eq!((info.width, info.height), (800, 600));
    });
}

#[wasm_bindgen_test]
async fn conversion_enables_output_buttons() {
    let document = ensure_converter_dom();

    preview::update_svg_preview(&document, "<svg width=\"10\" height=\"10\"></svg>").unwrap();
    convert::convert_to_image(OutputFormat::Png).await.unwrap();

    for id in ["btn-download", "btn-copy"] {
        let button = document
            .get_element_by_id(id)
            .unwrap()
            .dyn_into::<web_sys::HtmlButtonElement>()
            .unwrap();
        assert!(!button.disabled(), "{id} should be enabled after conversion");
    }
}
