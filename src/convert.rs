use js_sys::{Array, Promise};
use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, CanvasRenderingContext2d, Document, Event, HtmlButtonElement,
    HtmlCanvasElement, HtmlImageElement, Url, XmlSerializer,
};

use crate::dimensions::{resolve_raster_size, RasterSize};
use crate::state::{with_state, OutputFormat, RasterResult};

/// Converts the currently previewed SVG element into a bitmap of `format`.
///
/// The live root element is serialized back to markup (so injected sizing
/// attributes survive), decoded through an image element and drawn onto an
/// off-screen canvas. The data URL and the blob both come out of that single
/// draw pass. A conversion started while another one is still decoding
/// supersedes it; the stale completion is discarded.
pub async fn convert_to_image(format: OutputFormat) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document on window")?;

    if with_state(|state| state.svg_text().is_none()) {
        window.alert_with_message("Please upload or paste an SVG first.")?;
        return Ok(());
    }

    let container = document
        .get_element_by_id("svg-preview-container")
        .ok_or("Preview container not found")?;
    let svg_element = match container.query_selector("svg")? {
        Some(element) => element,
        None => return Ok(()),
    };

    let seq = with_state(|state| state.begin_conversion());

    let size = resolve_raster_size(
        svg_element.get_attribute("width").as_deref(),
        svg_element.get_attribute("height").as_deref(),
        svg_element.get_attribute("viewBox").as_deref(),
    );

    let serializer = XmlSerializer::new()?;
    let svg_string = serializer.serialize_to_string(&svg_element)?;

    let parts = Array::of1(&JsValue::from_str(&svg_string));
    let options = BlobPropertyBag::new();
    options.set_type("image/svg+xml;charset=utf-8");
    let svg_blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&svg_blob)?;

    let image = HtmlImageElement::new()?;
    let decoded = await_image_decode(&image, &url).await;
    Url::revoke_object_url(&url)?;

    if let Err(err) = decoded {
        web_sys::console::error_1(&format!("Error loading SVG image: {err:?}").into());
        window.alert_with_message("Error converting SVG. Please check the console for details.")?;
        return Ok(());
    }

    let (data_url, blob) = draw_to_raster(&document, &image, size, format).await?;

    let raster = RasterResult::new(format, size.width, size.height, data_url.clone(), blob);
    if !with_state(|state| state.commit_raster(seq, raster)) {
        warn!("discarding output of superseded conversion #{seq}");
        return Ok(());
    }

    show_result_image(&document, &data_url)?;
    enable_output_buttons(&document)?;
    info!("converted svg to {}x{} {}", size.width, size.height, format);

    Ok(())
}

/// Draws the decoded image onto an off-screen canvas sized to `size` and
/// returns the data URL plus the binary blob of the same pixels.
async fn draw_to_raster(
    document: &Document,
    image: &HtmlImageElement,
    size: RasterSize,
    format: OutputFormat,
) -> Result<(String, Blob), JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(size.width);
    canvas.set_height(size.height);

    let context = canvas
        .get_context("2d")?
        .ok_or("Failed to get 2D context")?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let width = size.width as f64;
    let height = size.height as f64;

    if format.keeps_alpha() {
        context.clear_rect(0.0, 0.0, width, height);
    } else {
        context.set_fill_style(&JsValue::from_str("#FFFFFF"));
        context.fill_rect(0.0, 0.0, width, height);
    }

    context.draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, width, height)?;

    let data_url = canvas.to_data_url_with_type(format.mime_type())?;
    let blob = canvas_to_blob(&canvas, format.mime_type()).await?;

    Ok((data_url, blob))
}

/// Waits for `image` to finish decoding `url`. Resolves on `load`, rejects
/// on `error`.
async fn await_image_decode(image: &HtmlImageElement, url: &str) -> Result<(), JsValue> {
    let promise = Promise::new(&mut |resolve, reject| {
        let onload = Closure::wrap(Box::new(move |_event: Event| {
            let _ = resolve.call0(&JsValue::NULL);
        }) as Box<dyn FnMut(_)>);
        let onerror = Closure::wrap(Box::new(move |event: Event| {
            let _ = reject.call1(&JsValue::NULL, &event);
        }) as Box<dyn FnMut(_)>);

        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onload.forget();
        onerror.forget();
    });

    image.set_src(url);
    JsFuture::from(promise).await?;
    Ok(())
}

/// Awaitable wrapper around `canvas.toBlob`.
async fn canvas_to_blob(canvas: &HtmlCanvasElement, mime_type: &str) -> Result<Blob, JsValue> {
    let promise = Promise::new(&mut |resolve, reject| {
        let reject_on_null = reject.clone();
        let callback = Closure::wrap(Box::new(move |blob: JsValue| {
            if blob.is_null() || blob.is_undefined() {
                let _ = reject_on_null
                    .call1(&JsValue::NULL, &JsValue::from_str("Canvas produced no blob"));
            } else {
                let _ = resolve.call1(&JsValue::NULL, &blob);
            }
        }) as Box<dyn FnMut(JsValue)>);

        if let Err(err) = canvas.to_blob_with_type(callback.as_ref().unchecked_ref(), mime_type) {
            let _ = reject.call1(&JsValue::NULL, &err);
        }
        callback.forget();
    });

    JsFuture::from(promise).await?.dyn_into::<Blob>()
}

fn show_result_image(document: &Document, data_url: &str) -> Result<(), JsValue> {
    let container = document
        .get_element_by_id("image-output-container")
        .ok_or("Image output container not found")?;
    container.set_inner_html("");

    let image = document
        .create_element("img")?
        .dyn_into::<HtmlImageElement>()?;
    image.set_src(data_url);
    image.set_alt("Converted Image");
    container.append_child(&image)?;

    Ok(())
}

fn enable_output_buttons(document: &Document) -> Result<(), JsValue> {
    for id in ["btn-download", "btn-copy"] {
        let button = document
            .get_element_by_id(id)
            .ok_or("Output button not found")?
            .dyn_into::<HtmlButtonElement>()?;
        button.set_disabled(false);
    }
    Ok(())
}
