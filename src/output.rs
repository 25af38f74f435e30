use js_sys::{Array, Object, Promise, Reflect};
use log::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{ClipboardItem, Document, HtmlAnchorElement, HtmlElement, Window};

use crate::state::with_state;

/// How long the copy button shows its confirmation text.
const COPY_FEEDBACK_MS: i32 = 2000;

/// Base name of downloaded files; the extension follows the current format.
const DOWNLOAD_BASE_NAME: &str = "converted-image";

/// Triggers a browser download of the current raster. No-op when nothing has
/// been converted yet.
pub fn download_current(document: &Document) -> Result<(), JsValue> {
    let current = with_state(|state| {
        state
            .raster()
            .map(|raster| (raster.data_url().to_string(), raster.format()))
    });
    let (data_url, format) = match current {
        Some(current) => current,
        None => return Ok(()),
    };

    let link = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()?;
    link.set_download(&format!("{DOWNLOAD_BASE_NAME}.{}", format.extension()));
    link.set_href(&data_url);
    link.click();

    info!("download triggered ({format})");
    Ok(())
}

/// Writes the current raster blob to the system clipboard, tagged with its
/// media type. No-op when nothing has been converted yet.
pub async fn copy_to_clipboard(document: &Document) -> Result<(), JsValue> {
    let blob = match with_state(|state| state.raster().map(|raster| raster.blob().clone())) {
        Some(blob) => blob,
        None => return Ok(()),
    };

    let window = web_sys::window().ok_or("No window object")?;

    let record = Object::new();
    Reflect::set(
        &record,
        &JsValue::from_str(&blob.type_()),
        &Promise::resolve(&JsValue::from(blob)),
    )?;
    let item = ClipboardItem::new_with_record_from_str_to_blob_promise(&record)?;
    let items = Array::of1(&item);

    let clipboard = window.navigator().clipboard();
    match JsFuture::from(clipboard.write(&items)).await {
        Ok(_) => show_copied_feedback(document, &window),
        Err(err) => {
            web_sys::console::error_1(&err);
            window.alert_with_message(
                "Failed to copy to clipboard. Browser might not support this format.",
            )?;
            Ok(())
        }
    }
}

/// Swaps the copy button label for a confirmation and restores it after
/// [`COPY_FEEDBACK_MS`].
fn show_copied_feedback(document: &Document, window: &Window) -> Result<(), JsValue> {
    let button = document
        .get_element_by_id("btn-copy")
        .ok_or("Copy button not found")?
        .dyn_into::<HtmlElement>()?;

    let original_text = button.inner_text();
    button.set_inner_text("Copied!");

    let button_clone = button.clone();
    let closure = Closure::wrap(Box::new(move || {
        button_clone.set_inner_text(&original_text);
    }) as Box<dyn FnMut()>);

    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        COPY_FEEDBACK_MS,
    )?;
    closure.forget();

    Ok(())
}
