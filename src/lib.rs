use js_sys::Promise;
use log::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, DragEvent, Element, Event, File, FileReader, HtmlButtonElement, HtmlInputElement,
    HtmlTextAreaElement, InputEvent,
};

pub mod convert;
pub mod dimensions;
pub mod output;
pub mod preview;
pub mod state;

use crate::state::{with_state, OutputFormat};

/// Media type a file must declare to be accepted as SVG input.
pub const SVG_MIME_TYPE: &str = "image/svg+xml";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).unwrap();

    let window = web_sys::window().expect("No global window exists");
    let document = window.document().expect("Should have a document on window");

    // Pages that do not carry the converter markup get nothing wired.
    if document.get_element_by_id("file-input").is_none() {
        info!("converter markup not found, skipping event wiring");
        return Ok(());
    }

    setup_input_sources(&document)?;
    setup_convert_buttons(&document)?;
    setup_output_buttons(&document)?;

    info!("svg converter ready");
    Ok(())
}

/// Summary of the most recent conversion, for the host page. `null` until a
/// conversion has succeeded.
#[wasm_bindgen]
pub fn current_raster_info() -> Result<JsValue, JsValue> {
    with_state(|state| match state.raster() {
        Some(raster) => serde_wasm_bindgen::to_value(&raster.info()).map_err(JsValue::from),
        None => Ok(JsValue::NULL),
    })
}

/// Wires the three input sources: file picker, drop zone and text entry.
/// All of them funnel into the same preview update.
fn setup_input_sources(document: &Document) -> Result<(), JsValue> {
    let file_input = document
        .get_element_by_id("file-input")
        .expect("File input not found")
        .dyn_into::<HtmlInputElement>()?;
    let drop_zone = document
        .get_element_by_id("drop-zone")
        .expect("Drop zone not found");
    let svg_input_text = document
        .get_element_by_id("svg-input-text")
        .expect("SVG text input not found")
        .dyn_into::<HtmlTextAreaElement>()?;

    // File picker selection
    {
        let closure = Closure::wrap(Box::new(move |event: Event| {
            if let Some(target) = event.target() {
                if let Ok(input) = target.dyn_into::<HtmlInputElement>() {
                    if let Some(file) = input.files().and_then(|files| files.get(0)) {
                        read_svg_file(file);
                    }
                }
            }
        }) as Box<dyn FnMut(_)>);

        file_input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // `dragover`: prevent default so the drop is allowed, highlight the zone
    {
        let drop_zone_clone = drop_zone.clone();
        let closure = Closure::wrap(Box::new(move |event: DragEvent| {
            event.prevent_default();
            let _ = drop_zone_clone.class_list().add_1("dragover");
        }) as Box<dyn FnMut(_)>);

        drop_zone.add_event_listener_with_callback("dragover", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // `dragleave`: drop the highlight
    {
        let drop_zone_clone = drop_zone.clone();
        let closure = Closure::wrap(Box::new(move |_event: DragEvent| {
            let _ = drop_zone_clone.class_list().remove_1("dragover");
        }) as Box<dyn FnMut(_)>);

        drop_zone.add_event_listener_with_callback("dragleave", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // `drop`: read the dropped file
    {
        let drop_zone_clone = drop_zone.clone();
        let closure = Closure::wrap(Box::new(move |event: DragEvent| {
            event.prevent_default();
            let _ = drop_zone_clone.class_list().remove_1("dragover");

            if let Some(data_transfer) = event.data_transfer() {
                if let Some(file) = data_transfer.files().and_then(|files| files.get(0)) {
                    read_svg_file(file);
                }
            }
        }) as Box<dyn FnMut(_)>);

        drop_zone.add_event_listener_with_callback("drop", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Direct text entry, previewed on every change
    {
        let document_clone = document.clone();
        let closure = Closure::wrap(Box::new(move |event: InputEvent| {
            if let Some(target) = event.target() {
                if let Ok(input) = target.dyn_into::<HtmlTextAreaElement>() {
                    if let Err(err) = preview::update_svg_preview(&document_clone, &input.value()) {
                        web_sys::console::error_1(&err);
                    }
                }
            }
        }) as Box<dyn FnMut(_)>);

        svg_input_text.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

fn setup_convert_buttons(document: &Document) -> Result<(), JsValue> {
    let btn_png = document
        .get_element_by_id("btn-convert-png")
        .expect("PNG convert button not found");
    let btn_jpeg = document
        .get_element_by_id("btn-convert-jpeg")
        .expect("JPEG convert button not found");

    add_click_listener(&btn_png, || spawn_conversion(OutputFormat::Png));
    add_click_listener(&btn_jpeg, || spawn_conversion(OutputFormat::Jpeg));

    Ok(())
}

fn setup_output_buttons(document: &Document) -> Result<(), JsValue> {
    let btn_download = document
        .get_element_by_id("btn-download")
        .expect("Download button not found")
        .dyn_into::<HtmlButtonElement>()?;
    let btn_copy = document
        .get_element_by_id("btn-copy")
        .expect("Copy button not found")
        .dyn_into::<HtmlButtonElement>()?;

    // Both stay dead until the first conversion succeeds
    btn_download.set_disabled(true);
    btn_copy.set_disabled(true);

    {
        let document_clone = document.clone();
        add_click_listener(&btn_download, move || {
            if let Err(err) = output::download_current(&document_clone) {
                web_sys::console::error_1(&err);
            }
        });
    }

    {
        let document_clone = document.clone();
        add_click_listener(&btn_copy, move || {
            let document_clone = document_clone.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = output::copy_to_clipboard(&document_clone).await {
                    web_sys::console::error_1(&err);
                }
            });
        });
    }

    Ok(())
}

/// Accepts a file only if it declares the SVG media type; everything else is
/// ignored without an error. The asynchronous read reschedules the preview
/// update for when the content is available.
fn read_svg_file(file: File) {
    if file.type_() != SVG_MIME_TYPE {
        info!("ignoring non-svg file {}", file.name());
        return;
    }

    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = load_svg_file(file).await {
            web_sys::console::error_1(&err);
        }
    });
}

/// Reads `file` as text and pushes it through the preview update.
async fn load_svg_file(file: File) -> Result<(), JsValue> {
    let reader = FileReader::new()?;

    let promise = Promise::new(&mut |resolve, _| {
        let onload = Closure::wrap(Box::new(move |_event: Event| {
            let _ = resolve.call0(&JsValue::NULL);
        }) as Box<dyn FnMut(_)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();
    });

    reader.read_as_text(&file)?;
    JsFuture::from(promise).await?;

    let svg_text = reader
        .result()?
        .as_string()
        .ok_or("File did not decode as text")?;

    let document = web_sys::window()
        .ok_or("No window object")?
        .document()
        .ok_or("No document on window")?;
    preview::update_svg_preview(&document, &svg_text)
}

fn spawn_conversion(format: OutputFormat) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = convert::convert_to_image(format).await {
            web_sys::console::error_1(&err);
        }
    });
}

fn add_click_listener(element: &Element, callback: impl Fn() + 'static) {
    let closure = Closure::wrap(Box::new(move |_event: Event| {
        callback();
    }) as Box<dyn FnMut(_)>);

    element
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .expect("Failed to add click listener");
    closure.forget();
}
