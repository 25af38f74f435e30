use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use web_sys::Blob;

/// Target format of a conversion.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }

    /// JPEG has no alpha channel, the canvas gets an opaque backdrop instead.
    pub fn keeps_alpha(&self) -> bool {
        matches!(self, OutputFormat::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// The bitmap produced by one rasterization pass.
///
/// The data URL and the blob come from the same canvas draw, so both always
/// describe the same pixels and format.
pub struct RasterResult {
    format: OutputFormat,
    width: u32,
    height: u32,
    data_url: String,
    blob: Blob,
}

impl RasterResult {
    pub fn new(format: OutputFormat, width: u32, height: u32, data_url: String, blob: Blob) -> Self {
        RasterResult { format, width, height, data_url, blob }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    pub fn info(&self) -> RasterInfo {
        RasterInfo {
            format: self.format.extension().to_string(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Conversion summary handed to the host page.
#[derive(Serialize)]
pub struct RasterInfo {
    pub format: String,
    pub width: u32,
    pub height: u32,
}

/// Session state shared by all event handlers.
pub struct ConverterState {
    svg_text: Option<String>,
    raster: Option<RasterResult>,
    conversion_seq: u64,
}

impl ConverterState {
    pub fn new() -> Self {
        ConverterState { svg_text: None, raster: None, conversion_seq: 0 }
    }

    pub fn svg_text(&self) -> Option<&str> {
        self.svg_text.as_deref()
    }

    pub fn set_svg_text(&mut self, value: &str) {
        self.svg_text = Some(value.to_string());
    }

    pub fn raster(&self) -> Option<&RasterResult> {
        self.raster.as_ref()
    }

    /// Starts a new conversion and returns its sequence number. Starting a
    /// conversion supersedes every conversion started before it.
    pub fn begin_conversion(&mut self) -> u64 {
        self.conversion_seq += 1;
        self.conversion_seq
    }

    pub fn is_current_conversion(&self, seq: u64) -> bool {
        self.conversion_seq == seq
    }

    /// Stores the result of conversion `seq`. Returns false and drops the
    /// result if a newer conversion has been started in the meantime.
    pub fn commit_raster(&mut self, seq: u64, raster: RasterResult) -> bool {
        if !self.is_current_conversion(seq) {
            return false;
        }
        self.raster = Some(raster);
        true
    }
}

impl Default for ConverterState {
    fn default() -> Self {
        ConverterState::new()
    }
}

thread_local! {
    static STATE: Rc<RefCell<ConverterState>> = Rc::new(RefCell::new(ConverterState::new()));
}

/// Runs `f` against the shared session state.
pub fn with_state<R>(f: impl FnOnce(&mut ConverterState) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}
