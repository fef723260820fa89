pub mod capture;
pub mod distribute;
pub mod document;
pub mod exporter;

pub use capture::{CaptureError, CaptureOptions, Rasterizer, flatten_to_opaque_png};
pub use distribute::{
    DownloadError, Downloader, ExportFile, NoNativeShare, PNG_MIME_TYPE, ShareError, ShareRequest,
    ShareTarget, export_file_name, file_slug,
};
pub use document::{
    CANONICAL_WIDTH_PX, FORM_ROOT_ID, OrderDocument, READY_MARKER_ID, render_document,
};
pub use exporter::{ExportError, ExportOutcome, ExportPhase, Exporter, RETRY_MESSAGE};
