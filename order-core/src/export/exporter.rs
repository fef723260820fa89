use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{
    capture::{CaptureError, CaptureOptions, Rasterizer, flatten_to_opaque_png},
    distribute::{
        DownloadError, Downloader, ExportFile, ShareError, ShareRequest, ShareTarget,
        export_file_name,
    },
    document::render_document,
};
use crate::{
    models::OrderState,
    validation::{self, IncompleteOrder},
};

/// Shown for any capture or download failure.
pub const RETRY_MESSAGE: &str = "Something went wrong while creating the order image. Please try again.";

/// Where an export invocation currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportPhase {
    #[default]
    Idle,
    Validating,
    Rendering,
    Distributing,
}

impl ExportPhase {
    pub fn is_busy(self) -> bool {
        self != Self::Idle
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Handed to the native share sheet.
    Shared,
    /// Saved directly; carries the final location.
    Downloaded(PathBuf),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,

    #[error(transparent)]
    Incomplete(#[from] IncompleteOrder),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl ExportError {
    /// Text suitable for showing to the customer.
    pub fn user_message(&self) -> String {
        match self {
            Self::Busy => "Your order image is still being prepared.".to_string(),
            Self::Incomplete(incomplete) => incomplete.to_string(),
            Self::Capture(_) | Self::Download(_) => RETRY_MESSAGE.to_string(),
        }
    }
}

/// Validate → render → distribute, one invocation at a time.
///
/// The busy flag is claimed before validation and released by a guard on
/// every exit path, so a failed or panicking export never leaves the
/// trigger disabled.
pub struct Exporter<R, S, D> {
    rasterizer: R,
    share: S,
    downloader: D,
    options: CaptureOptions,
    busy: AtomicBool,
    phase: watch::Sender<ExportPhase>,
}

impl<R, S, D> Exporter<R, S, D>
where
    R: Rasterizer,
    S: ShareTarget,
    D: Downloader,
{
    pub fn new(
        rasterizer: R,
        share: S,
        downloader: D,
    ) -> Self {
        let (phase, _) = watch::channel(ExportPhase::Idle);
        Self {
            rasterizer,
            share,
            downloader,
            options: CaptureOptions::default(),
            busy: AtomicBool::new(false),
            phase,
        }
    }

    pub fn with_options(
        mut self,
        options: CaptureOptions,
    ) -> Self {
        self.options = options.with_pixel_ratio(options.pixel_ratio);
        self
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// `true` while an export is in flight; the trigger should be disabled.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> ExportPhase {
        *self.phase.borrow()
    }

    /// Observe phase changes, e.g. to drive a progress indicator.
    pub fn subscribe(&self) -> watch::Receiver<ExportPhase> {
        self.phase.subscribe()
    }

    /// Runs one export of `state`.
    ///
    /// # Errors
    /// * [`ExportError::Busy`]: another export is in flight; nothing was done.
    /// * [`ExportError::Incomplete`]: required fields are missing; no capture attempted.
    /// * [`ExportError::Capture`]: rendering or rasterization failed.
    /// * [`ExportError::Download`]: the fallback download could not be written.
    pub async fn export(
        &self,
        state: &OrderState,
    ) -> Result<ExportOutcome, ExportError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("export requested while another is in flight");
            return Err(ExportError::Busy);
        }
        let _release = scopeguard::guard((), |()| {
            self.phase.send_replace(ExportPhase::Idle);
            self.busy.store(false, Ordering::Release);
        });

        self.phase.send_replace(ExportPhase::Validating);
        validation::require_complete(state)?;

        self.phase.send_replace(ExportPhase::Rendering);
        let png = self.capture(state).await.inspect_err(|error| {
            error!(%error, "order image capture failed");
        })?;

        self.phase.send_replace(ExportPhase::Distributing);
        let file = ExportFile::png(export_file_name(state.name()), png);
        let outcome = self
            .distribute(&file, &ShareRequest::for_order(state))
            .await?;
        info!(file = %file.file_name, ?outcome, "order image exported");
        Ok(outcome)
    }

    async fn capture(
        &self,
        state: &OrderState,
    ) -> Result<Vec<u8>, CaptureError> {
        let document = render_document(state);
        let raw = self.rasterizer.rasterize(&document, &self.options).await?;
        flatten_to_opaque_png(&raw)
    }

    async fn distribute(
        &self,
        file: &ExportFile,
        request: &ShareRequest,
    ) -> Result<ExportOutcome, ExportError> {
        if self.share.can_share(file) {
            match self.share.share(file, request).await {
                Ok(()) => return Ok(ExportOutcome::Shared),
                Err(ShareError::Cancelled) => {
                    debug!("share cancelled; downloading instead");
                }
                Err(error) => {
                    warn!(%error, "native share failed; downloading instead");
                }
            }
        }

        let path = self.downloader.download(file).inspect_err(|error| {
            error!(%error, "order image download failed");
        })?;
        Ok(ExportOutcome::Downloaded(path))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::*;
    use crate::{
        export::{OrderDocument, capture::tests::png_filled},
        models::TextField,
        validation::RequiredField,
    };

    // ── doubles ──────────────────────────────────────────────────────────

    struct FixedRasterizer {
        result: Result<Vec<u8>, CaptureError>,
        calls: Arc<Mutex<Vec<CaptureOptions>>>,
    }

    impl FixedRasterizer {
        fn ok() -> Self {
            Self {
                result: Ok(png_filled(4, 4, [0, 0, 0, 0])),
                calls: Arc::default(),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(CaptureError::Rasterize("boom".to_string())),
                calls: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl Rasterizer for FixedRasterizer {
        async fn rasterize(
            &self,
            _document: &OrderDocument,
            options: &CaptureOptions,
        ) -> Result<Vec<u8>, CaptureError> {
            self.calls.lock().unwrap().push(*options);
            self.result.clone()
        }
    }

    /// Blocks until released so tests can observe the in-flight state.
    struct GatedRasterizer {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Rasterizer for GatedRasterizer {
        async fn rasterize(
            &self,
            _document: &OrderDocument,
            _options: &CaptureOptions,
        ) -> Result<Vec<u8>, CaptureError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(png_filled(2, 2, [255, 255, 255, 255]))
        }
    }

    struct PanickingRasterizer;

    #[async_trait]
    impl Rasterizer for PanickingRasterizer {
        async fn rasterize(
            &self,
            _document: &OrderDocument,
            _options: &CaptureOptions,
        ) -> Result<Vec<u8>, CaptureError> {
            panic!("renderer crashed");
        }
    }

    struct ScriptedShare {
        supported: bool,
        result: Result<(), ShareError>,
        shared: Arc<Mutex<Vec<(String, ShareRequest)>>>,
    }

    impl ScriptedShare {
        fn new(
            supported: bool,
            result: Result<(), ShareError>,
        ) -> Self {
            Self {
                supported,
                result,
                shared: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl ShareTarget for ScriptedShare {
        fn can_share(
            &self,
            _file: &ExportFile,
        ) -> bool {
            self.supported
        }

        async fn share(
            &self,
            file: &ExportFile,
            request: &ShareRequest,
        ) -> Result<(), ShareError> {
            self.shared
                .lock()
                .unwrap()
                .push((file.file_name.clone(), request.clone()));
            self.result.clone()
        }
    }

    #[derive(Default, Clone)]
    struct RecordingDownloader {
        files: Arc<Mutex<Vec<ExportFile>>>,
        fail: bool,
    }

    impl Downloader for RecordingDownloader {
        fn download(
            &self,
            file: &ExportFile,
        ) -> Result<PathBuf, DownloadError> {
            if self.fail {
                return Err(DownloadError::NoLocation);
            }
            self.files.lock().unwrap().push(file.clone());
            Ok(PathBuf::from("/downloads").join(&file.file_name))
        }
    }

    fn complete_order() -> OrderState {
        let mut state = OrderState::default();
        state.set_text(TextField::Name, "Jane Smith");
        state.set_text(TextField::Phone, "08012345678");
        state.set_text(TextField::DeliveryDate, "2026-12-25");
        state
    }

    // ── validation gate ──────────────────────────────────────────────────

    #[tokio::test]
    async fn incomplete_order_is_rejected_before_capture() {
        let rasterizer = FixedRasterizer::ok();
        let calls = rasterizer.calls.clone();
        let exporter = Exporter::new(
            rasterizer,
            ScriptedShare::new(false, Ok(())),
            RecordingDownloader::default(),
        );
        let mut state = complete_order();
        state.set_text(TextField::Phone, "");

        let err = exporter.export(&state).await.unwrap_err();

        match &err {
            ExportError::Incomplete(incomplete) => {
                assert_eq!(incomplete.missing, vec![RequiredField::Phone])
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
        assert_eq!(
            err.user_message(),
            "Please fill in the required fields: Phone"
        );
        assert!(calls.lock().unwrap().is_empty());
        assert!(!exporter.is_busy());
        assert_eq!(exporter.phase(), ExportPhase::Idle);
    }

    // ── distribution ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn shares_natively_when_supported() {
        let share = ScriptedShare::new(true, Ok(()));
        let shared = share.shared.clone();
        let downloader = RecordingDownloader::default();
        let exporter = Exporter::new(FixedRasterizer::ok(), share, downloader.clone());

        let outcome = exporter.export(&complete_order()).await.unwrap();

        assert_eq!(outcome, ExportOutcome::Shared);
        let shared = shared.lock().unwrap();
        assert_eq!(shared[0].0, "cake-order-jane-smith.png");
        assert_eq!(shared[0].1.text, "Cake order for Jane Smith");
        assert!(downloader.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_share_falls_through_to_download() {
        let downloader = RecordingDownloader::default();
        let exporter = Exporter::new(
            FixedRasterizer::ok(),
            ScriptedShare::new(true, Err(ShareError::Cancelled)),
            downloader.clone(),
        );

        let outcome = exporter.export(&complete_order()).await.unwrap();

        assert_eq!(
            outcome,
            ExportOutcome::Downloaded(PathBuf::from("/downloads/cake-order-jane-smith.png"))
        );
        assert_eq!(downloader.files.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_share_falls_through_to_download() {
        let exporter = Exporter::new(
            FixedRasterizer::ok(),
            ScriptedShare::new(true, Err(ShareError::Failed("denied".to_string()))),
            RecordingDownloader::default(),
        );

        let outcome = exporter.export(&complete_order()).await.unwrap();

        assert!(matches!(outcome, ExportOutcome::Downloaded(_)));
    }

    #[tokio::test]
    async fn unsupported_share_is_skipped() {
        let share = ScriptedShare::new(false, Ok(()));
        let shared = share.shared.clone();
        let exporter = Exporter::new(FixedRasterizer::ok(), share, RecordingDownloader::default());

        let outcome = exporter.export(&complete_order()).await.unwrap();

        assert!(matches!(outcome, ExportOutcome::Downloaded(_)));
        assert!(shared.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn downloaded_image_is_an_opaque_png() {
        let downloader = RecordingDownloader::default();
        let exporter = Exporter::new(
            FixedRasterizer::ok(),
            ScriptedShare::new(false, Ok(())),
            downloader.clone(),
        );

        exporter.export(&complete_order()).await.unwrap();

        let files = downloader.files.lock().unwrap();
        assert_eq!(files[0].mime_type, "image/png");
        let image = image::load_from_memory(&files[0].bytes).unwrap();
        assert!(!image.color().has_alpha());
    }

    // ── failures ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn capture_failure_surfaces_retry_message_and_resets() {
        let exporter = Exporter::new(
            FixedRasterizer::failing(),
            ScriptedShare::new(true, Ok(())),
            RecordingDownloader::default(),
        );

        let err = exporter.export(&complete_order()).await.unwrap_err();

        assert!(matches!(err, ExportError::Capture(_)));
        assert_eq!(err.user_message(), RETRY_MESSAGE);
        assert!(!exporter.is_busy());
        assert_eq!(exporter.phase(), ExportPhase::Idle);
    }

    #[tokio::test]
    async fn download_failure_surfaces_retry_message_and_resets() {
        let downloader = RecordingDownloader {
            fail: true,
            ..Default::default()
        };
        let exporter = Exporter::new(
            FixedRasterizer::ok(),
            ScriptedShare::new(false, Ok(())),
            downloader,
        );

        let err = exporter.export(&complete_order()).await.unwrap_err();

        assert_eq!(err.user_message(), RETRY_MESSAGE);
        assert!(!exporter.is_busy());
    }

    // ── busy gate ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn reentrant_export_is_rejected_while_in_flight() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let exporter = Arc::new(Exporter::new(
            GatedRasterizer {
                entered: entered.clone(),
                release: release.clone(),
            },
            ScriptedShare::new(false, Ok(())),
            RecordingDownloader::default(),
        ));
        let mut phases = exporter.subscribe();

        let first = tokio::spawn({
            let exporter = exporter.clone();
            async move { exporter.export(&complete_order()).await }
        });
        entered.notified().await;

        assert!(exporter.is_busy());
        assert_eq!(*phases.borrow_and_update(), ExportPhase::Rendering);
        assert!(matches!(
            exporter.export(&complete_order()).await,
            Err(ExportError::Busy)
        ));

        release.notify_one();
        let outcome = first.await.unwrap().unwrap();

        assert!(matches!(outcome, ExportOutcome::Downloaded(_)));
        assert!(!exporter.is_busy());
        assert_eq!(exporter.phase(), ExportPhase::Idle);
    }

    #[tokio::test]
    async fn busy_flag_resets_when_rasterizer_panics() {
        let exporter = Arc::new(Exporter::new(
            PanickingRasterizer,
            ScriptedShare::new(false, Ok(())),
            RecordingDownloader::default(),
        ));

        let joined = tokio::spawn({
            let exporter = exporter.clone();
            async move { exporter.export(&complete_order()).await }
        })
        .await;

        assert!(joined.unwrap_err().is_panic());
        assert!(!exporter.is_busy());
        assert_eq!(exporter.phase(), ExportPhase::Idle);
    }

    #[tokio::test]
    async fn dropping_an_export_mid_render_releases_the_gate() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let exporter = Exporter::new(
            GatedRasterizer {
                entered: entered.clone(),
                release: release.clone(),
            },
            ScriptedShare::new(false, Ok(())),
            RecordingDownloader::default(),
        );
        let state = complete_order();

        {
            let export = exporter.export(&state);
            tokio::pin!(export);
            tokio::select! {
                _ = &mut export => panic!("export finished while the renderer was gated"),
                () = entered.notified() => {}
            }
            assert!(exporter.is_busy());
            assert_eq!(exporter.phase(), ExportPhase::Rendering);
        }

        assert!(!exporter.is_busy());
        assert_eq!(exporter.phase(), ExportPhase::Idle);

        release.notify_one();
        let outcome = exporter.export(&state).await.unwrap();
        assert!(matches!(outcome, ExportOutcome::Downloaded(_)));
    }

    #[tokio::test]
    async fn configured_pixel_ratio_is_clamped_and_forwarded() {
        let rasterizer = FixedRasterizer::ok();
        let calls = rasterizer.calls.clone();
        let exporter = Exporter::new(
            rasterizer,
            ScriptedShare::new(false, Ok(())),
            RecordingDownloader::default(),
        )
        .with_options(CaptureOptions {
            width_px: 1080,
            pixel_ratio: 1.0,
        });

        exporter.export(&complete_order()).await.unwrap();

        assert_eq!(calls.lock().unwrap()[0].pixel_ratio, 2.0);
    }
}
