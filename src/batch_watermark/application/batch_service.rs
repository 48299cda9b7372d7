use std::path::{Path, PathBuf};
use std::sync::Arc;
use super::error::ApplicationError;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

use crate::domain::batch::{BatchRequest, BatchResult, BatchSummary, ProgressEvent};
use crate::domain::image::OutputFormat;
use crate::domain::image_processor_trait::{ImageProcessor, RenderSettings};
use crate::domain::overlay_asset::{AssetPaths, OverlaySet};
use crate::infrastructure::asset_store::AssetStore;
use crate::infrastructure::file_storage::LocalFileStorage;

pub struct BatchService {
    image_processor: Arc<dyn ImageProcessor + Send + Sync>,
    asset_store: Arc<AssetStore>,
    file_storage: LocalFileStorage,
}

impl BatchService {
    pub fn new(image_processor: Arc<dyn ImageProcessor + Send + Sync>) -> Self {
        Self {
            image_processor,
            asset_store: Arc::new(AssetStore::new()),
            file_storage: LocalFileStorage::new(),
        }
    }

    async fn load_overlays(&self, assets: AssetPaths, opacity: f32) -> Result<OverlaySet, ApplicationError> {
        let asset_store = self.asset_store.clone();
        tokio::task::spawn_blocking(move || asset_store.load_overlays(&assets, opacity))
            .await
            .map_err(|e| ApplicationError::BatchFailed(format!("asset loading task failed: {}", e)))
    }

    /// Decodes, composites and re-encodes one image off the async runtime.
    async fn render(
        &self,
        image_data: Vec<u8>,
        overlays: Arc<OverlaySet>,
        settings: Arc<RenderSettings>,
        format: OutputFormat,
    ) -> Result<Vec<u8>, ApplicationError> {
        let processor = self.image_processor.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            let raw = processor.decode(&image_data)?;
            let composited = processor.composite(raw, &overlays, &settings)?;
            processor.encode(&composited, format)
        })
        .await
        .map_err(|e| ApplicationError::BatchFailed(format!("render task failed: {}", e)))??;
        Ok(rendered)
    }

    async fn process_file(
        &self,
        path: &Path,
        overlays: Arc<OverlaySet>,
        settings: Arc<RenderSettings>,
        request: &BatchRequest,
    ) -> Result<PathBuf, ApplicationError> {
        let format = OutputFormat::for_input(path);
        let output_path = format.output_path(path, &request.output_dir).ok_or_else(|| {
            ApplicationError::InvalidRequest(format!("{:?} has no file name", path))
        })?;

        let image_data = self.file_storage.read_image_impl(path).await?;
        let rendered = self.render(image_data, overlays, settings, format).await?;
        self.file_storage.save_image_impl(&output_path, &rendered).await?;
        // Only archive once the output is safely on disk.
        self.file_storage.archive_impl(path, &request.archive_dir).await?;
        Ok(output_path)
    }

    /// Runs a whole batch. Per-file failures are recorded and skipped; only
    /// failing to prepare the output directories aborts the run.
    pub async fn run_batch(
        &self,
        request: BatchRequest,
        progress: Option<UnboundedSender<ProgressEvent>>,
    ) -> Result<BatchSummary, ApplicationError> {
        let emit = |event: ProgressEvent| {
            if let Some(tx) = &progress {
                // The receiver may have gone away; the batch carries on regardless.
                let _ = tx.send(event);
            }
        };

        let total = request.inputs.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };
        emit(ProgressEvent::Started { total });

        if total == 0 {
            warn!("No supported images to process");
            emit(ProgressEvent::Finished { processed: 0, failed: 0 });
            return Ok(summary);
        }

        self.file_storage
            .ensure_dirs(&[request.output_dir.as_path(), request.archive_dir.as_path()])
            .await?;

        info!("Starting batch processing of {} images", total);
        let overlays = Arc::new(self.load_overlays(request.assets.clone(), request.opacity).await?);
        if overlays.is_empty() && request.text.is_none() {
            warn!("No overlay assets and no text configured, outputs will match the inputs");
        }
        let settings = Arc::new(RenderSettings {
            layout: request.layout,
            text: request.text.clone(),
        });

        for (index, path) in request.inputs.iter().enumerate() {
            let result = match self
                .process_file(path, overlays.clone(), settings.clone(), &request)
                .await
            {
                Ok(output) => {
                    info!("Processed {:?} -> {:?} ({}/{})", path, output, index + 1, total);
                    BatchResult::success(path.clone(), output)
                }
                Err(e) => {
                    error!("Failed {:?}: {}", path, e);
                    BatchResult::failure(path.clone(), e.to_string())
                }
            };
            emit(ProgressEvent::FileFinished {
                index,
                total,
                result: result.clone(),
            });
            summary.record(result);
        }

        if summary.failed == 0 {
            info!("Batch completed: {} images processed", summary.processed);
        } else {
            warn!(
                "Batch completed with {} errors: {}/{} succeeded",
                summary.failed, summary.processed, total
            );
        }
        emit(ProgressEvent::Finished {
            processed: summary.processed,
            failed: summary.failed,
        });
        Ok(summary)
    }

    /// Composites a single uploaded image without touching any directory.
    pub async fn preview(
        &self,
        image_data: Vec<u8>,
        assets: AssetPaths,
        opacity: f32,
        settings: RenderSettings,
    ) -> Result<(Vec<u8>, &'static str), ApplicationError> {
        let overlays = Arc::new(self.load_overlays(assets, opacity).await?);
        let format = OutputFormat::Png;
        let rendered = self
            .render(image_data, overlays, Arc::new(settings), format)
            .await?;
        Ok((rendered, format.content_type()))
    }

    pub async fn setup_directories(&self, dirs: &[&Path]) -> Result<Vec<PathBuf>, ApplicationError> {
        let created = self.file_storage.ensure_dirs(dirs).await?;
        for dir in &created {
            info!("Created directory {:?}", dir);
        }
        Ok(created)
    }

    pub async fn discover_inputs(&self, raw_dir: &Path) -> Result<Vec<PathBuf>, ApplicationError> {
        Ok(self.file_storage.list_images(raw_dir).await?)
    }
}
