//! Thumbnail coordinator (spec component C8).
//!
//! Two phases: a single sequential extraction task (archive readers are
//! mostly not reentrancy-safe), then one parallel decode task per extracted
//! item. Every decode task captures the directory it was submitted for; if
//! the coordinator has since switched directories by the time the decode
//! completes, the result is dropped. This is the "coherence with current
//! directory" rule from scenario 4.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use types::{DecodedImage, TaskId};

use crate::manager::ArchiveManager;
use crate::worker_pool::{TaskCallbacks, TaskOutput, WorkerPool};
use decoder::DecoderRegistry;

pub type ThumbnailCallback = Arc<dyn Fn(String, DecodedImage) + Send + Sync>;

pub struct ThumbnailCoordinator {
    archive_manager: Arc<ArchiveManager>,
    decoders: Arc<DecoderRegistry>,
    worker_pool: Arc<WorkerPool>,
    current_directory: Arc<Mutex<String>>,
    extraction_task: Mutex<Option<TaskId>>,
    decode_tasks: Arc<Mutex<Vec<TaskId>>>,
}

impl ThumbnailCoordinator {
    pub fn new(
        archive_manager: Arc<ArchiveManager>,
        decoders: Arc<DecoderRegistry>,
        worker_pool: Arc<WorkerPool>,
    ) -> Self {
        Self {
            archive_manager,
            decoders,
            worker_pool,
            current_directory: Arc::new(Mutex::new(String::new())),
            extraction_task: Mutex::new(None),
            decode_tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn current_directory(&self) -> String {
        self.current_directory.lock().clone()
    }

    /// Switches the coordinator to `directory`, cancelling any in-flight
    /// extraction/decode tasks from the previous directory, then begins
    /// thumbnailing `file_list` (rel_paths) in order.
    pub fn set_directory(
        &self,
        directory: &str,
        file_list: Vec<String>,
        on_thumbnail_ready: ThumbnailCallback,
    ) {
        if let Some(id) = self.extraction_task.lock().take() {
            self.worker_pool.cancel(id);
        }
        for id in self.decode_tasks.lock().drain(..) {
            self.worker_pool.cancel(id);
        }

        *self.current_directory.lock() = directory.to_string();

        let archive_manager = self.archive_manager.clone();
        let decoders = self.decoders.clone();
        let worker_pool = self.worker_pool.clone();
        let current_directory = self.current_directory.clone();
        let decode_tasks = self.decode_tasks.clone();
        let captured_dir = directory.to_string();

        let id = self.worker_pool.submit(
            move |ctx| {
                for rel_path in file_list {
                    if ctx.is_cancelled() {
                        break;
                    }
                    let bytes = match archive_manager.extract_item(&rel_path) {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            debug!(rel_path = %rel_path, error = %err, "thumbnail extraction failed");
                            continue;
                        }
                    };

                    let extension = std::path::Path::new(&rel_path)
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("")
                        .to_string();

                    let decoders = decoders.clone();
                    let on_ready = on_thumbnail_ready.clone();
                    let current_directory = current_directory.clone();
                    let captured_dir = captured_dir.clone();
                    let rel_path_for_decode = rel_path.clone();
                    let decode_tasks_for_bookkeeping = decode_tasks.clone();

                    let decode_id = worker_pool.submit(
                        move |_ctx| {
                            decoders
                                .decode(&extension, &bytes)
                                .map(TaskOutput::Image)
                        },
                        TaskCallbacks {
                            on_result: Some(Box::new(move |out| {
                                if *current_directory.lock() != captured_dir {
                                    return;
                                }
                                if let TaskOutput::Image(img) = out {
                                    on_ready(rel_path_for_decode, img);
                                }
                            })),
                            ..Default::default()
                        },
                    );
                    decode_tasks_for_bookkeeping.lock().push(decode_id);
                }
                Ok(TaskOutput::Bytes(bytes::Bytes::new()))
            },
            TaskCallbacks::default(),
        );
        *self.extraction_task.lock() = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn switching_directory_drops_stale_thumbnail_results() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["1.png", "2.png"] {
            std::fs::write(dir.path().join(name), png_bytes()).unwrap();
        }
        let manager = Arc::new(ArchiveManager::new(archive::default_registry()));
        manager.open(dir.path().to_str().unwrap()).unwrap();

        let coordinator = ThumbnailCoordinator::new(
            manager,
            Arc::new(decoder::default_registry()),
            Arc::new(WorkerPool::new(2)),
        );

        let delivered = Arc::new(AtomicUsize::new(0));
        let delivered2 = delivered.clone();
        coordinator.set_directory(
            "A",
            vec!["1.png".to_string(), "2.png".to_string()],
            Arc::new(move |_name, _img| {
                delivered2.fetch_add(1, Ordering::SeqCst);
            }),
        );
        // Switch directories immediately; "A"'s callbacks must not fire
        // (since they race, we assert within a wait window below).
        coordinator.set_directory("B", vec![], Arc::new(|_, _| {}));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
    }
}
