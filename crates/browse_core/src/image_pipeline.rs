//! Image task pipeline (spec component C9): load -> decode -> optional SR,
//! with per-slot SR supersession (§4.9, invariant 5, scenario 5).

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use types::{DecodedImage, ErrorKind};
use uuid::Uuid;

use crate::manager::ArchiveManager;
use crate::sr::SrTask;
use crate::worker_pool::{TaskCallbacks, TaskOutput, WorkerPool};
use decoder::DecoderRegistry;

#[derive(Default)]
struct ImageSlot {
    rel_path: Option<String>,
    pixel_buffer: Option<DecodedImage>,
    sr_request_id: Option<Uuid>,
    display_dirty: bool,
    error: Option<ErrorKind>,
}

impl ImageSlot {
    fn set_image(&mut self, rel_path: String, image: DecodedImage) {
        self.rel_path = Some(rel_path);
        self.pixel_buffer = Some(image);
        self.error = None;
        self.display_dirty = true;
    }

    fn set_error(&mut self, err: ErrorKind) {
        self.pixel_buffer = None;
        self.error = Some(err);
        self.display_dirty = true;
    }

    /// Applies an SR result iff this slot's current request id matches and
    /// it isn't already showing a read/decode error (§7: "`set_sr_array` on
    /// a slot whose `error.is_some()` is rejected").
    fn apply_sr(&mut self, request_id: Uuid, image: DecodedImage) -> bool {
        if self.error.is_some() || self.sr_request_id != Some(request_id) {
            return false;
        }
        self.pixel_buffer = Some(image);
        self.display_dirty = true;
        true
    }
}

/// Owns both display slots and chains load -> decode -> (optional SR) tasks
/// through the worker pool, per §4.9 / §5.
pub struct ImageTaskPipeline {
    archive_manager: Arc<ArchiveManager>,
    decoders: Arc<DecoderRegistry>,
    sr: Option<Arc<dyn SrTask>>,
    worker_pool: Arc<WorkerPool>,
    slots: [Mutex<ImageSlot>; 2],
}

impl ImageTaskPipeline {
    pub fn new(
        archive_manager: Arc<ArchiveManager>,
        decoders: Arc<DecoderRegistry>,
        worker_pool: Arc<WorkerPool>,
        sr: Option<Arc<dyn SrTask>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            archive_manager,
            decoders,
            sr,
            worker_pool,
            slots: [Mutex::new(ImageSlot::default()), Mutex::new(ImageSlot::default())],
        })
    }

    pub fn rel_path_of(&self, slot_index: u8) -> Option<String> {
        self.slots[slot_index as usize].lock().rel_path.clone()
    }

    pub fn pixel_buffer_of(&self, slot_index: u8) -> Option<DecodedImage> {
        self.slots[slot_index as usize].lock().pixel_buffer.clone()
    }

    pub fn error_of(&self, slot_index: u8) -> Option<String> {
        self.slots[slot_index as usize]
            .lock()
            .error
            .as_ref()
            .map(|e| e.to_string())
    }

    /// Consumes and clears the slot's dirty flag.
    pub fn take_dirty(&self, slot_index: u8) -> bool {
        std::mem::take(&mut self.slots[slot_index as usize].lock().display_dirty)
    }

    pub fn sr_request_id_of(&self, slot_index: u8) -> Option<Uuid> {
        self.slots[slot_index as usize].lock().sr_request_id
    }

    /// Begins loading `rel_path` into `slot_index`: clears the slot's
    /// pending SR request, then chains extract -> decode -> (optional SR).
    pub fn load(self: &Arc<Self>, slot_index: u8, rel_path: String, request_sr: bool) {
        self.slots[slot_index as usize].lock().sr_request_id = None;

        let archive_manager = self.archive_manager.clone();
        let rel_path_for_extract = rel_path.clone();
        let pipeline_ok = self.clone();
        let pipeline_err = self.clone();

        self.worker_pool.submit(
            move |ctx| {
                if ctx.is_cancelled() {
                    return Err(ErrorKind::Cancelled);
                }
                archive_manager
                    .extract_item(&rel_path_for_extract)
                    .map(TaskOutput::Bytes)
            },
            TaskCallbacks {
                on_result: Some(Box::new(move |out| {
                    if let TaskOutput::Bytes(bytes) = out {
                        pipeline_ok.decode(slot_index, rel_path, bytes, request_sr);
                    }
                })),
                on_error: Some(Box::new(move |err| {
                    pipeline_err.slots[slot_index as usize].lock().set_error(err);
                })),
                ..Default::default()
            },
        );
    }

    fn decode(self: &Arc<Self>, slot_index: u8, rel_path: String, bytes: Bytes, request_sr: bool) {
        let decoders = self.decoders.clone();
        let extension = std::path::Path::new(&rel_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        let pipeline_ok = self.clone();
        let pipeline_err = self.clone();
        let rel_path_for_slot = rel_path.clone();

        self.worker_pool.submit(
            move |ctx| {
                if ctx.is_cancelled() {
                    return Err(ErrorKind::Cancelled);
                }
                decoders.decode(&extension, &bytes).map(TaskOutput::Image)
            },
            TaskCallbacks {
                on_result: Some(Box::new(move |out| {
                    if let TaskOutput::Image(image) = out {
                        pipeline_ok.slots[slot_index as usize]
                            .lock()
                            .set_image(rel_path_for_slot.clone(), image.clone());
                        if request_sr {
                            pipeline_ok.submit_sr(slot_index, image);
                        }
                    }
                })),
                on_error: Some(Box::new(move |err| {
                    pipeline_err.slots[slot_index as usize].lock().set_error(err);
                })),
                ..Default::default()
            },
        );
    }

    fn submit_sr(self: &Arc<Self>, slot_index: u8, image: DecodedImage) {
        let Some(sr) = self.sr.clone() else {
            return;
        };
        let request_id = Uuid::new_v4();
        self.slots[slot_index as usize].lock().sr_request_id = Some(request_id);

        let pipeline = self.clone();
        self.worker_pool.submit(
            move |ctx| {
                if ctx.is_cancelled() {
                    return Err(ErrorKind::Cancelled);
                }
                Ok(TaskOutput::Image(sr.enhance(&image)))
            },
            TaskCallbacks {
                on_result: Some(Box::new(move |out| {
                    if let TaskOutput::Image(enhanced) = out {
                        pipeline.apply_sr_result(request_id, enhanced);
                    }
                })),
                ..Default::default()
            },
        );
    }

    /// Compares `request_id` against both slots (§4.9): applies to whichever
    /// slot currently holds it, discards otherwise.
    fn apply_sr_result(&self, request_id: Uuid, image: DecodedImage) {
        for slot in &self.slots {
            if slot.lock().apply_sr(request_id, image.clone()) {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(w, h, image::Rgb([9, 9, 9]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    struct SlowSr;
    impl SrTask for SlowSr {
        fn enhance(&self, image: &DecodedImage) -> DecodedImage {
            std::thread::sleep(Duration::from_millis(150));
            image.clone()
        }
    }

    #[tokio::test]
    async fn stale_sr_result_is_discarded_after_reload_supersedes_it() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.png"), png_bytes(2, 2)).unwrap();
        std::fs::write(dir.path().join("y.png"), png_bytes(3, 3)).unwrap();

        let manager = Arc::new(ArchiveManager::new(archive::default_registry()));
        manager.open(dir.path().to_str().unwrap()).unwrap();

        let pipeline = ImageTaskPipeline::new(
            manager,
            Arc::new(decoder::default_registry()),
            Arc::new(WorkerPool::new(4)),
            Some(Arc::new(SlowSr)),
        );

        pipeline.load(0, "x.png".to_string(), true);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let r1 = pipeline.sr_request_id_of(0);
        assert!(r1.is_some());

        // Reload slot 0 before R1's SR completes; this issues R2 and clears
        // the slot's pending id, so R1 cannot match when it lands.
        pipeline.load(0, "y.png".to_string(), true);
        tokio::time::sleep(Duration::from_millis(300)).await;

        let r2 = pipeline.sr_request_id_of(0);
        assert!(r2.is_some());
        assert_ne!(r1, r2);
        // Final pixel buffer reflects y.png's dimensions (3x3), not a stale
        // R1 result sized for x.png (2x2).
        let buf = pipeline.pixel_buffer_of(0).unwrap();
        assert_eq!((buf.width, buf.height), (3, 3));
    }
}
