use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use tracing_subscriber::reload;
use types::Result;

use browse_core::{
    ArchiveManager, Browser, ImageTaskPipeline, NearestNeighbourUpscaler, ThumbnailCoordinator,
    WorkerPool,
};

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Bundles the façade components a CLI session needs, the way the teacher's
/// `CoreContext`-shaped aggregates do (spec §9: "explicit construction").
pub struct CoreContext {
    pub manager: Arc<ArchiveManager>,
    pub worker_pool: Arc<WorkerPool>,
    thumbnails: ThumbnailCoordinator,
    pipeline: Arc<ImageTaskPipeline>,
    browser: Mutex<Option<Browser>>,
    reload_handle: Option<reload::Handle<tracing_subscriber::filter::LevelFilter, tracing_subscriber::Registry>>,
    log_index: Mutex<usize>,
}

impl CoreContext {
    pub fn new(
        worker_threads: usize,
        reload_handle: Option<
            reload::Handle<tracing_subscriber::filter::LevelFilter, tracing_subscriber::Registry>,
        >,
        initial_log_level: &str,
    ) -> Self {
        let log_index = LOG_LEVELS
            .iter()
            .position(|l| *l == initial_log_level)
            .unwrap_or(2);
        let manager = Arc::new(ArchiveManager::new(archive::default_registry()));
        let worker_pool = Arc::new(WorkerPool::new(worker_threads));
        let thumbnails = ThumbnailCoordinator::new(
            manager.clone(),
            Arc::new(decoder::default_registry()),
            worker_pool.clone(),
        );
        let pipeline = ImageTaskPipeline::new(
            manager.clone(),
            Arc::new(decoder::default_registry()),
            worker_pool.clone(),
            Some(Arc::new(NearestNeighbourUpscaler::default())),
        );
        Self {
            manager,
            worker_pool,
            thumbnails,
            pipeline,
            browser: Mutex::new(None),
            reload_handle,
            log_index: Mutex::new(log_index),
        }
    }

    /// Issues load (extract -> decode -> optional SR) tasks for the current
    /// page heads (§4.9): slot 0 always, slot 1 when dual mode pairs a
    /// second page alongside it.
    pub fn sync_pipeline(&self, heads: &[String]) {
        for (slot, rel_path) in heads.iter().take(2).enumerate() {
            self.pipeline.load(slot as u8, rel_path.clone(), true);
        }
    }

    /// Opens `root`, rebuilds the browser's total ordering from the
    /// resulting entry cache, and kicks off background thumbnailing for the
    /// folder containing the first image (§4.8) — any thumbnails still
    /// pending from the previous root are cancelled as part of switching.
    pub fn open(&self, root: &str, pages: u8, shift: bool, rtl: bool) -> Result<()> {
        self.manager.open(root)?;
        let images = self.manager.image_entries_sorted();

        if let Some(first) = images.first() {
            let folder = first.parent_rel_path().unwrap_or("").to_string();
            let file_list: Vec<String> = images
                .iter()
                .filter(|e| e.parent_rel_path().unwrap_or("") == folder)
                .map(|e| e.rel_path.clone())
                .collect();
            self.thumbnails.set_directory(
                &folder,
                file_list,
                Arc::new(|rel_path, image| {
                    debug!(rel_path, width = image.width, height = image.height, "thumbnail ready");
                }),
            );
        }

        let browser = Browser::new(&images, pages, shift, rtl);
        self.sync_pipeline(&browser.get_current());
        *self.browser.lock() = Some(browser);
        Ok(())
    }

    pub fn with_browser<R>(&self, f: impl FnOnce(&mut Browser) -> R) -> Option<R> {
        self.browser.lock().as_mut().map(f)
    }

    /// Cycles to the next log level (`D`), wrapping around, and applies it
    /// live if a reload handle was wired up.
    pub fn cycle_log_level(&self) -> &'static str {
        let mut index = self.log_index.lock();
        *index = (*index + 1) % LOG_LEVELS.len();
        let level = LOG_LEVELS[*index];
        if let Some(handle) = &self.reload_handle {
            if let Ok(filter) = level.parse() {
                let _ = handle.modify(|f| *f = filter);
            }
        }
        level
    }
}
