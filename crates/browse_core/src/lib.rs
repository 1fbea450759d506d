mod browser;
mod cache;
mod config;
mod image_pipeline;
mod manager;
mod sr;
mod temp_file_manager;
mod thumbnail_coordinator;
mod worker_pool;

pub use browser::Browser;
pub use cache::EntryCache;
pub use config::BrowseConfig;
pub use image_pipeline::ImageTaskPipeline;
pub use manager::ArchiveManager;
pub use sr::{NearestNeighbourUpscaler, SrTask};
pub use temp_file_manager::TempFileManager;
pub use thumbnail_coordinator::{ThumbnailCallback, ThumbnailCoordinator};
pub use worker_pool::{TaskCallbacks, TaskContext, TaskOutput, WorkerPool};

