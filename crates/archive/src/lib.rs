mod directory;
mod encoding;
mod handler;
mod registry;
mod tar_handler;
mod unsupported;
mod zip_handler;

pub use self::directory::DirectoryHandler;
pub use self::encoding::decode_entry_name;
pub use self::handler::ArchiveHandler;
pub use self::registry::HandlerRegistry;
pub use self::tar_handler::TarHandler;
pub use self::unsupported::UnsupportedHandler;
pub use self::zip_handler::ZipHandler;

use std::sync::Arc;

/// The registry the application ships with: directory walking plus every
/// container format named in spec §6, in the order a path is most likely to
/// match (cheap directory check first, then each archive format).
pub fn default_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(DirectoryHandler::new()));
    registry.register(Arc::new(ZipHandler::new()));
    registry.register(Arc::new(TarHandler::new()));
    registry.register(Arc::new(UnsupportedHandler::rar()));
    registry.register(Arc::new(UnsupportedHandler::sevenzip()));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn zip_handler_claims_zip_and_cbz() {
        let handler = ZipHandler::new();
        assert!(handler.can_handle("foo.zip"));
        assert!(handler.can_handle("foo.CBZ"));
        assert!(!handler.can_handle("foo.rar"));
    }

    #[test]
    fn registry_dispatches_by_extension() {
        let registry = default_registry();
        let dir = tempfile::tempdir().unwrap();
        let handler = registry.get_handler(dir.path().to_str().unwrap());
        assert_eq!(handler.unwrap().name(), "directory");

        let zip_path = dir.path().join("a.zip");
        std::fs::File::create(&zip_path).unwrap();
        let handler = registry.get_handler(zip_path.to_str().unwrap());
        assert_eq!(handler.unwrap().name(), "zip");
    }

    #[test]
    fn nested_zip_roundtrip() {
        let dir = tempfile::tempdir().unwrap();

        let inner_path = dir.path().join("inner.zip");
        {
            let file = std::fs::File::create(&inner_path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            zip.start_file("pics/cat.png", zip::write::FileOptions::default())
                .unwrap();
            let mut payload = vec![0x89, 0x50, 0x4E, 0x47];
            payload.extend(std::iter::repeat_n(b'x', 96));
            zip.write_all(&payload).unwrap();
            zip.finish().unwrap();
        }

        let handler = ZipHandler::new();
        let entries = handler
            .list_all_entries(inner_path.to_str().unwrap())
            .unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.rel_path.as_str()).collect();
        assert!(names.contains(&"pics/cat.png"));

        let bytes = handler
            .read_file(inner_path.to_str().unwrap(), "pics/cat.png")
            .unwrap();
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }
}
