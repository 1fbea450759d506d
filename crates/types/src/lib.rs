mod entry;
mod error;
mod image;
mod task;

pub use self::entry::{EntryInfo, EntryType};
pub use self::error::{ErrorKind, Result};
pub use self::image::DecodedImage;
pub use self::task::{TaskId, TaskState};
