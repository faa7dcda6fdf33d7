/*!
    Native library plumbing for the ffmpeg crate ecosystem.

    The other crates talk to FFmpeg through `ffmpeg-next`. This crate holds
    what sits underneath or between them:

    - [`loader`] - Locate and load the shared libraries from a directory, in dependency order
    - [`log`] - Forward the native log into `tracing`
    - [`version`] - Versions of the linked libraries
    - [`IoContext`] - Accessor view over `AVIOContext`
    - [`convert`] and [`frame`] - Type conversions and plane copies shared by decode, transform and encode
*/

pub mod convert;
pub mod frame;
pub mod loader;
pub mod log;
pub mod version;

mod io;

pub use io::IoContext;
pub use loader::{LibraryFile, LibraryLoader, LoadedLibrary, LoaderError, Platform};
pub use log::LogLevel;
pub use version::{library_versions, version_info};
