/*!
    Locating and loading the native FFmpeg shared libraries.

    The loader walks a root directory, matches file names against the naming
    scheme of the current platform, and loads libraries in dependency order.
    Loaded handles are kept in a registry for the lifetime of the loader.
*/

use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, c_char, c_uint};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use walkdir::WalkDir;

use ffmpeg_types::LibraryVersion;

/**
    Direct dependencies of each native library.
*/
pub const LIBRARY_DEPENDENCIES: &[(&str, &[&str])] = &[
    ("avcodec", &["avutil", "swresample"]),
    ("avdevice", &["avcodec", "avfilter", "avformat", "avutil"]),
    (
        "avfilter",
        &["avcodec", "avformat", "avutil", "postproc", "swresample", "swscale"],
    ),
    ("avformat", &["avcodec", "avutil"]),
    ("avutil", &[]),
    ("postproc", &["avutil"]),
    ("swresample", &["avutil"]),
    ("swscale", &["avutil"]),
];

const DEFAULT_MAX_DEPTH: usize = 4;

/**
    Errors that can occur when locating or loading native libraries.
*/
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("library root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("unknown library: {0}")]
    UnknownLibrary(String),

    #[error("library '{name}' not found under {root}")]
    NotFound { name: String, root: PathBuf },

    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("missing symbol '{name}': {source}")]
    Symbol {
        name: String,
        #[source]
        source: libloading::Error,
    },

    #[error("library '{0}' is not loaded")]
    NotLoaded(&'static str),
}

/**
    Returns the direct dependencies of a library, if it is a known one.
*/
pub fn dependencies(name: &str) -> Option<&'static [&'static str]> {
    LIBRARY_DEPENDENCIES
        .iter()
        .find(|(library, _)| *library == name)
        .map(|(_, deps)| *deps)
}

fn canonical_name(name: &str) -> Option<&'static str> {
    LIBRARY_DEPENDENCIES
        .iter()
        .find(|(library, _)| *library == name)
        .map(|(library, _)| *library)
}

/**
    Compute the order to load the given libraries in.

    Every dependency comes before the libraries that need it, and each
    library appears once, even when requested several times.
*/
pub fn load_order(names: &[&str]) -> Result<Vec<&'static str>, LoaderError> {
    fn visit(name: &'static str, seen: &mut HashSet<&'static str>, order: &mut Vec<&'static str>) {
        if !seen.insert(name) {
            return;
        }
        for dep in dependencies(name).unwrap_or_default().iter().copied() {
            visit(dep, seen, order);
        }
        order.push(name);
    }

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for name in names {
        let name = canonical_name(name).ok_or_else(|| LoaderError::UnknownLibrary(name.to_string()))?;
        visit(name, &mut seen, &mut order);
    }
    Ok(order)
}

/**
    Shared library naming conventions.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// `libNAME.so`, `libNAME.so.MAJOR`, `libNAME.so.MAJOR.MINOR.MICRO`
    Linux,
    /// `libNAME.dylib`, `libNAME.MAJOR.dylib`, `libNAME.MAJOR.MINOR.MICRO.dylib`
    MacOs,
    /// `NAME.dll`, `NAME-MAJOR.dll`
    Windows,
}

/**
    A file on disk that matched a library name.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryFile {
    pub path: PathBuf,
    /// Major version encoded in the file name, if any.
    pub major: Option<u32>,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_vendor = "apple") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /**
        Check whether `file_name` is a build of library `name`.

        Returns `None` when the file belongs to another library, otherwise
        the major version found in the name (`Some(None)` for unversioned
        names such as development symlinks).
    */
    pub fn match_file_name(self, name: &str, file_name: &str) -> Option<Option<u32>> {
        match self {
            Self::Linux => {
                let rest = file_name.strip_prefix("lib")?.strip_prefix(name)?;
                let rest = rest.strip_prefix(".so")?;
                if rest.is_empty() {
                    return Some(None);
                }
                parse_dotted_version(rest.strip_prefix('.')?).map(Some)
            }
            Self::MacOs => {
                let rest = file_name.strip_prefix("lib")?.strip_prefix(name)?;
                let rest = rest.strip_suffix(".dylib")?;
                if rest.is_empty() {
                    return Some(None);
                }
                parse_dotted_version(rest.strip_prefix('.')?).map(Some)
            }
            Self::Windows => {
                let lower = file_name.to_ascii_lowercase();
                let rest = lower.strip_prefix(name)?.strip_suffix(".dll")?;
                if rest.is_empty() {
                    return Some(None);
                }
                let major = rest.strip_prefix('-')?;
                if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                major.parse().ok().map(Some)
            }
        }
    }
}

/**
    Parse `MAJOR[.MINOR[.MICRO]]`, returning the major component.
*/
fn parse_dotted_version(s: &str) -> Option<u32> {
    let all_numeric = s
        .split('.')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    if !all_numeric {
        return None;
    }
    s.split('.').next()?.parse().ok()
}

/**
    A native library that has been loaded into the process.
*/
pub struct LoadedLibrary {
    name: &'static str,
    path: PathBuf,
    major: Option<u32>,
    library: libloading::Library,
}

impl LoadedLibrary {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn major(&self) -> Option<u32> {
        self.major
    }

    /**
        Resolve an exported symbol.

        # Safety

        `T` must match the actual type of the exported symbol.
    */
    pub unsafe fn symbol<T>(&self, name: &str) -> Result<libloading::Symbol<'_, T>, LoaderError> {
        unsafe {
            self.library
                .get::<T>(name.as_bytes())
                .map_err(|source| LoaderError::Symbol {
                    name: name.to_string(),
                    source,
                })
        }
    }

    /**
        Query the runtime version via the library's `NAME_version` export.
    */
    pub fn version(&self) -> Result<LibraryVersion, LoaderError> {
        let symbol = format!("{}_version", self.name);
        // SAFETY: every FFmpeg library exports `unsigned NAME_version(void)`.
        let version = unsafe {
            let func = self.symbol::<unsafe extern "C" fn() -> c_uint>(&symbol)?;
            func()
        };
        Ok(LibraryVersion::from_int(version))
    }
}

impl std::fmt::Debug for LoadedLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedLibrary")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("major", &self.major)
            .finish_non_exhaustive()
    }
}

/**
    Loads native libraries found under a root directory.

    # Example

    ```ignore
    let loader = LibraryLoader::new("/opt/ffmpeg/lib").with_version("avcodec", 61);
    let avformat = loader.load("avformat")?;
    println!("{}", loader.version_info()?);
    ```
*/
pub struct LibraryLoader {
    root: PathBuf,
    platform: Platform,
    max_depth: usize,
    pinned: HashMap<&'static str, u32>,
    loaded: Mutex<HashMap<&'static str, Arc<LoadedLibrary>>>,
}

impl LibraryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            platform: Platform::current(),
            max_depth: DEFAULT_MAX_DEPTH,
            pinned: HashMap::new(),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /**
        Only accept files carrying the given major version for a library.

        Unknown library names are ignored.
    */
    pub fn with_version(mut self, name: &str, major: u32) -> Self {
        if let Some(name) = canonical_name(name) {
            self.pinned.insert(name, major);
        }
        self
    }

    /**
        Limit how deep below the root to search.
    */
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /**
        Use the naming scheme of another platform.
    */
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /**
        Walk the root directory once and pick a file for every known library.

        When several files match, the highest major version wins, unless a
        version was pinned with [`LibraryLoader::with_version`]. Among files
        with the same major, the shortest name (the soname) is preferred.
    */
    pub fn resolve_all(&self) -> Result<HashMap<&'static str, LibraryFile>, LoaderError> {
        if !self.root.is_dir() {
            return Err(LoaderError::RootNotFound(self.root.clone()));
        }

        let mut resolved: HashMap<&'static str, LibraryFile> = HashMap::new();
        let walker = WalkDir::new(&self.root)
            .max_depth(self.max_depth)
            .follow_links(true);

        let entries = walker.into_iter().filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::trace!(error = %e, "skipping unreadable entry");
                None
            }
        });

        for entry in entries {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };

            for &(name, _) in LIBRARY_DEPENDENCIES {
                let Some(major) = self.platform.match_file_name(name, file_name) else {
                    continue;
                };
                if let Some(pinned) = self.pinned.get(name) {
                    if major != Some(*pinned) {
                        continue;
                    }
                }

                let candidate = LibraryFile {
                    path: entry.path().to_path_buf(),
                    major,
                };
                let better = match resolved.get(name) {
                    None => true,
                    Some(current) => is_better(&candidate, current),
                };
                if better {
                    tracing::trace!(library = name, path = %candidate.path.display(), "candidate");
                    resolved.insert(name, candidate);
                }
            }
        }

        Ok(resolved)
    }

    /**
        Find the file for a single library.
    */
    pub fn resolve(&self, name: &str) -> Result<LibraryFile, LoaderError> {
        let canonical =
            canonical_name(name).ok_or_else(|| LoaderError::UnknownLibrary(name.to_string()))?;
        self.resolve_all()?
            .remove(canonical)
            .ok_or_else(|| LoaderError::NotFound {
                name: name.to_string(),
                root: self.root.clone(),
            })
    }

    /**
        Load a library along with its dependencies.

        Dependencies are loaded first. A dependency that cannot be found or
        loaded is skipped with a warning, the requested library itself must
        load. Repeat calls return the cached handle.
    */
    pub fn load(&self, name: &str) -> Result<Arc<LoadedLibrary>, LoaderError> {
        let order = load_order(&[name])?;
        let Some(&target) = order.last() else {
            return Err(LoaderError::UnknownLibrary(name.to_string()));
        };

        if let Some(library) = self.loaded.lock().get(target) {
            return Ok(Arc::clone(library));
        }

        let resolved = self.resolve_all()?;
        for library in order {
            if self.loaded.lock().contains_key(library) {
                continue;
            }

            let Some(file) = resolved.get(library) else {
                if library == target {
                    return Err(LoaderError::NotFound {
                        name: name.to_string(),
                        root: self.root.clone(),
                    });
                }
                tracing::warn!(library, dependency_of = target, "dependency not found, skipping");
                continue;
            };

            match open_library(&file.path) {
                Ok(handle) => {
                    tracing::debug!(library, path = %file.path.display(), "loaded native library");
                    let loaded = LoadedLibrary {
                        name: library,
                        path: file.path.clone(),
                        major: file.major,
                        library: handle,
                    };
                    self.loaded.lock().insert(library, Arc::new(loaded));
                }
                Err(source) if library == target => {
                    return Err(LoaderError::Load {
                        path: file.path.clone(),
                        source,
                    });
                }
                Err(e) => {
                    tracing::warn!(library, error = %e, "failed to load dependency, skipping");
                }
            }
        }

        self.loaded
            .lock()
            .get(target)
            .cloned()
            .ok_or(LoaderError::NotLoaded(target))
    }

    /**
        Load several libraries, sharing dependencies between them.
    */
    pub fn load_all(&self, names: &[&str]) -> Result<Vec<Arc<LoadedLibrary>>, LoaderError> {
        names.iter().map(|name| self.load(name)).collect()
    }

    /**
        Returns a loaded library, if it has been loaded already.
    */
    pub fn get(&self, name: &str) -> Option<Arc<LoadedLibrary>> {
        self.loaded.lock().get(name).cloned()
    }

    /**
        Names of all loaded libraries, in dependency order.
    */
    pub fn loaded(&self) -> Vec<&'static str> {
        let registry = self.loaded.lock();
        let names: Vec<&str> = registry.keys().copied().collect();
        load_order(&names)
            .unwrap_or_default()
            .into_iter()
            .filter(|name| registry.contains_key(name))
            .collect()
    }

    /**
        Build string reported by the loaded avutil (`av_version_info`).
    */
    pub fn version_info(&self) -> Result<String, LoaderError> {
        let avutil = self.get("avutil").ok_or(LoaderError::NotLoaded("avutil"))?;
        // SAFETY: `av_version_info` takes no arguments and returns a static string.
        let info = unsafe {
            let func = avutil.symbol::<unsafe extern "C" fn() -> *const c_char>("av_version_info")?;
            let ptr = func();
            if ptr.is_null() {
                return Ok(String::new());
            }
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        };
        Ok(info)
    }
}

impl std::fmt::Debug for LibraryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryLoader")
            .field("root", &self.root)
            .field("platform", &self.platform)
            .field("loaded", &self.loaded())
            .finish_non_exhaustive()
    }
}

fn is_better(candidate: &LibraryFile, current: &LibraryFile) -> bool {
    match candidate.major.cmp(&current.major) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => {
            let len = |f: &LibraryFile| f.path.as_os_str().len();
            (len(candidate), &candidate.path) < (len(current), &current.path)
        }
    }
}

#[cfg(unix)]
fn open_library(path: &Path) -> Result<libloading::Library, libloading::Error> {
    use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_NOW};
    // Symbols are made global so later libraries can bind against them.
    let library = unsafe { Library::open(Some(path), RTLD_NOW | RTLD_GLOBAL)? };
    Ok(library.into())
}

#[cfg(not(unix))]
fn open_library(path: &Path) -> Result<libloading::Library, libloading::Error> {
    unsafe { libloading::Library::new(path) }
}
