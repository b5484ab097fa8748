//! File store abstraction for the file-scoped operations.
//!
//! The parsing and rewriting logic never touches `std::fs` directly. It talks
//! to a [`FileStore`], which keeps the core independent of where files live
//! and lets tests run against an in-memory store with deterministic
//! timestamps.
//!
//! Lines handed out by a store keep their terminator (`\n` or `\r\n`), so a
//! line that is copied through unchanged is reproduced byte for byte.
//!
//! Text is expected to be UTF-8. Lookups read through
//! [`FileStore::open_lossy`], which replaces invalid sequences with U+FFFD
//! so a file in a legacy encoding still loads. Rewriting reads through the
//! strict [`FileStore::open_for_read`] and refuses such a file rather than
//! change bytes it cannot represent.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

/// A lazily read sequence of lines.
pub type LineIter = Box<dyn Iterator<Item = io::Result<String>>>;

/// Storage capability required by the document loader and file operations.
///
/// An operation holds at most one reader and one writer at a time.
///
/// # Examples
///
/// ```
/// use inifile::store::{FileStore, MemoryFileStore};
/// use std::path::Path;
///
/// let store = MemoryFileStore::new();
/// store.insert("app.ini", "[main]\nkey=value\n");
///
/// let lines = store.read_all_lines(Path::new("app.ini")).unwrap();
/// assert_eq!(lines, vec!["[main]\n", "key=value\n"]);
/// ```
pub trait FileStore: Send + Sync {
    /// Open `path` and return its lines lazily.
    ///
    /// A line that is not valid UTF-8 yields an `InvalidData` error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened. Read failures surface
    /// as `Err` items of the iterator.
    fn open_for_read(&self, path: &Path) -> io::Result<LineIter>;

    /// Open `path` like [`open_for_read`](Self::open_for_read), replacing
    /// invalid UTF-8 with U+FFFD instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    fn open_lossy(&self, path: &Path) -> io::Result<LineIter>;

    /// Read every line of `path`, decoding lossily.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    fn read_all_lines(&self, path: &Path) -> io::Result<Vec<String>> {
        self.open_lossy(path)?.collect()
    }

    /// The last modification time of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read.
    fn modified_time(&self, path: &Path) -> io::Result<SystemTime>;

    /// Create a new staging file next to `preferred` and return its path
    /// and a writer for it.
    ///
    /// The file lives in the directory of `preferred` (the working directory
    /// when it has none) and its name starts with the file name of
    /// `preferred`. An existing file is never opened or replaced; another
    /// name is chosen instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    fn create_temp(&self, preferred: &Path) -> io::Result<(PathBuf, Box<dyn Write>)>;

    /// Copy `src` to `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails, or if `dst` exists and
    /// `overwrite` is false.
    fn copy(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()>;

    /// Delete `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    fn delete(&self, path: &Path) -> io::Result<()>;
}

/// Iterator over the lines of a reader, terminators included.
struct RawLines<R> {
    reader: R,
    lossy: bool,
    done: bool,
}

impl<R: BufRead> RawLines<R> {
    fn new(reader: R, lossy: bool) -> Self {
        Self {
            reader,
            lossy,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for RawLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut bytes = Vec::new();
        match self.reader.read_until(b'\n', &mut bytes) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                let line = decode(bytes, self.lossy);
                self.done = line.is_err();
                Some(line)
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn decode(bytes: Vec<u8>, lossy: bool) -> io::Result<String> {
    if lossy {
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Split bytes into lines, keeping each line's terminator.
fn split_lines(bytes: &[u8], lossy: bool) -> io::Result<Vec<String>> {
    bytes
        .split_inclusive(|b| *b == b'\n')
        .map(|line| decode(line.to_vec(), lossy))
        .collect()
}

/// The directory and file name a staging file is derived from.
fn temp_parts(preferred: &Path) -> (&Path, &OsStr) {
    let dir = match preferred.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = preferred
        .file_name()
        .unwrap_or_else(|| OsStr::new("inifile"));
    (dir, name)
}

/// Production implementation backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFileStore;

impl FileStore for SystemFileStore {
    fn open_for_read(&self, path: &Path) -> io::Result<LineIter> {
        let file = File::open(path)?;
        Ok(Box::new(RawLines::new(BufReader::new(file), false)))
    }

    fn open_lossy(&self, path: &Path) -> io::Result<LineIter> {
        let file = File::open(path)?;
        Ok(Box::new(RawLines::new(BufReader::new(file), true)))
    }

    fn modified_time(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn create_temp(&self, preferred: &Path) -> io::Result<(PathBuf, Box<dyn Write>)> {
        let (dir, name) = temp_parts(preferred);
        let (file, path) = tempfile::Builder::new()
            .prefix(name)
            .rand_bytes(6)
            .tempfile_in(dir)?
            .keep()?;
        Ok((path, Box::new(BufWriter::new(file))))
    }

    /// Copies contents only. An existing `dst` keeps its permissions.
    fn copy(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
        let mut reader = File::open(src)?;
        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut writer = options.open(dst)?;
        io::copy(&mut reader, &mut writer)?;
        writer.flush()
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    contents: Vec<u8>,
    modified: SystemTime,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<PathBuf, MemoryFile>,
    denied: Vec<PathBuf>,
    tick: u64,
}

impl MemoryState {
    /// Advance the fake clock; every mutation gets a distinct timestamp.
    fn next_time(&mut self) -> SystemTime {
        self.tick += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.tick)
    }

    fn check_access(&self, path: &Path) -> io::Result<()> {
        if self.denied.iter().any(|denied| denied == path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("access to {} denied", path.display()),
            ));
        }
        Ok(())
    }

    fn get(&self, path: &Path) -> io::Result<&MemoryFile> {
        self.check_access(path)?;
        self.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}

/// In-memory store for tests.
///
/// Files live in a shared map keyed by path. Modification times come from a
/// counter, so two writes never share a timestamp and loading the same file
/// twice without changes yields the same timestamp. Clones share state.
///
/// # Examples
///
/// ```
/// use inifile::store::{FileStore, MemoryFileStore};
/// use std::path::Path;
///
/// let store = MemoryFileStore::new();
/// store.insert("a.ini", "[a]\n");
/// store.copy(Path::new("a.ini"), Path::new("b.ini"), false).unwrap();
/// assert_eq!(store.contents("b.ini").as_deref(), Some("[a]\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryFileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: &str) {
        self.insert_bytes(path, contents.as_bytes());
    }

    /// Create or replace a file with raw bytes.
    pub fn insert_bytes(&self, path: impl Into<PathBuf>, contents: &[u8]) {
        let mut state = self.lock();
        let modified = state.next_time();
        state.files.insert(
            path.into(),
            MemoryFile {
                contents: contents.to_vec(),
                modified,
            },
        );
    }

    /// The raw bytes of a file, if it exists.
    #[must_use]
    pub fn bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let state = self.lock();
        state.files.get(path.as_ref()).map(|file| file.contents.clone())
    }

    /// The contents of a file, if it exists and is valid UTF-8.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let state = self.lock();
        let file = state.files.get(path.as_ref())?;
        String::from_utf8(file.contents.clone()).ok()
    }

    /// Whether a file exists.
    #[must_use]
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.lock().files.contains_key(path.as_ref())
    }

    /// All stored paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.lock().files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Make every operation touching `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: impl Into<PathBuf>) {
        self.lock().denied.push(path.into());
    }
}

impl FileStore for MemoryFileStore {
    fn open_for_read(&self, path: &Path) -> io::Result<LineIter> {
        let lines = split_lines(&self.lock().get(path)?.contents, false)?;
        Ok(Box::new(lines.into_iter().map(Ok)))
    }

    fn open_lossy(&self, path: &Path) -> io::Result<LineIter> {
        let lines = split_lines(&self.lock().get(path)?.contents, true)?;
        Ok(Box::new(lines.into_iter().map(Ok)))
    }

    fn modified_time(&self, path: &Path) -> io::Result<SystemTime> {
        Ok(self.lock().get(path)?.modified)
    }

    /// Uses `preferred` itself when it is free, then `preferred.1`,
    /// `preferred.2` and so on.
    fn create_temp(&self, preferred: &Path) -> io::Result<(PathBuf, Box<dyn Write>)> {
        let mut state = self.lock();
        let mut path = preferred.to_path_buf();
        let mut attempt = 0u32;
        while state.files.contains_key(&path) {
            attempt += 1;
            let mut name = OsString::from(preferred.as_os_str());
            name.push(format!(".{attempt}"));
            path = PathBuf::from(name);
        }

        state.check_access(&path)?;
        let modified = state.next_time();
        state.files.insert(
            path.clone(),
            MemoryFile {
                contents: Vec::new(),
                modified,
            },
        );
        let writer = MemoryWriter {
            state: Arc::clone(&self.state),
            path: path.clone(),
        };
        Ok((path, Box::new(writer)))
    }

    fn copy(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
        let mut state = self.lock();
        let contents = state.get(src)?.contents.clone();
        state.check_access(dst)?;
        if !overwrite && state.files.contains_key(dst) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", dst.display()),
            ));
        }
        let modified = state.next_time();
        state
            .files
            .insert(dst.to_path_buf(), MemoryFile { contents, modified });
        Ok(())
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        state.get(path)?;
        state.files.remove(path);
        Ok(())
    }
}

/// Writer that appends straight into a [`MemoryFileStore`] entry.
struct MemoryWriter {
    state: Arc<Mutex<MemoryState>>,
    path: PathBuf,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let modified = state.next_time();
        let file = state.files.get_mut(&self.path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} was removed while writing", self.path.display()),
            )
        })?;
        file.contents.extend_from_slice(buf);
        file.modified = modified;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
