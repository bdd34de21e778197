//! Entry openers
//!
//! An [`EntryOpener`] turns a [`ClasspathEntry`] into an [`OpenedEntry`] handle.
//! Resolvers open each entry of their search path lazily on first use and keep
//! the handle until teardown.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::shared::models::ClasspathEntry;

/// Opens classpath entries
pub trait EntryOpener: Send + Sync {
    fn open(&self, entry: &ClasspathEntry) -> io::Result<Box<dyn OpenedEntry>>;
}

/// An open entry handle
pub trait OpenedEntry: Send {
    /// Bytes stored under `relative_path`, `None` if absent
    fn read(&mut self, relative_path: &str) -> io::Result<Option<Vec<u8>>>;

    /// Release the underlying resources
    fn release(&mut self) -> io::Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Filesystem
// ═══════════════════════════════════════════════════════════════════════════

/// Opens directories, `.tar` archives and zip-format archives (`.jar`, `.zip`,
/// `.war`) from the filesystem
///
/// A location that does not exist opens as an empty entry, like a missing
/// directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsEntryOpener;

impl FsEntryOpener {
    pub fn new() -> Self {
        Self
    }
}

impl EntryOpener for FsEntryOpener {
    fn open(&self, entry: &ClasspathEntry) -> io::Result<Box<dyn OpenedEntry>> {
        if entry.is_directory() {
            return Ok(Box::new(DirectoryEntry { root: entry.path() }));
        }

        let path = entry.path();
        if !path.is_file() {
            tracing::debug!("Archive {} does not exist, treating it as empty", entry);
            return Ok(Box::new(EmptyEntry));
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "tar" => Ok(Box::new(TarEntry::open(&path)?)),
            "jar" | "zip" | "war" => Ok(Box::new(ZipEntry::open(&path)?)),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported archive format: {}", entry.location()),
            )),
        }
    }
}

fn released_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "archive already released")
}

/// Directory entry; a missing directory simply contains nothing
struct DirectoryEntry {
    root: PathBuf,
}

impl OpenedEntry for DirectoryEntry {
    fn read(&mut self, relative_path: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.root.join(relative_path);
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read(path).map(Some)
    }

    fn release(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stale archive location
struct EmptyEntry;

impl OpenedEntry for EmptyEntry {
    fn read(&mut self, _relative_path: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn release(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `.tar` archive: members indexed once, bytes read on demand from the open file
struct TarEntry {
    file: Option<File>,
    /// member path → (data offset, size)
    index: HashMap<String, (u64, u64)>,
}

impl TarEntry {
    fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut index = HashMap::new();
        {
            let mut archive = tar::Archive::new(&file);
            for member in archive.entries()? {
                let member = member?;
                if !member.header().entry_type().is_file() {
                    continue;
                }
                let member_path = normalize_member(&member.path()?.to_string_lossy());
                index.insert(member_path, (member.raw_file_position(), member.size()));
            }
        }
        tracing::debug!("Indexed {} members of {}", index.len(), path.display());
        Ok(Self {
            file: Some(file),
            index,
        })
    }
}

impl OpenedEntry for TarEntry {
    fn read(&mut self, relative_path: &str) -> io::Result<Option<Vec<u8>>> {
        let (offset, size) = match self.index.get(relative_path) {
            Some(&position) => position,
            None => return Ok(None),
        };
        let file = self.file.as_mut().ok_or_else(released_error)?;

        file.seek(SeekFrom::Start(offset))?;
        let mut bytes = Vec::with_capacity(size as usize);
        file.by_ref().take(size).read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    fn release(&mut self) -> io::Result<()> {
        self.file = None;
        Ok(())
    }
}

/// Zip-format archive: member names indexed once, members inflated on demand
struct ZipEntry {
    archive: Option<zip::ZipArchive<File>>,
    /// member path → archive index
    index: HashMap<String, usize>,
}

impl ZipEntry {
    fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(file).map_err(zip_error)?;
        let mut index = HashMap::with_capacity(archive.len());
        for position in 0..archive.len() {
            let member = archive.by_index_raw(position).map_err(zip_error)?;
            if member.is_dir() {
                continue;
            }
            index.insert(normalize_member(member.name()), position);
        }
        tracing::debug!("Indexed {} members of {}", index.len(), path.display());
        Ok(Self {
            archive: Some(archive),
            index,
        })
    }
}

impl OpenedEntry for ZipEntry {
    fn read(&mut self, relative_path: &str) -> io::Result<Option<Vec<u8>>> {
        let position = match self.index.get(relative_path) {
            Some(&position) => position,
            None => return Ok(None),
        };
        let archive = self.archive.as_mut().ok_or_else(released_error)?;

        let mut member = archive.by_index(position).map_err(zip_error)?;
        let mut bytes = Vec::with_capacity(member.size() as usize);
        member.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    fn release(&mut self) -> io::Result<()> {
        self.archive = None;
        Ok(())
    }
}

fn zip_error(error: zip::result::ZipError) -> io::Error {
    match error {
        zip::result::ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

fn normalize_member(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

// ═══════════════════════════════════════════════════════════════════════════
// In-memory
// ═══════════════════════════════════════════════════════════════════════════

/// Counters shared by a [`MemoryEntryOpener`] and its handles
#[derive(Debug, Default)]
pub struct OpenerStats {
    opens: AtomicUsize,
    reads: AtomicUsize,
    hits: AtomicUsize,
    released: Mutex<Vec<String>>,
}

impl OpenerStats {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Every `read` call, found or not
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Reads that found content
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Locations in the order their handles were released
    pub fn released(&self) -> Vec<String> {
        self.released.lock().clone()
    }
}

/// Entry contents held in memory
///
/// Unknown locations open as empty entries.
#[derive(Debug, Default)]
pub struct MemoryEntryOpener {
    contents: HashMap<String, HashMap<String, Arc<[u8]>>>,
    failing_release: HashSet<String>,
    read_delay: Option<Duration>,
    stats: Arc<OpenerStats>,
}

impl MemoryEntryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under `relative_path` of the entry at `location`
    pub fn with_file(
        mut self,
        location: &ClasspathEntry,
        relative_path: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        let bytes: Vec<u8> = bytes.into();
        self.contents
            .entry(location.location().to_string())
            .or_default()
            .insert(relative_path.into(), Arc::from(bytes));
        self
    }

    /// Handles of `location` fail on release
    pub fn with_failing_release(mut self, location: &ClasspathEntry) -> Self {
        self.failing_release.insert(location.location().to_string());
        self
    }

    /// Sleep on every read, to widen race windows
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn stats(&self) -> Arc<OpenerStats> {
        Arc::clone(&self.stats)
    }
}

impl EntryOpener for MemoryEntryOpener {
    fn open(&self, entry: &ClasspathEntry) -> io::Result<Box<dyn OpenedEntry>> {
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryEntry {
            location: entry.location().to_string(),
            files: self
                .contents
                .get(entry.location())
                .cloned()
                .unwrap_or_default(),
            fail_release: self.failing_release.contains(entry.location()),
            read_delay: self.read_delay,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct MemoryEntry {
    location: String,
    files: HashMap<String, Arc<[u8]>>,
    fail_release: bool,
    read_delay: Option<Duration>,
    stats: Arc<OpenerStats>,
}

impl OpenedEntry for MemoryEntry {
    fn read(&mut self, relative_path: &str) -> io::Result<Option<Vec<u8>>> {
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.read_delay {
            std::thread::sleep(delay);
        }
        let found = self.files.get(relative_path).map(|bytes| bytes.to_vec());
        if found.is_some() {
            self.stats.hits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(found)
    }

    fn release(&mut self) -> io::Result<()> {
        self.stats.released.lock().push(self.location.clone());
        if self.fail_release {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("release of {} failed", self.location),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_directory_entry() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("a/b/C.class"), b"cafe").unwrap();

        let entry = ClasspathEntry::from_path(dir.path());
        let mut handle = FsEntryOpener::new().open(&entry).unwrap();
        assert_eq!(handle.read("a/b/C.class").unwrap(), Some(b"cafe".to_vec()));
        assert_eq!(handle.read("a/b/D.class").unwrap(), None);
        handle.release().unwrap();
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let entry = ClasspathEntry::directory("/definitely/not/here");
        let mut handle = FsEntryOpener::new().open(&entry).unwrap();
        assert_eq!(handle.read("a/B.class").unwrap(), None);
    }

    #[test]
    fn test_tar_entry() {
        let dir = TempDir::new().unwrap();
        let archive_path = dir.path().join("lib.tar");
        {
            let file = File::create(&archive_path).unwrap();
            let mut builder = tar::Builder::new(file);
            for (name, data) in [("a/B.class", &b"first"[..]), ("a/C.class", &b"second"[..])] {
                let mut header = tar::Header::new_gnu();
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder.append_data(&mut header, name, data).unwrap();
            }
            builder.into_inner().unwrap().flush().unwrap();
        }

        let entry = ClasspathEntry::new(archive_path.to_string_lossy());
        assert!(entry.is_archive());
        let mut handle = FsEntryOpener::new().open(&entry).unwrap();
        assert_eq!(handle.read("a/C.class").unwrap(), Some(b"second".to_vec()));
        assert_eq!(handle.read("a/B.class").unwrap(), Some(b"first".to_vec()));
        assert_eq!(handle.read("a/D.class").unwrap(), None);

        handle.release().unwrap();
        assert!(handle.read("a/B.class").is_err());
    }

    #[test]
    fn test_jar_entry() {
        let dir = TempDir::new().unwrap();
        let archive_path = dir.path().join("lib-1.jar");
        {
            let mut writer = zip::ZipWriter::new(File::create(&archive_path).unwrap());
            let options = zip::write::FileOptions::default();
            writer.add_directory("a/", options).unwrap();
            writer.start_file("a/B.class", options).unwrap();
            writer.write_all(b"first").unwrap();
            writer.start_file("META-INF/MANIFEST.MF", options).unwrap();
            writer.write_all(b"Manifest-Version: 1.0\n").unwrap();
            writer.finish().unwrap();
        }

        let entry = ClasspathEntry::new(archive_path.to_string_lossy());
        let mut handle = FsEntryOpener::new().open(&entry).unwrap();
        assert_eq!(handle.read("a/B.class").unwrap(), Some(b"first".to_vec()));
        assert_eq!(handle.read("a/").unwrap(), None);
        assert_eq!(handle.read("a/C.class").unwrap(), None);

        handle.release().unwrap();
        assert!(handle.read("a/B.class").is_err());
    }

    #[test]
    fn test_missing_archive_is_empty() {
        for location in ["/definitely/not/here/a-1.jar", "/definitely/not/here/a-1.tar"] {
            let entry = ClasspathEntry::new(location);
            assert!(entry.is_archive());
            let mut handle = FsEntryOpener::new().open(&entry).unwrap();
            assert_eq!(handle.read("a/B.class").unwrap(), None);
            handle.release().unwrap();
        }
    }

    #[test]
    fn test_corrupt_jar_is_an_error() {
        let dir = TempDir::new().unwrap();
        let archive_path = dir.path().join("broken-1.jar");
        std::fs::write(&archive_path, b"not a zip archive").unwrap();

        let entry = ClasspathEntry::new(archive_path.to_string_lossy());
        assert!(FsEntryOpener::new().open(&entry).is_err());
    }

    #[test]
    fn test_memory_opener_counts() {
        let entry = ClasspathEntry::new("/mem/a/");
        let opener = MemoryEntryOpener::new()
            .with_file(&entry, "x/Y.class", b"y".to_vec())
            .with_failing_release(&entry);
        let stats = opener.stats();

        let mut handle = opener.open(&entry).unwrap();
        assert!(handle.read("x/Y.class").unwrap().is_some());
        assert!(handle.read("x/Z.class").unwrap().is_none());
        assert!(handle.release().is_err());

        assert_eq!(stats.opens(), 1);
        assert_eq!(stats.reads(), 2);
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.released(), vec!["/mem/a/".to_string()]);
    }
}
