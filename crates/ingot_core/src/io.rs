//! I/O collaborator used by the importer and format workers.
//!
//! The importer only asks whether a path exists. Workers open streams
//! through the same [`IoSystem`] so that imports can run against the real
//! file system or against named in-memory buffers.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A readable, seekable byte stream.
pub trait Stream: Read + Seek {
    /// Current position from the start of the stream.
    fn tell(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    /// Total size in bytes.
    fn size(&mut self) -> io::Result<u64>;
}

impl Stream for BufReader<File> {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().metadata()?.len())
    }
}

impl<T: AsRef<[u8]>> Stream for Cursor<T> {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.get_ref().as_ref().len() as u64)
    }
}

/// Resolves paths to streams.
///
/// Implementations must be shareable across threads; one importer may move
/// to a worker thread together with its I/O system.
pub trait IoSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn open(&self, path: &Path) -> io::Result<Box<dyn Stream>>;
}

/// Reads through `std::fs`, optionally relative to a base directory.
#[derive(Clone, Debug, Default)]
pub struct FileSystem {
    base: Option<PathBuf>,
}

impl FileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base`.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl IoSystem for FileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Stream>> {
        let file = File::open(self.resolve(path))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Named in-memory buffers.
#[derive(Clone, Debug, Default)]
pub struct MemoryIoSystem {
    files: HashMap<PathBuf, Arc<[u8]>>,
}

impl MemoryIoSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a buffer.
    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        let bytes: Vec<u8> = bytes.into();
        self.files.insert(path.into(), Arc::from(bytes));
    }

    /// Builder form of [`MemoryIoSystem::insert`].
    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl IoSystem for MemoryIoSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Stream>> {
        let bytes = self.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no in-memory file named {}", path.display()),
            )
        })?;
        Ok(Box::new(Cursor::new(Arc::clone(bytes))))
    }
}

/// Open `path` and read it completely.
pub fn read_to_end(io: &dyn IoSystem, path: &Path) -> io::Result<Vec<u8>> {
    let mut stream = io.open(path)?;
    let size = stream.size()?;
    let mut bytes = Vec::with_capacity(size as usize);
    stream.seek(SeekFrom::Start(0))?;
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Open `path` and read it as UTF-8 text.
pub fn read_to_string(io: &dyn IoSystem, path: &Path) -> io::Result<String> {
    let bytes = read_to_end(io, path)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_stream_operations() {
        let io = MemoryIoSystem::new().with_file("a.txt", b"hello world".to_vec());

        assert!(io.exists(Path::new("a.txt")));
        assert!(!io.exists(Path::new("b.txt")));

        let mut stream = io.open(Path::new("a.txt")).unwrap();
        assert_eq!(stream.size().unwrap(), 11);

        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        assert_eq!(stream.tell().unwrap(), 5);

        stream.seek(SeekFrom::Start(6)).unwrap();
        let mut rest = String::new();
        stream.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "world");
    }

    #[test]
    fn test_missing_memory_file() {
        let io = MemoryIoSystem::new();
        let err = io.open(Path::new("nope")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_read_helpers() {
        let io = MemoryIoSystem::new()
            .with_file("text", "ingot".as_bytes().to_vec())
            .with_file("binary", vec![0xff, 0xfe]);

        assert_eq!(read_to_string(&io, Path::new("text")).unwrap(), "ingot");
        assert_eq!(read_to_end(&io, Path::new("binary")).unwrap(), vec![0xff, 0xfe]);
        assert_eq!(
            read_to_string(&io, Path::new("binary")).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
    }

    #[test]
    fn test_file_system_base_dir() {
        let dir = std::env::temp_dir().join(format!("ingot_io_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("cube.obj"), "v 0 0 0\n").unwrap();

        let fs = FileSystem::with_base(&dir);
        assert!(fs.exists(Path::new("cube.obj")));
        assert!(!fs.exists(Path::new("sphere.obj")));
        assert_eq!(read_to_string(&fs, Path::new("cube.obj")).unwrap(), "v 0 0 0\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
