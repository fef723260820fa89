use std::{
    fs::OpenOptions,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use order_core::export::{DownloadError, Downloader, ExportFile};
use tracing::{info, warn};

/// Gives up looking for a free name after this many attempts.
const MAX_SUFFIX: u32 = 999;

/// Saves exported files into a directory, never overwriting an earlier
/// download: a clash becomes `name (1).png`, `name (2).png`, and so on.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: Option<PathBuf>,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Uses `dir` when given, otherwise the platform download directory.
    pub fn from_config(dir: Option<&Path>) -> Self {
        Self {
            dir: dir.map(Path::to_path_buf).or_else(dirs::download_dir),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

fn candidate(
    dir: &Path,
    file_name: &str,
    attempt: u32,
) -> PathBuf {
    if attempt == 0 {
        return dir.join(file_name);
    }
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => dir.join(format!("{stem} ({attempt}).{ext}")),
        None => dir.join(format!("{stem} ({attempt})")),
    }
}

/// Writes `bytes` to the freshly created file at `path`, removing it again
/// if the write does not complete.
fn write_or_discard(
    path: &Path,
    out: &mut impl Write,
    bytes: &[u8],
) -> Result<(), DownloadError> {
    let written = out.write_all(bytes).and_then(|()| out.flush());
    if let Err(source) = written {
        if let Err(error) = std::fs::remove_file(path) {
            warn!(%error, path = %path.display(), "could not remove partial download");
        }
        return Err(DownloadError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

impl Downloader for DirectoryDownloader {
    fn download(
        &self,
        file: &ExportFile,
    ) -> Result<PathBuf, DownloadError> {
        let dir = self.dir.as_deref().ok_or(DownloadError::NoLocation)?;
        std::fs::create_dir_all(dir).map_err(|source| DownloadError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        for attempt in 0..=MAX_SUFFIX {
            let path = candidate(dir, &file.file_name, attempt);
            let mut out = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(out) => out,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(DownloadError::Write { path, source }),
            };
            write_or_discard(&path, &mut out, &file.bytes)?;
            info!(path = %path.display(), bytes = file.bytes.len(), "order image saved");
            return Ok(path);
        }

        Err(DownloadError::Write {
            path: dir.join(&file.file_name),
            source: ErrorKind::AlreadyExists.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn file() -> ExportFile {
        ExportFile::png("cake-order-jane-smith.png", vec![1, 2, 3])
    }

    #[test]
    fn writes_into_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = DirectoryDownloader::new(dir.path());

        let path = downloader.download(&file()).unwrap();

        assert_eq!(path, dir.path().join("cake-order-jane-smith.png"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn clashing_names_get_a_counter() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = DirectoryDownloader::new(dir.path());

        downloader.download(&file()).unwrap();
        let second = downloader.download(&file()).unwrap();
        let third = downloader.download(&file()).unwrap();

        assert_eq!(second, dir.path().join("cake-order-jane-smith (1).png"));
        assert_eq!(third, dir.path().join("cake-order-jane-smith (2).png"));
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("orders").join("2026");
        let downloader = DirectoryDownloader::new(&nested);

        let path = downloader.download(&file()).unwrap();

        assert!(path.starts_with(&nested));
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(
            &mut self,
            _buf: &[u8],
        ) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::StorageFull, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cake-order-jane-smith.png");
        std::fs::write(&path, b"trunc").unwrap();

        let err = write_or_discard(&path, &mut FullDisk, &[1, 2, 3]).unwrap_err();

        assert!(matches!(err, DownloadError::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn no_location_is_an_error() {
        let downloader = DirectoryDownloader { dir: None };

        assert!(matches!(
            downloader.download(&file()),
            Err(DownloadError::NoLocation)
        ));
    }

    #[test]
    fn configured_directory_wins() {
        let downloader = DirectoryDownloader::from_config(Some(Path::new("/srv/orders")));

        assert_eq!(downloader.dir(), Some(Path::new("/srv/orders")));
    }
}
