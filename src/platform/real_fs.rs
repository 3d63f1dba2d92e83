//! Real filesystem implementation delegating to `std::fs`, `std::os::unix::fs`,
//! `walkdir`, `filetime`, and `dirs`.
//!
//! Methods return bare errors without added context; callers add their own
//! operation and path when classifying them.

use filetime::FileTime;
use std::fs::{DirBuilder, File};
use std::io;
use std::os::unix::fs::{DirBuilderExt, MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

use super::{DirEntry, FileKind, Fs, FsFile, Metadata, OpenOptions};

/// Real filesystem. Delegates every operation to the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

fn convert(meta: &std::fs::Metadata) -> Metadata {
    let ft = meta.file_type();
    let kind = if ft.is_symlink() {
        FileKind::Symlink
    } else if ft.is_dir() {
        FileKind::Dir
    } else {
        FileKind::File
    };
    Metadata {
        kind,
        mode: meta.permissions().mode() & 0o7777,
        len: meta.len(),
        dev: meta.dev(),
        ino: meta.ino(),
        accessed: meta.accessed().unwrap_or(UNIX_EPOCH),
        modified: meta.modified().unwrap_or(UNIX_EPOCH),
    }
}

impl FsFile for File {
    fn sync_all(&mut self) -> io::Result<()> {
        File::sync_all(self)
    }

    fn stat(&self) -> io::Result<Metadata> {
        Ok(convert(&self.metadata()?))
    }
}

impl Fs for RealFs {
    type File = File;

    fn open_file(&self, path: &Path, opts: &OpenOptions) -> io::Result<File> {
        std::fs::OpenOptions::new()
            .read(opts.read)
            .write(opts.write)
            .append(opts.append)
            .create(opts.create)
            .truncate(opts.truncate)
            .create_new(opts.create_new)
            .mode(opts.mode)
            .open(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        Ok(convert(&std::fs::metadata(path)?))
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        Ok(convert(&std::fs::symlink_metadata(path)?))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        // walkdir yields nothing below a file root; keep `read_dir` semantics.
        if !std::fs::metadata(path)?.is_dir() {
            return Err(io::Error::from(io::ErrorKind::NotADirectory));
        }
        WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                let entry = entry.map_err(io::Error::from)?;
                let metadata = convert(&entry.metadata().map_err(io::Error::from)?);
                Ok(DirEntry {
                    file_name: entry.file_name().to_os_string(),
                    path: entry.into_path(),
                    metadata,
                })
            })
            .collect()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()> {
        std::fs::hard_link(original, link)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        DirBuilder::new().mode(mode).create(path)
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        DirBuilder::new().recursive(true).mode(mode).create(path)
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(original, link)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    }

    fn set_times(&self, path: &Path, accessed: SystemTime, modified: SystemTime) -> io::Result<()> {
        filetime::set_file_times(
            path,
            FileTime::from_system_time(accessed),
            FileTime::from_system_time(modified),
        )
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        dirs::config_dir()
    }
}
