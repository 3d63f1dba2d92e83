//! In-memory filesystem fake for testing.
//!
//! Paths map to inode numbers and inodes hold the content, so hard links
//! share data, `rename` keeps the inode and a copy gets a fresh one. State
//! lives behind `Arc<Mutex<..>>`: clones of a [`FakeFs`] and the files it
//! opens all see the same tree, from any thread.
//!
//! Non-trait setup methods (`add_file`, `add_dir`, `add_symlink`) auto-create
//! parent directories for convenience in test setup. Relative paths are
//! resolved against `/`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{DirEntry, FileKind, Fs, FsFile, Metadata, OpenOptions};

const FAKE_DEV: u64 = 1;

/// Operations whose failure can be simulated with [`FakeFs::set_failing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    Rename,
    HardLink,
    RemoveFile,
    Write,
    Sync,
}

#[derive(Clone, Debug)]
enum FakeKind {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

#[derive(Clone, Debug)]
struct FakeNode {
    kind: FakeKind,
    mode: u32,
    accessed: SystemTime,
    modified: SystemTime,
}

impl FakeNode {
    fn new(kind: FakeKind, mode: u32) -> Self {
        Self {
            kind,
            mode: mode & 0o7777,
            accessed: UNIX_EPOCH,
            modified: UNIX_EPOCH,
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self.kind, FakeKind::Dir)
    }

    fn metadata(&self, ino: u64) -> Metadata {
        let (kind, len) = match &self.kind {
            FakeKind::File(content) => (FileKind::File, content.len() as u64),
            FakeKind::Dir => (FileKind::Dir, 0),
            FakeKind::Symlink(target) => (FileKind::Symlink, target.as_os_str().len() as u64),
        };
        Metadata {
            kind,
            mode: self.mode,
            len,
            dev: FAKE_DEV,
            ino,
            accessed: self.accessed,
            modified: self.modified,
        }
    }
}

#[derive(Debug)]
struct FakeState {
    entries: BTreeMap<PathBuf, u64>,
    nodes: HashMap<u64, FakeNode>,
    next_ino: u64,
    failing: HashSet<FakeOp>,
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("file not found: {}", path.display()),
    )
}

fn error(kind: io::ErrorKind, what: &str, path: &Path) -> io::Error {
    io::Error::new(kind, format!("{what}: {}", path.display()))
}

/// Make `path` absolute (against `/`) and drop `.`/`..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => out = PathBuf::from("/"),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

impl FakeState {
    fn node(&self, path: &Path) -> Option<(u64, &FakeNode)> {
        let ino = *self.entries.get(path)?;
        self.nodes.get(&ino).map(|node| (ino, node))
    }

    /// Resolve a path through symlinks (up to 32 hops to avoid infinite loops).
    fn resolve(&self, path: &Path) -> PathBuf {
        let mut current = path.to_path_buf();
        for _ in 0..32 {
            match self.node(&current) {
                Some((_, FakeNode { kind: FakeKind::Symlink(target), .. })) => {
                    current = match current.parent() {
                        Some(parent) if target.is_relative() => normalize(&parent.join(target)),
                        _ => normalize(target),
                    };
                }
                _ => break,
            }
        }
        current
    }

    fn insert(&mut self, path: PathBuf, node: FakeNode) -> u64 {
        self.next_ino += 1;
        let ino = self.next_ino;
        self.nodes.insert(ino, node);
        self.entries.insert(path, ino);
        ino
    }

    /// Drop the name `path`; the inode goes away with its last name.
    fn unlink(&mut self, path: &Path) {
        if let Some(ino) = self.entries.remove(path)
            && !self.entries.values().any(|other| *other == ino)
        {
            self.nodes.remove(&ino);
        }
    }

    fn check_parent(&self, path: &Path) -> io::Result<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        match self.node(&self.resolve(parent)) {
            Some((_, node)) if node.is_dir() => Ok(()),
            Some(_) => Err(error(io::ErrorKind::NotADirectory, "not a directory", parent)),
            None => Err(not_found(parent)),
        }
    }

    fn has_children(&self, path: &Path) -> bool {
        self.entries.keys().any(|k| k.parent() == Some(path))
    }

    fn descendants(&self, path: &Path) -> Vec<(PathBuf, u64)> {
        self.entries
            .iter()
            .filter(|(k, _)| k.starts_with(path))
            .map(|(k, ino)| (k.clone(), *ino))
            .collect()
    }

    fn fail(&self, op: FakeOp, path: &Path) -> io::Result<()> {
        if self.failing.contains(&op) {
            return Err(io::Error::other(format!(
                "simulated {op:?} failure: {}",
                path.display()
            )));
        }
        Ok(())
    }
}

fn lock(state: &Mutex<FakeState>) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory filesystem for testing. No real I/O.
#[derive(Debug, Clone)]
pub struct FakeFs {
    state: Arc<Mutex<FakeState>>,
    config_dir: PathBuf,
    temp_dir: PathBuf,
}

impl Default for FakeFs {
    fn default() -> Self {
        Self::new("/home/test")
    }
}

impl FakeFs {
    /// Create a new fake filesystem with the given home directory.
    ///
    /// Automatically creates `/`, `/tmp`, the home directory and `~/.config`.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = normalize(&home.into());
        let config_dir = home.join(".config");
        let temp_dir = PathBuf::from("/tmp");
        let mut state = FakeState {
            entries: BTreeMap::new(),
            nodes: HashMap::new(),
            next_ino: 0,
            failing: HashSet::new(),
        };
        state.insert(PathBuf::from("/"), FakeNode::new(FakeKind::Dir, 0o755));
        let fs = Self {
            state: Arc::new(Mutex::new(state)),
            config_dir: config_dir.clone(),
            temp_dir: temp_dir.clone(),
        };
        fs.add_dir(temp_dir);
        fs.add_dir(config_dir);
        fs
    }

    /// Toggle simulated failures for `op`. While enabled, every call of that
    /// operation fails with an `ErrorKind::Other` error.
    pub fn set_failing(&self, op: FakeOp, fail: bool) {
        let mut state = self.state();
        if fail {
            state.failing.insert(op);
        } else {
            state.failing.remove(&op);
        }
    }

    // -- Setup helpers (not part of the Fs trait) --

    /// Add a file with content and default permissions (0o644).
    /// Auto-creates parent directories.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.add_file_with_mode(path, content, 0o644);
    }

    /// Add a file with content and explicit permissions.
    /// Auto-creates parent directories.
    pub fn add_file_with_mode(
        &self,
        path: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
        mode: u32,
    ) {
        let path = normalize(&path.into());
        self.ensure_parents(&path);
        let mut state = self.state();
        state.unlink(&path);
        state.insert(path, FakeNode::new(FakeKind::File(content.into()), mode));
    }

    /// Add a directory entry. Auto-creates parent directories.
    /// No-op if the path already exists.
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        let path = normalize(&path.into());
        self.ensure_parents(&path);
        let mut state = self.state();
        if !state.entries.contains_key(&path) {
            state.insert(path, FakeNode::new(FakeKind::Dir, 0o755));
        }
    }

    /// Add a symbolic link. Auto-creates parent directories for the link path.
    pub fn add_symlink(&self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        let link = normalize(&link.into());
        self.ensure_parents(&link);
        let mut state = self.state();
        state.unlink(&link);
        state.insert(link, FakeNode::new(FakeKind::Symlink(target.into()), 0o777));
    }

    /// Ensure all parent directories of `path` exist.
    fn ensure_parents(&self, path: &Path) {
        let mut state = self.state();
        if let Some(parent) = path.parent() {
            let mut current = PathBuf::new();
            for component in parent.components() {
                current.push(component);
                if !state.entries.contains_key(&current) {
                    state.insert(current.clone(), FakeNode::new(FakeKind::Dir, 0o755));
                }
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        lock(&self.state)
    }
}

/// An open handle into a [`FakeFs`]. Reads and writes go straight to the
/// shared inode, so there is nothing to flush.
#[derive(Debug)]
pub struct FakeFile {
    state: Arc<Mutex<FakeState>>,
    ino: u64,
    pos: usize,
    readable: bool,
    writable: bool,
    append: bool,
}

impl Read for FakeFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let state = lock(&self.state);
        if !self.readable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "file not opened for reading",
            ));
        }
        let node = state
            .nodes
            .get(&self.ino)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        let FakeKind::File(content) = &node.kind else {
            return Err(io::Error::from(io::ErrorKind::IsADirectory));
        };
        let remaining = content.get(self.pos..).unwrap_or_default();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for FakeFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = lock(&self.state);
        if !self.writable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "file not opened for writing",
            ));
        }
        if state.failing.contains(&FakeOp::Write) {
            return Err(io::Error::other("simulated Write failure"));
        }
        let node = state
            .nodes
            .get_mut(&self.ino)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        let FakeKind::File(content) = &mut node.kind else {
            return Err(io::Error::from(io::ErrorKind::IsADirectory));
        };
        if self.append {
            self.pos = content.len();
        }
        let end = self.pos + buf.len();
        if content.len() < end {
            content.resize(end, 0);
        }
        content[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FsFile for FakeFile {
    fn sync_all(&mut self) -> io::Result<()> {
        let state = lock(&self.state);
        if state.failing.contains(&FakeOp::Sync) {
            return Err(io::Error::other("simulated Sync failure"));
        }
        Ok(())
    }

    fn stat(&self) -> io::Result<Metadata> {
        let state = lock(&self.state);
        state
            .nodes
            .get(&self.ino)
            .map(|node| node.metadata(self.ino))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

impl Fs for FakeFs {
    type File = FakeFile;

    fn open_file(&self, path: &Path, opts: &OpenOptions) -> io::Result<FakeFile> {
        let path = normalize(path);
        let mut guard = self.state();
        let state = &mut *guard;
        let resolved = state.resolve(&path);
        let writable = opts.write || opts.append;

        let ino = match state.entries.get(&resolved).copied() {
            Some(ino) => {
                if opts.create_new {
                    return Err(error(io::ErrorKind::AlreadyExists, "file exists", &path));
                }
                let node = state.nodes.get_mut(&ino).ok_or_else(|| not_found(&path))?;
                match &mut node.kind {
                    FakeKind::Dir if writable => {
                        return Err(error(io::ErrorKind::IsADirectory, "is a directory", &path));
                    }
                    FakeKind::File(content) if writable && opts.truncate => content.clear(),
                    _ => {}
                }
                ino
            }
            None => {
                if !(opts.create || opts.create_new) {
                    return Err(not_found(&path));
                }
                state.check_parent(&resolved)?;
                state.insert(resolved, FakeNode::new(FakeKind::File(Vec::new()), opts.mode))
            }
        };

        Ok(FakeFile {
            state: Arc::clone(&self.state),
            ino,
            pos: 0,
            readable: opts.read,
            writable,
            append: opts.append,
        })
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        let state = self.state();
        let resolved = state.resolve(&normalize(path));
        state
            .node(&resolved)
            .map(|(ino, node)| node.metadata(ino))
            .ok_or_else(|| not_found(path))
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        let state = self.state();
        state
            .node(&normalize(path))
            .map(|(ino, node)| node.metadata(ino))
            .ok_or_else(|| not_found(path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let state = self.state();
        let requested = normalize(path);
        let dir = state.resolve(&requested);
        match state.node(&dir) {
            Some((_, node)) if node.is_dir() => {}
            Some(_) => return Err(error(io::ErrorKind::NotADirectory, "not a directory", path)),
            None => return Err(not_found(path)),
        }

        let entries = state
            .entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(dir.as_path()))
            .filter_map(|(p, ino)| {
                let file_name = p.file_name()?.to_os_string();
                let node = state.nodes.get(ino)?;
                Some(DirEntry {
                    path: requested.join(&file_name),
                    file_name,
                    metadata: node.metadata(*ino),
                })
            })
            .collect();
        Ok(entries)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let (from, to) = (normalize(from), normalize(to));
        let mut state = self.state();
        state.fail(FakeOp::Rename, &from)?;

        let src_is_dir = match state.node(&from) {
            Some((_, node)) => node.is_dir(),
            None => return Err(not_found(&from)),
        };
        state.check_parent(&to)?;
        if from == to {
            return Ok(());
        }
        if to.starts_with(&from) {
            return Err(error(
                io::ErrorKind::InvalidInput,
                "cannot move a directory into itself",
                &to,
            ));
        }

        if let Some((_, dst)) = state.node(&to) {
            match (src_is_dir, dst.is_dir()) {
                (false, true) => {
                    return Err(error(io::ErrorKind::IsADirectory, "is a directory", &to));
                }
                (true, false) => {
                    return Err(error(io::ErrorKind::NotADirectory, "not a directory", &to));
                }
                (true, true) if state.has_children(&to) => {
                    return Err(error(
                        io::ErrorKind::DirectoryNotEmpty,
                        "directory not empty",
                        &to,
                    ));
                }
                _ => {}
            }
            state.unlink(&to);
        }

        for (path, ino) in state.descendants(&from) {
            state.entries.remove(&path);
            let renamed = match path.strip_prefix(&from) {
                Ok(rel) if !rel.as_os_str().is_empty() => to.join(rel),
                _ => to.clone(),
            };
            state.entries.insert(renamed, ino);
        }
        Ok(())
    }

    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()> {
        let (original, link) = (normalize(original), normalize(link));
        let mut state = self.state();
        state.fail(FakeOp::HardLink, &link)?;

        let ino = match state.node(&original) {
            Some((_, node)) if node.is_dir() => {
                return Err(error(
                    io::ErrorKind::PermissionDenied,
                    "hard link not allowed for directory",
                    &original,
                ));
            }
            Some((ino, _)) => ino,
            None => return Err(not_found(&original)),
        };
        if state.entries.contains_key(&link) {
            return Err(error(io::ErrorKind::AlreadyExists, "file exists", &link));
        }
        state.check_parent(&link)?;
        state.entries.insert(link, ino);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        let mut state = self.state();
        state.fail(FakeOp::RemoveFile, &path)?;
        match state.node(&path) {
            Some((_, node)) if node.is_dir() => {
                Err(error(io::ErrorKind::IsADirectory, "is a directory", &path))
            }
            Some(_) => {
                state.unlink(&path);
                Ok(())
            }
            None => Err(not_found(&path)),
        }
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        let mut state = self.state();
        match state.node(&path) {
            Some((_, node)) if node.is_dir() => {}
            Some(_) => return Err(error(io::ErrorKind::NotADirectory, "not a directory", &path)),
            None => return Err(not_found(&path)),
        }
        if state.has_children(&path) {
            return Err(error(
                io::ErrorKind::DirectoryNotEmpty,
                "directory not empty",
                &path,
            ));
        }
        state.unlink(&path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        let mut state = self.state();
        match state.node(&path) {
            Some((_, node)) if node.is_dir() => {}
            Some(_) => return Err(error(io::ErrorKind::NotADirectory, "not a directory", &path)),
            None => return Err(not_found(&path)),
        }
        for (entry, _) in state.descendants(&path) {
            state.unlink(&entry);
        }
        Ok(())
    }

    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        let path = normalize(path);
        let mut state = self.state();
        if state.entries.contains_key(&path) {
            return Err(error(io::ErrorKind::AlreadyExists, "file exists", &path));
        }
        state.check_parent(&path)?;
        state.insert(path, FakeNode::new(FakeKind::Dir, mode));
        Ok(())
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let path = normalize(path);
        let mut state = self.state();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            let resolved = state.resolve(&current);
            match state.node(&resolved) {
                Some((_, node)) if node.is_dir() => {}
                Some(_) if current == path => {
                    return Err(error(io::ErrorKind::AlreadyExists, "file exists", &path));
                }
                Some(_) => {
                    return Err(error(io::ErrorKind::NotADirectory, "not a directory", &current));
                }
                None => {
                    state.insert(current.clone(), FakeNode::new(FakeKind::Dir, mode));
                }
            }
        }
        Ok(())
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        let link = normalize(link);
        let mut state = self.state();
        if state.entries.contains_key(&link) {
            return Err(error(io::ErrorKind::AlreadyExists, "file exists", &link));
        }
        state.check_parent(&link)?;
        state.insert(
            link,
            FakeNode::new(FakeKind::Symlink(original.to_path_buf()), 0o777),
        );
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut state = self.state();
        let resolved = state.resolve(&normalize(path));
        let ino = state.entries.get(&resolved).copied();
        match ino.and_then(|ino| state.nodes.get_mut(&ino)) {
            Some(node) => {
                node.mode = mode & 0o7777;
                Ok(())
            }
            None => Err(not_found(path)),
        }
    }

    fn set_times(&self, path: &Path, accessed: SystemTime, modified: SystemTime) -> io::Result<()> {
        let mut state = self.state();
        let resolved = state.resolve(&normalize(path));
        let ino = state.entries.get(&resolved).copied();
        match ino.and_then(|ino| state.nodes.get_mut(&ino)) {
            Some(node) => {
                node.accessed = accessed;
                node.modified = modified;
                Ok(())
            }
            None => Err(not_found(path)),
        }
    }

    fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        Some(self.config_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_roundtrip() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/tmp/hello.txt", "hello world");
        assert_eq!(
            fs.read_to_string(Path::new("/tmp/hello.txt")).unwrap(),
            "hello world"
        );
        assert!(fs.exists(Path::new("/tmp/hello.txt")));
        assert!(fs.is_file(Path::new("/tmp/hello.txt")));
        assert!(!fs.is_dir(Path::new("/tmp/hello.txt")));
    }

    #[test]
    fn test_write_and_read() {
        let fs = FakeFs::new("/home/test");
        fs.write(Path::new("/tmp/out.txt"), b"written").unwrap();
        assert_eq!(
            fs.read_to_string(Path::new("/tmp/out.txt")).unwrap(),
            "written"
        );
    }

    #[test]
    fn test_create_requires_parent() {
        let fs = FakeFs::new("/home/test");
        let err = fs.write(Path::new("/missing/out.txt"), b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_exclusive_create() {
        let fs = FakeFs::new("/home/test");
        let opts = OpenOptions::new().write(true).create_new(true);
        fs.open_file(Path::new("/tmp/lock"), &opts).unwrap();
        let err = fs.open_file(Path::new("/tmp/lock"), &opts).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let fs = FakeFs::new("/home/test");
        fs.write(Path::new("baz"), b"rel").unwrap();
        assert_eq!(fs.read(Path::new("/baz")).unwrap(), b"rel");
        assert_eq!(fs.read(Path::new("./tmp/../baz")).unwrap(), b"rel");
    }

    #[test]
    fn test_symlink_resolution() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/real/file.txt", "content");
        fs.add_symlink("/link", "/real/file.txt");

        assert!(fs.symlink_metadata(Path::new("/link")).unwrap().is_symlink());
        assert!(fs.metadata(Path::new("/link")).unwrap().is_file());
        assert_eq!(fs.read_to_string(Path::new("/link")).unwrap(), "content");
    }

    #[test]
    fn test_broken_symlink() {
        let fs = FakeFs::new("/home/test");
        fs.add_symlink("/broken", "/nonexistent");

        assert!(fs.symlink_metadata(Path::new("/broken")).is_ok());
        assert!(!fs.exists(Path::new("/broken")));
    }

    #[test]
    fn test_file_permissions() {
        let fs = FakeFs::new("/home/test");
        fs.add_file_with_mode("/tmp/script.sh", "#!/bin/bash", 0o755);

        assert_eq!(fs.metadata(Path::new("/tmp/script.sh")).unwrap().mode, 0o755);
        fs.set_mode(Path::new("/tmp/script.sh"), 0o644).unwrap();
        assert_eq!(fs.metadata(Path::new("/tmp/script.sh")).unwrap().mode, 0o644);
    }

    #[test]
    fn test_remove_file() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/tmp/gone.txt", "bye");

        fs.remove_file(Path::new("/tmp/gone.txt")).unwrap();
        assert!(!fs.exists(Path::new("/tmp/gone.txt")));
        let err = fs.remove_file(Path::new("/tmp/gone.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_remove_dir_nonempty_fails() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/tmp/dir/file.txt", "x");

        assert!(fs.remove_dir(Path::new("/tmp/dir")).is_err());
        fs.remove_dir_all(Path::new("/tmp/dir")).unwrap();
        assert!(!fs.exists(Path::new("/tmp/dir")));
        assert!(!fs.exists(Path::new("/tmp/dir/file.txt")));
    }

    #[test]
    fn test_rename_keeps_inode() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/tmp/old.txt", "data");
        let ino = fs.metadata(Path::new("/tmp/old.txt")).unwrap().ino;

        fs.rename(Path::new("/tmp/old.txt"), Path::new("/tmp/new.txt"))
            .unwrap();
        assert!(!fs.exists(Path::new("/tmp/old.txt")));
        assert_eq!(fs.metadata(Path::new("/tmp/new.txt")).unwrap().ino, ino);
    }

    #[test]
    fn test_rename_directory_moves_descendants() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/src/a/b.txt", "b");
        fs.add_dir("/dst");

        fs.rename(Path::new("/src/a"), Path::new("/dst/a")).unwrap();
        assert_eq!(fs.read(Path::new("/dst/a/b.txt")).unwrap(), b"b");
        assert!(!fs.exists(Path::new("/src/a")));
    }

    #[test]
    fn test_rename_onto_nonempty_dir_fails() {
        let fs = FakeFs::new("/home/test");
        fs.add_dir("/a");
        fs.add_file("/b/keep.txt", "k");

        let err = fs.rename(Path::new("/a"), Path::new("/b")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::DirectoryNotEmpty);
    }

    #[test]
    fn test_hard_link_shares_content() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/tmp/a", "one");
        fs.hard_link(Path::new("/tmp/a"), Path::new("/tmp/b")).unwrap();
        fs.remove_file(Path::new("/tmp/a")).unwrap();
        assert_eq!(fs.read(Path::new("/tmp/b")).unwrap(), b"one");

        fs.add_file("/tmp/c", "c");
        let err = fs
            .hard_link(Path::new("/tmp/c"), Path::new("/tmp/b"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_read_dir_sorted() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/root/b.txt", "b");
        fs.add_file("/root/a.txt", "a");
        fs.add_file("/root/sub/deep.txt", "d");

        let names: Vec<_> = fs
            .read_dir(Path::new("/root"))
            .unwrap()
            .into_iter()
            .map(|e| e.file_name.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.txt", "b.txt", "sub"]);
    }

    #[test]
    fn test_simulated_failures() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/tmp/a", "a");
        fs.set_failing(FakeOp::Rename, true);
        assert!(fs.rename(Path::new("/tmp/a"), Path::new("/tmp/b")).is_err());
        fs.set_failing(FakeOp::Rename, false);
        fs.rename(Path::new("/tmp/a"), Path::new("/tmp/b")).unwrap();

        fs.set_failing(FakeOp::Write, true);
        assert!(fs.write(Path::new("/tmp/c"), b"c").is_err());
    }

    #[test]
    fn test_auto_creates_parents() {
        let fs = FakeFs::new("/home/test");
        fs.add_file("/a/b/c/d.txt", "deep");

        assert!(fs.is_dir(Path::new("/a")));
        assert!(fs.is_dir(Path::new("/a/b")));
        assert!(fs.is_dir(Path::new("/a/b/c")));
        assert!(fs.is_file(Path::new("/a/b/c/d.txt")));
    }

    #[test]
    fn test_clones_share_state() {
        let fs = FakeFs::new("/home/test");
        let other = fs.clone();
        other.add_file("/tmp/shared", "s");
        assert!(fs.exists(Path::new("/tmp/shared")));
    }
}
