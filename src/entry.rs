//! Entry classification, type masks and per-entry metadata

use std::borrow::Cow;
use std::fmt;
use std::fs::{self, FileType, Metadata};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use crate::error::{Error, Result};

/// Kind of a filesystem node, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Regular,
    Directory,
    Symlink,
    BlockDevice,
    Fifo,
    Socket,
    CharacterDevice,
}

impl EntryType {
    pub const ALL: [EntryType; 7] = [
        EntryType::Regular,
        EntryType::Directory,
        EntryType::Symlink,
        EntryType::BlockDevice,
        EntryType::Fifo,
        EntryType::Socket,
        EntryType::CharacterDevice,
    ];

    /// Classify a file type. Returns `None` for kinds outside the closed set.
    pub fn classify(ft: FileType) -> Option<Self> {
        if ft.is_symlink() {
            return Some(Self::Symlink);
        }
        if ft.is_dir() {
            return Some(Self::Directory);
        }
        if ft.is_file() {
            return Some(Self::Regular);
        }
        classify_special(ft)
    }

    /// Name used by the `%1%` template field.
    pub fn name(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::BlockDevice => "block_device",
            Self::Fifo => "fifo",
            Self::Socket => "socket",
            Self::CharacterDevice => "character_device",
        }
    }

    /// Single-character code used in type mask strings.
    pub fn code(self) -> char {
        match self {
            Self::Regular => 'f',
            Self::Directory => 'd',
            Self::Symlink => 's',
            Self::BlockDevice => 'b',
            Self::Fifo => 'i',
            Self::Socket => 'k',
            Self::CharacterDevice => 'c',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == c)
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Regular => 1,
            Self::Directory => 1 << 1,
            Self::Symlink => 1 << 2,
            Self::BlockDevice => 1 << 3,
            Self::Fifo => 1 << 4,
            Self::Socket => 1 << 5,
            Self::CharacterDevice => 1 << 6,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(unix)]
fn classify_special(ft: FileType) -> Option<EntryType> {
    use std::os::unix::fs::FileTypeExt;

    if ft.is_block_device() {
        Some(EntryType::BlockDevice)
    } else if ft.is_char_device() {
        Some(EntryType::CharacterDevice)
    } else if ft.is_fifo() {
        Some(EntryType::Fifo)
    } else if ft.is_socket() {
        Some(EntryType::Socket)
    } else {
        None
    }
}

#[cfg(not(unix))]
fn classify_special(_ft: FileType) -> Option<EntryType> {
    None
}

/// Set of entry types eligible for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMask(u8);

impl TypeMask {
    pub const EMPTY: TypeMask = TypeMask(0);
    pub const ALL: TypeMask = TypeMask(0b0111_1111);

    pub const fn only(ty: EntryType) -> Self {
        Self(ty.bit())
    }

    pub const fn with(self, ty: EntryType) -> Self {
        Self(self.0 | ty.bit())
    }

    pub const fn contains(self, ty: EntryType) -> bool {
        self.0 & ty.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every type in `self` is also in `other`.
    pub const fn is_subset(self, other: TypeMask) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = EntryType> {
        EntryType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl Default for TypeMask {
    fn default() -> Self {
        Self::only(EntryType::Regular)
    }
}

impl FromStr for TypeMask {
    type Err = Error;

    /// Parse a mask from type codes (`f s d b i k c`) or the wildcard `a`.
    fn from_str(s: &str) -> Result<Self> {
        let mut mask = TypeMask::EMPTY;
        for c in s.chars() {
            mask = match c {
                'a' => TypeMask::ALL,
                c => mask.with(EntryType::from_code(c).ok_or(Error::InvalidTypeMask(c))?),
            };
        }
        if mask.is_empty() {
            return Err(Error::EmptyTypeMask);
        }
        Ok(mask)
    }
}

impl fmt::Display for TypeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == TypeMask::ALL {
            return f.write_str("a");
        }
        self.iter().try_for_each(|t| write!(f, "{}", t.code()))
    }
}

/// A filesystem node visited by the walker.
///
/// Metadata is resolved once with `lstat` and shared by classification,
/// filtering and formatting. Instances live only for one visitor call.
#[derive(Debug)]
pub struct VisitedEntry {
    path: PathBuf,
    depth: usize,
    kind: EntryType,
    metadata: Metadata,
}

impl VisitedEntry {
    /// Stat and classify `path` without following symlinks.
    pub fn resolve(path: PathBuf, depth: usize) -> Result<Self> {
        let metadata = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(source) => return Err(Error::Stat { path, source }),
        };
        let Some(kind) = EntryType::classify(metadata.file_type()) else {
            return Err(Error::Unclassified(path));
        };
        Ok(Self {
            path,
            depth,
            kind,
            metadata,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path as raw bytes, exactly as the filesystem reported it.
    #[cfg(unix)]
    pub fn path_bytes(&self) -> Cow<'_, [u8]> {
        use std::os::unix::ffi::OsStrExt;

        Cow::Borrowed(self.path.as_os_str().as_bytes())
    }

    /// Path as bytes; names that are not valid Unicode are converted lossily.
    #[cfg(not(unix))]
    pub fn path_bytes(&self) -> Cow<'_, [u8]> {
        match self.path.to_string_lossy() {
            Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
            Cow::Owned(s) => Cow::Owned(s.into_bytes()),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn kind(&self) -> EntryType {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.metadata.len()
    }

    pub fn accessed(&self) -> Result<SystemTime> {
        self.metadata
            .accessed()
            .map_err(|source| self.unavailable("last access", source))
    }

    pub fn modified(&self) -> Result<SystemTime> {
        self.metadata
            .modified()
            .map_err(|source| self.unavailable("last modification", source))
    }

    /// Time of the last inode status change.
    #[cfg(unix)]
    pub fn status_changed(&self) -> Result<SystemTime> {
        use std::os::unix::fs::MetadataExt;
        use std::time::{Duration, UNIX_EPOCH};

        let secs = self.metadata.ctime();
        let nanos = u32::try_from(self.metadata.ctime_nsec()).unwrap_or(0);
        let time = if secs >= 0 {
            UNIX_EPOCH + Duration::new(secs.unsigned_abs(), nanos)
        } else {
            UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()) + Duration::from_nanos(nanos.into())
        };
        Ok(time)
    }

    #[cfg(not(unix))]
    pub fn status_changed(&self) -> Result<SystemTime> {
        Err(self.unavailable(
            "last status change",
            std::io::Error::from(std::io::ErrorKind::Unsupported),
        ))
    }

    /// Permission bits as a symbolic `rwxrwxrwx` string.
    pub fn permissions(&self) -> String {
        permission_string(&self.metadata)
    }

    fn unavailable(&self, field: &'static str, source: std::io::Error) -> Error {
        Error::MetadataUnavailable {
            path: self.path.clone(),
            field,
            source,
        }
    }
}

#[cfg(unix)]
fn permission_string(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    format_mode(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn permission_string(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() {
        "r--r--r--".to_string()
    } else {
        "rw-rw-rw-".to_string()
    }
}

/// Render the low twelve mode bits the way `ls -l` does.
pub fn format_mode(mode: u32) -> String {
    const SETUID: u32 = 0o4000;
    const SETGID: u32 = 0o2000;
    const STICKY: u32 = 0o1000;

    let special = [(SETUID, 's'), (SETGID, 's'), (STICKY, 't')];
    let mut out = String::with_capacity(9);

    for (class, (special_bit, special_char)) in special.into_iter().enumerate() {
        let shift = 6 - class * 3;
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        let exec = bits & 0o1 != 0;
        out.push(match (mode & special_bit != 0, exec) {
            (true, true) => special_char,
            (true, false) => special_char.to_ascii_uppercase(),
            (false, true) => 'x',
            (false, false) => '-',
        });
    }
    out
}
