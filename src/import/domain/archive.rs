//! Archive detection by file name.

use std::path::Path;

/// Container format of a downloaded dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.zip`
    Zip,
    /// `.gz` wrapping a single file
    Gzip,
    /// `.tar`
    Tar,
    /// `.tar.gz` or `.tgz`
    TarGz,
    /// A recognised archive extension this agent cannot unpack.
    Unsupported(String),
}

const UNSUPPORTED_EXTENSIONS: [&str; 7] = ["bz2", "xz", "zst", "7z", "rar", "tbz2", "txz"];

impl ArchiveFormat {
    /// Detects the archive format from the file name, returning `None` for
    /// files that are not archives at all.
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            return Some(Self::TarGz);
        }
        let extension = Path::new(&name).extension()?.to_string_lossy().into_owned();
        match extension.as_str() {
            "zip" => Some(Self::Zip),
            "gz" => Some(Self::Gzip),
            "tar" => Some(Self::Tar),
            other if UNSUPPORTED_EXTENSIONS.contains(&other) => {
                Some(Self::Unsupported(other.to_owned()))
            }
            _ => None,
        }
    }
}
