//! Archive extraction.
//!
//! Archives are flattened: only regular files are written, each under its
//! bare file name, so entries can never escape the destination directory.

use crate::import::domain::{ArchiveFormat, ImportError, ImportResult};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Unpacks `archive` into `destination` and returns the files written.
///
/// Blocking; run it on a blocking thread.
///
/// # Errors
///
/// Returns [`ImportError::ArchiveNotSupported`] for unsupported formats and
/// [`ImportError::Extract`] for corrupt archives or write failures.
pub fn extract_archive(
    format: &ArchiveFormat,
    archive: &Path,
    destination: &Path,
) -> ImportResult<Vec<PathBuf>> {
    std::fs::create_dir_all(destination)?;
    let files = match format {
        ArchiveFormat::Zip => unpack_zip(archive, destination)?,
        ArchiveFormat::Tar => unpack_tar(open(archive)?, destination)?,
        ArchiveFormat::TarGz => unpack_tar(GzDecoder::new(open(archive)?), destination)?,
        ArchiveFormat::Gzip => {
            unpack_gzip(GzDecoder::new(open(archive)?), archive, destination)?
        }
        ArchiveFormat::Unsupported(extension) => {
            return Err(ImportError::ArchiveNotSupported(extension.clone()));
        }
    };
    debug!(archive = %archive.display(), count = files.len(), "extracted archive");
    Ok(files)
}

fn open(path: &Path) -> ImportResult<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn unpack_zip(archive: &Path, destination: &Path) -> ImportResult<Vec<PathBuf>> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?).map_err(ImportError::extract)?;
    let mut files = Vec::new();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(ImportError::extract)?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = entry
            .enclosed_name()
            .and_then(|path| path.file_name().map(ToOwned::to_owned))
        else {
            continue;
        };
        let target = destination.join(name);
        let mut out = File::create(&target).map_err(ImportError::extract)?;
        std::io::copy(&mut entry, &mut out).map_err(ImportError::extract)?;
        files.push(target);
    }
    Ok(files)
}

fn unpack_tar(reader: impl Read, destination: &Path) -> ImportResult<Vec<PathBuf>> {
    let mut archive = tar::Archive::new(reader);
    let mut files = Vec::new();
    for item in archive.entries().map_err(ImportError::extract)? {
        let mut entry = item.map_err(ImportError::extract)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let entry_path = entry.path().map_err(ImportError::extract)?.into_owned();
        let Some(name) = entry_path.file_name() else {
            continue;
        };
        let target = destination.join(name);
        entry.unpack(&target).map_err(ImportError::extract)?;
        files.push(target);
    }
    Ok(files)
}

fn unpack_gzip<R: Read>(
    mut decoder: GzDecoder<R>,
    archive: &Path,
    destination: &Path,
) -> ImportResult<Vec<PathBuf>> {
    let member = gzip_member_name(&decoder, archive);
    if member.to_ascii_lowercase().ends_with(".tar") {
        return unpack_tar(decoder, destination);
    }
    let target = destination.join(member);
    let mut out = File::create(&target).map_err(ImportError::extract)?;
    std::io::copy(&mut decoder, &mut out).map_err(ImportError::extract)?;
    Ok(vec![target])
}

/// Name of the file inside a gzip stream: the header's original name when
/// present, otherwise the archive name without its `.gz` suffix.
fn gzip_member_name<R>(decoder: &GzDecoder<R>, archive: &Path) -> String {
    decoder
        .header()
        .and_then(|header| header.filename())
        .map(|raw| String::from_utf8_lossy(raw).into_owned())
        .and_then(|name| {
            Path::new(&name)
                .file_name()
                .map(|base| base.to_string_lossy().into_owned())
        })
        .or_else(|| {
            archive
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "dump".to_owned())
}
