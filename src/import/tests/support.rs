//! Fixtures for building dumps and archives on disk.

use flate2::Compression;
use flate2::GzBuilder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

pub(super) const DUMP_BODY: &str = "CREATE TABLE t (id INT);\nINSERT INTO t VALUES (1);\n";

pub(super) fn write_plain(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, DUMP_BODY).expect("write dump");
    path
}

pub(super) fn write_zip(dir: &Path, name: &str, members: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = zip::ZipWriter::new(File::create(&path).expect("create zip"));
    writer
        .add_directory("nested/", SimpleFileOptions::default())
        .expect("add directory");
    for member in members {
        writer
            .start_file(*member, SimpleFileOptions::default())
            .expect("start member");
        writer.write_all(DUMP_BODY.as_bytes()).expect("write member");
    }
    writer.finish().expect("finish zip");
    path
}

pub(super) fn write_tar_gz(dir: &Path, name: &str, members: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let encoder = GzEncoder::new(File::create(&path).expect("create tgz"), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for member in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(DUMP_BODY.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, member, DUMP_BODY.as_bytes())
            .expect("append member");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip");
    path
}

pub(super) fn write_gzip(dir: &Path, name: &str, member: Option<&str>) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("create gz");
    let builder = member.map_or_else(GzBuilder::new, |inner| GzBuilder::new().filename(inner));
    let mut encoder = builder.write(file, Compression::default());
    encoder.write_all(DUMP_BODY.as_bytes()).expect("write gz");
    encoder.finish().expect("finish gz");
    path
}
