//! LZ4 compression of rotated files
//!
//! Rotated-away files are rewritten as an LZ4 frame next to the original,
//! which is removed once the compressed copy is complete.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use lz4_flex::frame::FrameEncoder;

/// Extension appended to compressed files
pub const COMPRESSED_EXTENSION: &str = "lz4";

/// `app.log` -> `app.log.lz4`
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(COMPRESSED_EXTENSION);
    PathBuf::from(name)
}

/// Compress `path` into `<path>.lz4` and remove the original
///
/// Blocking; run it off the async runtime. On failure the original file is
/// left untouched and a partial target is removed.
pub fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let target = compressed_path(path);

    if let Err(e) = write_compressed(path, &target) {
        let _ = fs::remove_file(&target);
        return Err(e);
    }

    fs::remove_file(path)?;
    Ok(target)
}

fn write_compressed(source: &Path, target: &Path) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut encoder = FrameEncoder::new(BufWriter::new(File::create(target)?));

    io::copy(&mut reader, &mut encoder)?;

    let mut out = encoder.finish().map_err(io::Error::other)?;
    out.flush()?;
    out.get_ref().sync_all()
}
