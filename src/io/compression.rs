//! Transparent decompression of input files.
//!
//! The codec is chosen from the file extension first and the leading magic
//! bytes second, so a renamed `customers.csv` that is really gzip still loads.
//! Built-in codecs depend on feature flags:
//! - **Gzip** (`.gz`, `.gzip`) via `flate2` (feature `compression-gzip`)
//! - **Zstd** (`.zst`, `.zstd`) via `zstd` (feature `compression-zstd`)
//!
//! With no feature enabled every input is read as plain text.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    #[cfg(feature = "compression-gzip")]
    Gzip,
    #[cfg(feature = "compression-zstd")]
    Zstd,
}

impl Codec {
    /// Codecs compiled into this build.
    pub const ENABLED: &'static [Self] = &[
        #[cfg(feature = "compression-gzip")]
        Self::Gzip,
        #[cfg(feature = "compression-zstd")]
        Self::Zstd,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "compression-gzip")]
            Self::Gzip => "gzip",
            #[cfg(feature = "compression-zstd")]
            Self::Zstd => "zstd",
        }
    }

    const fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "compression-gzip")]
            Self::Gzip => &[".gz", ".gzip"],
            #[cfg(feature = "compression-zstd")]
            Self::Zstd => &[".zst", ".zstd"],
        }
    }

    const fn magic(self) -> &'static [u8] {
        match self {
            #[cfg(feature = "compression-gzip")]
            Self::Gzip => &[0x1f, 0x8b],
            #[cfg(feature = "compression-zstd")]
            Self::Zstd => &[0x28, 0xb5, 0x2f, 0xfd],
        }
    }

    /// Codec matching the path's extension, case-insensitively.
    #[must_use]
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().to_string_lossy().to_lowercase();
        Self::ENABLED
            .iter()
            .copied()
            .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
    }

    /// Codec whose signature starts `head`.
    #[must_use]
    pub fn from_magic(head: &[u8]) -> Option<Self> {
        Self::ENABLED.iter().copied().find(|c| head.starts_with(c.magic()))
    }

    fn wrap_reader(self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        match self {
            #[cfg(feature = "compression-gzip")]
            Self::Gzip => Ok(Box::new(flate2::read::MultiGzDecoder::new(reader))),
            #[cfg(feature = "compression-zstd")]
            Self::Zstd => zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>),
        }
    }

    fn wrap_writer(self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn Write>> {
        match self {
            #[cfg(feature = "compression-gzip")]
            Self::Gzip => Ok(Box::new(flate2::write::GzEncoder::new(
                writer,
                flate2::Compression::default(),
            ))),
            #[cfg(feature = "compression-zstd")]
            Self::Zstd => zstd::stream::write::Encoder::new(writer, 3)
                .map(|e| Box::new(e.auto_finish()) as Box<dyn Write>),
        }
    }
}

/// Wrap `reader` with a decompressor if the path or content calls for one.
///
/// # Errors
/// Returns an error if the stream cannot be peeked or the decoder fails to start.
pub fn auto_detect_reader<R: Read + 'static>(reader: R, path_hint: impl AsRef<Path>) -> Result<Box<dyn Read>> {
    if let Some(codec) = Codec::from_extension(&path_hint) {
        return codec
            .wrap_reader(Box::new(reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    let mut buffered = BufReader::new(reader);
    let head = buffered.fill_buf().context("peek input header")?;
    if let Some(codec) = Codec::from_magic(head) {
        return codec
            .wrap_reader(Box::new(buffered))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }
    Ok(Box::new(buffered))
}

/// Wrap `writer` with a compressor chosen by extension; buffered plain otherwise.
///
/// # Errors
/// Returns an error if the encoder fails to start.
pub fn auto_detect_writer<W: Write + 'static>(writer: W, path_hint: impl AsRef<Path>) -> Result<Box<dyn Write>> {
    match Codec::from_extension(&path_hint) {
        Some(codec) => codec
            .wrap_writer(Box::new(writer))
            .with_context(|| format!("wrap writer with {} codec", codec.name())),
        None => Ok(Box::new(BufWriter::new(writer))),
    }
}

/// Open `path` for reading, decompressing as needed.
///
/// # Errors
/// Returns an error if the file cannot be opened or its codec fails to start.
pub fn open_reader(path: impl AsRef<Path>) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    auto_detect_reader(f, path).with_context(|| format!("setup decompression for {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_extension_is_not_compressed() {
        assert_eq!(Codec::from_extension("customers.csv"), None);
        assert_eq!(Codec::from_magic(b"uid,region"), None);
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_detected_by_extension_and_magic() {
        assert_eq!(Codec::from_extension("DATA.CSV.GZ"), Some(Codec::Gzip));
        assert_eq!(Codec::from_magic(&[0x1f, 0x8b, 0x08]), Some(Codec::Gzip));
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn zstd_detected_by_magic() {
        assert_eq!(Codec::from_magic(&[0x28, 0xb5, 0x2f, 0xfd, 0x00]), Some(Codec::Zstd));
    }
}
