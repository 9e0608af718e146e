//! Screen capture to uncompressed true-color TGA.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::framebuffer::FrameBuffer;

const TGA_HEADER_LEN: usize = 18;
/// Image type 2: uncompressed true-color.
const TGA_TRUE_COLOR: u8 = 2;
/// Descriptor bit 5: rows are stored top to bottom.
const TGA_TOP_LEFT_ORIGIN: u8 = 0x20;

/// Encode `frame` as a 24-bit TGA image.
pub fn tga_bytes(frame: &FrameBuffer) -> io::Result<Vec<u8>> {
    let size = frame.size();
    let width = u16::try_from(size.width)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too wide for TGA"))?;
    let height = u16::try_from(size.height)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too tall for TGA"))?;

    let mut bytes = Vec::with_capacity(TGA_HEADER_LEN + frame.pixels().len() * 3);
    bytes.extend_from_slice(&[0, 0, TGA_TRUE_COLOR, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.push(24);
    bytes.push(TGA_TOP_LEFT_ORIGIN);

    for &pixel in frame.pixels() {
        let color = Rgb888::from(pixel);
        bytes.extend_from_slice(&[color.b(), color.g(), color.r()]);
    }
    Ok(bytes)
}

/// Write `frame` to `path` as a TGA file, replacing any existing file.
pub fn write_tga(frame: &FrameBuffer, path: &Path) -> io::Result<()> {
    let bytes = tga_bytes(frame)?;
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&bytes)?;
    out.flush()
}
