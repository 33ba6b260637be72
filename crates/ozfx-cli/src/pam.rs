//! Netpbm PAM output

use std::io::{self, Write};

use ozfx_formats::raster::PixelBuffer;

/// Write `pixels` as a `P7` image with `RGB_ALPHA` tuples
pub fn write_pam<W: Write>(writer: &mut W, pixels: &PixelBuffer) -> io::Result<()> {
    write!(
        writer,
        "P7\nWIDTH {}\nHEIGHT {}\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n",
        pixels.width(),
        pixels.height()
    )?;
    writer.write_all(&pixels.to_rgba_bytes())?;
    writer.flush()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_samples() {
        let pixels = PixelBuffer::from_pixels(2, 1, vec![0xFF10_2030, 0x8000_00FF]).unwrap();
        let mut out = Vec::new();
        write_pam(&mut out, &pixels).unwrap();

        let header = b"P7\nWIDTH 2\nHEIGHT 1\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(
            &out[header.len()..],
            &[0x10, 0x20, 0x30, 0xFF, 0x00, 0x00, 0xFF, 0x80]
        );
    }
}
