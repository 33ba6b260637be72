//! Fixed file headers of OZF2 and OZFX3 images

use binrw::io::{Cursor, Read, Seek, SeekFrom};
use binrw::{BinRead, BinWrite};
use ozfx_crypto::{KEY_BLOCK_SIZE, XorCipher, derive_stream_key};

use super::error::{ContainerError, ContainerResult};
use crate::tile::EncodingVariant;

/// Magic of plain OZF2 files
pub const OZF2_MAGIC: u16 = 0x7778;

/// Magic of encrypted OZFX3 files
pub const OZFX3_MAGIC: u16 = 0x7780;

/// Size of the OZF2 file header in bytes
pub const OZF2_HEADER_SIZE: usize = 54;

/// Size of the OZFX3 file header in bytes
pub const OZFX3_HEADER_SIZE: usize = 16;

/// Position of the info block length byte in OZFX3 files
pub const OZFX3_INFOBLOCK_LEN_OFFSET: u64 = 14;

/// Position of the initial key byte in OZFX3 files
pub const OZFX3_INITIAL_KEY_OFFSET: u64 = 0xA2;

/// Key block position for an info block of the base length
const OZFX3_KEY_BLOCK_BASE: u64 = 165;

/// Info block length the key block base refers to
const OZFX3_INFOBLOCK_BASE_LEN: u64 = 150;

/// Kind of stream, identified by the file magic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Plain OZF2 stream
    Ozf2,
    /// Encrypted OZFX3 stream
    Ozfx3,
}

impl StreamKind {
    /// Identify a stream from its magic
    pub fn from_magic(magic: u16) -> ContainerResult<Self> {
        match magic {
            OZF2_MAGIC => Ok(Self::Ozf2),
            OZFX3_MAGIC => Ok(Self::Ozfx3),
            other => Err(ContainerError::UnknownMagic(other)),
        }
    }

    /// Magic written at the start of the file
    pub const fn magic(self) -> u16 {
        match self {
            Self::Ozf2 => OZF2_MAGIC,
            Self::Ozfx3 => OZFX3_MAGIC,
        }
    }

    /// Encoding variant of the stream's records
    pub const fn variant(self) -> EncodingVariant {
        match self {
            Self::Ozf2 => EncodingVariant::Plain,
            Self::Ozfx3 => EncodingVariant::Encrypted,
        }
    }

    /// Short name for display
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ozf2 => "ozf2",
            Self::Ozfx3 => "ozfx3",
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Read the magic at the start of the stream
pub fn read_magic<R: Read + Seek>(reader: &mut R) -> ContainerResult<u16> {
    reader.seek(SeekFrom::Start(0))?;
    let mut raw = [0u8; 2];
    reader.read_exact(&mut raw)?;
    Ok(u16::from_le_bytes(raw))
}

/// OZF2 file header at offset 0
#[derive(Debug, Clone, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct Ozf2Header {
    /// File magic, [`OZF2_MAGIC`]
    pub magic: u16,
    /// Unused
    pub reserved1: [u32; 4],
    /// Full image width in pixels
    pub width: u32,
    /// Full image height in pixels
    pub height: u32,
    /// Colour depth
    pub depth: u16,
    /// Bits per pixel
    pub bpp: u16,
    /// Unused
    pub reserved2: u32,
    /// Memory size hint
    pub memsiz: u32,
    /// Unused
    pub reserved3: [u32; 3],
    /// Format version
    pub version: u32,
}

impl Ozf2Header {
    /// Header for an image of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            magic: OZF2_MAGIC,
            width,
            height,
            depth: 1,
            bpp: 8,
            ..Self::default()
        }
    }
}

/// OZFX3 file header, stored as one ciphered block after the key block
#[derive(Debug, Clone, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct Ozfx3Header {
    /// Header size field
    pub size: u32,
    /// Full image width in pixels
    pub width: u32,
    /// Full image height in pixels
    pub height: u32,
    /// Colour depth
    pub depth: u16,
    /// Bits per pixel
    pub bpp: u16,
}

impl Ozfx3Header {
    /// Header for an image of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: OZFX3_HEADER_SIZE as u32,
            width,
            height,
            depth: 1,
            bpp: 8,
        }
    }

    /// Reject headers whose fields are negative when read as signed.
    ///
    /// A wrongly derived key almost always produces such values.
    pub fn validate(&self) -> ContainerResult<()> {
        let negative = (self.size as i32) < 0
            || (self.width as i32) < 0
            || (self.height as i32) < 0
            || (self.depth as i16) < 0
            || (self.bpp as i16) < 0;
        if negative {
            return Err(ContainerError::UndecodableHeader(format!(
                "size={} width={} height={} depth={} bpp={}",
                self.size as i32,
                self.width as i32,
                self.height as i32,
                self.depth as i16,
                self.bpp as i16
            )));
        }
        Ok(())
    }

    /// Decipher and parse a raw header block
    pub fn from_ciphered(raw: &[u8; OZFX3_HEADER_SIZE], cipher: &XorCipher) -> ContainerResult<Self> {
        let plain = cipher.decrypt(raw);
        Ok(Self::read(&mut Cursor::new(plain))?)
    }

    /// Serialize and cipher the header block
    pub fn to_ciphered(&self, cipher: &XorCipher) -> ContainerResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(OZFX3_HEADER_SIZE));
        self.write(&mut cursor)?;
        let mut bytes = cursor.into_inner();
        cipher.apply_keystream(&mut bytes);
        Ok(bytes)
    }
}

/// Position of the key block for a given info block length
pub const fn key_block_offset(bytes_per_infoblock: u8) -> u64 {
    OZFX3_KEY_BLOCK_BASE + bytes_per_infoblock as u64 - OZFX3_INFOBLOCK_BASE_LEN
}

/// Position of the OZFX3 file header for a given info block length
pub const fn ozfx3_header_offset(bytes_per_infoblock: u8) -> u64 {
    key_block_offset(bytes_per_infoblock) + KEY_BLOCK_SIZE as u64
}

/// Key material of an OZFX3 file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ozfx3KeyInfo {
    /// Info block length byte
    pub bytes_per_infoblock: u8,
    /// Initial key byte
    pub initial: u8,
    /// Derived stream key
    pub key: u8,
}

/// Read the key material of an OZFX3 file and derive its stream key
pub fn read_ozfx3_key<R: Read + Seek>(reader: &mut R) -> ContainerResult<Ozfx3KeyInfo> {
    let bytes_per_infoblock = read_byte_at(reader, OZFX3_INFOBLOCK_LEN_OFFSET)?;
    let initial = read_byte_at(reader, OZFX3_INITIAL_KEY_OFFSET)?;

    reader.seek(SeekFrom::Start(key_block_offset(bytes_per_infoblock)))?;
    let mut block = [0u8; KEY_BLOCK_SIZE];
    reader.read_exact(&mut block)?;

    let key = derive_stream_key(initial, &block)?;
    Ok(Ozfx3KeyInfo {
        bytes_per_infoblock,
        initial,
        key,
    })
}

fn read_byte_at<R: Read + Seek>(reader: &mut R, offset: u64) -> ContainerResult<u8> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}
