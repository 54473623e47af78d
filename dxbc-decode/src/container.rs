//! DXBC container scan.
//!
//! The container is a FourCC-tagged chunk table. Only the shader chunk is
//! decoded here; reflection chunk payloads are handed back to the caller and
//! unknown FourCCs are skipped.

use log::{debug, warn};

use crate::error::{DecodeError, Result};

pub const DXBC_MAGIC: [u8; 4] = *b"DXBC";

/// Shader token-stream chunks: SM4 and SM5 respectively.
pub const SHADER_FOURCCS: [[u8; 4]; 2] = [*b"SHDR", *b"SHEX"];

/// Reflection chunks the scanner locates but does not parse.
pub const REFLECTION_FOURCCS: [[u8; 4]; 9] = [
    *b"RDEF", *b"ISGN", *b"OSGN", *b"IFCE", *b"PSGN", *b"ISG1", *b"OSG1", *b"OSG5", *b"FX10",
];

/// One chunk of the container, borrowing its payload from the input blob.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub fourcc: [u8; 4],
    pub data: &'a [u8],
}

/// Parsed chunk table of a DXBC blob.
#[derive(Debug)]
pub struct Container<'a> {
    pub chunks: Vec<Chunk<'a>>,
}

fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(DecodeError::Truncated { offset: offset / 4 })
}

impl<'a> Container<'a> {
    /// Scan the chunk table. `Ok(None)` when the blob does not start with
    /// the DXBC magic.
    pub fn parse(bytes: &'a [u8]) -> Result<Option<Self>> {
        if bytes.len() < 4 || bytes[..4] != DXBC_MAGIC {
            return Ok(None);
        }
        // Header: magic, 16-byte digest, format version word, total size,
        // chunk count, then one offset per chunk.
        let chunk_count = read_u32_le(bytes, 28)? as usize;
        let mut chunks = Vec::with_capacity(chunk_count);
        for i in 0..chunk_count {
            let chunk_offset = read_u32_le(bytes, 32 + 4 * i)? as usize;
            let fourcc_word = read_u32_le(bytes, chunk_offset)?;
            let size = read_u32_le(bytes, chunk_offset + 4)? as usize;
            let data = bytes
                .get(chunk_offset + 8..chunk_offset + 8 + size)
                .ok_or(DecodeError::Truncated { offset: (chunk_offset + 8) / 4 })?;
            chunks.push(Chunk {
                fourcc: fourcc_word.to_le_bytes(),
                data,
            });
        }
        debug!("container holds {} chunks", chunks.len());
        Ok(Some(Self { chunks }))
    }

    /// The SM4/SM5 token-stream chunk, if the container carries one.
    pub fn shader_chunk(&self) -> Option<&Chunk<'a>> {
        self.chunks
            .iter()
            .find(|chunk| SHADER_FOURCCS.contains(&chunk.fourcc))
    }

    /// Reflection chunks in table order, for the caller to parse.
    pub fn reflection_chunks(&self) -> impl Iterator<Item = &Chunk<'a>> {
        self.chunks
            .iter()
            .filter(|chunk| REFLECTION_FOURCCS.contains(&chunk.fourcc))
    }

    /// Log chunks that are neither shader nor reflection; they are skipped.
    pub fn warn_unknown_chunks(&self) {
        for chunk in &self.chunks {
            if !SHADER_FOURCCS.contains(&chunk.fourcc)
                && !REFLECTION_FOURCCS.contains(&chunk.fourcc)
            {
                warn!(
                    "skipping unknown chunk {:?} ({} bytes)",
                    chunk.fourcc.map(|b| b as char),
                    chunk.data.len()
                );
            }
        }
    }
}

/// Reinterpret a chunk payload as a token stream. The shader chunk is a
/// whole number of little-endian words.
pub fn chunk_words(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
