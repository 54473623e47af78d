//! Decoder for Direct3D shader bytecode.
//!
//! Two encodings share one entry point: SM4/SM5 token streams inside a DXBC
//! container, and bare legacy SM1-SM3 streams. Both decode into the IR of
//! the `dxbc-ir` crate.
//!
//! ```no_run
//! # fn load() -> Vec<u8> { Vec::new() }
//! let bytes = load();
//! let info = dxbc_ir::ShaderInfo::default();
//! match dxbc_decode::decode(&bytes, &info) {
//!     Ok(Some(shader)) => println!("{:?} shader", shader.shader_type),
//!     Ok(None) => println!("not a shader blob"),
//!     Err(err) => eprintln!("decode failed: {err}"),
//! }
//! ```

pub mod container;
mod cursor;
mod decl;
mod dx9;
mod error;
mod inst;
mod operand;
mod phase;

pub use container::{Chunk, Container, chunk_words};
pub use error::{DecodeError, Result};
pub use phase::decode_tokens;

use dxbc_ir::{ShaderData, ShaderInfo};

/// Decode a shader blob. A DXBC container yields its shader chunk; anything
/// else is tried as a legacy stream. `Ok(None)` when the blob is neither, or
/// is a container without a shader chunk.
pub fn decode(bytes: &[u8], info: &ShaderInfo) -> Result<Option<ShaderData>> {
    if let Some(container) = Container::parse(bytes)? {
        container.warn_unknown_chunks();
        let Some(chunk) = container.shader_chunk() else {
            return Ok(None);
        };
        let words = chunk_words(chunk.data);
        return decode_tokens(&words, info).map(Some);
    }
    let words = chunk_words(bytes);
    dx9::decode_dx9(&words, info)
}
