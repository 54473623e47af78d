use dxbc_ir::TextureSampler;
use thiserror::Error;

/// Errors from decoding a shader blob. Offsets are in 32-bit words from the
/// start of the token stream.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A read ran past the end of the token stream.
    #[error("token stream truncated at word {offset}")]
    Truncated { offset: usize },

    /// Raw opcode value not in the opcode table.
    #[error("invalid opcode {value:#x} at word {offset}")]
    InvalidOpcode { offset: usize, value: u32 },

    /// An instruction-length field that cannot be right (zero, or pointing
    /// before the words already consumed).
    #[error("invalid instruction length {length} at word {offset}")]
    InvalidLength { offset: usize, length: u32 },

    #[error("invalid operand type {value:#x} at word {offset}")]
    InvalidOperandType { offset: usize, value: u32 },

    #[error("invalid index representation {value} at word {offset}")]
    InvalidIndexRepresentation { offset: usize, value: u32 },

    /// Catch-all for the remaining closed enums (selection mode, modifier,
    /// resource dimension, interpolation mode, ...).
    #[error("invalid {field} value {value:#x} at word {offset}")]
    InvalidField {
        field: &'static str,
        offset: usize,
        value: u32,
    },

    /// A texture register paired with two different samplers within one
    /// shader.
    #[error("texture t{texture} already paired with {bound:?}, instruction requests {requested:?}")]
    SamplerBindingConflict {
        texture: u32,
        bound: TextureSampler,
        requested: TextureSampler,
    },

    /// Legacy stream opcode this decoder does not handle.
    #[error("unsupported legacy opcode {value:#x} at word {offset}")]
    UnsupportedDx9Opcode { offset: usize, value: u32 },

    #[error("invalid legacy register type {value} at word {offset}")]
    InvalidDx9RegisterType { offset: usize, value: u32 },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
