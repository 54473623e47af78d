//! Hand-assembled token streams for the decoder tests.

#![allow(dead_code)]

use dxbc_tokens::{IDENTITY_SWIZZLE, Opcode, OperandType, ShaderType};

// --- SM4/SM5 streams ---------------------------------------------------------

pub fn version_token(shader_type: ShaderType, major: u32, minor: u32) -> u32 {
    minor | (major << 4) | ((shader_type as u32) << 16)
}

/// Opcode token with the word count in [30:24].
pub fn op(opcode: Opcode, length: u32) -> u32 {
    opcode as u32 | (length << 24)
}

/// A full token stream: version word, declared length, then the body.
pub fn program(shader_type: ShaderType, body: &[u32]) -> Vec<u32> {
    let mut words = vec![
        version_token(shader_type, 5, 0),
        body.len() as u32 + 2,
    ];
    words.extend_from_slice(body);
    words
}

fn register_token0(ty: OperandType, selection: u32) -> u32 {
    2 | selection | ((ty as u32) << 12) | (1 << 20)
}

/// 4-component destination with a write mask and one immediate index.
pub fn dest(ty: OperandType, register: u32, mask: u32) -> Vec<u32> {
    vec![register_token0(ty, mask << 4), register]
}

/// 4-component identity-swizzled source with one immediate index.
pub fn src(ty: OperandType, register: u32) -> Vec<u32> {
    src_swizzled(ty, register, IDENTITY_SWIZZLE)
}

pub fn src_swizzled(ty: OperandType, register: u32, swizzle: u32) -> Vec<u32> {
    vec![register_token0(ty, (1 << 2) | (swizzle << 4)), register]
}

pub fn src_select1(ty: OperandType, register: u32, channel: u32) -> Vec<u32> {
    vec![register_token0(ty, (2 << 2) | (channel << 4)), register]
}

/// Source with an extension token carrying a modifier and min precision.
pub fn src_modified(ty: OperandType, register: u32, modifier: u32, precision: u32) -> Vec<u32> {
    vec![
        register_token0(ty, (1 << 2) | (IDENTITY_SWIZZLE << 4)) | 0x8000_0000,
        1 | (modifier << 6) | (precision << 14),
        register,
    ]
}

/// Two-dimensional constant-buffer source (buffer index, register index).
pub fn src_cb(buffer: u32, register: u32) -> Vec<u32> {
    vec![
        2 | (1 << 2)
            | (IDENTITY_SWIZZLE << 4)
            | ((OperandType::ConstantBuffer as u32) << 12)
            | (2 << 20),
        buffer,
        register,
    ]
}

/// Source whose index is imm32 + a relative sub-operand.
pub fn src_relative(ty: OperandType, register: u32, sub: &[u32]) -> Vec<u32> {
    let mut words = vec![
        register_token0(ty, (1 << 2) | (IDENTITY_SWIZZLE << 4)) | (3 << 22),
        register,
    ];
    words.extend_from_slice(sub);
    words
}

pub fn imm32(values: [u32; 4]) -> Vec<u32> {
    let mut words = vec![2 | (0xF << 4) | ((OperandType::Immediate32 as u32) << 12)];
    words.extend_from_slice(&values);
    words
}

pub fn imm32_scalar(value: u32) -> Vec<u32> {
    vec![1 | ((OperandType::Immediate32 as u32) << 12), value]
}

// --- container blobs ---------------------------------------------------------

/// Assemble a DXBC blob from FourCC-tagged chunk payloads.
pub fn container(chunks: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let header_len = 32 + 4 * chunks.len();
    let mut offsets = Vec::with_capacity(chunks.len());
    let mut running = header_len;
    for (_, data) in chunks {
        offsets.push(running as u32);
        running += 8 + data.len();
    }

    let mut bytes = Vec::with_capacity(running);
    bytes.extend_from_slice(b"DXBC");
    bytes.extend_from_slice(&[0u8; 16]); // digest
    bytes.extend_from_slice(&1u32.to_le_bytes()); // format version
    bytes.extend_from_slice(&(running as u32).to_le_bytes());
    bytes.extend_from_slice(&(chunks.len() as u32).to_le_bytes());
    for offset in offsets {
        bytes.extend_from_slice(&offset.to_le_bytes());
    }
    for (fourcc, data) in chunks {
        bytes.extend_from_slice(fourcc);
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(data);
    }
    bytes
}

pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

// --- legacy SM1-SM3 streams --------------------------------------------------

pub const VS_3_0: u32 = 0xFFFE_0300;
pub const VS_2_0: u32 = 0xFFFE_0200;
pub const PS_2_0: u32 = 0xFFFF_0200;

/// Legacy opcode token with the parameter count in [27:24].
pub fn dx9_op(opcode: u32, params: u32) -> u32 {
    opcode | (params << 24)
}

fn dx9_register_bits(register_type: u32, register: u32) -> u32 {
    0x8000_0000 | ((register_type & 7) << 28) | (((register_type >> 3) & 3) << 11) | register
}

/// Legacy destination parameter with a write mask in [19:16].
pub fn dx9_dest(register_type: u32, register: u32, mask: u32) -> u32 {
    dx9_register_bits(register_type, register) | (mask << 16)
}

/// Legacy identity-swizzled source parameter.
pub fn dx9_src(register_type: u32, register: u32) -> u32 {
    dx9_register_bits(register_type, register) | (IDENTITY_SWIZZLE << 16)
}

pub fn dx9_src_modified(register_type: u32, register: u32, modifier: u32) -> u32 {
    dx9_src(register_type, register) | (modifier << 24)
}

/// A legacy stream: version word, body, end token.
pub fn dx9_program(version: u32, body: &[u32]) -> Vec<u32> {
    let mut words = vec![version];
    words.extend_from_slice(body);
    words.push(0x0000_FFFF);
    words
}
