mod common;

use common::*;
use dxbc_decode::decode;
use dxbc_ir::{PhaseKind, ShaderInfo};
use dxbc_tokens::{Opcode, ShaderType};

fn minimal_shader() -> Vec<u8> {
    words_to_bytes(&program(ShaderType::Vertex, &[op(Opcode::Ret, 1)]))
}

#[test]
fn shex_chunk_decodes() {
    let blob = container(&[(*b"SHEX", minimal_shader())]);
    let shader = decode(&blob, &ShaderInfo::default()).unwrap().unwrap();
    assert_eq!(shader.shader_type, ShaderType::Vertex);
    assert_eq!(shader.major_version, 5);
    let main = &shader.phases(PhaseKind::Main)[0];
    assert_eq!(main.instructions.len(), 1);
    assert_eq!(main.instructions[0].opcode, Opcode::Ret);
}

#[test]
fn shdr_chunk_decodes() {
    let blob = container(&[(*b"SHDR", minimal_shader())]);
    assert!(decode(&blob, &ShaderInfo::default()).unwrap().is_some());
}

#[test]
fn unknown_chunks_are_skipped() {
    let blob = container(&[
        (*b"SPDB", vec![0xAB; 12]),
        (*b"SHEX", minimal_shader()),
        (*b"STAT", vec![0; 8]),
    ]);
    assert!(decode(&blob, &ShaderInfo::default()).unwrap().is_some());
}

#[test]
fn container_without_shader_chunk_is_none() {
    let blob = container(&[(*b"RDEF", vec![0; 16]), (*b"ISGN", vec![0; 16])]);
    assert!(decode(&blob, &ShaderInfo::default()).unwrap().is_none());
}

#[test]
fn unrecognized_blob_is_none() {
    // Neither DXBC magic nor a legacy version signature.
    let blob = [0x12, 0x34, 0x56, 0x78, 0, 0, 0, 0];
    assert!(decode(&blob, &ShaderInfo::default()).unwrap().is_none());
    assert!(decode(&[], &ShaderInfo::default()).unwrap().is_none());
}

#[test]
fn truncated_chunk_table_is_an_error() {
    let mut blob = container(&[(*b"SHEX", minimal_shader())]);
    blob.truncate(34);
    assert!(decode(&blob, &ShaderInfo::default()).is_err());
}
