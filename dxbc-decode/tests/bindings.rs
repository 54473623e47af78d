mod common;

use common::*;
use dxbc_decode::{DecodeError, decode_tokens};
use dxbc_ir::{DeclPayload, PhaseKind, ShaderInfo, TextureSampler};
use dxbc_tokens::{Opcode, OperandType, ResourceDimension, ShaderType};

fn sample_words(opcode: Opcode, texture: u32, sampler: u32) -> Vec<u32> {
    let mut words = vec![op(opcode, 9)];
    words.extend_from_slice(&dest(OperandType::Temp, 0, 0xF));
    words.extend_from_slice(&src(OperandType::Input, 0));
    words.extend_from_slice(&src(OperandType::Resource, texture));
    words.extend_from_slice(&src(OperandType::Sampler, sampler));
    words
}

fn ld_words(texture: u32) -> Vec<u32> {
    let mut words = vec![op(Opcode::Ld, 7)];
    words.extend_from_slice(&dest(OperandType::Temp, 0, 0xF));
    words.extend_from_slice(&src(OperandType::Temp, 1));
    words.extend_from_slice(&src(OperandType::Resource, texture));
    words
}

#[test]
fn repeated_pairing_is_recorded_once() {
    let mut body = sample_words(Opcode::Sample, 0, 2);
    body.extend_from_slice(&sample_words(Opcode::Sample, 0, 2));
    body.push(op(Opcode::Ret, 1));
    let words = program(ShaderType::Pixel, &body);
    let shader = decode_tokens(&words, &ShaderInfo::default()).unwrap();
    assert_eq!(shader.texture_samplers[&0], TextureSampler::Sampler(2));
    assert_eq!(shader.texture_samplers.len(), 1);
}

#[test]
fn conflicting_samplers_are_rejected() {
    let mut body = sample_words(Opcode::Sample, 0, 0);
    body.extend_from_slice(&sample_words(Opcode::Sample, 0, 1));
    body.push(op(Opcode::Ret, 1));
    let words = program(ShaderType::Pixel, &body);
    let err = decode_tokens(&words, &ShaderInfo::default()).unwrap_err();
    assert_eq!(
        err,
        DecodeError::SamplerBindingConflict {
            texture: 0,
            bound: TextureSampler::Sampler(0),
            requested: TextureSampler::Sampler(1),
        }
    );
}

#[test]
fn ld_records_unsampled_access() {
    let mut body = ld_words(3);
    body.push(op(Opcode::Ret, 1));
    let words = program(ShaderType::Pixel, &body);
    let shader = decode_tokens(&words, &ShaderInfo::default()).unwrap();
    assert_eq!(shader.texture_samplers[&3], TextureSampler::Unsampled);
}

#[test]
fn unsampled_then_sampled_conflicts() {
    let mut body = ld_words(0);
    body.extend_from_slice(&sample_words(Opcode::Sample, 0, 0));
    body.push(op(Opcode::Ret, 1));
    let words = program(ShaderType::Pixel, &body);
    let err = decode_tokens(&words, &ShaderInfo::default()).unwrap_err();
    assert!(matches!(err, DecodeError::SamplerBindingConflict { texture: 0, .. }));
}

#[test]
fn lod_query_does_not_bind_a_sampler() {
    // lod may name a different sampler than the one the texture samples with.
    let mut body = sample_words(Opcode::Sample, 0, 0);
    body.extend_from_slice(&sample_words(Opcode::Lod, 0, 1));
    body.push(op(Opcode::Ret, 1));
    let words = program(ShaderType::Pixel, &body);
    let shader = decode_tokens(&words, &ShaderInfo::default()).unwrap();
    assert_eq!(shader.texture_samplers[&0], TextureSampler::Sampler(0));
    assert_eq!(shader.texture_samplers.len(), 1);
}

#[test]
fn comparison_sample_marks_texture_as_shadow() {
    let mut body = Vec::new();
    // dcl_resource t0, texture2d
    body.push(op(Opcode::DclResource, 4) | ((ResourceDimension::Texture2D as u32) << 11));
    body.extend_from_slice(&dest(OperandType::Resource, 0, 0xF));
    body.push(0x5555);
    // sample_c r0, v0, t0, s0, l(0.5)
    let mut inst = vec![op(Opcode::SampleC, 11)];
    inst.extend_from_slice(&dest(OperandType::Temp, 0, 0xF));
    inst.extend_from_slice(&src(OperandType::Input, 0));
    inst.extend_from_slice(&src(OperandType::Resource, 0));
    inst.extend_from_slice(&src(OperandType::Sampler, 0));
    inst.extend_from_slice(&imm32_scalar(0x3F00_0000));
    body.extend_from_slice(&inst);
    body.push(op(Opcode::Ret, 1));

    let words = program(ShaderType::Pixel, &body);
    let shader = decode_tokens(&words, &ShaderInfo::default()).unwrap();
    let decl = &shader.phases(PhaseKind::Main)[0].declarations[0];
    let DeclPayload::Resource { shadow, .. } = &decl.payload else {
        panic!("expected resource payload");
    };
    assert!(*shadow);
}
