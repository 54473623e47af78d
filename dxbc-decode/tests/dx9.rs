mod common;

use common::*;
use dxbc_decode::decode;
use dxbc_ir::{
    ComponentSelection, Dx9ConstantSpan, Dx9RegisterSet, Immediates, OperandDataType,
    OperandIndex, PhaseKind, ShaderData, ShaderInfo, ShaderPhase, TextureSampler,
};
use dxbc_tokens::dx9::Dx9Comparison;
use dxbc_tokens::{Opcode, OperandModifier, OperandType, ShaderType, SwizzleSource};

// Legacy register type field values.
const TEMP: u32 = 0;
const INPUT: u32 = 1;
const CONST: u32 = 2;
const TEXTURE: u32 = 3;
const TEXCRDOUT: u32 = 6;
const SAMPLER: u32 = 10;

fn decode_dx9(version: u32, body: &[u32], info: &ShaderInfo) -> ShaderData {
    let bytes = words_to_bytes(&dx9_program(version, body));
    decode(&bytes, info).unwrap().unwrap()
}

fn main_phase(shader: &ShaderData) -> &ShaderPhase {
    &shader.phases(PhaseKind::Main)[0]
}

#[test]
fn vertex_signature_and_version() {
    let body = [
        dx9_op(1, 2), // mov o0, v0
        dx9_dest(TEXCRDOUT, 0, 0xF),
        dx9_src(INPUT, 0),
    ];
    let shader = decode_dx9(VS_3_0, &body, &ShaderInfo::default());
    assert_eq!(shader.shader_type, ShaderType::Vertex);
    assert_eq!(shader.major_version, 3);
    assert_eq!(shader.minor_version, 0);

    let inst = &main_phase(&shader).instructions[0];
    assert_eq!(inst.opcode, Opcode::Mov);
    assert_eq!(inst.operands[0].ty, OperandType::Output);
    assert_eq!(inst.operands[1].ty, OperandType::Input);
    assert!(shader.input_referenced(0));
}

#[test]
fn sub_becomes_add_with_negated_source() {
    let body = [
        dx9_op(3, 3), // sub r0, r1, r2
        dx9_dest(TEMP, 0, 0xF),
        dx9_src(TEMP, 1),
        dx9_src(TEMP, 2),
    ];
    let shader = decode_dx9(VS_2_0, &body, &ShaderInfo::default());
    let inst = &main_phase(&shader).instructions[0];
    assert_eq!(inst.opcode, Opcode::Add);
    assert_eq!(inst.operands[1].modifier, OperandModifier::None);
    assert_eq!(inst.operands[2].modifier, OperandModifier::Neg);
}

#[test]
fn sub_of_negated_source_cancels() {
    let body = [
        dx9_op(3, 3),
        dx9_dest(TEMP, 0, 0xF),
        dx9_src(TEMP, 1),
        dx9_src_modified(TEMP, 2, 1), // -r2
    ];
    let shader = decode_dx9(VS_2_0, &body, &ShaderInfo::default());
    let inst = &main_phase(&shader).instructions[0];
    assert_eq!(inst.operands[2].modifier, OperandModifier::None);
}

#[test]
fn nrm_expands_to_dp4_then_rsq() {
    let body = [
        dx9_op(36, 2), // nrm r0, r1
        dx9_dest(TEMP, 0, 0x7),
        dx9_src(TEMP, 1),
    ];
    let shader = decode_dx9(VS_2_0, &body, &ShaderInfo::default());
    let instructions = &main_phase(&shader).instructions;
    assert_eq!(instructions.len(), 2);

    let dp4 = &instructions[0];
    assert_eq!(dp4.opcode, Opcode::Dp4);
    assert_eq!(dp4.operands.len(), 3);
    assert_eq!(dp4.operands[0].selection, ComponentSelection::Mask(0x7));
    assert_eq!(dp4.operands[1].register_number, 1);
    assert_eq!(dp4.operands[1], dp4.operands[2]);

    let rsq = &instructions[1];
    assert_eq!(rsq.opcode, Opcode::Rsq);
    assert_eq!(rsq.operands[0].register_number, 0);
    // The second step reads the dp4 result back.
    assert_eq!(rsq.operands[1].ty, OperandType::Temp);
    assert_eq!(rsq.operands[1].register_number, 0);
    assert!(matches!(
        rsq.operands[1].selection,
        ComponentSelection::Swizzle(_)
    ));
}

#[test]
fn def_constant_reads_as_immediate() {
    let body = [
        dx9_op(81, 5), // def c5, raw words
        dx9_dest(CONST, 5, 0xF),
        0x3F80_0000,
        0x4000_0000,
        0x4040_0000,
        0x4080_0000,
        dx9_op(1, 2), // mov r0, c5
        dx9_dest(TEMP, 0, 0xF),
        dx9_src(CONST, 5),
    ];
    let shader = decode_dx9(VS_2_0, &body, &ShaderInfo::default());
    let inst = &main_phase(&shader).instructions[0];
    let src = &inst.operands[1];
    assert_eq!(src.ty, OperandType::Immediate32);
    assert_eq!(
        src.immediates,
        Immediates::Imm32(vec![0x3F80_0000, 0x4000_0000, 0x4040_0000, 0x4080_0000])
    );
    assert!(!src.integer_immediate);
}

#[test]
fn undefined_constant_becomes_constant_buffer_access() {
    let info = ShaderInfo {
        bindings: Vec::new(),
        dx9_constants: vec![Dx9ConstantSpan {
            register_set: Dx9RegisterSet::Int4,
            start: 3,
            count: 1,
        }],
    };
    let body = [
        dx9_op(1, 2), // mov r0, c3
        dx9_dest(TEMP, 0, 0xF),
        dx9_src(CONST, 3),
    ];
    let shader = decode_dx9(VS_2_0, &body, &info);
    let phase = main_phase(&shader);
    let src = &phase.instructions[0].operands[1];
    assert_eq!(src.ty, OperandType::ConstantBuffer);
    assert_eq!(src.indices[0], OperandIndex::Immediate32(0));
    assert_eq!(src.indices[1], OperandIndex::Immediate32(3));
    assert_eq!(src.data_type, OperandDataType::Int);

    // The whole constant file is declared as one buffer.
    let cb = phase
        .declarations
        .iter()
        .find(|decl| decl.opcode == Opcode::DclConstantBuffer)
        .unwrap();
    assert_eq!(cb.operands[0].indices[1], OperandIndex::Immediate32(4));
}

#[test]
fn sincos_splits_destination_channels() {
    let body = [
        dx9_op(37, 2), // sincos r0.x, r1 (cosine only)
        dx9_dest(TEMP, 0, 0x1),
        dx9_src(TEMP, 1),
    ];
    let shader = decode_dx9(VS_3_0, &body, &ShaderInfo::default());
    let inst = &main_phase(&shader).instructions[0];
    assert_eq!(inst.opcode, Opcode::SinCos);
    assert_eq!(inst.first_src, 2);
    // Sine channel unwritten, cosine masked to x.
    assert_eq!(inst.operands[0].ty, OperandType::Null);
    assert_eq!(inst.operands[1].selection, ComponentSelection::Mask(0x1));
    assert_eq!(inst.operands[2].register_number, 1);
}

#[test]
fn texld_becomes_sample_and_binds() {
    let body = [
        dx9_op(31, 2), // dcl_2d s0
        (2 << 27) | 0x8000_0000,
        dx9_dest(SAMPLER, 0, 0),
        dx9_op(66, 3), // texld r0, t0, s0
        dx9_dest(TEMP, 0, 0xF),
        dx9_src(TEXTURE, 0),
        dx9_src(SAMPLER, 0),
    ];
    let shader = decode_dx9(PS_2_0, &body, &ShaderInfo::default());
    let phase = main_phase(&shader);

    let inst = &phase.instructions[0];
    assert_eq!(inst.opcode, Opcode::Sample);
    assert_eq!(inst.operands.len(), 4);
    assert_eq!(inst.operands[1].ty, OperandType::Input);
    assert_eq!(inst.operands[1].register_number, 2); // t0 after colour inputs
    assert_eq!(inst.operands[2].ty, OperandType::Resource);
    assert_eq!(inst.operands[3].ty, OperandType::Sampler);
    assert_eq!(shader.texture_samplers[&0], TextureSampler::Sampler(0));

    assert!(phase.declarations.iter().any(|d| d.opcode == Opcode::DclResource));
    assert!(phase.declarations.iter().any(|d| d.opcode == Opcode::DclSampler));
}

#[test]
fn texldl_appends_lod_from_w() {
    let body = [
        dx9_op(31, 2),
        (2 << 27) | 0x8000_0000,
        dx9_dest(SAMPLER, 0, 0),
        dx9_op(95, 3), // texldl r0, t0, s0
        dx9_dest(TEMP, 0, 0xF),
        dx9_src(TEXTURE, 0),
        dx9_src(SAMPLER, 0),
    ];
    let shader = decode_dx9(PS_2_0, &body, &ShaderInfo::default());
    let inst = &main_phase(&shader).instructions[0];
    assert_eq!(inst.opcode, Opcode::SampleL);
    assert_eq!(inst.operands.len(), 5);
    assert_eq!(
        inst.operands[4].selection,
        ComponentSelection::Swizzle([SwizzleSource::W; 4])
    );
}

#[test]
fn texkill_becomes_tested_discard() {
    let body = [
        dx9_op(65, 1), // texkill r0
        dx9_dest(TEMP, 0, 0xF),
    ];
    let shader = decode_dx9(PS_2_0, &body, &ShaderInfo::default());
    let inst = &main_phase(&shader).instructions[0];
    assert_eq!(inst.opcode, Opcode::Discard);
    assert_eq!(inst.dx9_test, Some(Dx9Comparison::Lt));
    assert_eq!(inst.first_src, 0);
    assert_eq!(inst.sources().len(), 1);
}

#[test]
fn cmp_becomes_tested_movc() {
    let body = [
        dx9_op(88, 4), // cmp r0, r1, r2, r3
        dx9_dest(TEMP, 0, 0xF),
        dx9_src(TEMP, 1),
        dx9_src(TEMP, 2),
        dx9_src(TEMP, 3),
    ];
    let shader = decode_dx9(PS_2_0, &body, &ShaderInfo::default());
    let inst = &main_phase(&shader).instructions[0];
    assert_eq!(inst.opcode, Opcode::MovC);
    assert_eq!(inst.dx9_test, Some(Dx9Comparison::Ge));
    assert_eq!(inst.operands.len(), 4);
}

#[test]
fn ifc_carries_its_comparison() {
    let body = [
        dx9_op(41, 2) | (1 << 16), // if_gt r0.x, r1.x
        dx9_src(TEMP, 0),
        dx9_src(TEMP, 1),
        dx9_op(43, 0), // endif
    ];
    let shader = decode_dx9(VS_3_0, &body, &ShaderInfo::default());
    let instructions = &main_phase(&shader).instructions;
    assert_eq!(instructions[0].opcode, Opcode::If);
    assert_eq!(instructions[0].dx9_test, Some(Dx9Comparison::Gt));
    assert_eq!(instructions[0].operands.len(), 2);
    assert_eq!(instructions[0].first_src, 0);
    assert_eq!(instructions[1].opcode, Opcode::EndIf);
}

#[test]
fn comments_are_skipped() {
    let body = [
        0xFFFE | (2 << 16), // comment, two payload words
        0xDEAD_BEEF,
        0xCAFE_F00D,
        dx9_op(1, 2), // mov r0, v0
        dx9_dest(TEMP, 0, 0xF),
        dx9_src(INPUT, 0),
    ];
    let shader = decode_dx9(VS_2_0, &body, &ShaderInfo::default());
    assert_eq!(main_phase(&shader).instructions.len(), 1);
}

#[test]
fn temps_declaration_covers_user_registers() {
    let body = [
        dx9_op(1, 2), // mov r4, v0
        dx9_dest(TEMP, 4, 0xF),
        dx9_src(INPUT, 0),
    ];
    let shader = decode_dx9(VS_2_0, &body, &ShaderInfo::default());
    let decls = &main_phase(&shader).declarations;
    let temps = decls
        .iter()
        .find(|decl| decl.opcode == Opcode::DclTemps)
        .unwrap();
    assert_eq!(temps.payload, dxbc_ir::DeclPayload::Temps(5));
}
