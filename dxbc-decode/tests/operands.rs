mod common;

use common::*;
use dxbc_decode::{DecodeError, decode_tokens};
use dxbc_ir::{ComponentSelection, Immediates, Instruction, OperandIndex, ShaderInfo};
use dxbc_tokens::{Opcode, OperandModifier, OperandMinPrecision, OperandType, ShaderType, SwizzleSource};

/// Decode a stream of one mov and hand back that instruction.
fn decode_mov(operand_words: &[Vec<u32>]) -> Instruction {
    let mut body = Vec::new();
    let length = 1 + operand_words.iter().map(Vec::len).sum::<usize>();
    body.push(op(Opcode::Mov, length as u32));
    for words in operand_words {
        body.extend_from_slice(words);
    }
    let words = program(ShaderType::Vertex, &body);
    let shader = decode_tokens(&words, &ShaderInfo::default()).unwrap();
    shader.phases(dxbc_ir::PhaseKind::Main)[0].instructions[0].clone()
}

#[test]
fn mask_and_swizzle() {
    // .wzyx
    let swizzle = 3 | (2 << 2) | (1 << 4);
    let inst = decode_mov(&[
        dest(OperandType::Temp, 0, 0b0011),
        src_swizzled(OperandType::Input, 1, swizzle),
    ]);
    let [d, s] = inst.operands.as_slice() else {
        panic!("expected two operands");
    };
    assert_eq!(d.selection, ComponentSelection::Mask(0b0011));
    assert_eq!(d.register_number, 0);
    assert_eq!(
        s.selection,
        ComponentSelection::Swizzle([
            SwizzleSource::W,
            SwizzleSource::Z,
            SwizzleSource::Y,
            SwizzleSource::X,
        ])
    );
    assert_eq!(s.ty, OperandType::Input);
    assert_eq!(s.register_number, 1);
}

#[test]
fn select1() {
    let inst = decode_mov(&[
        dest(OperandType::Temp, 2, 0xF),
        src_select1(OperandType::Temp, 1, 2),
    ]);
    assert_eq!(
        inst.operands[1].selection,
        ComponentSelection::Select1(SwizzleSource::Z)
    );
}

#[test]
fn immediate32_vector_and_scalar() {
    let inst = decode_mov(&[dest(OperandType::Temp, 0, 0xF), imm32([1, 2, 3, 4])]);
    assert_eq!(inst.operands[1].immediates, Immediates::Imm32(vec![1, 2, 3, 4]));
    assert!(inst.operands[1].indices.is_empty());

    let inst = decode_mov(&[dest(OperandType::Temp, 0, 0x1), imm32_scalar(42)]);
    assert_eq!(inst.operands[1].num_components, 1);
    assert_eq!(inst.operands[1].immediates, Immediates::Imm32(vec![42]));
}

#[test]
fn extension_modifier_and_precision() {
    let inst = decode_mov(&[
        dest(OperandType::Temp, 0, 0xF),
        src_modified(OperandType::Temp, 1, OperandModifier::AbsNeg as u32, 0),
    ]);
    assert_eq!(inst.operands[1].modifier, OperandModifier::AbsNeg);
    assert_eq!(inst.operands[1].min_precision, OperandMinPrecision::Default);
}

#[test]
fn mov_to_int16_marks_immediate_integral() {
    // Destination with a Sint16 min-precision extension.
    let dest_words = vec![
        2 | (0xF << 4) | ((OperandType::Temp as u32) << 12) | (1 << 20) | 0x8000_0000,
        1 | ((OperandMinPrecision::Sint16 as u32) << 14),
        0,
    ];
    let inst = decode_mov(&[dest_words, imm32([7, 7, 7, 7])]);
    assert_eq!(inst.operands[0].min_precision, OperandMinPrecision::Sint16);
    assert!(inst.operands[1].integer_immediate);
}

#[test]
fn relative_index() {
    let inst = decode_mov(&[
        dest(OperandType::Temp, 0, 0xF),
        src_relative(OperandType::Input, 3, &src_select1(OperandType::Temp, 1, 0)),
    ]);
    let operand = &inst.operands[1];
    assert_eq!(operand.register_number, 3);
    let OperandIndex::Immediate32PlusRelative(base, sub) = &operand.indices[0] else {
        panic!("expected imm32+relative index");
    };
    assert_eq!(*base, 3);
    assert_eq!(sub.ty, OperandType::Temp);
    assert_eq!(sub.selection, ComponentSelection::Select1(SwizzleSource::X));
}

#[test]
fn constant_buffer_two_dimensional() {
    let inst = decode_mov(&[dest(OperandType::Temp, 0, 0xF), src_cb(2, 5)]);
    let operand = &inst.operands[1];
    assert_eq!(operand.ty, OperandType::ConstantBuffer);
    assert_eq!(operand.indices.len(), 2);
    assert_eq!(operand.indices[0], OperandIndex::Immediate32(2));
    assert_eq!(operand.indices[1], OperandIndex::Immediate32(5));
    // The register number is the innermost dimension.
    assert_eq!(operand.register_number, 5);
}

#[test]
fn output_depth_has_fixed_register_and_mask() {
    // oDepth encodes as a one-component operand with no index.
    let odepth = vec![1 | ((OperandType::OutputDepth as u32) << 12)];
    let inst = decode_mov(&[odepth, src_select1(OperandType::Temp, 0, 3)]);
    assert_eq!(inst.operands[0].register_number, u32::MAX);
    assert_eq!(inst.operands[0].selection, ComponentSelection::Mask(0xF));
}

#[test]
fn invalid_operand_type_is_rejected() {
    let bad = vec![2 | (0xF << 4) | (41 << 12) | (1 << 20), 0];
    let mut body = vec![op(Opcode::Mov, 5)];
    body.extend_from_slice(&bad);
    body.extend_from_slice(&src_select1(OperandType::Temp, 0, 0));
    let words = program(ShaderType::Vertex, &body);
    let err = decode_tokens(&words, &ShaderInfo::default()).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidOperandType { value: 41, .. }));
}

#[test]
fn imm64_index_representation_is_rejected() {
    // Index representation 1 (imm64) in dimension 0.
    let bad = vec![
        2 | (1 << 2) | (0xE4 << 4) | ((OperandType::Input as u32) << 12) | (1 << 20) | (1 << 22),
        0,
        0,
    ];
    let mut body = vec![op(Opcode::Mov, 6)];
    body.extend_from_slice(&dest(OperandType::Temp, 0, 0xF));
    body.extend_from_slice(&bad);
    let words = program(ShaderType::Vertex, &body);
    let err = decode_tokens(&words, &ShaderInfo::default()).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidIndexRepresentation { .. }));
}
