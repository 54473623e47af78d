//! SM4/SM5 operand decoding.

use dxbc_ir::{ComponentSelection, Immediates, Operand, OperandDataType, OperandIndex};
use dxbc_tokens::operand as tok;
use dxbc_tokens::{
    ExtendedOperandType, IndexRepresentation, OperandMinPrecision, OperandModifier,
    OperandNumComponents, OperandSelectionMode, OperandType,
};

use crate::cursor::TokenCursor;
use crate::error::{DecodeError, Result};

/// Decode one operand, including its extension token and any relative
/// sub-operands, consuming exactly the words the encoding occupies.
pub fn decode_operand(cursor: &mut TokenCursor) -> Result<Operand> {
    let offset = cursor.position();
    let token0 = cursor.read()?;

    let raw_type = tok::operand_type_raw(token0);
    let ty = OperandType::from_u32(raw_type).ok_or(DecodeError::InvalidOperandType {
        offset,
        value: raw_type,
    })?;
    let mut operand = Operand::new(ty);

    if tok::is_extended(token0) {
        decode_extension(cursor, &mut operand)?;
    }

    operand.num_components = match tok::num_components(token0) {
        OperandNumComponents::Zero => 0,
        OperandNumComponents::One => 1,
        OperandNumComponents::Four => 4,
        OperandNumComponents::Variable => {
            return Err(DecodeError::InvalidField {
                field: "operand component count",
                offset,
                value: token0 & 3,
            });
        }
    };

    if operand.num_components == 4 {
        let raw_mode = tok::selection_mode_raw(token0);
        let mode = OperandSelectionMode::from_u32(raw_mode).ok_or(DecodeError::InvalidField {
            field: "operand selection mode",
            offset,
            value: raw_mode,
        })?;
        operand.selection = match mode {
            OperandSelectionMode::Mask => ComponentSelection::Mask(tok::component_mask(token0)),
            OperandSelectionMode::Swizzle => ComponentSelection::Swizzle([
                tok::swizzle_source(token0, 0),
                tok::swizzle_source(token0, 1),
                tok::swizzle_source(token0, 2),
                tok::swizzle_source(token0, 3),
            ]),
            OperandSelectionMode::Select1 => {
                ComponentSelection::Select1(tok::select1_source(token0))
            }
        };
    }

    // The GS instance id reads as a scalar uint whatever the token claims.
    if ty == OperandType::InputGsInstanceId {
        operand.num_components = 1;
        operand.data_type = OperandDataType::Uint;
    }

    // Depth outputs carry no index; register and mask are all-ones.
    if ty.is_depth_output() {
        operand.register_number = u32::MAX;
        operand.selection = ComponentSelection::Mask(0xF);
    }

    let dimensions = tok::index_dimension(token0);
    for dim in 0..dimensions {
        let raw_repr = tok::index_representation_raw(dim, token0);
        let repr =
            IndexRepresentation::from_u32(raw_repr).ok_or(DecodeError::InvalidIndexRepresentation {
                offset,
                value: raw_repr,
            })?;
        let index = match repr {
            IndexRepresentation::Immediate32 => {
                let value = cursor.read()?;
                operand.register_number = value;
                OperandIndex::Immediate32(value)
            }
            IndexRepresentation::Relative => {
                operand.register_number = 0;
                OperandIndex::Relative(Box::new(decode_operand(cursor)?))
            }
            IndexRepresentation::Immediate32PlusRelative => {
                let value = cursor.read()?;
                operand.register_number = value;
                OperandIndex::Immediate32PlusRelative(value, Box::new(decode_operand(cursor)?))
            }
            IndexRepresentation::Immediate64 | IndexRepresentation::Immediate64PlusRelative => {
                return Err(DecodeError::InvalidIndexRepresentation {
                    offset,
                    value: raw_repr,
                });
            }
        };
        operand.indices.push(index);
    }

    match ty {
        OperandType::Immediate32 => {
            let count = operand.num_components.max(1) as usize;
            let mut words = Vec::with_capacity(count);
            for _ in 0..count {
                words.push(cursor.read()?);
            }
            operand.immediates = Immediates::Imm32(words);
        }
        OperandType::Immediate64 => {
            let count = if operand.num_components == 1 { 1 } else { 2 };
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                let lo = cursor.read()? as u64;
                let hi = cursor.read()? as u64;
                values.push(f64::from_bits(hi << 32 | lo));
            }
            operand.immediates = Immediates::Imm64(values);
        }
        _ => {}
    }

    Ok(operand)
}

fn decode_extension(cursor: &mut TokenCursor, operand: &mut Operand) -> Result<()> {
    let offset = cursor.position();
    let ext = cursor.read()?;
    let raw_type = tok::extended_type_raw(ext);
    match ExtendedOperandType::from_u32(raw_type) {
        Some(ExtendedOperandType::Modifier) => {
            let raw_modifier = tok::extended_modifier_raw(ext);
            operand.modifier =
                OperandModifier::from_u32(raw_modifier).ok_or(DecodeError::InvalidField {
                    field: "operand modifier",
                    offset,
                    value: raw_modifier,
                })?;
            let raw_precision = tok::extended_min_precision_raw(ext);
            operand.min_precision =
                OperandMinPrecision::from_u32(raw_precision).ok_or(DecodeError::InvalidField {
                    field: "operand min precision",
                    offset,
                    value: raw_precision,
                })?;
        }
        Some(ExtendedOperandType::Empty) => {}
        None => {
            return Err(DecodeError::InvalidField {
                field: "extended operand type",
                offset,
                value: raw_type,
            });
        }
    }
    Ok(())
}
