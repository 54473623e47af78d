//! SM4/SM5 declaration decoding.

use log::trace;

use dxbc_ir::{
    Declaration, DeclPayload, IndexedRange, ResourceGroup, ShaderData, ShaderInfo,
};
use dxbc_tokens::token as tok;
use dxbc_tokens::{
    CustomDataClass, InterpolationMode, Opcode, OperandType, Primitive, PrimitiveTopology,
    ResourceDimension, ResourceReturnType, SpecialName, TessDomain, TessOutputPrimitive,
    TessPartitioning,
};

use crate::cursor::TokenCursor;
use crate::error::{DecodeError, Result};
use crate::operand::decode_operand;

/// Whether an opcode is handled by the declaration decoder.
pub fn is_declaration(opcode: Opcode) -> bool {
    use Opcode::*;
    matches!(
        opcode,
        CustomData
            | DclResource
            | DclConstantBuffer
            | DclSampler
            | DclIndexRange
            | DclGsOutputPrimitiveTopology
            | DclGsInputPrimitive
            | DclMaxOutputVertexCount
            | DclInput
            | DclInputSgv
            | DclInputSiv
            | DclInputPs
            | DclInputPsSgv
            | DclInputPsSiv
            | DclOutput
            | DclOutputSgv
            | DclOutputSiv
            | DclTemps
            | DclIndexableTemp
            | DclGlobalFlags
            | HsDecls
            | DclStream
            | DclFunctionBody
            | DclFunctionTable
            | DclInterface
            | DclInputControlPointCount
            | DclOutputControlPointCount
            | DclTessDomain
            | DclTessPartitioning
            | DclTessOutputPrimitive
            | DclHsMaxTessFactor
            | DclHsForkPhaseInstanceCount
            | DclHsJoinPhaseInstanceCount
            | DclThreadGroup
            | DclUavTyped
            | DclUavRaw
            | DclUavStructured
            | DclTgsmRaw
            | DclTgsmStructured
            | DclResourceRaw
            | DclResourceStructured
            | DclGsInstanceCount
    )
}

fn return_types_from_word(word: u32, offset: usize) -> Result<[ResourceReturnType; 4]> {
    let mut types = [ResourceReturnType::Unused; 4];
    for (comp, slot) in types.iter_mut().enumerate() {
        let raw = tok::resource_return_type_raw(comp as u32, word);
        *slot = ResourceReturnType::from_u32(raw).ok_or(DecodeError::InvalidField {
            field: "resource return type",
            offset,
            value: raw,
        })?;
    }
    Ok(types)
}

fn resource_dimension(token0: u32, offset: usize) -> Result<ResourceDimension> {
    let raw = tok::resource_dimension_raw(token0);
    ResourceDimension::from_u32(raw).ok_or(DecodeError::InvalidField {
        field: "resource dimension",
        offset,
        value: raw,
    })
}

/// Attach the trailing system-value name word to the declared operand.
fn read_special_name(cursor: &mut TokenCursor, decl: &mut Declaration) -> Result<()> {
    let offset = cursor.position();
    let raw = cursor.read()?;
    let name = SpecialName::from_u32(raw).ok_or(DecodeError::InvalidField {
        field: "system value name",
        offset,
        value: raw,
    })?;
    if let Some(operand) = decl.operands.first_mut() {
        operand.special_name = name;
    }
    Ok(())
}

/// Record a `dcl_indexrange` span: the root register keeps its declaration,
/// interior registers become suppressed aliases of the root.
fn record_index_range(shader: &mut ShaderData, decl: &Declaration, register_count: u32) {
    let Some(operand) = decl.operands.first() else {
        return;
    };
    let root = operand.register_number;
    let table = match operand.ty {
        OperandType::Output => &mut shader.indexed_outputs,
        _ => &mut shader.indexed_inputs,
    };
    table.insert(root, IndexedRange::Root { count: register_count });
    for reg in root + 1..root + register_count {
        table.insert(reg, IndexedRange::Suppressed { root });
    }
}

/// Decode one declaration. `Ok(None)` when the next opcode is not a
/// declaration (the phase walker's transition into instructions); nothing is
/// consumed in that case.
pub fn decode_declaration(
    cursor: &mut TokenCursor,
    shader: &mut ShaderData,
    info: &ShaderInfo,
) -> Result<Option<Declaration>> {
    if cursor.at_end() {
        return Ok(None);
    }
    let offset = cursor.position();
    let token0 = cursor.peek()?;
    let raw_opcode = tok::opcode_raw(token0);
    let opcode = Opcode::from_u32(raw_opcode).ok_or(DecodeError::InvalidOpcode {
        offset,
        value: raw_opcode,
    })?;
    if !is_declaration(opcode) {
        return Ok(None);
    }
    cursor.read()?;

    // Everything but customdata carries its word count in the opcode token.
    let length = if opcode == Opcode::CustomData {
        cursor.peek()?
    } else {
        tok::instruction_length(token0)
    };
    let end = offset + length as usize;
    let min_length = if opcode == Opcode::CustomData { 2 } else { 1 };
    if length < min_length || end < cursor.position() {
        return Err(DecodeError::InvalidLength { offset, length });
    }

    let mut decl = Declaration::new(opcode);
    use Opcode::*;
    match opcode {
        CustomData => {
            cursor.read()?; // length word
            let raw_class = tok::custom_data_class_raw(token0);
            let class = CustomDataClass::from_u32(raw_class).ok_or(DecodeError::InvalidField {
                field: "custom data class",
                offset,
                value: raw_class,
            })?;
            let body = length as usize - 2;
            if class == CustomDataClass::DclImmediateConstantBuffer {
                let mut data = Vec::with_capacity(body / 4);
                for _ in 0..body / 4 {
                    data.push([cursor.read()?, cursor.read()?, cursor.read()?, cursor.read()?]);
                }
                decl.payload = DeclPayload::ImmediateConstantBuffer { data };
            } else {
                trace!("skipping {body} words of {class:?} custom data");
            }
        }
        DclGlobalFlags => {
            decl.payload = DeclPayload::GlobalFlags(tok::global_flags(token0));
        }
        DclResource => {
            let dimension = resource_dimension(token0, offset)?;
            decl.operands.push(decode_operand(cursor)?);
            let word_offset = cursor.position();
            let mut return_types = return_types_from_word(cursor.read()?, word_offset)?;
            if return_types == [ResourceReturnType::Unused; 4] {
                // Stripped return-type word; fall back to reflection.
                if let Some(binding) = decl
                    .register()
                    .and_then(|reg| info.binding(ResourceGroup::Texture, reg))
                {
                    return_types = [binding.return_type; 4];
                }
            }
            decl.payload = DeclPayload::Resource {
                dimension,
                return_types,
                shadow: false,
            };
        }
        DclConstantBuffer => {
            decl.operands.push(decode_operand(cursor)?);
            decl.payload = DeclPayload::ConstantBuffer {
                access: tok::cb_access_pattern(token0),
            };
        }
        DclSampler => {
            decl.operands.push(decode_operand(cursor)?);
            let comparison = decl
                .register()
                .is_some_and(|reg| info.is_comparison_sampler(reg));
            decl.payload = DeclPayload::Sampler { comparison };
        }
        DclIndexRange => {
            decl.operands.push(decode_operand(cursor)?);
            let word_offset = cursor.position();
            let register_count = cursor.read()?;
            let root = decl.register().unwrap_or(0);
            if register_count == 0 || root.checked_add(register_count).is_none() {
                return Err(DecodeError::InvalidField {
                    field: "index range count",
                    offset: word_offset,
                    value: register_count,
                });
            }
            decl.payload = DeclPayload::IndexRange { register_count };
            record_index_range(shader, &decl, register_count);
        }
        DclGsOutputPrimitiveTopology => {
            let raw = tok::output_topology_raw(token0);
            let topology =
                PrimitiveTopology::from_u32(raw).ok_or(DecodeError::InvalidField {
                    field: "output topology",
                    offset,
                    value: raw,
                })?;
            decl.payload = DeclPayload::OutputTopology(topology);
        }
        DclGsInputPrimitive => {
            let raw = tok::input_primitive_raw(token0);
            let primitive = Primitive::from_u32(raw).ok_or(DecodeError::InvalidField {
                field: "input primitive",
                offset,
                value: raw,
            })?;
            decl.payload = DeclPayload::InputPrimitive(primitive);
        }
        DclMaxOutputVertexCount => {
            decl.payload = DeclPayload::MaxOutputVertexCount(cursor.read()?);
        }
        DclInput | DclOutput | DclStream => {
            decl.operands.push(decode_operand(cursor)?);
        }
        DclInputSgv | DclInputSiv | DclOutputSgv | DclOutputSiv => {
            decl.operands.push(decode_operand(cursor)?);
            read_special_name(cursor, &mut decl)?;
        }
        DclInputPs => {
            decl.operands.push(decode_operand(cursor)?);
            decl.payload = DeclPayload::Interpolation(interpolation(token0, offset)?);
        }
        DclInputPsSgv | DclInputPsSiv => {
            decl.operands.push(decode_operand(cursor)?);
            read_special_name(cursor, &mut decl)?;
            decl.payload = DeclPayload::Interpolation(interpolation(token0, offset)?);
        }
        DclTemps => {
            decl.payload = DeclPayload::Temps(cursor.read()?);
        }
        DclIndexableTemp => {
            decl.payload = DeclPayload::IndexableTemp {
                register: cursor.read()?,
                count: cursor.read()?,
                num_components: cursor.read()?,
            };
        }
        HsDecls => {}
        DclFunctionBody => {
            decl.payload = DeclPayload::FunctionBody(cursor.read()?);
        }
        DclFunctionTable => {
            let index = cursor.read()?;
            let body_count = cursor.read()? as usize;
            let mut bodies = Vec::with_capacity(body_count);
            for _ in 0..body_count {
                bodies.push(cursor.read()?);
            }
            shader.function_tables.insert(index, bodies.clone());
            decl.payload = DeclPayload::FunctionTable { index, bodies };
        }
        DclInterface => {
            let index = cursor.read()?;
            let lengths = cursor.read()?;
            let table_length = tok::interface_table_length(lengths) as usize;
            let array_length = tok::interface_array_length(lengths);
            let mut tables = Vec::with_capacity(table_length);
            for _ in 0..table_length {
                let table = cursor.read()?;
                shader.table_to_interface.insert(table, index);
                tables.push(table);
            }
            decl.payload = DeclPayload::Interface {
                index,
                array_length,
                tables,
            };
        }
        DclInputControlPointCount => {
            decl.payload =
                DeclPayload::InputControlPointCount(tok::output_control_point_count(token0));
        }
        DclOutputControlPointCount => {
            decl.payload =
                DeclPayload::OutputControlPointCount(tok::output_control_point_count(token0));
        }
        DclTessDomain => {
            let raw = tok::tess_domain_raw(token0);
            let domain = TessDomain::from_u32(raw).ok_or(DecodeError::InvalidField {
                field: "tessellator domain",
                offset,
                value: raw,
            })?;
            decl.payload = DeclPayload::TessDomain(domain);
        }
        DclTessPartitioning => {
            let raw = tok::tess_partitioning_raw(token0);
            let partitioning =
                TessPartitioning::from_u32(raw).ok_or(DecodeError::InvalidField {
                    field: "tessellator partitioning",
                    offset,
                    value: raw,
                })?;
            decl.payload = DeclPayload::TessPartitioning(partitioning);
        }
        DclTessOutputPrimitive => {
            let raw = tok::tess_output_primitive_raw(token0);
            let primitive =
                TessOutputPrimitive::from_u32(raw).ok_or(DecodeError::InvalidField {
                    field: "tessellator output primitive",
                    offset,
                    value: raw,
                })?;
            decl.payload = DeclPayload::TessOutputPrimitive(primitive);
        }
        DclHsMaxTessFactor => {
            decl.payload = DeclPayload::HsMaxTessFactor(f32::from_bits(cursor.read()?));
        }
        DclHsForkPhaseInstanceCount => {
            decl.payload = DeclPayload::ForkPhaseInstanceCount(cursor.read()?);
        }
        DclHsJoinPhaseInstanceCount => {
            decl.payload = DeclPayload::JoinPhaseInstanceCount(cursor.read()?);
        }
        DclThreadGroup => {
            decl.payload =
                DeclPayload::ThreadGroup([cursor.read()?, cursor.read()?, cursor.read()?]);
        }
        DclUavTyped => {
            let dimension = resource_dimension(token0, offset)?;
            decl.operands.push(decode_operand(cursor)?);
            let word_offset = cursor.position();
            let return_types = return_types_from_word(cursor.read()?, word_offset)?;
            decl.payload = DeclPayload::UavTyped {
                dimension,
                return_types,
                globally_coherent: tok::globally_coherent(token0),
            };
        }
        DclUavRaw => {
            decl.operands.push(decode_operand(cursor)?);
            decl.payload = DeclPayload::UavRaw {
                globally_coherent: tok::globally_coherent(token0),
            };
        }
        DclUavStructured => {
            decl.operands.push(decode_operand(cursor)?);
            decl.payload = DeclPayload::UavStructured {
                stride: cursor.read()?,
                globally_coherent: tok::globally_coherent(token0),
            };
        }
        DclTgsmRaw => {
            decl.operands.push(decode_operand(cursor)?);
            decl.payload = DeclPayload::TgsmRaw {
                byte_count: cursor.read()?,
            };
        }
        DclTgsmStructured => {
            decl.operands.push(decode_operand(cursor)?);
            decl.payload = DeclPayload::TgsmStructured {
                stride: cursor.read()?,
                count: cursor.read()?,
            };
        }
        DclResourceRaw => {
            decl.operands.push(decode_operand(cursor)?);
        }
        DclResourceStructured => {
            decl.operands.push(decode_operand(cursor)?);
            decl.payload = DeclPayload::ResourceStructured {
                stride: cursor.read()?,
            };
        }
        DclGsInstanceCount => {
            decl.payload = DeclPayload::GsInstanceCount(cursor.read()?);
        }
        _ => unreachable!("is_declaration covers the dispatch"),
    }

    if cursor.position() > end {
        return Err(DecodeError::InvalidLength { offset, length });
    }
    cursor.seek(end)?;
    Ok(Some(decl))
}

fn interpolation(token0: u32, offset: usize) -> Result<InterpolationMode> {
    let raw = tok::interpolation_mode_raw(token0);
    InterpolationMode::from_u32(raw).ok_or(DecodeError::InvalidField {
        field: "interpolation mode",
        offset,
        value: raw,
    })
}
