//! Phase walker: declarations, then instructions, then the next phase.

use log::{debug, warn};

use dxbc_ir::{PhaseKind, ShaderData, ShaderInfo, ShaderPhase};
use dxbc_tokens::token as tok;
use dxbc_tokens::{Opcode, ShaderType};

use crate::cursor::TokenCursor;
use crate::decl::{decode_declaration, is_declaration};
use crate::error::{DecodeError, Result};
use crate::inst::decode_instruction;

/// Decode one phase instance: leading declarations, then instructions until
/// the stream ends or a hull phase marker is reached. The marker itself is
/// left unconsumed for the hull driver.
fn decode_phase(
    cursor: &mut TokenCursor,
    shader: &mut ShaderData,
    info: &ShaderInfo,
) -> Result<ShaderPhase> {
    let mut phase = ShaderPhase::default();

    while let Some(decl) = decode_declaration(cursor, shader, info)? {
        phase.declarations.push(decl);
    }

    while !cursor.at_end() {
        let token0 = cursor.peek()?;
        let raw_opcode = tok::opcode_raw(token0);
        let opcode = Opcode::from_u32(raw_opcode).ok_or(DecodeError::InvalidOpcode {
            offset: cursor.position(),
            value: raw_opcode,
        })?;
        if opcode.is_hull_phase_marker() {
            break;
        }
        // Immediate constant buffers (and stray declarations) may follow the
        // first instruction; fold them into the declaration list.
        if is_declaration(opcode) {
            if let Some(decl) = decode_declaration(cursor, shader, info)? {
                phase.declarations.push(decl);
            }
            continue;
        }
        phase
            .instructions
            .push(decode_instruction(cursor, shader, &mut phase.declarations)?);
    }

    debug!(
        "phase decoded: {} declarations, {} instructions",
        phase.declarations.len(),
        phase.instructions.len()
    );
    Ok(phase)
}

/// One pre-scan pass over the remaining tokens, counting instances of each
/// hull phase kind so the instance arrays can be sized up front.
fn count_hull_instances(cursor: &TokenCursor) -> Result<(usize, usize, usize)> {
    let mut scan = cursor.clone();
    let (mut control_point, mut fork, mut join) = (0, 0, 0);
    while !scan.at_end() {
        let offset = scan.position();
        let token0 = scan.read()?;
        let raw_opcode = tok::opcode_raw(token0);
        match Opcode::from_u32(raw_opcode) {
            Some(Opcode::HsControlPointPhase) => control_point += 1,
            Some(Opcode::HsForkPhase) => fork += 1,
            Some(Opcode::HsJoinPhase) => join += 1,
            Some(_) => {}
            None => {
                return Err(DecodeError::InvalidOpcode {
                    offset,
                    value: raw_opcode,
                });
            }
        }
        // Custom data carries its own length word; everything else encodes
        // the word count in the opcode token.
        let length = if raw_opcode == Opcode::CustomData as u32 {
            scan.peek()?
        } else {
            tok::instruction_length(token0)
        };
        if length == 0 {
            return Err(DecodeError::InvalidLength { offset, length });
        }
        scan.seek(offset + length as usize)?;
    }
    Ok((control_point, fork, join))
}

/// Decode a hull shader: the global declaration block, then each phase
/// instance behind its marker.
fn decode_hull(cursor: &mut TokenCursor, shader: &mut ShaderData, info: &ShaderInfo) -> Result<()> {
    let global = decode_phase(cursor, shader, info)?;
    shader.phases_mut(PhaseKind::HullGlobalDecls).push(global);

    let (control_point, fork, join) = count_hull_instances(cursor)?;
    shader
        .phases_mut(PhaseKind::ControlPoint)
        .reserve(control_point);
    shader.phases_mut(PhaseKind::Fork).reserve(fork);
    shader.phases_mut(PhaseKind::Join).reserve(join);

    while !cursor.at_end() {
        let offset = cursor.position();
        let token0 = cursor.peek()?;
        let raw_opcode = tok::opcode_raw(token0);
        let kind = Opcode::from_u32(raw_opcode).and_then(PhaseKind::from_marker);
        let Some(kind) = kind else {
            warn!("expected hull phase marker at word {offset}, got {raw_opcode:#x}");
            break;
        };
        cursor.skip(tok::instruction_length(token0).max(1) as usize)?;
        let phase = decode_phase(cursor, shader, info)?;
        shader.phases_mut(kind).push(phase);
    }
    Ok(())
}

/// Decode an SM4/SM5 token stream (version token first) into a shader.
pub fn decode_tokens(words: &[u32], info: &ShaderInfo) -> Result<ShaderData> {
    let mut header = TokenCursor::new(words);
    let version = header.read()?;
    let raw_type = tok::program_type_raw(version);
    let shader_type = ShaderType::from_u32(raw_type).ok_or(DecodeError::InvalidField {
        field: "program type",
        offset: 0,
        value: raw_type,
    })?;
    let declared_length = header.read()? as usize;
    if declared_length > words.len() {
        return Err(DecodeError::Truncated { offset: 1 });
    }

    let mut shader = ShaderData::new(
        shader_type,
        tok::program_major_version(version),
        tok::program_minor_version(version),
    );
    debug!(
        "decoding {:?} shader, model {}.{}, {} words",
        shader.shader_type, shader.major_version, shader.minor_version, declared_length
    );

    let mut cursor = TokenCursor::new(&words[..declared_length]);
    cursor.seek(2)?;
    if shader_type == ShaderType::Hull {
        decode_hull(&mut cursor, &mut shader, info)?;
    } else {
        let phase = decode_phase(&mut cursor, &mut shader, info)?;
        shader.phases_mut(PhaseKind::Main).push(phase);
    }
    Ok(shader)
}
