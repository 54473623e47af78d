use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use memmap2::Mmap;

use dxbc_decode::Container;
use dxbc_ir::{
    ComponentSelection, Declaration, Immediates, Instruction, Operand, OperandIndex, PhaseKind,
    ShaderData, ShaderInfo,
};
use dxbc_tokens::{OperandModifier, OperandType, SwizzleSource};

#[derive(Parser)]
#[command(name = "dxbc", about = "Direct3D shader bytecode decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show container chunks and the shader version
    Info {
        /// Path to the shader blob
        input: PathBuf,
    },
    /// Decode the shader and print a token listing
    Dump {
        /// Path to the shader blob
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => cmd_info(&input),
        Commands::Dump { input } => cmd_dump(&input),
    }
}

fn map_file(path: &PathBuf) -> Mmap {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: cannot open {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    // SAFETY: the mapping is read-only and dropped before the process exits.
    match unsafe { Mmap::map(&file) } {
        Ok(m) => {
            log::debug!("mapped {} bytes from {}", m.len(), path.display());
            m
        }
        Err(e) => {
            eprintln!("Error: cannot map {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn decode_or_exit(bytes: &[u8]) -> ShaderData {
    match dxbc_decode::decode(bytes, &ShaderInfo::default()) {
        Ok(Some(shader)) => shader,
        Ok(None) => {
            eprintln!("Error: not a shader blob");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_info(path: &PathBuf) {
    let bytes = map_file(path);

    match Container::parse(&bytes) {
        Ok(Some(container)) => {
            println!("=== DXBC Container ===");
            println!("Chunks: {}", container.chunks.len());
            for chunk in &container.chunks {
                let fourcc: String = chunk.fourcc.iter().map(|&b| b as char).collect();
                println!("  {fourcc}  {} bytes", chunk.data.len());
            }
        }
        Ok(None) => println!("No DXBC container; trying legacy stream"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    let shader = decode_or_exit(&bytes);
    println!(
        "Shader: {:?} {}.{}",
        shader.shader_type, shader.major_version, shader.minor_version
    );
    for (kind, phase) in shader.all_phases() {
        println!(
            "  {kind:?}: {} declarations, {} instructions",
            phase.declarations.len(),
            phase.instructions.len()
        );
    }
}

fn cmd_dump(path: &PathBuf) {
    let bytes = map_file(path);
    let shader = decode_or_exit(&bytes);

    println!(
        "# {:?} shader, model {}.{}",
        shader.shader_type, shader.major_version, shader.minor_version
    );

    for (kind, phase) in shader.all_phases() {
        if kind != PhaseKind::Main {
            println!("# --- {kind:?} ---");
        }
        for decl in &phase.declarations {
            println!("{}", format_declaration(decl));
        }
        for inst in &phase.instructions {
            println!("{}", format_instruction(inst));
        }
    }
}

fn format_declaration(decl: &Declaration) -> String {
    let mut line = decl.opcode.to_string();
    for operand in &decl.operands {
        line.push(' ');
        line.push_str(&format_operand(operand));
    }
    line
}

fn format_instruction(inst: &Instruction) -> String {
    let mut line = inst.opcode.to_string();
    if inst.saturate {
        line.push_str("_sat");
    }
    let operands: Vec<String> = inst.operands.iter().map(format_operand).collect();
    if !operands.is_empty() {
        line.push(' ');
        line.push_str(&operands.join(", "));
    }
    line
}

/// Register-file prefix in fxc's assembly listings.
fn register_prefix(ty: OperandType) -> &'static str {
    match ty {
        OperandType::Temp => "r",
        OperandType::Input => "v",
        OperandType::Output => "o",
        OperandType::IndexableTemp => "x",
        OperandType::Sampler => "s",
        OperandType::Resource => "t",
        OperandType::ConstantBuffer => "cb",
        OperandType::ImmediateConstantBuffer => "icb",
        OperandType::UnorderedAccessView => "u",
        OperandType::ThreadGroupSharedMemory => "g",
        OperandType::Label => "l",
        OperandType::FunctionBody => "fb",
        OperandType::FunctionTable => "ft",
        OperandType::Interface => "fp",
        OperandType::OutputDepth => "oDepth",
        OperandType::OutputDepthGreaterEqual => "oDepthGE",
        OperandType::OutputDepthLessEqual => "oDepthLE",
        OperandType::Null => "null",
        OperandType::InputPrimitiveId => "vPrim",
        OperandType::OutputCoverageMask => "oMask",
        OperandType::InputCoverageMask => "vCoverage",
        OperandType::InputThreadId => "vThreadID",
        OperandType::InputThreadGroupId => "vThreadGroupID",
        OperandType::InputThreadIdInGroup => "vThreadIDInGroup",
        OperandType::InputThreadIdInGroupFlattened => "vThreadIDInGroupFlattened",
        OperandType::InputGsInstanceId => "vGSInstanceID",
        OperandType::OutputControlPointId => "vOutputControlPointID",
        OperandType::InputForkInstanceId => "vForkInstanceID",
        OperandType::InputJoinInstanceId => "vJoinInstanceID",
        OperandType::InputControlPoint => "vicp",
        OperandType::OutputControlPoint => "vocp",
        OperandType::InputPatchConstant => "vpc",
        OperandType::InputDomainPoint => "vDomain",
        _ => "?",
    }
}

fn format_operand(operand: &Operand) -> String {
    let mut text = String::new();
    match operand.modifier {
        OperandModifier::None => {}
        OperandModifier::Neg => text.push('-'),
        OperandModifier::Abs => text.push('|'),
        OperandModifier::AbsNeg => text.push_str("-|"),
    }

    match &operand.immediates {
        Immediates::Imm32(words) => {
            let values: Vec<String> = if operand.integer_immediate {
                words.iter().map(|&w| (w as i32).to_string()).collect()
            } else {
                words
                    .iter()
                    .map(|&w| format!("{:.6}", f32::from_bits(w)))
                    .collect()
            };
            text.push_str(&format!("l({})", values.join(", ")));
        }
        Immediates::Imm64(values) => {
            let values: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
            text.push_str(&format!("d({})", values.join(", ")));
        }
        Immediates::None => {
            text.push_str(register_prefix(operand.ty));
            let mut indices = operand.indices.iter();
            if let Some(first) = indices.next() {
                text.push_str(&format_index(first, false));
            }
            for index in indices {
                text.push_str(&format_index(index, true));
            }
            text.push_str(&format_selection(operand.selection));
        }
    }

    if matches!(operand.modifier, OperandModifier::Abs | OperandModifier::AbsNeg) {
        text.push('|');
    }
    text
}

fn format_index(index: &OperandIndex, bracket: bool) -> String {
    let inner = match index {
        OperandIndex::Immediate32(value) => value.to_string(),
        OperandIndex::Relative(operand) => format_operand(operand),
        OperandIndex::Immediate32PlusRelative(base, operand) => {
            format!("{} + {base}", format_operand(operand))
        }
    };
    if bracket || !matches!(index, OperandIndex::Immediate32(_)) {
        format!("[{inner}]")
    } else {
        inner
    }
}

fn format_selection(selection: ComponentSelection) -> String {
    const CHANNELS: [char; 4] = ['x', 'y', 'z', 'w'];
    match selection {
        ComponentSelection::None => String::new(),
        ComponentSelection::Mask(mask) => {
            if mask == 0xF {
                return String::new();
            }
            let mut text = String::from(".");
            for (bit, channel) in CHANNELS.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    text.push(*channel);
                }
            }
            text
        }
        ComponentSelection::Swizzle(sources) => {
            if sources
                == [
                    SwizzleSource::X,
                    SwizzleSource::Y,
                    SwizzleSource::Z,
                    SwizzleSource::W,
                ]
            {
                return String::new();
            }
            let mut text = String::from(".");
            for source in sources {
                text.push(CHANNELS[source as usize]);
            }
            text
        }
        ComponentSelection::Select1(source) => format!(".{}", CHANNELS[source as usize]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxbc_tokens::Opcode;

    fn register(ty: OperandType, number: u32) -> Operand {
        let mut operand = Operand::new(ty);
        operand.register_number = number;
        operand.indices = vec![OperandIndex::Immediate32(number)];
        operand
    }

    #[test]
    fn plain_register() {
        assert_eq!(format_operand(&register(OperandType::Temp, 3)), "r3");
    }

    #[test]
    fn masked_register() {
        let mut operand = register(OperandType::Output, 1);
        operand.selection = ComponentSelection::Mask(0b0101);
        assert_eq!(format_operand(&operand), "o1.xz");
    }

    #[test]
    fn negated_swizzled() {
        let mut operand = register(OperandType::Input, 2);
        operand.modifier = OperandModifier::Neg;
        operand.selection = ComponentSelection::Swizzle([SwizzleSource::W; 4]);
        assert_eq!(format_operand(&operand), "-v2.wwww");
    }

    #[test]
    fn constant_buffer_indices() {
        let mut operand = Operand::new(OperandType::ConstantBuffer);
        operand.indices = vec![OperandIndex::Immediate32(0), OperandIndex::Immediate32(7)];
        assert_eq!(format_operand(&operand), "cb0[7]");
    }

    #[test]
    fn float_immediate() {
        let mut operand = Operand::new(OperandType::Immediate32);
        operand.immediates = Immediates::Imm32(vec![0x3F80_0000]);
        assert_eq!(format_operand(&operand), "l(1.000000)");
    }

    #[test]
    fn instruction_line() {
        let mut inst = Instruction::new(Opcode::Add);
        inst.saturate = true;
        inst.operands.push(register(OperandType::Temp, 0));
        inst.operands.push(register(OperandType::Temp, 1));
        inst.operands.push(register(OperandType::Temp, 2));
        assert_eq!(format_instruction(&inst), "add_sat r0, r1, r2");
    }
}
