//! The unified SM4/SM5 opcode table, in container encoding order.

macro_rules! opcode_table {
    ($(($variant:ident, $value:literal, $mnemonic:literal),)*) => {
        /// An SM4/SM5 opcode, covering both instructions and declarations.
        ///
        /// Discriminants match the raw values found in the low 11 bits of an
        /// opcode token.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum Opcode {
            $($variant = $value,)*
        }

        impl Opcode {
            /// Convert a raw opcode value; `None` for anything not in the table.
            pub fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// The assembly mnemonic used in listings.
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$variant => $mnemonic,)*
                }
            }
        }
    };
}

opcode_table! {
    (Add, 0, "add"),
    (And, 1, "and"),
    (Break, 2, "break"),
    (BreakC, 3, "breakc"),
    (Call, 4, "call"),
    (CallC, 5, "callc"),
    (Case, 6, "case"),
    (Continue, 7, "continue"),
    (ContinueC, 8, "continuec"),
    (Cut, 9, "cut"),
    (Default, 10, "default"),
    (DerivRtx, 11, "deriv_rtx"),
    (DerivRty, 12, "deriv_rty"),
    (Discard, 13, "discard"),
    (Div, 14, "div"),
    (Dp2, 15, "dp2"),
    (Dp3, 16, "dp3"),
    (Dp4, 17, "dp4"),
    (Else, 18, "else"),
    (Emit, 19, "emit"),
    (EmitThenCut, 20, "emit_then_cut"),
    (EndIf, 21, "endif"),
    (EndLoop, 22, "endloop"),
    (EndSwitch, 23, "endswitch"),
    (Eq, 24, "eq"),
    (Exp, 25, "exp"),
    (Frc, 26, "frc"),
    (FtoI, 27, "ftoi"),
    (FtoU, 28, "ftou"),
    (Ge, 29, "ge"),
    (IAdd, 30, "iadd"),
    (If, 31, "if"),
    (IEq, 32, "ieq"),
    (IGe, 33, "ige"),
    (ILt, 34, "ilt"),
    (IMad, 35, "imad"),
    (IMax, 36, "imax"),
    (IMin, 37, "imin"),
    (IMul, 38, "imul"),
    (INe, 39, "ine"),
    (INeg, 40, "ineg"),
    (IShl, 41, "ishl"),
    (IShr, 42, "ishr"),
    (ItoF, 43, "itof"),
    (Label, 44, "label"),
    (Ld, 45, "ld"),
    (LdMs, 46, "ld_ms"),
    (Log, 47, "log"),
    (Loop, 48, "loop"),
    (Lt, 49, "lt"),
    (Mad, 50, "mad"),
    (Min, 51, "min"),
    (Max, 52, "max"),
    (CustomData, 53, "customdata"),
    (Mov, 54, "mov"),
    (MovC, 55, "movc"),
    (Mul, 56, "mul"),
    (Ne, 57, "ne"),
    (Nop, 58, "nop"),
    (Not, 59, "not"),
    (Or, 60, "or"),
    (ResInfo, 61, "resinfo"),
    (Ret, 62, "ret"),
    (RetC, 63, "retc"),
    (RoundNe, 64, "round_ne"),
    (RoundNi, 65, "round_ni"),
    (RoundPi, 66, "round_pi"),
    (RoundZ, 67, "round_z"),
    (Rsq, 68, "rsq"),
    (Sample, 69, "sample"),
    (SampleC, 70, "sample_c"),
    (SampleCLz, 71, "sample_c_lz"),
    (SampleL, 72, "sample_l"),
    (SampleD, 73, "sample_d"),
    (SampleB, 74, "sample_b"),
    (Sqrt, 75, "sqrt"),
    (Switch, 76, "switch"),
    (SinCos, 77, "sincos"),
    (UDiv, 78, "udiv"),
    (ULt, 79, "ult"),
    (UGe, 80, "uge"),
    (UMul, 81, "umul"),
    (UMad, 82, "umad"),
    (UMax, 83, "umax"),
    (UMin, 84, "umin"),
    (UShr, 85, "ushr"),
    (UtoF, 86, "utof"),
    (Xor, 87, "xor"),
    (DclResource, 88, "dcl_resource"),
    (DclConstantBuffer, 89, "dcl_constantbuffer"),
    (DclSampler, 90, "dcl_sampler"),
    (DclIndexRange, 91, "dcl_indexrange"),
    (DclGsOutputPrimitiveTopology, 92, "dcl_outputtopology"),
    (DclGsInputPrimitive, 93, "dcl_inputprimitive"),
    (DclMaxOutputVertexCount, 94, "dcl_maxout"),
    (DclInput, 95, "dcl_input"),
    (DclInputSgv, 96, "dcl_input_sgv"),
    (DclInputSiv, 97, "dcl_input_siv"),
    (DclInputPs, 98, "dcl_input_ps"),
    (DclInputPsSgv, 99, "dcl_input_ps_sgv"),
    (DclInputPsSiv, 100, "dcl_input_ps_siv"),
    (DclOutput, 101, "dcl_output"),
    (DclOutputSgv, 102, "dcl_output_sgv"),
    (DclOutputSiv, 103, "dcl_output_siv"),
    (DclTemps, 104, "dcl_temps"),
    (DclIndexableTemp, 105, "dcl_indexabletemp"),
    (DclGlobalFlags, 106, "dcl_globalflags"),
    (Reserved0, 107, "reserved0"),
    (Lod, 108, "lod"),
    (Gather4, 109, "gather4"),
    (SamplePos, 110, "samplepos"),
    (SampleInfo, 111, "sampleinfo"),
    (Reserved1, 112, "reserved1"),
    (HsDecls, 113, "hs_decls"),
    (HsControlPointPhase, 114, "hs_control_point_phase"),
    (HsForkPhase, 115, "hs_fork_phase"),
    (HsJoinPhase, 116, "hs_join_phase"),
    (EmitStream, 117, "emit_stream"),
    (CutStream, 118, "cut_stream"),
    (EmitThenCutStream, 119, "emit_then_cut_stream"),
    (InterfaceCall, 120, "fcall"),
    (BufInfo, 121, "bufinfo"),
    (DerivRtxCoarse, 122, "deriv_rtx_coarse"),
    (DerivRtxFine, 123, "deriv_rtx_fine"),
    (DerivRtyCoarse, 124, "deriv_rty_coarse"),
    (DerivRtyFine, 125, "deriv_rty_fine"),
    (Gather4C, 126, "gather4_c"),
    (Gather4Po, 127, "gather4_po"),
    (Gather4PoC, 128, "gather4_po_c"),
    (Rcp, 129, "rcp"),
    (F32toF16, 130, "f32tof16"),
    (F16toF32, 131, "f16tof32"),
    (UAddC, 132, "uaddc"),
    (USubB, 133, "usubb"),
    (CountBits, 134, "countbits"),
    (FirstBitHi, 135, "firstbit_hi"),
    (FirstBitLo, 136, "firstbit_lo"),
    (FirstBitShi, 137, "firstbit_shi"),
    (UBfe, 138, "ubfe"),
    (IBfe, 139, "ibfe"),
    (Bfi, 140, "bfi"),
    (BfRev, 141, "bfrev"),
    (SwapC, 142, "swapc"),
    (DclStream, 143, "dcl_stream"),
    (DclFunctionBody, 144, "dcl_function_body"),
    (DclFunctionTable, 145, "dcl_function_table"),
    (DclInterface, 146, "dcl_interface"),
    (DclInputControlPointCount, 147, "dcl_input_control_point_count"),
    (DclOutputControlPointCount, 148, "dcl_output_control_point_count"),
    (DclTessDomain, 149, "dcl_tessellator_domain"),
    (DclTessPartitioning, 150, "dcl_tessellator_partitioning"),
    (DclTessOutputPrimitive, 151, "dcl_tessellator_output_primitive"),
    (DclHsMaxTessFactor, 152, "dcl_hs_max_tessfactor"),
    (DclHsForkPhaseInstanceCount, 153, "dcl_hs_fork_phase_instance_count"),
    (DclHsJoinPhaseInstanceCount, 154, "dcl_hs_join_phase_instance_count"),
    (DclThreadGroup, 155, "dcl_thread_group"),
    (DclUavTyped, 156, "dcl_uav_typed"),
    (DclUavRaw, 157, "dcl_uav_raw"),
    (DclUavStructured, 158, "dcl_uav_structured"),
    (DclTgsmRaw, 159, "dcl_tgsm_raw"),
    (DclTgsmStructured, 160, "dcl_tgsm_structured"),
    (DclResourceRaw, 161, "dcl_resource_raw"),
    (DclResourceStructured, 162, "dcl_resource_structured"),
    (LdUavTyped, 163, "ld_uav_typed"),
    (StoreUavTyped, 164, "store_uav_typed"),
    (LdRaw, 165, "ld_raw"),
    (StoreRaw, 166, "store_raw"),
    (LdStructured, 167, "ld_structured"),
    (StoreStructured, 168, "store_structured"),
    (AtomicAnd, 169, "atomic_and"),
    (AtomicOr, 170, "atomic_or"),
    (AtomicXor, 171, "atomic_xor"),
    (AtomicCmpStore, 172, "atomic_cmp_store"),
    (AtomicIAdd, 173, "atomic_iadd"),
    (AtomicIMax, 174, "atomic_imax"),
    (AtomicIMin, 175, "atomic_imin"),
    (AtomicUMax, 176, "atomic_umax"),
    (AtomicUMin, 177, "atomic_umin"),
    (ImmAtomicAlloc, 178, "imm_atomic_alloc"),
    (ImmAtomicConsume, 179, "imm_atomic_consume"),
    (ImmAtomicIAdd, 180, "imm_atomic_iadd"),
    (ImmAtomicAnd, 181, "imm_atomic_and"),
    (ImmAtomicOr, 182, "imm_atomic_or"),
    (ImmAtomicXor, 183, "imm_atomic_xor"),
    (ImmAtomicExch, 184, "imm_atomic_exch"),
    (ImmAtomicCmpExch, 185, "imm_atomic_cmp_exch"),
    (ImmAtomicIMax, 186, "imm_atomic_imax"),
    (ImmAtomicIMin, 187, "imm_atomic_imin"),
    (ImmAtomicUMax, 188, "imm_atomic_umax"),
    (ImmAtomicUMin, 189, "imm_atomic_umin"),
    (Sync, 190, "sync"),
    (DAdd, 191, "dadd"),
    (DMax, 192, "dmax"),
    (DMin, 193, "dmin"),
    (DMul, 194, "dmul"),
    (DEq, 195, "deq"),
    (DGe, 196, "dge"),
    (DLt, 197, "dlt"),
    (DNe, 198, "dne"),
    (DMov, 199, "dmov"),
    (DMovC, 200, "dmovc"),
    (DtoF, 201, "dtof"),
    (FtoD, 202, "ftod"),
    (EvalSnapped, 203, "eval_snapped"),
    (EvalSampleIndex, 204, "eval_sample_index"),
    (EvalCentroid, 205, "eval_centroid"),
    (DclGsInstanceCount, 206, "dcl_gsinstances"),
    (Abort, 207, "abort"),
    (DebugBreak, 208, "debugbreak"),
    (Reserved2, 209, "reserved2"),
    (DDiv, 210, "ddiv"),
    (DFma, 211, "dfma"),
    (DRcp, 212, "drcp"),
    (Msad, 213, "msad"),
    (DtoI, 214, "dtoi"),
    (DtoU, 215, "dtou"),
    (ItoD, 216, "itod"),
    (UtoD, 217, "utod"),
}

impl Opcode {
    /// One past the largest discriminant; sizes the per-shader opcode-used
    /// table.
    pub const COUNT: usize = 218;

    /// Hull-shader phase-start markers, which double as phase boundaries for
    /// the stream walker.
    pub fn is_hull_phase_marker(self) -> bool {
        matches!(
            self,
            Self::HsControlPointPhase | Self::HsForkPhase | Self::HsJoinPhase
        )
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
