use crate::mode::Mode;
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    FromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum OpKind {
    #[default]
    MOV,
    CMP,
    ADD,
    SUB,
    MUL,
    DIV,
    LEA,
    INC,
    DEC,
    JNZ,
    JNC,
    JMP,
    PRN,
    JSR,
    RTS,
    HLT,
}

impl OpKind {
    /// Mnemonics are case-insensitive.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_uppercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }

    pub fn mnemonic(&self) -> String {
        self.to_string().to_lowercase()
    }

    pub fn opcode(self) -> u16 {
        u8::from(self) as u16
    }

    pub fn from_opcode(bits: u16) -> Self {
        OpKind::from((bits & 0xF) as u8)
    }
}

const ALL: &[Mode] = &[
    Mode::Immediate,
    Mode::Direct,
    Mode::Register,
    Mode::RegisterIndirect,
];
const WRITABLE: &[Mode] = &[Mode::Direct, Mode::Register, Mode::RegisterIndirect];
const JUMP: &[Mode] = &[Mode::Direct, Mode::Relative, Mode::RegisterIndirect];
const LABEL: &[Mode] = &[Mode::Direct];
const NONE: &[Mode] = &[];

/// Opcode descriptor: arity and the modes each operand slot accepts.
///
/// A one-operand instruction only has the destination slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Desc {
    pub op: OpKind,
    pub arity: usize,
    pub src: &'static [Mode],
    pub dest: &'static [Mode],
}

impl Desc {
    pub fn accepts_src(&self, mode: Mode) -> bool {
        self.src.contains(&mode)
    }

    pub fn accepts_dest(&self, mode: Mode) -> bool {
        self.dest.contains(&mode)
    }
}

impl OpKind {
    pub fn desc(&self) -> Desc {
        use OpKind::*;
        let (arity, src, dest) = match self {
            MOV => (2, ALL, WRITABLE),
            CMP => (2, ALL, ALL),
            ADD => (2, ALL, WRITABLE),
            SUB => (2, ALL, WRITABLE),
            MUL => (2, ALL, WRITABLE),
            DIV => (2, ALL, WRITABLE),
            LEA => (2, LABEL, WRITABLE),
            INC => (1, NONE, WRITABLE),
            DEC => (1, NONE, WRITABLE),
            JMP => (1, NONE, JUMP),
            JNZ => (1, NONE, JUMP),
            JNC => (1, NONE, JUMP),
            JSR => (1, NONE, JUMP),
            PRN => (1, NONE, ALL),
            RTS => (0, NONE, NONE),
            HLT => (0, NONE, NONE),
        };
        Desc {
            op: *self,
            arity,
            src,
            dest,
        }
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, OpKind::JMP | OpKind::JNZ | OpKind::JNC | OpKind::JSR)
    }
}
