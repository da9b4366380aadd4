use crate::{mode::Mode, op::OpKind, reg::Reg};
use color_print::cformat;
use strum::Display;

/// First word of every instruction.
///
/// ```text
/// 15    12 11   9 8    6 5    3 2    0
/// [opcode][s.mode][s.reg][d.mode][d.reg]
/// ```
///
/// Slots an instruction does not use stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Inst {
    pub op: OpKind,
    pub src_mode: Mode,
    pub src_reg: Reg,
    pub dest_mode: Mode,
    pub dest_reg: Reg,
}

impl Inst {
    pub fn to_bin(&self) -> u16 {
        (self.op.opcode() & 0xF) << 12
            | (self.src_mode.field() & 0x7) << 9
            | (self.src_reg.field() & 0x7) << 6
            | (self.dest_mode.field() & 0x7) << 3
            | (self.dest_reg.field() & 0x7)
    }

    /// `None` if a mode field holds an unassigned value.
    pub fn from_bin(bin: u16) -> Option<Inst> {
        Some(Inst {
            op: OpKind::from_opcode(bin >> 12),
            src_mode: Mode::from_field(bin >> 9)?,
            src_reg: Reg::from_field(bin >> 6),
            dest_mode: Mode::from_field(bin >> 3)?,
            dest_reg: Reg::from_field(bin),
        })
    }

    /// Operand words that follow this instruction word.
    pub fn extra_words(&self) -> u16 {
        match self.op.desc().arity {
            0 => 0,
            1 => self.dest_mode.extra_words(),
            _ if self.src_mode.is_register() && self.dest_mode.is_register() => 1,
            _ => self.src_mode.extra_words() + self.dest_mode.extra_words(),
        }
    }

    pub fn cformat(&self) -> String {
        let desc = self.op.desc();
        let slot = |mode: Mode, reg: Reg| match mode {
            Mode::Register => cformat!("<b>{}</>", reg),
            Mode::RegisterIndirect => cformat!("<b>@{}</>", reg),
            _ => cformat!("<y>{}</>", mode),
        };
        match desc.arity {
            0 => cformat!("<r>{:<4}</>", self.op.mnemonic()),
            1 => cformat!(
                "<r>{:<4}</>{}",
                self.op.mnemonic(),
                slot(self.dest_mode, self.dest_reg)
            ),
            _ => cformat!(
                "<r>{:<4}</>{}, {}",
                self.op.mnemonic(),
                slot(self.src_mode, self.src_reg),
                slot(self.dest_mode, self.dest_reg)
            ),
        }
    }
}

/// Extra word shared by two register-class operands: source register in the
/// high byte, destination register in the low byte.
pub fn pack_regs(src: Reg, dest: Reg) -> u16 {
    src.field() << 8 | dest.field()
}

pub fn unpack_regs(word: u16) -> (Reg, Reg) {
    (Reg::from_field(word >> 8), Reg::from_field(word))
}

/// Signed distance from `from` to `target`, as stored in a relative operand word.
pub fn offset(target: u16, from: u16) -> u16 {
    target.wrapping_sub(from)
}

/// Target address of a relative operand word encoded for the instruction at `from`.
pub fn apply_offset(word: u16, from: u16) -> u16 {
    from.wrapping_add(word)
}

/// Relocation tag carried by every object word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Tag {
    /// Final value, never relocated.
    #[default]
    #[strum(serialize = "a")]
    Absolute,
    /// Local address; the load base is added at link time.
    #[strum(serialize = "r")]
    Relocatable,
    /// Placeholder; the linker supplies the value.
    #[strum(serialize = "e")]
    External,
}
