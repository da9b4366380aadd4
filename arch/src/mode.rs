use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Operand addressing modes. The discriminant is the 3-bit mode field of the
/// instruction word.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum Mode {
    /// `#value`
    #[default]
    Immediate = 0,
    /// `LABEL`
    Direct = 1,
    /// `&LABEL`, jump-class opcodes only
    Relative = 2,
    /// `rN`
    Register = 3,
    /// `@rN`
    RegisterIndirect = 4,
}

impl Mode {
    pub fn is_register(self) -> bool {
        matches!(self, Mode::Register | Mode::RegisterIndirect)
    }

    /// Extra words the operand needs on its own.
    ///
    /// Register operands live in the instruction word; a pair of them shares a
    /// single extra word, which is decided per instruction, not per operand.
    pub fn extra_words(self) -> u16 {
        if self.is_register() {
            0
        } else {
            1
        }
    }

    pub fn field(self) -> u16 {
        u8::from(self) as u16
    }

    pub fn from_field(bits: u16) -> Option<Self> {
        Mode::try_from((bits & 0x7) as u8).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn field() {
        for mode in Mode::iter() {
            assert_eq!(Mode::from_field(mode.field()), Some(mode));
        }
        assert_eq!(Mode::from_field(5), None);
        assert_eq!(Mode::from_field(7), None);
    }

    #[test]
    fn extra_words() {
        assert_eq!(Mode::Immediate.extra_words(), 1);
        assert_eq!(Mode::Relative.extra_words(), 1);
        assert_eq!(Mode::RegisterIndirect.extra_words(), 0);
    }
}
