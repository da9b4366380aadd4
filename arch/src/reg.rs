use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Serialize,
    Deserialize,
    Default,
    FromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
    Eq,
    Hash,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Reg {
    #[default]
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Reg {
    /// Register names are case-insensitive: `r3` and `R3` are the same register.
    pub fn parse(s: &str) -> Option<Self> {
        s.to_ascii_lowercase().parse::<Self>().ok()
    }

    /// Value of the 3-bit register field.
    pub fn field(self) -> u16 {
        u8::from(self) as u16
    }

    pub fn from_field(bits: u16) -> Self {
        Reg::from((bits & 0x7) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parse() {
        assert_eq!(Reg::parse("r2"), Some(Reg::R2));
        assert_eq!(Reg::parse("R7"), Some(Reg::R7));
        assert_eq!(Reg::parse("r8"), None);
        assert_eq!(Reg::parse("sp"), None);
        assert_eq!(Reg::parse("r"), None);
    }

    #[test]
    fn field() {
        for reg in Reg::iter() {
            assert_eq!(Reg::from_field(reg.field()), reg);
        }
        assert_eq!(Reg::R5.to_string(), "r5");
    }
}
