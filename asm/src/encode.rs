use arch::{
    inst::{offset, pack_regs, Inst, Tag},
    mode::Mode,
    op::Desc,
};

use crate::{
    error::Error,
    parser::Operand,
    symbol::{Section, Symbols},
};

/// One emitted object word.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Word {
    pub value: u16,
    pub tag: Tag,
    /// Name of the external symbol this word refers to.
    pub external: Option<String>,
    /// The value holds a data-section offset; the data base is added once
    /// the code length is known.
    pub data_fixup: bool,
}

impl Word {
    pub fn absolute(value: u16) -> Self {
        Word {
            value,
            tag: Tag::Absolute,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct Encoded {
    pub words: Vec<Word>,
    pub errors: Vec<Error>,
}

/// Split operands into (source, destination) slots.
fn slots<'a>(desc: &Desc, operands: &'a [Operand]) -> (Option<&'a Operand>, Option<&'a Operand>) {
    match (desc.arity, operands) {
        (2, [src, dest]) => (Some(src), Some(dest)),
        (1, [dest]) => (None, Some(dest)),
        _ => (None, None),
    }
}

/// Operand count and addressing modes against the opcode descriptor.
pub fn check(desc: &Desc, operands: &[Operand]) -> Result<(), Error> {
    if operands.len() != desc.arity {
        return Err(Error::OperandCount {
            op: desc.op.mnemonic(),
            expected: desc.arity,
            got: operands.len(),
        });
    }
    let (src, dest) = slots(desc, operands);
    let mismatch = |operand: &Operand, slot: &'static str| Error::OperandModeMismatch {
        operand: operand.to_string(),
        op: desc.op.mnemonic(),
        slot,
    };
    if let Some(src) = src {
        if !desc.accepts_src(src.mode()) {
            return Err(mismatch(src, "source"));
        }
    }
    if let Some(dest) = dest {
        if !desc.accepts_dest(dest.mode()) {
            return Err(mismatch(dest, "destination"));
        }
    }
    Ok(())
}

/// Number of words the instruction occupies. Needs no symbols.
pub fn size(operands: &[Operand]) -> u16 {
    let modes: Vec<Mode> = operands.iter().map(|o| o.mode()).collect();
    match modes.as_slice() {
        [src, dest] if src.is_register() && dest.is_register() => 2,
        _ => 1 + modes.iter().map(|m| m.extra_words()).sum::<u16>(),
    }
}

/// Encode one instruction placed at `addr`.
///
/// Every operand that fails to resolve still yields a zero word, so the
/// result always has `size(operands)` words.
pub fn encode(desc: &Desc, operands: &[Operand], addr: u16, symbols: &Symbols) -> Encoded {
    let mut encoded = Encoded::default();
    if let Err(err) = check(desc, operands) {
        encoded.errors.push(err);
        encoded.words = vec![Word::absolute(0); size(operands) as usize];
        return encoded;
    }

    let (src, dest) = slots(desc, operands);
    let inst = Inst {
        op: desc.op,
        src_mode: src.map(|o| o.mode()).unwrap_or_default(),
        src_reg: src.and_then(|o| o.reg()).unwrap_or_default(),
        dest_mode: dest.map(|o| o.mode()).unwrap_or_default(),
        dest_reg: dest.and_then(|o| o.reg()).unwrap_or_default(),
    };
    encoded.words.push(Word::absolute(inst.to_bin()));

    if let (Some(s), Some(d)) = (src, dest) {
        if let (Some(sr), Some(dr)) = (s.reg(), d.reg()) {
            encoded.words.push(Word::absolute(pack_regs(sr, dr)));
            return encoded;
        }
    }

    for operand in [src, dest].into_iter().flatten() {
        if operand.mode().is_register() {
            continue;
        }
        match operand_word(operand, addr, symbols) {
            Ok(word) => encoded.words.push(word),
            Err(err) => {
                encoded.errors.push(err);
                encoded.words.push(Word::absolute(0));
            }
        }
    }
    encoded
}

fn operand_word(operand: &Operand, addr: u16, symbols: &Symbols) -> Result<Word, Error> {
    let name = match operand {
        Operand::Immediate(value) => return Ok(Word::absolute(*value)),
        Operand::Direct(name) | Operand::Relative(name) => name,
        Operand::Register(_) | Operand::RegisterIndirect(_) => return Ok(Word::absolute(0)),
    };
    let sym = symbols
        .lookup(name)
        .ok_or_else(|| Error::UndefinedSymbol(name.clone()))?;
    let relative = matches!(operand, Operand::Relative(_));

    if sym.is_external() {
        if relative {
            return Err(Error::ExternalInRelativeOperand(name.clone()));
        }
        return Ok(Word {
            value: 0,
            tag: Tag::External,
            external: Some(name.clone()),
            data_fixup: false,
        });
    }

    let target = sym.address.unwrap_or_default();
    let data_fixup = sym.section() == Some(Section::Data);
    Ok(if relative {
        Word {
            value: offset(target, addr),
            tag: Tag::Absolute,
            external: None,
            data_fixup,
        }
    } else {
        Word {
            value: target,
            tag: Tag::Relocatable,
            external: None,
            data_fixup,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Kind;
    use arch::{op::OpKind, reg::Reg};

    fn symbols() -> Symbols {
        let mut syms = Symbols::new();
        syms.define("LOOP", Some(100), Kind::Code, 1).unwrap();
        syms.define("X", Some(2), Kind::Data, 2).unwrap();
        syms.define("FUNC", None, Kind::External, 3).unwrap();
        syms
    }

    fn values(encoded: &Encoded) -> Vec<(u16, Tag)> {
        encoded.words.iter().map(|w| (w.value, w.tag)).collect()
    }

    #[test]
    fn sizes() {
        use Operand::*;
        assert_eq!(size(&[]), 1);
        assert_eq!(size(&[Register(Reg::R1)]), 1);
        assert_eq!(size(&[Direct("X".into())]), 2);
        assert_eq!(size(&[Register(Reg::R1), RegisterIndirect(Reg::R2)]), 2);
        assert_eq!(size(&[Immediate(1), Register(Reg::R2)]), 2);
        assert_eq!(size(&[Immediate(1), Direct("X".into())]), 3);
    }

    #[test]
    fn immediate_and_register() {
        let ops = [Operand::Immediate(5), Operand::Register(Reg::R2)];
        let enc = encode(&OpKind::ADD.desc(), &ops, 0, &symbols());
        assert!(enc.errors.is_empty());
        assert_eq!(
            values(&enc),
            vec![(0b0010_000_000_011_010, Tag::Absolute), (5, Tag::Absolute)]
        );
    }

    #[test]
    fn register_pair() {
        let ops = [
            Operand::Register(Reg::R3),
            Operand::RegisterIndirect(Reg::R1),
        ];
        let enc = encode(&OpKind::MOV.desc(), &ops, 0, &symbols());
        assert_eq!(
            values(&enc),
            vec![(0b0000_011_011_100_001, Tag::Absolute), (0x0301, Tag::Absolute)]
        );
    }

    #[test]
    fn relative_backwards() {
        let ops = [Operand::Relative("LOOP".into())];
        let enc = encode(&OpKind::JMP.desc(), &ops, 103, &symbols());
        assert!(enc.errors.is_empty());
        assert_eq!(enc.words[1].value as i16, -3);
        assert_eq!(enc.words[1].tag, Tag::Absolute);
    }

    #[test]
    fn direct_symbols() {
        let ops = [Operand::Direct("X".into()), Operand::Direct("FUNC".into())];
        let enc = encode(&OpKind::MOV.desc(), &ops, 10, &symbols());
        assert!(enc.errors.is_empty());
        assert_eq!(enc.words[1].value, 2);
        assert_eq!(enc.words[1].tag, Tag::Relocatable);
        assert!(enc.words[1].data_fixup);
        assert_eq!(enc.words[2].value, 0);
        assert_eq!(enc.words[2].tag, Tag::External);
        assert_eq!(enc.words[2].external.as_deref(), Some("FUNC"));
    }

    #[test]
    fn recovery_keeps_width() {
        let ops = [Operand::Relative("FUNC".into())];
        let enc = encode(&OpKind::JSR.desc(), &ops, 0, &symbols());
        assert!(matches!(
            enc.errors.as_slice(),
            [Error::ExternalInRelativeOperand(name)] if name == "FUNC"
        ));
        assert_eq!(values(&enc)[1], (0, Tag::Absolute));
        assert_eq!(enc.words.len(), 2);

        let ops = [Operand::Direct("NOPE".into()), Operand::Direct("Y".into())];
        let enc = encode(&OpKind::MOV.desc(), &ops, 0, &symbols());
        assert_eq!(enc.errors.len(), 2);
        assert_eq!(enc.words.len(), 3);
    }

    #[test]
    fn mode_checks() {
        let relative = [Operand::Relative("LOOP".into())];
        assert!(matches!(
            check(&OpKind::INC.desc(), &relative),
            Err(Error::OperandModeMismatch { slot: "destination", .. })
        ));
        let imm_dest = [Operand::Immediate(1), Operand::Immediate(2)];
        assert!(check(&OpKind::CMP.desc(), &imm_dest).is_ok());
        assert!(check(&OpKind::MOV.desc(), &imm_dest).is_err());
        let lea = [Operand::Register(Reg::R1), Operand::Register(Reg::R2)];
        assert!(matches!(
            check(&OpKind::LEA.desc(), &lea),
            Err(Error::OperandModeMismatch { slot: "source", .. })
        ));
        assert!(matches!(
            check(&OpKind::HLT.desc(), &relative),
            Err(Error::OperandCount {
                expected: 0,
                got: 1,
                ..
            })
        ));
    }
}
