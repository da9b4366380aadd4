use arch::inst::Tag;
use serde::Serialize;

use crate::{
    context::{ExternalRef, Resolved},
    error::Warning,
    symbol::{Kind, Section, Symbols},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub address: u16,
}

/// Address of a word the linker has to patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    pub address: u16,
    pub tag: Tag,
}

/// Final product of a clean run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub origin: u16,
    /// `origin + code.len()`: where the data image starts.
    pub data_base: u16,
    pub code: Vec<(u16, Tag)>,
    pub data: Vec<u16>,
    pub symbols: Symbols,
    pub entries: Vec<Entry>,
    pub externals: Vec<ExternalRef>,
    pub warnings: Vec<Warning>,
}

impl Object {
    pub fn code_len(&self) -> u16 {
        self.code.len() as u16
    }

    pub fn data_len(&self) -> u16 {
        self.data.len() as u16
    }

    /// Code words with their addresses.
    pub fn code_words(&self) -> impl Iterator<Item = (u16, u16, Tag)> + '_ {
        let origin = self.origin;
        self.code
            .iter()
            .enumerate()
            .map(move |(i, &(word, tag))| (origin.wrapping_add(i as u16), word, tag))
    }

    /// Data words with their addresses.
    pub fn data_words(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        let base = self.data_base;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &word)| (base.wrapping_add(i as u16), word))
    }

    pub fn relocations(&self) -> Vec<Relocation> {
        self.code_words()
            .filter(|(_, _, tag)| *tag != Tag::Absolute)
            .map(|(address, _, tag)| Relocation { address, tag })
            .collect()
    }
}

/// Place the data image after the code and fix every address that depends
/// on it.
pub fn finalize(resolved: Resolved) -> Object {
    let Resolved {
        origin,
        code,
        data,
        mut symbols,
        entries,
        externals,
        warnings,
    } = resolved;
    let data_base = origin.wrapping_add(code.len() as u16);

    let code = code
        .into_iter()
        .map(|word| {
            let value = if word.data_fixup {
                word.value.wrapping_add(data_base)
            } else {
                word.value
            };
            (value, word.tag)
        })
        .collect();

    for sym in symbols.iter_mut() {
        if sym.section() == Some(Section::Data) {
            sym.address = sym.address.map(|a| a.wrapping_add(data_base));
        }
        if let Kind::Entry { section, .. } = sym.kind {
            sym.kind = Kind::Entry {
                section,
                resolved: true,
            };
        }
    }

    let entries = entries
        .into_iter()
        .filter_map(|name| {
            let address = symbols.lookup(&name)?.address?;
            Some(Entry { name, address })
        })
        .collect();

    Object {
        origin,
        data_base,
        code,
        data,
        symbols,
        entries,
        externals,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::Word;

    fn resolved() -> Resolved {
        let mut symbols = Symbols::new();
        symbols
            .define(
                "MAIN",
                Some(10),
                Kind::Entry {
                    section: Section::Code,
                    resolved: false,
                },
                1,
            )
            .unwrap();
        symbols
            .define(
                "X",
                Some(1),
                Kind::Entry {
                    section: Section::Data,
                    resolved: false,
                },
                2,
            )
            .unwrap();
        symbols.define("F", None, Kind::External, 3).unwrap();
        Resolved {
            origin: 10,
            code: vec![
                Word::absolute(0x1208),
                Word {
                    value: 1,
                    tag: Tag::Relocatable,
                    external: None,
                    data_fixup: true,
                },
                Word {
                    value: 0,
                    tag: Tag::External,
                    external: Some("F".into()),
                    data_fixup: false,
                },
                Word {
                    value: 1u16.wrapping_sub(13),
                    tag: Tag::Absolute,
                    external: None,
                    data_fixup: true,
                },
            ],
            data: vec![5, 6],
            symbols,
            entries: vec!["MAIN".into(), "X".into()],
            externals: vec![ExternalRef {
                address: 12,
                name: "F".into(),
            }],
            warnings: vec![],
        }
    }

    #[test]
    fn rebase() {
        let obj = finalize(resolved());
        assert_eq!(obj.data_base, 14);
        assert_eq!(obj.code[1], (15, Tag::Relocatable));
        // relative reference from 13 to X at 15
        assert_eq!(obj.code[3], (2, Tag::Absolute));
        assert_eq!(obj.symbols.lookup("X").unwrap().address, Some(15));
        assert_eq!(obj.symbols.lookup("MAIN").unwrap().address, Some(10));
        assert_eq!(
            obj.entries,
            vec![
                Entry {
                    name: "MAIN".into(),
                    address: 10
                },
                Entry {
                    name: "X".into(),
                    address: 15
                }
            ]
        );
        assert!(obj.symbols.iter().all(|s| !matches!(
            s.kind,
            Kind::Entry {
                resolved: false,
                ..
            }
        )));
    }

    #[test]
    fn addresses() {
        let obj = finalize(resolved());
        assert_eq!(
            obj.relocations(),
            vec![
                Relocation {
                    address: 11,
                    tag: Tag::Relocatable
                },
                Relocation {
                    address: 12,
                    tag: Tag::External
                }
            ]
        );
        assert_eq!(
            obj.data_words().collect::<Vec<_>>(),
            vec![(14, 5), (15, 6)]
        );
        assert_eq!(obj.code_words().next(), Some((10, 0x1208, Tag::Absolute)));
    }
}
