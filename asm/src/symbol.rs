use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Code,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Code,
    Data,
    External,
    /// A code or data symbol exported with `.entry`. `resolved` is set once
    /// the address is final.
    Entry { section: Section, resolved: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// `None` for externals, whose address is never known locally.
    pub address: Option<u16>,
    pub kind: Kind,
    /// Line of the definition (1-based).
    pub line: usize,
}

impl Symbol {
    pub fn section(&self) -> Option<Section> {
        match self.kind {
            Kind::Code => Some(Section::Code),
            Kind::Data => Some(Section::Data),
            Kind::Entry { section, .. } => Some(section),
            Kind::External => None,
        }
    }

    pub fn is_external(&self) -> bool {
        self.kind == Kind::External
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Code => write!(f, "code"),
            Kind::Data => write!(f, "data"),
            Kind::External => write!(f, "external"),
            Kind::Entry {
                resolved: false, ..
            } => write!(f, "entry-pending"),
            Kind::Entry { resolved: true, .. } => write!(f, "entry"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Duplicate symbol: `{0}`")]
    DuplicateSymbol(String),

    #[error("Unknown symbol: `{0}`")]
    UnknownSymbol(String),

    #[error("External symbol cannot be an entry: `{0}`")]
    ExternalAsEntry(String),
}

/// Symbol table of one assembly run, kept in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols(IndexMap<String, Symbol>);

impl Symbols {
    pub fn new() -> Self {
        Symbols(IndexMap::new())
    }

    pub fn define(
        &mut self,
        name: &str,
        address: Option<u16>,
        kind: Kind,
        line: usize,
    ) -> Result<(), Error> {
        if self.0.contains_key(name) {
            return Err(Error::DuplicateSymbol(name.to_string()));
        }
        self.0.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                address,
                kind,
                line,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.0.get(name)
    }

    /// Mark a code/data symbol as an entry. Promoting twice is a no-op.
    pub fn promote_to_entry(&mut self, name: &str) -> Result<&Symbol, Error> {
        let sym = self
            .0
            .get_mut(name)
            .ok_or_else(|| Error::UnknownSymbol(name.to_string()))?;
        sym.kind = match sym.kind {
            Kind::Code => Kind::Entry {
                section: Section::Code,
                resolved: false,
            },
            Kind::Data => Kind::Entry {
                section: Section::Data,
                resolved: false,
            },
            Kind::External => return Err(Error::ExternalAsEntry(name.to_string())),
            entry @ Kind::Entry { .. } => entry,
        };
        Ok(sym)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Symbol> {
        self.0.values_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut syms = Symbols::new();
        syms.define("MAIN", Some(100), Kind::Code, 1).unwrap();
        syms.define("FUNC", None, Kind::External, 2).unwrap();

        let main = syms.lookup("MAIN").unwrap();
        assert_eq!(main.address, Some(100));
        assert_eq!(main.section(), Some(Section::Code));
        assert!(syms.lookup("FUNC").unwrap().is_external());
        assert!(syms.lookup("NOPE").is_none());
    }

    #[test]
    fn redefinition_keeps_first() {
        let mut syms = Symbols::new();
        syms.define("X", Some(0), Kind::Data, 1).unwrap();
        assert_eq!(
            syms.define("X", Some(1), Kind::Data, 5),
            Err(Error::DuplicateSymbol("X".into()))
        );
        let x = syms.lookup("X").unwrap();
        assert_eq!((x.address, x.line), (Some(0), 1));
        assert_eq!(syms.len(), 1);
    }

    #[test]
    fn promote() {
        let mut syms = Symbols::new();
        syms.define("D", Some(3), Kind::Data, 1).unwrap();
        syms.define("E", None, Kind::External, 2).unwrap();

        let d = syms.promote_to_entry("D").unwrap();
        assert_eq!(
            d.kind,
            Kind::Entry {
                section: Section::Data,
                resolved: false
            }
        );
        assert!(syms.promote_to_entry("D").is_ok());
        assert_eq!(
            syms.promote_to_entry("E"),
            Err(Error::ExternalAsEntry("E".into()))
        );
        assert_eq!(
            syms.promote_to_entry("U"),
            Err(Error::UnknownSymbol("U".into()))
        );
        assert_eq!(syms.lookup("E").unwrap().kind, Kind::External);
    }

    #[test]
    fn kind_names() {
        assert_eq!(Kind::External.to_string(), "external");
        assert_eq!(
            Kind::Entry {
                section: Section::Code,
                resolved: false
            }
            .to_string(),
            "entry-pending"
        );
    }
}
