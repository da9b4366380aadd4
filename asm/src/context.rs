use serde::{Deserialize, Serialize};

use crate::{
    encode::Word,
    error::{Diagnostic, Error, Warning},
    symbol::Symbols,
};

/// Knobs of one assembly run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Address of the first code word.
    pub origin: u16,
    /// Longer source lines get a warning.
    pub max_line_len: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            origin: 0,
            max_line_len: 80,
        }
    }
}

/// Use of an external symbol by one operand word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalRef {
    pub address: u16,
    pub name: String,
}

/// State shared by both passes of one run.
#[derive(Debug, Default)]
pub struct Context {
    pub options: Options,
    pub symbols: Symbols,
    /// Code image, filled by Pass 2.
    pub code: Vec<Word>,
    /// Data image, filled by Pass 1.
    pub data: Vec<u16>,
    /// Instruction counter: code words sized so far.
    pub ic: u16,
    /// `.entry` requests as (line, name), collected by Pass 1.
    pub entry_requests: Vec<(usize, String)>,
    /// Promoted entry names in first-request order.
    pub entries: Vec<String>,
    pub externals: Vec<ExternalRef>,
    pub diagnostics: Vec<Diagnostic>,
    pub warnings: Vec<Warning>,
}

impl Context {
    pub fn new(options: Options) -> Self {
        Context {
            options,
            ..Default::default()
        }
    }

    /// Data counter: data words emitted so far.
    pub fn dc(&self) -> u16 {
        self.data.len() as u16
    }

    /// Room for `words` more code or data words. The image runs from
    /// `origin` and its end address must still be a 16-bit value.
    pub fn reserve(&self, words: usize) -> Result<(), Error> {
        let end = usize::from(self.options.origin)
            + usize::from(self.ic)
            + self.data.len()
            + words;
        if end > usize::from(u16::MAX) {
            Err(Error::ImageFull(end))
        } else {
            Ok(())
        }
    }

    pub fn error(&mut self, line: usize, error: Error) {
        self.diagnostics.push(Diagnostic::new(line, error));
    }

    pub fn warn(&mut self, line: usize, message: String) {
        self.warnings.push(Warning::new(line, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Freeze the state after a clean Pass 2.
    pub fn into_resolved(self) -> Resolved {
        Resolved {
            origin: self.options.origin,
            code: self.code,
            data: self.data,
            symbols: self.symbols,
            entries: self.entries,
            externals: self.externals,
            warnings: self.warnings,
        }
    }
}

/// Output of Pass 2: every word encoded, data still addressed from zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub origin: u16,
    pub code: Vec<Word>,
    pub data: Vec<u16>,
    pub symbols: Symbols,
    pub entries: Vec<String>,
    pub externals: Vec<ExternalRef>,
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_yaml() {
        let opts: Options = serde_yaml::from_str("origin: 100\n").unwrap();
        assert_eq!(
            opts,
            Options {
                origin: 100,
                max_line_len: 80
            }
        );
    }

    #[test]
    fn errors_are_recorded() {
        let mut ctx = Context::new(Options::default());
        assert!(!ctx.has_errors());
        ctx.warn(1, "long line".into());
        assert!(!ctx.has_errors());
        ctx.error(2, Error::UndefinedSymbol("X".into()));
        assert!(ctx.has_errors());
        assert_eq!(ctx.diagnostics[0].line, 2);
    }

    #[test]
    fn reserve() {
        let mut ctx = Context::new(Options {
            origin: 0xFFF0,
            ..Default::default()
        });
        ctx.ic = 10;
        ctx.data = vec![0; 4];
        assert!(ctx.reserve(1).is_ok());
        assert!(matches!(ctx.reserve(2), Err(Error::ImageFull(0x10000))));
    }
}
