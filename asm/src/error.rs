use color_print::cprintln;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Malformed directive: {0}")]
    MalformedDirective(String),

    #[error("Unknown operation: `{0}`")]
    UnknownOperation(String),

    #[error("Wrong number of operands for `{op}`: expected {expected}, got {got}")]
    OperandCount {
        op: String,
        expected: usize,
        got: usize,
    },

    #[error("Re-defined label: `{0}`")]
    RedefinedLabel(String),

    #[error("Undefined symbol: `{0}`")]
    UndefinedSymbol(String),

    #[error("Entry symbol is never defined: `{0}`")]
    UndefinedEntry(String),

    #[error("External symbol `{0}` cannot be used as a relative operand")]
    ExternalInRelativeOperand(String),

    #[error("External symbol `{0}` cannot be an entry")]
    ExternalAsEntry(String),

    #[error("Operand `{operand}` is not a valid {slot} operand for `{op}`")]
    OperandModeMismatch {
        operand: String,
        op: String,
        slot: &'static str,
    },

    #[error("Image does not fit in 16-bit memory: it would end at {0:#x}")]
    ImageFull(usize),

    #[error("Source is empty")]
    EmptySource,

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),

    #[error("Invalid config file: {0}")]
    Config(String, #[source] serde_yaml::Error),
}

impl Error {
    /// Name of the error class, as shown in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Syntax(_)
            | Error::MalformedDirective(_)
            | Error::UnknownOperation(_)
            | Error::OperandCount { .. } => "SyntaxError",
            Error::RedefinedLabel(_) => "RedefinedLabel",
            Error::UndefinedSymbol(_) => "UndefinedSymbol",
            Error::UndefinedEntry(_) => "UndefinedEntry",
            Error::ExternalInRelativeOperand(_) => "ExternalInRelativeOperand",
            Error::ExternalAsEntry(_) => "ExternalAsEntry",
            Error::OperandModeMismatch { .. } => "OperandModeMismatch",
            Error::ImageFull(_) => "ImageFull",
            Error::EmptySource => "EmptySource",
            Error::FileOpen(..)
            | Error::FileRead(..)
            | Error::FileCreate(..)
            | Error::FileWrite(..)
            | Error::Config(..) => "IoError",
        }
    }
}

/// An error tied to a source line (1-based, 0 for the whole file).
#[derive(Debug)]
pub struct Diagnostic {
    pub line: usize,
    pub error: Error,
}

/// A non-fatal remark tied to a source line (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, error: Error) -> Self {
        Diagnostic { line, error }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, file: &str, lines: &[String]) {
        cprintln!(
            "<red,bold>error[{}]</>: {}",
            self.error.kind(),
            self.error
        );
        if self.line == 0 {
            cprintln!("     <blue>--></> <underline>{}</>", file);
            return;
        }
        print_location(file, lines, self.line);
    }
}

impl Warning {
    pub fn new(line: usize, message: String) -> Self {
        Warning { line, message }
    }

    pub fn print_diag(&self, file: &str, lines: &[String]) {
        cprintln!("<yellow,bold>warn</>: {}", self.message);
        print_location(file, lines, self.line);
    }
}

fn print_location(file: &str, lines: &[String], line_num: usize) {
    cprintln!("     <blue>--></> <underline>{}:{}</>", file, line_num);
    cprintln!("      <blue>|</>");

    let line_content = line_num
        .checked_sub(1)
        .and_then(|idx| lines.get(idx))
        .map(|s| s.as_str())
        .unwrap_or("");

    cprintln!(" <blue>{:>4} |</> {}", line_num, line_content);
    cprintln!("      <blue>|</>");
}
