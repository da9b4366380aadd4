use arch::{mode::Mode, op::OpKind, reg::Reg};
use std::fmt;
use std::num::ParseIntError;

use crate::{error::Error, token};

// ----------------------------------------------------------------------------
// Line

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub label: Option<String>,
    pub stmt: Stmt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Empty,
    Data(Vec<u16>),
    /// String literal contents and whether the closing quote was found.
    Str(String, bool),
    Entry(String),
    Extern(String),
    Inst(OpKind, Vec<Operand>),
}

impl Line {
    /// Parse one raw source line (comment included).
    pub fn parse(raw: &str) -> Result<Line, Error> {
        let code = token::clean(raw);
        if code.is_empty() {
            return Ok(Line {
                label: None,
                stmt: Stmt::Empty,
            });
        }

        let (first, rest) = token::head(code);
        let (label, code) = match first.strip_suffix(':') {
            Some(name) => {
                if !is_label_name(name) {
                    return Err(Error::Syntax(format!("invalid label name `{}`", name)));
                }
                if rest.is_empty() {
                    return Err(Error::Syntax(format!(
                        "label `{}` must be followed by an instruction or a directive",
                        name
                    )));
                }
                (Some(name.to_string()), rest)
            }
            None => (None, code),
        };

        Ok(Line {
            label,
            stmt: Stmt::parse(code)?,
        })
    }
}

impl Stmt {
    fn parse(code: &str) -> Result<Stmt, Error> {
        let (word, args) = token::head(code);

        if word.starts_with('.') {
            return match word.to_ascii_lowercase().as_str() {
                ".data" => Stmt::parse_data(args),
                ".string" => Stmt::parse_string(args),
                ".entry" => Ok(Stmt::Entry(Stmt::parse_symbol(".entry", args)?)),
                ".extern" => Ok(Stmt::Extern(Stmt::parse_symbol(".extern", args)?)),
                _ => Err(Error::MalformedDirective(format!(
                    "unknown directive `{}`",
                    word
                ))),
            };
        }

        let op = OpKind::parse(word).map_err(|_| Error::UnknownOperation(word.to_string()))?;
        let operands = if args.is_empty() {
            vec![]
        } else {
            args.split(',')
                .map(|tok| Operand::parse(token::trim(tok, token::BLANKS)))
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(Stmt::Inst(op, operands))
    }

    fn parse_data(args: &str) -> Result<Stmt, Error> {
        if args.is_empty() {
            return Err(Error::MalformedDirective(
                "`.data` expects at least one number".to_string(),
            ));
        }
        args.split(',')
            .map(|tok| {
                let tok = token::trim(tok, token::BLANKS);
                parse_number(tok).ok_or_else(|| {
                    Error::MalformedDirective(format!("not a valid numeric literal: `{}`", tok))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Stmt::Data)
    }

    fn parse_string(args: &str) -> Result<Stmt, Error> {
        let body = args.strip_prefix('"').ok_or_else(|| {
            Error::MalformedDirective(format!("not a valid string literal: `{}`", args))
        })?;
        if let Some(c) = body.chars().find(|c| c.len_utf16() > 1) {
            return Err(Error::MalformedDirective(format!(
                "character `{}` does not fit in one word",
                c
            )));
        }
        match body.find('"') {
            Some(end) if end + 1 == body.len() => Ok(Stmt::Str(body[..end].to_string(), true)),
            Some(_) => Err(Error::MalformedDirective(format!(
                "unexpected characters after string literal: `{}`",
                args
            ))),
            None => Ok(Stmt::Str(body.to_string(), false)),
        }
    }

    fn parse_symbol(directive: &str, args: &str) -> Result<String, Error> {
        match token::split(args, token::BLANKS).as_slice() {
            [name] if is_label_name(name) => Ok(name.to_string()),
            _ => Err(Error::MalformedDirective(format!(
                "`{}` expects one symbol name, got `{}`",
                directive, args
            ))),
        }
    }
}

// ----------------------------------------------------------------------------
// Operand

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Immediate(u16),
    Direct(String),
    Relative(String),
    Register(Reg),
    RegisterIndirect(Reg),
}

impl Operand {
    pub fn parse(tok: &str) -> Result<Operand, Error> {
        let bad = || Error::Syntax(format!("invalid operand `{}`", tok));

        if let Some(num) = tok.strip_prefix('#') {
            return parse_number(num).map(Operand::Immediate).ok_or_else(bad);
        }
        if let Some(name) = tok.strip_prefix('&') {
            return if is_label_name(name) {
                Ok(Operand::Relative(name.to_string()))
            } else {
                Err(bad())
            };
        }
        if let Some(reg) = tok.strip_prefix('@') {
            return Reg::parse(reg)
                .map(Operand::RegisterIndirect)
                .ok_or_else(bad);
        }
        if let Some(reg) = Reg::parse(tok) {
            return Ok(Operand::Register(reg));
        }
        if is_label_name(tok) {
            return Ok(Operand::Direct(tok.to_string()));
        }
        Err(bad())
    }

    pub fn mode(&self) -> Mode {
        match self {
            Operand::Immediate(_) => Mode::Immediate,
            Operand::Direct(_) => Mode::Direct,
            Operand::Relative(_) => Mode::Relative,
            Operand::Register(_) => Mode::Register,
            Operand::RegisterIndirect(_) => Mode::RegisterIndirect,
        }
    }

    pub fn reg(&self) -> Option<Reg> {
        match self {
            Operand::Register(r) | Operand::RegisterIndirect(r) => Some(*r),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Immediate(v) => write!(f, "#{}", *v as i16),
            Operand::Direct(name) => write!(f, "{}", name),
            Operand::Relative(name) => write!(f, "&{}", name),
            Operand::Register(r) => write!(f, "{}", r),
            Operand::RegisterIndirect(r) => write!(f, "@{}", r),
        }
    }
}

// ----------------------------------------------------------------------------
// Lexical helpers

/// `[A-Za-z][A-Za-z0-9]*`, excluding register names.
pub fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(head) if head.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric()) && Reg::parse(s).is_none()
}

/// Signed or unsigned 16-bit literal. Negative values are stored in two's complement.
pub fn parse_number(s: &str) -> Option<u16> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let value = parse_with_prefix(digits).ok()?;
    if negative {
        if value > 0x8000 {
            return None;
        }
        Some(value.wrapping_neg())
    } else {
        Some(value)
    }
}

fn parse_with_prefix(s: &str) -> Result<u16, ParseIntError> {
    if s.len() < 2 {
        u16::from_str_radix(s, 10)
    } else {
        let (prefix, num) = s.split_at(2);
        match prefix {
            "0b" => u16::from_str_radix(num, 2),
            "0o" => u16::from_str_radix(num, 8),
            "0x" => u16::from_str_radix(num, 16),
            _ => u16::from_str_radix(s, 10),
        }
    }
}
