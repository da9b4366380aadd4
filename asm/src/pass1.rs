use crate::{
    context::Context,
    encode,
    error::Error,
    parser::{Line, Stmt},
    symbol::{self, Kind},
};

/// Pass 1: size every line, define labels and fill the data image.
///
/// Errors are recorded per line and the scan goes on.
pub fn scan(ctx: &mut Context, lines: &[String]) {
    for (idx, raw) in lines.iter().enumerate() {
        let num = idx + 1;
        let width = raw.trim_end_matches(['\r', '\n']).chars().count();
        if width > ctx.options.max_line_len {
            ctx.warn(
                num,
                format!(
                    "line is {} characters long (limit {})",
                    width, ctx.options.max_line_len
                ),
            );
        }

        match Line::parse(raw) {
            Ok(line) => scan_line(ctx, num, line),
            Err(err) => ctx.error(num, err),
        }
    }
}

fn scan_line(ctx: &mut Context, num: usize, line: Line) {
    let Line { label, stmt } = line;
    match stmt {
        Stmt::Empty => {}
        Stmt::Data(values) => {
            if !fits(ctx, num, values.len()) {
                return;
            }
            define(ctx, num, label, Kind::Data);
            ctx.data.extend(values);
        }
        Stmt::Str(text, closed) => {
            if !closed {
                ctx.warn(num, "string literal is not closed".to_string());
            }
            let words: Vec<u16> = text.encode_utf16().chain([0]).collect();
            if !fits(ctx, num, words.len()) {
                return;
            }
            define(ctx, num, label, Kind::Data);
            ctx.data.extend(words);
        }
        Stmt::Entry(name) => {
            ignore_label(ctx, num, label, ".entry");
            ctx.entry_requests.push((num, name));
        }
        Stmt::Extern(name) => {
            ignore_label(ctx, num, label, ".extern");
            if let Err(symbol::Error::DuplicateSymbol(name)) =
                ctx.symbols.define(&name, None, Kind::External, num)
            {
                ctx.error(num, Error::RedefinedLabel(name));
            }
        }
        Stmt::Inst(op, operands) => {
            if let Err(err) = encode::check(&op.desc(), &operands) {
                ctx.error(num, err);
            }
            let size = encode::size(&operands);
            if !fits(ctx, num, usize::from(size)) {
                return;
            }
            define(ctx, num, label, Kind::Code);
            ctx.ic += size;
        }
    }
}

fn define(ctx: &mut Context, num: usize, label: Option<String>, kind: Kind) {
    let Some(name) = label else { return };
    let address = match kind {
        Kind::Data => ctx.dc(),
        _ => ctx.options.origin + ctx.ic,
    };
    if ctx.symbols.define(&name, Some(address), kind, num).is_err() {
        ctx.error(num, Error::RedefinedLabel(name));
    }
}

/// A line that would overflow the image is reported and dropped.
fn fits(ctx: &mut Context, num: usize, words: usize) -> bool {
    match ctx.reserve(words) {
        Ok(()) => true,
        Err(err) => {
            ctx.error(num, err);
            false
        }
    }
}

fn ignore_label(ctx: &mut Context, num: usize, label: Option<String>, directive: &str) {
    if let Some(name) = label {
        ctx.warn(
            num,
            format!("label `{}` before `{}` is ignored", name, directive),
        );
    }
}
