use crate::{
    context::{Context, ExternalRef},
    encode,
    error::Error,
    parser::{Line, Stmt},
    symbol,
};

/// Pass 2: encode every instruction against the Pass 1 symbol table and
/// promote the requested entries.
///
/// Only meaningful after a clean Pass 1.
pub fn resolve(ctx: &mut Context, lines: &[String]) {
    let mut addr = ctx.options.origin;
    for (idx, raw) in lines.iter().enumerate() {
        let Ok(Line {
            stmt: Stmt::Inst(op, operands),
            ..
        }) = Line::parse(raw)
        else {
            continue;
        };

        let encoded = encode::encode(&op.desc(), &operands, addr, &ctx.symbols);
        for (i, word) in encoded.words.into_iter().enumerate() {
            if let Some(name) = &word.external {
                ctx.externals.push(ExternalRef {
                    address: addr + i as u16,
                    name: name.clone(),
                });
            }
            ctx.code.push(word);
        }
        for err in encoded.errors {
            ctx.error(idx + 1, err);
        }
        addr += encode::size(&operands);
    }

    let requests = std::mem::take(&mut ctx.entry_requests);
    for (num, name) in &requests {
        match ctx.symbols.promote_to_entry(name) {
            Ok(_) => {
                if !ctx.entries.contains(name) {
                    ctx.entries.push(name.clone());
                }
            }
            Err(symbol::Error::ExternalAsEntry(name)) => {
                ctx.error(*num, Error::ExternalAsEntry(name))
            }
            Err(symbol::Error::UnknownSymbol(name) | symbol::Error::DuplicateSymbol(name)) => {
                ctx.error(*num, Error::UndefinedEntry(name))
            }
        }
    }
    ctx.entry_requests = requests;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::Options, pass1, symbol::Kind};
    use arch::inst::Tag;

    fn run(src: &[&str]) -> Context {
        let lines: Vec<String> = src.iter().map(|s| s.to_string()).collect();
        let mut ctx = Context::new(Options {
            origin: 100,
            ..Default::default()
        });
        pass1::scan(&mut ctx, &lines);
        assert!(!ctx.has_errors());
        resolve(&mut ctx, &lines);
        ctx
    }

    #[test]
    fn width_matches_pass1() {
        let ctx = run(&[
            ".extern FUNC",
            "MAIN: mov r1, @r2",
            "LOOP: jsr FUNC",
            "      cmp #1, X",
            "      jnz &LOOP",
            "      jmp FUNC",
            "      hlt",
            "X:    .data 4",
        ]);
        assert!(!ctx.has_errors());
        assert_eq!(ctx.code.len(), ctx.ic as usize);
        assert_eq!(
            ctx.externals,
            vec![
                ExternalRef {
                    address: 103,
                    name: "FUNC".into()
                },
                ExternalRef {
                    address: 110,
                    name: "FUNC".into()
                },
            ]
        );
        // jnz at 107 back to LOOP at 102
        assert_eq!(ctx.code[8].value as i16, -5);
        assert_eq!(ctx.code[8].tag, Tag::Absolute);
        // data reference still relative to the data image
        assert_eq!(ctx.code[6].value, 0);
        assert!(ctx.code[6].data_fixup);
    }

    #[test]
    fn entries() {
        let ctx = run(&[
            ".entry MAIN",
            ".entry MAIN",
            ".entry X",
            "MAIN: hlt",
            "X: .data 1",
        ]);
        assert!(!ctx.has_errors());
        assert_eq!(ctx.entries, vec!["MAIN".to_string(), "X".to_string()]);
        assert!(matches!(
            ctx.symbols.lookup("X").unwrap().kind,
            Kind::Entry {
                resolved: false,
                ..
            }
        ));
    }

    #[test]
    fn entry_errors() {
        let ctx = run(&[".extern F", ".entry F", ".entry NOWHERE", "hlt"]);
        let found: Vec<(usize, &str)> = ctx
            .diagnostics
            .iter()
            .map(|d| (d.line, d.error.kind()))
            .collect();
        assert_eq!(
            found,
            vec![(2, "ExternalAsEntry"), (3, "UndefinedEntry")]
        );
        assert!(ctx.entries.is_empty());
    }

    #[test]
    fn undefined_operand() {
        let ctx = run(&["jmp &NOPE", "prn Y", "hlt"]);
        let found: Vec<(usize, &str)> = ctx
            .diagnostics
            .iter()
            .map(|d| (d.line, d.error.kind()))
            .collect();
        assert_eq!(found, vec![(1, "UndefinedSymbol"), (2, "UndefinedSymbol")]);
        assert_eq!(ctx.code.len(), 5);
    }
}
