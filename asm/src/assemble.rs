use crate::{
    context::{Context, Options},
    error::{Diagnostic, Error, Warning},
    finalize::{finalize, Object},
    pass1, pass2,
};

/// Why a run produced no object.
#[derive(Debug)]
pub struct Failure {
    /// Sorted by line.
    pub diagnostics: Vec<Diagnostic>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    First,
    Second,
}

/// Assemble a whole source file, one string per line.
pub fn assemble(lines: &[String], options: &Options) -> Result<Object, Failure> {
    assemble_with(lines, options, |_, _| {})
}

/// Like [`assemble`], calling `after` with the context at the end of each pass
/// that ran.
pub fn assemble_with(
    lines: &[String],
    options: &Options,
    mut after: impl FnMut(Pass, &Context),
) -> Result<Object, Failure> {
    if lines.is_empty() {
        return Err(Failure {
            diagnostics: vec![Diagnostic::new(0, Error::EmptySource)],
            warnings: vec![],
        });
    }

    let mut ctx = Context::new(options.clone());
    pass1::scan(&mut ctx, lines);
    after(Pass::First, &ctx);
    if ctx.has_errors() {
        return Err(failure(ctx));
    }

    pass2::resolve(&mut ctx, lines);
    after(Pass::Second, &ctx);
    if ctx.has_errors() {
        return Err(failure(ctx));
    }

    Ok(finalize(ctx.into_resolved()))
}

fn failure(ctx: Context) -> Failure {
    let mut diagnostics = ctx.diagnostics;
    diagnostics.sort_by_key(|d| d.line);
    Failure {
        diagnostics,
        warnings: ctx.warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_source() {
        let err = assemble(&[], &Options::default()).unwrap_err();
        assert!(matches!(
            err.diagnostics.as_slice(),
            [Diagnostic {
                error: Error::EmptySource,
                ..
            }]
        ));
    }

    #[test]
    fn blank_source_is_fine() {
        let obj = assemble(&lines("; nothing\n\n"), &Options::default()).unwrap();
        assert!(obj.code.is_empty());
        assert_eq!(obj.data_base, 0);
    }

    #[test]
    fn pass2_skipped_after_pass1_errors() {
        let mut passes = vec![];
        let err = assemble_with(
            &lines("X: hlt\nX: hlt\njmp NOPE"),
            &Options::default(),
            |pass, _| passes.push(pass),
        )
        .unwrap_err();
        assert_eq!(passes, vec![Pass::First]);
        assert_eq!(err.diagnostics.len(), 1);
        assert_eq!(err.diagnostics[0].error.kind(), "RedefinedLabel");
    }

    #[test]
    fn diagnostics_sorted_by_line() {
        let err = assemble(
            &lines(".entry NOPE\njmp MISSING\nhlt"),
            &Options::default(),
        )
        .unwrap_err();
        let found: Vec<usize> = err.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(found, vec![1, 2]);
    }
}
