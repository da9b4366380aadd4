use arch::inst::{apply_offset, unpack_regs, Inst, Tag};
use arch::mode::Mode;
use color_print::{cformat, cprintln};

use crate::{
    assemble::Pass,
    context::{Context, ExternalRef},
    finalize::{Entry, Object},
    symbol::{Kind, Symbols},
};

pub fn print_symbols(symbols: &Symbols) {
    cprintln!("\n<s>Table of symbols</> (name address type):");
    for sym in symbols.iter() {
        let addr = sym
            .address
            .map(|a| format!("{:04x}", a))
            .unwrap_or_else(|| "----".to_string());
        let kind = match sym.kind {
            Kind::External => cformat!("<m>{}</>", sym.kind),
            Kind::Entry { .. } => cformat!("<g>{}</>", sym.kind),
            _ => sym.kind.to_string(),
        };
        println!("  {:<10} {} {}", sym.name, addr, kind);
    }
}

pub fn print_entries(entries: &[Entry]) {
    cprintln!("\n<s>Table of entries</> (name address):");
    for entry in entries {
        cprintln!("  <g>{:<10}</> {:04x}", entry.name, entry.address);
    }
}

pub fn print_externals(externals: &[ExternalRef]) {
    cprintln!("\n<s>Table of externals</> (name address):");
    for ext in externals {
        cprintln!("  <m>{:<10}</> {:04x}", ext.name, ext.address);
    }
}

pub fn print_data(data: &[u16], base: u16) {
    cprintln!("\n<s>Content of the data image</> (address value):");
    for (i, word) in data.iter().enumerate() {
        println!("  {:04x} {:04x}", base.wrapping_add(i as u16), word);
    }
}

/// Object code with each instruction word decoded next to it.
pub fn print_code(code: &[(u16, Tag)], origin: u16) {
    cprintln!("\n<s>Content of the object code</> (address value type):");
    let mut pending: Option<Inst> = None;
    let mut remaining = 0;
    let mut inst_addr = origin;
    for (i, &(word, tag)) in code.iter().enumerate() {
        let addr = origin.wrapping_add(i as u16);
        let note = if remaining == 0 {
            match Inst::from_bin(word) {
                Some(inst) => {
                    remaining = inst.extra_words();
                    pending = Some(inst);
                    inst_addr = addr;
                    inst.cformat()
                }
                None => cformat!("<r,s>??</>"),
            }
        } else {
            remaining -= 1;
            pending
                .map(|inst| operand_note(&inst, word, inst_addr, remaining))
                .unwrap_or_default()
        };
        println!("  {:04x} {:04x} {} | {}", addr, word, tag, note);
    }
}

/// Explain an operand word. `remaining` counts the words still to come.
fn operand_note(inst: &Inst, word: u16, inst_addr: u16, remaining: u16) -> String {
    if inst.src_mode.is_register() && inst.dest_mode.is_register() && inst.op.desc().arity == 2 {
        let (src, dest) = unpack_regs(word);
        return cformat!("<b>{}, {}</>", src, dest);
    }
    let mode = if remaining == 0 && inst.op.desc().arity > 0 && !inst.dest_mode.is_register() {
        inst.dest_mode
    } else {
        inst.src_mode
    };
    match mode {
        Mode::Relative => cformat!(
            "<y>&{:+}</> -> {:04x}",
            word as i16,
            apply_offset(word, inst_addr)
        ),
        Mode::Immediate => cformat!("<y>#{}</>", word as i16),
        _ => cformat!("<y>{:04x}</>", word),
    }
}

/// Tables after a pass, in the order the pass fills them.
pub fn print_pass(pass: Pass, ctx: &Context) {
    print_symbols(&ctx.symbols);
    print_data(&ctx.data, 0);
    if pass == Pass::Second {
        print_externals(&ctx.externals);
        let code: Vec<(u16, Tag)> = ctx.code.iter().map(|w| (w.value, w.tag)).collect();
        print_code(&code, ctx.options.origin);
    }
    println!();
}

pub fn print_object(obj: &Object) {
    print_symbols(&obj.symbols);
    print_entries(&obj.entries);
    print_externals(&obj.externals);
    print_data(&obj.data, obj.data_base);
    print_code(&obj.code, obj.origin);
    println!();
}
