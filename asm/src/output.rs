use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{error::Error, finalize::Object, symbol::Section};

/// Text object file.
pub fn write_object(w: &mut impl Write, obj: &Object) -> io::Result<()> {
    writeln!(w, ".cbegin")?;
    writeln!(w, "{:x} {:x}", obj.code_len(), obj.data_len())?;
    for (addr, word, tag) in obj.code_words() {
        writeln!(w, "{:04x} {:04x} {}", addr, word, tag)?;
    }
    for (addr, word) in obj.data_words() {
        writeln!(w, "{:04x} {:04x} d", addr, word)?;
    }
    writeln!(w, ".cend")?;
    writeln!(w, ".lbegin")?;
    for entry in &obj.entries {
        writeln!(w, "{} {:04x}", entry.name, entry.address)?;
    }
    writeln!(w, ".lend")?;
    writeln!(w, ".ebegin")?;
    for ext in &obj.externals {
        writeln!(w, "{} {:04x}", ext.name, ext.address)?;
    }
    writeln!(w, ".eend")?;
    Ok(())
}

pub fn write_entries(w: &mut impl Write, obj: &Object) -> io::Result<()> {
    for entry in &obj.entries {
        writeln!(w, "{}  {:04x}", entry.name, entry.address)?;
    }
    Ok(())
}

pub fn write_externals(w: &mut impl Write, obj: &Object) -> io::Result<()> {
    for ext in &obj.externals {
        writeln!(w, "{:04x}  {}", ext.address, ext.name)?;
    }
    Ok(())
}

/// Code then data, little-endian.
pub fn write_binary(w: &mut impl Write, obj: &Object) -> io::Result<()> {
    for &(word, _) in &obj.code {
        w.write_all(&word.to_le_bytes())?;
    }
    for word in &obj.data {
        w.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct MapEntry {
    address: u16,
    section: &'static str,
    entry: bool,
}

/// YAML map of every local symbol: name -> address.
pub fn symbol_map(obj: &Object) -> String {
    let map: BTreeMap<&str, MapEntry> = obj
        .symbols
        .iter()
        .filter_map(|sym| {
            let address = sym.address?;
            let section = match sym.section()? {
                Section::Code => "code",
                Section::Data => "data",
            };
            Some((
                sym.name.as_str(),
                MapEntry {
                    address,
                    section,
                    entry: obj.entries.iter().any(|e| e.name == sym.name),
                },
            ))
        })
        .collect();
    serde_yaml::to_string(&map).unwrap_or_else(|e| format!("# Error generating YAML: {}", e))
}

/// Which files to produce next to the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outputs {
    pub binary: bool,
    pub map: bool,
}

/// Write every output file for `obj` next to `source`, swapping its
/// extension. Returns the paths written.
pub fn save(obj: &Object, source: &Path, outputs: Outputs) -> Result<Vec<PathBuf>, Error> {
    let mut written = vec![];

    create(&source.with_extension("ob"), &mut written, |w| {
        write_object(w, obj)
    })?;
    if !obj.entries.is_empty() {
        create(&source.with_extension("ent"), &mut written, |w| {
            write_entries(w, obj)
        })?;
    }
    if !obj.externals.is_empty() {
        create(&source.with_extension("ext"), &mut written, |w| {
            write_externals(w, obj)
        })?;
    }
    if outputs.binary {
        create(&source.with_extension("bin"), &mut written, |w| {
            write_binary(w, obj)
        })?;
    }
    if outputs.map {
        create(&source.with_extension("map.yaml"), &mut written, |w| {
            w.write_all(symbol_map(obj).as_bytes())
        })?;
    }
    Ok(written)
}

fn create(
    path: &Path,
    written: &mut Vec<PathBuf>,
    body: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<(), Error> {
    let name = path.display().to_string();
    let file = File::create(path).map_err(|e| Error::FileCreate(name.clone(), e))?;
    let mut w = BufWriter::new(file);
    body(&mut w)
        .and_then(|_| w.flush())
        .map_err(|e| Error::FileWrite(name, e))?;
    written.push(path.to_path_buf());
    Ok(())
}
