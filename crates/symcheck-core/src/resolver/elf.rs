//! Object-file reading: symbol extraction and dynamic-linking metadata.
//!
//! Binary-structure decoding is delegated to the `object` crate; this
//! module turns what it reports into the crate's data model. The one place
//! we read raw bytes ourselves is the `.dynamic` section, whose entry
//! records (tag, value) are plain words whose width follows the declared
//! machine architecture.

use std::fs;
use std::path::{Path, PathBuf};

use object::{Object, ObjectSection, ObjectSymbol, SymbolKind};
use tracing::{trace, warn};

use crate::error::{CheckError, Result};
use crate::types::{SymbolEntry, SymbolTable};

/// Dynamic-entry tag marking the end of the section.
const DT_NULL: u64 = 0;
/// Dynamic-entry tag naming a required shared library.
const DT_NEEDED: u64 = 1;

/// An object file loaded into memory.
///
/// Owns the raw bytes; the `object::File` view is re-created per query,
/// which is cheap (header parsing only) and keeps the type free of
/// self-references. Construction validates that the bytes parse as a
/// recognized object format, so later queries cannot fail on that.
#[derive(Debug)]
pub struct ObjectData
{
    path: PathBuf,
    data: Vec<u8>,
}

impl ObjectData
{
    /// Read and validate an object file from disk.
    ///
    /// Returns [`CheckError::NotAnObject`] if the file is not a
    /// recognized object-file format.
    pub fn open(path: &Path) -> Result<Self>
    {
        let data = fs::read(path)?;
        object::File::parse(&*data).map_err(|source| CheckError::NotAnObject {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    fn parse(&self) -> Result<object::File<'_>>
    {
        object::File::parse(&*self.data).map_err(|source| CheckError::NotAnObject {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Extract every named symbol into a partial [`SymbolTable`].
    ///
    /// Covers the regular and dynamic symbol tables in one pass. Entries
    /// with no name are skipped. A symbol with no storage (an undefined
    /// reference to something defined elsewhere) is recorded with
    /// `used_in = {origin}`; its defining-file field is provisional and
    /// will lose to a real definition during merge.
    ///
    /// `origin` is the name the file was requested under, which is what
    /// rule authors match against; it need not equal the located path.
    pub fn extract_symbols(&self, origin: &str) -> Result<SymbolTable>
    {
        let file = self.parse()?;
        let mut table = SymbolTable::new();

        for symbol in file.symbols().chain(file.dynamic_symbols()) {
            let Ok(name) = symbol.name() else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            let section = match symbol.section_index() {
                Some(index) => file
                    .section_by_index(index)
                    .ok()
                    .and_then(|sec| sec.name().ok().map(str::to_string))
                    .unwrap_or_default(),
                None => String::new(),
            };
            let kind = kind_label(symbol.kind());
            // A missing raw size reads back as 0; "no size at all" never
            // happens for ELF symbol entries, so the size is always set.
            let size = Some(symbol.size());

            let entry = if symbol.is_undefined() {
                SymbolEntry::referenced(size, kind, origin, section)
            } else {
                SymbolEntry::defined(size, kind, origin, section)
            };
            table.insert(name, entry);
        }

        trace!(origin, symbols = table.len(), "extracted symbols");
        Ok(table)
    }

    /// Names of the shared libraries this file requires at load time, in
    /// on-disk `DT_NEEDED` order.
    ///
    /// The width of a dynamic-entry record depends on the declared
    /// machine architecture: 16 bytes on x86-64, 8 on i386. Anything
    /// else is rejected as unsupported. A file without a `.dynamic` or
    /// `.dynstr` section (e.g. statically linked) yields an empty list.
    pub fn required_libraries(&self) -> Result<Vec<String>>
    {
        let file = self.parse()?;
        let entry_width = match file.architecture() {
            object::Architecture::X86_64 => 16,
            object::Architecture::I386 => 8,
            other => {
                return Err(CheckError::UnsupportedArchitecture(format!("{other:?}")));
            }
        };
        let little_endian = file.is_little_endian();

        let Some(dynamic) = file.section_by_name(".dynamic") else {
            return Ok(Vec::new());
        };
        let Some(dynstr) = file.section_by_name(".dynstr") else {
            return Ok(Vec::new());
        };
        let entries = dynamic.data().map_err(|source| CheckError::NotAnObject {
            path: self.path.display().to_string(),
            source,
        })?;
        let strings = dynstr.data().map_err(|source| CheckError::NotAnObject {
            path: self.path.display().to_string(),
            source,
        })?;

        let mut needed = Vec::new();
        for record in entries.chunks_exact(entry_width) {
            let (tag, value) = decode_dyn(record, little_endian);
            if tag == DT_NULL {
                break;
            }
            if tag != DT_NEEDED {
                continue;
            }
            match string_at(strings, value as usize) {
                Some(name) => needed.push(name),
                None => {
                    warn!(path = %self.path.display(), offset = value, "DT_NEEDED string offset out of range");
                }
            }
        }
        Ok(needed)
    }
}

/// Decode one dynamic entry (tag, value) of the given width.
fn decode_dyn(record: &[u8], little_endian: bool) -> (u64, u64)
{
    if record.len() == 16 {
        let tag: [u8; 8] = record[0..8].try_into().unwrap_or_default();
        let val: [u8; 8] = record[8..16].try_into().unwrap_or_default();
        if little_endian {
            (u64::from_le_bytes(tag), u64::from_le_bytes(val))
        } else {
            (u64::from_be_bytes(tag), u64::from_be_bytes(val))
        }
    } else {
        let tag: [u8; 4] = record[0..4].try_into().unwrap_or_default();
        let val: [u8; 4] = record[4..8].try_into().unwrap_or_default();
        if little_endian {
            (u64::from(u32::from_le_bytes(tag)), u64::from(u32::from_le_bytes(val)))
        } else {
            (u64::from(u32::from_be_bytes(tag)), u64::from(u32::from_be_bytes(val)))
        }
    }
}

/// NUL-terminated string at `offset` in a string-table blob.
fn string_at(strings: &[u8], offset: usize) -> Option<String>
{
    let tail = strings.get(offset..)?;
    let end = tail.iter().position(|&byte| byte == 0)?;
    Some(String::from_utf8_lossy(&tail[..end]).into_owned())
}

/// Stable label for a symbol kind, copied into the table verbatim.
fn kind_label(kind: SymbolKind) -> &'static str
{
    match kind {
        SymbolKind::Text => "FUNC",
        SymbolKind::Data => "OBJECT",
        SymbolKind::Section => "SECTION",
        SymbolKind::File => "FILE",
        SymbolKind::Label => "LABEL",
        SymbolKind::Tls => "TLS",
        _ => "NOTYPE",
    }
}
