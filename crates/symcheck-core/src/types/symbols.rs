//! Symbol table and symbol entry types.
//!
//! A [`SymbolTable`] is built once per run by the dependency resolver and
//! then handed read-only to the rule engine. Iteration order carries no
//! meaning; the only consumer that scans every entry is `LARGEST()`.

use std::collections::btree_set::BTreeSet;
use std::collections::hash_map::{self, HashMap};

/// One resolved symbol.
///
/// Scalar fields describe the symbol as seen in the file *closest to the
/// root* of the dependency traversal that defines it; `used_in` accumulates
/// across the whole graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry
{
    /// Declared byte size. `None` means the reader supplied no size data
    /// at all; an explicit declared size of 0 is `Some(0)`. The two cases
    /// are distinct and must stay that way.
    pub size: Option<u64>,
    /// Symbol kind as reported by the object format (e.g. "FUNC",
    /// "OBJECT", "NOTYPE"). Opaque; copied verbatim, never reinterpreted.
    pub kind: String,
    /// File in which this symbol was first resolved as defined, recorded
    /// under the name it was requested by (not a canonicalized path).
    pub defining_file: String,
    /// Name of the containing section, verbatim.
    pub section: String,
    /// Whether the symbol has concrete storage in `defining_file`. For a
    /// symbol seen only as an undefined reference so far, the scalar
    /// fields are provisional and yield to the first real definition met
    /// during merge.
    pub defined: bool,
    /// Files that reference this symbol without defining it.
    pub used_in: BTreeSet<String>,
}

impl SymbolEntry
{
    /// Entry for a defined symbol (one with concrete storage).
    pub fn defined(size: Option<u64>, kind: impl Into<String>, file: impl Into<String>, section: impl Into<String>) -> Self
    {
        Self {
            size,
            kind: kind.into(),
            defining_file: file.into(),
            section: section.into(),
            defined: true,
            used_in: BTreeSet::new(),
        }
    }

    /// Entry for an undefined reference: `file` needs this symbol but does
    /// not define it.
    pub fn referenced(size: Option<u64>, kind: impl Into<String>, file: impl Into<String>, section: impl Into<String>) -> Self
    {
        let file = file.into();
        let mut used_in = BTreeSet::new();
        used_in.insert(file.clone());
        Self {
            size,
            kind: kind.into(),
            defining_file: file,
            section: section.into(),
            defined: false,
            used_in,
        }
    }
}

/// Mapping from symbol name to [`SymbolEntry`].
///
/// Built incrementally during resolution, immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable
{
    entries: HashMap<String, SymbolEntry>,
}

impl SymbolTable
{
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Look up a symbol by name.
    pub fn get(&self, name: &str) -> Option<&SymbolEntry>
    {
        self.entries.get(name)
    }

    /// True iff a symbol with this name is present.
    pub fn contains(&self, name: &str) -> bool
    {
        self.entries.contains_key(name)
    }

    /// Insert an entry, replacing any previous entry for the same name.
    pub fn insert(&mut self, name: impl Into<String>, entry: SymbolEntry)
    {
        self.entries.insert(name.into(), entry);
    }

    /// Iterate over all `(name, entry)` pairs. No ordering guarantee.
    pub fn iter(&self) -> hash_map::Iter<'_, String, SymbolEntry>
    {
        self.entries.iter()
    }

    /// Number of symbols in the table.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    /// True iff the table holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    /// Merge a dependency's table into this one.
    ///
    /// `self` was resolved closer to the root of the traversal, so it is
    /// authoritative:
    ///
    /// - symbols present only in `other` are added unchanged;
    /// - for symbols present in both, `self`'s scalar fields (`size`,
    ///   `kind`, `defining_file`, `section`) are preserved and the
    ///   `used_in` sets are unioned;
    /// - except when `self`'s entry is only an undefined reference and
    ///   `other` carries the actual definition, in which case the
    ///   definition's scalars take over (the symbol was "first resolved
    ///   as defined" there) while the union still applies.
    ///
    /// The union keeps a symbol's used-in footprint accumulating across
    /// the whole dependency graph while its defining location is never
    /// overwritten by a transitively discovered duplicate definition.
    pub fn merge_dependency(&mut self, other: SymbolTable)
    {
        for (name, dep_entry) in other.entries {
            match self.entries.entry(name) {
                hash_map::Entry::Occupied(mut occupied) => {
                    let base = occupied.get_mut();
                    if !base.defined && dep_entry.defined {
                        let mut merged = dep_entry;
                        merged.used_in.append(&mut base.used_in);
                        *base = merged;
                    } else {
                        base.used_in.extend(dep_entry.used_in);
                    }
                }
                hash_map::Entry::Vacant(vacant) => {
                    vacant.insert(dep_entry);
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a SymbolTable
{
    type Item = (&'a String, &'a SymbolEntry);
    type IntoIter = hash_map::Iter<'a, String, SymbolEntry>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.iter()
    }
}
