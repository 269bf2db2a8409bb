//! Tests for library lookup, symbol extraction and recursive resolution
//!
//! Object-file fixtures are synthesized with `object::write` into a temp
//! directory, so these tests exercise the real extraction path without
//! shipping binary blobs.

use std::fs;
use std::path::Path;

use object::write::{Object, Symbol, SymbolSection};
use object::{Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope};
use symcheck_core::resolver::elf::ObjectData;
use symcheck_core::resolver::search::find_library;
use symcheck_core::resolver::resolve;
use symcheck_core::CheckError;

fn new_object(architecture: Architecture) -> Object<'static>
{
    Object::new(BinaryFormat::Elf, architecture, Endianness::Little)
}

fn add_defined(obj: &mut Object, section: object::write::SectionId, name: &str, size: u64)
{
    obj.add_symbol(Symbol {
        name: name.as_bytes().to_vec(),
        value: 0,
        size,
        kind: SymbolKind::Text,
        scope: SymbolScope::Dynamic,
        weak: false,
        section: SymbolSection::Section(section),
        flags: SymbolFlags::None,
    });
}

fn add_undefined(obj: &mut Object, name: &str)
{
    obj.add_symbol(Symbol {
        name: name.as_bytes().to_vec(),
        value: 0,
        size: 0,
        kind: SymbolKind::Unknown,
        scope: SymbolScope::Dynamic,
        weak: false,
        section: SymbolSection::Undefined,
        flags: SymbolFlags::None,
    });
}

/// Append `.dynamic`/`.dynstr` sections carrying one DT_NEEDED entry per
/// name, terminated by DT_NULL (64-bit little-endian layout).
fn add_needed(obj: &mut Object, names: &[&str])
{
    let mut strings = vec![0u8];
    let mut offsets = Vec::new();
    for name in names {
        offsets.push(strings.len() as u64);
        strings.extend_from_slice(name.as_bytes());
        strings.push(0);
    }

    let mut dynamic = Vec::new();
    for offset in offsets {
        dynamic.extend_from_slice(&1u64.to_le_bytes()); // DT_NEEDED
        dynamic.extend_from_slice(&offset.to_le_bytes());
    }
    dynamic.extend_from_slice(&[0u8; 16]); // DT_NULL

    let dynstr = obj.add_section(Vec::new(), b".dynstr".to_vec(), SectionKind::Data);
    obj.append_section_data(dynstr, &strings, 1);
    let dyn_section = obj.add_section(Vec::new(), b".dynamic".to_vec(), SectionKind::Data);
    obj.append_section_data(dyn_section, &dynamic, 8);
}

fn write_to(dir: &Path, name: &str, obj: &Object) -> std::path::PathBuf
{
    let path = dir.join(name);
    fs::write(&path, obj.write().unwrap()).unwrap();
    path
}

/// app defines init (16 bytes), references helper, needs libx.so;
/// libx.so defines helper (8 bytes).
fn app_and_libx(dir: &Path)
{
    let mut app = new_object(Architecture::X86_64);
    let text = app.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    app.append_section_data(text, &[0u8; 16], 16);
    add_defined(&mut app, text, "init", 16);
    add_undefined(&mut app, "helper");
    add_needed(&mut app, &["libx.so"]);
    write_to(dir, "app", &app);

    let mut libx = new_object(Architecture::X86_64);
    let text = libx.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    libx.append_section_data(text, &[0u8; 8], 16);
    add_defined(&mut libx, text, "helper", 8);
    write_to(dir, "libx.so", &libx);
}

#[test]
fn test_find_library_absolute_path_passes_through()
{
    let found = find_library("/no/such/place/libfoo.so", &[]).unwrap();
    assert_eq!(found, Path::new("/no/such/place/libfoo.so"));
}

#[test]
fn test_find_library_prefers_direct_over_recursive()
{
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    // Only buried in the first root, directly present in the second:
    // the direct phase across all roots runs before any recursion.
    fs::create_dir(first.path().join("sub")).unwrap();
    fs::write(first.path().join("sub/lib.so"), b"x").unwrap();
    fs::write(second.path().join("lib.so"), b"x").unwrap();

    let roots = [first.path().to_path_buf(), second.path().to_path_buf()];
    let found = find_library("lib.so", &roots).unwrap();

    assert_eq!(found, second.path().join("lib.so"));
}

#[test]
fn test_find_library_direct_hit_respects_root_order()
{
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fs::write(first.path().join("lib.so"), b"x").unwrap();
    fs::write(second.path().join("lib.so"), b"x").unwrap();

    let roots = [first.path().to_path_buf(), second.path().to_path_buf()];
    let found = find_library("lib.so", &roots).unwrap();

    assert_eq!(found, first.path().join("lib.so"));
}

#[test]
fn test_find_library_recursive_fallback()
{
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("a/b")).unwrap();
    fs::write(root.path().join("a/b/lib.so"), b"x").unwrap();

    let found = find_library("lib.so", &[root.path().to_path_buf()]).unwrap();

    assert_eq!(found, root.path().join("a/b/lib.so"));
}

#[test]
fn test_find_library_missing_is_fatal()
{
    let root = tempfile::tempdir().unwrap();
    let err = find_library("libmissing.so", &[root.path().to_path_buf()]).unwrap_err();

    assert!(matches!(err, CheckError::LibraryNotFound(ref name) if name == "libmissing.so"));
}

#[test]
fn test_open_rejects_non_object_file()
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-an-elf");
    fs::write(&path, b"definitely not an object file").unwrap();

    let err = ObjectData::open(&path).unwrap_err();
    assert!(matches!(err, CheckError::NotAnObject { .. }));
}

#[test]
fn test_extract_symbols_defined_and_undefined()
{
    let dir = tempfile::tempdir().unwrap();
    app_and_libx(dir.path());

    let object = ObjectData::open(&dir.path().join("app")).unwrap();
    let table = object.extract_symbols("app").unwrap();

    let init = table.get("init").unwrap();
    assert!(init.defined);
    assert_eq!(init.size, Some(16));
    assert_eq!(init.kind, "FUNC");
    assert_eq!(init.defining_file, "app");
    assert_eq!(init.section, ".text");
    assert!(init.used_in.is_empty());

    let helper = table.get("helper").unwrap();
    assert!(!helper.defined);
    assert!(helper.used_in.contains("app"));
}

#[test]
fn test_required_libraries_in_on_disk_order()
{
    let dir = tempfile::tempdir().unwrap();
    let mut obj = new_object(Architecture::X86_64);
    add_needed(&mut obj, &["libz.so", "liba.so"]);
    let path = write_to(dir.path(), "multi", &obj);

    let object = ObjectData::open(&path).unwrap();
    assert_eq!(object.required_libraries().unwrap(), vec!["libz.so", "liba.so"]);
}

#[test]
fn test_required_libraries_empty_without_dynamic_section()
{
    let dir = tempfile::tempdir().unwrap();
    let obj = new_object(Architecture::X86_64);
    let path = write_to(dir.path(), "static", &obj);

    let object = ObjectData::open(&path).unwrap();
    assert!(object.required_libraries().unwrap().is_empty());
}

#[test]
fn test_required_libraries_rejects_unsupported_architecture()
{
    let dir = tempfile::tempdir().unwrap();
    let obj = new_object(Architecture::Aarch64);
    let path = write_to(dir.path(), "arm", &obj);

    let object = ObjectData::open(&path).unwrap();
    let err = object.required_libraries().unwrap_err();
    assert!(matches!(err, CheckError::UnsupportedArchitecture(_)));
}

#[test]
fn test_resolve_merges_dependency_closure()
{
    let dir = tempfile::tempdir().unwrap();
    app_and_libx(dir.path());

    let table = resolve("app", &[dir.path().to_path_buf()]).unwrap();

    let init = table.get("init").unwrap();
    assert_eq!(init.size, Some(16));
    assert_eq!(init.defining_file, "app");
    assert!(init.used_in.is_empty());

    // helper's definition comes from libx.so; app stays in its used-in set
    let helper = table.get("helper").unwrap();
    assert_eq!(helper.size, Some(8));
    assert_eq!(helper.defining_file, "libx.so");
    assert!(helper.used_in.contains("app"));
}

#[test]
fn test_resolve_missing_dependency_is_fatal()
{
    let dir = tempfile::tempdir().unwrap();
    let mut obj = new_object(Architecture::X86_64);
    add_needed(&mut obj, &["libnowhere.so"]);
    write_to(dir.path(), "app", &obj);

    let err = resolve("app", &[dir.path().to_path_buf()]).unwrap_err();
    assert!(matches!(err, CheckError::LibraryNotFound(ref name) if name == "libnowhere.so"));
}

#[test]
fn test_resolve_detects_dependency_cycle()
{
    let dir = tempfile::tempdir().unwrap();

    let mut liba = new_object(Architecture::X86_64);
    add_needed(&mut liba, &["libb.so"]);
    write_to(dir.path(), "liba.so", &liba);

    let mut libb = new_object(Architecture::X86_64);
    add_needed(&mut libb, &["liba.so"]);
    write_to(dir.path(), "libb.so", &libb);

    let err = resolve("liba.so", &[dir.path().to_path_buf()]).unwrap_err();
    assert!(matches!(err, CheckError::CircularDependency(ref name) if name == "liba.so"));
}
