//! Tests for error handling

use symcheck_core::CheckError;

#[test]
fn test_library_not_found_names_the_library()
{
    let error = CheckError::LibraryNotFound("libm.so.6".to_string());
    let message = format!("{}", error);
    assert!(message.contains("libm.so.6"));
    assert!(message.contains("Can't find"));
}

#[test]
fn test_target_not_found_display()
{
    let error = CheckError::TargetNotFound("./missing".to_string());
    let message = format!("{}", error);
    assert!(message.contains("./missing"));
    assert!(message.contains("not a file"));
}

#[test]
fn test_unsupported_architecture_display()
{
    let error = CheckError::UnsupportedArchitecture("Aarch64".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Unsupported machine architecture"));
    assert!(message.contains("Aarch64"));
}

#[test]
fn test_circular_dependency_display()
{
    let error = CheckError::CircularDependency("liba.so".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Circular"));
    assert!(message.contains("liba.so"));
}

#[test]
fn test_io_error_converts()
{
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error: CheckError = io_err.into();
    match error {
        CheckError::Io(_) => {}
        _ => panic!("Expected Io variant"),
    }
}
