use elf_cle::extractor::run_under_emulator;
use elf_cle::Error;

#[test]
fn nonzero_exit_status_surfaces_as_extractor_failure() {
    // `false` always exits 1 regardless of arguments, standing in for a
    // failing extractor subprocess without requiring qemu or clextract to
    // be present in the test environment.
    let result = run_under_emulator("false", "LD_LIBRARY_PATH=/opt/env", &[]);
    match result {
        Err(Error::Extractor { cmd, .. }) => {
            assert!(cmd.contains("false"));
        }
        other => panic!("expected Error::Extractor, got {other:?}"),
    }
}

#[test]
fn a_missing_emulator_binary_also_surfaces_as_extractor_failure() {
    let result = run_under_emulator(
        "definitely-not-a-real-emulator-binary",
        "LD_LIBRARY_PATH=/opt/env",
        &["/bin/ls"],
    );
    assert!(matches!(result, Err(Error::Extractor { .. })));
}

#[test]
fn successful_run_captures_stdout() {
    let result = run_under_emulator("echo", "LD_LIBRARY_PATH=/opt/env", &["hello"]);
    assert!(result.is_ok());
}
