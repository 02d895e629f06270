mod common;

use common::{defined_symbol, load_synthetic};
use elf_cle::{Architecture, ComposedImage, Endianness, ExportPolicy};

fn main_and_libc() -> (ComposedImage,) {
    let (_main_file, main) = load_synthetic(
        Architecture::Amd64,
        0x600000,
        0x1000,
        0x601000,
        0x100,
        0x100,
        0x600410,
        vec![],
        vec![("puts".to_string(), 0x601018)],
        vec!["libc.so.6".to_string()],
    );
    let (_libc_file, libc) = load_synthetic(
        Architecture::Amd64,
        0x0,
        0x80000,
        0x80000,
        0x1000,
        0x1000,
        0x0,
        vec![defined_symbol("puts", 0x6fe50, "STB_GLOBAL")],
        vec![],
        vec![],
    );

    let image = ComposedImage::compose_from_loaded(
        main,
        vec![(libc, 0x7ffff7a00000)],
        ExportPolicy::default(),
    )
    .expect("compose main + libc");
    (image,)
}

#[test]
fn relocation_patches_the_got_slot_with_the_rebased_export() {
    let (image,) = main_and_libc();
    assert_eq!(
        image.read_word(0x601018, 8, Endianness::Little),
        Some(0x7ffff7a6fe50)
    );
}

#[test]
fn override_got_replaces_the_slot_without_affecting_others() {
    let (mut image,) = main_and_libc();
    let main_handle = image.main_handle();

    assert!(image.override_got(main_handle, "puts", 0xdeadbeef));
    assert_eq!(image.read_word(0x601018, 8, Endianness::Little), Some(0xdeadbeef));

    assert!(!image.override_got(main_handle, "nonexistent", 0x1));
    // The failed override left the prior value untouched.
    assert_eq!(image.read_word(0x601018, 8, Endianness::Little), Some(0xdeadbeef));
}

#[test]
fn unresolved_jump_relocation_does_not_fail_composition() {
    let (_main_file, main) = load_synthetic(
        Architecture::Amd64,
        0x600000,
        0x1000,
        0x601000,
        0x100,
        0x100,
        0x600410,
        vec![],
        vec![("__weird_sym".to_string(), 0x601020)],
        vec![],
    );

    let image = ComposedImage::compose_from_loaded(main, vec![], ExportPolicy::default())
        .expect("composition succeeds even with an unresolved import");

    // Nothing claimed the slot, so the on-disk fill byte for the data
    // segment (0xBB, from the fixture builder) is still there.
    assert_eq!(image.byte_at(0x601020), Some(0xBB));
}

#[test]
fn colliding_objects_fail_with_an_overlap_error() {
    let (_main_file, main) = load_synthetic(
        Architecture::Amd64,
        0x600000,
        0x1000,
        0x601000,
        0x100,
        0x100,
        0x600410,
        vec![],
        vec![],
        vec![],
    );
    let (_dep_file, dep) = load_synthetic(
        Architecture::Amd64,
        0x0,
        0x1000,
        0x1000,
        0x100,
        0x100,
        0x0,
        vec![],
        vec![],
        vec![],
    );

    // Rebasing the dependency to 0x600000 makes its text segment collide
    // with main's text segment.
    let result = ComposedImage::compose_from_loaded(main, vec![(dep, 0x600000)], ExportPolicy::default());
    assert!(matches!(result, Err(elf_cle::Error::Overlap { .. })));
}

#[test]
fn every_loaded_byte_falls_within_the_reported_address_range() {
    let (image,) = main_and_libc();
    for addr in image.dependencies()[0].segments.iter().map(|s| s.virtual_address) {
        let rebased = addr + image.dependencies()[0].rebase_addr;
        assert!(rebased >= image.min_address());
        assert!(rebased <= image.max_address());
    }
}
