use elf_cle::{load_image, LoaderConfig};
use std::env;

fn main() {
    env_logger::init();

    let path = env::args().nth(1).expect("usage: load_image <binary-path>");
    let config = LoaderConfig::from_env().expect("VIRTUAL_ENV must point at the sibling tool tree");
    let image = load_image(&path, &config).expect("failed to load and compose the image");

    println!("entry point: 0x{:x}", image.main().entry_point);
    println!("address range: 0x{:x}-0x{:x}", image.min_address(), image.max_address());
    for dep in image.dependencies() {
        println!("dependency: {} @0x{:x}", dep.path.display(), dep.rebase_addr);
    }
}
