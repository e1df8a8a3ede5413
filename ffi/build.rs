use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let header = crate_dir.join("include").join("bookworm.h");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let result = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("BOOKWORM_H")
        .with_documentation(true)
        .generate();

    // Header generation is best-effort; the library builds without it.
    match result {
        Ok(bindings) => {
            if let Some(dir) = header.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            bindings.write_to_file(header);
        }
        Err(err) => println!("cargo:warning=cbindgen failed: {err}"),
    }
}
