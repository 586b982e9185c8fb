use std::env;

fn main() {
    // Shown by --version and in the menu banner. CI may pin it to a release tag.
    let version = env::var("DOUYIN_DL_RELEASE_VERSION")
        .unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string()));
    println!("cargo:rustc-env=DOUYIN_DL_VERSION={}", version);

    println!("cargo:rerun-if-env-changed=DOUYIN_DL_RELEASE_VERSION");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
