//! Build script: emit the libx264 link directive when the `x264`
//! feature is enabled. The default build carries no native dependency.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if std::env::var_os("CARGO_FEATURE_X264").is_some() {
        println!("cargo:rustc-link-lib=x264");
    }
}
