use std::{env, fs, path::Path};

#[path = "src/properties.rs"]
mod properties;

/// Bakes `WEATHER_API_KEY` into the library.
///
/// An explicit environment variable wins; otherwise `weatherApiKey` from the
/// untracked `local.properties` at the workspace root; otherwise empty.
fn main() {
    println!("cargo:rerun-if-env-changed=WEATHER_API_KEY");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
    let path = Path::new(&manifest_dir).join("..").join("local.properties");
    println!("cargo:rerun-if-changed={}", path.display());

    if env::var_os("WEATHER_API_KEY").is_some() {
        return;
    }

    let key = fs::read_to_string(&path)
        .ok()
        .and_then(|contents| properties::read_property(&contents, "weatherApiKey"))
        .unwrap_or_default();

    println!("cargo:rustc-env=WEATHER_API_KEY={key}");
}
