//! Embeds toolchain and build metadata for `edgeboard --version`

use std::env;
use std::process::Command;

fn set_env(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn rustc_version() -> Option<String> {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let output = Command::new(rustc).arg("--version").output().ok()?;
    String::from_utf8(output.stdout)
        .ok()
        .map(|version| version.trim().to_string())
}

fn main() {
    for key in ["TARGET", "PROFILE"] {
        set_env(key, &env::var(key).unwrap_or_else(|_| "unknown".to_string()));
    }

    set_env(
        "RUSTC_VERSION",
        &rustc_version().unwrap_or_else(|| "unknown".to_string()),
    );
    set_env(
        "BUILD_DATE",
        &chrono::Utc::now().format("%Y-%m-%d").to_string(),
    );

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RUSTC");
}
