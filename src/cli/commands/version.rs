//! `disc version`: package version plus the build details vergen recorded.

use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    built_at: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rust_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
}

fn build_env(value: Option<&'static str>) -> Option<&'static str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    let built_at = build_env(option_env!("VERGEN_BUILD_TIMESTAMP"));
    let rust_version = build_env(option_env!("VERGEN_RUSTC_SEMVER"));
    let target = build_env(option_env!("VERGEN_CARGO_TARGET_TRIPLE"));

    if json {
        let output = VersionOutput {
            version,
            build,
            built_at,
            rust_version,
            target,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let details: Vec<String> = [rust_version.map(|r| format!("rustc {r}")), target.map(str::to_string)]
        .into_iter()
        .flatten()
        .collect();
    if details.is_empty() {
        println!("disc {version} ({build})");
    } else {
        println!("disc {version} ({build}) {}", details.join(" "));
    }
    if let Some(built_at) = built_at {
        println!("built {built_at}");
    }
    Ok(())
}
