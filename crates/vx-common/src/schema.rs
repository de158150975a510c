//! Schema versioning for the output artifact.

/// Current schema version for the output artifact manifest.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, type changes)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Check if an artifact's schema version can be read by this build.
pub fn is_compatible(version: &str) -> bool {
    // Parse major versions and compare
    let current_major = SCHEMA_VERSION
        .split('.')
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0);

    let other_major = version
        .split('.')
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0);

    current_major == other_major
}
