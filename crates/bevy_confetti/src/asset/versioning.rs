/// One shipped revision of the particle type file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRevision {
    /// Value of `confetti_version` in files written with this revision.
    pub version: &'static str,
    /// What this revision changed.
    pub change: &'static str,
    /// Files from earlier revisions cannot be read as-is past this one.
    pub breaking: bool,
}

/// Every revision of the format, oldest first. The last one is current.
pub const FORMAT_REVISIONS: &[FormatRevision] = &[
    FormatRevision {
        version: "0.1",
        change: "initial format",
        breaking: false,
    },
    FormatRevision {
        version: "0.2",
        change: "descriptor angles are in degrees instead of radians",
        breaking: true,
    },
    FormatRevision {
        version: "0.3",
        change: "optional per-type blend mode",
        breaking: false,
    },
];

/// How an asset's `confetti_version` relates to the current format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    /// Written with the current format.
    Current,
    /// Written with an older format whose files still read correctly.
    Outdated {
        /// The version found in the asset.
        found: String,
        /// The current format version.
        current: &'static str,
    },
    /// Written before a breaking revision and needs manual migration.
    Incompatible {
        /// The version found in the asset.
        found: String,
        /// The current format version.
        current: &'static str,
        /// The first breaking revision the asset predates.
        blocked_by: FormatRevision,
    },
    /// Not a version this release knows, probably written by a newer one.
    Unknown,
}

/// Returns the current asset format version string.
pub fn current_format_version() -> &'static str {
    FORMAT_REVISIONS
        .last()
        .map_or("", |revision| revision.version)
}

/// Revisions shipped after `version`, or `None` if `version` is unknown.
pub fn revisions_since(version: &str) -> Option<&'static [FormatRevision]> {
    FORMAT_REVISIONS
        .iter()
        .position(|revision| revision.version == version)
        .map(|index| &FORMAT_REVISIONS[index + 1..])
}

/// Classifies `version` against the current format.
pub fn validate_version(version: &str) -> VersionStatus {
    let Some(newer) = revisions_since(version) else {
        return VersionStatus::Unknown;
    };
    let current = current_format_version();
    if newer.is_empty() {
        return VersionStatus::Current;
    }
    match newer.iter().find(|revision| revision.breaking) {
        Some(&blocked_by) => VersionStatus::Incompatible {
            found: version.to_string(),
            current,
            blocked_by,
        },
        None => VersionStatus::Outdated {
            found: version.to_string(),
            current,
        },
    }
}
