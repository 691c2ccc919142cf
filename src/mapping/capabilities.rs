//! Per-mapping capability flags and feature filters.

/// Which tooling features a mapped span supports.
///
/// Every mapping carries one of these; a feature only crosses a mapping
/// whose flags satisfy the feature's filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CodeInformation {
    pub verification: bool,
    pub completion: bool,
    pub semantic: bool,
    pub navigation: bool,
    pub structure: bool,
    pub format: bool,
}

impl CodeInformation {
    /// A mapping that supports every feature.
    pub fn all() -> Self {
        Self {
            verification: true,
            completion: true,
            semantic: true,
            navigation: true,
            structure: true,
            format: true,
        }
    }
}

/// A predicate deciding whether a mapping may be crossed.
pub type Filter<'f> = &'f (dyn Fn(&CodeInformation) -> bool + Sync);

pub fn accept_all(_: &CodeInformation) -> bool {
    true
}

pub fn is_hover_enabled(info: &CodeInformation) -> bool {
    info.semantic
}

pub fn is_auto_insert_enabled(info: &CodeInformation) -> bool {
    info.completion
}

pub fn is_completion_enabled(info: &CodeInformation) -> bool {
    info.completion
}

pub fn is_rename_enabled(info: &CodeInformation) -> bool {
    info.navigation
}

pub fn is_folding_ranges_enabled(info: &CodeInformation) -> bool {
    info.structure
}

pub fn is_formatting_enabled(info: &CodeInformation) -> bool {
    info.format
}

pub fn is_diagnostics_enabled(info: &CodeInformation) -> bool {
    info.verification
}
