//! The base-counter naming convention.
//!
//! A composite counter stores its denominator in a second counter whose name is derived from the
//! primary counter's name. Category installation and handle creation both go through these
//! functions, so the two halves of a composite counter always agree on where the base lives.

/// Suffix appended to a composite counter's name to form the name of its base counter.
pub const BASE_SUFFIX: &str = "Base";

/// Derives the name of the base counter for the given primary counter name.
///
/// `FooCount` becomes `FooCountBase`.
pub fn base_counter_name(name: &str) -> String {
    let mut base = String::with_capacity(name.len() + BASE_SUFFIX.len());
    base.push_str(name);
    base.push_str(BASE_SUFFIX);
    base
}

/// Derives the help text of the base counter for the given primary counter help text.
pub fn base_counter_help(help: &str) -> String {
    format!("{}: {}", BASE_SUFFIX, help)
}
