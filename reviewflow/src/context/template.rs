//! Prompt template rendering.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Placeholder for the artifact display name.
pub const ARTIFACT_NAME: &str = "artifact_name";
/// Placeholder for the artifact text.
pub const ARTIFACT_CONTENT: &str = "artifact_content";
/// Placeholder for the path of the staged artifact file.
pub const ARTIFACT_PATH: &str = "artifact_path";
/// Placeholder for the stage's expected output description.
pub const EXPECTED_OUTPUT: &str = "expected_output";
/// Placeholder for the stage id.
pub const STAGE_ID: &str = "stage_id";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    PATTERN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Substitutes `{name}` placeholders in a single pass.
///
/// Unknown placeholders are left as written, and substituted values are never
/// re-scanned, so artifact text containing braces is inserted verbatim.
#[must_use]
pub fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| {
            vars.get(&caps[1])
                .map_or_else(|| caps[0].to_string(), |value| (*value).to_string())
        })
        .into_owned()
}

/// Returns the placeholder names used by a template, in order of appearance.
#[must_use]
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_pattern().captures_iter(template) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
