//! Builds the effective prompt for a stage from upstream outputs.

use super::template::{
    render_template, ARTIFACT_CONTENT, ARTIFACT_NAME, ARTIFACT_PATH, EXPECTED_OUTPUT, STAGE_ID,
};
use crate::engine::RunState;
use crate::errors::MissingDependencyOutputError;
use crate::pipeline::StageDefinition;
use std::collections::HashMap;
use std::path::Path;

/// Heading that introduces the upstream context sections.
pub const CONTEXT_HEADING: &str = "## Context from previous stages";

/// Builds the prompt for `stage` from the current run state.
///
/// # Errors
///
/// Returns [`MissingDependencyOutputError`] if a declared dependency has not
/// succeeded yet. The engine never lets that happen.
pub fn build_prompt(
    stage: &StageDefinition,
    run_state: &RunState,
) -> Result<String, MissingDependencyOutputError> {
    build_prompt_with_path(stage, run_state, None)
}

/// Builds the prompt, substituting `{artifact_path}` with `artifact_path`.
///
/// Without a staged path the placeholder falls back to the artifact name.
///
/// # Errors
///
/// Returns [`MissingDependencyOutputError`] if a declared dependency has not
/// succeeded yet.
pub fn build_prompt_with_path(
    stage: &StageDefinition,
    run_state: &RunState,
    artifact_path: Option<&Path>,
) -> Result<String, MissingDependencyOutputError> {
    let upstream = dependency_outputs(stage, run_state)?;

    let artifact = run_state.artifact();
    let path = artifact_path.map_or_else(|| artifact.name.clone(), |p| p.display().to_string());
    let vars = HashMap::from([
        (ARTIFACT_NAME, artifact.name.as_str()),
        (ARTIFACT_CONTENT, artifact.content.as_str()),
        (ARTIFACT_PATH, path.as_str()),
        (EXPECTED_OUTPUT, stage.expected_output.as_str()),
        (STAGE_ID, stage.id.as_str()),
    ]);

    let mut prompt = render_template(stage.prompt_template.trim(), &vars);

    if !stage.expected_output.is_empty() && !stage.prompt_template.contains("{expected_output}") {
        prompt.push_str("\n\nExpected output: ");
        prompt.push_str(&stage.expected_output);
    }

    if !upstream.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(CONTEXT_HEADING);
        for (dep, output) in upstream {
            prompt.push_str(&format!("\n\n### Output of '{dep}'\n{output}"));
        }
    }

    Ok(prompt)
}

/// Collects dependency outputs in declared order.
fn dependency_outputs<'a>(
    stage: &'a StageDefinition,
    run_state: &'a RunState,
) -> Result<Vec<(&'a str, &'a str)>, MissingDependencyOutputError> {
    stage
        .dependencies
        .iter()
        .map(|dep| {
            run_state
                .result(dep)
                .and_then(|r| r.succeeded_output())
                .map(|output| (dep.as_str(), output))
                .ok_or_else(|| MissingDependencyOutputError::new(&stage.id, dep))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Artifact, Persona};
    use crate::pipeline::PipelineDefinition;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn stage(id: &str, template: &str, deps: &[&str]) -> StageDefinition {
        StageDefinition::new(id, Persona::new(id, "goal", "story"), template)
            .with_dependencies(deps.iter().copied())
    }

    fn run_with(pipeline: &PipelineDefinition, outputs: &[(&str, &str)]) -> RunState {
        let mut run = RunState::new(pipeline, Arc::new(Artifact::new("app.py", "print(1)")));
        for (id, out) in outputs {
            run.record_success(id, (*out).to_string(), 1.0);
        }
        run
    }

    #[test]
    fn test_header_substitutes_artifact() {
        let s = stage("quality", "Analyze {artifact_name}:\n{artifact_content}", &[]);
        let pipeline = PipelineDefinition::new("p", vec![s.clone()]);
        let run = run_with(&pipeline, &[]);

        let prompt = build_prompt(&s, &run).unwrap();
        assert_eq!(prompt, "Analyze app.py:\nprint(1)");
    }

    #[test]
    fn test_expected_output_appended_once() {
        let s = stage("q", "Do it", &[]).with_expected_output("A list");
        let pipeline = PipelineDefinition::new("p", vec![s.clone()]);
        let run = run_with(&pipeline, &[]);
        assert_eq!(build_prompt(&s, &run).unwrap(), "Do it\n\nExpected output: A list");

        let inline = stage("q", "Produce: {expected_output}", &[]).with_expected_output("A list");
        assert_eq!(build_prompt(&inline, &run).unwrap(), "Produce: A list");
    }

    #[test]
    fn test_dependency_sections_in_declared_order() {
        let a = stage("a", "A", &[]);
        let b = stage("b", "B", &[]);
        let c = stage("c", "C", &[]);
        let sink = stage("sink", "Summarize", &["c", "a"]);
        let pipeline = PipelineDefinition::new("p", vec![a, b, c, sink.clone()]);
        let run = run_with(&pipeline, &[("a", "out-A"), ("b", "out-B"), ("c", "out-C")]);

        let prompt = build_prompt(&sink, &run).unwrap();
        let pos_c = prompt.find("out-C").unwrap();
        let pos_a = prompt.find("out-A").unwrap();
        assert!(pos_c < pos_a);
        assert!(!prompt.contains("out-B"));
        assert!(prompt.contains(CONTEXT_HEADING));
    }

    #[test]
    fn test_missing_dependency_output() {
        let a = stage("a", "A", &[]);
        let b = stage("b", "B", &["a"]);
        let pipeline = PipelineDefinition::new("p", vec![a, b.clone()]);
        let run = run_with(&pipeline, &[]);

        let err = build_prompt(&b, &run).unwrap_err();
        assert_eq!(err.stage, "b");
        assert_eq!(err.dependency, "a");
    }

    #[test]
    fn test_artifact_path_substitution() {
        let s = stage("q", "Read {artifact_path}", &[]);
        let pipeline = PipelineDefinition::new("p", vec![s.clone()]);
        let run = run_with(&pipeline, &[]);

        assert_eq!(build_prompt(&s, &run).unwrap(), "Read app.py");
        let prompt = build_prompt_with_path(&s, &run, Some(Path::new("/tmp/x.py"))).unwrap();
        assert_eq!(prompt, "Read /tmp/x.py");
    }

    #[test]
    fn test_prompt_is_reproducible() {
        let a = stage("a", "A {artifact_name}", &[]);
        let b = stage("b", "B", &["a"]);
        let pipeline = PipelineDefinition::new("p", vec![a, b.clone()]);
        let run = run_with(&pipeline, &[("a", "first")]);

        assert_eq!(build_prompt(&b, &run).unwrap(), build_prompt(&b, &run).unwrap());
    }
}
