//! Pipeline definition: validation and execution ordering.

use super::StageDefinition;
use crate::errors::{
    ContractErrorInfo, CycleDetectedError, PipelineValidationError, ReviewflowError,
    UnknownDependencyError,
};
use std::collections::{BTreeSet, HashMap, HashSet};

/// An ordered collection of stage definitions forming one workflow.
///
/// The definition is immutable once constructed and can be shared between
/// runs behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    /// The pipeline name.
    name: String,
    /// Stage definitions in declaration order.
    stages: Vec<StageDefinition>,
    /// Stage id to declaration index. First declaration wins on duplicates.
    index: HashMap<String, usize>,
    /// Stage whose output becomes the review record content.
    output_stage: Option<String>,
}

impl PipelineDefinition {
    /// Creates a pipeline definition without validating it.
    ///
    /// Call [`validate`](Self::validate) or go through
    /// [`PipelineBuilder`](super::PipelineBuilder) before running it.
    #[must_use]
    pub fn new(name: impl Into<String>, stages: Vec<StageDefinition>) -> Self {
        let mut index = HashMap::with_capacity(stages.len());
        for (i, stage) in stages.iter().enumerate() {
            index.entry(stage.id.clone()).or_insert(i);
        }

        Self {
            name: name.into(),
            stages,
            index,
            output_stage: None,
        }
    }

    /// Designates the stage whose output becomes the final report.
    ///
    /// Defaults to the last stage in execution order.
    #[must_use]
    pub fn with_output_stage(mut self, stage_id: impl Into<String>) -> Self {
        self.output_stage = Some(stage_id.into());
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the stages in declaration order.
    #[must_use]
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Looks up a stage by id.
    #[must_use]
    pub fn stage(&self, id: &str) -> Option<&StageDefinition> {
        self.index.get(id).map(|&i| &self.stages[i])
    }

    /// Returns true if any stage template references the artifact path.
    #[must_use]
    pub fn needs_artifact_file(&self) -> bool {
        self.stages.iter().any(StageDefinition::needs_artifact_file)
    }

    /// Validates the dependency graph.
    ///
    /// # Errors
    ///
    /// - `Validation` if the pipeline is empty, has duplicate ids, or names an
    ///   unknown output stage.
    /// - `UnknownDependency` if an upstream id is not a defined stage.
    /// - `CycleDetected` if any stage transitively depends on itself.
    pub fn validate(&self) -> Result<(), ReviewflowError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages")
                .with_error_info(
                    ContractErrorInfo::new("CONTRACT-004-EMPTY", "Cannot run an empty pipeline")
                        .with_fix_hint("Add at least one stage to the pipeline before building."),
                )
                .into());
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.id.as_str()) {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{}' is defined more than once",
                    stage.id
                ))
                .with_stages(vec![stage.id.clone()])
                .with_error_info(ContractErrorInfo::new(
                    "CONTRACT-004-DUPLICATE",
                    format!("Duplicate stage id '{}'", stage.id),
                ))
                .into());
            }
        }

        for stage in &self.stages {
            stage.validate()?;
            for dep in stage.upstream() {
                if !self.index.contains_key(dep) {
                    return Err(UnknownDependencyError::new(&stage.id, dep).into());
                }
            }
        }

        self.detect_cycles()?;

        if let Some(ref output) = self.output_stage {
            if !self.index.contains_key(output) {
                return Err(PipelineValidationError::new(format!(
                    "Output stage '{output}' is not defined"
                ))
                .with_stages(vec![output.clone()])
                .with_error_info(ContractErrorInfo::new(
                    "CONTRACT-004-OUTPUT_STAGE",
                    format!("Unknown output stage '{output}'"),
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Returns the stage ids in execution order.
    ///
    /// Every upstream stage precedes its dependents. Among stages that are
    /// ready at the same time, the one declared first runs first.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`validate`](Self::validate).
    pub fn order(&self) -> Result<Vec<String>, ReviewflowError> {
        self.validate()?;

        let mut in_degree = vec![0usize; self.stages.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.stages.len()];
        for (i, stage) in self.stages.iter().enumerate() {
            for dep in stage.upstream() {
                let d = self.index[dep];
                dependents[d].push(i);
                in_degree[i] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(self.stages.len());
        while let Some(next) = ready.pop_first() {
            order.push(self.stages[next].id.clone());
            for &child in &dependents[next] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.insert(child);
                }
            }
        }

        Ok(order)
    }

    /// Returns the id of the stage whose output becomes the final report.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`validate`](Self::validate).
    pub fn output_stage(&self) -> Result<String, ReviewflowError> {
        if let Some(ref output) = self.output_stage {
            self.validate()?;
            return Ok(output.clone());
        }
        let order = self.order()?;
        order.last().cloned().ok_or_else(|| {
            PipelineValidationError::new("Pipeline has no stages").into()
        })
    }

    fn detect_cycles(&self) -> Result<(), CycleDetectedError> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for stage in &self.stages {
            if !visited.contains(stage.id.as_str()) {
                if let Some(cycle) =
                    self.dfs_cycle(&stage.id, &mut visited, &mut rec_stack, &mut path)
                {
                    return Err(CycleDetectedError::new(cycle));
                }
            }
        }

        Ok(())
    }

    fn dfs_cycle<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        rec_stack: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        visited.insert(node);
        rec_stack.insert(node);
        path.push(node);

        if let Some(stage) = self.stage(node) {
            for dep in stage.upstream() {
                if !visited.contains(dep.as_str()) {
                    if let Some(cycle) = self.dfs_cycle(dep, visited, rec_stack, path) {
                        return Some(cycle);
                    }
                } else if rec_stack.contains(dep.as_str()) {
                    let start = path.iter().position(|n| *n == dep).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..].iter().map(|s| (*s).to_string()).collect();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
            }
        }

        path.pop();
        rec_stack.remove(node);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Persona;
    use pretty_assertions::assert_eq;

    fn stage(id: &str, deps: &[&str]) -> StageDefinition {
        StageDefinition::new(id, Persona::new(id, "goal", "story"), "template")
            .with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_linear_order() {
        let pipeline = PipelineDefinition::new(
            "chain",
            vec![stage("a", &[]), stage("b", &["a"]), stage("c", &["b"])],
        );
        assert_eq!(pipeline.order().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_order_ignores_declaration_order_when_forced() {
        let pipeline = PipelineDefinition::new(
            "reversed",
            vec![stage("c", &["b"]), stage("b", &["a"]), stage("a", &[])],
        );
        assert_eq!(pipeline.order().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_broken_by_declaration_order() {
        let pipeline = PipelineDefinition::new(
            "fan",
            vec![
                stage("root", &[]),
                stage("z", &["root"]),
                stage("m", &["root"]),
                stage("a", &["root"]),
                stage("sink", &["a", "m", "z"]),
            ],
        );
        assert_eq!(pipeline.order().unwrap(), vec!["root", "z", "m", "a", "sink"]);
    }

    #[test]
    fn test_diamond_dag() {
        let pipeline = PipelineDefinition::new(
            "diamond",
            vec![
                stage("join", &["left", "right"]),
                stage("right", &["top"]),
                stage("left", &["top"]),
                stage("top", &[]),
            ],
        );
        assert_eq!(pipeline.order().unwrap(), vec!["top", "right", "left", "join"]);
    }

    #[test]
    fn test_sequencing_constraints_order_stages() {
        let pipeline = PipelineDefinition::new(
            "after",
            vec![
                stage("second", &[]).after("first"),
                stage("first", &[]),
            ],
        );
        assert_eq!(pipeline.order().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_order_is_deterministic() {
        let pipeline = PipelineDefinition::new(
            "fan",
            vec![stage("r", &[]), stage("x", &["r"]), stage("y", &["r"])],
        );
        let first = pipeline.order().unwrap();
        for _ in 0..10 {
            assert_eq!(pipeline.order().unwrap(), first);
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let pipeline = PipelineDefinition::new("self", vec![stage("a", &["a"])]);
        assert!(matches!(pipeline.validate(), Err(ReviewflowError::CycleDetected(_))));
    }

    #[test]
    fn test_transitive_cycle() {
        let pipeline = PipelineDefinition::new(
            "cycle",
            vec![stage("a", &["c"]), stage("b", &["a"]), stage("c", &["b"])],
        );
        match pipeline.validate() {
            Err(ReviewflowError::CycleDetected(err)) => {
                assert_eq!(err.cycle_path, vec!["a", "c", "b", "a"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(pipeline.order().is_err());
    }

    #[test]
    fn test_cycle_through_sequencing_constraint() {
        let pipeline = PipelineDefinition::new(
            "cycle",
            vec![stage("a", &[]).after("b"), stage("b", &["a"])],
        );
        assert!(matches!(pipeline.validate(), Err(ReviewflowError::CycleDetected(_))));
    }

    #[test]
    fn test_unknown_dependency() {
        let pipeline = PipelineDefinition::new("missing", vec![stage("a", &["ghost"])]);
        match pipeline.validate() {
            Err(ReviewflowError::UnknownDependency(err)) => {
                assert_eq!(err.stage, "a");
                assert_eq!(err.dependency, "ghost");
            }
            other => panic!("expected unknown dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_duplicate_rejected() {
        let empty = PipelineDefinition::new("empty", Vec::new());
        match empty.validate() {
            Err(ReviewflowError::Validation(err)) => {
                assert_eq!(err.code(), Some("CONTRACT-004-EMPTY"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let dup = PipelineDefinition::new("dup", vec![stage("a", &[]), stage("a", &[])]);
        match dup.validate() {
            Err(ReviewflowError::Validation(err)) => {
                assert_eq!(err.code(), Some("CONTRACT-004-DUPLICATE"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_output_stage() {
        let pipeline = PipelineDefinition::new("p", vec![stage("a", &[]), stage("b", &["a"])]);
        assert_eq!(pipeline.output_stage().unwrap(), "b");

        let pinned = pipeline.clone().with_output_stage("a");
        assert_eq!(pinned.output_stage().unwrap(), "a");

        let bad = pipeline.with_output_stage("nope");
        assert!(matches!(bad.validate(), Err(ReviewflowError::Validation(_))));
    }
}
