//! Stage definitions.

use crate::core::Persona;
use crate::errors::CycleDetectedError;
use serde::{Deserialize, Serialize};

/// Definition of a single stage in a pipeline.
///
/// A stage has two kinds of upstream edges:
///
/// - `dependencies` are data dependencies. Their outputs are fed into this
///   stage's prompt, in declared order.
/// - `after` are sequencing constraints. They only force this stage to run
///   later and contribute nothing to the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// The unique id of the stage.
    pub id: String,
    /// Persona used to shape the prompt.
    pub persona: Persona,
    /// Prompt template; see [`crate::context::render_template`] for placeholders.
    pub prompt_template: String,
    /// Description of what the stage should produce.
    pub expected_output: String,
    /// Ids of stages whose outputs this stage consumes.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Ids of stages that must finish first without feeding context.
    #[serde(default)]
    pub after: Vec<String>,
}

impl StageDefinition {
    /// Creates a new stage definition with no dependencies.
    #[must_use]
    pub fn new(id: impl Into<String>, persona: Persona, prompt_template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            persona,
            prompt_template: prompt_template.into(),
            expected_output: String::new(),
            dependencies: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Sets the expected output description.
    #[must_use]
    pub fn with_expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    /// Sets the data dependencies, keeping the first occurrence of duplicates.
    #[must_use]
    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies.clear();
        for dep in deps {
            push_unique(&mut self.dependencies, dep.into());
        }
        self
    }

    /// Adds a data dependency.
    #[must_use]
    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        push_unique(&mut self.dependencies, dep.into());
        self
    }

    /// Adds a sequencing constraint.
    #[must_use]
    pub fn after(mut self, stage: impl Into<String>) -> Self {
        push_unique(&mut self.after, stage.into());
        self
    }

    /// All upstream stage ids: data dependencies first, then sequencing constraints.
    pub fn upstream(&self) -> impl Iterator<Item = &String> {
        self.dependencies
            .iter()
            .chain(self.after.iter().filter(|id| !self.dependencies.contains(id)))
    }

    /// Returns true if the prompt template needs the artifact on disk.
    #[must_use]
    pub fn needs_artifact_file(&self) -> bool {
        self.prompt_template.contains("{artifact_path}")
    }

    /// Validates the stage definition in isolation.
    ///
    /// # Errors
    ///
    /// Returns a cycle error if the stage lists itself upstream.
    pub fn validate(&self) -> Result<(), CycleDetectedError> {
        if self.upstream().any(|id| id == &self.id) {
            return Err(CycleDetectedError::new(vec![self.id.clone(), self.id.clone()]));
        }
        Ok(())
    }
}

fn push_unique(list: &mut Vec<String>, id: String) {
    if !list.contains(&id) {
        list.push(id);
    }
}
