//! Persona metadata attached to a stage.

use serde::{Deserialize, Serialize};

/// Descriptive metadata that shapes a stage's prompt.
///
/// A persona is plain data: the generator receives it alongside the prompt
/// and may use it as a system instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Persona {
    /// The role the model should adopt.
    pub role: String,
    /// What the role is trying to achieve.
    pub goal: String,
    /// Background that frames the role.
    pub backstory: String,
}

impl Persona {
    /// Creates a new persona.
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// Renders the persona as a system instruction.
    #[must_use]
    pub fn system_instruction(&self) -> String {
        format!(
            "You are {}.\nYour goal: {}\n{}",
            self.role, self.goal, self.backstory
        )
    }
}
