//! Stage definitions of the code review pipeline.

use crate::core::Persona;
use crate::errors::ReviewflowError;
use crate::pipeline::{PipelineBuilder, PipelineDefinition, StageDefinition};

/// Name of the built-in pipeline.
pub const PIPELINE_NAME: &str = "code-review";

/// Code quality analysis.
pub const QUALITY: &str = "quality";
/// Security audit.
pub const SECURITY: &str = "security";
/// Performance analysis.
pub const PERFORMANCE: &str = "performance";
/// Documentation review.
pub const DOCUMENTATION: &str = "documentation";
/// Final synthesized report.
pub const SYNTHESIS: &str = "synthesis";

const CODE_BLOCK: &str = "File: {artifact_name}\n```\n{artifact_content}\n```";

fn quality() -> StageDefinition {
    StageDefinition::new(
        QUALITY,
        Persona::new(
            "Senior Code Quality Analyst",
            "Analyze code for bugs, code smells, and potential issues",
            "You are a veteran software engineer with 20 years of experience in code reviews. \
             You have a keen eye for spotting bugs, performance issues, and violations of best practices.",
        ),
        format!(
            "Analyze {{artifact_name}} for:\n\
             1. Code quality issues (complexity, readability, maintainability)\n\
             2. Potential bugs and logic errors\n\
             3. Code smells (duplicated code, long functions, etc.)\n\
             4. Adherence to coding standards and best practices\n\
             5. Error handling and edge cases\n\n\
             Provide specific line numbers and examples for each issue found.\n\n{CODE_BLOCK}"
        ),
    )
    .with_expected_output("Detailed code quality analysis with specific issues and line numbers.")
}

fn security() -> StageDefinition {
    StageDefinition::new(
        SECURITY,
        Persona::new(
            "Cybersecurity Expert",
            "Identify security vulnerabilities and risks",
            "You are a certified security researcher specializing in OWASP Top 10 vulnerabilities. \
             You've prevented countless security breaches.",
        ),
        format!(
            "Perform a security audit of {{artifact_name}}:\n\
             1. Check for OWASP Top 10 vulnerabilities\n\
             2. Identify authentication/authorization issues\n\
             3. Look for injection vulnerabilities (SQL, XSS, Command)\n\
             4. Review input validation and sanitization\n\
             5. Check for hardcoded secrets or sensitive data\n\n\
             Rate each vulnerability by severity (Critical/High/Medium/Low) and \
             reference relevant lines from the file.\n\n{CODE_BLOCK}"
        ),
    )
    .with_expected_output("Security audit report with vulnerability severity ratings.")
    .with_dependency(QUALITY)
}

fn performance() -> StageDefinition {
    StageDefinition::new(
        PERFORMANCE,
        Persona::new(
            "Performance Optimization Specialist",
            "Analyze code performance and suggest optimizations",
            "You are a performance engineer who has optimized applications serving millions of users.",
        ),
        format!(
            "Analyze performance of {{artifact_name}}:\n\
             1. Identify algorithmic inefficiencies (O(n²), nested loops)\n\
             2. Check database query optimization\n\
             3. Look for memory leaks or excessive memory usage\n\
             4. Review caching opportunities\n\n\
             Suggest specific optimizations with expected impact and point to the \
             relevant code lines.\n\n{CODE_BLOCK}"
        ),
    )
    .with_expected_output("Performance analysis with optimization recommendations.")
    .with_dependency(QUALITY)
    .after(SECURITY)
}

fn documentation() -> StageDefinition {
    StageDefinition::new(
        DOCUMENTATION,
        Persona::new(
            "Technical Documentation Expert",
            "Review and improve code documentation",
            "You are a technical writer who believes great code tells a story.",
        ),
        format!(
            "Review documentation quality of {{artifact_name}}:\n\
             1. Check for missing docstrings/comments\n\
             2. Assess clarity of existing documentation\n\
             3. Identify undocumented complex logic\n\
             4. Review function/method parameter descriptions\n\n\
             Provide examples of improved documentation for key functions.\n\n{CODE_BLOCK}"
        ),
    )
    .with_expected_output("Documentation review with improvement suggestions.")
    .with_dependency(QUALITY)
    .after(PERFORMANCE)
}

fn synthesis() -> StageDefinition {
    StageDefinition::new(
        SYNTHESIS,
        Persona::new(
            "Lead Code Reviewer",
            "Synthesize all reviews and create actionable recommendations",
            "You are a tech lead who has mentored dozens of developers.",
        ),
        "Create a comprehensive code review report for {artifact_name}:\n\
         1. Summarize all findings from the other reviewers\n\
         2. Prioritize issues by severity and impact\n\
         3. Provide clear, actionable recommendations\n\
         4. Estimate effort required for each fix\n\
         5. Calculate overall code quality score (1-10)\n\n\
         Format as a professional code review report with sections:\n\
         - Summary\n\
         - Critical Issues\n\
         - Major Issues\n\
         - Minor Issues\n\
         - Recommendations & Next Steps",
    )
    .with_expected_output("Complete code review report with prioritized recommendations.")
    .with_dependencies([QUALITY, SECURITY, PERFORMANCE, DOCUMENTATION])
}

/// The five review stages in their canonical declaration order.
#[must_use]
pub fn code_review_stages() -> Vec<StageDefinition> {
    vec![quality(), security(), performance(), documentation(), synthesis()]
}

/// Builds the validated code review pipeline.
///
/// Execution order is quality, security, performance, documentation,
/// synthesis. The synthesis output becomes the review record.
///
/// # Errors
///
/// Never fails for the built-in stage set. The result is still returned as a
/// `Result` because the builder validates the graph.
pub fn code_review_pipeline() -> Result<PipelineDefinition, ReviewflowError> {
    code_review_stages()
        .into_iter()
        .fold(PipelineBuilder::new(PIPELINE_NAME), PipelineBuilder::stage)
        .output_stage(SYNTHESIS)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pipeline_order() {
        let pipeline = code_review_pipeline().unwrap();
        assert_eq!(
            pipeline.order().unwrap(),
            vec![QUALITY, SECURITY, PERFORMANCE, DOCUMENTATION, SYNTHESIS]
        );
        assert_eq!(pipeline.output_stage().unwrap(), SYNTHESIS);
        assert_eq!(pipeline.name(), PIPELINE_NAME);
    }

    #[test]
    fn test_order_ignores_declaration_order() {
        let mut stages = code_review_stages();
        stages.reverse();
        let reversed = PipelineDefinition::new("reversed", stages);
        assert_eq!(
            reversed.order().unwrap(),
            vec![QUALITY, SECURITY, PERFORMANCE, DOCUMENTATION, SYNTHESIS]
        );

        let mut stages = code_review_stages();
        stages.swap(1, 3);
        stages.swap(0, 4);
        let shuffled = PipelineDefinition::new("shuffled", stages);
        assert_eq!(
            shuffled.order().unwrap(),
            vec![QUALITY, SECURITY, PERFORMANCE, DOCUMENTATION, SYNTHESIS]
        );
    }

    #[test]
    fn test_data_dependencies() {
        let pipeline = code_review_pipeline().unwrap();
        for id in [SECURITY, PERFORMANCE, DOCUMENTATION] {
            assert_eq!(pipeline.stage(id).unwrap().dependencies, vec![QUALITY]);
        }
        assert_eq!(
            pipeline.stage(SYNTHESIS).unwrap().dependencies,
            vec![QUALITY, SECURITY, PERFORMANCE, DOCUMENTATION]
        );
        assert!(pipeline.stage(QUALITY).unwrap().dependencies.is_empty());
    }

    #[test]
    fn test_templates_embed_artifact() {
        for stage in code_review_stages() {
            assert!(stage.prompt_template.contains("{artifact_name}"), "{}", stage.id);
            assert!(!stage.expected_output.is_empty());
        }
        assert!(!code_review_pipeline().unwrap().needs_artifact_file());
    }

    #[test]
    fn test_personas() {
        let roles: Vec<_> = code_review_stages().into_iter().map(|s| s.persona.role).collect();
        assert_eq!(
            roles,
            vec![
                "Senior Code Quality Analyst",
                "Cybersecurity Expert",
                "Performance Optimization Specialist",
                "Technical Documentation Expert",
                "Lead Code Reviewer",
            ]
        );
    }
}
