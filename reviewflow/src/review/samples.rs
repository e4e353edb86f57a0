//! Built-in sample artifacts and accepted upload types.

use crate::core::Artifact;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File extensions accepted for upload.
pub const SUPPORTED_EXTENSIONS: [&str; 10] =
    ["py", "js", "java", "cpp", "c", "go", "rb", "php", "ts", "jsx"];

/// Display name given to pasted code.
pub const PASTED_NAME: &str = "pasted_code.py";

/// Returns true if `file_name` has a supported extension (case-insensitive).
#[must_use]
pub fn is_supported_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Wraps pasted code in an artifact.
#[must_use]
pub fn pasted_artifact(content: impl Into<String>) -> Artifact {
    Artifact::new(PASTED_NAME, content)
}

/// Sample code with known problems, one per review focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sample {
    /// SQL injection, hardcoded credentials and an exposed key.
    SecurityIssues,
    /// Nested loops and quadratic duplicate search.
    PerformanceProblems,
    /// Terse names and no docstrings.
    DocumentationIssues,
}

impl Sample {
    /// All samples in menu order.
    pub const ALL: [Self; 3] = [
        Self::SecurityIssues,
        Self::PerformanceProblems,
        Self::DocumentationIssues,
    ];

    /// Human readable title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::SecurityIssues => "Security Issues",
            Self::PerformanceProblems => "Performance Problems",
            Self::DocumentationIssues => "Documentation Issues",
        }
    }

    /// File name of the sample, e.g. `example_security_issues.py`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("example_{}.py", self.title().to_lowercase().replace(' ', "_"))
    }

    /// The sample source.
    #[must_use]
    pub fn source(&self) -> &'static str {
        match self {
            Self::SecurityIssues => SECURITY_SAMPLE,
            Self::PerformanceProblems => PERFORMANCE_SAMPLE,
            Self::DocumentationIssues => DOCUMENTATION_SAMPLE,
        }
    }

    /// Builds the artifact for this sample.
    #[must_use]
    pub fn artifact(&self) -> Artifact {
        Artifact::new(self.file_name(), self.source())
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

const SECURITY_SAMPLE: &str = r#"
def get_user_data(user_id):
    # SQL Injection vulnerability
    query = "SELECT * FROM users WHERE id = " + str(user_id)
    return db.execute(query)

def login(username, password):
    # Hardcoded credentials
    if username == "admin" and password == "admin123":
        return True
    return False

API_KEY = "sk-1234567890abcdef"  # Exposed secret
"#;

const PERFORMANCE_SAMPLE: &str = r#"
def calculate_total(items):
    # O(n*m) nested loop
    total = 0
    for item in items:
        for price in item['prices']:
            total = total + price
    return total

def process_data(data):
    # Inefficient iteration
    result = []
    for i in range(len(data)):
        if data[i] > 0:
            result.append(data[i] * 2)
    return result

def find_duplicates(arr):
    # O(n²) algorithm
    duplicates = []
    for i in range(len(arr)):
        for j in range(i+1, len(arr)):
            if arr[i] == arr[j]:
                duplicates.append(arr[i])
    return duplicates
"#;

const DOCUMENTATION_SAMPLE: &str = r#"
def calc(a, b, c):
    x = a + b
    y = x * c
    z = y / 2
    return z

def process(data):
    result = []
    for item in data:
        if item > 0:
            result.append(item)
    return result

class DataProcessor:
    def __init__(self, data):
        self.data = data

    def process(self):
        return [x * 2 for x in self.data]
"#;
