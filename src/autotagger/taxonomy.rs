//! Fixed category table rendered into the tagging prompt.

/// One taxonomy category with guidance for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

/// Name of the catch-all category. The model must never emit it as a tag.
pub const CATCH_ALL: &str = "Other";

/// Categories in the order they appear in the prompt.
///
/// Used only to guide the model; answers outside the table are not rejected.
pub const TAXONOMY: &[Category] = &[
    Category {
        name: "Language",
        description: "Programming or query languages the content is about",
        examples: &["Rust", "Python", "TypeScript", "Go", "Sql"],
    },
    Category {
        name: "Framework",
        description: "Libraries, frameworks and runtimes",
        examples: &["React", "Django", "Tokio", "SpringBoot", "NextJs"],
    },
    Category {
        name: "Infrastructure",
        description: "Cloud platforms, containers, CI/CD and deployment tooling",
        examples: &["Aws", "Kubernetes", "Docker", "Terraform", "GitHubActions"],
    },
    Category {
        name: "Database",
        description: "Data stores, caches and search engines",
        examples: &["PostgreSql", "Redis", "MongoDb", "Elasticsearch", "Sqlite"],
    },
    Category {
        name: "Architecture",
        description: "Design patterns, system design and software structure",
        examples: &["Microservices", "EventDriven", "DomainDrivenDesign", "CleanArchitecture"],
    },
    Category {
        name: "Observability",
        description: "Logging, metrics, tracing and monitoring",
        examples: &["OpenTelemetry", "Prometheus", "Grafana", "Logging"],
    },
    Category {
        name: "AI/ML",
        description: "Machine learning, LLMs and data science",
        examples: &["Llm", "MachineLearning", "Rag", "PromptEngineering", "PyTorch"],
    },
    Category {
        name: CATCH_ALL,
        description: "Anything that fits none of the above; use a concrete topic label, never this category name",
        examples: &["Security", "Testing", "Performance", "CareerGrowth"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catch_all_is_last_category() {
        assert_eq!(TAXONOMY.last().map(|c| c.name), Some(CATCH_ALL));
    }

    #[test]
    fn every_category_has_examples() {
        assert!(TAXONOMY.iter().all(|c| !c.examples.is_empty()));
    }
}
