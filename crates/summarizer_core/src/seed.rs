//! crates/summarizer_core/src/seed.rs
//!
//! The fixed set of summaries used when no durable state exists.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{KnowledgeLevel, OutputType, SourceType, Summary, SummaryLength};

/// Midnight UTC on the given day of January 2024.
fn january_2024(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    title: &str,
    content: &str,
    source: &str,
    source_type: SourceType,
    output_type: OutputType,
    summary_length: SummaryLength,
    knowledge_level: KnowledgeLevel,
    day: u32,
    is_favorite: bool,
    tags: [&str; 3],
) -> Summary {
    Summary {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        source: source.to_string(),
        source_type,
        output_type,
        summary_length,
        knowledge_level,
        created_at: january_2024(day),
        is_favorite,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Five demonstration summaries with ids "1" through "5", newest first.
pub fn seed_summaries() -> Vec<Summary> {
    vec![
        seed(
            "1",
            "React 18 New Features Explained",
            "React 18 introduces concurrent features, automatic batching, and new APIs like useTransition and useDeferredValue. The new concurrent renderer allows React to work on multiple versions of the UI simultaneously, improving user experience with better loading states and transitions.",
            "https://www.youtube.com/watch?v=react18",
            SourceType::Video,
            OutputType::Text,
            SummaryLength::Medium,
            KnowledgeLevel::Intermediate,
            15,
            true,
            ["react", "javascript", "frontend"],
        ),
        seed(
            "2",
            "Machine Learning Fundamentals",
            "Machine learning is a subset of artificial intelligence that enables computers to learn and improve from experience without being explicitly programmed. Key concepts include supervised learning, unsupervised learning, and reinforcement learning.",
            "https://example.com/ml-article",
            SourceType::Article,
            OutputType::Text,
            SummaryLength::Long,
            KnowledgeLevel::Beginner,
            10,
            false,
            ["ai", "machine-learning", "tutorial"],
        ),
        seed(
            "3",
            "TypeScript Best Practices",
            "TypeScript provides static typing for JavaScript, helping catch errors at compile time. Best practices include using strict mode, proper type definitions, and leveraging advanced types like generics and utility types.",
            "https://www.youtube.com/watch?v=typescript-best-practices",
            SourceType::Video,
            OutputType::Video,
            SummaryLength::Short,
            KnowledgeLevel::Advanced,
            8,
            true,
            ["typescript", "javascript", "programming"],
        ),
        seed(
            "4",
            "Web Development Trends 2024",
            "The web development landscape in 2024 is dominated by AI integration, improved performance optimization, and enhanced developer experience. Key trends include AI-powered development tools, WebAssembly adoption, and progressive web apps.",
            "https://example.com/web-dev-trends",
            SourceType::Article,
            OutputType::Text,
            SummaryLength::Medium,
            KnowledgeLevel::Intermediate,
            5,
            false,
            ["web-development", "trends", "technology"],
        ),
        seed(
            "5",
            "Docker Containerization Guide",
            "Docker provides containerization technology that packages applications with their dependencies. This guide covers Docker basics, Dockerfile creation, container management, and best practices for production deployments.",
            "https://www.youtube.com/watch?v=docker-guide",
            SourceType::Video,
            OutputType::Text,
            SummaryLength::Long,
            KnowledgeLevel::Beginner,
            3,
            true,
            ["docker", "devops", "containers"],
        ),
    ]
}
