pub mod classifier;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod ingest;
pub mod insight;
pub mod library;
pub mod logging;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod utils;

pub use classifier::HeuristicClassifier;
pub use gateway::{CompletionProvider, GatewayError, InferenceGateway};
pub use insight::InsightExtractor;
pub use library::{KnowledgeLibrary, Library, Store};
pub use models::{Analysis, Book, Energy, GlyphSignature, Insight, ParsedFile};
pub use parser::ContentParser;
pub use pipeline::ClassificationPipeline;
