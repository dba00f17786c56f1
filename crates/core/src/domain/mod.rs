// Domain Layer - Command invocation model and pure logic

pub mod error;
pub mod invocation;
pub mod result;
pub mod tokenizer;

// Re-exports
pub use error::{CommandError, FailureKind};
pub use invocation::Invocation;
pub use result::{CommandResult, Completion};
pub use tokenizer::tokenize;
