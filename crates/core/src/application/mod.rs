// Application Layer - Use Cases

pub mod command_service;
pub mod constants;
pub mod normalize;

// Re-exports
pub use command_service::CommandService;
pub use normalize::normalize;
