// Notes API: request validation, the worker document model, Markdown export.
// Worker processes are launched only through the agent module.

pub mod export;
pub mod handlers;
pub mod models;
pub mod validation;
