/// Client for the remote AI function (summaries, tag suggestions, questions).
///
/// The function is a single POST endpoint taking `{action, title?, content?}`.
mod client;
mod types;

pub use client::{AiClient, AiClientBuilder, AiClientTrait, AiError, DisabledClient};
pub use types::{AiAction, AiRequest, AiResponse};
