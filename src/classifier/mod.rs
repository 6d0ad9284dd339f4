mod gateway;
mod openai;
pub mod prompts;
mod rate_limit;
mod retry;
pub mod schemas;

pub use gateway::{ClassifierGateway, Pass1Response, Pass2Response, RawFeature};
pub use openai::OpenAiGateway;
pub use rate_limit::RateLimiter;
pub use retry::with_retry;
