//! Content Provider Adapter - 生成式内容服务实现

mod fake_provider;
mod gemini_client;
mod prompts;

pub use fake_provider::{FakeContentProvider, FakeContentProviderConfig};
pub use gemini_client::{GeminiClient, GeminiClientConfig};
