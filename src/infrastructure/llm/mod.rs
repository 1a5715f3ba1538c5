mod chat_completion_client;

pub use chat_completion_client::ChatCompletionClient;
