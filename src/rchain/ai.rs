/// Token accounting reported by a provider, when it reports any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Assistant message returned by chat models.
#[derive(Debug, Clone)]
pub struct AIMessage {
    /// Natural language content.
    pub content: String,
    pub usage: Option<Usage>,
}
