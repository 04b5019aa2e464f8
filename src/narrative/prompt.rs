//! Fixed instructions sent alongside the analysis context

/// One-shot commentary on the analysis
pub fn commentary_prompt(context: &str) -> String {
    format!(
        "You are a professional financial analyst. Based on the financial indicators below, \
         write an objective, concise assessment (about 3-4 paragraphs) of the company's \
         financial position. Focus on growth rates, changes in asset structure and the \
         current ratio.\n\n\
         Raw data and indicators:\n\n{}",
        context
    )
}

/// System instruction for the follow-up chat
pub fn chat_system_instruction(context: &str) -> String {
    format!(
        "You are a professional financial analysis assistant with a good understanding of the \
         data provided. Answer the user's questions accurately, professionally and concisely. \
         You MUST use the current balance sheet data below when it is relevant to the question.\n\n\
         Current financial data (processed):\n\n{}",
        context
    )
}
