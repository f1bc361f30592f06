//! Prompt construction for code analysis.
//!
//! The prompt is a fixed template parameterized only by the language and
//! the code. It describes the four-section report the model should return;
//! the gateway never checks that the model actually followed it.

/// Section headers the model is asked to reuse, in order.
pub const SECTION_HEADERS: [&str; 4] = ["Purpose:", "Issues / Bugs:", "Complexity:", "Optimization Tip:"];

/// Literal text the model should use when no issues are found.
pub const NO_ISSUES_TEXT: &str = "None detected.";

/// Build the analysis prompt for `code` written in `language`.
///
/// `code` is embedded as-is, with no escaping or trimming.
pub fn build_prompt(language: &str, code: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "You are an expert {language} developer and a concise technical assistant.\n"
    ));
    prompt.push_str(&format!(
        "Analyze the following {language} code and respond in **a short, well-formatted style**.\n\n"
    ));

    prompt.push_str("CODE:\n");
    prompt.push_str(code);
    prompt.push_str("\n\n");

    prompt.push_str("Your response format must follow this structure:\n\n");
    prompt.push_str(
        "Purpose: (clearly explain what the code does and how it functions in short)\n\n",
    );
    prompt.push_str(&format!(
        "Issues / Bugs: (Mention only if present, otherwise say \"{NO_ISSUES_TEXT}\")\n\n"
    ));
    prompt.push_str(
        "Complexity: (State approximate time complexity and space complexity in Big-O notation if applicable)\n\n",
    );
    prompt.push_str(
        "Optimization Tip: (short suggestion for improving efficiency or readability)\n\n",
    );

    prompt.push_str("Rules:\n");
    prompt.push_str("- Keep each section short and easy to read.\n");
    prompt.push_str("- Do NOT write paragraphs.\n");
    prompt.push_str("- Do NOT explain trivial code in detail.\n");
    prompt.push_str(
        "- Do NOT use emojis or decorative symbols; use the section headers and bold headings exactly as shown.\n",
    );
    prompt.push_str("- Be clear, structured, and concise.\n");

    prompt
}
