//! The two prompt invocations CodeLoop makes: code generation and code
//! explanation.
//!
//! Both are single-call, stateless pass-throughs over [`PromptClient`]. The
//! generation flow asks for code-only output and still strips markdown
//! fences, since models wrap snippets in fences regardless of instructions.

use super::client::{PromptClient, PromptError};
use crate::data::{ExperienceLevel, Language};

/// Generate a code snippet for a natural-language task description.
pub async fn generate_code(
    client: &PromptClient,
    prompt: &str,
    language: Language,
) -> Result<String, PromptError> {
    let raw = client.complete(&code_generation_prompt(prompt, language)).await?;
    let code = strip_code_fences(&raw);
    if code.trim().is_empty() {
        return Err(PromptError::EmptyOutput);
    }
    Ok(code)
}

/// Explain a code snippet, tailored to the developer's experience level.
pub async fn explain_code(
    client: &PromptClient,
    code: &str,
    level: ExperienceLevel,
) -> Result<String, PromptError> {
    let explanation = client.complete(&explanation_prompt(code, level)).await?;
    Ok(explanation.trim().to_string())
}

fn code_generation_prompt(prompt: &str, language: Language) -> String {
    format!(
        r#"You are an expert {language} developer. You will receive a description of a coding task and respond with a single, self-contained {language} code snippet that accomplishes it.

Task:
{prompt}

Respond ONLY with the code. No markdown fences, no commentary."#,
        language = language,
        prompt = prompt,
    )
}

fn explanation_prompt(code: &str, level: ExperienceLevel) -> String {
    format!(
        r#"You are an AI expert in explaining code to developers of varying experience levels.

You will receive a code snippet and the experience level of the developer.
Your goal is to provide a clear, concise, and helpful explanation of the code tailored to their experience level.

Code Snippet:
```
{code}
```

Experience Level: {level}

Explanation:"#,
        code = code,
        level = level.as_str(),
    )
}

/// Extract the snippet body from a possibly-fenced response. Text outside
/// the outermost fence pair is discarded; an unfenced response is returned
/// as-is.
fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed.to_string();
    };

    let after_fence = &trimmed[start + 3..];
    // The info string ("```python") runs to the end of the fence line
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(after_fence.len());
    let body = &after_fence[body_start..];
    let body_end = body.rfind("```").unwrap_or(body.len());

    body[..body_end].trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfenced_response_passes_through() {
        assert_eq!(strip_code_fences("print('hi')\n"), "print('hi')");
    }

    #[test]
    fn test_fence_with_info_string() {
        let raw = "```python\nprint('hi')\n```";
        assert_eq!(strip_code_fences(raw), "print('hi')");
    }

    #[test]
    fn test_prose_around_fence_is_discarded() {
        let raw = "Here you go:\n```js\nconsole.log(1);\n```\nHope that helps!";
        assert_eq!(strip_code_fences(raw), "console.log(1);");
    }

    #[test]
    fn test_unterminated_fence_keeps_body() {
        let raw = "```go\nfmt.Println(\"hi\")";
        assert_eq!(strip_code_fences(raw), "fmt.Println(\"hi\")");
    }

    #[test]
    fn test_generation_prompt_mentions_language_and_task() {
        let prompt = code_generation_prompt("Write a hello world", Language::Go);
        assert!(prompt.contains("Go"));
        assert!(prompt.contains("Write a hello world"));
    }

    #[test]
    fn test_explanation_prompt_carries_level() {
        let prompt = explanation_prompt("print('hi')", ExperienceLevel::Junior);
        assert!(prompt.contains("junior"));
        assert!(prompt.contains("print('hi')"));
    }
}
