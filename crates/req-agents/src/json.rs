//! JSON-mode completion with local validation and schema-hint repair.
//!
//! JSON mode guarantees valid JSON, not the right shape. Every agent call
//! therefore deserializes locally and, on failure, sends the bad output
//! back with the expected JSON Schema and the validation error until it
//! parses or the retry budget runs out.

use req_llm::Completion;
use req_llm::error::LlmError;

use crate::error::AgentError;

/// Retry budget for the repair loop, matching the agents' call sites.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Run a JSON-mode completion and deserialize it as `T`, repairing on
/// failure.
///
/// `validate` checks constraints serde cannot express (non-empty lists,
/// ID formats). Its error string is fed back to the model verbatim.
///
/// # Errors
///
/// Returns [`LlmError::InvalidJson`] (wrapped) once `max_retries` repairs
/// have been spent, or any transport error from the completions.
pub async fn complete_validated<T, C>(
    llm: &C,
    system_prompt: &str,
    user_prompt: &str,
    validate: impl Fn(&T) -> Result<(), String>,
    max_retries: u32,
) -> Result<T, AgentError>
where
    T: serde::de::DeserializeOwned + schemars::JsonSchema,
    C: Completion,
{
    let mut raw = llm.complete_json(system_prompt, user_prompt).await?;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let parsed = serde_json::from_str::<T>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|value| validate(&value).map(|()| value));

        match parsed {
            Ok(value) => return Ok(value),
            Err(message) if attempts > max_retries => {
                return Err(LlmError::InvalidJson { attempts, message }.into());
            }
            Err(message) => {
                tracing::warn!(attempts, %message, "agent output failed validation, repairing");
                raw = repair_json::<T, C>(llm, &raw, &message).await?;
            }
        }
    }
}

/// Ask the model to fix its own output against the expected schema.
async fn repair_json<T, C>(llm: &C, raw: &str, error: &str) -> Result<String, LlmError>
where
    T: schemars::JsonSchema,
    C: Completion,
{
    let schema = schemars::schema_for!(T);
    let schema_text = serde_json::to_string_pretty(&schema).unwrap_or_default();
    let user_prompt = format!(
        "Fix the following JSON so it matches the required schema.\n\n\
         Schema (JSON Schema):\n{schema_text}\n\n\
         Validation error:\n{error}\n\n\
         Bad JSON:\n{raw}\n\n\
         Return ONLY the corrected JSON."
    );
    llm.complete_json("You are a JSON repair tool. Output JSON only.", &user_prompt)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support::Scripted;

    #[derive(Debug, serde::Deserialize, schemars::JsonSchema, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    fn no_validation(_: &Point) -> Result<(), String> {
        Ok(())
    }

    #[tokio::test]
    async fn first_attempt_success() {
        let llm = Scripted::new(&[r#"{"x":1,"y":2}"#]);
        let point: Point = complete_validated(&llm, "sys", "user", no_validation, 2)
            .await
            .unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }

    #[tokio::test]
    async fn repair_recovers_bad_shape() {
        let llm = Scripted::new(&[r#"{"x":"one","y":2}"#, r#"{"x":1,"y":2}"#]);
        let point: Point = complete_validated(&llm, "sys", "user", no_validation, 2)
            .await
            .unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Schema (JSON Schema)"));
        assert!(prompts[1].contains(r#""x":"one""#));
    }

    #[tokio::test]
    async fn validation_failure_triggers_repair() {
        let llm = Scripted::new(&[r#"{"x":-1,"y":2}"#, r#"{"x":1,"y":2}"#]);
        let validate = |p: &Point| {
            if p.x < 0 {
                Err("x must be non-negative".to_string())
            } else {
                Ok(())
            }
        };
        let point: Point = complete_validated(&llm, "sys", "user", validate, 2)
            .await
            .unwrap();
        assert_eq!(point.x, 1);

        let prompts = llm.prompts();
        assert!(prompts[1].contains("x must be non-negative"));
    }

    #[tokio::test]
    async fn retry_budget_exhausted() {
        let llm = Scripted::new(&["not json", "still not json", "nope"]);
        let result: Result<Point, _> =
            complete_validated(&llm, "sys", "user", no_validation, 2).await;
        assert!(matches!(
            result,
            Err(AgentError::Llm(LlmError::InvalidJson { attempts: 3, .. }))
        ));
    }
}
