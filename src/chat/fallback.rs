// Demo answer used when no provider credential is configured

use crate::content::{Subject, Unit};

/// Build the canned answer shown instead of a provider response.
///
/// Deterministic and offline: it echoes the question and the full briefing
/// so the app stays usable (and testable) without a key.
pub fn fallback_answer(
    subject: &Subject,
    unit: &Unit,
    question: &str,
    context_text: &str,
    credential_name: &str,
) -> String {
    [
        "（デモ応答）OpenAI API キーが設定されていないため、教材のポイントを元にヒントを表示します。"
            .to_string(),
        format!(
            "学習中: {} / {}",
            subject.display_name(),
            unit.display_name()
        ),
        format!("質問: {question}"),
        "--- 教材のまとめ ---".to_string(),
        context_text.to_string(),
        "----------------------".to_string(),
        format!(
            "環境変数 {credential_name} にキーを設定すると、AI 家庭教師からの回答が有効になります。"
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::build_context_text;

    #[test]
    fn test_fallback_contains_question_and_context() {
        let subject: Subject =
            serde_json::from_str(r#"{"id":"sci","name":"理科"}"#).unwrap();
        let unit: Unit = serde_json::from_str(
            r#"{"id":"light","name":"光の性質","overview":"光はまっすぐ進む"}"#,
        )
        .unwrap();
        let context = build_context_text(&subject, &unit);

        let answer = fallback_answer(&subject, &unit, "影はなぜできるの？", &context, "OPENAI_API_KEY");

        assert!(answer.starts_with("（デモ応答）"));
        assert!(answer.contains("学習中: 理科 / 光の性質"));
        assert!(answer.contains("質問: 影はなぜできるの？"));
        assert!(answer.contains(&format!("--- 教材のまとめ ---\n{context}\n---")));
        assert!(answer.ends_with("環境変数 OPENAI_API_KEY にキーを設定すると、AI 家庭教師からの回答が有効になります。"));

        let again = fallback_answer(&subject, &unit, "影はなぜできるの？", &context, "OPENAI_API_KEY");
        assert_eq!(answer, again);
    }
}
