use crate::types::CompletionRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SYSTEM_PROMPT: &str = "あなたはプロの編集者です。";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// What to ask the language model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Summary,
    Tags,
    Outline,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::Summary,
        AnalysisKind::Tags,
        AnalysisKind::Outline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::Tags => "tags",
            AnalysisKind::Outline => "outline",
        }
    }

    /// Heading used when presenting results.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisKind::Summary => "要約",
            AnalysisKind::Tags => "タグ",
            AnalysisKind::Outline => "アウトライン",
        }
    }

    pub fn max_output_tokens(self) -> u32 {
        match self {
            AnalysisKind::Summary => 100,
            AnalysisKind::Tags => 60,
            AnalysisKind::Outline => 300,
        }
    }

    pub fn user_prompt(self, text: &str) -> String {
        match self {
            AnalysisKind::Summary => {
                format!("以下の文章を100文字以内で要約してください：\n\n{text}")
            }
            AnalysisKind::Tags => format!(
                "以下の文章の内容を表すタグを5個、カンマ区切りで出力してください。タグ以外は出力しないでください：\n\n{text}"
            ),
            AnalysisKind::Outline => format!(
                "以下の文章の構成を、見出しと箇条書きのアウトラインにまとめてください：\n\n{text}"
            ),
        }
    }

    pub fn request(self, text: &str, temperature: f64) -> CompletionRequest {
        CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: self.user_prompt(text),
            temperature,
            max_output_tokens: self.max_output_tokens(),
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(AnalysisKind::Summary),
            "tags" => Ok(AnalysisKind::Tags),
            "outline" => Ok(AnalysisKind::Outline),
            other => Err(format!(
                "analysis kind must be summary, tags or outline (got {other})"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_request_matches_demo_settings() {
        let request = AnalysisKind::Summary.request("本文", DEFAULT_TEMPERATURE);
        assert_eq!(request.system_prompt, SYSTEM_PROMPT);
        assert_eq!(
            request.user_prompt,
            "以下の文章を100文字以内で要約してください：\n\n本文"
        );
        assert_eq!(request.max_output_tokens, 100);
        assert!((request.temperature - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn every_kind_embeds_text() {
        for kind in AnalysisKind::ALL {
            assert!(kind.user_prompt("TRANSCRIPT").ends_with("TRANSCRIPT"));
            assert!(kind.max_output_tokens() > 0);
        }
    }

    #[test]
    fn parse_round_trips_names() {
        for kind in AnalysisKind::ALL {
            assert_eq!(kind.as_str().parse::<AnalysisKind>(), Ok(kind));
        }
        assert_eq!(" Tags ".parse::<AnalysisKind>(), Ok(AnalysisKind::Tags));
        assert!("keywords".parse::<AnalysisKind>().is_err());
    }
}
