//! Debate postures and their behavioral instructions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CounterpointError;

/// Directive appended to every style's system prompt. The model always
/// argues the side opposite to the user's stated position.
pub const OPPOSITION_DIRECTIVE: &str = "The user will present a position or argument. \
Your job is to take the OPPOSITE side and debate against their position. \
Identify what they're arguing FOR, then argue AGAINST it. \
Maintain the opposing viewpoint throughout the conversation. \
Keep responses focused and concise (2-4 paragraphs).";

/// A named debate posture controlling the tone/strategy instruction given
/// to the model. Fixed set; pinned at session start and immutable for the
/// session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum DebateStyle {
    Socratic,
    Blunt,
    #[default]
    Neutral,
    DevilsAdvocate,
    Empathetic,
}

impl DebateStyle {
    pub const ALL: [DebateStyle; 5] = [
        DebateStyle::Socratic,
        DebateStyle::Blunt,
        DebateStyle::Neutral,
        DebateStyle::DevilsAdvocate,
        DebateStyle::Empathetic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DebateStyle::Socratic => "Socratic",
            DebateStyle::Blunt => "Blunt",
            DebateStyle::Neutral => "Neutral",
            DebateStyle::DevilsAdvocate => "Devil's Advocate",
            DebateStyle::Empathetic => "Empathetic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DebateStyle::Socratic => "Questions your assumptions and guides through logic",
            DebateStyle::Blunt => "Direct and straightforward opposition",
            DebateStyle::Neutral => "Balanced and analytical opposition",
            DebateStyle::DevilsAdvocate => "Extreme opposing position for exploration",
            DebateStyle::Empathetic => "Gentle opposition with understanding",
        }
    }

    /// The style's behavioral instruction, used as the leading fragment of
    /// the provider system prompt
    pub fn system_prompt(&self) -> &'static str {
        match self {
            DebateStyle::Socratic => {
                "You are a Socratic debater. Instead of directly stating counter-arguments, \
                 ask probing questions that expose assumptions, contradictions, or gaps in \
                 reasoning. Guide the person to discover flaws in their own argument through \
                 thoughtful inquiry. Be respectful but persistent in your questioning."
            }
            DebateStyle::Blunt => {
                "You are a blunt debater. Present counter-arguments directly and clearly \
                 without sugar-coating. Point out logical flaws, provide opposing evidence, \
                 and challenge claims head-on. Be assertive but not disrespectful."
            }
            DebateStyle::Neutral => {
                "You are a neutral debater. Present counter-arguments in a measured, \
                 analytical way. Acknowledge valid points while systematically presenting \
                 opposing perspectives. Focus on evidence, logic, and balanced analysis."
            }
            DebateStyle::DevilsAdvocate => {
                "You are playing devil's advocate. Take the most extreme reasonable opposing \
                 position to help stress-test arguments. Be provocative and challenge every \
                 aspect, but remain within bounds of rational debate."
            }
            DebateStyle::Empathetic => {
                "You are an empathetic debater. While opposing the argument, acknowledge the \
                 person's perspective and feelings. Present counter-arguments gently, showing \
                 you understand why they might hold their view while explaining alternative \
                 perspectives."
            }
        }
    }
}

impl fmt::Display for DebateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DebateStyle::Socratic => "socratic",
            DebateStyle::Blunt => "blunt",
            DebateStyle::Neutral => "neutral",
            DebateStyle::DevilsAdvocate => "devils-advocate",
            DebateStyle::Empathetic => "empathetic",
        };
        f.write_str(s)
    }
}

impl FromStr for DebateStyle {
    type Err = CounterpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_style_loose(s).ok_or_else(|| {
            CounterpointError::validation(
                "style",
                format!(
                    "Invalid style '{s}'. Valid styles: socratic, blunt, neutral, \
                     devils-advocate, empathetic"
                ),
            )
        })
    }
}

// Forgiving deserializer: accepts case/spacing/punctuation variants and
// synonyms; unknown values fall back to the neutral posture
impl<'de> Deserialize<'de> for DebateStyle {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = match String::deserialize(de) {
            Ok(s) => s,
            Err(_) => return Ok(DebateStyle::default()),
        };
        Ok(parse_style_loose(&s).unwrap_or_else(|| {
            tracing::warn!("unknown debate style '{s}', falling back to neutral");
            DebateStyle::default()
        }))
    }
}

fn parse_style_loose(input: &str) -> Option<DebateStyle> {
    let n: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match n.as_str() {
        "socratic" | "socrates" => Some(DebateStyle::Socratic),
        "blunt" | "direct" => Some(DebateStyle::Blunt),
        "neutral" | "balanced" => Some(DebateStyle::Neutral),
        "devilsadvocate" | "devils" | "devil" | "advocate" => Some(DebateStyle::DevilsAdvocate),
        "empathetic" | "empathic" | "gentle" => Some(DebateStyle::Empathetic),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_loose_forms() {
        assert_eq!("blunt".parse::<DebateStyle>().unwrap(), DebateStyle::Blunt);
        assert_eq!(
            "Devil's Advocate".parse::<DebateStyle>().unwrap(),
            DebateStyle::DevilsAdvocate
        );
        assert_eq!(
            "devils-advocate".parse::<DebateStyle>().unwrap(),
            DebateStyle::DevilsAdvocate
        );
        assert_eq!(
            "SOCRATIC".parse::<DebateStyle>().unwrap(),
            DebateStyle::Socratic
        );
    }

    #[test]
    fn rejects_unknown_style_with_validation_error() {
        let err = "aggressive".parse::<DebateStyle>().unwrap_err();
        assert!(matches!(
            err,
            CounterpointError::Validation { ref field, .. } if field == "style"
        ));
    }

    #[test]
    fn deserializer_falls_back_to_neutral() {
        let style: DebateStyle = serde_json::from_str("\"no-such-style\"").unwrap();
        assert_eq!(style, DebateStyle::Neutral);
        let style: DebateStyle = serde_json::from_str("\"empathetic\"").unwrap();
        assert_eq!(style, DebateStyle::Empathetic);
    }

    #[test]
    fn every_style_carries_prompt_and_metadata() {
        for style in DebateStyle::ALL {
            assert!(!style.name().is_empty());
            assert!(!style.description().is_empty());
            assert!(!style.system_prompt().is_empty());
        }
    }
}
