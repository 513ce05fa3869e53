/// Default system instruction sent ahead of every request. Overridable
/// through the `system` field of the config file.
pub const DEFAULT_SYSTEM: &str =
    "You are a coding tutor. You Job is to provide hints and only hints. No code examples.";

/// How much the model is asked to reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintLevel {
    Broad,
    Technical,
    StepByStep,
}

impl HintLevel {
    /// The fixed qualifier inserted into the prompt.
    pub fn label(self) -> &'static str {
        match self {
            HintLevel::Broad => "broad level hints",
            HintLevel::Technical => "little bit technical hints",
            HintLevel::StepByStep => "explain the approach very simply, step by step",
        }
    }

    /// Short name shown next to the trigger key.
    pub fn name(self) -> &'static str {
        match self {
            HintLevel::Broad => "Low",
            HintLevel::Technical => "Medium",
            HintLevel::StepByStep => "Spoonfeed",
        }
    }

    /// F1..F3 select a level.
    pub fn from_fkey(n: u8) -> Option<Self> {
        match n {
            1 => Some(HintLevel::Broad),
            2 => Some(HintLevel::Technical),
            3 => Some(HintLevel::StepByStep),
            _ => None,
        }
    }
}

/// Assemble the full prompt: system preamble, hint level, raw problem text.
pub fn build_prompt(system: &str, level: HintLevel, problem: &str) -> String {
    format!(
        "System: {}\nUser: Hint level: {}\nUser: {}",
        system,
        level.label(),
        problem
    )
}
