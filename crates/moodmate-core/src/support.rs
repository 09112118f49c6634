//! Safety notices and relaxation tips appended to generated replies.

use rand::Rng;

use crate::config::{Helpline, SupportConfig};
use crate::model::{Suggestion, NEGATIVE_THRESHOLD};

/// Polarity strictly below this triggers the crisis notice.
pub const CRISIS_THRESHOLD: f64 = -0.6;

pub const CRISIS_MARKER: &str = "🚨 **Important:**";
pub const TIP_MARKER: &str = "💡 **Tip:**";

/// Chooses which tip to show. Swappable so tests can be deterministic.
pub trait TipPicker: Send + Sync {
    /// Index into a non-empty catalog of `len` tips.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTipPicker;

impl TipPicker for RandomTipPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the same index (wrapped into range).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTipPicker(pub usize);

impl TipPicker for FixedTipPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Immutable tips and helplines, loaded once at startup.
#[derive(Debug, Clone)]
pub struct SupportCatalog {
    tips: Vec<String>,
    helplines: Vec<Helpline>,
}

impl Default for SupportCatalog {
    fn default() -> Self {
        Self::from_config(&SupportConfig::default())
    }
}

impl SupportCatalog {
    pub fn new(tips: Vec<String>, helplines: Vec<Helpline>) -> Self {
        Self { tips, helplines }
    }

    pub fn from_config(config: &SupportConfig) -> Self {
        Self::new(config.tips.clone(), config.helplines.clone())
    }

    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    pub fn helplines(&self) -> &[Helpline] {
        &self.helplines
    }

    /// Decide what to add for a given polarity.
    pub fn suggest(&self, polarity: f64, picker: &impl TipPicker) -> Suggestion {
        if polarity < CRISIS_THRESHOLD {
            Suggestion::Crisis
        } else if polarity < NEGATIVE_THRESHOLD {
            if self.tips.is_empty() {
                return Suggestion::None;
            }
            let idx = picker.pick(self.tips.len()).min(self.tips.len() - 1);
            Suggestion::Tip {
                text: self.tips[idx].clone(),
            }
        } else {
            Suggestion::None
        }
    }

    /// Block-quoted notice text for a suggestion, if any.
    pub fn render(&self, suggestion: &Suggestion) -> Option<String> {
        match suggestion {
            Suggestion::None => None,
            Suggestion::Tip { text } => Some(format!("> {TIP_MARKER} {text}")),
            Suggestion::Crisis => {
                let lines: Vec<String> = self
                    .helplines
                    .iter()
                    .map(|h| format!("{}: {}", h.region, h.number))
                    .collect();
                Some(format!(
                    "> {CRISIS_MARKER} You seem to be struggling. Consider reaching out to a crisis support line. In {}",
                    lines.join(", ")
                ))
            }
        }
    }

    /// Append the rendered suggestion after a blank line.
    pub fn append(&self, reply: &str, suggestion: &Suggestion) -> String {
        match self.render(suggestion) {
            Some(notice) => format!("{reply}\n\n{notice}"),
            None => reply.to_string(),
        }
    }

    /// Crisis notice below -0.6, a tip below -0.2, otherwise the reply unchanged.
    pub fn augment(&self, reply: &str, polarity: f64, picker: &impl TipPicker) -> String {
        let suggestion = self.suggest(polarity, picker);
        self.append(reply, &suggestion)
    }
}
