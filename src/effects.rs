//! Outbox of user-visible effects produced while processing events
//!
//! The engine never renders anything itself. Alerts, speech, cursor routing
//! and redraw requests are collected here for the embedding application.

use crate::alert::Alert;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Alert(Alert),
    /// Text to announce (context titles)
    Speak(String),
    /// Move the host's screen cursor to a cell
    RouteCursor { column: usize, row: usize },
    /// A host command was launched
    HostCommand(Vec<String>),
    /// The braille window moved and should be redrawn
    Redraw,
}

#[derive(Debug, Clone, Default)]
pub struct Effects {
    items: Vec<Effect>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.items.push(effect);
    }

    pub fn alert(&mut self, alert: Alert) {
        tracing::debug!("alert: {}", alert);
        self.items.push(Effect::Alert(alert));
    }

    pub fn speak(&mut self, text: impl Into<String>) {
        self.items.push(Effect::Speak(text.into()));
    }

    /// Request a redraw unless one is already pending
    pub fn redraw(&mut self) {
        if !self.items.contains(&Effect::Redraw) {
            self.items.push(Effect::Redraw);
        }
    }

    /// Drain every pending effect in the order it was produced
    pub fn take(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.items)
    }

    pub fn as_slice(&self) -> &[Effect] {
        &self.items
    }

    pub fn alerts(&self) -> impl Iterator<Item = Alert> + '_ {
        self.items.iter().filter_map(|effect| match effect {
            Effect::Alert(alert) => Some(*alert),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redraw_coalesces() {
        let mut effects = Effects::new();
        effects.redraw();
        effects.alert(Alert::Bounce);
        effects.redraw();
        assert_eq!(effects.take(), vec![Effect::Redraw, Effect::Alert(Alert::Bounce)]);
        assert!(effects.is_empty());
    }
}
