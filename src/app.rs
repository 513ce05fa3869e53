use crate::tui::UiEvent;

/// Where the current request is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
}

/// All UI state. The event loop owns this exclusively; stream tasks only
/// reach it through [`UiEvent`]s carrying the generation they were
/// spawned with, so a superseded stream can never clobber newer state.
pub struct App {
    pub problem: String,
    pub hint: String,
    pub phase: Phase,
    pub generation: u64,
    pub scroll: u16,
}

impl App {
    pub fn new() -> Self {
        Self {
            problem: String::new(),
            hint: String::new(),
            phase: Phase::Idle,
            generation: 0,
            scroll: 0,
        }
    }

    pub fn loading(&self) -> bool {
        matches!(self.phase, Phase::Requesting | Phase::Streaming)
    }

    /// Start a new request: bump the generation, drop any previous hint.
    pub fn begin_request(&mut self) -> u64 {
        self.generation += 1;
        self.hint.clear();
        self.phase = Phase::Requesting;
        self.scroll = u16::MAX;
        self.generation
    }

    /// Local message shown in the hint pane without issuing a request.
    pub fn show_notice(&mut self, msg: &str) {
        self.hint = msg.to_string();
        self.phase = Phase::Idle;
        self.scroll = u16::MAX;
    }

    /// Apply a stream event. Events from a superseded generation are
    /// dropped.
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Fragment(generation, text) if generation == self.generation => {
                self.hint.push_str(&text);
                self.phase = Phase::Streaming;
                self.scroll = u16::MAX;
            }
            UiEvent::Done(generation) if generation == self.generation => {
                if self.loading() {
                    self.phase = Phase::Completed;
                }
            }
            UiEvent::Failed(generation, msg) if generation == self.generation => {
                self.hint = msg;
                self.phase = Phase::Failed;
                self.scroll = u16::MAX;
            }
            _ => {}
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.problem.push(c);
    }

    pub fn push_newline(&mut self) {
        self.problem.push('\n');
    }

    pub fn backspace(&mut self) {
        self.problem.pop();
    }

    pub fn scroll_up(&mut self) {
        if self.scroll != u16::MAX && self.scroll > 0 {
            self.scroll -= 1;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.scroll != u16::MAX {
            self.scroll = self.scroll.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_request_resets_hint_and_sets_loading() {
        let mut app = App::new();
        app.hint = "stale".into();
        let generation = app.begin_request();
        assert_eq!(generation, 1);
        assert!(app.hint.is_empty());
        assert!(app.loading());
        assert_eq!(app.phase, Phase::Requesting);
    }

    #[test]
    fn fragments_accumulate_and_done_completes() {
        let mut app = App::new();
        let generation = app.begin_request();
        app.apply(UiEvent::Fragment(generation, "Hel".into()));
        app.apply(UiEvent::Fragment(generation, "lo".into()));
        assert_eq!(app.phase, Phase::Streaming);
        app.apply(UiEvent::Done(generation));
        assert_eq!(app.hint, "Hello");
        assert!(!app.loading());
        assert_eq!(app.phase, Phase::Completed);
    }

    #[test]
    fn stale_generation_events_are_dropped() {
        let mut app = App::new();
        let old = app.begin_request();
        let new = app.begin_request();
        assert!(app.hint.is_empty());

        app.apply(UiEvent::Fragment(old, "old text".into()));
        app.apply(UiEvent::Done(old));
        assert!(app.hint.is_empty());
        assert!(app.loading());

        app.apply(UiEvent::Fragment(new, "new".into()));
        assert_eq!(app.hint, "new");
    }

    #[test]
    fn failure_replaces_hint_and_clears_loading() {
        let mut app = App::new();
        let generation = app.begin_request();
        app.apply(UiEvent::Fragment(generation, "partial".into()));
        app.apply(UiEvent::Failed(
            generation,
            "Error fetching hint: HTTP error! status: 500".into(),
        ));
        assert!(app.hint.contains("HTTP error! status: 500"));
        assert!(!app.loading());
        assert_eq!(app.phase, Phase::Failed);
    }

    #[test]
    fn notice_shows_without_entering_loading() {
        let mut app = App::new();
        app.show_notice("Please enter a problem description.");
        assert_eq!(app.hint, "Please enter a problem description.");
        assert!(!app.loading());
    }

    #[test]
    fn multiline_problem_editing() {
        let mut app = App::new();
        app.push_char('a');
        app.push_newline();
        app.push_char('b');
        assert_eq!(app.problem, "a\nb");
        app.backspace();
        assert_eq!(app.problem, "a\n");
    }
}
