//! Per-session state.
//!
//! [`SessionState`] is the single mutable record behind one browser
//! session: the current diagram source, the selected format, the current
//! [`RenderResult`] and pending notices. Only the controller mutates it;
//! the presentation layer works from an immutable [`SessionSnapshot`].

use std::sync::Arc;

use log::warn;

use dfdgen_core::OutputFormat;

use crate::render::{Artifact, RenderError};

/// Message shown after a successful generation.
pub const SUCCESS_NOTICE: &str = "DFD generated successfully!";

/// Message shown when an explicit request finds no usable input.
pub const EMPTY_INPUT_NOTICE: &str = "Please enter valid DFD text.";

/// Message shown when the source was seeded from a share link.
pub const LOADED_FROM_URL_NOTICE: &str = "Loaded DFD text from URL.";

/// Message shown when a share link's text could not be decoded.
pub const INVALID_LINK_NOTICE: &str = "Could not decode DFD text from URL.";

/// Generation phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Generating,
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

/// A one-shot message shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    level: NoticeLevel,
    message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn level(&self) -> NoticeLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A successful generation: both artifacts plus the link that reproduces them.
#[derive(Debug)]
pub struct Rendered {
    source: String,
    format: OutputFormat,
    primary: Arc<Artifact>,
    pdf: Arc<Artifact>,
    share_url: String,
}

impl Rendered {
    pub fn new(
        source: String,
        format: OutputFormat,
        primary: Artifact,
        pdf: Artifact,
        share_url: String,
    ) -> Self {
        Self {
            source,
            format,
            primary: Arc::new(primary),
            pdf: Arc::new(pdf),
            share_url,
        }
    }

    /// Source text the artifacts were rendered from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Format of the primary artifact.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn primary(&self) -> &Arc<Artifact> {
        &self.primary
    }

    pub fn pdf(&self) -> &Arc<Artifact> {
        &self.pdf
    }

    pub fn share_url(&self) -> &str {
        &self.share_url
    }
}

/// Category of a failed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The renderer rejected the input.
    Render,
    /// The renderer could not be started.
    ToolUnavailable,
    /// The renderer was killed after exceeding its time limit.
    TimedOut,
    /// Temporary files could not be prepared.
    Io,
}

impl FailureKind {
    /// Whether the failure needs operator attention rather than an input fix.
    pub fn is_operational(self) -> bool {
        !matches!(self, Self::Render)
    }
}

/// A failed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: FailureKind,
    diagnostic: String,
}

impl Failure {
    pub fn new(kind: FailureKind, diagnostic: impl Into<String>) -> Self {
        Self {
            kind,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Text shown to the user; the renderer's error stream for [`FailureKind::Render`].
    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }
}

impl From<RenderError> for Failure {
    fn from(err: RenderError) -> Self {
        let kind = match &err {
            RenderError::Failed { .. } | RenderError::MissingOutput { .. } => FailureKind::Render,
            RenderError::ToolUnavailable { .. } => FailureKind::ToolUnavailable,
            RenderError::TimedOut { .. } => FailureKind::TimedOut,
            RenderError::Io(_) => FailureKind::Io,
        };
        Self::new(kind, err.to_string())
    }
}

/// Outcome of the most recent generation.
#[derive(Debug)]
pub enum RenderResult {
    Success(Rendered),
    Failure(Failure),
}

impl RenderResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// The mutable record behind one session.
#[derive(Debug, Default)]
pub struct SessionState {
    source: String,
    format: OutputFormat,
    phase: Phase,
    result: Option<RenderResult>,
    notices: Vec<Notice>,
    generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result(&self) -> Option<&RenderResult> {
        self.result.as_ref()
    }

    /// The current success, if any.
    pub fn rendered(&self) -> Option<&Rendered> {
        match &self.result {
            Some(RenderResult::Success(rendered)) => Some(rendered),
            _ => None,
        }
    }

    /// Number of results committed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Produces an immutable view for rendering and clears pending notices.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        let outcome = self.result.as_ref().map(|result| match result {
            RenderResult::Success(rendered) => OutcomeView::Success {
                source: rendered.source.clone(),
                format: rendered.format,
                share_url: rendered.share_url.clone(),
            },
            RenderResult::Failure(failure) => OutcomeView::Failure(failure.clone()),
        });

        SessionSnapshot {
            source: self.source.clone(),
            format: self.format,
            outcome,
            notices: std::mem::take(&mut self.notices),
            generation: self.generation,
        }
    }

    pub(crate) fn set_source(&mut self, source: String) {
        self.source = source;
    }

    pub(crate) fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice::new(level, message));
    }

    /// Enters [`Phase::Generating`] until the returned guard commits or drops.
    pub(crate) fn begin_generation(&mut self) -> Generation<'_> {
        self.phase = Phase::Generating;
        Generation { state: self }
    }

    /// Replaces the current result and returns to [`Phase::Idle`].
    pub(crate) fn commit(&mut self, result: RenderResult) {
        if result.is_success() {
            self.notify(NoticeLevel::Success, SUCCESS_NOTICE);
        }
        self.result = Some(result);
        self.generation += 1;
        self.phase = Phase::Idle;
    }
}

/// An in-flight generation holding its session.
///
/// Dropping it without [`Generation::commit`] returns the session to
/// [`Phase::Idle`] with its previous result untouched.
#[derive(Debug)]
pub(crate) struct Generation<'a> {
    state: &'a mut SessionState,
}

impl Generation<'_> {
    pub(crate) fn commit(mut self, result: RenderResult) {
        self.state.commit(result);
    }
}

impl Drop for Generation<'_> {
    fn drop(&mut self) {
        if self.state.phase == Phase::Generating {
            warn!(generation = self.state.generation; "Generation abandoned before commit");
            self.state.phase = Phase::Idle;
        }
    }
}

/// What the presentation layer shows for the current result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeView {
    Success {
        source: String,
        format: OutputFormat,
        share_url: String,
    },
    Failure(Failure),
}

/// Immutable view of a session taken right before rendering a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub source: String,
    pub format: OutputFormat,
    pub outcome: Option<OutcomeView>,
    pub notices: Vec<Notice>,
    pub generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(source: &str) -> RenderResult {
        RenderResult::Success(Rendered::new(
            source.to_string(),
            OutputFormat::Svg,
            Artifact::from_bytes(b"<svg/>", OutputFormat::Svg).unwrap(),
            Artifact::from_bytes(b"%PDF", OutputFormat::Pdf).unwrap(),
            format!("http://h/?text={source}"),
        ))
    }

    #[test]
    fn test_commit_replaces_result_and_deletes_old_artifacts() {
        let mut state = SessionState::new();
        state.commit(rendered("a"));
        let old_primary = state.rendered().unwrap().primary().path().to_path_buf();
        let old_pdf = state.rendered().unwrap().pdf().path().to_path_buf();

        state.commit(RenderResult::Failure(Failure::new(
            FailureKind::Render,
            "syntax error on line 2",
        )));

        assert!(state.rendered().is_none());
        assert!(!old_primary.exists());
        assert!(!old_pdf.exists());
        assert_eq!(state.generation(), 2);
    }

    #[test]
    fn test_snapshot_drains_notices() {
        let mut state = SessionState::new();
        state.notify(NoticeLevel::Info, LOADED_FROM_URL_NOTICE);
        state.commit(rendered("a"));

        let first = state.snapshot();
        assert_eq!(first.notices.len(), 2);
        assert_eq!(first.notices[1].message(), SUCCESS_NOTICE);

        let second = state.snapshot();
        assert!(second.notices.is_empty());
        assert_eq!(second.outcome, first.outcome);
    }

    #[test]
    fn test_commit_returns_to_idle() {
        let mut state = SessionState::new();
        let generation = state.begin_generation();
        generation.commit(rendered("a"));

        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.generation(), 1);
        assert!(state.rendered().is_some());
    }

    #[test]
    fn test_dropped_generation_returns_to_idle_and_keeps_result() {
        let mut state = SessionState::new();
        state.commit(rendered("a"));
        let kept = state.rendered().unwrap().primary().path().to_path_buf();

        {
            let _generation = state.begin_generation();
        }

        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.generation(), 1);
        assert_eq!(state.rendered().unwrap().source(), "a");
        assert!(kept.exists());
    }

    #[test]
    fn test_failure_from_render_error() {
        let failure = Failure::from(RenderError::Failed {
            diagnostic: "bad".to_string(),
            code: Some(1),
        });
        assert_eq!(failure.kind(), FailureKind::Render);
        assert_eq!(failure.diagnostic(), "bad");
        assert!(!failure.kind().is_operational());

        let failure = Failure::from(RenderError::Io(std::io::Error::other("disk full")));
        assert_eq!(failure.kind(), FailureKind::Io);
        assert!(failure.kind().is_operational());
    }
}
