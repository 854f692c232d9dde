//! Turns user intents into renderer calls and session updates.
//!
//! Every trigger funnels into one generation routine:
//!
//! 1. Skip when the trimmed source is empty (with a warning for explicit
//!    requests, silently otherwise).
//! 2. Render the selected format and a PDF, concurrently. The PDF is always
//!    rendered, even when PDF is the selected format.
//! 3. Commit a success only when both renders succeeded; otherwise commit a
//!    failure carrying the primary render's diagnostic if it failed, the
//!    PDF render's diagnostic otherwise.
//!
//! Changing the format alone never starts a generation.
//!
//! The caller hands in `&mut SessionState` for the whole call, so two
//! generations for one session cannot interleave. A generation whose future
//! is dropped before it commits leaves the previous result in place and the
//! session back in [`Phase::Idle`](crate::session::Phase::Idle).

use log::{debug, error, info, warn};

use dfdgen_core::{OutputFormat, ShareError, ShareLink};

use crate::{
    render::Renderer,
    session::{
        EMPTY_INPUT_NOTICE, Failure, FailureKind, INVALID_LINK_NOTICE, LOADED_FROM_URL_NOTICE,
        NoticeLevel, RenderResult, Rendered, SessionState,
    },
};

/// What a trigger did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Unchanged,
    /// The selected format was updated; no generation ran.
    FormatUpdated(OutputFormat),
    /// Empty input in an automatic trigger; nothing was rendered.
    Skipped,
    /// Empty input on explicit request; a warning was queued.
    Warned,
    /// A success was committed.
    Rendered,
    /// A failure was committed.
    Failed(FailureKind),
}

/// How the generation routine reacts to empty input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnEmpty {
    Warn,
    Skip,
}

/// Sequences triggers into renderer calls and commits their results.
#[derive(Debug)]
pub struct Controller<R> {
    renderer: R,
    share: ShareLink,
}

impl<R: Renderer> Controller<R> {
    /// Creates a controller rendering with `renderer` and building links with `share`.
    pub fn new(renderer: R, share: ShareLink) -> Self {
        Self { renderer, share }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn share(&self) -> &ShareLink {
        &self.share
    }

    /// The text area changed.
    ///
    /// Stores the new text and generates when it is not blank.
    pub async fn text_edited(&self, state: &mut SessionState, text: String) -> Transition {
        debug!(len = text.len(); "Text edited");
        state.set_source(text);
        self.generate(state, OnEmpty::Skip).await
    }

    /// The format dropdown changed. Only the selection is stored.
    pub fn format_changed(&self, state: &mut SessionState, format: OutputFormat) -> Transition {
        debug!(format = format.as_str(); "Format changed");
        state.set_format(format);
        Transition::FormatUpdated(format)
    }

    /// The generate button was pressed with the form's current values.
    pub async fn generate_pressed(
        &self,
        state: &mut SessionState,
        text: String,
        format: OutputFormat,
    ) -> Transition {
        debug!(len = text.len(), format = format.as_str(); "Generate pressed");
        state.set_source(text);
        state.set_format(format);
        self.generate(state, OnEmpty::Warn).await
    }

    /// A page was loaded, possibly carrying a share link's decoded text.
    ///
    /// Only a fresh session with link text is seeded; it then generates
    /// exactly once. Existing sessions keep their state. A link that does
    /// not decode leaves the session empty and queues a warning.
    pub async fn page_loaded(
        &self,
        state: &mut SessionState,
        link_text: Option<Result<String, ShareError>>,
        fresh: bool,
    ) -> Transition {
        let Some(link_text) = link_text else {
            return Transition::Unchanged;
        };
        if !fresh {
            debug!("Ignoring share link for existing session");
            return Transition::Unchanged;
        }
        let text = match link_text {
            Ok(text) => text,
            Err(err) => {
                warn!(err:%; "Rejected share link");
                state.notify(NoticeLevel::Warning, INVALID_LINK_NOTICE);
                return Transition::Warned;
            }
        };

        info!(len = text.len(); "Seeding session from share link");
        state.set_source(text);
        state.notify(NoticeLevel::Info, LOADED_FROM_URL_NOTICE);
        self.generate(state, OnEmpty::Skip).await
    }

    async fn generate(&self, state: &mut SessionState, on_empty: OnEmpty) -> Transition {
        if state.source().trim().is_empty() {
            return match on_empty {
                OnEmpty::Warn => {
                    state.notify(NoticeLevel::Warning, EMPTY_INPUT_NOTICE);
                    Transition::Warned
                }
                OnEmpty::Skip => Transition::Skipped,
            };
        }

        let source = state.source().to_owned();
        let format = state.format();
        let generation = state.begin_generation();

        let (primary, pdf) = tokio::join!(
            self.renderer.render(&source, format),
            self.renderer.render(&source, OutputFormat::Pdf),
        );

        let (result, transition) = match (primary, pdf) {
            (Ok(primary), Ok(pdf)) => {
                let share_url = self.share.url_for(&source);
                info!(format = format.as_str(), share_url:%; "Diagram rendered");
                (
                    RenderResult::Success(Rendered::new(source, format, primary, pdf, share_url)),
                    Transition::Rendered,
                )
            }
            (Err(err), _) | (Ok(_), Err(err)) => {
                if err.is_operational() {
                    error!(err:%; "Renderer unavailable");
                } else {
                    warn!(format = format.as_str(); "Renderer rejected diagram");
                }
                let failure = Failure::from(err);
                let kind = failure.kind();
                (RenderResult::Failure(failure), Transition::Failed(kind))
            }
        };

        generation.commit(result);
        transition
    }
}
