//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! The browser client sends button presses and chat text; the server answers with
//! full screen renders plus background frames while an animated screen is visible.

use serde::{Deserialize, Serialize};

use crate::background::Frame;
use crate::domain::{Feedback, MedalTier, ScreenName, Turn};
use crate::seeds::LessonContent;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Ask for the current screen (sent once after connecting).
    Join,
    /// Welcome "Next"/"Start Lesson", Quiz "Next".
    Next,
    Back,
    TakeQuiz,
    OpenChat,
    Select {
        index: i64,
    },
    Ask {
        text: String,
    },
    Exit,
    Resize {
        width: u32,
        height: u32,
    },
    SaveProgress {
        #[serde(default)]
        lesson: Option<String>,
        #[serde(default)]
        score: Option<u32>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Screen {
        #[serde(skip_serializing_if = "Option::is_none")]
        cursor: Option<String>,
        view: ScreenView,
    },
    Frame {
        screen: ScreenName,
        frame: Frame,
    },
    ProgressSaved {
        lesson: String,
        score: u32,
        ok: bool,
    },
    /// The learner pressed Exit; the process is shutting down.
    Goodbye,
    Error {
        message: String,
    },
}

/// Everything a client needs to draw one screen.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenView {
    Welcome {
        line: String,
        step: usize,
        steps: usize,
        button: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        avatar: Option<String>,
    },
    Lesson {
        lesson: LessonContent,
    },
    Quiz {
        /// 1-based, as shown in "Question i of N".
        number: usize,
        total: usize,
        progress: String,
        prompt: String,
        options: Vec<String>,
        options_enabled: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        selected: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        feedback: Option<Feedback>,
        #[serde(skip_serializing_if = "Option::is_none")]
        feedback_text: Option<String>,
        show_next: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
    Result {
        score: u32,
        total: u32,
        tier: MedalTier,
        title: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        medal: Option<String>,
    },
    Chat {
        transcript: Vec<Turn>,
        placeholder: String,
        pending: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        avatar: Option<String>,
    },
}

impl ScreenView {
    #[cfg(test)]
    pub fn name(&self) -> ScreenName {
        match self {
            ScreenView::Welcome { .. } => ScreenName::Welcome,
            ScreenView::Lesson { .. } => ScreenName::Lesson,
            ScreenView::Quiz { .. } => ScreenName::Quiz,
            ScreenView::Result { .. } => ScreenName::Result,
            ScreenView::Chat { .. } => ScreenName::Chat,
        }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionOut {
    pub screen: ScreenName,
    pub score: u32,
    pub total: u32,
    pub completed_runs: u32,
    pub transcript: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressIn {
    #[serde(default)]
    pub lesson: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
}

#[derive(Serialize)]
pub struct ProgressOut {
    pub ok: bool,
}
