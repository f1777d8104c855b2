use crate::engine::drill::SessionSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Short toast-style messages raised by the engines. The UI owns the wording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    EmptyAnswer,
    Correct,
    TryAgain,
    LostHeart,
    TimeoutLostHeart,
    TimeoutNoAnswer,
    HintAdded,
    NoMoreHints,
    NoAudio,
    AudioFailed,
    NoListeningWords,
    MusicUnavailable,
    NoWords,
    ChapterLocked,
}

impl Notice {
    /// Locale key for the toast text.
    pub fn key(&self) -> &'static str {
        match self {
            Notice::EmptyAnswer => "notice.empty_answer",
            Notice::Correct => "notice.correct",
            Notice::TryAgain => "notice.try_again",
            Notice::LostHeart => "notice.lost_heart",
            Notice::TimeoutLostHeart => "notice.timeout_lost_heart",
            Notice::TimeoutNoAnswer => "notice.timeout_no_answer",
            Notice::HintAdded => "notice.hint_added",
            Notice::NoMoreHints => "notice.no_more_hints",
            Notice::NoAudio => "notice.no_audio",
            Notice::AudioFailed => "notice.audio_failed",
            Notice::NoListeningWords => "notice.no_listening_words",
            Notice::MusicUnavailable => "notice.music_unavailable",
            Notice::NoWords => "notice.no_words",
            Notice::ChapterLocked => "notice.chapter_locked",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Notice::Correct | Notice::HintAdded => Severity::Success,
            Notice::EmptyAnswer
            | Notice::TryAgain
            | Notice::NoMoreHints
            | Notice::NoAudio
            | Notice::AudioFailed
            | Notice::MusicUnavailable
            | Notice::ChapterLocked => Severity::Warning,
            Notice::LostHeart
            | Notice::TimeoutLostHeart
            | Notice::TimeoutNoAnswer
            | Notice::NoListeningWords
            | Notice::NoWords => Severity::Error,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Type the Norwegian word for this translation.
    Translate(String),
    /// Listen to the clip and type what you hear.
    Listen,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerResult {
    Correct { answer: String },
    Incorrect { typed: String, expected: String },
    TimedOut { expected: String },
}

impl AnswerResult {
    pub fn is_correct(&self) -> bool {
        matches!(self, AnswerResult::Correct { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrillEvent {
    WordPresented {
        index: usize,
        total: usize,
        instruction: Instruction,
    },
    PlayClip(String),
    StopClip,
    TimerStarted(u32),
    TimerTick {
        remaining: u32,
        low: bool,
    },
    TimerStopped,
    Result(AnswerResult),
    HeartsChanged(u32),
    InputChanged(String),
    Notify(Notice),
    Ended(SessionSummary),
}
