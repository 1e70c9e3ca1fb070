//! Interactive patient console.
//!
//! Reads symptom descriptions from stdin, prints a locally-computed triage
//! summary (diagnosis + medication), then streams the model's reply and
//! records both sides of the exchange in the in-memory history. History is
//! append-only for one process run and dies with it.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::MedicineCatalog;
use crate::error::AppError;
use crate::llm::{ChatMessage, LlmProvider, ProviderError};
use crate::matcher::{MatchOutcome, SymptomMatcher};

/// Printed once at startup and used as the system turn of the history.
pub const GREETING: &str = "Hi! I'm a medical assistant, my name is Expert. How do you feel?";

const NO_MATCH_LINE: &str =
    "I couldn't determine a potential diagnosis based on your symptoms. Please consult a doctor.";
const NO_MEDICATION_LINE: &str =
    "No specific medication recommendations available. Please consult a doctor.";
const TURN_FAILED_LINE: &str =
    "Sorry — I couldn't complete that reply. Please try again.";

/// What one line of input led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input: nothing recorded, backend not called.
    Empty,
    /// Explicit quit/exit command.
    Quit,
    /// Full exchange: user and assistant turns recorded.
    Answered,
    /// Backend failed or the stream was interrupted; the partial reply was
    /// discarded and no assistant turn was recorded.
    Failed,
}

/// One patient's conversation: history plus the components a turn needs.
pub struct ConversationSession {
    matcher: SymptomMatcher,
    medicines: MedicineCatalog,
    provider: LlmProvider,
    history: Vec<ChatMessage>,
}

impl ConversationSession {
    pub fn new(matcher: SymptomMatcher, medicines: MedicineCatalog, provider: LlmProvider) -> Self {
        Self {
            matcher,
            medicines,
            provider,
            history: vec![ChatMessage::system(GREETING)],
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Drive the console loop until quit, EOF, or shutdown.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<(), AppError> {
        println!("{GREETING}");
        println!("Please enter a description of your symptoms separated by commas (e.g., fever, headache).");
        println!("Type 'quit' to end the conversation.");

        let stdin = tokio::io::stdin();
        let mut lines = BufReader::new(stdin).lines();

        loop {
            print!("Patient: ");
            let _ = std::io::stdout().flush();

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    println!();
                    info!("shutdown signal received — closing session");
                    break;
                }

                line = lines.next_line() => {
                    match line {
                        Err(e) => {
                            warn!("stdin read error: {e}");
                            break;
                        }
                        Ok(None) => {
                            info!("stdin closed");
                            break;
                        }
                        Ok(Some(input)) => {
                            match self.handle_turn(input.trim(), &shutdown).await {
                                TurnOutcome::Quit => break,
                                TurnOutcome::Empty => {
                                    println!("Please enter a description of your symptoms.");
                                }
                                TurnOutcome::Answered | TurnOutcome::Failed => {}
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Process one line of patient input.
    ///
    /// Blank input and quit commands touch neither history nor backend. A
    /// normal turn appends the user message, prints the triage summary,
    /// streams the reply, and appends it as the assistant turn — unless the
    /// stream fails or is cancelled, in which case the partial reply is
    /// discarded and the history ends at the user turn.
    pub async fn handle_turn(&mut self, input: &str, shutdown: &CancellationToken) -> TurnOutcome {
        if input.is_empty() {
            return TurnOutcome::Empty;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            info!("quit command received");
            return TurnOutcome::Quit;
        }

        debug!(input_len = input.len(), "patient turn received");
        self.history.push(ChatMessage::user(input));

        println!("{}", self.triage_summary(input));

        print!("Expert: ");
        let _ = std::io::stdout().flush();

        match self.stream_reply(shutdown).await {
            Ok(Some(reply)) => {
                self.history.push(ChatMessage::assistant(reply));
                println!("\n");
                TurnOutcome::Answered
            }
            Ok(None) => {
                println!("\n[reply interrupted — partial answer discarded]");
                info!("assistant turn cancelled mid-stream");
                TurnOutcome::Failed
            }
            Err(e) => {
                warn!(error = %e, "assistant turn failed");
                println!("\n{TURN_FAILED_LINE}");
                TurnOutcome::Failed
            }
        }
    }

    /// Local diagnosis + medication lines, printed before the model reply.
    pub fn triage_summary(&self, input: &str) -> String {
        match self.matcher.diagnose(input) {
            MatchOutcome::Matched(diagnosis) => {
                let mut out = format!("Based on your symptoms, it could be {}.", diagnosis.disease);
                match self.medicines.lookup(&diagnosis.disease) {
                    Some(record) => {
                        out.push_str(&format!(
                            "\nPossible medications include:\n- {} ({})",
                            record.medication, record.dosage
                        ));
                    }
                    None => {
                        out.push('\n');
                        out.push_str(NO_MEDICATION_LINE);
                    }
                }
                out
            }
            MatchOutcome::NoMatch => NO_MATCH_LINE.to_string(),
        }
    }

    /// Stream the reply for the current history, echoing fragments as they
    /// arrive. `Ok(None)` means the shutdown token fired mid-stream; the
    /// in-flight request is aborted by dropping the stream.
    async fn stream_reply(&self, shutdown: &CancellationToken) -> Result<Option<String>, ProviderError> {
        let mut stream = self.provider.stream_chat(&self.history).await?;
        let mut reply = String::new();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => return Ok(None),

                fragment = stream.next_fragment() => match fragment? {
                    Some(text) => {
                        print!("{text}");
                        let _ = std::io::stdout().flush();
                        reply.push_str(&text);
                    }
                    None => break,
                }
            }
        }
        Ok(Some(reply))
    }
}
