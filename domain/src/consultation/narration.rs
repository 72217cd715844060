//! System narration appended to the transcript

pub fn round_started(round: u32) -> String {
    format!("Round {round} of the consultation begins")
}

pub fn typing(name: &str) -> String {
    format!("{name} is typing...")
}

pub fn turn_failed(name: &str, reason: &str) -> String {
    format!("Call to {name} failed: {reason}")
}

pub fn discussion_ended() -> &'static str {
    "Statements for this round are finished; the doctors are evaluating the answers..."
}

pub fn stagnation_reached() -> &'static str {
    "Reached the limit of rounds without marking anyone as least convincing; the consultation ends."
}

pub fn adopt_answer(name: &str) -> String {
    format!("Consultation finished: adopting the answer of {name}.")
}

pub fn nobody_remains() -> &'static str {
    "Consultation finished: no doctors remain."
}
