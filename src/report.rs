use crate::{backup::Outcome, config::telegram, secrets::Secrets};

const HEADER: &str = "🤖 *Backups status * 🤖";

/// Sends the consolidated status report for one run. Called at most once per
/// run; does nothing when there are no outcomes. Transport failures are
/// logged and swallowed, a broken notification channel must not affect the
/// process outcome.
pub fn send(telegram: &telegram::Definition, secrets: &Secrets, outcomes: &[Outcome]) {
    if outcomes.is_empty() {
        tracing::info!("no outcomes to report");
        return;
    }
    tracing::info!(outcomes = outcomes.len(), "sending status report");
    match try_send(telegram, secrets, outcomes) {
        Ok(()) => tracing::info!("status report sent"),
        Err(error) => tracing::warn!(%error, "failed to send status report"),
    }
}

pub fn format_message(markers: &[String]) -> String {
    format!("{}\n\n{}", HEADER, markers.join("\n"))
}

fn try_send(
    telegram: &telegram::Definition,
    secrets: &Secrets,
    outcomes: &[Outcome],
) -> eyre::Result<()> {
    let token = secrets.get_secret(&telegram.token)?;
    let markers: Vec<String> = outcomes.iter().map(Outcome::marker).collect();
    let url = format!("https://api.telegram.org/bot{}/sendMessage", token.0);

    ureq::post(&url)
        .timeout(telegram.request_timeout)
        .send_json(serde_json::json!({
            "chat_id": telegram.chat_id,
            "text": format_message(&markers),
            "parse_mode": "Markdown",
        }))?;
    Ok(())
}
