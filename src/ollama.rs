use crate::config::load_config;
use crate::hint::{self, HintLevel};
use crate::tui::UiEvent;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct StreamLine {
    response: Option<String>,
    done: Option<bool>,
}

/// Reassembles newline-delimited records from arbitrarily split byte
/// chunks. The transport may cut a record (or even a UTF-8 sequence)
/// anywhere, so bytes are buffered until a full line is available.
#[derive(Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Feed one chunk, get back every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let rest = self.pending.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.pending, rest);
            line.pop();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Any unterminated trailing line once the body ends.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

#[derive(Debug, PartialEq)]
enum LineOutcome {
    Continue,
    Finished,
}

/// Handle one stream line: skip blanks, skip unparsable lines, publish
/// text fragments, stop on the completion marker.
fn process_line(line: &str, generation: u64, tx: &UnboundedSender<UiEvent>) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Continue;
    }

    let parsed: StreamLine = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("skipping unparsable stream line {:?}: {}", line, e);
            return LineOutcome::Continue;
        }
    };

    if parsed.done.unwrap_or(false) {
        return LineOutcome::Finished;
    }

    if let Some(text) = parsed.response {
        if !text.is_empty() {
            let _ = tx.send(UiEvent::Fragment(generation, text));
        }
    }

    LineOutcome::Continue
}

async fn run_stream(
    level: HintLevel,
    problem: &str,
    generation: u64,
    cancel: &CancellationToken,
    tx: &UnboundedSender<UiEvent>,
) -> Result<()> {
    let cfg = load_config().context("loading config")?;
    let endpoint = format!("{}/api/generate", cfg.uri);
    let system = cfg.system.as_deref().unwrap_or(hint::DEFAULT_SYSTEM);

    let request = GenerateRequest {
        model: &cfg.model,
        prompt: hint::build_prompt(system, level, problem),
        stream: true,
        options: GenerateOptions {
            temperature: cfg.temperature,
        },
    };

    let client = Client::new();
    let resp = client
        .post(&endpoint)
        .json(&request)
        .send()
        .await
        .context("sending request to Ollama")?;

    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("HTTP error! status: {}", status.as_u16());
    }

    let mut buf = LineBuffer::default();
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        if cancel.is_cancelled() {
            return Ok(());
        }
        let chunk = chunk.context("reading response body")?;
        for line in buf.push(&chunk) {
            if process_line(&line, generation, tx) == LineOutcome::Finished {
                return Ok(());
            }
        }
    }

    if let Some(tail) = buf.finish() {
        process_line(&tail, generation, tx);
    }
    Ok(())
}

/// Stream one hint request into the UI channel. Sends exactly one
/// terminal event: `Done` on the completion marker or natural stream
/// end, `Failed` on any request-level error.
pub async fn stream_hint(
    level: HintLevel,
    problem: String,
    generation: u64,
    cancel: CancellationToken,
    tx: UnboundedSender<UiEvent>,
) {
    match run_stream(level, &problem, generation, &cancel, &tx).await {
        Ok(()) => {
            let _ = tx.send(UiEvent::Done(generation));
        }
        Err(e) => {
            tracing::warn!("hint request failed: {:#}", e);
            let _ = tx.send(UiEvent::Failed(generation, format!("Error fetching hint: {:#}", e)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = rx.try_recv() {
            events.push(evt);
        }
        events
    }

    #[test]
    fn line_buffer_reassembles_record_split_across_chunks() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"{\"response\":\"He").is_empty());
        let lines = buf.push(b"l\"}\n");
        assert_eq!(lines, vec!["{\"response\":\"Hel\"}".to_string()]);
        assert!(buf.finish().is_none());
    }

    #[test]
    fn line_buffer_emits_every_line_in_one_chunk() {
        let mut buf = LineBuffer::default();
        let lines = buf.push(b"{\"a\":1}\n{\"b\":2}\npartial");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "{\"a\":1}");
        assert_eq!(lines[1], "{\"b\":2}");
        assert_eq!(buf.finish().as_deref(), Some("partial"));
    }

    #[test]
    fn line_buffer_keeps_split_utf8_intact() {
        let text = "{\"response\":\"héllo\"}\n".as_bytes();
        // cut inside the two-byte 'é'
        let cut = text.iter().position(|&b| b == 0xc3).unwrap() + 1;
        let mut buf = LineBuffer::default();
        assert!(buf.push(&text[..cut]).is_empty());
        let lines = buf.push(&text[cut..]);
        assert_eq!(lines, vec!["{\"response\":\"héllo\"}".to_string()]);
    }

    #[test]
    fn fragments_accumulate_and_done_finishes() {
        let (tx, mut rx) = unbounded_channel();
        assert_eq!(process_line("{\"response\":\"Hel\"}", 1, &tx), LineOutcome::Continue);
        assert_eq!(process_line("{\"response\":\"lo\"}", 1, &tx), LineOutcome::Continue);
        assert_eq!(process_line("{\"done\":true}", 1, &tx), LineOutcome::Finished);

        let mut hint = String::new();
        for evt in drain(&mut rx) {
            if let UiEvent::Fragment(_, text) = evt {
                hint.push_str(&text);
            }
        }
        assert_eq!(hint, "Hello");
    }

    #[test]
    fn invalid_line_between_valid_ones_is_skipped() {
        let (tx, mut rx) = unbounded_channel();
        process_line("{\"response\":\"Hel\"}", 1, &tx);
        process_line("not-json", 1, &tx);
        process_line("{\"response\":\"lo\"}", 1, &tx);

        let mut hint = String::new();
        for evt in drain(&mut rx) {
            if let UiEvent::Fragment(_, text) = evt {
                hint.push_str(&text);
            }
        }
        assert_eq!(hint, "Hello");
    }

    #[test]
    fn blank_and_empty_response_lines_send_nothing() {
        let (tx, mut rx) = unbounded_channel();
        assert_eq!(process_line("   ", 1, &tx), LineOutcome::Continue);
        assert_eq!(process_line("{\"response\":\"\"}", 1, &tx), LineOutcome::Continue);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn done_false_keeps_streaming() {
        let (tx, _rx) = unbounded_channel();
        assert_eq!(
            process_line("{\"response\":\"x\",\"done\":false}", 1, &tx),
            LineOutcome::Continue
        );
    }
}
