//! Consumer side of a run: POST the request, decode the byte stream into
//! events and dispatch them onto a `ThoughtBoard`.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, warn};

use crate::board::ThoughtBoard;
use crate::decoder::RecordDecoder;
use crate::error::{DaydreamError, Result};
use crate::events::StreamEvent;

pub struct DaydreamClient {
    client: reqwest::Client,
    endpoint: String,
}

impl DaydreamClient {
    pub fn new(server: &str, route: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DaydreamError::config(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/{}",
                server.trim_end_matches('/'),
                route.trim_start_matches('/')
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open a run. Rejected requests fail here, before any event.
    pub async fn start_run(
        &self,
        credential: &str,
        turns: u32,
    ) -> Result<impl Stream<Item = Result<StreamEvent>> + Send + 'static> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "apiKey": credential, "turns": turns }))
            .send()
            .await
            .map_err(|e| DaydreamError::transport(format!("cannot reach {}: {}", self.endpoint, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(if status == StatusCode::BAD_REQUEST {
                DaydreamError::validation(text)
            } else {
                DaydreamError::transport(format!("server answered {}: {}", status, text))
            });
        }

        Ok(decode_byte_stream(resp.bytes_stream()))
    }

    /// Run to completion, updating `board` as events arrive. `on_event` sees
    /// each event after it has been applied. The board keeps every completed
    /// thought even when the stream breaks off.
    pub async fn run<F>(
        &self,
        credential: &str,
        turns: u32,
        board: &mut ThoughtBoard,
        mut on_event: F,
    ) -> Result<()>
    where
        F: FnMut(&StreamEvent, &ThoughtBoard),
    {
        board.start_run();
        let outcome: Result<()> = async {
            let events = self.start_run(credential, turns).await?;
            let mut events = Box::pin(events);
            while let Some(event) = events.next().await {
                let event = event?;
                board.apply(event.clone());
                on_event(&event, board);
            }
            Ok(())
        }
        .await;
        board.finish_run();
        if let Err(e) = &outcome {
            warn!("Run ended early: {}", e);
        }
        outcome
    }
}

type ByteSource<S> = Option<Pin<Box<S>>>;

/// Turn a chunked byte stream into events, reassembling records split
/// across chunks. A transport error is yielded once and ends the stream.
pub fn decode_byte_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<StreamEvent>>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    let source: ByteSource<S> = Some(Box::pin(bytes));
    stream::unfold(
        (source, RecordDecoder::new(), VecDeque::new()),
        |(mut source, mut decoder, mut ready)| async move {
            loop {
                if let Some(event) = ready.pop_front() {
                    return Some((Ok(event), (source, decoder, ready)));
                }
                let chunks = source.as_mut()?;
                match chunks.next().await {
                    Some(Ok(chunk)) => ready.extend(decoder.push(chunk.as_ref())),
                    Some(Err(e)) => {
                        debug!(pending = decoder.pending(), "Discarding partial record");
                        let err = DaydreamError::transport(format!("stream interrupted: {}", e));
                        return Some((Err(err), (None, decoder, ready)));
                    }
                    None => {
                        source = None;
                        ready.extend(decoder.finish());
                        if ready.is_empty() {
                            return None;
                        }
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::ConceptPair;
    use crate::events::FinishedThought;
    use crate::pipeline::encode_event;

    fn two_records() -> Vec<u8> {
        let mut bytes = encode_event(&StreamEvent::ActiveConcepts(ConceptPair::new("A", "B")))
            .unwrap()
            .to_vec();
        bytes.extend_from_slice(
            &encode_event(&StreamEvent::FinishedThought(FinishedThought {
                thought: "t".into(),
                critique: "Novelty: 3/10 c".into(),
                concepts: ConceptPair::new("A", "B"),
            }))
            .unwrap(),
        );
        bytes
    }

    #[test]
    fn endpoint_joins_cleanly() {
        let c = DaydreamClient::new("http://localhost:8787/", "/api/daydream").unwrap();
        assert_eq!(c.endpoint(), "http://localhost:8787/api/daydream");
    }

    #[tokio::test]
    async fn reassembles_records_across_chunks() {
        let bytes = two_records();
        let chunks: Vec<std::result::Result<Vec<u8>, String>> = bytes
            .chunks(7)
            .map(|c| Ok(c.to_vec()))
            .collect();
        let events: Vec<Result<StreamEvent>> =
            decode_byte_stream(stream::iter(chunks)).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Ok(StreamEvent::ActiveConcepts(_))));
        assert!(matches!(events[1], Ok(StreamEvent::FinishedThought(_))));
    }

    #[tokio::test]
    async fn transport_error_ends_stream_after_complete_events() {
        let bytes = two_records();
        let cut = bytes.len() - 5;
        let chunks: Vec<std::result::Result<Vec<u8>, String>> =
            vec![Ok(bytes[..cut].to_vec()), Err("connection reset".into())];
        let events: Vec<Result<StreamEvent>> =
            decode_byte_stream(stream::iter(chunks)).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Ok(StreamEvent::ActiveConcepts(_))));
        assert!(matches!(events[1], Err(DaydreamError::Transport { .. })));
    }
}
