//! Event stream encoding: one `data: <json>\n\n` record per event, written
//! to the response body as soon as the sequencer yields it.

use axum::{
    body::{Body, Bytes},
    http::header,
    response::{IntoResponse, Response},
};
use futures_util::{Stream, StreamExt};

use crate::error::Result;
use crate::events::StreamEvent;

pub fn encode_event(event: &StreamEvent) -> Result<Bytes> {
    let json = serde_json::to_string(event)?;
    Ok(Bytes::from(format!("data: {}\n\n", json)))
}

/// Map events to records one at a time. An `Err` passes through and ends
/// the body with an error.
pub fn encode_stream<S>(events: S) -> impl Stream<Item = Result<Bytes>> + Send + 'static
where
    S: Stream<Item = Result<StreamEvent>> + Send + 'static,
{
    events.map(|item| item.and_then(|event| encode_event(&event)))
}

/// Wrap a run in a streaming `text/event-stream` response. The body polls
/// the run only when hyper is ready to write more.
pub fn event_stream_response<S>(events: S) -> Response
where
    S: Stream<Item = Result<StreamEvent>> + Send + 'static,
{
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(encode_stream(events)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::ConceptPair;
    use crate::error::DaydreamError;
    use futures_util::stream;

    #[test]
    fn record_framing() {
        let bytes = encode_event(&StreamEvent::ActiveConcepts(ConceptPair::new("A", "B"))).unwrap();
        assert_eq!(
            &bytes[..],
            b"data: {\"event\":\"active_concepts\",\"data\":[\"A\",\"B\"]}\n\n"
        );
    }

    #[test]
    fn newlines_in_payload_are_escaped() {
        let bytes = encode_event(&StreamEvent::ActiveConcepts(ConceptPair::new("A\n\nB", "C")))
            .unwrap();
        let body = &bytes[..bytes.len() - 2];
        assert!(!body.windows(2).any(|w| w == b"\n\n"));
        assert!(bytes.ends_with(b"\n\n"));
    }

    #[tokio::test]
    async fn errors_pass_through_in_order() {
        let events = stream::iter(vec![
            Ok(StreamEvent::ActiveConcepts(ConceptPair::new("A", "B"))),
            Err(DaydreamError::provider("boom")),
        ]);
        let out: Vec<Result<Bytes>> = encode_stream(events).collect().await;
        assert_eq!(out.len(), 2);
        assert!(out[0].is_ok());
        assert!(matches!(out[1], Err(DaydreamError::Provider { .. })));
    }

    #[test]
    fn response_headers() {
        let resp = event_stream_response(stream::empty::<Result<StreamEvent>>());
        let headers = resp.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
    }
}
