use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, error, trace, warn};

use super::accumulator::ResponseAccumulator;
use super::sse::{SseDecoder, SseFrame};
use crate::error::{PromptError, Result};
use crate::models::StreamEvent;
use crate::models::event::{Decoded, decode};

/// Receiver of live stream notifications
///
/// Every method defaults to a no-op, so implementors only override what they
/// care about. Calls arrive in frame order and never overlap.
pub trait StreamHandler {
    /// A single text delta, never the cumulative answer
    fn on_text(&mut self, _delta: &str) {}

    fn on_pair_id(&mut self, _id: &str) {}

    fn on_image_partial(&mut self, _index: f64, _b64: &str) {}

    fn on_image_completed(&mut self, _url: &str) {}

    fn on_tool_calls(&mut self, _calls: &[Value]) {}
}

/// No callbacks
impl StreamHandler for () {}

impl<H: StreamHandler + ?Sized> StreamHandler for &mut H {
    fn on_text(&mut self, delta: &str) {
        (**self).on_text(delta)
    }

    fn on_pair_id(&mut self, id: &str) {
        (**self).on_pair_id(id)
    }

    fn on_image_partial(&mut self, index: f64, b64: &str) {
        (**self).on_image_partial(index, b64)
    }

    fn on_image_completed(&mut self, url: &str) {
        (**self).on_image_completed(url)
    }

    fn on_tool_calls(&mut self, calls: &[Value]) {
        (**self).on_tool_calls(calls)
    }
}

type StrCallback = Option<Box<dyn FnMut(&str) + Send>>;

/// Closure-based handler where every callback is optional
#[derive(Default)]
pub struct PromptCallbacks {
    text: StrCallback,
    pair_id: StrCallback,
    image_partial: Option<Box<dyn FnMut(f64, &str) + Send>>,
    image_completed: StrCallback,
    tool_calls: Option<Box<dyn FnMut(&[Value]) + Send>>,
}

impl PromptCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_text(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.text = Some(Box::new(f));
        self
    }

    pub fn on_pair_id(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.pair_id = Some(Box::new(f));
        self
    }

    pub fn on_image_partial(mut self, f: impl FnMut(f64, &str) + Send + 'static) -> Self {
        self.image_partial = Some(Box::new(f));
        self
    }

    pub fn on_image_completed(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.image_completed = Some(Box::new(f));
        self
    }

    pub fn on_tool_calls(mut self, f: impl FnMut(&[Value]) + Send + 'static) -> Self {
        self.tool_calls = Some(Box::new(f));
        self
    }
}

impl StreamHandler for PromptCallbacks {
    fn on_text(&mut self, delta: &str) {
        if let Some(f) = self.text.as_mut() {
            f(delta)
        }
    }

    fn on_pair_id(&mut self, id: &str) {
        if let Some(f) = self.pair_id.as_mut() {
            f(id)
        }
    }

    fn on_image_partial(&mut self, index: f64, b64: &str) {
        if let Some(f) = self.image_partial.as_mut() {
            f(index, b64)
        }
    }

    fn on_image_completed(&mut self, url: &str) {
        if let Some(f) = self.image_completed.as_mut() {
            f(url)
        }
    }

    fn on_tool_calls(&mut self, calls: &[Value]) {
        if let Some(f) = self.tool_calls.as_mut() {
            f(calls)
        }
    }
}

/// Per-stream frame counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub frames: usize,
    pub events: usize,
    pub rejected: usize,
    pub unknown: usize,
    pub malformed: usize,
}

/// Routes decoded frames to a handler and collects text deltas
pub struct EventDispatcher<H> {
    handler: H,
    accumulator: ResponseAccumulator,
    stats: DispatchStats,
}

impl<H: StreamHandler> EventDispatcher<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            accumulator: ResponseAccumulator::new(),
            stats: DispatchStats::default(),
        }
    }

    /// Dispatch one frame. Only an `error` event produces `Err`.
    pub fn dispatch(&mut self, frame: &SseFrame) -> Result<()> {
        self.stats.frames += 1;

        match decode(&frame.event, &frame.data) {
            Decoded::Event(event) => {
                self.stats.events += 1;
                trace!(event = event.name(), "Dispatching stream event");
                self.apply(event)
            }
            Decoded::Rejected(reason) => {
                self.stats.rejected += 1;
                debug!(event = %frame.event, reason, "Ignoring stream event");
                Ok(())
            }
            Decoded::Unknown(name) => {
                self.stats.unknown += 1;
                warn!(event = %name, "Ignoring unknown stream event");
                Ok(())
            }
            Decoded::Malformed(e) => {
                self.stats.malformed += 1;
                error!(event = %frame.event, data = %frame.data, "Failed to parse stream frame: {}", e);
                Ok(())
            }
        }
    }

    fn apply(&mut self, event: StreamEvent) -> Result<()> {
        match event {
            StreamEvent::ChatContent(delta) => {
                self.handler.on_text(&delta);
                self.accumulator.push(delta);
            }
            StreamEvent::PairCreated(id) => self.handler.on_pair_id(&id),
            StreamEvent::ImagePartial { index, b64 } => self.handler.on_image_partial(index, &b64),
            StreamEvent::ImageCompleted(url) => self.handler.on_image_completed(&url),
            StreamEvent::ToolCalls(calls) => self.handler.on_tool_calls(&calls),
            StreamEvent::Error(message) => return Err(PromptError::Stream(message)),
        }
        Ok(())
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Drive a whole response body through the decoder until it closes.
    ///
    /// Returns the joined text on normal close; the first transport error or
    /// `error` event ends the loop and no later frame is dispatched.
    pub async fn consume<S>(mut self, mut body: S) -> Result<(String, DispatchStats)>
    where
        S: Stream<Item = Result<Bytes>> + Unpin,
    {
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for frame in decoder.feed(&chunk) {
                self.dispatch(&frame)?;
            }
        }
        for frame in decoder.finish() {
            self.dispatch(&frame)?;
        }

        Ok(self.finish())
    }

    pub fn finish(self) -> (String, DispatchStats) {
        (self.accumulator.join(), self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::{Arc, Mutex};

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl StreamHandler for Recorder {
        fn on_text(&mut self, delta: &str) {
            self.calls.push(format!("text:{}", delta));
        }

        fn on_pair_id(&mut self, id: &str) {
            self.calls.push(format!("pair:{}", id));
        }

        fn on_image_partial(&mut self, index: f64, b64: &str) {
            self.calls.push(format!("partial:{}:{}", index, b64));
        }

        fn on_image_completed(&mut self, url: &str) {
            self.calls.push(format!("image:{}", url));
        }

        fn on_tool_calls(&mut self, calls: &[Value]) {
            self.calls.push(format!("tools:{}", calls.len()));
        }
    }

    #[test]
    fn test_dispatch_order_and_accumulation() {
        let mut recorder = Recorder::default();
        let mut dispatcher = EventDispatcher::new(&mut recorder);

        let frames = [
            frame("pair.created", r#"{"id":"p1"}"#),
            frame("chat.content", r#"{"data":"Hel"}"#),
            frame("tool.calls", r#"{"data":[{"id":"t1","name":"search","args":{}}]}"#),
            frame("chat.content", r#"{"data":"lo"}"#),
        ];
        for f in &frames {
            dispatcher.dispatch(f).unwrap();
        }

        let (text, stats) = dispatcher.finish();
        assert_eq!(text, "Hello");
        assert_eq!(stats.events, 4);
        assert_eq!(
            recorder.calls,
            vec!["pair:p1", "text:Hel", "tools:1", "text:lo"]
        );
    }

    #[test]
    fn test_malformed_and_unknown_are_non_fatal() {
        let mut recorder = Recorder::default();
        let mut dispatcher = EventDispatcher::new(&mut recorder);

        dispatcher.dispatch(&frame("chat.content", "{oops")).unwrap();
        dispatcher.dispatch(&frame("progress", r#"{"message":"thinking"}"#)).unwrap();
        dispatcher.dispatch(&frame("pair.created", r#"{"id":""}"#)).unwrap();
        dispatcher.dispatch(&frame("chat.content", r#"{"data":"ok"}"#)).unwrap();

        let stats = dispatcher.stats();
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.unknown, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.events, 1);
        assert_eq!(dispatcher.finish().0, "ok");
        assert_eq!(recorder.calls, vec!["text:ok"]);
    }

    #[test]
    fn test_error_event_is_fatal() {
        let mut dispatcher = EventDispatcher::new(());
        let err = dispatcher
            .dispatch(&frame("error", r#"{"message":"quota exceeded"}"#))
            .unwrap_err();
        assert!(matches!(err, PromptError::Stream(ref m) if m == "quota exceeded"));
    }

    #[test]
    fn test_error_event_with_invalid_json_is_skipped() {
        let mut recorder = Recorder::default();
        let mut dispatcher = EventDispatcher::new(&mut recorder);

        dispatcher.dispatch(&frame("error", "not json")).unwrap();
        dispatcher.dispatch(&frame("chat.content", r#"{"data":"still here"}"#)).unwrap();

        let (text, stats) = dispatcher.finish();
        assert_eq!(text, "still here");
        assert_eq!(stats.malformed, 1);
        assert_eq!(recorder.calls, vec!["text:still here"]);
    }

    #[tokio::test]
    async fn test_consume_stops_at_error() {
        let body = stream::iter(vec![
            Ok(Bytes::from("event: chat.content\ndata: {\"data\":\"partial\"}\n\n")),
            Ok(Bytes::from(
                "event: error\ndata: {\"message\":\"boom\"}\n\nevent: chat.content\ndata: {\"data\":\"late\"}\n\n",
            )),
        ]);

        let mut recorder = Recorder::default();
        let err = EventDispatcher::new(&mut recorder)
            .consume(body)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(recorder.calls, vec!["text:partial"]);
    }

    #[tokio::test]
    async fn test_consume_propagates_transport_error() {
        let body = stream::iter(vec![
            Ok(Bytes::from("event: chat.content\ndata: {\"data\":\"a\"}\n\n")),
            Err(PromptError::Transport("connection reset".to_string())),
        ]);

        let err = EventDispatcher::new(()).consume(body).await.unwrap_err();
        assert!(matches!(err, PromptError::Transport(_)));
    }

    #[tokio::test]
    async fn test_prompt_callbacks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let text_seen = seen.clone();
        let image_seen = seen.clone();
        let callbacks = PromptCallbacks::new()
            .on_text(move |d| text_seen.lock().unwrap().push(d.to_string()))
            .on_image_partial(move |i, b| image_seen.lock().unwrap().push(format!("{}:{}", i, b)));

        let body = stream::iter(vec![Ok(Bytes::from(
            "event: image.partial\ndata: {\"data\":{\"index\":0,\"b64\":\"AA\"}}\n\n\
             event: image.completed\ndata: {\"data\":{\"url\":\"http://x/y.png\"}}\n\n\
             event: chat.content\ndata: {\"data\":\"done\"}\n\n",
        ))]);

        let (text, _) = EventDispatcher::new(callbacks).consume(body).await.unwrap();
        assert_eq!(text, "done");
        assert_eq!(*seen.lock().unwrap(), vec!["0:AA", "done"]);
    }
}
