//! In-memory peers for controller and facade tests.

use crate::server::peer::{CompletionNotifier, PaintDispatcher};
use core::time::Duration;
use parking_lot::Mutex;
use std::sync::Arc;
use workshop_core::proto::{PaintFinishedRequest, SubPaintCarRequest};
use workshop_core::{Error, Result};

/// Records every paint job and answers with a fixed outcome.
#[derive(Default)]
pub(crate) struct RecordingPainter {
    requests: Mutex<Vec<(SubPaintCarRequest, Option<Duration>)>>,
    failure: Option<Error>,
}

impl RecordingPainter {
    pub(crate) fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn failing(err: Error) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(err),
            ..Self::default()
        })
    }

    pub(crate) fn requests(&self) -> Vec<(SubPaintCarRequest, Option<Duration>)> {
        self.requests.lock().clone()
    }
}

#[tonic::async_trait]
impl PaintDispatcher for RecordingPainter {
    async fn dispatch(
        &self,
        request: SubPaintCarRequest,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.requests.lock().push((request, timeout));
        self.failure.clone().map_or(Ok(()), Err)
    }
}

/// Records every completion callback and answers with a fixed outcome.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    calls: Mutex<Vec<(String, PaintFinishedRequest, Option<Duration>)>>,
    failure: Option<Error>,
}

impl RecordingNotifier {
    pub(crate) fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn failing(err: Error) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(err),
            ..Self::default()
        })
    }

    pub(crate) fn calls(&self) -> Vec<(String, PaintFinishedRequest, Option<Duration>)> {
        self.calls.lock().clone()
    }
}

#[tonic::async_trait]
impl CompletionNotifier for RecordingNotifier {
    async fn car_painted(
        &self,
        callback_address: &str,
        request: PaintFinishedRequest,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.calls
            .lock()
            .push((callback_address.to_owned(), request, timeout));
        self.failure.clone().map_or(Ok(()), Err)
    }
}
