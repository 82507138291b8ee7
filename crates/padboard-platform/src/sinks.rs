use std::sync::mpsc;

use padboard_core::{DeliveryError, KeyDelivery, KeyPayload};

use crate::strokes::{Strokes, scan_code, strokes};

/// Hands payloads to another thread.
pub struct ChannelDelivery {
    tx: mpsc::Sender<KeyPayload>,
}

impl ChannelDelivery {
    pub fn new() -> (Self, mpsc::Receiver<KeyPayload>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl KeyDelivery for ChannelDelivery {
    fn deliver(&mut self, payload: KeyPayload) -> Result<(), DeliveryError> {
        self.tx
            .send(payload)
            .map_err(|_| DeliveryError::Disconnected)
    }
}

/// Logs every payload and drops it.
#[derive(Debug, Default)]
pub struct LogDelivery {
    pub delivered: usize,
}

impl KeyDelivery for LogDelivery {
    fn deliver(&mut self, payload: KeyPayload) -> Result<(), DeliveryError> {
        self.delivered += 1;
        let name = payload.key.as_deref().or(payload.text.as_deref()).unwrap_or("");
        log::info!("key {} {name}", payload.phase.as_str());
        Ok(())
    }
}

/// Translates payloads to strokes and passes them to an injector.
/// Symbolic keys without a scan code are rejected.
pub struct StrokeDelivery<F> {
    inject: F,
}

impl<F: FnMut(&Strokes)> StrokeDelivery<F> {
    pub fn new(inject: F) -> Self {
        Self { inject }
    }
}

impl<F: FnMut(&Strokes)> KeyDelivery for StrokeDelivery<F> {
    fn deliver(&mut self, payload: KeyPayload) -> Result<(), DeliveryError> {
        if let Some(key) = &payload.key
            && scan_code(key).is_none()
        {
            return Err(DeliveryError::Rejected(format!("no scan code for {key}")));
        }
        let out = strokes(&payload);
        if !out.is_empty() {
            (self.inject)(&out);
        }
        Ok(())
    }
}
