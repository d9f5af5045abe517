use serde::Serialize;

/// Success envelope: `{"response": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub response: T,
}

impl<T> Envelope<T> {
    pub fn new(response: T) -> Self {
        Self { response }
    }
}
