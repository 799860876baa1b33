/// Capabilities the embedding platform provides to the engine: the readiness
/// and viewport-expand signals sent once at startup, and the modal alert
/// dialog used for user-facing failures and the apply confirmation.
pub trait Host: Send + Sync {
    fn ready(&self);
    fn expand(&self);
    fn alert(&self, message: &str);
}
