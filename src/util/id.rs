//! Unique identifiers for new notes.

/// Produces a globally unique identifier on demand.
pub trait IdSource {
    fn next_id(&self) -> String;
}

impl<F> IdSource for F
where
    F: Fn() -> String,
{
    fn next_id(&self) -> String {
        self()
    }
}

/// Random v4 UUIDs, from `crypto.randomUUID()` in the browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSource;

impl IdSource for UuidSource {
    #[cfg(target_family = "wasm")]
    fn next_id(&self) -> String {
        // An empty id fails validation, so the save is rejected instead of storing a bad note.
        gloo_utils::window()
            .crypto()
            .map(|crypto| crypto.random_uuid())
            .unwrap_or_default()
    }

    #[cfg(not(target_family = "wasm"))]
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
