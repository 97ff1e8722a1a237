//! Display timestamps for new notes.

/// Produces the locale-formatted current time.
pub trait Clock {
    fn now(&self) -> String;
}

impl<F> Clock for F
where
    F: Fn() -> String,
{
    fn now(&self) -> String {
        self()
    }
}

/// The host's local time, formatted like `Date.prototype.toLocaleString`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    #[cfg(target_family = "wasm")]
    fn now(&self) -> String {
        use wasm_bindgen_futures::js_sys::Date;

        Date::new_0()
            .to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED)
            .into()
    }

    #[cfg(not(target_family = "wasm"))]
    fn now(&self) -> String {
        chrono::Local::now()
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string()
    }
}

#[cfg(all(test, not(target_family = "wasm")))]
mod tests {
    use super::*;

    #[test]
    fn test_local_clock_format() {
        let now = LocalClock.now();
        assert!(!now.is_empty());
        assert!(now.len() <= 200);
        assert!(now.contains(", "));
    }
}
