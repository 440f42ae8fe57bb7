//! Confirmation before destructive operations

/// Shown before deleting a single item
pub const DELETE_MESSAGE: &str = "Delete this item?";
/// Shown before wiping the whole inventory
pub const CLEAR_MESSAGE: &str = "Delete the entire inventory?";

/// Asks the user to confirm an action
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Accepts every prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmPrompt for AlwaysConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }
}

/// Declines every prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl ConfirmPrompt for NeverConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        false
    }
}

impl<F: FnMut(&str) -> bool> ConfirmPrompt for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// `window.confirm()`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserConfirm;

#[cfg(target_arch = "wasm32")]
impl ConfirmPrompt for BrowserConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }
}
