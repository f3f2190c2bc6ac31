//! Open/closed and menu state of the floating widget.

/// The title shown in the header of the opened widget.
pub const HEADER_TITLE: &str = "Chat with us!";

/// The hint shown in place of an empty transcript.
pub const EMPTY_PLACEHOLDER: &str = "Start a conversation...";

/// Purely visual state of the widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shell {
    open: bool,
    menu_open: bool,
}

impl Shell {
    /// Whether the chat panel is shown instead of the launcher button.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the history menu is shown.
    #[inline]
    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// Opens or closes the panel. Closing it also closes the menu.
    #[inline]
    pub fn toggle_open(&mut self) {
        self.open = !self.open;
        if !self.open {
            self.menu_open = false;
        }
    }

    /// Opens or closes the menu. Ignored while the panel is closed.
    #[inline]
    pub fn toggle_menu(&mut self) {
        if self.open {
            self.menu_open = !self.menu_open;
        }
    }

    /// Handles an interaction outside the widget: the menu closes, the
    /// panel stays as it is.
    #[inline]
    pub fn dismiss(&mut self) {
        self.menu_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles() {
        let mut shell = Shell::default();
        shell.toggle_menu();
        assert!(!shell.is_menu_open());

        shell.toggle_open();
        shell.toggle_menu();
        assert!(shell.is_open() && shell.is_menu_open());

        shell.dismiss();
        assert!(shell.is_open() && !shell.is_menu_open());

        shell.toggle_menu();
        shell.toggle_open();
        assert_eq!(shell, Shell::default());
    }
}
