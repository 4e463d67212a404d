//! Settings state and the actions that change it.

/// The reader's settings, as shown on the settings screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SettingsState {
    pub use_single_page_layout: bool,
    pub allow_notifications: bool,
}

/// A change to [`SettingsState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    /// Replace the whole state with values read from the preference store.
    Loaded(SettingsState),
    SetSinglePageLayout(bool),
    SetAllowNotifications(bool),
    /// Back to the defaults.
    Reset,
}

/// Apply `action` to `state`.
pub fn reduce(state: SettingsState, action: SettingsAction) -> SettingsState {
    match action {
        SettingsAction::Loaded(loaded) => loaded,
        SettingsAction::SetSinglePageLayout(use_single_page_layout) => SettingsState {
            use_single_page_layout,
            ..state
        },
        SettingsAction::SetAllowNotifications(allow_notifications) => SettingsState {
            allow_notifications,
            ..state
        },
        SettingsAction::Reset => SettingsState::default(),
    }
}
