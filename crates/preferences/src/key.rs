use derive_more::Display;

/// Well-known preference keys.
///
/// The string forms are what earlier releases wrote, so existing preference
/// files keep working.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    #[display("SINGLE_PAGE_LAYOUT")]
    SinglePageLayout,
    #[display("ALLOW_NOTIFICATIONS")]
    AllowNotifications,
}

impl Key {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SinglePageLayout => "SINGLE_PAGE_LAYOUT",
            Self::AllowNotifications => "ALLOW_NOTIFICATIONS",
        }
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
