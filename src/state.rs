use crate::model::{Application, ApplicationDetail, Profile, Tender, TenderDetail};

/// One named view state of the navigation machine. Detail screens carry the
/// id of the selected entity; the loader and renderer match on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Tenders,
    Tender(i64),
    Applications,
    Application(i64),
    Profile,
    ProfileEdit,
}

impl Screen {
    /// Header title shown for the screen.
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "TenderBot",
            Screen::Tenders => "Заказы",
            Screen::Tender(_) => "Заказ",
            Screen::Applications => "Мои отклики",
            Screen::Application(_) => "Отклик",
            Screen::Profile => "Профиль",
            Screen::ProfileEdit => "Редактирование",
        }
    }

    /// Stable identifier used in markup data attributes.
    pub fn slug(&self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Tenders => "tenders",
            Screen::Tender(_) => "tender",
            Screen::Applications => "applications",
            Screen::Application(_) => "application",
            Screen::Profile => "profile",
            Screen::ProfileEdit => "profile_edit",
        }
    }

    /// The top-level tab this screen corresponds to, if it is one.
    /// Detail and edit screens live outside the tab bar.
    pub fn tab(&self) -> Option<Tab> {
        match self {
            Screen::Home => Some(Tab::Home),
            Screen::Tenders => Some(Tab::Tenders),
            Screen::Applications => Some(Tab::Applications),
            Screen::Profile => Some(Tab::Profile),
            _ => None,
        }
    }
}

/// Root-level tab bar entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Tenders,
    Applications,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Tenders, Tab::Applications, Tab::Profile];

    pub fn screen(&self) -> Screen {
        match self {
            Tab::Home => Screen::Home,
            Tab::Tenders => Screen::Tenders,
            Tab::Applications => Screen::Applications,
            Tab::Profile => Screen::Profile,
        }
    }
}

/// Which shell layer is showing: the bootstrap loader, the app itself, or
/// the terminal error screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Failed(String),
}

/// In-memory view state. Plain named slots; mutation happens in the screen
/// loader and the form handlers, never here.
#[derive(Debug, Clone)]
pub struct AppState {
    pub profile: Option<Profile>,
    pub screen: Screen,
    pub stack: Vec<Screen>,
    pub tenders: Vec<Tender>,
    pub applications: Vec<Application>,
    pub current_tender: Option<TenderDetail>,
    pub current_application: Option<ApplicationDetail>,
    pub skills: Vec<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            profile: None,
            screen: Screen::Home,
            stack: Vec::new(),
            tenders: Vec::new(),
            applications: Vec::new(),
            current_tender: None,
            current_application: None,
            skills: Vec::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_titles_match_tab_bar() {
        assert_eq!(Screen::Home.title(), "TenderBot");
        assert_eq!(Screen::Tender(1).title(), "Заказ");
        assert_eq!(Screen::ProfileEdit.title(), "Редактирование");
    }

    #[test]
    fn only_root_screens_map_to_tabs() {
        assert_eq!(Screen::Tenders.tab(), Some(Tab::Tenders));
        assert_eq!(Screen::Tender(3).tab(), None);
        assert_eq!(Screen::ProfileEdit.tab(), None);
        for tab in Tab::ALL {
            assert_eq!(tab.screen().tab(), Some(tab));
        }
    }

    #[test]
    fn fresh_state_starts_at_home_with_empty_stack() {
        let state = AppState::new();
        assert_eq!(state.screen, Screen::Home);
        assert!(state.stack.is_empty());
        assert!(state.profile.is_none());
    }
}
