//! Navigation engine. Owns the view state and drives the fetch-then-render
//! cycle for every user interaction; each public method runs one full cycle
//! and returns the resulting frame.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::api::Backend;
use crate::host::Host;
use crate::loader::{self, ScreenData};
use crate::model::{ApplicationStatus, ProfileUpdate};
use crate::render::{self, Document};
use crate::state::{AppState, Phase, Screen, Tab};

static SKILL_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*").expect("skill split regex"));

/// Raw field values collected from the profile-edit form.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub full_name: String,
    pub city: String,
    pub phone: String,
    pub skills_text: String,
}

/// The navigation controller. One instance per session; all methods take
/// `&mut self`, so interactions within an instance are serialized and every
/// load settles before its render.
pub struct App<B, H> {
    backend: B,
    host: H,
    state: AppState,
    phase: Phase,
    nav_seq: u64,
}

impl<B: Backend, H: Host> App<B, H> {
    pub fn new(backend: B, host: H) -> Self {
        Self {
            backend,
            host,
            state: AppState::new(),
            phase: Phase::Loading,
            nav_seq: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Render the current state without touching it.
    pub fn render(&self) -> Document {
        render::render(&self.state, &self.phase)
    }

    /// Start the session: signal readiness to the host, fetch the profile
    /// and the initial screen's data. Any failure here is terminal; the
    /// session stays on the error screen until the user re-enters.
    pub async fn bootstrap(&mut self) -> Document {
        self.host.ready();
        self.host.expand();
        self.phase = Phase::Loading;
        match self.boot_sequence().await {
            Ok(()) => self.phase = Phase::Ready,
            Err(err) => {
                warn!(error = %err, "bootstrap failed");
                self.phase = Phase::Failed(err.to_string());
            }
        }
        self.render()
    }

    async fn boot_sequence(&mut self) -> Result<()> {
        let profile = self.backend.me().await?;
        info!(user_id = profile.id, "profile loaded");
        self.state.profile = Some(profile);
        self.state.stack.clear();
        let seq = self.begin();
        let data = loader::load(&self.backend, self.state.screen).await?;
        self.commit(seq, data);
        Ok(())
    }

    /// Push-navigate to `target`: the current screen goes onto the stack.
    pub async fn navigate(&mut self, target: Screen) -> Document {
        self.goto(target, true).await
    }

    /// Open a posting's detail screen.
    pub async fn open_tender(&mut self, id: i64) -> Document {
        self.goto(Screen::Tender(id), true).await
    }

    /// Open one of the user's applications.
    pub async fn open_application(&mut self, id: i64) -> Document {
        self.goto(Screen::Application(id), true).await
    }

    /// Pop the most recent screen and reload it. With an empty stack this
    /// falls back to the home screen without pushing anything.
    pub async fn back(&mut self) -> Document {
        if self.phase != Phase::Ready {
            return self.render();
        }
        match self.state.stack.pop() {
            Some(prev) => self.goto(prev, false).await,
            None => self.goto(Screen::Home, false).await,
        }
    }

    /// Switch to a top-level tab, dropping the whole stack. Re-selecting
    /// the active tab changes nothing and issues no fetch.
    pub async fn select_tab(&mut self, tab: Tab) -> Document {
        if self.phase != Phase::Ready {
            return self.render();
        }
        if self.state.screen == tab.screen() {
            return self.render();
        }
        self.state.stack.clear();
        self.goto(tab.screen(), false).await
    }

    async fn goto(&mut self, target: Screen, push: bool) -> Document {
        if self.phase != Phase::Ready {
            return self.render();
        }
        debug!(from = self.state.screen.slug(), to = target.slug(), push, "navigating");
        if push {
            self.state.stack.push(self.state.screen);
        }
        self.state.screen = target;
        let seq = self.begin();
        match loader::load(&self.backend, target).await {
            Ok(data) => {
                if !self.commit(seq, data) {
                    debug!(screen = target.slug(), "stale screen data discarded");
                }
            }
            Err(err) => {
                warn!(screen = target.slug(), error = %err, "screen load failed");
                self.host.alert(&err.to_string());
            }
        }
        self.render()
    }

    /// Submit an application for the posting currently on screen. On
    /// success the local detail flips to applied immediately, so the
    /// action cannot be offered twice.
    pub async fn apply(&mut self) -> Document {
        if self.phase != Phase::Ready {
            return self.render();
        }
        let Screen::Tender(id) = self.state.screen else {
            return self.render();
        };
        let can_apply = self
            .state
            .current_tender
            .as_ref()
            .filter(|t| t.id == id)
            .map(|t| t.can_apply())
            .unwrap_or(false);
        if !can_apply {
            return self.render();
        }
        match self.backend.apply_to_tender(id).await {
            Ok(receipt) => {
                info!(tender_id = id, application_id = receipt.application_id, "applied");
                self.host
                    .alert("Отклик отправлен! Ожидайте решения заказчика.");
                if let Some(t) = self.state.current_tender.as_mut().filter(|t| t.id == id) {
                    t.has_applied = true;
                    t.application_id = Some(receipt.application_id);
                    t.application_status = Some(ApplicationStatus::Applied);
                }
            }
            Err(err) => {
                warn!(tender_id = id, error = %err, "apply failed");
                self.host.alert(&err.to_string());
            }
        }
        self.render()
    }

    /// Save the profile form. Empty skills text keeps the previously saved
    /// skill list instead of clearing it. On success the edit screen is
    /// left and the profile is re-fetched; on failure the user stays on
    /// the form with nothing lost.
    pub async fn submit_profile(&mut self, form: ProfileForm) -> Document {
        if self.phase != Phase::Ready || self.state.screen != Screen::ProfileEdit {
            return self.render();
        }
        let Some(profile) = self.state.profile.as_ref() else {
            return self.render();
        };
        let skills = parse_skills(&form.skills_text);
        let update = ProfileUpdate {
            full_name: form.full_name,
            city: form.city,
            phone: form.phone,
            skills: if skills.is_empty() {
                profile.skills.clone()
            } else {
                skills
            },
        };
        match self.backend.update_profile(&update).await {
            Ok(()) => {
                self.state.stack.pop();
                self.state.screen = Screen::Profile;
                match self.backend.me().await {
                    Ok(profile) => self.state.profile = Some(profile),
                    Err(err) => {
                        warn!(error = %err, "profile refresh after save failed");
                        self.host.alert(&err.to_string());
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "profile save failed");
                self.host.alert(&err.to_string());
            }
        }
        self.render()
    }

    /// Re-fetch the profile and the current screen's data after the view
    /// regains visibility, keeping displayed statuses fresh. A no-op
    /// unless the session is up and running.
    pub async fn on_foreground(&mut self) -> Document {
        if self.phase != Phase::Ready || self.state.profile.is_none() {
            return self.render();
        }
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "foreground refresh failed");
            self.host.alert(&err.to_string());
        }
        self.render()
    }

    async fn refresh(&mut self) -> Result<()> {
        let profile = self.backend.me().await?;
        self.state.profile = Some(profile);
        let seq = self.begin();
        let data = loader::load(&self.backend, self.state.screen).await?;
        self.commit(seq, data);
        Ok(())
    }

    /// Issue a fresh navigation token. Every load belongs to the token
    /// issued when it started.
    fn begin(&mut self) -> u64 {
        self.nav_seq += 1;
        self.nav_seq
    }

    /// Store fetched data only if no newer navigation began since `seq`
    /// was issued. Returns whether the data was applied.
    fn commit(&mut self, seq: u64, data: ScreenData) -> bool {
        if seq != self.nav_seq {
            return false;
        }
        loader::store(&mut self.state, data);
        true
    }
}

/// Split comma-separated skills text into owned entries, dropping blanks.
fn parse_skills(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    SKILL_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Application, ApplicationDetail, ApplyReceipt, Profile, Tender, TenderDetail,
    };
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct NoBackend;

    #[async_trait]
    impl Backend for NoBackend {
        async fn me(&self) -> Result<Profile> {
            Err(anyhow!("not wired"))
        }
        async fn update_profile(&self, _update: &ProfileUpdate) -> Result<()> {
            Err(anyhow!("not wired"))
        }
        async fn tenders(&self) -> Result<Vec<Tender>> {
            Err(anyhow!("not wired"))
        }
        async fn tender(&self, _id: i64) -> Result<TenderDetail> {
            Err(anyhow!("not wired"))
        }
        async fn apply_to_tender(&self, _id: i64) -> Result<ApplyReceipt> {
            Err(anyhow!("not wired"))
        }
        async fn applications(&self) -> Result<Vec<Application>> {
            Err(anyhow!("not wired"))
        }
        async fn application(&self, _id: i64) -> Result<ApplicationDetail> {
            Err(anyhow!("not wired"))
        }
        async fn skills(&self) -> Result<Vec<String>> {
            Err(anyhow!("not wired"))
        }
    }

    struct MuteHost;

    impl Host for MuteHost {
        fn ready(&self) {}
        fn expand(&self) {}
        fn alert(&self, _message: &str) {}
    }

    #[test]
    fn parse_skills_splits_and_trims() {
        assert_eq!(
            parse_skills("СКУД, Видеонаблюдение,АПС"),
            vec!["СКУД", "Видеонаблюдение", "АПС"]
        );
        assert_eq!(parse_skills(" Электромонтаж "), vec!["Электромонтаж"]);
        assert!(parse_skills("").is_empty());
        assert!(parse_skills("   ").is_empty());
        assert!(parse_skills(",, ,").is_empty());
    }

    #[test]
    fn late_load_is_discarded_once_a_newer_navigation_began() {
        let mut app = App::new(NoBackend, MuteHost);
        let first = app.begin();
        let second = app.begin();

        assert!(!app.commit(first, ScreenData::Skills(vec!["СКУД".to_string()])));
        assert!(app.state.skills.is_empty());

        assert!(app.commit(second, ScreenData::Skills(vec!["СКУД".to_string()])));
        assert_eq!(app.state.skills, vec!["СКУД".to_string()]);

        // A token can only lose its claim, never regain it.
        assert!(!app.commit(first, ScreenData::Skills(Vec::new())));
        assert_eq!(app.state.skills, vec!["СКУД".to_string()]);
    }

    #[tokio::test]
    async fn interactions_before_bootstrap_change_nothing() {
        let mut app = App::new(NoBackend, MuteHost);
        let doc = app.navigate(Screen::Tenders).await;
        assert_eq!(app.phase(), &Phase::Loading);
        assert_eq!(app.state().screen, Screen::Home);
        assert!(doc.actions.is_empty());

        let doc = app.back().await;
        assert!(app.state().stack.is_empty());
        assert!(!doc.back_visible);
    }
}
