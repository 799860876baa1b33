use anyhow::Result;
use tracing::debug;

use crate::api::Backend;
use crate::model::{Application, ApplicationDetail, Tender, TenderDetail};
use crate::state::{AppState, Screen};

/// Data fetched for one screen. Carrying the payload out of `load` keeps
/// the fetch free of state mutation; `store` commits it in one step after
/// the caller decides the response is still wanted.
#[derive(Debug, Clone)]
pub enum ScreenData {
    None,
    Tenders(Vec<Tender>),
    Tender(TenderDetail),
    Applications(Vec<Application>),
    Application(ApplicationDetail),
    Skills(Vec<String>),
}

/// Fetch whatever `screen` needs before it can render. Detail screens fetch
/// by the id they carry; screens without a backing endpoint resolve
/// immediately. Failures propagate as-is, with no retry and nothing stored.
pub async fn load(backend: &dyn Backend, screen: Screen) -> Result<ScreenData> {
    let data = match screen {
        Screen::Home | Screen::Profile => ScreenData::None,
        Screen::Tenders => ScreenData::Tenders(backend.tenders().await?),
        Screen::Tender(id) => ScreenData::Tender(backend.tender(id).await?),
        Screen::Applications => ScreenData::Applications(backend.applications().await?),
        Screen::Application(id) => ScreenData::Application(backend.application(id).await?),
        Screen::ProfileEdit => ScreenData::Skills(backend.skills().await?),
    };
    debug!(screen = screen.slug(), "screen data loaded");
    Ok(data)
}

/// Commit fetched data into its state slot.
pub fn store(state: &mut AppState, data: ScreenData) {
    match data {
        ScreenData::None => {}
        ScreenData::Tenders(tenders) => state.tenders = tenders,
        ScreenData::Tender(detail) => state.current_tender = Some(detail),
        ScreenData::Applications(applications) => state.applications = applications,
        ScreenData::Application(detail) => state.current_application = Some(detail),
        ScreenData::Skills(skills) => state.skills = skills,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TenderStatus;
    use serde_json::json;

    #[test]
    fn store_routes_each_payload_to_its_slot() {
        let mut state = AppState::new();

        let tender: Tender = serde_json::from_value(json!({
            "id": 5,
            "title": "Монтаж СКУД",
            "city": "Казань",
            "category": "СКУД",
            "budget": "50 000 ₽",
            "deadline": null,
            "status": "open",
            "has_applied": false,
        }))
        .unwrap();
        store(&mut state, ScreenData::Tenders(vec![tender]));
        assert_eq!(state.tenders.len(), 1);
        assert_eq!(state.tenders[0].status, TenderStatus::Open);

        store(&mut state, ScreenData::Skills(vec!["СКУД".into()]));
        assert_eq!(state.skills, vec!["СКУД".to_string()]);

        // A payload for one slot leaves the others alone.
        store(&mut state, ScreenData::None);
        assert_eq!(state.tenders.len(), 1);
        assert!(state.current_tender.is_none());
    }
}
