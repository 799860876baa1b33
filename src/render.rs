//! Markup renderer. Builds one full frame per call from the current state;
//! nothing is kept between renders, so the affordance list is rebuilt from
//! scratch alongside the markup it refers to.

use chrono::{DateTime, Utc};

use crate::model::{Application, ApplicationDetail, Profile, Tender, TenderDetail};
use crate::state::{AppState, Phase, Screen, Tab};

/// An interactive affordance present in the rendered frame. The host maps
/// taps back onto the matching engine call. Shell controls (the back button
/// and the tab bar) are permanent and not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Go(Screen),
    OpenTender(i64),
    OpenApplication(i64),
    Apply,
    SubmitProfile,
}

/// One rendered frame: header state, tab highlight, body markup and the
/// affordances valid for exactly this frame.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub back_visible: bool,
    pub active_tab: Option<Tab>,
    pub body: String,
    pub actions: Vec<Action>,
}

/// Render the current phase and screen. User-supplied text always passes
/// through `esc` before insertion.
pub fn render(state: &AppState, phase: &Phase) -> Document {
    match phase {
        Phase::Loading => Document {
            title: "TenderBot".to_string(),
            back_visible: false,
            active_tab: None,
            body: "<div class=\"loader\"><p>Загрузка...</p></div>".to_string(),
            actions: Vec::new(),
        },
        Phase::Failed(message) => Document {
            title: "TenderBot".to_string(),
            back_visible: false,
            active_tab: None,
            body: format!(
                "<div class=\"error-screen\"><div class=\"error-icon\">⚠️</div><p>{}</p></div>",
                esc(message)
            ),
            actions: Vec::new(),
        },
        Phase::Ready => {
            let mut actions = Vec::new();
            let body = screen_body(state, &mut actions);
            Document {
                title: state.screen.title().to_string(),
                back_visible: !state.stack.is_empty(),
                active_tab: state.screen.tab(),
                body,
                actions,
            }
        }
    }
}

fn screen_body(state: &AppState, actions: &mut Vec<Action>) -> String {
    match state.screen {
        Screen::Home => home(state.profile.as_ref(), actions),
        Screen::Tenders => tenders_list(&state.tenders, actions),
        Screen::Tender(id) => tender_detail(
            state.current_tender.as_ref().filter(|t| t.id == id),
            actions,
        ),
        Screen::Applications => applications_list(&state.applications, actions),
        Screen::Application(id) => application_detail(
            state.current_application.as_ref().filter(|a| a.id == id),
        ),
        Screen::Profile => profile(state.profile.as_ref(), actions),
        Screen::ProfileEdit => profile_edit(state.profile.as_ref(), &state.skills, actions),
    }
}

fn placeholder() -> String {
    "<div class=\"screen\"><p>Загрузка...</p></div>".to_string()
}

fn home(profile: Option<&Profile>, actions: &mut Vec<Action>) -> String {
    let Some(user) = profile else {
        return placeholder();
    };
    actions.push(Action::Go(Screen::Tenders));
    actions.push(Action::Go(Screen::Applications));
    actions.push(Action::Go(Screen::Profile));
    format!(
        "<div class=\"screen\">\
         <div class=\"card welcome-card\">\
         <h2 class=\"card-title\">Привет, {}!</h2>\
         <p class=\"card-meta\">{} · {}</p>\
         <p class=\"card-desc\">Здесь вы можете просматривать заказы, откликаться и следить за своими откликами.</p>\
         </div>\
         <div class=\"quick-actions\">\
         <button type=\"button\" class=\"btn btn-primary\" data-go=\"tenders\">📋 Смотреть заказы</button>\
         <button type=\"button\" class=\"btn btn-secondary\" data-go=\"applications\">📩 Мои отклики</button>\
         <button type=\"button\" class=\"btn btn-secondary\" data-go=\"profile\">👤 Профиль</button>\
         </div>\
         </div>",
        esc(&user.full_name),
        esc(&user.city),
        user.status.label(),
    )
}

fn tenders_list(tenders: &[Tender], actions: &mut Vec<Action>) -> String {
    let mut list = String::new();
    if tenders.is_empty() {
        list.push_str(
            "<div class=\"empty-state\"><div class=\"empty-icon\">📋</div>\
             <p>Нет открытых заказов в вашем городе.</p></div>",
        );
    } else {
        for t in tenders {
            actions.push(Action::OpenTender(t.id));
            let (badge_class, badge_text) = if t.has_applied {
                ("badge-applied", "Отклик отправлен")
            } else {
                ("badge-open", "Открыт")
            };
            let budget = t
                .budget
                .as_deref()
                .map(|b| format!(" · {}", esc(b)))
                .unwrap_or_default();
            list.push_str(&format!(
                "<div class=\"card tender-card\" data-tender-id=\"{}\">\
                 <h3 class=\"card-title\">{} <span class=\"badge {}\">{}</span></h3>\
                 <p class=\"card-meta\">{} · {}{}</p>\
                 <p class=\"card-desc\">{}</p>\
                 </div>",
                t.id,
                esc(&t.title),
                badge_class,
                badge_text,
                esc(&t.city),
                esc(&t.category),
                budget,
                esc(&preview(&t.description)),
            ));
        }
    }
    format!("<div class=\"screen\"><h2 class=\"screen-title\">Заказы</h2>{list}</div>")
}

fn tender_detail(detail: Option<&TenderDetail>, actions: &mut Vec<Action>) -> String {
    let Some(t) = detail else {
        return placeholder();
    };
    let footer = if t.can_apply() {
        actions.push(Action::Apply);
        "<button type=\"button\" class=\"btn btn-primary\" id=\"btnApply\">📩 Откликнуться</button>"
            .to_string()
    } else if t.has_applied {
        "<p class=\"card-meta\">✅ Вы уже откликнулись на этот заказ.</p>".to_string()
    } else {
        String::new()
    };
    format!(
        "<div class=\"screen\">\
         <div class=\"card\">\
         <h2 class=\"card-title\">{}</h2>\
         <p class=\"card-meta\">{} · {}</p>\
         <p class=\"card-meta\">💰 {} · ⏰ {}</p>\
         </div>\
         <div class=\"detail-section\">\
         <h3>Описание</h3>\
         <p>{}</p>\
         </div>\
         {footer}\
         </div>",
        esc(&t.title),
        esc(&t.city),
        esc(&t.category),
        esc(t.budget.as_deref().unwrap_or("По договорённости")),
        t.deadline
            .as_ref()
            .map(format_datetime)
            .unwrap_or_else(|| "Не указан".to_string()),
        esc(t.description.as_deref().unwrap_or("")),
    )
}

fn applications_list(applications: &[Application], actions: &mut Vec<Action>) -> String {
    let mut list = String::new();
    if applications.is_empty() {
        list.push_str(
            "<div class=\"empty-state\"><div class=\"empty-icon\">📩</div>\
             <p>У вас пока нет откликов.</p>\
             <p>Выберите заказ и нажмите «Откликнуться».</p></div>",
        );
    } else {
        for a in applications {
            actions.push(Action::OpenApplication(a.id));
            list.push_str(&format!(
                "<div class=\"card list-item\" data-application-id=\"{}\">\
                 <h3 class=\"card-title\">{} <span class=\"app-status {}\">{}</span></h3>\
                 <p class=\"card-meta\">{} · {}</p>\
                 </div>",
                a.id,
                esc(&a.tender_title),
                a.status.as_str(),
                a.status.label(),
                esc(&a.tender_city),
                esc(&a.tender_category),
            ));
        }
    }
    format!("<div class=\"screen\"><h2 class=\"screen-title\">Мои отклики</h2>{list}</div>")
}

fn application_detail(detail: Option<&ApplicationDetail>) -> String {
    let Some(a) = detail else {
        return placeholder();
    };
    format!(
        "<div class=\"screen\">\
         <div class=\"card\">\
         <h2 class=\"card-title\">{}</h2>\
         <p class=\"card-meta\">Статус: {}</p>\
         <p class=\"card-meta\">{} · {} · {}</p>\
         </div>\
         <div class=\"detail-section\">\
         <h3>Описание заказа</h3>\
         <p>{}</p>\
         </div>\
         <p class=\"card-meta\">Дата отклика: {}</p>\
         </div>",
        esc(&a.tender_title),
        a.status.label(),
        esc(&a.tender_city),
        esc(&a.tender_category),
        esc(a.tender_budget.as_deref().unwrap_or("По договорённости")),
        esc(a.tender_description.as_deref().unwrap_or("")),
        a.created_at
            .as_ref()
            .map(format_datetime)
            .unwrap_or_else(|| "—".to_string()),
    )
}

fn profile(profile: Option<&Profile>, actions: &mut Vec<Action>) -> String {
    let Some(u) = profile else {
        return placeholder();
    };
    actions.push(Action::Go(Screen::ProfileEdit));
    let skills = if u.skills.is_empty() {
        "—".to_string()
    } else {
        u.skills.join(", ")
    };
    let mut rows = String::new();
    for (label, value) in [
        ("ФИО", esc(&u.full_name)),
        ("Город", esc(&u.city)),
        ("Телефон", esc(&u.phone)),
        ("Навыки", esc(&skills)),
        ("Статус", u.status.label().to_string()),
    ] {
        rows.push_str(&format!(
            "<div class=\"profile-row\">\
             <span class=\"profile-label\">{label}</span>\
             <span class=\"profile-value\">{value}</span>\
             </div>",
        ));
    }
    format!(
        "<div class=\"screen\">\
         <h2 class=\"screen-title\">Профиль</h2>\
         <div class=\"card\">{rows}</div>\
         <button type=\"button\" class=\"btn btn-secondary\" data-go=\"profile_edit\">✏️ Редактировать</button>\
         </div>",
    )
}

fn profile_edit(profile: Option<&Profile>, skills: &[String], actions: &mut Vec<Action>) -> String {
    let Some(u) = profile else {
        return placeholder();
    };
    actions.push(Action::SubmitProfile);
    let mut options = String::new();
    for skill in skills {
        options.push_str(&format!("<option value=\"{}\"></option>", esc(skill)));
    }
    format!(
        "<div class=\"screen\">\
         <h2 class=\"screen-title\">Редактирование профиля</h2>\
         <form id=\"profileForm\">\
         <div class=\"form-group\"><label>ФИО</label>\
         <input type=\"text\" name=\"full_name\" value=\"{}\" required></div>\
         <div class=\"form-group\"><label>Город</label>\
         <input type=\"text\" name=\"city\" value=\"{}\" required></div>\
         <div class=\"form-group\"><label>Телефон</label>\
         <input type=\"text\" name=\"phone\" value=\"{}\" required></div>\
         <div class=\"form-group\"><label>Навыки (через запятую или выберите)</label>\
         <input type=\"text\" name=\"skills_text\" list=\"skillsCatalog\" \
         placeholder=\"Например: СКУД, Видеонаблюдение\" value=\"{}\">\
         <datalist id=\"skillsCatalog\">{}</datalist></div>\
         <button type=\"submit\" class=\"btn btn-primary\">Сохранить</button>\
         </form>\
         </div>",
        esc(&u.full_name),
        esc(&u.city),
        esc(&u.phone),
        esc(&u.skills.join(", ")),
        options,
    )
}

/// Escape text for both element and attribute positions. `&` goes first so
/// already-produced entities are not double-escaped.
pub fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// First 120 characters of a description, with an ellipsis when truncated.
fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(120).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

fn format_datetime(ts: &DateTime<Utc>) -> String {
    ts.format("%d.%m.%Y %H:%M").to_string()
}
