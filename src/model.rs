use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation state of the current user, as reported by `/api/me`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    PendingModeration,
    Banned,
}

impl UserStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Active => "Активен",
            UserStatus::PendingModeration => "На модерации",
            UserStatus::Banned => "Заблокирован",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Executor,
    Customer,
    Both,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TenderStatus {
    Draft,
    Open,
    InProgress,
    Closed,
    Cancelled,
}

/// Backend-controlled lifecycle of an application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Selected,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Ожидает",
            ApplicationStatus::Selected => "Выбран",
            ApplicationStatus::Rejected => "Отклонён",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub tg_id: i64,
    pub full_name: String,
    pub city: String,
    pub phone: String,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// One row of the tender list. The list endpoint truncates descriptions
/// server-side and always scopes to open tenders in the user's city.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tender {
    pub id: i64,
    pub title: String,
    pub city: String,
    pub category: String,
    pub budget: Option<String>,
    #[serde(default)]
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub status: TenderStatus,
    pub has_applied: bool,
}

/// The richer per-id tender fetch, including the caller's own application
/// if one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenderDetail {
    pub id: i64,
    pub title: String,
    pub city: String,
    pub category: String,
    pub budget: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: TenderStatus,
    pub has_applied: bool,
    pub application_id: Option<i64>,
    pub application_status: Option<ApplicationStatus>,
}

impl TenderDetail {
    /// Applying is offered only for open tenders the user has not applied to.
    pub fn can_apply(&self) -> bool {
        !self.has_applied && self.status == TenderStatus::Open
    }
}

/// One row of the user's application list. Tender fields are denormalized
/// by the backend at response time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    pub id: i64,
    pub tender_id: i64,
    pub tender_title: String,
    pub tender_city: String,
    pub tender_category: String,
    pub tender_budget: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default, deserialize_with = "deserialize_created_at")]
    pub created_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationDetail {
    pub id: i64,
    pub tender_id: i64,
    pub tender_title: String,
    pub tender_city: String,
    pub tender_category: String,
    pub tender_budget: Option<String>,
    pub tender_description: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default, deserialize_with = "deserialize_created_at")]
    pub created_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
}

/// The backend serializes `created_at` as a bare timestamp with no UTC
/// offset, unlike `deadline`, which it always offset-qualifies. Offsetless
/// values are taken as UTC.
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TenderList {
    #[serde(default)]
    pub tenders: Vec<Tender>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplicationList {
    #[serde(default)]
    pub applications: Vec<Application>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SkillList {
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyReceipt {
    pub ok: bool,
    pub application_id: i64,
}

/// PATCH body for `/api/profile`. Skills are always sent in full; the
/// fallback-to-existing policy for an empty form field is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub city: String,
    pub phone: String,
    pub skills: Vec<String>,
}
