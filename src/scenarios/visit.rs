//! `POST /visit` scenarios. Each case gets its own patient so active visits never collide.

use crate::context::{Context, PatientContext};
use crate::outcome::{Outcome, expect_mentions, expect_status, server_error};
use chrono::{DateTime, Duration, TimeZone, Utc};
use omrs_checks::validate_visit_response;
use omrs_client::payload::VisitPayload;
use omrs_types::is_uuid_like;
use serde_json::{Value, json};

const DATE_KEYS: &[&str] = &["stopdatetime", "startdatetime", "end date", "before", "after", "date"];
const PRIVILEGE_KEYS: &[&str] = &[
    "privilege",
    "privileges required",
    "not authorized",
    "unauthorized",
    "forbidden",
    "authentication",
    "access denied",
];

#[derive(Debug, Clone)]
pub enum VisitCase {
    CreateNow,
    CreateInPast,
    CreateInFarFuture,
    MissingField(&'static str),
    UnknownPatient,
    WrongPassword,
    TwoSequential,
    Overlapping,
    StopBeforeStart,
    InvalidStart(Value),
    InvalidStop(Value),
    InvalidPatient(Value),
    InvalidVisitType(Value),
    InvalidLocation(Value),
    WithIndication,
    InvalidIndication(Value),
    WithoutEncounters,
    InvalidEncounters(Value),
    LimitedUser,
}

/// One patient, one visit type: what every case posts against.
struct Fixture {
    patient: PatientContext,
    visit_type_uuid: String,
}

impl Fixture {
    async fn new(ctx: &Context) -> anyhow::Result<Self> {
        Ok(Self {
            patient: ctx.new_patient().await?,
            visit_type_uuid: ctx.visit_type_uuid().await?,
        })
    }

    fn payload(&self, start: DateTime<Utc>) -> VisitPayload {
        VisitPayload::new(&self.patient.patient_uuid, &self.visit_type_uuid, start)
            .at_location(&self.patient.location_uuid)
    }

    /// A valid "start now" visit as JSON, with `field` set to `value`.
    fn body_with(&self, field: &str, value: Value) -> anyhow::Result<Value> {
        let mut body = serde_json::to_value(self.payload(Utc::now()))?;
        body[field] = value;
        Ok(body)
    }

    fn validate(&self, visit: &Value) -> anyhow::Result<()> {
        validate_visit_response(
            visit,
            &self.patient.patient_uuid,
            &self.visit_type_uuid,
            &self.patient.location_uuid,
        )?;
        Ok(())
    }

    /// Create the visit and check it both as returned and as refetched with `v=full`.
    async fn created_and_refetched(
        &self,
        ctx: &Context,
        payload: &VisitPayload,
    ) -> anyhow::Result<Outcome> {
        let visit = ctx.client.create_visit(payload).await?;
        self.validate(&visit)?;
        let uuid = visit["uuid"].as_str().unwrap_or_default();
        let full = ctx.client.fetch_visit_full(uuid).await?;
        self.validate(&full)?;
        Ok(Outcome::Passed)
    }
}

impl VisitCase {
    pub fn name(&self) -> String {
        match self {
            Self::CreateNow => "create starting now".into(),
            Self::CreateInPast => "create in the past".into(),
            Self::CreateInFarFuture => "create in the far future".into(),
            Self::MissingField(f) => format!("missing {f}"),
            Self::UnknownPatient => "unknown patient uuid".into(),
            Self::WrongPassword => "wrong password".into(),
            Self::TwoSequential => "two sequential visits".into(),
            Self::Overlapping => "overlapping active visit".into(),
            Self::StopBeforeStart => "stop before start".into(),
            Self::InvalidStart(v) => format!("invalid startDatetime {v}"),
            Self::InvalidStop(v) => format!("invalid stopDatetime {v}"),
            Self::InvalidPatient(v) => format!("invalid patient {v}"),
            Self::InvalidVisitType(v) => format!("invalid visitType {v}"),
            Self::InvalidLocation(v) => format!("invalid location {v}"),
            Self::WithIndication => "with indication".into(),
            Self::InvalidIndication(v) => format!("invalid indication {v}"),
            Self::WithoutEncounters => "without encounters".into(),
            Self::InvalidEncounters(v) => format!("invalid encounters {v}"),
            Self::LimitedUser => "user without Add Visits".into(),
        }
    }

    pub async fn run(&self, ctx: &Context) -> anyhow::Result<Outcome> {
        if let Self::LimitedUser = self {
            if ctx.limited.is_none() {
                return Ok(Outcome::Skipped("limited user not configured".into()));
            }
        }

        let fixture = Fixture::new(ctx).await?;
        match self {
            Self::CreateNow => {
                fixture
                    .created_and_refetched(ctx, &fixture.payload(Utc::now()))
                    .await
            }
            Self::CreateInPast => {
                let start = Utc.with_ymd_and_hms(2000, 1, 1, 10, 0, 0).single();
                let start = start.unwrap_or_else(Utc::now);
                fixture.created_and_refetched(ctx, &fixture.payload(start)).await
            }
            Self::CreateInFarFuture => {
                let start = Utc.with_ymd_and_hms(3000, 1, 1, 10, 0, 0).single();
                let start = start.unwrap_or_else(Utc::now);
                let response = ctx.client.post_raw("visit", &fixture.payload(start)).await?;
                if response.status_code() != 201 {
                    return Ok(Outcome::Passed);
                }
                let visit = response.json()?;
                fixture.validate(&visit)?;
                let uuid = visit["uuid"].as_str().unwrap_or_default();
                fixture.validate(&ctx.client.fetch_visit_full(uuid).await?)?;
                Ok(Outcome::Passed)
            }
            Self::MissingField(field) => {
                let mut body = serde_json::to_value(fixture.payload(Utc::now()))?;
                if let Some(map) = body.as_object_mut() {
                    map.remove(*field);
                }
                let response = ctx.post("visit", &body).await?;
                expect_status(&response, &[400])?;
                Ok(Outcome::Passed)
            }
            Self::UnknownPatient => {
                let payload = VisitPayload::new(
                    uuid::Uuid::new_v4().to_string(),
                    &fixture.visit_type_uuid,
                    Utc::now(),
                )
                .at_location(&fixture.patient.location_uuid);
                let response = ctx.client.post_raw("visit", &payload).await?;
                expect_status(&response, &[400, 404])?;
                Ok(Outcome::Passed)
            }
            Self::WrongPassword => {
                let response = ctx
                    .wrong_password()
                    .post_raw("visit", &fixture.payload(Utc::now()))
                    .await?;
                expect_status(&response, &[401])?;
                Ok(Outcome::Passed)
            }
            Self::TwoSequential => {
                let start1 = Utc::now() - Duration::hours(2);
                let stop1 = start1 + Duration::hours(1);
                let first = ctx
                    .client
                    .create_visit(&fixture.payload(start1).stopping_at(stop1))
                    .await?;
                fixture.validate(&first)?;
                let second = ctx
                    .client
                    .create_visit(&fixture.payload(stop1 + Duration::minutes(10)))
                    .await?;
                fixture.validate(&second)?;
                anyhow::ensure!(
                    first["uuid"] != second["uuid"],
                    "both visits have uuid {}",
                    first["uuid"]
                );
                Ok(Outcome::Passed)
            }
            Self::Overlapping => {
                ctx.client
                    .create_visit(&fixture.payload(Utc::now() - Duration::minutes(30)))
                    .await?;
                let response = ctx
                    .client
                    .post_raw("visit", &fixture.payload(Utc::now() - Duration::minutes(10)))
                    .await?;
                expect_status(&response, &[400])?;
                expect_mentions(
                    &response,
                    &["overlap", "active", "visit", "already", "startdatetime"],
                )?;
                Ok(Outcome::Passed)
            }
            Self::StopBeforeStart => {
                let start = Utc::now();
                let payload = fixture.payload(start).stopping_at(start - Duration::days(1));
                let response = ctx.client.post_raw("visit", &payload).await?;
                expect_status(&response, &[400, 500])?;
                expect_mentions(&response, DATE_KEYS)?;
                Ok(Outcome::Passed)
            }
            Self::InvalidStart(value) => {
                let body = fixture.body_with("startDatetime", value.clone())?;
                let response = ctx.post("visit", &body).await?;
                if let Some(xfail) = server_error(&response) {
                    return Ok(xfail);
                }
                expect_status(&response, &[400])?;
                expect_mentions(&response, &["startdatetime", "datetime", "date", "invalid"])?;
                Ok(Outcome::Passed)
            }
            Self::InvalidStop(value) => {
                let body = fixture.body_with("stopDatetime", value.clone())?;
                let response = ctx.post("visit", &body).await?;
                expect_status(&response, &[400, 500])?;
                expect_mentions(&response, &["stopdatetime", "datetime", "date", "invalid"])?;
                Ok(Outcome::Passed)
            }
            Self::InvalidPatient(value) => {
                let body = fixture.body_with("patient", value.clone())?;
                let response = ctx.post("visit", &body).await?;
                let uuid_like = value.as_str().is_some_and(is_uuid_like);
                if uuid_like {
                    expect_status(&response, &[400, 404, 500])?;
                } else {
                    expect_status(&response, &[400, 500])?;
                }
                Ok(Outcome::Passed)
            }
            Self::InvalidVisitType(value) => {
                let body = fixture.body_with("visitType", value.clone())?;
                let response = ctx.post("visit", &body).await?;
                expect_status(&response, &[400, 404, 500])?;
                Ok(Outcome::Passed)
            }
            Self::InvalidLocation(value) => {
                let body = fixture.body_with("location", value.clone())?;
                let response = ctx.post("visit", &body).await?;
                if [400, 404, 500].contains(&response.status_code()) {
                    Ok(Outcome::Passed)
                } else {
                    Ok(Outcome::ExpectedFailure(format!(
                        "location {value} accepted with status {}",
                        response.status_code()
                    )))
                }
            }
            Self::WithIndication => {
                let payload = fixture.payload(Utc::now()).with_indication("Follow-up visit");
                let response = ctx.client.post_raw("visit", &payload).await?;
                if let Some(xfail) = server_error(&response) {
                    return Ok(xfail);
                }
                expect_status(&response, &[200, 201])?;
                Ok(Outcome::Passed)
            }
            Self::InvalidIndication(value) => {
                let body = fixture.body_with("indication", value.clone())?;
                let response = ctx.post("visit", &body).await?;
                if let Some(xfail) = server_error(&response) {
                    return Ok(xfail);
                }
                expect_status(&response, &[400])?;
                Ok(Outcome::Passed)
            }
            Self::WithoutEncounters => {
                let response = ctx
                    .client
                    .post_raw("visit", &fixture.payload(Utc::now()))
                    .await?;
                if let Some(xfail) = server_error(&response) {
                    return Ok(xfail);
                }
                expect_status(&response, &[200, 201])?;
                Ok(Outcome::Passed)
            }
            Self::InvalidEncounters(value) => {
                let body = fixture.body_with("encounters", value.clone())?;
                let response = ctx.post("visit", &body).await?;
                if let Some(xfail) = server_error(&response) {
                    return Ok(xfail);
                }
                expect_status(&response, &[400, 404])?;
                Ok(Outcome::Passed)
            }
            Self::LimitedUser => {
                let Some(limited) = &ctx.limited else {
                    return Ok(Outcome::Skipped("limited user not configured".into()));
                };
                let response = limited
                    .post_raw("visit", &fixture.payload(Utc::now()))
                    .await?;
                expect_status(&response, &[400, 401, 403])?;
                expect_mentions(&response, PRIVILEGE_KEYS)?;
                Ok(Outcome::Passed)
            }
        }
    }
}

pub fn cases() -> Vec<VisitCase> {
    let random_uuid = || json!(uuid::Uuid::new_v4().to_string());
    let mut cases = vec![
        VisitCase::CreateNow,
        VisitCase::CreateInPast,
        VisitCase::CreateInFarFuture,
    ];
    cases.extend(
        ["patient", "visitType", "startDatetime"]
            .into_iter()
            .map(VisitCase::MissingField),
    );
    cases.extend([
        VisitCase::UnknownPatient,
        VisitCase::WrongPassword,
        VisitCase::TwoSequential,
        VisitCase::Overlapping,
        VisitCase::StopBeforeStart,
    ]);
    cases.extend(
        [
            Value::Null,
            json!(""),
            json!("2020-01-01"),
            json!("01-01-2020T10:00:00.000Z"),
            json!("not-a-date"),
        ]
        .into_iter()
        .map(VisitCase::InvalidStart),
    );
    cases.extend(
        [json!(""), json!("not-a-date"), json!("2020-01-01"), json!(123)]
            .into_iter()
            .map(VisitCase::InvalidStop),
    );
    cases.extend(
        [Value::Null, json!(""), json!("not-a-uuid"), random_uuid()]
            .into_iter()
            .map(VisitCase::InvalidPatient),
    );
    cases.extend(
        [Value::Null, json!(""), json!("not-a-uuid"), random_uuid()]
            .into_iter()
            .map(VisitCase::InvalidVisitType),
    );
    cases.extend(
        [Value::Null, json!(""), json!("abc"), random_uuid()]
            .into_iter()
            .map(VisitCase::InvalidLocation),
    );
    cases.push(VisitCase::WithIndication);
    cases.extend(
        [json!(123), json!({"a": 1}), json!(["x"]), json!(true)]
            .into_iter()
            .map(VisitCase::InvalidIndication),
    );
    cases.push(VisitCase::WithoutEncounters);
    cases.extend(
        [
            json!("not-an-array"),
            json!({"uuid": "x"}),
            json!([null]),
            json!(["not-a-uuid"]),
            random_uuid_list(),
        ]
        .into_iter()
        .map(VisitCase::InvalidEncounters),
    );
    cases.push(VisitCase::LimitedUser);
    cases
}

fn random_uuid_list() -> Value {
    json!([uuid::Uuid::new_v4().to_string()])
}
