//! `POST /patient` scenarios: a new or previously created person plus one identifier.

use crate::context::Context;
use crate::outcome::{Outcome, expect_mentions, expect_status};
use anyhow::Context as _;
use omrs_checks::validate_patient_response;
use omrs_client::payload::PatientPayload;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub enum PatientCase {
    NewPerson,
    ExistingPerson,
    InvalidPersonRoot(Value),
    InvalidNames(Value),
    OptionalFamilyName(Value),
    InvalidGender(Value),
    CustomGender(&'static str),
    InvalidBirthdate(Value),
    NullBirthdate,
    InvalidIdentifierType(Value),
    InvalidIdentifier(Value),
    InvalidLocation(Value),
    LimitedUser,
}

impl PatientCase {
    pub fn name(&self) -> String {
        match self {
            Self::NewPerson => "create with new person".into(),
            Self::ExistingPerson => "create with existing person".into(),
            Self::InvalidPersonRoot(v) => format!("invalid person root {v}"),
            Self::InvalidNames(v) => format!("invalid person.names {v}"),
            Self::OptionalFamilyName(v) => format!("optional familyName {v}"),
            Self::InvalidGender(v) => format!("invalid person.gender {v}"),
            Self::CustomGender(g) => format!("accepted custom gender {g:?}"),
            Self::InvalidBirthdate(v) => format!("invalid person.birthdate {v}"),
            Self::NullBirthdate => "accepted null birthdate".into(),
            Self::InvalidIdentifierType(v) => format!("invalid identifierType {v}"),
            Self::InvalidIdentifier(v) => format!("invalid identifier {v}"),
            Self::InvalidLocation(v) => format!("invalid location {v}"),
            Self::LimitedUser => "user without Add Patients".into(),
        }
    }

    pub async fn run(&self, ctx: &Context) -> anyhow::Result<Outcome> {
        match self {
            Self::NewPerson => {
                let draft = ctx.patient_draft(Context::random_person()).await?;
                created_and_findable(ctx, &draft.payload, &draft.identifier).await
            }
            Self::ExistingPerson => {
                let draft = ctx.existing_person_draft().await?;
                created_and_findable(ctx, &draft.payload, &draft.identifier).await
            }
            Self::InvalidPersonRoot(value) => {
                let body = with_person_field(ctx, None, value).await?;
                let response = ctx.post("patient", &body).await?;
                expect_status(&response, &[400, 500])?;
                expect_mentions(&response, &["person", "null"])?;
                Ok(Outcome::Passed)
            }
            Self::InvalidNames(value) => {
                rejected_person(ctx, "names", value, &["name", "person"]).await
            }
            Self::OptionalFamilyName(value) => {
                let body = with_person_field(ctx, Some("names"), value).await?;
                accepted(ctx, &body).await.map(|_| Outcome::Passed)
            }
            Self::InvalidGender(value) => {
                rejected_person(ctx, "gender", value, &["gender", "person"]).await
            }
            Self::CustomGender(gender) => {
                let body = with_person_field(ctx, Some("gender"), &json!(gender)).await?;
                let data = accepted(ctx, &body).await?;
                if let Some(returned) = data["person"].get("gender").filter(|g| !g.is_null()) {
                    anyhow::ensure!(
                        returned == gender,
                        "gender {returned} returned for {gender:?}"
                    );
                }
                Ok(Outcome::Passed)
            }
            Self::InvalidBirthdate(value) => {
                rejected_person(ctx, "birthdate", value, &["birthdate", "date", "person"]).await
            }
            Self::NullBirthdate => {
                let body = with_person_field(ctx, Some("birthdate"), &Value::Null).await?;
                let data = accepted(ctx, &body).await?;
                let birthdate = data["person"].get("birthdate");
                anyhow::ensure!(
                    matches!(birthdate, None | Some(Value::Null))
                        || birthdate.and_then(Value::as_str) == Some(""),
                    "birthdate {birthdate:?} returned for null"
                );
                Ok(Outcome::Passed)
            }
            Self::InvalidIdentifierType(value) => {
                rejected_identifier(
                    ctx,
                    "identifierType",
                    value,
                    &["identifiertype", "identifier type"],
                )
                .await
            }
            Self::InvalidIdentifier(value) => {
                rejected_identifier(ctx, "identifier", value, &["identifier"]).await
            }
            Self::InvalidLocation(value) => {
                rejected_identifier(ctx, "location", value, &["location"]).await
            }
            Self::LimitedUser => {
                let Some(limited) = &ctx.limited else {
                    return Ok(Outcome::Skipped("limited user not configured".into()));
                };
                let draft = ctx.existing_person_draft().await?;
                let response = limited.post_raw("patient", &draft.payload).await?;
                expect_status(&response, &[400, 403])?;
                expect_mentions(&response, &["privilege"])?;
                Ok(Outcome::Passed)
            }
        }
    }
}

pub fn cases() -> Vec<PatientCase> {
    let mut cases = vec![PatientCase::NewPerson, PatientCase::ExistingPerson];
    cases.extend(
        [Value::Null, json!(""), json!("uuid-like-string")]
            .into_iter()
            .map(PatientCase::InvalidPersonRoot),
    );
    cases.extend(
        [
            Value::Null,
            json!(""),
            json!({}),
            json!([]),
            json!([{"familyName": "X"}]),
            json!([{"givenName": "", "familyName": "X"}]),
            json!([123]),
        ]
        .into_iter()
        .map(PatientCase::InvalidNames),
    );
    cases.extend(
        [
            json!([{"givenName": "X"}]),
            json!([{"givenName": "X", "familyName": ""}]),
        ]
        .into_iter()
        .map(PatientCase::OptionalFamilyName),
    );
    cases.extend(
        [Value::Null, json!(""), json!(123)]
            .into_iter()
            .map(PatientCase::InvalidGender),
    );
    cases.extend(
        ["X", "M", "F", "U", "male"]
            .into_iter()
            .map(PatientCase::CustomGender),
    );
    cases.extend(
        [
            json!(""),
            json!("   "),
            json!("31-12-1990"),
            json!("not-a-date"),
            json!("3000-01-01"),
            json!(12345),
            json!([]),
            json!({}),
        ]
        .into_iter()
        .map(PatientCase::InvalidBirthdate),
    );
    cases.push(PatientCase::NullBirthdate);
    cases.extend(
        [
            json!(""),
            json!("    "),
            json!("not-a-uuid"),
            json!("12345"),
            json!("zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"),
            json!(123456),
        ]
        .into_iter()
        .map(PatientCase::InvalidIdentifierType),
    );
    cases.extend(
        [
            Value::Null,
            json!(""),
            json!("   "),
            json!("a"),
            json!("MRN#123"),
            json!("тест123"),
            json!("A".repeat(256)),
            json!(123456),
            json!([]),
        ]
        .into_iter()
        .map(PatientCase::InvalidIdentifier),
    );
    cases.extend(
        [
            Value::Null,
            json!("10"),
            json!("abc"),
            json!(""),
            json!("b52ec6f9-0e26-424c-a4a1-c64f9d571eb3"),
        ]
        .into_iter()
        .map(PatientCase::InvalidLocation),
    );
    cases.push(PatientCase::LimitedUser);
    cases
}

async fn created_and_findable(
    ctx: &Context,
    payload: &PatientPayload,
    identifier: &str,
) -> anyhow::Result<Outcome> {
    let created = ctx.client.create_patient(payload).await?;
    validate_patient_response(&created)?;
    let found = ctx
        .client
        .find_patient_by_identifier(identifier)
        .await?
        .with_context(|| format!("no patient found by identifier {identifier}"))?;
    anyhow::ensure!(
        found == created,
        "patient found by identifier differs from the created one"
    );
    Ok(Outcome::Passed)
}

/// A valid new-person payload with `person` (or `person.<field>`) replaced by `value`.
async fn with_person_field(
    ctx: &Context,
    field: Option<&str>,
    value: &Value,
) -> anyhow::Result<Value> {
    let mut body = ctx
        .patient_draft(Context::random_person())
        .await?
        .to_value()?;
    match field {
        Some(field) => body["person"][field] = value.clone(),
        None => body["person"] = value.clone(),
    }
    Ok(body)
}

/// A valid existing-person payload with `identifiers[0].<field>` replaced by `value`.
async fn with_identifier_field(ctx: &Context, field: &str, value: &Value) -> anyhow::Result<Value> {
    let mut body = ctx.existing_person_draft().await?.to_value()?;
    body["identifiers"][0][field] = value.clone();
    Ok(body)
}

/// The patient was created and the response has the basic patient shape.
async fn accepted(ctx: &Context, body: &Value) -> anyhow::Result<Value> {
    let response = ctx.post("patient", body).await?;
    expect_status(&response, &[200, 201])?;
    let data = response.json()?;
    anyhow::ensure!(
        data["uuid"].is_string(),
        "created patient has no string uuid"
    );
    anyhow::ensure!(
        data["voided"] == Value::Bool(false),
        "created patient is not voided=false"
    );
    anyhow::ensure!(data["person"].is_object(), "created patient has no person");
    Ok(data)
}

async fn rejected_person(
    ctx: &Context,
    field: &str,
    value: &Value,
    keys: &[&str],
) -> anyhow::Result<Outcome> {
    let body = with_person_field(ctx, Some(field), value).await?;
    let response = ctx.post("patient", &body).await?;
    expect_status(&response, &[400])?;
    expect_mentions(&response, keys)?;
    Ok(Outcome::Passed)
}

async fn rejected_identifier(
    ctx: &Context,
    field: &str,
    value: &Value,
    keys: &[&str],
) -> anyhow::Result<Outcome> {
    let body = with_identifier_field(ctx, field, value).await?;
    let response = ctx.post("patient", &body).await?;
    expect_status(&response, &[400])?;
    expect_mentions(&response, keys)?;
    Ok(Outcome::Passed)
}
