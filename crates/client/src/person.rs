//! Persons: creation, random valid persons and parsing them back from responses.

use crate::payload::{Address, Person, PersonName};
use crate::{ClientError, ClientResult, OpenMrsClient};
use chrono::{Duration, Months, NaiveDate, Utc};
use omrs_types::{parse_birthdate, parse_rest_datetime, Gender, BIRTHDATE_FORMAT};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

const MALE_GIVEN: &[&str] = &["Ivan", "Pavel", "Sergey", "Dmitry", "Alexei", "Nikolai", "Oleg"];
const FEMALE_GIVEN: &[&str] = &["Anna", "Maria", "Olga", "Elena", "Irina", "Tatiana", "Daria"];
const FAMILY: &[&str] = &["Smirnov", "Ivanov", "Kuznetsov", "Popov", "Sokolov", "Lebedev", "Kozlov"];

const MIN_AGE_YEARS: u32 = 18;
const MAX_AGE_YEARS: u32 = 80;

fn pick<'a, R: Rng>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or("Test")
}

/// A birthdate putting the person between 18 and 80 years old on `today`.
pub fn random_birthdate<R: Rng>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let youngest = today
        .checked_sub_months(Months::new(MIN_AGE_YEARS * 12))
        .unwrap_or(today);
    let oldest = today
        .checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
        .unwrap_or(youngest);
    let span = (youngest - oldest).num_days();
    oldest + Duration::days(rng.gen_range(0..=span))
}

/// A person with a random male or female name, matching gender and adult birthdate.
pub fn random_person<R: Rng>(rng: &mut R, today: NaiveDate) -> Person {
    let gender = if rng.gen_bool(0.5) {
        Gender::Male
    } else {
        Gender::Female
    };
    let given = match gender {
        Gender::Male => pick(rng, MALE_GIVEN),
        _ => pick(rng, FEMALE_GIVEN),
    };
    let mut family = pick(rng, FAMILY).to_owned();
    if gender == Gender::Female {
        family.push('a');
    }
    let birthdate = random_birthdate(rng, today)
        .format(BIRTHDATE_FORMAT)
        .to_string();
    Person::new(PersonName::new(given, family), gender, Some(birthdate))
}

fn parse_name(value: &Value) -> Option<PersonName> {
    let given = value.get("givenName")?.as_str().filter(|s| !s.is_empty())?;
    let family = value.get("familyName")?.as_str().filter(|s| !s.is_empty())?;
    Some(PersonName::new(given, family))
}

/// Names found in `preferredName` and `names`, deduplicated by given and family name.
fn parse_names(data: &Value) -> Vec<PersonName> {
    let mut names: Vec<PersonName> = Vec::new();
    let candidates = data
        .get("preferredName")
        .into_iter()
        .chain(data.get("names").and_then(Value::as_array).into_iter().flatten());
    for candidate in candidates {
        if let Some(name) = parse_name(candidate) {
            if !names.iter().any(|n| n.same_as(&name)) {
                names.push(name);
            }
        }
    }
    names
}

/// Normalises a response birthdate (`1990-01-01T00:00:00.000+0000`) back to `YYYY-MM-DD`.
fn request_birthdate(raw: &str) -> String {
    if parse_birthdate(raw).is_some() {
        return raw.to_owned();
    }
    match parse_rest_datetime(raw) {
        Some(dt) => dt.date_naive().format(BIRTHDATE_FORMAT).to_string(),
        None => raw.to_owned(),
    }
}

fn person_from_parts(data: &Value, names: Vec<PersonName>) -> Person {
    let addresses = data
        .get("addresses")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|a| a.is_object())
                .map(|a| Address {
                    address1: a["address1"].as_str().unwrap_or_default().to_owned(),
                    city_village: a["cityVillage"].as_str().unwrap_or_default().to_owned(),
                    country: a["country"].as_str().map(str::to_owned),
                })
                .collect()
        })
        .unwrap_or_default();
    Person {
        names,
        gender: data["gender"].as_str().unwrap_or_default().to_owned(),
        birthdate: data["birthdate"].as_str().map(request_birthdate),
        addresses,
    }
}

impl OpenMrsClient {
    /// `POST /person`, returning the raw created document.
    pub async fn create_person(&self, person: &Person) -> ClientResult<Value> {
        let created: Value = self.post_json("person", person).await?;
        tracing::info!(
            "created person {}",
            created["uuid"].as_str().unwrap_or("<no uuid>")
        );
        Ok(created)
    }

    /// `GET /person/{uuid}?v=full`.
    pub async fn fetch_person_full(&self, uuid: &str) -> ClientResult<Value> {
        self.get_json(&format!("person/{uuid}"), &[("v", "full")])
            .await
    }

    /// Parse a person response into a reusable [`Person`] payload.
    ///
    /// Refetches the full representation when the response carries no parseable names.
    pub async fn person_from_response(&self, data: Value) -> ClientResult<Person> {
        let names = parse_names(&data);
        if !names.is_empty() {
            return Ok(person_from_parts(&data, names));
        }

        let Some(uuid) = data["uuid"].as_str().map(str::to_owned) else {
            return Err(unparseable(&data));
        };
        tracing::debug!("person {uuid} has no names in this representation, refetching");
        let full = self.fetch_person_full(&uuid).await?;
        let names = parse_names(&full);
        if names.is_empty() {
            return Err(unparseable(&full));
        }
        Ok(person_from_parts(&full, names))
    }

    /// Create a random valid person and read it back as a [`Person`].
    pub async fn create_valid_person(&self) -> ClientResult<(String, Person)> {
        let payload = random_person(&mut rand::thread_rng(), Utc::now().date_naive());
        let created = self.create_person(&payload).await?;
        let uuid = created_uuid(&created, "person")?;
        let person = self.person_from_response(created).await?;
        Ok((uuid, person))
    }
}

/// The `uuid` of a freshly created resource.
pub(crate) fn created_uuid(created: &Value, resource: &'static str) -> ClientResult<String> {
    match created.get("uuid") {
        Some(Value::String(uuid)) if !uuid.is_empty() => Ok(uuid.clone()),
        other => Err(ClientError::UnexpectedResponse {
            resource,
            detail: format!("created document has uuid {other:?}"),
        }),
    }
}

fn unparseable(data: &Value) -> ClientError {
    ClientError::UnparseablePerson {
        uuid: data["uuid"].as_str().map(str::to_owned),
        keys: data
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_random_birthdate_is_adult() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let date = random_birthdate(&mut rng, today);
            assert!(date <= NaiveDate::from_ymd_opt(2006, 2, 28).unwrap());
            assert!(date >= NaiveDate::from_ymd_opt(1944, 2, 29).unwrap());
        }
    }

    #[test]
    fn test_created_uuid_must_be_a_string() {
        assert_eq!(
            created_uuid(&json!({"uuid": "p-1", "display": "Ann Lee"}), "person").unwrap(),
            "p-1"
        );
        for created in [json!({"display": "Ann Lee"}), json!({"uuid": 7}), json!({"uuid": ""})] {
            assert!(matches!(
                created_uuid(&created, "person"),
                Err(ClientError::UnexpectedResponse {
                    resource: "person",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_random_person_shape() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let person = random_person(&mut StdRng::seed_from_u64(1), today);
        assert_eq!(person.names.len(), 1);
        assert!(person.gender == "M" || person.gender == "F");
        assert!(parse_birthdate(person.birthdate.as_deref().unwrap()).is_some());
    }

    #[test]
    fn test_parse_names_deduplicates_preferred() {
        let data = json!({
            "preferredName": { "givenName": "Ann", "familyName": "Lee" },
            "names": [
                { "givenName": "Ann", "familyName": "Lee" },
                { "givenName": "Anna", "familyName": "Lee" },
                { "givenName": "", "familyName": "Lee" },
                "garbage"
            ]
        });
        let names = parse_names(&data);
        assert_eq!(names.len(), 2);
        assert_eq!(names[1].given_name, "Anna");
    }

    #[test]
    fn test_reference_only_preferred_name_has_no_names() {
        let data = json!({ "preferredName": { "uuid": "n1", "display": "Ann Lee" } });
        assert!(parse_names(&data).is_empty());
    }

    #[test]
    fn test_person_from_parts_normalises_birthdate() {
        let data = json!({
            "gender": "F",
            "birthdate": "1990-01-01T00:00:00.000+0000",
            "addresses": [{ "address1": "1 Main St", "cityVillage": "Town" }, 3]
        });
        let person = person_from_parts(&data, vec![PersonName::new("Ann", "Lee")]);
        assert_eq!(person.birthdate.as_deref(), Some("1990-01-01"));
        assert_eq!(person.addresses.len(), 1);
        assert_eq!(person.addresses[0].city_village, "Town");
    }

    #[test]
    fn test_unparseable_lists_keys() {
        let err = unparseable(&json!({ "uuid": "p1", "gender": "F" }));
        assert!(matches!(
            err,
            ClientError::UnparseablePerson { uuid: Some(u), keys } if u == "p1" && keys.len() == 2
        ));
    }
}
