//! Request body validation shared by the handlers.

use crate::error::{ApiError, ApiResult};
use crate::state::{new_uuid, AddressRecord, NameRecord, PersonRecord};
use chrono::NaiveDate;
use omrs_types::{parse_birthdate, Reference};
use serde_json::Value;

/// A string with something left after trimming.
pub(crate) fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// The uuid carried by a `"<uuid>"` or `{"uuid": ...}` reference.
pub(crate) fn reference_uuid(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Reference::from_value)
        .map(|r| r.uuid().to_owned())
}

fn optional_string(value: Option<&Value>, field: &str) -> ApiResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ApiError::bad_request(format!("{field} must be a string"))),
    }
}

fn parse_name(index: usize, value: &Value) -> ApiResult<NameRecord> {
    let field = format!("person.names[{index}]");
    let Value::Object(map) = value else {
        return Err(ApiError::bad_request(format!("{field} must be an object")));
    };
    let given = non_blank(map.get("givenName")).ok_or_else(|| {
        ApiError::bad_request(format!("{field}.givenName is required and cannot be blank"))
    })?;
    let family = optional_string(map.get("familyName"), &format!("{field}.familyName"))?;
    Ok(NameRecord {
        uuid: new_uuid(),
        given_name: given.to_owned(),
        middle_name: optional_string(map.get("middleName"), &format!("{field}.middleName"))?,
        family_name: family.unwrap_or_default(),
    })
}

fn parse_address(index: usize, value: &Value) -> ApiResult<AddressRecord> {
    let field = format!("person.addresses[{index}]");
    let Value::Object(map) = value else {
        return Err(ApiError::bad_request(format!("{field} must be an object")));
    };
    Ok(AddressRecord {
        uuid: new_uuid(),
        address1: optional_string(map.get("address1"), &format!("{field}.address1"))?,
        city_village: optional_string(map.get("cityVillage"), &format!("{field}.cityVillage"))?,
        country: optional_string(map.get("country"), &format!("{field}.country"))?,
    })
}

/// Validate a new person document, as posted to `/person` or embedded in `/patient`.
///
/// Gender is any non-blank string. Birthdate may be absent or null; when present it must be a
/// `YYYY-MM-DD` string not after `today`.
pub(crate) fn new_person(value: Option<&Value>, today: NaiveDate) -> ApiResult<PersonRecord> {
    let map = match value {
        None | Some(Value::Null) => return Err(ApiError::bad_request("person is required")),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(ApiError::bad_request("person must be an object")),
    };

    let names = match map.get("names") {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(i, v)| parse_name(i, v))
            .collect::<ApiResult<Vec<_>>>()?,
        _ => {
            return Err(ApiError::bad_request(
                "person.names must be a non-empty list of names",
            ))
        }
    };

    let gender = non_blank(map.get("gender"))
        .ok_or_else(|| ApiError::bad_request("person.gender is required and cannot be blank"))?;

    let birthdate = match map.get("birthdate") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let date = parse_birthdate(s).ok_or_else(|| {
                ApiError::bad_request(format!("person.birthdate {s:?} is not a YYYY-MM-DD date"))
            })?;
            if date > today {
                return Err(ApiError::bad_request(
                    "person.birthdate cannot be in the future",
                ));
            }
            Some(date)
        }
        Some(_) => return Err(ApiError::bad_request("person.birthdate must be a string")),
    };

    let addresses = match map.get("addresses") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| parse_address(i, v))
            .collect::<ApiResult<Vec<_>>>()?,
        Some(_) => return Err(ApiError::bad_request("person.addresses must be a list")),
    };

    Ok(PersonRecord {
        uuid: new_uuid(),
        names,
        gender: gender.to_owned(),
        birthdate,
        addresses,
    })
}
