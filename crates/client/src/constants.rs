//! Defaults and environment variable names.

pub const DEFAULT_BASE_URL: &str = "http://localhost/openmrs/ws/rest/v1";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "Admin123";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const BASE_URL_ENV: &str = "OPENMRS_BASE_URL";
pub const USERNAME_ENV: &str = "OPENMRS_USERNAME";
pub const PASSWORD_ENV: &str = "OPENMRS_PASSWORD";
pub const TIMEOUT_ENV: &str = "OPENMRS_TIMEOUT_SECS";
pub const LIMITED_USERNAME_ENV: &str = "OPENMRS_LIMITED_USERNAME";
pub const LIMITED_PASSWORD_ENV: &str = "OPENMRS_LIMITED_PASSWORD";

/// Name of the identifier type validated with the modulus-30 check character.
pub const OPENMRS_ID_TYPE_NAME: &str = "OpenMRS ID";

pub const ADD_PATIENTS_PRIVILEGE: &str = "Add Patients";
pub const ADD_VISITS_PRIVILEGE: &str = "Add Visits";
