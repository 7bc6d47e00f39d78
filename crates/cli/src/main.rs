mod reports;
mod table;

use anyhow::Context;
use clap::{Parser, Subcommand};
use omrs_client::payload::{PrivilegeRef, RolePayload, UserPayload};
use omrs_client::{ClientConfig, CreateUserOutcome, OpenMrsClient};
use omrs_identifiers::{
    compute_check_character, generate_from_regex_format, generate_identifier, validate_identifier,
    DEFAULT_PAYLOAD_LENGTH,
};
use omrs_types::RetireReason;
use reports::PrivilegeFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const PAGE_LIMIT: u32 = 100;

#[derive(Parser)]
#[command(name = "omrs")]
#[command(about = "OpenMRS identifier and REST utilities")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate Mod30 identifiers
    GenId {
        #[arg(long, default_value_t = DEFAULT_PAYLOAD_LENGTH)]
        length: usize,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Print the check character for a payload
    CheckChar { payload: String },
    /// Validate a Mod30 identifier
    ValidateId { identifier: String },
    /// Generate a value for an identifier type format
    GenFormat { format: String },
    /// List locations
    Locations,
    /// Retire a location
    RetireLocation {
        uuid: String,
        #[arg(long, default_value = "Retired from the command line")]
        reason: String,
    },
    /// List patient identifier types
    IdentifierTypes,
    /// List visit types
    VisitTypes,
    /// List roles, optionally checking which grant a privilege
    Roles {
        #[arg(long)]
        privilege: Option<String>,
        /// Restrict the report to these roles
        #[arg(long = "role-uuid")]
        role_uuids: Vec<String>,
    },
    /// Create a role
    CreateRole {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Privilege names to grant
        #[arg(long = "privilege")]
        privileges: Vec<String>,
    },
    /// List users with their roles and privileges
    Users {
        #[arg(long)]
        retired: bool,
        #[arg(long, conflicts_with = "without_privilege")]
        with_privilege: Option<String>,
        #[arg(long)]
        without_privilege: Option<String>,
        /// Print every privilege instead of a count
        #[arg(long)]
        all_privileges: bool,
    },
    /// Print a user as JSON
    User { id: String },
    /// Create numbered demo users, one per role
    CreateUsers {
        #[arg(long)]
        start: u32,
        #[arg(long = "role-uuid", required = true)]
        role_uuids: Vec<String>,
    },
    /// Purge a user
    DeleteUser { username: String },
    /// Retire a user
    RetireUser {
        username: String,
        #[arg(long, default_value = "No longer active")]
        reason: String,
    },
    /// Look up a patient by identifier
    FindPatient { identifier: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("omrs_client=warn".parse()?))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(command) => run(command).await,
        None => {
            println!("Use 'omrs --help' for commands");
            Ok(())
        }
    }
}

fn client() -> anyhow::Result<OpenMrsClient> {
    let config = ClientConfig::from_env().context("Error loading client configuration")?;
    Ok(OpenMrsClient::new(config)?)
}

fn reason(text: &str) -> anyhow::Result<RetireReason> {
    RetireReason::new(text).context("invalid retire reason")
}

async fn run(command: Commands) -> anyhow::Result<()> {
    tracing::debug!("running {command:?}");
    match command {
        Commands::GenId { length, count } => {
            for _ in 0..count {
                println!("{}", generate_identifier(length)?);
            }
        }
        Commands::CheckChar { payload } => {
            println!("{}", compute_check_character(&payload)?);
        }
        Commands::ValidateId { identifier } => {
            if validate_identifier(&identifier)? {
                println!("{identifier} is valid");
            } else {
                anyhow::bail!("{identifier} is not valid");
            }
        }
        Commands::GenFormat { format } => {
            println!("{}", generate_from_regex_format(&format)?);
        }
        Commands::Locations => {
            let rows: Vec<Vec<String>> = client()?
                .list_locations()
                .await?
                .iter()
                .map(|l| vec![l.label().to_owned(), l.uuid.clone()])
                .collect();
            println!("{}", table::render(&["Name", "UUID"], &rows));
        }
        Commands::RetireLocation { uuid, reason: text } => {
            client()?.retire_location(&uuid, &reason(&text)?).await?;
            println!("Retired location {uuid}");
        }
        Commands::IdentifierTypes => {
            let rows: Vec<Vec<String>> = client()?
                .list_identifier_types()
                .await?
                .iter()
                .map(|t| {
                    vec![
                        t.label().to_owned(),
                        if t.required { "yes" } else { "no" }.to_owned(),
                        t.format().unwrap_or("-").to_owned(),
                        t.uuid.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                table::render(&["Name", "Required", "Format", "UUID"], &rows)
            );
        }
        Commands::VisitTypes => {
            let rows: Vec<Vec<String>> = client()?
                .list_visit_types()
                .await?
                .iter()
                .map(|v| vec![v.label().to_owned(), v.uuid.clone()])
                .collect();
            println!("{}", table::render(&["Name", "UUID"], &rows));
        }
        Commands::Roles {
            privilege,
            role_uuids,
        } => {
            let client = client()?;
            let uuids = if role_uuids.is_empty() {
                client
                    .list_roles(PAGE_LIMIT)
                    .await?
                    .into_iter()
                    .map(|r| r.uuid)
                    .collect()
            } else {
                role_uuids
            };
            let mut roles = Vec::with_capacity(uuids.len());
            for uuid in &uuids {
                roles.push(client.get_role(uuid).await?);
            }
            let mut headers = vec!["Name", "Description"];
            if let Some(privilege) = &privilege {
                println!("Privilege: {privilege}");
                headers.push("Grants");
            }
            headers.push("UUID");
            let rows = reports::role_rows(&roles, privilege.as_deref());
            println!("{}", table::render(&headers, &rows));
        }
        Commands::CreateRole {
            name,
            description,
            privileges,
        } => {
            let payload = RolePayload {
                name,
                description,
                privileges: privileges
                    .into_iter()
                    .map(|name| PrivilegeRef { name })
                    .collect(),
            };
            let role = client()?.create_role(&payload).await?;
            println!("Created role {} ({})", role.label(), role.uuid);
        }
        Commands::Users {
            retired,
            with_privilege,
            without_privilege,
            all_privileges,
        } => {
            let client = client()?;
            println!("Session location: {}", client.session_location().await?);
            let users = client.list_users(retired, PAGE_LIMIT).await?;
            let filter = PrivilegeFilter::from_args(with_privilege, without_privilege);
            let rows = reports::user_rows(&users, &filter, all_privileges);
            println!(
                "{}",
                table::render(&reports::user_headers(&filter, all_privileges), &rows)
            );
        }
        Commands::User { id } => {
            let user = client()?.get_user(&id).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Commands::CreateUsers { start, role_uuids } => {
            let client = client()?;
            for (number, role_uuid) in (start..).zip(role_uuids) {
                let payload = UserPayload::demo(number, role_uuid);
                match client.create_user(&payload).await? {
                    CreateUserOutcome::Created(user) => {
                        println!("Created {} ({})", payload.username, user.uuid)
                    }
                    CreateUserOutcome::AlreadyExists => {
                        println!("Skipped {}: already exists", payload.username)
                    }
                }
            }
        }
        Commands::DeleteUser { username } => {
            let client = client()?;
            let uuid = client.require_user_uuid(&username).await?;
            client.delete_user(&uuid).await?;
            println!("Deleted {username} ({uuid})");
        }
        Commands::RetireUser {
            username,
            reason: text,
        } => {
            let client = client()?;
            let uuid = client.require_user_uuid(&username).await?;
            client.retire_user(&uuid, &reason(&text)?).await?;
            println!("Retired {username} ({uuid})");
        }
        Commands::FindPatient { identifier } => {
            match client()?.find_patient_by_identifier(&identifier).await? {
                Some(patient) => println!("{}", serde_json::to_string_pretty(&patient)?),
                None => anyhow::bail!("No patient found for identifier {identifier}"),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_gen_id_defaults() {
        let cli = Cli::try_parse_from(["omrs", "gen-id"]).unwrap();
        match cli.command {
            Some(Commands::GenId { length, count }) => {
                assert_eq!(length, DEFAULT_PAYLOAD_LENGTH);
                assert_eq!(count, 1);
            }
            _ => panic!("expected gen-id"),
        }
    }

    #[test]
    fn test_users_privilege_flags_conflict() {
        assert!(Cli::try_parse_from([
            "omrs",
            "users",
            "--with-privilege",
            "Add Patients",
            "--without-privilege",
            "Add Visits",
        ])
        .is_err());
    }

    #[test]
    fn test_create_users_collects_roles() {
        let cli = Cli::try_parse_from([
            "omrs",
            "create-users",
            "--start",
            "5",
            "--role-uuid",
            "r1",
            "--role-uuid",
            "r2",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CreateUsers { start, role_uuids }) => {
                assert_eq!(start, 5);
                assert_eq!(role_uuids, vec!["r1", "r2"]);
            }
            _ => panic!("expected create-users"),
        }
    }

    #[test]
    fn test_create_users_requires_a_role() {
        assert!(Cli::try_parse_from(["omrs", "create-users", "--start", "1"]).is_err());
    }

    #[test]
    fn test_blank_reason_rejected() {
        assert!(reason("  ").is_err());
        assert_eq!(reason("moved").unwrap().as_str(), "moved");
    }
}
