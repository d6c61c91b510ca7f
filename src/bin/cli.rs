use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use admin_rbac::authz::{
    available_roles_for, can_access_page, can_manage, permissions_of, Role, RoleResolver, PAGES,
};
use admin_rbac::config::ResolverConfig;
use admin_rbac::jwt::JwtConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "admin-rbac inspection tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the original role of an identity
    Resolve { email: String },
    /// Print the roles an identity may switch to
    Roles { email: String },
    /// Print the permissions granted to a role
    Permissions { role: String },
    /// Check whether a role may open a page
    CheckPage { role: String, page: String },
    /// Check whether one role may edit or delete principals holding another
    CanManage { acting: String, target: String },
    /// Mint a bearer token for an identity (uses JWT_SECRET)
    MintToken { email: String },
    /// Write the OpenAPI document to a file
    Openapi {
        #[arg(long, default_value = "openapi.json")]
        out: PathBuf,
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

fn main() -> anyhow::Result<()> {
    // Fall back to the crate-local `.env` when the CWD has none.
    if dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { email } => {
            let role = resolver()?.resolve_original_role(&email);
            println!("{} ({})", role, role.label());
        }
        Commands::Roles { email } => {
            let original = resolver()?.resolve_original_role(&email);
            println!("{:<8} {:<12} {}", "Original", "Role", "Label");
            for role in available_roles_for(original) {
                let marker = if role == original { "*" } else { "" };
                println!("{:<8} {:<12} {}", marker, role.id(), role.label());
            }
        }
        Commands::Permissions { role } => {
            let role = parse_role(&role)?;
            for permission in permissions_of(role) {
                println!("{}", permission);
            }
        }
        Commands::CheckPage { role, page } => {
            let role = parse_role(&role)?;
            if !PAGES.contains(&page.as_str()) {
                eprintln!("warning: {} is not a configured page", page);
            }
            println!("{}", verdict(can_access_page(role, &page)));
        }
        Commands::CanManage { acting, target } => {
            let acting = parse_role(&acting)?;
            let target = parse_role(&target)?;
            println!("{}", verdict(can_manage(acting, target)));
        }
        Commands::MintToken { email } => {
            let jwt = JwtConfig::from_env()?;
            let token = jwt.encode(&email)?;
            println!("{}", token);
        }
        Commands::Openapi { out, port } => {
            let doc = admin_rbac::docs::build_openapi(port)?;
            fs::write(&out, serde_json::to_string_pretty(&doc)?)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("wrote {}", out.display());
        }
    }

    Ok(())
}

/// Resolver built from the same environment the server reads, without
/// requiring `JWT_SECRET`.
fn resolver() -> anyhow::Result<RoleResolver> {
    ResolverConfig::from_env()
        .and_then(|config| config.build())
        .context("failed to build role resolver")
}

fn parse_role(value: &str) -> anyhow::Result<Role> {
    value.parse::<Role>().with_context(|| format!("invalid role {:?}", value))
}

fn verdict(allowed: bool) -> &'static str {
    if allowed {
        "allowed"
    } else {
        "denied"
    }
}
