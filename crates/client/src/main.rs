use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use orthodash_auth::PrincipalMode;
use orthodash_client::{
    ClientConfig, FeatureAccessContext, GuardState, HttpFeatureAccessClient, InMemorySessionStore,
    RecordingNavigator, RouteGuard, SessionStore,
};

#[derive(Parser)]
#[command(name = "orthodash-guard", about = "Check dashboard routes against the feature-access endpoint", version)]
struct Cli {
    /// Backend base URL (overrides ORTHODASH_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Auth token (overrides ORTHODASH_AUTH_TOKEN).
    #[arg(long)]
    token: Option<String>,

    /// Treat the session as an employee login.
    #[arg(long)]
    employee: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the route guard for a path and print the outcome.
    Check {
        /// Route to check, e.g. /dashboard/orders?tab=2.
        path: String,
    },
    /// Print the route a denied user would be sent to.
    Landing,
    /// Print the Set-Cookie value mirroring the current permissions.
    Cookie,
    /// Print why a path is allowed or denied (JSON).
    Explain {
        path: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    orthodash_observability::init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "orthodash-guard failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = ClientConfig::from_env().context("invalid ORTHODASH_* configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(token) = cli.token {
        config.auth_token = Some(token);
    }
    if cli.employee {
        config.employee_login = true;
    }

    let mode = if config.employee_login {
        PrincipalMode::Employee
    } else {
        PrincipalMode::Partner
    };

    let session = Arc::new(InMemorySessionStore::new());
    if let Some(token) = &config.auth_token {
        session.login(token, mode);
    }

    let client =
        HttpFeatureAccessClient::new(&config, session.clone()).context("failed to build HTTP client")?;
    tracing::info!(url = client.url(), %mode, "using feature access endpoint");
    let context = FeatureAccessContext::new(Arc::new(client));

    match cli.command {
        Commands::Check { path } => {
            let mut guard = RouteGuard::new(RecordingNavigator::default(), config.login_route.clone());
            let state = guard.run(&path, &context, session.as_ref(), &config.retry).await.clone();

            match state {
                GuardState::Allowed => {
                    println!("allowed {path}");
                    Ok(ExitCode::SUCCESS)
                }
                GuardState::DeniedRedirecting { target } => {
                    println!("redirect {target}");
                    Ok(ExitCode::from(2))
                }
                GuardState::Unauthenticated { login_route } => {
                    println!("login {login_route}");
                    Ok(ExitCode::from(3))
                }
                GuardState::Failed(failure) => {
                    println!("failed {failure}");
                    Ok(ExitCode::FAILURE)
                }
                GuardState::AuthCheck | GuardState::LoadingPermissions => {
                    println!("loading");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Landing => {
            let set = context.refresh_with_retry(&config.retry).await?;
            println!("{}", set.first_allowed_route(mode));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Cookie => {
            context.refresh_with_retry(&config.retry).await?;
            let header = context
                .set_cookie_header()
                .context("feature access cookie could not be encoded")?;
            println!("{header}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Explain { path } => {
            let set = context.refresh_with_retry(&config.retry).await?;
            println!("{}", serde_json::to_string_pretty(&set.explain(&path))?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
