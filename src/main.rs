//! `happctl`: operator CLI for the routing and token core.
//!
//! ```text
//! happctl [--config app.toml] keygen
//! happctl [--config app.toml] sign --sub alice --ttl 600 --claim role=admin
//! happctl [--config app.toml] verify <token>
//! happctl [--config app.toml] match GET /users/42
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use httpapp_core::config::{load_config, AppConfig};
use httpapp_core::jwt::policy::now_epoch_seconds;
use httpapp_core::jwt::{ClaimValue, HmacCryptoProvider, Jwt, JwtResult, SerdeJsonProvider};
use httpapp_core::observability::init_logging;
use httpapp_core::routing::{HttpMethod, PathParams, Router};

#[derive(Parser)]
#[command(name = "happctl")]
#[command(about = "Key, token and route tooling", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when absent.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure the configured key pair exists
    Keygen,
    /// Sign a token with the configured key
    Sign {
        #[arg(long)]
        sub: Option<String>,
        #[arg(long)]
        iss: Option<String>,
        #[arg(long)]
        aud: Option<String>,
        /// Lifetime in seconds
        #[arg(long, default_value_t = 3600)]
        ttl: i64,
        /// Extra claim as name=value, repeatable
        #[arg(long = "claim", value_parser = parse_claim)]
        claims: Vec<(String, ClaimValue)>,
    },
    /// Verify a token and print its claims
    Verify { token: String },
    /// Match a request against the configured route table
    Match { method: String, path: String },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    init_logging(&config.observability);

    match cli.command {
        Commands::Keygen => {
            build_engine(&config)?;
            let dir = Path::new(&config.jwt.keys.dir);
            println!(
                "{}",
                dir.join(&config.jwt.keys.spec.private_key_file).display()
            );
            println!(
                "{}",
                dir.join(&config.jwt.keys.spec.public_key_file).display()
            );
        }
        Commands::Sign {
            sub,
            iss,
            aud,
            ttl,
            claims,
        } => {
            let jwt = build_engine(&config)?;
            let now = now_epoch_seconds();

            let mut builder = jwt
                .token()
                .alg(config.jwt.keys.spec.alg)
                .kid(config.jwt.keys.spec.kid.as_str())
                .jwt_id(Uuid::new_v4().to_string())
                .issued_at(now)
                .expires_at(now.saturating_add(ttl));
            if let Some(sub) = sub {
                builder = builder.subject(sub);
            }
            if let Some(iss) = iss {
                builder = builder.issuer(iss);
            }
            if let Some(aud) = aud {
                builder = builder.audience(aud);
            }
            for (name, value) in claims {
                builder = builder.claim(name, value);
            }

            println!("{}", builder.sign()?);
        }
        Commands::Verify { token } => {
            let jwt = new_engine(&config);
            load_keys(&jwt, &config)?;
            let verification = jwt.verify(&token);
            if let Some(err) = verification.error() {
                eprintln!("{err}");
                return Ok(ExitCode::FAILURE);
            }
            println!("{}", jwt.json().to_json(verification.claims())?);
        }
        Commands::Match { method, path } => {
            let mut router: Router<PathParams> = Router::with_options(config.router);
            for route in &config.routes {
                router.add(route.method, &route.pattern, |_: &mut PathParams| {});
            }

            let method = HttpMethod::from_method_string(&method);
            let mut params = PathParams::new();
            match router.match_route(method, &path, &mut params) {
                Some(route) => {
                    println!("{} {}", route.method(), route.pattern());
                    for (name, value) in params.iter() {
                        println!("  {name} = {value}");
                    }
                }
                None => {
                    println!("no route");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn new_engine(config: &AppConfig) -> Jwt {
    Jwt::new(
        Arc::new(HmacCryptoProvider::new()),
        Arc::new(SerdeJsonProvider),
        config.jwt.engine_options(),
    )
}

/// Engine with the configured key pair, generated and written when missing.
fn build_engine(config: &AppConfig) -> Result<Jwt, Box<dyn std::error::Error>> {
    let jwt = new_engine(config);
    jwt.ensure_key_pair_in_dir(Path::new(&config.jwt.keys.dir), &config.jwt.keys.spec)?;
    Ok(jwt)
}

/// Load the configured key pair without creating anything on disk.
fn load_keys(jwt: &Jwt, config: &AppConfig) -> JwtResult<()> {
    let dir = Path::new(&config.jwt.keys.dir);
    let spec = &config.jwt.keys.spec;
    jwt.load_private_key_from_pem_file(&spec.kid, dir.join(&spec.private_key_file))?;
    jwt.load_public_key_from_pem_file(&spec.kid, dir.join(&spec.public_key_file), spec.key_use)
}

/// `name=value`; the value is read as int, float, bool or null before
/// falling back to text.
fn parse_claim(raw: &str) -> Result<(String, ClaimValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.is_empty() {
        return Err("claim name must not be empty".to_string());
    }

    let value = if let Ok(i) = value.parse::<i64>() {
        ClaimValue::Int(i)
    } else if let Some(f) = value.parse::<f64>().ok().filter(|f| f.is_finite()) {
        ClaimValue::Double(f)
    } else if let Ok(b) = value.parse::<bool>() {
        ClaimValue::Bool(b)
    } else if value == "null" {
        ClaimValue::Null
    } else {
        ClaimValue::Text(value.to_string())
    };

    Ok((name.to_string(), value))
}
