use clap::{Parser, Subcommand};
use form_spec::{DecodedReply, FormDefinition, Payload, definition_schema};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const LOG_ENV: &str = "FORMCTL_LOG";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form schema helper",
    long_about = "Renders form definitions to the schema documents sent to clients and checks recorded replies against them"
)]
struct Cli {
    /// Print JSON on a single line.
    #[arg(long, global = true)]
    compact: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a form definition to its schema document.
    Render {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Decode a recorded reply against a form definition.
    Submit {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the raw reply payload.
        #[arg(
            long,
            value_name = "REPLY",
            conflicts_with = "closed",
            required_unless_present = "closed"
        )]
        reply: Option<PathBuf>,
        /// Treat the form as closed by the client (no payload).
        #[arg(long)]
        closed: bool,
    },
    /// Validate a form definition before it is sent.
    Check {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Print the JSON Schema of the form definition format.
    Schema,
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Render { form } => run_render(&form, cli.compact),
        Command::Submit {
            form,
            reply,
            closed,
        } => run_submit(&form, reply.as_deref(), closed, cli.compact),
        Command::Check { form } => run_check(&form),
        Command::Schema => {
            print_json(&definition_schema(), cli.compact);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_definition(path: &Path) -> CliResult<FormDefinition> {
    let contents = fs::read_to_string(path)?;
    let definition: FormDefinition = serde_json::from_str(&contents)?;
    tracing::debug!(path = %path.display(), title = definition.title(), "loaded form definition");
    Ok(definition)
}

fn run_render(form: &Path, compact: bool) -> CliResult<()> {
    let definition = load_definition(form)?;
    if let Err(err) = definition.check() {
        tracing::warn!(error = %err, "rendering a form that fails validation");
    }
    print_json(&definition.render(), compact);
    Ok(())
}

fn run_submit(form: &Path, reply: Option<&Path>, closed: bool, compact: bool) -> CliResult<()> {
    let definition = load_definition(form)?;
    let data = match reply {
        Some(path) if !closed => Some(fs::read(path)?),
        _ => None,
    };

    let decoded =
        Payload::from_bytes(data.as_deref()).and_then(|payload| definition.decode(payload));
    match decoded {
        Ok(reply) => {
            print_json(&reply_summary(&reply), compact);
            Ok(())
        }
        Err(err) => {
            print_json(
                &json!({
                    "status": "error",
                    "error": err.to_string(),
                }),
                compact,
            );
            Err("reply rejected".into())
        }
    }
}

fn run_check(form: &Path) -> CliResult<()> {
    let definition = load_definition(form)?;
    match definition.check() {
        Ok(()) => {
            println!("ok");
            Ok(())
        }
        Err(err) => {
            println!("invalid: {}", err);
            Err("form definition failed validation".into())
        }
    }
}

fn reply_summary(reply: &DecodedReply) -> Value {
    match reply {
        DecodedReply::Closed => json!({ "status": "closed" }),
        DecodedReply::Custom(_) => json!({
            "status": "submitted",
            "kind": "custom_form",
            "result": reply.to_value(),
        }),
        DecodedReply::Menu(_) => json!({
            "status": "submitted",
            "kind": "form",
            "result": reply.to_value(),
        }),
        DecodedReply::Modal(_) => json!({
            "status": "submitted",
            "kind": "modal",
            "result": reply.to_value(),
        }),
    }
}

fn print_json(value: &Value, compact: bool) {
    let rendered = if compact {
        value.to_string()
    } else {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    };
    println!("{}", rendered);
}
