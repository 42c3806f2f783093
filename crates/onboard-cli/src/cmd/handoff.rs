use crate::output::{print_fields, print_json};
use anyhow::Context;
use clap::Subcommand;
use onboard_core::config::Config;
use onboard_core::signup::{Handoff, HttpSignupClient, SignupForm};
use onboard_core::store::{HandoffStore, RedbHandoffStore};
use std::path::Path;

#[derive(Subcommand)]
pub enum HandoffSubcommand {
    /// Show the pending onboarding record
    Show,

    /// Discard the pending onboarding record
    Clear,

    /// Create the account with the pending record
    Submit {
        /// Full name
        #[arg(long)]
        nome: String,
        #[arg(long)]
        telefone: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ONBOARD_SENHA", hide_env_values = true)]
        senha: String,
        /// Password confirmation (defaults to --senha)
        #[arg(long)]
        confirmar_senha: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: HandoffSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store = RedbHandoffStore::open(&config.handoff_db_path(root))
        .context("failed to open hand-off store")?;

    match subcmd {
        HandoffSubcommand::Show => show(&store, json),
        HandoffSubcommand::Clear => clear(&store, json),
        HandoffSubcommand::Submit {
            nome,
            telefone,
            email,
            senha,
            confirmar_senha,
        } => {
            let form = SignupForm {
                nome_completo: nome,
                telefone,
                email,
                confirmar_senha: confirmar_senha.unwrap_or_else(|| senha.clone()),
                senha,
            };
            submit(&config, &store, &form, json)
        }
    }
}

fn show(store: &RedbHandoffStore, json: bool) -> anyhow::Result<()> {
    let record = store.load()?;
    if json {
        return print_json(&serde_json::json!({ "record": record }));
    }
    match record {
        None => println!("No pending onboarding record."),
        Some(r) => {
            print_fields(&[
                ("Session", r.session.to_string()),
                ("Saved at", r.saved_at.to_rfc3339()),
                ("Name", r.data.nome.clone().unwrap_or_default()),
            ]);
            println!();
            print!("{}", serde_yaml::to_string(&r.data)?);
        }
    }
    Ok(())
}

fn clear(store: &RedbHandoffStore, json: bool) -> anyhow::Result<()> {
    let removed = store.clear()?;
    if json {
        print_json(&serde_json::json!({ "removed": removed }))
    } else {
        if removed {
            println!("Cleared the pending onboarding record.");
        } else {
            println!("No pending onboarding record.");
        }
        Ok(())
    }
}

fn submit(
    config: &Config,
    store: &RedbHandoffStore,
    form: &SignupForm,
    json: bool,
) -> anyhow::Result<()> {
    let client = HttpSignupClient::new(&config.signup)?;
    let response = Handoff::new(store, &client)
        .submit(form)
        .context("signup failed")?;
    if json {
        return print_json(&response);
    }
    println!("Account created. The onboarding record was consumed.");
    Ok(())
}
