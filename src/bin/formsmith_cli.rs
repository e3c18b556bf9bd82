use clap::{Parser, Subcommand};
use formsmith::{
    load_config, logging, Field, FieldType, FieldValue, FormBuilderStore, FormSchema,
    PreviewSession, SaveOutcome, SledStore, SubmitOutcome, WorkingForm,
};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

type Store = FormBuilderStore<SledStore>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all saved forms
    List {},
    /// Print a saved form as JSON
    Show {
        /// Id of the saved form
        #[arg(required = true)]
        id: String,
    },
    /// Save a form read from a JSON file
    Import {
        /// Path to a JSON file holding `name` and `fields`
        #[arg(required = true)]
        path: PathBuf,
        /// Optional name overriding the one in the file
        #[arg(long, short)]
        name: Option<String>,
    },
    /// Delete one saved form
    Delete {
        /// Id of the saved form
        #[arg(required = true)]
        id: String,
    },
    /// Delete every saved form
    DeleteAll {},
    /// Fill in a saved form and show the computed values
    Preview {
        /// Id of the saved form
        #[arg(required = true)]
        id: String,
        /// Field input as `label=value` (or `id=value`); repeatable
        #[arg(long = "set", short = 's')]
        inputs: Vec<String>,
        /// Validate and submit after applying the inputs
        #[arg(long)]
        submit: bool,
    },
}

fn handle_list(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let forms = store.saved_forms();
    if forms.is_empty() {
        info!("No saved forms");
        return Ok(());
    }
    info!("Saved forms:");
    for form in forms {
        let types = form.field_types();
        let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
        info!(
            "  - {} [{}] created {}, {} field(s): {}",
            form.name,
            form.id,
            form.created_label(),
            form.fields.len(),
            names.join(", ")
        );
    }
    Ok(())
}

fn find_form<'a>(store: &'a Store, id: &str) -> Result<&'a FormSchema, Box<dyn std::error::Error>> {
    store
        .state()
        .saved_form(id)
        .ok_or_else(|| format!("No saved form with id {}", id).into())
}

fn handle_show(store: &Store, id: String) -> Result<(), Box<dyn std::error::Error>> {
    let form = find_form(store, &id)?;
    println!("{}", serde_json::to_string_pretty(form)?);
    Ok(())
}

fn handle_import(
    store: &mut Store,
    path: PathBuf,
    name: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Importing form from {}", path.display());
    let content = fs::read_to_string(&path)?;
    let mut form: WorkingForm = serde_json::from_str(&content)?;
    if let Some(name) = name {
        form.name = name;
    }
    form.validate_structure()?;

    store.state_mut().current_form = form;
    let outcome = store.save_form()?;
    store.state_mut().clear_current_form();
    match &outcome {
        SaveOutcome::Saved(schema) => {
            info!("{} (id {})", outcome.message(), schema.id);
            Ok(())
        }
        _ => Err(outcome.message().into()),
    }
}

fn handle_delete(store: &mut Store, id: String) -> Result<(), Box<dyn std::error::Error>> {
    if store.delete_form(&id)? {
        info!("Deleted form {}", id);
        Ok(())
    } else {
        Err(format!("No saved form with id {}", id).into())
    }
}

fn handle_delete_all(store: &mut Store) -> Result<(), Box<dyn std::error::Error>> {
    let count = store.saved_forms().len();
    store.delete_all_forms()?;
    info!("Deleted {} form(s)", count);
    Ok(())
}

/// Reads a command-line value the way the matching control would produce it.
fn parse_input(field: &Field, raw: &str) -> FieldValue {
    match field.field_type {
        FieldType::Checkbox => FieldValue::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        FieldType::Number => raw
            .trim()
            .parse::<f64>()
            .map(FieldValue::Number)
            .unwrap_or_else(|_| FieldValue::text(raw)),
        _ => FieldValue::text(raw),
    }
}

fn handle_preview(
    store: &Store,
    id: String,
    inputs: Vec<String>,
    submit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let form = find_form(store, &id)?;
    let mut session = PreviewSession::new(&WorkingForm {
        name: form.name.clone(),
        fields: form.fields.clone(),
    });
    if session.is_empty() {
        info!("This form has no fields to preview");
        return Ok(());
    }

    for input in inputs {
        let (key, raw) = input
            .split_once('=')
            .ok_or_else(|| format!("Invalid input '{}'. Use label=value", input))?;
        let key = key.trim();
        let field = form
            .fields
            .iter()
            .find(|f| f.id == key || f.label.eq_ignore_ascii_case(key))
            .ok_or_else(|| format!("No field named '{}'", key))?;
        session.set_value(&field.id, parse_input(field, raw))?;
    }

    if submit {
        match session.submit() {
            SubmitOutcome::Submitted => info!("Form submitted successfully"),
            SubmitOutcome::Rejected(_) => {
                if let Some(summary) = session.failure_summary() {
                    warn!("{}", summary);
                }
            }
        }
    }

    info!("{}", session.title());
    for control in session.controls() {
        let value = control
            .value
            .as_ref()
            .map(|v| v.to_text())
            .unwrap_or_default();
        let marker = if control.read_only {
            " (derived)"
        } else if control.required {
            " *"
        } else {
            ""
        };
        info!("  {}{}: {}", control.label, marker, value);
        if let Some(error) = control.error {
            warn!("    {}", error);
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init(&config.logging);
    info!("Using storage at {}", config.storage.path.display());

    let backend = SledStore::open(&config.storage)?;
    let mut store = FormBuilderStore::open(backend, config.storage.key.clone());

    match cli.command {
        Commands::List {} => handle_list(&store)?,
        Commands::Show { id } => handle_show(&store, id)?,
        Commands::Import { path, name } => handle_import(&mut store, path, name)?,
        Commands::Delete { id } => handle_delete(&mut store, id)?,
        Commands::DeleteAll {} => handle_delete_all(&mut store)?,
        Commands::Preview { id, inputs, submit } => handle_preview(&store, id, inputs, submit)?,
    }

    Ok(())
}
