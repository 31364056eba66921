// Interactive Murf setup wizard on the terminal.
//
// Reads settings from murfai.toml / MURFAI_* / MURF_API_KEY, walks the setup
// steps on stdin and optionally speaks a test sentence with the result.
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use murfai::{
    initialize_flows, ConfigFlowHandler, FieldKind, FormSchema, MurfSettings, MurfTtsEntity, StateLanguageSignal,
    StepOutcome, StepResult, UserInput, DOMAIN,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn prompt(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn ask(form: &FormSchema) -> io::Result<UserInput> {
    println!("\n== {} ==", form.step_id);
    for (field, error) in &form.errors {
        println!("  ! {}: {}", field, error);
    }

    let mut input = UserInput::new();
    for field in &form.fields {
        if let Some(options) = field.options() {
            for option in options {
                println!("  - {} [{}]", option.label, option.value);
            }
        }
        let default = field.default.clone().unwrap_or(Value::Null);
        let answer = prompt(&format!("{} (default {})", field.key, default))?;
        if answer.is_empty() {
            continue;
        }
        let value = match field.kind {
            FieldKind::Boolean => json!(matches!(answer.as_str(), "y" | "yes" | "true")),
            _ => json!(answer),
        };
        input.insert(field.key.clone(), value);
    }
    Ok(input)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = MurfSettings::new()?;
    println!("Storing configurations in {}", settings.resolved_store_path().display());

    let registry = initialize_flows(&settings, settings.open_store())?;
    let handler = registry.create(DOMAIN).ok_or("Murf flow is not registered")?;

    let mut result = handler.start();
    let entry = loop {
        let StepResult { state, outcome } = result;
        match outcome {
            StepOutcome::Form(form) => {
                let input = ask(&form)?;
                result = handler.step(state, Some(input)).await;
            }
            StepOutcome::Abort(reason) => {
                println!("Setup aborted: {}", reason);
                return Ok(());
            }
            StepOutcome::CreateEntry(entry) => break entry,
        }
    };
    println!("\nCreated '{}' ({})", entry.title, entry.unique_id());

    let text = prompt("Text to speak (empty to skip)")?;
    if text.is_empty() {
        return Ok(());
    }

    let signal = Arc::new(StateLanguageSignal::new(settings.language_signal_key.clone()));
    let detected = prompt("Detected language, e.g. de or en (empty for none)")?;
    if !detected.is_empty() {
        signal.set(detected);
    }

    let entity = MurfTtsEntity::from_entry(&entry, &settings)?.with_language_signal(signal);
    let audio = entity.get_tts_audio(&text, None).await?;
    let file_name = format!("{}.{}", entity.unique_id(), entry.data.audio_format.extension());
    std::fs::write(&file_name, &audio.data)?;
    println!("Wrote {} bytes of {} to {}", audio.data.len(), audio.content_type, file_name);

    Ok(())
}
