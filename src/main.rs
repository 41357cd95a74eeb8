use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use questflow::config::Config;
use questflow::flow::{FlowEngine, FlowStep};
use questflow::logic::validate_conditional_logic;
use questflow::questionnaire::QuestionnaireLoader;
use questflow::storage::InMemoryStorage;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a questionnaire's conditional logic
    Validate {
        /// Path to the questionnaire file (YAML or JSON)
        #[arg(short, long)]
        file: String,
    },
    /// Walk a questionnaire with scripted answers
    Walk {
        /// Path to the questionnaire file (YAML or JSON)
        #[arg(short, long)]
        file: String,

        /// Mapping of question id to answer (YAML or JSON)
        #[arg(short, long)]
        answers: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    let args = Args::parse();
    let loader = QuestionnaireLoader::new();

    match args.command {
        Commands::Validate { file } => {
            let path = config.resolve(&file);
            let questionnaire = loader
                .load_questionnaire(&path)
                .with_context(|| format!("loading {}", path.display()))?;

            let report = validate_conditional_logic(&questionnaire);
            for error in &report.errors {
                println!("error: {}", error);
            }
            for warning in &report.warnings {
                println!("warning: {}", warning);
            }

            let failed = !report.is_valid || (config.strict && !report.warnings.is_empty());
            if failed {
                anyhow::bail!(
                    "questionnaire '{}' failed validation ({} errors, {} warnings)",
                    questionnaire.id,
                    report.errors.len(),
                    report.warnings.len()
                );
            }
            println!("questionnaire '{}' is valid", questionnaire.id);
        }
        Commands::Walk { file, answers } => {
            let path = config.resolve(&file);
            let questionnaire = loader
                .load_questionnaire(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            let script = std::fs::read_to_string(&answers)
                .with_context(|| format!("reading {}", answers))?;
            let script: HashMap<String, Value> = serde_yaml::from_str(&script)?;

            let questionnaire_id = questionnaire.id.clone();
            let storage = InMemoryStorage::with_questionnaires(vec![questionnaire]).await;
            let mut engine = FlowEngine::new(Arc::new(storage));

            let mut question = engine.start(&questionnaire_id).await?;
            let mut route = Vec::new();
            let responses = loop {
                route.push(question.id.clone());
                if let Some(answer) = script.get(&question.id) {
                    engine.record_response(&question.id, answer.clone()).await?;
                } else if engine.is_current_question_required()? {
                    log::warn!("No scripted answer for required question {}", question.id);
                }

                match engine.next().await? {
                    FlowStep::Question(next) => question = next,
                    FlowStep::Completed { responses } => break responses,
                }
            };

            let mut skipped: Vec<String> = engine
                .state()
                .map(|s| s.skipped_questions.iter().cloned().collect())
                .unwrap_or_default();
            skipped.sort();

            let progress = engine.progress()?;
            let summary = json!({
                "sessionId": engine.session_id(),
                "path": route,
                "skipped": skipped,
                "progress": progress,
                "responses": responses.to_json(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
